use std::collections::HashMap;

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use chrono_tz::Tz;
use serde::Deserialize;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::config::PrayerLocation;
use crate::utils::timezone::{TimezoneError, parse_time_string, parse_timezone};

use super::Prayer;

const API_BASE_URL: &str = "http://api.aladhan.com/v1";

#[derive(Debug, thiserror::Error)]
pub enum PrayerApiError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected status {0}")]
    Status(reqwest::StatusCode),

    #[error("malformed response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("response has no timing for {0}")]
    MissingPrayer(&'static str),

    #[error("{0}")]
    InvalidTime(#[from] TimezoneError),
}

#[derive(Debug, Deserialize)]
struct TimingsResponse {
    data: TimingsData,
}

#[derive(Debug, Deserialize)]
struct TimingsData {
    timings: HashMap<String, String>,
    #[serde(default)]
    meta: Option<TimingsMeta>,
}

#[derive(Debug, Deserialize)]
struct TimingsMeta {
    #[serde(default)]
    timezone: Option<String>,
}

/// The five prayer times for one local date
#[derive(Debug, Clone, PartialEq)]
pub struct DayTimings {
    pub date: NaiveDate,
    pub timezone: Tz,
    times: Vec<(Prayer, NaiveTime)>,
}

impl DayTimings {
    pub fn new(date: NaiveDate, timezone: Tz, times: Vec<(Prayer, NaiveTime)>) -> Self {
        Self {
            date,
            timezone,
            times,
        }
    }

    pub fn time_of(&self, prayer: Prayer) -> Option<NaiveTime> {
        self.times
            .iter()
            .find(|(p, _)| *p == prayer)
            .map(|(_, time)| *time)
    }

    /// The prayer scheduled for this `HH:MM`, if any
    pub fn due_at(&self, clock: &str) -> Option<Prayer> {
        self.times
            .iter()
            .find(|(_, time)| time.format("%H:%M").to_string() == clock)
            .map(|(prayer, _)| *prayer)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Prayer, NaiveTime)> + '_ {
        self.times.iter().copied()
    }

    /// Parse an API response body.
    ///
    /// The wall clock is the forced zone if given, else the zone the API
    /// reports for the city, else UTC.
    pub fn from_json(
        body: &str,
        forced_timezone: Option<Tz>,
        now: DateTime<Utc>,
    ) -> Result<Self, PrayerApiError> {
        let response: TimingsResponse = serde_json::from_str(body)?;
        let data = response.data;

        let timezone = forced_timezone
            .or_else(|| {
                data.meta
                    .as_ref()
                    .and_then(|meta| meta.timezone.as_deref())
                    .and_then(|tz| parse_timezone(tz).ok())
            })
            .unwrap_or(Tz::UTC);

        let times = Prayer::ALL
            .iter()
            .map(|prayer| -> Result<(Prayer, NaiveTime), PrayerApiError> {
                let raw = data
                    .timings
                    .get(prayer.api_key())
                    .ok_or(PrayerApiError::MissingPrayer(prayer.api_key()))?;
                Ok((*prayer, parse_time_string(raw)?))
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            date: now.with_timezone(&timezone).date_naive(),
            timezone,
            times,
        })
    }
}

/// Client for the prayer-times API with a one-day cache
pub struct PrayerApi {
    http: reqwest::Client,
    base_url: String,
    location: PrayerLocation,
    cache: Mutex<Option<DayTimings>>,
}

impl PrayerApi {
    pub fn new(http: reqwest::Client, location: PrayerLocation) -> Self {
        Self {
            http,
            base_url: API_BASE_URL.to_string(),
            location,
            cache: Mutex::new(None),
        }
    }

    pub fn location(&self) -> &PrayerLocation {
        &self.location
    }

    /// Timings for the current local date, fetched at most once per day
    pub async fn today(&self) -> Result<DayTimings, PrayerApiError> {
        let now = Utc::now();

        // The cache lock is never held across the request
        if let Some(cached) = self.cache.lock().await.as_ref()
            && cached.date == now.with_timezone(&cached.timezone).date_naive()
        {
            debug!("Using cached prayer timings for {}", cached.date);
            return Ok(cached.clone());
        }

        let timings = self.fetch(now).await?;
        info!(
            "Fetched prayer timings for {} ({}, {}) in {}",
            timings.date, self.location.city, self.location.country, timings.timezone
        );
        *self.cache.lock().await = Some(timings.clone());
        Ok(timings)
    }

    async fn fetch(&self, now: DateTime<Utc>) -> Result<DayTimings, PrayerApiError> {
        let method = self.location.method.to_string();
        let response = self
            .http
            .get(format!("{}/timingsByCity", self.base_url))
            .query(&[
                ("city", self.location.city.as_str()),
                ("country", self.location.country.as_str()),
                ("method", method.as_str()),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            warn!("Prayer API answered with status {}", response.status());
            return Err(PrayerApiError::Status(response.status()));
        }

        let body = response.text().await?;
        DayTimings::from_json(&body, self.location.timezone, now)
    }
}
