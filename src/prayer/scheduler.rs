use std::future::Future;
use std::str::FromStr;
use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use poise::serenity_prelude::{self as serenity, GuildId};
use tokio::time::{Duration, sleep};
use tracing::{debug, error, info, warn};

use crate::{
    constants::{PRAYER_CHECK_CRON, PRAYER_SUPPRESSION_SECS},
    models::Data,
    utils::timezone::format_clock,
};

use super::{DayTimings, Prayer, broadcast::broadcast_to_guild};

/// Decides when a prayer fires, never twice within the suppression window
#[derive(Debug, Default)]
pub struct PrayerTrigger {
    last_fired: Option<(Prayer, NaiveDate, DateTime<Utc>)>,
}

impl PrayerTrigger {
    pub fn new() -> Self {
        Self::default()
    }

    /// The prayer due right now, if it has not fired already
    pub fn check(&mut self, timings: &DayTimings, now: DateTime<Utc>) -> Option<Prayer> {
        let local = now.with_timezone(&timings.timezone);
        let prayer = timings.due_at(&format_clock(&local))?;
        let date = local.date_naive();

        if let Some((last_prayer, last_date, fired_at)) = self.last_fired {
            let within_window = (now - fired_at).num_seconds() < PRAYER_SUPPRESSION_SECS;
            if within_window || (last_prayer == prayer && last_date == date) {
                debug!("{:?} already fired at {}, suppressed", prayer, fired_at);
                return None;
            }
        }

        self.last_fired = Some((prayer, date, now));
        Some(prayer)
    }
}

/// One scheduler tick: fire the due prayer across guilds unless locked.
///
/// Guilds are handled one after another.
pub async fn run_tick<F, Fut>(
    trigger: &mut PrayerTrigger,
    timings: &DayTimings,
    now: DateTime<Utc>,
    locked: bool,
    guilds: &[GuildId],
    mut dispatch: F,
) -> Option<Prayer>
where
    F: FnMut(GuildId, Prayer) -> Fut,
    Fut: Future<Output = ()>,
{
    let prayer = trigger.check(timings, now)?;

    if locked {
        debug!("{:?} time reached while locked, broadcast suppressed", prayer);
        return None;
    }

    info!("It's {:?} time! Broadcasting to {} guild(s)", prayer, guilds.len());
    for guild_id in guilds {
        dispatch(*guild_id, prayer).await;
    }

    Some(prayer)
}

/// Start the once-a-minute prayer check
pub fn start_prayer_scheduler(
    http: Arc<serenity::Http>,
    cache: Arc<serenity::Cache>,
    data: Arc<Data>,
) {
    tokio::spawn(async move {
        let schedule = match cron::Schedule::from_str(PRAYER_CHECK_CRON) {
            Ok(s) => s,
            Err(e) => {
                error!("Invalid prayer check cron '{}': {}", PRAYER_CHECK_CRON, e);
                return;
            }
        };

        info!(
            "Prayer scheduler started for {}, {}",
            data.prayer_api.location().city,
            data.prayer_api.location().country
        );

        let mut trigger = PrayerTrigger::new();

        loop {
            let wait = schedule
                .upcoming(Utc)
                .next()
                .and_then(|next| (next - Utc::now()).to_std().ok())
                .unwrap_or(Duration::from_secs(60));
            sleep(wait).await;

            let timings = match data.prayer_api.today().await {
                Ok(t) => t,
                Err(e) => {
                    warn!("Prayer task error: {}", e);
                    continue;
                }
            };

            let guilds = cache.guilds();
            let locked = data.state.is_locked();
            let fired = run_tick(
                &mut trigger,
                &timings,
                Utc::now(),
                locked,
                &guilds,
                |guild_id, prayer| {
                    let http = http.clone();
                    let cache = cache.clone();
                    let data = data.clone();
                    async move {
                        let _pause = data.state.pause_for_prayer();
                        broadcast_to_guild(&http, &cache, &data, guild_id, prayer).await;
                    }
                },
            )
            .await;

            if let Some(prayer) = fired {
                info!("{:?} broadcast completed", prayer);
            }
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveTime, TimeZone};
    use chrono_tz::Tz;
    use std::sync::Mutex;

    fn timings() -> DayTimings {
        let t = |h, m| NaiveTime::from_hms_opt(h, m, 0).unwrap();
        DayTimings::new(
            NaiveDate::from_ymd_opt(2026, 3, 1).unwrap(),
            Tz::UTC,
            vec![
                (Prayer::Fajr, t(5, 12)),
                (Prayer::Dhuhr, t(12, 10)),
                (Prayer::Asr, t(15, 31)),
                (Prayer::Maghrib, t(17, 49)),
                (Prayer::Isha, t(19, 19)),
            ],
        )
    }

    fn at(h: u32, m: u32, s: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 1, h, m, s).unwrap()
    }

    #[test]
    fn test_trigger_fires_on_match() {
        let mut trigger = PrayerTrigger::new();
        assert_eq!(trigger.check(&timings(), at(5, 12, 0)), Some(Prayer::Fajr));
    }

    #[test]
    fn test_trigger_ignores_other_minutes() {
        let mut trigger = PrayerTrigger::new();
        assert_eq!(trigger.check(&timings(), at(5, 11, 59)), None);
        assert_eq!(trigger.check(&timings(), at(5, 13, 0)), None);
    }

    #[test]
    fn test_trigger_suppresses_within_window() {
        let mut trigger = PrayerTrigger::new();
        assert_eq!(trigger.check(&timings(), at(5, 12, 0)), Some(Prayer::Fajr));
        assert_eq!(trigger.check(&timings(), at(5, 12, 30)), None);
        assert_eq!(trigger.check(&timings(), at(5, 12, 59)), None);
    }

    #[test]
    fn test_trigger_fires_next_prayer() {
        let mut trigger = PrayerTrigger::new();
        assert_eq!(trigger.check(&timings(), at(5, 12, 0)), Some(Prayer::Fajr));
        assert_eq!(trigger.check(&timings(), at(12, 10, 0)), Some(Prayer::Dhuhr));
    }

    #[test]
    fn test_trigger_uses_timings_zone() {
        let mut riyadh = timings();
        riyadh.timezone = chrono_tz::Asia::Riyadh;
        let mut trigger = PrayerTrigger::new();
        // 02:12 UTC is 05:12 in Riyadh
        assert_eq!(trigger.check(&riyadh, at(2, 12, 0)), Some(Prayer::Fajr));
    }

    #[tokio::test]
    async fn test_tick_dispatches_once_per_guild() {
        let guilds = vec![GuildId::new(1), GuildId::new(2), GuildId::new(3)];
        let calls = Mutex::new(Vec::new());
        let mut trigger = PrayerTrigger::new();

        let fired = run_tick(&mut trigger, &timings(), at(5, 12, 0), false, &guilds, |g, p| {
            calls.lock().unwrap().push((g, p));
            async {}
        })
        .await;
        assert_eq!(fired, Some(Prayer::Fajr));

        let again = run_tick(&mut trigger, &timings(), at(5, 12, 40), false, &guilds, |g, p| {
            calls.lock().unwrap().push((g, p));
            async {}
        })
        .await;
        assert_eq!(again, None);

        let calls = calls.into_inner().unwrap();
        assert_eq!(
            calls,
            guilds.iter().map(|g| (*g, Prayer::Fajr)).collect::<Vec<_>>()
        );
    }

    #[tokio::test]
    async fn test_tick_locked_takes_no_action() {
        let guilds = vec![GuildId::new(1)];
        let mut dispatched = 0;
        let mut trigger = PrayerTrigger::new();

        let fired = run_tick(&mut trigger, &timings(), at(5, 12, 0), true, &guilds, |_, _| {
            dispatched += 1;
            async {}
        })
        .await;

        assert_eq!(fired, None);
        assert_eq!(dispatched, 0);
    }
}
