use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, RwLock};

use poise::serenity_prelude::{ChannelId, GuildId};

use crate::{
    ai::GeminiClient, config::Config, prayer::PrayerApi, voice::VoiceController,
};

/// The single voice channel the bot is confined to while locked
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LockedChannel {
    pub guild_id: GuildId,
    pub channel_id: ChannelId,
}

/// Process-wide switches read by the event handlers and the scheduler
#[derive(Debug)]
pub struct BotState {
    bot_active: AtomicBool,
    /// Number of prayer broadcasts currently running
    prayer_pause: AtomicUsize,
    locked: RwLock<Option<LockedChannel>>,
}

impl Default for BotState {
    fn default() -> Self {
        Self {
            bot_active: AtomicBool::new(true),
            prayer_pause: AtomicUsize::new(0),
            locked: RwLock::new(None),
        }
    }
}

impl BotState {
    pub fn is_active(&self) -> bool {
        self.bot_active.load(Ordering::SeqCst)
    }

    pub fn set_active(&self, active: bool) {
        self.bot_active.store(active, Ordering::SeqCst);
    }

    pub fn is_prayer_paused(&self) -> bool {
        self.prayer_pause.load(Ordering::SeqCst) > 0
    }

    /// Pause greetings until the returned guard is dropped
    pub fn pause_for_prayer(&self) -> PrayerPauseGuard<'_> {
        self.prayer_pause.fetch_add(1, Ordering::SeqCst);
        PrayerPauseGuard { state: self }
    }

    pub fn locked(&self) -> Option<LockedChannel> {
        match self.locked.read() {
            Ok(guard) => *guard,
            Err(poisoned) => *poisoned.into_inner(),
        }
    }

    pub fn is_locked(&self) -> bool {
        self.locked().is_some()
    }

    /// Replace the lock, returning the previous one
    pub fn set_locked(&self, locked: Option<LockedChannel>) -> Option<LockedChannel> {
        let mut guard = match self.locked.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        std::mem::replace(&mut *guard, locked)
    }
}

/// Releases one prayer pause when dropped
pub struct PrayerPauseGuard<'a> {
    state: &'a BotState,
}

impl Drop for PrayerPauseGuard<'_> {
    fn drop(&mut self) {
        self.state.prayer_pause.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Bot state shared across all handlers
pub struct Data {
    pub state: BotState,
    pub voice: VoiceController,
    pub prayer_api: PrayerApi,
    pub ai: Option<GeminiClient>,
    pub admin_code: Option<String>,
    pub audio_dir: PathBuf,
    pub dev_guild_id: Option<GuildId>,
}

impl Data {
    pub fn new(config: &Config, voice: VoiceController, http: reqwest::Client) -> Self {
        let ai = config
            .gemini_api_key
            .clone()
            .map(|key| GeminiClient::new(http.clone(), key, config.gemini_model.clone()));

        Self {
            state: BotState::default(),
            voice,
            prayer_api: PrayerApi::new(http, config.location.clone()),
            ai,
            admin_code: config.admin_code.clone(),
            audio_dir: config.audio_dir.clone(),
            dev_guild_id: config.dev_guild_id,
        }
    }

    /// Path of a clip inside the audio directory
    pub fn audio_path(&self, file_name: &str) -> PathBuf {
        self.audio_dir.join(file_name)
    }

    pub fn audio_dir(&self) -> &Path {
        &self.audio_dir
    }
}

pub type Error = Box<dyn std::error::Error + Send + Sync>;
pub type Context<'a> = poise::Context<'a, Arc<Data>, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let state = BotState::default();
        assert!(state.is_active());
        assert!(!state.is_prayer_paused());
        assert!(!state.is_locked());
    }

    #[test]
    fn test_prayer_pause_guard() {
        let state = BotState::default();
        {
            let _guard = state.pause_for_prayer();
            assert!(state.is_prayer_paused());
        }
        assert!(!state.is_prayer_paused());
    }

    #[test]
    fn test_overlapping_prayer_pauses() {
        let state = BotState::default();
        let outer = state.pause_for_prayer();
        {
            let _inner = state.pause_for_prayer();
        }
        // Another broadcast finishing must not lift this one's pause
        assert!(state.is_prayer_paused());
        drop(outer);
        assert!(!state.is_prayer_paused());
    }

    #[test]
    fn test_set_locked_returns_previous() {
        let state = BotState::default();
        let lock = LockedChannel {
            guild_id: GuildId::new(1),
            channel_id: ChannelId::new(2),
        };
        assert_eq!(state.set_locked(Some(lock)), None);
        assert_eq!(state.locked(), Some(lock));
        assert_eq!(state.set_locked(None), Some(lock));
        assert!(!state.is_locked());
    }
}
