/// Voice sessions: connect, play one clip, wait for it to end, disconnect
mod channels;

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use poise::serenity_prelude::{ChannelId, GuildId, async_trait};
use songbird::error::{ControlError, JoinError};
use songbird::input::File as FileInput;
use songbird::{Event, EventContext, EventHandler as VoiceEventHandler, Songbird, TrackEvent};
use tokio::sync::{Mutex, OwnedMutexGuard, oneshot};
use tokio::time::{sleep, timeout};
use tracing::{debug, error, info, warn};

use crate::constants::POST_PLAYBACK_PAUSE_MS;

pub use channels::{bot_can_speak, occupied_channels, occupied_voice_channels};

#[derive(Debug, thiserror::Error)]
pub enum VoiceError {
    #[error("audio file not found: {0}")]
    MissingFile(PathBuf),

    #[error("failed to join voice channel: {0}")]
    Join(#[from] JoinError),

    #[error("failed to watch track: {0}")]
    Track(#[from] ControlError),
}

/// How a playback ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackOutcome {
    Finished,
    TimedOut,
}

/// What to do with the connection once the clip is over
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AfterPlayback {
    Leave,
    Stay,
}

/// Completes a oneshot when the track ends or fails
struct TrackEndNotifier {
    done: std::sync::Mutex<Option<oneshot::Sender<()>>>,
}

#[async_trait]
impl VoiceEventHandler for TrackEndNotifier {
    async fn act(&self, _ctx: &EventContext<'_>) -> Option<Event> {
        let sender = match self.done.lock() {
            Ok(mut guard) => guard.take(),
            Err(poisoned) => poisoned.into_inner().take(),
        };
        if let Some(sender) = sender {
            let _ = sender.send(());
        }
        Some(Event::Cancel)
    }
}

/// Owns the voice manager and serializes sessions per guild
pub struct VoiceController {
    songbird: Arc<Songbird>,
    sessions: DashMap<GuildId, Arc<Mutex<()>>>,
    playback_timeout: Duration,
}

impl VoiceController {
    pub fn new(songbird: Arc<Songbird>, playback_timeout: Duration) -> Self {
        Self {
            songbird,
            sessions: DashMap::new(),
            playback_timeout,
        }
    }

    fn session_lock(&self, guild_id: GuildId) -> Arc<Mutex<()>> {
        self.sessions
            .entry(guild_id)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    /// Wait for the guild's voice session slot
    pub async fn acquire(&self, guild_id: GuildId) -> OwnedMutexGuard<()> {
        self.session_lock(guild_id).lock_owned().await
    }

    /// Take the guild's voice session slot only if nothing is playing there
    pub fn try_acquire(&self, guild_id: GuildId) -> Option<OwnedMutexGuard<()>> {
        self.session_lock(guild_id).try_lock_owned().ok()
    }

    /// Whether the bot currently holds a voice connection in the guild
    pub fn is_connected(&self, guild_id: GuildId) -> bool {
        self.songbird.get(guild_id).is_some()
    }

    /// Join a channel and remain there
    pub async fn join(&self, guild_id: GuildId, channel_id: ChannelId) -> Result<(), VoiceError> {
        self.songbird.join(guild_id, channel_id).await?;
        info!("Joined voice channel {} in guild {}", channel_id, guild_id);
        Ok(())
    }

    /// Drop the guild's voice connection if there is one
    pub async fn leave(&self, guild_id: GuildId) {
        if self.songbird.get(guild_id).is_none() {
            return;
        }
        match self.songbird.remove(guild_id).await {
            Ok(()) => debug!("Left voice in guild {}", guild_id),
            Err(e) => warn!("Failed to leave voice in guild {}: {}", guild_id, e),
        }
    }

    /// Play one clip in one channel.
    ///
    /// The caller must hold the guild's session slot.
    pub async fn play_clip(
        &self,
        guild_id: GuildId,
        channel_id: ChannelId,
        path: &Path,
        after: AfterPlayback,
    ) -> Result<PlaybackOutcome, VoiceError> {
        if !path.is_file() {
            return Err(VoiceError::MissingFile(path.to_path_buf()));
        }

        let call = self.songbird.join(guild_id, channel_id).await?;

        let (done_tx, done_rx) = oneshot::channel();
        let track = {
            let mut call = call.lock().await;
            call.stop();
            call.play_input(FileInput::new(path.to_path_buf()).into())
        };

        let notifier = Arc::new(TrackEndNotifier {
            done: std::sync::Mutex::new(Some(done_tx)),
        });
        let watched = track
            .add_event(Event::Track(TrackEvent::End), ArcNotifier(notifier.clone()))
            .and_then(|_| track.add_event(Event::Track(TrackEvent::Error), ArcNotifier(notifier)));
        if let Err(e) = watched {
            if after == AfterPlayback::Leave {
                self.leave(guild_id).await;
            }
            return Err(e.into());
        }

        info!(
            "Playing {} in channel {} of guild {}",
            path.display(),
            channel_id,
            guild_id
        );

        let outcome = match timeout(self.playback_timeout, done_rx).await {
            Ok(_) => PlaybackOutcome::Finished,
            Err(_) => {
                warn!(
                    "Playback of {} in channel {} exceeded {}s, stopping",
                    path.display(),
                    channel_id,
                    self.playback_timeout.as_secs()
                );
                let _ = track.stop();
                PlaybackOutcome::TimedOut
            }
        };

        sleep(Duration::from_millis(POST_PLAYBACK_PAUSE_MS)).await;

        if after == AfterPlayback::Leave {
            self.leave(guild_id).await;
        }

        Ok(outcome)
    }

    /// Play a clip in each channel in turn, returning how many plays succeeded.
    ///
    /// Failures are logged and the connection is torn down before moving on.
    pub async fn play_across(
        &self,
        guild_id: GuildId,
        channels: &[ChannelId],
        path: &Path,
    ) -> usize {
        let _slot = self.acquire(guild_id).await;
        let mut played = 0;

        for channel_id in channels {
            // A stale connection elsewhere in the guild is dropped first
            self.leave(guild_id).await;

            match self
                .play_clip(guild_id, *channel_id, path, AfterPlayback::Leave)
                .await
            {
                Ok(_) => played += 1,
                Err(e) => {
                    error!(
                        "Voice playback error in channel {} of guild {}: {}",
                        channel_id, guild_id, e
                    );
                    self.leave(guild_id).await;
                }
            }
        }

        played
    }
}

/// Lets one notifier instance be registered for several track events
struct ArcNotifier(Arc<TrackEndNotifier>);

#[async_trait]
impl VoiceEventHandler for ArcNotifier {
    async fn act(&self, ctx: &EventContext<'_>) -> Option<Event> {
        self.0.act(ctx).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn controller() -> VoiceController {
        VoiceController::new(Songbird::serenity(), Duration::from_secs(1))
    }

    #[tokio::test]
    async fn test_session_slot_is_exclusive_per_guild() {
        let voice = controller();
        let guild = GuildId::new(1);

        let held = voice.acquire(guild).await;
        assert!(voice.try_acquire(guild).is_none());
        // Other guilds are unaffected
        assert!(voice.try_acquire(GuildId::new(2)).is_some());

        // A waiting admin command stays blocked until the clip ends
        let waiting = timeout(Duration::from_millis(100), voice.acquire(guild)).await;
        assert!(waiting.is_err());

        drop(held);
        assert!(voice.try_acquire(guild).is_some());
    }

    #[tokio::test]
    async fn test_play_clip_rejects_missing_file() {
        let voice = controller();
        let result = voice
            .play_clip(
                GuildId::new(1),
                ChannelId::new(2),
                Path::new("does-not-exist.mp3"),
                AfterPlayback::Leave,
            )
            .await;
        assert!(matches!(result, Err(VoiceError::MissingFile(_))));
    }
}
