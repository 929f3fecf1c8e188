use std::sync::Arc;

use poise::serenity_prelude::{self as serenity, ChannelId, ChannelType, CreateMessage, GuildId};
use tracing::{info, warn};

use crate::{
    constants::REMINDER_CHANNEL_NAMES,
    models::Data,
    voice::occupied_voice_channels,
};

use super::Prayer;

/// Result of playing a clip across a guild's voice channels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoiceReport {
    NoAudio,
    NoListeners,
    Played { channels: usize, succeeded: usize },
}

/// Play a prayer's adhan in every occupied voice channel of a guild
pub async fn play_prayer_voice(
    cache: &serenity::Cache,
    data: &Data,
    guild_id: GuildId,
    prayer: Prayer,
) -> VoiceReport {
    let Some(audio) = prayer.resolve_audio(data.audio_dir()) else {
        warn!("Audio file not found for {:?}", prayer);
        return VoiceReport::NoAudio;
    };

    let bot_id = cache.current_user().id;
    let channels = occupied_voice_channels(cache, guild_id, bot_id);
    if channels.is_empty() {
        return VoiceReport::NoListeners;
    }

    info!(
        "Playing {:?} adhan in {} channel(s) of guild {}",
        prayer,
        channels.len(),
        guild_id
    );
    let succeeded = data.voice.play_across(guild_id, &channels, &audio).await;

    VoiceReport::Played {
        channels: channels.len(),
        succeeded,
    }
}

/// Whether a guild channel receives prayer reminders
pub fn is_reminder_channel(kind: ChannelType, name: &str) -> bool {
    matches!(kind, ChannelType::Text | ChannelType::News) && REMINDER_CHANNEL_NAMES.contains(&name)
}

/// Text channels of a guild whose name marks them for reminders
pub fn reminder_channels(cache: &serenity::Cache, guild_id: GuildId) -> Vec<ChannelId> {
    let Some(guild) = cache.guild(guild_id) else {
        return Vec::new();
    };

    guild
        .channels
        .values()
        .filter(|c| is_reminder_channel(c.kind, &c.name))
        .map(|c| c.id)
        .collect()
}

/// Post the prayer reminder in the guild's reminder channels
pub async fn post_reminders(
    http: &serenity::Http,
    cache: &serenity::Cache,
    guild_id: GuildId,
    prayer: Prayer,
) -> usize {
    let channels = reminder_channels(cache, guild_id);
    let content = prayer.reminder_message();
    let mut sent = 0;

    for channel_id in channels {
        match channel_id
            .send_message(http, CreateMessage::new().content(&content))
            .await
        {
            Ok(_) => sent += 1,
            Err(e) => warn!(
                "Failed to send {:?} reminder to channel {} in guild {}: {}",
                prayer, channel_id, guild_id, e
            ),
        }
    }

    sent
}

/// Voice playback and text reminders for one guild, run concurrently
pub async fn broadcast_to_guild(
    http: &Arc<serenity::Http>,
    cache: &Arc<serenity::Cache>,
    data: &Data,
    guild_id: GuildId,
    prayer: Prayer,
) {
    let (voice, reminders) = tokio::join!(
        play_prayer_voice(cache, data, guild_id, prayer),
        post_reminders(http, cache, guild_id, prayer)
    );

    info!(
        "{:?} broadcast in guild {}: voice {:?}, {} reminder(s)",
        prayer, guild_id, voice, reminders
    );
}
