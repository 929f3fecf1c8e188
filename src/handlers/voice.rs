use poise::serenity_prelude::{self as serenity, ChannelId, GuildId, VoiceState};
use tracing::{debug, error, info, warn};

use crate::{
    constants::WELCOME_AUDIO,
    models::{BotState, Data},
    voice::{AfterPlayback, bot_can_speak},
};

/// Why a voice-state update does not lead to a greeting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GreetSkip {
    Inactive,
    PrayerPaused,
    Locked,
    Bot,
    NoJoin,
}

/// The channel to greet, or why not to.
///
/// A greeting happens only when a non-bot member lands in a channel other
/// than the one they were in, while the bot is active and unlocked.
pub fn greeting_target(
    state: &BotState,
    is_bot: bool,
    old_channel: Option<ChannelId>,
    new_channel: Option<ChannelId>,
) -> Result<ChannelId, GreetSkip> {
    if !state.is_active() {
        return Err(GreetSkip::Inactive);
    }
    if state.is_prayer_paused() {
        return Err(GreetSkip::PrayerPaused);
    }
    if state.is_locked() {
        return Err(GreetSkip::Locked);
    }
    if is_bot {
        return Err(GreetSkip::Bot);
    }

    match new_channel {
        Some(channel) if old_channel != Some(channel) => Ok(channel),
        _ => Err(GreetSkip::NoJoin),
    }
}

/// Handle voice state updates (members joining or moving between channels)
pub async fn handle_voice_state_update(
    ctx: &serenity::Context,
    old_state: Option<VoiceState>,
    new_state: VoiceState,
    data: &Data,
) {
    let Some(guild_id) = new_state.guild_id else {
        return;
    };

    let bot_id = ctx.cache.current_user().id;
    let is_bot = new_state.user_id == bot_id
        || new_state
            .member
            .as_ref()
            .is_some_and(|member| member.user.bot);

    let channel_id = match greeting_target(
        &data.state,
        is_bot,
        old_state.and_then(|s| s.channel_id),
        new_state.channel_id,
    ) {
        Ok(channel_id) => channel_id,
        Err(reason) => {
            debug!("No greeting for {}: {:?}", new_state.user_id, reason);
            return;
        }
    };

    greet(ctx, data, guild_id, channel_id).await;
}

/// Play the welcome clip once in a channel
async fn greet(ctx: &serenity::Context, data: &Data, guild_id: GuildId, channel_id: ChannelId) {
    let bot_id = ctx.cache.current_user().id;
    if !bot_can_speak(&ctx.cache, guild_id, channel_id, bot_id) {
        warn!("Missing connect/speak permission in channel {}", channel_id);
        return;
    }

    let path = data.audio_path(WELCOME_AUDIO);
    if !path.is_file() {
        error!("'{}' file not found in {}", WELCOME_AUDIO, data.audio_dir().display());
        return;
    }

    // Another session (greeting or adhan) already owns this guild's voice
    let Some(_slot) = data.voice.try_acquire(guild_id) else {
        debug!("Voice busy in guild {}, skipping greeting", guild_id);
        return;
    };

    match data
        .voice
        .play_clip(guild_id, channel_id, &path, AfterPlayback::Leave)
        .await
    {
        Ok(outcome) => info!(
            "Greeted channel {} in guild {} ({:?})",
            channel_id, guild_id, outcome
        ),
        Err(e) => {
            error!("Greeting in channel {} failed: {}", channel_id, e);
            data.voice.leave(guild_id).await;
        }
    }
}
