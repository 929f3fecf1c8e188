use std::path::Path;

use poise::serenity_prelude::GuildId;
use tracing::{error, info};

use crate::{
    constants::AJRR_AUDIO,
    models::{Context, Data, Error},
    prayer::{Prayer, VoiceReport, play_prayer_voice},
    utils::messages::{build_locked_notice, format_error, format_success, format_warning},
    utils::permissions::Requirement,
    utils::validation::require_guild,
    voice::{AfterPlayback, occupied_voice_channels},
};

use super::{ensure_admin, reply_private};

/// What a manual clip command should do given the lock state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ClipTarget {
    /// Play in every occupied channel and leave after each
    Occupied,
    /// Play only in the locked channel and stay connected
    Locked(poise::serenity_prelude::ChannelId),
    /// Locked to a channel in another guild
    Elsewhere(poise::serenity_prelude::ChannelId),
}

fn clip_target(data: &Data, guild_id: GuildId) -> ClipTarget {
    match data.state.locked() {
        None => ClipTarget::Occupied,
        Some(lock) if lock.guild_id == guild_id => ClipTarget::Locked(lock.channel_id),
        Some(lock) => ClipTarget::Elsewhere(lock.channel_id),
    }
}

fn describe_report(report: VoiceReport, audio: &str) -> String {
    match report {
        VoiceReport::NoAudio => format_warning(&format!("ملف الصوت غير موجود: {}", audio)),
        VoiceReport::NoListeners => format_warning("ما فيه أحد في الرومات الصوتية حالياً!"),
        VoiceReport::Played {
            channels,
            succeeded,
        } if succeeded == channels => {
            format_success(&format!("تم الانتهاء من التشغيل في {} روم", channels))
        }
        VoiceReport::Played {
            channels,
            succeeded,
        } => format_warning(&format!(
            "تم التشغيل في {} من {} روم، راجع السجل للأخطاء",
            succeeded, channels
        )),
    }
}

/// Play a clip in the locked channel without leaving it
async fn play_in_locked(
    data: &Data,
    guild_id: GuildId,
    channel_id: poise::serenity_prelude::ChannelId,
    path: &Path,
) -> String {
    let _slot = data.voice.acquire(guild_id).await;
    match data
        .voice
        .play_clip(guild_id, channel_id, path, AfterPlayback::Stay)
        .await
    {
        Ok(_) => format_success(&format!("تم التشغيل في <#{}>", channel_id)),
        Err(e) => {
            error!("Playback in locked channel {} failed: {}", channel_id, e);
            format_error(&format!("خطأ في تشغيل الصوت: {}", e))
        }
    }
}

/// Play the adhan for a prayer right now in every occupied voice channel
#[poise::command(slash_command, prefix_command, guild_only)]
pub async fn test_prayer(
    ctx: Context<'_>,
    #[description = "Which prayer to call"] prayer: Prayer,
) -> Result<(), Error> {
    if !ensure_admin(ctx, Requirement::Administrator, None).await? {
        return Ok(());
    }

    let guild_id = require_guild(ctx.guild_id())?;
    ctx.defer_ephemeral().await?;
    info!("Manual {:?} adhan requested by {}", prayer, ctx.author().id);

    let data = ctx.data();
    let reply = match clip_target(data, guild_id) {
        ClipTarget::Elsewhere(channel_id) => build_locked_notice(channel_id.get()),
        ClipTarget::Locked(channel_id) => match prayer.resolve_audio(data.audio_dir()) {
            Some(path) => play_in_locked(data, guild_id, channel_id, &path).await,
            None => describe_report(VoiceReport::NoAudio, &prayer.audio_file()),
        },
        ClipTarget::Occupied => {
            let _pause = data.state.pause_for_prayer();
            let report = play_prayer_voice(ctx.cache(), data, guild_id, prayer).await;
            describe_report(report, &prayer.audio_file())
        }
    };

    reply_private(ctx, reply).await
}

/// Play the ajrr clip in every occupied voice channel
#[poise::command(slash_command, prefix_command, guild_only)]
pub async fn ajrr(ctx: Context<'_>) -> Result<(), Error> {
    if !ensure_admin(ctx, Requirement::Administrator, None).await? {
        return Ok(());
    }

    let guild_id = require_guild(ctx.guild_id())?;
    ctx.defer_ephemeral().await?;

    let data = ctx.data();
    let path = data.audio_path(AJRR_AUDIO);
    if !path.is_file() {
        return reply_private(ctx, describe_report(VoiceReport::NoAudio, AJRR_AUDIO)).await;
    }

    let reply = match clip_target(data, guild_id) {
        ClipTarget::Elsewhere(channel_id) => build_locked_notice(channel_id.get()),
        ClipTarget::Locked(channel_id) => play_in_locked(data, guild_id, channel_id, &path).await,
        ClipTarget::Occupied => {
            let bot_id = ctx.cache().current_user().id;
            let channels = occupied_voice_channels(ctx.cache(), guild_id, bot_id);
            let report = if channels.is_empty() {
                VoiceReport::NoListeners
            } else {
                let succeeded = data.voice.play_across(guild_id, &channels, &path).await;
                VoiceReport::Played {
                    channels: channels.len(),
                    succeeded,
                }
            };
            describe_report(report, AJRR_AUDIO)
        }
    };

    reply_private(ctx, reply).await
}

/// Show today's prayer times
#[poise::command(slash_command, prefix_command, guild_only)]
pub async fn prayer_times(ctx: Context<'_>) -> Result<(), Error> {
    let api = &ctx.data().prayer_api;

    let timings = match api.today().await {
        Ok(timings) => timings,
        Err(e) => {
            error!("Failed to fetch prayer times: {}", e);
            return reply_private(ctx, format_error("تعذّر جلب مواقيت الصلاة حالياً")).await;
        }
    };

    let lines: Vec<String> = timings
        .iter()
        .map(|(prayer, time)| format!("- **{}:** {}", prayer.info().display_name, time.format("%H:%M")))
        .collect();

    ctx.say(format!(
        "🕌 **مواقيت الصلاة في {}** ({})\n{}",
        api.location().city,
        timings.date.format("%Y-%m-%d"),
        lines.join("\n")
    ))
    .await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_describe_report() {
        assert!(describe_report(VoiceReport::NoAudio, "fajr.mp3").contains("fajr.mp3"));
        assert!(describe_report(VoiceReport::NoListeners, "x").starts_with("⚠️"));
        assert!(
            describe_report(
                VoiceReport::Played {
                    channels: 2,
                    succeeded: 2
                },
                "x"
            )
            .starts_with("✅")
        );
        assert!(
            describe_report(
                VoiceReport::Played {
                    channels: 3,
                    succeeded: 1
                },
                "x"
            )
            .contains("1 من 3")
        );
    }
}
