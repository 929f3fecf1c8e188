use poise::serenity_prelude::{
    self as serenity, ChannelId, CreateAttachment, CreateMessage, GuildChannel, GuildId,
};
use tracing::{error, info, warn};

use crate::{
    constants::{AJRR_AUDIO, FALLBACK_ADHAN_AUDIO, WELCOME_AUDIO},
    models::{Context, Error, LockedChannel},
    utils::messages::{format_check, format_error, format_success, format_warning, join_or_none},
    utils::permissions::Requirement,
    utils::string_utils::process_newlines,
    utils::validation::{require_guild, validate_voice_channel},
};

use super::{ensure_admin, reply_private};

/// The channel `say` posts to: the explicit one, else where the command ran
pub fn resolve_say_target(explicit: Option<ChannelId>, invoked_from: ChannelId) -> ChannelId {
    explicit.unwrap_or(invoked_from)
}

/// Resume greeting members who join voice channels
#[poise::command(slash_command, prefix_command, guild_only)]
pub async fn start(ctx: Context<'_>) -> Result<(), Error> {
    if !ensure_admin(ctx, Requirement::Administrator, None).await? {
        return Ok(());
    }

    ctx.data().state.set_active(true);
    ctx.say(format_success("تم تفعيل الترحيب من جديد")).await?;
    info!("Greetings enabled by {}", ctx.author().id);
    Ok(())
}

/// Pause greeting members who join voice channels
#[poise::command(slash_command, prefix_command, guild_only)]
pub async fn stop(ctx: Context<'_>) -> Result<(), Error> {
    if !ensure_admin(ctx, Requirement::Administrator, None).await? {
        return Ok(());
    }

    ctx.data().state.set_active(false);
    ctx.say("🛑 تم إيقاف الترحيب مؤقتاً").await?;
    info!("Greetings disabled by {}", ctx.author().id);
    Ok(())
}

/// Whether the bot may post in a channel; unknown cache state counts as allowed
fn bot_can_send(ctx: Context<'_>, guild_id: GuildId, channel_id: ChannelId) -> bool {
    let bot_id = ctx.cache().current_user().id;
    let Some(guild) = ctx.cache().guild(guild_id) else {
        return true;
    };
    match (guild.channels.get(&channel_id), guild.members.get(&bot_id)) {
        (Some(channel), Some(member)) => guild.user_permissions_in(channel, member).send_messages(),
        _ => true,
    }
}

/// Make the bot send a message to a channel
#[poise::command(slash_command, guild_only)]
pub async fn say(
    ctx: Context<'_>,
    #[description = "The message to send"] message: String,
    #[description = "Target channel (defaults to this one)"]
    #[channel_types("Text", "News")]
    channel: Option<GuildChannel>,
    #[description = "Optional image to attach"] image: Option<serenity::Attachment>,
) -> Result<(), Error> {
    if !ensure_admin(ctx, Requirement::Administrator, None).await? {
        return Ok(());
    }

    let guild_id = require_guild(ctx.guild_id())?;
    let target = resolve_say_target(channel.map(|c| c.id), ctx.channel_id());

    if !bot_can_send(ctx, guild_id, target) {
        reply_private(
            ctx,
            format_error(&format!("لا أملك صلاحية الكتابة في روم <#{}>", target)),
        )
        .await?;
        return Ok(());
    }

    let mut outgoing = CreateMessage::new().content(process_newlines(&message));
    if let Some(image) = image {
        match image.download().await {
            Ok(bytes) => {
                outgoing = outgoing.add_file(CreateAttachment::bytes(bytes, image.filename.clone()))
            }
            Err(e) => {
                warn!("Failed to download attachment {}: {}", image.filename, e);
                reply_private(ctx, format_error(&format!("تعذّر تحميل الصورة: {}", e))).await?;
                return Ok(());
            }
        }
    }

    match target.send_message(ctx.http(), outgoing).await {
        Ok(_) => {
            reply_private(ctx, format_success(&format!("تم إرسال الرسالة بنجاح إلى <#{}>", target)))
                .await?;
            info!("Sent /say message to channel {} in guild {}", target, guild_id);
        }
        Err(e) => {
            error!("Failed to send /say message to {}: {}", target, e);
            reply_private(ctx, format_error(&format!("حدث خطأ أثناء الإرسال: {}", e))).await?;
        }
    }

    Ok(())
}

/// First line of `ffmpeg -version`, if ffmpeg can be run
async fn ffmpeg_version() -> Result<String, String> {
    match tokio::process::Command::new("ffmpeg")
        .arg("-version")
        .output()
        .await
    {
        Ok(output) if output.status.success() => Ok(String::from_utf8_lossy(&output.stdout)
            .lines()
            .next()
            .unwrap_or_default()
            .to_string()),
        Ok(output) => Err(format!("exit status {}", output.status)),
        Err(e) => Err(e.to_string()),
    }
}

/// `.mp3` files in the audio directory, sorted
async fn list_audio_files(dir: &std::path::Path) -> Vec<String> {
    let mut files = Vec::new();
    let Ok(mut entries) = tokio::fs::read_dir(dir).await else {
        return files;
    };
    while let Ok(Some(entry)) = entries.next_entry().await {
        let name = entry.file_name().to_string_lossy().to_string();
        if name.to_lowercase().ends_with(".mp3") {
            files.push(name);
        }
    }
    files.sort();
    files
}

/// Report on audio dependencies and bot state
#[poise::command(slash_command, prefix_command, guild_only)]
pub async fn debug(ctx: Context<'_>) -> Result<(), Error> {
    if !ensure_admin(ctx, Requirement::Administrator, None).await? {
        return Ok(());
    }

    let data = ctx.data();
    let ffmpeg = ffmpeg_version().await;
    let files = list_audio_files(data.audio_dir()).await;
    let has = |name: &str| files.iter().any(|f| f == name);

    let mut report = vec!["🔍 **تقرير الفحص:**".to_string()];
    report.push(match &ffmpeg {
        Ok(version) => format_check("FFmpeg", true, &format!("`{}`", version)),
        Err(e) => format_check("FFmpeg", false, &format!("`{}` (غير مطلوب للتشغيل)", e)),
    });
    report.push(format_check("Opus", true, "مدمج مع البوت"));
    report.push(format!(
        "- **مجلد الصوت:** `{}`",
        data.audio_dir().display()
    ));
    report.push(format!("- **ملفات الصوت:** {}", join_or_none(&files)));
    report.push(format_check(WELCOME_AUDIO, has(WELCOME_AUDIO), ""));
    report.push(format_check(FALLBACK_ADHAN_AUDIO, has(FALLBACK_ADHAN_AUDIO), ""));
    report.push(format_check(AJRR_AUDIO, has(AJRR_AUDIO), ""));
    report.push(format_check("الترحيب مفعّل", data.state.is_active(), ""));
    report.push(format_check(
        "متوقف للأذان",
        data.state.is_prayer_paused(),
        "",
    ));
    report.push(match data.state.locked() {
        Some(lock) => format!("- **القفل:** 🔒 <#{}>", lock.channel_id),
        None => "- **القفل:** 🔓 غير مقفل".to_string(),
    });
    if let Some(guild_id) = ctx.guild_id() {
        report.push(format_check("متصل بالصوت", data.voice.is_connected(guild_id), ""));
    }
    report.push(format_check("الذكاء الاصطناعي", data.ai.is_some(), ""));

    reply_private(ctx, report.join("\n")).await
}

/// Re-register the bot's commands with Discord
#[poise::command(slash_command, prefix_command, guild_only)]
pub async fn sync(
    ctx: Context<'_>,
    #[description = "Secret admin code"] code: String,
) -> Result<(), Error> {
    if !ensure_admin(ctx, Requirement::AdministratorWithCode, Some(&code)).await? {
        return Ok(());
    }
    // Registration can outlast the interaction deadline
    ctx.defer_ephemeral().await?;

    let commands = &ctx.framework().options().commands;
    let result = match ctx.data().dev_guild_id {
        Some(guild_id) => poise::builtins::register_in_guild(ctx.http(), commands, guild_id).await,
        None => poise::builtins::register_globally(ctx.http(), commands).await,
    };

    match result {
        Ok(()) => {
            info!("Synced {} command(s)", commands.len());
            reply_private(ctx, format_success(&format!("تمت مزامنة {} أمر", commands.len()))).await
        }
        Err(e) => {
            error!("Failed to sync commands: {}", e);
            reply_private(ctx, format_error(&format!("فشلت المزامنة: {}", e))).await
        }
    }
}

/// The caller's current voice channel, from the cache
fn author_voice_channel(ctx: Context<'_>) -> Option<ChannelId> {
    let author_id = ctx.author().id;
    ctx.guild()
        .and_then(|guild| guild.voice_states.get(&author_id).and_then(|vs| vs.channel_id))
}

/// Confine the bot to one voice channel and silence all automation
#[poise::command(slash_command, prefix_command, guild_only)]
pub async fn lock(
    ctx: Context<'_>,
    #[description = "Secret admin code"] code: String,
    #[description = "Voice channel to stay in (defaults to yours)"]
    #[channel_types("Voice", "Stage")]
    channel: Option<GuildChannel>,
) -> Result<(), Error> {
    if !ensure_admin(ctx, Requirement::AdministratorWithCode, Some(&code)).await? {
        return Ok(());
    }
    // Waiting for the voice slot or a join can outlast the interaction deadline
    ctx.defer_ephemeral().await?;

    let guild_id = require_guild(ctx.guild_id())?;
    let channel_id = match channel {
        Some(channel) => {
            if let Err(e) = validate_voice_channel(channel.kind) {
                reply_private(ctx, format_error(&e.to_string())).await?;
                return Ok(());
            }
            channel.id
        }
        None => match author_voice_channel(ctx) {
            Some(id) => id,
            None => {
                reply_private(ctx, format_warning("حدد روم صوتي أو ادخل روم صوتي أولاً")).await?;
                return Ok(());
            }
        },
    };

    let data = ctx.data();
    let _slot = data.voice.acquire(guild_id).await;

    let previous = data.state.set_locked(Some(LockedChannel {
        guild_id,
        channel_id,
    }));
    if let Some(previous) = previous
        && previous.guild_id != guild_id
    {
        data.voice.leave(previous.guild_id).await;
    }

    if let Err(e) = data.voice.join(guild_id, channel_id).await {
        error!("Failed to join locked channel {}: {}", channel_id, e);
        data.state.set_locked(previous);
        reply_private(ctx, format_error(&format!("تعذّر الدخول للروم: {}", e))).await?;
        return Ok(());
    }

    info!("Locked to channel {} in guild {} by {}", channel_id, guild_id, ctx.author().id);
    ctx.say(format!("🔒 {}", format_success(&format!("تم قفل البوت على الروم <#{}>", channel_id))))
        .await?;
    Ok(())
}

/// Release the channel lock and resume normal behavior
#[poise::command(slash_command, prefix_command, guild_only)]
pub async fn unlock(
    ctx: Context<'_>,
    #[description = "Secret admin code"] code: String,
) -> Result<(), Error> {
    if !ensure_admin(ctx, Requirement::AdministratorWithCode, Some(&code)).await? {
        return Ok(());
    }
    // Waiting for the voice slot or a join can outlast the interaction deadline
    ctx.defer_ephemeral().await?;

    let data = ctx.data();
    match data.state.set_locked(None) {
        Some(previous) => {
            let _slot = data.voice.acquire(previous.guild_id).await;
            data.voice.leave(previous.guild_id).await;
            info!("Unlocked from channel {} by {}", previous.channel_id, ctx.author().id);
            ctx.say(format!("🔓 {}", format_success("تم فك القفل، عاد البوت للعمل الطبيعي")))
                .await?;
        }
        None => {
            reply_private(ctx, format_warning("البوت غير مقفل")).await?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_say_defaults_to_invoking_channel() {
        let invoked = ChannelId::new(10);
        assert_eq!(resolve_say_target(None, invoked), invoked);
    }

    #[test]
    fn test_say_uses_explicit_channel() {
        let invoked = ChannelId::new(10);
        let explicit = ChannelId::new(20);
        assert_eq!(resolve_say_target(Some(explicit), invoked), explicit);
    }
}
