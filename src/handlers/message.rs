use poise::serenity_prelude::{self as serenity, Mentionable};
use tracing::{info, warn};

use crate::{
    ai::answer_in_chunks,
    constants::COMMAND_PREFIX,
    models::Data,
    utils::messages::format_warning,
    utils::string_utils::strip_mention,
};

/// What a message addressed to the bot asks for
#[derive(Debug, PartialEq, Eq)]
pub enum MentionRequest {
    Question(String),
    /// Only the mention, nothing to ask
    Empty,
}

/// Interpret a message that may mention the bot.
///
/// Prefix commands are left to the framework even when they mention the bot.
pub fn mention_request(content: &str, bot_id: u64, mentioned: bool) -> Option<MentionRequest> {
    if !mentioned || content.trim_start().starts_with(COMMAND_PREFIX) {
        return None;
    }

    let question = strip_mention(content, bot_id);
    if question.is_empty() {
        Some(MentionRequest::Empty)
    } else {
        Some(MentionRequest::Question(question))
    }
}

/// Answer questions addressed to the bot by mention
pub async fn handle_message(ctx: &serenity::Context, msg: &serenity::Message, data: &Data) {
    if msg.author.bot || msg.guild_id.is_none() {
        return;
    }

    let bot_id = ctx.cache.current_user().id;
    let mentioned = msg.mentions.iter().any(|user| user.id == bot_id);
    let Some(request) = mention_request(&msg.content, bot_id.get(), mentioned) else {
        return;
    };

    let question = match request {
        MentionRequest::Question(question) => question,
        MentionRequest::Empty => {
            let hint = format_warning(&format!("اكتب سؤالك بعد {}", bot_id.mention()));
            if let Err(e) = msg.reply(ctx, hint).await {
                warn!("Failed to reply in channel {}: {}", msg.channel_id, e);
            }
            return;
        }
    };

    info!(
        "AI mention from {} in channel {} ({} chars)",
        msg.author.id,
        msg.channel_id,
        question.chars().count()
    );

    let typing = msg.channel_id.start_typing(&ctx.http);
    let chunks = answer_in_chunks(data.ai.as_ref(), &question).await;
    typing.stop();

    let mut chunks = chunks.into_iter();
    if let Some(first) = chunks.next()
        && let Err(e) = msg.reply(ctx, first).await
    {
        warn!("Failed to reply in channel {}: {}", msg.channel_id, e);
        return;
    }
    for chunk in chunks {
        if let Err(e) = msg.channel_id.say(&ctx.http, chunk).await {
            warn!("Failed to send answer chunk in channel {}: {}", msg.channel_id, e);
            return;
        }
    }
}
