use tracing::info;

use crate::{
    ai::answer_in_chunks,
    models::{Context, Error},
    utils::messages::format_warning,
    utils::string_utils::is_empty_or_whitespace,
};

/// Ask the assistant a question
#[poise::command(slash_command, prefix_command, guild_only)]
pub async fn ask(
    ctx: Context<'_>,
    #[description = "Your question"]
    #[rest]
    question: String,
) -> Result<(), Error> {
    if is_empty_or_whitespace(&question) {
        ctx.say(format_warning("اكتب سؤالك بعد الأمر")).await?;
        return Ok(());
    }

    ctx.defer().await?;
    info!("AI question from {} ({} chars)", ctx.author().id, question.chars().count());

    for chunk in answer_in_chunks(ctx.data().ai.as_ref(), &question).await {
        ctx.say(chunk).await?;
    }

    Ok(())
}
