use poise::serenity_prelude::{
    self as serenity, CreateInteractionResponse, CreateInteractionResponseMessage,
};
use tracing::{error, info};

use crate::{
    commands::{RoleToggle, parse_role_button_id, toggle_member_role},
    models::Error,
    utils::messages::{build_guild_only_error, format_error, format_success},
};

/// Handle component interactions (button clicks)
pub async fn handle_interaction(ctx: &serenity::Context, interaction: serenity::ComponentInteraction) {
    let Some(role_id) = parse_role_button_id(&interaction.data.custom_id) else {
        return;
    };

    if let Err(e) = handle_role_button(ctx, &interaction, role_id).await {
        error!("Failed to handle role button: {}", e);
    }
}

async fn respond_ephemeral(
    ctx: &serenity::Context,
    interaction: &serenity::ComponentInteraction,
    content: String,
) -> Result<(), Error> {
    let response = CreateInteractionResponse::Message(
        CreateInteractionResponseMessage::new()
            .content(content)
            .ephemeral(true),
    );
    interaction.create_response(ctx, response).await?;
    Ok(())
}

/// Toggle the clicked role on the member who clicked
async fn handle_role_button(
    ctx: &serenity::Context,
    interaction: &serenity::ComponentInteraction,
    role_id: serenity::RoleId,
) -> Result<(), Error> {
    let Some(member) = interaction.member.as_ref() else {
        return respond_ephemeral(ctx, interaction, build_guild_only_error()).await;
    };

    let role_name = interaction
        .guild_id
        .and_then(|guild_id| {
            ctx.cache
                .guild(guild_id)
                .and_then(|guild| guild.roles.get(&role_id).map(|role| role.name.clone()))
        })
        .unwrap_or_else(|| role_id.to_string());

    let message = match toggle_member_role(&ctx.http, member, role_id).await {
        Ok(RoleToggle::Added) => {
            info!("Gave role {} to {}", role_id, member.user.id);
            format_success(&format!("تمت إضافة رتبة **{}**", role_name))
        }
        Ok(RoleToggle::Removed) => {
            info!("Removed role {} from {}", role_id, member.user.id);
            format_success(&format!("تمت إزالة رتبة **{}**", role_name))
        }
        Err(e) => {
            error!("Failed to toggle role {} for {}: {}", role_id, member.user.id, e);
            format_error("تعذّر تعديل الرتبة، تأكد أن رتبة البوت أعلى منها")
        }
    };

    respond_ephemeral(ctx, interaction, message).await
}
