// Command modules
mod admin;
mod ai;
mod prayer;
mod roles;

use poise::CreateReply;
use tracing::warn;

use crate::{
    models::{Context, Error},
    utils::messages::{build_admin_only_error, build_bad_code_error, build_code_not_configured_error},
    utils::permissions::{Denial, Requirement, authorize},
};

// Re-export all commands
pub use admin::{debug, lock, say, start, stop, sync, unlock};
pub use ai::ask;
pub use prayer::{ajrr, prayer_times, test_prayer};
pub use roles::{RoleToggle, parse_role_button_id, setup_roles, toggle_member_role};

/// Every command the framework registers
pub fn all() -> Vec<poise::Command<std::sync::Arc<crate::models::Data>, Error>> {
    vec![
        start(),
        stop(),
        say(),
        debug(),
        sync(),
        lock(),
        unlock(),
        setup_roles(),
        test_prayer(),
        ajrr(),
        prayer_times(),
        ask(),
    ]
}

/// Whether the command author holds the Administrator permission in this guild
async fn author_is_admin(ctx: Context<'_>) -> bool {
    let Some(member) = ctx.author_member().await else {
        return false;
    };

    // Interactions carry resolved permissions; prefix commands need the cache
    if let Some(permissions) = member.permissions {
        return permissions.administrator();
    }

    ctx.guild()
        .map(|guild| guild.member_permissions(&member).administrator())
        .unwrap_or(false)
}

fn denial_message(denial: Denial) -> String {
    match denial {
        Denial::NotAdministrator => build_admin_only_error(),
        Denial::CodeNotConfigured => build_code_not_configured_error(),
        Denial::BadCode => build_bad_code_error(),
    }
}

/// Run the admin gate, replying with the refusal when it fails.
///
/// Returns `false` when the command must stop without acting.
pub(crate) async fn ensure_admin(
    ctx: Context<'_>,
    requirement: Requirement,
    code: Option<&str>,
) -> Result<bool, Error> {
    let is_admin = author_is_admin(ctx).await;
    match authorize(requirement, is_admin, code, ctx.data().admin_code.as_deref()) {
        Ok(()) => Ok(true),
        Err(denial) => {
            warn!(
                "Refused /{} for user {}: {:?}",
                ctx.command().name,
                ctx.author().id,
                denial
            );
            ctx.send(
                CreateReply::default()
                    .content(denial_message(denial))
                    .ephemeral(true),
            )
            .await?;
            Ok(false)
        }
    }
}

/// Reply visible only to the invoker (plain reply for prefix commands)
pub(crate) async fn reply_private(ctx: Context<'_>, content: impl Into<String>) -> Result<(), Error> {
    ctx.send(CreateReply::default().content(content).ephemeral(true))
        .await?;
    Ok(())
}
