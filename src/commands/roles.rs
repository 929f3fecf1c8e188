use poise::serenity_prelude::{
    self as serenity, ButtonStyle, CreateActionRow, CreateButton, CreateMessage, Role, RoleId,
};
use tracing::info;

use crate::{
    constants::{MAX_PANEL_ROLES, ROLE_BUTTON_PREFIX},
    models::{Context, Error},
    utils::messages::{format_error, format_success},
    utils::permissions::Requirement,
    utils::string_utils::process_newlines,
};

use super::{ensure_admin, reply_private};

/// Custom id of the button toggling a role
pub fn role_button_id(role_id: RoleId) -> String {
    format!("{}{}", ROLE_BUTTON_PREFIX, role_id.get())
}

/// Role encoded in a role panel button id
pub fn parse_role_button_id(custom_id: &str) -> Option<RoleId> {
    custom_id
        .strip_prefix(ROLE_BUTTON_PREFIX)?
        .parse::<u64>()
        .ok()
        .filter(|id| *id != 0)
        .map(RoleId::new)
}

fn build_panel(title: &str, roles: &[Role]) -> CreateMessage {
    let buttons: Vec<CreateButton> = roles
        .iter()
        .map(|role| {
            CreateButton::new(role_button_id(role.id))
                .label(role.name.clone())
                .style(ButtonStyle::Secondary)
        })
        .collect();

    CreateMessage::new()
        .content(format!(
            "{}\n\nاضغط على الزر لإضافة الرتبة أو إزالتها.",
            process_newlines(title)
        ))
        .components(vec![CreateActionRow::Buttons(buttons)])
}

/// Post a message with buttons that let members pick roles
#[poise::command(slash_command, prefix_command, guild_only)]
#[allow(clippy::too_many_arguments)]
pub async fn setup_roles(
    ctx: Context<'_>,
    #[description = "Panel text"] title: String,
    #[description = "First role"] role1: Role,
    #[description = "Second role"] role2: Option<Role>,
    #[description = "Third role"] role3: Option<Role>,
    #[description = "Fourth role"] role4: Option<Role>,
    #[description = "Fifth role"] role5: Option<Role>,
) -> Result<(), Error> {
    if !ensure_admin(ctx, Requirement::Administrator, None).await? {
        return Ok(());
    }

    let mut roles: Vec<Role> = Vec::with_capacity(MAX_PANEL_ROLES);
    for role in [Some(role1), role2, role3, role4, role5].into_iter().flatten() {
        if !roles.iter().any(|r| r.id == role.id) {
            roles.push(role);
        }
    }

    if let Some(managed) = roles.iter().find(|r| r.managed) {
        reply_private(
            ctx,
            format_error(&format!("الرتبة {} تُدار تلقائياً ولا يمكن توزيعها", managed.name)),
        )
        .await?;
        return Ok(());
    }

    let message = build_panel(&title, &roles);
    ctx.channel_id()
        .send_message(ctx.http(), message)
        .await?;

    info!(
        "Posted role panel with {} role(s) in channel {}",
        roles.len(),
        ctx.channel_id()
    );
    reply_private(ctx, format_success("تم إنشاء لوحة الرتب")).await
}

/// Result of toggling a role on a member
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoleToggle {
    Added,
    Removed,
}

/// Add the role if the member lacks it, otherwise remove it
pub async fn toggle_member_role(
    http: &serenity::Http,
    member: &serenity::Member,
    role_id: RoleId,
) -> Result<RoleToggle, serenity::Error> {
    if member.roles.contains(&role_id) {
        member.remove_role(http, role_id).await?;
        Ok(RoleToggle::Removed)
    } else {
        member.add_role(http, role_id).await?;
        Ok(RoleToggle::Added)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_button_id_round_trip() {
        let id = RoleId::new(987654321);
        assert_eq!(role_button_id(id), "role:987654321");
        assert_eq!(parse_role_button_id("role:987654321"), Some(id));
    }

    #[test]
    fn test_parse_role_button_id_rejects_other_buttons() {
        assert_eq!(parse_role_button_id("prayer:fajr"), None);
        assert_eq!(parse_role_button_id("role:abc"), None);
        assert_eq!(parse_role_button_id("role:0"), None);
    }
}
