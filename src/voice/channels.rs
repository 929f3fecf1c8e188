use poise::serenity_prelude::{self as serenity, ChannelId, ChannelType, GuildId, UserId};

/// Channels with at least one non-bot occupant, in first-seen order
pub fn occupied_channels<I>(occupants: I) -> Vec<ChannelId>
where
    I: IntoIterator<Item = (ChannelId, bool)>,
{
    let mut channels = Vec::new();
    for (channel_id, is_bot) in occupants {
        if !is_bot && !channels.contains(&channel_id) {
            channels.push(channel_id);
        }
    }
    channels
}

/// Voice channels of a cached guild that have a human in them
pub fn occupied_voice_channels(
    cache: &serenity::Cache,
    guild_id: GuildId,
    bot_id: UserId,
) -> Vec<ChannelId> {
    let Some(guild) = cache.guild(guild_id) else {
        return Vec::new();
    };

    let occupants = guild.voice_states.iter().filter_map(|(user_id, state)| {
        let channel_id = state.channel_id?;
        let is_voice = guild
            .channels
            .get(&channel_id)
            .is_some_and(|c| matches!(c.kind, ChannelType::Voice | ChannelType::Stage));
        if !is_voice {
            return None;
        }

        let is_bot = *user_id == bot_id
            || guild
                .members
                .get(user_id)
                .or(state.member.as_ref())
                .is_some_and(|m| m.user.bot);
        Some((channel_id, is_bot))
    });

    let mut channels = occupied_channels(occupants);
    channels.sort_by_key(|id| {
        guild
            .channels
            .get(id)
            .map(|c| c.position)
            .unwrap_or(u16::MAX)
    });
    channels
}

/// Whether the bot may connect and speak in a channel.
///
/// Unknown (uncached) state is treated as allowed and left to the join attempt.
pub fn bot_can_speak(
    cache: &serenity::Cache,
    guild_id: GuildId,
    channel_id: ChannelId,
    bot_id: UserId,
) -> bool {
    let Some(guild) = cache.guild(guild_id) else {
        return true;
    };
    let (Some(channel), Some(member)) = (guild.channels.get(&channel_id), guild.members.get(&bot_id))
    else {
        return true;
    };

    let permissions = guild.user_permissions_in(channel, member);
    permissions.connect() && permissions.speak()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_occupied_channels_skips_bot_only_channels() {
        let a = ChannelId::new(1);
        let b = ChannelId::new(2);
        let occupants = vec![(a, true), (b, false), (a, true)];
        assert_eq!(occupied_channels(occupants), vec![b]);
    }

    #[test]
    fn test_occupied_channels_dedups() {
        let a = ChannelId::new(1);
        let b = ChannelId::new(2);
        let occupants = vec![(a, false), (b, true), (a, false), (b, false)];
        assert_eq!(occupied_channels(occupants), vec![a, b]);
    }

    #[test]
    fn test_occupied_channels_empty() {
        assert!(occupied_channels(Vec::new()).is_empty());
    }
}
