use poise::serenity_prelude::{ChannelType, GuildId};

/// Validation error types
#[derive(Debug, PartialEq, Eq)]
pub enum ValidationError {
    NotInGuild,
    NotVoiceChannel { got: ChannelType },
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationError::NotInGuild => write!(f, "This command must be used in a server"),
            ValidationError::NotVoiceChannel { got } => {
                write!(f, "Expected a voice channel, got {:?}", got)
            }
        }
    }
}

impl std::error::Error for ValidationError {}

/// Validate that a channel can carry voice
pub fn validate_voice_channel(kind: ChannelType) -> Result<(), ValidationError> {
    match kind {
        ChannelType::Voice | ChannelType::Stage => Ok(()),
        got => Err(ValidationError::NotVoiceChannel { got }),
    }
}

/// Extract guild ID from context, returning error if not in a guild
pub fn require_guild(guild_id: Option<GuildId>) -> Result<GuildId, ValidationError> {
    guild_id.ok_or(ValidationError::NotInGuild)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_require_guild() {
        assert!(require_guild(None).is_err());
        assert!(require_guild(Some(GuildId::new(123))).is_ok());
    }

    #[test]
    fn test_validate_voice_channel() {
        assert!(validate_voice_channel(ChannelType::Voice).is_ok());
        assert!(validate_voice_channel(ChannelType::Stage).is_ok());
        assert_eq!(
            validate_voice_channel(ChannelType::Text),
            Err(ValidationError::NotVoiceChannel {
                got: ChannelType::Text
            })
        );
    }
}
