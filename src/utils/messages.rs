/// Pure functions for formatting replies (Discord-agnostic)

/// Format an error reply with emoji
pub fn format_error(message: &str) -> String {
    format!("❌ {}", message)
}

/// Format a success reply with emoji
pub fn format_success(message: &str) -> String {
    format!("✅ {}", message)
}

/// Format a warning reply with emoji
pub fn format_warning(message: &str) -> String {
    format!("⚠️ {}", message)
}

/// Reply for commands restricted to administrators
pub fn build_admin_only_error() -> String {
    "🚫 عذراً، هذا الأمر للمشرفين فقط".to_string()
}

/// Reply when the supplied secret code is wrong or missing
pub fn build_bad_code_error() -> String {
    format_error("الرمز السري غير صحيح")
}

/// Reply when code-protected commands are disabled because no code is configured
pub fn build_code_not_configured_error() -> String {
    format_error("هذا الأمر معطّل لأن الرمز السري غير مُعدّ على البوت")
}

/// Reply when a command needs a guild
pub fn build_guild_only_error() -> String {
    format_error("هذا الأمر يعمل داخل السيرفر فقط")
}

/// Reply when the bot is locked to another channel
pub fn build_locked_notice(channel_id: u64) -> String {
    format_warning(&format!("البوت مقفل على الروم <#{}>", channel_id))
}

/// Format a yes/no line for diagnostic reports
pub fn format_check(label: &str, ok: bool, detail: &str) -> String {
    let mark = if ok { "✅" } else { "❌" };
    if detail.is_empty() {
        format!("- **{}:** {}", label, mark)
    } else {
        format!("- **{}:** {} {}", label, mark, detail)
    }
}

/// Join a list of names, or a placeholder when empty
pub fn join_or_none(items: &[String]) -> String {
    if items.is_empty() {
        "لا يوجد".to_string()
    } else {
        items.join("، ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_error() {
        assert_eq!(format_error("Something failed"), "❌ Something failed");
    }

    #[test]
    fn test_format_success() {
        assert_eq!(format_success("It worked"), "✅ It worked");
    }

    #[test]
    fn test_format_warning() {
        assert_eq!(format_warning("Be careful"), "⚠️ Be careful");
    }

    #[test]
    fn test_admin_only_error() {
        let msg = build_admin_only_error();
        assert!(msg.starts_with("🚫"));
        assert!(msg.contains("للمشرفين"));
    }

    #[test]
    fn test_locked_notice_mentions_channel() {
        assert!(build_locked_notice(123).contains("<#123>"));
    }

    #[test]
    fn test_format_check() {
        assert_eq!(format_check("FFmpeg", true, ""), "- **FFmpeg:** ✅");
        assert_eq!(
            format_check("FFmpeg", false, "`not found`"),
            "- **FFmpeg:** ❌ `not found`"
        );
    }

    #[test]
    fn test_join_or_none() {
        assert_eq!(join_or_none(&[]), "لا يوجد");
        assert_eq!(
            join_or_none(&["a.mp3".to_string(), "b.mp3".to_string()]),
            "a.mp3، b.mp3"
        );
    }
}
