use std::path::{Path, PathBuf};

use crate::constants::FALLBACK_ADHAN_AUDIO;

/// One of the five daily prayers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, poise::ChoiceParameter)]
pub enum Prayer {
    #[name = "الفجر"]
    Fajr,
    #[name = "الظهر"]
    Dhuhr,
    #[name = "العصر"]
    Asr,
    #[name = "المغرب"]
    Maghrib,
    #[name = "العشاء"]
    Isha,
}

/// Static text attached to each prayer
#[derive(Debug, Clone, Copy)]
pub struct PrayerInfo {
    pub display_name: &'static str,
    pub reminder: &'static str,
}

impl Prayer {
    pub const ALL: [Prayer; 5] = [
        Prayer::Fajr,
        Prayer::Dhuhr,
        Prayer::Asr,
        Prayer::Maghrib,
        Prayer::Isha,
    ];

    /// Key used by the timings API
    pub fn api_key(self) -> &'static str {
        match self {
            Prayer::Fajr => "Fajr",
            Prayer::Dhuhr => "Dhuhr",
            Prayer::Asr => "Asr",
            Prayer::Maghrib => "Maghrib",
            Prayer::Isha => "Isha",
        }
    }

    pub fn info(self) -> PrayerInfo {
        match self {
            Prayer::Fajr => PrayerInfo {
                display_name: "الفجر",
                reminder: "حان الآن موعد أذان الفجر 🌅\nالصلاة خير من النوم، لا تنسوا أذكار الصباح.",
            },
            Prayer::Dhuhr => PrayerInfo {
                display_name: "الظهر",
                reminder: "حان الآن موعد أذان الظهر ☀️\nقوموا إلى صلاتكم يرحمكم الله.",
            },
            Prayer::Asr => PrayerInfo {
                display_name: "العصر",
                reminder: "حان الآن موعد أذان العصر 🌤️\nحافظوا على الصلاة الوسطى.",
            },
            Prayer::Maghrib => PrayerInfo {
                display_name: "المغرب",
                reminder: "حان الآن موعد أذان المغرب 🌇\nلا تنسوا أذكار المساء.",
            },
            Prayer::Isha => PrayerInfo {
                display_name: "العشاء",
                reminder: "حان الآن موعد أذان العشاء 🌙\nتقبّل الله منا ومنكم.",
            },
        }
    }

    /// Dedicated clip for this prayer, e.g. `fajr.mp3`
    pub fn audio_file(self) -> String {
        format!("{}.mp3", self.api_key().to_lowercase())
    }

    /// The clip to play: the dedicated file if present, else the generic adhan.
    ///
    /// Returns `None` when neither exists.
    pub fn resolve_audio(self, audio_dir: &Path) -> Option<PathBuf> {
        [self.audio_file(), FALLBACK_ADHAN_AUDIO.to_string()]
            .into_iter()
            .map(|name| audio_dir.join(name))
            .find(|path| path.is_file())
    }

    /// Full reminder message posted in text channels
    pub fn reminder_message(self) -> String {
        let info = self.info();
        format!("🕌 **صلاة {}**\n{}", info.display_name, info.reminder)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn temp_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("adhan_bot_{}_{}", name, std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_audio_file_names() {
        assert_eq!(Prayer::Fajr.audio_file(), "fajr.mp3");
        assert_eq!(Prayer::Maghrib.audio_file(), "maghrib.mp3");
    }

    #[test]
    fn test_resolve_audio_prefers_dedicated_file() {
        let dir = temp_dir("dedicated");
        fs::write(dir.join("fajr.mp3"), b"x").unwrap();
        fs::write(dir.join("adhan.mp3"), b"x").unwrap();
        assert_eq!(Prayer::Fajr.resolve_audio(&dir), Some(dir.join("fajr.mp3")));
        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_resolve_audio_falls_back_to_adhan() {
        let dir = temp_dir("fallback");
        fs::write(dir.join("adhan.mp3"), b"x").unwrap();
        assert_eq!(Prayer::Isha.resolve_audio(&dir), Some(dir.join("adhan.mp3")));
        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_resolve_audio_missing() {
        let dir = temp_dir("missing");
        assert_eq!(Prayer::Asr.resolve_audio(&dir), None);
        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_reminder_message_contains_display_name() {
        for prayer in Prayer::ALL {
            let message = prayer.reminder_message();
            assert!(message.contains(prayer.info().display_name));
        }
    }
}
