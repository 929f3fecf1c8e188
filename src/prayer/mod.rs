/// Prayer times: lookup, scheduling and broadcast
mod api;
mod broadcast;
mod scheduler;
mod types;

pub use api::{DayTimings, PrayerApi};
pub use broadcast::{VoiceReport, play_prayer_voice};
pub use scheduler::start_prayer_scheduler;
pub use types::Prayer;
