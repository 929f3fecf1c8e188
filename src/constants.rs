/// Clip played to members joining a voice channel
pub const WELCOME_AUDIO: &str = "welcome.mp3";

/// Fallback clip when a prayer has no dedicated file
pub const FALLBACK_ADHAN_AUDIO: &str = "adhan.mp3";

/// Clip replayed by the `ajrr` command
pub const AJRR_AUDIO: &str = "ajrr.mp3";

/// Text channels that receive prayer reminders, matched by exact name
pub const REMINDER_CHANNEL_NAMES: [&str; 2] = ["chat", "اذكار"];

/// Discord's per-message content limit
pub const MAX_MESSAGE_LENGTH: usize = 2000;

/// Window during which a prayer that already fired cannot fire again
pub const PRAYER_SUPPRESSION_SECS: i64 = 60;

/// Pause between the end of a clip and leaving the channel
pub const POST_PLAYBACK_PAUSE_MS: u64 = 1000;

/// Cron expression for the prayer check (top of every minute)
pub const PRAYER_CHECK_CRON: &str = "0 * * * * *";

/// Interval between keep-alive pings to the public domain
pub const KEEP_ALIVE_INTERVAL_SECS: u64 = 300;

/// Maximum number of roles on one role panel
pub const MAX_PANEL_ROLES: usize = 5;

/// Prefix for role panel button custom ids
pub const ROLE_BUTTON_PREFIX: &str = "role:";

/// Prefix for text commands
pub const COMMAND_PREFIX: &str = "!";

/// Upper bound on any outbound HTTP request (prayer API, AI, keep-alive)
pub const HTTP_TIMEOUT_SECS: u64 = 15;

/// Upper bound on establishing an outbound connection
pub const HTTP_CONNECT_TIMEOUT_SECS: u64 = 5;

/// Body returned by the liveness endpoint
pub const LIVENESS_BODY: &str = "Bot is running!";

/// Persona sent with every AI request
pub const AI_PERSONA: &str = "أنت مساعد ودود في سيرفر ديسكورد لمجتمع مسلم. \
أجب باللغة التي كُتب بها السؤال، باختصار ووضوح، وبأسلوب محترم. \
إذا سُئلت عن مسألة شرعية دقيقة فانصح بالرجوع إلى أهل العلم.";

/// Log directive for the application
pub const LOG_DIRECTIVE: &str = "adhan_bot=info";
