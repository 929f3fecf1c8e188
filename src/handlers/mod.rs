/// Handler modules for Discord gateway events
mod interaction;
mod message;
mod voice;

// Re-export main handler functions
pub use interaction::handle_interaction;
pub use message::handle_message;
pub use voice::handle_voice_state_update;
