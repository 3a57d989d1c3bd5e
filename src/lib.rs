pub mod commands;
pub mod data;
pub mod handlers;
pub mod logging;
pub mod responses;
pub mod sweep;

// Customize these constants for your bot
pub const BOT_NAME: &str = "sweep_warden";
pub const COMMAND_TARGET: &str = "sweep_warden::command";
pub const ERROR_TARGET: &str = "sweep_warden::error";
pub const EVENT_TARGET: &str = "sweep_warden::handlers";
pub const CONSOLE_TARGET: &str = "sweep_warden";

pub use data::{AuditRecord, Data, DataInner, GuildSettings, ProtectionFlag};
pub type Error = Box<dyn std::error::Error + Send + Sync>;
pub type Context<'a> = poise::Context<'a, Data, Error>;
