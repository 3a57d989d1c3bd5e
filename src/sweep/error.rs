//! Error types for the sweep engine
//!
//! This module defines the errors that can occur while staging, confirming,
//! cancelling, or executing a sweep.

use thiserror::Error;

/// Errors that can occur during sweep operations
#[derive(Debug, Error)]
pub enum SweepError {
    /// A sweep is already staged or executing for the guild
    #[error("A sweep is already in progress for this guild")]
    AlreadyActive,

    /// No actionable sweep exists for the guild
    #[error("No sweep in progress for this guild")]
    NoSession,

    /// Confirm or cancel attempted by someone other than the initiator
    #[error("Only the initiating moderator may act on this sweep")]
    NotExecutor,

    /// The eligibility filter produced no targets
    #[error("No eligible members to act on")]
    EmptyTargetSet,

    /// Discord API error
    #[error("Discord API error: {0}")]
    DiscordApi(#[from] Box<poise::serenity_prelude::Error>),
}

impl From<poise::serenity_prelude::Error> for SweepError {
    fn from(error: poise::serenity_prelude::Error) -> Self {
        Self::DiscordApi(Box::new(error))
    }
}

/// Result type for sweep operations
pub type SweepResult<T> = Result<T, SweepError>;
