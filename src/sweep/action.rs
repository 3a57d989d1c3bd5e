//! Sweep action types
//!
//! This module defines the bulk actions a sweep can apply to its targets.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The bulk action a sweep applies to every member in its queue
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SweepAction {
    /// Remove the member from the guild; they may rejoin
    Kick,
    /// Remove the member from the guild and prevent rejoining
    Ban,
}

impl SweepAction {
    /// Audit reason attached to every platform call made by this action
    #[must_use]
    pub fn reason(self) -> &'static str {
        "sweep-warden mass moderation"
    }

    /// Lowercase name used in audit records and log fields
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Kick => "kick",
            Self::Ban => "ban",
        }
    }

    /// Verb shown to moderators in confirmation prompts
    #[must_use]
    pub fn verb(self) -> &'static str {
        match self {
            Self::Kick => "KICK",
            Self::Ban => "BAN",
        }
    }
}

impl fmt::Display for SweepAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_names() {
        assert_eq!(SweepAction::Kick.as_str(), "kick");
        assert_eq!(SweepAction::Ban.as_str(), "ban");
        assert_eq!(SweepAction::Kick.to_string(), "kick");
        assert_eq!(SweepAction::Ban.to_string(), "ban");
    }

    #[test]
    fn test_action_verbs() {
        assert_eq!(SweepAction::Kick.verb(), "KICK");
        assert_eq!(SweepAction::Ban.verb(), "BAN");
    }

    #[test]
    fn test_action_reason_is_stable() {
        // The reason string ends up in the guild's own audit log, so both
        // actions must report the same recognizable text.
        assert_eq!(SweepAction::Kick.reason(), SweepAction::Ban.reason());
        assert!(SweepAction::Kick.reason().contains("sweep-warden"));
    }

    #[test]
    fn test_action_serialization() {
        let yaml = serde_yaml::to_string(&SweepAction::Ban).unwrap();
        assert!(yaml.contains("Ban"));

        let parsed: SweepAction = serde_yaml::from_str("Kick").unwrap();
        assert_eq!(parsed, SweepAction::Kick);
    }
}
