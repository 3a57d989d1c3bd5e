//! Sweep session state management
//!
//! This module defines the per-guild session record and its two-state
//! lifecycle: staged behind a confirmation, then executing until the run
//! finishes and the session is discarded.

use chrono::{DateTime, Utc};
use poise::serenity_prelude::{GuildId, UserId};
use tracing::info;

use super::eligibility::MemberView;
use super::{SweepAction, SweepError, SweepResult};

/// Sweep lifecycle states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SweepStatus {
    /// Staged and waiting for the initiator to confirm or cancel
    Staged,
    /// Confirmed; the runner owns the queue until completion
    Executing,
}

impl std::fmt::Display for SweepStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Staged => write!(f, "Staged"),
            Self::Executing => write!(f, "Executing"),
        }
    }
}

/// One staged or executing mass action for a guild
#[derive(Debug, Clone)]
pub struct SweepSession {
    /// Guild the sweep belongs to
    pub guild_id: GuildId,
    /// The action applied to every queued member
    pub action: SweepAction,
    /// Target queue in roster enumeration order
    pub queue: Vec<MemberView>,
    /// The moderator who staged the sweep; only they may confirm or cancel
    pub executor_id: UserId,
    /// Current lifecycle state
    pub status: SweepStatus,
    /// When the sweep was staged
    pub staged_at: DateTime<Utc>,
}

impl SweepSession {
    /// Create a freshly staged session
    pub fn new(
        guild_id: GuildId,
        action: SweepAction,
        queue: Vec<MemberView>,
        executor_id: UserId,
    ) -> Self {
        Self {
            guild_id,
            action,
            queue,
            executor_id,
            status: SweepStatus::Staged,
            staged_at: Utc::now(),
        }
    }

    /// Check that `requester` is the moderator who staged this sweep
    ///
    /// # Errors
    /// Returns `NotExecutor` for anyone else
    pub fn authorize(&self, requester: UserId) -> SweepResult<()> {
        if requester != self.executor_id {
            return Err(SweepError::NotExecutor);
        }
        Ok(())
    }

    /// Transition from Staged to Executing
    ///
    /// # Errors
    /// Returns `NoSession` if the session is already executing: a repeat
    /// confirm finds nothing left to confirm
    pub fn begin_execution(&mut self) -> SweepResult<()> {
        if self.status != SweepStatus::Staged {
            return Err(SweepError::NoSession);
        }

        self.status = SweepStatus::Executing;

        info!(
            guild_id = %self.guild_id,
            action = %self.action,
            targets = self.queue.len(),
            executor_id = %self.executor_id,
            "Sweep execution started"
        );

        Ok(())
    }

    /// Check whether the confirmation gate is still open
    #[must_use]
    pub fn is_staged(&self) -> bool {
        self.status == SweepStatus::Staged
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn target(id: u64) -> MemberView {
        MemberView {
            id: UserId::new(id),
            is_owner: false,
            is_admin: false,
            is_bot: false,
            role_ids: std::collections::HashSet::new(),
            top_role_position: 1,
        }
    }

    fn session() -> SweepSession {
        SweepSession::new(
            GuildId::new(67890),
            SweepAction::Kick,
            vec![target(100), target(101)],
            UserId::new(12345),
        )
    }

    #[test]
    fn test_session_starts_staged() {
        let session = session();
        assert_eq!(session.status, SweepStatus::Staged);
        assert!(session.is_staged());
        assert_eq!(session.queue.len(), 2);
    }

    #[test]
    fn test_begin_execution_transition() {
        let mut session = session();

        session.begin_execution().unwrap();
        assert_eq!(session.status, SweepStatus::Executing);
        assert!(!session.is_staged());

        // A second confirm finds no stageable session
        assert!(matches!(
            session.begin_execution(),
            Err(SweepError::NoSession)
        ));
        assert_eq!(session.status, SweepStatus::Executing);
    }

    #[test]
    fn test_authorize_checks_executor() {
        let session = session();

        assert!(session.authorize(UserId::new(12345)).is_ok());
        assert!(matches!(
            session.authorize(UserId::new(99999)),
            Err(SweepError::NotExecutor)
        ));
    }

    #[test]
    fn test_status_display() {
        assert_eq!(SweepStatus::Staged.to_string(), "Staged");
        assert_eq!(SweepStatus::Executing.to_string(), "Executing");
    }
}
