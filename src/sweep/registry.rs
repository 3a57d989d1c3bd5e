//! Sweep session registry
//!
//! This module holds the per-guild session map and enforces the one-sweep-
//! per-guild rule. Occupancy checks and mutations happen under the map's
//! per-key lock, so two racing stage calls can never both succeed.

use std::sync::Arc;

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use poise::serenity_prelude::{GuildId, UserId};
use tracing::info;

use super::eligibility::MemberView;
use super::{SweepAction, SweepError, SweepResult, SweepSession};

/// Registry of active sweep sessions, at most one per guild
#[derive(Clone)]
pub struct SweepRegistry {
    sessions: Arc<DashMap<GuildId, SweepSession>>,
}

impl Default for SweepRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl SweepRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self {
            sessions: Arc::new(DashMap::new()),
        }
    }

    /// Stage a new session for `guild_id`
    ///
    /// # Errors
    /// Returns `AlreadyActive` when the guild already has a session in any
    /// state; the existing session is left untouched
    pub fn stage(
        &self,
        guild_id: GuildId,
        action: SweepAction,
        targets: Vec<MemberView>,
        executor_id: UserId,
    ) -> SweepResult<usize> {
        match self.sessions.entry(guild_id) {
            Entry::Occupied(_) => Err(SweepError::AlreadyActive),
            Entry::Vacant(entry) => {
                let count = targets.len();
                entry.insert(SweepSession::new(guild_id, action, targets, executor_id));

                info!(
                    guild_id = %guild_id,
                    action = %action,
                    targets = count,
                    executor_id = %executor_id,
                    "Sweep staged"
                );

                Ok(count)
            }
        }
    }

    /// Get a snapshot of the guild's current session
    pub fn get(&self, guild_id: GuildId) -> Option<SweepSession> {
        self.sessions.get(&guild_id).map(|entry| entry.value().clone())
    }

    /// Whether the guild currently has a session in any state
    #[must_use]
    pub fn has_session(&self, guild_id: GuildId) -> bool {
        self.sessions.contains_key(&guild_id)
    }

    /// Confirm the guild's staged session and hand its queue to the caller.
    ///
    /// Authorization and the Staged to Executing transition happen under one
    /// entry lock, so only one confirm can win.
    ///
    /// # Errors
    /// Returns `NoSession` when the guild has no session or it is already
    /// executing, and `NotExecutor` when `requester` did not stage it
    pub fn begin_execution(
        &self,
        guild_id: GuildId,
        requester: UserId,
    ) -> SweepResult<(SweepAction, Vec<MemberView>)> {
        let Some(mut session) = self.sessions.get_mut(&guild_id) else {
            return Err(SweepError::NoSession);
        };

        session.authorize(requester)?;
        session.begin_execution()?;

        Ok((session.action, session.queue.clone()))
    }

    /// Cancel the guild's staged session.
    ///
    /// The check-and-remove runs under the entry lock; an executing session
    /// is past the confirmation gate and cannot be cancelled.
    ///
    /// # Errors
    /// Returns `NoSession` when the guild has no staged session and
    /// `NotExecutor` when `requester` did not stage it
    pub fn cancel(&self, guild_id: GuildId, requester: UserId) -> SweepResult<()> {
        let removed = self.sessions.remove_if(&guild_id, |_, session| {
            session.executor_id == requester && session.is_staged()
        });

        if let Some((_, session)) = removed {
            info!(
                guild_id = %guild_id,
                action = %session.action,
                targets = session.queue.len(),
                "Sweep cancelled"
            );
            return Ok(());
        }

        // Removal was refused; report why without touching the session.
        match self.get(guild_id) {
            Some(session) if session.executor_id != requester => Err(SweepError::NotExecutor),
            Some(_) | None => Err(SweepError::NoSession),
        }
    }

    /// Drop the guild's session regardless of its state
    pub fn clear(&self, guild_id: GuildId) {
        self.sessions.remove(&guild_id);
    }

    /// Number of guilds with an active session
    #[must_use]
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    /// Whether no guild currently has a session
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}
