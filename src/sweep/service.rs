//! Sweep service
//!
//! This module ties the engine together: staging a sweep from the live
//! roster, gating it behind the initiator's confirmation, and driving the
//! confirmed queue to completion.

use poise::serenity_prelude::{GuildId, UserId};
use tracing::{debug, info};

use crate::data::GuildSettings;

use super::client::{MemberSource, ModerationClient};
use super::eligibility::{self, MemberView, RoleScope};
use super::registry::SweepRegistry;
use super::throttle::ThrottlePolicy;
use super::{SweepAction, SweepError, SweepResult};

/// Receives one record per successfully applied action. Implementations
/// must return quickly; durability is handled behind the sink.
pub trait AuditSink: Send + Sync {
    fn record(&self, guild_id: GuildId, action: SweepAction, target_id: UserId);
}

/// Summary handed back when a sweep is staged
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StagedSweep {
    /// The action awaiting confirmation
    pub action: SweepAction,
    /// How many members the sweep will touch
    pub target_count: usize,
}

/// A confirmed queue snapshot, ready for execution.
///
/// Must be handed to [`SweepService::execute`]; an abandoned snapshot
/// leaves the guild's slot locked until the process restarts.
#[must_use]
#[derive(Debug)]
pub struct ConfirmedSweep {
    guild_id: GuildId,
    action: SweepAction,
    queue: Vec<MemberView>,
}

/// Tally of one finished execution run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SweepReport {
    /// Queue length at confirmation time
    pub attempted: usize,
    /// How many platform calls succeeded
    pub succeeded: usize,
}

/// Service coordinating sweep sessions for all guilds
#[derive(Clone)]
pub struct SweepService {
    registry: SweepRegistry,
    throttle: ThrottlePolicy,
}

impl Default for SweepService {
    fn default() -> Self {
        Self::new(ThrottlePolicy::default())
    }
}

impl SweepService {
    /// Create a service pacing its runs with `throttle`
    pub fn new(throttle: ThrottlePolicy) -> Self {
        Self {
            registry: SweepRegistry::new(),
            throttle,
        }
    }

    /// Stage a sweep over the guild's current roster.
    ///
    /// Fetches the roster, applies the eligibility rules, and parks the
    /// resulting queue behind the confirmation gate. The registry re-checks
    /// occupancy under its entry lock; the early check here only spares the
    /// roster fetch.
    ///
    /// # Errors
    /// Returns `AlreadyActive` when the guild already has a sweep,
    /// `EmptyTargetSet` when no member passes the filter, and `DiscordApi`
    /// when roster enumeration fails
    pub async fn request(
        &self,
        members: &dyn MemberSource,
        guild_id: GuildId,
        action: SweepAction,
        executor_id: UserId,
        scope: Option<RoleScope>,
        settings: &GuildSettings,
    ) -> SweepResult<StagedSweep> {
        if self.registry.has_session(guild_id) {
            return Err(SweepError::AlreadyActive);
        }

        let actor = members.fetch_actor(guild_id).await?;
        let roster = members.fetch_roster(guild_id).await?;

        let targets = eligibility::eligible_targets(&roster, settings, &actor, scope);
        if targets.is_empty() {
            return Err(SweepError::EmptyTargetSet);
        }

        let target_count = self.registry.stage(guild_id, action, targets, executor_id)?;

        Ok(StagedSweep {
            action,
            target_count,
        })
    }

    /// Confirm the guild's staged sweep and take ownership of its queue.
    ///
    /// # Errors
    /// Returns `NoSession` when nothing is staged (including a repeat
    /// confirm that lost the race) and `NotExecutor` for anyone but the
    /// initiator
    pub fn confirm(&self, guild_id: GuildId, requester_id: UserId) -> SweepResult<ConfirmedSweep> {
        let (action, queue) = self.registry.begin_execution(guild_id, requester_id)?;

        Ok(ConfirmedSweep {
            guild_id,
            action,
            queue,
        })
    }

    /// Cancel the guild's staged sweep and free its slot.
    ///
    /// # Errors
    /// Returns `NoSession` when nothing is staged or the sweep already
    /// started executing, and `NotExecutor` for anyone but the initiator
    pub fn cancel(&self, guild_id: GuildId, requester_id: UserId) -> SweepResult<()> {
        self.registry.cancel(guild_id, requester_id)
    }

    /// Drive a confirmed sweep to completion.
    ///
    /// Targets are processed strictly in queue order with a throttle pause
    /// after every attempt. Per-target failures are tolerated: the failure
    /// is logged, the member stays, and the run continues. Every success is
    /// reported to the audit sink. The guild's slot is freed when the run
    /// finishes, whatever the tally says.
    pub async fn execute(
        &self,
        client: &dyn ModerationClient,
        audit: &dyn AuditSink,
        sweep: ConfirmedSweep,
    ) -> SweepReport {
        let ConfirmedSweep {
            guild_id,
            action,
            queue,
        } = sweep;

        let attempted = queue.len();
        let mut succeeded = 0usize;
        let mut throttle = self.throttle.throttle();
        let reason = action.reason();

        for target in &queue {
            let outcome = match action {
                SweepAction::Kick => client.kick(guild_id, target.id, reason).await,
                SweepAction::Ban => client.ban(guild_id, target.id, reason).await,
            };

            match outcome {
                Ok(()) => {
                    audit.record(guild_id, action, target.id);
                    succeeded += 1;
                }
                Err(error) => {
                    // The member may have left, or sits above the bot now.
                    debug!(
                        guild_id = %guild_id,
                        target_id = %target.id,
                        action = %action,
                        %error,
                        "Sweep action failed for target"
                    );
                }
            }

            throttle.pause().await;
        }

        self.registry.clear(guild_id);

        info!(
            guild_id = %guild_id,
            action = %action,
            attempted,
            succeeded,
            "Sweep completed"
        );

        SweepReport {
            attempted,
            succeeded,
        }
    }
}
