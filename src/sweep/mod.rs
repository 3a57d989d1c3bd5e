//! Mass moderation sweep engine
//!
//! A sweep stages a bulk kick or ban against a guild's filtered roster,
//! parks it behind the initiating moderator's confirmation, then executes
//! the queue as a throttled serial run. The registry guarantees at most one
//! sweep per guild at any time.

mod action;
mod client;
mod eligibility;
mod error;
mod registry;
mod service;
mod session;
mod throttle;

pub use action::SweepAction;
pub use client::{HttpMemberSource, HttpModerationClient, MemberSource, ModerationClient};
pub use eligibility::{MemberView, RoleScope, eligible_targets};
pub use error::{SweepError, SweepResult};
pub use registry::SweepRegistry;
pub use service::{AuditSink, ConfirmedSweep, StagedSweep, SweepReport, SweepService};
pub use session::{SweepSession, SweepStatus};
pub use throttle::{DEFAULT_ACTION_DELAY_MS, Throttle, ThrottlePolicy};
