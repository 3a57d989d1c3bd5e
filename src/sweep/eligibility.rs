//! Target eligibility rules
//!
//! Pure filtering of a guild roster against the guild's protection settings,
//! the role-hierarchy rule, and an optional role scope. Nothing here touches
//! the platform; callers hand in plain member views and get back the queue.

use std::collections::HashSet;

use poise::serenity_prelude::{RoleId, UserId};

use crate::data::GuildSettings;

/// Read-only view of one guild member, reduced to what the filter needs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberView {
    /// Platform user id
    pub id: UserId,

    /// Whether this member owns the guild
    pub is_owner: bool,

    /// Whether any role the member holds, @everyone included, grants
    /// administrator
    pub is_admin: bool,

    /// Whether the account is a bot
    pub is_bot: bool,

    /// All role ids held by the member
    pub role_ids: HashSet<RoleId>,

    /// Position of the member's highest role; 0 when they hold none
    pub top_role_position: i64,
}

/// Optional role filter narrowing a sweep to part of the roster
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoleScope {
    role_id: RoleId,
    inverse: bool,
}

impl RoleScope {
    /// Scope matching only members who hold `role_id`
    #[must_use]
    pub fn members_with(role_id: RoleId) -> Self {
        Self {
            role_id,
            inverse: false,
        }
    }

    /// Scope matching only members who do not hold `role_id`
    #[must_use]
    pub fn members_without(role_id: RoleId) -> Self {
        Self {
            role_id,
            inverse: true,
        }
    }

    fn matches(self, member: &MemberView) -> bool {
        let has_role = member.role_ids.contains(&self.role_id);
        if self.inverse { !has_role } else { has_role }
    }
}

/// Compute the target queue for a sweep.
///
/// A member is kept only when every exclusion rule passes and the scope,
/// when given, matches:
///
/// 1. the guild owner is never a target
/// 2. administrators are excluded while `skip_admins` is on
/// 3. bot accounts are excluded while `skip_bots` is on
/// 4. members at or above the acting bot's highest role are excluded
///
/// Rule 4 also drops the acting bot itself. Queue order follows the roster;
/// duplicate ids are dropped, first occurrence wins.
#[must_use]
pub fn eligible_targets(
    roster: &[MemberView],
    settings: &GuildSettings,
    actor: &MemberView,
    scope: Option<RoleScope>,
) -> Vec<MemberView> {
    let mut seen = HashSet::new();
    roster
        .iter()
        .filter(|member| {
            if member.is_owner {
                return false;
            }
            if settings.skip_admins && member.is_admin {
                return false;
            }
            if settings.skip_bots && member.is_bot {
                return false;
            }
            if actor.top_role_position <= member.top_role_position {
                return false;
            }
            scope.is_none_or(|scope| scope.matches(member))
        })
        .filter(|member| seen.insert(member.id))
        .cloned()
        .collect()
}
