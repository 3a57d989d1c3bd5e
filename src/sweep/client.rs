//! Discord-facing seams for the sweep engine
//!
//! This module defines the two traits the engine needs from the platform
//! and their HTTP-backed implementations. The runner only ever talks to
//! these traits, so tests can drive it without a gateway connection.

use std::collections::HashMap;
use std::sync::Arc;

use poise::serenity_prelude::{GuildId, Http, Member, Permissions, Role, RoleId, UserId};
use tracing::debug;

use super::SweepResult;
use super::eligibility::MemberView;

/// Page size for roster enumeration; Discord caps member listing at 1000
const ROSTER_PAGE: u64 = 1000;

/// Applies a sweep's action to one member at a time
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait ModerationClient: Send + Sync {
    /// Kick one member from the guild
    async fn kick(&self, guild_id: GuildId, user_id: UserId, reason: &str) -> SweepResult<()>;

    /// Ban one member from the guild
    async fn ban(&self, guild_id: GuildId, user_id: UserId, reason: &str) -> SweepResult<()>;
}

/// Supplies member rosters and the acting bot's own member view
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait MemberSource: Send + Sync {
    /// Enumerate the guild's full roster in the platform's listing order
    async fn fetch_roster(&self, guild_id: GuildId) -> SweepResult<Vec<MemberView>>;

    /// Fetch the bot's own member view for the guild
    async fn fetch_actor(&self, guild_id: GuildId) -> SweepResult<MemberView>;
}

/// `ModerationClient` backed by the Discord HTTP API
pub struct HttpModerationClient {
    http: Arc<Http>,
}

impl HttpModerationClient {
    pub fn new(http: Arc<Http>) -> Self {
        Self { http }
    }
}

#[async_trait::async_trait]
impl ModerationClient for HttpModerationClient {
    async fn kick(&self, guild_id: GuildId, user_id: UserId, reason: &str) -> SweepResult<()> {
        guild_id
            .kick_with_reason(&self.http, user_id, reason)
            .await?;
        Ok(())
    }

    async fn ban(&self, guild_id: GuildId, user_id: UserId, reason: &str) -> SweepResult<()> {
        // 0: keep the banned user's message history
        guild_id
            .ban_with_reason(&self.http, user_id, 0, reason)
            .await?;
        Ok(())
    }
}

/// `MemberSource` backed by the Discord HTTP API
pub struct HttpMemberSource {
    http: Arc<Http>,
}

impl HttpMemberSource {
    pub fn new(http: Arc<Http>) -> Self {
        Self { http }
    }
}

#[async_trait::async_trait]
impl MemberSource for HttpMemberSource {
    async fn fetch_roster(&self, guild_id: GuildId) -> SweepResult<Vec<MemberView>> {
        let guild = guild_id.to_partial_guild(&self.http).await?;

        let mut views = Vec::new();
        let mut after: Option<UserId> = None;
        loop {
            let page = guild_id
                .members(&self.http, Some(ROSTER_PAGE), after)
                .await?;
            let full_page = page.len() as u64 == ROSTER_PAGE;
            after = page.last().map(|member| member.user.id);

            views.extend(
                page.iter()
                    .map(|member| member_view(member, guild_id, guild.owner_id, &guild.roles)),
            );

            if !full_page {
                break;
            }
        }

        debug!(
            guild_id = %guild_id,
            members = views.len(),
            "Fetched guild roster"
        );

        Ok(views)
    }

    async fn fetch_actor(&self, guild_id: GuildId) -> SweepResult<MemberView> {
        let guild = guild_id.to_partial_guild(&self.http).await?;
        let bot_id = self.http.get_current_user().await?.id;
        let member = guild.member(&self.http, bot_id).await?;

        Ok(member_view(&member, guild_id, guild.owner_id, &guild.roles))
    }
}

/// Reduce a full member to the view the eligibility filter works on
fn member_view(
    member: &Member,
    guild_id: GuildId,
    owner_id: UserId,
    roles: &HashMap<RoleId, Role>,
) -> MemberView {
    let mut top_role_position = 0i64;
    // The implicit @everyone role never appears in member.roles; its id is
    // the guild id, so its grants have to be folded in here.
    let mut is_admin = roles
        .get(&guild_id.everyone_role())
        .is_some_and(|everyone| everyone.permissions.contains(Permissions::ADMINISTRATOR));

    for role_id in &member.roles {
        if let Some(role) = roles.get(role_id) {
            top_role_position = top_role_position.max(i64::from(role.position));
            if role.permissions.contains(Permissions::ADMINISTRATOR) {
                is_admin = true;
            }
        }
    }

    MemberView {
        id: member.user.id,
        is_owner: member.user.id == owner_id,
        is_admin,
        is_bot: member.user.bot,
        role_ids: member.roles.iter().copied().collect(),
        top_role_position,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn role(id: u64, position: u16, permissions: Permissions) -> Role {
        let mut role = Role::default();
        role.id = RoleId::new(id);
        role.position = position;
        role.permissions = permissions;
        role
    }

    fn member(user_id: u64, role_ids: &[u64]) -> Member {
        let mut member = Member::default();
        member.user.id = UserId::new(user_id);
        member.roles = role_ids.iter().copied().map(RoleId::new).collect();
        member
    }

    #[test]
    fn test_member_view_folds_held_roles() {
        let guild_id = GuildId::new(500);
        let roles = HashMap::from([
            (RoleId::new(500), role(500, 0, Permissions::empty())),
            (RoleId::new(10), role(10, 3, Permissions::KICK_MEMBERS)),
            (RoleId::new(11), role(11, 7, Permissions::ADMINISTRATOR)),
        ]);

        let view = member_view(&member(42, &[10, 11]), guild_id, UserId::new(1), &roles);

        assert_eq!(view.id, UserId::new(42));
        assert!(view.is_admin);
        assert!(!view.is_owner);
        assert!(!view.is_bot);
        assert_eq!(view.top_role_position, 7);
    }

    // An ADMINISTRATOR grant on @everyone reaches members who hold no
    // explicit roles at all.
    #[test]
    fn test_everyone_admin_grant_counts() {
        let guild_id = GuildId::new(500);
        let roles = HashMap::from([(
            RoleId::new(500),
            role(500, 0, Permissions::ADMINISTRATOR),
        )]);

        let view = member_view(&member(42, &[]), guild_id, UserId::new(1), &roles);

        assert!(view.is_admin);
        assert_eq!(view.top_role_position, 0);
    }

    #[test]
    fn test_owner_flagged_by_id() {
        let view = member_view(
            &member(42, &[]),
            GuildId::new(500),
            UserId::new(42),
            &HashMap::new(),
        );

        assert!(view.is_owner);
        assert!(!view.is_admin);
    }
}
