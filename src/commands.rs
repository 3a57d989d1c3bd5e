//! Moderator-facing commands
//!
//! The six mass moderation commands all funnel into [`stage_sweep`], which
//! asks the engine to stage a queue and replies with the confirmation prompt.
//! Nothing destructive happens here; execution waits for the CONFIRM button.
//!
//! Every command, including `ping` and `help`, requires ADMINISTRATOR. The
//! bot has no public surface.

use poise::serenity_prelude::Role;
use poise::{Context, command};

use crate::responses;
use crate::sweep::{HttpMemberSource, RoleScope, SweepAction};
use crate::{Data, Error};

/// Basic ping command
/// This command is used to check if the bot is responsive.
#[command(
    prefix_command,
    slash_command,
    guild_only,
    required_permissions = "ADMINISTRATOR"
)]
pub async fn ping(ctx: Context<'_, Data, Error>) -> Result<(), Error> {
    ctx.say("🏓 Pong!").await?;
    Ok(())
}

/// Show the control panel
/// Interactive dashboard with module pages and protection settings.
#[command(
    prefix_command,
    slash_command,
    guild_only,
    required_permissions = "ADMINISTRATOR"
)]
pub async fn help(ctx: Context<'_, Data, Error>) -> Result<(), Error> {
    let Some(guild_id) = ctx.guild_id() else {
        return Ok(());
    };
    let settings = ctx.data().settings(guild_id);

    ctx.send(
        poise::CreateReply::default()
            .embed(responses::help_embed(&settings))
            .components(vec![responses::help_menu_row()]),
    )
    .await?;
    Ok(())
}

/// Kick all eligible members
#[command(
    prefix_command,
    slash_command,
    guild_only,
    required_permissions = "ADMINISTRATOR"
)]
pub async fn masskick(ctx: Context<'_, Data, Error>) -> Result<(), Error> {
    stage_sweep(ctx, SweepAction::Kick, None).await
}

/// Ban all eligible members
#[command(
    prefix_command,
    slash_command,
    guild_only,
    required_permissions = "ADMINISTRATOR"
)]
pub async fn massban(ctx: Context<'_, Data, Error>) -> Result<(), Error> {
    stage_sweep(ctx, SweepAction::Ban, None).await
}

/// Kick eligible members holding a role
#[command(
    prefix_command,
    slash_command,
    guild_only,
    required_permissions = "ADMINISTRATOR"
)]
pub async fn masskickrole(
    ctx: Context<'_, Data, Error>,
    #[description = "Only members with this role are targeted"] role: Option<Role>,
) -> Result<(), Error> {
    let Some(role) = role else {
        ctx.say("❌ Mention a role.").await?;
        return Ok(());
    };
    stage_sweep(ctx, SweepAction::Kick, Some(RoleScope::members_with(role.id))).await
}

/// Ban eligible members holding a role
#[command(
    prefix_command,
    slash_command,
    guild_only,
    required_permissions = "ADMINISTRATOR"
)]
pub async fn massbanrole(
    ctx: Context<'_, Data, Error>,
    #[description = "Only members with this role are targeted"] role: Option<Role>,
) -> Result<(), Error> {
    let Some(role) = role else {
        ctx.say("❌ Mention a role.").await?;
        return Ok(());
    };
    stage_sweep(ctx, SweepAction::Ban, Some(RoleScope::members_with(role.id))).await
}

/// Kick eligible members lacking a role
#[command(
    prefix_command,
    slash_command,
    guild_only,
    required_permissions = "ADMINISTRATOR"
)]
pub async fn masskicknorole(
    ctx: Context<'_, Data, Error>,
    #[description = "Members without this role are targeted"] role: Option<Role>,
) -> Result<(), Error> {
    let Some(role) = role else {
        ctx.say("❌ Mention a role.").await?;
        return Ok(());
    };
    stage_sweep(
        ctx,
        SweepAction::Kick,
        Some(RoleScope::members_without(role.id)),
    )
    .await
}

/// Ban eligible members lacking a role
#[command(
    prefix_command,
    slash_command,
    guild_only,
    required_permissions = "ADMINISTRATOR"
)]
pub async fn massbannorole(
    ctx: Context<'_, Data, Error>,
    #[description = "Members without this role are targeted"] role: Option<Role>,
) -> Result<(), Error> {
    let Some(role) = role else {
        ctx.say("❌ Mention a role.").await?;
        return Ok(());
    };
    stage_sweep(
        ctx,
        SweepAction::Ban,
        Some(RoleScope::members_without(role.id)),
    )
    .await
}

/// Stage a sweep for the invoking moderator and post the confirmation prompt.
async fn stage_sweep(
    ctx: Context<'_, Data, Error>,
    action: SweepAction,
    scope: Option<RoleScope>,
) -> Result<(), Error> {
    let Some(guild_id) = ctx.guild_id() else {
        return Ok(());
    };
    let data = ctx.data();
    let settings = data.settings(guild_id);
    let source = HttpMemberSource::new(ctx.serenity_context().http.clone());

    match data
        .sweeps
        .request(&source, guild_id, action, ctx.author().id, scope, &settings)
        .await
    {
        Ok(staged) => {
            ctx.send(
                poise::CreateReply::default()
                    .embed(responses::confirmation_embed(&staged))
                    .components(vec![responses::confirm_buttons_row()]),
            )
            .await?;
        }
        Err(err) => {
            ctx.say(responses::staging_refusal(&err)).await?;
        }
    }
    Ok(())
}

/// Every command the bot registers
pub fn all() -> Vec<poise::Command<Data, Error>> {
    vec![
        ping(),
        help(),
        masskick(),
        massban(),
        masskickrole(),
        massbanrole(),
        masskicknorole(),
        massbannorole(),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use poise::serenity_prelude::Permissions;

    // Test that the ping command is properly defined
    #[test]
    fn test_ping_command_definition() {
        let cmd = ping();
        assert_eq!(cmd.name, "ping");
        assert!(
            cmd.description
                .unwrap_or_else(Default::default)
                .contains("check if the bot is responsive")
        );
        assert!(cmd.guild_only);
    }

    #[test]
    fn test_help_command_definition() {
        let cmd = help();
        assert_eq!(cmd.name, "help");
        assert!(cmd.guild_only);
        assert!(cmd.create_as_slash_command().is_some());
    }

    // The whole surface is admin-only, not just the destructive commands
    #[test]
    fn test_every_command_requires_administrator() {
        for cmd in all() {
            assert!(
                cmd.required_permissions.contains(Permissions::ADMINISTRATOR),
                "{} is missing the administrator gate",
                cmd.name
            );
            assert!(cmd.guild_only, "{} must be guild only", cmd.name);
        }
    }

    #[test]
    fn test_role_commands_take_a_role_parameter() {
        for cmd in [
            masskickrole(),
            massbanrole(),
            masskicknorole(),
            massbannorole(),
        ] {
            assert_eq!(cmd.parameters.len(), 1, "{}", cmd.name);
            assert_eq!(cmd.parameters[0].name, "role");
        }
    }

    #[test]
    fn test_all_registers_every_command() {
        let names: Vec<String> = all().into_iter().map(|cmd| cmd.name).collect();
        assert_eq!(
            names,
            vec![
                "ping",
                "help",
                "masskick",
                "massban",
                "masskickrole",
                "massbanrole",
                "masskicknorole",
                "massbannorole",
            ]
        );
    }
}
