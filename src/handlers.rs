//! Serenity event handlers
//!
//! Gateway lifecycle logging plus the component router: the help menu,
//! the settings toggles, and the CONFIRM / CANCEL buttons that gate every
//! staged sweep.

use poise::serenity_prelude::{
    self as serenity, ComponentInteraction, ComponentInteractionDataKind, Context,
    CreateInteractionResponse, CreateInteractionResponseFollowup, CreateInteractionResponseMessage,
    EventHandler, GuildId, Interaction, Permissions, Ready,
};
use tracing::{info, warn};

use crate::Data;
use crate::data::ProtectionFlag;
use crate::responses;
use crate::sweep::HttpModerationClient;

pub struct Handler;

#[serenity::async_trait]
impl EventHandler for Handler {
    /// Called when the bot is ready, but the cache may not be fully populated yet.
    async fn ready(&self, ctx: Context, ready: Ready) {
        let user_name = ready.user.name.clone();
        let shard_id = ctx.shard_id;
        info!("Connected as {user_name}, shard {shard_id}");
    }

    /// Called when the cache is fully populated.
    async fn cache_ready(&self, ctx: Context, guilds: Vec<GuildId>) {
        let guild_count_cache = ctx.cache.guild_count();
        let guild_count = guilds.len();
        if guild_count != guild_count_cache {
            warn!(
                "Cache guild count mismatch: {guild_count_cache} (cache) vs {guild_count} (actual)"
            );
        }
        info!("Cache ready! The bot is in {guild_count} guild(s)");
    }

    /// Called for every interaction; only component presses are routed.
    async fn interaction_create(&self, ctx: Context, interaction: Interaction) {
        let Interaction::Component(component) = interaction else {
            return;
        };
        if let Err(err) = route_component(&ctx, &component).await {
            warn!("Component interaction failed: {err}");
        }
    }
}

/// Dispatch a component press by its custom id.
///
/// Every component this bot posts is administrator-facing, so one gate up
/// front covers the menu, the toggles, and the sweep buttons alike.
async fn route_component(
    ctx: &Context,
    component: &ComponentInteraction,
) -> Result<(), serenity::Error> {
    let Some(guild_id) = component.guild_id else {
        return Ok(());
    };
    let Some(data) = lookup_data(ctx).await else {
        warn!("Component interaction arrived before data was registered");
        return Ok(());
    };

    let is_admin = component
        .member
        .as_ref()
        .and_then(|member| member.permissions)
        .is_some_and(|permissions| permissions.contains(Permissions::ADMINISTRATOR));
    if !is_admin {
        return reply_ephemeral(ctx, component, responses::ADMIN_ONLY).await;
    }

    match component.data.custom_id.as_str() {
        responses::HELP_MENU_ID => show_help_page(ctx, component, &data, guild_id).await,
        responses::SETTINGS_ADMINS_ID => {
            toggle_setting(ctx, component, &data, guild_id, ProtectionFlag::SkipAdmins).await
        }
        responses::SETTINGS_BOTS_ID => {
            toggle_setting(ctx, component, &data, guild_id, ProtectionFlag::SkipBots).await
        }
        responses::SWEEP_CONFIRM_ID => run_confirmed_sweep(ctx, component, &data, guild_id).await,
        responses::SWEEP_CANCEL_ID => cancel_sweep(ctx, component, &data, guild_id).await,
        _ => Ok(()),
    }
}

/// The shared bot state lives in the client's type map.
async fn lookup_data(ctx: &Context) -> Option<Data> {
    ctx.data.read().await.get::<Data>().cloned()
}

async fn reply_ephemeral(
    ctx: &Context,
    component: &ComponentInteraction,
    text: impl Into<String>,
) -> Result<(), serenity::Error> {
    component
        .create_response(
            &ctx.http,
            CreateInteractionResponse::Message(
                CreateInteractionResponseMessage::new()
                    .content(text)
                    .ephemeral(true),
            ),
        )
        .await
}

/// Swap the control panel body for the selected module page.
async fn show_help_page(
    ctx: &Context,
    component: &ComponentInteraction,
    data: &Data,
    guild_id: GuildId,
) -> Result<(), serenity::Error> {
    let ComponentInteractionDataKind::StringSelect { values } = &component.data.kind else {
        return Ok(());
    };
    let Some(module) = values.first() else {
        return Ok(());
    };

    let settings = data.settings(guild_id);
    let Some((text, with_toggles)) = responses::help_page(module, &settings) else {
        return Ok(());
    };

    // The menu stays attached so the moderator can keep navigating
    let mut rows = vec![responses::help_menu_row()];
    if with_toggles {
        rows.push(responses::settings_buttons_row());
    }

    component
        .create_response(
            &ctx.http,
            CreateInteractionResponse::UpdateMessage(
                CreateInteractionResponseMessage::new()
                    .embed(responses::panel_embed(text))
                    .components(rows),
            ),
        )
        .await
}

/// Flip one protection flag and persist the new settings.
async fn toggle_setting(
    ctx: &Context,
    component: &ComponentInteraction,
    data: &Data,
    guild_id: GuildId,
    flag: ProtectionFlag,
) -> Result<(), serenity::Error> {
    let enabled = data.toggle(guild_id, flag);
    data.spawn_save();
    info!(
        "{} now {} for guild {guild_id}",
        flag.label(),
        responses::on_off(enabled)
    );
    reply_ephemeral(ctx, component, format!("✅ {} updated.", flag.label())).await
}

/// Tear down the staged sweep if the press came from its executor.
async fn cancel_sweep(
    ctx: &Context,
    component: &ComponentInteraction,
    data: &Data,
    guild_id: GuildId,
) -> Result<(), serenity::Error> {
    match data.sweeps.cancel(guild_id, component.user.id) {
        Ok(()) => {
            component
                .create_response(
                    &ctx.http,
                    CreateInteractionResponse::UpdateMessage(
                        CreateInteractionResponseMessage::new()
                            .content(responses::CANCELLED)
                            .embeds(vec![])
                            .components(vec![]),
                    ),
                )
                .await
        }
        Err(err) => reply_ephemeral(ctx, component, responses::gate_refusal(&err)).await,
    }
}

/// Confirm the staged sweep, run it to completion, and report the tally.
async fn run_confirmed_sweep(
    ctx: &Context,
    component: &ComponentInteraction,
    data: &Data,
    guild_id: GuildId,
) -> Result<(), serenity::Error> {
    let confirmed = match data.sweeps.confirm(guild_id, component.user.id) {
        Ok(confirmed) => confirmed,
        Err(err) => return reply_ephemeral(ctx, component, responses::gate_refusal(&err)).await,
    };

    component
        .create_response(
            &ctx.http,
            CreateInteractionResponse::UpdateMessage(
                CreateInteractionResponseMessage::new()
                    .content(responses::EXECUTING)
                    .embeds(vec![])
                    .components(vec![]),
            ),
        )
        .await?;

    let client = HttpModerationClient::new(ctx.http.clone());
    let report = data.sweeps.execute(&client, data, confirmed).await;

    component
        .create_followup(
            &ctx.http,
            CreateInteractionResponseFollowup::new()
                .content(responses::completion_message(&report)),
        )
        .await?;
    Ok(())
}
