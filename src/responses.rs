//! User-facing reply text and message components
//!
//! Every string a moderator sees lives here, next to the embed and button
//! builders that carry it. Handlers and commands stay free of copy so the
//! wording can change in one place.

use poise::serenity_prelude::{
    ButtonStyle, CreateActionRow, CreateButton, CreateEmbed, CreateSelectMenu,
    CreateSelectMenuKind, CreateSelectMenuOption,
};

use crate::data::GuildSettings;
use crate::sweep::{StagedSweep, SweepError, SweepReport};

/// Neutral dashboard color
pub const EMBED_COLOR: u32 = 0x2B2D31;
/// Color for destructive confirmation prompts
pub const WARNING_COLOR: u32 = 0xED4245;

/// Component id of the help module select menu
pub const HELP_MENU_ID: &str = "help:module";
/// Component id of the Skip Admins toggle button
pub const SETTINGS_ADMINS_ID: &str = "settings:admins";
/// Component id of the Skip Bots toggle button
pub const SETTINGS_BOTS_ID: &str = "settings:bots";
/// Component id of the sweep confirmation button
pub const SWEEP_CONFIRM_ID: &str = "sweep:confirm";
/// Component id of the sweep cancel button
pub const SWEEP_CANCEL_ID: &str = "sweep:cancel";

pub const ADMIN_ONLY: &str = "🚫 Admin only.";
pub const EXECUTING: &str = "⏳ Executing moderation...";
pub const CANCELLED: &str = "❌ Mass moderation cancelled.";

/// Render a protection flag's state the way the dashboard shows it
#[must_use]
pub fn on_off(enabled: bool) -> &'static str {
    if enabled { "ENABLED" } else { "DISABLED" }
}

/// Reply for a staging request the engine refused
#[must_use]
pub fn staging_refusal(error: &SweepError) -> &'static str {
    match error {
        SweepError::AlreadyActive => "⚠️ A moderation process is already running.",
        SweepError::EmptyTargetSet => "ℹ️ No eligible members found.",
        _ => "❌ Failed to enumerate members. Try again shortly.",
    }
}

/// Ephemeral reply for a confirm or cancel the gate refused
#[must_use]
pub fn gate_refusal(error: &SweepError) -> &'static str {
    match error {
        SweepError::NotExecutor => "Not your action.",
        _ => "No active process.",
    }
}

/// Final tally shown when a sweep finishes
#[must_use]
pub fn completion_message(report: &SweepReport) -> String {
    format!(
        "✅ **Completed:** {}/{} users processed.",
        report.succeeded, report.attempted
    )
}

/// Control panel embed with the given body text
#[must_use]
pub fn panel_embed(description: String) -> CreateEmbed {
    CreateEmbed::new()
        .title("🧠 Sweep Warden — Professional Control Panel")
        .description(description)
        .color(EMBED_COLOR)
}

/// Main control panel embed
#[must_use]
pub fn help_embed(settings: &GuildSettings) -> CreateEmbed {
    panel_embed(format!(
        "**Purpose:** High-safety, staged mass moderation\n\
         **Prefix:** `!`\n\n\
         **Current Protection State:**\n\
         • Skip Admins: **{}**\n\
         • Skip Bots: **{}**\n\
         • Owner Protection: **ALWAYS ON**\n\n\
         Use the menu below to explore modules.",
        on_off(settings.skip_admins),
        on_off(settings.skip_bots),
    ))
}

/// Module select menu shown under the control panel
#[must_use]
pub fn help_menu_row() -> CreateActionRow {
    let menu = CreateSelectMenu::new(
        HELP_MENU_ID,
        CreateSelectMenuKind::String {
            options: vec![
                CreateSelectMenuOption::new("Overview", "overview")
                    .description("How Sweep Warden works"),
                CreateSelectMenuOption::new("Mass Moderation", "mass")
                    .description("Kick / Ban multiple users safely"),
                CreateSelectMenuOption::new("Settings", "settings")
                    .description("Protection configuration"),
                CreateSelectMenuOption::new("FAQ / Docs", "faq")
                    .description("Common questions & safety info"),
            ],
        },
    )
    .placeholder("Select a module");

    CreateActionRow::SelectMenu(menu)
}

/// Toggle buttons shown on the settings page
#[must_use]
pub fn settings_buttons_row() -> CreateActionRow {
    CreateActionRow::Buttons(vec![
        CreateButton::new(SETTINGS_ADMINS_ID)
            .label("Toggle Skip Admins")
            .style(ButtonStyle::Primary),
        CreateButton::new(SETTINGS_BOTS_ID)
            .label("Toggle Skip Bots")
            .style(ButtonStyle::Primary),
    ])
}

/// Body text for one help module page.
///
/// Returns the page text and whether the settings toggle buttons belong
/// under it; `None` for an unknown module value.
#[must_use]
pub fn help_page(module: &str, settings: &GuildSettings) -> Option<(String, bool)> {
    match module {
        "overview" => Some((
            "**Sweep Warden Overview**\n\n\
             Sweep Warden is designed to perform powerful moderation actions **safely**.\n\
             Every destructive action requires confirmation, respects role hierarchy, \
             and applies protection rules."
                .to_string(),
            false,
        )),
        "mass" => Some((
            "**🚨 Mass Moderation Module**\n\n\
             **Available Commands:**\n\
             `!masskick` — Kick all eligible members\n\
             `!massban` — Ban all eligible members\n\
             `!masskickrole @Role` — Kick members WITH role\n\
             `!massbanrole @Role` — Ban members WITH role\n\
             `!masskicknorole @Role` — Kick members WITHOUT role\n\
             `!massbannorole @Role` — Ban members WITHOUT role\n\n\
             **Safety Rules:**\n\
             • Owner always skipped\n\
             • Admins/Bots skipped (configurable)\n\
             • Role hierarchy enforced\n\
             • Confirmation required"
                .to_string(),
            false,
        )),
        "settings" => Some((
            format!(
                "**⚙️ Protection Settings**\n\n\
                 Skip Admins: **{}**\n\
                 Skip Bots: **{}**\n\n\
                 These settings directly affect moderation scope.",
                on_off(settings.skip_admins),
                on_off(settings.skip_bots),
            ),
            true,
        )),
        "faq" => Some((
            "**📘 Documentation & FAQ**\n\n\
             • All actions are logged\n\
             • No silent execution\n\
             • Local YAML persistence\n\
             • Designed for large servers"
                .to_string(),
            false,
        )),
        _ => None,
    }
}

/// Confirmation prompt for a staged sweep
#[must_use]
pub fn confirmation_embed(staged: &StagedSweep) -> CreateEmbed {
    CreateEmbed::new()
        .title("🚨 Mass Moderation — Confirmation Required")
        .description(format!(
            "**Action:** {}\n\
             **Targets:** {}\n\n\
             This action is irreversible. Review carefully before confirming.",
            staged.action.verb(),
            staged.target_count,
        ))
        .color(WARNING_COLOR)
}

/// CONFIRM / CANCEL buttons under the confirmation prompt
#[must_use]
pub fn confirm_buttons_row() -> CreateActionRow {
    CreateActionRow::Buttons(vec![
        CreateButton::new(SWEEP_CONFIRM_ID)
            .label("CONFIRM")
            .style(ButtonStyle::Danger),
        CreateButton::new(SWEEP_CANCEL_ID)
            .label("CANCEL")
            .style(ButtonStyle::Secondary),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sweep::SweepAction;

    #[test]
    fn test_on_off() {
        assert_eq!(on_off(true), "ENABLED");
        assert_eq!(on_off(false), "DISABLED");
    }

    #[test]
    fn test_completion_message_reports_tally() {
        let message = completion_message(&SweepReport {
            attempted: 12,
            succeeded: 9,
        });
        assert_eq!(message, "✅ **Completed:** 9/12 users processed.");
    }

    #[test]
    fn test_staging_refusals() {
        assert_eq!(
            staging_refusal(&SweepError::AlreadyActive),
            "⚠️ A moderation process is already running."
        );
        assert_eq!(
            staging_refusal(&SweepError::EmptyTargetSet),
            "ℹ️ No eligible members found."
        );
    }

    #[test]
    fn test_gate_refusals() {
        assert_eq!(gate_refusal(&SweepError::NoSession), "No active process.");
        assert_eq!(gate_refusal(&SweepError::NotExecutor), "Not your action.");
    }

    #[test]
    fn test_help_pages_cover_every_module() {
        let settings = GuildSettings::default();

        for module in ["overview", "mass", "settings", "faq"] {
            let (text, _) = help_page(module, &settings).unwrap();
            assert!(!text.is_empty());
        }
        assert!(help_page("reaction", &settings).is_none());
    }

    #[test]
    fn test_settings_page_shows_current_state() {
        let settings = GuildSettings {
            guild_id: 1,
            skip_admins: true,
            skip_bots: false,
        };

        let (text, with_buttons) = help_page("settings", &settings).unwrap();
        assert!(text.contains("Skip Admins: **ENABLED**"));
        assert!(text.contains("Skip Bots: **DISABLED**"));
        assert!(with_buttons);
    }

    #[test]
    fn test_mass_page_lists_every_command() {
        let (text, _) = help_page("mass", &GuildSettings::default()).unwrap();
        for command in [
            "!masskick",
            "!massban",
            "!masskickrole",
            "!massbanrole",
            "!masskicknorole",
            "!massbannorole",
        ] {
            assert!(text.contains(command), "missing {command}");
        }
    }

    #[test]
    fn test_confirmation_uses_action_verb() {
        // The prompt shows the loud verb, not the lowercase audit name
        assert_eq!(SweepAction::Kick.verb(), "KICK");
        let staged = StagedSweep {
            action: SweepAction::Ban,
            target_count: 4,
        };
        let _ = confirmation_embed(&staged);
    }
}
