use std::env;

use poise::serenity_prelude::{self as serenity};
use serenity::GatewayIntents;
use tracing::info;

use sweep_warden::{Data, Error, commands, handlers, logging};

/// Main function to run the bot
async fn async_main() -> Result<(), Error> {
    // Initialize logging
    logging::init()?;

    // Load environment variables
    let token = env::var("DISCORD_TOKEN").expect("DISCORD_TOKEN must be set");

    // Load persisted guild settings and audit history
    let data = Data::load().await;
    let framework_data = data.clone();

    // Configure the Poise framework
    let framework = poise::Framework::builder()
        .options(poise::FrameworkOptions {
            commands: commands::all(),
            prefix_options: poise::PrefixFrameworkOptions {
                prefix: Some("!".to_string()),
                ..Default::default()
            },
            pre_command: |ctx| {
                Box::pin(async move {
                    // Log the start of command execution
                    logging::log_command_start(ctx);
                })
            },
            post_command: |ctx| {
                Box::pin(async move {
                    // Log the end of command execution
                    logging::log_command_end(ctx);
                })
            },
            on_error: |error| {
                Box::pin(async move {
                    // Non-admins invoking a mass command get told, not ignored
                    if let poise::FrameworkError::MissingUserPermissions { ctx, .. } = &error {
                        let _ = ctx.say("🚫 **Administrator permission required.**").await;
                    }
                    logging::log_command_error(&error);
                })
            },
            ..Default::default()
        })
        .setup(|ctx, _ready, framework| {
            Box::pin(async move {
                logging::log_console(format!(
                    "Registering {} commands",
                    framework.options().commands.len()
                ));
                poise::builtins::register_globally(ctx, &framework.options().commands).await?;
                // Register the bot's data
                Ok(framework_data)
            })
        })
        .build();

    // Configure the Serenity client
    let intents = GatewayIntents::non_privileged()
        | GatewayIntents::GUILD_MEMBERS
        | GatewayIntents::MESSAGE_CONTENT;
    let mut client = serenity::ClientBuilder::new(token, intents)
        .event_handler(handlers::Handler)
        .framework(framework)
        .type_map_insert::<Data>(data.clone())
        .await
        .expect("Failed to create client");

    info!("Starting bot...");
    // Start the bot and stop cleanly on Ctrl-C
    tokio::select! {
        result = client.start() => {
            if let Err(err) = result {
                eprintln!("Error starting the bot: {}", err);
            }
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Shutdown signal received");
        }
    }

    // Final save so nothing toggled mid-session is lost
    if let Err(err) = data.save().await {
        eprintln!("Error saving data: {}", err);
    }

    Ok(())
}

fn main() {
    // Run the async main function
    let result = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .unwrap()
        .block_on(async_main());

    // Handle any errors that occurred during execution
    if let Err(err) = result {
        eprintln!("Error: {}", err);
    }
}
