mod ai;
mod commands;
mod config;
mod constants;
mod handlers;
mod models;
mod prayer;
mod utils;
mod voice;
mod web;

use poise::serenity_prelude as serenity;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};

use crate::{
    config::Config,
    constants::{COMMAND_PREFIX, HTTP_CONNECT_TIMEOUT_SECS, HTTP_TIMEOUT_SECS, LOG_DIRECTIVE},
    handlers::{handle_interaction, handle_message, handle_voice_state_update},
    models::{Data, Error},
    prayer::start_prayer_scheduler,
    utils::messages::format_error,
    voice::VoiceController,
    web::{build_http_client, start_keep_alive, start_liveness_server},
};

#[tokio::main]
async fn main() {
    // Load environment variables from .env file if present
    let _ = dotenvy::dotenv();

    // Initialize logging
    initialize_logging();

    // Load configuration from environment
    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    if config.dev_guild_id.is_some() {
        info!("Development mode: Commands will be registered to guild only");
    }
    if config.admin_code.is_none() {
        warn!("ADMIN_CODE not set, code-protected commands are disabled");
    }
    if config.gemini_api_key.is_none() {
        warn!("GEMINI_API_KEY not set, AI answers are disabled");
    }

    let http = match build_http_client(
        Duration::from_secs(HTTP_TIMEOUT_SECS),
        Duration::from_secs(HTTP_CONNECT_TIMEOUT_SECS),
    ) {
        Ok(http) => http,
        Err(e) => {
            error!("Failed to build HTTP client: {}", e);
            std::process::exit(1);
        }
    };

    // The platform expects something listening before the gateway is up
    if let Err(e) = start_liveness_server(config.port).await {
        error!("Failed to start web server on port {}: {}", config.port, e);
    }
    if let Some(domain) = config.public_domain.clone() {
        start_keep_alive(http.clone(), domain);
    }

    if let Err(e) = start_bot(config, http).await {
        error!("Bot error: {}", e);
        std::process::exit(1);
    }
}

/// Initialize the logging system
fn initialize_logging() {
    let filter = tracing_subscriber::EnvFilter::from_default_env();
    let filter = match LOG_DIRECTIVE.parse() {
        Ok(directive) => filter.add_directive(directive),
        Err(_) => filter,
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

async fn on_error(error: poise::FrameworkError<'_, Arc<Data>, Error>) {
    match error {
        poise::FrameworkError::Command { error, ctx, .. } => {
            error!("Command /{} failed: {}", ctx.command().name, error);
            let reply = poise::CreateReply::default()
                .content(format_error("حدث خطأ أثناء تنفيذ الأمر"))
                .ephemeral(true);
            if let Err(e) = ctx.send(reply).await {
                error!("Failed to report command error: {}", e);
            }
        }
        other => {
            if let Err(e) = poise::builtins::on_error(other).await {
                error!("Error while handling error: {}", e);
            }
        }
    }
}

/// Create and start the Discord bot
async fn start_bot(config: Config, http: reqwest::Client) -> Result<(), Error> {
    let manager = songbird::Songbird::serenity();
    let voice = VoiceController::new(manager.clone(), config.playback_timeout);
    let data = Arc::new(Data::new(&config, voice, http));

    let framework = poise::Framework::builder()
        .options(poise::FrameworkOptions {
            commands: commands::all(),
            prefix_options: poise::PrefixFrameworkOptions {
                prefix: Some(COMMAND_PREFIX.to_string()),
                // Mentions are questions for the assistant
                mention_as_prefix: false,
                ..Default::default()
            },
            on_error: |error| Box::pin(on_error(error)),
            event_handler: |ctx, event, _framework, data| {
                Box::pin(async move {
                    match event {
                        serenity::FullEvent::VoiceStateUpdate { old, new } => {
                            handle_voice_state_update(ctx, old.clone(), new.clone(), data).await;
                        }
                        serenity::FullEvent::Message { new_message } => {
                            handle_message(ctx, new_message, data).await;
                        }
                        serenity::FullEvent::InteractionCreate {
                            interaction: serenity::Interaction::Component(component),
                        } => {
                            handle_interaction(ctx, component.clone()).await;
                        }
                        _ => {}
                    }
                    Ok(())
                })
            },
            ..Default::default()
        })
        .setup(move |ctx, ready, framework| {
            Box::pin(async move {
                info!("Logged in as {} ({} guilds)", ready.user.name, ready.guilds.len());

                // Register commands based on dev_guild_id
                if let Some(guild_id) = data.dev_guild_id {
                    info!("Registering commands in development guild: {}", guild_id);
                    poise::builtins::register_in_guild(ctx, &framework.options().commands, guild_id)
                        .await?;
                } else {
                    info!("Registering commands globally (may take up to 1 hour)");
                    poise::builtins::register_globally(ctx, &framework.options().commands).await?;
                }

                start_prayer_scheduler(ctx.http.clone(), ctx.cache.clone(), data.clone());
                info!("Bot is ready!");

                Ok(data)
            })
        })
        .build();

    // Create client with required intents
    let intents = serenity::GatewayIntents::non_privileged()
        | serenity::GatewayIntents::GUILD_VOICE_STATES
        | serenity::GatewayIntents::GUILD_MEMBERS
        | serenity::GatewayIntents::MESSAGE_CONTENT;

    let mut client = serenity::ClientBuilder::new(&config.discord_token, intents)
        .framework(framework)
        .voice_manager_arc(manager)
        .await?;

    // Start the bot
    info!("Starting bot...");
    client.start().await?;

    Ok(())
}
