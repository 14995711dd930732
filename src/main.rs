mod commands;
mod config;
mod http_server;
mod logging;
mod ports;
mod services;
mod spotify_rs;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use color_eyre::{
    Result,
    eyre::{Context, OptionExt, eyre},
};

use crate::{
    commands::intent::PatternResolver,
    config::Config,
    http_server::app::HttpServerConfig,
    logging::init_tracing,
    services::{session::RefreshSchedule, spotify::client::SpotifyApiCredentials},
};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// The config file to use
    #[arg(short, long, env = "SPOTIFY_COMMANDS_CONFIG")]
    config: Option<PathBuf>,

    /// Tracing filter, e.g. `info` or `warn,spotify_chat_commands=debug`
    #[arg(long, default_value = "info", global = true, env = "LOG_LEVEL")]
    log_level: String,

    /// OTLP collector to export spans to
    #[arg(long, global = true, env = "OTLP_ENDPOINT")]
    otlp_endpoint: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Serve the chat command endpoint
    Serve {
        /// The port to run the server on
        #[arg(short, long, env = "PORT")]
        port: Option<u16>,

        /// Public URL of the service (used for auth redirects and help links)
        #[arg(long, env = "URI")]
        base_url: Option<String>,

        /// Spotify application client id
        #[arg(long, env = "SPOTIFY_CLIENT_ID")]
        client_id: Option<String>,

        /// Spotify application client secret
        #[arg(long, env = "SPOTIFY_CLIENT_SECRET")]
        client_secret: Option<String>,

        /// How the token refresh interval is chosen
        #[arg(long, value_enum)]
        refresh_schedule: Option<RefreshSchedule>,
    },
    /// Print how a chat command would be understood, without running it
    Resolve {
        /// The chat command text
        text: String,
    },
    #[command(subcommand)]
    Config(ConfigCommands),
}

#[derive(Subcommand, Debug)]
enum ConfigCommands {
    /// Create a default config file, if it doesn't exist
    CreateDefault,
    /// Print the path to the config file
    Path,
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    let args = Args::parse();
    let tracer_provider = init_tracing(
        env!("CARGO_PKG_NAME"),
        args.otlp_endpoint.as_deref(),
        &args.log_level,
    )?;

    tracing::debug!("Loading configuration");
    let config = {
        if let Some(config) = &args.config {
            Config::from_file(config)
        } else {
            Config::load()
        }
    }
    .wrap_err("Failed to load spotify-chat-commands config")?;

    let result = run(args.command, config).await;

    if let Some(tracer_provider) = tracer_provider {
        tracer_provider
            .shutdown()
            .wrap_err("Failed to flush traces")?;
    }

    result
}

async fn run(command: Commands, config: Config) -> Result<()> {
    match command {
        Commands::Serve {
            port,
            base_url,
            client_id,
            client_secret,
            refresh_schedule,
        } => {
            let port = port.unwrap_or(config.port);

            // Default base_url in debug mode, require it in release mode
            let base_url = if let Some(url) = base_url.or(config.base_url) {
                url.trim_end_matches('/').to_string()
            } else if cfg!(debug_assertions) {
                format!("http://localhost:{}", port)
            } else {
                return Err(eyre!(
                    "URI is required in release mode. Set it via --base-url or the URI environment variable"
                ));
            };

            let client_id = client_id
                .or(config.spotify.client_id)
                .ok_or_eyre("Spotify client id missing, set SPOTIFY_CLIENT_ID")?;
            let client_secret = client_secret
                .or(config.spotify.client_secret)
                .ok_or_eyre("Spotify client secret missing, set SPOTIFY_CLIENT_SECRET")?;
            let credentials = SpotifyApiCredentials::new(
                client_id,
                client_secret,
                format!("{}/callback", base_url),
                config.spotify.scopes,
            );
            tracing::debug!(
                "Using spotify app {} with redirect {}",
                credentials.client_id(),
                credentials.redirect_uri()
            );

            http_server::app::start(HttpServerConfig {
                port,
                base_url,
                credentials,
                refresh_schedule: refresh_schedule.unwrap_or(config.session.refresh_schedule),
                commands: config.commands,
            })
            .await?;
        }
        Commands::Resolve { text } => {
            let resolver = PatternResolver::with_patterns(&config.commands)
                .wrap_err("Failed to build command patterns")?;
            let command = resolver.resolve_text(&text);
            println!("intent: {}", command.intent);
            let mut entities: Vec<_> = command.entities.iter().collect();
            entities.sort();
            for (slot, value) in entities {
                println!("{}: {:?}", slot, value);
            }
        }
        Commands::Config(config_commands) => match config_commands {
            ConfigCommands::CreateDefault => {
                let path = Config::create_default()?;
                tracing::info!("Default config created at {}", path.display());
            }
            ConfigCommands::Path => match Config::config_path() {
                Some(path) => println!("{}", path.display()),
                None => println!("No default config path found"),
            },
        },
    }

    Ok(())
}
