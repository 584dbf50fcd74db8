mod commands;
mod output;

use clap::{Parser, Subcommand};
use miette::Result;
use roster_core::config::{self, RosterConfig};
use std::path::PathBuf;
use tracing::info;

#[derive(Parser)]
#[command(name = "roster-cli")]
#[command(about = "Inspect and replay chat user rosters")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path
    #[arg(long, short = 'c')]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long)]
    debug: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// List every user after replaying updates
    List {
        #[command(flatten)]
        replay: ReplayArgs,
    },
    /// Show a single user by `chat_id:gaia_id`
    Get {
        /// User ID to look up
        id: String,

        #[command(flatten)]
        replay: ReplayArgs,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        cmd: ConfigCommands,
    },
}

#[derive(clap::Args)]
struct ReplayArgs {
    /// JSON snapshot with self_entity, entities and conv_parts
    #[arg(long, short = 's')]
    snapshot: PathBuf,

    /// JSON-lines file of state updates to replay after login
    #[arg(long, short = 'u')]
    updates: Option<PathBuf>,
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Show current configuration
    Show,
    /// Save current configuration to file
    Save {
        /// Path to save configuration
        #[arg(default_value = "roster.toml")]
        path: PathBuf,
    },
}

fn init_tracing(debug: bool, config: &RosterConfig) {
    use tracing_subscriber::{EnvFilter, fmt};

    let level = if debug {
        "debug"
    } else {
        config.logging.level.as_str()
    };
    let filter = EnvFilter::new(format!("roster_core={level},roster_cli={level},warn"));

    let builder = fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_file(true)
        .with_line_number(true)
        .with_thread_ids(false)
        .with_thread_names(false);

    if config.logging.json {
        builder.json().init();
    } else {
        builder
            .with_timer(tracing_subscriber::fmt::time::LocalTime::rfc_3339())
            .compact()
            .init();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .rgb_colors(miette::RgbColors::Preferred)
                .with_cause_chain()
                .color(true)
                .context_lines(5)
                .tab_width(2)
                .break_words(true)
                .build(),
        )
    }))?;
    miette::set_panic_hook();
    let cli = Cli::parse();

    // Tracing isn't up yet, so a broken standard config is reported after init
    let (config, config_error) = match &cli.config {
        Some(config_path) => (config::load_config(config_path).await?, None),
        None => match config::load_config_from_standard_locations().await {
            Ok(config) => (config, None),
            Err(e) => (RosterConfig::default(), Some(e)),
        },
    };

    init_tracing(cli.debug, &config);
    if let Some(err) = config_error {
        roster_core::log_error!("Ignoring configuration from standard locations", err);
    }
    if let Some(config_path) = &cli.config {
        info!("Loaded config from: {:?}", config_path);
    }

    match &cli.command {
        Commands::List { replay } => {
            commands::roster::list(&replay.snapshot, replay.updates.as_deref(), &config).await?
        }
        Commands::Get { id, replay } => {
            commands::roster::get(id, &replay.snapshot, replay.updates.as_deref(), &config)
                .await?
        }
        Commands::Config { cmd } => match cmd {
            ConfigCommands::Show => commands::config::show(&config)?,
            ConfigCommands::Save { path } => commands::config::save(&config, path).await?,
        },
    }

    Ok(())
}
