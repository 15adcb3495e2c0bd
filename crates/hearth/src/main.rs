mod catalog;
mod cli;
mod logging;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use hearth_core::config::HostConfig;
use hearth_core::entity::AddressableEntity;
use hearth_core::kernel::Host;
use hearth_core::kernel::constants::{APP_NAME, APP_VERSION};
use log::{error, info};

use crate::cli::ConsoleClient;

/// Hearth: a plugin host for game servers
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct CliArgs {
    /// Simple ping command for testing
    #[arg(long)]
    ping: bool,

    /// Host configuration file (.json, .toml, .yaml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace); overrides RUST_LOG
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List the plugins the host would load
    Plugins,
    /// Start the host, connect players, then shut down
    Run {
        /// Connect a player with this name (repeatable)
        #[arg(long = "player")]
        players: Vec<String>,
        /// Have the first player say this in chat
        #[arg(long)]
        say: Option<String>,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = CliArgs::parse();

    // Handle simple ping command
    if args.ping {
        println!("pong");
        return ExitCode::SUCCESS;
    }

    let config = match &args.config {
        Some(path) => match HostConfig::load_from_path(path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("Failed to load configuration: {}", e);
                return ExitCode::FAILURE;
            }
        },
        None => HostConfig::default(),
    };

    if let Err(e) = logging::init(args.log_level.as_deref(), &config.log_level) {
        eprintln!("{}", e);
        return ExitCode::FAILURE;
    }

    let result = match args.command {
        Some(Commands::Plugins) => {
            list_plugins(&config);
            Ok(())
        }
        Some(Commands::Run { players, say }) => run(config, &players, say.as_deref()).await,
        None => run(config, &[], None).await,
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn list_plugins(config: &HostConfig) {
    println!("Plugins:");
    for entry in catalog::entries(config) {
        let origin = if catalog::is_built_in(&entry.id) { "built-in" } else { "unknown" };
        println!("  - {} ({})", entry.id, origin);
    }
    for entry in config.plugins.iter().filter(|p| !p.enabled) {
        println!("  - {} (disabled)", entry.id);
    }
}

async fn run(config: HostConfig, players: &[String], say: Option<&str>) -> Result<(), String> {
    println!("{} v{}", APP_NAME, APP_VERSION);
    let descriptors = catalog::resolve(&config)?;
    let mut host = Host::from_config(config).map_err(|e| e.to_string())?;

    host.load_all(descriptors).map_err(|e| e.to_string())?;
    let setup = host.run_setup_phase().await.map_err(|e| e.to_string())?;
    let start = host.run_start_phase().await.map_err(|e| e.to_string())?;
    for failure in setup.failed.iter().chain(start.failed.iter()) {
        eprintln!("Plugin failure: {}", failure);
    }
    println!("Started plugins: {}", start.succeeded.join(", "));

    // Plugins are running from here on; shut down even if the session fails
    let outcome = session(&host, players, say).await;

    println!("Shutting down {}...", APP_NAME);
    let report = host.shutdown_all().await.map_err(|e| e.to_string())?;
    for failure in &report.failed {
        eprintln!("Plugin failure: {}", failure);
    }
    let failures = host.handler_failures();
    if !failures.is_empty() {
        eprintln!("{} event handler failure(s) during the session", failures.len());
    }
    outcome
}

/// Connect `players`, let the first one speak, then print what each received.
async fn session(host: &Host, players: &[String], say: Option<&str>) -> Result<(), String> {
    let mut clients = Vec::with_capacity(players.len());
    let mut speaker = None;
    let mut outcome = Ok(());
    for name in players {
        match host.connect(name).await {
            Ok((player, receiver)) => {
                info!("{} joined as {}", player.name(), player.id());
                speaker.get_or_insert(player.id());
                clients.push(ConsoleClient::new(name.clone(), receiver));
            }
            Err(e) => {
                outcome = Err(format!("Could not connect player '{}': {}", name, e));
                break;
            }
        }
    }

    if outcome.is_ok() {
        if let (Some(text), Some(id)) = (say, speaker) {
            if let Err(e) = host.chat(id, text).await {
                outcome = Err(e.to_string());
            }
        }
    }

    for client in &mut clients {
        client.flush();
    }
    outcome
}
