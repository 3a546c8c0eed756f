// SPDX-FileCopyrightText: 2026 FriendSOS Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! FriendSOS - recurring safety check-ins with escalation to emergency contacts.
//!
//! This is the binary entry point for the check-in daemon and shell.

mod adapters;
mod serve;
mod shell;
mod shutdown;
mod status;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use friendsos_config::FriendsosConfig;

/// FriendSOS - recurring safety check-ins with escalation to emergency contacts.
#[derive(Parser, Debug)]
#[command(name = "friendsos", version, about, long_about = None)]
struct Cli {
    /// Read configuration from this file instead of the standard hierarchy.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the check-in engine until interrupted.
    Serve,
    /// Manage check-ins from an interactive REPL.
    Shell,
    /// Show persisted check-ins without starting the engine.
    Status {
        /// Output JSON for scripting.
        #[arg(long)]
        json: bool,
        /// Disable colors.
        #[arg(long)]
        plain: bool,
    },
    /// Print the effective configuration.
    Config,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let loaded = match &cli.config {
        Some(path) => friendsos_config::load_and_validate_path(path),
        None => friendsos_config::load_and_validate(),
    };
    let config = match loaded {
        Ok(config) => config,
        Err(errors) => {
            friendsos_config::render_errors(&errors);
            std::process::exit(1);
        }
    };

    let result = match cli.command {
        Some(Commands::Serve) => serve::run_serve(config).await,
        Some(Commands::Shell) => shell::run_shell(config).await,
        Some(Commands::Status { json, plain }) => status::run_status(&config, json, plain).await,
        Some(Commands::Config) => print_config(&config),
        None => {
            println!("friendsos: use --help for available commands");
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

fn print_config(config: &FriendsosConfig) -> Result<(), friendsos_core::FriendsosError> {
    let rendered = toml::to_string_pretty(config).map_err(|e| {
        friendsos_core::FriendsosError::Config(format!("failed to render configuration: {e}"))
    })?;
    print!("{rendered}");
    Ok(())
}

/// Initializes the tracing subscriber. `RUST_LOG` wins over `log_level`.
pub(crate) fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("friendsos={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(false)
        .with_writer(std::io::stderr)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn binary_loads_config_defaults() {
        let config = friendsos_config::load_and_validate_str("")
            .expect("default config should be valid");
        assert_eq!(config.app.name, "friendsos");
    }

    #[test]
    fn default_config_renders_as_toml() {
        let rendered = toml::to_string_pretty(&FriendsosConfig::default()).unwrap();
        assert!(rendered.contains("[checkin]"));
        assert!(rendered.contains("default_max_notifications = 3"));
    }

    #[test]
    fn status_flags_parse() {
        let cli = Cli::parse_from(["friendsos", "status", "--json"]);
        assert!(matches!(
            cli.command,
            Some(Commands::Status {
                json: true,
                plain: false
            })
        ));
    }

    #[test]
    fn config_path_is_global() {
        let cli = Cli::parse_from(["friendsos", "serve", "--config", "/tmp/f.toml"]);
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/f.toml")));
    }
}
