//! passvault command-line entry point.
//!
//! Binary name: `passvault`
//!
//! Parses CLI arguments, builds the typed command, opens the credential store
//! only when the command needs it, then dispatches to the handler.

mod cli;
mod state;

use clap::Parser;
use clap_complete::generate;
use tracing_subscriber::EnvFilter;

use passvault_infra::config::{load_config, resolve_data_dir};
use passvault_types::command::Command;

use cli::{Cli, Commands};
use state::{AppState, Layout};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Set up tracing based on verbosity
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(cli.log_filter()))
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    // Shell completions don't need config or state
    if let Commands::Completions { shell } = &cli.command {
        let mut cmd = <Cli as clap::CommandFactory>::command();
        generate(*shell, &mut cmd, "passvault", &mut std::io::stdout());
        return Ok(());
    }

    let data_dir = resolve_data_dir();
    let config = load_config(&data_dir).await;
    let layout = Layout::new(data_dir, &config);

    if let Commands::Status = &cli.command {
        return cli::status::status(layout, cli.json).await;
    }

    let mask = matches!(cli.command, Commands::ShowAll { mask: true });
    let Some(command) = cli.command.into_command(config.default_length)? else {
        return Ok(());
    };

    let state = if command.needs_store() {
        Some(AppState::init(layout).await?)
    } else {
        None
    };

    run(command, state.as_ref(), mask, cli.json).await
}

async fn run(command: Command, state: Option<&AppState>, mask: bool, json: bool) -> anyhow::Result<()> {
    use cli::credential::{self, store};

    match command {
        Command::Generate { policy, save } => {
            credential::generate(state, &policy, save.as_ref(), json).await
        }
        Command::Save { key, password } => {
            credential::save(store(state)?, &key, password, json).await
        }
        Command::FindByUsername { username } => {
            credential::find_by_username(store(state)?, &username, json).await
        }
        Command::FindByService { service } => {
            credential::find_by_service(store(state)?, &service, json).await
        }
        Command::FindByBoth { key } => credential::find_by_both(store(state)?, &key, json).await,
        Command::ShowAll => credential::show_all(store(state)?, mask, json).await,
    }
}
