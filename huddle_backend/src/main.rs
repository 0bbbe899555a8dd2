use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};
use huddle_backend::cli;
use huddle_backend::config::Latency;
use huddle_backend::models::Session;
use huddle_backend::services::Services;
use huddle_backend::telemetry;

#[derive(Parser)]
#[command(author, version, about = "Huddle simulated services demo and CLI")]
struct Args {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run a scripted tour that exercises every service once
    Demo,
    /// Start the interactive CLI over the seeded services
    Cli,
}

#[tokio::main]
async fn main() -> Result<()> {
    telemetry::init_tracing();

    let args = Args::parse();

    let latency = Latency::from_env();
    let services = Arc::new(Services::seeded(latency)?);
    let session = Session::new("you", "You");
    tracing::info!(actor = %session.actor_id, "services seeded");

    match args.command.unwrap_or(Command::Cli) {
        Command::Demo => cli::run_demo(services, session).await,
        Command::Cli => cli::run_cli(services, session).await,
    }
}
