// demos/storefront_client/src/main.rs

// Declare modules for the application
mod commands;
mod config;
mod errors;
mod render;
mod state;

use crate::config::AppConfig;
use crate::state::AppState;

use clap::{Parser, Subcommand};
use std::process::ExitCode;
use tracing::Level;
use tracing_subscriber::fmt::format::FmtSpan; // For span events in tracing
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "storefront_client", about = "Confirm purchases and follow their stock validation.")]
struct Cli {
  /// Bearer token; overrides VENTAS_ACCESS_TOKEN.
  #[arg(long, global = true)]
  token: Option<String>,

  /// Print machine-readable JSON instead of es-AR text.
  #[arg(long, global = true)]
  json: bool,

  #[command(subcommand)]
  command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
  /// Follow an existing purchase until its stock decision arrives.
  Watch { purchase_id: String },
  /// Confirm the current cart, then follow the new purchase.
  Confirm {
    #[arg(long)]
    discount: Option<String>,
    #[arg(long)]
    no_watch: bool,
  },
  /// List the signed-in customer's purchases.
  List,
}

fn init_tracing() {
  let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(Level::INFO.as_str()));
  let builder = tracing_subscriber::fmt()
    .with_env_filter(filter) // Allow RUST_LOG override
    .with_span_events(FmtSpan::CLOSE) // Log when spans close, showing duration
    .with_writer(std::io::stderr);
  if std::env::var("LOG_FORMAT").map(|v| v.eq_ignore_ascii_case("json")).unwrap_or(false) {
    builder.json().init();
  } else {
    builder.init();
  }
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
  let cli = Cli::parse();
  init_tracing();

  tracing::info!("Starting storefront client...");

  let config = match AppConfig::from_env() {
    Ok(cfg) => cfg.with_token_override(cli.token.clone()),
    Err(e) => {
      tracing::error!(error = %e, "Failed to load application configuration.");
      return Ok(ExitCode::from(e.exit_status()));
    }
  };
  let state = AppState::build(config)?;

  let outcome = match cli.command {
    Command::Watch { purchase_id } => commands::watch::run(&state, &purchase_id, cli.json).await,
    Command::Confirm { discount, no_watch } => commands::confirm::run(&state, discount, no_watch, cli.json).await,
    Command::List => commands::list::run(&state, cli.json).await,
  };

  match outcome {
    Ok(()) => Ok(ExitCode::SUCCESS),
    Err(e) => {
      tracing::error!(error = %e, "Command failed.");
      if let errors::AppError::Purchase(classified) = &e {
        eprintln!("{}", render::render_error(classified));
      }
      Ok(ExitCode::from(e.exit_status()))
    }
  }
}
