//! Pokefetch - command-line entry point
//!
//! Reads settings from the environment, applies command-line overrides,
//! wires the clients once and runs a single command.

use std::process::ExitCode;

use chrono::Utc;
use clap::Parser;
use pokefetch::cli::{Cli, Command};
use pokefetch::{App, AppError};
use pokefetch_infrastructure::{Settings, to_json_pretty};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let mut settings = Settings::from_env()?;
    cli.apply(&mut settings);
    settings.validate()?;

    tracing::debug!(adapter = %settings.adapter, base = %settings.rest_base_url, "starting");
    let mut app = App::from_settings(&settings).await?;

    match run(&mut app, cli.command).await {
        Ok(code) => Ok(code),
        Err(AppError::Client(e)) => {
            eprintln!("error: {e}");
            Ok(ExitCode::FAILURE)
        }
        Err(e) => Err(e.into()),
    }
}

async fn run(app: &mut App, command: Command) -> Result<ExitCode, AppError> {
    match command {
        Command::Pokemon { name } => {
            let result = app.pokemon(&name).await?;
            if result.is_not_found() {
                eprintln!("{name} not found");
                return Ok(ExitCode::FAILURE);
            }
            match result.into_result() {
                Ok(data) => print_json(&data),
                Err(message) => {
                    eprintln!("error: {message}");
                    return Ok(ExitCode::FAILURE);
                }
            }
        }
        Command::Graphql {
            query,
            variables,
            operation_name,
            kind,
        } => {
            let response = app
                .graphql(&kind, &query, variables.as_deref(), operation_name.as_deref())
                .await?;
            print_json(&response);
            if response.has_errors() {
                return Ok(ExitCode::FAILURE);
            }
        }
        Command::History { clear } => {
            let now = Utc::now();
            for item in app.history(clear).await? {
                println!("{:<8} {:<20} {}", item.id, item.name, item.viewed_ago(now));
            }
        }
    }
    Ok(ExitCode::SUCCESS)
}

fn print_json<T: serde::Serialize>(value: &T) {
    match to_json_pretty(value) {
        Ok(json) => print!("{json}"),
        Err(e) => eprintln!("error: {e}"),
    }
}
