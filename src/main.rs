//! Trip Planner command-line entry point

use std::io::{self, Write};
use std::process::ExitCode;

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use crossterm::{
    cursor, execute,
    style::{Color, Print, ResetColor, SetForegroundColor},
};
use tracing::info;

use trip_planner::cli::Cli;
use trip_planner::config::Config;
use trip_planner::constants::FAREWELL_MESSAGE;
use trip_planner::llm::create_backend;
use trip_planner::logging;
use trip_planner::output::{Console, ConsoleOptions};
use trip_planner::prompts::build_prompt;
use trip_planner::session::Session;

#[tokio::main]
async fn main() -> Result<ExitCode> {
    // Load environment variables from .env file
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    logging::init(cli.verbose);

    if cli.print_prompt {
        let trip = cli.trip_parameters().ok_or_else(|| {
            anyhow!("--print-prompt needs --destination, --days, --travelers and --budget")
        })?;
        println!("{}", build_prompt(&trip)?);
        return Ok(ExitCode::SUCCESS);
    }

    let config = match Config::from_cli(&cli) {
        Ok(config) => config,
        Err(e) => {
            print_error(&format!("Error loading configuration: {}", e))?;
            return Ok(ExitCode::FAILURE);
        }
    };

    let config = if atty::is(atty::Stream::Stdout) {
        config
    } else {
        config.for_non_terminal()
    };
    info!(model = %config.model, "Starting trip planner");

    let backend = match create_backend(&config) {
        Ok(backend) => backend,
        Err(e) => {
            print_error(&format!("Failed to create model client: {}", e))?;
            return Ok(ExitCode::FAILURE);
        }
    };

    ctrlc::set_handler(|| {
        println!("\n\n{}", FAREWELL_MESSAGE);
        std::process::exit(0);
    })
    .context("Failed to install the Ctrl-C handler")?;

    let console = Console::new(io::stdout(), ConsoleOptions::from_config(&config));
    let mut session = Session::new(backend, io::stdin().lock(), console, config.truncation)?
        .with_trip(cli.trip_parameters());

    session.run().await?;
    Ok(ExitCode::SUCCESS)
}

fn print_error(message: &str) -> io::Result<()> {
    let mut stderr = io::stderr();
    execute!(
        stderr,
        SetForegroundColor(Color::Red),
        Print(message),
        ResetColor,
        cursor::MoveToNextLine(1),
    )?;
    stderr.flush()
}
