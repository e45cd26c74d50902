//! Command-line interface definition and argument parsing
//!
//! This module uses clap to define and parse command-line arguments.

use clap::Parser;

use crate::constants::{
    DEFAULT_KEEP_LINES, DEFAULT_MAX_CONTEXT_CHARS, DEFAULT_MODEL, DEFAULT_TYPING_DELAY_MS,
};
use crate::llm::retry_utils::constants::{DEFAULT_MAX_ATTEMPTS, DEFAULT_TIMEOUT_SECS};
use crate::trip::{parse_positive_count, BudgetTier, TripParameters};

/// Command-line arguments for the trip planner
#[derive(Parser, Debug, Clone)]
#[command(
    name = "trip-planner",
    about = "Plan a trip with an AI assistant and refine the itinerary by chatting",
    version,
    long_about = "Collects trip details, asks a Gemini model for a day-by-day itinerary and lets you refine it in a conversation. Requires GEMINI_API_KEY (or GOOGLE_API_KEY) in the environment or a .env file."
)]
pub struct Cli {
    /// The Gemini model to use (e.g. gemini-1.5-flash or google/gemini-2.0-flash)
    #[arg(long, default_value = DEFAULT_MODEL)]
    pub model: String,

    /// Context length in characters above which older turns are dropped
    #[arg(long, default_value_t = DEFAULT_MAX_CONTEXT_CHARS)]
    pub max_context_chars: usize,

    /// Number of trailing context lines kept when the context is trimmed
    #[arg(long, default_value_t = DEFAULT_KEEP_LINES as u64, value_parser = clap::value_parser!(u64).range(1..))]
    pub keep_lines: u64,

    /// Delay between characters when printing replies, in milliseconds
    #[arg(long, default_value_t = DEFAULT_TYPING_DELAY_MS)]
    pub typing_delay_ms: u64,

    /// Print replies at once instead of simulating typing
    #[arg(long)]
    pub no_typing: bool,

    /// Never clear the terminal between steps
    #[arg(long)]
    pub no_clear: bool,

    /// Timeout for a single model request, in seconds
    #[arg(long, default_value_t = DEFAULT_TIMEOUT_SECS)]
    pub timeout_secs: u64,

    /// Attempts per model request, including the first one
    #[arg(long, default_value_t = DEFAULT_MAX_ATTEMPTS, value_parser = clap::value_parser!(u32).range(1..))]
    pub max_attempts: u32,

    /// Destination for the first trip (skips the question when all trip flags are given)
    #[arg(long)]
    pub destination: Option<String>,

    /// Number of days for the first trip
    #[arg(long, value_parser = parse_count)]
    pub days: Option<u32>,

    /// Number of travelers for the first trip
    #[arg(long, value_parser = parse_count)]
    pub travelers: Option<u32>,

    /// Budget level for the first trip (budget, mid-range, luxury)
    #[arg(long, value_parser = parse_budget)]
    pub budget: Option<BudgetTier>,

    /// Interests for the first trip (e.g. "history, food, hiking")
    #[arg(long)]
    pub interests: Option<String>,

    /// Print the itinerary prompt for the given trip flags and exit
    #[arg(long)]
    pub print_prompt: bool,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

fn parse_count(arg: &str) -> Result<u32, String> {
    parse_positive_count(arg).map_err(|e| e.to_string())
}

fn parse_budget(arg: &str) -> Result<BudgetTier, String> {
    arg.parse::<BudgetTier>().map_err(|e| e.to_string())
}

impl Cli {
    /// Trip parameters supplied entirely on the command line, if complete
    pub fn trip_parameters(&self) -> Option<TripParameters> {
        let destination = self
            .destination
            .as_deref()
            .map(str::trim)
            .filter(|d| !d.is_empty())?;

        Some(TripParameters::new(
            destination,
            self.days?,
            self.travelers?,
            self.budget?,
            self.interests.clone(),
        ))
    }
}
