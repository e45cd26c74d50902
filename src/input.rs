//! Interactive collection of trip parameters
//!
//! Asks the questions one at a time and re-prompts until each answer is
//! valid. Generic over the reader and writer so tests can script a session.

use std::io::{self, BufRead, Write};
use thiserror::Error;
use tracing::debug;

use crate::output::Console;
use crate::trip::{parse_positive_count, BudgetTier, TripError, TripParameters};

const DESTINATION_QUESTION: &str =
    "Where would you like to go? (e.g., 'Paris', 'Japan', 'Costa Rica'): ";
const DAYS_QUESTION: &str = "How many days will you be traveling? (e.g., 3, 7, 14): ";
const TRAVELERS_QUESTION: &str = "How many people are traveling? (e.g., 1, 2, 4): ";
const BUDGET_QUESTION: &str = "What's your budget level? (budget/mid-range/luxury): ";
const INTERESTS_QUESTION: &str =
    "What are your interests? (e.g., 'history, food, hiking', or press Enter to skip): ";

#[derive(Error, Debug)]
pub enum InputError {
    /// The input stream closed before an answer was given
    #[error("End of input")]
    Eof,

    #[error("Failed to read input: {0}")]
    Io(#[from] io::Error),
}

/// Read one line, without its line terminator
pub fn read_line<R: BufRead>(input: &mut R) -> Result<String, InputError> {
    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Err(InputError::Eof);
    }

    let trimmed_len = line.trim_end_matches(['\r', '\n']).len();
    line.truncate(trimmed_len);
    Ok(line)
}

fn ask<R: BufRead, W: Write>(
    input: &mut R,
    console: &mut Console<W>,
    question: &str,
) -> Result<String, InputError> {
    console.prompt(question)?;
    read_line(input)
}

fn ask_count<R: BufRead, W: Write>(
    input: &mut R,
    console: &mut Console<W>,
    question: &str,
) -> Result<u32, InputError> {
    loop {
        let answer = ask(input, console, question)?;
        match parse_positive_count(&answer) {
            Ok(count) => return Ok(count),
            Err(TripError::NotPositive(_)) => console.line("Please enter a positive number.")?,
            Err(_) => console.line("Please enter a valid number.")?,
        }
    }
}

/// Ask every trip question in order and return the validated answers
pub fn collect_trip_parameters<R: BufRead, W: Write>(
    input: &mut R,
    console: &mut Console<W>,
) -> Result<TripParameters, InputError> {
    let destination = loop {
        let answer = ask(input, console, DESTINATION_QUESTION)?;
        let answer = answer.trim();
        if !answer.is_empty() {
            break answer.to_string();
        }
        console.line("Please enter a destination.")?;
    };

    let days = ask_count(input, console, DAYS_QUESTION)?;
    let travelers = ask_count(input, console, TRAVELERS_QUESTION)?;

    let budget = loop {
        let answer = ask(input, console, BUDGET_QUESTION)?;
        match answer.parse::<BudgetTier>() {
            Ok(budget) => break budget,
            Err(_) => console.line("Please enter 'budget', 'mid-range', or 'luxury'.")?,
        }
    };

    let interests = ask(input, console, INTERESTS_QUESTION)?;

    let trip = TripParameters::new(destination, days, travelers, budget, Some(interests));
    debug!(
        destination = %trip.destination,
        days = trip.days,
        travelers = trip.travelers,
        budget = %trip.budget,
        "Collected trip parameters"
    );
    Ok(trip)
}
