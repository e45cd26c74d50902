//! Itinerary styling
//!
//! Highlights day headings and section labels in model replies with ANSI
//! codes, and strips those codes again for plain output.

use lazy_static::lazy_static;
use regex::Regex;

use crate::constants::{FORMAT_BOLD, FORMAT_BRIGHT_BLUE, FORMAT_RESET};

lazy_static! {
    static ref DAY_HEADING: Regex = Regex::new(r"(Day \d+:)").expect("valid day regex");
    static ref SECTION_LABEL: Regex =
        Regex::new(r"([A-Za-z]+ & [A-Za-z]+:|[A-Za-z]+ Options:|[A-Za-z]+:)")
            .expect("valid section regex");
    static ref CSI_SEQUENCE: Regex =
        Regex::new(r"\x1b\[[^A-Za-z]*[A-Za-z]").expect("valid escape sequence regex");
}

/// Style a model reply for the terminal
///
/// `Day N:` headings start on a fresh line in bold blue; labels such as
/// `Food & Drink:`, `Transportation Options:` or `Tip:` are bold.
pub fn format_itinerary(text: &str) -> String {
    let day_replacement = format!("\n{}{}${{1}}{}", FORMAT_BOLD, FORMAT_BRIGHT_BLUE, FORMAT_RESET);
    let with_days = DAY_HEADING.replace_all(text, day_replacement.as_str());

    let label_replacement = format!("{}${{1}}{}", FORMAT_BOLD, FORMAT_RESET);
    SECTION_LABEL
        .replace_all(&with_days, label_replacement.as_str())
        .into_owned()
}

/// Strips ANSI escape sequences
///
/// Handles colour and style codes as well as cursor movement and screen
/// clearing sequences: everything from `ESC [` up to the first letter. An
/// unterminated sequence is left as it is.
pub fn strip_ansi_sequences(text: &str) -> String {
    CSI_SEQUENCE.replace_all(text, "").into_owned()
}
