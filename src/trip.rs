//! Trip parameters collected before the first itinerary is generated

use serde::Serialize;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Errors raised while parsing user-supplied trip values
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TripError {
    #[error("'{0}' is not a valid number")]
    NotANumber(String),

    #[error("{0} must be a positive number")]
    NotPositive(i64),

    #[error("unknown budget level '{0}', expected budget, mid-range or luxury")]
    UnknownBudget(String),
}

/// Spending level for the trip
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum BudgetTier {
    #[serde(rename = "budget")]
    Budget,
    #[serde(rename = "mid-range")]
    MidRange,
    #[serde(rename = "luxury")]
    Luxury,
}

impl BudgetTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            BudgetTier::Budget => "budget",
            BudgetTier::MidRange => "mid-range",
            BudgetTier::Luxury => "luxury",
        }
    }
}

impl fmt::Display for BudgetTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BudgetTier {
    type Err = TripError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "budget" => Ok(BudgetTier::Budget),
            "mid-range" => Ok(BudgetTier::MidRange),
            "luxury" => Ok(BudgetTier::Luxury),
            _ => Err(TripError::UnknownBudget(s.trim().to_string())),
        }
    }
}

/// Parse a strictly positive count such as the number of days or travelers
pub fn parse_positive_count(input: &str) -> Result<u32, TripError> {
    let trimmed = input.trim();
    let value: i64 = trimmed
        .parse()
        .map_err(|_| TripError::NotANumber(trimmed.to_string()))?;

    if value <= 0 {
        return Err(TripError::NotPositive(value));
    }

    u32::try_from(value).map_err(|_| TripError::NotANumber(trimmed.to_string()))
}

/// Everything the prompt builder needs to describe a trip
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TripParameters {
    pub destination: String,
    pub days: u32,
    pub travelers: u32,
    pub budget: BudgetTier,
    /// Free-text interests; `None` when the user skipped the question
    pub interests: Option<String>,
}

impl TripParameters {
    pub fn new(
        destination: impl Into<String>,
        days: u32,
        travelers: u32,
        budget: BudgetTier,
        interests: Option<String>,
    ) -> Self {
        Self {
            destination: destination.into(),
            days,
            travelers,
            budget,
            interests: interests
                .map(|i| i.trim().to_string())
                .filter(|i| !i.is_empty()),
        }
    }
}
