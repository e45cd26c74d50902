//! Trip Planner: plan a trip with an AI assistant from the terminal
//!
//! Collects trip details, asks a Gemini model for a day-by-day itinerary and
//! keeps a bounded text context for refining it in a conversation.

pub mod cli;
pub mod config;
pub mod constants;
pub mod conversation;
pub mod input;
pub mod llm;
pub mod logging;
pub mod output;
pub mod prompts;
pub mod session;
pub mod trip;
