//! Conversation management
//!
//! Holds the transcript resent to the model on every refinement turn and the
//! policy that keeps it from growing without bound.

mod context;
mod truncation;

pub use context::{render_turn, ConversationContext, Speaker};
pub use truncation::{should_truncate, truncate_transcript, TruncationConfig, TruncationResult};
