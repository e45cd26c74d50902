//! Rolling conversation context
//!
//! The whole transcript is resent to the model on every refinement turn.
//! It always starts with the system preamble and the itinerary the
//! conversation is about, followed by the rendered turns.

use std::fmt;

use crate::constants::{ITINERARY_LEAD_IN, SYSTEM_PROMPT};

use super::truncation::{truncate_transcript, TruncationConfig, TruncationResult};

/// Who produced a turn
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Speaker {
    User,
    Assistant,
}

impl Speaker {
    pub fn label(&self) -> &'static str {
        match self {
            Speaker::User => "User",
            Speaker::Assistant => "Assistant",
        }
    }
}

impl fmt::Display for Speaker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Render a single turn the way it is stored in the transcript
pub fn render_turn(speaker_label: &str, utterance: &str) -> String {
    format!("{}: {}\n\n", speaker_label, utterance)
}

/// Transcript buffer for one planning session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversationContext {
    preamble: String,
    itinerary: String,
    transcript: String,
}

impl ConversationContext {
    /// Create a context whose content is exactly `preamble + itinerary`
    pub fn new(preamble: impl Into<String>, itinerary: impl Into<String>) -> Self {
        let preamble = preamble.into();
        let itinerary = itinerary.into();
        let mut transcript = String::with_capacity(preamble.len() + itinerary.len());
        transcript.push_str(&preamble);
        transcript.push_str(&itinerary);

        Self {
            preamble,
            itinerary,
            transcript,
        }
    }

    /// Seed a context with the standard system prompt for a generated itinerary
    pub fn for_itinerary(itinerary: &str) -> Self {
        Self::new(
            format!("{}\n\n{}\n\n", SYSTEM_PROMPT, ITINERARY_LEAD_IN),
            format!("{}\n\n", itinerary),
        )
    }

    pub fn content(&self) -> &str {
        &self.transcript
    }

    /// Length in characters, the unit the truncation threshold is measured in
    pub fn char_len(&self) -> usize {
        self.transcript.chars().count()
    }

    /// Append `"{speaker_label}: {utterance}\n\n"`
    pub fn append_turn(&mut self, speaker_label: &str, utterance: &str) {
        self.transcript.push_str(&render_turn(speaker_label, utterance));
    }

    /// Text sent to the model for the next user utterance; does not record the turn
    pub fn prompt_for(&self, utterance: &str) -> String {
        let mut prompt = self.transcript.clone();
        prompt.push_str(&render_turn(Speaker::User.label(), utterance));
        prompt
    }

    /// Apply the truncation policy, returning what changed if anything did
    pub fn maybe_truncate(&mut self, config: &TruncationConfig) -> Option<TruncationResult> {
        let original_chars = self.char_len();
        let truncated =
            truncate_transcript(&self.transcript, &self.preamble, &self.itinerary, config)?;

        let kept_lines = truncated[self.preamble.len() + self.itinerary.len()..]
            .split('\n')
            .count();
        self.transcript = truncated;

        Some(TruncationResult {
            original_chars,
            truncated_chars: self.char_len(),
            kept_lines,
        })
    }

    /// Record a completed exchange and apply the truncation policy
    ///
    /// Only called once the model has answered, so a failed request never
    /// leaves a dangling user turn behind.
    pub fn commit_exchange(
        &mut self,
        utterance: &str,
        reply: &str,
        config: &TruncationConfig,
    ) -> Option<TruncationResult> {
        self.append_turn(Speaker::User.label(), utterance);
        self.append_turn(Speaker::Assistant.label(), reply);
        self.maybe_truncate(config)
    }
}
