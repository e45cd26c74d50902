//! Conversation truncation
//!
//! The transcript resent to the model grows by two turns per exchange. Once
//! it passes a character threshold it is rebuilt from the preserved prefix
//! (system preamble and itinerary) followed by the trailing lines of the
//! pre-truncation transcript.
//!
//! The cut is measured in lines, not characters or tokens, so a single very
//! long line can leave the result well above or below the threshold. The
//! tail window never reaches back into the preserved prefix: when the last
//! `keep_lines` lines would overlap it, only the text after the prefix is
//! kept and the prefix is not repeated.

use tracing::debug;

use crate::constants::{DEFAULT_KEEP_LINES, DEFAULT_MAX_CONTEXT_CHARS};

/// Configuration for transcript truncation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TruncationConfig {
    /// Transcript length (in characters) above which truncation happens
    pub max_chars: usize,

    /// Number of trailing lines of the old transcript to keep
    pub keep_lines: usize,
}

impl Default for TruncationConfig {
    fn default() -> Self {
        Self {
            max_chars: DEFAULT_MAX_CONTEXT_CHARS,
            keep_lines: DEFAULT_KEEP_LINES,
        }
    }
}

/// Result of a truncation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TruncationResult {
    /// Character length before truncation
    pub original_chars: usize,

    /// Character length after truncation
    pub truncated_chars: usize,

    /// Lines of history carried over after the prefix
    pub kept_lines: usize,
}

impl TruncationResult {
    pub fn removed_chars(&self) -> usize {
        self.original_chars.saturating_sub(self.truncated_chars)
    }
}

/// Whether a transcript is over the configured threshold
pub fn should_truncate(transcript: &str, config: &TruncationConfig) -> bool {
    transcript.chars().count() > config.max_chars
}

/// Byte offset at which the last `keep_lines` `'\n'`-separated lines start
///
/// Splitting on `'\n'` and re-joining the tail with `'\n'` yields exactly
/// `&text[offset..]`, so the tail is a verbatim suffix.
fn tail_offset(text: &str, keep_lines: usize) -> usize {
    if keep_lines == 0 {
        return text.len();
    }

    text.rmatch_indices('\n')
        .nth(keep_lines - 1)
        .map(|(idx, _)| idx + 1)
        .unwrap_or(0)
}

/// Rebuild `transcript` as `preamble + itinerary + tail` if it is too long
///
/// Returns `None` when the transcript is within the threshold.
pub fn truncate_transcript(
    transcript: &str,
    preamble: &str,
    itinerary: &str,
    config: &TruncationConfig,
) -> Option<String> {
    if !should_truncate(transcript, config) {
        return None;
    }

    let prefix_len = preamble.len() + itinerary.len();
    let has_prefix = transcript.starts_with(preamble)
        && transcript[preamble.len()..].starts_with(itinerary);

    let mut start = tail_offset(transcript, config.keep_lines);
    if has_prefix {
        start = start.max(prefix_len);
    }

    let tail = &transcript[start..];
    let mut truncated = String::with_capacity(prefix_len + tail.len());
    truncated.push_str(preamble);
    truncated.push_str(itinerary);
    truncated.push_str(tail);

    debug!(
        original_bytes = transcript.len(),
        truncated_bytes = truncated.len(),
        "truncated conversation context"
    );

    Some(truncated)
}
