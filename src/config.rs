//! Configuration for the trip planner
//!
//! Built once at startup from the command line and the process environment,
//! then handed to the backend factory and the session.

use std::fmt;
use thiserror::Error;

use crate::cli::Cli;
use crate::constants::{API_BASE_ENV_VAR, API_KEY_ENV_VARS};
use crate::conversation::TruncationConfig;
use crate::llm::gemini::API_BASE_URL;

/// Errors raised while assembling the configuration
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Please set the {} environment variable (or add it to a .env file)", API_KEY_ENV_VARS.join(" or "))]
    MissingApiKey,
}

/// Application configuration structure
#[derive(Clone)]
pub struct Config {
    /// Credential for the generation API
    pub api_key: String,

    /// Model name to use (will infer provider from this)
    pub model: String,

    /// Root URL of the generation API
    pub api_base_url: String,

    /// Timeout for a single model request
    pub request_timeout_secs: u64,

    /// Attempts per model request, including the first one
    pub max_attempts: u32,

    /// Context trimming policy
    pub truncation: TruncationConfig,

    /// Delay between characters of the typing effect
    pub typing_delay_ms: u64,

    /// Whether replies are printed with the typing effect
    pub typing_effect: bool,

    /// Whether the terminal is cleared between steps
    pub clear_screen: bool,

    /// Whether ANSI styling is written to the terminal
    pub styled_output: bool,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("api_key", &"<redacted>")
            .field("model", &self.model)
            .field("api_base_url", &self.api_base_url)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("max_attempts", &self.max_attempts)
            .field("truncation", &self.truncation)
            .field("typing_delay_ms", &self.typing_delay_ms)
            .field("typing_effect", &self.typing_effect)
            .field("clear_screen", &self.clear_screen)
            .field("styled_output", &self.styled_output)
            .finish()
    }
}

impl Config {
    /// Build the configuration from parsed arguments and the process environment
    pub fn from_cli(cli: &Cli) -> Result<Self, ConfigError> {
        Self::from_cli_with_env(cli, |name| std::env::var(name).ok())
    }

    /// Build the configuration with a custom environment lookup
    pub fn from_cli_with_env<F>(cli: &Cli, env: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_key = API_KEY_ENV_VARS
            .iter()
            .filter_map(|name| env(name))
            .map(|value| value.trim().to_string())
            .find(|value| !value.is_empty())
            .ok_or(ConfigError::MissingApiKey)?;

        let api_base_url = env(API_BASE_ENV_VAR)
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
            .unwrap_or_else(|| API_BASE_URL.to_string());

        Ok(Self {
            api_key,
            model: cli.model.clone(),
            api_base_url,
            request_timeout_secs: cli.timeout_secs,
            max_attempts: cli.max_attempts,
            truncation: TruncationConfig {
                max_chars: cli.max_context_chars,
                // More lines than the platform can address means keep them all
                keep_lines: usize::try_from(cli.keep_lines).unwrap_or(usize::MAX),
            },
            typing_delay_ms: cli.typing_delay_ms,
            typing_effect: !cli.no_typing,
            clear_screen: !cli.no_clear,
            styled_output: true,
        })
    }

    /// Disable terminal effects when output is not an interactive terminal
    pub fn for_non_terminal(mut self) -> Self {
        self.typing_effect = false;
        self.clear_screen = false;
        self.styled_output = false;
        self
    }

    #[cfg(test)]
    pub fn for_tests(model: &str) -> Self {
        Self {
            api_key: "test-key".to_string(),
            model: model.to_string(),
            api_base_url: API_BASE_URL.to_string(),
            request_timeout_secs: 5,
            max_attempts: 1,
            truncation: TruncationConfig::default(),
            typing_delay_ms: 0,
            typing_effect: false,
            clear_screen: false,
            styled_output: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use std::collections::HashMap;

    fn env_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_missing_api_key_is_an_error() {
        let cli = Cli::parse_from(["trip-planner"]);
        let err = Config::from_cli_with_env(&cli, env_from(&[])).unwrap_err();
        assert_eq!(err, ConfigError::MissingApiKey);
        assert!(err.to_string().contains("GEMINI_API_KEY"));
    }

    #[test]
    fn test_blank_api_key_is_missing() {
        let cli = Cli::parse_from(["trip-planner"]);
        let result = Config::from_cli_with_env(&cli, env_from(&[("GEMINI_API_KEY", "  ")]));
        assert_eq!(result.unwrap_err(), ConfigError::MissingApiKey);
    }

    #[test]
    fn test_google_api_key_fallback() {
        let cli = Cli::parse_from(["trip-planner"]);
        let config =
            Config::from_cli_with_env(&cli, env_from(&[("GOOGLE_API_KEY", "g-key")])).unwrap();
        assert_eq!(config.api_key, "g-key");

        let config = Config::from_cli_with_env(
            &cli,
            env_from(&[("GOOGLE_API_KEY", "g-key"), ("GEMINI_API_KEY", "gem-key")]),
        )
        .unwrap();
        assert_eq!(config.api_key, "gem-key");
    }

    #[test]
    fn test_cli_values_flow_into_config() {
        let cli = Cli::parse_from([
            "trip-planner",
            "--model",
            "gemini-1.5-flash",
            "--max-context-chars",
            "2000",
            "--keep-lines",
            "40",
            "--no-typing",
            "--timeout-secs",
            "30",
        ]);
        let config = Config::from_cli_with_env(
            &cli,
            env_from(&[("GEMINI_API_KEY", "k"), ("GEMINI_API_BASE", "http://localhost:9000")]),
        )
        .unwrap();

        assert_eq!(config.model, "gemini-1.5-flash");
        assert_eq!(
            config.truncation,
            TruncationConfig {
                max_chars: 2000,
                keep_lines: 40
            }
        );
        assert!(!config.typing_effect);
        assert!(config.clear_screen);
        assert_eq!(config.request_timeout_secs, 30);
        assert_eq!(config.api_base_url, "http://localhost:9000");
    }

    #[test]
    fn test_huge_keep_lines_is_not_wrapped() {
        let cli = Cli::parse_from(["trip-planner", "--keep-lines", "18446744073709551615"]);
        let config = Config::from_cli_with_env(&cli, env_from(&[("GEMINI_API_KEY", "k")])).unwrap();
        assert_eq!(config.truncation.keep_lines, usize::MAX);
    }

    #[test]
    fn test_debug_output_redacts_api_key() {
        let config = Config::for_tests("gemini-1.5-pro");
        let rendered = format!("{:?}", config);
        assert!(!rendered.contains("test-key"));
        assert!(rendered.contains("<redacted>"));
    }

    #[test]
    fn test_non_terminal_disables_effects() {
        let mut config = Config::for_tests("gemini-1.5-pro");
        config.typing_effect = true;
        config.clear_screen = true;
        config.styled_output = true;
        let config = config.for_non_terminal();
        assert!(!config.typing_effect);
        assert!(!config.clear_screen);
        assert!(!config.styled_output);
    }
}
