//! The interactive planning session
//!
//! One session runs trips back to back: collect the parameters, generate an
//! itinerary, then refine it in a chat until the user types `exit` or asks
//! for a `new` trip.

use std::io::{self, BufRead, Write};
use thiserror::Error;
use tracing::{debug, error, info};

use crate::constants::{
    CHAT_INSTRUCTIONS, FAREWELL_MESSAGE, FORMAT_BOLD, FORMAT_CYAN, FORMAT_GRAY, FORMAT_GREEN,
    FORMAT_RESET, MIN_ITINERARY_CHARS, WELCOME_MESSAGE, WELCOME_TITLE,
};
use crate::conversation::{ConversationContext, TruncationConfig};
use crate::input::{collect_trip_parameters, read_line, InputError};
use crate::llm::Backend;
use crate::output::{format_itinerary, Console};
use crate::prompts::{PromptBuilder, PromptError};
use crate::trip::TripParameters;

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("Terminal I/O failed: {0}")]
    Io(#[from] io::Error),

    #[error(transparent)]
    Prompt(#[from] PromptError),
}

/// A line typed at the chat prompt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Exit,
    New,
    Empty,
    Utterance(String),
}

impl Command {
    pub fn parse(line: &str) -> Self {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            Command::Empty
        } else if trimmed.eq_ignore_ascii_case("exit") {
            Command::Exit
        } else if trimmed.eq_ignore_ascii_case("new") {
            Command::New
        } else {
            Command::Utterance(trimmed.to_string())
        }
    }
}

enum ChatOutcome {
    Exit,
    NewTrip,
}

pub struct Session<R: BufRead, W: Write> {
    backend: Box<dyn Backend>,
    input: R,
    console: Console<W>,
    prompts: PromptBuilder,
    truncation: TruncationConfig,
    prefilled: Option<TripParameters>,
}

impl<R: BufRead, W: Write> Session<R, W> {
    pub fn new(
        backend: Box<dyn Backend>,
        input: R,
        console: Console<W>,
        truncation: TruncationConfig,
    ) -> Result<Self, SessionError> {
        Ok(Self {
            backend,
            input,
            console,
            prompts: PromptBuilder::new()?,
            truncation,
            prefilled: None,
        })
    }

    /// Use these parameters for the first trip instead of asking for them
    pub fn with_trip(mut self, trip: Option<TripParameters>) -> Self {
        self.prefilled = trip;
        self
    }

    pub fn console(&self) -> &Console<W> {
        &self.console
    }

    /// Run trips until the user exits, input ends or an itinerary fails
    pub async fn run(&mut self) -> Result<(), SessionError> {
        loop {
            self.console.clear()?;
            self.console.banner(WELCOME_TITLE)?;
            self.console.info(WELCOME_MESSAGE)?;
            self.console.blank()?;

            let trip = match self.prefilled.take() {
                Some(trip) => trip,
                None => match collect_trip_parameters(&mut self.input, &mut self.console) {
                    Ok(trip) => trip,
                    Err(InputError::Eof) => return self.farewell(),
                    Err(InputError::Io(e)) => return Err(e.into()),
                },
            };

            let Some(mut context) = self.plan_itinerary(&trip).await? else {
                return Ok(());
            };

            match self.chat(&mut context).await? {
                ChatOutcome::Exit => return self.farewell(),
                ChatOutcome::NewTrip => {
                    info!("Starting a new trip");
                }
            }
        }
    }

    /// Generate and show the first itinerary, returning the seeded context
    async fn plan_itinerary(
        &mut self,
        trip: &TripParameters,
    ) -> Result<Option<ConversationContext>, SessionError> {
        self.console.clear()?;
        self.console
            .info("🔄 Generating your personalized travel itinerary...")?;
        self.console.blank()?;

        let prompt = self.prompts.itinerary_prompt(trip)?;
        debug!(
            provider = self.backend.name(),
            model = self.backend.model(),
            prompt_chars = prompt.chars().count(),
            "Requesting itinerary"
        );

        let itinerary = match self.backend.generate(&prompt).await {
            Ok(itinerary) => itinerary,
            Err(e) => {
                error!("Itinerary generation failed: {}", e);
                self.console
                    .error(&format!("Error generating itinerary: {}", e))?;
                return Ok(None);
            }
        };

        if itinerary.trim().chars().count() < MIN_ITINERARY_CHARS {
            self.console
                .error("Received empty or very short response from the model.")?;
            self.console
                .line(&format!("Response received: {}", itinerary))?;
            return Ok(None);
        }

        self.console.clear()?;
        self.console.info(&format!(
            "{}✅ Your itinerary is ready!{}",
            FORMAT_GREEN, FORMAT_RESET
        ))?;
        self.console.blank()?;
        self.console.typed(&format_itinerary(&itinerary)).await?;
        self.console.banner(CHAT_INSTRUCTIONS)?;
        self.console.blank()?;

        Ok(Some(ConversationContext::for_itinerary(&itinerary)))
    }

    async fn chat(&mut self, context: &mut ConversationContext) -> Result<ChatOutcome, SessionError> {
        loop {
            self.console.prompt("You: ")?;
            let line = match read_line(&mut self.input) {
                Ok(line) => line,
                Err(InputError::Eof) => {
                    self.console.blank()?;
                    return Ok(ChatOutcome::Exit);
                }
                Err(InputError::Io(e)) => return Err(e.into()),
            };

            let utterance = match Command::parse(&line) {
                Command::Exit => return Ok(ChatOutcome::Exit),
                Command::New => return Ok(ChatOutcome::NewTrip),
                Command::Empty => continue,
                Command::Utterance(utterance) => utterance,
            };

            self.console
                .info(&format!("{}🔄 Thinking...{}", FORMAT_GRAY, FORMAT_RESET))?;

            let prompt = context.prompt_for(&utterance);
            debug!(prompt_chars = prompt.chars().count(), "Requesting refinement");

            match self.backend.generate(&prompt).await {
                Ok(reply) => {
                    self.console.info(&format!(
                        "{}{}Trip Planner AI:{}",
                        FORMAT_BOLD, FORMAT_CYAN, FORMAT_RESET
                    ))?;
                    self.console.typed(&format_itinerary(&reply)).await?;
                    self.console.blank()?;

                    if let Some(result) = context.commit_exchange(&utterance, &reply, &self.truncation)
                    {
                        debug!(
                            removed_chars = result.removed_chars(),
                            kept_lines = result.kept_lines,
                            "Truncated conversation context"
                        );
                    }
                }
                Err(e) => {
                    error!("Refinement request failed: {}", e);
                    self.console.info(&format!(
                        "Trip Planner AI: Sorry, I encountered an error: {}",
                        e
                    ))?;
                }
            }
        }
    }

    fn farewell(&mut self) -> Result<(), SessionError> {
        self.console.info(FAREWELL_MESSAGE)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::{async_trait, LlmError};
    use crate::output::ConsoleOptions;
    use crate::trip::BudgetTier;
    use std::collections::VecDeque;
    use std::io::Cursor;
    use std::sync::{Arc, Mutex};

    const ITINERARY: &str = "Day 1: Eiffel Tower\nMorning: Louvre\nDay 2: Montmartre";

    struct ScriptedBackend {
        replies: Mutex<VecDeque<Result<String, LlmError>>>,
        prompts: Arc<Mutex<Vec<String>>>,
    }

    #[async_trait]
    impl Backend for ScriptedBackend {
        async fn generate(&self, prompt: &str) -> Result<String, LlmError> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            self.replies
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(LlmError::ApiError("no scripted reply".to_string())))
        }

        fn name(&self) -> &str {
            "scripted"
        }

        fn model(&self) -> &str {
            "scripted-model"
        }
    }

    struct Run {
        output: String,
        prompts: Vec<String>,
    }

    async fn run_session(
        script: &str,
        replies: Vec<Result<String, LlmError>>,
        trip: Option<TripParameters>,
    ) -> Run {
        let prompts = Arc::new(Mutex::new(Vec::new()));
        let backend = ScriptedBackend {
            replies: Mutex::new(replies.into()),
            prompts: prompts.clone(),
        };
        let console = Console::new(Vec::new(), ConsoleOptions::plain());
        let mut session = Session::new(
            Box::new(backend),
            Cursor::new(script.as_bytes().to_vec()),
            console,
            TruncationConfig::default(),
        )
        .unwrap()
        .with_trip(trip);

        session.run().await.unwrap();

        let output = String::from_utf8(session.console().writer().clone()).unwrap();
        let prompts = prompts.lock().unwrap().clone();
        Run { output, prompts }
    }

    const PARIS: &str = "Paris\n3\n2\nmid-range\nfood\n";

    #[test]
    fn test_command_parsing() {
        assert_eq!(Command::parse("exit"), Command::Exit);
        assert_eq!(Command::parse("  EXIT "), Command::Exit);
        assert_eq!(Command::parse("New"), Command::New);
        assert_eq!(Command::parse("   "), Command::Empty);
        assert_eq!(
            Command::parse(" newer plans "),
            Command::Utterance("newer plans".to_string())
        );
    }

    #[tokio::test]
    async fn test_plan_and_refine() {
        let script = format!("{}Make day 2 relaxed\nexit\n", PARIS);
        let run = run_session(
            &script,
            vec![Ok(ITINERARY.to_string()), Ok("Day 2: Picnic by the Seine".to_string())],
            None,
        )
        .await;

        assert_eq!(run.prompts.len(), 2);
        assert!(run.prompts[0].contains("3-day itinerary for 2"));
        assert!(run.prompts[0].contains("Paris"));
        assert!(run.prompts[0].contains("mid-range"));
        assert!(run.prompts[0].contains("food"));
        assert_eq!(
            run.prompts[1],
            ConversationContext::for_itinerary(ITINERARY).prompt_for("Make day 2 relaxed")
        );
        assert!(run.output.contains("Your itinerary is ready!"));
        assert!(run.output.contains("Picnic by the Seine"));
        assert!(run.output.ends_with(&format!("{}\n", FAREWELL_MESSAGE)));
    }

    #[tokio::test]
    async fn test_successful_turns_are_recorded() {
        let script = format!("{}first\nsecond\nexit\n", PARIS);
        let run = run_session(
            &script,
            vec![
                Ok(ITINERARY.to_string()),
                Ok("reply one".to_string()),
                Ok("reply two".to_string()),
            ],
            None,
        )
        .await;

        let mut expected = ConversationContext::for_itinerary(ITINERARY);
        expected.commit_exchange("first", "reply one", &TruncationConfig::default());
        assert_eq!(run.prompts[2], expected.prompt_for("second"));
    }

    #[tokio::test]
    async fn test_failed_turn_leaves_context_unchanged() {
        let script = format!("{}first\nsecond\nexit\n", PARIS);
        let run = run_session(
            &script,
            vec![
                Ok(ITINERARY.to_string()),
                Err(LlmError::ApiError("boom".to_string())),
                Ok("fine".to_string()),
            ],
            None,
        )
        .await;

        assert!(run
            .output
            .contains("Trip Planner AI: Sorry, I encountered an error: API error: boom"));
        assert_eq!(
            run.prompts[2],
            ConversationContext::for_itinerary(ITINERARY).prompt_for("second")
        );
    }

    #[tokio::test]
    async fn test_new_restarts_collection() {
        let script = format!("{}NEW\nRome\n2\n1\nbudget\n\nExit\n", PARIS);
        let run = run_session(
            &script,
            vec![Ok(ITINERARY.to_string()), Ok("Day 1: Colosseum and pasta".to_string())],
            None,
        )
        .await;

        assert_eq!(run.prompts.len(), 2);
        assert!(run.prompts[1].contains("Rome"));
        assert!(run.prompts[1].contains("2-day itinerary for 1"));
        assert_eq!(run.output.matches(WELCOME_TITLE).count(), 2);
        assert_eq!(run.output.matches(FAREWELL_MESSAGE).count(), 1);
    }

    #[tokio::test]
    async fn test_short_itinerary_aborts() {
        let script = format!("{}hello\n", PARIS);
        let run = run_session(&script, vec![Ok("  too short ".to_string())], None).await;

        assert_eq!(run.prompts.len(), 1);
        assert!(run.output.contains("very short response"));
        assert!(!run.output.contains("You can now chat"));
    }

    #[tokio::test]
    async fn test_failed_itinerary_aborts() {
        let run = run_session(
            PARIS,
            vec![Err(LlmError::RateLimitError { retry_after: None })],
            None,
        )
        .await;

        assert_eq!(run.prompts.len(), 1);
        assert!(run
            .output
            .contains("Error generating itinerary: Rate limit exceeded"));
    }

    #[tokio::test]
    async fn test_blank_lines_and_eof_end_quietly() {
        let script = format!("{}\n   \n", PARIS);
        let run = run_session(&script, vec![Ok(ITINERARY.to_string())], None).await;

        assert_eq!(run.prompts.len(), 1);
        assert!(run.output.contains(FAREWELL_MESSAGE));
    }

    #[tokio::test]
    async fn test_eof_during_collection_says_goodbye() {
        let run = run_session("Paris\n", vec![], None).await;
        assert!(run.prompts.is_empty());
        assert!(run.output.contains(FAREWELL_MESSAGE));
    }

    #[tokio::test]
    async fn test_prefilled_trip_skips_questions() {
        let trip = TripParameters::new("Kyoto", 4, 2, BudgetTier::Luxury, None);
        let run = run_session("exit\n", vec![Ok(ITINERARY.to_string())], Some(trip)).await;

        assert!(run.prompts[0].contains("Kyoto"));
        assert!(!run.output.contains("Where would you like to go?"));
    }
}
