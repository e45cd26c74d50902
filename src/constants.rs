// Terminal formatting codes shared by the output module and status messages
pub const FORMAT_RESET: &str = "\x1b[0m";
pub const FORMAT_BOLD: &str = "\x1b[1m";
pub const FORMAT_GRAY: &str = "\x1b[90m";
pub const FORMAT_GREEN: &str = "\x1b[32m";
pub const FORMAT_BRIGHT_BLUE: &str = "\x1b[94m";
pub const FORMAT_CYAN: &str = "\x1b[36m";

/// Default Gemini model used when `--model` is not supplied
pub const DEFAULT_MODEL: &str = "gemini-1.5-pro";

/// Context length (in characters) above which the transcript is trimmed
pub const DEFAULT_MAX_CONTEXT_CHARS: usize = 10_000;

/// Number of trailing transcript lines kept when trimming
pub const DEFAULT_KEEP_LINES: usize = 500;

/// Delay between characters of the typing effect
pub const DEFAULT_TYPING_DELAY_MS: u64 = 1;

/// An initial itinerary shorter than this (after trimming) aborts the planning attempt
pub const MIN_ITINERARY_CHARS: usize = 10;

/// Environment variables consulted for the API credential, in order
pub const API_KEY_ENV_VARS: &[&str] = &["GEMINI_API_KEY", "GOOGLE_API_KEY"];

/// Environment variable overriding the Gemini endpoint base URL
pub const API_BASE_ENV_VAR: &str = "GEMINI_API_BASE";

/// Instructions seeded at the top of every conversation context
pub const SYSTEM_PROMPT: &str = r#"You are a helpful travel planning assistant that creates detailed trip itineraries.
Your goal is to create personalized travel plans based on user preferences.
When creating itineraries, include:
- Day-by-day breakdown of activities
- Recommended accommodations
- Food and restaurant suggestions
- Transportation options
- Estimated costs
- Local tips and insights
- Practical information like weather considerations and cultural etiquette

Only ask for one piece of information at a time. Wait for the user to respond before asking another question.
"#;

/// Lead-in placed between the system prompt and the generated itinerary
pub const ITINERARY_LEAD_IN: &str = "I've created the following itinerary:";

pub const WELCOME_TITLE: &str = "🌍 WELCOME TO TRIP PLANNER AI 🌍";

pub const WELCOME_MESSAGE: &str =
    "Let's plan your perfect trip! I'll need some basic details to get started.";

pub const CHAT_INSTRUCTIONS: &str = r#"💬 You can now chat with me to refine your itinerary.
Type 'exit' to quit, 'new' to start a new itinerary."#;

pub const FAREWELL_MESSAGE: &str = "Thank you for using Trip Planner AI! Safe travels! 🧳✈️";

/// Width of the `=` rulers framing banners
pub const RULER_WIDTH: usize = 50;
