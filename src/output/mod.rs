//! Terminal presentation
//!
//! [`Console`] owns the output stream and knows how to print banners,
//! status lines and model replies with a typing effect. It never touches the
//! conversation state.

mod format;

pub use format::{format_itinerary, strip_ansi_sequences};

use crossterm::{
    cursor::MoveTo,
    execute,
    terminal::{Clear, ClearType},
};
use std::io::{self, Write};
use std::time::Duration;
use tokio::time::sleep;

use crate::config::Config;
use crate::constants::{FORMAT_BOLD, FORMAT_RESET, RULER_WIDTH};

/// How the console renders text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConsoleOptions {
    /// Delay between characters of typed output; `None` prints at once
    pub typing_delay: Option<Duration>,

    /// Whether `clear` actually clears the terminal
    pub clear_screen: bool,

    /// Whether ANSI styling is kept; stripped otherwise
    pub styled: bool,
}

impl ConsoleOptions {
    pub fn from_config(config: &Config) -> Self {
        Self {
            typing_delay: (config.typing_effect && config.typing_delay_ms > 0)
                .then(|| Duration::from_millis(config.typing_delay_ms)),
            clear_screen: config.clear_screen,
            styled: config.styled_output,
        }
    }

    /// Unstyled, instant output with no screen clearing
    pub fn plain() -> Self {
        Self {
            typing_delay: None,
            clear_screen: false,
            styled: false,
        }
    }
}

/// Output side of the terminal session
pub struct Console<W: Write> {
    out: W,
    options: ConsoleOptions,
}

impl<W: Write> Console<W> {
    pub fn new(out: W, options: ConsoleOptions) -> Self {
        Self { out, options }
    }

    pub fn writer(&self) -> &W {
        &self.out
    }

    fn render(&self, text: &str) -> String {
        if self.options.styled {
            text.to_string()
        } else {
            strip_ansi_sequences(text)
        }
    }

    /// Print a line of text
    pub fn line(&mut self, text: &str) -> io::Result<()> {
        let rendered = self.render(text);
        writeln!(self.out, "{}", rendered)?;
        self.out.flush()
    }

    /// Print an empty line
    pub fn blank(&mut self) -> io::Result<()> {
        self.line("")
    }

    /// Print a question without a trailing newline
    pub fn prompt(&mut self, question: &str) -> io::Result<()> {
        let rendered = self.render(question);
        write!(self.out, "{}", rendered)?;
        self.out.flush()
    }

    pub fn info(&mut self, text: &str) -> io::Result<()> {
        self.line(&format!("\n{}", text))
    }

    pub fn error(&mut self, text: &str) -> io::Result<()> {
        self.line(&format!("{}❌ Error:{} {}", FORMAT_BOLD, FORMAT_RESET, text))
    }

    /// Print a horizontal ruler
    pub fn ruler(&mut self) -> io::Result<()> {
        self.line(&"=".repeat(RULER_WIDTH))
    }

    /// Print text framed by rulers
    pub fn banner(&mut self, text: &str) -> io::Result<()> {
        self.blank()?;
        self.ruler()?;
        self.line(text)?;
        self.ruler()
    }

    /// Print text character by character, followed by a newline
    pub async fn typed(&mut self, text: &str) -> io::Result<()> {
        let rendered = self.render(text);

        match self.options.typing_delay {
            Some(delay) => {
                let mut buf = [0u8; 4];
                for ch in rendered.chars() {
                    self.out.write_all(ch.encode_utf8(&mut buf).as_bytes())?;
                    self.out.flush()?;
                    sleep(delay).await;
                }
                writeln!(self.out)?;
            }
            None => writeln!(self.out, "{}", rendered)?,
        }

        self.out.flush()
    }

    /// Clear the terminal and move the cursor home
    pub fn clear(&mut self) -> io::Result<()> {
        if self.options.clear_screen {
            execute!(self.out, Clear(ClearType::All), MoveTo(0, 0))?;
        }
        Ok(())
    }
}
