//! Line-oriented terminal I/O

use anyhow::{Context, Result};
use std::io::{BufRead, Write};

/// Prompt/print helper over any reader and writer
pub struct Console<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> Console<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    /// Print `prompt` and read one trimmed line; `None` at end of input
    pub fn line(&mut self, prompt: &str) -> Result<Option<String>> {
        write!(self.output, "{}", prompt)?;
        self.output.flush()?;

        let mut buf = String::new();
        let read = self
            .input
            .read_line(&mut buf)
            .context("Failed to read from terminal")?;
        if read == 0 {
            return Ok(None);
        }
        Ok(Some(buf.trim().to_string()))
    }

    /// Like [`line`](Self::line) but end of input reads as an empty answer
    pub fn ask(&mut self, prompt: &str) -> Result<String> {
        Ok(self.line(prompt)?.unwrap_or_default())
    }

    /// Yes/no question where an empty answer means yes
    pub fn confirm(&mut self, prompt: &str) -> Result<bool> {
        let answer = self.ask(prompt)?.to_lowercase();
        Ok(matches!(answer.as_str(), "" | "y" | "yes"))
    }

    pub fn say(&mut self, message: impl std::fmt::Display) -> Result<()> {
        writeln!(self.output, "{}", message)?;
        Ok(())
    }

    #[cfg(test)]
    pub fn output(&self) -> &W {
        &self.output
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_line_and_eof() {
        let mut console = Console::new(Cursor::new("  hello \n"), Vec::new());

        assert_eq!(console.line("> ").unwrap(), Some("hello".to_string()));
        assert_eq!(console.line("> ").unwrap(), None);
        assert_eq!(String::from_utf8_lossy(console.output()), "> > ");
    }

    #[test]
    fn test_confirm_defaults_to_yes() {
        let mut console = Console::new(Cursor::new("\nn\nYES\n"), Vec::new());

        assert!(console.confirm("?").unwrap());
        assert!(!console.confirm("?").unwrap());
        assert!(console.confirm("?").unwrap());
    }
}
