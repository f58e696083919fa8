//! The yes/no gate between lookup and mutation.

use std::io::{BufRead, BufReader, Stdin, Stdout, Write};

use anyhow::{Context, Result};

/// Asks for a single go/no-go decision.
pub trait Confirmation: Send {
    /// Show what is about to happen. Called once, before [`confirm`](Self::confirm).
    fn present(&mut self, _listing: &str) -> Result<()> {
        Ok(())
    }

    /// `Ok(true)` to proceed, `Ok(false)` to cancel.
    fn confirm(&mut self, prompt: &str) -> Result<bool>;
}

/// Interpret one answer line. `None` for anything unrecognized.
///
/// ```
/// use cinetag::pipeline::parse_answer;
///
/// assert_eq!(parse_answer(" Sim\n"), Some(true));
/// assert_eq!(parse_answer("NÃO"), Some(false));
/// assert_eq!(parse_answer("talvez"), None);
/// ```
pub fn parse_answer(line: &str) -> Option<bool> {
    match line.trim().to_lowercase().as_str() {
        "y" | "yes" | "s" | "sim" => Some(true),
        "n" | "no" | "não" | "nao" => Some(false),
        _ => None,
    }
}

/// Line-oriented prompt, re-asking until the answer is recognized.
///
/// End of input counts as "no".
pub struct ConsoleConfirmation<R, W> {
    input: R,
    output: W,
}

impl ConsoleConfirmation<BufReader<Stdin>, Stdout> {
    /// Prompt on the process's stdin/stdout.
    pub fn stdio() -> Self {
        Self::new(BufReader::new(std::io::stdin()), std::io::stdout())
    }
}

impl<R: BufRead, W: Write> ConsoleConfirmation<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    pub fn into_output(self) -> W {
        self.output
    }
}

impl<R: BufRead + Send, W: Write + Send> Confirmation for ConsoleConfirmation<R, W> {
    fn present(&mut self, listing: &str) -> Result<()> {
        writeln!(self.output, "{listing}")?;
        Ok(())
    }

    fn confirm(&mut self, prompt: &str) -> Result<bool> {
        loop {
            write!(self.output, "{prompt} (y/n): ")?;
            self.output.flush()?;

            let mut line = String::new();
            let read = self
                .input
                .read_line(&mut line)
                .context("Failed to read confirmation")?;
            if read == 0 {
                writeln!(self.output)?;
                return Ok(false);
            }

            match parse_answer(&line) {
                Some(answer) => return Ok(answer),
                None => writeln!(self.output, "Invalid answer, type 'y' for yes or 'n' for no.")?,
            }
        }
    }
}

/// Always proceeds, for non-interactive runs.
#[derive(Debug, Default, Clone, Copy)]
pub struct AssumeYes;

impl Confirmation for AssumeYes {
    fn confirm(&mut self, _prompt: &str) -> Result<bool> {
        Ok(true)
    }
}
