//! Interactive prompts on stdin.

use std::io::Write;

use anyhow::{Context, Result, bail};
use tokio::io::{AsyncBufReadExt, BufReader, Stdin};

/// Line-oriented reader over stdin.
///
/// One reader is shared per command so piped input spanning several
/// prompts is not lost to buffering.
pub struct Prompter {
    reader: BufReader<Stdin>,
}

impl Default for Prompter {
    fn default() -> Self {
        Self::new()
    }
}

impl Prompter {
    /// Creates a prompter over the process stdin.
    pub fn new() -> Self {
        Self {
            reader: BufReader::new(tokio::io::stdin()),
        }
    }

    /// Prints `prompt` and reads one trimmed line.
    pub async fn read_line(&mut self, prompt: &str) -> Result<String> {
        print!("{prompt}");
        std::io::stdout().flush()?;

        let mut line = String::new();
        let read = self
            .reader
            .read_line(&mut line)
            .await
            .context("Failed to read from stdin")?;
        if read == 0 {
            bail!("No input provided");
        }
        Ok(line.trim().to_string())
    }

    /// Prints a numbered menu and returns the chosen zero-based index.
    pub async fn select(&mut self, prompt: &str, options: &[String]) -> Result<usize> {
        for (i, option) in options.iter().enumerate() {
            println!("  {}) {option}", i + 1);
        }
        let input = self
            .read_line(&format!("{prompt} [1-{}]: ", options.len()))
            .await?;
        parse_selection(&input, options.len())
            .with_context(|| format!("Invalid selection: {input}"))
    }
}

/// Parses a one-based menu choice.
fn parse_selection(input: &str, len: usize) -> Option<usize> {
    let choice: usize = input.trim().parse().ok()?;
    (1..=len).contains(&choice).then(|| choice - 1)
}
