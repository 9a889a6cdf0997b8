//! CLI output formatting utilities.
//!
//! Provides consistent formatting for terminal output including colored status
//! messages, human-readable durations, and Unicode symbols.

use std::time::Duration;

use anyhow::Context;
use clap::ValueEnum;
use owo_colors::{OwoColorize, Stream};

#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum OutputFormat {
  #[default]
  Text,
  Json,
}

impl OutputFormat {
  pub fn is_json(self) -> bool {
    matches!(self, OutputFormat::Json)
  }
}

pub mod symbols {
  pub const SUCCESS: &str = "✓";
  pub const ERROR: &str = "✗";
  pub const WARNING: &str = "⚠";
  pub const INFO: &str = "•";
  pub const ARROW: &str = "→";
}

/// Format a build duration, e.g. `1h 30m`, `45m` or `20s`.
pub fn format_duration(duration: Duration) -> String {
  let secs = duration.as_secs();
  let hours = secs / 3600;
  let mins = (secs % 3600) / 60;

  if hours > 0 {
    format!("{}h {}m", hours, mins)
  } else if mins > 0 {
    format!("{}m", mins)
  } else {
    format!("{}s", secs)
  }
}

/// Parse a batch budget: a bare number is minutes, anything else a
/// humantime duration such as `4h` or `90m`.
pub fn parse_budget(value: &str) -> Result<Duration, String> {
  if let Ok(minutes) = value.parse::<u64>() {
    return minutes
      .checked_mul(60)
      .map(Duration::from_secs)
      .ok_or_else(|| format!("invalid duration '{}': too large", value));
  }
  humantime::parse_duration(value).map_err(|e| format!("invalid duration '{}': {}", value, e))
}

pub fn print_success(message: &str) {
  println!(
    "{} {}",
    symbols::SUCCESS.if_supports_color(Stream::Stdout, |s| s.green()),
    message
  );
}

pub fn print_error(message: &str) {
  eprintln!(
    "{} {}",
    symbols::ERROR.if_supports_color(Stream::Stderr, |s| s.red()),
    message.if_supports_color(Stream::Stderr, |s| s.red())
  );
}

pub fn print_warning(message: &str) {
  eprintln!(
    "{} {}",
    symbols::WARNING.if_supports_color(Stream::Stderr, |s| s.yellow()),
    message.if_supports_color(Stream::Stderr, |s| s.yellow())
  );
}

pub fn print_info(message: &str) {
  println!(
    "{} {}",
    symbols::INFO.if_supports_color(Stream::Stdout, |s| s.blue()),
    message
  );
}

pub fn print_stat(label: &str, value: &str) {
  println!(
    "  {}: {}",
    label.if_supports_color(Stream::Stdout, |s| s.dimmed()),
    value
  );
}

pub fn print_json<T: serde::Serialize>(value: &T) -> anyhow::Result<()> {
  let json = serde_json::to_string_pretty(value).context("Failed to serialize to JSON")?;
  println!("{}", json);
  Ok(())
}
