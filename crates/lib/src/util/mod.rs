//! Shared utilities.

use std::time::Duration;

#[cfg(test)]
pub mod testutil;

/// Whole minutes of `duration`, rounded to nearest.
pub fn whole_minutes(duration: Duration) -> u64 {
  (duration.as_secs_f64() / 60.0).round() as u64
}
