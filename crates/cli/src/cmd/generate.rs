//! Implementation of the `restack generate` command.
//!
//! Reconstructs the installation order of the reference tree and writes one
//! easystack file per batch.

use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::info;

use restack_lib::pipeline::run;
use restack_lib::util::whole_minutes;

use crate::output::{OutputFormat, format_duration, print_json, print_stat, print_success, print_warning};

use super::SourceArgs;

#[derive(Debug, Serialize)]
struct GenerateSummary {
  root: PathBuf,
  generation: String,
  units: usize,
  installations: usize,
  total_build_minutes: u64,
  manifests: Vec<PathBuf>,
}

pub fn cmd_generate(source: &SourceArgs, output_dir: &Path, verbose: bool, output: OutputFormat) -> Result<()> {
  let start = Instant::now();

  let mut config = source.to_config();
  config.output_dir = output_dir.to_path_buf();

  let outcome =
    run(&config).with_context(|| format!("Failed to reproduce stack from {}", config.root.display()))?;

  let inventory = &outcome.plan.inventory;
  let total = inventory.total_duration();
  info!(
    manifests = outcome.written.len(),
    total_build_minutes = whole_minutes(total),
    "generation complete"
  );

  if output.is_json() {
    return print_json(&GenerateSummary {
      root: config.root.clone(),
      generation: config.generation.clone(),
      units: inventory.units.len(),
      installations: inventory.records.len(),
      total_build_minutes: whole_minutes(total),
      manifests: outcome.written,
    });
  }

  if outcome.written.is_empty() {
    print_warning(&format!("No installations found in {}", config.root.display()));
    return Ok(());
  }

  print_success(&format!(
    "Wrote {} easystack files with a total build time of {}",
    outcome.written.len(),
    format_duration(total)
  ));
  print_stat("Software", &inventory.units.len().to_string());
  print_stat("Installations", &inventory.records.len().to_string());
  print_stat("Output", &config.output_dir.display().to_string());
  print_stat("Duration", &format_duration(start.elapsed()));

  if verbose {
    println!();
    for path in &outcome.written {
      println!("  {}", path.display());
    }
  }

  Ok(())
}
