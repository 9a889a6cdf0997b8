//! Implementation of the `restack inspect` command.
//!
//! Lists every installation of the reference tree in replay order.

use anyhow::{Context, Result};

use restack_lib::pipeline::collect;

use crate::output::{OutputFormat, format_duration, print_json, print_stat};

use super::{RecordView, SourceArgs};

pub fn cmd_inspect(source: &SourceArgs, verbose: bool, output: OutputFormat) -> Result<()> {
  let config = source.to_config();
  let inventory =
    collect(&config).with_context(|| format!("Failed to inspect {}", config.root.display()))?;

  if output.is_json() {
    let records: Vec<RecordView> = inventory.records.iter().map(RecordView::from).collect();
    return print_json(&records);
  }

  for record in &inventory.records {
    println!(
      "{}  {:>8}  {:<8}  {}-{}",
      record.initial_build_time,
      format_duration(record.build_duration),
      record.builder_version,
      record.unit_name,
      record.unit_version
    );
    if verbose {
      println!("    {}", record.artifact_ref);
      println!("    {}", record.extension_ref);
    }
  }

  println!();
  print_stat("Software", &inventory.units.len().to_string());
  print_stat("Installations", &inventory.records.len().to_string());
  print_stat("Total build time", &format_duration(inventory.total_duration()));

  Ok(())
}
