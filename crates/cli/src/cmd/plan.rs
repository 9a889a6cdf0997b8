//! Implementation of the `restack plan` command.
//!
//! Computes the manifests a `generate` run would write, without writing them.

use anyhow::{Context, Result};
use serde::Serialize;

use restack_lib::manifest::{file_name, sequence_width};
use restack_lib::pipeline::plan;
use restack_lib::util::whole_minutes;

use crate::output::{OutputFormat, format_duration, print_info, print_json, print_stat, symbols};

use super::{RecordView, SourceArgs};

#[derive(Debug, Serialize)]
struct BatchView {
  sequence: usize,
  file_name: String,
  builder_version: String,
  total_minutes: u64,
  entries: Vec<RecordView>,
}

pub fn cmd_plan(source: &SourceArgs, verbose: bool, output: OutputFormat) -> Result<()> {
  let config = source.to_config();
  let plan = plan(&config).with_context(|| format!("Failed to plan manifests for {}", config.root.display()))?;

  let manifests = plan.manifests(&config.generation);
  let width = sequence_width(manifests.len());

  let batches: Vec<BatchView> = manifests
    .iter()
    .zip(&plan.batches)
    .map(|(manifest, batch)| BatchView {
      sequence: manifest.sequence,
      file_name: file_name(manifest, width),
      builder_version: batch.builder_version.clone(),
      total_minutes: whole_minutes(batch.total_duration),
      entries: batch.records.iter().map(RecordView::from).collect(),
    })
    .collect();

  if output.is_json() {
    return print_json(&batches);
  }

  for (view, batch) in batches.iter().zip(&plan.batches) {
    print_info(&format!(
      "{} (EasyBuild {}, {})",
      view.file_name,
      view.builder_version,
      format_duration(batch.total_duration)
    ));
    for record in &batch.records {
      println!(
        "    {} {}-{} ({})",
        symbols::ARROW,
        record.unit_name,
        record.unit_version,
        format_duration(record.build_duration)
      );
      if verbose {
        println!("        {}", record.artifact_ref);
      }
    }
  }

  println!();
  print_stat("Manifests", &batches.len().to_string());
  print_stat("Installations", &plan.inventory.records.len().to_string());
  print_stat("Total build time", &format_duration(plan.inventory.total_duration()));

  Ok(())
}
