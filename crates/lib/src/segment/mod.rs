//! Greedy segmentation of the chronological record stream into batches.
//!
//! Records are consumed in order with at most one open batch. A batch is
//! closed when the next record needs a different builder version, or when
//! adding it would push the batch past the duration budget. A record is never
//! split, so a single record longer than the budget forms a batch of its own.

use std::time::Duration;

use thiserror::Error;
use tracing::debug;

use crate::registry::{BuildRecord, RecordKey};

/// Errors raised when emitted batches break a segmentation post-condition.
#[derive(Debug, Error)]
pub enum SegmentError {
  #[error("invariant violation: {0}")]
  InvariantViolation(String),
}

/// A contiguous run of records sharing one builder version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Batch {
  pub builder_version: String,
  pub total_duration: Duration,
  pub records: Vec<BuildRecord>,
}

impl Batch {
  fn open(record: BuildRecord) -> Self {
    Self {
      builder_version: record.builder_version.clone(),
      total_duration: record.build_duration,
      records: vec![record],
    }
  }

  /// Whether `record` may join this batch under `max`.
  fn accepts(&self, record: &BuildRecord, max: Duration) -> bool {
    record.builder_version == self.builder_version && self.total_duration + record.build_duration <= max
  }

  fn push(&mut self, record: BuildRecord) {
    self.total_duration += record.build_duration;
    self.records.push(record);
  }
}

/// Segmentation state between two records.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub enum SegmentState {
  /// No open batch.
  #[default]
  Empty,
  /// A batch holding at least one record.
  Open(Batch),
}

impl SegmentState {
  /// Feed the next record.
  ///
  /// Returns the new state and the batch closed by this record, if any.
  pub fn step(self, record: BuildRecord, max: Duration) -> (SegmentState, Option<Batch>) {
    match self {
      SegmentState::Empty => (SegmentState::Open(Batch::open(record)), None),
      SegmentState::Open(mut batch) if batch.accepts(&record, max) => {
        batch.push(record);
        (SegmentState::Open(batch), None)
      }
      SegmentState::Open(batch) => (SegmentState::Open(Batch::open(record)), Some(batch)),
    }
  }

  /// Close the open batch at the end of the stream.
  pub fn finish(self) -> Option<Batch> {
    match self {
      SegmentState::Empty => None,
      SegmentState::Open(batch) => Some(batch),
    }
  }
}

/// Partition chronologically ordered records into batches.
///
/// An empty input yields no batch.
pub fn segment<I>(records: I, max: Duration) -> Vec<Batch>
where
  I: IntoIterator<Item = BuildRecord>,
{
  let mut batches = Vec::new();
  let mut state = SegmentState::Empty;

  for record in records {
    let (next, closed) = state.step(record, max);
    if let Some(batch) = closed {
      debug!(
        batch = batches.len() + 1,
        builder = %batch.builder_version,
        records = batch.records.len(),
        duration_secs = batch.total_duration.as_secs(),
        "closed batch"
      );
      batches.push(batch);
    }
    let added = match &next {
      SegmentState::Open(open) => open.records.last(),
      SegmentState::Empty => None,
    };
    if let Some(added) = added {
      debug!(
        batch = batches.len() + 1,
        unit = %added.unit_name,
        version = %added.unit_version,
        duration_secs = added.build_duration.as_secs(),
        "added record to batch"
      );
    }
    state = next;
  }

  batches.extend(state.finish());
  batches
}

/// Check the post-conditions of [`segment`] against its input order.
///
/// Every record appears exactly once and in order, each batch carries a
/// single builder version, and only a lone oversized record exceeds `max`.
pub fn verify(batches: &[Batch], expected: &[RecordKey], max: Duration) -> Result<(), SegmentError> {
  let violation = |msg: String| Err(SegmentError::InvariantViolation(msg));

  let emitted: Vec<RecordKey> = batches.iter().flat_map(|b| b.records.iter().map(BuildRecord::key)).collect();
  if emitted != expected {
    return violation(format!(
      "batches hold {} records out of order or incomplete, expected {}",
      emitted.len(),
      expected.len()
    ));
  }

  for (i, batch) in batches.iter().enumerate() {
    let seq = i + 1;
    if batch.records.is_empty() {
      return violation(format!("batch {} is empty", seq));
    }
    if let Some(r) = batch.records.iter().find(|r| r.builder_version != batch.builder_version) {
      return violation(format!(
        "batch {} labelled {} holds {}-{} built with {}",
        seq, batch.builder_version, r.unit_name, r.unit_version, r.builder_version
      ));
    }
    let sum: Duration = batch.records.iter().map(|r| r.build_duration).sum();
    if sum != batch.total_duration {
      return violation(format!("batch {} total duration does not match its records", seq));
    }
    if batch.total_duration > max && batch.records.len() > 1 {
      return violation(format!(
        "batch {} exceeds the duration budget with {} records",
        seq,
        batch.records.len()
      ));
    }
  }

  Ok(())
}
