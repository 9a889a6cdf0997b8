//! restack-lib: Core types and logic for restack
//!
//! This crate reconstructs the order in which software was installed into a
//! reference tree and re-emits it as replayable easystack manifests:
//! - `log`: streaming extraction of timestamps and builder versions from build logs
//! - `crawl`: discovery of every unit/version pair and its first/last attempt
//! - `registry`: parallel aggregation and chronological ordering of records
//! - `segment`: greedy partitioning of the ordered records into batches
//! - `manifest`: durable, ordered serialization of batches
//! - `pipeline`: the end-to-end run wiring the stages together

pub mod config;
pub mod consts;
pub mod crawl;
pub mod log;
pub mod manifest;
pub mod pipeline;
pub mod registry;
pub mod segment;
pub mod util;
