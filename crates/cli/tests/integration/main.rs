//! CLI integration tests for restack.
//!
//! Each test builds a reference log tree in a temporary directory and runs
//! the `restack` binary against it.

mod common;
mod inspect_tests;
mod plan_tests;
