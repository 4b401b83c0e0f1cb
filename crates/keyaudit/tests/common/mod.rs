//! Shared test utilities for keyaudit integration tests.
//!
//! This module provides:
//! - `TestHarness` for isolated runs with temp input and output directories
//! - Fixture builders for office documents, workbooks and archives

pub mod builders;
pub mod harness;

pub use builders::*;
pub use harness::{RecordingNotifier, ResultRow, TestHarness};
