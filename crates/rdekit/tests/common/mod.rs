//! Shared test utilities for rdekit integration tests.
//!
//! This module provides:
//! - `TestHarness` with an isolated `inputdata/`, `invoice/`, `tasksupport/` tree
//! - Builders for invoices, metadata definitions and SmartTable sheets

pub mod builders;
pub mod harness;

pub use builders::*;
pub use harness::TestHarness;
