//! Run loop: unit discovery, the shared invoice snapshot cache and the
//! ignore-errors policy.

pub mod runner;
pub mod snapshot;
pub mod units;

pub use runner::Workflow;
pub use snapshot::InvoiceSnapshotCache;
pub use units::{classify_inputs, discover_units, ClassifiedInputs, UnitOfWork};
