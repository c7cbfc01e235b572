//! Per-unit processing: mode resolution, context, processors and pipelines.

pub mod callback;
pub mod context;
pub mod factory;
pub mod mode;
pub mod runner;

pub use callback::DatasetCallback;
pub use context::{ProcessingContext, UnitSource};
pub use factory::PipelineFactory;
pub use mode::{resolve_mode, ProcessingMode};
pub use runner::{Pipeline, Processor};
