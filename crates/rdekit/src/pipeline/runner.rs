use tracing::{debug, info_span, warn};

use crate::error::RdeError;
use crate::models::WorkflowExecutionStatus;

use super::context::ProcessingContext;

/// One step of a pipeline.
pub trait Processor: Send + Sync {
    fn name(&self) -> &'static str;
    fn process(&self, ctx: &mut ProcessingContext) -> Result<(), RdeError>;
}

/// Ordered processors executed against one context.
#[derive(Default)]
pub struct Pipeline {
    processors: Vec<Box<dyn Processor>>,
}

impl Pipeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style append.
    pub fn add<P: Processor + 'static>(mut self, processor: P) -> Self {
        self.processors.push(Box::new(processor));
        self
    }

    pub fn processor_names(&self) -> Vec<&'static str> {
        self.processors.iter().map(|p| p.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.processors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.processors.is_empty()
    }

    /// Runs every processor in order. The first error stops the run and
    /// becomes a failed status; nothing already written is rolled back.
    pub fn execute(&self, ctx: &mut ProcessingContext) -> WorkflowExecutionStatus {
        let mode = ctx.mode();
        let title = format!("{} Mode Process", mode);
        let _span = info_span!("pipeline", unit = %ctx.index, mode = %mode).entered();

        for processor in &self.processors {
            let _step = info_span!("processor", name = processor.name()).entered();
            debug!("Running processor");
            if let Err(error) = processor.process(ctx) {
                warn!(code = error.code(), error = %error, "Processor failed");
                return WorkflowExecutionStatus::failed(
                    ctx.index.clone(),
                    title,
                    mode.as_str(),
                    error,
                );
            }
        }

        WorkflowExecutionStatus::success(ctx.index.clone(), title, mode.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::models::{ExecutionState, RdeInputDirPaths, RdeOutputResourcePath};
    use crate::pipeline::UnitSource;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct Counting {
        calls: Arc<AtomicUsize>,
    }

    impl Processor for Counting {
        fn name(&self) -> &'static str {
            "Counting"
        }

        fn process(&self, _ctx: &mut ProcessingContext) -> Result<(), RdeError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    struct Failing(fn() -> RdeError);

    impl Processor for Failing {
        fn name(&self) -> &'static str {
            "Failing"
        }

        fn process(&self, _ctx: &mut ProcessingContext) -> Result<(), RdeError> {
            Err((self.0)())
        }
    }

    fn context() -> ProcessingContext {
        let srcpaths = RdeInputDirPaths::new("/i", "/v", "/t", Config::default());
        let resource_paths = RdeOutputResourcePath::default();
        ProcessingContext::new("2", srcpaths, resource_paths, UnitSource::Plain, None)
    }

    #[test]
    fn test_all_processors_run_on_success() {
        let calls = Arc::new(AtomicUsize::new(0));
        let pipeline = Pipeline::new()
            .add(Counting { calls: calls.clone() })
            .add(Counting { calls: calls.clone() });

        let status = pipeline.execute(&mut context());

        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(status.status(), ExecutionState::Success);
        assert_eq!(status.run_id(), "2");
        assert_eq!(status.title(), "invoice Mode Process");
    }

    #[test]
    fn test_first_error_stops_execution() {
        let calls = Arc::new(AtomicUsize::new(0));
        let pipeline = Pipeline::new()
            .add(Failing(|| RdeError::structured(1060, "tile rejected")))
            .add(Counting { calls: calls.clone() });

        let status = pipeline.execute(&mut context());

        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert_eq!(status.error_code(), Some(1060));
        assert_eq!(status.error_message(), Some("tile rejected"));
    }

    #[test]
    fn test_unexpected_error_is_wrapped() {
        let pipeline = Pipeline::new().add(Failing(|| RdeError::Excel {
            path: "book.xlsx".into(),
            message: "corrupt".to_string(),
        }));

        let status = pipeline.execute(&mut context());

        assert_eq!(status.error_code(), Some(999));
        assert!(status
            .error_message()
            .unwrap()
            .starts_with("unexpected error in invoice mode: "));
    }

    #[test]
    fn test_processor_names() {
        let pipeline = Pipeline::new().add(Failing(|| RdeError::NoRawFile));
        assert_eq!(pipeline.processor_names(), vec!["Failing"]);
        assert_eq!(pipeline.len(), 1);
    }
}
