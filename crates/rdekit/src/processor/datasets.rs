use crate::error::RdeError;
use crate::pipeline::{ProcessingContext, Processor};

/// Invokes the registered dataset function, if any.
pub struct DatasetCallbackRunner;

impl Processor for DatasetCallbackRunner {
    fn name(&self) -> &'static str {
        "DatasetCallbackRunner"
    }

    fn process(&self, ctx: &mut ProcessingContext) -> Result<(), RdeError> {
        let Some(callback) = &ctx.datasets_function else {
            return Ok(());
        };
        tracing::debug!(shape = callback.shape(), "Invoking dataset function");
        callback.invoke(&ctx.srcpaths, &ctx.resource_paths)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::pipeline::{DatasetCallback, UnitSource};
    use crate::processor::test_support::Workspace;

    #[test]
    fn test_no_callback_is_noop() {
        let ws = Workspace::new();
        let mut ctx = ws.context(Config::default(), UnitSource::Plain, 0, vec![]);
        assert!(DatasetCallbackRunner.process(&mut ctx).is_ok());
    }

    #[test]
    fn test_callback_writes_into_structured() {
        let ws = Workspace::new();
        let mut ctx = ws.context(Config::default(), UnitSource::Plain, 0, vec![]);
        ctx.datasets_function = Some(DatasetCallback::unified(|paths| {
            std::fs::write(paths.structured().join("out.csv"), "x").map_err(|e| {
                RdeError::structured(50, e.to_string())
            })
        }));

        DatasetCallbackRunner.process(&mut ctx).unwrap();
        assert!(ws.path("out/structured/out.csv").is_file());
    }
}
