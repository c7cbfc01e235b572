use std::fmt;
use std::sync::Arc;

use crate::error::RdeError;
use crate::models::{DatasetPaths, RdeInputDirPaths, RdeOutputResourcePath};

pub type UnifiedFn = dyn Fn(&DatasetPaths) -> Result<(), RdeError> + Send + Sync;
pub type LegacyFn =
    dyn Fn(&RdeInputDirPaths, &RdeOutputResourcePath) -> Result<(), RdeError> + Send + Sync;

/// User dataset function. The shape is fixed when it is registered.
#[derive(Clone)]
pub enum DatasetCallback {
    Unified(Arc<UnifiedFn>),
    Legacy(Arc<LegacyFn>),
}

impl DatasetCallback {
    pub fn unified<F>(f: F) -> Self
    where
        F: Fn(&DatasetPaths) -> Result<(), RdeError> + Send + Sync + 'static,
    {
        DatasetCallback::Unified(Arc::new(f))
    }

    pub fn legacy<F>(f: F) -> Self
    where
        F: Fn(&RdeInputDirPaths, &RdeOutputResourcePath) -> Result<(), RdeError>
            + Send
            + Sync
            + 'static,
    {
        DatasetCallback::Legacy(Arc::new(f))
    }

    pub fn invoke(
        &self,
        srcpaths: &RdeInputDirPaths,
        resource_paths: &RdeOutputResourcePath,
    ) -> Result<(), RdeError> {
        match self {
            DatasetCallback::Unified(f) => {
                f(&DatasetPaths::new(srcpaths.clone(), resource_paths.clone()))
            }
            DatasetCallback::Legacy(f) => f(srcpaths, resource_paths),
        }
    }

    pub fn shape(&self) -> &'static str {
        match self {
            DatasetCallback::Unified(_) => "unified",
            DatasetCallback::Legacy(_) => "legacy",
        }
    }
}

impl fmt::Debug for DatasetCallback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("DatasetCallback").field(&self.shape()).finish()
    }
}
