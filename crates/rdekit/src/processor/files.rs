use std::path::Path;

use tracing::debug;

use crate::error::RdeError;
use crate::models::OutputDir;
use crate::pipeline::{ProcessingContext, Processor};
use crate::sanitize::redact_path;
use crate::smarttable;
use crate::storage;

fn copy_raw(ctx: &ProcessingContext, file: &Path) -> Result<(), RdeError> {
    let system = &ctx.srcpaths.config.system;
    if system.save_raw {
        storage::copy_into(file, &ctx.resource_paths.raw)?;
    }
    if system.save_nonshared_raw {
        storage::copy_into(file, &ctx.resource_paths.nonshared_raw)?;
    }
    Ok(())
}

/// Copies raw files into `raw/` and `nonshared_raw/` as configured.
pub struct StandardRawFileCopier;

impl Processor for StandardRawFileCopier {
    fn name(&self) -> &'static str {
        "StandardRawFileCopier"
    }

    fn process(&self, ctx: &mut ProcessingContext) -> Result<(), RdeError> {
        for file in &ctx.resource_paths.rawfiles {
            copy_raw(ctx, file)?;
        }
        Ok(())
    }
}

/// rdeformat inputs arrive already sorted into output-named directories
/// (`structured/`, `main_image/`, ...). Each file goes to its namesake.
pub struct RdeFormatFileCopier;

impl RdeFormatFileCopier {
    fn target_dir(inputdata: &Path, file: &Path) -> Option<OutputDir> {
        let relative = file.strip_prefix(inputdata).unwrap_or(file);
        relative
            .parent()?
            .components()
            .filter_map(|c| c.as_os_str().to_str())
            .filter_map(OutputDir::from_dir_name)
            .find(|dir| *dir != OutputDir::Invoice)
    }
}

impl Processor for RdeFormatFileCopier {
    fn name(&self) -> &'static str {
        "RdeFormatFileCopier"
    }

    fn process(&self, ctx: &mut ProcessingContext) -> Result<(), RdeError> {
        for file in &ctx.resource_paths.rawfiles {
            match Self::target_dir(&ctx.srcpaths.inputdata, file) {
                Some(dir) => {
                    storage::copy_into(file, ctx.resource_paths.dir(dir))?;
                }
                None => debug!(file = %redact_path(file), "Skipping file outside output directories"),
            }
        }
        Ok(())
    }
}

/// Standard copy minus the generated row CSVs, plus the SmartTable source
/// itself when `smarttable.save_table_file` is set.
pub struct SmartTableFileCopier;

impl Processor for SmartTableFileCopier {
    fn name(&self) -> &'static str {
        "SmartTableFileCopier"
    }

    fn process(&self, ctx: &mut ProcessingContext) -> Result<(), RdeError> {
        for file in &ctx.resource_paths.rawfiles {
            if smarttable::is_row_csv(file) {
                continue;
            }
            copy_raw(ctx, file)?;
        }

        if ctx.srcpaths.config.smarttable.save_table_file {
            if let Some(table) = ctx.smarttable_file() {
                storage::copy_into(table, &ctx.resource_paths.raw)?;
            }
        }
        Ok(())
    }
}
