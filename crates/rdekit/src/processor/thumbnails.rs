use std::path::{Path, PathBuf};

use crate::error::RdeError;
use crate::pipeline::{ProcessingContext, Processor};
use crate::storage;

const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "bmp", "tif", "tiff", "svg"];

fn is_image(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| IMAGE_EXTENSIONS.iter().any(|x| e.eq_ignore_ascii_case(x)))
}

/// Copies the first main image (by name) into `thumbnail/`.
pub struct ThumbnailGenerator;

impl ThumbnailGenerator {
    fn first_image(dir: &Path) -> Result<Option<PathBuf>, RdeError> {
        Ok(storage::list_files(dir)?.into_iter().find(|p| is_image(p)))
    }
}

impl Processor for ThumbnailGenerator {
    fn name(&self) -> &'static str {
        "ThumbnailGenerator"
    }

    fn process(&self, ctx: &mut ProcessingContext) -> Result<(), RdeError> {
        if !ctx.srcpaths.config.system.save_thumbnail_image {
            return Ok(());
        }
        if let Some(image) = Self::first_image(&ctx.resource_paths.main_image)? {
            storage::copy_into(&image, &ctx.resource_paths.thumbnail)?;
        }
        Ok(())
    }
}
