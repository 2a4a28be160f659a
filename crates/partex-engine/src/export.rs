//! PNG export of generated textures.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use image::{ImageFormat, RgbaImage};

/// Folder under the assets root that receives exported textures.
pub const OUTPUT_FOLDER: &str = "ParticleTextures";

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("failed to create output directory {path}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to write {path}")]
    Encode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
}

/// `<assets_root>/ParticleTextures`.
pub fn output_dir(assets_root: impl AsRef<Path>) -> PathBuf {
    assets_root.as_ref().join(OUTPUT_FOLDER)
}

/// Writes `image` to `dir/<name>.png`, creating `dir` as needed and
/// overwriting any existing file.
///
/// Returns `Ok(None)` without touching the filesystem when there is no image.
pub fn export(
    image: Option<&RgbaImage>,
    name: &str,
    dir: &Path,
) -> Result<Option<PathBuf>, ExportError> {
    export_with_refresh(image, name, dir, |_| {})
}

/// Like [`export`], then asks the caller's asset database to refresh.
///
/// `refresh` runs exactly once, with the written path or `None` when there
/// was no image. It does not run when writing fails.
pub fn export_with_refresh<F>(
    image: Option<&RgbaImage>,
    name: &str,
    dir: &Path,
    refresh: F,
) -> Result<Option<PathBuf>, ExportError>
where
    F: FnOnce(Option<&Path>),
{
    let Some(image) = image else {
        refresh(None);
        return Ok(None);
    };

    fs::create_dir_all(dir).map_err(|source| ExportError::CreateDir {
        path: dir.to_path_buf(),
        source,
    })?;

    let path = dir.join(format!("{name}.png"));
    image
        .save_with_format(&path, ImageFormat::Png)
        .map_err(|source| ExportError::Encode {
            path: path.clone(),
            source,
        })?;

    log::info!("saved {}x{} texture to {}", image.width(), image.height(), path.display());
    refresh(Some(&path));
    Ok(Some(path))
}
