use crate::error::AppError;
use crate::services::views::derive::ResultViews;
use std::path::{Path, PathBuf};

/// Write each activation map as `gradcam_<label>.png` under `dir`, plus the
/// service's copy of the analysed image as `uploaded.<ext>` when it sent one.
pub async fn export_activation_maps(views: &ResultViews, dir: &Path) -> Result<Vec<PathBuf>, AppError> {
    tokio::fs::create_dir_all(dir).await.map_err(|e| AppError {
        message: format!("Failed to create directory {}: {}", dir.display(), e),
    })?;

    let mut written = Vec::with_capacity(views.activation.tiles.len() + 1);
    for tile in &views.activation.tiles {
        let path = dir.join(format!("gradcam_{}.png", tile.label.as_str()));
        write_file(&path, &tile.image).await?;
        written.push(path);
    }

    if let Some(bytes) = &views.uploaded_image {
        let path = dir.join(format!("uploaded.{}", image_extension(bytes)));
        write_file(&path, bytes).await?;
        written.push(path);
    }
    Ok(written)
}

fn image_extension(bytes: &[u8]) -> &'static str {
    image::guess_format(bytes)
        .ok()
        .and_then(|format| format.extensions_str().first().copied())
        .unwrap_or("png")
}

async fn write_file(path: &Path, bytes: &[u8]) -> Result<(), AppError> {
    tokio::fs::write(path, bytes).await.map_err(|e| AppError {
        message: format!("Failed to write {}: {}", path.display(), e),
    })
}
