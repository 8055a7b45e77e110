use crate::error::RejectedFile;
use crate::models::upload_types::{SelectedFile, StagedUpload, UploadCandidate};
use crate::services::preview_service;
use std::path::Path;

/// MIME types the picker offers and the service accepts.
pub const ACCEPTED_MIME_TYPES: &[&str] = &["image/jpeg", "image/png"];

const EXTENSION_MIME_TYPES: &[(&str, &str)] = &[
    ("jpg", "image/jpeg"),
    ("jpeg", "image/jpeg"),
    ("png", "image/png"),
    ("gif", "image/gif"),
    ("bmp", "image/bmp"),
    ("webp", "image/webp"),
    ("tif", "image/tiff"),
    ("tiff", "image/tiff"),
    ("txt", "text/plain"),
];

pub fn is_accepted_mime(mime_type: &str) -> bool {
    let normalized = mime_type.trim().to_ascii_lowercase();
    ACCEPTED_MIME_TYPES.contains(&normalized.as_str())
}

/// Declared MIME type of a path, judged by extension only.
pub fn mime_from_path(path: &Path) -> &'static str {
    path.extension()
        .and_then(|ext| ext.to_str())
        .and_then(|ext| {
            let lower = ext.to_ascii_lowercase();
            EXTENSION_MIME_TYPES
                .iter()
                .find(|(e, _)| *e == lower)
                .map(|(_, mime)| *mime)
        })
        .unwrap_or("application/octet-stream")
}

/// Single-slot holder for the file the user picked.
#[derive(Debug, Default)]
pub struct UploadStaging {
    slot: Option<StagedUpload>,
}

impl UploadStaging {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn staged(&self) -> Option<&StagedUpload> {
        self.slot.as_ref()
    }

    pub fn candidate(&self) -> Option<&UploadCandidate> {
        self.slot.as_ref().map(|s| &s.candidate)
    }

    /// Stage `file`, replacing whatever was staged. A rejected file leaves the slot untouched.
    pub fn select(&mut self, file: SelectedFile) -> Result<UploadCandidate, RejectedFile> {
        if !is_accepted_mime(&file.mime_type) {
            tracing::warn!(name = %file.name, mime_type = %file.mime_type, "rejected upload");
            return Err(RejectedFile::UnsupportedType {
                name: file.name,
                mime_type: file.mime_type,
            });
        }

        let preview = match preview_service::generate_preview(&file.bytes) {
            Ok(uri) => Some(uri),
            Err(e) => {
                tracing::warn!(name = %file.name, error = %e, "preview unavailable");
                None
            }
        };

        let candidate = UploadCandidate {
            size_bytes: file.bytes.len() as u64,
            bytes: file.bytes,
            mime_type: file.mime_type.trim().to_ascii_lowercase(),
            display_name: file.name,
        };

        tracing::info!(
            name = %candidate.display_name,
            size_bytes = candidate.size_bytes,
            replaced = self.slot.is_some(),
            "staged upload"
        );

        self.slot = Some(StagedUpload {
            candidate: candidate.clone(),
            preview,
        });
        Ok(candidate)
    }

    /// Read `path` from disk and stage it under its extension's MIME type.
    pub fn select_path(&mut self, path: &Path) -> Result<UploadCandidate, RejectedFile> {
        let name = path
            .file_name()
            .unwrap_or_default()
            .to_string_lossy()
            .to_string();
        let mime_type = mime_from_path(path);

        // Checked before reading so a rejected file is never loaded.
        if !is_accepted_mime(mime_type) {
            tracing::warn!(name = %name, mime_type, "rejected upload");
            return Err(RejectedFile::UnsupportedType {
                name,
                mime_type: mime_type.to_string(),
            });
        }

        let bytes = std::fs::read(path).map_err(|e| RejectedFile::Unreadable {
            name: name.clone(),
            reason: e.to_string(),
        })?;

        self.select(SelectedFile {
            name,
            mime_type: mime_type.to_string(),
            bytes,
        })
    }

    pub fn clear(&mut self) {
        if self.slot.take().is_some() {
            tracing::debug!("cleared staged upload");
        }
    }
}
