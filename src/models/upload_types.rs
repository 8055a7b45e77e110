use serde::Serialize;

/// A file as handed over by the picker, before any validation.
#[derive(Debug, Clone)]
pub struct SelectedFile {
    pub name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

/// An accepted image, ready to be submitted.
#[derive(Debug, Clone, PartialEq)]
pub struct UploadCandidate {
    pub bytes: Vec<u8>,
    pub mime_type: String,
    pub display_name: String,
    pub size_bytes: u64,
}

#[derive(Debug, Clone)]
pub struct StagedUpload {
    pub candidate: UploadCandidate,
    /// `data:image/jpeg;base64,...` thumbnail, if the image could be decoded.
    pub preview: Option<String>,
}

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct UploadSummary {
    pub name: String,
    pub size_kb: f64,
    pub mime_type: String,
    pub has_preview: bool,
    /// JPEG thumbnail as a data URI, when one could be built.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preview: Option<String>,
}

impl From<&StagedUpload> for UploadSummary {
    fn from(staged: &StagedUpload) -> Self {
        UploadSummary {
            name: staged.candidate.display_name.clone(),
            size_kb: staged.candidate.size_bytes as f64 / 1024.0,
            mime_type: staged.candidate.mime_type.clone(),
            has_preview: staged.preview.is_some(),
            preview: staged.preview.clone(),
        }
    }
}
