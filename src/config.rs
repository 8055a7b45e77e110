use crate::services::analysis::controller::{AnalysisOptions, DEFAULT_TIMEOUT};
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8000";
pub const BASE_URL_ENV: &str = "MRI_LENSE_API_URL";

#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    pub base_url: String,
    pub timeout: Duration,
    pub gradcam: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
            gradcam: false,
        }
    }
}

impl ClientConfig {
    pub fn analysis_options(&self) -> AnalysisOptions {
        AnalysisOptions {
            timeout: self.timeout,
            gradcam: self.gradcam,
        }
    }
}
