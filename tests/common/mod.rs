#![allow(dead_code)]

use base64::Engine;
use futures::future::BoxFuture;
use futures::FutureExt;
use mri_lense_lib::error::AppError;
use mri_lense_lib::models::classify_types::{ClassificationResult, WireClassification};
use mri_lense_lib::models::upload_types::{SelectedFile, UploadCandidate};
use mri_lense_lib::services::analysis::client::{ClassifyTransport, RawResponse};
use std::collections::VecDeque;
use std::io::Cursor;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub struct Scripted {
    pub delay: Duration,
    pub response: Result<RawResponse, AppError>,
}

#[derive(Default)]
pub struct Counters {
    pub calls: AtomicUsize,
    pub finished: AtomicUsize,
    pub dropped: AtomicUsize,
}

/// Transport that replays scripted responses after a (virtual) delay.
pub struct FakeTransport {
    script: Mutex<VecDeque<Scripted>>,
    pub counters: Arc<Counters>,
    pub gradcam_flags: Arc<Mutex<Vec<bool>>>,
}

impl FakeTransport {
    pub fn new(script: Vec<Scripted>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            counters: Arc::new(Counters::default()),
            gradcam_flags: Arc::new(Mutex::new(Vec::new())),
        }
    }
}

/// Counts request futures dropped before they produced a response.
struct DropCounter {
    counters: Arc<Counters>,
    finished: bool,
}

impl Drop for DropCounter {
    fn drop(&mut self) {
        if !self.finished {
            self.counters.dropped.fetch_add(1, Ordering::SeqCst);
        }
    }
}

impl ClassifyTransport for FakeTransport {
    fn classify<'a>(
        &'a self,
        _upload: &'a UploadCandidate,
        gradcam: bool,
    ) -> BoxFuture<'a, Result<RawResponse, AppError>> {
        self.counters.calls.fetch_add(1, Ordering::SeqCst);
        self.gradcam_flags.lock().unwrap().push(gradcam);
        let next = self.script.lock().unwrap().pop_front();
        let counters = Arc::clone(&self.counters);
        async move {
            let mut guard = DropCounter {
                counters: Arc::clone(&counters),
                finished: false,
            };
            let response = match next {
                Some(step) => {
                    tokio::time::sleep(step.delay).await;
                    step.response
                }
                None => Err(AppError::from("no scripted response")),
            };
            guard.finished = true;
            counters.finished.fetch_add(1, Ordering::SeqCst);
            response
        }
        .boxed()
    }

    fn health(&self) -> BoxFuture<'_, Result<serde_json::Value, AppError>> {
        async { Ok(serde_json::json!({ "status": "healthy", "model_loaded": true })) }.boxed()
    }
}

pub fn after(secs: u64, response: Result<RawResponse, AppError>) -> Scripted {
    Scripted {
        delay: Duration::from_secs(secs),
        response,
    }
}

pub fn ok_body(body: &str) -> Result<RawResponse, AppError> {
    Ok(RawResponse {
        status: 200,
        body: body.as_bytes().to_vec(),
    })
}

pub fn status_body(status: u16, body: &str) -> Result<RawResponse, AppError> {
    Ok(RawResponse {
        status,
        body: body.as_bytes().to_vec(),
    })
}

pub const GLIOMA_BODY: &str = r#"{
    "prediction": "glioma",
    "probabilities": {"glioma": 0.82, "meningioma": 0.1, "no_tumor": 0.05, "pituitary": 0.03},
    "confidence": 0.82,
    "model_accuracy": 0.95,
    "risk_level": {"level": "HIGH RISK", "color": "red"}
}"#;

pub const NO_TUMOR_BODY: &str = r#"{
    "prediction": "no_tumor",
    "probabilities": {"glioma": 0.02, "meningioma": 0.03, "no_tumor": 0.93, "pituitary": 0.02},
    "confidence": 0.93,
    "model_accuracy": 0.883,
    "risk_level": {"level": "LOW RISK", "color": "green", "description": "No tumor detected. Regular follow-up recommended."}
}"#;

pub fn jpeg_bytes() -> Vec<u8> {
    let img = image::RgbImage::from_pixel(16, 12, image::Rgb([120, 90, 60]));
    let mut buf = Cursor::new(Vec::new());
    image::DynamicImage::ImageRgb8(img)
        .write_to(&mut buf, image::ImageFormat::Jpeg)
        .unwrap();
    buf.into_inner()
}

pub fn png_base64(width: u32, height: u32) -> String {
    let img = image::RgbaImage::from_pixel(width, height, image::Rgba([255, 0, 0, 128]));
    let mut buf = Cursor::new(Vec::new());
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut buf, image::ImageFormat::Png)
        .unwrap();
    base64::engine::general_purpose::STANDARD.encode(buf.into_inner())
}

pub fn jpeg_file(name: &str) -> SelectedFile {
    SelectedFile {
        name: name.to_string(),
        mime_type: "image/jpeg".to_string(),
        bytes: jpeg_bytes(),
    }
}

pub fn candidate(name: &str) -> UploadCandidate {
    let bytes = jpeg_bytes();
    UploadCandidate {
        size_bytes: bytes.len() as u64,
        bytes,
        mime_type: "image/jpeg".to_string(),
        display_name: name.to_string(),
    }
}

pub fn parse_result(body: &str) -> ClassificationResult {
    let wire: WireClassification = serde_json::from_str(body).unwrap();
    ClassificationResult::try_from(wire).unwrap()
}
