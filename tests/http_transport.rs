mod common;

use common::*;
use mri_lense_lib::commands::session::{AnalysisSession, ScreenStatus};
use mri_lense_lib::config::ClientConfig;
use mri_lense_lib::error::FailureReason;
use mri_lense_lib::services::analysis::client::{ClassifyTransport, HttpTransport};
use mri_lense_lib::services::analysis::controller::{
    AnalysisController, AnalysisOptions, AnalysisState,
};
use mri_lense_lib::services::content::ContentTables;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::sync::oneshot;

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|w| w == needle)
}

fn content_length(head: &str) -> Option<usize> {
    head.lines().find_map(|line| {
        let (name, value) = line.split_once(':')?;
        if name.eq_ignore_ascii_case("content-length") {
            value.trim().parse().ok()
        } else {
            None
        }
    })
}

/// Serve exactly one request with a canned response; hands back the raw request.
async fn one_shot_server(status_line: &'static str, body: String) -> (String, oneshot::Receiver<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (tx, rx) = oneshot::channel();

    tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut buf = Vec::new();
        let mut chunk = [0u8; 4096];
        loop {
            let n = socket.read(&mut chunk).await.unwrap();
            if n == 0 {
                break;
            }
            buf.extend_from_slice(&chunk[..n]);
            if let Some(end) = find(&buf, b"\r\n\r\n") {
                let head = String::from_utf8_lossy(&buf[..end]).to_string();
                let done = match content_length(&head) {
                    Some(len) => buf.len() >= end + 4 + len,
                    None if head.to_ascii_lowercase().contains("transfer-encoding: chunked") => {
                        buf.ends_with(b"0\r\n\r\n")
                    }
                    None => true,
                };
                if done {
                    break;
                }
            }
        }

        let response = format!(
            "{}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            status_line,
            body.len(),
            body
        );
        socket.write_all(response.as_bytes()).await.unwrap();
        socket.shutdown().await.ok();
        let _ = tx.send(String::from_utf8_lossy(&buf).to_string());
    });

    (format!("http://{}", addr), rx)
}

fn transport(base_url: String) -> HttpTransport {
    HttpTransport::new(&ClientConfig {
        base_url,
        ..ClientConfig::default()
    })
    .unwrap()
}

#[tokio::test]
async fn analysis_over_http() {
    let (base_url, request) = one_shot_server("HTTP/1.1 200 OK", GLIOMA_BODY.to_string()).await;
    let mut session = AnalysisSession::new(
        transport(format!("{}/", base_url)),
        AnalysisOptions::default(),
        ContentTables::builtin().unwrap(),
    );
    session.select_file(jpeg_file("brain.jpg")).unwrap();
    session.analyze().unwrap();
    assert!(matches!(
        session.wait_for_completion().await,
        AnalysisState::Succeeded { .. }
    ));
    assert_eq!(session.screen().status, ScreenStatus::Ready);

    let request = request.await.unwrap();
    assert!(
        request.starts_with("POST /predict?gradcam=false HTTP/1.1"),
        "{}",
        request
    );
    assert!(request.contains("name=\"file\""));
    assert!(request.contains("filename=\"brain.jpg\""));
    assert!(request.to_ascii_lowercase().contains("content-type: image/jpeg"));
}

#[tokio::test]
async fn gradcam_flag_is_sent() {
    let (base_url, request) = one_shot_server("HTTP/1.1 200 OK", NO_TUMOR_BODY.to_string()).await;
    let options = AnalysisOptions {
        gradcam: true,
        ..AnalysisOptions::default()
    };
    let mut ctl = AnalysisController::new(transport(base_url), options);
    ctl.submit(&candidate("brain.jpg")).unwrap();
    assert!(matches!(ctl.settled().await, AnalysisState::Succeeded { .. }));
    assert!(request.await.unwrap().starts_with("POST /predict?gradcam=true "));
}

#[tokio::test]
async fn server_detail_is_surfaced() {
    let (base_url, _request) = one_shot_server(
        "HTTP/1.1 400 Bad Request",
        r#"{"detail":"Invalid file type. Please upload a JPG or PNG image."}"#.to_string(),
    )
    .await;
    let mut ctl = AnalysisController::new(transport(base_url), AnalysisOptions::default());
    ctl.submit(&candidate("brain.jpg")).unwrap();
    match ctl.settled().await {
        AnalysisState::Failed { reason, .. } => assert_eq!(
            reason,
            FailureReason::ServerRejected(
                "Invalid file type. Please upload a JPG or PNG image.".to_string()
            )
        ),
        other => panic!("unexpected state {}", other.name()),
    }
}

#[tokio::test]
async fn unreachable_service_is_a_transport_error() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let mut ctl = AnalysisController::new(
        transport(format!("http://{}", addr)),
        AnalysisOptions::default(),
    );
    ctl.submit(&candidate("brain.jpg")).unwrap();
    match ctl.settled().await {
        AnalysisState::Failed {
            reason: FailureReason::TransportError(message),
            ..
        } => assert!(message.contains("Failed to reach classification service"), "{}", message),
        other => panic!("unexpected state {}", other.name()),
    }
}

#[tokio::test]
async fn health_probe_returns_json() {
    let (base_url, request) = one_shot_server(
        "HTTP/1.1 200 OK",
        r#"{"status":"healthy","model_loaded":true}"#.to_string(),
    )
    .await;
    let http = transport(base_url);
    let value = http.health().await.unwrap();
    assert_eq!(value["model_loaded"], true);
    assert!(request.await.unwrap().starts_with("GET /health HTTP/1.1"));
}
