use crate::error::{AppError, FailureReason, SubmitError};
use crate::models::classify_types::{ClassificationResult, WireClassification, WireErrorBody};
use crate::models::upload_types::UploadCandidate;
use crate::services::analysis::client::{ClassifyTransport, RawResponse};
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::Instant;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(180);

/// Stand-in deadline for timeouts too large to add to the clock (about 30 years).
const FAR_FUTURE: Duration = Duration::from_secs(86_400 * 365 * 30);

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct SubmissionId(pub u64);

impl fmt::Display for SubmissionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// One-shot cancellation signal shared between the controller and its request task.
#[derive(Debug, Clone)]
pub struct CancelToken {
    tx: Arc<watch::Sender<bool>>,
}

impl CancelToken {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(false);
        Self { tx: Arc::new(tx) }
    }

    pub fn cancel(&self) {
        self.tx.send_replace(true);
    }

    pub fn is_cancelled(&self) -> bool {
        *self.tx.borrow()
    }

    /// Resolves once `cancel` has been called.
    pub async fn cancelled(&self) {
        let mut rx = self.tx.subscribe();
        // The sender lives in `self`, so the channel cannot close here.
        let _ = rx.wait_for(|cancelled| *cancelled).await;
    }
}

impl Default for CancelToken {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone)]
pub enum AnalysisState {
    Idle,
    InFlight {
        submission: SubmissionId,
        started_at: Instant,
        deadline: Instant,
        cancel: CancelToken,
    },
    Succeeded {
        submission: SubmissionId,
        result: Arc<ClassificationResult>,
    },
    Failed {
        submission: SubmissionId,
        reason: FailureReason,
    },
}

impl AnalysisState {
    pub fn is_in_flight(&self) -> bool {
        matches!(self, AnalysisState::InFlight { .. })
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            AnalysisState::Succeeded { .. } | AnalysisState::Failed { .. }
        )
    }

    pub fn submission(&self) -> Option<SubmissionId> {
        match self {
            AnalysisState::Idle => None,
            AnalysisState::InFlight { submission, .. }
            | AnalysisState::Succeeded { submission, .. }
            | AnalysisState::Failed { submission, .. } => Some(*submission),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            AnalysisState::Idle => "idle",
            AnalysisState::InFlight { .. } => "in_flight",
            AnalysisState::Succeeded { .. } => "succeeded",
            AnalysisState::Failed { .. } => "failed",
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct AnalysisOptions {
    pub timeout: Duration,
    pub gradcam: bool,
}

impl Default for AnalysisOptions {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            gradcam: false,
        }
    }
}

/// Owns the single analysis request of a session and its state machine.
pub struct AnalysisController<T: ClassifyTransport> {
    transport: Arc<T>,
    options: AnalysisOptions,
    state: Arc<watch::Sender<AnalysisState>>,
    next_submission: u64,
    task: Option<JoinHandle<()>>,
}

impl<T: ClassifyTransport> AnalysisController<T> {
    pub fn new(transport: T, options: AnalysisOptions) -> Self {
        let (tx, _) = watch::channel(AnalysisState::Idle);
        Self {
            transport: Arc::new(transport),
            options,
            state: Arc::new(tx),
            next_submission: 1,
            task: None,
        }
    }

    pub fn options(&self) -> AnalysisOptions {
        self.options
    }

    pub fn state(&self) -> AnalysisState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<AnalysisState> {
        self.state.subscribe()
    }

    pub fn can_submit(&self) -> bool {
        !self.state.borrow().is_in_flight()
    }

    /// Start analysing `candidate`. Completion is observed through `state`/`subscribe`.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn submit(&mut self, candidate: &UploadCandidate) -> Result<SubmissionId, SubmitError> {
        if !self.can_submit() {
            tracing::warn!("submission rejected: a request is already in flight");
            return Err(SubmitError::InFlight);
        }

        let submission = SubmissionId(self.next_submission);
        self.next_submission += 1;

        let cancel = CancelToken::new();
        let started_at = Instant::now();
        let deadline = deadline_after(started_at, self.options.timeout);

        self.state.send_replace(AnalysisState::InFlight {
            submission,
            started_at,
            deadline,
            cancel: cancel.clone(),
        });
        tracing::info!(
            %submission,
            file = %candidate.display_name,
            timeout_secs = self.options.timeout.as_secs(),
            "analysis started"
        );

        let transport = Arc::clone(&self.transport);
        let state = Arc::clone(&self.state);
        let gradcam = self.options.gradcam;
        let candidate = candidate.clone();

        self.task = Some(tokio::spawn(async move {
            // Whichever branch finishes first wins; the others are dropped,
            // which aborts the request or clears the timer.
            let outcome = tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    tracing::debug!(%submission, "analysis cancelled");
                    return;
                }
                _ = tokio::time::sleep_until(deadline) => Err(FailureReason::Timeout),
                response = transport.classify(&candidate, gradcam) => interpret_response(response),
            };
            complete(&state, submission, outcome);
        }));

        Ok(submission)
    }

    /// Wait until no request is in flight and return the settled state.
    pub async fn settled(&self) -> AnalysisState {
        let mut rx = self.state.subscribe();
        let settled = rx.wait_for(|s| !s.is_in_flight()).await.map(|s| s.clone());
        settled.unwrap_or_else(|_| self.state())
    }

    /// Best-effort liveness probe; not part of the request lifecycle.
    pub async fn health(&self) -> Result<serde_json::Value, AppError> {
        self.transport.health().await
    }
}

impl<T: ClassifyTransport> Drop for AnalysisController<T> {
    fn drop(&mut self) {
        if let AnalysisState::InFlight { cancel, .. } = &*self.state.borrow() {
            cancel.cancel();
        }
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

/// `start + timeout`, clamped instead of overflowing the clock.
fn deadline_after(start: Instant, timeout: Duration) -> Instant {
    start
        .checked_add(timeout)
        .or_else(|| start.checked_add(FAR_FUTURE))
        .unwrap_or(start)
}

/// Map a transport outcome onto a terminal result.
pub fn interpret_response(
    response: Result<RawResponse, AppError>,
) -> Result<Arc<ClassificationResult>, FailureReason> {
    let raw = response.map_err(|e| FailureReason::TransportError(e.message))?;

    if !raw.is_success() {
        return Err(FailureReason::ServerRejected(error_detail(
            raw.status, &raw.body,
        )));
    }

    let wire: WireClassification = serde_json::from_slice(&raw.body)
        .map_err(|e| FailureReason::MalformedResponse(e.to_string()))?;
    let result = ClassificationResult::try_from(wire).map_err(FailureReason::MalformedResponse)?;
    Ok(Arc::new(result))
}

/// Human-readable detail for a non-2xx response.
pub fn error_detail(status: u16, body: &[u8]) -> String {
    match serde_json::from_slice::<WireErrorBody>(body) {
        Ok(parsed) => match parsed.detail {
            Some(detail) if !detail.trim().is_empty() => detail,
            _ => format!("HTTP {}", status),
        },
        Err(_) => format!("Server error (HTTP {})", status),
    }
}

/// Apply a terminal outcome, unless `submission` is no longer the live request.
pub(crate) fn complete(
    state: &watch::Sender<AnalysisState>,
    submission: SubmissionId,
    outcome: Result<Arc<ClassificationResult>, FailureReason>,
) -> bool {
    state.send_if_modified(|current| {
        let started_at = match &*current {
            AnalysisState::InFlight {
                submission: live,
                started_at,
                ..
            } if *live == submission => Some(*started_at),
            _ => None,
        };
        let Some(started_at) = started_at else {
            tracing::debug!(%submission, live = current.name(), "discarded stale completion");
            return false;
        };
        let elapsed_ms = started_at.elapsed().as_millis() as u64;

        *current = match outcome {
            Ok(result) => {
                tracing::info!(
                    %submission,
                    elapsed_ms,
                    prediction = %result.predicted_class,
                    confidence = result.confidence,
                    "analysis succeeded"
                );
                AnalysisState::Succeeded { submission, result }
            }
            Err(reason) => {
                tracing::warn!(%submission, elapsed_ms, reason = %reason, "analysis failed");
                AnalysisState::Failed { submission, reason }
            }
        };
        true
    })
}
