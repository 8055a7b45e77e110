use crate::error::AppError;
use crate::models::upload_types::{SelectedFile, UploadSummary};
use crate::models::view_types::{ProbabilityBar, SummaryView};
use crate::services::analysis::client::ClassifyTransport;
use crate::services::analysis::controller::{
    AnalysisController, AnalysisOptions, AnalysisState, SubmissionId,
};
use crate::services::content::ContentTables;
use crate::services::upload::UploadStaging;
use crate::services::views::derive::{ResultViews, TabContent};
use crate::services::views::tabs::{Tab, TabSelection};
use serde::Serialize;
use std::path::Path;
use std::sync::Arc;

#[derive(Debug, Serialize, Clone, PartialEq)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum ScreenStatus {
    Idle,
    Loading {
        title: String,
        subtitle: String,
        steps: Vec<String>,
    },
    Error {
        message: String,
    },
    Ready,
}

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct TabEntry {
    pub id: Tab,
    pub title: String,
    pub active: bool,
}

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct ResultsPanel {
    pub submission: SubmissionId,
    pub summary: SummaryView,
    pub probability_chart: Vec<ProbabilityBar>,
    pub tabs: Vec<TabEntry>,
    pub active_tab: Tab,
    pub content: TabContent,
}

/// Everything the shell draws, as one snapshot.
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct Screen {
    pub upload: Option<UploadSummary>,
    pub can_analyze: bool,
    pub status: ScreenStatus,
    pub results: Option<ResultsPanel>,
}

struct LiveResult {
    submission: SubmissionId,
    views: Arc<ResultViews>,
}

/// One user session: staged upload, the request controller and the result views.
pub struct AnalysisSession<T: ClassifyTransport> {
    staging: UploadStaging,
    controller: AnalysisController<T>,
    tabs: TabSelection,
    content: &'static ContentTables,
    live: Option<LiveResult>,
}

impl<T: ClassifyTransport> AnalysisSession<T> {
    pub fn new(transport: T, options: AnalysisOptions, content: &'static ContentTables) -> Self {
        Self {
            staging: UploadStaging::new(),
            controller: AnalysisController::new(transport, options),
            tabs: TabSelection::new(),
            content,
            live: None,
        }
    }

    pub fn controller(&self) -> &AnalysisController<T> {
        &self.controller
    }

    pub fn select_file(&mut self, file: SelectedFile) -> Result<UploadSummary, AppError> {
        self.staging.select(file)?;
        self.upload_summary()
    }

    pub fn select_path(&mut self, path: &Path) -> Result<UploadSummary, AppError> {
        self.staging.select_path(path)?;
        self.upload_summary()
    }

    fn upload_summary(&self) -> Result<UploadSummary, AppError> {
        self.staging
            .staged()
            .map(UploadSummary::from)
            .ok_or_else(|| "No file staged".into())
    }

    pub fn clear_upload(&mut self) {
        self.staging.clear();
    }

    /// Submit the staged file. Must be called from within a Tokio runtime.
    pub fn analyze(&mut self) -> Result<SubmissionId, AppError> {
        let candidate = self
            .staging
            .candidate()
            .cloned()
            .ok_or_else(|| AppError::from("No file selected. Choose an MRI image first."))?;
        let submission = self.controller.submit(&candidate)?;
        // The previous result stops being shown as soon as a new request starts.
        self.live = None;
        Ok(submission)
    }

    /// Wait for the current request to settle and bring the views up to date.
    pub async fn wait_for_completion(&mut self) -> AnalysisState {
        let settled = self.controller.settled().await;
        self.sync();
        settled
    }

    /// Returns `false` when there is no result to switch tabs on.
    pub fn select_tab(&mut self, tab: Tab) -> bool {
        self.sync();
        if self.live.is_none() {
            return false;
        }
        self.tabs.select(tab);
        true
    }

    pub fn active_tab(&self) -> Tab {
        self.tabs.active()
    }

    pub fn views(&mut self) -> Option<Arc<ResultViews>> {
        self.sync();
        self.live.as_ref().map(|live| Arc::clone(&live.views))
    }

    pub async fn health(&self) -> Result<serde_json::Value, AppError> {
        self.controller.health().await
    }

    /// Pull the controller state into the derived views.
    fn sync(&mut self) {
        match self.controller.state() {
            AnalysisState::Succeeded { submission, result } => {
                let is_new = self
                    .live
                    .as_ref()
                    .map_or(true, |live| live.submission != submission);
                if is_new {
                    let views = ResultViews::derive(&result, self.content, chrono::Local::now());
                    self.live = Some(LiveResult {
                        submission,
                        views: Arc::new(views),
                    });
                    self.tabs.reset();
                    tracing::debug!(%submission, "result views derived");
                }
            }
            AnalysisState::Failed { .. } | AnalysisState::InFlight { .. } | AnalysisState::Idle => {
                self.live = None;
            }
        }
    }

    pub fn screen(&mut self) -> Screen {
        self.sync();
        let state = self.controller.state();

        let status = match &state {
            AnalysisState::Idle => ScreenStatus::Idle,
            AnalysisState::InFlight { .. } => ScreenStatus::Loading {
                title: self.content.loading.title.clone(),
                subtitle: self.content.loading.subtitle.clone(),
                steps: self.content.loading.steps.clone(),
            },
            AnalysisState::Failed { reason, .. } => ScreenStatus::Error {
                message: reason.to_string(),
            },
            AnalysisState::Succeeded { .. } => ScreenStatus::Ready,
        };

        let active = self.tabs.active();
        let results = self.live.as_ref().map(|live| ResultsPanel {
            submission: live.submission,
            summary: live.views.summary.clone(),
            probability_chart: live.views.probability_chart.clone(),
            tabs: Tab::ALL
                .iter()
                .map(|tab| TabEntry {
                    id: *tab,
                    title: tab.title().to_string(),
                    active: *tab == active,
                })
                .collect(),
            active_tab: active,
            content: live.views.content_for(active),
        });

        Screen {
            upload: self.staging.staged().map(UploadSummary::from),
            can_analyze: self.staging.staged().is_some() && !state.is_in_flight(),
            status,
            results,
        }
    }
}
