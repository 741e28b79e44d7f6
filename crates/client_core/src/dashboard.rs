//! Dashboard page: upload a PDF, summarize it, save the summary, rate the result.
//!
//! Each orchestrator validates locally, flips its pending flag for the duration of one
//! backend call, then writes either the result or a notice into the view state. A failed
//! call never touches the fields a previous success populated.

use std::sync::Arc;

use shared::{
    domain::{
        model_type_for_label, PdfId, Rating, Session, SummaryResult, PRETRAINED_DISPLAY_LABEL,
    },
    protocol::{
        FeedbackRequest, SaveSummaryRequest, SaveSummaryResponse, SummaryRecord, SummaryRequest,
        SummaryResponse, UploadResponse,
    },
};
use tracing::{info, warn};

use crate::{
    error::{ClientError, GENERIC_FAILURE_MESSAGE},
    routes::Route,
    session::SessionStore,
    transport::{decode, ApiClient, SelectedFile},
    view_state::{Notice, PendingAction, PendingFlags, PendingGuard, StateCell},
};

pub const UPLOAD_PATH: &str = "/pdf/upload";
pub const SUMMARIZE_PATH: &str = "/summary/summarize/";
pub const SAVE_SUMMARY_PATH: &str = "/save-summary";
pub const FEEDBACK_PATH: &str = "/feedback/submit";
pub const LIST_SUMMARIES_PATH: &str = "/summary/get_all_summaries/";

pub const NO_FILE_SELECTED: &str = "No file selected!";
pub const UPLOAD_FIRST: &str = "Upload a PDF first!";
pub const NO_SUMMARY: &str = "No summary available.";
pub const NO_ASSOCIATED_PDF: &str = "No associated PDF. Upload and summarize first!";
pub const RATING_REQUIRED: &str = "Please select a rating!";
pub const EMPTY_COMMENT: &str = "Feedback comment cannot be empty!";

const UPLOAD_FAILED: &str = "Upload failed. Please try again.";
const SUMMARIZE_FAILED: &str = "Summarization failed. Please try again.";
const SAVE_FAILED: &str = "Failed to save summary. Please try again.";
const FEEDBACK_FAILED: &str = "Failed to submit feedback. Try again.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardState {
    pub username: String,
    pub selected_file: Option<SelectedFile>,
    pub pdf_id: Option<PdfId>,
    pub selected_model: String,
    pub summary: Option<SummaryResult>,
    pub rating: Option<Rating>,
    pub comment: String,
    pub summaries: Vec<SummaryRecord>,
    pub pending: PendingFlags,
    pub notice: Option<Notice>,
}

impl DashboardState {
    fn for_session(session: &Session) -> Self {
        Self {
            username: session.username.clone(),
            selected_file: None,
            pdf_id: None,
            selected_model: PRETRAINED_DISPLAY_LABEL.to_string(),
            summary: None,
            rating: Some(Rating::default()),
            comment: String::new(),
            summaries: Vec::new(),
            pending: PendingFlags::default(),
            notice: None,
        }
    }
}

fn set_upload_pending(state: &mut DashboardState, value: bool) {
    state.pending.set(PendingAction::Upload, value);
}

fn set_summarize_pending(state: &mut DashboardState, value: bool) {
    state.pending.set(PendingAction::Summarize, value);
}

fn set_feedback_pending(state: &mut DashboardState, value: bool) {
    state.pending.set(PendingAction::Feedback, value);
}

/// Message shown for a failed action: local and backend-provided text wins over the fallback.
fn notice_text(error: &ClientError, fallback: &str) -> String {
    match error {
        ClientError::Validation(message) => message.clone(),
        ClientError::Backend { message, .. } if message != GENERIC_FAILURE_MESSAGE => {
            message.clone()
        }
        _ => fallback.to_string(),
    }
}

#[derive(Clone)]
pub struct DashboardController {
    api: ApiClient,
    store: Arc<dyn SessionStore>,
    session: Session,
    state: StateCell<DashboardState>,
}

impl DashboardController {
    pub fn new(api: ApiClient, store: Arc<dyn SessionStore>, session: Session) -> Self {
        let state = StateCell::new(DashboardState::for_session(&session));
        Self {
            api,
            store,
            session,
            state,
        }
    }

    /// Opens the dashboard for the stored session, or tells the caller where to go instead.
    pub async fn enter(api: ApiClient, store: Arc<dyn SessionStore>) -> Result<Self, Route> {
        let session = match store.load().await {
            Ok(Some(session)) => session,
            Ok(None) => return Err(Route::Login),
            Err(e) => {
                warn!(error = %e, "session store unreadable; redirecting to login");
                return Err(Route::Login);
            }
        };
        let controller = Self::new(api, store, session);
        controller.refresh_summaries().await;
        Ok(controller)
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn state(&self) -> DashboardState {
        self.state.snapshot()
    }

    pub fn is_pending(&self, action: PendingAction) -> bool {
        self.state.read(|s| s.pending.get(action))
    }

    pub fn select_file(&self, file: SelectedFile) {
        self.state.update(|s| s.selected_file = Some(file));
    }

    pub fn select_model(&self, label: impl Into<String>) {
        let label = label.into();
        self.state.update(|s| s.selected_model = label);
    }

    pub fn set_rating(&self, stars: u8) -> Result<(), ClientError> {
        let rating = Rating::new(stars).map_err(|e| ClientError::validation(e.to_string()))?;
        self.state.update(|s| s.rating = Some(rating));
        Ok(())
    }

    pub fn clear_rating(&self) {
        self.state.update(|s| s.rating = None);
    }

    pub fn set_comment(&self, comment: impl Into<String>) {
        let comment = comment.into();
        self.state.update(|s| s.comment = comment);
    }

    pub fn dismiss_notice(&self) {
        self.state.update(|s| s.notice = None);
    }

    pub async fn upload(&self) -> Result<PdfId, ClientError> {
        let Some(file) = self.state.read(|s| s.selected_file.clone()) else {
            return Err(self.fail(ClientError::validation(NO_FILE_SELECTED), UPLOAD_FAILED));
        };

        let _pending = PendingGuard::begin(&self.state, "upload", set_upload_pending);
        match self.request_upload(&file).await {
            Ok(pdf_id) => {
                info!(pdf_id = pdf_id.0, file_name = %file.file_name, "pdf uploaded");
                self.state.update(|s| {
                    s.pdf_id = Some(pdf_id);
                    s.selected_file = None;
                    s.notice = Some(Notice::info("PDF uploaded successfully!"));
                });
                Ok(pdf_id)
            }
            Err(e) => Err(self.fail(e, UPLOAD_FAILED)),
        }
    }

    async fn request_upload(&self, file: &SelectedFile) -> Result<PdfId, ClientError> {
        let payload = self.api.upload_file(UPLOAD_PATH, "Upload", file).await?;
        let response: UploadResponse = decode("Upload", payload)?;
        response
            .pdf_id
            .ok_or_else(|| ClientError::malformed("upload response has no pdf_id"))
    }

    pub async fn summarize(&self) -> Result<SummaryResult, ClientError> {
        let (pdf_id, label) = self.state.read(|s| (s.pdf_id, s.selected_model.clone()));
        let Some(pdf_id) = pdf_id else {
            return Err(self.fail(ClientError::validation(UPLOAD_FIRST), SUMMARIZE_FAILED));
        };
        let request = SummaryRequest {
            pdf_id,
            user_id: self.session.user_id,
            model_type: model_type_for_label(&label),
        };

        let _pending = PendingGuard::begin(&self.state, "summarize", set_summarize_pending);
        match self.request_summary(&request).await {
            Ok(result) => {
                info!(
                    pdf_id = pdf_id.0,
                    model_used = %result.model_used,
                    "summary received"
                );
                self.state.update(|s| s.summary = Some(result.clone()));
                Ok(result)
            }
            Err(e) => Err(self.fail(e, SUMMARIZE_FAILED)),
        }
    }

    async fn request_summary(
        &self,
        request: &SummaryRequest,
    ) -> Result<SummaryResult, ClientError> {
        let payload = self
            .api
            .post_json(SUMMARIZE_PATH, "Summarize", request)
            .await?;
        let response: SummaryResponse = decode("Summarize", payload)?;
        let text = response
            .summary
            .filter(|text| !text.trim().is_empty())
            .ok_or_else(|| ClientError::malformed("Invalid API response: No summary found."))?;
        Ok(SummaryResult {
            text,
            model_used: response.model_used.unwrap_or_default(),
        })
    }

    pub async fn save_summary(&self) -> Result<(), ClientError> {
        let (summary, pdf_id) = self.state.read(|s| (s.summary.clone(), s.pdf_id));
        let Some(summary) = summary else {
            return Err(self.fail(ClientError::validation(NO_SUMMARY), SAVE_FAILED));
        };
        let Some(pdf_id) = pdf_id else {
            return Err(self.fail(ClientError::validation(NO_ASSOCIATED_PDF), SAVE_FAILED));
        };
        let request = SaveSummaryRequest {
            pdf_id,
            summary: summary.text,
        };

        match self.request_save(&request).await {
            Ok(()) => {
                info!(pdf_id = pdf_id.0, "summary saved");
                self.state
                    .update(|s| s.notice = Some(Notice::info("Summary saved successfully!")));
                Ok(())
            }
            Err(e) => Err(self.fail(e, SAVE_FAILED)),
        }
    }

    async fn request_save(&self, request: &SaveSummaryRequest) -> Result<(), ClientError> {
        let payload = self
            .api
            .post_json(SAVE_SUMMARY_PATH, "Save Summary", request)
            .await?;
        let response: SaveSummaryResponse = decode("Save Summary", payload)?;
        if response.success {
            Ok(())
        } else {
            Err(ClientError::malformed("Unexpected response format"))
        }
    }

    pub async fn submit_feedback(&self) -> Result<(), ClientError> {
        let (rating, comment) = self.state.read(|s| (s.rating, s.comment.trim().to_string()));
        let Some(rating) = rating else {
            return Err(self.fail(ClientError::validation(RATING_REQUIRED), FEEDBACK_FAILED));
        };
        if comment.is_empty() {
            return Err(self.fail(ClientError::validation(EMPTY_COMMENT), FEEDBACK_FAILED));
        }
        let request = FeedbackRequest {
            user_id: self.session.user_id,
            rating,
            comment,
        };

        let _pending = PendingGuard::begin(&self.state, "feedback", set_feedback_pending);
        match self
            .api
            .post_json(FEEDBACK_PATH, "Submit Feedback", &request)
            .await
        {
            Ok(_) => {
                info!(rating = rating.stars(), "feedback submitted");
                self.state.update(|s| {
                    s.rating = Some(Rating::default());
                    s.comment.clear();
                    s.notice = Some(Notice::info("Feedback submitted successfully!"));
                });
                Ok(())
            }
            Err(e) => Err(self.fail(e, FEEDBACK_FAILED)),
        }
    }

    /// Reloads the summaries listing. Failures are logged and read as an empty list.
    pub async fn refresh_summaries(&self) -> Vec<SummaryRecord> {
        let summaries = match self.request_summaries().await {
            Ok(summaries) => summaries,
            Err(e) => {
                warn!(error = %e, "failed to fetch summaries; showing none");
                Vec::new()
            }
        };
        self.state.update(|s| s.summaries = summaries.clone());
        summaries
    }

    async fn request_summaries(&self) -> Result<Vec<SummaryRecord>, ClientError> {
        let payload = self
            .api
            .get_json(LIST_SUMMARIES_PATH, "List Summaries")
            .await?;
        if payload.is_null() {
            return Ok(Vec::new());
        }
        decode("List Summaries", payload)
    }

    /// Forgets the stored session. The controller should be dropped afterwards.
    pub async fn logout(&self) -> Result<Route, ClientError> {
        self.store.clear().await?;
        info!(user_id = self.session.user_id.0, "logged out");
        Ok(Route::Login)
    }

    fn fail(&self, error: ClientError, fallback: &str) -> ClientError {
        warn!(error = %error, category = ?error.category(), "dashboard action failed");
        let notice = Notice::error(notice_text(&error, fallback));
        self.state.update(|s| s.notice = Some(notice));
        error
    }
}

#[cfg(test)]
#[path = "tests/dashboard_tests.rs"]
mod tests;
