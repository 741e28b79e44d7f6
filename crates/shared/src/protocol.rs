use serde::{Deserialize, Serialize};

use crate::domain::{PdfId, Rating, Session, UserId};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

/// Body returned by the login and register endpoints.
///
/// Every field is optional on the wire; callers decide which ones they require.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AuthResponse {
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub id: Option<UserId>,
    #[serde(default)]
    pub username: Option<String>,
}

impl AuthResponse {
    /// Returns a session only when token, id and username are all present and non-empty.
    pub fn into_session(self) -> Option<Session> {
        let token = self.token.filter(|token| !token.is_empty())?;
        let user_id = self.id?;
        let username = self.username.filter(|name| !name.is_empty())?;
        Some(Session {
            token,
            user_id,
            username,
        })
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UploadResponse {
    #[serde(default)]
    pub pdf_id: Option<PdfId>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryRequest {
    pub pdf_id: PdfId,
    pub user_id: UserId,
    pub model_type: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SummaryResponse {
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub model_used: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaveSummaryRequest {
    pub pdf_id: PdfId,
    pub summary: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SaveSummaryResponse {
    #[serde(default)]
    pub success: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedbackRequest {
    pub user_id: UserId,
    pub rating: Rating,
    pub comment: String,
}

/// One entry of the summaries listing. The backend shape is loose, so nothing is required.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryRecord {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub pdf_id: Option<PdfId>,
    #[serde(default)]
    pub user_id: Option<UserId>,
    #[serde(default, alias = "summary")]
    pub summary_text: Option<String>,
}
