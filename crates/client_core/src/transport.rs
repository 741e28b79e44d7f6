//! HTTP adapter for the summarization backend.
//!
//! Every call resolves to `Ok(json)` on a 2xx response or a [`ClientError`] otherwise;
//! nothing here decides what the user sees.

use reqwest::{
    header::{HeaderMap, HeaderValue, ACCEPT},
    multipart::{Form, Part},
    Client, Method, RequestBuilder,
};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use shared::error::ErrorBody;
use tracing::{debug, error, info};

use crate::{
    config::normalize_base_url,
    error::{ClientError, GENERIC_FAILURE_MESSAGE},
};

pub const UPLOAD_FIELD_NAME: &str = "file";
pub const PDF_MIME_TYPE: &str = "application/pdf";

/// A file chosen by the user, held in memory until it is uploaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedFile {
    pub file_name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

impl SelectedFile {
    pub fn pdf(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            mime_type: PDF_MIME_TYPE.to_string(),
            bytes,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ApiClient {
    http: Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: &str) -> Result<Self, ClientError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        let http = Client::builder()
            .default_headers(headers)
            .build()
            .map_err(|e| ClientError::Transport(format!("failed to build http client: {e}")))?;
        Ok(Self {
            http,
            base_url: normalize_base_url(base_url)?,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Sends a JSON body (or none) and returns the decoded response body.
    pub async fn send<B>(
        &self,
        method: Method,
        path: &str,
        label: &str,
        body: Option<&B>,
    ) -> Result<Value, ClientError>
    where
        B: Serialize + ?Sized,
    {
        let mut request = self.http.request(method.clone(), self.url(path));
        if let Some(body) = body {
            request = request.json(body);
        }
        debug!(label, %method, path, "api request");
        self.execute(label, request).await
    }

    pub async fn post_json<B>(
        &self,
        path: &str,
        label: &str,
        body: &B,
    ) -> Result<Value, ClientError>
    where
        B: Serialize + ?Sized,
    {
        self.send(Method::POST, path, label, Some(body)).await
    }

    pub async fn get_json(&self, path: &str, label: &str) -> Result<Value, ClientError> {
        self.send::<Value>(Method::GET, path, label, None).await
    }

    /// Uploads `file` as a multipart form with a single `file` field.
    pub async fn upload_file(
        &self,
        path: &str,
        label: &str,
        file: &SelectedFile,
    ) -> Result<Value, ClientError> {
        let part = Part::bytes(file.bytes.clone())
            .file_name(file.file_name.clone())
            .mime_str(&file.mime_type)
            .map_err(|e| ClientError::validation(format!("invalid file type: {e}")))?;
        let form = Form::new().part(UPLOAD_FIELD_NAME, part);
        debug!(
            label,
            path,
            file_name = %file.file_name,
            size_bytes = file.bytes.len(),
            "api multipart upload"
        );
        self.execute(label, self.http.post(self.url(path)).multipart(form))
            .await
    }

    async fn execute(&self, label: &str, request: RequestBuilder) -> Result<Value, ClientError> {
        let response = request.send().await.map_err(|e| {
            error!(label, error = %e, "api request failed before a response arrived");
            ClientError::from(e)
        })?;

        let status = response.status();
        let bytes = response.bytes().await.map_err(|e| {
            error!(label, status = status.as_u16(), error = %e, "api response body unreadable");
            ClientError::from(e)
        })?;

        if !status.is_success() {
            let message = serde_json::from_slice::<ErrorBody>(&bytes)
                .ok()
                .and_then(|body| body.message())
                .unwrap_or_else(|| GENERIC_FAILURE_MESSAGE.to_string());
            error!(
                label,
                status = status.as_u16(),
                detail = %message,
                payload = %String::from_utf8_lossy(&bytes),
                "api request failed"
            );
            return Err(ClientError::Backend { status, message });
        }

        let payload = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).map_err(|e| {
                error!(label, status = status.as_u16(), error = %e, "api response is not json");
                ClientError::malformed(format!("{label}: response is not valid JSON"))
            })?
        };
        info!(label, status = status.as_u16(), %payload, "api request succeeded");
        Ok(payload)
    }
}

/// Decodes a success payload into the shape an orchestrator expects.
pub fn decode<T: DeserializeOwned>(label: &str, payload: Value) -> Result<T, ClientError> {
    serde_json::from_value(payload).map_err(|e| {
        error!(label, error = %e, "api response has unexpected shape");
        ClientError::malformed(format!("{label}: unexpected response format"))
    })
}

#[cfg(test)]
#[path = "tests/transport_tests.rs"]
mod tests;
