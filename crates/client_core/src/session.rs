//! Where the authenticated identity lives between page visits.

use std::{collections::BTreeMap, io::ErrorKind, path::PathBuf};

use async_trait::async_trait;
use shared::domain::{Session, UserId};
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::error::ClientError;

pub const TOKEN_KEY: &str = "token";
pub const USER_ID_KEY: &str = "userId";
pub const USERNAME_KEY: &str = "username";

#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn save(&self, session: &Session) -> Result<(), ClientError>;
    /// Returns `None` when no complete session is stored.
    async fn load(&self) -> Result<Option<Session>, ClientError>;
    async fn clear(&self) -> Result<(), ClientError>;
}

#[derive(Default)]
pub struct MemorySessionStore {
    session: Mutex<Option<Session>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_session(session: Session) -> Self {
        Self {
            session: Mutex::new(Some(session)),
        }
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn save(&self, session: &Session) -> Result<(), ClientError> {
        *self.session.lock().await = Some(session.clone());
        Ok(())
    }

    async fn load(&self) -> Result<Option<Session>, ClientError> {
        Ok(self.session.lock().await.clone())
    }

    async fn clear(&self) -> Result<(), ClientError> {
        *self.session.lock().await = None;
        Ok(())
    }
}

/// Persists the session as a flat JSON object of string values under fixed keys.
pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &std::path::Path {
        &self.path
    }
}

fn encode(session: &Session) -> BTreeMap<String, String> {
    BTreeMap::from([
        (TOKEN_KEY.to_string(), session.token.clone()),
        (USER_ID_KEY.to_string(), session.user_id.0.to_string()),
        (USERNAME_KEY.to_string(), session.username.clone()),
    ])
}

fn decode(entries: &BTreeMap<String, String>) -> Option<Session> {
    let token = entries.get(TOKEN_KEY).filter(|v| !v.is_empty())?.clone();
    let user_id = entries.get(USER_ID_KEY)?.trim().parse::<i64>().ok()?;
    let username = entries.get(USERNAME_KEY).filter(|v| !v.is_empty())?.clone();
    Some(Session {
        token,
        user_id: UserId(user_id),
        username,
    })
}

#[async_trait]
impl SessionStore for FileSessionStore {
    async fn save(&self, session: &Session) -> Result<(), ClientError> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await.map_err(|e| {
                ClientError::Storage(format!(
                    "failed to create session directory '{}': {e}",
                    parent.display()
                ))
            })?;
        }
        let raw = serde_json::to_vec_pretty(&encode(session))
            .map_err(|e| ClientError::Storage(format!("failed to encode session: {e}")))?;
        tokio::fs::write(&self.path, raw).await.map_err(|e| {
            ClientError::Storage(format!(
                "failed to write session file '{}': {e}",
                self.path.display()
            ))
        })?;
        debug!(path = %self.path.display(), user_id = session.user_id.0, "session saved");
        Ok(())
    }

    async fn load(&self) -> Result<Option<Session>, ClientError> {
        let raw = match tokio::fs::read(&self.path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(ClientError::Storage(format!(
                    "failed to read session file '{}': {e}",
                    self.path.display()
                )))
            }
        };

        let Ok(entries) = serde_json::from_slice::<BTreeMap<String, String>>(&raw) else {
            warn!(
                path = %self.path.display(),
                "session file is unreadable; treating as signed out"
            );
            return Ok(None);
        };
        let session = decode(&entries);
        debug!(
            path = %self.path.display(),
            present = session.is_some(),
            "session loaded"
        );
        Ok(session)
    }

    async fn clear(&self) -> Result<(), ClientError> {
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(ClientError::Storage(format!(
                "failed to remove session file '{}': {e}",
                self.path.display()
            ))),
        }
    }
}

#[cfg(test)]
#[path = "tests/session_tests.rs"]
mod tests;
