//! Login and signup pages.

use std::sync::Arc;

use shared::{
    domain::Session,
    protocol::{AuthResponse, LoginRequest, RegisterRequest},
};
use tracing::{info, warn};

use crate::{
    error::ClientError,
    routes::Route,
    session::SessionStore,
    transport::{decode, ApiClient},
    view_state::{PendingGuard, StateCell},
};

pub const LOGIN_PATH: &str = "/auth/login";
pub const REGISTER_PATH: &str = "/auth/register";

pub const INVALID_LOGIN_RESPONSE: &str = "Login failed: Invalid response from server.";
pub const PASSWORD_MISMATCH: &str = "Passwords do not match";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoginState {
    pub email: String,
    pub password: String,
    pub pending: bool,
    pub error: Option<String>,
}

fn set_login_pending(state: &mut LoginState, value: bool) {
    state.pending = value;
}

#[derive(Clone)]
pub struct LoginController {
    api: ApiClient,
    store: Arc<dyn SessionStore>,
    state: StateCell<LoginState>,
}

impl LoginController {
    pub fn new(api: ApiClient, store: Arc<dyn SessionStore>) -> Self {
        Self {
            api,
            store,
            state: StateCell::new(LoginState::default()),
        }
    }

    pub fn state(&self) -> LoginState {
        self.state.snapshot()
    }

    pub fn set_email(&self, email: impl Into<String>) {
        let email = email.into();
        self.state.update(|s| s.email = email);
    }

    pub fn set_password(&self, password: impl Into<String>) {
        let password = password.into();
        self.state.update(|s| s.password = password);
    }

    /// Signs in and stores the session. On success the caller navigates to the returned route.
    pub async fn submit(&self) -> Result<Route, ClientError> {
        let request = self.state.update(|s| {
            s.error = None;
            LoginRequest {
                email: s.email.trim().to_string(),
                password: s.password.clone(),
            }
        });
        if request.email.is_empty() || request.password.is_empty() {
            return Err(self.fail(ClientError::validation(
                "Email and password are required.",
            )));
        }

        let _pending = PendingGuard::begin(&self.state, "login", set_login_pending);
        match self.authenticate(&request).await {
            Ok(session) => {
                info!(user_id = session.user_id.0, "login succeeded");
                Ok(Route::Dashboard)
            }
            Err(e) => Err(self.fail(e)),
        }
    }

    async fn authenticate(&self, request: &LoginRequest) -> Result<Session, ClientError> {
        let payload = self.api.post_json(LOGIN_PATH, "Login", request).await?;
        let response: AuthResponse = decode("Login", payload)
            .map_err(|_| ClientError::malformed(INVALID_LOGIN_RESPONSE))?;
        let session = response
            .into_session()
            .ok_or_else(|| ClientError::malformed(INVALID_LOGIN_RESPONSE))?;
        self.store.save(&session).await?;
        Ok(session)
    }

    fn fail(&self, error: ClientError) -> ClientError {
        warn!(error = %error, "login failed");
        let message = error.user_message();
        self.state.update(|s| s.error = Some(message));
        error
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SignupState {
    pub username: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
    pub pending: bool,
    pub error: Option<String>,
}

fn set_signup_pending(state: &mut SignupState, value: bool) {
    state.pending = value;
}

#[derive(Clone)]
pub struct SignupController {
    api: ApiClient,
    store: Arc<dyn SessionStore>,
    state: StateCell<SignupState>,
}

impl SignupController {
    pub fn new(api: ApiClient, store: Arc<dyn SessionStore>) -> Self {
        Self {
            api,
            store,
            state: StateCell::new(SignupState::default()),
        }
    }

    pub fn state(&self) -> SignupState {
        self.state.snapshot()
    }

    pub fn set_username(&self, username: impl Into<String>) {
        let username = username.into();
        self.state.update(|s| s.username = username);
    }

    pub fn set_email(&self, email: impl Into<String>) {
        let email = email.into();
        self.state.update(|s| s.email = email);
    }

    pub fn set_password(&self, password: impl Into<String>) {
        let password = password.into();
        self.state.update(|s| s.password = password);
    }

    pub fn set_confirm_password(&self, confirm_password: impl Into<String>) {
        let confirm_password = confirm_password.into();
        self.state.update(|s| s.confirm_password = confirm_password);
    }

    /// Registers the account.
    ///
    /// Returns `Dashboard` when the backend also hands back a usable session, otherwise `Login`.
    pub async fn submit(&self) -> Result<Route, ClientError> {
        let (request, confirm_password) = self.state.update(|s| {
            s.error = None;
            (
                RegisterRequest {
                    username: s.username.trim().to_string(),
                    email: s.email.trim().to_string(),
                    password: s.password.clone(),
                },
                s.confirm_password.clone(),
            )
        });
        if request.password != confirm_password {
            return Err(self.fail(ClientError::validation(PASSWORD_MISMATCH)));
        }
        if request.username.is_empty() || request.email.is_empty() || request.password.is_empty()
        {
            return Err(self.fail(ClientError::validation(
                "Username, email and password are required.",
            )));
        }

        let _pending = PendingGuard::begin(&self.state, "register", set_signup_pending);
        let payload = match self.api.post_json(REGISTER_PATH, "Register", &request).await {
            Ok(payload) => payload,
            Err(e) => return Err(self.fail(e)),
        };

        let session = decode::<AuthResponse>("Register", payload)
            .ok()
            .and_then(AuthResponse::into_session);
        let Some(session) = session else {
            info!(username = %request.username, "registered; sign-in still required");
            return Ok(Route::Login);
        };
        if let Err(e) = self.store.save(&session).await {
            return Err(self.fail(e));
        }
        info!(user_id = session.user_id.0, "registered and signed in");
        Ok(Route::Dashboard)
    }

    fn fail(&self, error: ClientError) -> ClientError {
        warn!(error = %error, "signup failed");
        let message = match &error {
            ClientError::Transport(_) | ClientError::MalformedResponse(_) => {
                "Signup failed. Try again.".to_string()
            }
            other => other.user_message(),
        };
        self.state.update(|s| s.error = Some(message));
        error
    }
}

#[cfg(test)]
#[path = "tests/auth_tests.rs"]
mod tests;
