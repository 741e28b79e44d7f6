//! Request orchestration for the SummAIze web client.
//!
//! Pages are modelled as controllers that own their view state and talk to the backend
//! through [`transport::ApiClient`]. The authenticated identity is loaded from a
//! [`session::SessionStore`] once per page entry and handed to the controller explicitly.

pub mod auth;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod routes;
pub mod session;
pub mod transport;
pub mod view_state;

pub use auth::{LoginController, LoginState, SignupController, SignupState};
pub use config::{load_settings, ClientSettings};
pub use dashboard::{DashboardController, DashboardState};
pub use error::{ClientError, ErrorCategory};
pub use routes::{enter, Route};
pub use session::{FileSessionStore, MemorySessionStore, SessionStore};
pub use transport::{ApiClient, SelectedFile};
pub use view_state::{Notice, NoticeKind, PendingAction, PendingFlags};

#[cfg(test)]
#[path = "tests/support.rs"]
mod test_support;
