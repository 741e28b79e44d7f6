use tracing::{debug, warn};

use crate::session::SessionStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    Home,
    Login,
    Signup,
    Dashboard,
}

impl Route {
    pub fn path(self) -> &'static str {
        match self {
            Route::Home => "/",
            Route::Login => "/login",
            Route::Signup => "/signup",
            Route::Dashboard => "/dashboard",
        }
    }

    pub fn from_path(path: &str) -> Option<Self> {
        match path.trim_end_matches('/') {
            "" => Some(Route::Home),
            "/login" => Some(Route::Login),
            "/signup" => Some(Route::Signup),
            "/dashboard" => Some(Route::Dashboard),
            _ => None,
        }
    }

    pub fn is_protected(self) -> bool {
        matches!(self, Route::Dashboard)
    }
}

/// Resolves the route that is actually shown: protected pages without a session go to login.
///
/// An unreadable store counts as signed out.
pub async fn enter(route: Route, store: &dyn SessionStore) -> Route {
    if !route.is_protected() {
        return route;
    }
    match store.load().await {
        Ok(Some(_)) => route,
        Ok(None) => {
            debug!(route = route.path(), "no session; redirecting to login");
            Route::Login
        }
        Err(e) => {
            warn!(
                route = route.path(),
                error = %e,
                "session store unreadable; redirecting to login"
            );
            Route::Login
        }
    }
}
