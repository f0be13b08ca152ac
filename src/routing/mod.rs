//! Route table and login gate around the capture form.

use serde::{Deserialize, Serialize};

pub const LOGIN_PATH: &str = "/login";
pub const SIGNUP_PATH: &str = "/signup";
pub const DASHBOARD_PATH: &str = "/dashboard";

/// Top-level views the router can land on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Login,
    Signup,
    Dashboard,
}

/// Result of resolving a path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Render(View),
    Redirect(&'static str),
    NotFound,
}

/// Explicit authentication state, handed to the router at construction and
/// queried synchronously. No ambient context lookup.
#[derive(Debug, Clone)]
pub struct AuthState {
    session_token: Option<String>,
}

impl AuthState {
    pub fn new(session_token: Option<String>) -> Self {
        Self { session_token }
    }

    pub fn anonymous() -> Self {
        Self::new(None)
    }

    pub fn is_authenticated(&self) -> bool {
        self.session_token.is_some()
    }
}

/// Gate applied to protected views: render when authenticated, otherwise
/// redirect to the login path.
#[derive(Debug, Clone)]
pub struct AuthGate {
    auth: AuthState,
}

impl AuthGate {
    pub fn new(auth: AuthState) -> Self {
        Self { auth }
    }

    pub fn admit(&self, view: View) -> Resolution {
        if self.auth.is_authenticated() {
            Resolution::Render(view)
        } else {
            Resolution::Redirect(LOGIN_PATH)
        }
    }
}

#[derive(Debug, Clone)]
struct RouteEntry {
    path: &'static str,
    view: View,
    protected: bool,
    enabled: bool,
}

/// Flat route table; no nested or parameterized routes.
#[derive(Debug, Clone)]
pub struct Router {
    gate: AuthGate,
    routes: Vec<RouteEntry>,
}

impl Router {
    /// The current surface: login and signup. The protected dashboard entry
    /// is configured but disabled until that screen ships.
    pub fn standard(auth: AuthState) -> Self {
        Self {
            gate: AuthGate::new(auth),
            routes: vec![
                RouteEntry {
                    path: LOGIN_PATH,
                    view: View::Login,
                    protected: false,
                    enabled: true,
                },
                RouteEntry {
                    path: SIGNUP_PATH,
                    view: View::Signup,
                    protected: false,
                    enabled: true,
                },
                RouteEntry {
                    path: DASHBOARD_PATH,
                    view: View::Dashboard,
                    protected: true,
                    enabled: false,
                },
            ],
        }
    }

    /// Flip a configured route on or off. Returns false when the path is not
    /// in the table.
    pub fn set_enabled(&mut self, path: &str, enabled: bool) -> bool {
        match self.routes.iter_mut().find(|entry| entry.path == path) {
            Some(entry) => {
                entry.enabled = enabled;
                true
            }
            None => false,
        }
    }

    pub fn resolve(&self, path: &str) -> Resolution {
        match self.routes.iter().find(|entry| entry.path == path) {
            Some(entry) if entry.enabled => {
                if entry.protected {
                    self.gate.admit(entry.view)
                } else {
                    Resolution::Render(entry.view)
                }
            }
            _ => Resolution::NotFound,
        }
    }
}

/// In-memory navigation state handed to the signup view by Convert. Reaching
/// signup without it is the signup view's problem, not the router's.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SignupHandoff {
    #[serde(default)]
    pub lead: Option<serde_json::Value>,
}
