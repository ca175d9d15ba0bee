use dash_auth::{AuthService, SessionProvider};
use dash_common::Config;
use std::sync::Arc;

/// Shared application state for all routes.
#[derive(Clone)]
pub struct ApiState {
    pub auth: Arc<AuthService>,
    /// Session source used by the dashboard gate. Usually `auth` itself.
    pub sessions: Arc<dyn SessionProvider>,
    pub config: Arc<Config>,
}

impl ApiState {
    pub fn new(auth: Arc<AuthService>, config: Arc<Config>) -> Self {
        Self {
            sessions: auth.clone(),
            auth,
            config,
        }
    }
}
