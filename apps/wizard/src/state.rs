use std::sync::Arc;

use crate::config::Config;
use crate::wizard::{SessionStore, Wizard};

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    /// Step orchestration over the pluggable analysis gateway.
    pub wizard: Wizard,
    /// Live wizard sessions, in memory only.
    pub sessions: Arc<SessionStore>,
}
