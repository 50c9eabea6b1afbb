//! Shared application state.
//!
//! DESIGN
//! ======
//! `AppState` is injected into Axum handlers via the `State` extractor.
//! The relay keeps no per-request state: it only holds the paper agent,
//! behind a trait object so route tests can substitute a mock.

use std::sync::Arc;

use agent::PaperAgent;

/// Clone is required by Axum; the agent is Arc-wrapped.
#[derive(Clone)]
pub struct AppState {
    pub agent: Arc<dyn PaperAgent>,
}

impl AppState {
    #[must_use]
    pub fn new(agent: Arc<dyn PaperAgent>) -> Self {
        Self { agent }
    }
}
