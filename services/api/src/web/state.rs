//! services/api/src/web/state.rs
//!
//! Defines the application's shared state.

use crate::config::Config;
use seo_booster_core::{Analyzer, SessionStore};
use std::sync::Arc;
use tokio::sync::Mutex;

//=========================================================================================
// AppState (Shared Across All Requests)
//=========================================================================================

/// The shared application state, created once at startup and passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    /// Owns the generator and the one session store every handler mutates.
    pub analyzer: Arc<Analyzer>,
}

impl AppState {
    pub fn store(&self) -> &Arc<Mutex<SessionStore>> {
        self.analyzer.store()
    }
}
