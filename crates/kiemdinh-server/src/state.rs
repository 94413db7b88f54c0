use std::sync::Arc;

use kiemdinh_core::rules::RuleTable;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// The rule table is loaded once at start-up and never mutated, so every
/// request evaluates against the same version.
#[derive(Clone)]
pub struct AppState {
    pub table: Arc<RuleTable>,
    pub config: Arc<ServerConfig>,
}

impl AppState {
    pub fn new(table: RuleTable, config: ServerConfig) -> Self {
        Self {
            table: Arc::new(table),
            config: Arc::new(config),
        }
    }
}
