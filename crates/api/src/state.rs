use std::sync::Arc;

use cast_pipeline::ProfileGenerator;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheaply cloneable; everything inside is behind `Arc`.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ServerConfig>,
    /// Request pipeline with whichever integrations are enabled.
    pub generator: Arc<ProfileGenerator>,
}
