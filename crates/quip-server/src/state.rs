use quip_core::JokeManager;
use quip_db::Database;

/// Shared application state, available to all route handlers via `State<Arc<AppState>>`.
pub struct AppState {
    pub db: Database,
    pub manager: JokeManager,
}
