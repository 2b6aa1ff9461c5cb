//! Shared application state injected into every Axum handler.

use std::sync::Arc;

use chatlog_core::AnyStore;

use crate::config::Config;

/// State shared across all HTTP handlers.
#[derive(Clone, Debug)]
pub struct AppState {
    /// Server configuration (env-derived).
    pub config: Arc<Config>,
    /// Message store backed by the sqlx connection pool.
    pub store: Arc<AnyStore>,
}

#[cfg(test)]
impl AppState {
    /// Fresh state over a private in-memory database.
    pub async fn in_memory() -> Arc<Self> {
        let store = AnyStore::connect("sqlite::memory:", 1)
            .await
            .expect("in-memory store");
        Arc::new(AppState {
            config: Arc::new(Config {
                enable_swagger: false,
                ..Config::default()
            }),
            store: Arc::new(store),
        })
    }
}
