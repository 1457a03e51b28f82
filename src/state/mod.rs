//! Shared application state and the pure state machines it coordinates.

/// Scoring engine: final scores, winners, placements.
pub mod scoring;
/// Match timer state machine.
pub mod timer;

use std::sync::Arc;

use tokio::sync::RwLock;

use crate::{config::AppConfig, dao::match_store::MatchStore, error::ServiceError};

/// Handle to the shared application state, cheap to clone.
pub type SharedState = Arc<AppState>;

/// Central application state holding the installed store and configuration.
///
/// All gameplay state lives in the store; nothing here survives a request
/// beyond the configuration and the store handle itself.
pub struct AppState {
    match_store: RwLock<Option<Arc<dyn MatchStore>>>,
    config: AppConfig,
}

impl AppState {
    /// Construct a new [`AppState`] wrapped in an [`Arc`].
    ///
    /// The application starts in degraded mode until a storage backend is
    /// installed.
    pub fn new(config: AppConfig) -> SharedState {
        Arc::new(Self {
            match_store: RwLock::new(None),
            config,
        })
    }

    /// Install a storage backend, leaving degraded mode.
    pub async fn install_match_store(&self, store: Arc<dyn MatchStore>) {
        let mut guard = self.match_store.write().await;
        *guard = Some(store);
    }

    /// Remove the storage backend, entering degraded mode.
    pub async fn clear_match_store(&self) {
        let mut guard = self.match_store.write().await;
        guard.take();
    }

    /// Whether the application currently has no storage backend.
    pub async fn is_degraded(&self) -> bool {
        self.match_store.read().await.is_none()
    }

    /// Obtain the installed store, or fail with [`ServiceError::Degraded`].
    pub async fn store(&self) -> Result<Arc<dyn MatchStore>, ServiceError> {
        let guard = self.match_store.read().await;
        guard.as_ref().cloned().ok_or(ServiceError::Degraded)
    }

    /// Runtime configuration.
    pub fn config(&self) -> &AppConfig {
        &self.config
    }
}
