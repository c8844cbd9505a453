//! Connection lifecycle: `disconnected -> connected -> disconnected`.

use crate::storage::StorageEngine;
use serde::Serialize;
use tokio::sync::Mutex;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionState {
    Disconnected,
    Connected,
}

/// Tracks whether the engine has been authenticated. Nothing else in the
/// crate consults this state; operations are usable before `connect`.
pub struct Lifecycle {
    state: Mutex<ConnectionState>,
}

impl Lifecycle {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(ConnectionState::Disconnected),
        }
    }

    pub async fn state(&self) -> ConnectionState {
        *self.state.lock().await
    }

    /// Authenticates against the engine. Failures are reported and leave the
    /// state untouched; they are never returned as errors.
    pub async fn connect(&self, engine: &dyn StorageEngine) -> bool {
        let mut state = self.state.lock().await;
        match engine.authenticate().await {
            Ok(()) => {
                *state = ConnectionState::Connected;
                tracing::info!(dialect = ?engine.dialect(), "database connection established");
                true
            }
            Err(e) => {
                tracing::error!(error = %e, "unable to connect to the database");
                false
            }
        }
    }

    /// Releases engine resources. Always attempts the close, even when
    /// already disconnected.
    pub async fn close(&self, engine: &dyn StorageEngine) {
        let mut state = self.state.lock().await;
        if let Err(e) = engine.close().await {
            tracing::warn!(error = %e, "error while closing database connection");
        }
        if *state == ConnectionState::Connected {
            tracing::info!("database connection closed");
        }
        *state = ConnectionState::Disconnected;
    }
}

impl Default for Lifecycle {
    fn default() -> Self {
        Self::new()
    }
}
