//! Application state shared across handlers.

use std::sync::Arc;

use database::Database;
use followup_engine::FollowupEngine;

use crate::identity::IdentityProvider;
use crate::realtime::RealtimeHub;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Database connection.
    pub db: Database,
    /// Followup lifecycle and conversations.
    pub engine: Arc<FollowupEngine>,
    /// Dashboard WebSocket connections.
    pub hub: Arc<RealtimeHub>,
    /// Organisation and user provisioning.
    pub identity: Arc<dyn IdentityProvider>,
}

impl AppState {
    /// Create new application state. The database is taken from the engine.
    pub fn new(
        engine: Arc<FollowupEngine>,
        hub: Arc<RealtimeHub>,
        identity: Arc<dyn IdentityProvider>,
    ) -> Self {
        Self {
            db: engine.db().clone(),
            engine,
            hub,
            identity,
        }
    }
}
