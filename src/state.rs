//! Application state for the Axum router.

use std::sync::Arc;

use crate::repositories::UserStore;
use crate::services::{Clock, Services};

/// Shared state handed to every handler.
///
/// Cloning only bumps reference counts.
#[derive(Clone)]
pub struct AppState {
    pub services: Services,
}

impl AppState {
    /// # Example
    /// ```ignore
    /// let pool = establish_async_connection_pool(&settings.database).await?;
    /// let store = Arc::new(PgUserStore::new(pool, settings.database.query_timeout()));
    /// let state = AppState::new(store, Arc::new(SystemClock));
    /// ```
    pub fn new(store: Arc<dyn UserStore>, clock: Arc<dyn Clock>) -> Self {
        Self {
            services: Services::new(store, clock),
        }
    }
}
