//! Shared application state.

use std::sync::Arc;

use igrest_core::ClientFactory;
use igrest_session::SessionRegistry;

/// State shared across handlers.
pub struct AppState<F: ClientFactory> {
    pub registry: Arc<SessionRegistry<F>>,
}

impl<F: ClientFactory> AppState<F> {
    #[must_use]
    pub const fn new(registry: Arc<SessionRegistry<F>>) -> Self {
        Self { registry }
    }
}

// Manual impl: a derive would require `F: Clone`.
impl<F: ClientFactory> Clone for AppState<F> {
    fn clone(&self) -> Self {
        Self {
            registry: Arc::clone(&self.registry),
        }
    }
}
