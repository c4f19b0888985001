use std::sync::Arc;

use crate::auth::Authenticator;
use crate::generation::generator::QuestionGenerator;
use crate::questions::store::QuestionStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// `PgQuestionStore` with a database, `InMemoryQuestionStore` without.
    pub store: Arc<dyn QuestionStore>,
    /// Live or demo, fixed at startup.
    pub generator: Arc<QuestionGenerator>,
    pub auth: Arc<dyn Authenticator>,
}

#[cfg(test)]
impl AppState {
    /// In-memory store, `x-user-id` auth, demo generator.
    pub fn for_tests() -> Self {
        use crate::auth::HeaderAuthenticator;
        use crate::generation::backend::DemoBackend;
        use crate::questions::memory::InMemoryQuestionStore;

        Self {
            store: Arc::new(InMemoryQuestionStore::new()),
            generator: Arc::new(QuestionGenerator::with_backend(Arc::new(DemoBackend))),
            auth: Arc::new(HeaderAuthenticator),
        }
    }
}
