use std::sync::Arc;

use crate::{Config, auth::IdentityVerifier, model::ModelManager};

#[derive(Clone)]
pub struct AppState {
    mm: ModelManager,
    verifier: Arc<dyn IdentityVerifier>,
    config: Arc<Config>,
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("mm", &self.mm)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl AppState {
    pub fn new<V: IdentityVerifier + 'static>(mm: ModelManager, verifier: V, config: Config) -> Self {
        Self {
            mm,
            verifier: Arc::new(verifier),
            config: Arc::new(config),
        }
    }

    pub fn mm(&self) -> &ModelManager {
        &self.mm
    }

    pub fn verifier(&self) -> &dyn IdentityVerifier {
        self.verifier.as_ref()
    }

    pub fn config(&self) -> &Config {
        &self.config
    }
}
