pub mod config;
pub mod error;
pub mod routes;

use db::DBService;

/// Shared handle every route receives through axum's `State`
#[derive(Clone)]
pub struct AppState {
    db: DBService,
}

impl AppState {
    pub fn new(db: DBService) -> Self {
        Self { db }
    }

    pub fn db(&self) -> &DBService {
        &self.db
    }
}
