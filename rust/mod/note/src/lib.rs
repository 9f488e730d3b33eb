pub mod api;
pub mod model;
pub mod service;

use std::sync::Arc;

use axum::Router;
use notes_core::Module;

use service::NoteService;

/// Note module: CRUD over the `notes` table.
pub struct NoteModule {
    service: Arc<NoteService>,
}

impl NoteModule {
    pub fn new(service: NoteService) -> Self {
        Self {
            service: Arc::new(service),
        }
    }

    pub fn service(&self) -> &Arc<NoteService> {
        &self.service
    }
}

impl Module for NoteModule {
    fn name(&self) -> &str {
        "note"
    }

    fn routes(&self) -> Router {
        api::router(self.service.clone())
    }
}
