mod collection;
mod instance;

use std::sync::Arc;

use axum::Router;
use notes_rest::RestResource;

use crate::model::Note;
use crate::service::NoteService;

/// URL segment of the note resource.
pub const RESOURCE_NAME: &str = "notes";

/// Shared handler state.
pub type AppState = Arc<NoteService>;

/// The note resource: `/notes` and `/notes/{instance_id}`.
pub fn resource(state: AppState) -> RestResource<NoteService> {
    RestResource::new(
        RESOURCE_NAME,
        collection::endpoint(Arc::clone(&state)),
        instance::endpoint(state),
    )
}

/// Build the note API router.
pub fn router(state: AppState) -> Router {
    resource(state).register(Router::new())
}

/// Collection body: `{"notes": [...]}`.
pub(crate) fn render_collection(notes: &[Note]) -> serde_json::Value {
    serde_json::json!({
        "notes": notes.iter().map(Note::to_json).collect::<Vec<_>>(),
    })
}
