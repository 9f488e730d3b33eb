use std::sync::Arc;

use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use notes_core::ServiceError;
use notes_rest::{Endpoint, HandlerResult, JsonBody};

use super::render_collection;
use crate::model::Note;
use crate::service::NoteService;

/// `/notes`: list and create.
pub(super) fn endpoint(state: Arc<NoteService>) -> Endpoint<NoteService> {
    Endpoint::new(state).get(list_notes).post(create_note)
}

async fn list_notes(svc: Arc<NoteService>, _: ()) -> HandlerResult {
    let notes = svc.list_notes()?;
    Ok((StatusCode::OK, Json(render_collection(&notes))).into_response())
}

async fn create_note(
    svc: Arc<NoteService>,
    JsonBody(body): JsonBody<serde_json::Value>,
) -> HandlerResult {
    let note = Note::from_json(body)
        .map_err(|e| ServiceError::Validation(format!("invalid note: {}", e)))?;
    let notes = svc.create_and_list(note)?;
    Ok((StatusCode::CREATED, Json(render_collection(&notes))).into_response())
}
