use std::sync::Arc;

use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use notes_core::ServiceError;
use notes_rest::{Endpoint, HandlerResult, InstanceId, JsonBody};

use crate::model::Note;
use crate::service::NoteService;

/// `/notes/{instance_id}`: read, replace and delete one note. Single-note
/// bodies carry the five properties only.
pub(super) fn endpoint(state: Arc<NoteService>) -> Endpoint<NoteService> {
    Endpoint::new(state)
        .get(get_note)
        .put(update_note)
        .delete(delete_note)
}

async fn get_note(svc: Arc<NoteService>, InstanceId(id): InstanceId) -> HandlerResult {
    let note = svc.get_note(id)?;
    Ok((StatusCode::OK, Json(note.render())).into_response())
}

async fn update_note(
    svc: Arc<NoteService>,
    (InstanceId(id), JsonBody(body)): (InstanceId, JsonBody<serde_json::Value>),
) -> HandlerResult {
    let fields = Note::from_json(body)
        .map_err(|e| ServiceError::Validation(format!("invalid note: {}", e)))?;
    let note = svc.update_note(id, fields)?;
    Ok((StatusCode::OK, Json(note.render())).into_response())
}

async fn delete_note(svc: Arc<NoteService>, InstanceId(id): InstanceId) -> HandlerResult {
    svc.delete_note(id)?;
    Ok(StatusCode::NO_CONTENT.into_response())
}
