//! Route registration: collects all module routes + system endpoints.

use axum::response::IntoResponse;
use axum::routing::get;
use axum::Router;
use tracing::info;

/// Build the complete router with all routes.
///
/// Module routes are already `Router<()>` and carry absolute paths, so
/// they are merged at the root.
pub fn build_router(module_routes: Vec<(&str, Router)>) -> Router {
    let mut app = Router::new()
        .route("/health", get(health))
        .route("/version", get(version));

    for (name, router) in module_routes {
        info!("Mounted module {}", name);
        app = app.merge(router);
    }

    app
}

async fn health() -> impl IntoResponse {
    axum::Json(serde_json::json!({
        "status": "ok",
    }))
}

async fn version() -> impl IntoResponse {
    axum::Json(serde_json::json!({
        "name": "notesd",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use notes_core::Module;
    use tower::ServiceExt;

    use super::*;

    async fn get_json(app: &Router, uri: &str) -> (StatusCode, serde_json::Value) {
        let req = Request::builder().uri(uri).body(Body::empty()).unwrap();
        let resp = app.clone().oneshot(req).await.unwrap();
        let status = resp.status();
        let bytes = axum::body::to_bytes(resp.into_body(), 1024 * 1024).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null))
    }

    fn app() -> (Router, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let sql: Arc<dyn notes_sql::SQLStore> =
            Arc::new(notes_sql::SqliteStore::open(&dir.path().join("notes.db")).unwrap());
        let module = note::NoteModule::new(note::service::NoteService::new(sql).unwrap());
        (build_router(vec![(module.name(), module.routes())]), dir)
    }

    #[tokio::test]
    async fn health_and_version() {
        let (app, _dir) = app();

        let (status, body) = get_json(&app, "/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");

        let (status, body) = get_json(&app, "/version").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["name"], "notesd");
        assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
    }

    #[tokio::test]
    async fn note_routes_are_mounted_at_root() {
        let (app, _dir) = app();
        let (status, body) = get_json(&app, "/notes").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, serde_json::json!({"notes": []}));

        let (status, body) = get_json(&app, "/notes/1").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, serde_json::json!({"not found": 404}));
    }

    #[tokio::test]
    async fn unknown_path_is_404() {
        let (app, _dir) = app();
        let (status, _) = get_json(&app, "/nothing-here").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
