use axum::{
    Extension, Json, Router,
    http::{StatusCode, Uri},
    response::IntoResponse,
    routing::get,
};

use crate::context::PrincipalContext;

/// Router for every gated path. Unknown paths hit [`page`].
pub fn router() -> Router {
    Router::new()
        .route("/whoami", get(whoami))
        .route("/not-found", get(not_found))
        .fallback(page)
}

pub async fn health() -> StatusCode {
    StatusCode::OK
}

pub async fn whoami(principal: Option<Extension<PrincipalContext>>) -> impl IntoResponse {
    match principal {
        Some(Extension(principal)) => (StatusCode::OK, Json(serde_json::json!(principal))),
        None => (
            StatusCode::UNAUTHORIZED,
            Json(serde_json::json!({ "error": "unauthenticated" })),
        ),
    }
}

pub async fn not_found(uri: Uri) -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(serde_json::json!({ "error": "not_found", "path": uri.path() })),
    )
}

/// Stand-in for the application page the gate protects.
pub async fn page(uri: Uri, principal: Option<Extension<PrincipalContext>>) -> impl IntoResponse {
    Json(serde_json::json!({
        "path": uri.path(),
        "subject": principal.map(|Extension(p)| p.subject().to_string()),
    }))
}
