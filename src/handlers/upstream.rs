use axum::{Json, response::IntoResponse};

// Placeholder upstream handlers. The application logic behind these routes
// (credential checks, reset emails) lives outside this service; they exist so
// the gateway and its tests exercise the preset wiring end to end.

pub async fn login_handler() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "OK" }))
}

pub async fn password_reset_handler() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "OK" }))
}

pub async fn status_handler() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "OK" }))
}

pub async fn ping_handler() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "OK" }))
}
