use std::sync::Arc;

use axum::{Extension, response::Json};
use serde_json::{Value, json};

use crate::spotify::auth::AuthSession;

pub async fn health(Extension(session): Extension<Arc<AuthSession>>) -> Json<Value> {
    let grant_received = session
        .pkce
        .lock()
        .await
        .as_ref()
        .is_some_and(|pkce| pkce.grant.is_some());

    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "grant_received": grant_received,
    }))
}
