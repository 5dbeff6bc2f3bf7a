use axum::{Extension, Router, routing::get};
use std::{net::SocketAddr, str::FromStr, sync::Arc};

use crate::{Res, api, errors::Error, spotify::auth::AuthSession};

/// Serves `/callback` and `/health` on the configured address until the
/// process exits.
pub async fn start_api_server(session: Arc<AuthSession>) -> Res<()> {
    let addr = SocketAddr::from_str(&session.config.server_addr).map_err(|e| {
        Error::Configuration(format!(
            "Invalid SERVER_ADDRESS '{}': {}",
            session.config.server_addr, e
        ))
    })?;

    let app = Router::new()
        .route("/health", get(api::health))
        .route("/callback", get(api::callback))
        .layer(Extension(session));

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
