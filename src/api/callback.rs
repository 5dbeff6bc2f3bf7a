use std::{collections::HashMap, sync::Arc};

use axum::{Extension, extract::Query, response::Html};

use crate::{spotify::auth::{AuthSession, exchange_code_http}, warning};

pub async fn callback(
    Query(params): Query<HashMap<String, String>>,
    Extension(session): Extension<Arc<AuthSession>>,
) -> Html<&'static str> {
    if let Some(denied) = params.get("error") {
        let mut state = session.pkce.lock().await;
        if let Some(pkce_state) = state.as_mut() {
            pkce_state.grant = Some(Err(format!("authorization denied: {denied}")));
        }
        return Html("<h4>Authorization denied.</h4>");
    }

    let Some(code) = params.get("code") else {
        return Html("<h4>Missing authorization code.</h4>");
    };

    let mut state = session.pkce.lock().await;
    let Some(pkce_state) = state.as_mut() else {
        return Html("<h4>Missing PKCE code verifier.</h4>");
    };

    let verifier = pkce_state.code_verifier.clone();

    match exchange_code_http(&session.config, code, &verifier).await {
        Ok(grant) => {
            pkce_state.grant = Some(Ok(grant));
            Html("<h2>Authentication successful.</h2><p>Close this browser window.</p>")
        }
        Err(e) => {
            warning!("Token exchange failed: {}", e);
            pkce_state.grant = Some(Err(e));
            Html("<h4>Login failed.</h4>")
        }
    }
}
