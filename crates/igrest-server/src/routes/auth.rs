//! Login and logout.

use axum::{Form, Json, Router, extract::State, routing::post};
use igrest_core::{AutomationClient, ClientFactory};

use crate::{
    error::ApiError,
    forms::{LoginForm, SessionForm},
    state::AppState,
};

pub fn router<F: ClientFactory>() -> Router<AppState<F>> {
    Router::new()
        .route("/login", post(login::<F>))
        .route("/logout", post(logout::<F>))
}

/// Log in and return the new session id.
///
/// The client is stored only after the upstream accepted the credentials.
pub async fn login<F: ClientFactory>(
    State(state): State<AppState<F>>,
    Form(form): Form<LoginForm>,
) -> Result<Json<String>, ApiError> {
    let mut client = state.registry.new_client()?;
    form.overrides().apply(&mut client)?;

    let credentials = form.credentials();
    let Some(session_id) = client.login(&credentials).await? else {
        tracing::warn!(username = %credentials.username, "Login rejected");
        return Err(ApiError::LoginRejected);
    };

    state.registry.set(client)?;
    tracing::info!(
        username = %credentials.username,
        sessions = state.registry.len(),
        "Logged in"
    );
    Ok(Json(session_id))
}

/// Drop a session, logging it out upstream on a best-effort basis.
pub async fn logout<F: ClientFactory>(
    State(state): State<AppState<F>>,
    Form(form): Form<SessionForm>,
) -> Result<Json<bool>, ApiError> {
    let client = state.registry.remove(&form.sessionid)?;
    let mut client = client.lock().await;
    if let Err(e) = client.logout().await {
        tracing::warn!("Upstream logout failed, session dropped locally: {e}");
    }
    Ok(Json(true))
}
