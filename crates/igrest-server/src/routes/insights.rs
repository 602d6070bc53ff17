//! Account and media insights.

use axum::{Form, Json, Router, extract::State, routing::post};
use igrest_core::{AutomationClient, ClientFactory};
use serde_json::Value;

use crate::{
    error::ApiError,
    forms::{InsightsFeedForm, InsightsMediaForm, SessionForm},
    state::AppState,
};

pub fn router<F: ClientFactory>() -> Router<AppState<F>> {
    Router::new()
        .route("/media_feed_all", post(media_feed_all::<F>))
        .route("/account", post(account::<F>))
        .route("/media", post(media::<F>))
}

pub async fn media_feed_all<F: ClientFactory>(
    State(state): State<AppState<F>>,
    Form(form): Form<InsightsFeedForm>,
) -> Result<Json<Value>, ApiError> {
    let client = state.registry.get(&form.sessionid)?;
    let client = client.lock().await;
    Ok(Json(client.insights_media_feed_all(&form.query()).await?))
}

pub async fn account<F: ClientFactory>(
    State(state): State<AppState<F>>,
    Form(form): Form<SessionForm>,
) -> Result<Json<Value>, ApiError> {
    let client = state.registry.get(&form.sessionid)?;
    let client = client.lock().await;
    Ok(Json(client.insights_account().await?))
}

pub async fn media<F: ClientFactory>(
    State(state): State<AppState<F>>,
    Form(form): Form<InsightsMediaForm>,
) -> Result<Json<Value>, ApiError> {
    let client = state.registry.get(&form.sessionid)?;
    let client = client.lock().await;
    Ok(Json(client.insights_media(form.media_pk).await?))
}
