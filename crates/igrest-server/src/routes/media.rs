//! Media lookups.

use axum::{
    Form, Json, Router,
    extract::{Query, State},
    routing::{get, post},
};
use igrest_core::{AutomationClient, ClientFactory, media_code};
use serde_json::Value;

use crate::{
    error::ApiError,
    forms::{CodeQuery, MediaForm, PkQuery, UrlQuery},
    state::AppState,
};

pub fn router<F: ClientFactory>() -> Router<AppState<F>> {
    Router::new()
        .route("/pk_from_code", get(pk_from_code))
        .route("/code_from_pk", get(code_from_pk))
        .route("/pk_from_url", get(pk_from_url))
        .route("/info", post(info::<F>))
}

pub async fn pk_from_code(Query(query): Query<CodeQuery>) -> Result<Json<u64>, ApiError> {
    Ok(Json(media_code::media_pk_from_code(&query.code)?))
}

pub async fn code_from_pk(Query(query): Query<PkQuery>) -> Json<String> {
    Json(media_code::media_code_from_pk(query.pk))
}

pub async fn pk_from_url(Query(query): Query<UrlQuery>) -> Result<Json<u64>, ApiError> {
    Ok(Json(media_code::media_pk_from_url(&query.url)?))
}

pub async fn info<F: ClientFactory>(
    State(state): State<AppState<F>>,
    Form(form): Form<MediaForm>,
) -> Result<Json<Value>, ApiError> {
    let client = state.registry.get(&form.sessionid)?;
    let client = client.lock().await;
    Ok(Json(client.media_info(form.pk).await?))
}
