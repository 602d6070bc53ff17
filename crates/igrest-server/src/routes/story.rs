//! Story lookups and actions.

use axum::{
    Form, Json, Router,
    extract::{Query, State},
    routing::{get, post},
};
use igrest_core::{AutomationClient, ClientFactory, media_code};
use serde_json::Value;

use crate::{
    error::ApiError,
    forms::{
        StoriesForm, StoryForm, StoryIdForm, StoryLikeForm, StoryPkForm, StorySeenForm, UrlQuery,
    },
    state::AppState,
};

pub fn router<F: ClientFactory>() -> Router<AppState<F>> {
    Router::new()
        .route("/user_stories", post(user_stories::<F>))
        .route("/info", post(info::<F>))
        .route("/delete", post(delete::<F>))
        .route("/seen", post(seen::<F>))
        .route("/like", post(like::<F>))
        .route("/unlike", post(unlike::<F>))
        .route("/pk_from_url", get(pk_from_url))
}

pub async fn user_stories<F: ClientFactory>(
    State(state): State<AppState<F>>,
    Form(form): Form<StoriesForm>,
) -> Result<Json<Value>, ApiError> {
    let client = state.registry.get(&form.sessionid)?;
    let client = client.lock().await;
    Ok(Json(client.user_stories(form.user_id, form.amount).await?))
}

pub async fn info<F: ClientFactory>(
    State(state): State<AppState<F>>,
    Form(form): Form<StoryForm>,
) -> Result<Json<Value>, ApiError> {
    let client = state.registry.get(&form.sessionid)?;
    let client = client.lock().await;
    Ok(Json(client.story_info(form.story_pk, form.use_cache).await?))
}

pub async fn delete<F: ClientFactory>(
    State(state): State<AppState<F>>,
    Form(form): Form<StoryPkForm>,
) -> Result<Json<bool>, ApiError> {
    let client = state.registry.get(&form.sessionid)?;
    let client = client.lock().await;
    Ok(Json(client.story_delete(form.story_pk).await?))
}

pub async fn seen<F: ClientFactory>(
    State(state): State<AppState<F>>,
    Form(form): Form<StorySeenForm>,
) -> Result<Json<bool>, ApiError> {
    let client = state.registry.get(&form.sessionid)?;
    let client = client.lock().await;
    let done = client
        .story_seen(&form.story_pks, &form.skipped_story_pks)
        .await?;
    Ok(Json(done))
}

pub async fn like<F: ClientFactory>(
    State(state): State<AppState<F>>,
    Form(form): Form<StoryLikeForm>,
) -> Result<Json<bool>, ApiError> {
    let client = state.registry.get(&form.sessionid)?;
    let client = client.lock().await;
    Ok(Json(client.story_like(&form.story_id, form.revert).await?))
}

pub async fn unlike<F: ClientFactory>(
    State(state): State<AppState<F>>,
    Form(form): Form<StoryIdForm>,
) -> Result<Json<bool>, ApiError> {
    let client = state.registry.get(&form.sessionid)?;
    let client = client.lock().await;
    Ok(Json(client.story_unlike(&form.story_id).await?))
}

pub async fn pk_from_url(Query(query): Query<UrlQuery>) -> Result<Json<u64>, ApiError> {
    Ok(Json(media_code::story_pk_from_url(&query.url)?))
}
