//! User lookups and follow actions.

use axum::{Form, Json, Router, extract::State, routing::post};
use igrest_core::{AutomationClient, ClientFactory};
use serde_json::Value;

use crate::{
    error::ApiError,
    forms::{MuteForm, RelationsForm, UserIdForm, UserInfoForm, UsernameForm},
    state::AppState,
};

pub fn router<F: ClientFactory>() -> Router<AppState<F>> {
    Router::new()
        .route("/user_followers", post(followers::<F>))
        .route("/user_following", post(following::<F>))
        .route("/user_info", post(info::<F>))
        .route("/user_info_by_username", post(info_by_username::<F>))
        .route("/user_follow", post(follow::<F>))
        .route("/user_unfollow", post(unfollow::<F>))
        .route("/user_id_from_username", post(id_from_username::<F>))
        .route("/username_from_user_id", post(username_from_user_id::<F>))
        .route("/user_remove_follower", post(remove_follower::<F>))
        .route("/mute_posts_from_follow", post(mute_posts::<F>))
        .route("/unmute_posts_from_follow", post(unmute_posts::<F>))
        .route("/mute_stories_from_follow", post(mute_stories::<F>))
        .route("/unmute_stories_from_follow", post(unmute_stories::<F>))
}

pub async fn followers<F: ClientFactory>(
    State(state): State<AppState<F>>,
    Form(form): Form<RelationsForm>,
) -> Result<Json<Value>, ApiError> {
    let client = state.registry.get(&form.sessionid)?;
    let client = client.lock().await;
    let users = client
        .user_followers(form.user_id, form.use_cache, form.amount)
        .await?;
    Ok(Json(users))
}

pub async fn following<F: ClientFactory>(
    State(state): State<AppState<F>>,
    Form(form): Form<RelationsForm>,
) -> Result<Json<Value>, ApiError> {
    let client = state.registry.get(&form.sessionid)?;
    let client = client.lock().await;
    let users = client
        .user_following(form.user_id, form.use_cache, form.amount)
        .await?;
    Ok(Json(users))
}

pub async fn info<F: ClientFactory>(
    State(state): State<AppState<F>>,
    Form(form): Form<UserInfoForm>,
) -> Result<Json<Value>, ApiError> {
    let client = state.registry.get(&form.sessionid)?;
    let client = client.lock().await;
    Ok(Json(client.user_info(form.user_id, form.use_cache).await?))
}

pub async fn info_by_username<F: ClientFactory>(
    State(state): State<AppState<F>>,
    Form(form): Form<UsernameForm>,
) -> Result<Json<Value>, ApiError> {
    let client = state.registry.get(&form.sessionid)?;
    let client = client.lock().await;
    let user = client
        .user_info_by_username(&form.username, form.use_cache)
        .await?;
    Ok(Json(user))
}

pub async fn follow<F: ClientFactory>(
    State(state): State<AppState<F>>,
    Form(form): Form<UserIdForm>,
) -> Result<Json<bool>, ApiError> {
    let client = state.registry.get(&form.sessionid)?;
    let client = client.lock().await;
    Ok(Json(client.user_follow(form.user_id).await?))
}

pub async fn unfollow<F: ClientFactory>(
    State(state): State<AppState<F>>,
    Form(form): Form<UserIdForm>,
) -> Result<Json<bool>, ApiError> {
    let client = state.registry.get(&form.sessionid)?;
    let client = client.lock().await;
    Ok(Json(client.user_unfollow(form.user_id).await?))
}

pub async fn id_from_username<F: ClientFactory>(
    State(state): State<AppState<F>>,
    Form(form): Form<UsernameForm>,
) -> Result<Json<u64>, ApiError> {
    let client = state.registry.get(&form.sessionid)?;
    let client = client.lock().await;
    Ok(Json(client.user_id_from_username(&form.username).await?))
}

pub async fn username_from_user_id<F: ClientFactory>(
    State(state): State<AppState<F>>,
    Form(form): Form<UserIdForm>,
) -> Result<Json<String>, ApiError> {
    let client = state.registry.get(&form.sessionid)?;
    let client = client.lock().await;
    Ok(Json(client.username_from_user_id(form.user_id).await?))
}

pub async fn remove_follower<F: ClientFactory>(
    State(state): State<AppState<F>>,
    Form(form): Form<UserIdForm>,
) -> Result<Json<bool>, ApiError> {
    let client = state.registry.get(&form.sessionid)?;
    let client = client.lock().await;
    Ok(Json(client.user_remove_follower(form.user_id).await?))
}

pub async fn mute_posts<F: ClientFactory>(
    State(state): State<AppState<F>>,
    Form(form): Form<MuteForm>,
) -> Result<Json<bool>, ApiError> {
    let client = state.registry.get(&form.sessionid)?;
    let client = client.lock().await;
    let done = client
        .mute_posts_from_follow(form.user_id, form.revert)
        .await?;
    Ok(Json(done))
}

pub async fn unmute_posts<F: ClientFactory>(
    State(state): State<AppState<F>>,
    Form(form): Form<UserIdForm>,
) -> Result<Json<bool>, ApiError> {
    let client = state.registry.get(&form.sessionid)?;
    let client = client.lock().await;
    Ok(Json(client.unmute_posts_from_follow(form.user_id).await?))
}

pub async fn mute_stories<F: ClientFactory>(
    State(state): State<AppState<F>>,
    Form(form): Form<MuteForm>,
) -> Result<Json<bool>, ApiError> {
    let client = state.registry.get(&form.sessionid)?;
    let client = client.lock().await;
    let done = client
        .mute_stories_from_follow(form.user_id, form.revert)
        .await?;
    Ok(Json(done))
}

pub async fn unmute_stories<F: ClientFactory>(
    State(state): State<AppState<F>>,
    Form(form): Form<UserIdForm>,
) -> Result<Json<bool>, ApiError> {
    let client = state.registry.get(&form.sessionid)?;
    let client = client.lock().await;
    Ok(Json(client.unmute_stories_from_follow(form.user_id).await?))
}
