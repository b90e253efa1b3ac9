use axum::{
    extract::{DefaultBodyLimit, Multipart, State},
    routing::{get, post},
    Router,
};
use tracing::{instrument, warn};

use crate::{
    auth::extractors::AuthUser,
    envelope::{AppJson, AppPath, Reply},
    error::{AppError, AppResult},
    state::AppState,
    users::{
        dto::{AvatarResponse, MeView, PublicProfile, UpdateProfileRequest},
        services,
    },
};

const AVATAR_MAX_BYTES: usize = 5 * 1024 * 1024;

pub fn profile_routes() -> Router<AppState> {
    Router::new()
        .route("/me", get(get_me).put(update_me))
        .route(
            "/me/avatar",
            post(upload_avatar).layer(DefaultBodyLimit::max(AVATAR_MAX_BYTES)),
        )
        .route("/users/:id", get(get_user))
}

#[instrument(skip_all, fields(user_id = user.id))]
pub async fn get_me(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> AppResult<Reply<MeView>> {
    Ok(Reply::ok(services::me_view(&state, user).await?))
}

#[instrument(skip_all, fields(user_id = user.id))]
pub async fn update_me(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    AppJson(body): AppJson<UpdateProfileRequest>,
) -> AppResult<Reply<MeView>> {
    let view = services::update_profile(&state, &user, body).await?;
    Ok(Reply::ok(view).with_message("Profile updated"))
}

#[instrument(skip(state, _me))]
pub async fn get_user(
    State(state): State<AppState>,
    AuthUser(_me): AuthUser,
    AppPath(id): AppPath<i64>,
) -> AppResult<Reply<PublicProfile>> {
    let user = state
        .users
        .find_by_id(id)
        .await?
        .ok_or_else(|| AppError::not_found("User not found"))?;
    Ok(Reply::ok(PublicProfile::from(user)))
}

/// Multipart upload; the image travels in the `avatar` field.
#[instrument(skip_all, fields(user_id = user.id))]
pub async fn upload_avatar(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    mut mp: Multipart,
) -> AppResult<Reply<AvatarResponse>> {
    while let Some(field) = mp.next_field().await? {
        if field.name() != Some("avatar") {
            continue;
        }
        let content_type = field
            .content_type()
            .map(|s| s.to_string())
            .unwrap_or_else(|| "application/octet-stream".into());
        let data = field.bytes().await?;
        let img = services::upload_avatar(&state, &user, data, &content_type).await?;
        return Ok(Reply::ok(AvatarResponse { img }).with_message("Avatar updated"));
    }
    warn!(user_id = user.id, "avatar field missing");
    Err(AppError::bad_request("avatar file is required"))
}
