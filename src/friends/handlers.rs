use axum::{
    extract::State,
    routing::{delete, get, post},
    Router,
};
use tracing::instrument;

use crate::{
    auth::{extractors::AuthUser, repo_types::User},
    envelope::{AppJson, AppPath, AppQuery, Reply},
    error::AppResult,
    friends::{
        dto::{
            DebtToggled, FriendsResponse, PendingResponse, PhoneRequest, SearchParams,
            SearchResponse,
        },
        repo_types::Friendship,
        services::{self, Decision, RequestLookup},
    },
    state::AppState,
};

pub fn friend_routes() -> Router<AppState> {
    Router::new()
        .route("/friends/search", get(search))
        .route("/friends/request", post(send_request))
        .route("/friends/accept", post(accept_by_phone))
        .route("/friends/reject", post(reject_by_phone))
        .route("/friends/accept/:id", post(accept_by_id))
        .route("/friends/reject/:id", post(reject_by_id))
        .route("/friends/list", get(list_friends))
        .route("/friends/pending", get(list_pending))
        .route("/friends/:id", delete(remove_friend))
        .route("/friends/:id/toggle-debt", post(toggle_debt))
}

#[instrument(skip_all, fields(user_id = me.id))]
pub async fn search(
    State(state): State<AppState>,
    AuthUser(me): AuthUser,
    AppQuery(params): AppQuery<SearchParams>,
) -> AppResult<Reply<SearchResponse>> {
    let users = services::search(&state, &me, params).await?;
    Ok(Reply::ok(SearchResponse { users }))
}

#[instrument(skip_all, fields(user_id = me.id))]
pub async fn send_request(
    State(state): State<AppState>,
    AuthUser(me): AuthUser,
    AppJson(body): AppJson<PhoneRequest>,
) -> AppResult<Reply<Friendship>> {
    let created = services::send_request(&state, &me, &body.phone).await?;
    Ok(Reply::created(created).with_message("Friend request sent"))
}

async fn respond(
    state: &AppState,
    me: &User,
    lookup: RequestLookup,
    decision: Decision,
) -> AppResult<Reply<Friendship>> {
    let row = services::respond(state, me, lookup, decision).await?;
    let message = match decision {
        Decision::Accept => "Friend request accepted",
        Decision::Reject => "Friend request rejected",
    };
    Ok(Reply::ok(row).with_message(message))
}

#[instrument(skip_all, fields(user_id = me.id))]
pub async fn accept_by_phone(
    State(state): State<AppState>,
    AuthUser(me): AuthUser,
    AppJson(body): AppJson<PhoneRequest>,
) -> AppResult<Reply<Friendship>> {
    respond(&state, &me, RequestLookup::ByPhone(body.phone), Decision::Accept).await
}

#[instrument(skip_all, fields(user_id = me.id))]
pub async fn reject_by_phone(
    State(state): State<AppState>,
    AuthUser(me): AuthUser,
    AppJson(body): AppJson<PhoneRequest>,
) -> AppResult<Reply<Friendship>> {
    respond(&state, &me, RequestLookup::ByPhone(body.phone), Decision::Reject).await
}

#[instrument(skip_all, fields(user_id = me.id, friendship_id = id))]
pub async fn accept_by_id(
    State(state): State<AppState>,
    AuthUser(me): AuthUser,
    AppPath(id): AppPath<i64>,
) -> AppResult<Reply<Friendship>> {
    respond(&state, &me, RequestLookup::ById(id), Decision::Accept).await
}

#[instrument(skip_all, fields(user_id = me.id, friendship_id = id))]
pub async fn reject_by_id(
    State(state): State<AppState>,
    AuthUser(me): AuthUser,
    AppPath(id): AppPath<i64>,
) -> AppResult<Reply<Friendship>> {
    respond(&state, &me, RequestLookup::ById(id), Decision::Reject).await
}

#[instrument(skip_all, fields(user_id = me.id))]
pub async fn list_friends(
    State(state): State<AppState>,
    AuthUser(me): AuthUser,
) -> AppResult<Reply<FriendsResponse>> {
    Ok(Reply::ok(services::list_friends(&state, &me).await?))
}

#[instrument(skip_all, fields(user_id = me.id))]
pub async fn list_pending(
    State(state): State<AppState>,
    AuthUser(me): AuthUser,
) -> AppResult<Reply<PendingResponse>> {
    Ok(Reply::ok(services::list_pending(&state, &me).await?))
}

/// `id` is the other user's id, not the friendship id.
#[instrument(skip_all, fields(user_id = me.id, friend_id = id))]
pub async fn remove_friend(
    State(state): State<AppState>,
    AuthUser(me): AuthUser,
    AppPath(id): AppPath<i64>,
) -> AppResult<Reply<()>> {
    services::remove(&state, &me, id).await?;
    Ok(Reply::ok(()).with_message("Friend removed"))
}

#[instrument(skip_all, fields(user_id = me.id, friend_id = id))]
pub async fn toggle_debt(
    State(state): State<AppState>,
    AuthUser(me): AuthUser,
    AppPath(id): AppPath<i64>,
) -> AppResult<Reply<DebtToggled>> {
    let toggled = services::toggle_debt(&state, &me, id).await?;
    Ok(Reply::ok(toggled).with_message("Debt status toggled"))
}
