use axum::{
    extract::State,
    routing::{get, post},
    Router,
};
use tracing::instrument;

use crate::{
    auth::{
        dto::{
            ForgotPasswordRequest, HistoryResponse, LoginRequest, LoginResponse, OtpIssued,
            PublicUser, RegisterRequest, ResetPasswordRequest, VerifyOtpRequest,
        },
        extractors::AuthUser,
        services,
    },
    envelope::{AppJson, Reply},
    error::AppResult,
    state::AppState,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/auth/logout", post(logout))
        .route("/auth/history", get(history))
        .route("/auth/forgot-password", post(forgot_password))
        .route("/auth/verify-otp", post(verify_otp))
        .route("/auth/reset-password", post(reset_password))
}

#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    AppJson(payload): AppJson<RegisterRequest>,
) -> AppResult<Reply<PublicUser>> {
    let user = services::register(&state, payload).await?;
    Ok(Reply::created(PublicUser::from(&user)).with_message("User registered"))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    AppJson(payload): AppJson<LoginRequest>,
) -> AppResult<Reply<LoginResponse>> {
    let res = services::login(&state, payload).await?;
    Ok(Reply::ok(res).with_message("Login successful"))
}

#[instrument(skip_all, fields(user_id = user.id))]
pub async fn logout(State(state): State<AppState>, AuthUser(user): AuthUser) -> Reply<()> {
    services::logout(&state, &user);
    Reply::ok(()).with_message("Logged out")
}

#[instrument(skip_all, fields(user_id = user.id))]
pub async fn history(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> AppResult<Reply<HistoryResponse>> {
    let events = state.history.list_by_user(user.id).await?;
    Ok(Reply::ok(HistoryResponse { events }))
}

#[instrument(skip(state, payload))]
pub async fn forgot_password(
    State(state): State<AppState>,
    AppJson(payload): AppJson<ForgotPasswordRequest>,
) -> AppResult<Reply<OtpIssued>> {
    let issued = services::issue_otp(&state, &payload.email).await?;
    Ok(Reply::ok(issued).with_message("OTP sent to email"))
}

#[instrument(skip(state, payload))]
pub async fn verify_otp(
    State(state): State<AppState>,
    AppJson(payload): AppJson<VerifyOtpRequest>,
) -> AppResult<Reply<()>> {
    services::check_otp(&state, &payload.email, &payload.otp).await?;
    Ok(Reply::ok(()).with_message("OTP is valid"))
}

#[instrument(skip(state, payload))]
pub async fn reset_password(
    State(state): State<AppState>,
    AppJson(payload): AppJson<ResetPasswordRequest>,
) -> AppResult<Reply<()>> {
    services::reset_password(&state, &payload.email, &payload.otp, &payload.password).await?;
    Ok(Reply::ok(()).with_message("Password has been reset"))
}
