use axum::{extract::State, routing::get, Router};
use tracing::instrument;

use crate::{
    auth::extractors::AuthUser,
    envelope::{AppJson, Reply},
    error::AppResult,
    ledger::{dto::CreateTransactionRequest, repo_types::Transaction, services},
    state::AppState,
};

pub fn transaction_routes() -> Router<AppState> {
    Router::new().route("/transactions", get(list_transactions).post(create_transaction))
}

#[instrument(skip_all, fields(user_id = user.id))]
pub async fn create_transaction(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    AppJson(body): AppJson<CreateTransactionRequest>,
) -> AppResult<Reply<Transaction>> {
    let tx = services::record(&state, &user, body).await?;
    Ok(Reply::created(tx).with_message("Transaction recorded"))
}

#[instrument(skip_all, fields(user_id = user.id))]
pub async fn list_transactions(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> AppResult<Reply<Vec<Transaction>>> {
    Ok(Reply::ok(services::list(&state, &user).await?))
}
