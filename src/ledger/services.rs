use rust_decimal::Decimal;
use tracing::{info, warn};

use crate::{
    auth::repo_types::User,
    error::{AppError, AppResult},
    ledger::{
        dto::CreateTransactionRequest,
        repo_types::{NewTransaction, Transaction},
    },
    state::AppState,
};

/// Exclusive upper bound; amounts are stored as `NUMERIC(18, 2)`.
const AMOUNT_LIMIT: i64 = 10_000_000_000_000_000;
const AMOUNT_SCALE: u32 = 2;

fn validate_amount(amount: Decimal) -> AppResult<()> {
    if amount < Decimal::ZERO {
        return Err(AppError::bad_request("Amount must not be negative"));
    }
    if amount >= Decimal::from(AMOUNT_LIMIT) {
        return Err(AppError::bad_request("Amount is too large"));
    }
    if amount.normalize().scale() > AMOUNT_SCALE {
        return Err(AppError::bad_request(
            "Amount must have at most two decimal places",
        ));
    }
    Ok(())
}

pub async fn record(
    state: &AppState,
    user: &User,
    req: CreateTransactionRequest,
) -> AppResult<Transaction> {
    if let Err(e) = validate_amount(req.amount) {
        warn!(user_id = user.id, amount = %req.amount, "rejected amount");
        return Err(e);
    }

    let tx = state
        .ledger
        .insert(NewTransaction {
            user_id: user.id,
            kind: req.kind,
            category: req.category.trim().to_string(),
            amount: req.amount,
            method: req.method.trim().to_string(),
            note: req.note,
        })
        .await?;

    info!(
        user_id = user.id,
        transaction_id = tx.id,
        kind = tx.kind.as_str(),
        "transaction recorded"
    );
    Ok(tx)
}

pub async fn list(state: &AppState, user: &User) -> AppResult<Vec<Transaction>> {
    Ok(state.ledger.list_by_user(user.id).await?)
}

/// Income minus expense over every entry the user owns.
pub async fn balance(state: &AppState, user_id: i64) -> AppResult<Decimal> {
    Ok(state.ledger.totals(user_id).await?.balance())
}
