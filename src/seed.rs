use rust_decimal::Decimal;
use tracing::info;

use crate::{
    auth::{password::hash_secret, repo_types::NewUser},
    ledger::repo_types::{NewTransaction, TransactionKind},
    state::AppState,
};

pub const DEV_EMAIL: &str = "dev@example.com";
pub const DEV_PASSWORD: &str = "password";

/// Creates the developer account and a few sample transactions.
/// Does nothing once that account has any transactions.
pub async fn seed_dev(state: &AppState) -> anyhow::Result<()> {
    let user = match state.users.find_by_email(DEV_EMAIL).await? {
        Some(existing) => existing,
        None => {
            let created = state
                .users
                .create(NewUser {
                    name: "Dev User".into(),
                    email: DEV_EMAIL.into(),
                    password_hash: hash_secret(DEV_PASSWORD)?,
                    pin_hash: None,
                    img_url: None,
                })
                .await?;
            match created {
                Some(u) => u,
                None => anyhow::bail!("dev user email is taken by a deleted account"),
            }
        }
    };

    if !state.ledger.list_by_user(user.id).await?.is_empty() {
        info!(user_id = user.id, "dev user already seeded; skipping");
        return Ok(());
    }

    let samples = [
        (TransactionKind::Income, "Salary", 4_500_000, "Transfer", "Monthly salary"),
        (TransactionKind::Expense, "Dinner", 20_000, "Cash", "Soto"),
        (TransactionKind::Expense, "Transport", 12_000, "Cash", "Motorbike fuel"),
    ];
    for (kind, category, amount, method, note) in samples {
        state
            .ledger
            .insert(NewTransaction {
                user_id: user.id,
                kind,
                category: category.into(),
                amount: Decimal::from(amount),
                method: method.into(),
                note: note.into(),
            })
            .await?;
    }

    info!(user_id = user.id, email = DEV_EMAIL, "seeded dev user");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::setup_test_app_state;

    #[tokio::test]
    async fn seeding_twice_adds_transactions_once() {
        let app = setup_test_app_state();
        seed_dev(&app.state).await.unwrap();
        seed_dev(&app.state).await.unwrap();

        let user = app.state.users.find_by_email(DEV_EMAIL).await.unwrap().unwrap();
        let totals = app.state.ledger.totals(user.id).await.unwrap();
        assert_eq!(totals.balance(), Decimal::from(4_468_000));
        assert_eq!(app.state.ledger.list_by_user(user.id).await.unwrap().len(), 3);
    }
}
