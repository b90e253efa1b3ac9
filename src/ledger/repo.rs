use anyhow::Context;
use async_trait::async_trait;
use rust_decimal::Decimal;
use sqlx::PgPool;

use crate::ledger::repo_types::{NewTransaction, Totals, Transaction, TransactionRow};

#[async_trait]
pub trait LedgerRepo: Send + Sync {
    async fn insert(&self, new: NewTransaction) -> anyhow::Result<Transaction>;
    /// Newest first.
    async fn list_by_user(&self, user_id: i64) -> anyhow::Result<Vec<Transaction>>;
    async fn totals(&self, user_id: i64) -> anyhow::Result<Totals>;
}

#[derive(Clone)]
pub struct PgLedgerRepo {
    db: PgPool,
}

impl PgLedgerRepo {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl LedgerRepo for PgLedgerRepo {
    async fn insert(&self, new: NewTransaction) -> anyhow::Result<Transaction> {
        let row = sqlx::query_as::<_, TransactionRow>(
            r#"
            INSERT INTO transactions (user_id, kind, category, amount, method, note)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, user_id, kind, category, amount, method, note, created_at
            "#,
        )
        .bind(new.user_id)
        .bind(new.kind.as_str())
        .bind(&new.category)
        .bind(new.amount)
        .bind(&new.method)
        .bind(&new.note)
        .fetch_one(&self.db)
        .await
        .context("insert transaction")?;
        row.try_into()
    }

    async fn list_by_user(&self, user_id: i64) -> anyhow::Result<Vec<Transaction>> {
        let rows = sqlx::query_as::<_, TransactionRow>(
            r#"
            SELECT id, user_id, kind, category, amount, method, note, created_at
              FROM transactions
             WHERE user_id = $1 AND deleted_at IS NULL
             ORDER BY created_at DESC, id DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.db)
        .await
        .context("list transactions")?;
        rows.into_iter().map(Transaction::try_from).collect()
    }

    async fn totals(&self, user_id: i64) -> anyhow::Result<Totals> {
        let (income, expense) = sqlx::query_as::<_, (Decimal, Decimal)>(
            r#"
            SELECT COALESCE(SUM(amount) FILTER (WHERE kind = 'income'), 0),
                   COALESCE(SUM(amount) FILTER (WHERE kind = 'expense'), 0)
              FROM transactions
             WHERE user_id = $1 AND deleted_at IS NULL
            "#,
        )
        .bind(user_id)
        .fetch_one(&self.db)
        .await
        .context("sum transactions")?;
        Ok(Totals { income, expense })
    }
}
