use std::str::FromStr;

use anyhow::Context;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    #[serde(alias = "pemasukan")]
    Income,
    #[serde(alias = "pengeluaran")]
    Expense,
}

impl TransactionKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Income => "income",
            Self::Expense => "expense",
        }
    }
}

impl FromStr for TransactionKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "income" => Ok(Self::Income),
            "expense" => Ok(Self::Expense),
            other => anyhow::bail!("unknown transaction kind {other:?}"),
        }
    }
}

#[derive(Debug, FromRow)]
pub struct TransactionRow {
    pub id: i64,
    pub user_id: i64,
    pub kind: String,
    pub category: String,
    pub amount: Decimal,
    pub method: String,
    pub note: String,
    pub created_at: OffsetDateTime,
}

/// Ledger entry owned by a single user.
#[derive(Debug, Clone, Serialize)]
pub struct Transaction {
    pub id: i64,
    pub user_id: i64,
    pub kind: TransactionKind,
    pub category: String,
    pub amount: Decimal,
    pub method: String,
    pub note: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl TryFrom<TransactionRow> for Transaction {
    type Error = anyhow::Error;

    fn try_from(r: TransactionRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: r.id,
            user_id: r.user_id,
            kind: r.kind.parse()?,
            category: r.category,
            amount: r.amount,
            method: r.method,
            note: r.note,
            created_at: r.created_at,
        })
    }
}

#[derive(Debug, Clone)]
pub struct NewTransaction {
    pub user_id: i64,
    pub kind: TransactionKind,
    pub category: String,
    pub amount: Decimal,
    pub method: String,
    pub note: String,
}

/// Per-kind sums over a user's ledger.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Totals {
    pub income: Decimal,
    pub expense: Decimal,
}

impl Totals {
    pub fn from_entries<'a>(
        entries: impl IntoIterator<Item = &'a Transaction>,
    ) -> anyhow::Result<Self> {
        entries.into_iter().try_fold(Self::default(), |mut acc, t| {
            let sum = match t.kind {
                TransactionKind::Income => &mut acc.income,
                TransactionKind::Expense => &mut acc.expense,
            };
            *sum = sum
                .checked_add(t.amount)
                .with_context(|| format!("{} total overflowed", t.kind.as_str()))?;
            Ok(acc)
        })
    }

    pub fn balance(&self) -> Decimal {
        self.income - self.expense
    }
}
