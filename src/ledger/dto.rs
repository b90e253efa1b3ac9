use rust_decimal::Decimal;
use serde::Deserialize;

use crate::ledger::repo_types::TransactionKind;

/// Request body for recording a ledger entry.
#[derive(Debug, Deserialize)]
pub struct CreateTransactionRequest {
    #[serde(alias = "jenis")]
    pub kind: TransactionKind,
    #[serde(default, alias = "kategori")]
    pub category: String,
    #[serde(alias = "jumlah")]
    pub amount: Decimal,
    #[serde(default, alias = "metode")]
    pub method: String,
    #[serde(default, alias = "keterangan")]
    pub note: String,
}
