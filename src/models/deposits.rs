use serde::{Deserialize, Serialize};

pub const STATUS_PENDING: &str = "pending";
pub const STATUS_CONFIRMED: &str = "confirmed";
pub const STATUS_REJECTED: &str = "rejected";

#[derive(Clone, Debug, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Deposit {
    pub id: String,
    pub user_id: String,
    pub amount_in_cents: i64,
    pub tx_hash: Option<String>,
    pub status: String,
    pub created_at: chrono::NaiveDateTime,
    pub updated_at: chrono::NaiveDateTime,
}

#[derive(Clone, Debug, Deserialize)]
pub struct NewDeposit {
    #[serde(alias = "amount")]
    pub amount_in_cents: i64,
    pub tx_hash: Option<String>,
}

/// Deposit row joined with the owner's email, for the admin listing.
#[derive(Clone, Debug, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct AdminDeposit {
    pub id: String,
    pub user_id: String,
    pub user_email: String,
    pub amount_in_cents: i64,
    pub tx_hash: Option<String>,
    pub status: String,
    pub created_at: chrono::NaiveDateTime,
}

#[derive(Clone, Debug, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct DepositHistoryEntry {
    pub amount_in_cents: i64,
    pub status: String,
    pub tx_hash: Option<String>,
    pub created_at: chrono::NaiveDateTime,
}
