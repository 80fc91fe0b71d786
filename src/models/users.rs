use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Serialize, sqlx::FromRow)]
pub struct User {
    pub id: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub balance_in_cents: i64,
    pub deposit_in_cents: i64,
    pub deposit_address: String,
    pub referral_code: String,
    pub created_at: chrono::NaiveDateTime,
    pub updated_at: chrono::NaiveDateTime,
}

#[derive(Clone, Debug, Deserialize)]
pub struct NewUser {
    pub email: String,
    pub password: String,
    pub referral_code: Option<String>,
}

/// Account view returned by `GET /api/user`. Monetary fields are cents.
#[derive(Clone, Debug, Serialize)]
pub struct Profile {
    pub id: String,
    pub email: String,
    pub balance: i64,
    pub deposit_amount: i64,
    pub deposit_address: String,
    pub referral_code: String,
    pub referrals_count: i64,
}
