use serde::Serialize;

/// Static catalog entry. `position` is the explicit unlock order;
/// `reward_bps` is the payout rate in basis points (4500 = 45%).
#[derive(Clone, Debug, Serialize, sqlx::FromRow)]
pub struct Quest {
    pub id: String,
    pub position: i32,
    pub title: String,
    pub description: String,
    pub reward_bps: i64,
    pub requires_referral: bool,
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestStatus {
    pub id: String,
    pub position: i32,
    pub title: String,
    pub description: String,
    pub reward_bps: i64,
    pub completed: bool,
    pub locked: bool,
    pub lock_reason: Option<&'static str>,
}

#[derive(Clone, Debug, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct QuestCompletion {
    pub id: String,
    pub user_id: String,
    pub quest_id: String,
    pub completed_on: chrono::NaiveDate,
    pub reward_in_cents: i64,
}

/// Completion joined with its quest title, for the history view.
#[derive(Clone, Debug, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct QuestRewardEntry {
    pub title: String,
    pub completed_on: chrono::NaiveDate,
    pub reward_in_cents: i64,
}
