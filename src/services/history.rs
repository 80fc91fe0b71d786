use serde::Serialize;

use super::ServiceError;
use crate::models::deposits::DepositHistoryEntry;
use crate::models::quests::QuestRewardEntry;
use crate::repositories::deposits::DepositRepository;
use crate::repositories::quests::QuestRepository;

const HISTORY_LIMIT: i64 = 10;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RewardHistory {
    pub deposits: Vec<DepositHistoryEntry>,
    pub quest_rewards: Vec<QuestRewardEntry>,
}

#[derive(Clone)]
pub struct HistoryService {
    deposits: DepositRepository,
    quests: QuestRepository,
}

impl HistoryService {
    pub fn new(deposits: DepositRepository, quests: QuestRepository) -> Self {
        HistoryService { deposits, quests }
    }

    /// The user's most recent deposits and quest rewards, newest first.
    pub async fn recent(&self, user_id: &str) -> Result<RewardHistory, ServiceError> {
        let deposits = self.deposits.recent_for_user(user_id, HISTORY_LIMIT).await?;
        let quest_rewards = self.quests.recent_rewards(user_id, HISTORY_LIMIT).await?;

        Ok(RewardHistory {
            deposits,
            quest_rewards,
        })
    }
}
