use std::collections::HashSet;

use serde::Serialize;

use super::ServiceError;
use crate::models::quests::{Quest, QuestStatus};
use crate::repositories::quests::{CompletionInsert, QuestRepository};
use crate::repositories::users::UserRepository;

pub const LOCK_SEQUENCE: &str = "Complete the previous quest first";
pub const LOCK_REFERRAL: &str = "Invite at least 1 person to unlock";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestsOverview {
    pub quests: Vec<QuestStatus>,
    pub completed_today: i64,
    pub total_quests: i64,
    pub referrals_count: i64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletionResult {
    pub reward: i64,
    pub new_balance: i64,
}

#[derive(Clone)]
pub struct QuestService {
    quests: QuestRepository,
    users: UserRepository,
    min_deposit_in_cents: i64,
}

impl QuestService {
    pub fn new(quests: QuestRepository, users: UserRepository, min_deposit_in_cents: i64) -> Self {
        QuestService {
            quests,
            users,
            min_deposit_in_cents,
        }
    }

    /// The full ordered catalog with per-quest completion and lock state for
    /// `day`, plus the counters the quests page displays.
    pub async fn overview(
        &self,
        user_id: &str,
        day: chrono::NaiveDate,
    ) -> Result<QuestsOverview, ServiceError> {
        let catalog = self.quests.list_quests().await?;
        let completed: HashSet<String> = self
            .quests
            .completions_for_day(user_id, day)
            .await?
            .into_iter()
            .map(|c| c.quest_id)
            .collect();
        let referrals_count = self.users.referral_count(user_id).await?;

        let total_quests = catalog.len() as i64;
        let completed_today = completed.len() as i64;

        let quests = catalog
            .iter()
            .enumerate()
            .map(|(index, quest)| {
                let (locked, lock_reason) = lock_state(&catalog, index, &completed, referrals_count);
                QuestStatus {
                    id: quest.id.clone(),
                    position: quest.position,
                    title: quest.title.clone(),
                    description: quest.description.clone(),
                    reward_bps: quest.reward_bps,
                    completed: completed.contains(&quest.id),
                    locked,
                    lock_reason,
                }
            })
            .collect();

        Ok(QuestsOverview {
            quests,
            completed_today,
            total_quests,
            referrals_count,
        })
    }

    /// Completes a quest for `day`. The reward is computed from the user's
    /// deposit total at this moment; later deposits never rewrite past
    /// completions. Double completion is reported by the store's unique key,
    /// not a pre-check, so concurrent identical requests cannot both win.
    pub async fn complete(
        &self,
        user_id: &str,
        quest_id: &str,
        day: chrono::NaiveDate,
    ) -> Result<CompletionResult, ServiceError> {
        let user = self
            .users
            .get_user_by_id(user_id)
            .await?
            .ok_or(ServiceError::Unauthenticated)?;

        if user.deposit_in_cents < self.min_deposit_in_cents {
            return Err(ServiceError::DepositTooLow(self.min_deposit_in_cents / 100));
        }

        let quest = self
            .quests
            .get_quest(quest_id)
            .await?
            .ok_or(ServiceError::QuestNotFound)?;

        let catalog = self.quests.list_quests().await?;
        let index = catalog
            .iter()
            .position(|q| q.id == quest.id)
            .ok_or(ServiceError::QuestNotFound)?;

        if index > 0 {
            let completed: HashSet<String> = self
                .quests
                .completions_for_day(user_id, day)
                .await?
                .into_iter()
                .map(|c| c.quest_id)
                .collect();
            if !completed.contains(&catalog[index - 1].id) {
                return Err(ServiceError::SequenceLocked);
            }
        }

        if quest.requires_referral && self.users.referral_count(user_id).await? < 1 {
            return Err(ServiceError::ReferralRequired);
        }

        let reward = compute_reward(user.deposit_in_cents, quest.reward_bps);

        match self
            .quests
            .insert_completion(user_id, quest_id, day, reward)
            .await?
        {
            CompletionInsert::Inserted {
                new_balance_in_cents,
            } => Ok(CompletionResult {
                reward,
                new_balance: new_balance_in_cents,
            }),
            CompletionInsert::Duplicate => Err(ServiceError::AlreadyCompleted),
        }
    }
}

/// Reward in cents for a deposit total and a rate in basis points,
/// rounded half up to whole cents. Integer arithmetic only.
pub fn compute_reward(deposit_in_cents: i64, reward_bps: i64) -> i64 {
    (deposit_in_cents * reward_bps + 5_000) / 10_000
}

/// Lock state for the quest at `index` in the ordered catalog. A quest is
/// sequence-locked unless its predecessor has a completion for the day;
/// a referral-gated quest additionally needs at least one referral, and
/// that reason takes display precedence.
fn lock_state(
    catalog: &[Quest],
    index: usize,
    completed: &HashSet<String>,
    referral_count: i64,
) -> (bool, Option<&'static str>) {
    let mut locked = false;
    let mut reason = None;

    if index > 0 && !completed.contains(&catalog[index - 1].id) {
        locked = true;
        reason = Some(LOCK_SEQUENCE);
    }
    if catalog[index].requires_referral && referral_count < 1 {
        locked = true;
        reason = Some(LOCK_REFERRAL);
    }

    (locked, reason)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quest(id: &str, position: i32, requires_referral: bool) -> Quest {
        Quest {
            id: id.to_string(),
            position,
            title: format!("Quest {}", position),
            description: String::new(),
            reward_bps: 4500,
            requires_referral,
        }
    }

    fn catalog() -> Vec<Quest> {
        vec![
            quest("a", 0, false),
            quest("b", 1, true),
            quest("c", 2, false),
        ]
    }

    fn completed(ids: &[&str]) -> HashSet<String> {
        ids.iter().map(|id| id.to_string()).collect()
    }

    #[test]
    fn test_reward_computation() {
        // $100 deposit at 15% -> $15.00
        assert_eq!(compute_reward(10_000, 1500), 1_500);
        // $100 deposit at 45% -> $45.00
        assert_eq!(compute_reward(10_000, 4500), 4_500);
        assert_eq!(compute_reward(0, 4500), 0);
    }

    #[test]
    fn test_reward_rounds_half_up() {
        // 30.01 * 15% = 4.5015 -> 4.50
        assert_eq!(compute_reward(3_001, 1500), 450);
        // 30.03 * 15% = 4.5045 -> 4.50
        assert_eq!(compute_reward(3_003, 1500), 450);
        // 33.33 * 15% = 4.9995 -> 5.00
        assert_eq!(compute_reward(3_333, 1500), 500);
        // 0.01 * 45% = 0.0045 -> 0.00
        assert_eq!(compute_reward(1, 4500), 0);
        // 0.02 * 25% = 0.005 -> 0.01 (half rounds up)
        assert_eq!(compute_reward(2, 2500), 1);
    }

    #[test]
    fn test_first_quest_never_sequence_locked() {
        let catalog = catalog();
        let (locked, reason) = lock_state(&catalog, 0, &completed(&[]), 0);
        assert!(!locked);
        assert_eq!(reason, None);
    }

    #[test]
    fn test_quest_locked_until_predecessor_completed() {
        let catalog = catalog();

        let (locked, reason) = lock_state(&catalog, 2, &completed(&["a"]), 1);
        assert!(locked);
        assert_eq!(reason, Some(LOCK_SEQUENCE));

        let (locked, _) = lock_state(&catalog, 2, &completed(&["a", "b"]), 1);
        assert!(!locked);
    }

    #[test]
    fn test_referral_gate() {
        let catalog = catalog();

        // Sequence satisfied but no referral.
        let (locked, reason) = lock_state(&catalog, 1, &completed(&["a"]), 0);
        assert!(locked);
        assert_eq!(reason, Some(LOCK_REFERRAL));

        let (locked, _) = lock_state(&catalog, 1, &completed(&["a"]), 1);
        assert!(!locked);
    }

    #[test]
    fn test_referral_reason_takes_precedence() {
        let catalog = catalog();
        // Both gates unmet: the referral reason is the one shown.
        let (locked, reason) = lock_state(&catalog, 1, &completed(&[]), 0);
        assert!(locked);
        assert_eq!(reason, Some(LOCK_REFERRAL));
    }
}
