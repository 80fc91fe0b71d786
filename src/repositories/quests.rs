use crate::models::quests::{Quest, QuestCompletion, QuestRewardEntry};

use sqlx::PgPool;
use uuid::Uuid;

/// Outcome of a completion insert. `Duplicate` is the store-level
/// (user, quest, day) uniqueness violation.
#[derive(Debug, PartialEq, Eq)]
pub enum CompletionInsert {
    Inserted { new_balance_in_cents: i64 },
    Duplicate,
}

#[derive(Clone)]
pub struct QuestRepository {
    conn: PgPool,
}

impl QuestRepository {
    pub fn new(conn: PgPool) -> Self {
        QuestRepository { conn }
    }

    pub async fn list_quests(&self) -> Result<Vec<Quest>, sqlx::Error> {
        sqlx::query_as::<_, Quest>("SELECT * FROM quests ORDER BY position")
            .fetch_all(&self.conn)
            .await
    }

    pub async fn get_quest(&self, id: &str) -> Result<Option<Quest>, sqlx::Error> {
        sqlx::query_as::<_, Quest>("SELECT * FROM quests WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.conn)
            .await
    }

    pub async fn completions_for_day(
        &self,
        user_id: &str,
        day: chrono::NaiveDate,
    ) -> Result<Vec<QuestCompletion>, sqlx::Error> {
        sqlx::query_as::<_, QuestCompletion>(
            "SELECT * FROM quest_completions WHERE user_id = $1 AND completed_on = $2",
        )
        .bind(user_id)
        .bind(day)
        .fetch_all(&self.conn)
        .await
    }

    /// Inserts the completion row and credits the reward to the user's
    /// balance as one transaction. The unique key on
    /// (user_id, quest_id, completed_on) is the authoritative
    /// double-completion guard; a violation reports `Duplicate` and leaves
    /// the balance untouched.
    pub async fn insert_completion(
        &self,
        user_id: &str,
        quest_id: &str,
        day: chrono::NaiveDate,
        reward_in_cents: i64,
    ) -> Result<CompletionInsert, sqlx::Error> {
        let completion_id = Uuid::new_v4().hyphenated().to_string();
        let mut tx = self.conn.begin().await?;

        let inserted = sqlx::query(
            r#"
            INSERT INTO quest_completions (id, user_id, quest_id, completed_on, reward_in_cents)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(completion_id)
        .bind(user_id)
        .bind(quest_id)
        .bind(day)
        .bind(reward_in_cents)
        .execute(&mut *tx)
        .await;

        if let Err(err) = inserted {
            tx.rollback().await?;
            let duplicate = err
                .as_database_error()
                .map(|db| db.is_unique_violation())
                .unwrap_or(false);
            if duplicate {
                return Ok(CompletionInsert::Duplicate);
            }
            return Err(err);
        }

        let new_balance_in_cents = sqlx::query_scalar::<_, i64>(
            r#"
            UPDATE users
            SET balance_in_cents = balance_in_cents + $1,
                updated_at = CURRENT_TIMESTAMP
            WHERE id = $2
            RETURNING balance_in_cents
            "#,
        )
        .bind(reward_in_cents)
        .bind(user_id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(CompletionInsert::Inserted {
            new_balance_in_cents,
        })
    }

    pub async fn recent_rewards(
        &self,
        user_id: &str,
        limit: i64,
    ) -> Result<Vec<QuestRewardEntry>, sqlx::Error> {
        sqlx::query_as::<_, QuestRewardEntry>(
            r#"
            SELECT q.title, c.completed_on, c.reward_in_cents
            FROM quest_completions c
            JOIN quests q ON c.quest_id = q.id
            WHERE c.user_id = $1
            ORDER BY c.completed_on DESC
            LIMIT $2
            "#,
        )
        .bind(user_id)
        .bind(limit)
        .fetch_all(&self.conn)
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repositories::users::UserRepository;

    fn day() -> chrono::NaiveDate {
        chrono::NaiveDate::from_ymd_opt(2026, 8, 29).unwrap()
    }

    #[sqlx::test]
    async fn test_duplicate_completion_credits_once(pool: PgPool) {
        let users = UserRepository::new(pool.clone());
        let repo = QuestRepository::new(pool);

        let user = users
            .insert_user("quester@example.com", "hash", "0xabc", "QUEST123")
            .await
            .unwrap();
        let quest = repo.list_quests().await.unwrap().remove(0);

        let first = repo
            .insert_completion(&user.id, &quest.id, day(), 1_500)
            .await
            .unwrap();
        assert_eq!(
            first,
            CompletionInsert::Inserted {
                new_balance_in_cents: 1_500
            }
        );

        // The unique key wins the race, and the losing attempt must not
        // touch the balance.
        let second = repo
            .insert_completion(&user.id, &quest.id, day(), 1_500)
            .await
            .unwrap();
        assert_eq!(second, CompletionInsert::Duplicate);

        let balance = users
            .get_user_by_id(&user.id)
            .await
            .unwrap()
            .unwrap()
            .balance_in_cents;
        assert_eq!(balance, 1_500);
    }

    #[sqlx::test]
    async fn test_day_rollover_allows_completion_again(pool: PgPool) {
        let users = UserRepository::new(pool.clone());
        let repo = QuestRepository::new(pool);

        let user = users
            .insert_user("quester@example.com", "hash", "0xabc", "QUEST123")
            .await
            .unwrap();
        let quest = repo.list_quests().await.unwrap().remove(0);

        repo.insert_completion(&user.id, &quest.id, day(), 1_500)
            .await
            .unwrap();
        let next_day = repo
            .insert_completion(&user.id, &quest.id, day().succ_opt().unwrap(), 1_500)
            .await
            .unwrap();
        assert_eq!(
            next_day,
            CompletionInsert::Inserted {
                new_balance_in_cents: 3_000
            }
        );
    }
}
