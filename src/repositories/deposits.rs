use crate::models::deposits::{
    AdminDeposit, Deposit, DepositHistoryEntry, STATUS_CONFIRMED, STATUS_PENDING, STATUS_REJECTED,
};

use sqlx::PgPool;
use uuid::Uuid;

/// Outcome of a pending -> confirmed/rejected transition attempt.
#[derive(Debug, PartialEq, Eq)]
pub enum Transition {
    Applied { user_id: String, amount_in_cents: i64 },
    NotFound,
    AlreadyProcessed,
}

#[derive(Clone)]
pub struct DepositRepository {
    conn: PgPool,
}

impl DepositRepository {
    pub fn new(conn: PgPool) -> Self {
        DepositRepository { conn }
    }

    pub async fn insert_deposit(
        &self,
        user_id: &str,
        amount_in_cents: i64,
        tx_hash: Option<&str>,
    ) -> Result<Deposit, sqlx::Error> {
        let deposit_id = Uuid::new_v4().hyphenated().to_string();

        sqlx::query_as::<_, Deposit>(
            r#"
            INSERT INTO deposits (id, user_id, amount_in_cents, tx_hash, status)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(deposit_id)
        .bind(user_id)
        .bind(amount_in_cents)
        .bind(tx_hash)
        .bind(STATUS_PENDING)
        .fetch_one(&self.conn)
        .await
    }

    pub async fn get_deposit(&self, id: &str) -> Result<Option<Deposit>, sqlx::Error> {
        sqlx::query_as::<_, Deposit>("SELECT * FROM deposits WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.conn)
            .await
    }

    /// Confirms a pending deposit and credits the owner's deposit total and
    /// balance in the same transaction. The status flip is guarded by
    /// `status = 'pending'` so a concurrent transition loses cleanly.
    pub async fn confirm_deposit(&self, id: &str) -> Result<Transition, sqlx::Error> {
        let mut tx = self.conn.begin().await?;

        let flipped = sqlx::query_as::<_, (String, i64)>(
            r#"
            UPDATE deposits
            SET status = $1, updated_at = CURRENT_TIMESTAMP
            WHERE id = $2 AND status = $3
            RETURNING user_id, amount_in_cents
            "#,
        )
        .bind(STATUS_CONFIRMED)
        .bind(id)
        .bind(STATUS_PENDING)
        .fetch_optional(&mut *tx)
        .await?;

        let (user_id, amount_in_cents) = match flipped {
            Some(row) => row,
            None => {
                tx.rollback().await?;
                return self.missed_transition(id).await;
            }
        };

        sqlx::query(
            r#"
            UPDATE users
            SET deposit_in_cents = deposit_in_cents + $1,
                balance_in_cents = balance_in_cents + $1,
                updated_at = CURRENT_TIMESTAMP
            WHERE id = $2
            "#,
        )
        .bind(amount_in_cents)
        .bind(&user_id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(Transition::Applied {
            user_id,
            amount_in_cents,
        })
    }

    pub async fn reject_deposit(&self, id: &str) -> Result<Transition, sqlx::Error> {
        let flipped = sqlx::query_as::<_, (String, i64)>(
            r#"
            UPDATE deposits
            SET status = $1, updated_at = CURRENT_TIMESTAMP
            WHERE id = $2 AND status = $3
            RETURNING user_id, amount_in_cents
            "#,
        )
        .bind(STATUS_REJECTED)
        .bind(id)
        .bind(STATUS_PENDING)
        .fetch_optional(&self.conn)
        .await?;

        match flipped {
            Some((user_id, amount_in_cents)) => Ok(Transition::Applied {
                user_id,
                amount_in_cents,
            }),
            None => self.missed_transition(id).await,
        }
    }

    async fn missed_transition(&self, id: &str) -> Result<Transition, sqlx::Error> {
        match self.get_deposit(id).await? {
            Some(_) => Ok(Transition::AlreadyProcessed),
            None => Ok(Transition::NotFound),
        }
    }

    pub async fn list_all_with_email(&self) -> Result<Vec<AdminDeposit>, sqlx::Error> {
        sqlx::query_as::<_, AdminDeposit>(
            r#"
            SELECT d.id, d.user_id, u.email AS user_email,
                   d.amount_in_cents, d.tx_hash, d.status, d.created_at
            FROM deposits d
            JOIN users u ON d.user_id = u.id
            ORDER BY d.created_at DESC
            "#,
        )
        .fetch_all(&self.conn)
        .await
    }

    pub async fn recent_for_user(
        &self,
        user_id: &str,
        limit: i64,
    ) -> Result<Vec<DepositHistoryEntry>, sqlx::Error> {
        sqlx::query_as::<_, DepositHistoryEntry>(
            r#"
            SELECT amount_in_cents, status, tx_hash, created_at
            FROM deposits
            WHERE user_id = $1
            ORDER BY created_at DESC
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
    use crate::models::users::User;
    use crate::repositories::users::UserRepository;

    async fn seed_user(users: &UserRepository) -> User {
        users
            .insert_user("depositor@example.com", "hash", "0xabc", "DEP12345")
            .await
            .unwrap()
    }

    #[sqlx::test]
    async fn test_confirm_credits_both_totals_and_is_terminal(pool: PgPool) {
        let users = UserRepository::new(pool.clone());
        let repo = DepositRepository::new(pool);

        let user = seed_user(&users).await;
        let deposit = repo
            .insert_deposit(&user.id, 3_000, Some("abcdef123456"))
            .await
            .unwrap();
        assert_eq!(deposit.status, STATUS_PENDING);

        let outcome = repo.confirm_deposit(&deposit.id).await.unwrap();
        assert_eq!(
            outcome,
            Transition::Applied {
                user_id: user.id.clone(),
                amount_in_cents: 3_000
            }
        );

        // Both totals credited by exactly the amount.
        let refreshed = users.get_user_by_id(&user.id).await.unwrap().unwrap();
        assert_eq!(refreshed.deposit_in_cents, 3_000);
        assert_eq!(refreshed.balance_in_cents, 3_000);

        // Confirmed is terminal; failed re-transitions leave totals alone.
        assert_eq!(
            repo.confirm_deposit(&deposit.id).await.unwrap(),
            Transition::AlreadyProcessed
        );
        assert_eq!(
            repo.reject_deposit(&deposit.id).await.unwrap(),
            Transition::AlreadyProcessed
        );

        let refreshed = users.get_user_by_id(&user.id).await.unwrap().unwrap();
        assert_eq!(refreshed.deposit_in_cents, 3_000);
        assert_eq!(refreshed.balance_in_cents, 3_000);

        let stored = repo.get_deposit(&deposit.id).await.unwrap().unwrap();
        assert_eq!(stored.status, STATUS_CONFIRMED);
    }

    #[sqlx::test]
    async fn test_reject_is_terminal_without_credit(pool: PgPool) {
        let users = UserRepository::new(pool.clone());
        let repo = DepositRepository::new(pool);

        let user = seed_user(&users).await;
        let deposit = repo
            .insert_deposit(&user.id, 3_000, Some("abcdef123456"))
            .await
            .unwrap();

        assert!(matches!(
            repo.reject_deposit(&deposit.id).await.unwrap(),
            Transition::Applied { .. }
        ));

        let refreshed = users.get_user_by_id(&user.id).await.unwrap().unwrap();
        assert_eq!(refreshed.deposit_in_cents, 0);
        assert_eq!(refreshed.balance_in_cents, 0);

        // A rejected deposit can never be approved later.
        assert_eq!(
            repo.confirm_deposit(&deposit.id).await.unwrap(),
            Transition::AlreadyProcessed
        );
        let stored = repo.get_deposit(&deposit.id).await.unwrap().unwrap();
        assert_eq!(stored.status, STATUS_REJECTED);
    }

    #[sqlx::test]
    async fn test_unknown_deposit_transition(pool: PgPool) {
        let repo = DepositRepository::new(pool);

        assert_eq!(
            repo.confirm_deposit("missing").await.unwrap(),
            Transition::NotFound
        );
        assert_eq!(
            repo.reject_deposit("missing").await.unwrap(),
            Transition::NotFound
        );
    }
}
