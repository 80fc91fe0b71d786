use crate::models::{referrals::Referral, users::User};

use sqlx::PgPool;
use uuid::Uuid;

#[derive(Clone)]
pub struct UserRepository {
    conn: PgPool,
}

impl UserRepository {
    pub fn new(conn: PgPool) -> Self {
        UserRepository { conn }
    }

    pub async fn insert_user(
        &self,
        email: &str,
        password_hash: &str,
        deposit_address: &str,
        referral_code: &str,
    ) -> Result<User, sqlx::Error> {
        let user_id = Uuid::new_v4().hyphenated().to_string();

        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (id, email, password_hash, deposit_address, referral_code)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(user_id)
        .bind(email)
        .bind(password_hash)
        .bind(deposit_address)
        .bind(referral_code)
        .fetch_one(&self.conn)
        .await?;

        Ok(user)
    }

    pub async fn get_user_by_id(&self, user_id: &str) -> Result<Option<User>, sqlx::Error> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(user_id)
            .fetch_optional(&self.conn)
            .await
    }

    pub async fn get_user_by_email(&self, email: &str) -> Result<Option<User>, sqlx::Error> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = $1")
            .bind(email)
            .fetch_optional(&self.conn)
            .await
    }

    pub async fn get_user_by_referral_code(
        &self,
        referral_code: &str,
    ) -> Result<Option<User>, sqlx::Error> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE referral_code = $1")
            .bind(referral_code)
            .fetch_optional(&self.conn)
            .await
    }

    pub async fn update_email(&self, user_id: &str, email: &str) -> Result<(), sqlx::Error> {
        sqlx::query(
            "UPDATE users SET email = $1, updated_at = CURRENT_TIMESTAMP WHERE id = $2",
        )
        .bind(email)
        .bind(user_id)
        .execute(&self.conn)
        .await?;

        Ok(())
    }

    pub async fn update_password_hash(
        &self,
        user_id: &str,
        password_hash: &str,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            "UPDATE users SET password_hash = $1, updated_at = CURRENT_TIMESTAMP WHERE id = $2",
        )
        .bind(password_hash)
        .bind(user_id)
        .execute(&self.conn)
        .await?;

        Ok(())
    }

    pub async fn insert_referral(
        &self,
        referrer_id: &str,
        referred_id: &str,
    ) -> Result<Referral, sqlx::Error> {
        let referral_id = Uuid::new_v4().hyphenated().to_string();

        sqlx::query_as::<_, Referral>(
            r#"
            INSERT INTO referrals (id, referrer_id, referred_id)
            VALUES ($1, $2, $3)
            RETURNING *
            "#,
        )
        .bind(referral_id)
        .bind(referrer_id)
        .bind(referred_id)
        .fetch_one(&self.conn)
        .await
    }

    pub async fn referral_count(&self, user_id: &str) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(1) FROM referrals WHERE referrer_id = $1")
            .bind(user_id)
            .fetch_one(&self.conn)
            .await
    }
}
