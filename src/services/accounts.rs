use rand::Rng;

use super::{is_unique_violation, ServiceError};
use crate::models::users::{NewUser, Profile, User};
use crate::repositories::users::UserRepository;

const MIN_PASSWORD_CHARS: usize = 6;

#[derive(Clone)]
pub struct AccountService {
    users: UserRepository,
    shared_deposit_address: Option<String>,
}

impl AccountService {
    pub fn new(users: UserRepository, shared_deposit_address: Option<String>) -> Self {
        AccountService {
            users,
            shared_deposit_address,
        }
    }

    pub async fn register(&self, new_user: NewUser) -> Result<User, ServiceError> {
        if new_user.email.trim().is_empty() || new_user.password.is_empty() {
            return Err(ServiceError::InvalidInput(
                "Email and password are required".to_string(),
            ));
        }

        let password_hash = bcrypt::hash(&new_user.password, bcrypt::DEFAULT_COST)
            .map_err(|e| ServiceError::Internal(e.to_string()))?;
        let deposit_address = generate_deposit_address();
        let referral_code = generate_referral_code();

        let user = self
            .users
            .insert_user(
                new_user.email.trim(),
                &password_hash,
                &deposit_address,
                &referral_code,
            )
            .await
            .map_err(|e| {
                if is_unique_violation(&e) {
                    ServiceError::EmailTaken
                } else {
                    ServiceError::Database(e)
                }
            })?;

        // An invalid or blank referral code is ignored, not an error.
        if let Some(code) = normalize_referral_code(new_user.referral_code.as_deref()) {
            if let Some(referrer) = self.users.get_user_by_referral_code(&code).await? {
                self.users.insert_referral(&referrer.id, &user.id).await?;
            }
        }

        Ok(user)
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<User, ServiceError> {
        let user = self
            .users
            .get_user_by_email(email)
            .await?
            .ok_or(ServiceError::BadCredentials)?;

        let valid = bcrypt::verify(password, &user.password_hash)
            .map_err(|e| ServiceError::Internal(e.to_string()))?;
        if !valid {
            return Err(ServiceError::BadCredentials);
        }

        Ok(user)
    }

    pub async fn profile(&self, user_id: &str) -> Result<Profile, ServiceError> {
        let user = self
            .users
            .get_user_by_id(user_id)
            .await?
            .ok_or(ServiceError::Unauthenticated)?;
        let referrals_count = self.users.referral_count(user_id).await?;

        let deposit_address = self
            .shared_deposit_address
            .clone()
            .unwrap_or(user.deposit_address);

        Ok(Profile {
            id: user.id,
            email: user.email,
            balance: user.balance_in_cents,
            deposit_amount: user.deposit_in_cents,
            deposit_address,
            referral_code: user.referral_code,
            referrals_count,
        })
    }

    pub async fn change_email(
        &self,
        user_id: &str,
        new_email: &str,
        current_password: &str,
    ) -> Result<(), ServiceError> {
        if new_email.trim().is_empty() || current_password.is_empty() {
            return Err(ServiceError::InvalidInput(
                "Email and password are required".to_string(),
            ));
        }

        self.verify_current_password(user_id, current_password)
            .await?;

        self.users
            .update_email(user_id, new_email.trim())
            .await
            .map_err(|e| {
                if is_unique_violation(&e) {
                    ServiceError::EmailTaken
                } else {
                    ServiceError::Database(e)
                }
            })
    }

    pub async fn change_password(
        &self,
        user_id: &str,
        current_password: &str,
        new_password: &str,
    ) -> Result<(), ServiceError> {
        if current_password.is_empty() || new_password.is_empty() {
            return Err(ServiceError::InvalidInput(
                "Current and new passwords are required".to_string(),
            ));
        }
        if new_password.chars().count() < MIN_PASSWORD_CHARS {
            return Err(ServiceError::InvalidInput(format!(
                "New password must be at least {} characters",
                MIN_PASSWORD_CHARS
            )));
        }

        self.verify_current_password(user_id, current_password)
            .await?;

        let password_hash = bcrypt::hash(new_password, bcrypt::DEFAULT_COST)
            .map_err(|e| ServiceError::Internal(e.to_string()))?;
        self.users
            .update_password_hash(user_id, &password_hash)
            .await?;

        Ok(())
    }

    async fn verify_current_password(
        &self,
        user_id: &str,
        current_password: &str,
    ) -> Result<(), ServiceError> {
        let user = self
            .users
            .get_user_by_id(user_id)
            .await?
            .ok_or(ServiceError::Unauthenticated)?;

        let valid = bcrypt::verify(current_password, &user.password_hash)
            .map_err(|e| ServiceError::Internal(e.to_string()))?;
        if !valid {
            return Err(ServiceError::WrongPassword);
        }

        Ok(())
    }
}

/// Trims and uppercases a submitted referral code; blank codes count as absent.
fn normalize_referral_code(code: Option<&str>) -> Option<String> {
    let code = code?.trim();
    if code.is_empty() {
        None
    } else {
        Some(code.to_uppercase())
    }
}

fn generate_deposit_address() -> String {
    const HEX: &[u8] = b"0123456789abcdef";
    let mut rng = rand::thread_rng();
    let mut address = String::with_capacity(42);
    address.push_str("0x");
    for _ in 0..40 {
        address.push(HEX[rng.gen_range(0..HEX.len())] as char);
    }
    address
}

fn generate_referral_code() -> String {
    const ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
    let mut rng = rand::thread_rng();
    (0..8)
        .map(|_| ALPHABET[rng.gen_range(0..ALPHABET.len())] as char)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_referral_code() {
        assert_eq!(normalize_referral_code(None), None);
        assert_eq!(normalize_referral_code(Some("")), None);
        assert_eq!(normalize_referral_code(Some("   ")), None);
        assert_eq!(
            normalize_referral_code(Some(" ab12cd34 ")),
            Some("AB12CD34".to_string())
        );
    }

    #[test]
    fn test_generate_deposit_address_format() {
        let address = generate_deposit_address();
        assert_eq!(address.len(), 42);
        assert!(address.starts_with("0x"));
        assert!(address[2..].chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_generate_referral_code_format() {
        let code = generate_referral_code();
        assert_eq!(code.len(), 8);
        assert!(code
            .chars()
            .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit()));
    }
}
