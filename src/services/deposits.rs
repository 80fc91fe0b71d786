use super::ServiceError;
use crate::models::deposits::{AdminDeposit, Deposit, NewDeposit};
use crate::repositories::deposits::{DepositRepository, Transition};

const MIN_TX_HASH_CHARS: usize = 10;

#[derive(Clone)]
pub struct DepositService {
    deposits: DepositRepository,
    min_deposit_in_cents: i64,
    require_tx_hash: bool,
    auto_confirm: bool,
}

impl DepositService {
    pub fn new(
        deposits: DepositRepository,
        min_deposit_in_cents: i64,
        require_tx_hash: bool,
        auto_confirm: bool,
    ) -> Self {
        DepositService {
            deposits,
            min_deposit_in_cents,
            require_tx_hash,
            auto_confirm,
        }
    }

    /// Records a deposit claim as `pending`; nothing is credited until an
    /// admin approves it (or immediately, when auto-confirm is configured).
    pub async fn submit(
        &self,
        user_id: &str,
        new_deposit: NewDeposit,
    ) -> Result<Deposit, ServiceError> {
        let tx_hash = validate_submission(
            new_deposit.amount_in_cents,
            new_deposit.tx_hash.as_deref(),
            self.min_deposit_in_cents,
            self.require_tx_hash,
        )?;

        let deposit = self
            .deposits
            .insert_deposit(user_id, new_deposit.amount_in_cents, tx_hash.as_deref())
            .await?;

        if !self.auto_confirm {
            return Ok(deposit);
        }

        self.approve(&deposit.id).await?;
        let confirmed = self
            .deposits
            .get_deposit(&deposit.id)
            .await?
            .ok_or(ServiceError::DepositNotFound)?;
        Ok(confirmed)
    }

    pub async fn approve(&self, deposit_id: &str) -> Result<(), ServiceError> {
        match self.deposits.confirm_deposit(deposit_id).await? {
            Transition::Applied { .. } => Ok(()),
            Transition::NotFound => Err(ServiceError::DepositNotFound),
            Transition::AlreadyProcessed => Err(ServiceError::AlreadyProcessed),
        }
    }

    pub async fn reject(&self, deposit_id: &str) -> Result<(), ServiceError> {
        match self.deposits.reject_deposit(deposit_id).await? {
            Transition::Applied { .. } => Ok(()),
            Transition::NotFound => Err(ServiceError::DepositNotFound),
            Transition::AlreadyProcessed => Err(ServiceError::AlreadyProcessed),
        }
    }

    pub async fn list_all(&self) -> Result<Vec<AdminDeposit>, ServiceError> {
        Ok(self.deposits.list_all_with_email().await?)
    }
}

/// Validates a submission and returns the normalized tx hash. No row is
/// created when validation fails.
fn validate_submission(
    amount_in_cents: i64,
    tx_hash: Option<&str>,
    min_deposit_in_cents: i64,
    require_tx_hash: bool,
) -> Result<Option<String>, ServiceError> {
    if amount_in_cents < min_deposit_in_cents {
        return Err(ServiceError::InvalidAmount(min_deposit_in_cents / 100));
    }

    let trimmed = tx_hash.map(str::trim).filter(|h| !h.is_empty());
    if require_tx_hash && trimmed.map(|h| h.chars().count()).unwrap_or(0) < MIN_TX_HASH_CHARS {
        return Err(ServiceError::InvalidReference(MIN_TX_HASH_CHARS));
    }

    Ok(trimmed.map(str::to_string))
}

#[cfg(test)]
mod tests {
    use super::*;

    const MIN: i64 = 3000;

    #[test]
    fn test_rejects_amount_below_minimum() {
        let result = validate_submission(2000, Some("abcdef123456"), MIN, true);
        assert!(matches!(result, Err(ServiceError::InvalidAmount(30))));
    }

    #[test]
    fn test_rejects_missing_tx_hash_when_required() {
        for tx_hash in [None, Some("   "), Some("short")] {
            let result = validate_submission(3000, tx_hash, MIN, true);
            assert!(matches!(result, Err(ServiceError::InvalidReference(_))));
        }
    }

    #[test]
    fn test_accepts_minimum_amount_with_hash() {
        let hash = validate_submission(3000, Some("  abcdef123456  "), MIN, true).unwrap();
        assert_eq!(hash.as_deref(), Some("abcdef123456"));
    }

    #[test]
    fn test_tx_hash_optional_when_not_required() {
        let hash = validate_submission(5000, None, MIN, false).unwrap();
        assert_eq!(hash, None);
    }
}
