pub mod accounts;
pub mod deposits;
pub mod history;
pub mod http;
pub mod quests;

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("{0}")]
    InvalidInput(String),
    #[error("The minimum deposit is ${0}")]
    InvalidAmount(i64),
    #[error("A transaction hash of at least {0} characters is required")]
    InvalidReference(usize),
    #[error("Email or password is incorrect")]
    BadCredentials,
    #[error("Current password is incorrect")]
    WrongPassword,
    #[error("Incorrect access code")]
    BadAccessCode,
    #[error("Not authenticated")]
    Unauthenticated,
    #[error("This email is already in use")]
    EmailTaken,
    #[error("A minimum deposit of ${0} is required to complete quests")]
    DepositTooLow(i64),
    #[error("Quest not found")]
    QuestNotFound,
    #[error("Deposit not found")]
    DepositNotFound,
    #[error("Complete the previous quest first")]
    SequenceLocked,
    #[error("Invite at least 1 person to complete this quest")]
    ReferralRequired,
    #[error("Quest already completed today")]
    AlreadyCompleted,
    #[error("This deposit has already been processed")]
    AlreadyProcessed,
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("Internal error: {0}")]
    Internal(String),
}

/// True when a sqlx error is a unique-key violation, used to turn duplicate
/// inserts (email, referral links) into their domain error.
pub(crate) fn is_unique_violation(err: &sqlx::Error) -> bool {
    err.as_database_error()
        .map(|db| db.is_unique_violation())
        .unwrap_or(false)
}
