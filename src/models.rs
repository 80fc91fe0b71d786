pub mod deposits;
pub mod quests;
pub mod referrals;
pub mod users;
