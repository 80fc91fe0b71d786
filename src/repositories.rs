pub mod deposits;
pub mod quests;
pub mod users;
