//! Database access layer for corefboard

mod init;
mod models;

pub use init::init_database;
pub use models::{
    BestScore, EvaluationRecord, GoldDataset, Language, LanguageLeaderboard, LeaderboardEntry,
    Statistics, User,
};
