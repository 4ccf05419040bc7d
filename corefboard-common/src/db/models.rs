//! Database models

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    pub id: i64,
    pub username: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub email: String,
    pub is_active: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Language {
    pub id: i64,
    pub language_code: String,
    pub language_name: String,
}

/// One uploaded gold-standard reference file.
///
/// A language may accumulate several; lookups take the most recent.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct GoldDataset {
    pub id: i64,
    pub language_id: i64,
    pub language_name: Option<String>,
    pub filename: String,
    pub file_path: String,
    pub uploaded_by: String,
    pub created_at: String,
}

/// One stored scoring run. Immutable once written; there is no update path.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct EvaluationRecord {
    pub id: i64,
    pub user_id: i64,
    pub language_id: i64,
    pub language_name: Option<String>,
    pub uploaded_filename: String,
    pub file_path: String,
    pub muc_recall: Option<f64>,
    pub muc_precision: Option<f64>,
    pub muc_f1: Option<f64>,
    pub bcub_recall: Option<f64>,
    pub bcub_precision: Option<f64>,
    pub bcub_f1: Option<f64>,
    pub ceafm_recall: Option<f64>,
    pub ceafm_precision: Option<f64>,
    pub ceafm_f1: Option<f64>,
    pub ceafe_recall: Option<f64>,
    pub ceafe_precision: Option<f64>,
    pub ceafe_f1: Option<f64>,
    pub blanc_recall: Option<f64>,
    pub blanc_precision: Option<f64>,
    pub blanc_f1: Option<f64>,
    pub created_at: String,
}

/// One leaderboard row: an evaluation joined with its (active) owner
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct LeaderboardEntry {
    pub username: String,
    pub muc_f1: Option<f64>,
    pub bcub_f1: Option<f64>,
    pub ceafm_f1: Option<f64>,
    pub ceafe_f1: Option<f64>,
    pub blanc_f1: Option<f64>,
    pub avg_f1: f64,
    pub created_at: String,
}

/// Leaderboard for one language, scores sorted by average F1 descending.
///
/// All rows are returned; any top-N truncation belongs to the
/// presentation layer.
#[derive(Debug, Clone, Serialize)]
pub struct LanguageLeaderboard {
    pub language_id: i64,
    pub language_code: String,
    pub language_name: String,
    pub scores: Vec<LeaderboardEntry>,
}

/// Homepage hero statistics
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct Statistics {
    pub total_languages: i64,
    pub total_participants: i64,
    pub total_evaluations: i64,
}

/// A user's best submission per language
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct BestScore {
    pub user_id: i64,
    pub language_id: i64,
    pub username: String,
    pub language_name: String,
    pub language_code: String,
    pub best_muc_f1: f64,
    pub best_bcub_f1: f64,
    pub best_ceafm_f1: f64,
    pub best_ceafe_f1: f64,
    pub best_blanc_f1: f64,
    pub best_avg_f1: f64,
    pub latest_submission: String,
}
