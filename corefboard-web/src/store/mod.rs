//! Data access with database-or-demo fallback
//!
//! Every logical operation first tries the SQLite pool when one is
//! configured; on a backing-store failure it logs a warning and answers
//! from the in-memory demo store instead. A backing-store failure never
//! surfaces to the caller as long as the fallback can satisfy the
//! request structurally. Validation rejections and not-found results
//! are real answers and propagate from whichever path produced them.

mod db;
mod demo;

pub use demo::DemoStore;

use corefboard_common::db::{
    BestScore, EvaluationRecord, GoldDataset, Language, LanguageLeaderboard, Statistics, User,
};
use corefboard_common::metrics::ScoreSet;
use corefboard_common::{Error, Result};
use sqlx::SqlitePool;
use std::path::Path;
use tracing::{info, warn};

/// Shared data-access handle
#[derive(Clone)]
pub struct Store {
    db: Option<SqlitePool>,
    demo: DemoStore,
}

impl Store {
    pub fn new(db: Option<SqlitePool>) -> Self {
        Self {
            db,
            demo: DemoStore::seeded(),
        }
    }

    /// Store with no backing database; everything runs on the demo store
    pub fn demo_only() -> Self {
        Self::new(None)
    }

    pub fn has_database(&self) -> bool {
        self.db.is_some()
    }

    /// Look up an active user and verify their password
    pub async fn authenticate(&self, username: &str, password: &str) -> Result<Option<User>> {
        let user = if let Some(pool) = &self.db {
            match db::find_active_user(pool, username).await {
                Ok(user) => user,
                Err(e) => {
                    warn!("Database authentication error: {}; using demo store", e);
                    self.demo.find_active_user(username)
                }
            }
        } else {
            self.demo.find_active_user(username)
        };

        let Some(user) = user else {
            return Ok(None);
        };

        let verified = bcrypt::verify(password, &user.password_hash).unwrap_or(false);
        Ok(verified.then_some(user))
    }

    pub async fn add_user(&self, username: &str, email: &str, password: &str) -> Result<User> {
        let username = username.trim();
        let email = email.trim();
        if username.is_empty() || email.is_empty() || password.is_empty() {
            return Err(Error::InvalidInput(
                "Username, email and password are required".to_string(),
            ));
        }

        let password_hash = bcrypt::hash(password, bcrypt::DEFAULT_COST)
            .map_err(|e| Error::Internal(format!("bcrypt failure: {}", e)))?;

        if let Some(pool) = &self.db {
            match db::add_user(pool, username, email, &password_hash).await {
                Err(e) if e.is_backing_store_failure() => {
                    warn!("Database error adding user: {}; using demo store", e);
                }
                other => return other,
            }
        }
        self.demo.add_user(username, email, &password_hash)
    }

    pub async fn list_languages(&self) -> Result<Vec<Language>> {
        if let Some(pool) = &self.db {
            match db::list_languages(pool).await {
                Err(e) if e.is_backing_store_failure() => {
                    warn!("Database error listing languages: {}; using demo store", e);
                }
                other => return other,
            }
        }
        Ok(self.demo.list_languages())
    }

    pub async fn add_language(&self, code: &str, name: &str) -> Result<Language> {
        let (code, name) = normalize_language(code, name)?;
        if let Some(pool) = &self.db {
            match db::add_language(pool, &code, &name).await {
                Err(e) if e.is_backing_store_failure() => {
                    warn!("Database error adding language: {}; using demo store", e);
                }
                other => return other,
            }
        }
        self.demo.add_language(&code, &name)
    }

    pub async fn update_language(&self, id: i64, code: &str, name: &str) -> Result<()> {
        let (code, name) = normalize_language(code, name)?;
        if let Some(pool) = &self.db {
            match db::update_language(pool, id, &code, &name).await {
                Err(e) if e.is_backing_store_failure() => {
                    warn!("Database error updating language: {}; using demo store", e);
                }
                other => return other,
            }
        }
        self.demo.update_language(id, &code, &name)
    }

    /// Delete a language; its gold datasets and their files on disk go
    /// with it on both paths
    pub async fn delete_language(&self, id: i64) -> Result<()> {
        if let Some(pool) = &self.db {
            match db::gold_datasets_for_language(pool, id).await {
                Ok(datasets) => match db::delete_language(pool, id).await {
                    Err(e) if e.is_backing_store_failure() => {
                        warn!("Database error deleting language: {}; using demo store", e);
                    }
                    other => {
                        if other.is_ok() {
                            for dataset in &datasets {
                                remove_dataset_file(&dataset.file_path);
                            }
                        }
                        return other;
                    }
                },
                Err(e) if e.is_backing_store_failure() => {
                    warn!("Database error deleting language: {}; using demo store", e);
                }
                Err(e) => return Err(e),
            }
        }

        let removed = self.demo.delete_language(id)?;
        for dataset in &removed {
            remove_dataset_file(&dataset.file_path);
        }
        Ok(())
    }

    /// Most recent gold dataset for a language, if any
    pub async fn find_gold_dataset(&self, language_id: i64) -> Result<Option<GoldDataset>> {
        if let Some(pool) = &self.db {
            match db::find_gold_dataset(pool, language_id).await {
                Err(e) if e.is_backing_store_failure() => {
                    warn!("Database error finding gold dataset: {}; using demo store", e);
                }
                other => return other,
            }
        }
        Ok(self.demo.find_gold_dataset(language_id))
    }

    pub async fn add_gold_dataset(
        &self,
        language_id: i64,
        filename: &str,
        file_path: &str,
        uploaded_by: &str,
    ) -> Result<GoldDataset> {
        if let Some(pool) = &self.db {
            match db::add_gold_dataset(pool, language_id, filename, file_path, uploaded_by).await {
                Err(e) if e.is_backing_store_failure() => {
                    warn!("Database error saving gold dataset: {}; using demo store", e);
                }
                other => return other,
            }
        }
        Ok(self
            .demo
            .add_gold_dataset(language_id, filename, file_path, uploaded_by))
    }

    /// Delete a gold dataset row and its physical file
    pub async fn delete_gold_dataset(&self, id: i64) -> Result<()> {
        if let Some(pool) = &self.db {
            match db::get_gold_dataset(pool, id).await {
                Ok(Some(dataset)) => {
                    remove_dataset_file(&dataset.file_path);
                    match db::delete_gold_dataset(pool, id).await {
                        Err(e) if e.is_backing_store_failure() => {
                            warn!("Database error deleting gold dataset: {}; using demo store", e);
                        }
                        other => return other,
                    }
                }
                Ok(None) => {
                    return Err(Error::NotFound(format!("Gold dataset {} not found", id)))
                }
                Err(e) if e.is_backing_store_failure() => {
                    warn!("Database error deleting gold dataset: {}; using demo store", e);
                }
                Err(e) => return Err(e),
            }
        }

        let dataset = self.demo.remove_gold_dataset(id)?;
        remove_dataset_file(&dataset.file_path);
        Ok(())
    }

    pub async fn list_gold_datasets(&self) -> Result<Vec<GoldDataset>> {
        if let Some(pool) = &self.db {
            match db::list_gold_datasets(pool).await {
                Err(e) if e.is_backing_store_failure() => {
                    warn!("Database error listing gold datasets: {}; using demo store", e);
                }
                other => return other,
            }
        }
        Ok(self.demo.list_gold_datasets())
    }

    /// Persist one scoring run. Scores are immutable once written.
    pub async fn save_evaluation(
        &self,
        user_id: i64,
        language_id: i64,
        uploaded_filename: &str,
        file_path: &str,
        scores: &ScoreSet,
    ) -> Result<()> {
        if let Some(pool) = &self.db {
            match db::save_evaluation(pool, user_id, language_id, uploaded_filename, file_path, scores)
                .await
            {
                Err(e) if e.is_backing_store_failure() => {
                    warn!("Database error saving evaluation: {}; using demo store", e);
                }
                other => return other,
            }
        }
        self.demo
            .save_evaluation(user_id, language_id, uploaded_filename, file_path, scores);
        Ok(())
    }

    pub async fn user_history(&self, user_id: i64) -> Result<Vec<EvaluationRecord>> {
        if let Some(pool) = &self.db {
            match db::user_history(pool, user_id).await {
                Err(e) if e.is_backing_store_failure() => {
                    warn!("Database error loading history: {}; using demo store", e);
                }
                other => return other,
            }
        }
        Ok(self.demo.user_history(user_id))
    }

    pub async fn statistics(&self) -> Result<Statistics> {
        if let Some(pool) = &self.db {
            match db::statistics(pool).await {
                Err(e) if e.is_backing_store_failure() => {
                    warn!("Database error loading statistics: {}; using demo store", e);
                }
                other => return other,
            }
        }
        Ok(self.demo.statistics())
    }

    pub async fn leaderboards(&self) -> Result<Vec<LanguageLeaderboard>> {
        if let Some(pool) = &self.db {
            match db::leaderboards(pool).await {
                Err(e) if e.is_backing_store_failure() => {
                    warn!("Database error loading leaderboards: {}; using demo store", e);
                }
                other => return other,
            }
        }
        Ok(self.demo.leaderboards())
    }

    /// Best submission per (user, language). Database-backed only; the
    /// demo store answers with an empty list.
    pub async fn best_scores_per_language(&self) -> Result<Vec<BestScore>> {
        if let Some(pool) = &self.db {
            match db::best_scores_per_language(pool).await {
                Err(e) if e.is_backing_store_failure() => {
                    warn!("Database error loading best scores: {}; using demo store", e);
                }
                other => return other,
            }
        }
        Ok(Vec::new())
    }
}

/// Trim, lowercase and bounds-check a language code/name pair
fn normalize_language(code: &str, name: &str) -> Result<(String, String)> {
    let code = code.trim().to_lowercase();
    let name = name.trim().to_string();

    if code.is_empty() || name.is_empty() {
        return Err(Error::InvalidInput(
            "Language code and name are required".to_string(),
        ));
    }
    if code.len() > 10 {
        return Err(Error::InvalidInput(
            "Language code must be 10 characters or less".to_string(),
        ));
    }

    Ok((code, name))
}

/// Best-effort removal of a dataset file from disk
fn remove_dataset_file(file_path: &str) {
    let path = Path::new(file_path);
    if path.exists() {
        match std::fs::remove_file(path) {
            Ok(()) => info!("Deleted gold dataset file: {}", file_path),
            Err(e) => warn!("Could not delete gold dataset file {}: {}", file_path, e),
        }
    }
}
