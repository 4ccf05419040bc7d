//! In-memory demo store
//!
//! Volatile substitute for the backing store, holding the same shapes.
//! It lives for the process lifetime only and is never reconciled with
//! the database once the two diverge. Seeded with the demo accounts and
//! language the login bootstrap expects.

use chrono::Local;
use corefboard_common::db::{
    EvaluationRecord, GoldDataset, Language, LanguageLeaderboard, LeaderboardEntry, Statistics,
    User,
};
use corefboard_common::metrics::{average_f1, Metric, ScoreSet};
use corefboard_common::{Error, Result};
use std::sync::{Arc, Mutex};
use tracing::info;

fn now_string() -> String {
    Local::now().format("%Y-%m-%d %H:%M:%S").to_string()
}

#[derive(Default)]
struct DemoData {
    users: Vec<User>,
    languages: Vec<Language>,
    datasets: Vec<GoldDataset>,
    evaluations: Vec<EvaluationRecord>,
}

impl DemoData {
    fn language_name(&self, language_id: i64) -> Option<String> {
        self.languages
            .iter()
            .find(|l| l.id == language_id)
            .map(|l| l.language_name.clone())
    }
}

/// Process-lifetime fallback store
#[derive(Clone)]
pub struct DemoStore {
    inner: Arc<Mutex<DemoData>>,
}

impl DemoStore {
    /// Demo store with the bootstrap accounts and language
    pub fn seeded() -> Self {
        let admin_hash =
            bcrypt::hash("admin123", bcrypt::DEFAULT_COST).expect("bcrypt hash of seed password");
        let user_hash =
            bcrypt::hash("user123", bcrypt::DEFAULT_COST).expect("bcrypt hash of seed password");

        let data = DemoData {
            users: vec![
                User {
                    id: 1,
                    username: "admin".to_string(),
                    password_hash: admin_hash,
                    email: "admin@test.com".to_string(),
                    is_active: true,
                },
                User {
                    id: 2,
                    username: "testuser".to_string(),
                    password_hash: user_hash,
                    email: "user@test.com".to_string(),
                    is_active: true,
                },
            ],
            languages: vec![Language {
                id: 1,
                language_code: "hi".to_string(),
                language_name: "Hindi".to_string(),
            }],
            datasets: Vec::new(),
            evaluations: Vec::new(),
        };

        Self {
            inner: Arc::new(Mutex::new(data)),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, DemoData> {
        self.inner.lock().expect("demo store lock poisoned")
    }

    pub fn find_active_user(&self, username: &str) -> Option<User> {
        let data = self.lock();
        data.users
            .iter()
            .find(|u| u.username == username && u.is_active)
            .cloned()
    }

    pub fn add_user(&self, username: &str, email: &str, password_hash: &str) -> Result<User> {
        let mut data = self.lock();
        if data.users.iter().any(|u| u.username == username) {
            return Err(Error::InvalidInput(format!(
                "Username '{}' already exists",
                username
            )));
        }

        let id = data.users.iter().map(|u| u.id).max().unwrap_or(0) + 1;
        let user = User {
            id,
            username: username.to_string(),
            password_hash: password_hash.to_string(),
            email: email.to_string(),
            is_active: true,
        };
        data.users.push(user.clone());
        info!("User {} added to demo store", username);
        Ok(user)
    }

    pub fn list_languages(&self) -> Vec<Language> {
        let mut languages = self.lock().languages.clone();
        languages.sort_by(|a, b| a.language_name.cmp(&b.language_name));
        languages
    }

    pub fn add_language(&self, code: &str, name: &str) -> Result<Language> {
        let mut data = self.lock();
        if data.languages.iter().any(|l| l.language_code == code) {
            return Err(Error::InvalidInput(format!(
                "Language code '{}' already exists",
                code
            )));
        }

        let id = data.languages.iter().map(|l| l.id).max().unwrap_or(0) + 1;
        let language = Language {
            id,
            language_code: code.to_string(),
            language_name: name.to_string(),
        };
        data.languages.push(language.clone());
        info!("Language {} ({}) added to demo store", name, code);
        Ok(language)
    }

    pub fn update_language(&self, id: i64, code: &str, name: &str) -> Result<()> {
        let mut data = self.lock();
        if data
            .languages
            .iter()
            .any(|l| l.language_code == code && l.id != id)
        {
            return Err(Error::InvalidInput(format!(
                "Language code '{}' already exists",
                code
            )));
        }

        match data.languages.iter_mut().find(|l| l.id == id) {
            Some(language) => {
                language.language_code = code.to_string();
                language.language_name = name.to_string();
                Ok(())
            }
            None => Err(Error::NotFound(format!("Language {} not found", id))),
        }
    }

    /// Remove a language and return its gold datasets so the caller can
    /// unlink their files
    pub fn delete_language(&self, id: i64) -> Result<Vec<GoldDataset>> {
        let mut data = self.lock();
        if !data.languages.iter().any(|l| l.id == id) {
            return Err(Error::NotFound(format!("Language {} not found", id)));
        }

        let removed: Vec<GoldDataset> = data
            .datasets
            .iter()
            .filter(|d| d.language_id == id)
            .cloned()
            .collect();
        data.datasets.retain(|d| d.language_id != id);
        data.languages.retain(|l| l.id != id);
        Ok(removed)
    }

    /// Most recent gold dataset for a language
    pub fn find_gold_dataset(&self, language_id: i64) -> Option<GoldDataset> {
        let data = self.lock();
        data.datasets
            .iter()
            .rev()
            .find(|d| d.language_id == language_id)
            .cloned()
    }

    pub fn add_gold_dataset(
        &self,
        language_id: i64,
        filename: &str,
        file_path: &str,
        uploaded_by: &str,
    ) -> GoldDataset {
        let mut data = self.lock();
        let id = data.datasets.iter().map(|d| d.id).max().unwrap_or(0) + 1;
        let dataset = GoldDataset {
            id,
            language_id,
            language_name: data.language_name(language_id),
            filename: filename.to_string(),
            file_path: file_path.to_string(),
            uploaded_by: uploaded_by.to_string(),
            created_at: now_string(),
        };
        data.datasets.push(dataset.clone());
        info!("Gold dataset {} added to demo store", filename);
        dataset
    }

    /// Remove and return a gold dataset
    pub fn remove_gold_dataset(&self, id: i64) -> Result<GoldDataset> {
        let mut data = self.lock();
        let index = data
            .datasets
            .iter()
            .position(|d| d.id == id)
            .ok_or_else(|| Error::NotFound(format!("Gold dataset {} not found", id)))?;
        Ok(data.datasets.remove(index))
    }

    pub fn list_gold_datasets(&self) -> Vec<GoldDataset> {
        let mut datasets = self.lock().datasets.clone();
        datasets.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        datasets
    }

    pub fn save_evaluation(
        &self,
        user_id: i64,
        language_id: i64,
        uploaded_filename: &str,
        file_path: &str,
        scores: &ScoreSet,
    ) {
        let mut data = self.lock();
        let id = data.evaluations.iter().map(|e| e.id).max().unwrap_or(0) + 1;
        let get = |m: Metric| scores.get(m);

        let record = EvaluationRecord {
            id,
            user_id,
            language_id,
            language_name: data.language_name(language_id),
            uploaded_filename: uploaded_filename.to_string(),
            file_path: file_path.to_string(),
            muc_recall: get(Metric::Muc).map(|s| s.recall),
            muc_precision: get(Metric::Muc).map(|s| s.precision),
            muc_f1: get(Metric::Muc).map(|s| s.f1),
            bcub_recall: get(Metric::Bcub).map(|s| s.recall),
            bcub_precision: get(Metric::Bcub).map(|s| s.precision),
            bcub_f1: get(Metric::Bcub).map(|s| s.f1),
            ceafm_recall: get(Metric::Ceafm).map(|s| s.recall),
            ceafm_precision: get(Metric::Ceafm).map(|s| s.precision),
            ceafm_f1: get(Metric::Ceafm).map(|s| s.f1),
            ceafe_recall: get(Metric::Ceafe).map(|s| s.recall),
            ceafe_precision: get(Metric::Ceafe).map(|s| s.precision),
            ceafe_f1: get(Metric::Ceafe).map(|s| s.f1),
            blanc_recall: get(Metric::Blanc).map(|s| s.recall),
            blanc_precision: get(Metric::Blanc).map(|s| s.precision),
            blanc_f1: get(Metric::Blanc).map(|s| s.f1),
            created_at: now_string(),
        };
        data.evaluations.push(record);
        info!("Evaluation results saved to demo store (ID: {})", id);
    }

    pub fn user_history(&self, user_id: i64) -> Vec<EvaluationRecord> {
        let data = self.lock();
        let mut history: Vec<EvaluationRecord> = data
            .evaluations
            .iter()
            .filter(|e| e.user_id == user_id)
            .cloned()
            .collect();
        history.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        history.truncate(20);
        history
    }

    /// Demo statistics: participants are the non-admin demo accounts
    pub fn statistics(&self) -> Statistics {
        let data = self.lock();
        Statistics {
            total_languages: data.languages.len() as i64,
            total_participants: data.users.iter().filter(|u| u.username != "admin").count() as i64,
            total_evaluations: data.evaluations.len() as i64,
        }
    }

    pub fn leaderboards(&self) -> Vec<LanguageLeaderboard> {
        let data = self.lock();
        let mut languages = data.languages.clone();
        languages.sort_by(|a, b| a.language_name.cmp(&b.language_name));

        languages
            .into_iter()
            .map(|language| {
                let mut scores: Vec<LeaderboardEntry> = data
                    .evaluations
                    .iter()
                    .filter(|e| e.language_id == language.id)
                    .filter_map(|e| {
                        let user = data.users.iter().find(|u| u.id == e.user_id)?;
                        if !user.is_active {
                            return None;
                        }
                        Some(LeaderboardEntry {
                            username: user.username.clone(),
                            muc_f1: e.muc_f1,
                            bcub_f1: e.bcub_f1,
                            ceafm_f1: e.ceafm_f1,
                            ceafe_f1: e.ceafe_f1,
                            blanc_f1: e.blanc_f1,
                            avg_f1: average_f1(e.muc_f1, e.bcub_f1, e.ceafm_f1, e.blanc_f1),
                            created_at: e.created_at.clone(),
                        })
                    })
                    .collect();
                scores.sort_by(|a, b| b.avg_f1.total_cmp(&a.avg_f1));

                LanguageLeaderboard {
                    language_id: language.id,
                    language_code: language.language_code,
                    language_name: language.language_name,
                    scores,
                }
            })
            .collect()
    }
}
