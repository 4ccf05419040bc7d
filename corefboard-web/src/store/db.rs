//! Backing-store (SQLite) operations
//!
//! Every function here returns the common error type; only the
//! `Database` variant is eligible for demo-store fallback. Validation
//! rejections and not-found results are final answers.

use corefboard_common::db::{
    BestScore, EvaluationRecord, GoldDataset, Language, LanguageLeaderboard, LeaderboardEntry,
    Statistics, User,
};
use corefboard_common::metrics::{Metric, ScoreSet};
use corefboard_common::{Error, Result};
use sqlx::SqlitePool;

pub async fn find_active_user(pool: &SqlitePool, username: &str) -> Result<Option<User>> {
    let user = sqlx::query_as::<_, User>(
        "SELECT id, username, password_hash, email, is_active FROM users \
         WHERE username = ? AND is_active = 1",
    )
    .bind(username)
    .fetch_optional(pool)
    .await?;
    Ok(user)
}

pub async fn add_user(
    pool: &SqlitePool,
    username: &str,
    email: &str,
    password_hash: &str,
) -> Result<User> {
    let existing: Option<i64> = sqlx::query_scalar("SELECT id FROM users WHERE username = ?")
        .bind(username)
        .fetch_optional(pool)
        .await?;
    if existing.is_some() {
        return Err(Error::InvalidInput(format!(
            "Username '{}' already exists",
            username
        )));
    }

    let result =
        sqlx::query("INSERT INTO users (username, password_hash, email, is_active) VALUES (?, ?, ?, 1)")
            .bind(username)
            .bind(password_hash)
            .bind(email)
            .execute(pool)
            .await?;

    Ok(User {
        id: result.last_insert_rowid(),
        username: username.to_string(),
        password_hash: password_hash.to_string(),
        email: email.to_string(),
        is_active: true,
    })
}

pub async fn list_languages(pool: &SqlitePool) -> Result<Vec<Language>> {
    let languages = sqlx::query_as::<_, Language>(
        "SELECT id, language_code, language_name FROM languages ORDER BY language_name",
    )
    .fetch_all(pool)
    .await?;
    Ok(languages)
}

pub async fn add_language(pool: &SqlitePool, code: &str, name: &str) -> Result<Language> {
    let existing: Option<i64> =
        sqlx::query_scalar("SELECT id FROM languages WHERE language_code = ?")
            .bind(code)
            .fetch_optional(pool)
            .await?;
    if existing.is_some() {
        return Err(Error::InvalidInput(format!(
            "Language code '{}' already exists",
            code
        )));
    }

    let result = sqlx::query("INSERT INTO languages (language_code, language_name) VALUES (?, ?)")
        .bind(code)
        .bind(name)
        .execute(pool)
        .await?;

    Ok(Language {
        id: result.last_insert_rowid(),
        language_code: code.to_string(),
        language_name: name.to_string(),
    })
}

pub async fn update_language(pool: &SqlitePool, id: i64, code: &str, name: &str) -> Result<()> {
    let clash: Option<i64> =
        sqlx::query_scalar("SELECT id FROM languages WHERE language_code = ? AND id != ?")
            .bind(code)
            .bind(id)
            .fetch_optional(pool)
            .await?;
    if clash.is_some() {
        return Err(Error::InvalidInput(format!(
            "Language code '{}' already exists",
            code
        )));
    }

    let result = sqlx::query("UPDATE languages SET language_code = ?, language_name = ? WHERE id = ?")
        .bind(code)
        .bind(name)
        .bind(id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(Error::NotFound(format!("Language {} not found", id)));
    }
    Ok(())
}

/// Gold dataset rows for one language, fetched before a cascade delete
/// so their files can be unlinked afterwards
pub async fn gold_datasets_for_language(
    pool: &SqlitePool,
    language_id: i64,
) -> Result<Vec<GoldDataset>> {
    let datasets = sqlx::query_as::<_, GoldDataset>(
        "SELECT gd.id, gd.language_id, NULL AS language_name, gd.filename, gd.file_path, \
                gd.uploaded_by, gd.created_at \
         FROM gold_datasets gd WHERE gd.language_id = ?",
    )
    .bind(language_id)
    .fetch_all(pool)
    .await?;
    Ok(datasets)
}

/// Delete a language together with its gold datasets
pub async fn delete_language(pool: &SqlitePool, id: i64) -> Result<()> {
    sqlx::query("DELETE FROM gold_datasets WHERE language_id = ?")
        .bind(id)
        .execute(pool)
        .await?;

    let result = sqlx::query("DELETE FROM languages WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(Error::NotFound(format!("Language {} not found", id)));
    }
    Ok(())
}

/// Most recent gold dataset for a language, if any
pub async fn find_gold_dataset(pool: &SqlitePool, language_id: i64) -> Result<Option<GoldDataset>> {
    let dataset = sqlx::query_as::<_, GoldDataset>(
        "SELECT gd.id, gd.language_id, NULL AS language_name, gd.filename, gd.file_path, \
                gd.uploaded_by, gd.created_at \
         FROM gold_datasets gd WHERE gd.language_id = ? \
         ORDER BY gd.created_at DESC, gd.id DESC LIMIT 1",
    )
    .bind(language_id)
    .fetch_optional(pool)
    .await?;
    Ok(dataset)
}

pub async fn get_gold_dataset(pool: &SqlitePool, id: i64) -> Result<Option<GoldDataset>> {
    let dataset = sqlx::query_as::<_, GoldDataset>(
        "SELECT gd.id, gd.language_id, NULL AS language_name, gd.filename, gd.file_path, \
                gd.uploaded_by, gd.created_at \
         FROM gold_datasets gd WHERE gd.id = ?",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;
    Ok(dataset)
}

pub async fn add_gold_dataset(
    pool: &SqlitePool,
    language_id: i64,
    filename: &str,
    file_path: &str,
    uploaded_by: &str,
) -> Result<GoldDataset> {
    let result = sqlx::query(
        "INSERT INTO gold_datasets (language_id, filename, file_path, uploaded_by) VALUES (?, ?, ?, ?)",
    )
    .bind(language_id)
    .bind(filename)
    .bind(file_path)
    .bind(uploaded_by)
    .execute(pool)
    .await?;

    let id = result.last_insert_rowid();
    get_gold_dataset(pool, id)
        .await?
        .ok_or_else(|| Error::Internal("Gold dataset vanished after insert".to_string()))
}

pub async fn delete_gold_dataset(pool: &SqlitePool, id: i64) -> Result<()> {
    let result = sqlx::query("DELETE FROM gold_datasets WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(Error::NotFound(format!("Gold dataset {} not found", id)));
    }
    Ok(())
}

pub async fn list_gold_datasets(pool: &SqlitePool) -> Result<Vec<GoldDataset>> {
    let datasets = sqlx::query_as::<_, GoldDataset>(
        "SELECT gd.id, gd.language_id, l.language_name AS language_name, gd.filename, \
                gd.file_path, gd.uploaded_by, gd.created_at \
         FROM gold_datasets gd JOIN languages l ON gd.language_id = l.id \
         ORDER BY gd.created_at DESC, gd.id DESC",
    )
    .fetch_all(pool)
    .await?;
    Ok(datasets)
}

pub async fn save_evaluation(
    pool: &SqlitePool,
    user_id: i64,
    language_id: i64,
    uploaded_filename: &str,
    file_path: &str,
    scores: &ScoreSet,
) -> Result<()> {
    let triple = |metric: Metric| {
        let s = scores.get(metric);
        (
            s.map(|s| s.recall),
            s.map(|s| s.precision),
            s.map(|s| s.f1),
        )
    };
    let muc = triple(Metric::Muc);
    let bcub = triple(Metric::Bcub);
    let ceafm = triple(Metric::Ceafm);
    let ceafe = triple(Metric::Ceafe);
    let blanc = triple(Metric::Blanc);

    sqlx::query(
        "INSERT INTO user_evaluations ( \
            user_id, language_id, uploaded_filename, file_path, \
            muc_recall, muc_precision, muc_f1, \
            bcub_recall, bcub_precision, bcub_f1, \
            ceafm_recall, ceafm_precision, ceafm_f1, \
            ceafe_recall, ceafe_precision, ceafe_f1, \
            blanc_recall, blanc_precision, blanc_f1 \
        ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(user_id)
    .bind(language_id)
    .bind(uploaded_filename)
    .bind(file_path)
    .bind(muc.0)
    .bind(muc.1)
    .bind(muc.2)
    .bind(bcub.0)
    .bind(bcub.1)
    .bind(bcub.2)
    .bind(ceafm.0)
    .bind(ceafm.1)
    .bind(ceafm.2)
    .bind(ceafe.0)
    .bind(ceafe.1)
    .bind(ceafe.2)
    .bind(blanc.0)
    .bind(blanc.1)
    .bind(blanc.2)
    .execute(pool)
    .await?;

    Ok(())
}

pub async fn user_history(pool: &SqlitePool, user_id: i64) -> Result<Vec<EvaluationRecord>> {
    let history = sqlx::query_as::<_, EvaluationRecord>(
        "SELECT ue.*, l.language_name AS language_name \
         FROM user_evaluations ue JOIN languages l ON ue.language_id = l.id \
         WHERE ue.user_id = ? \
         ORDER BY ue.created_at DESC, ue.id DESC LIMIT 20",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;
    Ok(history)
}

pub async fn statistics(pool: &SqlitePool) -> Result<Statistics> {
    let total_languages: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM languages")
        .fetch_one(pool)
        .await?;
    let total_participants: i64 =
        sqlx::query_scalar("SELECT COUNT(DISTINCT user_id) FROM user_evaluations")
            .fetch_one(pool)
            .await?;
    let total_evaluations: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM user_evaluations")
        .fetch_one(pool)
        .await?;

    Ok(Statistics {
        total_languages,
        total_participants,
        total_evaluations,
    })
}

/// Per-language leaderboards: evaluations of active users, sorted by
/// average F1 descending. CEAF-e is excluded from the average and the
/// divisor stays at 4.
pub async fn leaderboards(pool: &SqlitePool) -> Result<Vec<LanguageLeaderboard>> {
    let languages = list_languages(pool).await?;
    let mut boards = Vec::with_capacity(languages.len());

    for language in languages {
        let scores = sqlx::query_as::<_, LeaderboardEntry>(
            "SELECT u.username, ue.muc_f1, ue.bcub_f1, ue.ceafm_f1, ue.ceafe_f1, ue.blanc_f1, \
                    ((COALESCE(ue.muc_f1, 0) + COALESCE(ue.bcub_f1, 0) + \
                      COALESCE(ue.ceafm_f1, 0) + COALESCE(ue.blanc_f1, 0)) / 4.0) AS avg_f1, \
                    ue.created_at \
             FROM user_evaluations ue JOIN users u ON ue.user_id = u.id \
             WHERE ue.language_id = ? AND u.is_active = 1 \
             ORDER BY avg_f1 DESC",
        )
        .bind(language.id)
        .fetch_all(pool)
        .await?;

        boards.push(LanguageLeaderboard {
            language_id: language.id,
            language_code: language.language_code,
            language_name: language.language_name,
            scores,
        });
    }

    Ok(boards)
}

/// Each active user's best submission per language
pub async fn best_scores_per_language(pool: &SqlitePool) -> Result<Vec<BestScore>> {
    let best = sqlx::query_as::<_, BestScore>(
        "SELECT ue.user_id, ue.language_id, u.username, l.language_name, l.language_code, \
                MAX(COALESCE(ue.muc_f1, 0)) AS best_muc_f1, \
                MAX(COALESCE(ue.bcub_f1, 0)) AS best_bcub_f1, \
                MAX(COALESCE(ue.ceafm_f1, 0)) AS best_ceafm_f1, \
                MAX(COALESCE(ue.ceafe_f1, 0)) AS best_ceafe_f1, \
                MAX(COALESCE(ue.blanc_f1, 0)) AS best_blanc_f1, \
                MAX((COALESCE(ue.muc_f1, 0) + COALESCE(ue.bcub_f1, 0) + \
                     COALESCE(ue.ceafm_f1, 0) + COALESCE(ue.blanc_f1, 0)) / 4.0) AS best_avg_f1, \
                MAX(ue.created_at) AS latest_submission \
         FROM user_evaluations ue \
         JOIN users u ON ue.user_id = u.id \
         JOIN languages l ON ue.language_id = l.id \
         WHERE u.is_active = 1 \
         GROUP BY ue.user_id, ue.language_id, u.username, l.language_name, l.language_code \
         ORDER BY l.language_name, best_avg_f1 DESC",
    )
    .fetch_all(pool)
    .await?;
    Ok(best)
}
