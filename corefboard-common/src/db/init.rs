//! Database initialization
//!
//! Creates the SQLite database on first run, applies the schema
//! idempotently and seeds the default accounts the login bootstrap
//! expects. All statements are safe to run against an existing database.

use crate::Result;
use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};
use std::path::Path;
use tracing::info;

/// Initialize database connection and create tables if needed
pub async fn init_database(db_path: &Path) -> Result<SqlitePool> {
    let newly_created = !db_path.exists();

    // Create parent directory if it doesn't exist
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let db_url = format!("sqlite://{}?mode=rwc", db_path.display());
    let pool = SqlitePoolOptions::new()
        .max_connections(10)
        .connect(&db_url)
        .await?;

    if newly_created {
        info!("Initialized new database: {}", db_path.display());
    } else {
        info!("Opened existing database: {}", db_path.display());
    }

    // Enable foreign keys
    sqlx::query("PRAGMA foreign_keys = ON").execute(&pool).await?;

    // WAL mode allows concurrent readers with one writer
    sqlx::query("PRAGMA journal_mode = WAL").execute(&pool).await?;

    sqlx::query("PRAGMA busy_timeout = 5000").execute(&pool).await?;

    create_users_table(&pool).await?;
    create_languages_table(&pool).await?;
    create_gold_datasets_table(&pool).await?;
    create_user_evaluations_table(&pool).await?;

    seed_default_accounts(&pool).await?;
    seed_default_language(&pool).await?;

    Ok(pool)
}

async fn create_users_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS users (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            username TEXT NOT NULL UNIQUE,
            password_hash TEXT NOT NULL,
            email TEXT NOT NULL,
            is_active INTEGER NOT NULL DEFAULT 1
        )
        "#,
    )
    .execute(pool)
    .await?;
    Ok(())
}

async fn create_languages_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS languages (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            language_code TEXT NOT NULL UNIQUE,
            language_name TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;
    Ok(())
}

async fn create_gold_datasets_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS gold_datasets (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            language_id INTEGER NOT NULL REFERENCES languages(id),
            filename TEXT NOT NULL,
            file_path TEXT NOT NULL,
            uploaded_by TEXT NOT NULL,
            created_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%d %H:%M:%S', 'now'))
        )
        "#,
    )
    .execute(pool)
    .await?;
    Ok(())
}

async fn create_user_evaluations_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS user_evaluations (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id INTEGER NOT NULL REFERENCES users(id),
            language_id INTEGER NOT NULL REFERENCES languages(id),
            uploaded_filename TEXT NOT NULL,
            file_path TEXT NOT NULL,
            muc_recall REAL, muc_precision REAL, muc_f1 REAL,
            bcub_recall REAL, bcub_precision REAL, bcub_f1 REAL,
            ceafm_recall REAL, ceafm_precision REAL, ceafm_f1 REAL,
            ceafe_recall REAL, ceafe_precision REAL, ceafe_f1 REAL,
            blanc_recall REAL, blanc_precision REAL, blanc_f1 REAL,
            created_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%d %H:%M:%S', 'now'))
        )
        "#,
    )
    .execute(pool)
    .await?;
    Ok(())
}

/// Seed the default admin and test accounts when the users table is empty
async fn seed_default_accounts(pool: &SqlitePool) -> Result<()> {
    let user_count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
        .fetch_one(pool)
        .await?;

    if user_count > 0 {
        return Ok(());
    }

    let admin_hash = bcrypt::hash("admin123", bcrypt::DEFAULT_COST)
        .map_err(|e| crate::Error::Internal(format!("bcrypt failure: {}", e)))?;
    let user_hash = bcrypt::hash("user123", bcrypt::DEFAULT_COST)
        .map_err(|e| crate::Error::Internal(format!("bcrypt failure: {}", e)))?;

    sqlx::query("INSERT INTO users (username, password_hash, email, is_active) VALUES (?, ?, ?, 1)")
        .bind("admin")
        .bind(&admin_hash)
        .bind("admin@test.com")
        .execute(pool)
        .await?;

    sqlx::query("INSERT INTO users (username, password_hash, email, is_active) VALUES (?, ?, ?, 1)")
        .bind("testuser")
        .bind(&user_hash)
        .bind("user@test.com")
        .execute(pool)
        .await?;

    info!("Seeded default accounts (admin, testuser)");
    Ok(())
}

/// Seed the initial language when the languages table is empty
async fn seed_default_language(pool: &SqlitePool) -> Result<()> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM languages")
        .fetch_one(pool)
        .await?;

    if count == 0 {
        sqlx::query("INSERT INTO languages (language_code, language_name) VALUES ('hi', 'Hindi')")
            .execute(pool)
            .await?;
        info!("Seeded default language (hi)");
    }

    Ok(())
}
