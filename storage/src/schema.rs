//! Table definitions. Idempotent; run once per pool.

use sqlx::SqlitePool;
use tracing::info;

const STATEMENTS: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS user_settings (
        user_id        INTEGER PRIMARY KEY,
        username       TEXT,
        first_name     TEXT,
        token          TEXT,
        extractor_bot  TEXT NOT NULL,
        uploader_bot   TEXT NOT NULL,
        uploader_cmd   TEXT,
        credit_name    TEXT,
        is_subscribed  INTEGER NOT NULL DEFAULT 0,
        sub_expiry     TEXT,
        is_sudo        INTEGER NOT NULL DEFAULT 0,
        is_banned      INTEGER NOT NULL DEFAULT 0,
        created_at     TEXT NOT NULL,
        updated_at     TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS user_batches (
        id          INTEGER PRIMARY KEY AUTOINCREMENT,
        user_id     INTEGER NOT NULL,
        batch_name  TEXT NOT NULL,
        created_at  TEXT NOT NULL,
        UNIQUE(user_id, batch_name)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS user_channels (
        id            INTEGER PRIMARY KEY AUTOINCREMENT,
        user_id       INTEGER NOT NULL,
        channel_id    TEXT NOT NULL,
        channel_name  TEXT NOT NULL DEFAULT '',
        created_at    TEXT NOT NULL,
        UNIQUE(user_id, channel_id)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS jobs (
        id                INTEGER PRIMARY KEY AUTOINCREMENT,
        user_id           INTEGER NOT NULL,
        batch_name        TEXT NOT NULL,
        channel_id        TEXT NOT NULL,
        status            TEXT NOT NULL DEFAULT 'pending',
        videos_forwarded  INTEGER NOT NULL DEFAULT 0,
        pdfs_forwarded    INTEGER NOT NULL DEFAULT 0,
        error_msg         TEXT,
        started_at        TEXT NOT NULL,
        finished_at       TEXT
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_jobs_user_id ON jobs(user_id)",
    "CREATE INDEX IF NOT EXISTS idx_jobs_status ON jobs(status)",
];

pub(crate) async fn ensure_schema(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    for statement in STATEMENTS {
        sqlx::query(statement).execute(pool).await?;
    }
    info!("Database tables ready");
    Ok(())
}
