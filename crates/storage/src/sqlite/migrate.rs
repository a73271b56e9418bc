use chrono::Utc;
use sqlx::SqlitePool;

use super::SqliteInitError;

/// Runs a single, consolidated migration for the current schema.
///
/// Creates topics, categories, content nodes, progress marks, characters,
/// roles and their lookup indexes.
#[allow(clippy::too_many_lines)]
pub async fn run_migrations(pool: &SqlitePool) -> Result<(), SqliteInitError> {
    async fn is_applied(pool: &SqlitePool, version: i64) -> Result<bool, sqlx::Error> {
        let row = sqlx::query("SELECT 1 FROM schema_migrations WHERE version = ?1")
            .bind(version)
            .fetch_optional(pool)
            .await?;
        Ok(row.is_some())
    }

    sqlx::query(
        r"
            CREATE TABLE IF NOT EXISTS schema_migrations (
                version INTEGER PRIMARY KEY,
                applied_at TEXT NOT NULL
            );
            ",
    )
    .execute(pool)
    .await?;

    // Version 1: full schema.
    if !is_applied(pool, 1).await? {
        let mut tx = pool.begin().await?;

        sqlx::query(
            r"
                CREATE TABLE IF NOT EXISTS main_topics (
                    id TEXT PRIMARY KEY,
                    title TEXT,
                    description TEXT,
                    display_order INTEGER,
                    is_active INTEGER,
                    image_url TEXT,
                    instructor TEXT,
                    difficulty_level TEXT,
                    duration_weeks INTEGER,
                    background_color TEXT,
                    created_at TEXT NOT NULL
                );
            ",
        )
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r"
                CREATE TABLE IF NOT EXISTS categories (
                    id TEXT PRIMARY KEY,
                    main_topic_id TEXT NOT NULL,
                    title TEXT,
                    description TEXT,
                    image_url TEXT,
                    display_order INTEGER,
                    is_active INTEGER,
                    FOREIGN KEY (main_topic_id) REFERENCES main_topics(id) ON DELETE CASCADE
                );
            ",
        )
        .execute(&mut *tx)
        .await?;

        // parent_id points at a category or a content row depending on
        // parent_type, so it carries no foreign key.
        sqlx::query(
            r"
                CREATE TABLE IF NOT EXISTS content (
                    id TEXT PRIMARY KEY,
                    main_topic_id TEXT NOT NULL,
                    title TEXT,
                    description TEXT,
                    content_type TEXT,
                    parent_type TEXT,
                    parent_id TEXT,
                    display_order INTEGER,
                    is_active INTEGER,
                    body_content TEXT,
                    bible_references TEXT,
                    FOREIGN KEY (main_topic_id) REFERENCES main_topics(id) ON DELETE CASCADE
                );
            ",
        )
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r"
                CREATE TABLE IF NOT EXISTS user_progress (
                    id INTEGER PRIMARY KEY,
                    user_id TEXT NOT NULL,
                    main_topic_id TEXT NOT NULL,
                    lesson_id TEXT,
                    completed_at TEXT,
                    progress_percentage INTEGER,
                    notes TEXT,
                    UNIQUE (user_id, lesson_id)
                );
            ",
        )
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r"
                CREATE TABLE IF NOT EXISTS bible_characters (
                    id TEXT PRIMARY KEY,
                    name TEXT NOT NULL,
                    testament TEXT NOT NULL,
                    category TEXT,
                    description TEXT,
                    story_summary TEXT,
                    key_verses TEXT,
                    image_url TEXT,
                    created_at TEXT NOT NULL
                );
            ",
        )
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r"
                CREATE TABLE IF NOT EXISTS user_roles (
                    user_id TEXT NOT NULL,
                    role TEXT NOT NULL,
                    PRIMARY KEY (user_id, role)
                );
            ",
        )
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r"
                CREATE INDEX IF NOT EXISTS idx_categories_topic_order
                    ON categories (main_topic_id, display_order);
            ",
        )
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r"
                CREATE INDEX IF NOT EXISTS idx_content_topic_parent
                    ON content (main_topic_id, parent_id);
            ",
        )
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r"
                CREATE INDEX IF NOT EXISTS idx_user_progress_user_topic
                    ON user_progress (user_id, main_topic_id);
            ",
        )
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r"
                INSERT INTO schema_migrations (version, applied_at)
                VALUES (?1, ?2)
                ON CONFLICT(version) DO NOTHING
            ",
        )
        .bind(1_i64)
        .bind(Utc::now())
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        tracing::info!(version = 1, "applied schema migration");
    }

    Ok(())
}
