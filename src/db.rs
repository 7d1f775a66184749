use anyhow::{Context, Result};
use chrono::Utc;
use serde::Serialize;
use sqlx::{sqlite::SqlitePoolOptions, Row, SqlitePool};
use tracing::info;

/// A guestbook message as shown to visitors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GuestbookEntry {
    pub id: i64,
    pub name: String,
    pub content: String,
    pub created_at: String,
}

/// A guestbook message as shown to the admin, including moderation state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModeratedEntry {
    pub id: i64,
    pub name: String,
    pub content: String,
    pub created_at: String,
    /// 1 if shown to visitors, 0 if hidden
    pub visible: i64,
}

#[derive(Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Connect to the database and bring the schema up to date.
    ///
    /// `database_url` is a sqlx SQLite URL, e.g. `sqlite:data/guestbook.db?mode=rwc`.
    pub async fn connect(database_url: &str) -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect(database_url)
            .await
            .context(format!("Failed to open database at {}", database_url))?;

        let db = Self { pool };
        db.migrate().await?;
        Ok(db)
    }

    /// Create the guestbook table, or add the `visible` column to older databases.
    async fn migrate(&self) -> Result<()> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS guestbook (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT,
                content TEXT,
                timestamp DATETIME
            )",
        )
        .execute(&self.pool)
        .await
        .context("Failed to create guestbook table")?;

        if !self.has_visible_column().await? {
            info!("Migrating database: adding 'visible' column");
            sqlx::query("ALTER TABLE guestbook ADD COLUMN visible INTEGER DEFAULT 1")
                .execute(&self.pool)
                .await
                .context("Failed to add visible column")?;
        }

        Ok(())
    }

    async fn has_visible_column(&self) -> Result<bool> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM pragma_table_info('guestbook') WHERE name = 'visible'",
        )
        .fetch_one(&self.pool)
        .await
        .context("Failed to inspect guestbook schema")?;

        Ok(count > 0)
    }

    /// Add a visible entry and return its id.
    pub async fn add_entry(&self, name: &str, content: &str) -> Result<i64, sqlx::Error> {
        let timestamp = Utc::now().format("%Y-%m-%d %H:%M:%S%.6f").to_string();

        let result = sqlx::query(
            "INSERT INTO guestbook (name, content, timestamp, visible) VALUES (?, ?, ?, 1)",
        )
        .bind(name)
        .bind(content)
        .bind(&timestamp)
        .execute(&self.pool)
        .await?;

        Ok(result.last_insert_rowid())
    }

    /// Visible entries, newest first.
    pub async fn list_visible(&self) -> Result<Vec<GuestbookEntry>, sqlx::Error> {
        let rows = sqlx::query(
            "SELECT id, name, content, CAST(timestamp AS TEXT) AS created_at
             FROM guestbook WHERE visible = 1 ORDER BY id DESC",
        )
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| -> Result<GuestbookEntry, sqlx::Error> {
                Ok(GuestbookEntry {
                    id: row.try_get("id")?,
                    name: row.try_get::<Option<String>, _>("name")?.unwrap_or_default(),
                    content: row.try_get::<Option<String>, _>("content")?.unwrap_or_default(),
                    created_at: row
                        .try_get::<Option<String>, _>("created_at")?
                        .unwrap_or_default(),
                })
            })
            .collect()
    }

    /// Every entry including hidden ones, newest first.
    pub async fn list_all(&self) -> Result<Vec<ModeratedEntry>, sqlx::Error> {
        let rows = sqlx::query(
            "SELECT id, name, content, CAST(timestamp AS TEXT) AS created_at, visible
             FROM guestbook ORDER BY id DESC",
        )
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| -> Result<ModeratedEntry, sqlx::Error> {
                Ok(ModeratedEntry {
                    id: row.try_get("id")?,
                    name: row.try_get::<Option<String>, _>("name")?.unwrap_or_default(),
                    content: row.try_get::<Option<String>, _>("content")?.unwrap_or_default(),
                    created_at: row
                        .try_get::<Option<String>, _>("created_at")?
                        .unwrap_or_default(),
                    visible: row.try_get::<Option<i64>, _>("visible")?.unwrap_or(1),
                })
            })
            .collect()
    }

    /// Set an entry's visibility. Returns false if no entry has that id.
    pub async fn set_visible(&self, id: i64, visible: i64) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("UPDATE guestbook SET visible = ? WHERE id = ?")
            .bind(visible)
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
