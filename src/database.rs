use std::str::FromStr;
use std::time::Duration;

use chrono::Utc;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};

use crate::models::{NewTemplate, Template, TemplateRow};

/// Handle to the `templates` table.
///
/// Opened once at startup and shared through the router state; cloning is
/// cheap since the pool is reference counted.
#[derive(Clone, Debug)]
pub struct TemplateStore {
    pool: SqlitePool,
}

impl TemplateStore {
    pub async fn connect(database_url: &str) -> Result<Self, sqlx::Error> {
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(
                SqliteConnectOptions::from_str(database_url)?
                    .create_if_missing(true)
                    .journal_mode(SqliteJournalMode::Wal)
                    .busy_timeout(Duration::from_secs(30)),
            )
            .await?;

        Ok(Self { pool })
    }

    /// Creates the `templates` table if it doesn't exist yet.
    pub async fn initialize(&self) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS templates (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                title TEXT NOT NULL,
                content TEXT NOT NULL,
                footer TEXT,
                imageUrl TEXT,
                styles TEXT,
                created_at DATETIME NOT NULL,
                updated_at DATETIME NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    pub async fn insert(&self, template: &NewTemplate) -> Result<i64, sqlx::Error> {
        let styles = template
            .styles
            .as_ref()
            .map(serde_json::to_string)
            .transpose()
            .map_err(|e| sqlx::Error::Encode(Box::new(e)))?;
        let now = Utc::now();

        let result = sqlx::query(
            r#"
            INSERT INTO templates (title, content, footer, imageUrl, styles, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&template.title)
        .bind(&template.content)
        .bind(&template.footer)
        .bind(&template.image_url)
        .bind(styles)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(result.last_insert_rowid())
    }

    /// Every saved template, newest first.
    pub async fn list_all(&self) -> Result<Vec<Template>, sqlx::Error> {
        let rows = sqlx::query_as::<_, TemplateRow>(
            "SELECT * FROM templates ORDER BY created_at DESC, id DESC",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Template::from).collect())
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }
}
