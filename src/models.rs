use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Body of `POST /api/uploadEmailConfig`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTemplate {
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub footer: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub styles: Option<Value>,
}

/// A saved template as returned by `GET /api/templates`.
///
/// Field names on the wire follow the `templates` table columns.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Template {
    pub id: i64,
    pub title: String,
    pub content: String,
    pub footer: Option<String>,
    #[serde(rename = "imageUrl")]
    pub image_url: Option<String>,
    pub styles: Option<Value>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(sqlx::FromRow)]
pub struct TemplateRow {
    pub id: i64,
    pub title: String,
    pub content: String,
    pub footer: Option<String>,
    #[sqlx(rename = "imageUrl")]
    pub image_url: Option<String>,
    pub styles: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<TemplateRow> for Template {
    fn from(row: TemplateRow) -> Self {
        Template {
            id: row.id,
            title: row.title,
            content: row.content,
            footer: row.footer,
            image_url: row.image_url,
            styles: row.styles.as_deref().map(expand_styles),
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

// Rows written by other tools may hold text that isn't JSON; hand it back
// as a plain string instead of failing the whole listing.
fn expand_styles(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    pub image_url: String,
}

#[derive(Serialize)]
pub struct SavedResponse {
    pub id: i64,
}
