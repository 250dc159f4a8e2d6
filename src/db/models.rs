//! Row structs mirroring the four tables, manual row mapping, and the
//! typed request payloads the admin API accepts.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::Row;
use sqlx::mysql::MySqlRow;

use crate::db::pool::SqlQuery;

#[derive(Debug, Clone, Serialize)]
pub struct Project {
    pub id: i32,
    pub title: String,
    pub category: Option<String>,
    pub description: String,
    pub technologies: Option<String>,
    pub client: Option<String>,
    pub project_date: Option<NaiveDate>,
    pub project_url: Option<String>,
    pub image_url: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

pub fn row_to_project(row: &MySqlRow) -> Result<Project, sqlx::Error> {
    Ok(Project {
        id: row.try_get("id")?,
        title: row.try_get("title")?,
        category: row.try_get("category")?,
        description: row.try_get("description")?,
        technologies: row.try_get("technologies")?,
        client: row.try_get("client")?,
        project_date: row.try_get("project_date")?,
        project_url: row.try_get("project_url")?,
        image_url: row.try_get("image_url")?,
        is_active: row.try_get::<Option<bool>, _>("is_active")?.unwrap_or(true),
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

#[derive(Debug, Clone, Serialize)]
pub struct ProjectRequest {
    pub id: i32,
    pub name: String,
    pub email: String,
    pub project_type: Option<String>,
    pub description: String,
    pub status: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

pub fn row_to_project_request(row: &MySqlRow) -> Result<ProjectRequest, sqlx::Error> {
    Ok(ProjectRequest {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        email: row.try_get("email")?,
        project_type: row.try_get("project_type")?,
        description: row.try_get("description")?,
        status: row.try_get("status")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

/// Admin account row. The hash never leaves this struct: API responses use
/// [`AdminUser::profile`].
#[derive(Debug, Clone)]
pub struct AdminUser {
    pub id: i32,
    pub username: String,
    pub password_hash: String,
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub role: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AdminProfile {
    pub id: i32,
    pub username: String,
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub role: Option<String>,
}

impl AdminUser {
    pub fn profile(&self) -> AdminProfile {
        AdminProfile {
            id: self.id,
            username: self.username.clone(),
            full_name: self.full_name.clone(),
            email: self.email.clone(),
            role: self.role.clone(),
        }
    }
}

pub fn row_to_admin_user(row: &MySqlRow) -> Result<AdminUser, sqlx::Error> {
    Ok(AdminUser {
        id: row.try_get("id")?,
        username: row.try_get("username")?,
        password_hash: row.try_get("password_hash")?,
        full_name: row.try_get("full_name")?,
        email: row.try_get("email")?,
        role: row.try_get("role")?,
    })
}

pub fn row_to_setting(row: &MySqlRow) -> Result<(String, Option<String>), sqlx::Error> {
    Ok((row.try_get("setting_key")?, row.try_get("setting_value")?))
}

// ---------------------------------------------------------------------------
// Request payloads
// ---------------------------------------------------------------------------

/// Visitor inquiry submitted through the public site form.
#[derive(Debug, Deserialize)]
pub struct NewInquiry {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub project_type: Option<String>,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Deserialize)]
pub struct NewProject {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub technologies: Option<String>,
    #[serde(default)]
    pub client: Option<String>,
    #[serde(default, rename = "date")]
    pub project_date: Option<NaiveDate>,
    #[serde(default, rename = "url")]
    pub project_url: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Deserialize)]
pub struct InquiryStatusUpdate {
    #[serde(default)]
    pub status: String,
}

/// Partial project update. Each field maps to one fixed column; the UPDATE
/// statement covers exactly the fields that are present.
#[derive(Debug, Default, Deserialize)]
pub struct ProjectPatch {
    pub title: Option<String>,
    pub category: Option<String>,
    pub description: Option<String>,
    pub technologies: Option<String>,
    pub client: Option<String>,
    #[serde(rename = "date")]
    pub project_date: Option<NaiveDate>,
    #[serde(rename = "url")]
    pub project_url: Option<String>,
    pub image_url: Option<String>,
    pub is_active: Option<bool>,
}

impl ProjectPatch {
    fn columns(&self) -> Vec<&'static str> {
        let mut cols = Vec::new();
        if self.title.is_some() {
            cols.push("title");
        }
        if self.category.is_some() {
            cols.push("category");
        }
        if self.description.is_some() {
            cols.push("description");
        }
        if self.technologies.is_some() {
            cols.push("technologies");
        }
        if self.client.is_some() {
            cols.push("client");
        }
        if self.project_date.is_some() {
            cols.push("project_date");
        }
        if self.project_url.is_some() {
            cols.push("project_url");
        }
        if self.image_url.is_some() {
            cols.push("image_url");
        }
        if self.is_active.is_some() {
            cols.push("is_active");
        }
        cols
    }

    pub fn is_empty(&self) -> bool {
        self.columns().is_empty()
    }

    /// UPDATE statement assigning exactly the provided fields, ending with a
    /// `WHERE id = ?` placeholder. `None` when the patch carries nothing.
    pub fn update_sql(&self) -> Option<String> {
        let cols = self.columns();
        if cols.is_empty() {
            return None;
        }
        let assignments: Vec<String> = cols.iter().map(|c| format!("{c} = ?")).collect();
        Some(format!(
            "UPDATE projects SET {} WHERE id = ?",
            assignments.join(", ")
        ))
    }

    /// Bind the present values in the same fixed order [`update_sql`] emits
    /// them. The caller binds the id last.
    ///
    /// [`update_sql`]: ProjectPatch::update_sql
    pub fn bind_values<'q>(&'q self, mut query: SqlQuery<'q>) -> SqlQuery<'q> {
        if let Some(v) = &self.title {
            query = query.bind(v.as_str());
        }
        if let Some(v) = &self.category {
            query = query.bind(v.as_str());
        }
        if let Some(v) = &self.description {
            query = query.bind(v.as_str());
        }
        if let Some(v) = &self.technologies {
            query = query.bind(v.as_str());
        }
        if let Some(v) = &self.client {
            query = query.bind(v.as_str());
        }
        if let Some(v) = self.project_date {
            query = query.bind(v);
        }
        if let Some(v) = &self.project_url {
            query = query.bind(v.as_str());
        }
        if let Some(v) = &self.image_url {
            query = query.bind(v.as_str());
        }
        if let Some(v) = self.is_active {
            query = query.bind(v);
        }
        query
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_patch_builds_no_statement() {
        let patch = ProjectPatch::default();
        assert!(patch.is_empty());
        assert_eq!(patch.update_sql(), None);
    }

    #[test]
    fn partial_patch_covers_only_provided_fields() {
        let patch = ProjectPatch {
            title: Some("New title".to_string()),
            is_active: Some(false),
            ..ProjectPatch::default()
        };
        assert_eq!(
            patch.update_sql().as_deref(),
            Some("UPDATE projects SET title = ?, is_active = ? WHERE id = ?")
        );
    }

    #[test]
    fn full_patch_covers_every_column_in_fixed_order() {
        let patch = ProjectPatch {
            title: Some("t".into()),
            category: Some("website".into()),
            description: Some("d".into()),
            technologies: Some("rust".into()),
            client: Some("c".into()),
            project_date: NaiveDate::from_ymd_opt(2026, 1, 15),
            project_url: Some("https://example.com".into()),
            image_url: Some("/img/x.webp".into()),
            is_active: Some(true),
        };
        assert_eq!(
            patch.update_sql().as_deref(),
            Some(
                "UPDATE projects SET title = ?, category = ?, description = ?, \
                 technologies = ?, client = ?, project_date = ?, project_url = ?, \
                 image_url = ?, is_active = ? WHERE id = ?"
            )
        );
    }

    #[test]
    fn patch_deserializes_renamed_fields() {
        let patch: ProjectPatch =
            serde_json::from_str(r#"{"date": "2026-02-01", "url": "https://example.com"}"#)
                .expect("patch should deserialize");
        assert_eq!(patch.project_date, NaiveDate::from_ymd_opt(2026, 2, 1));
        assert_eq!(patch.project_url.as_deref(), Some("https://example.com"));
        assert!(patch.title.is_none());
    }
}
