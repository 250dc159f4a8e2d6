//! Admin API: login, project and inquiry management, settings, stats and
//! the database repair operation. Everything except login requires a
//! valid bearer token via [`AdminClaims`].

use std::collections::BTreeMap;

use axum::{
    Json,
    extract::{Path, State},
    response::Response,
};
use serde::Deserialize;
use serde_json::json;
use sqlx::Row;
use tracing::info;

use crate::auth;
use crate::db;
use crate::db::models::{self, InquiryStatusUpdate, NewProject, ProjectPatch};
use crate::db::schema::DEFAULT_SETTINGS;
use crate::error::AtelierError;
use crate::handlers::{created, ok};
use crate::middleware::AdminClaims;
use crate::router::AtelierState;

/// Deliberately identical for unknown users and wrong passwords.
const BAD_CREDENTIALS: &str = "invalid username or password";

fn internal(e: sqlx::Error) -> AtelierError {
    AtelierError::Internal(e.to_string())
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

/// `POST /api/admin/login`
pub async fn login(
    State(state): State<AtelierState>,
    Json(body): Json<LoginRequest>,
) -> Result<Response, AtelierError> {
    let username = body.username.trim();
    let password = body.password.trim();
    if username.is_empty() || password.is_empty() {
        return Err(AtelierError::Validation(
            "username and password are required".to_string(),
        ));
    }

    if !state.db.is_healthy().await {
        return Err(AtelierError::Unavailable);
    }

    let rows = state
        .db
        .execute_read(
            sqlx::query(
                "SELECT id, username, password_hash, full_name, email, role \
                 FROM admin_users WHERE username = ? AND is_active = TRUE LIMIT 1",
            )
            .bind(username),
        )
        .await
        .ok_or(AtelierError::Unavailable)?;

    let Some(row) = rows.first() else {
        return Err(AtelierError::Unauthorized(BAD_CREDENTIALS.to_string()));
    };
    let user = models::row_to_admin_user(row).map_err(internal)?;

    if !auth::verify_password(password, &user.password_hash) {
        return Err(AtelierError::Unauthorized(BAD_CREDENTIALS.to_string()));
    }

    let role = user.role.clone().unwrap_or_else(|| "admin".to_string());
    let token = state.jwt.issue(user.id, &user.username, &role)?;

    // Best-effort stamp; a failure here must not block the login.
    let _ = state
        .db
        .execute_write(
            sqlx::query("UPDATE admin_users SET last_login = CURRENT_TIMESTAMP WHERE id = ?")
                .bind(user.id),
        )
        .await;

    info!(username = %user.username, "admin login");
    Ok(ok(
        "login successful",
        json!({"token": token, "user": user.profile()}),
    ))
}

// ---------------------------------------------------------------------------
// Projects
// ---------------------------------------------------------------------------

/// `GET /api/admin/projects` — every project, including inactive ones.
pub async fn list_projects(
    _claims: AdminClaims,
    State(state): State<AtelierState>,
) -> Result<Response, AtelierError> {
    let rows = state
        .db
        .execute_read(sqlx::query("SELECT * FROM projects ORDER BY created_at DESC"))
        .await
        .ok_or(AtelierError::Unavailable)?;
    let projects = rows
        .iter()
        .map(models::row_to_project)
        .collect::<Result<Vec<_>, _>>()
        .map_err(internal)?;
    Ok(ok("projects fetched", projects))
}

/// `POST /api/admin/projects`
pub async fn create_project(
    _claims: AdminClaims,
    State(state): State<AtelierState>,
    Json(body): Json<NewProject>,
) -> Result<Response, AtelierError> {
    if body.title.trim().is_empty() || body.description.trim().is_empty() {
        return Err(AtelierError::Validation(
            "title and description are required".to_string(),
        ));
    }

    let query = sqlx::query(
        "INSERT INTO projects (title, category, description, technologies, client, \
         project_date, project_url, image_url, is_active) \
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(body.title.trim())
    .bind(body.category.as_deref().unwrap_or("website"))
    .bind(body.description.trim())
    .bind(body.technologies.as_deref())
    .bind(body.client.as_deref())
    .bind(body.project_date)
    .bind(body.project_url.as_deref())
    .bind(body.image_url.as_deref())
    .bind(body.is_active);

    match state.db.execute_write(query).await {
        Some(_) => Ok(created("project created", ())),
        None => Err(AtelierError::Unavailable),
    }
}

/// `PUT /api/admin/projects/{id}` — typed partial update.
pub async fn update_project(
    _claims: AdminClaims,
    State(state): State<AtelierState>,
    Path(id): Path<i32>,
    Json(patch): Json<ProjectPatch>,
) -> Result<Response, AtelierError> {
    ensure_project_exists(&state, id).await?;

    let Some(sql) = patch.update_sql() else {
        return Err(AtelierError::Validation("no fields to update".to_string()));
    };
    let query = patch.bind_values(sqlx::query(&sql)).bind(id);

    match state.db.execute_write(query).await {
        Some(_) => Ok(ok("project updated", ())),
        None => Err(AtelierError::Unavailable),
    }
}

/// `DELETE /api/admin/projects/{id}`
pub async fn delete_project(
    _claims: AdminClaims,
    State(state): State<AtelierState>,
    Path(id): Path<i32>,
) -> Result<Response, AtelierError> {
    ensure_project_exists(&state, id).await?;

    match state
        .db
        .execute_write(sqlx::query("DELETE FROM projects WHERE id = ?").bind(id))
        .await
    {
        Some(_) => Ok(ok("project deleted", ())),
        None => Err(AtelierError::Unavailable),
    }
}

async fn ensure_project_exists(state: &AtelierState, id: i32) -> Result<(), AtelierError> {
    let rows = state
        .db
        .execute_read(sqlx::query("SELECT id FROM projects WHERE id = ?").bind(id))
        .await
        .ok_or(AtelierError::Unavailable)?;
    if rows.is_empty() {
        return Err(AtelierError::NotFound("project"));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Project requests
// ---------------------------------------------------------------------------

/// `GET /api/admin/project-requests`
pub async fn list_requests(
    _claims: AdminClaims,
    State(state): State<AtelierState>,
) -> Result<Response, AtelierError> {
    let rows = state
        .db
        .execute_read(sqlx::query(
            "SELECT * FROM project_requests ORDER BY created_at DESC",
        ))
        .await
        .ok_or(AtelierError::Unavailable)?;
    let requests = rows
        .iter()
        .map(models::row_to_project_request)
        .collect::<Result<Vec<_>, _>>()
        .map_err(internal)?;
    Ok(ok("requests fetched", requests))
}

/// `GET /api/admin/project-requests/{id}`
pub async fn get_request(
    _claims: AdminClaims,
    State(state): State<AtelierState>,
    Path(id): Path<i32>,
) -> Result<Response, AtelierError> {
    let rows = state
        .db
        .execute_read(sqlx::query("SELECT * FROM project_requests WHERE id = ?").bind(id))
        .await
        .ok_or(AtelierError::Unavailable)?;
    let Some(row) = rows.first() else {
        return Err(AtelierError::NotFound("project request"));
    };
    let request = models::row_to_project_request(row).map_err(internal)?;
    Ok(ok("request fetched", request))
}

/// `PUT /api/admin/project-requests/{id}` — status update only.
pub async fn update_request_status(
    _claims: AdminClaims,
    State(state): State<AtelierState>,
    Path(id): Path<i32>,
    Json(body): Json<InquiryStatusUpdate>,
) -> Result<Response, AtelierError> {
    if body.status.trim().is_empty() {
        return Err(AtelierError::Validation("status is required".to_string()));
    }

    let query = sqlx::query("UPDATE project_requests SET status = ? WHERE id = ?")
        .bind(body.status.trim())
        .bind(id);
    match state.db.execute_write(query).await {
        Some(_) => Ok(ok("request status updated", ())),
        None => Err(AtelierError::Unavailable),
    }
}

/// `DELETE /api/admin/project-requests/{id}`
pub async fn delete_request(
    _claims: AdminClaims,
    State(state): State<AtelierState>,
    Path(id): Path<i32>,
) -> Result<Response, AtelierError> {
    match state
        .db
        .execute_write(sqlx::query("DELETE FROM project_requests WHERE id = ?").bind(id))
        .await
    {
        Some(_) => Ok(ok("request deleted", ())),
        None => Err(AtelierError::Unavailable),
    }
}

// ---------------------------------------------------------------------------
// Stats, settings, repair
// ---------------------------------------------------------------------------

/// `GET /api/admin/stats`
pub async fn stats(
    _claims: AdminClaims,
    State(state): State<AtelierState>,
) -> Result<Response, AtelierError> {
    let total_projects = count(&state, "SELECT COUNT(*) AS n FROM projects").await?;
    let active_projects =
        count(&state, "SELECT COUNT(*) AS n FROM projects WHERE is_active = TRUE").await?;
    let total_requests = count(&state, "SELECT COUNT(*) AS n FROM project_requests").await?;
    let new_requests = count(
        &state,
        "SELECT COUNT(*) AS n FROM project_requests WHERE status = 'new'",
    )
    .await?;

    Ok(ok(
        "statistics fetched",
        json!({
            "total_projects": total_projects,
            "active_projects": active_projects,
            "total_requests": total_requests,
            "new_requests": new_requests,
        }),
    ))
}

async fn count(state: &AtelierState, sql: &str) -> Result<i64, AtelierError> {
    let rows = state
        .db
        .execute_read(sqlx::query(sql))
        .await
        .ok_or(AtelierError::Unavailable)?;
    rows.first()
        .ok_or_else(|| AtelierError::Internal("count query returned no rows".to_string()))?
        .try_get("n")
        .map_err(internal)
}

/// `GET /api/admin/settings` — degraded database answers with the
/// built-in defaults so the admin panel still renders.
pub async fn get_settings(
    _claims: AdminClaims,
    State(state): State<AtelierState>,
) -> Result<Response, AtelierError> {
    let query = sqlx::query("SELECT setting_key, setting_value FROM settings");
    let Some(rows) = state.db.execute_read(query).await else {
        let defaults: BTreeMap<String, String> = DEFAULT_SETTINGS
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        return Ok(ok("settings fetched", defaults));
    };

    let mut settings = BTreeMap::new();
    for row in &rows {
        let (key, value) = models::row_to_setting(row).map_err(internal)?;
        settings.insert(key, value.unwrap_or_default());
    }
    Ok(ok("settings fetched", settings))
}

/// `POST /api/admin/settings` — pairwise upsert.
pub async fn update_settings(
    _claims: AdminClaims,
    State(state): State<AtelierState>,
    Json(body): Json<BTreeMap<String, String>>,
) -> Result<Response, AtelierError> {
    if body.is_empty() {
        return Err(AtelierError::Validation("no settings provided".to_string()));
    }

    for (key, value) in &body {
        let query = sqlx::query(
            "INSERT INTO settings (setting_key, setting_value) VALUES (?, ?) \
             ON DUPLICATE KEY UPDATE setting_value = VALUES(setting_value)",
        )
        .bind(key.as_str())
        .bind(value.as_str());
        if state.db.execute_write(query).await.is_none() {
            return Err(AtelierError::Unavailable);
        }
    }
    Ok(ok("settings updated", ()))
}

/// `POST /api/admin/repair-database` — reset the pool's failure budget and
/// re-run the bootstrap sequence.
pub async fn repair_database(
    claims: AdminClaims,
    State(state): State<AtelierState>,
) -> Result<Response, AtelierError> {
    info!(admin = %claims.0.username, "database repair triggered");
    if db::repair_database(&state.db).await {
        Ok(ok("database repaired", ()))
    } else {
        Err(AtelierError::Unavailable)
    }
}
