//! Public API: portfolio listing, site status, inquiry intake, health.

use axum::{Json, extract::State, response::Response};
use chrono::Utc;
use serde_json::json;

use crate::db::models::{self, NewInquiry, Project};
use crate::error::AtelierError;
use crate::handlers::{created, ok, setting_or_default};
use crate::router::AtelierState;

/// `GET /api/projects` — active portfolio entries, newest first.
pub async fn list_projects(State(state): State<AtelierState>) -> Result<Response, AtelierError> {
    let query = sqlx::query(
        "SELECT * FROM projects WHERE is_active = TRUE ORDER BY created_at DESC LIMIT 12",
    );
    let Some(rows) = state.db.execute_read(query).await else {
        // Degraded database: the public site still renders, with an empty
        // portfolio rather than an error page.
        return Ok(ok("no projects available", Vec::<Project>::new()));
    };

    let projects = rows
        .iter()
        .map(models::row_to_project)
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| AtelierError::Internal(e.to_string()))?;
    Ok(ok("projects fetched", projects))
}

/// `GET /api/site-status` — maintenance mode plus basic site identity.
/// Never fails; a degraded database answers with built-in defaults.
pub async fn site_status(State(state): State<AtelierState>) -> Response {
    let database_connected = state.db.is_healthy().await;
    let maintenance_mode = setting_or_default(&state.db, "maintenance_mode")
        .await
        .unwrap_or_else(|| "disabled".to_string());
    let site_title = setting_or_default(&state.db, "site_title")
        .await
        .unwrap_or_default();
    let site_description = setting_or_default(&state.db, "site_description")
        .await
        .unwrap_or_default();

    ok(
        "site status fetched",
        json!({
            "maintenance_mode": maintenance_mode,
            "site_title": site_title,
            "site_description": site_description,
            "database_connected": database_connected,
        }),
    )
}

/// `POST /api/project-request` — visitor inquiry from the site form.
pub async fn create_project_request(
    State(state): State<AtelierState>,
    Json(body): Json<NewInquiry>,
) -> Result<Response, AtelierError> {
    if state.inquiry_limiter.check().is_err() {
        return Err(AtelierError::RateLimited);
    }

    for (field, value) in [
        ("name", &body.name),
        ("email", &body.email),
        ("description", &body.description),
    ] {
        if value.trim().is_empty() {
            return Err(AtelierError::Validation(format!(
                "field `{field}` is required"
            )));
        }
    }

    let query = sqlx::query(
        "INSERT INTO project_requests (name, email, project_type, description) \
         VALUES (?, ?, ?, ?)",
    )
    .bind(body.name.trim())
    .bind(body.email.trim())
    .bind(body.project_type.as_deref().unwrap_or("website"))
    .bind(body.description.trim());

    match state.db.execute_write(query).await {
        Some(_) => Ok(created("request received", ())),
        None => Err(AtelierError::Unavailable),
    }
}

/// `GET /api/health` — liveness plus database reachability.
pub async fn health(State(state): State<AtelierState>) -> Response {
    let database = if state.db.is_healthy().await {
        "connected"
    } else {
        "disconnected"
    };

    ok(
        "service running",
        json!({
            "status": "healthy",
            "timestamp": Utc::now().to_rfc3339(),
            "database": database,
            "server": "running",
        }),
    )
}
