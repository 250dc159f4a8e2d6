//! HTTP handlers and the shared JSON envelope.

pub mod admin;
pub mod public;

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

use crate::db::models::row_to_setting;
use crate::db::pool::Db;
use crate::db::schema;

/// Standardized success envelope. Failures use
/// [`ApiErrorResponse`](crate::error::ApiErrorResponse) with the same
/// outer shape.
#[derive(Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    pub message: String,
    pub data: T,
}

pub fn ok<T: Serialize>(message: &str, data: T) -> Response {
    envelope(StatusCode::OK, message, data)
}

pub fn created<T: Serialize>(message: &str, data: T) -> Response {
    envelope(StatusCode::CREATED, message, data)
}

fn envelope<T: Serialize>(status: StatusCode, message: &str, data: T) -> Response {
    (
        status,
        Json(ApiResponse {
            success: true,
            message: message.to_string(),
            data,
        }),
    )
        .into_response()
}

/// Current value of a setting, falling back to the built-in default when
/// the database cannot answer or the key is absent.
pub(crate) async fn setting_or_default(db: &Db, key: &str) -> Option<String> {
    let query = sqlx::query("SELECT setting_key, setting_value FROM settings WHERE setting_key = ?")
        .bind(key);
    if let Some(rows) = db.execute_read(query).await
        && let Some(row) = rows.first()
        && let Ok((_, Some(value))) = row_to_setting(row)
    {
        return Some(value);
    }
    schema::default_setting(key).map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn envelope_serializes_with_null_data() {
        let value = serde_json::to_value(ApiResponse {
            success: true,
            message: "done".to_string(),
            data: (),
        })
        .expect("envelope should serialize");
        assert_eq!(value, json!({"success": true, "message": "done", "data": null}));
    }

    #[test]
    fn envelope_carries_structured_data() {
        let value = serde_json::to_value(ApiResponse {
            success: true,
            message: "projects fetched".to_string(),
            data: vec![1, 2, 3],
        })
        .expect("envelope should serialize");
        assert_eq!(value["data"], json!([1, 2, 3]));
    }
}
