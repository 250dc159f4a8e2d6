//! Idempotent schema creation and default-data seeding.
//!
//! The whole sequence is safe to run against an unreachable database: the
//! health probe is the single graceful-degradation exit, and a partially
//! successful pass is logged, never fatal.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use tracing::{info, warn};

use crate::auth;
use crate::db::pool::Db;
use crate::db::schema::{self, DEFAULT_SETTINGS, TABLES};

pub const DEFAULT_ADMIN_USERNAME: &str = "admin";

/// Probe health, create missing tables, then run the repair pass.
///
/// Returns `false` without attempting any write when the database is
/// unreachable.
pub async fn setup_database(db: &Db) -> bool {
    info!("starting database setup");

    if !db.is_healthy().await {
        warn!("database unreachable, skipping setup");
        return false;
    }

    create_tables(db).await;
    run_repair_pass(db).await;

    info!("database setup complete");
    true
}

/// Reset the pool's failure budget and re-run the full setup sequence.
/// Exposed through the authenticated admin repair endpoint.
pub async fn repair_database(db: &Db) -> bool {
    info!("manual database repair requested");
    db.reset().await;
    setup_database(db).await
}

/// Apply each table's DDL independently; one failure never aborts the
/// batch.
async fn create_tables(db: &Db) -> (usize, usize) {
    let mut created = 0;
    let mut failed = 0;

    for (name, ddl) in TABLES {
        match db.execute_write(sqlx::query(ddl)).await {
            Some(_) => created += 1,
            None => {
                failed += 1;
                warn!(table = name, "table creation failed");
            }
        }
    }

    if created > 0 {
        info!(applied = created, total = TABLES.len(), "schema statements applied");
    }
    if failed > 0 {
        warn!(failed, "schema statements failed");
    }
    (created, failed)
}

async fn run_repair_pass(db: &Db) {
    for (name, _) in TABLES {
        let probe = sqlx::query(
            "SELECT TABLE_NAME FROM INFORMATION_SCHEMA.TABLES \
             WHERE TABLE_SCHEMA = DATABASE() AND TABLE_NAME = ?",
        )
        .bind(name);
        match db.execute_read(probe).await {
            Some(rows) if rows.is_empty() => warn!(table = name, "expected table missing"),
            Some(_) => {}
            None => warn!(table = name, "table presence check unavailable"),
        }
    }

    ensure_default_admin(db).await;
    ensure_default_settings(db).await;
}

/// Create the administrative account if it does not exist, with a one-time
/// generated password logged exactly once so the operator can log in and
/// change it. Only the argon2 hash is stored.
async fn ensure_default_admin(db: &Db) {
    let existing = db
        .execute_read(
            sqlx::query("SELECT id FROM admin_users WHERE username = ?")
                .bind(DEFAULT_ADMIN_USERNAME),
        )
        .await;

    match existing {
        Some(rows) if rows.is_empty() => {
            let password = generate_initial_password();
            let hash = match auth::hash_password(&password) {
                Ok(hash) => hash,
                Err(e) => {
                    warn!(error = %e, "failed to hash generated admin password");
                    return;
                }
            };

            let insert = sqlx::query(
                "INSERT INTO admin_users (username, password_hash, full_name, email, role, is_active) \
                 VALUES (?, ?, ?, ?, ?, TRUE)",
            )
            .bind(DEFAULT_ADMIN_USERNAME)
            .bind(hash)
            .bind("Site administrator")
            .bind(schema::default_setting("admin_email").unwrap_or_default())
            .bind("admin");

            if db.execute_write(insert).await.is_some() {
                warn!(
                    username = DEFAULT_ADMIN_USERNAME,
                    initial_password = %password,
                    "created initial admin account; change this password after first login"
                );
            } else {
                warn!("failed to seed default admin account");
            }
        }
        Some(_) => {}
        None => warn!("admin account check unavailable"),
    }
}

/// Insert any missing default setting; existing values are never touched.
async fn ensure_default_settings(db: &Db) {
    for (key, value) in DEFAULT_SETTINGS {
        let existing = db
            .execute_read(
                sqlx::query("SELECT setting_value FROM settings WHERE setting_key = ?").bind(key),
            )
            .await;

        match existing {
            Some(rows) if rows.is_empty() => {
                let insert =
                    sqlx::query("INSERT INTO settings (setting_key, setting_value) VALUES (?, ?)")
                        .bind(key)
                        .bind(value);
                if db.execute_write(insert).await.is_some() {
                    info!(key, "seeded default setting");
                } else {
                    warn!(key, "failed to seed default setting");
                }
            }
            Some(_) => {}
            None => warn!(key, "setting check unavailable"),
        }
    }
}

fn generate_initial_password() -> String {
    use argon2::password_hash::rand_core::{OsRng, RngCore};

    let mut bytes = [0u8; 12];
    OsRng.fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}
