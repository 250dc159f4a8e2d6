//! Resilient MySQL access layer.
//!
//! [`Db`] owns a lazily created connection pool. Construction performs no
//! I/O; the first acquisition builds the pool, and initialization failures
//! are counted against a bounded retry budget. Once the budget is
//! exhausted, acquisition short-circuits without touching the network
//! until a repair resets the counter. Query execution absorbs every driver
//! fault into a sentinel `None` so nothing below this boundary can take
//! the HTTP server down.

use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use sqlx::Connection;
use sqlx::mysql::{MySql, MySqlArguments, MySqlPool, MySqlPoolOptions, MySqlRow};
use sqlx::pool::PoolConnection;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::config::DbConfig;

/// A runtime-bound statement against the MySQL backend.
pub type SqlQuery<'q> = sqlx::query::Query<'q, MySql, MySqlArguments>;

/// Consecutive initialization failures tolerated before acquisition stops
/// attempting to reach the database.
pub const INIT_RETRY_CEILING: u32 = 3;

/// Counts consecutive pool-initialization failures against a ceiling.
///
/// Below the ceiling another attempt is allowed; at or past it, callers
/// must short-circuit until [`RetryBudget::reset`].
#[derive(Debug)]
struct RetryBudget {
    failures: AtomicU32,
    ceiling: u32,
}

impl RetryBudget {
    fn new(ceiling: u32) -> Self {
        RetryBudget {
            failures: AtomicU32::new(0),
            ceiling,
        }
    }

    fn exhausted(&self) -> bool {
        self.failures.load(Ordering::Relaxed) >= self.ceiling
    }

    fn record_failure(&self) -> u32 {
        self.failures.fetch_add(1, Ordering::Relaxed) + 1
    }

    fn failures(&self) -> u32 {
        self.failures.load(Ordering::Relaxed)
    }

    fn reset(&self) {
        self.failures.store(0, Ordering::Relaxed);
    }
}

pub struct Db {
    cfg: DbConfig,
    pool: RwLock<Option<MySqlPool>>,
    budget: RetryBudget,
}

impl Db {
    /// Build the handle without touching the network; the pool is created
    /// on first use.
    pub fn new(cfg: DbConfig) -> Self {
        Db {
            cfg,
            pool: RwLock::new(None),
            budget: RetryBudget::new(INIT_RETRY_CEILING),
        }
    }

    /// Check out a connection, lazily initializing the pool.
    ///
    /// Returns `None` when the pool cannot be built (or its retry budget
    /// is exhausted) or when no healthy connection is available within the
    /// configured timeout. Never panics.
    pub async fn acquire(&self) -> Option<PoolConnection<MySql>> {
        let existing = {
            let guard = self.pool.read().await;
            guard.as_ref().cloned()
        };
        if let Some(pool) = existing {
            return match pool.acquire().await {
                Ok(conn) => Some(conn),
                Err(e) => {
                    warn!(error = %e, "failed to acquire pooled connection");
                    self.note_fault(&e).await;
                    None
                }
            };
        }

        if self.budget.exhausted() {
            debug!(
                failures = self.budget.failures(),
                "initialization budget exhausted, skipping connection attempt"
            );
            return None;
        }

        let pool = self.init_pool().await?;
        match pool.acquire().await {
            Ok(conn) => Some(conn),
            Err(e) => {
                warn!(error = %e, "freshly initialized pool yielded no connection");
                self.note_fault(&e).await;
                None
            }
        }
    }

    /// Build the pool, serialized behind the write lock so concurrent
    /// first requests trigger a single attempt.
    async fn init_pool(&self) -> Option<MySqlPool> {
        let mut slot = self.pool.write().await;
        if let Some(pool) = slot.as_ref() {
            return Some(pool.clone());
        }
        if self.budget.exhausted() {
            return None;
        }

        info!(
            host = %self.cfg.host,
            port = self.cfg.port,
            database = %self.cfg.database,
            pool_size = self.cfg.pool_size,
            "initializing connection pool"
        );

        let options = MySqlPoolOptions::new()
            .max_connections(self.cfg.pool_size)
            .acquire_timeout(Duration::from_secs(self.cfg.acquire_timeout_secs))
            .test_before_acquire(true);

        match options.connect(&self.cfg.url()).await {
            Ok(pool) => {
                self.budget.reset();
                info!("connection pool ready");
                *slot = Some(pool.clone());
                Some(pool)
            }
            Err(e) => {
                let attempt = self.budget.record_failure();
                if self.budget.exhausted() {
                    warn!(
                        error = %e,
                        failures = attempt,
                        "pool initialization disabled until repair"
                    );
                } else {
                    warn!(
                        error = %e,
                        attempt,
                        ceiling = self.budget.ceiling,
                        "pool initialization failed"
                    );
                }
                None
            }
        }
    }

    /// Typed fault classification. Connection-level faults discard the
    /// pool so the next acquisition re-initializes it; statement faults
    /// are left for the caller's sentinel return.
    async fn note_fault(&self, err: &sqlx::Error) {
        if is_transient(err) {
            warn!(error = %err, "transient connection fault, pool will be re-initialized");
            *self.pool.write().await = None;
        }
    }

    /// Liveness probe: acquire, `SELECT 1`, release.
    pub async fn is_healthy(&self) -> bool {
        let Some(mut conn) = self.acquire().await else {
            return false;
        };
        sqlx::query("SELECT 1").fetch_one(&mut *conn).await.is_ok()
    }

    /// Run a read statement and fetch all rows.
    ///
    /// `None` means the database was unavailable; `Some(vec![])` means the
    /// query legitimately matched nothing. The connection is released on
    /// every exit path.
    pub async fn execute_read(&self, query: SqlQuery<'_>) -> Option<Vec<MySqlRow>> {
        let mut conn = self.acquire().await?;
        match query.fetch_all(&mut *conn).await {
            Ok(rows) => Some(rows),
            Err(e) => {
                warn!(error = %e, "read statement failed");
                self.note_fault(&e).await;
                None
            }
        }
    }

    /// Run a write statement inside a transaction and return the affected
    /// row count (0 is a valid success, distinct from `None`).
    ///
    /// On any fault the transaction is dropped, which issues a best-effort
    /// rollback; rollback failures are swallowed.
    pub async fn execute_write(&self, query: SqlQuery<'_>) -> Option<u64> {
        let mut conn = self.acquire().await?;
        let mut tx = match conn.begin().await {
            Ok(tx) => tx,
            Err(e) => {
                warn!(error = %e, "failed to open transaction");
                self.note_fault(&e).await;
                return None;
            }
        };

        let affected = match query.execute(&mut *tx).await {
            Ok(result) => result.rows_affected(),
            Err(e) => {
                warn!(error = %e, "write statement failed");
                self.note_fault(&e).await;
                return None;
            }
        };

        match tx.commit().await {
            Ok(()) => Some(affected),
            Err(e) => {
                warn!(error = %e, "commit failed");
                self.note_fault(&e).await;
                None
            }
        }
    }

    /// Clear the failure budget and drop any existing pool so the next
    /// acquisition starts a fresh initialization. Repair hook.
    pub async fn reset(&self) {
        self.budget.reset();
        *self.pool.write().await = None;
        info!("database pool state reset");
    }
}

/// Whether a driver error indicates the connection itself is broken, as
/// opposed to a statement-level problem.
fn is_transient(err: &sqlx::Error) -> bool {
    matches!(
        err,
        sqlx::Error::Io(_)
            | sqlx::Error::Tls(_)
            | sqlx::Error::Protocol(_)
            | sqlx::Error::PoolTimedOut
            | sqlx::Error::PoolClosed
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Points at a loopback port nothing listens on, so every connection
    /// attempt fails fast with a refusal.
    fn unreachable_config() -> DbConfig {
        DbConfig {
            host: "127.0.0.1".to_string(),
            port: 1,
            user: "atelier".to_string(),
            password: "atelier".to_string(),
            database: "atelier_test".to_string(),
            pool_size: 2,
            acquire_timeout_secs: 1,
        }
    }

    #[test]
    fn budget_exhausts_at_ceiling_and_resets() {
        let budget = RetryBudget::new(3);
        assert!(!budget.exhausted());

        assert_eq!(budget.record_failure(), 1);
        assert_eq!(budget.record_failure(), 2);
        assert!(!budget.exhausted());

        assert_eq!(budget.record_failure(), 3);
        assert!(budget.exhausted());

        budget.reset();
        assert!(!budget.exhausted());
        assert_eq!(budget.failures(), 0);
    }

    #[test]
    fn connection_faults_are_transient_statement_faults_are_not() {
        let io = sqlx::Error::Io(std::io::Error::new(
            std::io::ErrorKind::ConnectionReset,
            "reset",
        ));
        assert!(is_transient(&io));
        assert!(is_transient(&sqlx::Error::PoolTimedOut));
        assert!(is_transient(&sqlx::Error::PoolClosed));
        assert!(is_transient(&sqlx::Error::Protocol("bad packet".into())));

        assert!(!is_transient(&sqlx::Error::RowNotFound));
        assert!(!is_transient(&sqlx::Error::ColumnNotFound("id".into())));
    }

    #[tokio::test]
    async fn construction_performs_no_io() {
        // With a bogus target this would fail loudly if it connected.
        let db = Db::new(unreachable_config());
        assert_eq!(db.budget.failures(), 0);
        assert!(db.pool.read().await.is_none());
    }

    #[tokio::test]
    async fn failed_initializations_consume_the_budget() {
        let db = Db::new(unreachable_config());

        for expected in 1..=INIT_RETRY_CEILING {
            assert!(db.acquire().await.is_none());
            assert_eq!(db.budget.failures(), expected);
        }
        assert!(db.budget.exhausted());
    }

    #[tokio::test]
    async fn exhausted_budget_short_circuits_without_an_attempt() {
        let db = Db::new(unreachable_config());
        for _ in 0..INIT_RETRY_CEILING {
            assert!(db.acquire().await.is_none());
        }

        // A gated call must not record another failure: the counter staying
        // flat shows no initialization was attempted.
        assert!(db.acquire().await.is_none());
        assert_eq!(db.budget.failures(), INIT_RETRY_CEILING);
    }

    #[tokio::test]
    async fn executors_return_sentinels_when_unavailable() {
        let db = Db::new(unreachable_config());

        assert!(db.execute_read(sqlx::query("SELECT 1")).await.is_none());
        assert!(
            db.execute_write(sqlx::query("UPDATE settings SET setting_value = ''"))
                .await
                .is_none()
        );
        assert!(!db.is_healthy().await);
    }

    #[tokio::test]
    async fn reset_reopens_the_initialization_budget() {
        let db = Db::new(unreachable_config());
        for _ in 0..INIT_RETRY_CEILING {
            assert!(db.acquire().await.is_none());
        }
        assert!(db.budget.exhausted());

        db.reset().await;
        assert!(!db.budget.exhausted());

        // The next acquisition attempts initialization again (and fails
        // against the closed port, consuming budget once more).
        assert!(db.acquire().await.is_none());
        assert_eq!(db.budget.failures(), 1);
    }
}
