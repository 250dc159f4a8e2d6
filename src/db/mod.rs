//! Database module: resilient pool, schema DDL and bootstrap/repair.
//!
//! Layout:
//! - `pool.rs`: lazy connection pool with a bounded init-retry budget and
//!   the fault-absorbing query executors
//! - `schema.rs`: MySQL DDL and default settings
//! - `models.rs`: row structs, row mapping, typed request payloads
//! - `bootstrap.rs`: idempotent setup and the on-demand repair sequence

pub mod bootstrap;
pub mod models;
pub mod pool;
pub mod schema;

pub use bootstrap::{repair_database, setup_database};
pub use pool::{Db, SqlQuery};
