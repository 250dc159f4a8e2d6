pub mod auth;

pub use auth::AdminClaims;
