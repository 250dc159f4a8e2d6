use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum_extra::TypedHeader;
use headers::{Authorization, authorization::Bearer};

use crate::auth::Claims;
use crate::error::AtelierError;
use crate::router::AtelierState;

/// Extractor guarding admin-only handlers.
///
/// Pulls the bearer token from the `Authorization` header, validates it
/// against the state's [`JwtManager`] and hands the claims to the handler.
/// Rejections surface as the usual 401 JSON envelope.
///
/// [`JwtManager`]: crate::auth::JwtManager
#[derive(Debug, Clone)]
pub struct AdminClaims(pub Claims);

impl FromRequestParts<AtelierState> for AdminClaims {
    type Rejection = AtelierError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AtelierState,
    ) -> Result<Self, Self::Rejection> {
        let TypedHeader(Authorization(bearer)) =
            TypedHeader::<Authorization<Bearer>>::from_request_parts(parts, state)
                .await
                .map_err(|_| AtelierError::Unauthorized("missing bearer token".to_string()))?;

        let claims = state.jwt.validate(bearer.token())?;
        Ok(Self(claims))
    }
}
