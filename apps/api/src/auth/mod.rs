//! Request authentication.
//!
//! The identity provider is an external collaborator: handlers only ever see the
//! `AuthUser` extractor, which resolves a bearer token to a local user id.

use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::AppError;
use crate::state::AppState;

pub mod users;

/// Identity asserted by a verified token.
#[derive(Debug, Clone, PartialEq)]
pub struct Identity {
    pub external_id: String,
    pub email: Option<String>,
}

/// Verifies an opaque bearer token. Swap implementations in `main` to change providers.
pub trait TokenVerifier: Send + Sync {
    fn verify(&self, token: &str) -> Result<Identity, AppError>;
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    #[serde(default)]
    pub email: Option<String>,
    pub exp: usize,
}

/// HS256 JWT verifier keyed by `JWT_SECRET`.
pub struct JwtVerifier {
    key: DecodingKey,
    validation: Validation,
}

impl JwtVerifier {
    pub fn new(secret: &str) -> Self {
        Self {
            key: DecodingKey::from_secret(secret.as_bytes()),
            validation: Validation::new(Algorithm::HS256),
        }
    }
}

impl TokenVerifier for JwtVerifier {
    fn verify(&self, token: &str) -> Result<Identity, AppError> {
        let data = decode::<Claims>(token, &self.key, &self.validation)
            .map_err(|e| AppError::Unauthorized(format!("invalid token: {e}")))?;

        if data.claims.sub.trim().is_empty() {
            return Err(AppError::Unauthorized("token has empty subject".into()));
        }

        Ok(Identity {
            external_id: data.claims.sub,
            email: data.claims.email,
        })
    }
}

/// The authenticated caller. Extracting it verifies the token and upserts the user row.
#[derive(Debug, Clone, Copy)]
pub struct AuthUser {
    pub user_id: Uuid,
}

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts)?;
        let identity = state.verifier.verify(token)?;
        let user = users::get_or_create_user(&state.db, &identity).await?;
        Ok(AuthUser { user_id: user.id })
    }
}

fn bearer_token(parts: &Parts) -> Result<&str, AppError> {
    let header = parts
        .headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .ok_or_else(|| AppError::Unauthorized("missing Authorization header".into()))?;

    header
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| AppError::Unauthorized("expected Bearer token".into()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;
    use jsonwebtoken::{encode, EncodingKey, Header};

    const SECRET: &str = "test-secret";

    fn token(sub: &str, exp: usize) -> String {
        let claims = Claims {
            sub: sub.to_string(),
            email: Some("dev@example.com".to_string()),
            exp,
        };
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .unwrap()
    }

    fn far_future() -> usize {
        (chrono::Utc::now().timestamp() + 3600) as usize
    }

    #[test]
    fn test_valid_token_yields_identity() {
        let verifier = JwtVerifier::new(SECRET);
        let identity = verifier.verify(&token("firebase-uid-1", far_future())).unwrap();
        assert_eq!(identity.external_id, "firebase-uid-1");
        assert_eq!(identity.email.as_deref(), Some("dev@example.com"));
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let verifier = JwtVerifier::new("other-secret");
        let result = verifier.verify(&token("uid", far_future()));
        assert!(matches!(result, Err(AppError::Unauthorized(_))));
    }

    #[test]
    fn test_expired_token_rejected() {
        let verifier = JwtVerifier::new(SECRET);
        assert!(verifier.verify(&token("uid", 1_000)).is_err());
    }

    #[test]
    fn test_bearer_token_parsing() {
        let (parts, _) = Request::builder()
            .header(AUTHORIZATION, "Bearer abc.def.ghi")
            .body(())
            .unwrap()
            .into_parts();
        assert_eq!(bearer_token(&parts).unwrap(), "abc.def.ghi");

        let (parts, _) = Request::builder()
            .header(AUTHORIZATION, "Basic Zm9vOmJhcg==")
            .body(())
            .unwrap()
            .into_parts();
        assert!(bearer_token(&parts).is_err());

        let (parts, _) = Request::builder().body(()).unwrap().into_parts();
        assert!(bearer_token(&parts).is_err());
    }
}
