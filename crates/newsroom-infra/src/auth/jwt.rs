//! Session tokens as HS256 JWTs.
//!
//! A token names the session user and carries the permission codenames
//! granted to it (`news.add_post`, `news.change_post`, `news.delete_post`).

use chrono::{TimeDelta, Utc};
use jsonwebtoken::errors::{Error as JwtError, ErrorKind};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use newsroom_core::ports::{AuthError, TokenClaims, TokenService};

const DEFAULT_SECRET: &str = "change-me-in-production";
const DEFAULT_ISSUER: &str = "newsroom";
const DEFAULT_EXPIRATION_HOURS: i64 = 24;

/// Signing settings for session tokens.
#[derive(Debug, Clone)]
pub struct JwtConfig {
    pub secret: String,
    pub expiration_hours: i64,
    pub issuer: String,
}

impl Default for JwtConfig {
    fn default() -> Self {
        Self {
            secret: DEFAULT_SECRET.to_string(),
            expiration_hours: DEFAULT_EXPIRATION_HOURS,
            issuer: DEFAULT_ISSUER.to_string(),
        }
    }
}

impl JwtConfig {
    /// `JWT_SECRET`, `JWT_EXPIRATION_HOURS` and `JWT_ISSUER`, with defaults.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let config = Self {
            secret: std::env::var("JWT_SECRET").unwrap_or(defaults.secret),
            expiration_hours: std::env::var("JWT_EXPIRATION_HOURS")
                .ok()
                .and_then(|hours| hours.parse().ok())
                .unwrap_or(defaults.expiration_hours),
            issuer: std::env::var("JWT_ISSUER").unwrap_or(defaults.issuer),
        };

        if config.uses_default_secret() {
            let production = matches!(
                std::env::var("RUST_ENV").as_deref(),
                Ok("production") | Ok("prod")
            );
            if production {
                tracing::error!("SECURITY: default JWT secret in production, set JWT_SECRET");
            } else {
                tracing::warn!("Signing session tokens with the default JWT secret");
            }
        }

        config
    }

    pub fn uses_default_secret(&self) -> bool {
        self.secret == DEFAULT_SECRET
    }
}

/// Wire form of a session token.
#[derive(Debug, Serialize, Deserialize)]
struct SessionClaims {
    sub: Uuid,
    username: String,
    #[serde(default)]
    perms: Vec<String>,
    iss: String,
    iat: i64,
    exp: i64,
}

impl From<SessionClaims> for TokenClaims {
    fn from(claims: SessionClaims) -> Self {
        Self {
            user_id: claims.sub,
            username: claims.username,
            permissions: claims.perms,
            exp: claims.exp,
        }
    }
}

fn auth_error(err: JwtError) -> AuthError {
    match err.kind() {
        ErrorKind::ExpiredSignature => AuthError::TokenExpired,
        _ => AuthError::InvalidToken(err.to_string()),
    }
}

/// Issues and checks session tokens.
pub struct JwtTokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    config: JwtConfig,
}

impl JwtTokenService {
    pub fn new(config: JwtConfig) -> Self {
        let mut validation = Validation::default();
        validation.set_issuer(&[config.issuer.as_str()]);

        Self {
            encoding_key: EncodingKey::from_secret(config.secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.secret.as_bytes()),
            validation,
            config,
        }
    }
}

impl TokenService for JwtTokenService {
    fn generate_token(
        &self,
        user_id: Uuid,
        username: &str,
        permissions: Vec<String>,
    ) -> Result<String, AuthError> {
        let issued_at = Utc::now();
        let claims = SessionClaims {
            sub: user_id,
            username: username.to_string(),
            perms: permissions,
            iss: self.config.issuer.clone(),
            iat: issued_at.timestamp(),
            exp: (issued_at + TimeDelta::hours(self.config.expiration_hours)).timestamp(),
        };

        encode(&Header::default(), &claims, &self.encoding_key).map_err(auth_error)
    }

    fn validate_token(&self, token: &str) -> Result<TokenClaims, AuthError> {
        decode::<SessionClaims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims.into())
            .map_err(auth_error)
    }

    fn expiration_seconds(&self) -> i64 {
        TimeDelta::hours(self.config.expiration_hours).num_seconds()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service_with(issuer: &str, expiration_hours: i64) -> JwtTokenService {
        JwtTokenService::new(JwtConfig {
            secret: "newsroom-test-secret".to_string(),
            expiration_hours,
            issuer: issuer.to_string(),
        })
    }

    #[test]
    fn test_session_round_trip_keeps_permissions() {
        let service = service_with("newsroom", 1);
        let user_id = Uuid::new_v4();
        let granted = vec!["news.add_post".to_string(), "news.delete_post".to_string()];

        let token = service
            .generate_token(user_id, "editor", granted.clone())
            .unwrap();
        let claims = service.validate_token(&token).unwrap();

        assert_eq!(claims.user_id, user_id);
        assert_eq!(claims.username, "editor");
        assert_eq!(claims.permissions, granted);
    }

    #[test]
    fn test_garbage_token_is_invalid() {
        let service = service_with("newsroom", 1);

        assert!(matches!(
            service.validate_token("not.a.jwt"),
            Err(AuthError::InvalidToken(_))
        ));
    }

    #[test]
    fn test_token_from_other_issuer_is_rejected() {
        let token = service_with("elsewhere", 1)
            .generate_token(Uuid::new_v4(), "reader", vec![])
            .unwrap();

        assert!(service_with("newsroom", 1).validate_token(&token).is_err());
    }

    #[test]
    fn test_stale_session_is_expired() {
        let service = service_with("newsroom", -2);
        let token = service
            .generate_token(Uuid::new_v4(), "reader", vec![])
            .unwrap();

        assert!(matches!(
            service.validate_token(&token),
            Err(AuthError::TokenExpired)
        ));
    }

    #[test]
    fn test_lifetime_and_default_secret() {
        assert_eq!(service_with("newsroom", 24).expiration_seconds(), 86_400);
        assert!(JwtConfig::default().uses_default_secret());
    }
}
