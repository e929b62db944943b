//! Token issuance and validation.
//!
//! Tokens are HS256 JWTs signed with the process-wide secret from
//! [`JwtConfig`]. They are self-contained: validity depends only on the
//! signature and the `exp` claim, there is no server-side session table.
//!
//! Expiry is checked against the issuer's [`Clock`] rather than by
//! `jsonwebtoken` itself, so a manual clock can move tokens past `exp`.
//!
//! # Example
//!
//! ```ignore
//! use liceum_auth::{TokenIssuer, TokenKind};
//! use liceum_config::JwtConfig;
//!
//! let issuer = TokenIssuer::new(&JwtConfig::from_env());
//! let pair = issuer.issue_pair("admin@school.org")?;
//! let claims = issuer.parse_kind(&pair.access, TokenKind::Access)?;
//! assert_eq!(claims.email, "admin@school.org");
//! ```

use std::fmt;
use std::sync::Arc;

use chrono::Duration;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use tracing::{debug, error};
use uuid::Uuid;

use liceum_config::JwtConfig;
use liceum_core::AuthError;

use crate::claims::{Claims, TokenKind, TokenPair};
use crate::clock::{Clock, SystemClock};

const ALGORITHM: Algorithm = Algorithm::HS256;

#[derive(Clone)]
pub struct TokenIssuer {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    access_ttl: Duration,
    refresh_ttl: Duration,
    clock: Arc<dyn Clock>,
}

impl fmt::Debug for TokenIssuer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenIssuer")
            .field("access_ttl", &self.access_ttl)
            .field("refresh_ttl", &self.refresh_ttl)
            .finish_non_exhaustive()
    }
}

impl TokenIssuer {
    pub fn new(config: &JwtConfig) -> Self {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    pub fn with_clock(config: &JwtConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(config.secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.secret.as_bytes()),
            access_ttl: Duration::seconds(config.access_token_expiry),
            refresh_ttl: Duration::seconds(config.refresh_token_expiry),
            clock,
        }
    }

    pub fn access_ttl(&self) -> Duration {
        self.access_ttl
    }

    pub fn refresh_ttl(&self) -> Duration {
        self.refresh_ttl
    }

    /// Signs a token for `email` that expires `ttl` from now.
    pub fn issue(&self, email: &str, kind: TokenKind, ttl: Duration) -> Result<String, AuthError> {
        let now = self.clock.now();
        let claims = Claims {
            email: email.to_string(),
            kind,
            exp: (now + ttl).timestamp(),
            iat: now.timestamp(),
            jti: Uuid::new_v4().to_string(),
        };

        encode(&Header::new(ALGORITHM), &claims, &self.encoding_key).map_err(|e| {
            error!(error = %e, "Token signing failed; check JWT_SECRET");
            AuthError::Signing(e.to_string())
        })
    }

    /// Issues a fresh access + refresh pair with the configured validity windows.
    pub fn issue_pair(&self, email: &str) -> Result<TokenPair, AuthError> {
        Ok(TokenPair {
            access: self.issue(email, TokenKind::Access, self.access_ttl)?,
            refresh: self.issue(email, TokenKind::Refresh, self.refresh_ttl)?,
        })
    }

    /// Verifies signature, algorithm and expiry, returning the embedded claims.
    pub fn parse(&self, token: &str) -> Result<Claims, AuthError> {
        let mut validation = Validation::new(ALGORITHM);
        validation.validate_exp = false;
        validation.leeway = 0;

        let claims = decode::<Claims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|e| {
                debug!(error = %e, "Rejected token");
                match e.kind() {
                    ErrorKind::ExpiredSignature => AuthError::ExpiredToken,
                    _ => AuthError::InvalidToken,
                }
            })?;

        if claims.exp <= self.clock.now().timestamp() {
            return Err(AuthError::ExpiredToken);
        }

        Ok(claims)
    }

    /// Like [`parse`](Self::parse), but also requires the given token kind.
    pub fn parse_kind(&self, token: &str, kind: TokenKind) -> Result<Claims, AuthError> {
        let claims = self.parse(token)?;
        if claims.kind != kind {
            debug!(expected = ?kind, actual = ?claims.kind, "Token kind mismatch");
            return Err(AuthError::InvalidToken);
        }
        Ok(claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;

    fn get_test_jwt_config() -> JwtConfig {
        JwtConfig {
            secret: "test-secret-key-at-least-32-characters-long".to_string(),
            access_token_expiry: 900,
            refresh_token_expiry: 1_296_000,
        }
    }

    fn issuer_with_clock() -> (TokenIssuer, ManualClock) {
        let clock = ManualClock::starting_now();
        let issuer = TokenIssuer::with_clock(&get_test_jwt_config(), Arc::new(clock.clone()));
        (issuer, clock)
    }

    #[test]
    fn test_issue_and_parse() {
        let (issuer, _) = issuer_with_clock();
        let token = issuer
            .issue("a@x.com", TokenKind::Access, Duration::minutes(15))
            .unwrap();

        let claims = issuer.parse(&token).unwrap();
        assert_eq!(claims.email, "a@x.com");
        assert_eq!(claims.kind, TokenKind::Access);
        assert_eq!(claims.exp - claims.iat, 900);
    }

    #[test]
    fn test_parse_expired_token() {
        let (issuer, clock) = issuer_with_clock();
        let token = issuer
            .issue("a@x.com", TokenKind::Access, Duration::minutes(15))
            .unwrap();

        clock.advance(Duration::minutes(15) + Duration::seconds(1));
        assert_eq!(issuer.parse(&token), Err(AuthError::ExpiredToken));
    }

    #[test]
    fn test_parse_token_just_before_expiry() {
        let (issuer, clock) = issuer_with_clock();
        let token = issuer
            .issue("a@x.com", TokenKind::Access, Duration::minutes(15))
            .unwrap();

        clock.advance(Duration::minutes(14));
        assert!(issuer.parse(&token).is_ok());
    }

    #[test]
    fn test_parse_garbage() {
        let (issuer, _) = issuer_with_clock();
        assert_eq!(issuer.parse("invalid-token"), Err(AuthError::InvalidToken));
        assert_eq!(issuer.parse(""), Err(AuthError::InvalidToken));
    }

    #[test]
    fn test_parse_wrong_secret() {
        let (issuer, _) = issuer_with_clock();
        let token = issuer
            .issue("a@x.com", TokenKind::Access, Duration::minutes(15))
            .unwrap();

        let other = TokenIssuer::new(&JwtConfig {
            secret: "different-secret-key-at-least-32-characters".to_string(),
            ..get_test_jwt_config()
        });
        assert_eq!(other.parse(&token), Err(AuthError::InvalidToken));
    }

    #[test]
    fn test_parse_tampered_payload() {
        let (issuer, _) = issuer_with_clock();
        let genuine = issuer
            .issue("a@x.com", TokenKind::Access, Duration::minutes(15))
            .unwrap();
        let forged = issuer
            .issue("evil@x.com", TokenKind::Access, Duration::minutes(15))
            .unwrap();

        let genuine_parts: Vec<&str> = genuine.split('.').collect();
        let forged_parts: Vec<&str> = forged.split('.').collect();
        let tampered = format!(
            "{}.{}.{}",
            genuine_parts[0], forged_parts[1], genuine_parts[2]
        );

        assert_eq!(issuer.parse(&tampered), Err(AuthError::InvalidToken));
    }

    #[test]
    fn test_parse_rejects_other_algorithm() {
        let (issuer, _) = issuer_with_clock();
        let config = get_test_jwt_config();
        let now = chrono::Utc::now();
        let claims = Claims {
            email: "a@x.com".to_string(),
            kind: TokenKind::Access,
            exp: (now + Duration::minutes(15)).timestamp(),
            iat: now.timestamp(),
            jti: "jti".to_string(),
        };
        let token = encode(
            &Header::new(Algorithm::HS512),
            &claims,
            &EncodingKey::from_secret(config.secret.as_bytes()),
        )
        .unwrap();

        assert_eq!(issuer.parse(&token), Err(AuthError::InvalidToken));
    }

    #[test]
    fn test_issue_pair_windows() {
        let (issuer, _) = issuer_with_clock();
        let pair = issuer.issue_pair("a@x.com").unwrap();

        let access = issuer.parse_kind(&pair.access, TokenKind::Access).unwrap();
        let refresh = issuer.parse_kind(&pair.refresh, TokenKind::Refresh).unwrap();

        assert_eq!(access.exp - access.iat, 15 * 60);
        assert_eq!(refresh.exp - refresh.iat, 15 * 24 * 60 * 60);
        assert!(refresh.exp > access.exp);
        assert_ne!(access.jti, refresh.jti);
    }

    #[test]
    fn test_parse_kind_mismatch() {
        let (issuer, _) = issuer_with_clock();
        let pair = issuer.issue_pair("a@x.com").unwrap();

        assert_eq!(
            issuer.parse_kind(&pair.access, TokenKind::Refresh),
            Err(AuthError::InvalidToken)
        );
        assert_eq!(
            issuer.parse_kind(&pair.refresh, TokenKind::Access),
            Err(AuthError::InvalidToken)
        );
    }
}
