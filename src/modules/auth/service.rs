use std::sync::Arc;

use chrono::Duration;
use tracing::{debug, error, info, instrument, warn};

use liceum_auth::{Claims, Clock, CodeStore, TokenIssuer, TokenKind, TokenPair, generate_code};
use liceum_config::{AuthCodeConfig, JwtConfig, normalize_email};
use liceum_core::AuthError;

use crate::metrics;
use crate::utils::email::Mailer;

pub const AUTH_CODE_SUBJECT: &str = "Your Liceum sign-in code";

pub fn auth_code_body(code: &str, ttl: Duration) -> String {
    format!(
        "Your sign-in code is {}.\n\n\
         It expires in {} seconds. If you did not request it, ignore this email.",
        code,
        ttl.num_seconds()
    )
}

/// Administrator login: allow-list check, emailed one-time code, token pair.
///
/// Per identity the flow moves `NoCode -> CodeIssued -> Verified | Expired | Replaced`.
/// That state lives entirely in the [`CodeStore`]; tokens are stateless.
pub struct AuthService {
    admins: AuthCodeConfig,
    codes: CodeStore,
    tokens: TokenIssuer,
    mailer: Arc<dyn Mailer>,
}

impl AuthService {
    pub fn new(
        admins: AuthCodeConfig,
        codes: CodeStore,
        tokens: TokenIssuer,
        mailer: Arc<dyn Mailer>,
    ) -> Self {
        Self {
            admins,
            codes,
            tokens,
            mailer,
        }
    }

    pub fn from_config(
        auth_config: AuthCodeConfig,
        jwt_config: &JwtConfig,
        mailer: Arc<dyn Mailer>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let codes = CodeStore::with_clock(Duration::seconds(auth_config.code_ttl), clock.clone())
            .single_use(auth_config.single_use);
        let tokens = TokenIssuer::with_clock(jwt_config, clock);
        Self::new(auth_config, codes, tokens, mailer)
    }

    pub fn code_store(&self) -> &CodeStore {
        &self.codes
    }

    pub fn check_is_admin(&self, email: &str) -> bool {
        self.admins.is_admin(email)
    }

    /// Emails a fresh code to an administrator.
    ///
    /// The code is stored only after the mailer accepted it, so a failed
    /// delivery leaves any previous code untouched.
    #[instrument(skip(self), fields(auth.email = %email))]
    pub async fn send_auth_code(&self, email: &str) -> Result<(), AuthError> {
        let email = normalize_email(email);
        if !self.check_is_admin(&email) {
            warn!("Auth code requested for non-admin identity");
            return Err(AuthError::NotAdmin(email));
        }

        let code = generate_code();
        let body = auth_code_body(&code, self.codes.ttl());

        if let Err(e) = self.mailer.send(&email, AUTH_CODE_SUBJECT, &body).await {
            error!(error = %e, "Failed to deliver auth code");
            metrics::track_code_delivery_failure();
            return Err(AuthError::DeliveryFailed(e.to_string()));
        }

        self.codes.set_code(&email, &code).await;
        metrics::track_code_sent();
        info!("Auth code sent");
        Ok(())
    }

    #[instrument(skip(self, code), fields(auth.email = %email))]
    pub async fn verify_code(&self, email: &str, code: &str) -> Result<TokenPair, AuthError> {
        let email = normalize_email(email);
        let verified = self.codes.verify_code(&email, code.trim()).await;
        metrics::track_code_verification(verified);

        if !verified {
            debug!("Code rejected");
            return Err(AuthError::WrongCode);
        }

        let pair = self.tokens.issue_pair(&email)?;
        metrics::track_tokens_issued();
        info!("Code verified, token pair issued");
        Ok(pair)
    }

    /// Exchanges a refresh token for a new pair.
    ///
    /// The presented token stays valid until its own expiry.
    #[instrument(skip(self, refresh_token))]
    pub async fn refresh_token(&self, refresh_token: &str) -> Result<TokenPair, AuthError> {
        let claims = self
            .tokens
            .parse_kind(refresh_token, TokenKind::Refresh)
            .inspect_err(|e| {
                debug!(error = %e, "Refresh token rejected");
                metrics::track_token_refresh(false);
            })?;

        let pair = self.tokens.issue_pair(&claims.email)?;
        metrics::track_token_refresh(true);
        info!(auth.email = %claims.email, "Token pair refreshed");
        Ok(pair)
    }

    /// Validates an access token and returns its claims.
    pub fn parse_token(&self, access_token: &str) -> Result<Claims, AuthError> {
        self.tokens.parse_kind(access_token, TokenKind::Access)
    }
}
