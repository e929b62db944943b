use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header, request::Parts},
    middleware::Next,
    response::Response,
};
use tracing::debug;

use liceum_auth::Claims;
use liceum_core::AppError;

use crate::state::AppState;

/// An administrator authenticated by a bearer access token.
///
/// The token must be an unexpired access token and its `email` claim must
/// still be on the allow-list. Every failure is a 401.
#[derive(Debug, Clone)]
pub struct AdminUser {
    pub email: String,
    pub claims: Claims,
}

fn bearer_token(parts: &Parts) -> Result<&str, AppError> {
    let auth_header = parts
        .headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .ok_or_else(|| AppError::unauthorized(anyhow::anyhow!("Missing authorization header")))?;

    auth_header
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or_else(|| {
            AppError::unauthorized(anyhow::anyhow!("Invalid authorization header format"))
        })
}

impl FromRequestParts<AppState> for AdminUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        if let Some(admin) = parts.extensions.get::<AdminUser>() {
            return Ok(admin.clone());
        }

        let token = bearer_token(parts)?;
        let claims = state
            .auth
            .parse_token(token)
            .map_err(AppError::unauthorized)?;

        // Removing an address from ADMIN_EMAILS revokes its live tokens.
        if !state.auth.check_is_admin(&claims.email) {
            debug!(auth.email = %claims.email, "Token holder is no longer an administrator");
            return Err(AppError::unauthorized(anyhow::anyhow!(
                "Administrator access required"
            )));
        }

        Ok(AdminUser {
            email: claims.email.clone(),
            claims,
        })
    }
}

/// Route layer guarding the admin router.
pub async fn require_admin(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let (mut parts, body) = req.into_parts();
    let admin = AdminUser::from_request_parts(&mut parts, &state).await?;
    parts.extensions.insert(admin);

    Ok(next.run(Request::from_parts(parts, body)).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request as HttpRequest;

    fn parts_with(header_value: Option<&str>) -> Parts {
        let mut builder = HttpRequest::builder().uri("/api/admin/events");
        if let Some(value) = header_value {
            builder = builder.header(header::AUTHORIZATION, value);
        }
        let (parts, _) = builder.body(()).unwrap().into_parts();
        parts
    }

    #[test]
    fn test_bearer_token_extracts_token() {
        let parts = parts_with(Some("Bearer abc.def.ghi"));
        assert_eq!(bearer_token(&parts).unwrap(), "abc.def.ghi");
    }

    #[test]
    fn test_bearer_token_missing_header() {
        let parts = parts_with(None);
        let err = bearer_token(&parts).unwrap_err();
        assert_eq!(err.status, axum::http::StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn test_bearer_token_wrong_scheme() {
        let parts = parts_with(Some("Basic dXNlcjpwYXNz"));
        assert!(bearer_token(&parts).is_err());

        let parts = parts_with(Some("Bearer "));
        assert!(bearer_token(&parts).is_err());
    }
}
