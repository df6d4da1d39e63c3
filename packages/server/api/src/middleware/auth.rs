use crate::handlers::ServiceError;
use crate::services::auth::{AuthError, Claims};
use crate::state::AppState;
use axum::{
    body::Body,
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};

/// The caller of a protected route.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AuthUser {
    pub user_id: String,
}

impl AuthUser {
    /// Stand-in identity when no verifier is configured.
    pub fn anonymous() -> Self {
        Self {
            user_id: "anonymous".to_string(),
        }
    }
}

impl From<Claims> for AuthUser {
    fn from(claims: Claims) -> Self {
        Self {
            user_id: claims.sub,
        }
    }
}

fn bearer_token(req: &Request<Body>) -> Result<&str, AuthError> {
    let value = req
        .headers()
        .get(header::AUTHORIZATION)
        .ok_or(AuthError::MissingToken)?;
    let value = value.to_str().map_err(|_| AuthError::MalformedHeader)?;

    match value.split_once(' ') {
        Some((scheme, token)) if scheme.eq_ignore_ascii_case("bearer") && !token.trim().is_empty() => {
            Ok(token.trim())
        }
        _ => Err(AuthError::MalformedHeader),
    }
}

/// Rejects requests without a valid bearer token and records the caller as
/// an [`AuthUser`] extension.
pub async fn require_auth(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, ServiceError> {
    let user = match &state.verifier {
        None => AuthUser::anonymous(),
        Some(verifier) => {
            let token = bearer_token(&req)?.to_string();
            let claims = verifier.verify(&token).await.map_err(|e| {
                tracing::debug!("Rejected token: {}", e);
                e
            })?;
            AuthUser::from(claims)
        }
    };

    req.extensions_mut().insert(user);
    Ok(next.run(req).await)
}
