use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::Response,
};
use jsonwebtoken::{decode, DecodingKey, Validation};
use serde::{Deserialize, Serialize};

use crate::state::AppState;
use cantina_shared::models::events::Purchaser;

/// Session claims issued by the identity provider. `sub` is the user id
/// the engines trust verbatim.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub sub: String,
    pub email: Option<String>,
    pub name: Option<String>,
    pub role: String,
    pub exp: usize,
}

impl Claims {
    pub fn purchaser(&self) -> Purchaser {
        Purchaser {
            id: self.sub.clone(),
            email: self.email.clone(),
            name: self.name.clone(),
            role: Some(self.role.clone()),
        }
    }

    pub fn is_staff(&self) -> bool {
        self.role == "STAFF" || self.role == "ADMIN"
    }
}

fn decode_claims(state: &AppState, req: &Request) -> Result<Claims, StatusCode> {
    // 1. Extract token from Authorization header
    let auth_header = req
        .headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .ok_or(StatusCode::UNAUTHORIZED)?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or(StatusCode::UNAUTHORIZED)?;

    // 2. Decode and validate JWT
    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(state.auth.secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|_| StatusCode::UNAUTHORIZED)?;

    Ok(token_data.claims)
}

/// Any authenticated user. Injects the claims into request extensions.
pub async fn customer_auth_middleware(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let claims = decode_claims(&state, &req)?;
    req.extensions_mut().insert(claims);
    Ok(next.run(req).await)
}

/// Staff-only routes: requires role STAFF or ADMIN.
pub async fn staff_auth_middleware(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let claims = decode_claims(&state, &req)?;

    if !claims.is_staff() {
        return Err(StatusCode::FORBIDDEN);
    }

    req.extensions_mut().insert(claims);
    Ok(next.run(req).await)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_staff_check_accepts_staff_and_admin_only() {
        let mut claims = Claims {
            sub: "user-1".to_string(),
            email: None,
            name: None,
            role: "CUSTOMER".to_string(),
            exp: 0,
        };
        assert!(!claims.is_staff());
        claims.role = "STAFF".to_string();
        assert!(claims.is_staff());
        claims.role = "ADMIN".to_string();
        assert!(claims.is_staff());
    }
}
