use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};
use jsonwebtoken::{decode, DecodingKey, Validation};
use uuid::Uuid;

use crate::auth::{permissions, Claims};
use crate::config;
use crate::error::ApiError;

/// Authenticated user context extracted from JWT
#[derive(Clone, Debug)]
pub struct AuthUser {
    pub user_id: Uuid,
    pub email: String,
    pub roles: Vec<String>,
    pub permissions: Vec<String>,
}

impl From<Claims> for AuthUser {
    fn from(claims: Claims) -> Self {
        Self {
            user_id: claims.sub,
            email: claims.email,
            roles: claims.roles,
            permissions: claims.permissions,
        }
    }
}

/// JWT authentication middleware that validates tokens and extracts user context
pub async fn jwt_auth_middleware(
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = extract_bearer_token(&headers).map_err(ApiError::unauthorized)?;
    let claims = validate_jwt(&token).map_err(ApiError::unauthorized)?;

    // Convert claims to AuthUser and inject into request
    let auth_user = AuthUser::from(claims);
    request.extensions_mut().insert(auth_user);

    Ok(next.run(request).await)
}

/// Permission middleware: any-of check between the route group's
/// requirements (from the policy table) and the caller's permission set.
/// Must run after `jwt_auth_middleware`.
pub async fn permission_middleware(
    State(required): State<&'static [&'static str]>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let auth_user = request
        .extensions()
        .get::<AuthUser>()
        .ok_or_else(|| ApiError::unauthorized("Authentication required"))?;

    if !permissions::any_granted(&auth_user.permissions, required) {
        return Err(ApiError::forbidden("Insufficient permissions"));
    }

    Ok(next.run(request).await)
}

/// Dependent services authenticated by static API key
#[derive(Clone, Copy, Debug)]
pub enum ServiceKind {
    Crm,
    Meet,
    Payment,
    Zalo,
}

impl ServiceKind {
    fn expected_key(&self) -> &'static str {
        let services = &config::config().services;
        match self {
            ServiceKind::Crm => &services.crm_api_key,
            ServiceKind::Meet => &services.meet_api_key,
            ServiceKind::Payment => &services.payment_api_key,
            ServiceKind::Zalo => &services.zalo_api_key,
        }
    }
}

/// Machine-to-machine webhook authentication: compares the `api-key` header
/// against the statically configured per-service key.
pub async fn service_key_middleware(
    State(service): State<ServiceKind>,
    headers: HeaderMap,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let presented = headers
        .get("api-key")
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| ApiError::unauthorized("Missing api-key header"))?;

    let expected = service.expected_key();
    if expected.is_empty() || presented != expected {
        return Err(ApiError::unauthorized("Invalid api-key"));
    }

    Ok(next.run(request).await)
}

/// Extract bearer token from Authorization header
fn extract_bearer_token(headers: &HeaderMap) -> Result<String, String> {
    let auth_header = headers
        .get("authorization")
        .or_else(|| headers.get("Authorization"))
        .ok_or_else(|| "Missing Authorization header".to_string())?;

    let auth_str = auth_header
        .to_str()
        .map_err(|_| "Invalid Authorization header format".to_string())?;

    if let Some(token) = auth_str.strip_prefix("Bearer ") {
        if token.trim().is_empty() {
            return Err("Empty bearer token".to_string());
        }
        Ok(token.to_string())
    } else {
        Err("Authorization header must use Bearer token format".to_string())
    }
}

/// Validate JWT token and extract claims
fn validate_jwt(token: &str) -> Result<Claims, String> {
    let secret = &config::config().security.jwt_secret;

    if secret.is_empty() {
        return Err("JWT secret not configured".to_string());
    }

    let decoding_key = DecodingKey::from_secret(secret.as_bytes());
    let validation = Validation::default();

    let token_data = decode::<Claims>(token, &decoding_key, &validation)
        .map_err(|e| format!("Invalid token: {}", e))?;

    Ok(token_data.claims)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers_with_auth(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert("authorization", HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn bearer_extraction_accepts_well_formed_header() {
        let headers = headers_with_auth("Bearer abc.def.ghi");
        assert_eq!(extract_bearer_token(&headers).unwrap(), "abc.def.ghi");
    }

    #[test]
    fn bearer_extraction_rejects_missing_header() {
        let err = extract_bearer_token(&HeaderMap::new()).unwrap_err();
        assert!(err.contains("Missing"));
    }

    #[test]
    fn bearer_extraction_rejects_basic_scheme() {
        let headers = headers_with_auth("Basic dXNlcjpwYXNz");
        assert!(extract_bearer_token(&headers).is_err());
    }

    #[test]
    fn bearer_extraction_rejects_empty_token() {
        let headers = headers_with_auth("Bearer   ");
        assert!(extract_bearer_token(&headers).is_err());
    }

    #[test]
    fn jwt_roundtrip_through_validation() {
        // Development config has a non-empty secret
        std::env::remove_var("APP_ENV");
        let claims = crate::auth::Claims::new(
            uuid::Uuid::new_v4(),
            "t@example.com".to_string(),
            vec!["admin".to_string()],
        );
        let token = crate::auth::generate_jwt(&claims).unwrap();
        let decoded = validate_jwt(&token).unwrap();
        assert_eq!(decoded.sub, claims.sub);
        assert!(decoded.permissions.contains(&"user_manage".to_string()));
    }

    #[test]
    fn garbage_token_is_rejected() {
        assert!(validate_jwt("not-a-jwt").is_err());
    }
}
