use axum::{Extension, Json};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::auth::{self, password, permissions, Claims};
use crate::database::actions::users::{NewUser, UserActions};
use crate::database::manager;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::models::User;
use crate::services::outbound::CrmClient;
use crate::validate;

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: Option<String>,
    pub password: Option<String>,
    pub full_name: Option<String>,
    pub phone: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub token: String,
    pub expires_in: i64,
    pub user: User,
}

/// POST /auth/register - create a student account and issue a token
pub async fn register(Json(payload): Json<RegisterRequest>) -> ApiResult<TokenResponse> {
    let email = validate::require_email("email", payload.email.as_deref())?;
    let pw = validate::require_password("password", payload.password.as_deref())?;
    let full_name = validate::require_str("full_name", payload.full_name.as_deref())?;

    let pool = manager::pool().await?;
    let users = UserActions::new(pool);

    if users.find_by_email(&email).await?.is_some() {
        return Err(ApiError::conflict("An account with this email already exists"));
    }

    let password_hash = password::hash_password(&pw)?;
    let user = users
        .create(NewUser {
            email,
            password_hash,
            full_name,
            phone: payload.phone,
            roles: vec![permissions::ROLE_STUDENT.to_string()],
        })
        .await?;

    // CRM notification is fire-and-forget; a CRM outage must not fail
    // registration
    let crm_user = user.clone();
    tokio::spawn(async move {
        match CrmClient::from_config() {
            Ok(crm) => {
                if let Err(e) = crm.notify_registration(&crm_user).await {
                    tracing::warn!("CRM registration notify failed for {}: {}", crm_user.id, e);
                }
            }
            Err(e) => tracing::warn!("CRM client unavailable: {}", e),
        }
    });

    Ok(ApiResponse::created(issue_token(user)?))
}

/// POST /auth/login - verify credentials and issue a token
pub async fn login(Json(payload): Json<LoginRequest>) -> ApiResult<TokenResponse> {
    let email = validate::require_email("email", payload.email.as_deref())?;
    let pw = validate::require_str("password", payload.password.as_deref())?;

    let pool = manager::pool().await?;
    let users = UserActions::new(pool);

    let user = users
        .find_by_email(&email)
        .await?
        .ok_or_else(|| ApiError::unauthorized("Invalid email or password"))?;

    if !password::verify_password(&pw, &user.password_hash)? {
        return Err(ApiError::unauthorized("Invalid email or password"));
    }

    if !user.is_active {
        return Err(ApiError::forbidden("Account is disabled"));
    }

    Ok(ApiResponse::success(issue_token(user)?))
}

/// GET /api/auth/whoami - decoded identity of the caller
pub async fn whoami(Extension(auth_user): Extension<AuthUser>) -> ApiResult<Value> {
    Ok(ApiResponse::success(json!({
        "user_id": auth_user.user_id,
        "email": auth_user.email,
        "roles": auth_user.roles,
        "permissions": auth_user.permissions,
    })))
}

fn issue_token(user: User) -> Result<TokenResponse, ApiError> {
    let claims = Claims::new(user.id, user.email.clone(), user.roles.clone());
    let expires_in = claims.exp - claims.iat;
    let token = auth::generate_jwt(&claims)?;
    Ok(TokenResponse { token, expires_in, user })
}
