use axum::{Json, extract::State, http::{HeaderMap, StatusCode, header}};
use bson::DateTime;
use serde::{Deserialize, Serialize};
use shopsquad_db::models::{PasswordReset, User};
use shopsquad_services::auth::TokenPair;
use tracing::warn;

use crate::{error::ApiError, extractors::auth::AuthUser, state::AppState};

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub username: String,
    pub display_name: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_in: u64,
    pub user: UserResponse,
}

#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: String,
    pub email: String,
    pub username: String,
    pub display_name: String,
    pub avatar: Option<String>,
    pub is_admin: bool,
}

impl UserResponse {
    pub fn from_user(user: &User) -> Result<Self, ApiError> {
        let id = user
            .id
            .ok_or_else(|| ApiError::Internal("User has no id".to_string()))?;
        Ok(Self {
            id: id.to_hex(),
            email: user.email.clone(),
            username: user.username.clone(),
            display_name: user.display_name.clone(),
            avatar: user.avatar.clone(),
            is_admin: user.is_admin,
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

fn auth_cookie(tokens: &TokenPair) -> Result<HeaderMap, ApiError> {
    let cookie = format!(
        "access_token={}; HttpOnly; Path=/; SameSite=Lax; Max-Age={}",
        tokens.access_token, tokens.expires_in
    );
    let mut headers = HeaderMap::new();
    headers.insert(
        header::SET_COOKIE,
        cookie
            .parse()
            .map_err(|_| ApiError::Internal("Invalid cookie header".to_string()))?,
    );
    Ok(headers)
}

pub async fn register(
    State(state): State<AppState>,
    Json(body): Json<RegisterRequest>,
) -> Result<(StatusCode, HeaderMap, Json<AuthResponse>), ApiError> {
    if body.password.len() < 8 {
        return Err(ApiError::Validation(
            "Password must be at least 8 characters".to_string(),
        ));
    }

    let password_hash = state.auth.hash_password(&body.password)?;

    let user = state
        .users
        .create(
            body.email.clone(),
            body.username.clone(),
            body.display_name.clone(),
            password_hash,
        )
        .await?;

    let user_response = UserResponse::from_user(&user)?;
    let user_id = user
        .id
        .ok_or_else(|| ApiError::Internal("User has no id".to_string()))?;

    let tokens = state
        .auth
        .generate_tokens(user_id, &user.email, &user.username)?;
    let headers = auth_cookie(&tokens)?;

    let response = AuthResponse {
        access_token: tokens.access_token,
        refresh_token: tokens.refresh_token,
        expires_in: tokens.expires_in,
        user: user_response,
    };

    Ok((StatusCode::CREATED, headers, Json(response)))
}

pub async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginRequest>,
) -> Result<(HeaderMap, Json<AuthResponse>), ApiError> {
    let user = if let Some(ref username) = body.username {
        state.users.find_by_username(username).await
    } else if let Some(ref email) = body.email {
        state.users.find_by_email(email).await
    } else {
        return Err(ApiError::BadRequest(
            "Either username or email is required".to_string(),
        ));
    }
    .map_err(|_| ApiError::Unauthorized("Invalid credentials".to_string()))?;

    let password_hash = user
        .password_hash
        .as_ref()
        .ok_or_else(|| ApiError::Unauthorized("No password set".to_string()))?;

    let valid = state.auth.verify_password(&body.password, password_hash)?;
    if !valid {
        return Err(ApiError::Unauthorized("Invalid credentials".to_string()));
    }

    let user_response = UserResponse::from_user(&user)?;
    let user_id = user
        .id
        .ok_or_else(|| ApiError::Internal("User has no id".to_string()))?;
    let tokens = state
        .auth
        .generate_tokens(user_id, &user.email, &user.username)?;
    let headers = auth_cookie(&tokens)?;

    let response = AuthResponse {
        access_token: tokens.access_token,
        refresh_token: tokens.refresh_token,
        expires_in: tokens.expires_in,
        user: user_response,
    };

    Ok((headers, Json(response)))
}

pub async fn logout() -> Result<HeaderMap, ApiError> {
    let cookie = "access_token=; HttpOnly; Path=/; SameSite=Lax; Max-Age=0";
    let mut headers = HeaderMap::new();
    headers.insert(
        header::SET_COOKIE,
        cookie
            .parse()
            .map_err(|_| ApiError::Internal("Invalid cookie header".to_string()))?,
    );
    Ok(headers)
}

pub async fn me(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<UserResponse>, ApiError> {
    let user = state.users.base.find_by_id(auth.user_id).await?;
    Ok(Json(UserResponse::from_user(&user)?))
}

#[derive(Debug, Deserialize)]
pub struct UpdateMeRequest {
    pub display_name: Option<String>,
    pub avatar: Option<String>,
}

pub async fn update_me(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(body): Json<UpdateMeRequest>,
) -> Result<Json<UserResponse>, ApiError> {
    state
        .users
        .update_profile(auth.user_id, body.display_name, body.avatar)
        .await?;

    let user = state.users.base.find_by_id(auth.user_id).await?;
    Ok(Json(UserResponse::from_user(&user)?))
}

pub async fn refresh(
    State(state): State<AppState>,
    Json(body): Json<RefreshRequest>,
) -> Result<(HeaderMap, Json<AuthResponse>), ApiError> {
    let claims = state.auth.verify_refresh_token(&body.refresh_token)?;

    let user_id = bson::oid::ObjectId::parse_str(&claims.sub)
        .map_err(|_| ApiError::Unauthorized("Invalid user ID".to_string()))?;

    let user = state.users.base.find_by_id(user_id).await?;

    let tokens = state
        .auth
        .generate_tokens(user_id, &user.email, &user.username)?;
    let headers = auth_cookie(&tokens)?;

    let response = AuthResponse {
        access_token: tokens.access_token,
        refresh_token: tokens.refresh_token,
        expires_in: tokens.expires_in,
        user: UserResponse::from_user(&user)?,
    };

    Ok((headers, Json(response)))
}

#[derive(Debug, Deserialize)]
pub struct ChangePasswordRequest {
    pub current_password: String,
    pub new_password: String,
}

/// Requires the current password; a stolen session alone cannot rotate it.
pub async fn change_password(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(body): Json<ChangePasswordRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    if body.new_password.len() < 8 {
        return Err(ApiError::Validation(
            "Password must be at least 8 characters".to_string(),
        ));
    }

    let user = state.users.base.find_by_id(auth.user_id).await?;
    let password_hash = user
        .password_hash
        .as_ref()
        .ok_or_else(|| ApiError::Unauthorized("No password set".to_string()))?;

    if !state
        .auth
        .verify_password(&body.current_password, password_hash)?
    {
        return Err(ApiError::Unauthorized(
            "Current password is incorrect".to_string(),
        ));
    }

    let new_hash = state.auth.hash_password(&body.new_password)?;
    state.users.set_password_hash(auth.user_id, new_hash).await?;

    Ok(Json(serde_json::json!({ "changed": true })))
}

#[derive(Debug, Deserialize)]
pub struct ResetRequestRequest {
    pub email: String,
}

/// Always answers the same way so the endpoint cannot be used to probe
/// which emails have accounts.
pub async fn request_password_reset(
    State(state): State<AppState>,
    Json(body): Json<ResetRequestRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    if let Ok(user) = state.users.find_by_email(&body.email).await {
        if let Some(user_id) = user.id {
            let (token, digest) = state.auth.generate_reset_token();
            let ttl = state.settings.party.reset_token_ttl_secs as i64;
            let reset = PasswordReset {
                token_hash: digest,
                expires_at: DateTime::from_millis(
                    DateTime::now().timestamp_millis() + ttl * 1000,
                ),
            };
            state.users.set_password_reset(user_id, &reset).await?;

            let email = state.email.clone();
            let public_url = state.settings.app.public_url.clone();
            tokio::spawn(async move {
                if let Err(e) = email
                    .send_password_reset(&user.email, &user.display_name, &public_url, &token)
                    .await
                {
                    warn!(%e, "Failed to send password-reset email");
                }
            });
        }
    }

    Ok(Json(serde_json::json!({ "requested": true })))
}

#[derive(Debug, Deserialize)]
pub struct ResetConfirmRequest {
    pub token: String,
    pub new_password: String,
}

pub async fn confirm_password_reset(
    State(state): State<AppState>,
    Json(body): Json<ResetConfirmRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    if body.new_password.len() < 8 {
        return Err(ApiError::Validation(
            "Password must be at least 8 characters".to_string(),
        ));
    }

    let digest = shopsquad_services::AuthService::reset_token_digest(&body.token);
    let user = state
        .users
        .find_by_reset_digest(&digest)
        .await
        .map_err(|_| ApiError::Unauthorized("Invalid or expired reset token".to_string()))?;

    let user_id = user
        .id
        .ok_or_else(|| ApiError::Internal("User has no id".to_string()))?;
    let new_hash = state.auth.hash_password(&body.new_password)?;
    state.users.set_password_hash(user_id, new_hash).await?;

    Ok(Json(serde_json::json!({ "reset": true })))
}
