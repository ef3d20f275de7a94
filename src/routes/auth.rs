use axum::extract::State;
use axum::http::HeaderMap;
use axum::routing::{get, post};
use axum::{Form, Json, Router};
use chrono::Utc;
use http::StatusCode;
use serde_json::{json, Value};
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::auth::{LoginForm, RegisterRequest, User};
use crate::services::auth_service::{AuthService, TOKEN_TTL_HOURS};
use crate::state::{AppState, StoredUser};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/me", get(me))
}

/// Pulls the token out of an `Authorization: Bearer ...` header.
pub(crate) fn bearer_token(headers: &HeaderMap) -> Result<&str, AppError> {
    headers
        .get("Authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .ok_or(AppError::Unauthorized)
}

pub(crate) fn authenticated_email(
    headers: &HeaderMap,
    auth: &AuthService,
) -> Result<String, AppError> {
    let token = bearer_token(headers)?;
    Ok(auth.verify_token(token)?.email)
}

async fn register(
    State(state): State<AppState>,
    Json(body): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    info!("POST /auth/register - {}", body.email);
    if body.first_name.trim().is_empty() || body.last_name.trim().is_empty() {
        return Err(AppError::Validation("First and last name are required".into()));
    }
    let email = body.email.trim().to_lowercase();
    if !email.contains('@') {
        return Err(AppError::Validation("A valid email address is required".into()));
    }
    AuthService::check_password_policy(&body.password)?;

    let mut users = state.users.write();
    if users.contains_key(&email) {
        return Err(AppError::Conflict("An account with this email already exists".into()));
    }

    let user = User {
        id: Uuid::new_v4(),
        first_name: body.first_name.trim().to_string(),
        last_name: body.last_name.trim().to_string(),
        email: email.clone(),
        investment_profile: None,
        created_at: Utc::now(),
    };
    let password_hash = state.auth.hash_password(&body.password)?;
    let token = state.auth.issue_token(user.id, &email)?;
    users.insert(
        email,
        StoredUser {
            user: user.clone(),
            password_hash,
        },
    );

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "access_token": token,
            "token_type": "Bearer",
            "user": user,
        })),
    ))
}

async fn login(
    State(state): State<AppState>,
    Form(body): Form<LoginForm>,
) -> Result<Json<Value>, AppError> {
    info!("POST /auth/login - {}", body.email);
    let email = body.email.trim().to_lowercase();
    let users = state.users.read();
    let stored = users.get(&email).ok_or(AppError::Unauthorized)?;
    if !state.auth.verify_password(&body.password, &stored.password_hash)? {
        return Err(AppError::Unauthorized);
    }
    let token = state.auth.issue_token(stored.user.id, &email)?;

    Ok(Json(json!({
        "token": {
            "accessToken": token,
            "expiresIn": TOKEN_TTL_HOURS * 3600,
            "tokenType": "Bearer",
        },
        "user": stored.user,
    })))
}

async fn me(State(state): State<AppState>, headers: HeaderMap) -> Result<Json<User>, AppError> {
    let email = authenticated_email(&headers, &state.auth)?;
    let users = state.users.read();
    let stored = users.get(&email).ok_or(AppError::Unauthorized)?;
    Ok(Json(stored.user.clone()))
}
