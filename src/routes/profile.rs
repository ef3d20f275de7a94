use axum::extract::State;
use axum::http::HeaderMap;
use axum::routing::patch;
use axum::{Json, Router};
use tracing::info;

use crate::errors::AppError;
use crate::models::auth::{InvestmentProfile, User};
use crate::routes::auth::authenticated_email;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/investment-profile", patch(update_investment_profile))
}

/// Partial update: only the fields present in the patch replace the stored
/// values; absent fields are left alone.
async fn update_investment_profile(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(patch): Json<InvestmentProfile>,
) -> Result<Json<User>, AppError> {
    let email = authenticated_email(&headers, &state.auth)?;
    info!("PATCH /user/investment-profile - {}", email);

    let mut users = state.users.write();
    let stored = users.get_mut(&email).ok_or(AppError::Unauthorized)?;

    let mut profile = stored.user.investment_profile.clone().unwrap_or_default();
    if patch.goal.is_some() {
        profile.goal = patch.goal;
    }
    if patch.time_horizon.is_some() {
        profile.time_horizon = patch.time_horizon;
    }
    if patch.risk_tolerance.is_some() {
        profile.risk_tolerance = patch.risk_tolerance;
    }
    if patch.experience.is_some() {
        profile.experience = patch.experience;
    }
    stored.user.investment_profile = Some(profile);

    Ok(Json(stored.user.clone()))
}
