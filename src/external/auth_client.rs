use std::time::Duration;

use chrono::Utc;
use reqwest::StatusCode;
use tracing::info;

use crate::external::api::ApiError;
use crate::external::retry::retry_with_delay;
use crate::models::auth::{
    InvestmentProfile, LoginResponse, RegisterRequest, RegisterResponse, Session, User,
};

const LOGIN_RETRY_ATTEMPTS: u32 = 3;
const LOGIN_RETRY_DELAY: Duration = Duration::from_millis(500);

/// Client for the auth endpoints, holding the session in memory for the
/// lifetime of the process.
pub struct AuthClient {
    client: reqwest::Client,
    base_url: String,
    session: Option<Session>,
}

impl AuthClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
            session: None,
        }
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    pub fn bearer_token(&self) -> Option<&str> {
        self.session.as_ref().map(|s| s.access_token.as_str())
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }

    pub async fn register(&mut self, request: &RegisterRequest) -> Result<RegisterResponse, ApiError> {
        let resp = self
            .client
            .post(self.url("/auth/register"))
            .json(request)
            .send()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(ApiError::BadStatus {
                status: status.as_u16(),
                body,
            });
        }
        let parsed: RegisterResponse = resp
            .json()
            .await
            .map_err(|e| ApiError::Parse(e.to_string()))?;

        // Some deployments hand back a token straight from registration.
        if let Some(token) = &parsed.access_token {
            self.store_session(
                token.clone(),
                parsed.token_type.clone().unwrap_or_else(|| "Bearer".into()),
                None,
                parsed.user.clone(),
            );
        }
        Ok(parsed)
    }

    /// Login is form-encoded, unlike every other endpoint. Both observed
    /// response shapes (nested token object and flat access_token) are
    /// accepted.
    pub async fn login(&mut self, email: &str, password: &str) -> Result<&Session, ApiError> {
        let resp = self
            .client
            .post(self.url("/auth/login"))
            .form(&[("email", email), ("password", password)])
            .send()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;
        let status = resp.status();
        if status == StatusCode::UNAUTHORIZED {
            return Err(ApiError::Unauthorized);
        }
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(ApiError::BadStatus {
                status: status.as_u16(),
                body,
            });
        }
        let parsed: LoginResponse = resp
            .json()
            .await
            .map_err(|e| ApiError::Parse(e.to_string()))?;

        let (token, token_type, expires_in) = match (&parsed.token, &parsed.access_token) {
            (Some(nested), _) => (
                nested.access_token.clone(),
                nested.token_type.clone(),
                Some(nested.expires_in),
            ),
            (None, Some(flat)) => (
                flat.clone(),
                parsed.token_type.clone().unwrap_or_else(|| "Bearer".into()),
                parsed.expires_in,
            ),
            (None, None) => {
                return Err(ApiError::Parse("login response carried no token".into()))
            }
        };
        self.store_session(token, token_type, expires_in, parsed.user.clone());
        info!("🔐 Logged in as {}", email);
        // store_session always sets the slot
        self.session
            .as_ref()
            .ok_or_else(|| ApiError::Parse("session missing after login".into()))
    }

    /// Registration followed by login can race the backend making the new
    /// account readable; this is the one place a bounded retry is allowed.
    pub async fn login_after_register(
        &mut self,
        email: &str,
        password: &str,
    ) -> Result<Session, ApiError> {
        let client = self.client.clone();
        let url = self.url("/auth/login");
        let email_owned = email.to_string();
        let password_owned = password.to_string();

        let parsed: LoginResponse = retry_with_delay(
            LOGIN_RETRY_ATTEMPTS,
            LOGIN_RETRY_DELAY,
            move || {
                let client = client.clone();
                let url = url.clone();
                let email = email_owned.clone();
                let password = password_owned.clone();
                async move {
                    let resp = client
                        .post(&url)
                        .form(&[("email", email.as_str()), ("password", password.as_str())])
                        .send()
                        .await
                        .map_err(|e| ApiError::Network(e.to_string()))?;
                    let status = resp.status();
                    if status == StatusCode::UNAUTHORIZED {
                        return Err(ApiError::Unauthorized);
                    }
                    if !status.is_success() {
                        let body = resp.text().await.unwrap_or_default();
                        return Err(ApiError::BadStatus {
                            status: status.as_u16(),
                            body,
                        });
                    }
                    resp.json::<LoginResponse>()
                        .await
                        .map_err(|e| ApiError::Parse(e.to_string()))
                }
            },
        )
        .await?;

        let (token, token_type, expires_in) = match (&parsed.token, &parsed.access_token) {
            (Some(nested), _) => (
                nested.access_token.clone(),
                nested.token_type.clone(),
                Some(nested.expires_in),
            ),
            (None, Some(flat)) => (
                flat.clone(),
                parsed.token_type.clone().unwrap_or_else(|| "Bearer".into()),
                parsed.expires_in,
            ),
            (None, None) => {
                return Err(ApiError::Parse("login response carried no token".into()))
            }
        };
        self.store_session(token, token_type, expires_in, parsed.user.clone());
        self.session
            .clone()
            .ok_or_else(|| ApiError::Parse("session missing after login".into()))
    }

    pub async fn me(&self) -> Result<User, ApiError> {
        let token = self.bearer_token().ok_or(ApiError::Unauthorized)?;
        let resp = self
            .client
            .get(self.url("/auth/me"))
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;
        let status = resp.status();
        if status == StatusCode::UNAUTHORIZED {
            return Err(ApiError::Unauthorized);
        }
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(ApiError::BadStatus {
                status: status.as_u16(),
                body,
            });
        }
        resp.json().await.map_err(|e| ApiError::Parse(e.to_string()))
    }

    pub async fn update_investment_profile(
        &self,
        profile: &InvestmentProfile,
    ) -> Result<User, ApiError> {
        let token = self.bearer_token().ok_or(ApiError::Unauthorized)?;
        let resp = self
            .client
            .patch(self.url("/user/investment-profile"))
            .bearer_auth(token)
            .json(profile)
            .send()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;
        let status = resp.status();
        if status == StatusCode::UNAUTHORIZED {
            return Err(ApiError::Unauthorized);
        }
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(ApiError::BadStatus {
                status: status.as_u16(),
                body,
            });
        }
        resp.json().await.map_err(|e| ApiError::Parse(e.to_string()))
    }

    pub fn logout(&mut self) {
        self.session = None;
        info!("🔓 Session cleared");
    }

    fn store_session(
        &mut self,
        access_token: String,
        token_type: String,
        expires_in: Option<i64>,
        user: Option<User>,
    ) {
        let expires_at = expires_in.map(|secs| Utc::now() + chrono::Duration::seconds(secs));
        self.session = Some(Session {
            access_token,
            token_type,
            expires_at,
            user,
        });
    }
}
