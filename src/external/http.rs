use async_trait::async_trait;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;

use crate::external::api::{AdvisorApi, ApiError};
use crate::models::api::{
    CreatePortfolioRequest, PortfolioResponse, RecommendationResponse, TradingAction,
};

/// reqwest-backed implementation of the advisor API.
pub struct HttpAdvisorApi {
    client: reqwest::Client,
    base_url: String,
    bearer_token: Option<String>,
}

impl HttpAdvisorApi {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
            bearer_token: None,
        }
    }

    pub fn from_env() -> Result<Self, ApiError> {
        let base_url = std::env::var("ADVISOR_API_URL")
            .map_err(|_| ApiError::Network("ADVISOR_API_URL not set".into()))?;
        Ok(Self::new(base_url))
    }

    pub fn with_bearer_token(mut self, token: impl Into<String>) -> Self {
        self.bearer_token = Some(token.into());
        self
    }

    pub fn set_bearer_token(&mut self, token: Option<String>) {
        self.bearer_token = token;
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }

    fn authorize(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.bearer_token {
            Some(token) => req.bearer_auth(token),
            None => req,
        }
    }

    async fn read_json<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T, ApiError> {
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
        resp.json::<T>()
            .await
            .map_err(|e| ApiError::Parse(e.to_string()))
    }

    async fn check_status(resp: reqwest::Response) -> Result<(), ApiError> {
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
        Ok(())
    }
}

#[async_trait]
impl AdvisorApi for HttpAdvisorApi {
    async fn create_portfolio(
        &self,
        request: &CreatePortfolioRequest,
    ) -> Result<PortfolioResponse, ApiError> {
        let resp = self
            .authorize(self.client.post(self.url("/portfolios")))
            .json(request)
            .send()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;
        Self::read_json(resp).await
    }

    async fn fetch_user_portfolios(
        &self,
        user_id: &str,
    ) -> Result<Vec<PortfolioResponse>, ApiError> {
        let resp = self
            .authorize(
                self.client
                    .get(self.url(&format!("/portfolios/user/{}", user_id))),
            )
            .send()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;
        Self::read_json(resp).await
    }

    async fn update_portfolio(
        &self,
        api_id: &str,
        body: &PortfolioResponse,
    ) -> Result<PortfolioResponse, ApiError> {
        let resp = self
            .authorize(self.client.put(self.url(&format!("/portfolios/{}", api_id))))
            .json(body)
            .send()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;
        Self::read_json(resp).await
    }

    async fn delete_portfolio(&self, api_id: &str) -> Result<(), ApiError> {
        let resp = self
            .authorize(
                self.client
                    .delete(self.url(&format!("/portfolios/{}", api_id))),
            )
            .send()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;
        Self::check_status(resp).await
    }

    async fn analyze_insight(
        &self,
        portfolio_id: &str,
        market_insight_url: &str,
    ) -> Result<RecommendationResponse, ApiError> {
        let resp = self
            .authorize(self.client.post(self.url("/insights/analyze")))
            .json(&serde_json::json!({
                "portfolioId": portfolio_id,
                "marketInsightUrl": market_insight_url,
            }))
            .send()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;
        Self::read_json(resp).await
    }

    async fn execute_actions(
        &self,
        portfolio_id: &str,
        actions: &[TradingAction],
    ) -> Result<(), ApiError> {
        let resp = self
            .authorize(self.client.post(self.url("/insights/execute")))
            .json(&serde_json::json!({
                "portfolioId": portfolio_id,
                "tradingActions": actions,
            }))
            .send()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;
        Self::check_status(resp).await
    }
}
