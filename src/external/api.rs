use async_trait::async_trait;
use thiserror::Error;

use crate::models::api::{CreatePortfolioRequest, PortfolioResponse, RecommendationResponse};

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("network error: {0}")]
    Network(String),

    #[error("bad response ({status}): {body}")]
    BadStatus { status: u16, body: String },

    #[error("parse error: {0}")]
    Parse(String),

    #[error("unauthorized")]
    Unauthorized,
}

/// The remote advisor backend, seen from the client core.
///
/// Everything the portfolio lifecycle does over the network goes through
/// this trait so tests can substitute a scripted implementation; the
/// production implementation is `HttpAdvisorApi`.
#[async_trait]
pub trait AdvisorApi: Send + Sync {
    async fn create_portfolio(
        &self,
        request: &CreatePortfolioRequest,
    ) -> Result<PortfolioResponse, ApiError>;

    async fn fetch_user_portfolios(&self, user_id: &str)
        -> Result<Vec<PortfolioResponse>, ApiError>;

    async fn update_portfolio(
        &self,
        api_id: &str,
        body: &PortfolioResponse,
    ) -> Result<PortfolioResponse, ApiError>;

    async fn delete_portfolio(&self, api_id: &str) -> Result<(), ApiError>;

    /// Submits a market-insight URL for analysis against a portfolio.
    async fn analyze_insight(
        &self,
        portfolio_id: &str,
        market_insight_url: &str,
    ) -> Result<RecommendationResponse, ApiError>;

    /// Executes previously recommended trading actions server-side.
    async fn execute_actions(
        &self,
        portfolio_id: &str,
        actions: &[crate::models::api::TradingAction],
    ) -> Result<(), ApiError>;
}
