pub mod api;
pub mod auth;
pub mod insight;
pub mod portfolio;
pub mod questionnaire;

pub use api::{
    ApiAllocation, CreatePortfolioRequest, PortfolioResponse, RecommendationResponse,
    TradingAction, UrlInsights,
};
pub use insight::{Insight, InsightAnalysis, PortfolioChange};
pub use portfolio::{AllocationSlice, Portfolio, RiskLevel};
pub use questionnaire::QuestionnaireAnswers;
