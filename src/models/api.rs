use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::portfolio::Portfolio;
use crate::models::questionnaire::QuestionnaireAnswers;

/// Body for `POST /portfolios` on the remote advisor API.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePortfolioRequest {
    pub name: String,
    pub risk_score: f64,
    #[serde(flatten)]
    pub answers: QuestionnaireAnswers,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
}

/// One allocation row as the remote API represents it: keyed by asset class,
/// color optional.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ApiAllocation {
    pub asset_class: String,
    pub percentage: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

/// A portfolio record as returned by the remote advisor API. Every field the
/// normalizer fills in is optional here; the server is free to omit any of
/// them and the client must still produce a complete `Portfolio`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allocation: Option<Vec<ApiAllocation>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reasoning: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expected_return: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub management_fee: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub risk_level: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub risk_score: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub balance: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub risk_tolerance: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_horizon: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub goal: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sectors: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub restrictions: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
}

impl From<&Portfolio> for PortfolioResponse {
    /// Projects a normalized portfolio back into the wire shape. Used by
    /// `PUT /portfolios/{id}` bodies and by the normalizer's idempotence
    /// contract.
    fn from(p: &Portfolio) -> Self {
        PortfolioResponse {
            id: p.api_id.clone(),
            name: Some(p.name.clone()),
            allocation: Some(
                p.allocation
                    .iter()
                    .map(|slice| ApiAllocation {
                        asset_class: slice.asset_name.clone(),
                        percentage: slice.percentage,
                        color: Some(slice.color.clone()),
                    })
                    .collect(),
            ),
            reasoning: Some(p.reasoning.clone()),
            expected_return: Some(p.expected_return),
            management_fee: Some(p.management_fee),
            risk_level: Some(p.risk_level.label().to_string()),
            risk_score: Some(p.risk_score),
            balance: Some(p.balance),
            risk_tolerance: None,
            time_horizon: p.time_horizon.clone(),
            goal: None,
            sectors: p.sectors.clone(),
            restrictions: p.restrictions.clone(),
            created_at: p.created_at,
            updated_at: p.updated_at,
            user_id: p.user_id.clone(),
        }
    }
}

/// Narrative part of a recommendation response. `failure` set means the URL
/// was not usable financial content.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UrlInsights {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TradingAction {
    pub action: String,
    pub ticker: String,
    pub shares: f64,
}

/// Response of the market-insight recommendation endpoint.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RecommendationResponse {
    pub url_insights: UrlInsights,
    #[serde(default)]
    pub trading_actions: Vec<TradingAction>,
}
