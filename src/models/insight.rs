use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::portfolio::AllocationSlice;
use crate::models::api::TradingAction;

/// Allocation snapshots taken around a rebalance, for before/after display.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PortfolioChange {
    pub before: Vec<AllocationSlice>,
    pub after: Vec<AllocationSlice>,
}

/// A market insight that was applied (or considered) for the active
/// portfolio. Immutable once created; new insights are appended to the log.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Insight {
    pub id: Uuid,
    pub url: String,
    pub title: String,
    pub impact: String,
    pub date: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub portfolio_change: Option<PortfolioChange>,
}

/// Result of running a market-insight URL through the recommendation API.
///
/// `applicable == false` is a first-class outcome (the URL was not
/// finance-relevant), not an error.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InsightAnalysis {
    pub title: String,
    pub description: String,
    pub confidence: u8,
    pub trading_actions: Vec<TradingAction>,
    pub applicable: bool,
}
