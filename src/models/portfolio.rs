use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Annual management fee in percent, the same for every portfolio tier.
pub const MANAGEMENT_FEE_PCT: f64 = 0.01;

/// Starting balance every portfolio is measured against for growth.
pub const BASELINE_BALANCE: f64 = 10_000.0;

/// Risk classification derived from the 1.0–5.0 questionnaire score.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum RiskLevel {
    VeryLow,
    Low,
    Moderate,
    High,
    VeryHigh,
}

impl RiskLevel {
    pub fn from_score(score: f64) -> Self {
        if score <= 1.5 {
            RiskLevel::VeryLow
        } else if score <= 2.5 {
            RiskLevel::Low
        } else if score <= 3.5 {
            RiskLevel::Moderate
        } else if score <= 4.5 {
            RiskLevel::High
        } else {
            RiskLevel::VeryHigh
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            RiskLevel::VeryLow => "Very Low",
            RiskLevel::Low => "Low",
            RiskLevel::Moderate => "Moderate",
            RiskLevel::High => "High",
            RiskLevel::VeryHigh => "Very High",
        }
    }

    /// Inverse of `label`, tolerant of casing. Unrecognized labels land on
    /// Moderate, mirroring the scorer's permissive-defaulting policy.
    pub fn from_label(label: &str) -> Self {
        match label.to_lowercase().as_str() {
            "very low" | "very-low" => RiskLevel::VeryLow,
            "low" => RiskLevel::Low,
            "high" => RiskLevel::High,
            "very high" | "very-high" => RiskLevel::VeryHigh,
            _ => RiskLevel::Moderate,
        }
    }
}

/// One row of a portfolio's allocation table.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AllocationSlice {
    pub asset_name: String,
    pub percentage: f64,
    pub color: String,
}

impl AllocationSlice {
    pub fn new(asset_name: &str, percentage: f64, color: &str) -> Self {
        Self {
            asset_name: asset_name.to_string(),
            percentage,
            color: color.to_string(),
        }
    }
}

/// A managed portfolio, either produced locally by the allocation generator
/// or normalized from the remote advisor API.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Portfolio {
    pub id: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_id: Option<String>,
    pub name: String,
    pub allocation: Vec<AllocationSlice>,
    pub reasoning: String,
    pub expected_return: f64,
    pub management_fee: f64,
    pub risk_level: RiskLevel,
    pub risk_score: f64,
    pub balance: f64,
    pub growth: f64,
    pub monthly_fee: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_horizon: Option<String>,
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

impl Portfolio {
    /// Replaces the balance and recomputes both derived fields in one step.
    /// `monthly_fee` and `growth` are never written independently; callers
    /// must go through here so no reader observes a balance paired with a
    /// stale fee or growth figure.
    pub fn set_balance(&mut self, balance: f64) {
        self.balance = balance;
        self.monthly_fee = balance * (MANAGEMENT_FEE_PCT / 100.0) / 12.0;
        self.growth = if balance > BASELINE_BALANCE {
            let pct = (balance - BASELINE_BALANCE) / BASELINE_BALANCE * 100.0;
            (pct * 10.0).round() / 10.0
        } else {
            0.0
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn risk_level_breakpoints() {
        assert_eq!(RiskLevel::from_score(1.0), RiskLevel::VeryLow);
        assert_eq!(RiskLevel::from_score(1.5), RiskLevel::VeryLow);
        assert_eq!(RiskLevel::from_score(1.6), RiskLevel::Low);
        assert_eq!(RiskLevel::from_score(2.5), RiskLevel::Low);
        assert_eq!(RiskLevel::from_score(3.5), RiskLevel::Moderate);
        assert_eq!(RiskLevel::from_score(4.5), RiskLevel::High);
        assert_eq!(RiskLevel::from_score(4.6), RiskLevel::VeryHigh);
        assert_eq!(RiskLevel::from_score(5.0), RiskLevel::VeryHigh);
    }

    #[test]
    fn label_round_trip() {
        for level in [
            RiskLevel::VeryLow,
            RiskLevel::Low,
            RiskLevel::Moderate,
            RiskLevel::High,
            RiskLevel::VeryHigh,
        ] {
            assert_eq!(RiskLevel::from_label(level.label()), level);
        }
        assert_eq!(RiskLevel::from_label("garbage"), RiskLevel::Moderate);
    }
}
