use serde::{Deserialize, Serialize};

use crate::errors::AppError;

/// Answers collected by the onboarding questionnaire.
///
/// The enumerated fields are kept as free strings on purpose: the scorer
/// applies a documented permissive-defaulting policy for values it does not
/// recognize instead of rejecting them, so the type does not constrain them
/// to a closed enum.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct QuestionnaireAnswers {
    pub goal: String,
    pub time_horizon: String,
    pub risk_tolerance: String,
    pub experience: String,
    pub income: String,
    pub net_worth: String,
    pub liquidity_needs: String,
    pub insights_opt_in: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sectors: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub restrictions: Option<Vec<String>>,
}

pub const MAX_SECTORS: usize = 2;
pub const MAX_RESTRICTIONS: usize = 3;

/// Sentinel meaning "the user explicitly picked nothing".
pub const NONE_SENTINEL: &str = "none";

impl QuestionnaireAnswers {
    /// Rejects structurally invalid answer sets before they reach the
    /// scoring and allocation stages. Unknown enum values pass here; the
    /// downstream components default them.
    pub fn validate(&self) -> Result<(), AppError> {
        let required = [
            ("goal", &self.goal),
            ("timeHorizon", &self.time_horizon),
            ("riskTolerance", &self.risk_tolerance),
            ("experience", &self.experience),
            ("income", &self.income),
            ("netWorth", &self.net_worth),
            ("liquidityNeeds", &self.liquidity_needs),
            ("insightsOptIn", &self.insights_opt_in),
        ];
        for (field, value) in required {
            if value.trim().is_empty() {
                return Err(AppError::Validation(format!("{} is required", field)));
            }
        }
        if let Some(sectors) = &self.sectors {
            if Self::selected(sectors).count() > MAX_SECTORS {
                return Err(AppError::Validation(format!(
                    "At most {} sectors may be selected",
                    MAX_SECTORS
                )));
            }
        }
        if let Some(restrictions) = &self.restrictions {
            if Self::selected(restrictions).count() > MAX_RESTRICTIONS {
                return Err(AppError::Validation(format!(
                    "At most {} restrictions may be selected",
                    MAX_RESTRICTIONS
                )));
            }
        }
        Ok(())
    }

    /// Sector picks with the "none" sentinel filtered out.
    pub fn selected_sectors(&self) -> Vec<&str> {
        self.sectors
            .as_deref()
            .map(|s| Self::selected(s).collect())
            .unwrap_or_default()
    }

    /// Restriction picks with the "none" sentinel filtered out.
    pub fn selected_restrictions(&self) -> Vec<&str> {
        self.restrictions
            .as_deref()
            .map(|r| Self::selected(r).collect())
            .unwrap_or_default()
    }

    fn selected(values: &[String]) -> impl Iterator<Item = &str> {
        values
            .iter()
            .map(String::as_str)
            .filter(|v| !v.eq_ignore_ascii_case(NONE_SENTINEL))
    }
}
