use chrono::Utc;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use uuid::Uuid;

use crate::external::api::{AdvisorApi, ApiError};
use crate::models::api::RecommendationResponse;
use crate::models::insight::{Insight, InsightAnalysis, PortfolioChange};
use crate::models::portfolio::{AllocationSlice, Portfolio};

/// How a rebalance-flagged template perturbs the allocation.
#[derive(Debug, Clone, Copy)]
enum ShiftRule {
    /// Move weight from the first entry matching `from` to the first entry
    /// matching `to` (case-insensitive substring on the asset name).
    Between {
        from: &'static str,
        to: &'static str,
    },
    /// Generic fallback: move weight from the first entry to the second.
    FirstTwo,
}

struct InsightTemplate {
    title: &'static str,
    impact: &'static str,
    rule: Option<ShiftRule>,
}

const TEMPLATES: &[InsightTemplate] = &[
    InsightTemplate {
        title: "Fed signals rate cuts ahead",
        impact: "Lower rates favor equities over fixed income; a small shift out of bonds is warranted.",
        rule: Some(ShiftRule::Between {
            from: "bond",
            to: "stock",
        }),
    },
    InsightTemplate {
        title: "Inflation print comes in hot",
        impact: "Sticky inflation argues for trimming equity exposure in favor of bonds.",
        rule: Some(ShiftRule::Between {
            from: "stock",
            to: "bond",
        }),
    },
    InsightTemplate {
        title: "Emerging markets rally on trade agreement",
        impact: "Improved trade terms favor emerging markets relative to developed international.",
        rule: Some(ShiftRule::Between {
            from: "international",
            to: "emerging",
        }),
    },
    InsightTemplate {
        title: "Volatility spike across major indices",
        impact: "Broad de-risking: nudge weight from the largest sleeve to the second.",
        rule: Some(ShiftRule::FirstTwo),
    },
    InsightTemplate {
        title: "Earnings season beats expectations",
        impact: "Results confirm current positioning; no rebalance needed.",
        rule: None,
    },
    InsightTemplate {
        title: "No significant market-moving news",
        impact: "Markets are quiet; the current allocation remains appropriate.",
        rule: None,
    },
];

/// Simulates market insights and gates the API-driven analysis step.
///
/// The rng is held by the engine rather than drawn ambiently so tests can
/// seed it and so the rebalance/no-rebalance branches can be exercised
/// deterministically.
pub struct InsightEngine {
    rng: StdRng,
    analysis_started: bool,
}

impl InsightEngine {
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_os_rng(),
            analysis_started: false,
        }
    }

    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            analysis_started: false,
        }
    }

    /// One-shot latch for the API analysis step. Returns true exactly once
    /// per cycle; call `reset_analysis` when a new render cycle starts.
    pub fn begin_analysis(&mut self) -> bool {
        if self.analysis_started {
            return false;
        }
        self.analysis_started = true;
        true
    }

    pub fn reset_analysis(&mut self) {
        self.analysis_started = false;
    }

    /// Local simulation mode: picks a canned insight at random and, when the
    /// template calls for it, shifts 2–3 percentage points inside the
    /// portfolio's allocation, recording before/after snapshots.
    pub fn simulate(&mut self, portfolio: &mut Portfolio, url: &str) -> Insight {
        let idx = self.rng.random_range(0..TEMPLATES.len());
        let points = self.rng.random_range(2..=3) as f64;
        self.apply_template(portfolio, url, idx, points)
    }

    pub(crate) fn apply_template(
        &mut self,
        portfolio: &mut Portfolio,
        url: &str,
        template_idx: usize,
        points: f64,
    ) -> Insight {
        let template = &TEMPLATES[template_idx];
        let portfolio_change = template.rule.and_then(|rule| {
            let before = portfolio.allocation.clone();
            if shift_allocation(&mut portfolio.allocation, rule, points) {
                Some(PortfolioChange {
                    before,
                    after: portfolio.allocation.clone(),
                })
            } else {
                None
            }
        });

        Insight {
            id: Uuid::new_v4(),
            url: url.to_string(),
            title: template.title.to_string(),
            impact: template.impact.to_string(),
            date: Utc::now(),
            portfolio_change,
        }
    }
}

impl Default for InsightEngine {
    fn default() -> Self {
        Self::new()
    }
}

/// Moves `points` of weight between two slices per the rule, clamping at the
/// donor's current weight. Returns false when no move was possible.
fn shift_allocation(allocation: &mut [AllocationSlice], rule: ShiftRule, points: f64) -> bool {
    let pair = match rule {
        ShiftRule::Between { from, to } => {
            match (find_slice(allocation, from), find_slice(allocation, to)) {
                (Some(a), Some(b)) if a != b => Some((a, b)),
                // Named pair not present in this portfolio: fall back to the
                // generic shift rather than doing nothing.
                _ => first_two(allocation),
            }
        }
        ShiftRule::FirstTwo => first_two(allocation),
    };
    let Some((from_idx, to_idx)) = pair else {
        return false;
    };

    let amount = points.min(allocation[from_idx].percentage);
    if amount <= 0.0 {
        return false;
    }
    allocation[from_idx].percentage -= amount;
    allocation[to_idx].percentage += amount;
    true
}

fn find_slice(allocation: &[AllocationSlice], keyword: &str) -> Option<usize> {
    allocation
        .iter()
        .position(|s| s.asset_name.to_lowercase().contains(keyword))
}

fn first_two(allocation: &[AllocationSlice]) -> Option<(usize, usize)> {
    if allocation.len() >= 2 {
        Some((0, 1))
    } else {
        None
    }
}

/// Builds the analysis result from a recommendation response.
///
/// A set `failure` field means the URL was not usable financial content;
/// that is a first-class "not applicable" outcome with zero confidence and
/// no trading actions, never an error.
pub fn analysis_from_recommendation(resp: &RecommendationResponse) -> InsightAnalysis {
    if let Some(failure) = &resp.url_insights.failure {
        return InsightAnalysis {
            title: if resp.url_insights.title.is_empty() {
                "Not applicable".to_string()
            } else {
                resp.url_insights.title.clone()
            },
            description: failure.clone(),
            confidence: 0,
            trading_actions: Vec::new(),
            applicable: false,
        };
    }
    InsightAnalysis {
        title: resp.url_insights.title.clone(),
        description: resp.url_insights.description.clone(),
        confidence: if resp.trading_actions.is_empty() { 0 } else { 85 },
        trading_actions: resp.trading_actions.clone(),
        applicable: true,
    }
}

/// API-driven mode: ships the insight URL to the recommendation endpoint and
/// synthesizes the analysis. Takes no portfolio action; executing trades is
/// a separate, explicitly confirmed step.
pub async fn analyze_via_api(
    api: &dyn AdvisorApi,
    portfolio_api_id: &str,
    market_insight_url: &str,
) -> Result<InsightAnalysis, ApiError> {
    let resp = api.analyze_insight(portfolio_api_id, market_insight_url).await?;
    Ok(analysis_from_recommendation(&resp))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::api::{TradingAction, UrlInsights};
    use crate::models::questionnaire::QuestionnaireAnswers;
    use crate::services::allocation::generate_portfolio;

    fn test_portfolio() -> Portfolio {
        generate_portfolio(&QuestionnaireAnswers {
            goal: "preserve".into(),
            time_horizon: "5-10".into(),
            risk_tolerance: "low".into(),
            experience: "basic".into(),
            income: "50k-100k".into(),
            net_worth: "100k-500k".into(),
            liquidity_needs: "low".into(),
            insights_opt_in: "yes".into(),
            sectors: None,
            restrictions: None,
        })
    }

    #[test]
    fn rebalance_template_records_before_and_after() {
        let mut portfolio = test_portfolio();
        let mut engine = InsightEngine::with_seed(1);
        // Template 0 shifts bond -> stock
        let insight = engine.apply_template(&mut portfolio, "https://example.com/fed", 0, 3.0);
        let change = insight.portfolio_change.expect("rebalance template must record a change");
        assert_eq!(change.before[0].percentage, 50.0);
        assert_eq!(change.after[0].percentage, 47.0);
        let stocks = change
            .after
            .iter()
            .find(|s| s.asset_name.to_lowercase().contains("stock"))
            .unwrap();
        assert_eq!(stocks.percentage, 18.0);
        // Total weight is conserved by the shift
        let total: f64 = change.after.iter().map(|s| s.percentage).sum();
        assert_eq!(total, 100.0);
    }

    #[test]
    fn non_rebalance_template_leaves_portfolio_untouched() {
        let mut portfolio = test_portfolio();
        let before = portfolio.allocation.clone();
        let mut engine = InsightEngine::with_seed(1);
        let insight = engine.apply_template(&mut portfolio, "https://example.com/quiet", 5, 3.0);
        assert!(insight.portfolio_change.is_none());
        assert_eq!(portfolio.allocation, before);
    }

    #[test]
    fn missing_pair_falls_back_to_first_two_entries() {
        let mut portfolio = test_portfolio();
        // Template 2 wants international -> emerging, which this portfolio
        // does not hold; the generic first-two shift applies instead.
        let mut engine = InsightEngine::with_seed(7);
        let insight = engine.apply_template(&mut portfolio, "https://example.com/em", 2, 2.0);
        let change = insight.portfolio_change.unwrap();
        assert_eq!(change.after[0].percentage, 48.0);
        assert_eq!(change.after[1].percentage, 27.0);
    }

    #[test]
    fn simulate_always_conserves_total_weight() {
        for seed in 0..16 {
            let mut portfolio = test_portfolio();
            let mut engine = InsightEngine::with_seed(seed);
            engine.simulate(&mut portfolio, "https://example.com/news");
            let total: f64 = portfolio.allocation.iter().map(|s| s.percentage).sum();
            assert!((total - 100.0).abs() < 1e-9, "seed {} broke the total", seed);
        }
    }

    #[test]
    fn analysis_latch_fires_once_per_cycle() {
        let mut engine = InsightEngine::with_seed(0);
        assert!(engine.begin_analysis());
        assert!(!engine.begin_analysis());
        engine.reset_analysis();
        assert!(engine.begin_analysis());
    }

    #[test]
    fn failed_url_insights_yield_zero_confidence() {
        let resp = RecommendationResponse {
            url_insights: UrlInsights {
                title: String::new(),
                description: String::new(),
                failure: Some("Content is not finance-related".into()),
            },
            trading_actions: vec![TradingAction {
                action: "buy".into(),
                ticker: "VTI".into(),
                shares: 2.0,
            }],
        };
        let analysis = analysis_from_recommendation(&resp);
        assert_eq!(analysis.confidence, 0);
        assert!(analysis.trading_actions.is_empty());
        assert!(!analysis.applicable);
    }

    #[test]
    fn confidence_is_85_only_with_trading_actions() {
        let mut resp = RecommendationResponse {
            url_insights: UrlInsights {
                title: "Chip demand surges".into(),
                description: "Semis look strong".into(),
                failure: None,
            },
            trading_actions: vec![],
        };
        assert_eq!(analysis_from_recommendation(&resp).confidence, 0);
        resp.trading_actions.push(TradingAction {
            action: "buy".into(),
            ticker: "SMH".into(),
            shares: 1.0,
        });
        let analysis = analysis_from_recommendation(&resp);
        assert_eq!(analysis.confidence, 85);
        assert!(analysis.applicable);
    }
}
