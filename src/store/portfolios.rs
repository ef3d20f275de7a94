use chrono::Utc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::errors::AppError;
use crate::external::api::AdvisorApi;
use crate::models::api::{CreatePortfolioRequest, TradingAction};
use crate::models::insight::{Insight, InsightAnalysis};
use crate::models::portfolio::{Portfolio, RiskLevel};
use crate::models::questionnaire::QuestionnaireAnswers;
use crate::services::{allocation, insight, normalize, risk};

/// The client-side portfolio state: every loaded portfolio, the active one,
/// the insight log, and the last user-facing error.
///
/// Mutations replace whole portfolios or whole derived-field groups; there
/// is no field-level locking, so partial writes are never observable.
pub struct PortfolioStore {
    portfolios: Vec<Portfolio>,
    active_id: Option<Uuid>,
    last_error: Option<String>,
    insights: Vec<Insight>,
}

impl PortfolioStore {
    pub fn new() -> Self {
        Self {
            portfolios: Vec::new(),
            active_id: None,
            last_error: None,
            insights: Vec::new(),
        }
    }

    pub fn portfolios(&self) -> &[Portfolio] {
        &self.portfolios
    }

    pub fn active(&self) -> Option<&Portfolio> {
        self.active_id
            .and_then(|id| self.portfolios.iter().find(|p| p.id == id))
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn insights(&self) -> &[Insight] {
        &self.insights
    }

    pub fn get(&self, id: Uuid) -> Option<&Portfolio> {
        self.portfolios.iter().find(|p| p.id == id)
    }

    /// Creates a portfolio for the given (already validated) answers.
    ///
    /// Tries the remote API first and falls back to the local allocation
    /// generator on any failure, recording a diagnostic alongside. This
    /// operation never fails: a backend outage must not block onboarding,
    /// so the caller always gets a complete, active portfolio back.
    pub async fn create(
        &mut self,
        api: &dyn AdvisorApi,
        answers: &QuestionnaireAnswers,
        user_id: Option<&str>,
    ) -> Portfolio {
        let score = risk::score_answers(answers);
        let level = RiskLevel::from_score(score);
        // Risk level + goal + timestamp keeps server-side names unique
        let name = format!(
            "{} {} {}",
            level.label(),
            answers.goal,
            Utc::now().format("%Y%m%d%H%M%S")
        );
        let request = CreatePortfolioRequest {
            name,
            risk_score: score,
            answers: answers.clone(),
            user_id: user_id.map(str::to_string),
        };

        let portfolio = match api.create_portfolio(&request).await {
            Ok(resp) => {
                info!("📦 Portfolio created remotely");
                self.last_error = None;
                normalize::normalize_api_portfolio(&resp)
            }
            Err(e) => {
                warn!("Remote portfolio creation failed, generating locally: {}", e);
                self.last_error = Some(format!(
                    "Portfolio service unavailable; a portfolio was generated locally: {}",
                    e
                ));
                let mut local = allocation::generate_portfolio(answers);
                local.user_id = user_id.map(str::to_string);
                local
            }
        };

        let id = self.upsert(portfolio.clone());
        self.active_id = Some(id);
        portfolio
    }

    /// Loads and normalizes all portfolios for a user. On failure the
    /// existing collection is left untouched and the error is propagated.
    pub async fn load_for_user(
        &mut self,
        api: &dyn AdvisorApi,
        user_id: &str,
    ) -> Result<usize, AppError> {
        let responses = api.fetch_user_portfolios(user_id).await?;
        let loaded: Vec<Portfolio> = responses
            .iter()
            .map(normalize::normalize_api_portfolio)
            .collect();
        let count = loaded.len();

        // A locally generated active portfolio has no server-side record;
        // keep it around instead of dropping it on refresh.
        let retained_active: Option<Portfolio> = self
            .active()
            .filter(|p| p.api_id.is_none() && !loaded.iter().any(|l| l.id == p.id))
            .cloned();
        let mut portfolios = loaded;
        if let Some(active) = retained_active {
            portfolios.push(active);
        }
        self.portfolios = portfolios;

        let active_still_present = self
            .active_id
            .map(|id| self.portfolios.iter().any(|p| p.id == id))
            .unwrap_or(false);
        if !active_still_present {
            self.active_id = self.portfolios.first().map(|p| p.id);
        }
        info!("📦 Loaded {} portfolios for user {}", count, user_id);
        Ok(count)
    }

    /// Replaces the balance of a portfolio, recomputing monthly fee and
    /// growth in the same step. Idempotent under repeated identical calls.
    pub fn update_balance(&mut self, id: Uuid, balance: f64) -> Result<&Portfolio, AppError> {
        if balance < 0.0 {
            return Err(AppError::Validation("Balance cannot be negative".into()));
        }
        let portfolio = self
            .portfolios
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| AppError::NotFound("Portfolio".into()))?;
        portfolio.set_balance(balance);
        Ok(portfolio)
    }

    /// Deletes a portfolio. The local copy is removed and, when it was the
    /// active one, the active slot is cleared no matter how the remote call
    /// went; a remote failure is still reported to the caller afterwards.
    pub async fn delete(&mut self, api: &dyn AdvisorApi, id: Uuid) -> Result<(), AppError> {
        let api_id = self.get(id).and_then(|p| p.api_id.clone());

        let remote_result = match &api_id {
            Some(api_id) => api.delete_portfolio(api_id).await,
            None => Ok(()),
        };

        self.portfolios.retain(|p| p.id != id);
        if self.active_id == Some(id) {
            // No auto-selection of a replacement; the caller navigates away.
            self.active_id = None;
        }

        remote_result.map_err(|e| {
            warn!("Remote delete failed for {}: {}", id, e);
            AppError::from(e)
        })
    }

    /// Local rebalance simulation: runs the insight engine against the
    /// portfolio and appends the resulting insight to the log.
    pub fn simulate_insight(
        &mut self,
        engine: &mut insight::InsightEngine,
        id: Uuid,
        url: &str,
    ) -> Result<Insight, AppError> {
        let portfolio = self
            .portfolios
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| AppError::NotFound("Portfolio".into()))?;
        let insight = engine.simulate(portfolio, url);
        self.insights.push(insight.clone());
        Ok(insight)
    }

    /// Full rebalance: run the local simulation, then push the changed
    /// allocation to the server when the portfolio has a remote record.
    /// A failed push is propagated, not swallowed; the local change stands
    /// and the caller decides whether to keep working with stale server
    /// state.
    pub async fn rebalance(
        &mut self,
        api: &dyn AdvisorApi,
        engine: &mut insight::InsightEngine,
        id: Uuid,
        url: &str,
    ) -> Result<Insight, AppError> {
        let insight = self.simulate_insight(engine, id, url)?;
        if insight.portfolio_change.is_some() {
            if let Some(portfolio) = self.get(id) {
                if let Some(api_id) = portfolio.api_id.clone() {
                    let body = crate::models::api::PortfolioResponse::from(portfolio);
                    api.update_portfolio(&api_id, &body).await?;
                }
            }
        }
        Ok(insight)
    }

    /// API-driven analysis. Returns `Ok(None)` when the engine's one-shot
    /// latch already fired this cycle; failures propagate so the caller can
    /// surface them (and decide whether to keep working with stale data).
    /// No portfolio state is mutated here.
    pub async fn analyze_insight(
        &mut self,
        api: &dyn AdvisorApi,
        engine: &mut insight::InsightEngine,
        id: Uuid,
        url: &str,
    ) -> Result<Option<InsightAnalysis>, AppError> {
        if !engine.begin_analysis() {
            return Ok(None);
        }
        let api_id = self
            .get(id)
            .ok_or_else(|| AppError::NotFound("Portfolio".into()))?
            .api_id
            .clone()
            .ok_or_else(|| {
                AppError::Validation("Portfolio has no server-side record to analyze".into())
            })?;
        let analysis = insight::analyze_via_api(api, &api_id, url).await?;
        Ok(Some(analysis))
    }

    /// Confirmation step for API-mode recommendations: execute server-side,
    /// then reload so balances and transaction history reflect the server's
    /// view. Trades are never simulated locally in this mode.
    pub async fn execute_insight_actions(
        &mut self,
        api: &dyn AdvisorApi,
        id: Uuid,
        user_id: &str,
        actions: &[TradingAction],
    ) -> Result<(), AppError> {
        let api_id = self
            .get(id)
            .ok_or_else(|| AppError::NotFound("Portfolio".into()))?
            .api_id
            .clone()
            .ok_or_else(|| {
                AppError::Validation("Portfolio has no server-side record to trade on".into())
            })?;
        api.execute_actions(&api_id, actions).await?;
        self.load_for_user(api, user_id).await?;
        Ok(())
    }

    fn upsert(&mut self, portfolio: Portfolio) -> Uuid {
        let id = portfolio.id;
        match self.portfolios.iter_mut().find(|p| p.id == id) {
            Some(existing) => *existing = portfolio,
            None => self.portfolios.push(portfolio),
        }
        id
    }
}

impl Default for PortfolioStore {
    fn default() -> Self {
        Self::new()
    }
}
