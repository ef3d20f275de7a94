use chrono::Utc;
use uuid::Uuid;

use crate::models::portfolio::{
    AllocationSlice, Portfolio, RiskLevel, BASELINE_BALANCE, MANAGEMENT_FEE_PCT,
};
use crate::models::questionnaire::QuestionnaireAnswers;
use crate::services::risk;

/// One row of a hard-coded strategy table: asset name, percentage, color.
type TableRow = (&'static str, f64, &'static str);

/// A named model strategy plus the predicate that selects it.
///
/// The generator is an ordered decision table, not a formula: rules are
/// evaluated top to bottom and the first match wins. Reordering the list is
/// a behavior change.
struct StrategyRule {
    name: &'static str,
    expected_return: f64,
    matches: fn(&QuestionnaireAnswers, f64) -> bool,
    table: &'static [TableRow],
}

const ULTRA_CONSERVATIVE: &[TableRow] = &[
    ("Government Bonds", 50.0, "#1E6091"),
    ("Corporate Bonds", 25.0, "#2A9D8F"),
    ("Large Cap Dividend Stocks", 15.0, "#E9C46A"),
    ("Cash & Money Market", 10.0, "#8D99AE"),
];

const INCOME_FOCUSED: &[TableRow] = &[
    ("Corporate Bonds", 35.0, "#2A9D8F"),
    ("Large Cap Dividend Stocks", 25.0, "#E9C46A"),
    ("Government Bonds", 20.0, "#1E6091"),
    ("REITs", 12.0, "#E76F51"),
    ("Cash & Money Market", 8.0, "#8D99AE"),
];

const AGGRESSIVE_GROWTH: &[TableRow] = &[
    ("US Growth Stocks", 45.0, "#E63946"),
    ("International Stocks", 20.0, "#457B9D"),
    ("Emerging Markets", 15.0, "#F4A261"),
    ("Small Cap Stocks", 12.0, "#9B5DE5"),
    ("Corporate Bonds", 5.0, "#2A9D8F"),
    ("Cash & Money Market", 3.0, "#8D99AE"),
];

const BALANCED_GROWTH: &[TableRow] = &[
    ("US Large Cap Stocks", 35.0, "#264653"),
    ("Corporate Bonds", 25.0, "#2A9D8F"),
    ("International Stocks", 15.0, "#457B9D"),
    ("Government Bonds", 15.0, "#1E6091"),
    ("REITs", 5.0, "#E76F51"),
    ("Cash & Money Market", 5.0, "#8D99AE"),
];

const CONSERVATIVE_BALANCED: &[TableRow] = &[
    ("Government Bonds", 30.0, "#1E6091"),
    ("Corporate Bonds", 25.0, "#2A9D8F"),
    ("Large Cap Dividend Stocks", 25.0, "#E9C46A"),
    ("International Stocks", 10.0, "#457B9D"),
    ("Cash & Money Market", 10.0, "#8D99AE"),
];

/// The percentages in each table are regression values: they were tuned by
/// hand per strategy and are asserted exactly in tests. Change a number only
/// as a deliberate product decision.
const RULES: &[StrategyRule] = &[
    StrategyRule {
        name: "Ultra Conservative Preservation",
        expected_return: 3.8,
        matches: |answers, score| answers.goal == "preserve" || score <= 2.0,
        table: ULTRA_CONSERVATIVE,
    },
    StrategyRule {
        name: "Income-Focused Strategy",
        expected_return: 5.2,
        matches: |answers, score| {
            answers.goal == "income" || (score <= 3.0 && answers.goal != "wealth-growth")
        },
        table: INCOME_FOCUSED,
    },
    StrategyRule {
        name: "Aggressive Growth",
        expected_return: 9.5,
        matches: |answers, score| score >= 4.0 && answers.time_horizon == "10+",
        table: AGGRESSIVE_GROWTH,
    },
    StrategyRule {
        name: "Balanced Growth & Income",
        expected_return: 7.1,
        matches: |_, score| score >= 3.0,
        table: BALANCED_GROWTH,
    },
    StrategyRule {
        name: "Conservative Balanced",
        expected_return: 5.8,
        matches: |_, _| true,
        table: CONSERVATIVE_BALANCED,
    },
];

/// Builds a complete portfolio locally from questionnaire answers.
///
/// This is the offline fallback used when the remote portfolio-creation call
/// fails; the user is never blocked on a backend outage.
pub fn generate_portfolio(answers: &QuestionnaireAnswers) -> Portfolio {
    let score = risk::score_answers(answers);
    let level = RiskLevel::from_score(score);

    // The last rule is a catch-all, so a match always exists.
    let rule = RULES
        .iter()
        .find(|r| (r.matches)(answers, score))
        .unwrap_or(&RULES[RULES.len() - 1]);

    let allocation: Vec<AllocationSlice> = rule
        .table
        .iter()
        .map(|(asset, pct, color)| AllocationSlice::new(asset, *pct, color))
        .collect();

    let mut portfolio = Portfolio {
        id: Uuid::new_v4(),
        api_id: None,
        name: rule.name.to_string(),
        allocation,
        reasoning: build_reasoning(answers, rule, score, level),
        expected_return: rule.expected_return,
        management_fee: MANAGEMENT_FEE_PCT,
        risk_level: level,
        risk_score: score,
        balance: 0.0,
        growth: 0.0,
        monthly_fee: 0.0,
        time_horizon: Some(answers.time_horizon.clone()),
        sectors: answers.sectors.clone(),
        restrictions: answers.restrictions.clone(),
        created_at: Some(Utc::now()),
        updated_at: None,
        user_id: None,
    };
    portfolio.set_balance(BASELINE_BALANCE);
    portfolio
}

/// Prose is generated independently of the allocation math. Sector,
/// restriction and liquidity notes are textual annotations only; they must
/// never feed back into the percentage tables.
fn build_reasoning(
    answers: &QuestionnaireAnswers,
    rule: &StrategyRule,
    score: f64,
    level: RiskLevel,
) -> String {
    let mut text = format!(
        "Your risk score of {:.1} places you in the {} band. Given your '{}' goal \
         and a {} year horizon, the {} strategy targets an expected annual return \
         of {:.1}% at a {:.2}% annual management fee.",
        score,
        level.label(),
        answers.goal,
        answers.time_horizon,
        rule.name,
        rule.expected_return,
        MANAGEMENT_FEE_PCT,
    );

    let sectors = answers.selected_sectors();
    if !sectors.is_empty() {
        text.push_str(&format!(
            " Security selection within each asset class will tilt toward your \
             preferred sectors ({}).",
            sectors.join(", ")
        ));
    }
    let restrictions = answers.selected_restrictions();
    if !restrictions.is_empty() {
        text.push_str(&format!(
            " Your restrictions ({}) are applied at the security level and do not \
             change the class weights.",
            restrictions.join(", ")
        ));
    }
    if answers.liquidity_needs == "high" {
        text.push_str(
            " Because you indicated high liquidity needs, the cash sleeve is held \
             in instruments redeemable within one business day.",
        );
    }
    text
}
