use uuid::Uuid;

use crate::models::api::PortfolioResponse;
use crate::models::portfolio::{
    AllocationSlice, Portfolio, RiskLevel, BASELINE_BALANCE, MANAGEMENT_FEE_PCT,
};

/// Default allocation tables keyed by risk tolerance, used when the server
/// omits the allocation entirely.
///
/// These tables are intentionally distinct from the local generator's
/// strategy tables: the API-backed path and the offline path were designed
/// separately and have never been unified. Do not merge them without a
/// product decision; downstream snapshots depend on both sets.
type TableRow = (&'static str, f64);

const DEFAULT_VERY_LOW: (&[TableRow], f64) = (
    &[
        ("Treasury Bonds", 45.0),
        ("Municipal Bonds", 25.0),
        ("Money Market Funds", 20.0),
        ("Dividend Equities", 10.0),
    ],
    3.5,
);
const DEFAULT_LOW: (&[TableRow], f64) = (
    &[
        ("Treasury Bonds", 35.0),
        ("Investment Grade Bonds", 25.0),
        ("Dividend Equities", 25.0),
        ("Money Market Funds", 15.0),
    ],
    4.6,
);
const DEFAULT_MODERATE: (&[TableRow], f64) = (
    &[
        ("US Equities", 40.0),
        ("Investment Grade Bonds", 30.0),
        ("International Equities", 20.0),
        ("Money Market Funds", 10.0),
    ],
    6.4,
);
const DEFAULT_HIGH: (&[TableRow], f64) = (
    &[
        ("US Equities", 50.0),
        ("International Equities", 25.0),
        ("High Yield Bonds", 15.0),
        ("Real Estate", 10.0),
    ],
    8.2,
);
const DEFAULT_VERY_HIGH: (&[TableRow], f64) = (
    &[
        ("US Equities", 45.0),
        ("Emerging Market Equities", 25.0),
        ("International Equities", 20.0),
        ("Real Estate", 10.0),
    ],
    10.0,
);

/// Keyword table for asset-class coloring; first case-insensitive substring
/// match wins. Order matters: "government" must come before "bond".
const COLOR_KEYWORDS: &[(&str, &str)] = &[
    ("government", "#386641"),
    ("treasury", "#386641"),
    ("municipal", "#52796F"),
    ("bond", "#6A994E"),
    ("dividend", "#A7C957"),
    ("emerging", "#EE6C4D"),
    ("international", "#3D5A80"),
    ("stock", "#BC4749"),
    ("equit", "#BC4749"),
    ("real estate", "#9C6644"),
    ("reit", "#9C6644"),
    ("commodit", "#FFB703"),
    ("money market", "#8D99AE"),
    ("cash", "#8D99AE"),
];

/// Cycled by position when no keyword matches.
const FALLBACK_PALETTE: &[&str] = &[
    "#0077B6", "#00B4D8", "#90E0EF", "#FFD166", "#EF476F", "#06D6A0",
];

fn default_table(risk_tolerance: &str) -> (&'static [TableRow], f64) {
    match risk_tolerance {
        "very-low" => DEFAULT_VERY_LOW,
        "low" => DEFAULT_LOW,
        "high" => DEFAULT_HIGH,
        "very-high" => DEFAULT_VERY_HIGH,
        _ => DEFAULT_MODERATE,
    }
}

fn score_for_tolerance(risk_tolerance: &str) -> f64 {
    match risk_tolerance {
        "very-low" => 1.0,
        "low" => 2.0,
        "moderate" => 3.0,
        "high" => 4.0,
        "very-high" => 5.0,
        _ => 3.0,
    }
}

/// Picks a color for an asset class: keyword lookup first, positional
/// palette as the fallback.
pub fn color_for_asset(asset_class: &str, index: usize) -> String {
    let lowered = asset_class.to_lowercase();
    for (keyword, color) in COLOR_KEYWORDS {
        if lowered.contains(keyword) {
            return (*color).to_string();
        }
    }
    FALLBACK_PALETTE[index % FALLBACK_PALETTE.len()].to_string()
}

/// Converts a remote portfolio record into a fully populated `Portfolio`,
/// supplying a deterministic default for every optional field.
///
/// Idempotent: normalizing the wire projection of an already-normalized
/// portfolio yields the same portfolio. The local id is therefore derived
/// (uuid v5) from the server id when one exists, and from the resolved name
/// otherwise, never drawn at random.
pub fn normalize_api_portfolio(resp: &PortfolioResponse) -> Portfolio {
    let tolerance = resp.risk_tolerance.as_deref().unwrap_or("moderate");
    let (table, table_return) = default_table(tolerance);

    let risk_score = resp
        .risk_score
        .unwrap_or_else(|| score_for_tolerance(tolerance));
    let risk_level = resp
        .risk_level
        .as_deref()
        .map(RiskLevel::from_label)
        .unwrap_or_else(|| RiskLevel::from_score(risk_score));

    let allocation: Vec<AllocationSlice> = match &resp.allocation {
        Some(rows) if !rows.is_empty() => rows
            .iter()
            .enumerate()
            .map(|(i, row)| AllocationSlice {
                asset_name: row.asset_class.clone(),
                percentage: row.percentage,
                color: row
                    .color
                    .clone()
                    .unwrap_or_else(|| color_for_asset(&row.asset_class, i)),
            })
            .collect(),
        _ => table
            .iter()
            .enumerate()
            .map(|(i, (asset, pct))| AllocationSlice {
                asset_name: (*asset).to_string(),
                percentage: *pct,
                color: color_for_asset(asset, i),
            })
            .collect(),
    };

    let expected_return = resp.expected_return.unwrap_or(table_return);
    let management_fee = resp.management_fee.unwrap_or(MANAGEMENT_FEE_PCT);
    let name = resp
        .name
        .clone()
        .unwrap_or_else(|| format!("{} Portfolio", risk_level.label()));
    let reasoning = resp.reasoning.clone().unwrap_or_else(|| {
        format!(
            "A {} risk portfolio for a {} horizon aimed at {}, targeting {:.1}% \
             annually at a {:.2}% management fee.",
            risk_level.label(),
            resp.time_horizon.as_deref().unwrap_or("medium-term"),
            resp.goal.as_deref().unwrap_or("steady growth"),
            expected_return,
            management_fee,
        )
    });

    let id = match &resp.id {
        Some(api_id) => Uuid::new_v5(&Uuid::NAMESPACE_OID, api_id.as_bytes()),
        None => Uuid::new_v5(&Uuid::NAMESPACE_OID, name.as_bytes()),
    };

    let mut portfolio = Portfolio {
        id,
        api_id: resp.id.clone(),
        name,
        allocation,
        reasoning,
        expected_return,
        management_fee,
        risk_level,
        risk_score,
        balance: 0.0,
        growth: 0.0,
        monthly_fee: 0.0,
        time_horizon: resp.time_horizon.clone(),
        sectors: resp.sectors.clone(),
        restrictions: resp.restrictions.clone(),
        created_at: resp.created_at,
        updated_at: resp.updated_at,
        user_id: resp.user_id.clone(),
    };
    portfolio.set_balance(resp.balance.unwrap_or(BASELINE_BALANCE));
    portfolio
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::api::ApiAllocation;

    fn bare_response() -> PortfolioResponse {
        PortfolioResponse {
            id: Some("srv-42".into()),
            risk_tolerance: Some("low".into()),
            ..Default::default()
        }
    }

    #[test]
    fn missing_fields_all_receive_defaults() {
        let p = normalize_api_portfolio(&bare_response());
        assert_eq!(p.api_id.as_deref(), Some("srv-42"));
        assert_eq!(p.risk_score, 2.0);
        assert_eq!(p.risk_level, RiskLevel::Low);
        assert_eq!(p.name, "Low Portfolio");
        assert_eq!(p.management_fee, MANAGEMENT_FEE_PCT);
        assert_eq!(p.expected_return, 4.6);
        assert_eq!(p.balance, BASELINE_BALANCE);
        assert!(!p.reasoning.is_empty());
        let total: f64 = p.allocation.iter().map(|s| s.percentage).sum();
        assert_eq!(total, 100.0);
    }

    #[test]
    fn normalize_is_idempotent() {
        let once = normalize_api_portfolio(&bare_response());
        let twice = normalize_api_portfolio(&PortfolioResponse::from(&once));
        assert_eq!(once, twice);
    }

    #[test]
    fn keyword_colors_win_over_palette() {
        assert_eq!(color_for_asset("Government Bonds", 0), "#386641");
        assert_eq!(color_for_asset("EMERGING Market Equities", 3), "#EE6C4D");
        // No keyword: positional palette, cycling past its length
        let first = color_for_asset("Collectibles", 0);
        let wrapped = color_for_asset("Collectibles", FALLBACK_PALETTE.len());
        assert_eq!(first, wrapped);
    }

    #[test]
    fn provided_allocation_is_kept_and_colored() {
        let mut resp = bare_response();
        resp.allocation = Some(vec![
            ApiAllocation {
                asset_class: "Green Energy".into(),
                percentage: 60.0,
                color: Some("#123456".into()),
            },
            ApiAllocation {
                asset_class: "Corporate Bonds".into(),
                percentage: 40.0,
                color: None,
            },
        ]);
        let p = normalize_api_portfolio(&resp);
        assert_eq!(p.allocation[0].color, "#123456");
        assert_eq!(p.allocation[1].color, "#6A994E");
        assert_eq!(p.allocation[1].percentage, 40.0);
    }

    #[test]
    fn server_balance_drives_derived_fields() {
        let mut resp = bare_response();
        resp.balance = Some(20_000.0);
        let p = normalize_api_portfolio(&resp);
        assert_eq!(p.growth, 100.0);
        assert!((p.monthly_fee - 0.1667).abs() < 1e-3);
    }

    #[test]
    fn unknown_tolerance_falls_back_to_moderate_table() {
        let mut resp = bare_response();
        resp.risk_tolerance = Some("cowboy".into());
        let p = normalize_api_portfolio(&resp);
        assert_eq!(p.risk_score, 3.0);
        assert_eq!(p.allocation[0].asset_name, "US Equities");
    }
}
