use crate::models::questionnaire::QuestionnaireAnswers;

/// Maps questionnaire answers to a risk score in [1.0, 5.0], rounded to one
/// decimal. Pure and deterministic; there is no failure mode.
///
/// Unrecognized enum values are silently mapped to a mid-point instead of
/// being rejected (3 for risk tolerance and time horizon, 2 for experience,
/// 1 for net worth). This permissive-defaulting policy is deliberate product
/// behavior carried over from the original questionnaire flow; do not turn
/// these defaults into errors without product sign-off.
pub fn score_answers(answers: &QuestionnaireAnswers) -> f64 {
    let tolerance: f64 = match answers.risk_tolerance.as_str() {
        "very-low" => 1.0,
        "low" => 2.0,
        "moderate" => 3.0,
        "high" => 4.0,
        "very-high" => 5.0,
        _ => 3.0,
    };
    let horizon: f64 = match answers.time_horizon.as_str() {
        "<1" => 1.0,
        "1-3" => 2.0,
        "3-5" => 3.0,
        "5-10" => 4.0,
        "10+" => 5.0,
        _ => 3.0,
    };
    let experience: f64 = match answers.experience.as_str() {
        "none" => 1.0,
        "basic" => 2.0,
        "intermediate" => 3.0,
        "advanced" => 4.0,
        "expert" => 5.0,
        _ => 2.0,
    };
    let net_worth: f64 = match answers.net_worth.as_str() {
        "<50k" => 1.0,
        "50k-100k" => 2.0,
        "100k-500k" => 3.0,
        "500k-1m" => 4.0,
        "1m+" => 5.0,
        _ => 1.0,
    };

    let score = tolerance * 0.4 + horizon * 0.3 + experience * 0.2 + net_worth * 0.1;
    (score * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::portfolio::RiskLevel;

    fn answers(tolerance: &str, horizon: &str, experience: &str, net_worth: &str) -> QuestionnaireAnswers {
        QuestionnaireAnswers {
            goal: "wealth-growth".into(),
            time_horizon: horizon.into(),
            risk_tolerance: tolerance.into(),
            experience: experience.into(),
            income: "50k-100k".into(),
            net_worth: net_worth.into(),
            liquidity_needs: "low".into(),
            insights_opt_in: "no".into(),
            sectors: None,
            restrictions: None,
        }
    }

    #[test]
    fn extremes_stay_in_bounds() {
        let min = score_answers(&answers("very-low", "<1", "none", "<50k"));
        let max = score_answers(&answers("very-high", "10+", "expert", "1m+"));
        assert_eq!(min, 1.0);
        assert_eq!(max, 5.0);
    }

    #[test]
    fn weighted_sum_matches_hand_computation() {
        // 2*0.4 + 4*0.3 + 2*0.2 + 3*0.1 = 0.8 + 1.2 + 0.4 + 0.3 = 2.7
        let score = score_answers(&answers("low", "5-10", "basic", "100k-500k"));
        assert_eq!(score, 2.7);
        assert_eq!(RiskLevel::from_score(score), RiskLevel::Moderate);
    }

    #[test]
    fn unknown_values_default_to_mid_points() {
        // 3*0.4 + 3*0.3 + 2*0.2 + 1*0.1 = 2.6
        let score = score_answers(&answers("yolo", "someday", "guru", "plenty"));
        assert_eq!(score, 2.6);
    }

    #[test]
    fn score_always_rounded_to_one_decimal() {
        for tolerance in ["very-low", "low", "moderate", "high", "very-high"] {
            for horizon in ["<1", "1-3", "3-5", "5-10", "10+"] {
                let score = score_answers(&answers(tolerance, horizon, "basic", "<50k"));
                assert!((1.0..=5.0).contains(&score));
                assert_eq!(score, (score * 10.0).round() / 10.0);
            }
        }
    }
}
