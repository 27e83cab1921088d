use crate::error::{AnalysisError, Result};
use crate::params::ModelParams;
use crate::state::{AdjustedStrength, BetCategory};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResultProbabilities {
    pub home: f64,
    pub draw: f64,
    pub away: f64,
}

/// Probability in [0, 1] of `category` given adjusted figures. Pure.
pub fn estimate(
    strength: &AdjustedStrength,
    category: BetCategory,
    params: &ModelParams,
) -> Result<f64> {
    let raw = match category {
        BetCategory::HomeWin => result_probabilities(strength, params).home,
        BetCategory::Draw => result_probabilities(strength, params).draw,
        BetCategory::AwayWin => result_probabilities(strength, params).away,
        BetCategory::FirstToScoreHome => first_to_score(strength.home_attack, strength),
        BetCategory::FirstToScoreAway => first_to_score(strength.away_attack, strength),
        BetCategory::BttsYes => btts_yes(strength, params),
        BetCategory::BttsNo => 1.0 - btts_yes(strength, params),
        BetCategory::OverGoals | BetCategory::UnderGoals => {
            if !params.goals_line {
                return Err(AnalysisError::UnsupportedCategory {
                    category,
                    mode: params.mode,
                });
            }
            let over = expected_goals(strength) / params.goals_scale;
            if category == BetCategory::OverGoals {
                over
            } else {
                1.0 - over
            }
        }
    };
    Ok(clamp_unit(raw))
}

/// Home/draw/away before the final clamp, with the draw floor applied.
pub fn result_probabilities(strength: &AdjustedStrength, params: &ModelParams) -> ResultProbabilities {
    let home_share = strength.home_attack / strength.away_defence;
    let away_share = strength.away_attack / strength.home_defence;
    let total = home_share + away_share;

    // A zero defence gives an unbounded share: that side takes everything.
    let (mut home, mut away) = match (home_share == f64::INFINITY, away_share == f64::INFINITY) {
        (true, true) => (0.5, 0.5),
        (true, false) => (1.0, 0.0),
        (false, true) => (0.0, 1.0),
        _ if total != 0.0 && total.is_finite() => (home_share / total, away_share / total),
        _ => (0.0, 0.0),
    };
    let mut draw = 1.0 - home - away;

    if draw < params.draw_floor {
        draw = params.draw_floor;
        let sum = home + away;
        if sum != 0.0 {
            let scale = (1.0 - draw) / sum;
            home *= scale;
            away *= scale;
        }
    }

    ResultProbabilities { home, draw, away }
}

fn first_to_score(requested: f64, strength: &AdjustedStrength) -> f64 {
    let total = strength.home_attack + strength.away_attack;
    if total == 0.0 {
        return 0.0;
    }
    requested / total
}

fn btts_yes(strength: &AdjustedStrength, params: &ModelParams) -> f64 {
    let yes = (strength.home_attack / params.btts_divisor)
        * (strength.away_attack / params.btts_divisor);
    match params.btts_cap {
        Some(cap) => yes.min(cap),
        None => yes,
    }
}

pub fn expected_goals(strength: &AdjustedStrength) -> f64 {
    (strength.home_attack + strength.away_attack)
        * ((strength.home_defence + strength.away_defence) / 2.0)
}

/// Final guard applied to every category. NaN reports as 0.
pub fn clamp_unit(v: f64) -> f64 {
    if v.is_nan() {
        return 0.0;
    }
    clamp(v, 0.0, 1.0)
}

fn clamp(v: f64, lo: f64, hi: f64) -> f64 {
    v.max(lo).min(hi)
}
