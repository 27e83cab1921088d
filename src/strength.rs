use crate::params::ModelParams;
use crate::state::{AdjustedStrength, FormResult, HeadToHeadTally, TeamIndicators};

/// Folds unavailability and (static mode only) recent form into attack.
/// Defence passes through untouched.
pub fn adjust(home: &TeamIndicators, away: &TeamIndicators, params: &ModelParams) -> AdjustedStrength {
    AdjustedStrength {
        home_attack: adjusted_attack(home, params),
        away_attack: adjusted_attack(away, params),
        home_defence: home.defence,
        away_defence: away.defence,
    }
}

fn adjusted_attack(team: &TeamIndicators, params: &ModelParams) -> f64 {
    // No floor here: more than 1/penalty_factor absentees goes negative.
    let mut attack = team.attack * unavailability_factor(team.unavailable_count(), params);
    if params.form_weighting {
        attack *= form_modifier(&team.form, params);
    }
    attack
}

pub fn unavailability_factor(count: usize, params: &ModelParams) -> f64 {
    1.0 - count as f64 * params.penalty_factor
}

/// Mean multiplier over the last `form_window` results. Missing slots count
/// as neutral, so a short or empty sequence does not drag attack down.
pub fn form_modifier(form: &[FormResult], params: &ModelParams) -> f64 {
    let window = params.form_window.max(1);
    let start = form.len().saturating_sub(window);
    let recent = &form[start..];
    let neutral = (window - recent.len()) as f64 * params.form_draw;
    let sum: f64 = recent.iter().map(|r| form_weight(*r, params)).sum();
    (sum + neutral) / window as f64
}

fn form_weight(result: FormResult, params: &ModelParams) -> f64 {
    match result {
        FormResult::Win => params.form_win,
        FormResult::Draw => params.form_draw,
        FormResult::Loss => params.form_loss,
        FormResult::Other(_) => 1.0,
    }
}

/// Figures synthesized from past meetings when season statistics are missing.
/// Returns `None` when the pair has never met.
pub fn from_head_to_head(tally: &HeadToHeadTally) -> Option<AdjustedStrength> {
    let total = tally.total();
    if total == 0 {
        return None;
    }
    let home_ratio = tally.home_wins as f64 / total as f64;
    let away_ratio = tally.away_wins as f64 / total as f64;
    Some(AdjustedStrength {
        home_attack: 1.0 + home_ratio,
        away_attack: 1.0 + away_ratio,
        home_defence: 1.0 + away_ratio,
        away_defence: 1.0 + home_ratio,
    })
}
