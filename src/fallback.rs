use chrono::NaiveDate;
use log::{info, warn};

use crate::error::{AnalysisError, Result};
use crate::state::{MatchSelection, StrengthBasis, TeamIndicators, TeamRef};
use crate::stats_fetch::{SeasonStats, StatsProvider, season_for, tally_head_to_head};
use crate::strength;

pub const DEFAULT_H2H_LAST: u8 = 10;

/// Season statistics for both sides when the provider has them, otherwise
/// figures synthesized from the last `h2h_last` meetings.
pub fn resolve_live_basis(
    provider: &dyn StatsProvider,
    selection: &MatchSelection,
    today: NaiveDate,
    h2h_last: u8,
) -> Result<StrengthBasis> {
    let (Some(home_id), Some(away_id)) = (selection.home.id, selection.away.id) else {
        return Err(AnalysisError::InputIncomplete(
            "live statistics need team ids for both sides".to_string(),
        ));
    };
    let season = season_for(today);

    if let Some(league_id) = selection.league_id {
        let home_stats = provider
            .team_season_stats(league_id, season, home_id)
            .map_err(AnalysisError::unavailable)?;
        let away_stats = match home_stats {
            Some(_) => provider
                .team_season_stats(league_id, season, away_id)
                .map_err(AnalysisError::unavailable)?,
            None => None,
        };
        if let (Some(home_stats), Some(away_stats)) = (home_stats, away_stats) {
            info!("using {season} season statistics for {}", selection.label());
            let home = season_indicators(provider, &selection.home, home_stats, season, today);
            let away = season_indicators(provider, &selection.away, away_stats, season, today);
            return Ok(StrengthBasis::Indicators { home, away });
        }
        info!(
            "season statistics missing for {}, falling back to head-to-head",
            selection.label()
        );
    } else {
        info!("no league id for {}, using head-to-head", selection.label());
    }

    let meetings = provider
        .head_to_head(home_id, away_id, h2h_last)
        .map_err(AnalysisError::unavailable)?;
    let tally = tally_head_to_head(&meetings, home_id, away_id);
    let Some(strength) = strength::from_head_to_head(&tally) else {
        return Err(AnalysisError::NoHistoryData {
            home: selection.home.name.clone(),
            away: selection.away.name.clone(),
        });
    };
    info!(
        "head-to-head {}: {}W {}D {}L over {} meetings",
        selection.label(),
        tally.home_wins,
        tally.draws,
        tally.away_wins,
        tally.total()
    );
    Ok(StrengthBasis::HeadToHead { tally, strength })
}

fn season_indicators(
    provider: &dyn StatsProvider,
    team: &TeamRef,
    stats: SeasonStats,
    season: i32,
    today: NaiveDate,
) -> TeamIndicators {
    let unavailable = match team.id {
        Some(id) => provider
            .team_injuries(id, season, today)
            .unwrap_or_else(|err| {
                warn!("injuries for {} unavailable: {err:#}", team.name);
                Vec::new()
            }),
        None => Vec::new(),
    };
    TeamIndicators {
        name: team.name.clone(),
        attack: stats.attack,
        defence: stats.defence,
        form: stats.form,
        unavailable,
    }
}
