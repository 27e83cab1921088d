use anyhow::Context;
use chrono::{Local, NaiveDate};
use log::{debug, info};

use crate::catalog::StaticCatalog;
use crate::config::AppConfig;
use crate::error::{AnalysisError, Result};
use crate::fallback::resolve_live_basis;
use crate::params::ModelParams;
use crate::persist::HistoryLedger;
use crate::state::{
    AdjustedStrength, BetCategory, Fixture, MatchSelection, PENDING_RESULT, PredictionRecord,
    Side, SourceMode, StrengthBasis, match_label, round_percent,
};
use crate::stats_fetch::{ApiFootballClient, StatsProvider};
use crate::strength;
use crate::win_prob;

/// Prompt placeholder for the outcome field; never a real outcome.
const OUTCOME_PLACEHOLDER: &str = "e.g., Home Win";

pub enum DataSource {
    Catalog(StaticCatalog),
    Live {
        provider: Box<dyn StatsProvider>,
        h2h_last: u8,
    },
}

impl DataSource {
    pub fn mode(&self) -> SourceMode {
        match self {
            DataSource::Catalog(_) => SourceMode::StaticCatalog,
            DataSource::Live { .. } => SourceMode::LiveStats,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LeagueListing {
    pub name: String,
    pub teams: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Listing {
    Leagues(Vec<LeagueListing>),
    Fixtures(Vec<Fixture>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct SelectedMatch {
    pub selection: MatchSelection,
    pub basis: StrengthBasis,
}

impl SelectedMatch {
    pub fn strength(&self, params: &ModelParams) -> AdjustedStrength {
        match &self.basis {
            StrengthBasis::Indicators { home, away } => strength::adjust(home, away, params),
            StrengthBasis::HeadToHead { strength, .. } => *strength,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Estimate {
    pub category: BetCategory,
    /// In [0, 1].
    pub probability: f64,
    /// Percentage rounded to one decimal, as stored in the history.
    pub percent: f64,
}

impl Estimate {
    pub fn display(&self) -> String {
        format!("{:.1}%", self.percent)
    }
}

/// Everything one caller works with: where indicators come from, the model
/// constants for that source, the selected match and the history.
pub struct Session {
    source: DataSource,
    params: ModelParams,
    ledger: HistoryLedger,
    selected: Option<SelectedMatch>,
    today: Option<NaiveDate>,
}

impl Session {
    pub fn new(source: DataSource, ledger: HistoryLedger) -> Self {
        let params = ModelParams::for_mode(source.mode());
        Self {
            source,
            params,
            ledger,
            selected: None,
            today: None,
        }
    }

    pub fn from_config(cfg: &AppConfig) -> anyhow::Result<Self> {
        let source = match cfg.source {
            SourceMode::StaticCatalog => {
                let catalog = match &cfg.catalog_path {
                    Some(path) => StaticCatalog::from_file(path)?,
                    None => StaticCatalog::builtin(),
                };
                DataSource::Catalog(catalog)
            }
            SourceMode::LiveStats => {
                let api_key = cfg
                    .api_key
                    .clone()
                    .context("BET_API_KEY missing for live statistics")?;
                DataSource::Live {
                    provider: Box::new(ApiFootballClient::new(cfg.api_base_url.clone(), api_key)),
                    h2h_last: cfg.h2h_last,
                }
            }
        };
        let ledger = HistoryLedger::open(&cfg.history_path)?;
        Ok(Self::new(source, ledger))
    }

    /// Pins the date used for season selection and fixture listings.
    pub fn with_today(mut self, date: NaiveDate) -> Self {
        self.today = Some(date);
        self
    }

    pub fn mode(&self) -> SourceMode {
        self.source.mode()
    }

    pub fn history(&self) -> &[PredictionRecord] {
        self.ledger.records()
    }

    pub fn selected(&self) -> Option<&SelectedMatch> {
        self.selected.as_ref()
    }

    fn today(&self) -> NaiveDate {
        self.today.unwrap_or_else(|| Local::now().date_naive())
    }

    /// Leagues and their teams for the catalog, the day's fixtures when live.
    pub fn listing(&self, date: Option<NaiveDate>) -> Result<Listing> {
        match &self.source {
            DataSource::Catalog(catalog) => Ok(Listing::Leagues(
                catalog
                    .leagues()
                    .iter()
                    .map(|l| LeagueListing {
                        name: l.league.clone(),
                        teams: l.teams.clone(),
                    })
                    .collect(),
            )),
            DataSource::Live { provider, .. } => {
                let date = date.unwrap_or_else(|| self.today());
                let fixtures = provider
                    .fixtures_by_date(date)
                    .map_err(AnalysisError::unavailable)?;
                debug!("{} fixtures on {date}", fixtures.len());
                Ok(Listing::Fixtures(fixtures))
            }
        }
    }

    pub fn teams(&self, league: &str) -> Vec<String> {
        match &self.source {
            DataSource::Catalog(catalog) => catalog.teams(league).to_vec(),
            DataSource::Live { .. } => Vec::new(),
        }
    }

    pub fn select_match(&mut self, selection: MatchSelection) -> Result<&SelectedMatch> {
        self.selected = None;
        validate_selection(&selection)?;

        let basis = match &self.source {
            DataSource::Catalog(catalog) => {
                let lookup = |name: &str| {
                    catalog.indicators(&selection.league, name).ok_or_else(|| {
                        AnalysisError::IndicatorUnavailable(format!(
                            "no data for {name} in {}",
                            selection.league
                        ))
                    })
                };
                StrengthBasis::Indicators {
                    home: lookup(&selection.home.name)?,
                    away: lookup(&selection.away.name)?,
                }
            }
            DataSource::Live { provider, h2h_last } => {
                resolve_live_basis(provider.as_ref(), &selection, self.today(), *h2h_last)?
            }
        };

        info!("selected {} ({})", selection.label(), selection.league);
        Ok(&*self.selected.insert(SelectedMatch { selection, basis }))
    }

    pub fn adjusted_strength(&self) -> Option<AdjustedStrength> {
        self.selected.as_ref().map(|m| m.strength(&self.params))
    }

    /// Computes the probability for the selected match and records it.
    pub fn estimate(&mut self, category: BetCategory) -> Result<Estimate> {
        let Some(selected) = self.selected.as_ref() else {
            return Err(AnalysisError::InputIncomplete(
                "select a match before estimating".to_string(),
            ));
        };
        let strength = selected.strength(&self.params);
        let probability = win_prob::estimate(&strength, category, &self.params)?;
        let percent = round_percent(probability * 100.0);

        let selection = &selected.selection;
        let league = Some(selection.league.trim().to_string()).filter(|l| !l.is_empty());
        let record = PredictionRecord {
            date: Local::now().format("%Y-%m-%d %H:%M").to_string(),
            league,
            match_label: match_label(&selection.home.name, &selection.away.name),
            bet: category.label().to_string(),
            prediction: percent,
            actual_result: PENDING_RESULT.to_string(),
        };
        self.ledger.append(record)?;

        Ok(Estimate {
            category,
            probability,
            percent,
        })
    }

    /// Attaches an observed outcome to the record at `index` (newest is 0).
    pub fn record_outcome(&mut self, index: usize, text: &str) -> Result<&PredictionRecord> {
        let text = text.trim();
        if text.is_empty() || text == OUTCOME_PLACEHOLDER {
            return Err(AnalysisError::InputIncomplete(
                "enter the actual result".to_string(),
            ));
        }
        self.ledger.amend(index, text)
    }

    /// Recent form and absentees of one side, for display next to a result.
    pub fn team_report(&self, side: Side) -> Option<String> {
        let selected = self.selected.as_ref()?;
        let report = match &selected.basis {
            StrengthBasis::Indicators { home, away } => {
                let team = if side == Side::Home { home } else { away };
                let unavailable = if team.unavailable.is_empty() {
                    "None".to_string()
                } else {
                    team.unavailable.join(", ")
                };
                format!(
                    "{} Info:\n- Recent Form: {}\n- Unavailable: {}",
                    team.name,
                    team.form_string(),
                    unavailable
                )
            }
            StrengthBasis::HeadToHead { tally, .. } => {
                let (name, wins, losses) = match side {
                    Side::Home => (&selected.selection.home.name, tally.home_wins, tally.away_wins),
                    Side::Away => (&selected.selection.away.name, tally.away_wins, tally.home_wins),
                };
                format!(
                    "{name} Info:\n- Head-to-head: {wins}W {}D {losses}L in last {} meetings",
                    tally.draws,
                    tally.total()
                )
            }
        };
        Some(report)
    }
}

/// Parses a caller-supplied bet type; a missing one is incomplete input.
pub fn parse_category(raw: Option<&str>) -> Result<BetCategory> {
    let raw = raw.map(str::trim).filter(|s| !s.is_empty()).ok_or_else(|| {
        AnalysisError::InputIncomplete("choose a bet type".to_string())
    })?;
    raw.parse::<BetCategory>()
        .map_err(AnalysisError::InputIncomplete)
}

fn validate_selection(selection: &MatchSelection) -> Result<()> {
    let missing = [
        ("league", selection.league.as_str()),
        ("home team", selection.home.name.as_str()),
        ("away team", selection.away.name.as_str()),
    ]
    .into_iter()
    .filter(|(_, value)| value.trim().is_empty())
    .map(|(field, _)| field)
    .collect::<Vec<_>>();
    if !missing.is_empty() {
        return Err(AnalysisError::InputIncomplete(format!(
            "missing {}",
            missing.join(", ")
        )));
    }
    if selection.is_same_team() {
        return Err(AnalysisError::SameTeamSelected(
            selection.home.name.trim().to_string(),
        ));
    }
    Ok(())
}
