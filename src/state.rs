use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

pub const PENDING_RESULT: &str = "Pending";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceMode {
    StaticCatalog,
    LiveStats,
}

impl fmt::Display for SourceMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceMode::StaticCatalog => f.write_str("static catalog"),
            SourceMode::LiveStats => f.write_str("live statistics"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Home,
    Away,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormResult {
    Win,
    Draw,
    Loss,
    Other(char),
}

impl FormResult {
    pub fn from_symbol(raw: &str) -> Self {
        let mut chars = raw.trim().chars();
        let Some(ch) = chars.next() else {
            return FormResult::Other('?');
        };
        if chars.next().is_some() {
            return FormResult::Other(ch);
        }
        Self::from_char(ch)
    }

    pub fn from_char(ch: char) -> Self {
        match ch.to_ascii_uppercase() {
            'W' => FormResult::Win,
            'D' => FormResult::Draw,
            'L' => FormResult::Loss,
            other => FormResult::Other(other),
        }
    }

    pub fn symbol(self) -> char {
        match self {
            FormResult::Win => 'W',
            FormResult::Draw => 'D',
            FormResult::Loss => 'L',
            FormResult::Other(ch) => ch,
        }
    }
}

/// Raw per-team inputs, produced fresh for every analysis.
#[derive(Debug, Clone, PartialEq)]
pub struct TeamIndicators {
    pub name: String,
    pub attack: f64,
    pub defence: f64,
    /// Most recent result last.
    pub form: Vec<FormResult>,
    pub unavailable: Vec<String>,
}

impl TeamIndicators {
    pub fn unavailable_count(&self) -> usize {
        self.unavailable.len()
    }

    pub fn form_string(&self) -> String {
        self.form
            .iter()
            .map(|r| r.symbol().to_string())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AdjustedStrength {
    pub home_attack: f64,
    pub away_attack: f64,
    pub home_defence: f64,
    pub away_defence: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BetCategory {
    HomeWin,
    Draw,
    AwayWin,
    FirstToScoreHome,
    FirstToScoreAway,
    BttsYes,
    BttsNo,
    OverGoals,
    UnderGoals,
}

impl BetCategory {
    pub const ALL: [BetCategory; 9] = [
        BetCategory::HomeWin,
        BetCategory::Draw,
        BetCategory::AwayWin,
        BetCategory::FirstToScoreHome,
        BetCategory::FirstToScoreAway,
        BetCategory::BttsYes,
        BetCategory::BttsNo,
        BetCategory::OverGoals,
        BetCategory::UnderGoals,
    ];

    pub fn label(self) -> &'static str {
        match self {
            BetCategory::HomeWin => "3-Way Result (Home Win)",
            BetCategory::Draw => "3-Way Result (Draw)",
            BetCategory::AwayWin => "3-Way Result (Away Win)",
            BetCategory::FirstToScoreHome => "First Team to Score (Home)",
            BetCategory::FirstToScoreAway => "First Team to Score (Away)",
            BetCategory::BttsYes => "Both Teams to Score (Yes)",
            BetCategory::BttsNo => "Both Teams to Score (No)",
            BetCategory::OverGoals => "Over/Under 3.0 (Over)",
            BetCategory::UnderGoals => "Over/Under 3.0 (Under)",
        }
    }

    pub fn key(self) -> &'static str {
        match self {
            BetCategory::HomeWin => "home-win",
            BetCategory::Draw => "draw",
            BetCategory::AwayWin => "away-win",
            BetCategory::FirstToScoreHome => "first-home",
            BetCategory::FirstToScoreAway => "first-away",
            BetCategory::BttsYes => "btts-yes",
            BetCategory::BttsNo => "btts-no",
            BetCategory::OverGoals => "over",
            BetCategory::UnderGoals => "under",
        }
    }
}

impl fmt::Display for BetCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for BetCategory {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let trimmed = raw.trim();
        let folded = trimmed.to_ascii_lowercase().replace(['_', ' '], "-");
        for category in BetCategory::ALL {
            if category.label().eq_ignore_ascii_case(trimmed)
                || category.key() == folded
                || format!("{category:?}").eq_ignore_ascii_case(trimmed)
            {
                return Ok(category);
            }
        }
        Err(format!("unknown bet category: {trimmed}"))
    }
}

/// One line of the prediction history. Field names match the on-disk format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionRecord {
    pub date: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub league: Option<String>,
    #[serde(rename = "match")]
    pub match_label: String,
    pub bet: String,
    #[serde(
        serialize_with = "serialize_percent",
        deserialize_with = "deserialize_percent"
    )]
    pub prediction: f64,
    #[serde(default = "pending_result")]
    pub actual_result: String,
}

impl PredictionRecord {
    pub fn is_pending(&self) -> bool {
        self.actual_result == PENDING_RESULT
    }
}

fn pending_result() -> String {
    PENDING_RESULT.to_string()
}

pub fn match_label(home: &str, away: &str) -> String {
    format!("{home} vs {away}")
}

/// Rounds a 0..=100 percentage to one decimal place.
pub fn round_percent(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

fn serialize_percent<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&format!("{value:.1}"))
}

fn deserialize_percent<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(f64),
        Text(String),
    }

    match Raw::deserialize(deserializer)? {
        Raw::Number(n) => Ok(n),
        Raw::Text(s) => s
            .trim()
            .trim_end_matches('%')
            .parse::<f64>()
            .map_err(serde::de::Error::custom),
    }
}

/// A team as the caller names it. Live statistics also need the provider's id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TeamRef {
    pub name: String,
    pub id: Option<u32>,
}

impl TeamRef {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            id: None,
        }
    }

    pub fn with_id(name: impl Into<String>, id: u32) -> Self {
        Self {
            name: name.into(),
            id: Some(id),
        }
    }

    fn same_team(&self, other: &TeamRef) -> bool {
        match (self.id, other.id) {
            (Some(a), Some(b)) => a == b,
            _ => self.name.trim() == other.name.trim(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchSelection {
    pub league: String,
    pub league_id: Option<u32>,
    pub home: TeamRef,
    pub away: TeamRef,
}

impl MatchSelection {
    pub fn new(league: impl Into<String>, home: TeamRef, away: TeamRef) -> Self {
        Self {
            league: league.into(),
            league_id: None,
            home,
            away,
        }
    }

    pub fn is_same_team(&self) -> bool {
        self.home.same_team(&self.away)
    }

    pub fn label(&self) -> String {
        match_label(&self.home.name, &self.away.name)
    }
}

/// A scheduled match as listed by the remote provider.
#[derive(Debug, Clone, PartialEq)]
pub struct Fixture {
    pub id: u64,
    pub kickoff: String,
    pub league_id: u32,
    pub league_name: String,
    pub home: TeamRef,
    pub away: TeamRef,
}

impl Fixture {
    pub fn selection(&self) -> MatchSelection {
        MatchSelection {
            league: self.league_name.clone(),
            league_id: Some(self.league_id),
            home: self.home.clone(),
            away: self.away.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct HeadToHeadTally {
    pub home_wins: u32,
    pub away_wins: u32,
    pub draws: u32,
}

impl HeadToHeadTally {
    pub fn total(&self) -> u32 {
        self.home_wins + self.away_wins + self.draws
    }
}

/// How the adjusted figures for a selected match are obtained.
#[derive(Debug, Clone, PartialEq)]
pub enum StrengthBasis {
    Indicators {
        home: TeamIndicators,
        away: TeamIndicators,
    },
    HeadToHead {
        tally: HeadToHeadTally,
        strength: AdjustedStrength,
    },
}
