use std::collections::HashMap;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use log::warn;
use serde::Deserialize;

use crate::state::{FormResult, TeamIndicators};

const BUILTIN_CATALOG: &str = include_str!("../data/catalog.json");

/// Offline team data keyed by league name.
#[derive(Debug, Clone)]
pub struct StaticCatalog {
    leagues: Vec<LeagueEntry>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LeagueEntry {
    pub league: String,
    #[serde(default)]
    pub teams: Vec<String>,
    #[serde(default)]
    pub data: HashMap<String, CatalogTeam>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CatalogTeam {
    pub attack_strength: f64,
    pub defence_strength: f64,
    #[serde(default)]
    pub last_4: Vec<String>,
    #[serde(default)]
    pub unavailable: Vec<String>,
}

impl StaticCatalog {
    pub fn builtin() -> Self {
        Self::from_json(BUILTIN_CATALOG).unwrap_or_else(|err| {
            warn!("builtin catalog unreadable: {err:#}");
            Self {
                leagues: Vec::new(),
            }
        })
    }

    pub fn from_json(raw: &str) -> Result<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() || trimmed == "null" {
            return Ok(Self {
                leagues: Vec::new(),
            });
        }
        let leagues: Vec<LeagueEntry> =
            serde_json::from_str(trimmed).context("invalid catalog json")?;
        Ok(Self { leagues })
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed reading catalog {}", path.display()))?;
        Self::from_json(&raw)
    }

    pub fn league_names(&self) -> Vec<&str> {
        self.leagues.iter().map(|l| l.league.as_str()).collect()
    }

    pub fn leagues(&self) -> &[LeagueEntry] {
        &self.leagues
    }

    /// Unknown leagues have no teams rather than being an error.
    pub fn teams(&self, league: &str) -> &[String] {
        self.league(league).map(|l| l.teams.as_slice()).unwrap_or(&[])
    }

    pub fn indicators(&self, league: &str, team: &str) -> Option<TeamIndicators> {
        let entry = self.league(league)?.data.get(team)?;
        Some(TeamIndicators {
            name: team.to_string(),
            attack: entry.attack_strength,
            defence: entry.defence_strength,
            form: entry
                .last_4
                .iter()
                .map(|s| FormResult::from_symbol(s))
                .collect(),
            unavailable: entry.unavailable.clone(),
        })
    }

    fn league(&self, name: &str) -> Option<&LeagueEntry> {
        let name = name.trim();
        self.leagues.iter().find(|l| l.league == name)
    }
}
