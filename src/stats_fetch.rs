use anyhow::{Context, Result};
use chrono::{Datelike, NaiveDate};
use serde_json::Value;

use crate::http_client::{fetch_json, http_client};
use crate::state::{Fixture, FormResult, HeadToHeadTally, TeamRef};

pub const DEFAULT_API_BASE_URL: &str = "https://v3.football.api-sports.io";
const API_KEY_HEADER: &str = "x-apisports-key";

/// Season averages for one team.
#[derive(Debug, Clone, PartialEq)]
pub struct SeasonStats {
    pub attack: f64,
    pub defence: f64,
    /// Most recent result last.
    pub form: Vec<FormResult>,
}

/// One past meeting; `winner_id` is `None` for a draw.
#[derive(Debug, Clone, PartialEq)]
pub struct H2hMeeting {
    pub fixture_id: u64,
    pub home_id: u32,
    pub away_id: u32,
    pub winner_id: Option<u32>,
}

/// The remote statistics catalog. Implemented over HTTP by [`ApiFootballClient`].
pub trait StatsProvider {
    fn fixtures_by_date(&self, date: NaiveDate) -> Result<Vec<Fixture>>;

    /// `Ok(None)` when the provider has no statistics for the team.
    fn team_season_stats(&self, league_id: u32, season: i32, team_id: u32)
    -> Result<Option<SeasonStats>>;

    fn head_to_head(&self, team_a: u32, team_b: u32, last: u8) -> Result<Vec<H2hMeeting>>;

    fn team_injuries(&self, team_id: u32, season: i32, date: NaiveDate) -> Result<Vec<String>>;
}

#[derive(Debug, Clone)]
pub struct ApiFootballClient {
    base_url: String,
    api_key: String,
}

impl ApiFootballClient {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        }
    }

    fn get(&self, path_and_query: &str) -> Result<String> {
        let client = http_client()?;
        let url = format!("{}{}", self.base_url, path_and_query);
        fetch_json(client, &url, &[(API_KEY_HEADER, self.api_key.as_str())])
    }
}

impl StatsProvider for ApiFootballClient {
    fn fixtures_by_date(&self, date: NaiveDate) -> Result<Vec<Fixture>> {
        let body = self
            .get(&format!("/fixtures?date={}", date.format("%Y-%m-%d")))
            .context("fixtures request failed")?;
        parse_fixtures_json(&body)
    }

    fn team_season_stats(
        &self,
        league_id: u32,
        season: i32,
        team_id: u32,
    ) -> Result<Option<SeasonStats>> {
        let body = self
            .get(&format!(
                "/teams/statistics?league={league_id}&season={season}&team={team_id}"
            ))
            .context("team statistics request failed")?;
        parse_team_stats_json(&body)
    }

    fn head_to_head(&self, team_a: u32, team_b: u32, last: u8) -> Result<Vec<H2hMeeting>> {
        let body = self
            .get(&format!("/fixtures/headtohead?h2h={team_a}-{team_b}&last={last}"))
            .context("head-to-head request failed")?;
        parse_head_to_head_json(&body)
    }

    fn team_injuries(&self, team_id: u32, season: i32, date: NaiveDate) -> Result<Vec<String>> {
        let body = self
            .get(&format!(
                "/injuries?team={team_id}&season={season}&date={}",
                date.format("%Y-%m-%d")
            ))
            .context("injuries request failed")?;
        parse_injuries_json(&body)
    }
}

/// Seasons start in August: dates before that belong to last year's season.
pub fn season_for(date: NaiveDate) -> i32 {
    if date.month() < 8 {
        date.year() - 1
    } else {
        date.year()
    }
}

/// Counts wins from the point of view of the *current* fixture, whatever
/// venue each past meeting was played at.
pub fn tally_head_to_head(meetings: &[H2hMeeting], home_id: u32, away_id: u32) -> HeadToHeadTally {
    let mut tally = HeadToHeadTally::default();
    for m in meetings {
        match m.winner_id {
            Some(id) if id == home_id => tally.home_wins += 1,
            Some(id) if id == away_id => tally.away_wins += 1,
            _ => tally.draws += 1,
        }
    }
    tally
}

pub fn parse_fixtures_json(raw: &str) -> Result<Vec<Fixture>> {
    let Some(root) = parse_root(raw)? else {
        return Ok(Vec::new());
    };
    let mut out = Vec::new();
    for item in response_items(&root) {
        let Some(id) = item.get("fixture").and_then(|f| f.get("id")).and_then(|v| v.as_u64())
        else {
            continue;
        };
        let kickoff = item
            .get("fixture")
            .and_then(|f| f.get("date"))
            .and_then(|v| v.as_str())
            .map(normalize_kickoff)
            .unwrap_or_default();
        let league = item.get("league").unwrap_or(&Value::Null);
        let Some(league_id) = pick_u32(league, &["id"]) else {
            continue;
        };
        let league_name = pick_string(league, &["name"]).unwrap_or_default();
        let (Some(home), Some(away)) = (
            parse_team_ref(item.get("teams").and_then(|t| t.get("home"))),
            parse_team_ref(item.get("teams").and_then(|t| t.get("away"))),
        ) else {
            continue;
        };
        out.push(Fixture {
            id,
            kickoff,
            league_id,
            league_name,
            home,
            away,
        });
    }
    Ok(out)
}

pub fn parse_team_stats_json(raw: &str) -> Result<Option<SeasonStats>> {
    let Some(root) = parse_root(raw)? else {
        return Ok(None);
    };
    let response = root.get("response").unwrap_or(&Value::Null);
    let has_stats = match response {
        Value::Object(map) => !map.is_empty(),
        _ => false,
    };
    if !has_stats {
        return Ok(None);
    }

    let goals = response.get("goals").unwrap_or(&Value::Null);
    let attack = average_goals(goals.get("for")).unwrap_or(0.0);
    let defence = average_goals(goals.get("against")).unwrap_or(1.0);
    let form_raw = response.get("form").and_then(|v| v.as_str()).unwrap_or("");
    let mut form: Vec<FormResult> = form_raw
        .trim()
        .chars()
        .map(FormResult::from_char)
        .collect();
    if form.len() > 4 {
        form.drain(..form.len() - 4);
    }

    Ok(Some(SeasonStats {
        attack,
        defence,
        form,
    }))
}

pub fn parse_head_to_head_json(raw: &str) -> Result<Vec<H2hMeeting>> {
    let Some(root) = parse_root(raw)? else {
        return Ok(Vec::new());
    };
    let mut out = Vec::new();
    for item in response_items(&root) {
        let fixture_id = item
            .get("fixture")
            .and_then(|f| f.get("id"))
            .and_then(|v| v.as_u64())
            .unwrap_or(0);
        let teams = item.get("teams").unwrap_or(&Value::Null);
        let home = teams.get("home").unwrap_or(&Value::Null);
        let away = teams.get("away").unwrap_or(&Value::Null);
        let (Some(home_id), Some(away_id)) = (pick_u32(home, &["id"]), pick_u32(away, &["id"]))
        else {
            continue;
        };
        let winner_id = if home.get("winner").and_then(|v| v.as_bool()) == Some(true) {
            Some(home_id)
        } else if away.get("winner").and_then(|v| v.as_bool()) == Some(true) {
            Some(away_id)
        } else {
            None
        };
        out.push(H2hMeeting {
            fixture_id,
            home_id,
            away_id,
            winner_id,
        });
    }
    Ok(out)
}

pub fn parse_injuries_json(raw: &str) -> Result<Vec<String>> {
    let Some(root) = parse_root(raw)? else {
        return Ok(Vec::new());
    };
    let mut out: Vec<String> = Vec::new();
    for item in response_items(&root) {
        let player = item.get("player").unwrap_or(&Value::Null);
        let Some(name) = pick_string(player, &["name"]) else {
            continue;
        };
        let label = match pick_string(player, &["reason", "type"]) {
            Some(reason) => format!("{name} ({reason})"),
            None => name,
        };
        if !out.contains(&label) {
            out.push(label);
        }
    }
    Ok(out)
}

fn parse_root(raw: &str) -> Result<Option<Value>> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed == "null" {
        return Ok(None);
    }
    let root: Value = serde_json::from_str(trimmed).context("invalid api json")?;
    if let Some(message) = api_error_message(root.get("errors")) {
        return Err(anyhow::anyhow!("api error: {message}"));
    }
    Ok(Some(root))
}

// The API reports failures in-band with a 200 status.
fn api_error_message(errors: Option<&Value>) -> Option<String> {
    match errors? {
        Value::Object(map) if !map.is_empty() => Some(
            map.iter()
                .map(|(k, v)| format!("{k}: {}", value_to_string(v)))
                .collect::<Vec<_>>()
                .join("; "),
        ),
        Value::Array(list) if !list.is_empty() => Some(
            list.iter()
                .map(value_to_string)
                .collect::<Vec<_>>()
                .join("; "),
        ),
        _ => None,
    }
}

fn response_items(root: &Value) -> &[Value] {
    root.get("response")
        .and_then(|v| v.as_array())
        .map(|v| v.as_slice())
        .unwrap_or(&[])
}

fn parse_team_ref(value: Option<&Value>) -> Option<TeamRef> {
    let value = value?;
    let id = pick_u32(value, &["id"])?;
    let name = pick_string(value, &["name"]).unwrap_or_default();
    Some(TeamRef::with_id(name, id))
}

fn average_goals(side: Option<&Value>) -> Option<f64> {
    let total = side?.get("average")?.get("total")?;
    parse_number(total)
}

fn parse_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}

fn normalize_kickoff(raw: &str) -> String {
    raw.trim().replace('T', " ").chars().take(16).collect()
}

fn pick_string(value: &Value, keys: &[&str]) -> Option<String> {
    for key in keys {
        if let Some(v) = value.get(*key) {
            match v {
                Value::String(s) if !s.trim().is_empty() => return Some(s.trim().to_string()),
                Value::Number(n) => return Some(n.to_string()),
                _ => {}
            }
        }
    }
    None
}

fn pick_u32(value: &Value, keys: &[&str]) -> Option<u32> {
    for key in keys {
        if let Some(v) = value.get(*key) {
            if let Some(num) = v.as_u64() {
                return u32::try_from(num).ok();
            }
            if let Some(s) = v.as_str()
                && let Ok(num) = s.trim().parse::<u32>()
            {
                return Some(num);
            }
        }
    }
    None
}

fn value_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.trim().to_string(),
        Value::Null => "-".to_string(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn season_rolls_over_in_august() {
        let d = |y, m, day| NaiveDate::from_ymd_opt(y, m, day).unwrap();
        assert_eq!(season_for(d(2024, 7, 31)), 2023);
        assert_eq!(season_for(d(2024, 8, 1)), 2024);
        assert_eq!(season_for(d(2025, 1, 15)), 2024);
    }

    #[test]
    fn tally_maps_winners_to_current_roles() {
        let meetings = vec![
            // Current away side won at its own ground.
            H2hMeeting { fixture_id: 1, home_id: 20, away_id: 10, winner_id: Some(20) },
            // Current home side won away from home.
            H2hMeeting { fixture_id: 2, home_id: 20, away_id: 10, winner_id: Some(10) },
            H2hMeeting { fixture_id: 3, home_id: 10, away_id: 20, winner_id: Some(10) },
            H2hMeeting { fixture_id: 4, home_id: 10, away_id: 20, winner_id: None },
        ];
        let tally = tally_head_to_head(&meetings, 10, 20);
        assert_eq!(tally.home_wins, 2);
        assert_eq!(tally.away_wins, 1);
        assert_eq!(tally.draws, 1);
    }

    #[test]
    fn stats_defaults_for_missing_averages() {
        let raw = r#"{"errors":[],"response":{"team":{"id":1},"form":"WWLDWL","goals":{"for":{"average":{"total":null}}}}}"#;
        let stats = parse_team_stats_json(raw).unwrap().unwrap();
        assert_eq!(stats.attack, 0.0);
        assert_eq!(stats.defence, 1.0);
        assert_eq!(stats.form.len(), 4);
        assert_eq!(stats.form[0], FormResult::Loss);
    }

    #[test]
    fn kickoff_truncates_on_char_boundaries() {
        assert_eq!(normalize_kickoff("2024-03-03T15:30:00+00:00"), "2024-03-03 15:30");
        assert_eq!(normalize_kickoff("2024-03-03 15:3é"), "2024-03-03 15:3é");
        assert_eq!(normalize_kickoff("2024-03-03 15:3éé"), "2024-03-03 15:3é");
    }

    #[test]
    fn in_band_errors_are_failures() {
        let raw = r#"{"errors":{"token":"Error/Missing application key"},"response":[]}"#;
        let err = parse_fixtures_json(raw).unwrap_err();
        assert!(err.to_string().contains("Missing application key"));
    }
}
