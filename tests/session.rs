use std::collections::HashMap;
use std::path::Path;

use anyhow::{Result, anyhow};
use chrono::NaiveDate;

use bet_analyser::catalog::StaticCatalog;
use bet_analyser::error::AnalysisError;
use bet_analyser::persist::{HistoryLedger, load};
use bet_analyser::session::{DataSource, Listing, Session, parse_category};
use bet_analyser::state::{
    BetCategory, Fixture, FormResult, MatchSelection, Side, StrengthBasis, TeamRef,
};
use bet_analyser::stats_fetch::{H2hMeeting, SeasonStats, StatsProvider};

const HOME_ID: u32 = 50;
const AWAY_ID: u32 = 33;
const LEAGUE_ID: u32 = 39;

#[derive(Default)]
struct FakeProvider {
    stats: HashMap<u32, SeasonStats>,
    meetings: Vec<H2hMeeting>,
    injuries: HashMap<u32, Vec<String>>,
    fail_h2h: bool,
}

impl StatsProvider for FakeProvider {
    fn fixtures_by_date(&self, _date: NaiveDate) -> Result<Vec<Fixture>> {
        Ok(vec![Fixture {
            id: 1035037,
            kickoff: "2024-03-03 15:30".to_string(),
            league_id: LEAGUE_ID,
            league_name: "Premier League".to_string(),
            home: TeamRef::with_id("Manchester City", HOME_ID),
            away: TeamRef::with_id("Manchester United", AWAY_ID),
        }])
    }

    fn team_season_stats(
        &self,
        league_id: u32,
        season: i32,
        team_id: u32,
    ) -> Result<Option<SeasonStats>> {
        assert_eq!(league_id, LEAGUE_ID);
        assert_eq!(season, 2023);
        Ok(self.stats.get(&team_id).cloned())
    }

    fn head_to_head(&self, team_a: u32, team_b: u32, last: u8) -> Result<Vec<H2hMeeting>> {
        assert_eq!((team_a, team_b, last), (HOME_ID, AWAY_ID, 10));
        if self.fail_h2h {
            return Err(anyhow!("connection reset"));
        }
        Ok(self.meetings.clone())
    }

    fn team_injuries(&self, team_id: u32, _season: i32, _date: NaiveDate) -> Result<Vec<String>> {
        match self.injuries.get(&team_id) {
            Some(list) => Ok(list.clone()),
            None => Err(anyhow!("injuries endpoint down")),
        }
    }
}

fn catalog_session(path: &Path) -> Session {
    let ledger = HistoryLedger::open(path).unwrap();
    Session::new(DataSource::Catalog(StaticCatalog::builtin()), ledger)
}

fn live_session(path: &Path, provider: FakeProvider) -> Session {
    let ledger = HistoryLedger::open(path).unwrap();
    let source = DataSource::Live {
        provider: Box::new(provider),
        h2h_last: 10,
    };
    Session::new(source, ledger).with_today(NaiveDate::from_ymd_opt(2024, 3, 3).unwrap())
}

fn derby() -> MatchSelection {
    MatchSelection::new(
        "Premier League",
        TeamRef::named("Manchester City"),
        TeamRef::named("Manchester United"),
    )
}

fn live_derby() -> MatchSelection {
    MatchSelection {
        league: "Premier League".to_string(),
        league_id: Some(LEAGUE_ID),
        home: TeamRef::with_id("Manchester City", HOME_ID),
        away: TeamRef::with_id("Manchester United", AWAY_ID),
    }
}

fn meeting(home_id: u32, away_id: u32, winner_id: Option<u32>) -> H2hMeeting {
    H2hMeeting {
        fixture_id: 0,
        home_id,
        away_id,
        winner_id,
    }
}

#[test]
fn catalog_estimate_is_recorded() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("history.json");
    let mut session = catalog_session(&path);

    session.select_match(derby()).unwrap();
    let estimate = session.estimate(BetCategory::HomeWin).unwrap();
    assert_eq!(estimate.display(), "43.4%");
    assert_eq!(estimate.percent, 43.4);

    let history = load(&path).unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].match_label, "Manchester City vs Manchester United");
    assert_eq!(history[0].bet, "3-Way Result (Home Win)");
    assert_eq!(history[0].league.as_deref(), Some("Premier League"));
    assert_eq!(history[0].prediction, 43.4);
    assert!(history[0].is_pending());
}

#[test]
fn outcome_amends_newest_first_index() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("history.json");
    let mut session = catalog_session(&path);
    session.select_match(derby()).unwrap();
    session.estimate(BetCategory::HomeWin).unwrap();
    session.estimate(BetCategory::BttsYes).unwrap();

    let updated = session.record_outcome(0, "  Yes ").unwrap();
    assert_eq!(updated.bet, "Both Teams to Score (Yes)");
    assert_eq!(updated.actual_result, "Yes");
    assert!(session.history()[1].is_pending());

    let err = session.record_outcome(0, "e.g., Home Win").unwrap_err();
    assert!(matches!(err, AnalysisError::InputIncomplete(_)));
    let err = session.record_outcome(5, "Draw").unwrap_err();
    assert!(matches!(err, AnalysisError::RecordNotFound { index: 5, len: 2 }));
}

#[test]
fn validation_errors_do_not_touch_history() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("history.json");
    let mut session = catalog_session(&path);

    let err = session.estimate(BetCategory::Draw).unwrap_err();
    assert!(matches!(err, AnalysisError::InputIncomplete(_)));

    let mut incomplete = derby();
    incomplete.away = TeamRef::named("  ");
    let err = session.select_match(incomplete).unwrap_err();
    assert!(err.is_validation());

    let same = MatchSelection::new(
        "La Liga",
        TeamRef::named("Real Madrid"),
        TeamRef::named("Real Madrid"),
    );
    let err = session.select_match(same).unwrap_err();
    assert!(matches!(err, AnalysisError::SameTeamSelected(_)));

    let no_data = MatchSelection::new(
        "Premier League",
        TeamRef::named("Arsenal"),
        TeamRef::named("Chelsea"),
    );
    let err = session.select_match(no_data).unwrap_err();
    assert!(matches!(err, AnalysisError::IndicatorUnavailable(_)));
    assert!(session.selected().is_none());

    assert!(parse_category(None).is_err());
    assert!(parse_category(Some(" ")).is_err());
    assert_eq!(parse_category(Some("draw")).unwrap(), BetCategory::Draw);

    assert!(session.history().is_empty());
    assert!(!path.exists());
}

#[test]
fn catalog_listing_and_reports() {
    let dir = tempfile::tempdir().unwrap();
    let mut session = catalog_session(&dir.path().join("history.json"));
    let Listing::Leagues(leagues) = session.listing(None).unwrap() else {
        panic!("catalog should list leagues");
    };
    assert_eq!(leagues.len(), 8);
    assert!(session.teams("AFCON").is_empty());
    assert_eq!(session.teams("La Liga").len(), 6);

    session.select_match(derby()).unwrap();
    let home = session.team_report(Side::Home).unwrap();
    assert!(home.contains("Recent Form: W W W D"));
    assert!(home.contains("Ederson (Injury), Kevin De Bruyne (Suspended)"));
}

#[test]
fn live_uses_season_stats_when_both_present() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("history.json");
    let mut provider = FakeProvider::default();
    provider.stats.insert(
        HOME_ID,
        SeasonStats {
            attack: 1.2,
            defence: 0.9,
            form: vec![FormResult::Win, FormResult::Win],
        },
    );
    provider.stats.insert(
        AWAY_ID,
        SeasonStats {
            attack: 1.0,
            defence: 1.3,
            form: vec![FormResult::Loss],
        },
    );
    provider.injuries.insert(HOME_ID, vec!["Rodri (Knee Injury)".to_string()]);
    let mut session = live_session(&path, provider);

    let selected = session.select_match(live_derby()).unwrap();
    assert!(matches!(selected.basis, StrengthBasis::Indicators { .. }));

    // One absentee at 0.05, no form weighting; the away injuries call fails
    // and counts as nobody missing.
    let s = session.adjusted_strength().unwrap();
    assert!((s.home_attack - 1.2 * 0.95).abs() < 1e-9);
    assert!((s.away_attack - 1.0).abs() < 1e-9);

    let btts = session.estimate(BetCategory::BttsYes).unwrap();
    assert!((btts.probability - (1.14 / 1.8) * (1.0 / 1.8)).abs() < 1e-9);

    let err = session.estimate(BetCategory::OverGoals).unwrap_err();
    assert!(matches!(err, AnalysisError::UnsupportedCategory { .. }));
    assert_eq!(session.history().len(), 1);
}

#[test]
fn live_falls_back_to_head_to_head() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("history.json");
    let mut provider = FakeProvider::default();
    provider.stats.insert(
        HOME_ID,
        SeasonStats {
            attack: 2.4,
            defence: 0.9,
            form: Vec::new(),
        },
    );
    provider.meetings = vec![
        meeting(AWAY_ID, HOME_ID, Some(HOME_ID)),
        meeting(HOME_ID, AWAY_ID, Some(HOME_ID)),
        meeting(HOME_ID, AWAY_ID, Some(AWAY_ID)),
        meeting(AWAY_ID, HOME_ID, None),
    ];
    let mut session = live_session(&path, provider);

    session.select_match(live_derby()).unwrap();
    let s = session.adjusted_strength().unwrap();
    assert!((s.home_attack - 1.5).abs() < 1e-9);
    assert!((s.away_attack - 1.25).abs() < 1e-9);
    assert!((s.home_defence - 1.25).abs() < 1e-9);
    assert!((s.away_defence - 1.5).abs() < 1e-9);
    let report = session.team_report(Side::Home).unwrap();
    assert!(report.contains("2W 1D 1L"));

    let first = session.estimate(BetCategory::FirstToScoreHome).unwrap();
    assert!((first.probability - 1.5 / 2.75).abs() < 1e-9);
}

#[test]
fn no_head_to_head_history_fails_without_recording() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("history.json");
    let mut session = live_session(&path, FakeProvider::default());

    let err = session.select_match(live_derby()).unwrap_err();
    assert!(matches!(err, AnalysisError::NoHistoryData { .. }));
    let err = session.estimate(BetCategory::HomeWin).unwrap_err();
    assert!(matches!(err, AnalysisError::InputIncomplete(_)));
    assert!(session.history().is_empty());
    assert!(load(&path).unwrap().is_empty());
}

#[test]
fn live_transport_failure_is_unavailable() {
    let dir = tempfile::tempdir().unwrap();
    let provider = FakeProvider {
        fail_h2h: true,
        ..FakeProvider::default()
    };
    let mut session = live_session(&dir.path().join("history.json"), provider);
    let err = session.select_match(live_derby()).unwrap_err();
    let AnalysisError::IndicatorUnavailable(msg) = err else {
        panic!("expected IndicatorUnavailable");
    };
    assert!(msg.contains("connection reset"));

    let mut no_ids = live_derby();
    no_ids.away.id = None;
    let err = session.select_match(no_ids).unwrap_err();
    assert!(matches!(err, AnalysisError::InputIncomplete(_)));
}

#[test]
fn live_listing_returns_fixtures() {
    let dir = tempfile::tempdir().unwrap();
    let session = live_session(&dir.path().join("history.json"), FakeProvider::default());
    let Listing::Fixtures(fixtures) = session.listing(None).unwrap() else {
        panic!("live source should list fixtures");
    };
    assert_eq!(fixtures.len(), 1);
    assert_eq!(fixtures[0].selection(), live_derby());
}

#[test]
fn live_zero_defence_favours_the_unbounded_side() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("history.json");
    let mut provider = FakeProvider::default();
    provider.stats.insert(
        HOME_ID,
        SeasonStats {
            attack: 1.5,
            defence: 1.1,
            form: Vec::new(),
        },
    );
    // A clean-sheet season: goals-against average "0.0".
    provider.stats.insert(
        AWAY_ID,
        SeasonStats {
            attack: 1.2,
            defence: 0.0,
            form: Vec::new(),
        },
    );
    let mut session = live_session(&path, provider);
    session.select_match(live_derby()).unwrap();

    let home = session.estimate(BetCategory::HomeWin).unwrap();
    assert_eq!(home.display(), "85.0%");
    let away = session.estimate(BetCategory::AwayWin).unwrap();
    assert_eq!(away.percent, 0.0);
    assert_eq!(load(&path).unwrap()[1].prediction, 85.0);
}
