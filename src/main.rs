use anyhow::{Context, Result, anyhow};
use chrono::NaiveDate;
use env_logger::Env;
use log::debug;

use bet_analyser::config::AppConfig;
use bet_analyser::error::AnalysisError;
use bet_analyser::session::{Listing, Session, parse_category};
use bet_analyser::state::{BetCategory, MatchSelection, Side, SourceMode, TeamRef};

const USAGE: &str = "usage: bet_analyser <command>

commands:
  leagues                                   list leagues (catalog) or today's fixtures (live)
  teams <league>                            list a league's teams
  fixtures [--date=YYYY-MM-DD]              list fixtures (live)
  analyse --league=L --home=H --away=A --bet=B
  analyse --fixture=ID [--date=YYYY-MM-DD] --bet=B   (live)
  bets                                      list bet types
  history                                   show recorded predictions, newest first
  outcome <index> <text>                    record the actual result of a prediction";

fn main() -> Result<()> {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let args = std::env::args().skip(1).collect::<Vec<_>>();
    let Some(command) = args.first() else {
        println!("{USAGE}");
        return Ok(());
    };

    let cfg = AppConfig::from_env();
    debug!("config: {cfg:?}");
    if command == "bets" {
        for category in BetCategory::ALL {
            println!("{:<12} {}", category.key(), category.label());
        }
        return Ok(());
    }
    if command == "help" || command == "--help" || command == "-h" {
        println!("{USAGE}");
        return Ok(());
    }

    let mut session = Session::from_config(&cfg)?;
    let rest = &args[1..];
    match command.as_str() {
        "leagues" | "fixtures" => print_listing(&session, parse_date_arg(rest)?),
        "teams" => {
            let league = rest.join(" ");
            let teams = session.teams(&league);
            if teams.is_empty() {
                println!("No teams listed for {league:?}");
            }
            for team in teams {
                println!("{team}");
            }
            Ok(())
        }
        "analyse" | "analyze" => run_analysis(&mut session, rest),
        "history" => {
            print_history(&session);
            Ok(())
        }
        "outcome" => {
            let index = rest
                .first()
                .and_then(|s| s.parse::<usize>().ok())
                .context("outcome needs a record index")?;
            let text = rest[1..].join(" ");
            let record = session.record_outcome(index, &text)?;
            println!(
                "Updated {} / {}: {}",
                record.match_label, record.bet, record.actual_result
            );
            Ok(())
        }
        other => Err(anyhow!("unknown command {other:?}\n\n{USAGE}")),
    }
}

fn run_analysis(session: &mut Session, args: &[String]) -> Result<()> {
    let category = parse_category(flag_value(args, "--bet").as_deref())?;
    let selection = match session.mode() {
        SourceMode::StaticCatalog => MatchSelection::new(
            flag_value(args, "--league").unwrap_or_default(),
            TeamRef::named(flag_value(args, "--home").unwrap_or_default()),
            TeamRef::named(flag_value(args, "--away").unwrap_or_default()),
        ),
        SourceMode::LiveStats => live_selection(session, args)?,
    };

    session.select_match(selection)?;
    for side in [Side::Home, Side::Away] {
        if let Some(report) = session.team_report(side) {
            println!("{report}");
        }
    }
    let estimate = session.estimate(category)?;
    println!("{}: {}", category.label(), estimate.display());
    Ok(())
}

fn live_selection(session: &Session, args: &[String]) -> Result<MatchSelection> {
    let fixture_id = flag_value(args, "--fixture")
        .and_then(|s| s.parse::<u64>().ok())
        .ok_or_else(|| AnalysisError::InputIncomplete("choose a fixture with --fixture".into()))?;
    let Listing::Fixtures(fixtures) = session.listing(parse_date_arg(args)?)? else {
        return Err(anyhow!("live listing returned no fixtures"));
    };
    let fixture = fixtures
        .iter()
        .find(|f| f.id == fixture_id)
        .ok_or_else(|| {
            AnalysisError::IndicatorUnavailable(format!("fixture {fixture_id} not found"))
        })?;
    Ok(fixture.selection())
}

fn print_listing(session: &Session, date: Option<NaiveDate>) -> Result<()> {
    match session.listing(date)? {
        Listing::Leagues(leagues) => {
            for league in leagues {
                println!("{} ({} teams)", league.name, league.teams.len());
            }
        }
        Listing::Fixtures(fixtures) => {
            if fixtures.is_empty() {
                println!("No fixtures found.");
            }
            for f in fixtures {
                println!(
                    "{:>9}  {}  {} vs {}  [{}]",
                    f.id, f.kickoff, f.home.name, f.away.name, f.league_name
                );
            }
        }
    }
    Ok(())
}

fn print_history(session: &Session) {
    let records = session.history();
    if records.is_empty() {
        println!("No predictions recorded yet.");
        return;
    }
    println!(
        "{:>3}  {:<16}  {:<36}  {:<28}  {:>6}  {}",
        "#", "Date", "Match", "Bet", "Pred%", "Actual Result"
    );
    for (idx, r) in records.iter().enumerate() {
        println!(
            "{:>3}  {:<16}  {:<36}  {:<28}  {:>6.1}  {}",
            idx, r.date, r.match_label, r.bet, r.prediction, r.actual_result
        );
    }
}

fn parse_date_arg(args: &[String]) -> Result<Option<NaiveDate>> {
    let Some(raw) = flag_value(args, "--date") else {
        return Ok(None);
    };
    let date = NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .with_context(|| format!("invalid --date {raw:?}, expected YYYY-MM-DD"))?;
    Ok(Some(date))
}

fn flag_value(args: &[String], flag: &str) -> Option<String> {
    for (idx, arg) in args.iter().enumerate() {
        if let Some(value) = arg.strip_prefix(flag).and_then(|s| s.strip_prefix('=')) {
            let trimmed = value.trim();
            if !trimmed.is_empty() {
                return Some(trimmed.to_string());
            }
        }
        if arg == flag
            && let Some(next) = args.get(idx + 1)
            && !next.trim().is_empty()
        {
            return Some(next.trim().to_string());
        }
    }
    None
}
