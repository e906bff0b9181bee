#![allow(dead_code)]

use std::sync::Arc;

use ipl_stats::engine::QueryEngine;
use ipl_stats::tables::{DeliveryRow, MatchResult, MatchRow, Tables, TossDecision};

pub const MI: &str = "Mumbai Indians";
pub const CSK: &str = "Chennai Super Kings";
pub const RCB: &str = "Royal Challengers Bangalore";
pub const KKR: &str = "Kolkata Knight Riders";

#[allow(clippy::too_many_arguments)]
pub fn match_row(
    match_id: i64,
    season: &str,
    city: Option<&str>,
    venue: &str,
    teams: (&str, &str),
    toss: (&str, TossDecision),
    winner: Option<&str>,
    result: MatchResult,
    result_margin: Option<f64>,
    target_runs: Option<f64>,
) -> MatchRow {
    MatchRow {
        match_id,
        season: season.to_string(),
        city: city.map(str::to_string),
        venue: venue.to_string(),
        team1: teams.0.to_string(),
        team2: teams.1.to_string(),
        toss_winner: toss.0.to_string(),
        toss_decision: toss.1,
        winner: winner.map(str::to_string),
        result,
        result_margin,
        target_runs,
    }
}

/// A legal delivery where the striker scores `runs` off the bat.
pub fn ball(
    match_id: i64,
    inning: u32,
    teams: (&str, &str),
    at: (u32, u32),
    pair: (&str, &str),
    bowler: &str,
    runs: u32,
) -> DeliveryRow {
    DeliveryRow {
        match_id,
        inning,
        batting_team: teams.0.to_string(),
        bowling_team: teams.1.to_string(),
        over: at.0,
        ball: at.1,
        batter: pair.0.to_string(),
        bowler: bowler.to_string(),
        non_striker: pair.1.to_string(),
        batsman_runs: runs,
        extra_runs: 0,
        total_runs: runs,
        is_wicket: false,
        player_dismissed: None,
        dismissal_kind: None,
    }
}

pub fn wide(mut d: DeliveryRow) -> DeliveryRow {
    d.extra_runs += 1;
    d.total_runs += 1;
    d
}

pub fn striker_out(mut d: DeliveryRow, kind: &str) -> DeliveryRow {
    d.is_wicket = true;
    d.player_dismissed = Some(d.batter.clone());
    d.dismissal_kind = Some(kind.to_string());
    d
}

#[rustfmt::skip]
pub fn fixture_matches() -> Vec<MatchRow> {
    use MatchResult::*;
    use TossDecision::*;
    vec![
        match_row(1, "2008", Some("Mumbai"), "Wankhede Stadium", (MI, CSK), (MI, Bat), Some(MI), Runs, Some(12.0), Some(150.0)),
        match_row(2, "2008", Some("Chennai"), "MA Chidambaram Stadium", (CSK, MI), (CSK, Field), Some(CSK), Wickets, Some(5.0), Some(140.0)),
        match_row(3, "2009", Some("Mumbai"), "Wankhede Stadium", (MI, RCB), (RCB, Field), Some(RCB), Wickets, Some(10.0), Some(120.0)),
        match_row(4, "2009", None, "Eden Gardens", (KKR, MI), (KKR, Bat), None, NoResult, None, None),
        match_row(5, "2010", Some("Bengaluru"), "M Chinnaswamy Stadium", (RCB, KKR), (KKR, Bat), Some(KKR), Runs, Some(145.0), Some(200.0)),
        match_row(6, "2010", Some("Kolkata"), "Eden Gardens", (KKR, CSK), (CSK, Field), Some(CSK), Tie, None, Some(160.0)),
    ]
}

/// Match 2 is listed first so that ordering by match id is observable.
///
/// Match 1, inning 1: twelve deliveries of one run, except the seventh which is a
/// run-less wicket. Match 1, inning 2 spans powerplay, middle and death overs.
pub fn fixture_deliveries() -> Vec<DeliveryRow> {
    let m1i1 = (MI, CSK);
    let m1i2 = (CSK, MI);
    let mut out = vec![
        ball(2, 1, (CSK, MI), (0, 1), ("ML Hayden", "SK Raina"), "SR Tendulkar", 4),
        ball(2, 1, (CSK, MI), (0, 2), ("ML Hayden", "SK Raina"), "SR Tendulkar", 1),
    ];

    for b in 1..=6 {
        out.push(ball(1, 1, m1i1, (0, b), ("RG Sharma", "SR Tendulkar"), "L Balaji", 1));
    }
    out.push(striker_out(
        ball(1, 1, m1i1, (1, 1), ("RG Sharma", "SR Tendulkar"), "M Muralitharan", 0),
        "caught",
    ));
    for b in 2..=6 {
        out.push(ball(1, 1, m1i1, (1, b), ("ST Jayasuriya", "SR Tendulkar"), "M Muralitharan", 1));
    }

    out.extend([
        ball(1, 2, m1i2, (0, 1), ("ML Hayden", "SK Raina"), "Z Khan", 4),
        ball(1, 2, m1i2, (0, 2), ("ML Hayden", "SK Raina"), "Z Khan", 6),
        striker_out(ball(1, 2, m1i2, (0, 3), ("ML Hayden", "SK Raina"), "Z Khan", 0), "bowled"),
        ball(1, 2, m1i2, (7, 1), ("SK Raina", "MS Dhoni"), "Harbhajan Singh", 1),
        wide(ball(1, 2, m1i2, (7, 2), ("SK Raina", "MS Dhoni"), "Harbhajan Singh", 0)),
        ball(1, 2, m1i2, (16, 1), ("MS Dhoni", "SK Raina"), "Harbhajan Singh", 4),
        striker_out(
            ball(1, 2, m1i2, (16, 2), ("MS Dhoni", "SK Raina"), "Harbhajan Singh", 0),
            "caught",
        ),
        ball(1, 2, m1i2, (16, 3), ("SK Raina", "RA Jadeja"), "Harbhajan Singh", 2),
    ]);
    out
}

pub fn fixture_tables() -> Tables {
    Tables::new(fixture_matches(), fixture_deliveries()).expect("fixture tables should validate")
}

pub fn engine() -> QueryEngine {
    QueryEngine::new(Arc::new(fixture_tables()))
}

pub fn empty_engine() -> QueryEngine {
    QueryEngine::new(Arc::new(Tables::default()))
}
