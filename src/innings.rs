use std::collections::{BTreeMap, HashMap};

use serde::Serialize;

use crate::error::{QueryError, QueryResult};
use crate::phase::Phase;
use crate::stats::{count_wickets, percentage, run_rate, sum_total_runs, top_by_total};
use crate::tables::DeliveryRow;

/// Per-match response wrapper shared by all innings analyses.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchInnings<T> {
    pub match_id: i64,
    pub innings: Vec<T>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InningsHeader {
    pub inning: u32,
    pub batting_team: String,
    pub total_runs: u32,
    pub wickets: usize,
    pub run_rate: f64,
}

impl InningsHeader {
    pub(crate) fn from_balls(inning: u32, balls: &[&DeliveryRow]) -> Self {
        let total_runs = sum_total_runs(balls);
        Self {
            inning,
            batting_team: balls
                .first()
                .map(|d| d.batting_team.clone())
                .unwrap_or_default(),
            total_runs,
            wickets: count_wickets(balls),
            run_rate: run_rate(total_runs, balls),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PhaseLine {
    pub runs: u32,
    pub wickets: usize,
    pub run_rate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PhaseBreakdown {
    pub powerplay: PhaseLine,
    pub middle: PhaseLine,
    pub death: PhaseLine,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PhaseInnings {
    #[serde(flatten)]
    pub header: InningsHeader,
    pub phase_stats: PhaseBreakdown,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TopBatsman {
    pub name: String,
    pub runs: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TopBowler {
    pub name: String,
    pub wickets: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TopPerformersInnings {
    #[serde(flatten)]
    pub header: InningsHeader,
    pub top_batsman: Option<TopBatsman>,
    pub top_bowler: Option<TopBowler>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoundarySummary {
    pub fours: usize,
    pub sixes: usize,
    pub boundary_runs: u32,
    pub boundary_percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoundaryInnings {
    #[serde(flatten)]
    pub header: InningsHeader,
    pub boundaries: BoundarySummary,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FallOfWicket {
    pub wicket_number: usize,
    pub over: u32,
    pub ball: u32,
    pub player_dismissed: Option<String>,
    /// Team total up to and including the wicket delivery.
    pub total_runs: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FallOfWicketsInnings {
    #[serde(flatten)]
    pub header: InningsHeader,
    pub fall_of_wickets: Vec<FallOfWicket>,
}

/// Deliveries of one match grouped by inning, ascending, each group in delivery order.
pub(crate) fn split_innings(
    deliveries: &[DeliveryRow],
    match_id: i64,
) -> QueryResult<BTreeMap<u32, Vec<&DeliveryRow>>> {
    let mut innings: BTreeMap<u32, Vec<&DeliveryRow>> = BTreeMap::new();
    for d in deliveries.iter().filter(|d| d.match_id == match_id) {
        innings.entry(d.inning).or_default().push(d);
    }
    if innings.is_empty() {
        return Err(QueryError::not_found("Match ID not found"));
    }
    Ok(innings)
}

pub fn innings_phases(
    deliveries: &[DeliveryRow],
    match_id: i64,
) -> QueryResult<MatchInnings<PhaseInnings>> {
    let innings = split_innings(deliveries, match_id)?
        .into_iter()
        .map(|(inning, balls)| {
            let line = |phase: Phase| {
                let slice: Vec<&DeliveryRow> = balls
                    .iter()
                    .copied()
                    .filter(|d| phase.contains(d.over))
                    .collect();
                let runs = sum_total_runs(&slice);
                PhaseLine {
                    runs,
                    wickets: count_wickets(&slice),
                    run_rate: run_rate(runs, &slice),
                }
            };
            PhaseInnings {
                header: InningsHeader::from_balls(inning, &balls),
                phase_stats: PhaseBreakdown {
                    powerplay: line(Phase::Powerplay),
                    middle: line(Phase::Middle),
                    death: line(Phase::Death),
                },
            }
        })
        .collect();
    Ok(MatchInnings { match_id, innings })
}

pub fn innings_top_performers(
    deliveries: &[DeliveryRow],
    match_id: i64,
) -> QueryResult<MatchInnings<TopPerformersInnings>> {
    let innings = split_innings(deliveries, match_id)?
        .into_iter()
        .map(|(inning, balls)| {
            let mut batter_runs: HashMap<&str, u32> = HashMap::new();
            let mut bowler_wickets: HashMap<&str, u32> = HashMap::new();
            for d in &balls {
                *batter_runs.entry(d.batter.as_str()).or_insert(0) += d.batsman_runs;
                *bowler_wickets.entry(d.bowler.as_str()).or_insert(0) += u32::from(d.is_wicket);
            }
            TopPerformersInnings {
                header: InningsHeader::from_balls(inning, &balls),
                top_batsman: top_by_total(&batter_runs)
                    .map(|(name, runs)| TopBatsman { name, runs }),
                top_bowler: top_by_total(&bowler_wickets)
                    .map(|(name, wickets)| TopBowler { name, wickets }),
            }
        })
        .collect();
    Ok(MatchInnings { match_id, innings })
}

pub fn innings_boundaries(
    deliveries: &[DeliveryRow],
    match_id: i64,
) -> QueryResult<MatchInnings<BoundaryInnings>> {
    let innings = split_innings(deliveries, match_id)?
        .into_iter()
        .map(|(inning, balls)| {
            let header = InningsHeader::from_balls(inning, &balls);
            let fours = balls.iter().filter(|d| d.is_four()).count();
            let sixes = balls.iter().filter(|d| d.is_six()).count();
            let boundary_runs = (fours * 4 + sixes * 6) as u32;
            let boundary_percentage =
                percentage(boundary_runs as usize, header.total_runs as usize);
            BoundaryInnings {
                header,
                boundaries: BoundarySummary {
                    fours,
                    sixes,
                    boundary_runs,
                    boundary_percentage,
                },
            }
        })
        .collect();
    Ok(MatchInnings { match_id, innings })
}

pub fn innings_fall_of_wickets(
    deliveries: &[DeliveryRow],
    match_id: i64,
) -> QueryResult<MatchInnings<FallOfWicketsInnings>> {
    let innings = split_innings(deliveries, match_id)?
        .into_iter()
        .map(|(inning, balls)| {
            let mut running = 0u32;
            let mut fall_of_wickets = Vec::new();
            for d in &balls {
                running += d.total_runs;
                if d.is_wicket {
                    fall_of_wickets.push(FallOfWicket {
                        wicket_number: fall_of_wickets.len() + 1,
                        over: d.over,
                        ball: d.ball,
                        player_dismissed: d.player_dismissed.clone(),
                        total_runs: running,
                    });
                }
            }
            FallOfWicketsInnings {
                header: InningsHeader::from_balls(inning, &balls),
                fall_of_wickets,
            }
        })
        .collect();
    Ok(MatchInnings { match_id, innings })
}
