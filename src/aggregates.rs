use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use crate::stats::{percentage, round2};
use crate::tables::{MatchResult, MatchRow, TossDecision};

const RUN_MARGIN_BIN_WIDTH: u32 = 10;
const RUN_MARGIN_OPEN_BIN_START: u32 = 140;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TeamList {
    pub teams: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeasonCounts {
    pub seasons: BTreeMap<String, usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CityCounts {
    pub cities: BTreeMap<String, usize>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ResultShare {
    pub count: usize,
    pub percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResultDistribution {
    pub total_matches: usize,
    pub win_by_wickets: ResultShare,
    pub win_by_runs: ResultShare,
    pub tie: ResultShare,
    pub no_result: ResultShare,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MarginBin {
    pub label: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MarginDistribution {
    /// Fixed-width bins in ascending order; empty bins are reported with a zero count.
    pub win_by_runs: Vec<MarginBin>,
    pub win_by_wickets: BTreeMap<u32, usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TossDecisionOutcome {
    pub toss_decision: TossDecision,
    pub wins: usize,
    pub total_matches: usize,
    pub percentage: f64,
}

pub fn list_teams(matches: &[MatchRow]) -> TeamList {
    let teams: BTreeSet<&str> = matches
        .iter()
        .flat_map(|m| [m.team1.as_str(), m.team2.as_str()])
        .collect();
    TeamList {
        teams: teams.into_iter().map(str::to_string).collect(),
    }
}

pub fn matches_per_season(matches: &[MatchRow]) -> SeasonCounts {
    let mut seasons = BTreeMap::new();
    for m in matches {
        *seasons.entry(m.season.clone()).or_insert(0) += 1;
    }
    SeasonCounts { seasons }
}

pub fn matches_per_city(matches: &[MatchRow]) -> CityCounts {
    let mut cities = BTreeMap::new();
    for city in matches.iter().filter_map(|m| m.city.as_deref()) {
        *cities.entry(city.to_string()).or_insert(0) += 1;
    }
    CityCounts { cities }
}

/// Mean target per season. Seasons where no match recorded a target are left out.
pub fn avg_target_per_season(matches: &[MatchRow]) -> BTreeMap<String, f64> {
    let mut sums: BTreeMap<&str, (f64, usize)> = BTreeMap::new();
    for m in matches {
        let Some(target) = m.target_runs else {
            continue;
        };
        let entry = sums.entry(m.season.as_str()).or_insert((0.0, 0));
        entry.0 += target;
        entry.1 += 1;
    }
    sums.into_iter()
        .map(|(season, (sum, n))| (season.to_string(), round2(sum / n as f64)))
        .collect()
}

pub fn match_result_distribution(matches: &[MatchRow]) -> ResultDistribution {
    let total = matches.len();
    let share = |result: MatchResult| {
        let count = matches.iter().filter(|m| m.result == result).count();
        ResultShare {
            count,
            percentage: percentage(count, total),
        }
    };
    ResultDistribution {
        total_matches: total,
        win_by_wickets: share(MatchResult::Wickets),
        win_by_runs: share(MatchResult::Runs),
        tie: share(MatchResult::Tie),
        no_result: share(MatchResult::NoResult),
    }
}

pub fn result_margin_distribution(matches: &[MatchRow]) -> MarginDistribution {
    let bin_count = (RUN_MARGIN_OPEN_BIN_START / RUN_MARGIN_BIN_WIDTH) as usize + 1;
    let mut run_counts = vec![0usize; bin_count];
    let mut win_by_wickets = BTreeMap::new();

    for m in matches {
        let Some(margin) = m.result_margin else {
            continue;
        };
        let margin = margin.trunc() as u32;
        match m.result {
            MatchResult::Runs => {
                let idx = (margin / RUN_MARGIN_BIN_WIDTH) as usize;
                run_counts[idx.min(bin_count - 1)] += 1;
            }
            MatchResult::Wickets => {
                *win_by_wickets.entry(margin).or_insert(0) += 1;
            }
            MatchResult::Tie | MatchResult::NoResult => {}
        }
    }

    let win_by_runs = run_counts
        .into_iter()
        .enumerate()
        .map(|(idx, count)| MarginBin {
            label: run_margin_label(idx as u32),
            count,
        })
        .collect();

    MarginDistribution {
        win_by_runs,
        win_by_wickets,
    }
}

fn run_margin_label(bin: u32) -> String {
    let lo = bin * RUN_MARGIN_BIN_WIDTH;
    if lo >= RUN_MARGIN_OPEN_BIN_START {
        format!("{lo}+")
    } else {
        format!("{lo}-{}", lo + RUN_MARGIN_BIN_WIDTH - 1)
    }
}

/// Win rate per toss decision for teams that won the toss and then the match.
/// Decisions that never produced such a win are not reported.
pub fn toss_decision_outcomes(matches: &[MatchRow]) -> Vec<TossDecisionOutcome> {
    let mut totals: BTreeMap<TossDecision, usize> = BTreeMap::new();
    let mut wins: BTreeMap<TossDecision, usize> = BTreeMap::new();
    for m in matches {
        *totals.entry(m.toss_decision).or_insert(0) += 1;
        if m.won_by(&m.toss_winner) {
            *wins.entry(m.toss_decision).or_insert(0) += 1;
        }
    }

    wins.into_iter()
        .map(|(decision, wins)| {
            let total_matches = totals.get(&decision).copied().unwrap_or(0);
            TossDecisionOutcome {
                toss_decision: decision,
                wins,
                total_matches,
                percentage: percentage(wins, total_matches),
            }
        })
        .collect()
}
