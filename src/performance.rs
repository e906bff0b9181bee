use std::collections::BTreeMap;

use serde::Serialize;

use crate::error::{QueryError, QueryResult};
use crate::phase::{Phase, Role};
use crate::stats::{dismissal_histogram, economy_rate, percentage, round2, strike_rate};
use crate::tables::{DeliveryRow, MatchRow};

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BattingLine {
    pub total_runs: u32,
    pub balls_faced: usize,
    pub strike_rate: f64,
    pub boundaries: usize,
    pub fours: usize,
    pub sixes: usize,
}

impl BattingLine {
    fn from_balls<'a>(balls: impl IntoIterator<Item = &'a DeliveryRow>) -> Self {
        let mut line = BattingLine::default();
        for d in balls {
            line.total_runs += d.batsman_runs;
            line.balls_faced += 1;
            if d.is_four() {
                line.fours += 1;
            }
            if d.is_six() {
                line.sixes += 1;
            }
        }
        line.boundaries = line.fours + line.sixes;
        line.strike_rate = strike_rate(line.total_runs, line.balls_faced);
        line
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BowlingLine {
    pub total_wickets: usize,
    pub runs_conceded: u32,
    pub extras_conceded: u32,
    pub balls_bowled: usize,
    pub economy_rate: f64,
}

impl BowlingLine {
    fn from_balls<'a>(balls: impl IntoIterator<Item = &'a DeliveryRow>) -> Self {
        let mut line = BowlingLine::default();
        for d in balls {
            if d.is_wicket {
                line.total_wickets += 1;
            }
            line.runs_conceded += d.total_runs;
            line.extras_conceded += d.extra_runs;
            line.balls_bowled += 1;
        }
        line.economy_rate = economy_rate(line.runs_conceded, line.balls_bowled);
        line
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlayerPerformance {
    pub player: String,
    pub batting: BattingLine,
    pub bowling: BowlingLine,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlayerVsTeam {
    pub player: String,
    pub against_team: String,
    pub batting: BattingLine,
    pub bowling: BowlingLine,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatsmanVsBowler {
    pub batsman: String,
    pub bowler: String,
    pub total_runs: u32,
    pub total_balls: usize,
    pub dismissals: usize,
    pub strike_rate: f64,
    /// `None` while the bowler has never dismissed the batsman.
    pub average: Option<f64>,
    pub dismissal_types: BTreeMap<String, usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DismissalAnalysis {
    pub player: String,
    pub total_dismissals: usize,
    pub dismissal_types: BTreeMap<String, usize>,
    pub dismissed_by: BTreeMap<String, usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PhasePerformance {
    pub player: String,
    pub phase: Phase,
    pub total_runs: u32,
    pub total_balls: usize,
    pub boundaries: usize,
    pub strike_rate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "role", rename_all = "lowercase")]
pub enum TeamPhaseStats {
    Batting {
        team: String,
        phase: Phase,
        total_runs: u32,
        total_balls: usize,
        boundaries: usize,
        strike_rate: f64,
        wickets_lost: usize,
    },
    Bowling {
        team: String,
        phase: Phase,
        total_runs_conceded: u32,
        total_balls: usize,
        wickets_taken: usize,
        economy_rate: f64,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HomeAwayRecord {
    pub team: String,
    pub home_venue: String,
    pub home_matches: usize,
    pub home_wins: usize,
    pub home_win_percentage: f64,
    pub away_matches: usize,
    pub away_wins: usize,
    pub away_win_percentage: f64,
}

pub fn player_performance(
    deliveries: &[DeliveryRow],
    player: &str,
) -> QueryResult<PlayerPerformance> {
    if !deliveries
        .iter()
        .any(|d| d.batter == player || d.bowler == player)
    {
        return Err(QueryError::not_found("Player not found or no data available"));
    }

    Ok(PlayerPerformance {
        player: player.to_string(),
        batting: BattingLine::from_balls(deliveries.iter().filter(|d| d.batter == player)),
        bowling: BowlingLine::from_balls(deliveries.iter().filter(|d| d.bowler == player)),
    })
}

pub fn player_vs_team(
    deliveries: &[DeliveryRow],
    player: &str,
    team: &str,
) -> QueryResult<PlayerVsTeam> {
    let batting: Vec<&DeliveryRow> = deliveries
        .iter()
        .filter(|d| d.batter == player && d.bowling_team == team)
        .collect();
    let bowling: Vec<&DeliveryRow> = deliveries
        .iter()
        .filter(|d| d.bowler == player && d.batting_team == team)
        .collect();
    if batting.is_empty() && bowling.is_empty() {
        return Err(QueryError::not_found(
            "No data available for this player against the specified team",
        ));
    }

    Ok(PlayerVsTeam {
        player: player.to_string(),
        against_team: team.to_string(),
        batting: BattingLine::from_balls(batting),
        bowling: BowlingLine::from_balls(bowling),
    })
}

pub fn batsman_vs_bowler(
    deliveries: &[DeliveryRow],
    batsman: &str,
    bowler: &str,
) -> QueryResult<BatsmanVsBowler> {
    let faced: Vec<&DeliveryRow> = deliveries
        .iter()
        .filter(|d| d.batter == batsman && d.bowler == bowler)
        .collect();
    if faced.is_empty() {
        return Err(QueryError::not_found("No data found for this combination"));
    }

    let total_runs: u32 = faced.iter().map(|d| d.batsman_runs).sum();
    let total_balls = faced.len();
    let dismissals = faced.iter().filter(|d| d.is_wicket).count();
    let average = (dismissals > 0).then(|| round2(total_runs as f64 / dismissals as f64));

    Ok(BatsmanVsBowler {
        batsman: batsman.to_string(),
        bowler: bowler.to_string(),
        total_runs,
        total_balls,
        dismissals,
        strike_rate: strike_rate(total_runs, total_balls),
        average,
        dismissal_types: dismissal_histogram(faced.iter().copied()),
    })
}

pub fn player_dismissal_analysis(
    deliveries: &[DeliveryRow],
    player: &str,
) -> QueryResult<DismissalAnalysis> {
    let dismissals: Vec<&DeliveryRow> = deliveries
        .iter()
        .filter(|d| d.is_wicket && d.player_dismissed.as_deref() == Some(player))
        .collect();
    if dismissals.is_empty() {
        return Err(QueryError::not_found("No dismissals found for this player"));
    }

    let mut dismissed_by = BTreeMap::new();
    for d in dismissals.iter().filter(|d| d.credits_bowler()) {
        *dismissed_by.entry(d.bowler.clone()).or_insert(0) += 1;
    }

    Ok(DismissalAnalysis {
        player: player.to_string(),
        total_dismissals: dismissals.len(),
        dismissal_types: dismissal_histogram(dismissals.iter().copied()),
        dismissed_by,
    })
}

pub fn player_performance_by_phase(
    deliveries: &[DeliveryRow],
    player: &str,
    phase: &str,
) -> QueryResult<PhasePerformance> {
    let phase: Phase = phase.parse()?;
    let line = BattingLine::from_balls(
        deliveries
            .iter()
            .filter(|d| d.batter == player && phase.contains(d.over)),
    );
    if line.balls_faced == 0 {
        return Err(QueryError::not_found(
            "No data found for this player in the specified phase",
        ));
    }

    Ok(PhasePerformance {
        player: player.to_string(),
        phase,
        total_runs: line.total_runs,
        total_balls: line.balls_faced,
        boundaries: line.boundaries,
        strike_rate: line.strike_rate,
    })
}

pub fn team_phase_stats(
    deliveries: &[DeliveryRow],
    team: &str,
    phase: &str,
    role: &str,
) -> QueryResult<TeamPhaseStats> {
    let phase: Phase = phase.parse()?;
    let role: Role = role.parse()?;
    let in_phase = deliveries.iter().filter(|d| phase.contains(d.over));

    let stats = match role {
        Role::Batting => {
            let balls: Vec<&DeliveryRow> = in_phase.filter(|d| d.batting_team == team).collect();
            let total_runs: u32 = balls.iter().map(|d| d.total_runs).sum();
            TeamPhaseStats::Batting {
                team: team.to_string(),
                phase,
                total_runs,
                total_balls: balls.len(),
                boundaries: balls.iter().filter(|d| d.is_boundary()).count(),
                strike_rate: strike_rate(total_runs, balls.len()),
                wickets_lost: balls.iter().filter(|d| d.is_wicket).count(),
            }
        }
        Role::Bowling => {
            let balls: Vec<&DeliveryRow> = in_phase.filter(|d| d.bowling_team == team).collect();
            let conceded: u32 = balls.iter().map(|d| d.total_runs).sum();
            TeamPhaseStats::Bowling {
                team: team.to_string(),
                phase,
                total_runs_conceded: conceded,
                total_balls: balls.len(),
                wickets_taken: balls.iter().filter(|d| d.is_wicket).count(),
                economy_rate: economy_rate(conceded, balls.len()),
            }
        }
    };
    Ok(stats)
}

pub fn team_home_vs_away(matches: &[MatchRow], team: &str, home_venue: &str) -> HomeAwayRecord {
    let (mut home_matches, mut home_wins, mut away_matches, mut away_wins) = (0, 0, 0, 0);
    for m in matches.iter().filter(|m| m.involves(team)) {
        let won = usize::from(m.won_by(team));
        if m.venue == home_venue {
            home_matches += 1;
            home_wins += won;
        } else {
            away_matches += 1;
            away_wins += won;
        }
    }

    HomeAwayRecord {
        team: team.to_string(),
        home_venue: home_venue.to_string(),
        home_matches,
        home_wins,
        home_win_percentage: percentage(home_wins, home_matches),
        away_matches,
        away_wins,
        away_win_percentage: percentage(away_wins, away_matches),
    }
}
