use std::collections::HashSet;
use std::str::FromStr;

use anyhow::{Result, anyhow, bail};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TossDecision {
    Bat,
    Field,
}

impl TossDecision {
    pub fn as_str(&self) -> &'static str {
        match self {
            TossDecision::Bat => "bat",
            TossDecision::Field => "field",
        }
    }
}

impl FromStr for TossDecision {
    type Err = anyhow::Error;

    fn from_str(raw: &str) -> Result<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "bat" => Ok(TossDecision::Bat),
            "field" => Ok(TossDecision::Field),
            other => Err(anyhow!("unknown toss decision {other:?}")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum MatchResult {
    #[serde(rename = "runs")]
    Runs,
    #[serde(rename = "wickets")]
    Wickets,
    #[serde(rename = "tie")]
    Tie,
    #[serde(rename = "no result")]
    NoResult,
}

impl MatchResult {
    pub fn as_str(&self) -> &'static str {
        match self {
            MatchResult::Runs => "runs",
            MatchResult::Wickets => "wickets",
            MatchResult::Tie => "tie",
            MatchResult::NoResult => "no result",
        }
    }
}

impl FromStr for MatchResult {
    type Err = anyhow::Error;

    fn from_str(raw: &str) -> Result<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "runs" => Ok(MatchResult::Runs),
            "wickets" => Ok(MatchResult::Wickets),
            "tie" => Ok(MatchResult::Tie),
            "no result" | "no_result" | "na" => Ok(MatchResult::NoResult),
            other => Err(anyhow!("unknown match result {other:?}")),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MatchRow {
    pub match_id: i64,
    pub season: String,
    pub city: Option<String>,
    pub venue: String,
    pub team1: String,
    pub team2: String,
    pub toss_winner: String,
    pub toss_decision: TossDecision,
    pub winner: Option<String>,
    pub result: MatchResult,
    pub result_margin: Option<f64>,
    pub target_runs: Option<f64>,
}

impl MatchRow {
    pub fn involves(&self, team: &str) -> bool {
        self.team1 == team || self.team2 == team
    }

    pub fn won_by(&self, team: &str) -> bool {
        self.winner.as_deref() == Some(team)
    }

    fn validate(&self) -> Result<()> {
        if let Some(margin) = self.result_margin
            && (!margin.is_finite() || margin < 0.0)
        {
            bail!("result_margin must be a non-negative number, got {margin}");
        }
        if self.result != MatchResult::NoResult
            && let Some(winner) = self.winner.as_deref()
            && !self.involves(winner)
        {
            bail!(
                "winner {winner:?} is neither {:?} nor {:?}",
                self.team1,
                self.team2
            );
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DeliveryRow {
    pub match_id: i64,
    pub inning: u32,
    pub batting_team: String,
    pub bowling_team: String,
    pub over: u32,
    pub ball: u32,
    pub batter: String,
    pub bowler: String,
    pub non_striker: String,
    pub batsman_runs: u32,
    pub extra_runs: u32,
    pub total_runs: u32,
    pub is_wicket: bool,
    pub player_dismissed: Option<String>,
    pub dismissal_kind: Option<String>,
}

impl DeliveryRow {
    pub fn is_four(&self) -> bool {
        self.batsman_runs == 4
    }

    pub fn is_six(&self) -> bool {
        self.batsman_runs == 6
    }

    pub fn is_boundary(&self) -> bool {
        self.is_four() || self.is_six()
    }

    /// Wicket deliveries whose dismissal counts to the bowler. Run outs, retirements and
    /// obstruction do not.
    pub fn credits_bowler(&self) -> bool {
        self.is_wicket
            && !matches!(
                self.dismissal_kind.as_deref(),
                Some("run out" | "retired hurt" | "retired out" | "obstructing the field")
            )
    }

    fn validate(&self) -> Result<()> {
        if self.batsman_runs > 6 {
            bail!("batsman_runs {} outside 0..=6", self.batsman_runs);
        }
        if self.batsman_runs.checked_add(self.extra_runs) != Some(self.total_runs) {
            bail!(
                "total_runs {} != batsman_runs {} + extra_runs {}",
                self.total_runs,
                self.batsman_runs,
                self.extra_runs
            );
        }
        if !self.is_wicket && self.player_dismissed.is_some() {
            bail!("player_dismissed set on a non-wicket delivery");
        }
        Ok(())
    }
}

/// The two immutable input tables. Built once at startup and shared behind an `Arc`.
#[derive(Debug, Clone, Default)]
pub struct Tables {
    matches: Vec<MatchRow>,
    deliveries: Vec<DeliveryRow>,
}

impl Tables {
    /// Validates every row; the first malformed row aborts the load.
    pub fn new(matches: Vec<MatchRow>, deliveries: Vec<DeliveryRow>) -> Result<Self> {
        let mut seen = HashSet::with_capacity(matches.len());
        for m in &matches {
            if !seen.insert(m.match_id) {
                bail!("duplicate match_id {} in match table", m.match_id);
            }
            m.validate()
                .map_err(|err| anyhow!("match {}: {err}", m.match_id))?;
        }
        for (idx, d) in deliveries.iter().enumerate() {
            d.validate().map_err(|err| {
                anyhow!(
                    "delivery #{idx} (match {} inning {} over {} ball {}): {err}",
                    d.match_id,
                    d.inning,
                    d.over,
                    d.ball
                )
            })?;
        }
        Ok(Self {
            matches,
            deliveries,
        })
    }

    pub fn matches(&self) -> &[MatchRow] {
        &self.matches
    }

    pub fn deliveries(&self) -> &[DeliveryRow] {
        &self.deliveries
    }
}
