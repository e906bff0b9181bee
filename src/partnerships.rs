use std::collections::{BTreeMap, BTreeSet};

use rayon::prelude::*;
use serde::Serialize;

use crate::error::QueryResult;
use crate::innings::{InningsHeader, MatchInnings, split_innings};
use crate::tables::DeliveryRow;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Partnership {
    pub batsmen: Vec<String>,
    pub runs: u32,
    pub balls: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PartnershipInnings {
    #[serde(flatten)]
    pub header: InningsHeader,
    pub partnerships: Vec<Partnership>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TaggedPartnership {
    pub match_id: i64,
    pub inning: u32,
    pub batting_team: String,
    #[serde(flatten)]
    pub partnership: Partnership,
}

#[derive(Default)]
struct OpenPartnership<'a> {
    batsmen: BTreeSet<&'a str>,
    runs: u32,
    balls: usize,
}

impl<'a> OpenPartnership<'a> {
    fn add_pair(&mut self, d: &'a DeliveryRow) {
        self.batsmen.insert(d.batter.as_str());
        self.batsmen.insert(d.non_striker.as_str());
    }

    fn close(self) -> Partnership {
        Partnership {
            batsmen: self.batsmen.into_iter().map(str::to_string).collect(),
            runs: self.runs,
            balls: self.balls,
        }
    }
}

/// Splits one inning into partnerships in chronological order.
///
/// A wicket delivery closes the open partnership: its runs are credited to it but the ball
/// is not counted. The trailing partnership is kept only when it scored.
pub fn segment_partnerships(balls: &[&DeliveryRow]) -> Vec<Partnership> {
    let mut out = Vec::new();
    let mut current = OpenPartnership::default();
    for d in balls {
        current.add_pair(d);
        current.runs += d.total_runs;
        if d.is_wicket {
            out.push(std::mem::take(&mut current).close());
        } else {
            current.balls += 1;
        }
    }
    if current.runs > 0 {
        out.push(current.close());
    }
    out
}

pub fn innings_partnerships(
    deliveries: &[DeliveryRow],
    match_id: i64,
) -> QueryResult<MatchInnings<PartnershipInnings>> {
    let innings = split_innings(deliveries, match_id)?
        .into_iter()
        .map(|(inning, balls)| {
            let mut partnerships = segment_partnerships(&balls);
            partnerships.sort_by(|a, b| b.runs.cmp(&a.runs));
            PartnershipInnings {
                header: InningsHeader::from_balls(inning, &balls),
                partnerships,
            }
        })
        .collect();
    Ok(MatchInnings { match_id, innings })
}

/// Partnerships of every inning in the table, ordered by match id, inning, then chronology.
pub fn all_partnerships(deliveries: &[DeliveryRow]) -> Vec<TaggedPartnership> {
    let mut by_match: BTreeMap<i64, BTreeMap<u32, Vec<&DeliveryRow>>> = BTreeMap::new();
    for d in deliveries {
        by_match
            .entry(d.match_id)
            .or_default()
            .entry(d.inning)
            .or_default()
            .push(d);
    }

    let by_match: Vec<(i64, BTreeMap<u32, Vec<&DeliveryRow>>)> = by_match.into_iter().collect();
    let per_match: Vec<Vec<TaggedPartnership>> = by_match
        .into_par_iter()
        .map(|(match_id, innings)| {
            let mut out = Vec::new();
            for (inning, balls) in innings {
                let batting_team = balls
                    .first()
                    .map(|d| d.batting_team.clone())
                    .unwrap_or_default();
                out.extend(segment_partnerships(&balls).into_iter().map(|partnership| {
                    TaggedPartnership {
                        match_id,
                        inning,
                        batting_team: batting_team.clone(),
                        partnership,
                    }
                }));
            }
            out
        })
        .collect();

    per_match.into_iter().flatten().collect()
}
