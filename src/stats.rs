use std::collections::{BTreeMap, HashMap};

use crate::tables::DeliveryRow;

pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

pub fn percentage(part: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    round2(part as f64 / total as f64 * 100.0)
}

pub fn strike_rate(runs: u32, balls: usize) -> f64 {
    if balls == 0 {
        return 0.0;
    }
    round2(runs as f64 / balls as f64 * 100.0)
}

pub fn economy_rate(runs: u32, balls: usize) -> f64 {
    if balls == 0 {
        return 0.0;
    }
    round2(runs as f64 / (balls as f64 / 6.0))
}

/// Runs per over, where overs played is the span between the first and last over index seen.
pub fn run_rate(runs: u32, deliveries: &[&DeliveryRow]) -> f64 {
    let mut overs = deliveries.iter().map(|d| d.over);
    let Some(first) = overs.next() else {
        return 0.0;
    };
    let (min, max) = overs.fold((first, first), |(lo, hi), o| (lo.min(o), hi.max(o)));
    let overs_played = max - min + 1;
    round2(runs as f64 / overs_played as f64)
}

pub fn sum_total_runs(deliveries: &[&DeliveryRow]) -> u32 {
    deliveries.iter().map(|d| d.total_runs).sum()
}

pub fn count_wickets(deliveries: &[&DeliveryRow]) -> usize {
    deliveries.iter().filter(|d| d.is_wicket).count()
}

/// Histogram of dismissal kinds over wicket deliveries.
/// Wickets without a recorded kind are skipped.
pub fn dismissal_histogram<'a>(
    deliveries: impl IntoIterator<Item = &'a DeliveryRow>,
) -> BTreeMap<String, usize> {
    let mut out = BTreeMap::new();
    for d in deliveries {
        if !d.is_wicket {
            continue;
        }
        if let Some(kind) = d.dismissal_kind.as_deref() {
            *out.entry(kind.to_string()).or_insert(0) += 1;
        }
    }
    out
}

/// Name with the highest total; ties go to the lexicographically smallest name.
pub fn top_by_total(totals: &HashMap<&str, u32>) -> Option<(String, u32)> {
    totals
        .iter()
        .max_by(|(a_name, a_total), (b_name, b_total)| {
            a_total.cmp(b_total).then_with(|| b_name.cmp(a_name))
        })
        .map(|(name, total)| (name.to_string(), *total))
}
