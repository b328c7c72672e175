use crate::models::{NormalizedRow, NOT_SPECIFIED};
use std::collections::HashSet;
use tracing::debug;

pub const LOWER_QUANTILE: f64 = 0.05;
pub const UPPER_QUANTILE: f64 = 0.95;

/// Quantile of sorted values, interpolating linearly between closest ranks
pub fn quantile(sorted: &[f64], q: f64) -> Option<f64> {
    if sorted.is_empty() {
        return None;
    }
    let pos = (sorted.len() - 1) as f64 * q;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    Some(sorted[lo] + (sorted[hi] - sorted[lo]) * (pos - lo as f64))
}

/// Inclusive [P5, P95] band of the prices present in `rows`
pub fn price_band(rows: &[NormalizedRow]) -> Option<(f64, f64)> {
    let mut prices: Vec<f64> = rows.iter().filter_map(|r| r.prix).map(|p| p as f64).collect();
    prices.sort_by(|a, b| a.total_cmp(b));
    Some((quantile(&prices, LOWER_QUANTILE)?, quantile(&prices, UPPER_QUANTILE)?))
}

/// Remove duplicates and price outliers, then fill missing text columns.
///
/// Steps run in this order:
/// 1. keep the first row of every `(titre_complet, prix)` pair
/// 2. drop rows without a price
/// 3. keep rows priced within the [P5, P95] band of what is left
/// 4. fill missing address, gearbox, fuel, city and model with "Non spécifié"
pub fn dedup_and_trim(rows: Vec<NormalizedRow>) -> Vec<NormalizedRow> {
    let before = rows.len();

    let mut seen = HashSet::new();
    let mut rows: Vec<NormalizedRow> = rows
        .into_iter()
        .filter(|row| seen.insert((row.titre_complet.clone(), row.prix)))
        .filter(|row| row.prix.is_some())
        .collect();

    if let Some((low, high)) = price_band(&rows) {
        debug!(low, high, "Price band");
        rows.retain(|row| {
            row.prix
                .map(|p| (low..=high).contains(&(p as f64)))
                .unwrap_or(false)
        });
    }

    for row in rows.iter_mut() {
        fill_missing(row);
    }

    debug!(before, after = rows.len(), "Deduplicated and trimmed");
    rows
}

fn fill_missing(row: &mut NormalizedRow) {
    for field in [
        &mut row.adresse,
        &mut row.boite_vitesse,
        &mut row.carburant,
        &mut row.ville,
        &mut row.modele,
    ] {
        if field.is_none() {
            *field = Some(NOT_SPECIFIED.to_string());
        }
    }
}
