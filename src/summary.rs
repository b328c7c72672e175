use crate::models::{Category, NormalizedRow};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap, HashSet};

pub const TOP_BRANDS: usize = 10;
pub const TOP_CITIES: usize = 15;
pub const PRICE_BINS: usize = 30;

/// Headline figures of a dataset
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct DatasetSummary {
    pub total: usize,
    /// Mean price in F CFA over rows that have one
    pub mean_price: Option<f64>,
    pub brands: usize,
    pub categories: usize,
    pub missing_cells: usize,
    pub top_brands: Vec<(String, usize)>,
    pub top_cities: Vec<(String, usize)>,
    pub by_category: Vec<(Category, usize)>,
    pub by_year: Vec<YearStats>,
    pub price_histogram: Vec<PriceBin>,
    pub correlations: Correlations,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct YearStats {
    pub annee: i32,
    pub mean_price: Option<f64>,
    pub count: usize,
}

impl DatasetSummary {
    pub fn from_rows(rows: &[NormalizedRow]) -> Self {
        let brands: HashSet<&str> = rows.iter().filter_map(|r| r.marque.as_deref()).collect();
        let categories: HashSet<Category> = rows.iter().filter_map(|r| r.categorie).collect();

        Self {
            total: rows.len(),
            mean_price: mean(rows.iter().filter_map(|r| r.prix)),
            brands: brands.len(),
            categories: categories.len(),
            missing_cells: rows.iter().map(missing_cells).sum(),
            top_brands: value_counts(brand_values(rows), TOP_BRANDS),
            top_cities: value_counts(rows.iter().filter_map(|r| r.ville.clone()), TOP_CITIES),
            by_category: category_counts(rows),
            by_year: price_by_year(rows),
            price_histogram: price_histogram(rows, PRICE_BINS),
            correlations: correlations(rows),
        }
    }
}

fn brand_values(rows: &[NormalizedRow]) -> impl Iterator<Item = String> + '_ {
    rows.iter().filter_map(|r| r.marque.clone())
}

fn mean(values: impl Iterator<Item = i64>) -> Option<f64> {
    let (sum, count) = values.fold((0f64, 0usize), |(s, c), v| (s + v as f64, c + 1));
    (count > 0).then(|| sum / count as f64)
}

fn missing_cells(row: &NormalizedRow) -> usize {
    [
        row.marque.is_none(),
        row.modele.is_none(),
        row.annee.is_none(),
        row.prix_texte.is_none(),
        row.prix.is_none(),
        row.adresse.is_none(),
        row.ville.is_none(),
        row.kilometrage.is_none(),
        row.boite_vitesse.is_none(),
        row.carburant.is_none(),
        row.categorie.is_none(),
        row.url_page.is_none(),
    ]
    .iter()
    .filter(|missing| **missing)
    .count()
}

/// Most frequent values, highest count first; ties sorted by value
pub fn value_counts(values: impl Iterator<Item = String>, top: usize) -> Vec<(String, usize)> {
    let mut counts: HashMap<String, usize> = HashMap::new();
    for value in values {
        *counts.entry(value).or_default() += 1;
    }

    let mut counts: Vec<(String, usize)> = counts.into_iter().collect();
    counts.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    counts.truncate(top);
    counts
}

pub fn category_counts(rows: &[NormalizedRow]) -> Vec<(Category, usize)> {
    let mut counts: BTreeMap<Category, usize> = BTreeMap::new();
    for category in rows.iter().filter_map(|r| r.categorie) {
        *counts.entry(category).or_default() += 1;
    }
    let mut counts: Vec<_> = counts.into_iter().collect();
    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts
}

/// Mean price and number of priced listings per model year, oldest first
pub fn price_by_year(rows: &[NormalizedRow]) -> Vec<YearStats> {
    let mut groups: BTreeMap<i32, Vec<i64>> = BTreeMap::new();
    for row in rows {
        if let Some(annee) = row.annee {
            groups.entry(annee).or_default().extend(row.prix);
        }
    }

    groups
        .into_iter()
        .map(|(annee, prices)| YearStats {
            annee,
            count: prices.len(),
            mean_price: mean(prices.into_iter()),
        })
        .collect()
}

/// Viewer filters over a cleaned dataset
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RowFilter {
    /// Brands to keep; empty keeps every brand
    pub brands: Vec<String>,
    pub min_price: Option<i64>,
    pub max_price: Option<i64>,
}

impl RowFilter {
    pub fn is_active(&self) -> bool {
        !self.brands.is_empty() || self.min_price.is_some() || self.max_price.is_some()
    }

    fn keeps(&self, row: &NormalizedRow) -> bool {
        let brand_ok = self.brands.is_empty()
            || row
                .marque
                .as_ref()
                .map(|m| self.brands.contains(m))
                .unwrap_or(false);
        if !brand_ok {
            return false;
        }

        if self.min_price.is_none() && self.max_price.is_none() {
            return true;
        }
        match row.prix {
            Some(p) => {
                self.min_price.map_or(true, |low| low <= p)
                    && self.max_price.map_or(true, |high| p <= high)
            }
            None => false,
        }
    }
}

/// Rows kept by `filter`, in their original order. Price bounds are
/// inclusive; an unpriced row fails any price bound.
pub fn filter_rows(rows: &[NormalizedRow], filter: &RowFilter) -> Vec<NormalizedRow> {
    rows.iter().filter(|r| filter.keeps(r)).cloned().collect()
}

/// One equal-width price bin, `[start, end)` except the last which includes `end`
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct PriceBin {
    pub start: f64,
    pub end: f64,
    pub count: usize,
}

/// Price distribution over `bins` equal-width bins spanning min..=max.
/// A single distinct price gives one bin holding every priced row.
pub fn price_histogram(rows: &[NormalizedRow], bins: usize) -> Vec<PriceBin> {
    let prices: Vec<f64> = rows.iter().filter_map(|r| r.prix).map(|p| p as f64).collect();
    let (Some(min), Some(max)) = (
        prices.iter().copied().reduce(f64::min),
        prices.iter().copied().reduce(f64::max),
    ) else {
        return Vec::new();
    };
    if bins == 0 {
        return Vec::new();
    }
    if min == max {
        return vec![PriceBin { start: min, end: max, count: prices.len() }];
    }

    let width = (max - min) / bins as f64;
    let mut counts = vec![0usize; bins];
    for price in prices {
        let index = (((price - min) / width) as usize).min(bins - 1);
        counts[index] += 1;
    }

    counts
        .into_iter()
        .enumerate()
        .map(|(i, count)| PriceBin {
            start: min + width * i as f64,
            end: if i + 1 == bins { max } else { min + width * (i + 1) as f64 },
            count,
        })
        .collect()
}

/// Columns of the correlation matrix
pub const NUMERIC_COLUMNS: [&str; 3] = ["prix", "kilometrage", "annee"];

/// Pearson correlations between the numeric columns, row-major in
/// `NUMERIC_COLUMNS` order. Each pair uses the rows where both values are
/// present; fewer than two such rows or a constant column gives `None`.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Correlations {
    pub columns: Vec<String>,
    pub matrix: Vec<Vec<Option<f64>>>,
}

impl Correlations {
    pub fn get(&self, a: &str, b: &str) -> Option<f64> {
        let i = self.columns.iter().position(|c| c == a)?;
        let j = self.columns.iter().position(|c| c == b)?;
        self.matrix[i][j]
    }
}

pub fn correlations(rows: &[NormalizedRow]) -> Correlations {
    let columns: Vec<Vec<Option<f64>>> = vec![
        rows.iter().map(|r| r.prix.map(|v| v as f64)).collect(),
        rows.iter().map(|r| r.kilometrage.map(|v| v as f64)).collect(),
        rows.iter().map(|r| r.annee.map(f64::from)).collect(),
    ];

    let matrix = columns
        .iter()
        .map(|x| columns.iter().map(|y| pearson(x, y)).collect())
        .collect();

    Correlations {
        columns: NUMERIC_COLUMNS.iter().map(|c| c.to_string()).collect(),
        matrix,
    }
}

fn pearson(x: &[Option<f64>], y: &[Option<f64>]) -> Option<f64> {
    let pairs: Vec<(f64, f64)> = x
        .iter()
        .zip(y)
        .filter_map(|(a, b)| Some(((*a)?, (*b)?)))
        .collect();
    if pairs.len() < 2 {
        return None;
    }

    let n = pairs.len() as f64;
    let mean_x = pairs.iter().map(|p| p.0).sum::<f64>() / n;
    let mean_y = pairs.iter().map(|p| p.1).sum::<f64>() / n;

    let (mut cov, mut var_x, mut var_y) = (0.0, 0.0, 0.0);
    for (a, b) in &pairs {
        cov += (a - mean_x) * (b - mean_y);
        var_x += (a - mean_x).powi(2);
        var_y += (b - mean_y).powi(2);
    }
    if var_x == 0.0 || var_y == 0.0 {
        return None;
    }
    Some((cov / (var_x * var_y).sqrt()).clamp(-1.0, 1.0))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(marque: &str, prix: i64, annee: Option<i32>, categorie: Category) -> NormalizedRow {
        NormalizedRow {
            titre_complet: format!("{} {}", marque, prix),
            marque: Some(marque.to_string()),
            prix: Some(prix),
            annee,
            categorie: Some(categorie),
            ville: Some("Dakar".to_string()),
            ..Default::default()
        }
    }

    fn sample() -> Vec<NormalizedRow> {
        vec![
            row("Toyota", 4_000_000, Some(2015), Category::Voitures),
            row("Toyota", 6_000_000, Some(2018), Category::Voitures),
            row("Yamaha", 1_000_000, Some(2018), Category::Motos),
            row("Kia", 5_000_000, None, Category::Location),
        ]
    }

    #[test]
    fn summary_cards() {
        let summary = DatasetSummary::from_rows(&sample());
        assert_eq!(summary.total, 4);
        assert_eq!(summary.mean_price, Some(4_000_000.0));
        assert_eq!(summary.brands, 3);
        assert_eq!(summary.categories, 3);
        assert_eq!(summary.top_brands[0], ("Toyota".to_string(), 2));
        assert_eq!(summary.top_cities, vec![("Dakar".to_string(), 4)]);
        assert_eq!(summary.by_category[0], (Category::Voitures, 2));
    }

    #[test]
    fn empty_dataset_has_no_mean() {
        let summary = DatasetSummary::from_rows(&[]);
        assert_eq!(summary.total, 0);
        assert_eq!(summary.mean_price, None);
        assert!(summary.by_year.is_empty());
    }

    #[test]
    fn years_are_grouped_in_order() {
        let years = price_by_year(&sample());
        assert_eq!(
            years,
            vec![
                YearStats { annee: 2015, mean_price: Some(4_000_000.0), count: 1 },
                YearStats { annee: 2018, mean_price: Some(3_500_000.0), count: 2 },
            ]
        );
    }

    #[test]
    fn value_counts_break_ties_by_name() {
        let values = ["b", "a", "c", "a", "b"].into_iter().map(String::from);
        assert_eq!(
            value_counts(values, 2),
            vec![("a".to_string(), 2), ("b".to_string(), 2)]
        );
    }

    #[test]
    fn missing_cells_are_counted() {
        let summary = DatasetSummary::from_rows(&sample()[3..]);
        // modele, annee, prix_texte, adresse, kilometrage, boite, carburant, url_page
        assert_eq!(summary.missing_cells, 8);
    }

    #[test]
    fn viewer_filters() {
        let rows = sample();
        let toyota = RowFilter {
            brands: vec!["Toyota".to_string()],
            ..Default::default()
        };
        assert_eq!(filter_rows(&rows, &toyota).len(), 2);

        let mid = RowFilter {
            min_price: Some(4_000_000),
            max_price: Some(5_000_000),
            ..Default::default()
        };
        let prices: Vec<_> = filter_rows(&rows, &mid).iter().filter_map(|r| r.prix).collect();
        assert_eq!(prices, vec![4_000_000, 5_000_000]);
    }

    #[test]
    fn open_ended_price_bound_drops_unpriced_rows() {
        let mut rows = sample();
        rows[0].prix = None;
        let filter = RowFilter {
            min_price: Some(1_000_000),
            ..Default::default()
        };
        assert!(filter.is_active());
        let kept = filter_rows(&rows, &filter);
        assert_eq!(kept.len(), 3);
        assert!(kept.iter().all(|r| r.prix.is_some()));
        assert!(!RowFilter::default().is_active());
        assert_eq!(filter_rows(&rows, &RowFilter::default()).len(), 4);
    }

    #[test]
    fn histogram_spans_min_to_max() {
        let bins = price_histogram(&sample(), 5);
        assert_eq!(bins.len(), 5);
        assert_eq!(bins[0].start, 1_000_000.0);
        assert_eq!(bins[4].end, 6_000_000.0);
        let counts: Vec<usize> = bins.iter().map(|b| b.count).collect();
        // 1M in the first bin, 4M in the fourth, 5M and the maximum in the last
        assert_eq!(counts, vec![1, 0, 0, 1, 2]);
    }

    #[test]
    fn histogram_of_constant_or_empty_prices() {
        let rows = vec![
            row("Kia", 2_000_000, None, Category::Voitures),
            row("Kia", 2_000_000, None, Category::Voitures),
        ];
        assert_eq!(
            price_histogram(&rows, 30),
            vec![PriceBin { start: 2_000_000.0, end: 2_000_000.0, count: 2 }]
        );
        assert!(price_histogram(&[], 30).is_empty());
    }

    #[test]
    fn correlations_use_complete_pairs() {
        let mut rows = vec![
            row("A", 1_000_000, Some(2010), Category::Voitures),
            row("B", 2_000_000, Some(2012), Category::Voitures),
            row("C", 3_000_000, Some(2014), Category::Voitures),
        ];
        rows[0].kilometrage = Some(150_000);
        rows[1].kilometrage = Some(100_000);
        rows[2].kilometrage = Some(50_000);
        rows.push(row("D", 9_000_000, None, Category::Voitures));

        let corr = correlations(&rows);
        assert_eq!(corr.columns, vec!["prix", "kilometrage", "annee"]);
        assert!((corr.get("prix", "annee").unwrap() - 1.0).abs() < 1e-9);
        assert!((corr.get("prix", "kilometrage").unwrap() + 1.0).abs() < 1e-9);
        assert!((corr.get("prix", "prix").unwrap() - 1.0).abs() < 1e-9);
        assert_eq!(corr.get("annee", "prix"), corr.get("prix", "annee"));
    }

    #[test]
    fn missing_column_has_no_correlation() {
        let corr = correlations(&sample());
        // no mileage at all
        assert_eq!(corr.get("kilometrage", "prix"), None);
        assert_eq!(corr.get("kilometrage", "kilometrage"), None);
    }
}
