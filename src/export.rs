use crate::cleaning::{ExternalTable, SourceKind};
use crate::models::{Category, NormalizedRow, RawListing};
use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// A row type that can be written as a CSV line
pub trait CsvRecord: Serialize {
    /// Header line, in field order
    const COLUMNS: &'static [&'static str];
}

impl CsvRecord for RawListing {
    const COLUMNS: &'static [&'static str] = &[
        "titre_complet",
        "marque",
        "modele",
        "annee",
        "prix_texte",
        "prix",
        "adresse",
        "kilometrage",
        "boite_vitesse",
        "carburant",
        "categorie",
        "url_page",
    ];
}

impl CsvRecord for NormalizedRow {
    const COLUMNS: &'static [&'static str] = &[
        "titre_complet",
        "marque",
        "modele",
        "annee",
        "prix_texte",
        "prix",
        "adresse",
        "ville",
        "kilometrage",
        "boite_vitesse",
        "carburant",
        "categorie",
        "url_page",
    ];
}

/// Write rows as UTF-8 CSV with a byte-order mark and a header line.
/// Missing values are empty cells; integers are written without separators.
pub fn write_csv<W: Write, T: CsvRecord>(mut writer: W, rows: &[T]) -> Result<()> {
    writer.write_all(UTF8_BOM).context("Failed to write BOM")?;

    let mut csv = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);
    csv.write_record(T::COLUMNS).context("Failed to write CSV header")?;
    for row in rows {
        csv.serialize(row).context("Failed to write CSV row")?;
    }
    csv.flush().context("Failed to flush CSV output")?;
    Ok(())
}

pub fn write_csv_file<T: CsvRecord>(path: &Path, rows: &[T]) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("Failed to create {}", path.display()))?;
    write_csv(BufWriter::new(file), rows)
}

/// Read a CSV exported by another tool. Any header set is accepted and a
/// leading BOM is ignored; short lines simply lack the trailing cells.
pub fn read_external_csv<R: Read>(reader: R) -> Result<ExternalTable> {
    let mut csv = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(reader);

    let columns: Vec<String> = csv
        .headers()
        .context("Failed to read CSV header")?
        .iter()
        .map(|h| h.trim_start_matches('\u{feff}').trim().to_string())
        .collect();

    let mut table = ExternalTable::new(columns);
    for (line, record) in csv.records().enumerate() {
        let record = record.with_context(|| format!("Malformed CSV record {}", line + 1))?;
        table.push_row(record.iter());
    }

    Ok(table)
}

pub fn read_external_csv_file(path: &Path) -> Result<ExternalTable> {
    let file = File::open(path)
        .with_context(|| format!("Failed to open {}", path.display()))?;
    read_external_csv(file)
}

/// `<categorie>_<YYYYMMDD>.csv`
pub fn raw_snapshot_name(category: Category, at: &DateTime<Local>) -> String {
    format!("{}_{}.csv", category, at.format("%Y%m%d"))
}

/// `cleaned_<YYYYMMDD_HHMM>.csv` or `webscraper_cleaned_<YYYYMMDD_HHMM>.csv`
pub fn cleaned_snapshot_name(kind: SourceKind, at: &DateTime<Local>) -> String {
    format!("{}_{}.csv", kind.snapshot_prefix(), at.format("%Y%m%d_%H%M"))
}

/// `filtered_<prefix>_<YYYYMMDD_HHMM>.csv`
pub fn filtered_snapshot_name(kind: SourceKind, at: &DateTime<Local>) -> String {
    format!("filtered_{}", cleaned_snapshot_name(kind, at))
}

/// Write one raw snapshot per category. A file that cannot be written is
/// logged and skipped.
pub fn save_raw_snapshots(
    dir: &Path,
    raw: &BTreeMap<Category, Vec<RawListing>>,
    at: &DateTime<Local>,
) -> Vec<PathBuf> {
    let mut written = Vec::new();
    for (category, rows) in raw {
        let path = dir.join(raw_snapshot_name(*category, at));
        match write_csv_file(&path, rows) {
            Ok(()) => {
                info!(path = %path.display(), count = rows.len(), "Raw snapshot saved");
                written.push(path);
            }
            Err(e) => warn!(%category, error = %e, "Failed to save raw snapshot"),
        }
    }
    written
}

pub fn save_cleaned_snapshot(
    dir: &Path,
    kind: SourceKind,
    rows: &[NormalizedRow],
    at: &DateTime<Local>,
) -> Result<PathBuf> {
    let path = dir.join(cleaned_snapshot_name(kind, at));
    write_csv_file(&path, rows)?;
    info!(path = %path.display(), count = rows.len(), "Cleaned snapshot saved");
    Ok(path)
}

/// Write the rows kept by the viewer filters
pub fn save_filtered_snapshot(
    dir: &Path,
    kind: SourceKind,
    rows: &[NormalizedRow],
    at: &DateTime<Local>,
) -> Result<PathBuf> {
    let path = dir.join(filtered_snapshot_name(kind, at));
    write_csv_file(&path, rows)?;
    info!(path = %path.display(), count = rows.len(), "Filtered snapshot saved");
    Ok(path)
}
