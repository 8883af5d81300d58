//! Unified location table and its copy-on-write store

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::io::ErrorKind;
use std::sync::{Arc, Mutex, PoisonError, RwLock};
use tracing::{debug, info, warn};

use haven_core::{Category, Error, Kind, LocationRecord, Result};

use crate::config::StoreConfig;
use crate::source::{CsvSourceReader, SourceReader, SourceTable};

const LAT_COLUMN: &[&str] = &["lat"];
const LON_COLUMN: &[&str] = &["lon"];
const KIND_COLUMN: &[&str] = &["type", "kind"];
const CITY_COLUMN: &[&str] = &["city"];
const NAME_COLUMN: &[&str] = &["name"];
const DESC_COLUMN: &[&str] = &["desc", "description"];
const INTENSITY_COLUMN: &[&str] = &["ins", "intensity"];

/// Columns written when a threat table is created or extended
const THREAT_COLUMNS: [&[&str]; 7] = [
    LAT_COLUMN,
    LON_COLUMN,
    INTENSITY_COLUMN,
    KIND_COLUMN,
    NAME_COLUMN,
    DESC_COLUMN,
    CITY_COLUMN,
];

/// Columns written when a safety table is created or extended
const SAFETY_COLUMNS: [&[&str]; 6] = [
    LAT_COLUMN,
    LON_COLUMN,
    KIND_COLUMN,
    NAME_COLUMN,
    DESC_COLUMN,
    CITY_COLUMN,
];

/// Immutable snapshot of every loaded location record
#[derive(Debug, Clone, Default)]
pub struct LocationTable {
    records: Vec<LocationRecord>,
    loaded_at: Option<DateTime<Utc>>,
}

impl LocationTable {
    pub fn new(records: Vec<LocationRecord>) -> Self {
        Self {
            records,
            loaded_at: Some(Utc::now()),
        }
    }

    pub fn records(&self) -> &[LocationRecord] {
        &self.records
    }

    pub fn iter(&self) -> impl Iterator<Item = &LocationRecord> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn loaded_at(&self) -> Option<DateTime<Utc>> {
        self.loaded_at
    }

    /// Distinct city values, as stored
    pub fn known_cities(&self) -> BTreeSet<String> {
        self.records
            .iter()
            .map(|record| record.city.trim())
            .filter(|city| !city.is_empty())
            .map(str::to_string)
            .collect()
    }

    pub fn stats(&self) -> SourceStats {
        let mut stats = SourceStats {
            total: self.records.len(),
            loaded_at: self.loaded_at,
            ..Default::default()
        };

        for record in &self.records {
            let kind = record.kind.as_str().to_string();
            let source = record.source.clone().unwrap_or_else(|| "unknown".to_string());

            let summary = stats.per_source.entry(source).or_default();
            summary.records += 1;
            *summary.kinds.entry(kind.clone()).or_insert(0) += 1;

            *stats.kinds.entry(kind).or_insert(0) += 1;
        }

        stats
    }
}

/// Per-source record counts and kind histograms
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SourceStats {
    pub total: usize,
    pub per_source: BTreeMap<String, SourceSummary>,
    pub kinds: BTreeMap<String, usize>,
    pub loaded_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SourceSummary {
    pub records: usize,
    pub kinds: BTreeMap<String, usize>,
}

/// Turn one raw source table into validated records.
///
/// Headers are trimmed first. A table without `lat`, `lon` or a kind column
/// (`type`, alias `kind`) is rejected as a whole with [`Error::Load`]. Rows
/// with bad coordinates or an empty kind are skipped. Intensity is kept only
/// for threat kinds and clamped into [0, 1].
pub fn parse_table(source: &str, mut table: SourceTable) -> Result<Vec<LocationRecord>> {
    table.normalize_headers();

    let lat_col = require_column(&table, source, LAT_COLUMN)?;
    let lon_col = require_column(&table, source, LON_COLUMN)?;
    let kind_col = require_column(&table, source, KIND_COLUMN)?;
    let city_col = table.column(CITY_COLUMN);
    let name_col = table.column(NAME_COLUMN);
    let desc_col = table.column(DESC_COLUMN);
    let intensity_col = table.column(INTENSITY_COLUMN);

    let mut records = Vec::with_capacity(table.len());
    let mut skipped = 0;

    for row in &table.rows {
        let lat = table.cell(row, Some(lat_col)).parse::<f64>().ok();
        let lon = table.cell(row, Some(lon_col)).parse::<f64>().ok();
        let kind = Kind::parse(table.cell(row, Some(kind_col)));

        let (Some(lat), Some(lon), Some(kind)) = (lat, lon, kind) else {
            skipped += 1;
            continue;
        };

        let name = non_empty(table.cell(row, name_col));
        let city = non_empty(table.cell(row, city_col))
            .or_else(|| name.clone())
            .unwrap_or_else(|| format!("Location from {}", source));

        let intensity = match kind.category() {
            Category::Threat => table
                .cell(row, intensity_col)
                .parse::<f64>()
                .ok()
                .filter(|value| value.is_finite())
                .map(|value| value.clamp(0.0, 1.0)),
            _ => None,
        };

        let record = LocationRecord {
            kind,
            city,
            name,
            lat,
            lon,
            intensity,
            description: non_empty(table.cell(row, desc_col)),
            source: Some(source.to_string()),
        };

        if record.validate().is_err() {
            skipped += 1;
            continue;
        }

        records.push(record);
    }

    if skipped > 0 {
        warn!(source, skipped, "rejected rows with invalid coordinates or kind");
    }

    Ok(records)
}

fn require_column(table: &SourceTable, source: &str, names: &[&str]) -> Result<usize> {
    table.column(names).ok_or_else(|| {
        Error::Load(format!("{} is missing required column '{}'", source, names[0]))
    })
}

fn non_empty(value: &str) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

/// Copy-on-write holder of the active [`LocationTable`]
///
/// Readers take a [`snapshot`](RecordStore::snapshot) and keep it as long as
/// they like. `load`, `append` and `clear` are serialized by a writer lock,
/// build a complete new table and swap it in.
pub struct RecordStore<R: SourceReader = CsvSourceReader> {
    reader: R,
    config: StoreConfig,
    active: RwLock<Arc<LocationTable>>,
    writer: Mutex<()>,
}

impl RecordStore<CsvSourceReader> {
    /// Create a CSV-backed store
    pub fn with_csv(config: StoreConfig) -> Self {
        Self::new(CsvSourceReader::new(), config)
    }
}

impl<R: SourceReader> RecordStore<R> {
    pub fn new(reader: R, config: StoreConfig) -> Self {
        Self {
            reader,
            config,
            active: RwLock::new(Arc::new(LocationTable::default())),
            writer: Mutex::new(()),
        }
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Current immutable table
    pub fn snapshot(&self) -> Arc<LocationTable> {
        self.active
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn stats(&self) -> SourceStats {
        self.snapshot().stats()
    }

    /// Load the configured sources
    pub fn load_configured(&self) -> Result<usize> {
        let sources = self.config.sources.clone();
        self.load(&sources)
    }

    /// Replace the table with the merged contents of `sources`.
    ///
    /// A source that cannot be read or lacks a required column is logged and
    /// skipped. Fails only when no source was accepted, in which case the
    /// active table is left untouched.
    pub fn load(&self, sources: &[String]) -> Result<usize> {
        let _guard = self.writer.lock().unwrap_or_else(PoisonError::into_inner);

        let mut records = Vec::new();
        let mut accepted = 0;

        for source in sources {
            let parsed = self
                .reader
                .read(source)
                .and_then(|table| parse_table(source, table));

            match parsed {
                Ok(mut rows) => {
                    info!(source = %source, records = rows.len(), "loaded source");
                    accepted += 1;
                    records.append(&mut rows);
                }
                Err(e) => {
                    warn!(source = %source, error = %e, "skipping source");
                }
            }
        }

        if accepted == 0 {
            return Err(Error::Load(format!(
                "none of {} source(s) could be loaded",
                sources.len()
            )));
        }

        let count = records.len();
        self.swap(LocationTable::new(records));
        info!(records = count, sources = accepted, "record store loaded");

        Ok(count)
    }

    /// Validate a new record, persist it to its origin source and add it.
    ///
    /// Records without a `source` are routed by category (see
    /// [`StoreConfig::append_target`]). Threats without intensity get their
    /// kind's default; a missing description becomes the title-cased kind.
    /// On any error the active table and the file are left unchanged.
    pub fn append(&self, record: LocationRecord) -> Result<LocationRecord> {
        record.validate()?;
        let mut record = self.prepare(record);
        let source = record
            .source
            .clone()
            .unwrap_or_else(|| self.config.append_target(&record.kind).to_string());
        record.source = Some(source.clone());

        let _guard = self.writer.lock().unwrap_or_else(PoisonError::into_inner);

        self.persist(&source, &record)?;

        let current = self.snapshot();
        let mut records = current.records().to_vec();
        records.push(record.clone());
        self.swap(LocationTable::new(records));

        info!(
            source = %source,
            kind = %record.kind,
            lat = record.lat,
            lon = record.lon,
            "appended record"
        );

        Ok(record)
    }

    /// Swap in an empty table
    pub fn clear(&self) {
        let _guard = self.writer.lock().unwrap_or_else(PoisonError::into_inner);
        self.swap(LocationTable::default());
        debug!("record store cleared");
    }

    fn prepare(&self, mut record: LocationRecord) -> LocationRecord {
        match record.category() {
            Category::Threat => {
                if record.intensity.is_none() {
                    record.intensity = record.kind.default_intensity();
                }
            }
            _ => record.intensity = None,
        }

        if record.description.is_none() {
            record.description = Some(record.kind.display_name());
        }

        record
    }

    fn persist(&self, source: &str, record: &LocationRecord) -> Result<()> {
        let columns: &[&[&str]] = match record.category() {
            Category::Safety => &SAFETY_COLUMNS,
            _ => &THREAT_COLUMNS,
        };

        let mut table = match self.reader.read(source) {
            Ok(table) => table,
            Err(Error::Io(e)) if e.kind() == ErrorKind::NotFound => {
                SourceTable::new(columns.iter().map(|names| names[0].to_string()).collect())
            }
            Err(e) => return Err(e),
        };
        table.normalize_headers();

        for names in columns {
            if table.column(names).is_none() {
                table.add_column(names[0]);
            }
        }

        let row = table
            .headers
            .iter()
            .map(|header| cell_for(header, record))
            .collect();
        table.rows.push(row);

        self.reader.write(source, &table)
    }

    fn swap(&self, table: LocationTable) {
        *self.active.write().unwrap_or_else(PoisonError::into_inner) = Arc::new(table);
    }
}

fn cell_for(header: &str, record: &LocationRecord) -> String {
    let matches = |names: &[&str]| names.iter().any(|name| header.eq_ignore_ascii_case(name));

    if matches(LAT_COLUMN) {
        record.lat.to_string()
    } else if matches(LON_COLUMN) {
        record.lon.to_string()
    } else if matches(KIND_COLUMN) {
        record.kind.as_str().to_string()
    } else if matches(INTENSITY_COLUMN) {
        record.intensity.map(|value| value.to_string()).unwrap_or_default()
    } else if matches(NAME_COLUMN) {
        record.name.clone().unwrap_or_default()
    } else if matches(DESC_COLUMN) {
        record.description.clone().unwrap_or_default()
    } else if matches(CITY_COLUMN) {
        record.city.clone()
    } else {
        String::new()
    }
}
