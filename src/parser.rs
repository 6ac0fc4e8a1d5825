//! Ingestion of hourly bike-share CSV exports.
//!
//! Source headers are matched against [`SCHEMA`], which says for each field
//! whether its column must be present and what a missing or unparseable value
//! becomes. Bad values are recovered row by row and counted in the
//! [`IngestReport`]; only a missing required column aborts the ingest.

use crate::error::{Error, Result};
use crate::records::HourlyRecord;
use crate::store::HourlyStore;
use chrono::NaiveDate;
use csv::{ReaderBuilder, StringRecord, Trim};
use encoding_rs::{UTF_8, WINDOWS_1252};
use std::borrow::Cow;
use tracing::{debug, info, warn};

/// Label stored when a categorical column is absent or blank.
pub const UNKNOWN_LABEL: &str = "Unknown";

/// Date layouts tried in order; day-first throughout.
const DATE_FORMATS: &[&str] = &["%d/%m/%Y", "%d-%m-%Y", "%d.%m.%Y", "%Y-%m-%d"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Date,
    Hour,
    RentedBikeCount,
    TemperatureC,
    HumidityPct,
    WindspeedMs,
    Visibility10m,
    DewPointC,
    SolarRadiation,
    RainfallMm,
    SnowfallCm,
    Seasons,
    Holiday,
    FunctioningDay,
}

/// How a value is recovered when its column is absent or it fails to parse.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Fallback {
    /// The row is dropped.
    SkipRow,
    Number(f64),
    Label(&'static str),
}

#[derive(Debug, Clone, Copy)]
pub struct ColumnSpec {
    pub header: &'static str,
    pub canonical: &'static str,
    pub field: Field,
    pub required: bool,
    pub fallback: Fallback,
}

const fn column(
    header: &'static str,
    canonical: &'static str,
    field: Field,
    required: bool,
    fallback: Fallback,
) -> ColumnSpec {
    ColumnSpec {
        header,
        canonical,
        field,
        required,
        fallback,
    }
}

pub const SCHEMA: &[ColumnSpec] = &[
    column("Date", "date", Field::Date, true, Fallback::SkipRow),
    column("Hour", "hour", Field::Hour, true, Fallback::Number(0.0)),
    column("Rented Bike Count", "rented_bike_count", Field::RentedBikeCount, false, Fallback::Number(0.0)),
    column("Temperature(°C)", "temperature_c", Field::TemperatureC, false, Fallback::Number(0.0)),
    column("Humidity(%)", "humidity_pct", Field::HumidityPct, false, Fallback::Number(0.0)),
    column("Wind speed (m/s)", "windspeed_ms", Field::WindspeedMs, false, Fallback::Number(0.0)),
    column("Visibility (10m)", "visibility_10m", Field::Visibility10m, false, Fallback::Number(0.0)),
    column("Dew point temperature(°C)", "dew_point_c", Field::DewPointC, false, Fallback::Number(0.0)),
    column("Solar Radiation (MJ/m2)", "solar_radiation_mj_m2", Field::SolarRadiation, false, Fallback::Number(0.0)),
    column("Rainfall(mm)", "rainfall_mm", Field::RainfallMm, false, Fallback::Number(0.0)),
    column("Snowfall (cm)", "snowfall_cm", Field::SnowfallCm, false, Fallback::Number(0.0)),
    column("Seasons", "seasons", Field::Seasons, false, Fallback::Label(UNKNOWN_LABEL)),
    column("Holiday", "holiday", Field::Holiday, false, Fallback::Label(UNKNOWN_LABEL)),
    column("Functioning Day", "functioning_day", Field::FunctioningDay, false, Fallback::Label(UNKNOWN_LABEL)),
];

/// Counters describing one ingest run.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct IngestReport {
    pub encoding: &'static str,
    pub rows_read: usize,
    pub rows_dropped: usize,
    pub values_defaulted: usize,
    pub inserted: usize,
    pub duplicates: usize,
    pub missing_columns: Vec<String>,
}

/// Decodes CSV bytes as UTF-8, falling back to Windows-1252 (a superset of
/// Latin-1 for printable text) when the bytes are not valid UTF-8.
pub fn decode_text(bytes: &[u8]) -> (Cow<'_, str>, &'static str) {
    let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);
    match UTF_8.decode_without_bom_handling_and_without_replacement(bytes) {
        Some(text) => (text, UTF_8.name()),
        None => {
            let (text, _) = WINDOWS_1252.decode_without_bom_handling(bytes);
            (text, WINDOWS_1252.name())
        }
    }
}

/// Parses a CSV export into hourly records.
///
/// Returns the records together with a report whose store counters
/// (`inserted`, `duplicates`) are still zero.
pub fn parse_hourly_csv(bytes: &[u8]) -> Result<(Vec<HourlyRecord>, IngestReport)> {
    let (text, encoding) = decode_text(bytes);
    if encoding != UTF_8.name() {
        warn!(encoding, "Input is not valid UTF-8, decoded with fallback encoding");
    }

    let mut rdr = ReaderBuilder::new()
        .flexible(true)
        .trim(Trim::Headers)
        .from_reader(text.as_bytes());

    let headers = rdr.headers()?.clone();
    let layout = ColumnLayout::resolve(&headers);

    let missing_required: Vec<String> = layout
        .missing()
        .filter(|spec| spec.required)
        .map(|spec| spec.header.to_string())
        .collect();
    if !missing_required.is_empty() {
        return Err(Error::MissingColumns(missing_required));
    }

    let mut report = IngestReport {
        encoding,
        missing_columns: layout.missing().map(|spec| spec.header.to_string()).collect(),
        ..Default::default()
    };
    if !report.missing_columns.is_empty() {
        warn!(missing = ?report.missing_columns, "Optional columns absent, using defaults");
    }

    let mut records = Vec::new();
    for (line, result) in rdr.records().enumerate() {
        report.rows_read += 1;
        let row = match result {
            Ok(row) => row,
            Err(e) => {
                debug!(line = line + 2, error = %e, "Unreadable CSV row dropped");
                report.rows_dropped += 1;
                continue;
            }
        };

        match layout.build_record(&row, &mut report.values_defaulted) {
            Some(record) => records.push(record),
            None => {
                debug!(line = line + 2, "Row without usable date or hour dropped");
                report.rows_dropped += 1;
            }
        }
    }

    if report.rows_dropped > 0 || report.values_defaulted > 0 {
        warn!(
            dropped = report.rows_dropped,
            defaulted = report.values_defaulted,
            "Recovered from unparseable values"
        );
    }

    Ok((records, report))
}

/// Parses `bytes` and inserts the records, skipping (date, hour) conflicts.
#[tracing::instrument(skip_all, fields(bytes = bytes.len()))]
pub fn ingest(store: &mut HourlyStore, bytes: &[u8]) -> Result<IngestReport> {
    let (records, mut report) = parse_hourly_csv(bytes)?;
    let summary = store.insert_ignore_conflicts(records);
    report.inserted = summary.inserted;
    report.duplicates = summary.duplicates;

    info!(
        rows_read = report.rows_read,
        inserted = report.inserted,
        duplicates = report.duplicates,
        dropped = report.rows_dropped,
        "Ingest complete"
    );
    Ok(report)
}

/// Column index for each schema entry, resolved from the header row.
struct ColumnLayout {
    indices: Vec<(&'static ColumnSpec, Option<usize>)>,
}

impl ColumnLayout {
    fn resolve(headers: &StringRecord) -> Self {
        let indices = SCHEMA
            .iter()
            .map(|spec| {
                let idx = headers
                    .iter()
                    .position(|h| h == spec.header || h == spec.canonical);
                (spec, idx)
            })
            .collect();
        Self { indices }
    }

    fn missing(&self) -> impl Iterator<Item = &'static ColumnSpec> + '_ {
        self.indices
            .iter()
            .filter(|(_, idx)| idx.is_none())
            .map(|(spec, _)| *spec)
    }

    fn lookup<'r>(&self, row: &'r StringRecord, field: Field) -> (Fallback, Option<&'r str>) {
        match self.indices.iter().find(|(spec, _)| spec.field == field) {
            Some((spec, idx)) => (spec.fallback, idx.and_then(|i| row.get(i)).map(str::trim)),
            None => (Fallback::SkipRow, None),
        }
    }

    fn number(&self, row: &StringRecord, field: Field, defaulted: &mut usize) -> f64 {
        let (fallback, value) = self.lookup(row, field);
        let default = match fallback {
            Fallback::Number(n) => n,
            _ => 0.0,
        };
        match value {
            None => default,
            Some(value) => match value.parse::<f64>() {
                Ok(v) if v.is_finite() => v,
                _ => {
                    *defaulted += 1;
                    default
                }
            },
        }
    }

    fn label(&self, row: &StringRecord, field: Field) -> String {
        match self.lookup(row, field) {
            (_, Some(value)) if !value.is_empty() => value.to_string(),
            (Fallback::Label(label), _) => label.to_string(),
            _ => String::new(),
        }
    }

    fn build_record(&self, row: &StringRecord, defaulted: &mut usize) -> Option<HourlyRecord> {
        let date = self.lookup(row, Field::Date).1.and_then(parse_date)?;

        let hour = self.number(row, Field::Hour, defaulted);
        if !(0.0..=23.0).contains(&hour) || hour.fract() != 0.0 {
            return None;
        }

        let rides = self.number(row, Field::RentedBikeCount, defaulted);
        let rides = if rides < 0.0 {
            *defaulted += 1;
            0
        } else {
            rides.trunc().min(u32::MAX as f64) as u32
        };

        Some(HourlyRecord {
            date,
            hour: hour as u8,
            rented_bike_count: rides,
            temperature_c: self.number(row, Field::TemperatureC, defaulted),
            humidity_pct: self.number(row, Field::HumidityPct, defaulted),
            windspeed_ms: self.number(row, Field::WindspeedMs, defaulted),
            visibility_10m: self.number(row, Field::Visibility10m, defaulted),
            dew_point_c: self.number(row, Field::DewPointC, defaulted),
            solar_radiation_mj_m2: self.number(row, Field::SolarRadiation, defaulted),
            rainfall_mm: self.number(row, Field::RainfallMm, defaulted),
            snowfall_cm: self.number(row, Field::SnowfallCm, defaulted),
            seasons: self.label(row, Field::Seasons),
            holiday: self.label(row, Field::Holiday),
            functioning_day: self.label(row, Field::FunctioningDay),
        })
    }
}

pub fn parse_date(value: &str) -> Option<NaiveDate> {
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(value.trim(), fmt).ok())
}
