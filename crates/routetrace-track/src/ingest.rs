//! Track ingestion from CSV and Excel uploads.
//!
//! Headers are matched after trimming whitespace. Rows whose coordinates,
//! accuracy or timestamp do not parse are dropped rather than failing the
//! whole upload.

use std::collections::HashSet;
use std::io::{Cursor, Read};

use calamine::{Data, DataType, Reader, Xlsx};
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use routetrace_core::{GpsFix, LatLng, Rep};

use crate::error::TrackError;

pub const REQUIRED_COLUMNS: [&str; 4] = ["Latitude", "Longitude", "Accuracy", "DateTime"];
const REP_ID_COLUMN: &str = "RepId";
const REP_NAME_COLUMN: &str = "RepName";

/// Layout used when rendering Excel date cells back to text.
const CELL_DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Month-first like the spreadsheet exports this was built for.
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
    "%m/%d/%Y %I:%M:%S %p",
    "%m/%d/%Y %I:%M %p",
];

/// Fixes in file order, plus the reps named in the file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Track {
    pub fixes: Vec<GpsFix>,
    /// Distinct `RepId`/`RepName` pairs in first-seen order. Empty unless
    /// both columns are present.
    pub reps: Vec<Rep>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackFormat {
    Csv,
    Xlsx,
}

impl TrackFormat {
    /// `.xlsx` (any case) is read as a workbook; everything else as CSV.
    #[must_use]
    pub fn from_file_name(name: &str) -> Self {
        if name.to_ascii_lowercase().ends_with(".xlsx") {
            Self::Xlsx
        } else {
            Self::Csv
        }
    }
}

/// Parse an uploaded track in the given format.
///
/// # Errors
///
/// See [`parse_track_csv`] and [`parse_track_xlsx`].
pub fn parse_track(bytes: &[u8], format: TrackFormat) -> Result<Track, TrackError> {
    match format {
        TrackFormat::Csv => parse_track_csv(bytes),
        TrackFormat::Xlsx => parse_track_xlsx(bytes),
    }
}

/// Parse a CSV track.
///
/// # Errors
///
/// - [`TrackError::MissingColumns`] if any of [`REQUIRED_COLUMNS`] is absent.
/// - [`TrackError::Csv`] if the file is not readable as CSV.
pub fn parse_track_csv<R: Read>(reader: R) -> Result<Track, TrackError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = csv_reader.headers()?.clone();
    let mut builder = TrackBuilder::new(&headers.iter().collect::<Vec<_>>())?;

    for record in csv_reader.records() {
        let record = record?;
        builder.push_row(&record.iter().collect::<Vec<_>>());
    }

    Ok(builder.finish())
}

/// Parse the first worksheet of an `.xlsx` workbook.
///
/// The first row holds the headers. Date cells are read as local date-times.
///
/// # Errors
///
/// - [`TrackError::Xlsx`] if the bytes are not a readable workbook.
/// - [`TrackError::EmptyWorkbook`] if it has no worksheet or no header row.
/// - [`TrackError::MissingColumns`] as for CSV.
pub fn parse_track_xlsx(bytes: &[u8]) -> Result<Track, TrackError> {
    let mut workbook: Xlsx<_> = Xlsx::new(Cursor::new(bytes))?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or(TrackError::EmptyWorkbook)??;

    let mut rows = range.rows();
    let header_cells: Vec<String> = rows
        .next()
        .ok_or(TrackError::EmptyWorkbook)?
        .iter()
        .map(|c| cell_text(c).trim().to_string())
        .collect();
    let headers: Vec<&str> = header_cells.iter().map(String::as_str).collect();
    let mut builder = TrackBuilder::new(&headers)?;

    for row in rows {
        let cells: Vec<String> = row.iter().map(cell_text).collect();
        builder.push_row(&cells.iter().map(|c| c.trim()).collect::<Vec<_>>());
    }

    Ok(builder.finish())
}

fn cell_text(cell: &Data) -> String {
    match cell {
        Data::DateTime(_) | Data::DateTimeIso(_) => cell
            .as_datetime()
            .map(|dt| dt.format(CELL_DATETIME_FORMAT).to_string())
            .unwrap_or_default(),
        Data::Empty | Data::Error(_) => String::new(),
        other => other.to_string(),
    }
}

/// Column positions resolved from the header row.
struct Columns {
    required: [usize; 4],
    rep_id: Option<usize>,
    rep_name: Option<usize>,
}

impl Columns {
    fn resolve(headers: &[&str]) -> Result<Self, TrackError> {
        let index_of = |name: &str| headers.iter().position(|h| *h == name);

        let missing: Vec<String> = REQUIRED_COLUMNS
            .iter()
            .copied()
            .filter(|c| index_of(c).is_none())
            .map(str::to_string)
            .collect();
        if !missing.is_empty() {
            return Err(TrackError::MissingColumns(missing));
        }

        Ok(Self {
            // Presence checked above.
            required: REQUIRED_COLUMNS.map(|c| index_of(c).unwrap_or_default()),
            rep_id: index_of(REP_ID_COLUMN),
            rep_name: index_of(REP_NAME_COLUMN),
        })
    }
}

struct TrackBuilder {
    columns: Columns,
    track: Track,
    seen_reps: HashSet<Rep>,
    dropped: usize,
}

impl TrackBuilder {
    fn new(headers: &[&str]) -> Result<Self, TrackError> {
        Ok(Self {
            columns: Columns::resolve(headers)?,
            track: Track::default(),
            seen_reps: HashSet::new(),
            dropped: 0,
        })
    }

    fn push_row(&mut self, cells: &[&str]) {
        let field = |idx: usize| cells.get(idx).copied().unwrap_or("");
        let rep_id = self
            .columns
            .rep_id
            .map(field)
            .filter(|id| !id.is_empty());

        if let (Some(id), Some(name_idx)) = (rep_id, self.columns.rep_name) {
            let name = field(name_idx);
            if !name.is_empty() {
                let rep = Rep {
                    id: id.to_string(),
                    name: name.to_string(),
                };
                if self.seen_reps.insert(rep.clone()) {
                    self.track.reps.push(rep);
                }
            }
        }

        match parse_fix(field, self.columns.required) {
            Some(mut fix) => {
                fix.rep_id = rep_id.map(str::to_string);
                self.track.fixes.push(fix);
            }
            None => self.dropped += 1,
        }
    }

    fn finish(self) -> Track {
        if self.dropped > 0 {
            tracing::debug!(
                dropped = self.dropped,
                kept = self.track.fixes.len(),
                "dropped unparseable track rows"
            );
        }
        self.track
    }
}

/// `columns` holds the indices of latitude, longitude, accuracy and timestamp.
fn parse_fix<'a>(field: impl Fn(usize) -> &'a str, columns: [usize; 4]) -> Option<GpsFix> {
    let [lat_idx, lng_idx, acc_idx, ts_idx] = columns;

    let position = LatLng::new(
        field(lat_idx).parse::<f64>().ok()?,
        field(lng_idx).parse::<f64>().ok()?,
    );
    let accuracy_m = field(acc_idx).parse::<f64>().ok()?;
    let recorded_at = parse_timestamp(field(ts_idx))?;

    (position.is_valid() && accuracy_m.is_finite()).then_some(GpsFix {
        position,
        accuracy_m,
        recorded_at,
        rep_id: None,
    })
}

/// Parse a timestamp in any of the accepted layouts.
///
/// Offset-carrying RFC 3339 values keep their local wall-clock time.
#[must_use]
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.naive_local());
    }

    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}
