//! Turns an uploaded event log file into an [`EventLog`].

use crate::error::LogError;
use crate::timestamp::parse_timestamp;
use crate::types::log::extension_of;
use crate::types::{EventLog, EventRecord, LogFormat};
use crate::xes::read_xes;
use csv::StringRecord;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

pub const CASE_ID_COLUMN: &str = "case_id";
pub const ACTIVITY_COLUMN: &str = "activity";
pub const TIMESTAMP_COLUMN: &str = "timestamp";
pub const RESOURCE_COLUMN: &str = "resource";

pub const REQUIRED_COLUMNS: [&str; 3] = [CASE_ID_COLUMN, ACTIVITY_COLUMN, TIMESTAMP_COLUMN];

/// Reads the file at `path`, choosing the format from `original_filename`
/// since the stored copy may carry a different name.
pub fn load_event_log(path: &Path, original_filename: &str) -> Result<EventLog, LogError> {
    let Some(format) = LogFormat::from_filename(original_filename) else {
        return Err(LogError::UnsupportedFormat {
            extension: extension_of(original_filename).unwrap_or_default(),
        });
    };
    let file = File::open(path).map_err(|err| LogError::Io {
        reason: err.to_string(),
    })?;
    match format {
        LogFormat::Csv => read_csv(file),
        LogFormat::Xes => read_xes(BufReader::new(file)),
    }
}

struct Columns {
    case_id: usize,
    activity: usize,
    timestamp: usize,
    resource: Option<usize>,
}

impl Columns {
    fn locate(headers: &StringRecord) -> Result<Self, LogError> {
        let find = |name: &str| {
            headers
                .iter()
                .position(|header| header.trim_start_matches('\u{feff}').trim() == name)
        };
        match (
            find(CASE_ID_COLUMN),
            find(ACTIVITY_COLUMN),
            find(TIMESTAMP_COLUMN),
        ) {
            (Some(case_id), Some(activity), Some(timestamp)) => Ok(Self {
                case_id,
                activity,
                timestamp,
                resource: find(RESOURCE_COLUMN),
            }),
            (case_id, activity, timestamp) => {
                let missing = [
                    (CASE_ID_COLUMN, case_id),
                    (ACTIVITY_COLUMN, activity),
                    (TIMESTAMP_COLUMN, timestamp),
                ]
                .into_iter()
                .filter(|(_, position)| position.is_none())
                .map(|(name, _)| name.to_string())
                .collect();
                Err(LogError::MissingColumns { missing })
            }
        }
    }
}

pub fn read_csv<R: Read>(input: R) -> Result<EventLog, LogError> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(input);
    let headers = reader.headers().map_err(map_csv_error)?.clone();
    let columns = Columns::locate(&headers)?;

    let mut records = Vec::new();
    for (index, result) in reader.records().enumerate() {
        let row = index + 1;
        let record = result.map_err(map_csv_error)?;
        let case_id = required_field(&record, columns.case_id, row, CASE_ID_COLUMN)?;
        let activity = required_field(&record, columns.activity, row, ACTIVITY_COLUMN)?;
        let raw_timestamp = required_field(&record, columns.timestamp, row, TIMESTAMP_COLUMN)?;
        let timestamp =
            parse_timestamp(raw_timestamp).ok_or_else(|| LogError::InvalidTimestamp {
                row,
                value: raw_timestamp.to_string(),
            })?;
        let resource = columns
            .resource
            .and_then(|position| record.get(position))
            .filter(|value| !value.is_empty())
            .map(str::to_string);

        records.push(EventRecord {
            case_id: case_id.to_string(),
            activity: activity.to_string(),
            timestamp,
            resource,
        });
    }

    Ok(EventLog::from_records(records))
}

fn required_field<'r>(
    record: &'r StringRecord,
    position: usize,
    row: usize,
    column: &str,
) -> Result<&'r str, LogError> {
    record
        .get(position)
        .filter(|value| !value.is_empty())
        .ok_or_else(|| LogError::MissingValue {
            row,
            column: column.to_string(),
        })
}

fn map_csv_error(err: csv::Error) -> LogError {
    if err.is_io_error() {
        LogError::Io {
            reason: err.to_string(),
        }
    } else {
        LogError::Csv {
            reason: err.to_string(),
        }
    }
}
