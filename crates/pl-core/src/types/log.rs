use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::HashMap;
use std::path::Path;

pub const ALLOWED_EXTENSIONS: [&str; 2] = [".csv", ".xes"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Csv,
    Xes,
}

impl LogFormat {
    /// Picks the format from a filename's extension, ignoring case.
    pub fn from_filename(filename: &str) -> Option<Self> {
        match extension_of(filename).as_deref() {
            Some(".csv") => Some(Self::Csv),
            Some(".xes") => Some(Self::Xes),
            _ => None,
        }
    }

    pub fn allowed_list() -> String {
        ALLOWED_EXTENSIONS.join(", ")
    }
}

/// Lowercased extension including the leading dot.
pub fn extension_of(filename: &str) -> Option<String> {
    Path::new(filename)
        .extension()
        .and_then(|ext| ext.to_str())
        .filter(|ext| !ext.is_empty())
        .map(|ext| format!(".{}", ext.to_ascii_lowercase()))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventRecord {
    pub case_id: String,
    pub activity: String,
    pub timestamp: DateTime<Utc>,
    pub resource: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trace {
    pub case_id: String,
    pub events: Vec<EventRecord>,
}

impl Trace {
    pub fn activities(&self) -> impl Iterator<Item = &str> {
        self.events.iter().map(|event| event.activity.as_str())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventLog {
    traces: Vec<Trace>,
}

impl EventLog {
    /// Groups records into traces. Traces are ordered by case id (numeric ids
    /// compare numerically), events by timestamp with ties kept in input order.
    pub fn from_records(records: Vec<EventRecord>) -> Self {
        let mut by_case: HashMap<String, Vec<EventRecord>> = HashMap::new();
        for record in records {
            by_case.entry(record.case_id.clone()).or_default().push(record);
        }

        let mut traces: Vec<Trace> = by_case
            .into_iter()
            .map(|(case_id, mut events)| {
                events.sort_by_key(|event| event.timestamp);
                Trace { case_id, events }
            })
            .collect();
        traces.sort_by(|left, right| compare_case_ids(&left.case_id, &right.case_id));

        Self { traces }
    }

    pub fn traces(&self) -> &[Trace] {
        &self.traces
    }

    pub fn event_count(&self) -> usize {
        self.traces.iter().map(|trace| trace.events.len()).sum()
    }
}

fn compare_case_ids(left: &str, right: &str) -> Ordering {
    match (left.parse::<i64>(), right.parse::<i64>()) {
        (Ok(left), Ok(right)) => left.cmp(&right),
        (Ok(_), Err(_)) => Ordering::Less,
        (Err(_), Ok(_)) => Ordering::Greater,
        (Err(_), Err(_)) => left.cmp(right),
    }
}
