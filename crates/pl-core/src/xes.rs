//! Streaming reader for IEEE XES event logs.
//!
//! Only the standard extension keys this service needs are read:
//! `concept:name` on traces and events, `time:timestamp` and `org:resource`
//! on events. Everything else, including `<global>` defaults and nested
//! attribute containers, is skipped.

use crate::error::LogError;
use crate::timestamp::parse_timestamp;
use crate::types::{EventLog, EventRecord};
use chrono::{DateTime, Utc};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::io::BufRead;

const CONCEPT_NAME: &str = "concept:name";
const TIME_TIMESTAMP: &str = "time:timestamp";
const ORG_RESOURCE: &str = "org:resource";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Scope {
    Trace,
    Event,
    Other,
}

#[derive(Debug, Default)]
struct PendingEvent {
    activity: Option<String>,
    timestamp: Option<DateTime<Utc>>,
    resource: Option<String>,
}

#[derive(Debug)]
struct PendingTrace {
    position: usize,
    case_id: Option<String>,
    events: Vec<PendingEvent>,
}

#[derive(Debug, Default)]
struct XesBuilder {
    scopes: Vec<Scope>,
    trace: Option<PendingTrace>,
    event: Option<PendingEvent>,
    traces_seen: usize,
    records: Vec<EventRecord>,
}

impl XesBuilder {
    fn parent(&self) -> Option<Scope> {
        self.scopes.last().copied()
    }

    fn open(&mut self, element: &BytesStart<'_>) -> Result<(), LogError> {
        let scope = match element.local_name().as_ref() {
            b"trace" if self.trace.is_none() => {
                self.traces_seen += 1;
                self.trace = Some(PendingTrace {
                    position: self.traces_seen,
                    case_id: None,
                    events: Vec::new(),
                });
                Scope::Trace
            }
            b"event" if self.parent() == Some(Scope::Trace) => {
                self.event = Some(PendingEvent::default());
                Scope::Event
            }
            _ => {
                self.attribute(element)?;
                Scope::Other
            }
        };
        self.scopes.push(scope);
        Ok(())
    }

    fn close(&mut self) -> Result<(), LogError> {
        match self.scopes.pop() {
            Some(Scope::Event) => {
                if let (Some(event), Some(trace)) = (self.event.take(), self.trace.as_mut()) {
                    trace.events.push(event);
                }
                Ok(())
            }
            Some(Scope::Trace) => match self.trace.take() {
                Some(trace) => self.finish_trace(trace),
                None => Ok(()),
            },
            _ => Ok(()),
        }
    }

    fn empty(&mut self, element: &BytesStart<'_>) -> Result<(), LogError> {
        self.open(element)?;
        self.close()
    }

    fn attribute(&mut self, element: &BytesStart<'_>) -> Result<(), LogError> {
        let parent = self.parent();
        if !matches!(parent, Some(Scope::Trace | Scope::Event)) {
            return Ok(());
        }
        let kind = element.local_name();
        let (Some(key), Some(value)) = key_value(element)? else {
            return Ok(());
        };

        match (parent, kind.as_ref(), key.as_str()) {
            (Some(Scope::Trace), b"string", CONCEPT_NAME) => {
                if let Some(trace) = self.trace.as_mut() {
                    trace.case_id = Some(value);
                }
            }
            (Some(Scope::Event), b"string", CONCEPT_NAME) => {
                if let Some(event) = self.event.as_mut() {
                    event.activity = Some(value);
                }
            }
            (Some(Scope::Event), b"date", TIME_TIMESTAMP) => {
                let timestamp = parse_timestamp(&value).ok_or_else(|| LogError::Xes {
                    reason: format!("unparseable time:timestamp '{value}'"),
                })?;
                if let Some(event) = self.event.as_mut() {
                    event.timestamp = Some(timestamp);
                }
            }
            (Some(Scope::Event), b"string", ORG_RESOURCE) => {
                if let Some(event) = self.event.as_mut() {
                    event.resource = Some(value).filter(|value| !value.is_empty());
                }
            }
            _ => {}
        }
        Ok(())
    }

    fn finish_trace(&mut self, trace: PendingTrace) -> Result<(), LogError> {
        let case_id = trace
            .case_id
            .unwrap_or_else(|| trace.position.to_string());
        for (index, event) in trace.events.into_iter().enumerate() {
            let ordinal = index + 1;
            let activity = event.activity.ok_or_else(|| LogError::Xes {
                reason: format!("event {ordinal} of trace '{case_id}' has no {CONCEPT_NAME}"),
            })?;
            let timestamp = event.timestamp.ok_or_else(|| LogError::Xes {
                reason: format!("event {ordinal} of trace '{case_id}' has no {TIME_TIMESTAMP}"),
            })?;
            self.records.push(EventRecord {
                case_id: case_id.clone(),
                activity,
                timestamp,
                resource: event.resource,
            });
        }
        Ok(())
    }
}

fn key_value(element: &BytesStart<'_>) -> Result<(Option<String>, Option<String>), LogError> {
    let mut key = None;
    let mut value = None;
    for attr in element.attributes() {
        let attr = attr.map_err(|err| LogError::Xes {
            reason: err.to_string(),
        })?;
        let text = attr
            .unescape_value()
            .map_err(|err| LogError::Xes {
                reason: err.to_string(),
            })?
            .into_owned();
        match attr.key.as_ref() {
            b"key" => key = Some(text),
            b"value" => value = Some(text),
            _ => {}
        }
    }
    Ok((key, value))
}

pub fn read_xes<R: BufRead>(input: R) -> Result<EventLog, LogError> {
    let mut reader = Reader::from_reader(input);
    reader.config_mut().trim_text(true);

    let mut builder = XesBuilder::default();
    let mut buf = Vec::new();
    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(element)) => builder.open(&element)?,
            Ok(Event::Empty(element)) => builder.empty(&element)?,
            Ok(Event::End(_)) => builder.close()?,
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(err) => {
                return Err(LogError::Xes {
                    reason: format!("at byte {}: {err}", reader.buffer_position()),
                });
            }
        }
        buf.clear();
    }

    if builder.traces_seen == 0 {
        return Err(LogError::Xes {
            reason: "document contains no traces".to_string(),
        });
    }
    Ok(EventLog::from_records(builder.records))
}
