//! Hand-off of assembled events to the event-logging endpoint.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::error::TimingResult;
use crate::event::{Schema, TimingEvent};

/// Receiver of assembled events.
///
/// Fire-and-forget: the pipeline never observes whether logging succeeded.
pub trait EventSink {
    /// Log one event under its schema.
    fn log_event(&mut self, event: TimingEvent);
}

/// Sink that keeps every event in memory.
#[derive(Debug, Default)]
pub struct RecordingSink {
    events: Vec<TimingEvent>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Events logged so far, oldest first.
    pub fn events(&self) -> &[TimingEvent] {
        &self.events
    }

    /// Events logged under one schema.
    pub fn events_for(&self, schema: Schema) -> impl Iterator<Item = &TimingEvent> {
        self.events.iter().filter(move |e| e.schema() == schema)
    }

    /// Take ownership of logged events.
    pub fn take(&mut self) -> Vec<TimingEvent> {
        std::mem::take(&mut self.events)
    }
}

impl EventSink for RecordingSink {
    fn log_event(&mut self, event: TimingEvent) {
        self.events.push(event);
    }
}

/// Envelope sent to the endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LoggedEvent {
    /// Unique identifier for this event
    pub event_id: String,
    pub schema: Schema,
    /// When the event was handed off
    pub logged_at: DateTime<Utc>,
    /// Flat event object
    pub event: Value,
}

impl LoggedEvent {
    /// Wrap an assembled event.
    pub fn new(event: &TimingEvent) -> TimingResult<Self> {
        Ok(Self {
            event_id: Uuid::new_v4().to_string(),
            schema: event.schema(),
            logged_at: Utc::now(),
            event: event.to_value()?,
        })
    }

    /// JSON body for the endpoint.
    pub fn to_body(&self) -> TimingResult<String> {
        Ok(serde_json::to_string(self)?)
    }
}

/// Sink that hands each event to the event-logging endpoint exactly once.
///
/// Every event is wrapped in a [`LoggedEvent`], serialized, and passed to
/// `send` together with the endpoint. Nothing is kept afterwards: there is no
/// queue, no retry, and the outcome of `send` is never observed.
pub struct BeaconSink<F>
where
    F: FnMut(&str, &str),
{
    endpoint: String,
    send: F,
    sent_count: u64,
    dropped_count: u64,
}

impl<F> BeaconSink<F>
where
    F: FnMut(&str, &str),
{
    /// Create a sink posting to `endpoint` through `send`.
    pub fn new(endpoint: &str, send: F) -> Self {
        Self {
            endpoint: endpoint.to_string(),
            send,
            sent_count: 0,
            dropped_count: 0,
        }
    }

    /// Endpoint events are sent to.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Events handed to `send`.
    pub fn sent_count(&self) -> u64 {
        self.sent_count
    }

    /// Events that could not be serialized.
    pub fn dropped_count(&self) -> u64 {
        self.dropped_count
    }
}

impl<F> std::fmt::Debug for BeaconSink<F>
where
    F: FnMut(&str, &str),
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BeaconSink")
            .field("endpoint", &self.endpoint)
            .field("sent_count", &self.sent_count)
            .field("dropped_count", &self.dropped_count)
            .finish_non_exhaustive()
    }
}

impl<F> EventSink for BeaconSink<F>
where
    F: FnMut(&str, &str),
{
    fn log_event(&mut self, event: TimingEvent) {
        match LoggedEvent::new(&event).and_then(|logged| logged.to_body()) {
            Ok(body) => {
                (self.send)(&self.endpoint, &body);
                self.sent_count += 1;
            }
            Err(e) => {
                self.dropped_count += 1;
                tracing::warn!("Dropping {} event: {}", event.schema(), e);
            }
        }
    }
}
