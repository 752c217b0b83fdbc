//! Event types handed to the event transport.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::context::ApplicationContext;
use crate::error::TimingResult;
use crate::normalize::NormalizedTiming;
use crate::paint::PaintTiming;

/// Event schema an event is logged under.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Schema {
    /// One event per sampled page view
    NavigationTiming,
    /// One event per completed edit
    SaveTiming,
}

impl Schema {
    /// Schema name as the transport expects it.
    pub fn as_str(self) -> &'static str {
        match self {
            Schema::NavigationTiming => "NavigationTiming",
            Schema::SaveTiming => "SaveTiming",
        }
    }
}

impl std::fmt::Display for Schema {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Page-load event: context, then timing, then paint fields, flattened into
/// one object.
///
/// The three parts use disjoint key sets, so flattening never overwrites.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct NavigationEvent {
    #[serde(flatten)]
    pub context: ApplicationContext,
    /// Empty unless the snapshot was compliant and a plain navigation
    #[serde(flatten)]
    pub timing: NormalizedTiming,
    #[serde(flatten)]
    pub paint: PaintTiming,
}

impl NavigationEvent {
    /// Whether any navigation timing field made it into the event.
    pub fn has_timing(&self) -> bool {
        !self.timing.is_empty()
    }
}

/// Post-edit event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveEvent {
    /// `responseStart - navigationStart` of the page shown after saving
    pub save_timing: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub runtime: Option<String>,
}

/// Any event the pipeline produces.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimingEvent {
    Navigation(NavigationEvent),
    Save(SaveEvent),
}

impl TimingEvent {
    /// Schema this event is logged under.
    pub fn schema(&self) -> Schema {
        match self {
            TimingEvent::Navigation(_) => Schema::NavigationTiming,
            TimingEvent::Save(_) => Schema::SaveTiming,
        }
    }

    /// Flat JSON object for the transport.
    pub fn to_value(&self) -> TimingResult<Value> {
        let value = match self {
            TimingEvent::Navigation(event) => serde_json::to_value(event)?,
            TimingEvent::Save(event) => serde_json::to_value(event)?,
        };
        Ok(value)
    }
}

impl From<NavigationEvent> for TimingEvent {
    fn from(event: NavigationEvent) -> Self {
        TimingEvent::Navigation(event)
    }
}

impl From<SaveEvent> for TimingEvent {
    fn from(event: SaveEvent) -> Self {
        TimingEvent::Save(event)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_schema_display() {
        assert_eq!(Schema::NavigationTiming.to_string(), "NavigationTiming");
        assert_eq!(Schema::SaveTiming.as_str(), "SaveTiming");
    }

    #[test]
    fn test_navigation_event_flattens() {
        let mut event = NavigationEvent::default();
        event.context.is_https = true;
        event.context.page_id = Some(7);
        event.timing.markers.insert("responseStart".to_string(), 200);
        event.timing.dns_lookup = Some(0);
        event.paint.first_paint = Some(350);

        let value = TimingEvent::from(event).to_value().unwrap();
        assert_eq!(
            value,
            json!({
                "isHttps": true,
                "isAnon": false,
                "pageId": 7,
                "responseStart": 200,
                "dnsLookup": 0,
                "firstPaint": 350
            })
        );
    }

    #[test]
    fn test_has_timing() {
        let mut event = NavigationEvent::default();
        assert!(!event.has_timing());

        event.timing.redirect_count = Some(0);
        assert!(event.has_timing());
    }

    #[test]
    fn test_save_event_value() {
        let event = TimingEvent::Save(SaveEvent {
            save_timing: 812,
            runtime: Some("HHVM".to_string()),
        });

        assert_eq!(event.schema(), Schema::SaveTiming);
        assert_eq!(
            event.to_value().unwrap(),
            json!({ "saveTiming": 812, "runtime": "HHVM" })
        );
    }

    #[test]
    fn test_schema_serialization() {
        let json = serde_json::to_string(&Schema::NavigationTiming).unwrap();
        assert_eq!(json, "\"NavigationTiming\"");
    }
}
