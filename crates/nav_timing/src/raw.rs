//! Raw navigation timing snapshot as exposed by the host browser.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// How the page was reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "u16", into = "u16")]
pub enum NavigationType {
    /// Link, bookmark, form submission or typed URL
    #[default]
    Navigate,
    /// Reload of the current page
    Reload,
    /// History traversal
    BackForward,
    /// Any other value, including prerender
    Reserved,
}

impl NavigationType {
    /// Whether this is a plain, direct navigation.
    pub fn is_plain(self) -> bool {
        self == NavigationType::Navigate
    }
}

impl From<u16> for NavigationType {
    fn from(value: u16) -> Self {
        match value {
            0 => NavigationType::Navigate,
            1 => NavigationType::Reload,
            2 => NavigationType::BackForward,
            _ => NavigationType::Reserved,
        }
    }
}

impl From<NavigationType> for u16 {
    fn from(value: NavigationType) -> Self {
        match value {
            NavigationType::Navigate => 0,
            NavigationType::Reload => 1,
            NavigationType::BackForward => 2,
            NavigationType::Reserved => 255,
        }
    }
}

/// Named absolute timestamps in a [`RawTiming`] snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimingMarker {
    NavigationStart,
    FetchStart,
    DomainLookupStart,
    DomainLookupEnd,
    ConnectStart,
    ConnectEnd,
    SecureConnectionStart,
    RequestStart,
    ResponseStart,
    ResponseEnd,
    DomInteractive,
    DomContentLoadedEventStart,
    DomContentLoadedEventEnd,
    DomComplete,
    LoadEventStart,
    LoadEventEnd,
    RedirectStart,
    RedirectEnd,
}

impl TimingMarker {
    /// Field name used in serialized timing records and events.
    pub fn name(self) -> &'static str {
        match self {
            TimingMarker::NavigationStart => "navigationStart",
            TimingMarker::FetchStart => "fetchStart",
            TimingMarker::DomainLookupStart => "domainLookupStart",
            TimingMarker::DomainLookupEnd => "domainLookupEnd",
            TimingMarker::ConnectStart => "connectStart",
            TimingMarker::ConnectEnd => "connectEnd",
            TimingMarker::SecureConnectionStart => "secureConnectionStart",
            TimingMarker::RequestStart => "requestStart",
            TimingMarker::ResponseStart => "responseStart",
            TimingMarker::ResponseEnd => "responseEnd",
            TimingMarker::DomInteractive => "domInteractive",
            TimingMarker::DomContentLoadedEventStart => "domContentLoadedEventStart",
            TimingMarker::DomContentLoadedEventEnd => "domContentLoadedEventEnd",
            TimingMarker::DomComplete => "domComplete",
            TimingMarker::LoadEventStart => "loadEventStart",
            TimingMarker::LoadEventEnd => "loadEventEnd",
            TimingMarker::RedirectStart => "redirectStart",
            TimingMarker::RedirectEnd => "redirectEnd",
        }
    }
}

impl std::fmt::Display for TimingMarker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Immutable snapshot of the host's navigation timing facility.
///
/// Timestamps are milliseconds since an epoch chosen by the host. A field is
/// `None` when the host did not expose it or exposed something that is not a
/// finite number; the snapshot is deserialized leniently so that one bad field
/// never discards the rest.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawTiming {
    #[serde(deserialize_with = "lenient_ms", skip_serializing_if = "Option::is_none")]
    pub navigation_start: Option<i64>,
    #[serde(deserialize_with = "lenient_ms", skip_serializing_if = "Option::is_none")]
    pub fetch_start: Option<i64>,
    #[serde(deserialize_with = "lenient_ms", skip_serializing_if = "Option::is_none")]
    pub domain_lookup_start: Option<i64>,
    #[serde(deserialize_with = "lenient_ms", skip_serializing_if = "Option::is_none")]
    pub domain_lookup_end: Option<i64>,
    #[serde(deserialize_with = "lenient_ms", skip_serializing_if = "Option::is_none")]
    pub connect_start: Option<i64>,
    #[serde(deserialize_with = "lenient_ms", skip_serializing_if = "Option::is_none")]
    pub connect_end: Option<i64>,
    #[serde(deserialize_with = "lenient_ms", skip_serializing_if = "Option::is_none")]
    pub secure_connection_start: Option<i64>,
    #[serde(deserialize_with = "lenient_ms", skip_serializing_if = "Option::is_none")]
    pub request_start: Option<i64>,
    #[serde(deserialize_with = "lenient_ms", skip_serializing_if = "Option::is_none")]
    pub response_start: Option<i64>,
    #[serde(deserialize_with = "lenient_ms", skip_serializing_if = "Option::is_none")]
    pub response_end: Option<i64>,
    #[serde(deserialize_with = "lenient_ms", skip_serializing_if = "Option::is_none")]
    pub dom_interactive: Option<i64>,
    #[serde(deserialize_with = "lenient_ms", skip_serializing_if = "Option::is_none")]
    pub dom_content_loaded_event_start: Option<i64>,
    #[serde(deserialize_with = "lenient_ms", skip_serializing_if = "Option::is_none")]
    pub dom_content_loaded_event_end: Option<i64>,
    #[serde(deserialize_with = "lenient_ms", skip_serializing_if = "Option::is_none")]
    pub dom_complete: Option<i64>,
    #[serde(deserialize_with = "lenient_ms", skip_serializing_if = "Option::is_none")]
    pub load_event_start: Option<i64>,
    #[serde(deserialize_with = "lenient_ms", skip_serializing_if = "Option::is_none")]
    pub load_event_end: Option<i64>,
    #[serde(deserialize_with = "lenient_ms", skip_serializing_if = "Option::is_none")]
    pub redirect_start: Option<i64>,
    #[serde(deserialize_with = "lenient_ms", skip_serializing_if = "Option::is_none")]
    pub redirect_end: Option<i64>,
    /// Number of redirects since the last non-redirect navigation
    #[serde(deserialize_with = "lenient_count", skip_serializing_if = "Option::is_none")]
    pub redirect_count: Option<u32>,
    /// Navigation type enumerator
    pub navigation_type: NavigationType,
}

impl RawTiming {
    /// Read a marker's absolute timestamp.
    pub fn get(&self, marker: TimingMarker) -> Option<i64> {
        match marker {
            TimingMarker::NavigationStart => self.navigation_start,
            TimingMarker::FetchStart => self.fetch_start,
            TimingMarker::DomainLookupStart => self.domain_lookup_start,
            TimingMarker::DomainLookupEnd => self.domain_lookup_end,
            TimingMarker::ConnectStart => self.connect_start,
            TimingMarker::ConnectEnd => self.connect_end,
            TimingMarker::SecureConnectionStart => self.secure_connection_start,
            TimingMarker::RequestStart => self.request_start,
            TimingMarker::ResponseStart => self.response_start,
            TimingMarker::ResponseEnd => self.response_end,
            TimingMarker::DomInteractive => self.dom_interactive,
            TimingMarker::DomContentLoadedEventStart => self.dom_content_loaded_event_start,
            TimingMarker::DomContentLoadedEventEnd => self.dom_content_loaded_event_end,
            TimingMarker::DomComplete => self.dom_complete,
            TimingMarker::LoadEventStart => self.load_event_start,
            TimingMarker::LoadEventEnd => self.load_event_end,
            TimingMarker::RedirectStart => self.redirect_start,
            TimingMarker::RedirectEnd => self.redirect_end,
        }
    }

    /// Builder-style setter, mostly for tests and fixtures.
    pub fn with(mut self, marker: TimingMarker, value: i64) -> Self {
        let slot = match marker {
            TimingMarker::NavigationStart => &mut self.navigation_start,
            TimingMarker::FetchStart => &mut self.fetch_start,
            TimingMarker::DomainLookupStart => &mut self.domain_lookup_start,
            TimingMarker::DomainLookupEnd => &mut self.domain_lookup_end,
            TimingMarker::ConnectStart => &mut self.connect_start,
            TimingMarker::ConnectEnd => &mut self.connect_end,
            TimingMarker::SecureConnectionStart => &mut self.secure_connection_start,
            TimingMarker::RequestStart => &mut self.request_start,
            TimingMarker::ResponseStart => &mut self.response_start,
            TimingMarker::ResponseEnd => &mut self.response_end,
            TimingMarker::DomInteractive => &mut self.dom_interactive,
            TimingMarker::DomContentLoadedEventStart => &mut self.dom_content_loaded_event_start,
            TimingMarker::DomContentLoadedEventEnd => &mut self.dom_content_loaded_event_end,
            TimingMarker::DomComplete => &mut self.dom_complete,
            TimingMarker::LoadEventStart => &mut self.load_event_start,
            TimingMarker::LoadEventEnd => &mut self.load_event_end,
            TimingMarker::RedirectStart => &mut self.redirect_start,
            TimingMarker::RedirectEnd => &mut self.redirect_end,
        };
        *slot = Some(value);
        self
    }

    /// Set the navigation type.
    pub fn with_navigation_type(mut self, navigation_type: NavigationType) -> Self {
        self.navigation_type = navigation_type;
        self
    }

    /// Set the redirect counter.
    pub fn with_redirect_count(mut self, count: u32) -> Self {
        self.redirect_count = Some(count);
        self
    }
}

/// Interpret a JSON value as an integer millisecond timestamp.
///
/// Fractional values are floored; strings, booleans, null and non-finite
/// numbers yield `None`.
pub(crate) fn numeric_ms(value: &Value) -> Option<i64> {
    if let Some(v) = value.as_i64() {
        return Some(v);
    }
    value
        .as_f64()
        .filter(|v| v.is_finite())
        .map(|v| v.floor() as i64)
}

fn lenient_ms<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(numeric_ms(&value))
}

fn lenient_count<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(numeric_ms(&value).and_then(|v| u32::try_from(v).ok()))
}
