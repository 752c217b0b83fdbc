//! Conversion of absolute timestamps into durations relative to an origin.

use serde::Serialize;
use std::collections::BTreeMap;

use crate::raw::{RawTiming, TimingMarker};

/// Markers reported relative to the origin.
pub const NORMALIZED_MARKERS: [TimingMarker; 10] = [
    TimingMarker::ConnectEnd,
    TimingMarker::ConnectStart,
    TimingMarker::DomComplete,
    TimingMarker::DomInteractive,
    TimingMarker::FetchStart,
    TimingMarker::LoadEventEnd,
    TimingMarker::LoadEventStart,
    TimingMarker::RequestStart,
    TimingMarker::ResponseEnd,
    TimingMarker::ResponseStart,
];

/// Relative durations derived from a [`RawTiming`] snapshot.
///
/// Relative markers are strictly positive; a phase that starts exactly at the
/// origin is treated as not having happened and is omitted. The derived
/// durations below are not clamped: they may be zero or negative, and are
/// omitted when the difference does not fit in an `i64`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedTiming {
    /// Marker name to milliseconds since origin
    #[serde(flatten)]
    pub markers: BTreeMap<String, i64>,
    /// `domainLookupEnd - domainLookupStart`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dns_lookup: Option<i64>,
    /// `connectEnd - secureConnectionStart`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ssl_negotiation: Option<i64>,
    /// Host redirect counter, copied verbatim
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redirect_count: Option<u32>,
    /// `redirectEnd - redirectStart`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redirecting: Option<i64>,
}

impl NormalizedTiming {
    /// Relative value of a marker, if it was kept.
    pub fn get(&self, marker: TimingMarker) -> Option<i64> {
        self.markers.get(marker.name()).copied()
    }

    /// Whether no field at all was derived.
    pub fn is_empty(&self) -> bool {
        self.markers.is_empty()
            && self.dns_lookup.is_none()
            && self.ssl_negotiation.is_none()
            && self.redirect_count.is_none()
            && self.redirecting.is_none()
    }
}

/// Reference timestamp for relative durations.
///
/// Some hosts report a zero navigation start; fetch start stands in for it.
pub fn origin(raw: &RawTiming) -> Option<i64> {
    raw.navigation_start.filter(|&v| v > 0).or(raw.fetch_start)
}

/// Derive relative durations from a raw snapshot.
pub fn normalize(raw: &RawTiming) -> NormalizedTiming {
    let mut timing = NormalizedTiming::default();

    if let Some(origin) = origin(raw) {
        for marker in NORMALIZED_MARKERS {
            let relative = raw
                .get(marker)
                .and_then(|value| value.checked_sub(origin))
                .filter(|&v| v > 0);
            if let Some(relative) = relative {
                timing.markers.insert(marker.name().to_string(), relative);
            }
        }
    }

    if let Some(start) = truthy(raw.domain_lookup_start) {
        timing.dns_lookup = raw.domain_lookup_end.and_then(|end| end.checked_sub(start));
    }

    if let Some(start) = truthy(raw.secure_connection_start) {
        timing.ssl_negotiation = raw.connect_end.and_then(|end| end.checked_sub(start));
    }

    if let Some(start) = truthy(raw.redirect_start) {
        timing.redirect_count = raw.redirect_count;
        timing.redirecting = raw.redirect_end.and_then(|end| end.checked_sub(start));
    }

    timing
}

/// A zero timestamp means the phase did not occur.
fn truthy(value: Option<i64>) -> Option<i64> {
    value.filter(|&v| v != 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn first_view() -> RawTiming {
        RawTiming::default()
            .with(TimingMarker::NavigationStart, 100)
            .with(TimingMarker::FetchStart, 100)
            .with(TimingMarker::ConnectStart, 226)
            .with(TimingMarker::ConnectEnd, 250)
            .with(TimingMarker::RequestStart, 250)
            .with(TimingMarker::ResponseStart, 300)
            .with(TimingMarker::ResponseEnd, 400)
            .with(TimingMarker::DomComplete, 450)
            .with(TimingMarker::LoadEventStart, 570)
            .with(TimingMarker::LoadEventEnd, 575)
    }

    #[test]
    fn test_first_view() {
        let timing = normalize(&first_view());

        assert_eq!(timing.get(TimingMarker::ConnectStart), Some(126));
        assert_eq!(timing.get(TimingMarker::ConnectEnd), Some(150));
        assert_eq!(timing.get(TimingMarker::RequestStart), Some(150));
        assert_eq!(timing.get(TimingMarker::ResponseStart), Some(200));
        assert_eq!(timing.get(TimingMarker::ResponseEnd), Some(300));
        assert_eq!(timing.get(TimingMarker::DomComplete), Some(350));
        assert_eq!(timing.get(TimingMarker::LoadEventStart), Some(470));
        assert_eq!(timing.get(TimingMarker::LoadEventEnd), Some(475));
        // fetchStart equals the origin
        assert_eq!(timing.get(TimingMarker::FetchStart), None);
        assert_eq!(timing.get(TimingMarker::DomInteractive), None);
    }

    #[test]
    fn test_floor_excludes_zero_includes_one() {
        let raw = RawTiming::default()
            .with(TimingMarker::NavigationStart, 100)
            .with(TimingMarker::RequestStart, 100);
        assert_eq!(normalize(&raw).get(TimingMarker::RequestStart), None);

        let raw = raw.with(TimingMarker::RequestStart, 101);
        assert_eq!(normalize(&raw).get(TimingMarker::RequestStart), Some(1));
    }

    #[test]
    fn test_negative_relative_omitted() {
        let raw = RawTiming::default()
            .with(TimingMarker::NavigationStart, 100)
            .with(TimingMarker::ConnectStart, 0);
        assert_eq!(normalize(&raw).get(TimingMarker::ConnectStart), None);
    }

    #[test]
    fn test_origin_falls_back_to_fetch_start() {
        let raw = RawTiming::default()
            .with(TimingMarker::NavigationStart, 0)
            .with(TimingMarker::FetchStart, 100)
            .with(TimingMarker::ResponseStart, 300);

        assert_eq!(origin(&raw), Some(100));
        assert_eq!(normalize(&raw).get(TimingMarker::ResponseStart), Some(200));

        let mut raw = raw;
        raw.navigation_start = None;
        assert_eq!(origin(&raw), Some(100));
    }

    #[test]
    fn test_no_origin_no_markers() {
        let raw = RawTiming::default().with(TimingMarker::ResponseStart, 300);
        assert!(normalize(&raw).markers.is_empty());
    }

    #[test]
    fn test_repeat_view() {
        let raw = RawTiming::default()
            .with(TimingMarker::NavigationStart, 100)
            .with(TimingMarker::FetchStart, 100)
            .with(TimingMarker::DomainLookupStart, 100)
            .with(TimingMarker::DomainLookupEnd, 100)
            .with(TimingMarker::ConnectStart, 100)
            .with(TimingMarker::ConnectEnd, 100)
            .with(TimingMarker::SecureConnectionStart, 0)
            .with(TimingMarker::RequestStart, 110);

        let timing = normalize(&raw);
        assert_eq!(timing.dns_lookup, Some(0));
        assert_eq!(timing.get(TimingMarker::RequestStart), Some(10));
        assert_eq!(timing.get(TimingMarker::ConnectStart), None);
        assert_eq!(timing.get(TimingMarker::ConnectEnd), None);
        assert_eq!(timing.ssl_negotiation, None);
    }

    #[test]
    fn test_cached_dns_omitted() {
        let raw = RawTiming::default()
            .with(TimingMarker::NavigationStart, 100)
            .with(TimingMarker::DomainLookupStart, 0)
            .with(TimingMarker::DomainLookupEnd, 140);
        assert_eq!(normalize(&raw).dns_lookup, None);
    }

    #[test]
    fn test_dns_lookup_duration() {
        let raw = RawTiming::default()
            .with(TimingMarker::DomainLookupStart, 120)
            .with(TimingMarker::DomainLookupEnd, 145);
        assert_eq!(normalize(&raw).dns_lookup, Some(25));
    }

    #[test]
    fn test_ssl_negotiation() {
        let raw = RawTiming::default()
            .with(TimingMarker::SecureConnectionStart, 230)
            .with(TimingMarker::ConnectEnd, 250);
        assert_eq!(normalize(&raw).ssl_negotiation, Some(20));
    }

    #[test]
    fn test_redirect_fields() {
        let raw = RawTiming::default()
            .with(TimingMarker::RedirectStart, 10)
            .with(TimingMarker::RedirectEnd, 60)
            .with_redirect_count(2);

        let timing = normalize(&raw);
        assert_eq!(timing.redirect_count, Some(2));
        assert_eq!(timing.redirecting, Some(50));
    }

    #[test]
    fn test_no_redirect_start_no_redirect_fields() {
        let raw = RawTiming::default()
            .with(TimingMarker::RedirectStart, 0)
            .with(TimingMarker::RedirectEnd, 60)
            .with_redirect_count(3);

        let timing = normalize(&raw);
        assert_eq!(timing.redirect_count, None);
        assert_eq!(timing.redirecting, None);
        assert!(timing.is_empty());
    }

    #[test]
    fn test_overflowing_durations_omitted() {
        let raw: RawTiming = serde_json::from_value(serde_json::json!({
            "navigationStart": 100,
            "domainLookupStart": -1,
            "domainLookupEnd": 1e19,
            "secureConnectionStart": -1e19,
            "connectEnd": 10,
            "redirectStart": -5,
            "redirectEnd": 1e19,
            "redirectCount": 1
        }))
        .unwrap();

        let timing = normalize(&raw);
        assert_eq!(timing.dns_lookup, None);
        assert_eq!(timing.ssl_negotiation, None);
        assert_eq!(timing.redirecting, None);
        // The count only depends on a truthy redirectStart
        assert_eq!(timing.redirect_count, Some(1));
    }

    #[test]
    fn test_derived_durations_not_clamped() {
        let raw = RawTiming::default()
            .with(TimingMarker::DomainLookupStart, 200)
            .with(TimingMarker::DomainLookupEnd, 150)
            .with(TimingMarker::SecureConnectionStart, 260)
            .with(TimingMarker::ConnectEnd, 250);

        let timing = normalize(&raw);
        assert_eq!(timing.dns_lookup, Some(-50));
        assert_eq!(timing.ssl_negotiation, Some(-10));
    }

    #[test]
    fn test_serializes_flat() {
        let raw = RawTiming::default()
            .with(TimingMarker::NavigationStart, 100)
            .with(TimingMarker::ResponseStart, 300)
            .with(TimingMarker::DomainLookupStart, 110)
            .with(TimingMarker::DomainLookupEnd, 120);

        let json = serde_json::to_value(normalize(&raw)).unwrap();
        assert_eq!(json, serde_json::json!({ "responseStart": 200, "dnsLookup": 10 }));
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Property: every relative marker that survives is strictly positive
        #[test]
        fn relative_markers_are_positive(
            origin in 0i64..10_000,
            values in prop::collection::vec(prop::option::of(-10_000i64..20_000), 10),
        ) {
            let raw = NORMALIZED_MARKERS
                .iter()
                .zip(&values)
                .fold(
                    RawTiming::default().with(TimingMarker::NavigationStart, origin),
                    |raw, (marker, value)| match value {
                        Some(v) => raw.with(*marker, *v),
                        None => raw,
                    },
                );

            let timing = normalize(&raw);
            prop_assert!(timing.markers.values().all(|&v| v > 0));
        }
    }
}
