//! Trust predicate over a navigation timing snapshot.

use regex_lite::Regex;

use crate::error::{TimingError, TimingResult};
use crate::raw::{RawTiming, TimingMarker};

/// User agents whose timing implementation reports inaccurate values.
///
/// No feature test can detect the defect, so these are matched by version.
pub const DEFAULT_BROKEN_BROWSERS: &[&str] = &[r"Firefox/4[12]\."];

/// Markers that must be non-increasing when walked in this order.
pub const COMPLIANCE_SEQUENCE: [TimingMarker; 10] = [
    TimingMarker::LoadEventEnd,
    TimingMarker::LoadEventStart,
    TimingMarker::DomContentLoadedEventEnd,
    TimingMarker::DomContentLoadedEventStart,
    TimingMarker::DomInteractive,
    TimingMarker::ResponseEnd,
    TimingMarker::ResponseStart,
    TimingMarker::RequestStart,
    TimingMarker::ConnectEnd,
    TimingMarker::ConnectStart,
];

/// Outcome of a compliance check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComplianceVerdict {
    /// The snapshot can be trusted
    Compliant,
    /// The host exposes no timing facility at all
    FacilityAbsent,
    /// The user agent is on the broken-browser list
    BrokenBrowser,
    /// A marker is missing, negative, or later than the phase after it
    OrderingViolation(TimingMarker),
}

impl ComplianceVerdict {
    /// Whether timing fields may be reported.
    pub fn is_compliant(self) -> bool {
        self == ComplianceVerdict::Compliant
    }
}

/// Decides whether a timing snapshot is trustworthy.
#[derive(Debug, Clone)]
pub struct ComplianceValidator {
    broken_browsers: Vec<Regex>,
}

impl Default for ComplianceValidator {
    fn default() -> Self {
        Self {
            broken_browsers: DEFAULT_BROKEN_BROWSERS
                .iter()
                .filter_map(|p| Regex::new(p).ok())
                .collect(),
        }
    }
}

impl ComplianceValidator {
    /// Create a validator with a custom broken-browser list.
    pub fn new<S: AsRef<str>>(patterns: &[S]) -> TimingResult<Self> {
        let broken_browsers = patterns
            .iter()
            .map(|p| {
                Regex::new(p.as_ref()).map_err(|e| TimingError::InvalidPattern {
                    pattern: p.as_ref().to_string(),
                    reason: e.to_string(),
                })
            })
            .collect::<TimingResult<Vec<_>>>()?;

        Ok(Self { broken_browsers })
    }

    /// Check a snapshot and report why it failed, if it did.
    pub fn check(&self, raw: Option<&RawTiming>, user_agent: &str) -> ComplianceVerdict {
        let Some(raw) = raw else {
            return ComplianceVerdict::FacilityAbsent;
        };

        if self.is_broken_browser(user_agent) {
            return ComplianceVerdict::BrokenBrowser;
        }

        let mut later: Option<i64> = None;
        for marker in COMPLIANCE_SEQUENCE {
            let Some(value) = raw.get(marker) else {
                return ComplianceVerdict::OrderingViolation(marker);
            };
            if value < 0 || later.is_some_and(|l| value > l) {
                return ComplianceVerdict::OrderingViolation(marker);
            }
            later = Some(value);
        }

        ComplianceVerdict::Compliant
    }

    /// Boolean form of [`check`](Self::check).
    pub fn is_compliant(&self, raw: Option<&RawTiming>, user_agent: &str) -> bool {
        self.check(raw, user_agent).is_compliant()
    }

    /// Whether the user agent matches a broken-browser pattern.
    pub fn is_broken_browser(&self, user_agent: &str) -> bool {
        self.broken_browsers.iter().any(|re| re.is_match(user_agent))
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Property: any non-negative, non-decreasing phase sequence is trusted
        #[test]
        fn ordered_sequence_is_compliant(mut values in prop::collection::vec(0i64..1_000_000, 10)) {
            values.sort_unstable_by(|a, b| b.cmp(a));
            let raw = COMPLIANCE_SEQUENCE
                .iter()
                .zip(&values)
                .fold(RawTiming::default(), |raw, (marker, value)| raw.with(*marker, *value));

            prop_assert!(ComplianceValidator::default().is_compliant(Some(&raw), "test"));
        }

        /// Property: an earlier phase stamped after a later one is never trusted
        #[test]
        fn inverted_pair_is_not_compliant(
            mut values in prop::collection::vec(0i64..1_000_000, 10),
            index in 0usize..9,
        ) {
            values.sort_unstable_by(|a, b| b.cmp(a));
            values[index + 1] = values[index] + 1;
            let raw = COMPLIANCE_SEQUENCE
                .iter()
                .zip(&values)
                .fold(RawTiming::default(), |raw, (marker, value)| raw.with(*marker, *value));

            prop_assert!(!ComplianceValidator::default().is_compliant(Some(&raw), "test"));
        }
    }
}
