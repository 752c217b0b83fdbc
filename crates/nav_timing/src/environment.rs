//! Per-invocation snapshot of what the host page exposes.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt::Debug;

use crate::paint::PaintSource;
use crate::raw::RawTiming;

/// Source of the current time in milliseconds.
pub trait Clock: Debug + Send + Sync {
    /// Milliseconds since the Unix epoch (or the host's own epoch).
    fn now_ms(&self) -> f64;
}

/// Wall-clock time, used when the host offers no clock of its own.
#[derive(Debug, Clone, Copy, Default)]
pub struct WallClock;

impl Clock for WallClock {
    fn now_ms(&self) -> f64 {
        Utc::now().timestamp_millis() as f64
    }
}

/// A clock frozen at one instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub f64);

impl Clock for FixedClock {
    fn now_ms(&self) -> f64 {
        self.0
    }
}

/// Geolocation hint published by the host.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GeoHint {
    /// Country code; only a string value is reported
    #[serde(default)]
    pub country: Value,
}

impl GeoHint {
    /// Hint with a string country code.
    pub fn country(code: &str) -> Self {
        Self {
            country: Value::String(code.to_string()),
        }
    }
}

/// Everything the host exposes at the moment of invocation.
///
/// Built once by the host adapter; the pipeline only reads it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PageEnvironment {
    /// Browser user-agent string
    pub user_agent: String,
    /// Navigation timing snapshot; `None` when the facility is absent
    pub timing: Option<RawTiming>,
    /// Result of paint capability detection. Filled by the host adapter with
    /// [`PaintSource::detect`], so facility failures never reach the pipeline.
    pub paint: PaintSource,
    /// Geolocation hint, when the facility exists
    pub geo: Option<GeoHint>,
    /// Application load-start marker recorded earlier in the page lifecycle
    pub load_start_ms: Option<f64>,
    /// Current time read from the host's own clock, when it offers one
    pub host_now_ms: Option<f64>,
}

impl PageEnvironment {
    /// Create an environment for the given user agent.
    pub fn new(user_agent: &str) -> Self {
        Self {
            user_agent: user_agent.to_string(),
            ..Default::default()
        }
    }

    /// Attach a timing snapshot.
    pub fn with_timing(mut self, timing: RawTiming) -> Self {
        self.timing = Some(timing);
        self
    }

    /// Attach a detected paint source.
    pub fn with_paint(mut self, paint: PaintSource) -> Self {
        self.paint = paint;
        self
    }

    /// Attach a geolocation hint.
    pub fn with_geo(mut self, geo: GeoHint) -> Self {
        self.geo = Some(geo);
        self
    }

    /// Record the application load-start marker.
    pub fn with_load_start(mut self, load_start_ms: f64) -> Self {
        self.load_start_ms = Some(load_start_ms);
        self
    }

    /// Record a host clock reading.
    pub fn with_host_now(mut self, now_ms: f64) -> Self {
        self.host_now_ms = Some(now_ms);
        self
    }

    /// Current time, preferring the host clock over `fallback`.
    pub fn now_ms(&self, fallback: &dyn Clock) -> f64 {
        self.host_now_ms.unwrap_or_else(|| fallback.now_ms())
    }
}
