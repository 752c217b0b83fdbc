//! First-paint timing from vendor-specific browser facilities.
//!
//! Two non-standard facilities have existed, and a browser exposes at most one
//! of them. Detection runs once and yields a [`PaintSource`]; a single mapper
//! then turns that into [`PaintTiming`].

use serde::{Deserialize, Serialize};

use crate::error::ProbeError;

/// Paint timestamps reported by the seconds-resolution vendor facility.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadTimes {
    /// First paint, in seconds
    pub first_paint_time: f64,
    /// First paint after the load event, in seconds
    pub first_paint_after_load_time: f64,
}

/// Which paint facility the host exposed.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PaintSource {
    /// Neither facility is available
    #[default]
    None,
    /// Seconds-resolution load-times facility
    LoadTimes(LoadTimes),
    /// Millisecond first-paint field on the timing object
    MsFirstPaint(f64),
}

/// Host access to the vendor paint facilities.
pub trait PaintProbe {
    /// Read the load-times facility. Reading it may throw on hosts that
    /// half-implement it.
    fn load_times(&self) -> Result<Option<LoadTimes>, ProbeError>;

    /// Read the millisecond first-paint field.
    fn ms_first_paint(&self) -> Option<f64>;
}

impl PaintSource {
    /// Probe the host once. The load-times facility wins when both exist; a
    /// failing probe counts as absent.
    pub fn detect<P: PaintProbe + ?Sized>(probe: &P) -> Self {
        match probe.load_times() {
            Ok(Some(load_times)) => return PaintSource::LoadTimes(load_times),
            Ok(None) => {}
            Err(e) => tracing::trace!("load-times probe unavailable: {}", e),
        }

        match probe.ms_first_paint() {
            Some(ms) if ms != 0.0 => PaintSource::MsFirstPaint(ms),
            _ => PaintSource::None,
        }
    }
}

/// First-paint fields of an event.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaintTiming {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_paint: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_paint_after_load: Option<i64>,
}

impl PaintTiming {
    /// Map a detected source to paint fields.
    pub fn from_source(source: PaintSource) -> Self {
        match source {
            PaintSource::None => Self::default(),
            PaintSource::LoadTimes(lt) => Self {
                first_paint: seconds_to_ms(lt.first_paint_time),
                first_paint_after_load: seconds_to_ms(lt.first_paint_after_load_time),
            },
            PaintSource::MsFirstPaint(ms) => Self {
                first_paint: non_negative_ms(ms),
                first_paint_after_load: None,
            },
        }
    }

    /// Probe the host and map the result.
    pub fn extract<P: PaintProbe + ?Sized>(probe: &P) -> Self {
        Self::from_source(PaintSource::detect(probe))
    }

    /// Whether no paint field is present.
    pub fn is_empty(&self) -> bool {
        self.first_paint.is_none() && self.first_paint_after_load.is_none()
    }
}

fn seconds_to_ms(seconds: f64) -> Option<i64> {
    non_negative_ms(seconds * 1000.0)
}

fn non_negative_ms(ms: f64) -> Option<i64> {
    if ms.is_finite() && ms >= 0.0 {
        Some(ms.floor() as i64)
    } else {
        None
    }
}
