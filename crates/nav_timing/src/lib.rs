//! Navigation Timing
//!
//! This crate turns one snapshot of browser-exposed timing counters into one
//! well-formed event per page view, plus an optional event per saved edit:
//!
//! - A compliance check decides whether the timing data can be trusted
//! - A normalizer converts absolute timestamps into durations from an origin
//! - Vendor paint facilities are detected once and mapped to first-paint fields
//! - Page identity and context fields are collected from typed configuration
//! - A sampling gate admits one page view in `F`
//!
//! Nothing in the pipeline fails: missing facilities and malformed values only
//! make the event smaller.
//!
//! # Example
//!
//! ```rust
//! use nav_timing::{
//!     PageConfig, PageEnvironment, RawTiming, RecordingSink, ReporterConfig, TimingMarker,
//!     TimingReporter,
//! };
//!
//! let config = PageConfig::from_source(&serde_json::json!({
//!     "samplingFactor": 1,
//!     "isHttps": true,
//!     "pageId": 42,
//! }));
//!
//! let timing = RawTiming::default()
//!     .with(TimingMarker::NavigationStart, 100)
//!     .with(TimingMarker::ResponseStart, 300);
//! let env = PageEnvironment::new("Mozilla/5.0").with_timing(timing);
//!
//! let mut reporter = TimingReporter::new(ReporterConfig::new(), RecordingSink::new()).unwrap();
//! reporter.on_page_load(&config, &env);
//!
//! assert_eq!(reporter.sink().events().len(), 1);
//! ```
//!
//! # Modules
//!
//! - [`compliance`] - Trust predicate over a timing snapshot
//! - [`normalize`] - Relative durations from absolute timestamps
//! - [`paint`] - First-paint detection and mapping
//! - [`config`] - Typed page and reporter configuration

mod assemble;
pub mod compliance;
pub mod config;
mod context;
mod environment;
mod error;
mod event;
pub mod normalize;
pub mod paint;
mod raw;
mod reporter;
mod sampling;
mod transport;

pub use assemble::EventAssembler;
pub use compliance::{ComplianceValidator, ComplianceVerdict};
pub use config::{ConfigSource, PageConfig, ReporterConfig};
pub use context::{collect_app_context, ApplicationContext};
pub use environment::{Clock, FixedClock, GeoHint, PageEnvironment, WallClock};
pub use error::{ProbeError, TimingError, TimingResult};
pub use event::{NavigationEvent, SaveEvent, Schema, TimingEvent};
pub use normalize::{normalize, NormalizedTiming};
pub use paint::{LoadTimes, PaintProbe, PaintSource, PaintTiming};
pub use raw::{NavigationType, RawTiming, TimingMarker};
pub use reporter::{ReporterStats, TimingReporter};
pub use sampling::SamplingGate;
pub use transport::{BeaconSink, EventSink, LoggedEvent, RecordingSink};
