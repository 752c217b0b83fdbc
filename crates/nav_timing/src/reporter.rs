//! Entry points the host calls on page-lifecycle signals.

use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::assemble::EventAssembler;
use crate::compliance::ComplianceValidator;
use crate::config::{PageConfig, ReporterConfig};
use crate::environment::{Clock, PageEnvironment};
use crate::error::TimingResult;
use crate::event::TimingEvent;
use crate::sampling::SamplingGate;
use crate::transport::EventSink;

/// Counters kept across invocations.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReporterStats {
    /// Navigation events handed to the sink
    pub navigation_events: u64,
    /// Save events handed to the sink
    pub save_events: u64,
    /// Page views rejected by the sampling gate
    pub sampled_out: u64,
    /// Post-edit signals that produced no event
    pub saves_suppressed: u64,
}

/// Runs the pipeline for lifecycle signals and logs the results.
///
/// Each call assembles from its own snapshot; nothing but counters is kept
/// between calls, and the two entry points are independent of each other.
#[derive(Debug)]
pub struct TimingReporter<S: EventSink> {
    assembler: EventAssembler,
    sink: S,
    rng: StdRng,
    stats: ReporterStats,
}

impl<S: EventSink> TimingReporter<S> {
    /// Create a reporter logging to `sink`.
    pub fn new(config: ReporterConfig, sink: S) -> TimingResult<Self> {
        let validator = ComplianceValidator::new(config.broken_browser_patterns.as_slice())?;
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        Ok(Self {
            assembler: EventAssembler::new(validator),
            sink,
            rng,
            stats: ReporterStats::default(),
        })
    }

    /// Replace the fallback clock used when the host offers none.
    pub fn with_clock(mut self, clock: Box<dyn Clock>) -> Self {
        self.assembler = self.assembler.with_clock(clock);
        self
    }

    /// Handle the page-load completion signal.
    ///
    /// Returns whether a navigation event was logged.
    pub fn on_page_load(&mut self, config: &PageConfig, env: &PageEnvironment) -> bool {
        let gate = SamplingGate::from_config(config);
        if !gate.admits(&mut self.rng) {
            self.stats.sampled_out += 1;
            tracing::trace!("page view not sampled (p = {})", gate.probability());
            return false;
        }

        let event = self.assembler.navigation_event(config, env);
        tracing::debug!(has_timing = event.has_timing(), "logging navigation event");
        self.sink.log_event(TimingEvent::Navigation(event));
        self.stats.navigation_events += 1;
        true
    }

    /// Handle the post-edit signal.
    ///
    /// Not sampled. Returns whether a save event was logged.
    pub fn on_post_edit(&mut self, config: &PageConfig, env: &PageEnvironment) -> bool {
        match self.assembler.save_event(config, env) {
            Some(event) => {
                tracing::debug!(save_timing = event.save_timing, "logging save event");
                self.sink.log_event(TimingEvent::Save(event));
                self.stats.save_events += 1;
                true
            }
            None => {
                self.stats.saves_suppressed += 1;
                false
            }
        }
    }

    /// Get the counters.
    pub fn stats(&self) -> ReporterStats {
        self.stats
    }

    /// Get the sink.
    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Get the sink mutably.
    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    /// Consume the reporter, returning the sink.
    pub fn into_sink(self) -> S {
        self.sink
    }
}
