//! Assembly of navigation and save events from one page snapshot.

use crate::compliance::{ComplianceValidator, ComplianceVerdict};
use crate::config::PageConfig;
use crate::context::collect_app_context;
use crate::environment::{Clock, PageEnvironment, WallClock};
use crate::event::{NavigationEvent, SaveEvent};
use crate::normalize::normalize;
use crate::paint::PaintTiming;

/// Builds events from a page snapshot.
#[derive(Debug)]
pub struct EventAssembler {
    validator: ComplianceValidator,
    clock: Box<dyn Clock>,
}

impl Default for EventAssembler {
    fn default() -> Self {
        Self::new(ComplianceValidator::default())
    }
}

impl EventAssembler {
    /// Create an assembler that falls back to wall-clock time.
    pub fn new(validator: ComplianceValidator) -> Self {
        Self {
            validator,
            clock: Box::new(WallClock),
        }
    }

    /// Replace the fallback clock.
    pub fn with_clock(mut self, clock: Box<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Get the compliance validator.
    pub fn validator(&self) -> &ComplianceValidator {
        &self.validator
    }

    /// Whether navigation timing from this snapshot may be reported.
    fn timing_usable(&self, env: &PageEnvironment) -> bool {
        let verdict = self.validator.check(env.timing.as_ref(), &env.user_agent);
        if verdict != ComplianceVerdict::Compliant {
            tracing::debug!("navigation timing not trusted: {:?}", verdict);
            return false;
        }

        let navigation_type = env.timing.as_ref().map(|t| t.navigation_type);
        if !navigation_type.is_some_and(|t| t.is_plain()) {
            tracing::debug!("navigation type {:?} excluded", navigation_type);
            return false;
        }

        true
    }

    /// Build the page-load event.
    ///
    /// Timing fields are merged only for a compliant, plain navigation. Paint
    /// fields come from a separate facility and are always merged.
    pub fn navigation_event(&self, config: &PageConfig, env: &PageEnvironment) -> NavigationEvent {
        let mut event = NavigationEvent {
            context: collect_app_context(config, env, self.clock.as_ref()),
            ..Default::default()
        };

        if self.timing_usable(env) {
            if let Some(raw) = env.timing.as_ref() {
                event.timing = normalize(raw);
            }
        }

        event.paint = PaintTiming::from_source(env.paint);
        event
    }

    /// Build the post-edit event, if the snapshot supports one.
    pub fn save_event(&self, config: &PageConfig, env: &PageEnvironment) -> Option<SaveEvent> {
        if !self.timing_usable(env) {
            return None;
        }

        let raw = env.timing.as_ref()?;
        let navigation_start = raw.navigation_start.filter(|&v| v > 0)?;
        let response_start = raw.response_start?;

        Some(SaveEvent {
            save_timing: response_start - navigation_start,
            runtime: config.runtime.clone(),
        })
    }
}
