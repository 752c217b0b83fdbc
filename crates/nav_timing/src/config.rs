//! Typed configuration.
//!
//! [`PageConfig`] is read once per invocation from whatever key/value store the
//! host page offers. Every consulted key lives in [`keys`]; a missing or
//! mistyped value reads as absent, never as an error.
//!
//! | key | effect |
//! |-----|--------|
//! | `samplingFactor` | admission probability `1/F`; non-numeric or `< 1` never admits |
//! | `isHttps` | copied to the event |
//! | `isAnon` | copied to the event |
//! | `isSpecialPage` | suppresses every page identity field |
//! | `pageId`, `namespaceId`, `revId`, `action`, `runtime` | page identity fields |
//! | `mobileMode` | emitted only when a string without `desktop` in it |

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;

use crate::compliance::DEFAULT_BROKEN_BROWSERS;
use crate::raw::numeric_ms;

/// Configuration keys consulted on the host page.
pub mod keys {
    pub const SAMPLING_FACTOR: &str = "samplingFactor";
    pub const IS_HTTPS: &str = "isHttps";
    pub const IS_ANON: &str = "isAnon";
    pub const IS_SPECIAL_PAGE: &str = "isSpecialPage";
    pub const PAGE_ID: &str = "pageId";
    pub const NAMESPACE_ID: &str = "namespaceId";
    pub const REV_ID: &str = "revId";
    pub const ACTION: &str = "action";
    pub const RUNTIME: &str = "runtime";
    pub const MOBILE_MODE: &str = "mobileMode";
}

/// Opaque key/value lookup supplied by the host.
pub trait ConfigSource {
    /// Look up a key.
    fn get(&self, key: &str) -> Option<&Value>;
}

impl ConfigSource for Map<String, Value> {
    fn get(&self, key: &str) -> Option<&Value> {
        Map::get(self, key)
    }
}

impl ConfigSource for HashMap<String, Value> {
    fn get(&self, key: &str) -> Option<&Value> {
        HashMap::get(self, key)
    }
}

impl ConfigSource for Value {
    fn get(&self, key: &str) -> Option<&Value> {
        self.as_object().and_then(|map| map.get(key))
    }
}

/// Per-page configuration consulted by the sampling gate and the
/// application context collector.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageConfig {
    /// Sampling divisor; `None` when missing or non-numeric
    pub sampling_factor: Option<f64>,
    /// Page was served over HTTPS
    pub is_https: bool,
    /// Viewer is not logged in
    pub is_anon: bool,
    /// Page is special/virtual and carries placeholder identity values
    pub is_special_page: bool,
    pub page_id: Option<i64>,
    pub namespace_id: Option<i64>,
    pub rev_id: Option<i64>,
    pub action: Option<String>,
    /// Server runtime label
    pub runtime: Option<String>,
    /// Raw mode value; kept untyped so non-string values can be told apart
    pub mobile_mode: Option<Value>,
}

impl PageConfig {
    /// Read every consulted key from a host lookup.
    pub fn from_source<C: ConfigSource + ?Sized>(source: &C) -> Self {
        Self {
            sampling_factor: source
                .get(keys::SAMPLING_FACTOR)
                .and_then(Value::as_f64)
                .filter(|f| f.is_finite()),
            is_https: flag(source, keys::IS_HTTPS),
            is_anon: flag(source, keys::IS_ANON),
            is_special_page: flag(source, keys::IS_SPECIAL_PAGE),
            page_id: source.get(keys::PAGE_ID).and_then(numeric_ms),
            namespace_id: source.get(keys::NAMESPACE_ID).and_then(numeric_ms),
            rev_id: source.get(keys::REV_ID).and_then(numeric_ms),
            action: string(source, keys::ACTION),
            runtime: string(source, keys::RUNTIME),
            mobile_mode: source.get(keys::MOBILE_MODE).filter(|v| !v.is_null()).cloned(),
        }
    }

    /// Set the sampling factor.
    pub fn with_sampling_factor(mut self, factor: f64) -> Self {
        self.sampling_factor = Some(factor);
        self
    }

    /// Mark the page as special/virtual.
    pub fn with_special_page(mut self, special: bool) -> Self {
        self.is_special_page = special;
        self
    }

    /// Set the server runtime label.
    pub fn with_runtime(mut self, runtime: &str) -> Self {
        self.runtime = Some(runtime.to_string());
        self
    }
}

fn flag<C: ConfigSource + ?Sized>(source: &C, key: &str) -> bool {
    source.get(key).and_then(Value::as_bool).unwrap_or(false)
}

fn string<C: ConfigSource + ?Sized>(source: &C, key: &str) -> Option<String> {
    source.get(key).and_then(Value::as_str).map(str::to_string)
}

/// Configuration for a [`crate::TimingReporter`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReporterConfig {
    /// User-agent patterns whose timing data is never trusted
    pub broken_browser_patterns: Vec<String>,
    /// Seed for the sampling RNG; entropy-seeded when `None`
    pub seed: Option<u64>,
}

impl Default for ReporterConfig {
    fn default() -> Self {
        Self {
            broken_browser_patterns: DEFAULT_BROKEN_BROWSERS
                .iter()
                .map(|p| p.to_string())
                .collect(),
            seed: None,
        }
    }
}

impl ReporterConfig {
    /// Create a config with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the broken-browser patterns.
    pub fn with_broken_browsers(mut self, patterns: &[&str]) -> Self {
        self.broken_browser_patterns = patterns.iter().map(|p| p.to_string()).collect();
        self
    }

    /// Seed the sampling RNG for reproducible runs.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }
}
