//! Identity and context fields that every navigation event carries.

use serde::Serialize;
use serde_json::Value;

use crate::config::PageConfig;
use crate::environment::{Clock, PageEnvironment};

/// Marker that identifies the desktop variant of the mode setting.
const DESKTOP_MODE_MARKER: &str = "desktop";

/// Base object of a navigation event.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationContext {
    pub is_https: bool,
    pub is_anon: bool,
    /// Milliseconds from the application load-start marker to now
    #[serde(skip_serializing_if = "Option::is_none")]
    pub app_load_complete: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub origin_country: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub namespace_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rev_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub runtime: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mobile_mode: Option<String>,
}

/// Collect context fields from page configuration and environment.
///
/// Special pages carry placeholder identity values, so none of the page
/// identity fields are emitted for them.
pub fn collect_app_context(
    config: &PageConfig,
    env: &PageEnvironment,
    clock: &dyn Clock,
) -> ApplicationContext {
    let mut context = ApplicationContext {
        is_https: config.is_https,
        is_anon: config.is_anon,
        ..Default::default()
    };

    if let Some(start) = env.load_start_ms.filter(|s| s.is_finite()) {
        let elapsed = (env.now_ms(clock) - start).round();
        if elapsed.is_finite() {
            context.app_load_complete = Some(elapsed as i64);
        }
    }

    context.origin_country = env
        .geo
        .as_ref()
        .and_then(|geo| geo.country.as_str())
        .map(str::to_string);

    if !config.is_special_page {
        context.page_id = config.page_id;
        context.namespace_id = config.namespace_id;
        context.rev_id = config.rev_id;
        context.action = config.action.clone();
        context.runtime = config.runtime.clone();
    }

    context.mobile_mode = config
        .mobile_mode
        .as_ref()
        .and_then(Value::as_str)
        .filter(|mode| !mode.contains(DESKTOP_MODE_MARKER))
        .map(str::to_string);

    context
}
