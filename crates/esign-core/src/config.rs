use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::errors::ConfigError;

/// Default outbound timeout when no layer sets one.
pub const DEFAULT_TIMEOUT_SECONDS: f64 = 30.0;

/// Partial provider configuration.
///
/// Every field is optional so the struct can describe one layer of a
/// multi-layer resolution (explicit overrides, per-request values,
/// process environment). `Some("")` is a deliberate override and must
/// win over lower layers; only `None` counts as absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProviderConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub root_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub integrator_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub account_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub app_token: Option<String>,
    /// Outbound call timeout, in seconds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout: Option<f64>,
}

impl ProviderConfig {
    /// Merge layers field-wise, highest priority first.
    ///
    /// For each field the first layer with a set value wins; lower
    /// layers are never consulted once a higher one has set the field,
    /// even to an empty string. Pure merge: no coercion, no validation.
    pub fn resolve(layers: &[&ProviderConfig]) -> ProviderConfig {
        fn pick<T: Clone>(
            layers: &[&ProviderConfig],
            field: impl Fn(&ProviderConfig) -> &Option<T>,
        ) -> Option<T> {
            layers.iter().find_map(|layer| field(layer).clone())
        }

        ProviderConfig {
            root_url: pick(layers, |c| &c.root_url),
            username: pick(layers, |c| &c.username),
            password: pick(layers, |c| &c.password),
            integrator_key: pick(layers, |c| &c.integrator_key),
            account_id: pick(layers, |c| &c.account_id),
            app_token: pick(layers, |c| &c.app_token),
            timeout: pick(layers, |c| &c.timeout),
        }
    }

    /// Build the process-wide default layer from `ESIGN_*` environment
    /// variables. Unset variables leave the field unset.
    pub fn from_env() -> ProviderConfig {
        fn var(name: &str) -> Option<String> {
            std::env::var(name).ok()
        }

        ProviderConfig {
            root_url: var("ESIGN_ROOT_URL"),
            username: var("ESIGN_USERNAME"),
            password: var("ESIGN_PASSWORD"),
            integrator_key: var("ESIGN_INTEGRATOR_KEY"),
            account_id: var("ESIGN_ACCOUNT_ID"),
            app_token: var("ESIGN_APP_TOKEN"),
            timeout: var("ESIGN_TIMEOUT").and_then(|v| v.parse().ok()),
        }
    }

    pub fn root_url(&self) -> Result<&str, ConfigError> {
        required("root_url", &self.root_url)
    }

    pub fn username(&self) -> Result<&str, ConfigError> {
        required("username", &self.username)
    }

    pub fn password(&self) -> Result<&str, ConfigError> {
        required("password", &self.password)
    }

    pub fn integrator_key(&self) -> Result<&str, ConfigError> {
        required("integrator_key", &self.integrator_key)
    }

    pub fn account_id(&self) -> Result<&str, ConfigError> {
        required("account_id", &self.account_id)
    }

    /// Resolved timeout, falling back to [`DEFAULT_TIMEOUT_SECONDS`].
    ///
    /// The value is caller-supplied (request settings, CLI flag, or
    /// environment), so negative, NaN, and out-of-range values are
    /// rejected here rather than trusted.
    pub fn timeout_duration(&self) -> Result<Duration, ConfigError> {
        let seconds = self.timeout.unwrap_or(DEFAULT_TIMEOUT_SECONDS);
        Duration::try_from_secs_f64(seconds).map_err(|_| ConfigError::InvalidTimeout(seconds))
    }
}

/// Read a field the call site requires to be set. Absence is only an
/// error here, downstream of resolution — never during the merge.
fn required<'a>(name: &'static str, value: &'a Option<String>) -> Result<&'a str, ConfigError> {
    value.as_deref().ok_or(ConfigError::MissingField(name))
}
