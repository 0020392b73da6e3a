//! Core runtime configuration.
//!
//! Configuration is resolved once at process startup and then passed into
//! core services. The intent is to avoid reading process-wide environment
//! variables during request handling, which can lead to inconsistent
//! behaviour in multi-threaded runtimes and test harnesses.

use std::time::Duration;

use crate::{PatientError, PatientResult};

/// Default deadline for the synchronous billing provisioning call.
pub const DEFAULT_BILLING_TIMEOUT: Duration = Duration::from_secs(5);

/// Core configuration resolved at startup.
#[derive(Clone, Debug)]
pub struct CoreConfig {
    billing_timeout: Duration,
}

impl CoreConfig {
    /// Create a new `CoreConfig`.
    pub fn new(billing_timeout: Duration) -> PatientResult<Self> {
        if billing_timeout.is_zero() {
            return Err(PatientError::InvalidInput(
                "billing timeout cannot be zero".into(),
            ));
        }

        Ok(Self { billing_timeout })
    }

    pub fn billing_timeout(&self) -> Duration {
        self.billing_timeout
    }
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            billing_timeout: DEFAULT_BILLING_TIMEOUT,
        }
    }
}

/// Parse the billing timeout from an optional millisecond string value.
///
/// If `value` is `None` or empty/whitespace, returns
/// [`DEFAULT_BILLING_TIMEOUT`].
pub fn billing_timeout_from_env_value(value: Option<String>) -> PatientResult<Duration> {
    let value = value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty());

    let Some(value) = value else {
        return Ok(DEFAULT_BILLING_TIMEOUT);
    };

    let millis: u64 = value.parse().map_err(|_| {
        PatientError::InvalidInput(format!(
            "billing timeout must be a whole number of milliseconds, got {value:?}"
        ))
    })?;
    if millis == 0 {
        return Err(PatientError::InvalidInput(
            "billing timeout cannot be zero".into(),
        ));
    }

    Ok(Duration::from_millis(millis))
}
