//! Environment-controlled activation overrides.

/// Environment variable that prepends an always-succeeding sentinel method.
pub const FAKE_SUCCESS_ENV: &str = "KEEPAWAKE_FAKE_SUCCESS";

/// Environment variable that makes every method fail before it is tried.
pub const FORCE_FAILURE_ENV: &str = "KEEPAWAKE_FORCE_FAILURE";

/// Values treated as false (compared case-insensitively).
pub const FALSY_ENV_VALUES: &[&str] = &["", "0", "no", "n", "false", "f"];

/// Test-only overrides of the activation outcome.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ActivationFlags {
    /// Prepend the fake-success sentinel method.
    pub fake_success: bool,
    /// Fail every method at the forced-failure stage. Wins over `fake_success`.
    pub force_failure: bool,
}

impl ActivationFlags {
    /// Read both flags from the process environment.
    pub fn from_env() -> Self {
        Self {
            fake_success: is_env_var_truthy(FAKE_SUCCESS_ENV),
            force_failure: is_env_var_truthy(FORCE_FAILURE_ENV),
        }
    }

    /// True when both flags are set; forced failure takes precedence.
    pub fn conflicting(&self) -> bool {
        self.fake_success && self.force_failure
    }
}

/// Check if an environment variable is set to a truthy value.
pub fn is_env_var_truthy(name: &str) -> bool {
    match std::env::var(name) {
        Ok(value) => {
            let truthy = is_truthy(&value);
            tracing::debug!(var = name, value = %value, truthy, "read activation flag");
            truthy
        }
        Err(_) => {
            tracing::debug!(var = name, "activation flag not set");
            false
        }
    }
}

/// Parse a boolean-ish string. Anything that is not explicitly falsy is true.
pub fn is_truthy(value: &str) -> bool {
    let lower = value.to_lowercase();
    !FALSY_ENV_VALUES.contains(&lower.as_str())
}
