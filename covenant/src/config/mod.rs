//! Enforcement configuration.
//!
//! Whether contracts are installed at all is decided once, when a class is
//! built. A disabled configuration leaves the class's dispatch table free of
//! contract wrappers, so calls cost exactly what the plain method costs.

use serde::{Deserialize, Serialize};

/// Environment variable that disables contract installation when set.
pub const DISABLE_ENV_VAR: &str = "COVENANT_DISABLE";

/// Process-wide switch controlling contract installation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnforcementConfig {
    /// Whether contracts are installed on classes built with this config.
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

fn default_enabled() -> bool {
    true
}

impl Default for EnforcementConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
        }
    }
}

impl EnforcementConfig {
    /// Creates a configuration that installs contracts.
    #[must_use]
    pub const fn enabled() -> Self {
        Self { enabled: true }
    }

    /// Creates a configuration that installs nothing.
    #[must_use]
    pub const fn disabled() -> Self {
        Self { enabled: false }
    }

    /// Reads the switch from [`DISABLE_ENV_VAR`].
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_env_var(DISABLE_ENV_VAR)
    }

    /// Reads the switch from an arbitrary environment variable.
    #[must_use]
    pub fn from_env_var(name: &str) -> Self {
        let value = std::env::var(name).ok();
        Self::from_disable_flag(value.as_deref())
    }

    /// Interprets the raw value of a disable flag.
    ///
    /// Unset, empty, `0` and `false` leave enforcement on; anything else
    /// turns it off.
    #[must_use]
    pub fn from_disable_flag(value: Option<&str>) -> Self {
        let disabled = value.map(str::trim).is_some_and(|v| {
            !v.is_empty() && v != "0" && !v.eq_ignore_ascii_case("false")
        });
        Self { enabled: !disabled }
    }

    /// True when contracts will be installed.
    #[must_use]
    pub const fn is_enabled(&self) -> bool {
        self.enabled
    }
}
