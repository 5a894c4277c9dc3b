// SPDX-License-Identifier: Apache-2.0

#![warn(missing_docs)]

//! Configuration parameters affecting the behaviour of this library.
//!

use dotenvy::var;
use std::sync::OnceLock;

/// Process-wide configuration, resolved once from the environment (via a
/// `.env` file if present, `dotenvy`-style) and reused thereafter.
#[derive(Debug)]
pub struct Config {
    default_locale: String,
}

static CONFIG: OnceLock<Config> = OnceLock::new();

/// This library's configuration singleton.
///
/// Read-only after first access; callers who need per-call overrides pass an
/// explicit `locale: &str` to [`crate::spec::Spec::apply`] / [`crate::evaluator::evaluate`],
/// which always wins over this default.
pub fn config() -> &'static Config {
    CONFIG.get_or_init(Config::default)
}

impl Default for Config {
    fn default() -> Self {
        let default_locale = var("REFILL_DEFAULT_LOCALE").unwrap_or_else(|_| "en_US".to_string());
        Self { default_locale }
    }
}

impl Config {
    /// The locale used when a caller does not supply one explicitly.
    pub fn default_locale(&self) -> &str {
        &self.default_locale
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_locale_falls_back_to_en_us() {
        // only meaningful in an environment with no REFILL_DEFAULT_LOCALE set,
        // which is the case for the test runner.
        if std::env::var("REFILL_DEFAULT_LOCALE").is_err() {
            assert_eq!(config().default_locale(), "en_US");
        }
    }
}
