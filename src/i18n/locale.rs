//! Locale type: validated locale code backed by the registry.

use crate::i18n::{LocaleConfig, LocaleRegistry};
use anyhow::{bail, Result};
use serde::{Serialize, Serializer};
use std::fmt;

/// A validated locale code.
///
/// Only codes present and enabled in the [`LocaleRegistry`] can be
/// constructed, so a `LocaleCode` is always a supported locale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LocaleCode {
    code: &'static str,
}

impl LocaleCode {
    pub const ENGLISH: LocaleCode = LocaleCode { code: "en" };
    pub const KOREAN: LocaleCode = LocaleCode { code: "ko" };
    pub const SIMPLIFIED_CHINESE: LocaleCode = LocaleCode { code: "zh-Hans" };
    pub const TRADITIONAL_CHINESE: LocaleCode = LocaleCode { code: "zh-Hant" };

    /// Create a LocaleCode from its canonical code string.
    ///
    /// The match is exact. No case folding or subtag normalization is done.
    ///
    /// # Returns
    /// * `Ok(LocaleCode)` if the code is registered and enabled
    /// * `Err` if the code is unknown or disabled
    pub fn from_code(code: &str) -> Result<LocaleCode> {
        let registry = LocaleRegistry::get();

        match registry.get_by_code(code) {
            Some(config) if config.enabled => Ok(LocaleCode { code: config.code }),
            Some(_) => bail!("Locale '{}' is not enabled", code),
            None => bail!("Unknown locale code: '{}'", code),
        }
    }

    /// The fallback locale used when a message is missing.
    pub fn fallback() -> LocaleCode {
        let config = LocaleRegistry::get().fallback();
        LocaleCode { code: config.code }
    }

    /// All enabled locales, in registry order.
    pub fn all_enabled() -> Vec<LocaleCode> {
        LocaleRegistry::get()
            .list_enabled()
            .into_iter()
            .map(|config| LocaleCode { code: config.code })
            .collect()
    }

    pub fn code(&self) -> &'static str {
        self.code
    }

    /// Get the full locale configuration from the registry.
    ///
    /// # Panics
    /// Panics if the code is not in the registry, which cannot happen for a
    /// value built through `from_code` or the constants.
    pub fn config(&self) -> &'static LocaleConfig {
        LocaleRegistry::get()
            .get_by_code(self.code)
            .expect("Locale code should always be valid")
    }

    pub fn name(&self) -> &'static str {
        self.config().name
    }

    pub fn native_name(&self) -> &'static str {
        self.config().native_name
    }

    pub fn is_fallback(&self) -> bool {
        self.config().is_fallback
    }
}

impl fmt::Display for LocaleCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.code)
    }
}

impl Serialize for LocaleCode {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.code)
    }
}
