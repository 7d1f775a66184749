//! Locale registry: Single source of truth for all supported locales.
//!
//! The registry is a lazily initialised singleton (`OnceLock`) and stays
//! immutable after first access.

use std::sync::OnceLock;

/// Configuration for a supported locale.
#[derive(Debug, Clone)]
pub struct LocaleConfig {
    /// Canonical locale code (e.g., "en", "zh-Hant")
    pub code: &'static str,

    /// English name of the locale (e.g., "Korean", "Traditional Chinese")
    pub name: &'static str,

    /// Native name of the locale (e.g., "한국어", "繁體中文")
    pub native_name: &'static str,

    /// Whether this is the fallback locale for missing messages (only one should be true)
    pub is_fallback: bool,

    /// Whether this locale is enabled for use
    pub enabled: bool,
}

/// Global locale registry singleton.
pub struct LocaleRegistry {
    locales: Vec<LocaleConfig>,
}

/// Global registry instance (initialized lazily)
static REGISTRY: OnceLock<LocaleRegistry> = OnceLock::new();

impl LocaleRegistry {
    /// Get the global locale registry instance.
    pub fn get() -> &'static LocaleRegistry {
        REGISTRY.get_or_init(|| LocaleRegistry {
            locales: default_locales(),
        })
    }

    /// Get a locale configuration by its exact code.
    ///
    /// Matching is case-sensitive: `"zh-hant"` is not `"zh-Hant"`.
    pub fn get_by_code(&self, code: &str) -> Option<&LocaleConfig> {
        self.locales.iter().find(|locale| locale.code == code)
    }

    /// Get all enabled locales, in registry order.
    pub fn list_enabled(&self) -> Vec<&LocaleConfig> {
        self.locales.iter().filter(|locale| locale.enabled).collect()
    }

    /// Get the fallback locale configuration.
    ///
    /// # Panics
    /// Panics if no fallback locale is found or if multiple fallback
    /// locales are defined (this indicates a configuration error).
    pub fn fallback(&self) -> &LocaleConfig {
        let fallbacks: Vec<_> = self
            .locales
            .iter()
            .filter(|locale| locale.is_fallback)
            .collect();

        match fallbacks.len() {
            0 => panic!("No fallback locale found in registry"),
            1 => fallbacks[0],
            _ => panic!("Multiple fallback locales found in registry"),
        }
    }
}

/// Default locale configurations.
///
/// English is the fallback; Korean and both Chinese scripts are translations.
fn default_locales() -> Vec<LocaleConfig> {
    vec![
        LocaleConfig {
            code: "en",
            name: "English",
            native_name: "English",
            is_fallback: true,
            enabled: true,
        },
        LocaleConfig {
            code: "ko",
            name: "Korean",
            native_name: "한국어",
            is_fallback: false,
            enabled: true,
        },
        LocaleConfig {
            code: "zh-Hans",
            name: "Simplified Chinese",
            native_name: "简体中文",
            is_fallback: false,
            enabled: true,
        },
        LocaleConfig {
            code: "zh-Hant",
            name: "Traditional Chinese",
            native_name: "繁體中文",
            is_fallback: false,
            enabled: true,
        },
    ]
}
