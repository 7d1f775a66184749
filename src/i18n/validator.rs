//! Catalog consistency validation.
//!
//! Every locale is compared against the fallback catalog: keys must line up
//! and `{placeholder}` tokens must survive translation.

use regex::Regex;
use std::collections::BTreeSet;
use std::sync::OnceLock;

use crate::i18n::MessageCatalog;

/// Validation report containing errors and warnings about a catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationReport {
    /// Problems that leave a locale visibly incomplete
    pub errors: Vec<String>,

    /// Non-critical findings
    pub warnings: Vec<String>,
}

impl ValidationReport {
    pub fn new() -> Self {
        Self {
            errors: Vec::new(),
            warnings: Vec::new(),
        }
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    /// Check if the report is clean (no errors or warnings)
    pub fn is_clean(&self) -> bool {
        !self.has_errors() && !self.has_warnings()
    }
}

impl Default for ValidationReport {
    fn default() -> Self {
        Self::new()
    }
}

/// Validator for message catalogs.
pub struct CatalogValidator;

static PLACEHOLDER_REGEX: OnceLock<Regex> = OnceLock::new();

impl CatalogValidator {
    /// Validate every locale of `catalog` against its fallback locale.
    ///
    /// - Keys missing from a locale are errors.
    /// - Keys only present in a translation are warnings.
    /// - Empty messages are warnings.
    /// - Differing `{name}` placeholder sets are warnings.
    pub fn validate(catalog: &MessageCatalog) -> ValidationReport {
        let mut report = ValidationReport::new();
        let fallback = catalog.fallback_locale();
        let reference: BTreeSet<&str> = catalog.keys(fallback).into_iter().collect();

        for locale in catalog.locales() {
            let keys: BTreeSet<&str> = catalog.keys(locale).into_iter().collect();

            if locale != fallback {
                for missing in reference.difference(&keys) {
                    report
                        .errors
                        .push(format!("[{locale}] missing key '{missing}'"));
                }
                for extra in keys.difference(&reference) {
                    report
                        .warnings
                        .push(format!("[{locale}] key '{extra}' is not in '{fallback}'"));
                }
            }

            for key in &keys {
                let Some(message) = catalog.get(locale, key) else {
                    continue;
                };
                if message.trim().is_empty() {
                    report
                        .warnings
                        .push(format!("[{locale}] key '{key}' is empty"));
                }

                if locale == fallback {
                    continue;
                }
                if let Some(source) = catalog.get(fallback, key) {
                    let expected = Self::extract_placeholders(source);
                    let actual = Self::extract_placeholders(message);
                    if expected != actual {
                        report.warnings.push(format!(
                            "[{locale}] placeholder mismatch at '{key}': expected {:?}, found {:?}",
                            expected, actual
                        ));
                    }
                }
            }
        }

        report
    }

    /// Extract the sorted set of `{name}` placeholders from a message
    fn extract_placeholders(text: &str) -> BTreeSet<String> {
        let regex = PLACEHOLDER_REGEX.get_or_init(|| Regex::new(r"\{([A-Za-z0-9_]+)\}").unwrap());

        regex
            .captures_iter(text)
            .filter_map(|cap| cap.get(1).map(|m| m.as_str().to_string()))
            .collect()
    }
}
