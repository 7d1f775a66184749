//! Locale resolution and catalog metrics.
//!
//! Tracks which priority tier answered each startup resolution and how often
//! a message lookup had to fall back.

use serde::Serialize;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::OnceLock;

use crate::i18n::ResolutionSource;

/// Global i18n metrics singleton.
pub struct I18nMetrics {
    /// Resolutions answered by the persisted preference
    persisted: AtomicUsize,

    /// Resolutions answered by a browser language tag
    browser: AtomicUsize,

    /// Resolutions that ended at the default locale
    default: AtomicUsize,

    /// Message lookups missing from the requested locale
    catalog_misses: AtomicUsize,
}

/// Global metrics instance (initialized lazily)
static METRICS: OnceLock<I18nMetrics> = OnceLock::new();

impl I18nMetrics {
    /// Get the global metrics instance.
    pub fn global() -> &'static I18nMetrics {
        METRICS.get_or_init(|| I18nMetrics {
            persisted: AtomicUsize::new(0),
            browser: AtomicUsize::new(0),
            default: AtomicUsize::new(0),
            catalog_misses: AtomicUsize::new(0),
        })
    }

    /// Record one resolution answered by `source`.
    pub fn record_resolution(&self, source: ResolutionSource) {
        let counter = match source {
            ResolutionSource::Persisted => &self.persisted,
            ResolutionSource::Browser => &self.browser,
            ResolutionSource::Default => &self.default,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a lookup that was not found in the requested locale.
    pub fn record_catalog_miss(&self) {
        self.catalog_misses.fetch_add(1, Ordering::Relaxed);
    }

    pub fn resolutions(&self, source: ResolutionSource) -> usize {
        match source {
            ResolutionSource::Persisted => self.persisted.load(Ordering::Relaxed),
            ResolutionSource::Browser => self.browser.load(Ordering::Relaxed),
            ResolutionSource::Default => self.default.load(Ordering::Relaxed),
        }
    }

    pub fn catalog_misses(&self) -> usize {
        self.catalog_misses.load(Ordering::Relaxed)
    }

    /// Generate a metrics report.
    pub fn report(&self) -> MetricsReport {
        MetricsReport::from_counts(
            self.resolutions(ResolutionSource::Persisted),
            self.resolutions(ResolutionSource::Browser),
            self.resolutions(ResolutionSource::Default),
            self.catalog_misses(),
        )
    }
}

/// Snapshot of the i18n counters.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricsReport {
    pub persisted_resolutions: usize,
    pub browser_resolutions: usize,
    pub default_resolutions: usize,

    /// Share of resolutions that reached the default, as a percentage (0-100)
    pub default_rate: f64,

    pub catalog_misses: usize,
}

impl MetricsReport {
    pub fn from_counts(persisted: usize, browser: usize, default: usize, misses: usize) -> Self {
        let total = persisted + browser + default;
        let default_rate = if total > 0 {
            (default as f64 / total as f64) * 100.0
        } else {
            0.0
        };

        Self {
            persisted_resolutions: persisted,
            browser_resolutions: browser,
            default_resolutions: default,
            default_rate,
            catalog_misses: misses,
        }
    }
}
