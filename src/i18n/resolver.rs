//! Startup locale resolution.
//!
//! Priority order: persisted preference, then the browser's language tags,
//! then a fixed default. [`resolve`] is a pure function; reading the
//! preference store and the tag list is the caller's job.
//!
//! ```
//! use memorial_site::i18n::{resolve, LocaleCode};
//!
//! let supported = LocaleCode::all_enabled();
//! let locale = resolve(None, Some(&["fr-FR", "zh-TW"][..]), &supported, LocaleCode::ENGLISH);
//! assert_eq!(locale, LocaleCode::TRADITIONAL_CHINESE);
//! ```

use crate::i18n::preference::{PreferenceStore, PREFERENCE_KEY};
use crate::i18n::{LocaleCode, I18nMetrics};
use serde::Serialize;
use tracing::debug;

/// Which priority tier produced a resolved locale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ResolutionSource {
    Persisted,
    Browser,
    Default,
}

/// A resolved locale together with the tier it came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolution {
    pub locale: LocaleCode,
    pub source: ResolutionSource,
}

/// Resolve the locale to activate at startup.
///
/// Never fails: every missing, unsupported or malformed input falls through
/// to the next tier and the chain ends at `default`.
pub fn resolve<S: AsRef<str>>(
    persisted: Option<&str>,
    browser_tags: Option<&[S]>,
    supported: &[LocaleCode],
    default: LocaleCode,
) -> LocaleCode {
    resolve_detailed(persisted, browser_tags, supported, default).locale
}

/// Same as [`resolve`], also reporting which tier matched.
pub fn resolve_detailed<S: AsRef<str>>(
    persisted: Option<&str>,
    browser_tags: Option<&[S]>,
    supported: &[LocaleCode],
    default: LocaleCode,
) -> Resolution {
    // Stored values are trusted verbatim: exact, case-sensitive membership.
    if let Some(stored) = persisted {
        if let Some(locale) = supported.iter().find(|locale| locale.code() == stored) {
            return Resolution {
                locale: *locale,
                source: ResolutionSource::Persisted,
            };
        }
    }

    let candidate = browser_tags
        .unwrap_or_default()
        .iter()
        .filter_map(|tag| classify_tag(tag.as_ref()))
        .find(|candidate| supported.contains(candidate));

    match candidate {
        Some(locale) => Resolution {
            locale,
            source: ResolutionSource::Browser,
        },
        None => Resolution {
            locale: default,
            source: ResolutionSource::Default,
        },
    }
}

/// Map a single language tag to a candidate locale by prefix.
///
/// Chinese tags go to Traditional when they mention the `Hant` script or a
/// Taiwan, Hong Kong or Macao region subtag, and to Simplified otherwise.
pub fn classify_tag(tag: &str) -> Option<LocaleCode> {
    let lower = tag.to_lowercase();

    if lower.starts_with("ko") {
        Some(LocaleCode::KOREAN)
    } else if lower.starts_with("zh") {
        if lower.contains("hant") || has_traditional_region(&lower) {
            Some(LocaleCode::TRADITIONAL_CHINESE)
        } else {
            Some(LocaleCode::SIMPLIFIED_CHINESE)
        }
    } else if lower.starts_with("en") {
        Some(LocaleCode::ENGLISH)
    } else {
        None
    }
}

fn has_traditional_region(lower_tag: &str) -> bool {
    // POSIX-style values such as "zh_TW.UTF-8" carry an encoding suffix.
    let tag = lower_tag.split(['.', '@']).next().unwrap_or(lower_tag);
    tag.split(['-', '_'])
        .skip(1)
        .any(|subtag| matches!(subtag, "tw" | "hk" | "mo"))
}

/// Turn an `Accept-Language` header value into an ordered tag list.
///
/// Entries are ordered by descending `q` weight; ties keep header order.
/// Weights are clamped to `0..=1`; missing, unparsable or non-finite weights
/// count as 1. Wildcards and `q=0` entries are dropped.
pub fn parse_accept_language(value: &str) -> Vec<String> {
    let mut weighted: Vec<(String, f32)> = value
        .split(',')
        .filter_map(|part| {
            let mut pieces = part.split(';');
            let tag = pieces.next()?.trim();
            if tag.is_empty() || tag == "*" {
                return None;
            }
            let weight = pieces
                .find_map(|param| param.trim().strip_prefix("q="))
                .and_then(|q| q.trim().parse::<f32>().ok())
                .filter(|q| q.is_finite())
                .map(|q| q.clamp(0.0, 1.0))
                .unwrap_or(1.0);
            (weight > 0.0).then(|| (tag.to_string(), weight))
        })
        .collect();

    // sort_by is stable, so equal weights stay in header order.
    weighted.sort_by(|a, b| b.1.total_cmp(&a.1));
    weighted.into_iter().map(|(tag, _)| tag).collect()
}

/// Fixed resolver configuration: the supported set and the default.
#[derive(Debug, Clone)]
pub struct LocaleResolver {
    supported: Vec<LocaleCode>,
    default: LocaleCode,
}

impl LocaleResolver {
    pub fn new(supported: Vec<LocaleCode>, default: LocaleCode) -> Self {
        Self { supported, default }
    }

    /// Resolver over every enabled locale in the registry.
    pub fn from_registry(default: LocaleCode) -> Self {
        Self::new(LocaleCode::all_enabled(), default)
    }

    pub fn supported(&self) -> &[LocaleCode] {
        &self.supported
    }

    pub fn default_locale(&self) -> LocaleCode {
        self.default
    }

    /// Read the persisted preference from `store` and resolve against `browser_tags`.
    pub fn resolve_with<P, S>(&self, store: &P, browser_tags: Option<&[S]>) -> Resolution
    where
        P: PreferenceStore + ?Sized,
        S: AsRef<str>,
    {
        let persisted = store.get(PREFERENCE_KEY);
        let resolution = resolve_detailed(
            persisted.as_deref(),
            browser_tags,
            &self.supported,
            self.default,
        );

        debug!(
            locale = %resolution.locale,
            source = ?resolution.source,
            "Resolved startup locale"
        );
        I18nMetrics::global().record_resolution(resolution.source);

        resolution
    }
}
