//! Message catalog: per-locale nested message tables.
//!
//! Catalogs are embedded at build time from `locales/<code>.json`, loaded
//! once at startup and never mutated. Nested objects are addressed with
//! dotted keys (`app.title`).

use std::collections::{BTreeMap, HashMap};

use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use crate::i18n::{I18nMetrics, LocaleCode};

/// Errors raised while loading catalog sources.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("catalog for '{locale}' is not valid JSON: {source}")]
    Parse {
        locale: LocaleCode,
        #[source]
        source: serde_json::Error,
    },

    #[error("catalog for '{locale}' must be a JSON object")]
    NotAnObject { locale: LocaleCode },

    #[error("catalog for '{locale}' has a non-string value at '{key}'")]
    NonStringValue { locale: LocaleCode, key: String },

    #[error("no catalog for fallback locale '{0}'")]
    MissingFallback(LocaleCode),
}

/// Embedded catalog source for a locale, if one ships with the binary.
fn embedded_source(locale: LocaleCode) -> Option<&'static str> {
    match locale.code() {
        "en" => Some(include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/locales/en.json"))),
        "ko" => Some(include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/locales/ko.json"))),
        "zh-Hans" => Some(include_str!(concat!(
            env!("CARGO_MANIFEST_DIR"),
            "/locales/zh-Hans.json"
        ))),
        "zh-Hant" => Some(include_str!(concat!(
            env!("CARGO_MANIFEST_DIR"),
            "/locales/zh-Hant.json"
        ))),
        _ => None,
    }
}

/// Initialization configuration handed to the client-side i18n setup.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct I18nSetup<'a> {
    pub locale: LocaleCode,
    pub fallback_locale: LocaleCode,
    pub messages: &'a BTreeMap<LocaleCode, Value>,
}

/// All message tables, keyed by locale.
#[derive(Debug, Clone)]
pub struct MessageCatalog {
    nested: BTreeMap<LocaleCode, Value>,
    flat: HashMap<LocaleCode, BTreeMap<String, String>>,
    fallback: LocaleCode,
}

impl MessageCatalog {
    /// Load the catalogs embedded for every enabled locale.
    pub fn embedded() -> Result<Self, CatalogError> {
        let sources: Vec<_> = LocaleCode::all_enabled()
            .into_iter()
            .filter_map(|locale| embedded_source(locale).map(|raw| (locale, raw)))
            .collect();

        Self::from_sources(&sources, LocaleCode::fallback())
    }

    /// Build a catalog from raw JSON sources.
    pub fn from_sources(
        sources: &[(LocaleCode, &str)],
        fallback: LocaleCode,
    ) -> Result<Self, CatalogError> {
        let mut nested = BTreeMap::new();
        let mut flat = HashMap::new();

        for &(locale, raw) in sources {
            let value: Value = serde_json::from_str(raw)
                .map_err(|source| CatalogError::Parse { locale, source })?;
            if !value.is_object() {
                return Err(CatalogError::NotAnObject { locale });
            }

            let mut entries = BTreeMap::new();
            flatten_into(locale, "", &value, &mut entries)?;

            flat.insert(locale, entries);
            nested.insert(locale, value);
        }

        if !nested.contains_key(&fallback) {
            return Err(CatalogError::MissingFallback(fallback));
        }

        Ok(Self {
            nested,
            flat,
            fallback,
        })
    }

    pub fn fallback_locale(&self) -> LocaleCode {
        self.fallback
    }

    /// Locales that have a catalog, in code order.
    pub fn locales(&self) -> impl Iterator<Item = LocaleCode> + '_ {
        self.nested.keys().copied()
    }

    pub fn has_locale(&self, locale: LocaleCode) -> bool {
        self.nested.contains_key(&locale)
    }

    /// Look up a message in exactly one locale.
    pub fn get(&self, locale: LocaleCode, key: &str) -> Option<&str> {
        self.flat
            .get(&locale)
            .and_then(|entries| entries.get(key))
            .map(String::as_str)
    }

    /// Look up a message, falling back to the fallback locale and then to the key itself.
    pub fn translate<'a>(&'a self, locale: LocaleCode, key: &'a str) -> &'a str {
        if let Some(message) = self.get(locale, key) {
            return message;
        }

        I18nMetrics::global().record_catalog_miss();
        self.get(self.fallback, key).unwrap_or(key)
    }

    /// Dotted keys defined for `locale`, sorted.
    pub fn keys(&self, locale: LocaleCode) -> Vec<&str> {
        self.flat
            .get(&locale)
            .map(|entries| entries.keys().map(String::as_str).collect())
            .unwrap_or_default()
    }

    /// Nested message table for one locale.
    pub fn messages_for(&self, locale: LocaleCode) -> Option<&Value> {
        self.nested.get(&locale)
    }

    /// Client initialization config for the active `locale`.
    pub fn setup(&self, locale: LocaleCode) -> I18nSetup<'_> {
        I18nSetup {
            locale,
            fallback_locale: self.fallback,
            messages: &self.nested,
        }
    }
}

fn flatten_into(
    locale: LocaleCode,
    prefix: &str,
    value: &Value,
    out: &mut BTreeMap<String, String>,
) -> Result<(), CatalogError> {
    match value {
        Value::Object(map) => {
            for (name, child) in map {
                let key = if prefix.is_empty() {
                    name.clone()
                } else {
                    format!("{prefix}.{name}")
                };
                flatten_into(locale, &key, child, out)?;
            }
            Ok(())
        }
        Value::String(text) => {
            out.insert(prefix.to_string(), text.clone());
            Ok(())
        }
        _ => Err(CatalogError::NonStringValue {
            locale,
            key: prefix.to_string(),
        }),
    }
}
