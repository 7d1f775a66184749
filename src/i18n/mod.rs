//! Internationalization (i18n) module.
//!
//! All locale-related logic lives here: the supported-locale registry, the
//! startup locale resolver, the embedded message catalogs and the
//! persisted-preference port.
//!
//! # Architecture
//!
//! - `registry`: Single source of truth for supported locales and their metadata
//! - `locale`: Validated `LocaleCode` type
//! - `resolver`: Persisted preference → browser tags → default resolution
//! - `catalog`: Embedded nested message tables with fallback lookup
//! - `preference`: Get/set string port for the saved locale choice
//! - `validator`: Catalog consistency checks
//! - `metrics`: Resolution and lookup counters
//!
//! # Example
//!
//! ```rust
//! use memorial_site::i18n::{LocaleCode, LocaleResolver, MemoryPreferenceStore, MessageCatalog};
//!
//! let catalog = MessageCatalog::embedded().unwrap();
//! let resolver = LocaleResolver::from_registry(LocaleCode::ENGLISH);
//!
//! let store = MemoryPreferenceStore::new();
//! let resolution = resolver.resolve_with(&store, Some(&["ko-KR"][..]));
//!
//! assert_eq!(catalog.translate(resolution.locale, "app.title"), "김의 추모관");
//! ```

mod catalog;
mod locale;
mod metrics;
pub mod preference;
mod registry;
mod resolver;
mod validator;

pub use catalog::{CatalogError, I18nSetup, MessageCatalog};
pub use locale::LocaleCode;
pub use metrics::{I18nMetrics, MetricsReport};
pub use preference::{CookiePreferenceStore, MemoryPreferenceStore, PreferenceStore, PREFERENCE_KEY};
pub use registry::{LocaleConfig, LocaleRegistry};
pub use resolver::{
    classify_tag, parse_accept_language, resolve, resolve_detailed, LocaleResolver, Resolution,
    ResolutionSource,
};
pub use validator::{CatalogValidator, ValidationReport};
