//! Check catalog binary - validates the embedded message catalogs
//!
//! Usage:
//!   cargo run --bin check-catalog                 # Validate catalogs
//!   cargo run --bin check-catalog -- ko-KR zh-TW  # Also show how tags resolve
//!
//! Optional:
//! - DEFAULT_LOCALE (defaults to en)
//!
//! Exits with an error if any locale is missing a key of the fallback locale.

use anyhow::{bail, Context, Result};
use memorial_site::i18n::{
    resolve_detailed, CatalogValidator, LocaleCode, LocaleResolver, MessageCatalog,
};
use tracing::info;

fn main() -> Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("check_catalog=info".parse()?),
        )
        .init();

    let default_locale = match std::env::var("DEFAULT_LOCALE") {
        Ok(code) => LocaleCode::from_code(&code).context("DEFAULT_LOCALE is not supported")?,
        Err(_) => LocaleCode::fallback(),
    };

    let catalog = MessageCatalog::embedded().context("Failed to load message catalogs")?;
    let report = CatalogValidator::validate(&catalog);

    println!("\n{}", "=".repeat(60));
    println!("MESSAGE CATALOGS (fallback: {})", catalog.fallback_locale());
    println!("{}", "=".repeat(60));
    for locale in catalog.locales() {
        println!(
            "  {:<8} {:<22} {} keys",
            locale.code(),
            locale.native_name(),
            catalog.keys(locale).len()
        );
    }

    for problem in &report.errors {
        println!("  ERROR   {}", problem);
    }
    for finding in &report.warnings {
        println!("  WARNING {}", finding);
    }
    if report.is_clean() {
        println!("  ✓ No problems found");
    }

    let tags: Vec<String> = std::env::args().skip(1).collect();
    if !tags.is_empty() {
        let resolver = LocaleResolver::from_registry(default_locale);
        println!("\n{}", "-".repeat(60));
        println!("RESOLUTION (default: {})", resolver.default_locale());
        println!("{}", "-".repeat(60));
        for tag in &tags {
            let resolution = resolve_detailed(
                None,
                Some(std::slice::from_ref(tag)),
                resolver.supported(),
                resolver.default_locale(),
            );
            println!(
                "  {:<16} -> {:<8} ({:?})",
                tag, resolution.locale, resolution.source
            );
        }
        let all = resolve_detailed(
            None,
            Some(tags.as_slice()),
            resolver.supported(),
            resolver.default_locale(),
        );
        println!("  {:<16} -> {:<8} ({:?})", "(all, in order)", all.locale, all.source);
    }
    println!();

    if report.has_errors() {
        bail!("{} catalog error(s)", report.errors.len());
    }
    info!("Catalog check passed");
    Ok(())
}
