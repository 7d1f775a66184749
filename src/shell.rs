//! HTML shell for the single-page app.
//!
//! The shell carries the client i18n setup (active locale, fallback locale
//! and every message table) as an embedded JSON document.

use regex::Regex;
use std::sync::OnceLock;

use crate::i18n::I18nSetup;

static HTML_TAG_REGEX: OnceLock<Regex> = OnceLock::new();
static LANG_ATTR_REGEX: OnceLock<Regex> = OnceLock::new();

/// Element id of the embedded setup document.
pub const SETUP_ELEMENT_ID: &str = "i18n-setup";

/// Texts shown in a built-in shell.
#[derive(Debug, Clone, Copy)]
pub struct ShellText<'a> {
    pub title: &'a str,
    pub description: &'a str,
    pub component: &'a str,
}

pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Serialize the setup for a `<script type="application/json">` block.
fn setup_script(setup: &I18nSetup<'_>) -> serde_json::Result<String> {
    // "</" would close the script element early.
    let json = serde_json::to_string(setup)?.replace("</", "<\\/");
    Ok(format!(
        r#"<script id="{SETUP_ELEMENT_ID}" type="application/json">{json}</script>"#
    ))
}

/// Render the built-in shell.
pub fn render_default(setup: &I18nSetup<'_>, text: ShellText<'_>) -> serde_json::Result<String> {
    Ok(format!(
        r#"<!DOCTYPE html>
<html lang="{lang}">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<meta name="description" content="{description}">
<title>{title}</title>
{script}
</head>
<body>
<div id="app" data-view="{component}"></div>
</body>
</html>
"#,
        lang = escape_html(setup.locale.code()),
        description = escape_html(text.description),
        title = escape_html(text.title),
        script = setup_script(setup)?,
        component = escape_html(text.component),
    ))
}

/// Inject the setup into a prebuilt page: set `<html lang>` and add the setup
/// script before `</head>` (or at the top of the document if there is none).
pub fn inject(template: &str, setup: &I18nSetup<'_>) -> serde_json::Result<String> {
    let html_tag = HTML_TAG_REGEX.get_or_init(|| Regex::new(r"(?i)<html\b([^>]*)>").unwrap());
    let lang_attr =
        LANG_ATTR_REGEX.get_or_init(|| Regex::new(r#"(?i)\s+lang\s*=\s*("[^"]*"|'[^']*'|\S+)"#).unwrap());

    let lang = escape_html(setup.locale.code());
    let page = html_tag.replace(template, |caps: &regex::Captures<'_>| {
        let attrs = lang_attr.replace_all(&caps[1], "");
        format!(r#"<html lang="{lang}"{attrs}>"#)
    });

    let script = setup_script(setup)?;
    let lower = page.to_ascii_lowercase();
    Ok(match lower.find("</head>") {
        Some(index) => format!("{}{}\n{}", &page[..index], script, &page[index..]),
        None => format!("{script}\n{page}"),
    })
}
