//! Photo gallery: directory listing in natural order and numbered uploads.

use regex::Regex;
use std::cmp::Ordering;
use std::io;
use std::path::Path;
use std::sync::OnceLock;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::info;

static DIGITS_REGEX: OnceLock<Regex> = OnceLock::new();

/// How many names to try when concurrent uploads race for the same number.
const MAX_NAME_ATTEMPTS: u64 = 16;

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
enum KeyPart {
    Text(String),
    /// Digit run with leading zeros stripped, ordered by length then digits
    Number(usize, String),
}

/// Sort key splitting a name into alternating text and digit runs.
///
/// Digit runs compare numerically and text runs case-insensitively, so
/// `2.jpg` sorts before `10.jpg`.
fn natural_key(name: &str) -> Vec<KeyPart> {
    let regex = DIGITS_REGEX.get_or_init(|| Regex::new(r"\d+").unwrap());

    let mut parts = Vec::new();
    let mut last = 0;
    for m in regex.find_iter(name) {
        parts.push(KeyPart::Text(name[last..m.start()].to_lowercase()));
        let digits = m.as_str().trim_start_matches('0');
        parts.push(KeyPart::Number(digits.len(), digits.to_string()));
        last = m.end();
    }
    parts.push(KeyPart::Text(name[last..].to_lowercase()));
    parts
}

pub fn natural_cmp(a: &str, b: &str) -> Ordering {
    natural_key(a).cmp(&natural_key(b))
}

/// File names in `dir`, in natural order. A missing directory is empty.
pub async fn list_photos(dir: &Path) -> io::Result<Vec<String>> {
    let mut entries = match fs::read_dir(dir).await {
        Ok(entries) => entries,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(e),
    };

    let mut names = Vec::new();
    while let Some(entry) = entries.next_entry().await? {
        if !entry.file_type().await?.is_file() {
            continue;
        }
        if let Ok(name) = entry.file_name().into_string() {
            names.push(name);
        }
    }

    names.sort_by(|a, b| natural_cmp(a, b));
    Ok(names)
}

/// Lower-cased extension of an uploaded file name, with its dot.
///
/// Anything that is not a plain alphanumeric extension yields an empty string.
pub fn upload_extension(filename: &str) -> String {
    Path::new(filename)
        .extension()
        .and_then(|ext| ext.to_str())
        .filter(|ext| !ext.is_empty() && ext.chars().all(|c| c.is_ascii_alphanumeric()))
        .map(|ext| format!(".{}", ext.to_lowercase()))
        .unwrap_or_default()
}

/// Largest numeric file stem among `names`; non-numeric stems are ignored.
pub fn max_numeric_stem<'a>(names: impl IntoIterator<Item = &'a str>) -> u64 {
    names
        .into_iter()
        .filter_map(|name| {
            Path::new(name)
                .file_stem()
                .and_then(|stem| stem.to_str())
                .and_then(|stem| stem.parse::<u64>().ok())
        })
        .max()
        .unwrap_or(0)
}

/// Save an upload as `<n>.<ext>`, `n` being one past the largest numbered photo.
///
/// Returns the stored file name.
pub async fn save_upload(dir: &Path, original_name: &str, data: &[u8]) -> io::Result<String> {
    fs::create_dir_all(dir).await?;

    let existing = list_photos(dir).await?;
    let next = max_numeric_stem(existing.iter().map(String::as_str)) + 1;
    let ext = upload_extension(original_name);

    for number in next..next + MAX_NAME_ATTEMPTS {
        let filename = format!("{number}{ext}");
        let path = dir.join(&filename);

        match fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .await
        {
            Ok(mut file) => {
                file.write_all(data).await?;
                file.flush().await?;
                info!("Stored photo upload as {}", filename);
                return Ok(filename);
            }
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => continue,
            Err(e) => return Err(e),
        }
    }

    Err(io::Error::new(
        io::ErrorKind::AlreadyExists,
        format!("no free photo number after {}", next + MAX_NAME_ATTEMPTS - 1),
    ))
}
