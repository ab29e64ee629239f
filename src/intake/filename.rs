use unicode_normalization::UnicodeNormalization;

use crate::config::FALLBACK_FILENAME;
use crate::models::Labels;

/// Make a string safe to use as a file name.
///
/// NFKD-normalizes, replaces `\ / : * ? " < > |` with `_`, then trims
/// surrounding whitespace and dots. Empty results fall back to `"output"`.
pub fn sanitize_filename(name: &str) -> String {
    let replaced: String = name
        .nfkd()
        .map(|c| match c {
            '\\' | '/' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            other => other,
        })
        .collect();
    let trimmed = replaced.trim().trim_matches('.');
    if trimmed.is_empty() {
        FALLBACK_FILENAME.to_string()
    } else {
        trimmed.to_string()
    }
}

/// Suggested download name: `<sanitized-site-address>_<suffix>.pdf`.
pub fn submission_filename(site_address: &str, labels: &Labels) -> String {
    format!("{}_{}.pdf", sanitize_filename(site_address), labels.filename_suffix)
}
