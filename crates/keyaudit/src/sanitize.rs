//! Helpers for sanitizing data before it enters tracing span attributes.
//!
//! Audit runs often cover confidential shares, so span fields carry file
//! names rather than full paths, and webhook URLs never appear verbatim.

use std::path::Path;

/// Returns only the filename component of a path (no directory).
pub fn redact_path(path: &Path) -> String {
    path.file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("<unknown>")
        .to_string()
}

/// Keeps the scheme and host of a URL and masks userinfo and path.
///
/// - `https://hooks.example.com/services/T000/B000/XXXX` → `https://hooks.example.com/****`
/// - `https://token@hooks.example.com/x` → `https://hooks.example.com/****`
/// - `https://hooks.example.com` → `https://hooks.example.com`
pub fn redact_url(url: &str) -> String {
    let Some(scheme_end) = url.find("://") else {
        return "****".to_string();
    };

    let scheme = &url[..scheme_end + 3];
    let rest = &url[scheme_end + 3..];
    let (authority, has_path) = match rest.find('/') {
        Some(slash) => (&rest[..slash], rest.len() > slash + 1),
        None => (rest, false),
    };
    let host = authority.rsplit('@').next().unwrap_or(authority);

    if has_path {
        format!("{}{}/****", scheme, host)
    } else {
        format!("{}{}", scheme, host)
    }
}
