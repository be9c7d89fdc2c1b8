use crate::UrlError;
use url::Url;

const DEFAULT_SCHEME_PREFIX: &str = "https://";

/// Normalizes raw user input into an absolute http(s) URL
///
/// # Normalization Steps
///
/// 1. Trim surrounding whitespace; reject empty input
/// 2. If the input carries no scheme, prepend `https://`
/// 3. Parse as an absolute URL; reject if malformed
/// 4. Reject any scheme other than `http` or `https`
///
/// Parsing lowercases the host and gives an empty path a trailing `/`, so
/// normalizing an already-normalized URL returns it unchanged.
///
/// # Examples
///
/// ```
/// use site_auditor::url::normalize_url;
///
/// let url = normalize_url("  Example.com/about ").unwrap();
/// assert_eq!(url.as_str(), "https://example.com/about");
/// ```
pub fn normalize_url(raw: &str) -> Result<Url, UrlError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(UrlError::Empty);
    }

    let candidate = if has_explicit_scheme(trimmed) {
        trimmed.to_string()
    } else {
        format!("{}{}", DEFAULT_SCHEME_PREFIX, trimmed)
    };

    let url = Url::parse(&candidate).map_err(|e| UrlError::Parse(format!("{}: {}", trimmed, e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::InvalidScheme(format!(
            "Only HTTP and HTTPS schemes are supported, got: {}",
            url.scheme()
        )));
    }

    if url.host_str().map_or(true, str::is_empty) {
        return Err(UrlError::Parse(format!("{}: missing host", trimmed)));
    }

    Ok(url)
}

/// True when the input starts with `<scheme>://`
fn has_explicit_scheme(input: &str) -> bool {
    match input.find("://") {
        Some(idx) if idx > 0 => input[..idx]
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.')),
        _ => false,
    }
}
