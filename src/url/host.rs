use url::Url;

/// Extracts the lowercase host from a URL
///
/// # Examples
///
/// ```
/// use url::Url;
/// use site_auditor::url::extract_host;
///
/// let url = Url::parse("https://EXAMPLE.COM/path").unwrap();
/// assert_eq!(extract_host(&url), Some("example.com".to_string()));
/// ```
pub fn extract_host(url: &Url) -> Option<String> {
    url.host_str().map(|h| h.to_lowercase())
}

/// Returns true when `link` points at the same host as `site`
///
/// Hosts are compared case-insensitively; ports and schemes are ignored.
pub fn is_same_host(site: &Url, link: &Url) -> bool {
    match (site.host_str(), link.host_str()) {
        (Some(a), Some(b)) => a.eq_ignore_ascii_case(b),
        _ => false,
    }
}

/// Classifies a link string as internal to `site`
///
/// Unparseable or relative strings are not internal.
pub fn is_internal_link(site: &Url, link: &str) -> bool {
    Url::parse(link)
        .map(|parsed| is_same_host(site, &parsed))
        .unwrap_or(false)
}
