use crate::model::SeoResult;
use crate::seo::accessibility::{
    count_landmarks, count_unlabeled_controls, has_language_attribute, has_skip_link,
};
use crate::seo::structured_data::extract_structured_data;
use crate::seo::{attr_trimmed, select_all};
use crate::url::is_same_host;
use reqwest::header::HeaderMap;
use scraper::Html;
use url::Url;

/// Image and link totals observed in a rendered DOM
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DomCounts {
    pub image_count: usize,
    pub link_count: usize,
}

/// Output of SEO extraction
#[derive(Debug, Clone)]
pub struct SeoExtraction {
    pub seo: SeoResult,
    /// Absolute http(s) link targets eligible for health checking
    pub links: Vec<String>,
}

/// Builds the SEO result for a page
///
/// # Arguments
///
/// * `site` - The audited URL; relative links and canonicals resolve against it
/// * `html` - Page HTML, possibly empty
/// * `headers` - Response headers, consulted for `X-Robots-Tag`
/// * `dom` - Counts from a rendered DOM; they replace the static image/link totals
///
/// # Example
///
/// ```
/// use site_auditor::seo::build_seo_result;
/// use url::Url;
///
/// let site = Url::parse("https://example.com/").unwrap();
/// let html = r#"<html><head><title>Hello</title></head><body><h1>Hi</h1></body></html>"#;
/// let extraction = build_seo_result(&site, html, None, None);
/// assert_eq!(extraction.seo.title.as_deref(), Some("Hello"));
/// assert_eq!(extraction.seo.h1_count, 1);
/// ```
pub fn build_seo_result(
    site: &Url,
    html: &str,
    headers: Option<&HeaderMap>,
    dom: Option<DomCounts>,
) -> SeoExtraction {
    let is_https = site.scheme() == "https";
    let header_noindex = headers.is_some_and(has_noindex_header);

    if html.trim().is_empty() {
        let seo = SeoResult::empty(is_https).with_indexable(!header_noindex);
        let seo = match dom {
            Some(counts) => seo.with_rendered_counts(counts.image_count, counts.link_count),
            None => seo,
        };
        return SeoExtraction {
            seo,
            links: Vec::new(),
        };
    }

    let document = Html::parse_document(html);

    let title = select_all(&document, "title")
        .first()
        .map(|t| t.text().collect::<String>().trim().to_string())
        .filter(|t| !t.is_empty());
    let meta_description = meta_content(&document, "description");
    let (has_viewport, viewport_content) = match find_meta(&document, "viewport") {
        Some(content) => (true, content),
        None => (false, None),
    };

    let images = select_all(&document, "img");
    let images_without_alt = images
        .iter()
        .filter(|img| attr_trimmed(img, "alt").is_none())
        .count();

    let links = scan_links(&document, site);
    let (structured_data_count, structured_data_types) = extract_structured_data(&document);

    let seo = SeoResult {
        title_length: char_len(&title),
        title,
        meta_description_length: char_len(&meta_description),
        meta_description,
        canonical_url: canonical_url(&document, site),
        h1_count: select_all(&document, "h1").len(),
        h2_count: select_all(&document, "h2").len(),
        has_viewport,
        viewport_content,
        image_count: images.len(),
        images_without_alt,
        link_count: links.internal + links.external,
        internal_link_count: links.internal,
        external_link_count: links.external,
        has_language_attribute: has_language_attribute(&document),
        has_skip_link: has_skip_link(&document),
        landmark_count: count_landmarks(&document),
        unlabeled_form_controls: count_unlabeled_controls(&document),
        structured_data_count,
        structured_data_types,
        has_open_graph: has_meta_prefix(&document, "property", "og:"),
        has_twitter_card: has_meta_prefix(&document, "name", "twitter:")
            || has_meta_prefix(&document, "property", "twitter:"),
        is_indexable: !(header_noindex || has_noindex_meta(&document)),
        is_https,
        broken_link_count: 0,
        broken_links: Vec::new(),
        dom_from_headless_browser: false,
    };

    let seo = match dom {
        Some(counts) => seo.with_rendered_counts(counts.image_count, counts.link_count),
        None => seo,
    };

    SeoExtraction {
        seo,
        links: links.crawlable,
    }
}

fn char_len(value: &Option<String>) -> usize {
    value.as_deref().map_or(0, |v| v.chars().count())
}

/// Finds a `<meta name=...>` (name matched case-insensitively)
///
/// Outer `None` means no such tag; inner `None` means the tag has no
/// usable content.
fn find_meta(document: &Html, name: &str) -> Option<Option<String>> {
    select_all(document, "meta[name]")
        .into_iter()
        .find(|meta| {
            meta.value()
                .attr("name")
                .is_some_and(|n| n.trim().eq_ignore_ascii_case(name))
        })
        .map(|meta| attr_trimmed(&meta, "content").map(str::to_string))
}

fn meta_content(document: &Html, name: &str) -> Option<String> {
    find_meta(document, name).flatten()
}

fn has_meta_prefix(document: &Html, attribute: &str, prefix: &str) -> bool {
    select_all(document, "meta").iter().any(|meta| {
        meta.value()
            .attr(attribute)
            .is_some_and(|value| value.trim().to_ascii_lowercase().starts_with(prefix))
    })
}

/// Any `robots` meta tag listing `noindex`
fn has_noindex_meta(document: &Html) -> bool {
    select_all(document, "meta[name]").iter().any(|meta| {
        let is_robots = meta
            .value()
            .attr("name")
            .is_some_and(|n| n.trim().eq_ignore_ascii_case("robots"));
        is_robots
            && meta
                .value()
                .attr("content")
                .is_some_and(directives_include_noindex)
    })
}

/// Any `X-Robots-Tag` header value listing `noindex`
///
/// Every occurrence of the header is consulted. Directives may be scoped
/// to a crawler (`googlebot: noindex`).
fn has_noindex_header(headers: &HeaderMap) -> bool {
    headers
        .get_all("x-robots-tag")
        .iter()
        .filter_map(|value| value.to_str().ok())
        .any(directives_include_noindex)
}

fn directives_include_noindex(directives: &str) -> bool {
    directives.split(',').any(|directive| {
        directive
            .rsplit(':')
            .next()
            .is_some_and(|d| d.trim().eq_ignore_ascii_case("noindex"))
    })
}

/// Resolves the declared canonical URL
///
/// Absolute values pass through, relative values resolve against the
/// site, and anything unparseable is returned as written.
fn canonical_url(document: &Html, site: &Url) -> Option<String> {
    let raw = select_all(document, "link[rel][href]")
        .into_iter()
        .find(|link| {
            link.value().attr("rel").is_some_and(|rel| {
                rel.split_whitespace()
                    .any(|token| token.eq_ignore_ascii_case("canonical"))
            })
        })
        .and_then(|link| attr_trimmed(&link, "href").map(str::to_string))?;

    if Url::parse(&raw).is_ok() {
        return Some(raw);
    }
    match site.join(&raw) {
        Ok(resolved) => Some(resolved.to_string()),
        Err(_) => Some(raw),
    }
}

#[derive(Debug, Default)]
struct LinkScan {
    internal: usize,
    external: usize,
    crawlable: Vec<String>,
}

/// Classifies every navigational `<a href>` on the page
///
/// Fragment, `mailto:`, `tel:` and `javascript:` targets are ignored.
/// Hrefs that cannot be parsed or resolved still count as internal but are
/// not offered for health checking.
fn scan_links(document: &Html, site: &Url) -> LinkScan {
    let mut scan = LinkScan::default();

    for anchor in select_all(document, "a[href]") {
        let Some(href) = attr_trimmed(&anchor, "href") else {
            continue;
        };
        if is_non_navigational(href) {
            continue;
        }

        let resolved = match Url::parse(href) {
            Ok(absolute) => Some(absolute),
            Err(url::ParseError::RelativeUrlWithoutBase) => site.join(href).ok(),
            Err(_) => None,
        };

        match resolved {
            Some(target) => {
                if is_same_host(site, &target) {
                    scan.internal += 1;
                } else {
                    scan.external += 1;
                }
                if matches!(target.scheme(), "http" | "https") {
                    scan.crawlable.push(target.to_string());
                }
            }
            None => scan.internal += 1,
        }
    }

    scan
}

fn is_non_navigational(href: &str) -> bool {
    if href.starts_with('#') {
        return true;
    }
    let lower = href.to_ascii_lowercase();
    lower.starts_with("mailto:") || lower.starts_with("tel:") || lower.starts_with("javascript:")
}
