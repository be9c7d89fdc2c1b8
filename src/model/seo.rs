use serde::{Deserialize, Serialize};

/// A sampled link that failed its health check
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BrokenLink {
    pub url: String,
    pub is_internal: bool,
    /// HTTP status, or 0 when the connection itself failed
    pub status_code: u16,
    pub reason: Option<String>,
}

/// SEO and accessibility signals extracted from one page
///
/// Values are never patched in place; later pipeline stages build a new
/// value through the `with_*` methods.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeoResult {
    pub title: Option<String>,
    pub title_length: usize,
    pub meta_description: Option<String>,
    pub meta_description_length: usize,
    pub canonical_url: Option<String>,

    pub h1_count: usize,
    pub h2_count: usize,

    pub has_viewport: bool,
    pub viewport_content: Option<String>,

    pub image_count: usize,
    pub images_without_alt: usize,
    /// Total anchors; the rendered DOM count when one was supplied
    pub link_count: usize,
    /// Internal/external split of the links parsed from HTML. Not rescaled
    /// to a rendered `link_count`, so the two need not add up to it.
    pub internal_link_count: usize,
    pub external_link_count: usize,

    pub has_language_attribute: bool,
    pub has_skip_link: bool,
    pub landmark_count: usize,
    pub unlabeled_form_controls: usize,

    pub structured_data_count: usize,
    pub structured_data_types: Vec<String>,

    pub has_open_graph: bool,
    pub has_twitter_card: bool,

    pub is_indexable: bool,
    pub is_https: bool,

    pub broken_link_count: usize,
    pub broken_links: Vec<BrokenLink>,

    /// Image/link counts came from a rendered DOM rather than static HTML
    pub dom_from_headless_browser: bool,
}

impl SeoResult {
    /// Result used when no HTML is available
    ///
    /// Absence of a robots signal means the page is assumed indexable.
    pub fn empty(is_https: bool) -> Self {
        Self {
            title: None,
            title_length: 0,
            meta_description: None,
            meta_description_length: 0,
            canonical_url: None,
            h1_count: 0,
            h2_count: 0,
            has_viewport: false,
            viewport_content: None,
            image_count: 0,
            images_without_alt: 0,
            link_count: 0,
            internal_link_count: 0,
            external_link_count: 0,
            has_language_attribute: false,
            has_skip_link: false,
            landmark_count: 0,
            unlabeled_form_controls: 0,
            structured_data_count: 0,
            structured_data_types: Vec::new(),
            has_open_graph: false,
            has_twitter_card: false,
            is_indexable: true,
            is_https,
            broken_link_count: 0,
            broken_links: Vec::new(),
            dom_from_headless_browser: false,
        }
    }

    /// Returns a copy carrying the given broken links; the count always
    /// matches the list length.
    pub fn with_broken_links(self, broken_links: Vec<BrokenLink>) -> Self {
        Self {
            broken_link_count: broken_links.len(),
            broken_links,
            ..self
        }
    }

    /// Returns a copy whose image/link totals come from a rendered DOM
    ///
    /// The internal/external split stays as parsed; a rendered DOM only
    /// reports totals.
    pub fn with_rendered_counts(self, image_count: usize, link_count: usize) -> Self {
        Self {
            images_without_alt: self.images_without_alt.min(image_count),
            image_count,
            link_count,
            dom_from_headless_browser: true,
            ..self
        }
    }

    /// Returns a copy with indexability overridden
    pub fn with_indexable(self, is_indexable: bool) -> Self {
        Self {
            is_indexable,
            ..self
        }
    }

    pub fn has_canonical(&self) -> bool {
        self.canonical_url
            .as_deref()
            .is_some_and(|c| !c.trim().is_empty())
    }
}
