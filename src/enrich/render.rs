use crate::seo::DomCounts;
use async_trait::async_trait;
use tokio_util::sync::CancellationToken;
use url::Url;

/// Snapshot of a page after client-side rendering
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderedPage {
    /// Serialized DOM, when the renderer provides it
    pub html: Option<String>,
    pub image_count: usize,
    pub link_count: usize,
}

impl RenderedPage {
    pub fn counts(&self) -> DomCounts {
        DomCounts {
            image_count: self.image_count,
            link_count: self.link_count,
        }
    }
}

/// Headless-browser capability used in deep mode
///
/// Implementations drive a real browser; the analysis falls back to static
/// HTML whenever rendering fails.
#[async_trait]
pub trait DomRenderer: Send + Sync {
    async fn render(&self, url: &Url, cancel: &CancellationToken) -> anyhow::Result<RenderedPage>;
}
