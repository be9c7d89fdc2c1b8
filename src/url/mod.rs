//! URL handling module for Site-Auditor
//!
//! This module turns raw user input into absolute http(s) URLs and answers
//! host-matching questions used to classify links as internal or external.

mod host;
mod normalize;

pub use host::{extract_host, is_internal_link, is_same_host};
pub use normalize::normalize_url;
