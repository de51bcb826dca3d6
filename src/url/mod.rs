//! URL handling module for Sumi-Harvest
//!
//! This module provides canonical deduplication keys and the authority checks
//! that keep a crawl on its seed's domain.

mod domain;
mod normalize;

pub use domain::{extract_authority, is_same_authority, parse_web_url};
pub use normalize::{canonical_key, normalize_url, CanonicalKey};
