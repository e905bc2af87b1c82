//! Product and store metadata derived from the listing URL alone.
//!
//! Marketplace product URLs carry the store and product slugs
//! (`/{store}/{product-slug}/review`), which is enough for a fast,
//! browser-free summary. Slug parsing is best-effort: anything that does not
//! parse falls back to `"Unknown Product"` / `"Unknown Store"`.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;
use url::Url;

static STORAGE_SUFFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\d+[gm]b$").unwrap());
static REVIEW_SUFFIX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)review$").unwrap());
static MULTI_SPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

/// URL-derived product metadata attached to every scrape result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductInfo {
    pub product_name: String,
    pub store_name: String,
    pub product_url: String,
    pub review_url: String,
}

impl ProductInfo {
    /// Derive all metadata from a product or review URL.
    pub fn from_url(raw: &str) -> Self {
        let product_url = strip_review_suffix(raw);
        let review_url = if raw.contains("/review") {
            raw.to_string()
        } else {
            format!("{}/review", raw.trim_end_matches('/'))
        };
        Self {
            product_name: product_name_from_url(raw),
            store_name: store_name_from_url(raw),
            product_url,
            review_url,
        }
    }
}

fn strip_review_suffix(raw: &str) -> String {
    match raw.find("/review") {
        Some(idx) => raw[..idx].to_string(),
        None => raw.to_string(),
    }
}

/// Extract a readable product name from the product slug.
pub fn product_name_from_url(raw: &str) -> String {
    let Ok(parsed) = Url::parse(raw) else {
        return "Unknown Product".to_string();
    };
    let path = parsed.path();
    let path = path.strip_suffix("/review").unwrap_or(path);

    let Some(slug) = path.rsplit('/').find(|p| !p.is_empty() && *p != "review") else {
        return "Unknown Product".to_string();
    };

    // The last slug token is usually an opaque catalog id ("...-94e22").
    let slug = match slug.rsplit_once('-') {
        Some((head, tail)) if looks_like_catalog_id(tail) => head,
        _ => slug,
    };

    let mut name = slug.replace('-', " ");
    // Storage size and "review" tokens are noise.
    name = STORAGE_SUFFIX.replace(&name, "").to_string();
    name = REVIEW_SUFFIX.replace(&name, "").to_string();

    let name = name
        .split_whitespace()
        .map(capitalize)
        .collect::<Vec<_>>()
        .join(" ");
    let name = MULTI_SPACE.replace_all(&name, " ").trim().to_string();

    if name.is_empty() {
        "Unknown Product".to_string()
    } else {
        name
    }
}

/// Extract the store name from the first path segment.
pub fn store_name_from_url(raw: &str) -> String {
    let Ok(parsed) = Url::parse(raw) else {
        return "Unknown Store".to_string();
    };
    let Some(slug) = parsed.path().split('/').find(|p| !p.is_empty()) else {
        return "Unknown Store".to_string();
    };
    slug.split('-').map(capitalize).collect::<Vec<_>>().join(" ")
}

fn looks_like_catalog_id(token: &str) -> bool {
    token.len() >= 4
        && token.chars().all(|c| c.is_ascii_alphanumeric())
        && token.chars().any(|c| c.is_ascii_digit())
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(|c| c.to_lowercase())).collect(),
        None => String::new(),
    }
}
