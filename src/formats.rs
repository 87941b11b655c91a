//! Export format catalog
//!
//! Fixed table of target pixel dimensions and fit strategies for the
//! social-media and marketplace exports the product offers. The catalog is
//! configuration data: it is defined at build time and never mutated.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};

/// Geometric policy used to reconcile a source image's aspect ratio with the
/// target rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FitStrategy {
    /// Scale preserving aspect ratio, then crop the overflowing dimension so
    /// the output exactly fills the target.
    Cover,
    /// Scale to fit entirely within the target, padding the remainder with
    /// opaque white.
    Contain,
    /// Stretch both axes independently to the target, ignoring aspect ratio.
    Fill,
}

/// One named target export size.
#[derive(Debug, Clone, Serialize)]
pub struct ImageFormat {
    pub key: &'static str,
    pub name: &'static str,
    pub width: u32,
    pub height: u32,
    pub fit: FitStrategy,
}

/// Key prefixes that mark a format as belonging to the social partition.
const SOCIAL_PREFIXES: [&str; 1] = ["instagram"];

/// The full catalog, in declaration order. Declaration order is also the
/// display order for format pickers.
pub const IMAGE_FORMATS: [ImageFormat; 6] = [
    ImageFormat {
        key: "instagram-story",
        name: "Instagram Story",
        width: 1080,
        height: 1920,
        fit: FitStrategy::Cover,
    },
    ImageFormat {
        key: "instagram-post",
        name: "Instagram Post",
        width: 1080,
        height: 1080,
        fit: FitStrategy::Cover,
    },
    ImageFormat {
        key: "instagram-portrait",
        name: "Instagram Retrato",
        width: 1080,
        height: 1350,
        fit: FitStrategy::Cover,
    },
    ImageFormat {
        key: "mercadolivre",
        name: "Mercado Livre",
        width: 1200,
        height: 1200,
        fit: FitStrategy::Contain,
    },
    ImageFormat {
        key: "shopee",
        name: "Shopee",
        width: 1024,
        height: 1024,
        fit: FitStrategy::Contain,
    },
    ImageFormat {
        key: "amazon",
        name: "Amazon",
        width: 2000,
        height: 2000,
        fit: FitStrategy::Contain,
    },
];

impl ImageFormat {
    /// Whether this format belongs to the social partition (key prefixed
    /// with a social-platform name). Everything else is a marketplace
    /// format.
    pub fn is_social(&self) -> bool {
        SOCIAL_PREFIXES
            .iter()
            .any(|prefix| self.key.starts_with(prefix))
    }
}

/// Look up a format descriptor by key.
pub fn lookup(key: &str) -> Result<&'static ImageFormat> {
    IMAGE_FORMATS
        .iter()
        .find(|format| format.key == key)
        .ok_or_else(|| Error::InvalidFormat(key.to_string()))
}

/// All format descriptors, in declaration order.
pub fn all() -> &'static [ImageFormat] {
    &IMAGE_FORMATS
}

/// All format keys, in declaration order.
pub fn keys() -> Vec<&'static str> {
    IMAGE_FORMATS.iter().map(|format| format.key).collect()
}

/// Social formats, in declaration order.
pub fn social() -> impl Iterator<Item = &'static ImageFormat> {
    IMAGE_FORMATS.iter().filter(|format| format.is_social())
}

/// Marketplace formats, in declaration order.
pub fn marketplace() -> impl Iterator<Item = &'static ImageFormat> {
    IMAGE_FORMATS.iter().filter(|format| !format.is_social())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_formats_have_positive_dimensions() {
        for format in all() {
            let descriptor = lookup(format.key).unwrap();
            assert!(descriptor.width > 0, "{} width", format.key);
            assert!(descriptor.height > 0, "{} height", format.key);
        }
    }

    #[test]
    fn test_keys_are_unique() {
        let keys = keys();
        for (i, key) in keys.iter().enumerate() {
            assert!(!keys[i + 1..].contains(key), "duplicate key {}", key);
        }
    }

    #[test]
    fn test_lookup_unknown_key_fails_with_invalid_format() {
        let err = lookup("nonexistent-key").unwrap_err();
        assert!(matches!(err, Error::InvalidFormat(_)));
        assert!(err.to_string().contains("nonexistent-key"));
    }

    #[test]
    fn test_catalog_is_in_declaration_order() {
        assert_eq!(
            keys(),
            vec![
                "instagram-story",
                "instagram-post",
                "instagram-portrait",
                "mercadolivre",
                "shopee",
                "amazon",
            ]
        );
    }

    #[test]
    fn test_exact_dimensions() {
        let amazon = lookup("amazon").unwrap();
        assert_eq!((amazon.width, amazon.height), (2000, 2000));
        assert_eq!(amazon.fit, FitStrategy::Contain);

        let story = lookup("instagram-story").unwrap();
        assert_eq!((story.width, story.height), (1080, 1920));
        assert_eq!(story.fit, FitStrategy::Cover);
    }

    #[test]
    fn test_partitions() {
        let social: Vec<_> = social().map(|f| f.key).collect();
        let marketplace: Vec<_> = marketplace().map(|f| f.key).collect();

        assert_eq!(
            social,
            vec!["instagram-story", "instagram-post", "instagram-portrait"]
        );
        assert_eq!(marketplace, vec!["mercadolivre", "shopee", "amazon"]);
        assert_eq!(social.len() + marketplace.len(), all().len());
    }

    #[test]
    fn test_fit_strategy_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&FitStrategy::Contain).unwrap(),
            "\"contain\""
        );
    }
}
