//! Build configuration for a product set.

use serde::{Deserialize, Serialize};

use crate::error::{CatalogError, CatalogResult};
use crate::manifest::CatalogTag;
use crate::registry::CollisionPolicy;

/// Region used when neither `AWS_REGION` nor `AWS_DEFAULT_REGION` is set.
pub const FALLBACK_REGION: &str = "eu-west-1";

/// Where a product's catalog description comes from.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum DescriptionSource {
    /// The product's own name
    #[default]
    ProductName,
    /// The same text for every product
    Fixed(String),
}

impl DescriptionSource {
    pub fn describe(&self, product: &str) -> String {
        match self {
            DescriptionSource::ProductName => product.to_string(),
            DescriptionSource::Fixed(text) => text.clone(),
        }
    }
}

/// Ownership and support metadata shared by every product of a set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductMetadata {
    pub owner: String,
    pub distributor: String,
    pub support_description: String,
    pub support_email: String,
    pub support_url: String,
    #[serde(default)]
    pub tags: Vec<CatalogTag>,
}

/// Configuration of one product-set build.
#[derive(Debug, Clone, Default)]
pub struct BuildConfig {
    /// Metadata copied onto every catalog entry
    pub metadata: ProductMetadata,
    /// Portfolio every product is launched from
    pub portfolio: String,
    /// Regions selector for `deploy_to`
    pub deploy_to_regions: String,
    /// Tag selector for `deploy_to`
    pub deploy_to_tags: String,
    pub description_source: DescriptionSource,
    pub collision_policy: CollisionPolicy,
}

impl BuildConfig {
    pub fn new(metadata: ProductMetadata, portfolio: impl Into<String>) -> Self {
        Self {
            metadata,
            portfolio: portfolio.into(),
            ..Self::default()
        }
    }

    pub fn with_deploy_to(mut self, regions: impl Into<String>, tags: impl Into<String>) -> Self {
        self.deploy_to_regions = regions.into();
        self.deploy_to_tags = tags.into();
        self
    }

    pub fn with_description_source(mut self, source: DescriptionSource) -> Self {
        self.description_source = source;
        self
    }

    pub fn with_collision_policy(mut self, policy: CollisionPolicy) -> Self {
        self.collision_policy = policy;
        self
    }
}

/// Parse product tags given as a JSON list of `{"Key": .., "Value": ..}`.
pub fn parse_tags(json: &str) -> CatalogResult<Vec<CatalogTag>> {
    serde_json::from_str(json).map_err(|e| CatalogError::InvalidTags(e.to_string()))
}

/// Default deployment region from the environment.
pub fn home_region() -> String {
    region_from(
        std::env::var("AWS_REGION").ok(),
        std::env::var("AWS_DEFAULT_REGION").ok(),
    )
}

fn region_from(region: Option<String>, default_region: Option<String>) -> String {
    region
        .filter(|r| !r.is_empty())
        .or(default_region.filter(|r| !r.is_empty()))
        .unwrap_or_else(|| FALLBACK_REGION.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_description_source() {
        assert_eq!(DescriptionSource::ProductName.describe("vpc"), "vpc");
        assert_eq!(
            DescriptionSource::Fixed("Networking".to_string()).describe("vpc"),
            "Networking"
        );
    }

    #[test]
    fn test_parse_tags() {
        let tags = parse_tags(r#"[{"Key": "team", "Value": "platform"}]"#).unwrap();
        assert_eq!(
            tags,
            vec![CatalogTag {
                key: "team".to_string(),
                value: "platform".to_string()
            }]
        );
        assert!(parse_tags("[]").unwrap().is_empty());
    }

    #[test]
    fn test_parse_tags_invalid() {
        let err = parse_tags(r#"{"team": "platform"}"#).unwrap_err();
        assert!(matches!(err, CatalogError::InvalidTags(_)));
    }

    #[test]
    fn test_region_fallbacks() {
        assert_eq!(region_from(Some("us-east-1".into()), Some("eu-central-1".into())), "us-east-1");
        assert_eq!(region_from(None, Some("eu-central-1".into())), "eu-central-1");
        assert_eq!(region_from(Some(String::new()), None), FALLBACK_REGION);
    }

    #[test]
    fn test_builder_methods() {
        let config = BuildConfig::new(ProductMetadata::default(), "demo")
            .with_deploy_to("[eu-west-1]", "role:spoke")
            .with_collision_policy(CollisionPolicy::Reject);
        assert_eq!(config.portfolio, "demo");
        assert_eq!(config.deploy_to_regions, "[eu-west-1]");
        assert_eq!(config.collision_policy, CollisionPolicy::Reject);
        assert_eq!(config.description_source, DescriptionSource::ProductName);
    }
}
