//! # sct_catalog
//!
//! Portfolio and launch manifest generation for Service Catalog product sets.
//!
//! A product set is a directory tree `{set}/{product}/{version}/` where each
//! version holds a `product.template.yaml` or `product.template.json`. The
//! builder turns it into:
//!
//! - `portfolio.yaml`: products, versions, ownership and support metadata
//! - `manifest.yaml`: per-product launch configuration, with parameters wired
//!   to outputs exported by other products and the resulting `depends_on`
//!
//! It also writes a `README.md` per version and rewrites each YAML
//! template's `Description` to carry machine-readable metadata.
//!
//! ## Example
//!
//! ```rust,no_run
//! use sct_catalog::{BuildConfig, ProductMetadata, ProductSetBuilder};
//! use std::path::Path;
//!
//! let metadata = ProductMetadata {
//!     owner: "platform".into(),
//!     distributor: "cloud team".into(),
//!     support_description: "Raise a ticket".into(),
//!     support_email: "cloud@example.com".into(),
//!     support_url: "https://example.com/support".into(),
//!     tags: Vec::new(),
//! };
//! let config = BuildConfig::new(metadata, "networking")
//!     .with_deploy_to("[eu-west-1]", "role:spoke");
//!
//! let report = ProductSetBuilder::new(config)
//!     .build(Path::new("./networking"))
//!     .unwrap();
//! println!("{} products", report.products);
//! ```

pub mod builder;
pub mod config;
pub mod description;
pub mod docs;
pub mod error;
pub mod manifest;
pub mod registry;
pub mod resolver;
pub mod rewriter;
pub mod template;

pub use builder::{
    scan_product_set, BuildPlan, BuildReport, BuildWarning, ProductSet, ProductSetBuilder,
    ScannedProduct, ScannedVersion,
};
pub use config::{home_region, parse_tags, BuildConfig, DescriptionSource, ProductMetadata};
pub use description::{split_description, SplitDescription};
pub use docs::{DocGenerator, MarkdownDocGenerator};
pub use error::{CatalogError, CatalogResult};
pub use manifest::{
    CatalogEntry, CatalogTag, DeploymentManifest, LaunchEntry, ManifestBuilder, OutputBinding,
    ParameterBinding, PortfolioDocument, VersionEntry, MANIFEST_FILE, PORTFOLIO_FILE,
};
pub use registry::{CollisionPolicy, OutputRegistry, OutputRegistryEntry};
pub use resolver::{DependencyResolver, Resolution};
pub use rewriter::{find_description_span, rewrite_description, TemplateMetadata};
pub use template::{load_template, LoadedTemplate, Template, TemplateFormat};
