//! Catalog and deployment manifest documents.
//!
//! The catalog document (`portfolio.yaml`) lists products with their
//! ownership metadata and versions. The deployment manifest
//! (`manifest.yaml`) maps product names to launch configuration.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::CatalogResult;
use crate::resolver::Resolution;

/// Schema identifier of the catalog document.
pub const PORTFOLIO_SCHEMA: &str = "factory-2019-04-01";

/// Schema identifier of the deployment manifest.
pub const MANIFEST_SCHEMA: &str = "puppet-2019-04-01";

/// File name of the catalog document.
pub const PORTFOLIO_FILE: &str = "portfolio.yaml";

/// File name of the deployment manifest.
pub const MANIFEST_FILE: &str = "manifest.yaml";

/// Source provider for product repositories.
pub const CODECOMMIT_PROVIDER: &str = "CodeCommit";

/// Placeholder for parameters with neither a registered output nor a default.
pub const PLACEHOLDER_DEFAULT: &str = "SET_ME";

// ============================================================================
// Catalog document
// ============================================================================

/// Key/value tag attached to a product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CatalogTag {
    pub key: String,
    pub value: String,
}

/// Repository location of a product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ProductSource {
    pub provider: String,
    pub configuration: RepositoryConfiguration,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RepositoryConfiguration {
    pub repository_name: String,
}

/// Branch a version is built from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct VersionSource {
    pub configuration: BranchConfiguration,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct BranchConfiguration {
    pub branch_name: String,
}

/// One version of a catalog product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct VersionEntry {
    pub name: String,
    pub description: String,
    pub source: VersionSource,
}

impl VersionEntry {
    /// A version built from the branch of the same name.
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            source: VersionSource {
                configuration: BranchConfiguration {
                    branch_name: name.clone(),
                },
            },
            name,
            description: description.into(),
        }
    }
}

/// A product in the catalog document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CatalogEntry {
    pub name: String,
    pub owner: String,
    pub description: String,
    pub distributor: String,
    pub support_description: String,
    pub support_email: String,
    pub support_url: String,
    pub source: ProductSource,
    pub versions: Vec<VersionEntry>,
    pub tags: Vec<CatalogTag>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Portfolios {
    pub products: Vec<CatalogEntry>,
}

/// The catalog document written to `portfolio.yaml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PortfolioDocument {
    pub schema: String,
    pub portfolios: Portfolios,
}

// ============================================================================
// Deployment manifest
// ============================================================================

/// Region/tag selector a product is deployed to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeployTag {
    pub regions: String,
    pub tag: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeployTo {
    pub tags: Vec<DeployTag>,
}

/// Publication of a stack output into the parameter store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputBinding {
    pub param_name: String,
    pub stack_output: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LaunchOutputs {
    pub ssm: Vec<OutputBinding>,
}

/// Parameter-store lookup of a parameter value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SsmParameter {
    pub name: String,
}

/// How a launch parameter gets its value.
///
/// Exactly one of the fields is set. This is a struct rather than an enum so
/// it serializes as `{ssm: {name}}` / `{default: value}` instead of a YAML tag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterBinding {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ssm: Option<SsmParameter>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<serde_yaml::Value>,
}

impl ParameterBinding {
    /// Read the value from a published path.
    pub fn ssm(name: impl Into<String>) -> Self {
        Self {
            ssm: Some(SsmParameter { name: name.into() }),
            default: None,
        }
    }

    /// Use a literal default value.
    pub fn default_value(value: serde_yaml::Value) -> Self {
        Self {
            ssm: None,
            default: Some(value),
        }
    }

    /// Use the placeholder the operator has to replace.
    pub fn placeholder() -> Self {
        Self::default_value(serde_yaml::Value::String(PLACEHOLDER_DEFAULT.to_string()))
    }

    pub fn is_external(&self) -> bool {
        self.ssm.is_some()
    }
}

/// Launch configuration of one product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LaunchEntry {
    pub portfolio: String,
    pub product: String,
    pub version: String,
    pub deploy_to: DeployTo,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outputs: Option<LaunchOutputs>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub depends_on: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameters: Option<BTreeMap<String, ParameterBinding>>,
}

impl LaunchEntry {
    pub fn new(
        portfolio: impl Into<String>,
        product: impl Into<String>,
        version: impl Into<String>,
        deploy_to_regions: impl Into<String>,
        deploy_to_tag: impl Into<String>,
    ) -> Self {
        Self {
            portfolio: portfolio.into(),
            product: product.into(),
            version: version.into(),
            deploy_to: DeployTo {
                tags: vec![DeployTag {
                    regions: deploy_to_regions.into(),
                    tag: deploy_to_tag.into(),
                }],
            },
            outputs: None,
            depends_on: None,
            parameters: None,
        }
    }
}

/// The deployment manifest written to `manifest.yaml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeploymentManifest {
    pub schema: String,
    pub launches: BTreeMap<String, LaunchEntry>,
}

// ============================================================================
// Builder
// ============================================================================

/// Accumulates catalog and launch entries across both build passes.
#[derive(Debug, Default)]
pub struct ManifestBuilder {
    products: Vec<CatalogEntry>,
    launches: BTreeMap<String, LaunchEntry>,
}

impl ManifestBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a product to the catalog.
    pub fn add_product(&mut self, entry: CatalogEntry) {
        debug!("Adding catalog product {}", entry.name);
        self.products.push(entry);
    }

    /// Append a version to a product already in the catalog.
    ///
    /// Returns false when the product is unknown.
    pub fn add_version(&mut self, product: &str, version: VersionEntry) -> bool {
        match self.products.iter_mut().rev().find(|p| p.name == product) {
            Some(entry) => {
                entry.versions.push(version);
                true
            }
            None => false,
        }
    }

    /// Start the launch entry of a product, replacing any earlier version's.
    pub fn start_launch(&mut self, entry: LaunchEntry) {
        self.launches.insert(entry.product.clone(), entry);
    }

    /// Attach output publications to a product's launch entry.
    ///
    /// Nothing is attached for an empty list.
    pub fn attach_outputs(&mut self, product: &str, bindings: Vec<OutputBinding>) {
        if bindings.is_empty() {
            return;
        }
        if let Some(launch) = self.launches.get_mut(product) {
            launch.outputs = Some(LaunchOutputs { ssm: bindings });
        }
    }

    /// Apply a version's parameter resolution to its product's launch entry.
    ///
    /// Dependencies are appended without deduplication. Parameters replace
    /// those of earlier versions and are only set when non-empty.
    pub fn apply_resolution(&mut self, product: &str, resolution: Resolution) {
        let Some(launch) = self.launches.get_mut(product) else {
            return;
        };
        for dependency in resolution.depends_on {
            launch.depends_on.get_or_insert_with(Vec::new).push(dependency);
        }
        if !resolution.parameters.is_empty() {
            launch.parameters = Some(resolution.parameters);
        }
    }

    pub fn products(&self) -> &[CatalogEntry] {
        &self.products
    }

    pub fn launch(&self, product: &str) -> Option<&LaunchEntry> {
        self.launches.get(product)
    }

    /// The catalog document.
    pub fn portfolio(&self) -> PortfolioDocument {
        PortfolioDocument {
            schema: PORTFOLIO_SCHEMA.to_string(),
            portfolios: Portfolios {
                products: self.products.clone(),
            },
        }
    }

    /// The deployment manifest.
    pub fn manifest(&self) -> DeploymentManifest {
        DeploymentManifest {
            schema: MANIFEST_SCHEMA.to_string(),
            launches: self.launches.clone(),
        }
    }

    /// Serialize both documents, then write them into `dir`.
    ///
    /// Returns the paths of the catalog document and the deployment manifest.
    pub fn write_to(&self, dir: &Path) -> CatalogResult<(PathBuf, PathBuf)> {
        let portfolio = serde_yaml::to_string(&self.portfolio())?;
        let manifest = serde_yaml::to_string(&self.manifest())?;

        let portfolio_path = dir.join(PORTFOLIO_FILE);
        let manifest_path = dir.join(MANIFEST_FILE);
        fs::write(&portfolio_path, portfolio)?;
        fs::write(&manifest_path, manifest)?;

        info!(
            "Wrote {} products to {:?} and {} launches to {:?}",
            self.products.len(),
            portfolio_path,
            self.launches.len(),
            manifest_path
        );
        Ok((portfolio_path, manifest_path))
    }
}
