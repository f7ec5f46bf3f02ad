//! Import of a generated product set into a portfolio file.

use std::path::{Path, PathBuf};

use serde_yaml::Value;
use tracing::{debug, info};

use sct_catalog::manifest::CODECOMMIT_PROVIDER;
use sct_catalog::PORTFOLIO_FILE;

use crate::error::{ImportError, ImportResult};
use crate::merge::deep_merge;
use crate::portfolio::{read_portfolio, source_products, target_products, write_portfolio};
use crate::publisher::{PublishRequest, RepoPublisher};

/// Options for one import run.
#[derive(Debug, Clone)]
pub struct ImportOptions {
    /// Portfolio file the products are appended to
    pub target_portfolio: PathBuf,
    /// Portfolio `DisplayName` to add the products under
    pub portfolio_name: Option<String>,
    /// Product-set directory holding `portfolio.yaml` and the sources
    pub source_product_set: PathBuf,
    /// Whether to publish CodeCommit-backed versions
    pub publish: bool,
}

impl ImportOptions {
    pub fn new(target_portfolio: impl Into<PathBuf>, source_product_set: impl Into<PathBuf>) -> Self {
        Self {
            target_portfolio: target_portfolio.into(),
            portfolio_name: None,
            source_product_set: source_product_set.into(),
            publish: true,
        }
    }

    pub fn with_portfolio_name(mut self, name: Option<String>) -> Self {
        self.portfolio_name = name;
        self
    }

    pub fn without_publishing(mut self) -> Self {
        self.publish = false;
        self
    }
}

/// Summary of an import run.
#[derive(Debug, Clone, Default)]
pub struct ImportReport {
    pub products_imported: usize,
    pub published: Vec<PublishRequest>,
}

fn text_field<'a>(value: &'a Value, field: &str, product: &str) -> ImportResult<&'a str> {
    value
        .get(field)
        .and_then(Value::as_str)
        .ok_or_else(|| ImportError::MissingField {
            product: product.to_string(),
            field: field.to_string(),
        })
}

/// Publish requests for every CodeCommit-backed version of `product`.
pub fn publish_requests(product: &Value, source_root: &Path) -> ImportResult<Vec<PublishRequest>> {
    let product_name = text_field(product, "Name", "<unnamed>")?;
    let product_source = product.get("Source").cloned().unwrap_or(Value::Null);
    let versions = product
        .get("Versions")
        .and_then(Value::as_sequence)
        .ok_or_else(|| ImportError::MissingField {
            product: product_name.to_string(),
            field: "Versions".to_string(),
        })?;

    let mut requests = Vec::new();
    for version in versions {
        let version_name = text_field(version, "Name", product_name)?;
        let source = match version.get("Source") {
            Some(overlay) => deep_merge(&product_source, overlay),
            None => product_source.clone(),
        };

        if source.get("Provider").and_then(Value::as_str) != Some(CODECOMMIT_PROVIDER) {
            debug!("Version {}/{} is not CodeCommit-backed", product_name, version_name);
            continue;
        }

        let configuration = source.get("Configuration").cloned().unwrap_or(Value::Null);
        requests.push(PublishRequest {
            repository_name: text_field(&configuration, "RepositoryName", product_name)?.to_string(),
            branch_name: text_field(&configuration, "BranchName", product_name)?.to_string(),
            source_dir: source_root.join(product_name).join(version_name),
        });
    }
    Ok(requests)
}

/// Imports generated product sets into portfolio files.
pub struct ProductSetImporter<P: RepoPublisher> {
    publisher: P,
}

impl<P: RepoPublisher> ProductSetImporter<P> {
    pub fn new(publisher: P) -> Self {
        Self { publisher }
    }

    pub fn publisher(&self) -> &P {
        &self.publisher
    }

    /// Append the product set's products to the target portfolio, publish
    /// their sources, then write the target portfolio back.
    pub async fn import(&self, options: &ImportOptions) -> ImportResult<ImportReport> {
        let mut document = read_portfolio(&options.target_portfolio)?;
        let segment = read_portfolio(&options.source_product_set.join(PORTFOLIO_FILE))?;
        let products = source_products(&segment)?;

        let mut requests = Vec::new();
        for product in &products {
            requests.extend(publish_requests(product, &options.source_product_set)?);
        }

        let target = target_products(&mut document, options.portfolio_name.as_deref())?;
        target.extend(products.iter().cloned());
        info!(
            "Adding {} products to {:?}",
            products.len(),
            options.target_portfolio
        );

        let mut report = ImportReport {
            products_imported: products.len(),
            published: Vec::new(),
        };
        if options.publish {
            for request in requests {
                self.publisher.publish(&request).await?;
                report.published.push(request);
            }
        }

        write_portfolio(&options.target_portfolio, &document)?;
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_publish_requests_merge_sources() {
        let product: Value = serde_yaml::from_str(
            "Name: vpc\nSource:\n  Provider: CodeCommit\n  Configuration:\n    RepositoryName: vpc\nVersions:\n  - Name: v1\n    Source:\n      Configuration:\n        BranchName: v1\n",
        )
        .unwrap();

        let requests = publish_requests(&product, Path::new("/sets/net")).unwrap();
        assert_eq!(
            requests,
            vec![PublishRequest {
                repository_name: "vpc".to_string(),
                branch_name: "v1".to_string(),
                source_dir: PathBuf::from("/sets/net/vpc/v1"),
            }]
        );
    }

    #[test]
    fn test_publish_requests_skip_other_providers() {
        let product: Value = serde_yaml::from_str(
            "Name: vpc\nSource:\n  Provider: GitHub\nVersions:\n  - Name: v1\n",
        )
        .unwrap();
        assert!(publish_requests(&product, Path::new("/x")).unwrap().is_empty());
    }

    #[test]
    fn test_publish_requests_missing_branch() {
        let product: Value = serde_yaml::from_str(
            "Name: vpc\nSource:\n  Provider: CodeCommit\n  Configuration:\n    RepositoryName: vpc\nVersions:\n  - Name: v1\n",
        )
        .unwrap();
        let err = publish_requests(&product, Path::new("/x")).unwrap_err();
        assert!(matches!(err, ImportError::MissingField { ref field, .. } if field == "BranchName"));
    }
}
