//! Two-pass product-set builder.
//!
//! Every template is loaded before anything is registered, so a missing or
//! malformed template aborts the run with nothing written. Pass 1 registers
//! outputs and fills catalog and launch entries; pass 2 resolves parameters
//! against the complete registry. Only then are READMEs and rewritten
//! templates written, followed by `portfolio.yaml` and `manifest.yaml`.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::config::BuildConfig;
use crate::description::{split_description, SplitDescription};
use crate::docs::{DocGenerator, MarkdownDocGenerator};
use crate::error::{CatalogError, CatalogResult};
use crate::manifest::{
    CatalogEntry, LaunchEntry, ManifestBuilder, OutputBinding, ProductSource,
    RepositoryConfiguration, VersionEntry, CODECOMMIT_PROVIDER,
};
use crate::registry::OutputRegistry;
use crate::resolver::DependencyResolver;
use crate::rewriter::{rewrite_description, TemplateMetadata};
use crate::template::{load_template, LoadedTemplate, TemplateFormat};

/// File name of the generated version documentation.
pub const README_FILE: &str = "README.md";

/// A version directory with its loaded template.
#[derive(Debug, Clone)]
pub struct ScannedVersion {
    pub name: String,
    pub dir: PathBuf,
    pub template: LoadedTemplate,
    pub description: SplitDescription,
}

/// A product directory with its versions in scan order.
#[derive(Debug, Clone)]
pub struct ScannedProduct {
    pub name: String,
    pub dir: PathBuf,
    pub versions: Vec<ScannedVersion>,
}

/// A product-set directory tree with every template loaded.
#[derive(Debug, Clone)]
pub struct ProductSet {
    pub name: String,
    pub root: PathBuf,
    pub products: Vec<ScannedProduct>,
}

impl ProductSet {
    pub fn version_count(&self) -> usize {
        self.products.iter().map(|p| p.versions.len()).sum()
    }
}

/// Sorted, non-hidden subdirectories of `dir`.
fn child_dirs(dir: &Path) -> CatalogResult<Vec<(String, PathBuf)>> {
    let mut dirs = Vec::new();
    for entry in WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
    {
        let entry = entry?;
        // Symlinked directories count
        if !entry.path().is_dir() {
            continue;
        }
        let name = entry.file_name().to_string_lossy().to_string();
        if name.starts_with('.') {
            debug!("Skipping hidden directory {:?}", entry.path());
            continue;
        }
        dirs.push((name, entry.into_path()));
    }
    Ok(dirs)
}

/// Discover products and versions under `root` and load every template.
pub fn scan_product_set(root: &Path) -> CatalogResult<ProductSet> {
    if !root.is_dir() {
        return Err(CatalogError::NotADirectory(root.to_path_buf()));
    }
    let root = root.canonicalize()?;
    let name = root
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .ok_or_else(|| CatalogError::NotADirectory(root.clone()))?;

    let mut products = Vec::new();
    for (product_name, product_dir) in child_dirs(&root)? {
        info!("Starting product: {}", product_name);
        let mut versions = Vec::new();
        for (version_name, version_dir) in child_dirs(&product_dir)? {
            info!("Starting version: {}", version_name);
            let template = load_template(&version_dir)?;
            let description = split_description(&template.template.description);
            versions.push(ScannedVersion {
                name: version_name,
                dir: version_dir,
                template,
                description,
            });
        }
        products.push(ScannedProduct {
            name: product_name,
            dir: product_dir,
            versions,
        });
    }

    Ok(ProductSet {
        name,
        root,
        products,
    })
}

/// A non-fatal problem met while writing version artifacts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildWarning {
    /// The template's `Description` field could not be located
    RewriteFailed { path: PathBuf },
}

impl std::fmt::Display for BuildWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BuildWarning::RewriteFailed { path } => {
                write!(f, "Description not rewritten in {}", path.display())
            }
        }
    }
}

/// Result of an in-memory build: the scanned tree plus both passes applied.
#[derive(Debug)]
pub struct BuildPlan {
    pub product_set: ProductSet,
    pub registry: OutputRegistry,
    pub manifests: ManifestBuilder,
}

/// Summary of a completed build.
#[derive(Debug, Clone)]
pub struct BuildReport {
    pub product_set: String,
    pub products: usize,
    pub versions: usize,
    pub outputs_registered: usize,
    pub warnings: Vec<BuildWarning>,
    pub portfolio_path: PathBuf,
    pub manifest_path: PathBuf,
}

/// Builds `portfolio.yaml` and `manifest.yaml` for a product set.
pub struct ProductSetBuilder {
    config: BuildConfig,
    doc_generator: Box<dyn DocGenerator>,
}

impl ProductSetBuilder {
    pub fn new(config: BuildConfig) -> Self {
        Self {
            config,
            doc_generator: Box::new(MarkdownDocGenerator::new()),
        }
    }

    /// Use a different README renderer.
    pub fn with_doc_generator(mut self, generator: Box<dyn DocGenerator>) -> Self {
        self.doc_generator = generator;
        self
    }

    pub fn config(&self) -> &BuildConfig {
        &self.config
    }

    /// Scan `root` and run both passes without touching the filesystem.
    pub fn plan(&self, root: &Path) -> CatalogResult<BuildPlan> {
        let product_set = scan_product_set(root)?;
        let mut registry = OutputRegistry::new(self.config.collision_policy);
        let mut manifests = ManifestBuilder::new();

        self.register_pass(&product_set, &mut registry, &mut manifests)?;
        self.resolve_pass(&product_set, &registry, &mut manifests);

        Ok(BuildPlan {
            product_set,
            registry,
            manifests,
        })
    }

    /// Full build: plan, write version artifacts, then both manifests.
    pub fn build(&self, root: &Path) -> CatalogResult<BuildReport> {
        let plan = self.plan(root)?;
        let warnings = self.write_version_artifacts(&plan.product_set)?;
        let (portfolio_path, manifest_path) = plan.manifests.write_to(&plan.product_set.root)?;

        Ok(BuildReport {
            product_set: plan.product_set.name.clone(),
            products: plan.product_set.products.len(),
            versions: plan.product_set.version_count(),
            outputs_registered: plan.registry.len(),
            warnings,
            portfolio_path,
            manifest_path,
        })
    }

    fn catalog_entry(&self, product: &str) -> CatalogEntry {
        let metadata = &self.config.metadata;
        CatalogEntry {
            name: product.to_string(),
            owner: metadata.owner.clone(),
            description: self.config.description_source.describe(product),
            distributor: metadata.distributor.clone(),
            support_description: metadata.support_description.clone(),
            support_email: metadata.support_email.clone(),
            support_url: metadata.support_url.clone(),
            source: ProductSource {
                provider: CODECOMMIT_PROVIDER.to_string(),
                configuration: RepositoryConfiguration {
                    repository_name: product.to_string(),
                },
            },
            versions: Vec::new(),
            tags: metadata.tags.clone(),
        }
    }

    /// Pass 1: catalog entries, launch entries and output registration.
    fn register_pass(
        &self,
        product_set: &ProductSet,
        registry: &mut OutputRegistry,
        manifests: &mut ManifestBuilder,
    ) -> CatalogResult<()> {
        for product in &product_set.products {
            manifests.add_product(self.catalog_entry(&product.name));

            for version in &product.versions {
                manifests.add_version(
                    &product.name,
                    VersionEntry::new(&version.name, &version.description.text),
                );
                manifests.start_launch(LaunchEntry::new(
                    &self.config.portfolio,
                    &product.name,
                    &version.name,
                    &self.config.deploy_to_regions,
                    &self.config.deploy_to_tags,
                ));

                let mut bindings = Vec::new();
                for output in version.template.template.outputs.keys() {
                    let entry = registry.register(&product_set.name, &product.name, output)?;
                    bindings.push(OutputBinding {
                        param_name: entry.published_path.clone(),
                        stack_output: output.clone(),
                    });
                }
                manifests.attach_outputs(&product.name, bindings);
            }
        }
        info!("Registered {} outputs", registry.len());
        Ok(())
    }

    /// Pass 2: parameter resolution against the complete registry.
    fn resolve_pass(
        &self,
        product_set: &ProductSet,
        registry: &OutputRegistry,
        manifests: &mut ManifestBuilder,
    ) {
        let resolver = DependencyResolver::new(registry);
        for product in &product_set.products {
            for version in &product.versions {
                let resolution = resolver.resolve(&version.template.template);
                manifests.apply_resolution(&product.name, resolution);
            }
        }
    }

    /// Write each version's README and rewrite its YAML template.
    fn write_version_artifacts(&self, product_set: &ProductSet) -> CatalogResult<Vec<BuildWarning>> {
        let mut warnings = Vec::new();

        for product in &product_set.products {
            for version in &product.versions {
                let readme = self.doc_generator.generate(
                    &version.template,
                    &version.description,
                    &product.name,
                )?;
                fs::write(version.dir.join(README_FILE), readme)?;

                if version.template.format != TemplateFormat::Yaml {
                    debug!("Leaving JSON template {:?} as is", version.template.path);
                    continue;
                }

                let metadata =
                    TemplateMetadata::product(&product_set.name, &product.name, &version.name);
                match rewrite_description(
                    &version.template.raw,
                    &version.description.text,
                    &metadata,
                    &version.template.path,
                ) {
                    Ok(rewritten) => fs::write(&version.template.path, rewritten)?,
                    Err(CatalogError::RewriteFailed(path)) => {
                        warn!("Could not rewrite Description in {:?}, leaving it unmodified", path);
                        warnings.push(BuildWarning::RewriteFailed { path });
                    }
                    Err(e) => return Err(e),
                }
            }
        }

        Ok(warnings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ProductMetadata;
    use tempfile::tempdir;

    fn write_version(root: &Path, product: &str, version: &str, template: &str) {
        let dir = root.join(product).join(version);
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("product.template.yaml"), template).unwrap();
    }

    #[test]
    fn test_scan_sorted_and_skips_hidden() {
        let temp = tempdir().unwrap();
        let root = temp.path().join("ps");
        write_version(&root, "b", "master", "Description: b\n");
        write_version(&root, "a", "v2", "Description: a2\n");
        write_version(&root, "a", "v1", "Description: a1\n");
        fs::create_dir_all(root.join(".git").join("objects")).unwrap();
        fs::write(root.join("notes.txt"), "ignored").unwrap();

        let set = scan_product_set(&root).unwrap();
        assert_eq!(set.name, "ps");
        let names: Vec<_> = set.products.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["a", "b"]);
        let versions: Vec<_> = set.products[0].versions.iter().map(|v| v.name.as_str()).collect();
        assert_eq!(versions, vec!["v1", "v2"]);
        assert_eq!(set.version_count(), 3);
    }

    #[cfg(unix)]
    #[test]
    fn test_scan_follows_symlinked_products() {
        let temp = tempdir().unwrap();
        let shared = temp.path().join("shared");
        write_version(&shared, "vpc", "v1", "Description: vpc\n");
        let root = temp.path().join("ps");
        fs::create_dir_all(&root).unwrap();
        std::os::unix::fs::symlink(shared.join("vpc"), root.join("vpc")).unwrap();

        let set = scan_product_set(&root).unwrap();
        assert_eq!(set.products.len(), 1);
        assert_eq!(set.products[0].name, "vpc");
        assert_eq!(set.products[0].versions[0].name, "v1");
    }

    #[test]
    fn test_scan_not_a_directory() {
        let temp = tempdir().unwrap();
        let err = scan_product_set(&temp.path().join("missing")).unwrap_err();
        assert!(matches!(err, CatalogError::NotADirectory(_)));
    }

    #[test]
    fn test_plan_last_version_wins_launch() {
        let temp = tempdir().unwrap();
        let root = temp.path().join("ps");
        write_version(&root, "a", "v1", "Description: a1\n\nOutputs:\n  Old:\n    Value: x\n");
        write_version(&root, "a", "v2", "Description: a2\n\nOutputs:\n  New:\n    Value: y\n");

        let builder = ProductSetBuilder::new(BuildConfig::new(ProductMetadata::default(), "demo"));
        let plan = builder.plan(&root).unwrap();

        let launch = plan.manifests.launch("a").unwrap();
        assert_eq!(launch.version, "v2");
        let outputs = launch.outputs.as_ref().unwrap();
        assert_eq!(outputs.ssm.len(), 1);
        assert_eq!(outputs.ssm[0].stack_output, "New");
        assert_eq!(plan.registry.len(), 2);
        assert_eq!(plan.manifests.products()[0].versions.len(), 2);
    }

    #[test]
    fn test_warning_display() {
        let warning = BuildWarning::RewriteFailed {
            path: PathBuf::from("x/product.template.yaml"),
        };
        assert_eq!(warning.to_string(), "Description not rewritten in x/product.template.yaml");
    }
}
