//! Import-product-set command - Add a product set to a portfolio file.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use tracing::info;

use sct_catalog::home_region;
use sct_import::{CodeCommitPublisher, ImportOptions, ProductSetImporter};

#[derive(Args)]
pub struct ImportProductSetArgs {
    /// TARGET_PORTFOLIO_YAML [PORTFOLIO_NAME] SOURCE_PRODUCT_SET
    #[arg(num_args = 2..=3, required = true, value_name = "ARGS")]
    positional: Vec<String>,

    /// Region of the CodeCommit repositories
    #[arg(long, env = "AWS_REGION")]
    region: Option<String>,

    /// Directory repositories are cloned into
    #[arg(long)]
    workdir: Option<PathBuf>,

    /// Only update the portfolio file
    #[arg(long)]
    skip_publish: bool,
}

impl ImportProductSetArgs {
    /// Options from the positional arguments; the portfolio name is optional
    /// and sits between the target and the source.
    fn options(&self) -> Result<ImportOptions> {
        let (target, name, source) = match self.positional.as_slice() {
            [target, source] => (target, None, source),
            [target, name, source] => (target, Some(name.clone()), source),
            _ => anyhow::bail!("Expected 2 or 3 positional arguments"),
        };

        let options = ImportOptions::new(target, source).with_portfolio_name(name);
        Ok(if self.skip_publish {
            options.without_publishing()
        } else {
            options
        })
    }
}

pub async fn execute(args: ImportProductSetArgs) -> Result<()> {
    let options = args.options()?;
    let region = args
        .region
        .clone()
        .filter(|r| !r.is_empty())
        .unwrap_or_else(home_region);
    let workdir = args
        .workdir
        .clone()
        .unwrap_or_else(|| std::env::temp_dir().join("sct-import"));

    info!(
        "Importing {:?} into {:?} ({})",
        options.source_product_set, options.target_portfolio, region
    );

    let importer = ProductSetImporter::new(CodeCommitPublisher::new(region, workdir));
    let report = importer
        .import(&options)
        .await
        .context("Failed to import product set")?;

    println!(
        "📥 Imported {} product(s) into {}",
        report.products_imported,
        options.target_portfolio.display()
    );
    for request in &report.published {
        println!("   ✅ {}@{}", request.repository_name, request.branch_name);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::{Cli, Commands};
    use clap::Parser;

    fn parse(argv: &[&str]) -> ImportProductSetArgs {
        let mut full = vec!["sct-tools-helpers", "import-product-set"];
        full.extend_from_slice(argv);
        match Cli::try_parse_from(full).unwrap().command {
            Commands::ImportProductSet(args) => args,
            _ => panic!("wrong subcommand"),
        }
    }

    #[test]
    fn test_without_portfolio_name() {
        let options = parse(&["target.yaml", "networking"]).options().unwrap();
        assert_eq!(options.target_portfolio, PathBuf::from("target.yaml"));
        assert_eq!(options.portfolio_name, None);
        assert_eq!(options.source_product_set, PathBuf::from("networking"));
        assert!(options.publish);
    }

    #[test]
    fn test_with_portfolio_name() {
        let options = parse(&["target.yaml", "Networking", "networking", "--skip-publish"])
            .options()
            .unwrap();
        assert_eq!(options.portfolio_name.as_deref(), Some("Networking"));
        assert_eq!(options.source_product_set, PathBuf::from("networking"));
        assert!(!options.publish);
    }

    #[test]
    fn test_rejects_wrong_arity() {
        let result = Cli::try_parse_from(["sct-tools-helpers", "import-product-set", "target.yaml"]);
        assert!(result.is_err());
    }
}
