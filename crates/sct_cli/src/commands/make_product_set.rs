//! Make-product-set command - Build the manifests of a product set.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, ValueEnum};
use tracing::info;

use sct_catalog::{
    parse_tags, BuildConfig, CollisionPolicy, DescriptionSource, ProductMetadata,
    ProductSetBuilder,
};

/// What to do when two products export the same output name.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OnOutputCollision {
    /// Keep the later registration and log a warning
    #[default]
    LastWriteWins,
    /// Fail the build
    Reject,
}

impl From<OnOutputCollision> for CollisionPolicy {
    fn from(value: OnOutputCollision) -> Self {
        match value {
            OnOutputCollision::LastWriteWins => CollisionPolicy::LastWriteWins,
            OnOutputCollision::Reject => CollisionPolicy::Reject,
        }
    }
}

#[derive(Args)]
pub struct MakeProductSetArgs {
    /// Product-set directory ({set}/{product}/{version}/)
    path: PathBuf,

    /// Owner of every product
    owner: String,

    /// Distributor of every product
    distributor: String,

    /// Support description of every product
    support_description: String,

    /// Support email of every product
    support_email: String,

    /// Support URL of every product
    support_url: String,

    /// Product tags as JSON, e.g. '[{"Key": "team", "Value": "platform"}]'
    tags: String,

    /// Portfolio the launches belong to
    portfolio: String,

    /// Regions of the deploy_to tag selector
    deploy_to_regions: String,

    /// Tag of the deploy_to tag selector
    deploy_to_tags: String,

    /// Fixed description for every product (defaults to the product name)
    #[arg(long)]
    product_description: Option<String>,

    /// Policy for outputs exported by more than one product
    #[arg(long, value_enum, default_value_t = OnOutputCollision::LastWriteWins)]
    on_output_collision: OnOutputCollision,
}

impl MakeProductSetArgs {
    fn build_config(&self) -> Result<BuildConfig> {
        let tags = parse_tags(&self.tags).context("Invalid tags argument")?;
        let metadata = ProductMetadata {
            owner: self.owner.clone(),
            distributor: self.distributor.clone(),
            support_description: self.support_description.clone(),
            support_email: self.support_email.clone(),
            support_url: self.support_url.clone(),
            tags,
        };

        let description_source = match &self.product_description {
            Some(text) => DescriptionSource::Fixed(text.clone()),
            None => DescriptionSource::ProductName,
        };

        Ok(BuildConfig::new(metadata, &self.portfolio)
            .with_deploy_to(&self.deploy_to_regions, &self.deploy_to_tags)
            .with_description_source(description_source)
            .with_collision_policy(self.on_output_collision.into()))
    }
}

pub async fn execute(args: MakeProductSetArgs) -> Result<()> {
    info!("Making product set: {:?}", args.path);

    if !args.path.is_dir() {
        anyhow::bail!("Product set not found: {:?}", args.path);
    }

    let config = args.build_config()?;
    let report = ProductSetBuilder::new(config)
        .build(&args.path)
        .context("Failed to build product set")?;

    println!(
        "📦 Product set {}: {} product(s), {} version(s), {} output(s) registered",
        report.product_set, report.products, report.versions, report.outputs_registered
    );
    for warning in &report.warnings {
        println!("   ⚠️  {}", warning);
    }
    println!("   ✅ {}", report.portfolio_path.display());
    println!("   ✅ {}", report.manifest_path.display());

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::{Cli, Commands};
    use clap::Parser;

    fn parse(extra: &[&str]) -> MakeProductSetArgs {
        let mut argv = vec![
            "sct-tools-helpers",
            "make-product-set",
            "ps",
            "platform",
            "cloud team",
            "Raise a ticket",
            "cloud@example.com",
            "https://example.com/support",
            r#"[{"Key": "team", "Value": "platform"}]"#,
            "demo-portfolio",
            "[eu-west-1]",
            "role:spoke",
        ];
        argv.extend_from_slice(extra);
        match Cli::try_parse_from(argv).unwrap().command {
            Commands::MakeProductSet(args) => args,
            _ => panic!("wrong subcommand"),
        }
    }

    #[test]
    fn test_defaults() {
        let args = parse(&[]);
        let config = args.build_config().unwrap();
        assert_eq!(config.portfolio, "demo-portfolio");
        assert_eq!(config.deploy_to_regions, "[eu-west-1]");
        assert_eq!(config.metadata.tags[0].key, "team");
        assert_eq!(config.description_source, DescriptionSource::ProductName);
        assert_eq!(config.collision_policy, CollisionPolicy::LastWriteWins);
    }

    #[test]
    fn test_fixed_description_and_reject() {
        let args = parse(&[
            "--product-description",
            "Shared product",
            "--on-output-collision",
            "reject",
        ]);
        let config = args.build_config().unwrap();
        assert_eq!(
            config.description_source,
            DescriptionSource::Fixed("Shared product".to_string())
        );
        assert_eq!(config.collision_policy, CollisionPolicy::Reject);
    }

    #[test]
    fn test_invalid_tags() {
        let mut args = parse(&[]);
        args.tags = "not json".to_string();
        assert!(args.build_config().is_err());
    }
}
