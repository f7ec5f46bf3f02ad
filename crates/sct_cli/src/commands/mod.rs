//! CLI command definitions.

use clap::{Parser, Subcommand};

pub mod import_product_set;
pub mod make_product_set;

/// sct-tools-helpers - Service Catalog product-set tooling
#[derive(Parser)]
#[command(name = "sct-tools-helpers")]
#[command(version, about = "Service Catalog product-set tooling")]
#[command(long_about = r#"
Builds Service Catalog product sets and imports them into portfolios.

WORKFLOWS:
  make-product-set   → Generate portfolio.yaml and manifest.yaml for a product set
  import-product-set → Add a product set to a portfolio and publish its sources

EXIT CODES:
  0 - Success
  1 - General error
  2 - Invalid arguments
  3 - Template error
  4 - Import error
"#)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Generate the catalog document and deployment manifest of a product set
    #[command(name = "make-product-set")]
    MakeProductSet(make_product_set::MakeProductSetArgs),

    /// Import a product set into a portfolio file
    #[command(name = "import-product-set")]
    ImportProductSet(import_product_set::ImportProductSetArgs),
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "sct-tools-helpers",
            "import-product-set",
            "target.yaml",
            "networking",
            "-v",
        ])
        .unwrap();
        assert!(cli.verbose);
        assert!(matches!(cli.command, Commands::ImportProductSet(_)));
    }
}
