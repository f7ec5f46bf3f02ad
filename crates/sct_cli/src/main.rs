//! sct-tools-helpers CLI - Main entry point.
//!
//! Exit codes:
//! - 0: Success
//! - 1: General error
//! - 2: Invalid arguments
//! - 3: Template error
//! - 4: Import error

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use sct_catalog::CatalogError;
use sct_import::ImportError;

mod commands;

use commands::{Cli, Commands};

/// CI-friendly exit codes
pub struct ExitCodes;

impl ExitCodes {
    pub const SUCCESS: u8 = 0;
    pub const GENERAL_ERROR: u8 = 1;
    pub const INVALID_ARGS: u8 = 2;
    pub const TEMPLATE_ERROR: u8 = 3;
    pub const IMPORT_ERROR: u8 = 4;
}

/// Crate-level directive for the requested verbosity.
fn log_directive(verbose: bool, quiet: bool) -> &'static str {
    if quiet {
        "sct=warn"
    } else if verbose {
        "sct=debug"
    } else {
        "sct=info"
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let mut filter = EnvFilter::from_default_env();
    if let Ok(directive) = "warn".parse() {
        filter = filter.add_directive(directive);
    }
    if let Ok(directive) = log_directive(cli.verbose, cli.quiet).parse() {
        filter = filter.add_directive(directive);
    }
    if tracing_subscriber::registry()
        .with(fmt::layer().with_target(false))
        .with(filter)
        .try_init()
        .is_err()
    {
        // Logging already initialized, continue
    }

    let result = match cli.command {
        Commands::MakeProductSet(args) => commands::make_product_set::execute(args).await,
        Commands::ImportProductSet(args) => commands::import_product_set::execute(args).await,
    };

    match result {
        Ok(()) => ExitCode::from(ExitCodes::SUCCESS),
        Err(e) => {
            let exit_code = categorize_error(&e);
            eprintln!("❌ Error: {:#}", e);
            ExitCode::from(exit_code)
        }
    }
}

/// Categorize error to determine exit code
fn categorize_error(e: &anyhow::Error) -> u8 {
    if let Some(catalog) = e.downcast_ref::<CatalogError>() {
        return match catalog {
            CatalogError::InvalidTags(_) | CatalogError::NotADirectory(_) => ExitCodes::INVALID_ARGS,
            _ => ExitCodes::TEMPLATE_ERROR,
        };
    }
    if let Some(import) = e.downcast_ref::<ImportError>() {
        return match import {
            ImportError::PortfolioNotFound(_) => ExitCodes::INVALID_ARGS,
            _ => ExitCodes::IMPORT_ERROR,
        };
    }

    let msg = e.to_string().to_lowercase();
    if msg.contains("argument") || msg.contains("not found") {
        ExitCodes::INVALID_ARGS
    } else {
        ExitCodes::GENERAL_ERROR
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_log_directive() {
        assert_eq!(log_directive(false, false), "sct=info");
        assert_eq!(log_directive(true, false), "sct=debug");
        assert_eq!(log_directive(true, true), "sct=warn");
    }

    #[test]
    fn test_categorize_catalog_errors() {
        let missing = anyhow::Error::new(CatalogError::MissingTemplate(PathBuf::from("ps/a/v1")))
            .context("Failed to build product set");
        assert_eq!(categorize_error(&missing), ExitCodes::TEMPLATE_ERROR);

        let tags = anyhow::Error::new(CatalogError::InvalidTags("expected array".into()));
        assert_eq!(categorize_error(&tags), ExitCodes::INVALID_ARGS);
    }

    #[test]
    fn test_categorize_import_errors() {
        let failed = anyhow::Error::new(ImportError::Command {
            command: "git push".into(),
            stderr: "denied".into(),
        });
        assert_eq!(categorize_error(&failed), ExitCodes::IMPORT_ERROR);
    }

    #[test]
    fn test_categorize_other_errors() {
        assert_eq!(
            categorize_error(&anyhow::anyhow!("Product set not found: x")),
            ExitCodes::INVALID_ARGS
        );
        assert_eq!(
            categorize_error(&anyhow::anyhow!("boom")),
            ExitCodes::GENERAL_ERROR
        );
    }
}
