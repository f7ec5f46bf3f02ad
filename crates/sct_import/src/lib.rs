//! # sct_import
//!
//! Import of generated product sets into an existing portfolio file.
//!
//! The products listed in a product set's `portfolio.yaml` are appended to a
//! target portfolio (optionally under a named portfolio), and each
//! CodeCommit-backed version's directory is pushed to its repository branch.
//!
//! ## Example
//!
//! ```rust,no_run
//! use sct_import::{CodeCommitPublisher, ImportOptions, ProductSetImporter};
//!
//! # async fn run() -> sct_import::ImportResult<()> {
//! let publisher = CodeCommitPublisher::new("eu-west-1", "/tmp/sct-import");
//! let options = ImportOptions::new("portfolios/demo.yaml", "product-sets/networking")
//!     .with_portfolio_name(Some("Networking".to_string()));
//!
//! let report = ProductSetImporter::new(publisher).import(&options).await?;
//! println!("{} products imported", report.products_imported);
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod importer;
pub mod merge;
pub mod mock;
pub mod portfolio;
pub mod publisher;

pub use error::{ImportError, ImportResult};
pub use importer::{publish_requests, ImportOptions, ImportReport, ProductSetImporter};
pub use merge::deep_merge;
pub use mock::MockPublisher;
pub use publisher::{CodeCommitPublisher, PublishRequest, RepoPublisher};
