//! Output registry for cross-product parameter resolution.
//!
//! Output names share one key space across the whole product set. The
//! registry lives for exactly one build run: pass 1 fills it, pass 2 reads it.

use std::collections::HashMap;

use tracing::{debug, warn};

use crate::error::{CatalogError, CatalogResult};

/// What happens when two products export an output with the same name.
///
/// Versions of one product re-registering their own outputs never collide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CollisionPolicy {
    /// The later registration replaces the earlier one
    #[default]
    LastWriteWins,
    /// A collision aborts the build
    Reject,
}

/// A registered output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputRegistryEntry {
    /// Path the output is published under
    pub published_path: String,
    /// Product that exports the output
    pub product: String,
}

/// Path an output is published under.
pub fn published_path(product_set: &str, product: &str, output: &str) -> String {
    format!("{}/{}/{}", product_set, product, output)
}

/// Run-scoped table of output name to publication entry.
#[derive(Debug, Default)]
pub struct OutputRegistry {
    entries: HashMap<String, OutputRegistryEntry>,
    policy: CollisionPolicy,
}

impl OutputRegistry {
    /// Create an empty registry with the given collision policy.
    pub fn new(policy: CollisionPolicy) -> Self {
        Self {
            entries: HashMap::new(),
            policy,
        }
    }

    pub fn policy(&self) -> CollisionPolicy {
        self.policy
    }

    /// Register an output exported by `product`.
    pub fn register(
        &mut self,
        product_set: &str,
        product: &str,
        output: &str,
    ) -> CatalogResult<&OutputRegistryEntry> {
        let entry = OutputRegistryEntry {
            published_path: published_path(product_set, product, output),
            product: product.to_string(),
        };

        if let Some(existing) = self.entries.get(output) {
            match self.policy {
                CollisionPolicy::Reject if existing.product != product => {
                    return Err(CatalogError::DuplicateOutput {
                        output: output.to_string(),
                        existing: existing.product.clone(),
                        incoming: product.to_string(),
                    });
                }
                CollisionPolicy::LastWriteWins if existing.product != product => {
                    warn!(
                        "Output {} of {} replaces the one exported by {}",
                        output, product, existing.product
                    );
                }
                _ => {}
            }
        }

        debug!("Registering output {} at {}", output, entry.published_path);
        self.entries.insert(output.to_string(), entry);
        Ok(&self.entries[output])
    }

    /// Look up an output by name.
    pub fn get(&self, output: &str) -> Option<&OutputRegistryEntry> {
        self.entries.get(output)
    }

    pub fn contains(&self, output: &str) -> bool {
        self.entries.contains_key(output)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_published_path() {
        assert_eq!(published_path("ps", "A", "Url"), "ps/A/Url");
    }

    #[test]
    fn test_register_and_get() {
        let mut registry = OutputRegistry::default();
        let entry = registry.register("ps", "A", "Url").unwrap();
        assert_eq!(entry.published_path, "ps/A/Url");
        assert_eq!(entry.product, "A");
        assert!(registry.contains("Url"));
        assert!(registry.get("Missing").is_none());
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_last_write_wins() {
        let mut registry = OutputRegistry::new(CollisionPolicy::LastWriteWins);
        registry.register("ps", "A", "Url").unwrap();
        registry.register("ps", "B", "Url").unwrap();

        let entry = registry.get("Url").unwrap();
        assert_eq!(entry.product, "B");
        assert_eq!(entry.published_path, "ps/B/Url");
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_reject_collision() {
        let mut registry = OutputRegistry::new(CollisionPolicy::Reject);
        registry.register("ps", "A", "Url").unwrap();
        let err = registry.register("ps", "B", "Url").unwrap_err();
        match err {
            CatalogError::DuplicateOutput {
                output,
                existing,
                incoming,
            } => {
                assert_eq!(output, "Url");
                assert_eq!(existing, "A");
                assert_eq!(incoming, "B");
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(registry.get("Url").unwrap().product, "A");
    }

    #[test]
    fn test_reject_allows_same_product() {
        let mut registry = OutputRegistry::new(CollisionPolicy::Reject);
        registry.register("ps", "A", "Url").unwrap();
        registry.register("ps", "A", "Url").unwrap();
        assert_eq!(registry.len(), 1);
    }
}
