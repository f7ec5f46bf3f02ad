//! Parameter resolution against the output registry.
//!
//! A parameter whose name matches a registered output is supplied from that
//! output's published path and makes the current product depend on the
//! exporting one. Everything else falls back to the declared default, or to
//! the `SET_ME` placeholder.

use std::collections::BTreeMap;

use tracing::debug;

use crate::manifest::ParameterBinding;
use crate::registry::OutputRegistry;
use crate::template::Template;

/// Parameter bindings and dependency edges of one version.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Resolution {
    pub parameters: BTreeMap<String, ParameterBinding>,
    /// Producing products, one entry per externally bound parameter
    pub depends_on: Vec<String>,
}

/// Resolves template parameters against a fully populated registry.
pub struct DependencyResolver<'a> {
    registry: &'a OutputRegistry,
}

impl<'a> DependencyResolver<'a> {
    pub fn new(registry: &'a OutputRegistry) -> Self {
        Self { registry }
    }

    /// Bind every parameter of `template`.
    ///
    /// A product consuming its own output gets itself as a dependency.
    pub fn resolve(&self, template: &Template) -> Resolution {
        let mut resolution = Resolution::default();

        for (name, definition) in &template.parameters {
            let binding = match self.registry.get(name) {
                Some(entry) => {
                    debug!("Parameter {} reads {} from {}", name, entry.published_path, entry.product);
                    resolution.depends_on.push(entry.product.clone());
                    ParameterBinding::ssm(entry.published_path.clone())
                }
                None => match &definition.default {
                    Some(value) => ParameterBinding::default_value(value.clone()),
                    None => ParameterBinding::placeholder(),
                },
            };
            resolution.parameters.insert(name.clone(), binding);
        }

        resolution
    }
}
