//! Template loading.
//!
//! A version directory holds exactly one template, either
//! `product.template.yaml` or `product.template.json`. The YAML form may use
//! intrinsic-function short-hand tags (`!Ref`, `!Sub`, ...), so it is parsed
//! into a [`serde_yaml::Value`] first, where unknown tags stay opaque.

use std::fs;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{CatalogError, CatalogResult};

/// File name of the YAML-flavoured template.
pub const YAML_TEMPLATE: &str = "product.template.yaml";

/// File name of the JSON-flavoured template.
pub const JSON_TEMPLATE: &str = "product.template.json";

/// Serialization of a template document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemplateFormat {
    Yaml,
    Json,
}

impl TemplateFormat {
    pub fn file_name(&self) -> &'static str {
        match self {
            TemplateFormat::Yaml => YAML_TEMPLATE,
            TemplateFormat::Json => JSON_TEMPLATE,
        }
    }
}

/// Output declared by a template.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct OutputDefinition {
    /// Kept as a value: intrinsic functions are valid here
    #[serde(default)]
    pub description: Option<serde_yaml::Value>,
    #[serde(default)]
    pub value: Option<serde_yaml::Value>,
}

/// Parameter declared by a template.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ParameterDefinition {
    #[serde(default, rename = "Type")]
    pub parameter_type: Option<serde_yaml::Value>,
    #[serde(default)]
    pub default: Option<serde_yaml::Value>,
    #[serde(default)]
    pub description: Option<serde_yaml::Value>,
}

/// The parts of a template the builder consumes.
#[derive(Debug, Clone, Default)]
pub struct Template {
    /// Raw `Description`, possibly with an embedded metadata suffix
    pub description: String,
    /// Outputs in declaration order
    pub outputs: IndexMap<String, OutputDefinition>,
    /// Parameters in declaration order
    pub parameters: IndexMap<String, ParameterDefinition>,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct RawTemplate {
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    outputs: Option<IndexMap<String, OutputDefinition>>,
    #[serde(default)]
    parameters: Option<IndexMap<String, ParameterDefinition>>,
}

/// A template read from disk, with its original text kept for rewriting.
#[derive(Debug, Clone)]
pub struct LoadedTemplate {
    pub path: PathBuf,
    pub format: TemplateFormat,
    pub raw: String,
    pub template: Template,
}

/// Load the template of a version directory.
///
/// The YAML file wins when both exist. A directory with neither is a
/// [`CatalogError::MissingTemplate`].
pub fn load_template(version_dir: &Path) -> CatalogResult<LoadedTemplate> {
    for format in [TemplateFormat::Yaml, TemplateFormat::Json] {
        let path = version_dir.join(format.file_name());
        if path.is_file() {
            debug!("Loading template from {:?}", path);
            let raw = fs::read_to_string(&path)?;
            let template = parse_template(&raw, format)
                .map_err(|message| CatalogError::MalformedTemplate {
                    path: path.clone(),
                    message,
                })?;
            return Ok(LoadedTemplate {
                path,
                format,
                raw,
                template,
            });
        }
    }

    Err(CatalogError::MissingTemplate(version_dir.to_path_buf()))
}

/// Parse template text in the given format.
pub fn parse_template(raw: &str, format: TemplateFormat) -> Result<Template, String> {
    let value: serde_yaml::Value = match format {
        TemplateFormat::Yaml => serde_yaml::from_str(raw).map_err(|e| e.to_string())?,
        TemplateFormat::Json => serde_json::from_str(raw).map_err(|e| e.to_string())?,
    };

    if !value.is_mapping() {
        return Err("template document is not a mapping".to_string());
    }

    let parsed: RawTemplate = serde_yaml::from_value(value).map_err(|e| e.to_string())?;
    let description = parsed
        .description
        .ok_or_else(|| "missing Description".to_string())?;

    Ok(Template {
        description,
        outputs: parsed.outputs.unwrap_or_default(),
        parameters: parsed.parameters.unwrap_or_default(),
    })
}
