//! README generation for product versions.

use crate::description::SplitDescription;
use crate::error::CatalogResult;
use crate::template::LoadedTemplate;

/// Renders human-readable documentation for a product version.
pub trait DocGenerator {
    fn generate(
        &self,
        template: &LoadedTemplate,
        description: &SplitDescription,
        product: &str,
    ) -> CatalogResult<String>;
}

/// Markdown renderer listing a template's parameters and outputs.
#[derive(Debug, Default, Clone, Copy)]
pub struct MarkdownDocGenerator;

impl MarkdownDocGenerator {
    pub fn new() -> Self {
        Self
    }
}

fn cell(text: &str) -> String {
    text.replace('|', "\\|").replace('\n', " ")
}

fn yaml_cell(value: &serde_yaml::Value) -> String {
    match value {
        serde_yaml::Value::String(s) => cell(s),
        other => serde_yaml::to_string(other)
            .map(|s| cell(s.trim_end()))
            .unwrap_or_default(),
    }
}

fn optional_cell(value: &Option<serde_yaml::Value>) -> String {
    value.as_ref().map(yaml_cell).unwrap_or_default()
}

impl DocGenerator for MarkdownDocGenerator {
    fn generate(
        &self,
        template: &LoadedTemplate,
        description: &SplitDescription,
        product: &str,
    ) -> CatalogResult<String> {
        let template = &template.template;
        let mut doc = String::new();

        doc.push_str(&format!("# {}\n\n", product));
        if !description.text.is_empty() {
            doc.push_str(&format!("{}\n\n", description.text));
        }

        if !template.parameters.is_empty() {
            doc.push_str("## Parameters\n\n");
            doc.push_str("| Name | Type | Default | Description |\n");
            doc.push_str("|------|------|---------|-------------|\n");
            for (name, parameter) in &template.parameters {
                doc.push_str(&format!(
                    "| {} | {} | {} | {} |\n",
                    cell(name),
                    optional_cell(&parameter.parameter_type),
                    optional_cell(&parameter.default),
                    optional_cell(&parameter.description),
                ));
            }
            doc.push('\n');
        }

        if !template.outputs.is_empty() {
            doc.push_str("## Outputs\n\n");
            doc.push_str("| Name | Description |\n");
            doc.push_str("|------|-------------|\n");
            for (name, output) in &template.outputs {
                doc.push_str(&format!(
                    "| {} | {} |\n",
                    cell(name),
                    optional_cell(&output.description),
                ));
            }
            doc.push('\n');
        }

        Ok(doc)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::description::split_description;
    use crate::template::{parse_template, TemplateFormat};
    use std::path::PathBuf;

    fn loaded(raw: &str) -> LoadedTemplate {
        LoadedTemplate {
            path: PathBuf::from("product.template.yaml"),
            format: TemplateFormat::Yaml,
            raw: raw.to_string(),
            template: parse_template(raw, TemplateFormat::Yaml).unwrap(),
        }
    }

    #[test]
    fn test_markdown_sections() {
        let template = loaded(
            "Description: 'Shared VPC {\"product\": \"vpc\", \"x\": 1}'\nParameters:\n  Cidr:\n    Type: String\n    Default: 10.0.0.0/16\n    Description: Block\nOutputs:\n  VpcId:\n    Description: The id\n    Value: !Ref Vpc\n",
        );
        let description = split_description(&template.template.description);
        let doc = MarkdownDocGenerator::new()
            .generate(&template, &description, "vpc")
            .unwrap();

        assert!(doc.starts_with("# vpc\n\nShared VPC\n"));
        assert!(doc.contains("| Cidr | String | 10.0.0.0/16 | Block |"));
        assert!(doc.contains("| VpcId | The id |"));
        assert!(!doc.contains("\"product\""));
    }

    #[test]
    fn test_markdown_intrinsic_descriptions() {
        let template = loaded(
            "Description: Queue\nParameters:\n  Stage:\n    Type: String\n    Description:\n      Fn::Sub: stage\nOutputs:\n  Arn:\n    Description: !Sub arn\n    Value: !GetAtt Queue.Arn\n",
        );
        let description = split_description(&template.template.description);
        let doc = MarkdownDocGenerator::new()
            .generate(&template, &description, "queue")
            .unwrap();

        let stage = doc.lines().find(|l| l.starts_with("| Stage |")).unwrap();
        assert!(stage.contains("Fn::Sub") && stage.contains("stage"));
        let arn = doc.lines().find(|l| l.starts_with("| Arn |")).unwrap();
        assert!(arn.contains("arn"));
    }

    #[test]
    fn test_markdown_without_sections() {
        let template = loaded("Description: Bare\n");
        let description = split_description(&template.template.description);
        let doc = MarkdownDocGenerator::new()
            .generate(&template, &description, "bare")
            .unwrap();
        assert_eq!(doc, "# bare\n\nBare\n\n");
    }
}
