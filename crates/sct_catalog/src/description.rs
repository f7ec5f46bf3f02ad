//! Splitting a template description into human text and embedded data.
//!
//! The embedded part is found with a text heuristic, not a parser: the first
//! single-line span shaped like `{..:..}`/`{..,..}` or `[..,..]`/`[..:..]` is
//! taken. When several spans match only the first is removed.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::rewriter::TemplateMetadata;

static EMBEDDED_DATA: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{.+[:,].+\}|\[.+[,:].+\]").expect("embedded data pattern is valid")
});

/// A description split into its human-readable text and embedded data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SplitDescription {
    /// Human-readable text, trimmed
    pub text: String,
    /// The matched structured-data literal, if any
    pub embedded: Option<String>,
}

impl SplitDescription {
    /// Decode the embedded literal as template metadata.
    pub fn metadata(&self) -> Option<TemplateMetadata> {
        self.embedded
            .as_deref()
            .and_then(|raw| serde_json::from_str(raw.trim()).ok())
    }
}

/// Split a raw `Description` value.
pub fn split_description(raw: &str) -> SplitDescription {
    match EMBEDDED_DATA.find(raw) {
        Some(found) => {
            let mut text = String::with_capacity(raw.len());
            text.push_str(&raw[..found.start()]);
            text.push_str(&raw[found.end()..]);
            SplitDescription {
                text: text.trim().to_string(),
                embedded: Some(found.as_str().to_string()),
            }
        }
        None => SplitDescription {
            text: raw.trim().to_string(),
            embedded: None,
        },
    }
}
