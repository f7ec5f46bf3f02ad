//! In-place rewriting of a template's `Description` field.
//!
//! The document is patched as text: the span from `Description:` at column
//! zero up to the next empty line is replaced, and every other byte is kept.
//! Re-serializing the document would reorder keys and drop comments.

use std::io;
use std::ops::Range;
use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::ser::Formatter;

use crate::error::{CatalogError, CatalogResult};

/// Framework marker embedded in rewritten descriptions.
pub const FRAMEWORK: &str = "servicecatalog-products";

/// Role marker embedded in rewritten descriptions.
pub const ROLE_PRODUCT: &str = "product";

const INDENT: &str = "    ";

static DESCRIPTION_FIELD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^Description:[\s\S]*?^$").expect("description field pattern is valid")
});

/// Machine-readable metadata embedded in a product template description.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateMetadata {
    pub framework: String,
    pub role: String,
    #[serde(rename = "product-set")]
    pub product_set: String,
    pub product: String,
    pub version: String,
}

impl TemplateMetadata {
    /// Metadata for a product version.
    pub fn product(
        product_set: impl Into<String>,
        product: impl Into<String>,
        version: impl Into<String>,
    ) -> Self {
        Self {
            framework: FRAMEWORK.to_string(),
            role: ROLE_PRODUCT.to_string(),
            product_set: product_set.into(),
            product: product.into(),
            version: version.into(),
        }
    }

    /// Serialize as a single-line JSON object, spaced as `{"a": 1, "b": 2}`
    /// with non-ASCII characters escaped.
    pub fn to_json(&self) -> CatalogResult<String> {
        let mut out = Vec::new();
        let mut serializer = serde_json::Serializer::with_formatter(&mut out, SpacedFormatter);
        self.serialize(&mut serializer)?;
        String::from_utf8(out)
            .map_err(|e| CatalogError::Io(io::Error::new(io::ErrorKind::InvalidData, e)))
    }
}

/// Single-line JSON with `", "` and `": "` separators and ASCII-only strings,
/// matching metadata lines already present in rewritten templates.
struct SpacedFormatter;

impl Formatter for SpacedFormatter {
    fn begin_array_value<W: ?Sized + io::Write>(&mut self, writer: &mut W, first: bool) -> io::Result<()> {
        if first {
            Ok(())
        } else {
            writer.write_all(b", ")
        }
    }

    fn begin_object_key<W: ?Sized + io::Write>(&mut self, writer: &mut W, first: bool) -> io::Result<()> {
        if first {
            Ok(())
        } else {
            writer.write_all(b", ")
        }
    }

    fn begin_object_value<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        writer.write_all(b": ")
    }

    fn write_string_fragment<W: ?Sized + io::Write>(&mut self, writer: &mut W, fragment: &str) -> io::Result<()> {
        for c in fragment.chars() {
            if c.is_ascii() {
                writer.write_all(&[c as u8])?;
            } else {
                let mut units = [0u16; 2];
                for unit in c.encode_utf16(&mut units) {
                    write!(writer, "\\u{:04x}", unit)?;
                }
            }
        }
        Ok(())
    }
}

/// Locate the `Description` field span: from `Description:` at column zero
/// up to, not including, the next empty line.
pub fn find_description_span(raw: &str) -> Option<Range<usize>> {
    DESCRIPTION_FIELD.find(raw).map(|m| m.range())
}

/// Build the literal block scalar that replaces the field.
fn description_block(description: &str, metadata: &TemplateMetadata) -> CatalogResult<String> {
    let single_line: String = description
        .chars()
        .filter(|c| *c != '\n' && *c != '\r')
        .collect();
    let payload = format!("{}\n{}", single_line, metadata.to_json()?);

    let indented: String = payload
        .split_inclusive('\n')
        .map(|line| format!("{}{}", INDENT, line))
        .collect();

    Ok(format!("Description: |\n{} \n", indented))
}

/// Replace the `Description` field of `raw` with `description` followed by
/// the serialized `metadata`.
///
/// Returns [`CatalogError::RewriteFailed`] naming `path` when the field
/// cannot be located; the caller decides whether that is fatal.
pub fn rewrite_description(
    raw: &str,
    description: &str,
    metadata: &TemplateMetadata,
    path: &Path,
) -> CatalogResult<String> {
    let span = find_description_span(raw)
        .ok_or_else(|| CatalogError::RewriteFailed(path.to_path_buf()))?;
    let block = description_block(description, metadata)?;

    let mut rewritten = String::with_capacity(raw.len() + block.len());
    rewritten.push_str(&raw[..span.start]);
    rewritten.push_str(&block);
    rewritten.push_str(&raw[span.end..]);
    Ok(rewritten)
}
