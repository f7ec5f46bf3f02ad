//! Portfolio documents handled as loosely-typed YAML.
//!
//! Target portfolio files are maintained by hand and carry keys this tool
//! does not know about, so they are edited as [`serde_yaml::Value`] and
//! written back with every unknown key intact.

use std::fs;
use std::path::Path;

use serde_yaml::{Mapping, Sequence, Value};
use tracing::debug;

use crate::error::{ImportError, ImportResult};

/// Read a YAML portfolio document whose root must be a mapping.
pub fn read_portfolio(path: &Path) -> ImportResult<Mapping> {
    if !path.is_file() {
        return Err(ImportError::PortfolioNotFound(path.to_path_buf()));
    }
    debug!("Reading portfolio from {:?}", path);
    let content = fs::read_to_string(path)?;
    match serde_yaml::from_str(&content)? {
        Value::Mapping(mapping) => Ok(mapping),
        Value::Null => Ok(Mapping::new()),
        _ => Err(ImportError::InvalidPortfolio(format!(
            "{} is not a mapping",
            path.display()
        ))),
    }
}

/// Write a portfolio document.
pub fn write_portfolio(path: &Path, document: &Mapping) -> ImportResult<()> {
    debug!("Writing portfolio to {:?}", path);
    fs::write(path, serde_yaml::to_string(document)?)?;
    Ok(())
}

fn non_empty_sequence(mapping: &Mapping, key: &str) -> bool {
    mapping
        .get(key)
        .and_then(Value::as_sequence)
        .is_some_and(|s| !s.is_empty())
}

/// The list stored under `key`, created when absent or null.
fn sequence_entry<'a>(mapping: &'a mut Mapping, key: &str) -> ImportResult<&'a mut Sequence> {
    if mapping.get(key).map_or(true, Value::is_null) {
        mapping.insert(Value::from(key), Value::Sequence(Sequence::new()));
    }
    mapping
        .get_mut(key)
        .and_then(Value::as_sequence_mut)
        .ok_or_else(|| ImportError::InvalidPortfolio(format!("{} is not a list", key)))
}

/// The product list new products are appended to.
///
/// Without a portfolio name this is the top-level `Products` list. With one,
/// it is the `Products` (or, failing that, `Components`) list of the entry in
/// `Portfolios` whose `DisplayName` matches; the entry is created if needed.
pub fn target_products<'a>(
    document: &'a mut Mapping,
    portfolio_name: Option<&str>,
) -> ImportResult<&'a mut Sequence> {
    let Some(name) = portfolio_name else {
        return sequence_entry(document, "Products");
    };

    let portfolios = sequence_entry(document, "Portfolios")?;
    let index = match portfolios
        .iter()
        .rposition(|p| p.get("DisplayName").and_then(Value::as_str) == Some(name))
    {
        Some(index) => index,
        None => {
            debug!("Creating portfolio {}", name);
            let mut portfolio = Mapping::new();
            portfolio.insert(Value::from("DisplayName"), Value::from(name));
            portfolio.insert(Value::from("Products"), Value::Sequence(Sequence::new()));
            portfolios.push(Value::Mapping(portfolio));
            portfolios.len() - 1
        }
    };

    let portfolio = portfolios[index]
        .as_mapping_mut()
        .ok_or_else(|| ImportError::InvalidPortfolio(format!("portfolio {} is not a mapping", name)))?;

    let key = if !non_empty_sequence(portfolio, "Products")
        && non_empty_sequence(portfolio, "Components")
    {
        "Components"
    } else {
        "Products"
    };
    sequence_entry(portfolio, key)
}

/// Products of a generated product-set portfolio: `Components`, then `Products`.
pub fn source_products(document: &Mapping) -> ImportResult<Sequence> {
    let portfolios = document
        .get("Portfolios")
        .and_then(Value::as_mapping)
        .ok_or_else(|| ImportError::InvalidPortfolio("missing Portfolios mapping".to_string()))?;

    let mut products = Sequence::new();
    for key in ["Components", "Products"] {
        if let Some(list) = portfolios.get(key).and_then(Value::as_sequence) {
            products.extend(list.iter().cloned());
        }
    }
    Ok(products)
}
