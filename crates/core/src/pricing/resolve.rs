//! Two-tier precedence resolution: product override, quote default, catalog
//! fallback, selected by the descriptor's declared scope.
//!
//! Presence is "non-null", never "truthy": a raw `0` or `""` is a present
//! value and wins over lower-precedence sources. Only `Null` or map absence
//! falls through.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::variable::{
    RawValue, ResolvedValue, ValueKind, VariableMap, VariableScope,
};
use crate::pricing::catalog::{VariableCatalog, VariableDescriptor};

#[derive(Clone, Debug, Error, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "error")]
pub enum ResolutionError {
    #[error("variable `{name}` expected {expected} but the raw value was {found}")]
    TypeMismatch { name: String, expected: String, found: String },
    #[error("unknown variable name `{name}`")]
    UnknownVariable { name: String },
    #[error("variable `{name}` was still unresolved after validation")]
    UnresolvedAfterValidation { name: String },
}

/// Effective values for one scope view (a product line, or the quote level).
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ResolvedSet {
    values: BTreeMap<String, ResolvedValue>,
}

impl ResolvedSet {
    pub fn get(&self, name: &str) -> &ResolvedValue {
        self.values.get(name).unwrap_or(&ResolvedValue::Unresolved)
    }

    pub fn decimal(&self, name: &str) -> Option<rust_decimal::Decimal> {
        self.get(name).as_decimal()
    }

    pub fn integer(&self, name: &str) -> Option<i64> {
        self.get(name).as_integer()
    }

    pub fn text(&self, name: &str) -> Option<&str> {
        self.get(name).as_text()
    }

    pub fn is_unresolved(&self, name: &str) -> bool {
        self.get(name).is_unresolved()
    }

    fn insert(&mut self, name: &str, value: ResolvedValue) {
        self.values.insert(name.to_string(), value);
    }
}

/// Resolve every catalog variable for one product line.
///
/// Pure function: the same three mappings against the same catalog always
/// yield the same resolved set. A raw value of the wrong kind is fatal for
/// this line only; missing values with no default resolve to `Unresolved`
/// so the validator can report them all at once.
pub fn resolve_line(
    product_raw: &VariableMap,
    quote_raw: &VariableMap,
    admin_raw: &VariableMap,
    catalog: &VariableCatalog,
) -> Result<ResolvedSet, ResolutionError> {
    let mut resolved = ResolvedSet::default();
    for descriptor in catalog.iter() {
        let value = resolve_one(descriptor, Some(product_raw), quote_raw, admin_raw)?;
        resolved.insert(descriptor.name, value);
    }
    Ok(resolved)
}

/// Quote-scope view for the validator: product-only variables are skipped,
/// everything else resolves exactly as in `resolve_line`.
pub fn resolve_quote_level(
    quote_raw: &VariableMap,
    admin_raw: &VariableMap,
    catalog: &VariableCatalog,
) -> Result<ResolvedSet, ResolutionError> {
    let mut resolved = ResolvedSet::default();
    for descriptor in catalog.iter() {
        if descriptor.scope == VariableScope::ProductOnly {
            continue;
        }
        let value = resolve_one(descriptor, None, quote_raw, admin_raw)?;
        resolved.insert(descriptor.name, value);
    }
    Ok(resolved)
}

fn resolve_one(
    descriptor: &VariableDescriptor,
    product_raw: Option<&VariableMap>,
    quote_raw: &VariableMap,
    admin_raw: &VariableMap,
) -> Result<ResolvedValue, ResolutionError> {
    match select_source(descriptor, product_raw, quote_raw, admin_raw) {
        Some(raw) => coerce(descriptor, raw),
        None => Ok(descriptor.default.clone().unwrap_or(ResolvedValue::Unresolved)),
    }
}

/// The precedence table. One function keyed by declared scope; overrides for
/// admin-only names in the product or quote mappings are ignored regardless
/// of value.
fn select_source<'a>(
    descriptor: &VariableDescriptor,
    product_raw: Option<&'a VariableMap>,
    quote_raw: &'a VariableMap,
    admin_raw: &'a VariableMap,
) -> Option<&'a RawValue> {
    let product = |name| product_raw.and_then(|map| present(map, name));
    match descriptor.scope {
        VariableScope::Both => {
            product(descriptor.name).or_else(|| present(quote_raw, descriptor.name))
        }
        VariableScope::ProductOnly => product(descriptor.name),
        VariableScope::QuoteOnly => present(quote_raw, descriptor.name),
        VariableScope::AdminOnly => present(admin_raw, descriptor.name),
    }
}

fn present<'a>(map: &'a VariableMap, name: &str) -> Option<&'a RawValue> {
    map.get(name).filter(|raw| !raw.is_null())
}

fn coerce(
    descriptor: &VariableDescriptor,
    raw: &RawValue,
) -> Result<ResolvedValue, ResolutionError> {
    let mismatch = || ResolutionError::TypeMismatch {
        name: descriptor.name.to_string(),
        expected: descriptor.kind.as_str().to_string(),
        found: raw.kind_name().to_string(),
    };

    match (descriptor.kind, raw) {
        (ValueKind::Decimal, RawValue::Decimal(value)) => Ok(ResolvedValue::Decimal(*value)),
        (ValueKind::Decimal, RawValue::Integer(value)) => {
            Ok(ResolvedValue::Decimal(rust_decimal::Decimal::from(*value)))
        }
        (ValueKind::Integer, RawValue::Integer(value)) => Ok(ResolvedValue::Integer(*value)),
        (ValueKind::Text | ValueKind::Enumerated, RawValue::Text(value)) => {
            Ok(ResolvedValue::Text(value.clone()))
        }
        _ => Err(mismatch()),
    }
}
