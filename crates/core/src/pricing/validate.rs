//! Pre-pipeline validation. Two passes, both run to completion so the caller
//! sees every issue in one round trip instead of fixing them one at a time.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::variable::{names, ValueKind, VariableScope};
use crate::pricing::catalog::{VariableCatalog, VariableDescriptor};
use crate::pricing::resolve::ResolvedSet;

#[derive(Clone, Debug, Error, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "error")]
pub enum ValidationError {
    #[error("missing required variable `{name}` in {scope:?} scope")]
    MissingVariable { scope: VariableScope, name: String, product_index: Option<usize> },
    #[error("advance payments sum to {total}%, which exceeds 100%")]
    AdvancePaymentOverflow { total: Decimal },
    #[error("delivery days must be positive, got {value}")]
    InvalidDeliveryDays { value: i64 },
    #[error("quantity must be positive for product line {product_index}, got {value}")]
    InvalidQuantity { product_index: usize, value: i64 },
    #[error("currency `{value}` is not supported")]
    InvalidCurrency { value: String },
    #[error("variable `{name}` is out of its declared range: {value}")]
    OutOfRange {
        scope: VariableScope,
        name: String,
        product_index: Option<usize>,
        value: Decimal,
    },
}

/// Check the quote-level view plus every product line's resolved set.
/// An empty result means the pipeline may run.
pub fn validate(
    quote_resolved: &ResolvedSet,
    line_resolved: &[(usize, ResolvedSet)],
    catalog: &VariableCatalog,
) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    required_pass(quote_resolved, line_resolved, catalog, &mut errors);
    business_pass(quote_resolved, line_resolved, catalog, &mut errors);
    errors
}

/// Pass 1: every absent occurrence of the ten mandatory variables, across
/// every product line, is reported. No early termination.
fn required_pass(
    quote_resolved: &ResolvedSet,
    line_resolved: &[(usize, ResolvedSet)],
    catalog: &VariableCatalog,
    errors: &mut Vec<ValidationError>,
) {
    for descriptor in catalog.required() {
        match descriptor.scope {
            VariableScope::ProductOnly => {
                for (product_index, resolved) in line_resolved {
                    if resolved.is_unresolved(descriptor.name) {
                        errors.push(ValidationError::MissingVariable {
                            scope: descriptor.scope,
                            name: descriptor.name.to_string(),
                            product_index: Some(*product_index),
                        });
                    }
                }
            }
            _ => {
                if quote_resolved.is_unresolved(descriptor.name) {
                    errors.push(ValidationError::MissingVariable {
                        scope: descriptor.scope,
                        name: descriptor.name.to_string(),
                        product_index: None,
                    });
                }
            }
        }
    }
}

/// Pass 2: business rules, evaluated only on fields that passed pass 1.
fn business_pass(
    quote_resolved: &ResolvedSet,
    line_resolved: &[(usize, ResolvedSet)],
    catalog: &VariableCatalog,
    errors: &mut Vec<ValidationError>,
) {
    let advances = [
        quote_resolved.decimal(names::ADVANCE_PAYMENT_INITIAL_PCT),
        quote_resolved.decimal(names::ADVANCE_PAYMENT_INTERIM_PCT),
        quote_resolved.decimal(names::ADVANCE_PAYMENT_FINAL_PCT),
    ];
    if let [Some(initial), Some(interim), Some(last)] = advances {
        let total = initial + interim + last;
        if total > Decimal::ONE_HUNDRED {
            errors.push(ValidationError::AdvancePaymentOverflow { total });
        }
    }

    if let Some(value) = quote_resolved.integer(names::DELIVERY_DAYS) {
        if value <= 0 {
            errors.push(ValidationError::InvalidDeliveryDays { value });
        }
    }

    for (product_index, resolved) in line_resolved {
        if let Some(value) = resolved.integer(names::QUANTITY) {
            if value <= 0 {
                errors.push(ValidationError::InvalidQuantity {
                    product_index: *product_index,
                    value,
                });
            }
        }
    }

    enumerated_pass(quote_resolved, catalog, errors);
    range_pass(quote_resolved, line_resolved, catalog, errors);
}

/// Enumerated membership. Both enumerated variables are currencies, so a
/// value outside the allowed set is an `InvalidCurrency`.
fn enumerated_pass(
    quote_resolved: &ResolvedSet,
    catalog: &VariableCatalog,
    errors: &mut Vec<ValidationError>,
) {
    for descriptor in catalog.iter().filter(|entry| entry.kind == ValueKind::Enumerated) {
        let Some(allowed) = descriptor.allowed else { continue };
        if let Some(value) = quote_resolved.text(descriptor.name) {
            if !allowed.iter().any(|candidate| *candidate == value) {
                errors.push(ValidationError::InvalidCurrency { value: value.to_string() });
            }
        }
    }
}

/// Declared-range check: product-scope variables per line, quote- and
/// admin-scope variables once at the quote level.
fn range_pass(
    quote_resolved: &ResolvedSet,
    line_resolved: &[(usize, ResolvedSet)],
    catalog: &VariableCatalog,
    errors: &mut Vec<ValidationError>,
) {
    for descriptor in catalog.iter() {
        if descriptor.min.is_none() && descriptor.max.is_none() {
            continue;
        }
        match descriptor.scope {
            VariableScope::ProductOnly | VariableScope::Both => {
                for (product_index, resolved) in line_resolved {
                    check_range(descriptor, resolved, Some(*product_index), errors);
                }
            }
            VariableScope::QuoteOnly | VariableScope::AdminOnly => {
                check_range(descriptor, quote_resolved, None, errors);
            }
        }
    }
}

fn check_range(
    descriptor: &VariableDescriptor,
    resolved: &ResolvedSet,
    product_index: Option<usize>,
    errors: &mut Vec<ValidationError>,
) {
    let Some(value) = resolved.decimal(descriptor.name) else { return };
    let below = descriptor.min.map(|min| value < min).unwrap_or(false);
    let above = descriptor.max.map(|max| value > max).unwrap_or(false);
    if below || above {
        errors.push(ValidationError::OutOfRange {
            scope: descriptor.scope,
            name: descriptor.name.to_string(),
            product_index,
            value,
        });
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use crate::domain::variable::{names, RawValue, VariableMap};
    use crate::pricing::catalog::VariableCatalog;
    use crate::pricing::resolve::{resolve_line, resolve_quote_level};

    use super::{validate, ValidationError};

    fn raw(entries: &[(&str, RawValue)]) -> VariableMap {
        entries.iter().map(|(name, value)| (name.to_string(), value.clone())).collect()
    }

    fn quote_raw(advances: (i64, i64, i64)) -> VariableMap {
        raw(&[
            (names::BASE_CURRENCY, RawValue::Text("USD".to_string())),
            (names::FOREX_RATE, RawValue::Decimal(Decimal::ONE)),
            (names::DELIVERY_DAYS, RawValue::Integer(30)),
            (names::ADVANCE_PAYMENT_INITIAL_PCT, RawValue::Decimal(Decimal::from(advances.0))),
            (names::ADVANCE_PAYMENT_INTERIM_PCT, RawValue::Decimal(Decimal::from(advances.1))),
            (names::ADVANCE_PAYMENT_FINAL_PCT, RawValue::Decimal(Decimal::from(advances.2))),
        ])
    }

    fn product_raw(quantity: i64) -> VariableMap {
        raw(&[
            (names::SKU, RawValue::Text("PUMP-100".to_string())),
            (names::BRAND, RawValue::Text("Grundfos".to_string())),
            (names::BASE_PRICE, RawValue::Decimal(Decimal::from(1000))),
            (names::QUANTITY, RawValue::Integer(quantity)),
        ])
    }

    fn run(quote: &VariableMap, products: &[VariableMap]) -> Vec<ValidationError> {
        let catalog = VariableCatalog::global();
        let admin = VariableMap::new();
        let quote_view = resolve_quote_level(quote, &admin, catalog).expect("quote resolution");
        let lines: Vec<_> = products
            .iter()
            .enumerate()
            .map(|(index, product)| {
                (index, resolve_line(product, quote, &admin, catalog).expect("line resolution"))
            })
            .collect();
        validate(&quote_view, &lines, catalog)
    }

    #[test]
    fn clean_quote_produces_no_errors() {
        let errors = run(&quote_raw((40, 30, 20)), &[product_raw(1)]);
        assert!(errors.is_empty(), "unexpected errors: {errors:?}");
    }

    #[test]
    fn reports_every_missing_required_variable_without_short_circuiting() {
        // Empty quote and two empty product lines: 6 quote-level misses plus
        // 4 product-level misses per line.
        let errors = run(&VariableMap::new(), &[VariableMap::new(), VariableMap::new()]);
        let missing = errors
            .iter()
            .filter(|error| matches!(error, ValidationError::MissingVariable { .. }))
            .count();
        assert_eq!(missing, 6 + 4 * 2);
        assert_eq!(errors.len(), missing);
    }

    #[test]
    fn advance_payments_above_one_hundred_percent_overflow() {
        let errors = run(&quote_raw((40, 40, 21)), &[product_raw(1)]);
        assert!(errors.iter().any(|error| matches!(
            error,
            ValidationError::AdvancePaymentOverflow { total } if *total == Decimal::from(101)
        )));

        let errors = run(&quote_raw((40, 30, 20)), &[product_raw(1)]);
        assert!(!errors
            .iter()
            .any(|error| matches!(error, ValidationError::AdvancePaymentOverflow { .. })));
    }

    #[test]
    fn zero_quantity_is_rejected_and_one_passes() {
        let errors = run(&quote_raw((40, 30, 20)), &[product_raw(0)]);
        assert!(errors.iter().any(|error| matches!(
            error,
            ValidationError::InvalidQuantity { product_index: 0, value: 0 }
        )));

        let errors = run(&quote_raw((40, 30, 20)), &[product_raw(1)]);
        assert!(errors.is_empty());
    }

    #[test]
    fn non_positive_delivery_days_are_rejected() {
        let mut quote = quote_raw((40, 30, 20));
        quote.insert(names::DELIVERY_DAYS.to_string(), RawValue::Integer(0));
        let errors = run(&quote, &[product_raw(1)]);
        assert!(errors
            .iter()
            .any(|error| matches!(error, ValidationError::InvalidDeliveryDays { value: 0 })));
    }

    #[test]
    fn unsupported_base_currency_is_rejected() {
        let mut quote = quote_raw((40, 30, 20));
        quote.insert(names::BASE_CURRENCY.to_string(), RawValue::Text("GBP".to_string()));
        let errors = run(&quote, &[product_raw(1)]);
        assert!(errors.iter().any(|error| matches!(
            error,
            ValidationError::InvalidCurrency { value } if value == "GBP"
        )));
    }

    #[test]
    fn out_of_range_values_are_reported_with_their_scope() {
        let mut product = product_raw(1);
        product
            .insert(names::SUPPLIER_DISCOUNT_PCT.to_string(), RawValue::Decimal(Decimal::from(140)));
        let mut quote = quote_raw((40, 30, 20));
        quote.insert(names::INSURANCE_PCT.to_string(), RawValue::Decimal(Decimal::from(-5)));

        let errors = run(&quote, &[product]);
        assert!(errors.iter().any(|error| matches!(
            error,
            ValidationError::OutOfRange { name, product_index: Some(0), .. }
                if name == names::SUPPLIER_DISCOUNT_PCT
        )));
        assert!(errors.iter().any(|error| matches!(
            error,
            ValidationError::OutOfRange { name, product_index: None, .. }
                if name == names::INSURANCE_PCT
        )));
    }
}
