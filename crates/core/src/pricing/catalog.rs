//! Static catalog of every calculation variable: scope, kind, range, default.
//!
//! The catalog is the single source of truth consulted by the resolver and
//! the validator. It is immutable and built once per process.

use std::collections::BTreeMap;
use std::sync::OnceLock;

use rust_decimal::Decimal;

use crate::domain::currency::Currency;
use crate::domain::variable::{names, ResolvedValue, ValueKind, VariableScope};

#[derive(Clone, Debug, PartialEq)]
pub struct VariableDescriptor {
    pub name: &'static str,
    pub label: &'static str,
    pub scope: VariableScope,
    pub kind: ValueKind,
    pub required: bool,
    pub allowed: Option<&'static [&'static str]>,
    pub min: Option<Decimal>,
    pub max: Option<Decimal>,
    pub default: Option<ResolvedValue>,
}

impl VariableDescriptor {
    fn decimal(name: &'static str, label: &'static str, scope: VariableScope) -> Self {
        Self {
            name,
            label,
            scope,
            kind: ValueKind::Decimal,
            required: false,
            allowed: None,
            min: None,
            max: None,
            default: None,
        }
    }

    fn integer(name: &'static str, label: &'static str, scope: VariableScope) -> Self {
        Self { kind: ValueKind::Integer, ..Self::decimal(name, label, scope) }
    }

    fn text(name: &'static str, label: &'static str, scope: VariableScope) -> Self {
        Self { kind: ValueKind::Text, ..Self::decimal(name, label, scope) }
    }

    fn currency(name: &'static str, label: &'static str, scope: VariableScope) -> Self {
        Self {
            kind: ValueKind::Enumerated,
            allowed: Some(Currency::codes()),
            ..Self::decimal(name, label, scope)
        }
    }

    fn required(mut self) -> Self {
        self.required = true;
        self
    }

    fn range(mut self, min: i64, max: i64) -> Self {
        self.min = Some(Decimal::from(min));
        self.max = Some(Decimal::from(max));
        self
    }

    fn min(mut self, min: i64) -> Self {
        self.min = Some(Decimal::from(min));
        self
    }

    fn default_decimal(mut self, units: i64) -> Self {
        self.default = Some(ResolvedValue::Decimal(Decimal::from(units)));
        self
    }

    fn default_integer(mut self, value: i64) -> Self {
        self.default = Some(ResolvedValue::Integer(value));
        self
    }

    fn default_text(mut self, value: &str) -> Self {
        self.default = Some(ResolvedValue::Text(value.to_string()));
        self
    }
}

pub struct VariableCatalog {
    entries: Vec<VariableDescriptor>,
    by_name: BTreeMap<&'static str, usize>,
}

impl VariableCatalog {
    pub fn new() -> Self {
        let entries = catalog_entries();
        let by_name =
            entries.iter().enumerate().map(|(index, entry)| (entry.name, index)).collect();
        Self { entries, by_name }
    }

    /// Process-wide catalog instance.
    pub fn global() -> &'static VariableCatalog {
        static CATALOG: OnceLock<VariableCatalog> = OnceLock::new();
        CATALOG.get_or_init(VariableCatalog::new)
    }

    /// Unknown names are a programming error in the caller, not a runtime
    /// failure, hence `Option` rather than a dedicated error type.
    pub fn describe(&self, name: &str) -> Option<&VariableDescriptor> {
        self.by_name.get(name).map(|index| &self.entries[*index])
    }

    /// Descriptors in fixed declaration order.
    pub fn iter(&self) -> impl Iterator<Item = &VariableDescriptor> {
        self.entries.iter()
    }

    /// The mandatory variables the validator's required-field pass reports on.
    pub fn required(&self) -> impl Iterator<Item = &VariableDescriptor> {
        self.entries.iter().filter(|entry| entry.required)
    }

    pub fn scope_count(&self, scope: VariableScope) -> usize {
        self.entries.iter().filter(|entry| entry.scope == scope).count()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for VariableCatalog {
    fn default() -> Self {
        Self::new()
    }
}

fn catalog_entries() -> Vec<VariableDescriptor> {
    use VariableScope::{AdminOnly, Both, ProductOnly, QuoteOnly};

    vec![
        // product-only
        VariableDescriptor::text(names::SKU, "Supplier article (SKU)", ProductOnly).required(),
        VariableDescriptor::text(names::BRAND, "Brand", ProductOnly).required(),
        VariableDescriptor::decimal(names::BASE_PRICE, "Supplier base price incl. tax", ProductOnly)
            .required()
            .min(0),
        VariableDescriptor::integer(names::QUANTITY, "Quantity", ProductOnly).required(),
        VariableDescriptor::decimal(names::WEIGHT_KG, "Unit weight, kg", ProductOnly)
            .min(0)
            .default_decimal(0),
        // quote-only
        VariableDescriptor::currency(names::BASE_CURRENCY, "Quote base currency", QuoteOnly)
            .required(),
        VariableDescriptor::currency(names::PURCHASE_CURRENCY, "Purchase currency", QuoteOnly)
            .default_text("USD"),
        VariableDescriptor::decimal(names::FOREX_RATE, "Purchase to base forex rate", QuoteOnly)
            .required()
            .min(0),
        VariableDescriptor::integer(names::DELIVERY_DAYS, "Delivery period, days", QuoteOnly)
            .required(),
        VariableDescriptor::decimal(
            names::ADVANCE_PAYMENT_INITIAL_PCT,
            "Advance at order, %",
            QuoteOnly,
        )
        .required()
        .range(0, 100),
        VariableDescriptor::decimal(
            names::ADVANCE_PAYMENT_INTERIM_PCT,
            "Advance mid-delivery, %",
            QuoteOnly,
        )
        .required()
        .range(0, 100),
        VariableDescriptor::decimal(
            names::ADVANCE_PAYMENT_FINAL_PCT,
            "Advance on delivery, %",
            QuoteOnly,
        )
        .required()
        .range(0, 100),
        VariableDescriptor::integer(
            names::PAYMENT_DEFERRAL_DAYS,
            "Post-delivery payment deferral, days",
            QuoteOnly,
        )
        .min(0)
        .default_integer(0),
        VariableDescriptor::decimal(names::FREIGHT_COST_PER_KG, "Freight cost per kg", QuoteOnly)
            .min(0)
            .default_decimal(0),
        VariableDescriptor::decimal(names::INSURANCE_PCT, "Cargo insurance, %", QuoteOnly)
            .range(0, 100)
            .default_decimal(0),
        VariableDescriptor::decimal(
            names::CUSTOMS_CLEARANCE_FEE,
            "Customs clearance fee, per quote",
            QuoteOnly,
        )
        .min(0)
        .default_decimal(0),
        VariableDescriptor::decimal(
            names::CERTIFICATION_COST,
            "Certification cost, per quote",
            QuoteOnly,
        )
        .min(0)
        .default_decimal(0),
        VariableDescriptor::decimal(
            names::PACKAGING_COST_PER_UNIT,
            "Packaging cost per unit",
            QuoteOnly,
        )
        .min(0)
        .default_decimal(0),
        VariableDescriptor::decimal(names::DOCUMENT_FEE, "Document fee, per quote", QuoteOnly)
            .min(0)
            .default_decimal(0),
        VariableDescriptor::decimal(names::BANK_TRANSFER_FEE_PCT, "Bank transfer fee, %", QuoteOnly)
            .range(0, 100)
            .default_decimal(0),
        VariableDescriptor::decimal(
            names::CURRENCY_CONVERSION_FEE_PCT,
            "Currency conversion fee, %",
            QuoteOnly,
        )
        .range(0, 100)
        .default_decimal(0),
        VariableDescriptor::integer(names::QUOTE_VALIDITY_DAYS, "Quote validity, days", QuoteOnly)
            .min(0)
            .default_integer(30),
        VariableDescriptor::text(names::CUSTOMER_CATEGORY, "Customer category", QuoteOnly)
            .default_text("standard"),
        VariableDescriptor::integer(names::PRICE_SCALE, "Presentation price scale", QuoteOnly)
            .range(0, 6)
            .default_integer(2),
        // both: product override wins over the quote-wide default
        VariableDescriptor::decimal(names::SUPPLIER_DISCOUNT_PCT, "Supplier discount, %", Both)
            .range(0, 100)
            .default_decimal(0),
        VariableDescriptor::decimal(names::MARKUP_PCT, "Markup, %", Both).min(0).default_decimal(25),
        VariableDescriptor::decimal(names::VAT_PCT, "VAT, %", Both).range(0, 100).default_decimal(20),
        VariableDescriptor::decimal(names::CUSTOMS_DUTY_PCT, "Customs duty, %", Both)
            .range(0, 100)
            .default_decimal(0),
        VariableDescriptor::decimal(names::EXCISE_PCT, "Excise, %", Both)
            .range(0, 100)
            .default_decimal(0),
        VariableDescriptor::decimal(names::HANDLING_FEE_PER_UNIT, "Handling fee per unit", Both)
            .min(0)
            .default_decimal(0),
        VariableDescriptor::decimal(
            names::STORAGE_RATE_PER_UNIT_DAY,
            "Storage rate per unit-day",
            Both,
        )
        .min(0)
        .default_decimal(0),
        VariableDescriptor::integer(names::STORAGE_DAYS, "Storage period, days", Both)
            .min(0)
            .default_integer(0),
        VariableDescriptor::decimal(
            names::LOCAL_DELIVERY_COST_PER_UNIT,
            "Local delivery cost per unit",
            Both,
        )
        .min(0)
        .default_decimal(0),
        VariableDescriptor::decimal(names::AGENT_COMMISSION_PCT, "Agent commission, %", Both)
            .range(0, 100)
            .default_decimal(0),
        VariableDescriptor::decimal(names::WARRANTY_RESERVE_PCT, "Warranty reserve, %", Both)
            .range(0, 100)
            .default_decimal(0),
        VariableDescriptor::decimal(names::FREIGHT_SURCHARGE_PCT, "Freight surcharge, %", Both)
            .range(0, 100)
            .default_decimal(0),
        VariableDescriptor::decimal(names::CUSTOMER_DISCOUNT_PCT, "Customer discount, %", Both)
            .range(0, 100)
            .default_decimal(0),
        VariableDescriptor::decimal(names::EXTRA_COST_PER_UNIT, "Extra cost per unit", Both)
            .min(0)
            .default_decimal(0),
        VariableDescriptor::integer(names::FINANCING_DAYS_BUFFER, "Financing buffer, days", Both)
            .min(0)
            .default_integer(0),
        // admin-only: organization-wide constants, never user-overridable
        VariableDescriptor::decimal(names::FOREX_RISK_PCT, "Forex risk rate, %", AdminOnly)
            .min(0)
            .default_decimal(0),
        VariableDescriptor::decimal(
            names::FINANCING_COMMISSION_PCT,
            "Financing commission, %",
            AdminOnly,
        )
        .min(0)
        .default_decimal(0),
        VariableDescriptor::decimal(
            names::LOAN_INTEREST_ANNUAL_PCT,
            "Loan interest rate, % p.a.",
            AdminOnly,
        )
        .min(0)
        .default_decimal(0),
    ]
}

#[cfg(test)]
mod tests {
    use crate::domain::variable::{names, VariableScope};

    use super::VariableCatalog;

    #[test]
    fn catalog_carries_the_expected_scope_distribution() {
        let catalog = VariableCatalog::new();
        assert_eq!(catalog.len(), 42);
        assert_eq!(catalog.scope_count(VariableScope::ProductOnly), 5);
        assert_eq!(catalog.scope_count(VariableScope::QuoteOnly), 19);
        assert_eq!(catalog.scope_count(VariableScope::Both), 15);
        assert_eq!(catalog.scope_count(VariableScope::AdminOnly), 3);
    }

    #[test]
    fn ten_variables_are_mandatory() {
        let catalog = VariableCatalog::new();
        let required: Vec<&str> = catalog.required().map(|entry| entry.name).collect();
        assert_eq!(required.len(), 10);
        for name in [
            names::SKU,
            names::BRAND,
            names::BASE_PRICE,
            names::QUANTITY,
            names::BASE_CURRENCY,
            names::DELIVERY_DAYS,
            names::ADVANCE_PAYMENT_INITIAL_PCT,
            names::ADVANCE_PAYMENT_INTERIM_PCT,
            names::ADVANCE_PAYMENT_FINAL_PCT,
            names::FOREX_RATE,
        ] {
            assert!(required.contains(&name), "{name} should be mandatory");
        }
    }

    #[test]
    fn required_variables_carry_no_defaults() {
        let catalog = VariableCatalog::new();
        for entry in catalog.required() {
            assert!(entry.default.is_none(), "{} must not default silently", entry.name);
        }
    }

    #[test]
    fn every_optional_variable_has_a_default() {
        let catalog = VariableCatalog::new();
        for entry in catalog.iter().filter(|entry| !entry.required) {
            assert!(entry.default.is_some(), "{} needs a catalog default", entry.name);
        }
    }

    #[test]
    fn unknown_names_return_none() {
        assert!(VariableCatalog::global().describe("no_such_variable").is_none());
    }
}
