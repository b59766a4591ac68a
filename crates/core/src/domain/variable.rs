use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Which raw mappings may supply a value for a variable. Precedence for
/// `Both` is product override, then quote default, then catalog default.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VariableScope {
    ProductOnly,
    QuoteOnly,
    Both,
    AdminOnly,
}

impl VariableScope {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ProductOnly => "product_only",
            Self::QuoteOnly => "quote_only",
            Self::Both => "both",
            Self::AdminOnly => "admin_only",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueKind {
    Decimal,
    Integer,
    Text,
    Enumerated,
}

impl ValueKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Decimal => "decimal",
            Self::Integer => "integer",
            Self::Text => "text",
            Self::Enumerated => "enumerated",
        }
    }
}

/// A value as fetched from storage by the caller. `Null` and map absence both
/// mean "absent"; zero and the empty string are present values.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawValue {
    Integer(i64),
    Decimal(Decimal),
    Text(String),
    Null,
}

impl RawValue {
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Integer(_) => "integer",
            Self::Decimal(_) => "decimal",
            Self::Text(_) => "text",
            Self::Null => "null",
        }
    }
}

/// One effective value after precedence resolution. `Unresolved` is carried
/// to the validator so every missing variable is reported in one pass.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolvedValue {
    Decimal(Decimal),
    Integer(i64),
    Text(String),
    Unresolved,
}

impl ResolvedValue {
    pub fn is_unresolved(&self) -> bool {
        matches!(self, Self::Unresolved)
    }

    /// Numeric view. Integers widen losslessly into decimal slots.
    pub fn as_decimal(&self) -> Option<Decimal> {
        match self {
            Self::Decimal(value) => Some(*value),
            Self::Integer(value) => Some(Decimal::from(*value)),
            _ => None,
        }
    }

    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Self::Integer(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(value) => Some(value),
            _ => None,
        }
    }
}

/// Raw mapping as supplied by the caller for one scope level.
pub type VariableMap = BTreeMap<String, RawValue>;

/// Canonical variable names. The catalog in `pricing::catalog` is the single
/// source of truth for scope, kind, range, and defaults.
pub mod names {
    // product-only
    pub const SKU: &str = "sku";
    pub const BRAND: &str = "brand";
    pub const BASE_PRICE: &str = "base_price";
    pub const QUANTITY: &str = "quantity";
    pub const WEIGHT_KG: &str = "weight_kg";

    // quote-only
    pub const BASE_CURRENCY: &str = "base_currency";
    pub const PURCHASE_CURRENCY: &str = "purchase_currency";
    pub const FOREX_RATE: &str = "forex_rate";
    pub const DELIVERY_DAYS: &str = "delivery_days";
    pub const ADVANCE_PAYMENT_INITIAL_PCT: &str = "advance_payment_initial_pct";
    pub const ADVANCE_PAYMENT_INTERIM_PCT: &str = "advance_payment_interim_pct";
    pub const ADVANCE_PAYMENT_FINAL_PCT: &str = "advance_payment_final_pct";
    pub const PAYMENT_DEFERRAL_DAYS: &str = "payment_deferral_days";
    pub const FREIGHT_COST_PER_KG: &str = "freight_cost_per_kg";
    pub const INSURANCE_PCT: &str = "insurance_pct";
    pub const CUSTOMS_CLEARANCE_FEE: &str = "customs_clearance_fee";
    pub const CERTIFICATION_COST: &str = "certification_cost";
    pub const PACKAGING_COST_PER_UNIT: &str = "packaging_cost_per_unit";
    pub const DOCUMENT_FEE: &str = "document_fee";
    pub const BANK_TRANSFER_FEE_PCT: &str = "bank_transfer_fee_pct";
    pub const CURRENCY_CONVERSION_FEE_PCT: &str = "currency_conversion_fee_pct";
    pub const QUOTE_VALIDITY_DAYS: &str = "quote_validity_days";
    pub const CUSTOMER_CATEGORY: &str = "customer_category";
    pub const PRICE_SCALE: &str = "price_scale";

    // both
    pub const SUPPLIER_DISCOUNT_PCT: &str = "supplier_discount_pct";
    pub const MARKUP_PCT: &str = "markup_pct";
    pub const VAT_PCT: &str = "vat_pct";
    pub const CUSTOMS_DUTY_PCT: &str = "customs_duty_pct";
    pub const EXCISE_PCT: &str = "excise_pct";
    pub const HANDLING_FEE_PER_UNIT: &str = "handling_fee_per_unit";
    pub const STORAGE_RATE_PER_UNIT_DAY: &str = "storage_rate_per_unit_day";
    pub const STORAGE_DAYS: &str = "storage_days";
    pub const LOCAL_DELIVERY_COST_PER_UNIT: &str = "local_delivery_cost_per_unit";
    pub const AGENT_COMMISSION_PCT: &str = "agent_commission_pct";
    pub const WARRANTY_RESERVE_PCT: &str = "warranty_reserve_pct";
    pub const FREIGHT_SURCHARGE_PCT: &str = "freight_surcharge_pct";
    pub const CUSTOMER_DISCOUNT_PCT: &str = "customer_discount_pct";
    pub const EXTRA_COST_PER_UNIT: &str = "extra_cost_per_unit";
    pub const FINANCING_DAYS_BUFFER: &str = "financing_days_buffer";

    // admin-only
    pub const FOREX_RISK_PCT: &str = "forex_risk_pct";
    pub const FINANCING_COMMISSION_PCT: &str = "financing_commission_pct";
    pub const LOAN_INTEREST_ANNUAL_PCT: &str = "loan_interest_annual_pct";
}
