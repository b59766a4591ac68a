//! The 42 resolved variables grouped into seven bundles. Pure namespacing
//! for the pipeline's benefit; the grouping carries no behavior.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::currency::Currency;
use crate::domain::variable::names;
use crate::pricing::resolve::{ResolutionError, ResolvedSet};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct IdentityInputs {
    pub sku: String,
    pub brand: String,
    pub quantity: i64,
    pub customer_category: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PricingInputs {
    pub base_price: Decimal,
    pub base_currency: Currency,
    pub purchase_currency: Currency,
    pub forex_rate: Decimal,
    pub supplier_discount_pct: Decimal,
    pub forex_risk_pct: Decimal,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PaymentInputs {
    pub advance_initial_pct: Decimal,
    pub advance_interim_pct: Decimal,
    pub advance_final_pct: Decimal,
    pub payment_deferral_days: i64,
    pub delivery_days: i64,
    pub financing_days_buffer: i64,
    pub loan_interest_annual_pct: Decimal,
    pub financing_commission_pct: Decimal,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LogisticsInputs {
    pub weight_kg: Decimal,
    pub freight_cost_per_kg: Decimal,
    pub freight_surcharge_pct: Decimal,
    pub insurance_pct: Decimal,
    pub local_delivery_cost_per_unit: Decimal,
    pub packaging_cost_per_unit: Decimal,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FeeInputs {
    pub customs_clearance_fee: Decimal,
    pub certification_cost: Decimal,
    pub document_fee: Decimal,
    pub bank_transfer_fee_pct: Decimal,
    pub currency_conversion_fee_pct: Decimal,
    pub agent_commission_pct: Decimal,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CostInputs {
    pub customs_duty_pct: Decimal,
    pub excise_pct: Decimal,
    pub handling_fee_per_unit: Decimal,
    pub storage_rate_per_unit_day: Decimal,
    pub storage_days: i64,
    pub warranty_reserve_pct: Decimal,
    pub extra_cost_per_unit: Decimal,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SettingsInputs {
    pub markup_pct: Decimal,
    pub customer_discount_pct: Decimal,
    pub vat_pct: Decimal,
    pub quote_validity_days: i64,
    pub price_scale: u32,
}

/// Everything the pipeline needs for one product line.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CalculationInput {
    pub identity: IdentityInputs,
    pub pricing: PricingInputs,
    pub payment: PaymentInputs,
    pub logistics: LogisticsInputs,
    pub fees: FeeInputs,
    pub costs: CostInputs,
    pub settings: SettingsInputs,
}

impl CalculationInput {
    /// Bind a validated resolved set into typed bundles.
    ///
    /// The validator guarantees every required variable is present and every
    /// optional one has a catalog default, so a miss here is a programming
    /// error surfaced as `UnresolvedAfterValidation` rather than a panic.
    pub fn bind(resolved: &ResolvedSet) -> Result<Self, ResolutionError> {
        Ok(Self {
            identity: IdentityInputs {
                sku: text(resolved, names::SKU)?,
                brand: text(resolved, names::BRAND)?,
                quantity: integer(resolved, names::QUANTITY)?,
                customer_category: text(resolved, names::CUSTOMER_CATEGORY)?,
            },
            pricing: PricingInputs {
                base_price: decimal(resolved, names::BASE_PRICE)?,
                base_currency: currency(resolved, names::BASE_CURRENCY)?,
                purchase_currency: currency(resolved, names::PURCHASE_CURRENCY)?,
                forex_rate: decimal(resolved, names::FOREX_RATE)?,
                supplier_discount_pct: decimal(resolved, names::SUPPLIER_DISCOUNT_PCT)?,
                forex_risk_pct: decimal(resolved, names::FOREX_RISK_PCT)?,
            },
            payment: PaymentInputs {
                advance_initial_pct: decimal(resolved, names::ADVANCE_PAYMENT_INITIAL_PCT)?,
                advance_interim_pct: decimal(resolved, names::ADVANCE_PAYMENT_INTERIM_PCT)?,
                advance_final_pct: decimal(resolved, names::ADVANCE_PAYMENT_FINAL_PCT)?,
                payment_deferral_days: integer(resolved, names::PAYMENT_DEFERRAL_DAYS)?,
                delivery_days: integer(resolved, names::DELIVERY_DAYS)?,
                financing_days_buffer: integer(resolved, names::FINANCING_DAYS_BUFFER)?,
                loan_interest_annual_pct: decimal(resolved, names::LOAN_INTEREST_ANNUAL_PCT)?,
                financing_commission_pct: decimal(resolved, names::FINANCING_COMMISSION_PCT)?,
            },
            logistics: LogisticsInputs {
                weight_kg: decimal(resolved, names::WEIGHT_KG)?,
                freight_cost_per_kg: decimal(resolved, names::FREIGHT_COST_PER_KG)?,
                freight_surcharge_pct: decimal(resolved, names::FREIGHT_SURCHARGE_PCT)?,
                insurance_pct: decimal(resolved, names::INSURANCE_PCT)?,
                local_delivery_cost_per_unit: decimal(
                    resolved,
                    names::LOCAL_DELIVERY_COST_PER_UNIT,
                )?,
                packaging_cost_per_unit: decimal(resolved, names::PACKAGING_COST_PER_UNIT)?,
            },
            fees: FeeInputs {
                customs_clearance_fee: decimal(resolved, names::CUSTOMS_CLEARANCE_FEE)?,
                certification_cost: decimal(resolved, names::CERTIFICATION_COST)?,
                document_fee: decimal(resolved, names::DOCUMENT_FEE)?,
                bank_transfer_fee_pct: decimal(resolved, names::BANK_TRANSFER_FEE_PCT)?,
                currency_conversion_fee_pct: decimal(
                    resolved,
                    names::CURRENCY_CONVERSION_FEE_PCT,
                )?,
                agent_commission_pct: decimal(resolved, names::AGENT_COMMISSION_PCT)?,
            },
            costs: CostInputs {
                customs_duty_pct: decimal(resolved, names::CUSTOMS_DUTY_PCT)?,
                excise_pct: decimal(resolved, names::EXCISE_PCT)?,
                handling_fee_per_unit: decimal(resolved, names::HANDLING_FEE_PER_UNIT)?,
                storage_rate_per_unit_day: decimal(resolved, names::STORAGE_RATE_PER_UNIT_DAY)?,
                storage_days: integer(resolved, names::STORAGE_DAYS)?,
                warranty_reserve_pct: decimal(resolved, names::WARRANTY_RESERVE_PCT)?,
                extra_cost_per_unit: decimal(resolved, names::EXTRA_COST_PER_UNIT)?,
            },
            settings: SettingsInputs {
                markup_pct: decimal(resolved, names::MARKUP_PCT)?,
                customer_discount_pct: decimal(resolved, names::CUSTOMER_DISCOUNT_PCT)?,
                vat_pct: decimal(resolved, names::VAT_PCT)?,
                quote_validity_days: integer(resolved, names::QUOTE_VALIDITY_DAYS)?,
                price_scale: scale(resolved, names::PRICE_SCALE)?,
            },
        })
    }
}

fn unresolved(name: &str) -> ResolutionError {
    ResolutionError::UnresolvedAfterValidation { name: name.to_string() }
}

fn decimal(resolved: &ResolvedSet, name: &str) -> Result<Decimal, ResolutionError> {
    resolved.decimal(name).ok_or_else(|| unresolved(name))
}

fn integer(resolved: &ResolvedSet, name: &str) -> Result<i64, ResolutionError> {
    resolved.integer(name).ok_or_else(|| unresolved(name))
}

fn text(resolved: &ResolvedSet, name: &str) -> Result<String, ResolutionError> {
    resolved.text(name).map(str::to_string).ok_or_else(|| unresolved(name))
}

fn currency(resolved: &ResolvedSet, name: &str) -> Result<Currency, ResolutionError> {
    resolved
        .text(name)
        .and_then(|code| code.parse::<Currency>().ok())
        .ok_or_else(|| unresolved(name))
}

fn scale(resolved: &ResolvedSet, name: &str) -> Result<u32, ResolutionError> {
    let value = integer(resolved, name)?;
    u32::try_from(value).map_err(|_| unresolved(name))
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use crate::domain::currency::Currency;
    use crate::domain::variable::{names, RawValue, VariableMap};
    use crate::pricing::catalog::VariableCatalog;
    use crate::pricing::resolve::resolve_line;

    use super::CalculationInput;

    fn raw(entries: &[(&str, RawValue)]) -> VariableMap {
        entries.iter().map(|(name, value)| (name.to_string(), value.clone())).collect()
    }

    #[test]
    fn binds_a_complete_resolved_set_into_bundles() {
        let product = raw(&[
            (names::SKU, RawValue::Text("PUMP-100".to_string())),
            (names::BRAND, RawValue::Text("Grundfos".to_string())),
            (names::BASE_PRICE, RawValue::Decimal(Decimal::from(1000))),
            (names::QUANTITY, RawValue::Integer(4)),
        ]);
        let quote = raw(&[
            (names::BASE_CURRENCY, RawValue::Text("USD".to_string())),
            (names::FOREX_RATE, RawValue::Decimal(Decimal::ONE)),
            (names::DELIVERY_DAYS, RawValue::Integer(45)),
            (names::ADVANCE_PAYMENT_INITIAL_PCT, RawValue::Decimal(Decimal::from(100))),
            (names::ADVANCE_PAYMENT_INTERIM_PCT, RawValue::Decimal(Decimal::ZERO)),
            (names::ADVANCE_PAYMENT_FINAL_PCT, RawValue::Decimal(Decimal::ZERO)),
        ]);
        let resolved =
            resolve_line(&product, &quote, &VariableMap::new(), VariableCatalog::global())
                .expect("resolution");

        let input = CalculationInput::bind(&resolved).expect("bind");
        assert_eq!(input.identity.sku, "PUMP-100");
        assert_eq!(input.identity.quantity, 4);
        assert_eq!(input.pricing.base_currency, Currency::Usd);
        assert_eq!(input.settings.markup_pct, Decimal::from(25));
        assert_eq!(input.settings.price_scale, 2);
    }

    #[test]
    fn bind_reports_missing_required_variables_instead_of_panicking() {
        let resolved = resolve_line(
            &VariableMap::new(),
            &VariableMap::new(),
            &VariableMap::new(),
            VariableCatalog::global(),
        )
        .expect("resolution");
        assert!(CalculationInput::bind(&resolved).is_err());
    }
}
