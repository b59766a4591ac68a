//! The 13-stage numeric pipeline. Every stage is pure, consumes the prior
//! stage's output plus resolved variables, and records a `PhaseResult` for
//! audit and financial review.
//!
//! All arithmetic is fixed-point `Decimal` at full precision; rounding
//! happens only at presentation time in the assembler. The operation order
//! inside each stage is fixed (documented on the stage functions) so that
//! re-running the same inputs yields bit-identical phase results.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::pricing::inputs::CalculationInput;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PhaseStage {
    BasePriceConversion,
    PurchasePrice,
    LogisticsCosts,
    ImportDuties,
    WarehousingHandling,
    TotalImportCost,
    FinancingCosts,
    TotalCost,
    MarkupApplication,
    PriceBeforeVat,
    VatCalculation,
    FinalPrice,
    OutputGeneration,
}

impl PhaseStage {
    pub const ALL: [PhaseStage; 13] = [
        PhaseStage::BasePriceConversion,
        PhaseStage::PurchasePrice,
        PhaseStage::LogisticsCosts,
        PhaseStage::ImportDuties,
        PhaseStage::WarehousingHandling,
        PhaseStage::TotalImportCost,
        PhaseStage::FinancingCosts,
        PhaseStage::TotalCost,
        PhaseStage::MarkupApplication,
        PhaseStage::PriceBeforeVat,
        PhaseStage::VatCalculation,
        PhaseStage::FinalPrice,
        PhaseStage::OutputGeneration,
    ];

    /// One-based position in the pipeline.
    pub fn index(&self) -> u8 {
        Self::ALL.iter().position(|stage| stage == self).map(|position| position as u8 + 1)
            .unwrap_or(0)
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::BasePriceConversion => "Base price conversion",
            Self::PurchasePrice => "Purchase price",
            Self::LogisticsCosts => "Logistics costs",
            Self::ImportDuties => "Import duties",
            Self::WarehousingHandling => "Warehousing and handling",
            Self::TotalImportCost => "Total import cost",
            Self::FinancingCosts => "Financing costs",
            Self::TotalCost => "Total cost",
            Self::MarkupApplication => "Markup application",
            Self::PriceBeforeVat => "Price before VAT",
            Self::VatCalculation => "VAT calculation",
            Self::FinalPrice => "Final price",
            Self::OutputGeneration => "Output generation",
        }
    }
}

#[derive(Clone, Debug, Error, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "fault")]
pub enum PipelineFault {
    #[error("division by zero ({divisor})")]
    DivisionByZero { divisor: String },
    #[error("`{variable}` is outside its numeric domain: {value}")]
    NegativeDomain { variable: String, value: Decimal },
    #[error("rate `{variable}` must be positive, got {value}")]
    NonPositiveRate { variable: String, value: Decimal },
}

/// A numeric precondition violated mid-pipeline. Fatal for the product
/// line's calculation; sibling lines continue independently.
#[derive(Clone, Debug, Error, PartialEq, Eq, Serialize, Deserialize)]
#[error("pipeline stage {} `{}` failed: {fault}", .stage.index(), .stage.label())]
pub struct PipelineError {
    pub stage: PhaseStage,
    pub fault: PipelineFault,
}

/// Captured output of one stage: the stage's headline amount plus every
/// named intermediate figure, in deterministic order.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhaseResult {
    pub stage: PhaseStage,
    pub label: String,
    pub amount: Decimal,
    pub values: BTreeMap<String, Decimal>,
}

fn phase(stage: PhaseStage, amount: Decimal, values: &[(&str, Decimal)]) -> PhaseResult {
    PhaseResult {
        stage,
        label: stage.label().to_string(),
        amount,
        values: values.iter().map(|(name, value)| (name.to_string(), *value)).collect(),
    }
}

/// Quote-wide figures the per-line stages need.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuoteContext {
    /// Units across all lines participating in this calculation; the divisor
    /// for distributing quote-level fixed fees.
    pub total_units: Decimal,
}

/// A fully calculated product line: headline unit and line figures plus the
/// ordered phase results for stages 1..13.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineCalculation {
    pub product_index: usize,
    pub sku: String,
    pub brand: String,
    pub quantity: Decimal,
    pub unit_cost: Decimal,
    pub unit_price_before_vat: Decimal,
    pub unit_vat: Decimal,
    pub unit_price_final: Decimal,
    pub line_cost: Decimal,
    pub line_before_vat: Decimal,
    pub line_vat: Decimal,
    pub line_total: Decimal,
    pub line_profit: Decimal,
    pub margin_pct: Decimal,
    pub phases: Vec<PhaseResult>,
}

fn pct(value: Decimal) -> Decimal {
    value / Decimal::ONE_HUNDRED
}

fn fail(stage: PhaseStage, fault: PipelineFault) -> PipelineError {
    PipelineError { stage, fault }
}

/// Run stages 1..13 for one product line. Either every stage completes or
/// the line fails with the first violated precondition; there is no partial
/// success.
pub fn run_line(
    input: &CalculationInput,
    product_index: usize,
    context: &QuoteContext,
) -> Result<LineCalculation, PipelineError> {
    let mut phases = Vec::with_capacity(PhaseStage::ALL.len());

    let quantity = Decimal::from(input.identity.quantity);

    // Stage 1: converted = base_price * forex_rate * (1 + forex_risk/100).
    let stage = PhaseStage::BasePriceConversion;
    let base_price = input.pricing.base_price;
    let forex_rate = input.pricing.forex_rate;
    if forex_rate <= Decimal::ZERO {
        return Err(fail(
            stage,
            PipelineFault::NonPositiveRate { variable: "forex_rate".to_string(), value: forex_rate },
        ));
    }
    if base_price < Decimal::ZERO {
        return Err(fail(
            stage,
            PipelineFault::NegativeDomain { variable: "base_price".to_string(), value: base_price },
        ));
    }
    let converted = base_price * forex_rate * (Decimal::ONE + pct(input.pricing.forex_risk_pct));
    phases.push(phase(
        stage,
        converted,
        &[
            ("base_price", base_price),
            ("forex_rate", forex_rate),
            ("forex_risk_pct", input.pricing.forex_risk_pct),
            ("converted_unit_price", converted),
        ],
    ));

    // Stage 2: purchase = converted * (1 - supplier_discount/100).
    let stage = PhaseStage::PurchasePrice;
    let discount_pct = input.pricing.supplier_discount_pct;
    let purchase = converted * (Decimal::ONE - pct(discount_pct));
    phases.push(phase(
        stage,
        purchase,
        &[("supplier_discount_pct", discount_pct), ("purchase_unit_price", purchase)],
    ));

    // Stage 3: line freight = weight * rate_per_kg * (1 + surcharge/100) *
    // quantity, then distributed back per unit; insurance is a percentage of
    // the purchase price.
    let stage = PhaseStage::LogisticsCosts;
    if quantity <= Decimal::ZERO {
        return Err(fail(
            stage,
            PipelineFault::DivisionByZero { divisor: "quantity".to_string() },
        ));
    }
    let line_freight = input.logistics.weight_kg
        * input.logistics.freight_cost_per_kg
        * (Decimal::ONE + pct(input.logistics.freight_surcharge_pct))
        * quantity;
    let freight_per_unit = line_freight / quantity;
    let insurance_per_unit = purchase * pct(input.logistics.insurance_pct);
    let logistics = freight_per_unit
        + insurance_per_unit
        + input.logistics.local_delivery_cost_per_unit
        + input.logistics.packaging_cost_per_unit;
    phases.push(phase(
        stage,
        logistics,
        &[
            ("freight_per_unit", freight_per_unit),
            ("insurance_per_unit", insurance_per_unit),
            ("local_delivery_per_unit", input.logistics.local_delivery_cost_per_unit),
            ("packaging_per_unit", input.logistics.packaging_cost_per_unit),
            ("logistics_unit_cost", logistics),
        ],
    ));

    // Stage 4: customs duty and excise, both percentages of the purchase
    // price.
    let stage = PhaseStage::ImportDuties;
    let duty = purchase * pct(input.costs.customs_duty_pct);
    let excise = purchase * pct(input.costs.excise_pct);
    let duties = duty + excise;
    phases.push(phase(
        stage,
        duties,
        &[("customs_duty", duty), ("excise", excise), ("duties_unit_cost", duties)],
    ));

    // Stage 5: fixed and variable handling plus the line's per-unit share of
    // quote-level fees (clearance, certification, documents).
    let stage = PhaseStage::WarehousingHandling;
    if context.total_units <= Decimal::ZERO {
        return Err(fail(
            stage,
            PipelineFault::DivisionByZero { divisor: "total_units".to_string() },
        ));
    }
    let fee_pool =
        input.fees.customs_clearance_fee + input.fees.certification_cost + input.fees.document_fee;
    let fee_share_per_unit = fee_pool / context.total_units;
    let storage = input.costs.storage_rate_per_unit_day * Decimal::from(input.costs.storage_days);
    let warranty_reserve = purchase * pct(input.costs.warranty_reserve_pct);
    let handling = input.costs.handling_fee_per_unit
        + storage
        + warranty_reserve
        + input.costs.extra_cost_per_unit
        + fee_share_per_unit;
    phases.push(phase(
        stage,
        handling,
        &[
            ("handling_fee", input.costs.handling_fee_per_unit),
            ("storage", storage),
            ("warranty_reserve", warranty_reserve),
            ("extra_cost", input.costs.extra_cost_per_unit),
            ("quote_fee_share", fee_share_per_unit),
            ("handling_unit_cost", handling),
        ],
    ));

    // Stage 6: purchase + logistics + duties + handling.
    let stage = PhaseStage::TotalImportCost;
    let import_cost = purchase + logistics + duties + handling;
    phases.push(phase(stage, import_cost, &[("import_unit_cost", import_cost)]));

    // Stage 7: interest over the financing period (initial advance at order,
    // interim tranche financed for half the period, final tranche for the
    // full period, remainder through the deferral window), plus the financing
    // commission on the non-advanced share and payment transfer fees.
    let stage = PhaseStage::FinancingCosts;
    let remainder_pct = Decimal::ONE_HUNDRED
        - input.payment.advance_initial_pct
        - input.payment.advance_interim_pct
        - input.payment.advance_final_pct;
    if remainder_pct < Decimal::ZERO {
        return Err(fail(
            stage,
            PipelineFault::NegativeDomain {
                variable: "advance_remainder_pct".to_string(),
                value: remainder_pct,
            },
        ));
    }
    let financing_days = Decimal::from(
        input.payment.delivery_days
            + input.payment.payment_deferral_days
            + input.payment.financing_days_buffer,
    );
    let deferral_days = Decimal::from(input.payment.payment_deferral_days);
    let daily_rate = pct(input.payment.loan_interest_annual_pct) / Decimal::from(365);
    let weighted_days = pct(input.payment.advance_interim_pct) * financing_days
        / Decimal::from(2)
        + pct(input.payment.advance_final_pct) * financing_days
        + pct(remainder_pct) * (financing_days + deferral_days);
    let interest = import_cost * daily_rate * weighted_days;
    let commission = import_cost
        * pct(Decimal::ONE_HUNDRED - input.payment.advance_initial_pct)
        * pct(input.payment.financing_commission_pct);
    let payment_fees = purchase
        * pct(input.fees.bank_transfer_fee_pct + input.fees.currency_conversion_fee_pct);
    let financing = interest + commission + payment_fees;
    phases.push(phase(
        stage,
        financing,
        &[
            ("interest", interest),
            ("commission", commission),
            ("payment_fees", payment_fees),
            ("financing_unit_cost", financing),
        ],
    ));

    // Stage 8: cost of goods sold, per unit and for the line.
    let stage = PhaseStage::TotalCost;
    let unit_cost = import_cost + financing;
    let line_cost = unit_cost * quantity;
    phases.push(phase(stage, unit_cost, &[("unit_cost", unit_cost), ("line_cost", line_cost)]));

    // Stage 9: markup, then agent commission, both multiplicative on cost.
    let stage = PhaseStage::MarkupApplication;
    let marked_up = unit_cost
        * (Decimal::ONE + pct(input.settings.markup_pct))
        * (Decimal::ONE + pct(input.fees.agent_commission_pct));
    phases.push(phase(
        stage,
        marked_up,
        &[("markup_pct", input.settings.markup_pct), ("marked_up_unit_price", marked_up)],
    ));

    // Stage 10: customer discount applied to the marked-up price. Kept as a
    // distinct stage boundary for audit granularity; equals stage 9 when the
    // discount is zero.
    let stage = PhaseStage::PriceBeforeVat;
    let before_vat = marked_up * (Decimal::ONE - pct(input.settings.customer_discount_pct));
    phases.push(phase(
        stage,
        before_vat,
        &[
            ("customer_discount_pct", input.settings.customer_discount_pct),
            ("unit_price_before_vat", before_vat),
        ],
    ));

    // Stage 11: VAT amount.
    let stage = PhaseStage::VatCalculation;
    let vat = before_vat * pct(input.settings.vat_pct);
    phases.push(phase(stage, vat, &[("vat_pct", input.settings.vat_pct), ("vat_unit", vat)]));

    // Stage 12: final unit price and the line totals.
    let stage = PhaseStage::FinalPrice;
    let final_price = before_vat + vat;
    let line_before_vat = before_vat * quantity;
    let line_vat = vat * quantity;
    let line_total = final_price * quantity;
    phases.push(phase(
        stage,
        final_price,
        &[
            ("unit_price_final", final_price),
            ("line_before_vat", line_before_vat),
            ("line_vat", line_vat),
            ("line_total", line_total),
        ],
    ));

    // Stage 13: the line's contribution to the quote aggregate. Margin is
    // (final - cost) / final, zero when the final price is zero.
    let stage = PhaseStage::OutputGeneration;
    let line_profit = (before_vat - unit_cost) * quantity;
    let margin_pct = if final_price == Decimal::ZERO {
        Decimal::ZERO
    } else {
        (final_price - unit_cost) / final_price * Decimal::ONE_HUNDRED
    };
    phases.push(phase(
        stage,
        line_total,
        &[
            ("line_revenue", line_total),
            ("line_cost", line_cost),
            ("line_profit", line_profit),
            ("margin_pct", margin_pct),
        ],
    ));

    Ok(LineCalculation {
        product_index,
        sku: input.identity.sku.clone(),
        brand: input.identity.brand.clone(),
        quantity,
        unit_cost,
        unit_price_before_vat: before_vat,
        unit_vat: vat,
        unit_price_final: final_price,
        line_cost,
        line_before_vat,
        line_vat,
        line_total,
        line_profit,
        margin_pct,
        phases,
    })
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use crate::domain::currency::Currency;
    use crate::pricing::inputs::{
        CalculationInput, CostInputs, FeeInputs, IdentityInputs, LogisticsInputs, PaymentInputs,
        PricingInputs, SettingsInputs,
    };

    use super::{run_line, PhaseStage, PipelineFault, QuoteContext};

    // The end-to-end scenario from the financial review fixtures: base 1000,
    // no conversion, 10% discount, 50 logistics, 5% duty, 20 handling,
    // no financing, 20% markup, 20% VAT.
    fn fixture_input() -> CalculationInput {
        CalculationInput {
            identity: IdentityInputs {
                sku: "PUMP-100".to_string(),
                brand: "Grundfos".to_string(),
                quantity: 1,
                customer_category: "standard".to_string(),
            },
            pricing: PricingInputs {
                base_price: Decimal::from(1000),
                base_currency: Currency::Usd,
                purchase_currency: Currency::Usd,
                forex_rate: Decimal::ONE,
                supplier_discount_pct: Decimal::from(10),
                forex_risk_pct: Decimal::ZERO,
            },
            payment: PaymentInputs {
                advance_initial_pct: Decimal::ONE_HUNDRED,
                advance_interim_pct: Decimal::ZERO,
                advance_final_pct: Decimal::ZERO,
                payment_deferral_days: 0,
                delivery_days: 30,
                financing_days_buffer: 0,
                loan_interest_annual_pct: Decimal::from(12),
                financing_commission_pct: Decimal::from(1),
            },
            logistics: LogisticsInputs {
                weight_kg: Decimal::ZERO,
                freight_cost_per_kg: Decimal::ZERO,
                freight_surcharge_pct: Decimal::ZERO,
                insurance_pct: Decimal::ZERO,
                local_delivery_cost_per_unit: Decimal::from(50),
                packaging_cost_per_unit: Decimal::ZERO,
            },
            fees: FeeInputs {
                customs_clearance_fee: Decimal::ZERO,
                certification_cost: Decimal::ZERO,
                document_fee: Decimal::ZERO,
                bank_transfer_fee_pct: Decimal::ZERO,
                currency_conversion_fee_pct: Decimal::ZERO,
                agent_commission_pct: Decimal::ZERO,
            },
            costs: CostInputs {
                customs_duty_pct: Decimal::from(5),
                excise_pct: Decimal::ZERO,
                handling_fee_per_unit: Decimal::from(20),
                storage_rate_per_unit_day: Decimal::ZERO,
                storage_days: 0,
                warranty_reserve_pct: Decimal::ZERO,
                extra_cost_per_unit: Decimal::ZERO,
            },
            settings: SettingsInputs {
                markup_pct: Decimal::from(20),
                customer_discount_pct: Decimal::ZERO,
                vat_pct: Decimal::from(20),
                quote_validity_days: 30,
                price_scale: 2,
            },
        }
    }

    fn context() -> QuoteContext {
        QuoteContext { total_units: Decimal::ONE }
    }

    #[test]
    fn round_trip_scenario_matches_the_reference_figures() {
        let line = run_line(&fixture_input(), 0, &context()).expect("pipeline");

        let amounts: Vec<Decimal> = line.phases.iter().map(|phase| phase.amount).collect();
        assert_eq!(
            amounts,
            vec![
                Decimal::from(1000),           // converted
                Decimal::from(900),            // purchase after 10% discount
                Decimal::from(50),             // logistics
                Decimal::from(45),             // 5% duty on 900
                Decimal::from(20),             // handling
                Decimal::from(1015),           // total import cost
                Decimal::ZERO,                 // fully pre-paid, no financing
                Decimal::from(1015),           // COGS
                Decimal::from(1218),           // 20% markup
                Decimal::from(1218),           // before VAT
                Decimal::new(2436, 1),         // VAT 243.6
                Decimal::new(14616, 1),        // final 1461.6
                Decimal::new(14616, 1),        // line revenue, quantity 1
            ]
        );
        assert_eq!(line.unit_cost, Decimal::from(1015));
        assert_eq!(line.unit_price_final, Decimal::new(14616, 1));
        assert_eq!(line.line_profit, Decimal::from(203));
    }

    #[test]
    fn phase_results_arrive_in_stage_order() {
        let line = run_line(&fixture_input(), 0, &context()).expect("pipeline");
        let stages: Vec<_> = line.phases.iter().map(|phase| phase.stage).collect();
        assert_eq!(stages, PhaseStage::ALL.to_vec());
        for (position, phase) in line.phases.iter().enumerate() {
            assert_eq!(phase.stage.index() as usize, position + 1);
        }
    }

    #[test]
    fn identical_inputs_yield_identical_phase_results() {
        let first = run_line(&fixture_input(), 0, &context()).expect("pipeline");
        let second = run_line(&fixture_input(), 0, &context()).expect("pipeline");
        assert_eq!(first, second);
    }

    #[test]
    fn zero_quantity_that_slipped_past_validation_fails_the_line() {
        let mut input = fixture_input();
        input.identity.quantity = 0;
        let error = run_line(&input, 0, &context()).expect_err("division guard");
        assert_eq!(error.stage, PhaseStage::LogisticsCosts);
        assert!(matches!(error.fault, PipelineFault::DivisionByZero { ref divisor } if divisor == "quantity"));
    }

    #[test]
    fn non_positive_forex_rate_fails_the_line() {
        let mut input = fixture_input();
        input.pricing.forex_rate = Decimal::ZERO;
        let error = run_line(&input, 0, &context()).expect_err("rate guard");
        assert_eq!(error.stage, PhaseStage::BasePriceConversion);
        assert!(matches!(error.fault, PipelineFault::NonPositiveRate { .. }));
    }

    #[test]
    fn advance_overflow_that_slipped_past_validation_fails_financing() {
        let mut input = fixture_input();
        input.payment.advance_initial_pct = Decimal::from(80);
        input.payment.advance_interim_pct = Decimal::from(30);
        let error = run_line(&input, 0, &context()).expect_err("remainder guard");
        assert_eq!(error.stage, PhaseStage::FinancingCosts);
        assert!(matches!(error.fault, PipelineFault::NegativeDomain { .. }));
    }

    #[test]
    fn financing_accrues_interest_commission_and_payment_fees() {
        let mut input = fixture_input();
        // 30% at order, 20% mid-delivery, 40% on delivery, 10% deferred.
        input.payment.advance_initial_pct = Decimal::from(30);
        input.payment.advance_interim_pct = Decimal::from(20);
        input.payment.advance_final_pct = Decimal::from(40);
        input.payment.payment_deferral_days = 10;
        input.fees.bank_transfer_fee_pct = Decimal::ONE;

        let line = run_line(&input, 0, &context()).expect("pipeline");
        let financing = &line.phases[6];
        assert_eq!(financing.stage, PhaseStage::FinancingCosts);

        // days = 40; weighted = 0.2*20 + 0.4*40 + 0.1*50 = 25 days at
        // 12%/365 daily on 1015, commission 1% on the 70% non-advanced
        // share, bank fee 1% of 900.
        let daily = Decimal::new(12, 0) / Decimal::ONE_HUNDRED / Decimal::from(365);
        let expected_interest = Decimal::from(1015) * daily * Decimal::from(25);
        assert_eq!(financing.values["interest"], expected_interest);
        assert_eq!(
            financing.values["commission"],
            Decimal::from(1015) * Decimal::new(70, 2) * Decimal::new(1, 2)
        );
        assert_eq!(financing.values["payment_fees"], Decimal::from(900) * Decimal::new(1, 2));
        assert!(line.unit_cost > Decimal::from(1015));
    }

    #[test]
    fn customer_discount_separates_stage_ten_from_stage_nine() {
        let mut input = fixture_input();
        input.settings.customer_discount_pct = Decimal::from(5);
        let line = run_line(&input, 0, &context()).expect("pipeline");
        let marked_up = line.phases[8].amount;
        let before_vat = line.phases[9].amount;
        assert_eq!(before_vat, marked_up * Decimal::new(95, 2));
        assert!(before_vat < marked_up);
    }
}
