//! Packages per-line phase results and quote-level aggregates into the
//! calculation result contract the caller persists and renders.

use chrono::{DateTime, Utc};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::domain::currency::Currency;
use crate::domain::quote::QuoteId;
use crate::errors::LineError;
use crate::pricing::pipeline::LineCalculation;

/// Outcome of one product line: either a completed calculation or the error
/// that abandoned it. Failing lines never affect their siblings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "outcome")]
pub enum LineOutcome {
    Calculated(LineCalculation),
    Failed { product_index: usize, error: LineError },
}

impl LineOutcome {
    pub fn calculation(&self) -> Option<&LineCalculation> {
        match self {
            Self::Calculated(line) => Some(line),
            Self::Failed { .. } => None,
        }
    }

    pub fn product_index(&self) -> usize {
        match self {
            Self::Calculated(line) => line.product_index,
            Self::Failed { product_index, .. } => *product_index,
        }
    }
}

/// Quote-level aggregates over the completed lines, rounded to the
/// presentation scale. A quote with zero completed lines has zero totals;
/// that is a legitimate state mid-edit, not an error.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuoteTotals {
    pub total_cost: Decimal,
    pub total_before_vat: Decimal,
    pub total_vat: Decimal,
    pub total_final: Decimal,
    pub total_profit: Decimal,
    pub weighted_margin_pct: Decimal,
    pub completed_lines: usize,
    pub failed_lines: usize,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CalculationOutput {
    pub quote_id: QuoteId,
    pub generated_at: Option<DateTime<Utc>>,
    pub currency: Currency,
    pub price_scale: u32,
    pub lines: Vec<LineOutcome>,
    pub totals: QuoteTotals,
}

fn present(value: Decimal, scale: u32) -> Decimal {
    let mut rounded = value.round_dp_with_strategy(scale, RoundingStrategy::MidpointAwayFromZero);
    // pad to exactly `scale` so presentation figures read as money
    rounded.rescale(scale);
    rounded
}

/// Fold line outcomes into the final contract. Pure aggregation: sums over
/// completed lines, margin weighted by line revenue. Presentation rounding
/// applies to the totals only; phase results stay exact.
pub fn assemble(
    quote_id: QuoteId,
    generated_at: Option<DateTime<Utc>>,
    currency: Currency,
    price_scale: u32,
    lines: Vec<LineOutcome>,
) -> CalculationOutput {
    let mut total_cost = Decimal::ZERO;
    let mut total_before_vat = Decimal::ZERO;
    let mut total_vat = Decimal::ZERO;
    let mut total_final = Decimal::ZERO;
    let mut total_profit = Decimal::ZERO;
    let mut completed_lines = 0usize;

    for line in lines.iter().filter_map(LineOutcome::calculation) {
        total_cost += line.line_cost;
        total_before_vat += line.line_before_vat;
        total_vat += line.line_vat;
        total_final += line.line_total;
        total_profit += line.line_profit;
        completed_lines += 1;
    }

    let weighted_margin_pct = if total_final == Decimal::ZERO {
        Decimal::ZERO
    } else {
        (total_final - total_cost) / total_final * Decimal::ONE_HUNDRED
    };

    let failed_lines = lines.len() - completed_lines;
    let totals = QuoteTotals {
        total_cost: present(total_cost, price_scale),
        total_before_vat: present(total_before_vat, price_scale),
        total_vat: present(total_vat, price_scale),
        total_final: present(total_final, price_scale),
        total_profit: present(total_profit, price_scale),
        weighted_margin_pct: present(weighted_margin_pct, 2),
        completed_lines,
        failed_lines,
    };

    CalculationOutput { quote_id, generated_at, currency, price_scale, lines, totals }
}
