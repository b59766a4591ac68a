//! The calculation engine: resolution, validation, the 13-stage pipeline,
//! and output assembly behind one deterministic façade.
//!
//! Data flows strictly forward (catalog → resolver → validator → pipeline →
//! assembler); each invocation is stateless and reads nothing but its own
//! request, so callers may run any number of calculations concurrently.

pub mod assemble;
pub mod catalog;
pub mod inputs;
pub mod pipeline;
pub mod resolve;
pub mod validate;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::currency::Currency;
use crate::domain::quote::{QuoteId, RawVariableSet};
use crate::domain::variable::names;
use crate::errors::{CalculationError, LineError};
use crate::pricing::assemble::{assemble, CalculationOutput, LineOutcome};
use crate::pricing::catalog::VariableCatalog;
use crate::pricing::inputs::CalculationInput;
use crate::pricing::pipeline::{run_line, QuoteContext};
use crate::pricing::resolve::{resolve_line, resolve_quote_level, ResolutionError, ResolvedSet};

/// One quote's worth of raw inputs, as fetched from storage by the caller.
/// `generated_at` is caller-supplied so the engine never reads a clock.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CalculationRequest {
    pub quote_id: QuoteId,
    #[serde(default)]
    pub generated_at: Option<DateTime<Utc>>,
    pub variables: RawVariableSet,
}

/// Resolution and validation outcome without running the pipeline; what the
/// platform surfaces while a quote is still being edited.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct QuoteCheck {
    /// Lines whose raw input could not be resolved (wrong types). These are
    /// excluded from validation and would be skipped by the pipeline.
    pub line_errors: Vec<(usize, ResolutionError)>,
}

pub trait CalculationEngine: Send + Sync {
    fn calculate(&self, request: &CalculationRequest) -> Result<CalculationOutput, CalculationError>;
}

#[derive(Default)]
pub struct DeterministicCalculationEngine;

impl CalculationEngine for DeterministicCalculationEngine {
    fn calculate(&self, request: &CalculationRequest) -> Result<CalculationOutput, CalculationError> {
        calculate_quote(request)
    }
}

struct ResolvedQuote {
    quote_view: ResolvedSet,
    resolved_lines: Vec<(usize, ResolvedSet)>,
    failed_lines: Vec<(usize, ResolutionError)>,
}

/// Resolve every scope view and run the validator. Shared by `check_quote`
/// and `calculate_quote` so both report identical findings.
fn resolve_and_validate(
    request: &CalculationRequest,
    catalog: &VariableCatalog,
) -> Result<ResolvedQuote, CalculationError> {
    let variables = &request.variables;
    let quote_view = resolve_quote_level(&variables.quote, &variables.admin, catalog)?;

    let mut resolved_lines = Vec::with_capacity(variables.products.len());
    let mut failed_lines = Vec::new();
    for (product_index, product_raw) in variables.products.iter().enumerate() {
        match resolve_line(product_raw, &variables.quote, &variables.admin, catalog) {
            Ok(resolved) => resolved_lines.push((product_index, resolved)),
            Err(error) => failed_lines.push((product_index, error)),
        }
    }

    let errors = validate::validate(&quote_view, &resolved_lines, catalog);
    if !errors.is_empty() {
        return Err(CalculationError::Validation(errors));
    }

    Ok(ResolvedQuote { quote_view, resolved_lines, failed_lines })
}

/// Resolve and validate without calculating.
pub fn check_quote(request: &CalculationRequest) -> Result<QuoteCheck, CalculationError> {
    let resolved = resolve_and_validate(request, VariableCatalog::global())?;
    Ok(QuoteCheck { line_errors: resolved.failed_lines })
}

/// Run the full calculation for one quote.
///
/// Validation issues refuse the whole calculation; a resolution or pipeline
/// failure on one line is recorded in that line's outcome while sibling
/// lines complete independently.
pub fn calculate_quote(
    request: &CalculationRequest,
) -> Result<CalculationOutput, CalculationError> {
    let catalog = VariableCatalog::global();
    let resolved = resolve_and_validate(request, catalog)?;

    let mut bound = Vec::with_capacity(resolved.resolved_lines.len());
    let mut outcomes: Vec<LineOutcome> = Vec::with_capacity(request.variables.products.len());
    for (product_index, error) in resolved.failed_lines {
        outcomes.push(LineOutcome::Failed { product_index, error: LineError::Resolution(error) });
    }
    for (product_index, resolved_line) in &resolved.resolved_lines {
        match CalculationInput::bind(resolved_line) {
            Ok(input) => bound.push((*product_index, input)),
            Err(error) => outcomes.push(LineOutcome::Failed {
                product_index: *product_index,
                error: LineError::Resolution(error),
            }),
        }
    }

    // Divisor for distributing quote-level fixed fees across the quote.
    let total_units: i64 = bound.iter().map(|(_, input)| input.identity.quantity).sum();
    let context = QuoteContext { total_units: Decimal::from(total_units) };

    for (product_index, input) in &bound {
        match run_line(input, *product_index, &context) {
            Ok(line) => outcomes.push(LineOutcome::Calculated(line)),
            Err(error) => outcomes.push(LineOutcome::Failed {
                product_index: *product_index,
                error: LineError::Pipeline(error),
            }),
        }
    }
    outcomes.sort_by_key(LineOutcome::product_index);

    let currency = quote_currency(&resolved.quote_view);
    let price_scale = resolved
        .quote_view
        .integer(names::PRICE_SCALE)
        .and_then(|value| u32::try_from(value).ok())
        .unwrap_or(2);

    Ok(assemble(request.quote_id.clone(), request.generated_at, currency, price_scale, outcomes))
}

fn quote_currency(quote_view: &ResolvedSet) -> Currency {
    // base_currency passed validation, so the parse cannot fail in a
    // validated flow; USD is the documented fallback for defensive reads.
    quote_view
        .text(names::BASE_CURRENCY)
        .and_then(|code| code.parse::<Currency>().ok())
        .unwrap_or(Currency::Usd)
}
