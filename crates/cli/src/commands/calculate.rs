use std::path::Path;

use quotecalc_core::{
    calculate_quote, CalculationError, CalculationOutput, LineOutcome,
};
use uuid::Uuid;

use super::{load_request, CommandResult};

pub fn run(input: &Path, pretty: bool) -> CommandResult {
    let request = match load_request("calculate", input) {
        Ok(request) => request,
        Err(failure) => return failure,
    };

    let correlation_id = Uuid::new_v4().to_string();
    tracing::info!(
        event_name = "cli.calculate.start",
        correlation_id = %correlation_id,
        quote_id = %request.quote_id,
        line_count = request.variables.line_count(),
        "running quote calculation"
    );

    match calculate_quote(&request) {
        Ok(output) => {
            tracing::info!(
                event_name = "cli.calculate.completed",
                correlation_id = %correlation_id,
                quote_id = %request.quote_id,
                completed_lines = output.totals.completed_lines,
                failed_lines = output.totals.failed_lines,
                "quote calculation completed"
            );
            if pretty {
                CommandResult::success("calculate", render_summary(&output))
            } else {
                match serde_json::to_value(&output) {
                    Ok(data) => CommandResult::success_with_data(
                        "calculate",
                        "quote calculation completed",
                        Some(data),
                    ),
                    Err(error) => CommandResult::failure(
                        "calculate",
                        "serialization",
                        error.to_string(),
                        5,
                    ),
                }
            }
        }
        Err(CalculationError::Validation(errors)) => {
            tracing::warn!(
                event_name = "cli.calculate.rejected",
                correlation_id = %correlation_id,
                quote_id = %request.quote_id,
                issue_count = errors.len(),
                "quote calculation rejected by validation"
            );
            let listing: Vec<String> =
                errors.iter().map(|error| format!("  - {error}")).collect();
            CommandResult::failure(
                "calculate",
                "validation",
                format!("validation rejected the quote:\n{}", listing.join("\n")),
                3,
            )
        }
        Err(CalculationError::QuoteResolution(error)) => CommandResult::failure(
            "calculate",
            "quote_resolution",
            error.to_string(),
            4,
        ),
    }
}

fn render_summary(output: &CalculationOutput) -> String {
    let mut lines = Vec::new();
    lines.push(format!(
        "Quote {} ({}) - {} line(s), {} failed",
        output.quote_id,
        output.currency,
        output.totals.completed_lines,
        output.totals.failed_lines
    ));

    for outcome in &output.lines {
        match outcome {
            LineOutcome::Calculated(line) => {
                lines.push(format!("  line {}: {} x{}", line.product_index, line.sku, line.quantity));
                for phase in &line.phases {
                    lines.push(format!(
                        "    {:>2}. {:<26} {}",
                        phase.stage.index(),
                        phase.label,
                        phase.amount
                    ));
                }
            }
            LineOutcome::Failed { product_index, error } => {
                lines.push(format!("  line {product_index}: FAILED - {error}"));
            }
        }
    }

    lines.push(format!(
        "  totals: cost {}  before VAT {}  VAT {}  final {}  margin {}%",
        output.totals.total_cost,
        output.totals.total_before_vat,
        output.totals.total_vat,
        output.totals.total_final,
        output.totals.weighted_margin_pct
    ));
    lines.join("\n")
}
