use std::path::Path;

use quotecalc_core::{check_quote, CalculationError};

use super::{load_request, CommandResult};

pub fn run(input: &Path) -> CommandResult {
    let request = match load_request("check", input) {
        Ok(request) => request,
        Err(failure) => return failure,
    };

    match check_quote(&request) {
        Ok(check) if check.line_errors.is_empty() => CommandResult::success(
            "check",
            format!(
                "quote {} is valid ({} product line(s))",
                request.quote_id,
                request.variables.line_count()
            ),
        ),
        Ok(check) => {
            let listing: Vec<String> = check
                .line_errors
                .iter()
                .map(|(product_index, error)| format!("  - line {product_index}: {error}"))
                .collect();
            CommandResult::failure(
                "check",
                "line_resolution",
                format!("some product lines cannot be resolved:\n{}", listing.join("\n")),
                3,
            )
        }
        Err(CalculationError::Validation(errors)) => {
            let listing: Vec<String> =
                errors.iter().map(|error| format!("  - {error}")).collect();
            CommandResult::failure(
                "check",
                "validation",
                format!("validation found {} issue(s):\n{}", errors.len(), listing.join("\n")),
                3,
            )
        }
        Err(CalculationError::QuoteResolution(error)) => {
            CommandResult::failure("check", "quote_resolution", error.to_string(), 4)
        }
    }
}
