use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::pricing::pipeline::PipelineError;
use crate::pricing::resolve::ResolutionError;
use crate::pricing::validate::ValidationError;

/// Why a single product line's calculation was abandoned. Sibling lines are
/// unaffected.
#[derive(Clone, Debug, Error, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "detail")]
pub enum LineError {
    #[error(transparent)]
    Resolution(#[from] ResolutionError),
    #[error(transparent)]
    Pipeline(#[from] PipelineError),
}

/// Why a whole calculation was refused before any pipeline stage ran.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum CalculationError {
    #[error("quote-level variable resolution failed: {0}")]
    QuoteResolution(#[from] ResolutionError),
    #[error("validation rejected the quote with {} issue(s)", .0.len())]
    Validation(Vec<ValidationError>),
}

impl CalculationError {
    pub fn validation_errors(&self) -> &[ValidationError] {
        match self {
            Self::Validation(errors) => errors,
            Self::QuoteResolution(_) => &[],
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::domain::variable::VariableScope;
    use crate::pricing::validate::ValidationError;

    use super::CalculationError;

    #[test]
    fn validation_error_reports_issue_count() {
        let error = CalculationError::Validation(vec![
            ValidationError::MissingVariable {
                scope: VariableScope::QuoteOnly,
                name: "forex_rate".to_string(),
                product_index: None,
            },
            ValidationError::InvalidDeliveryDays { value: 0 },
        ]);
        assert_eq!(error.to_string(), "validation rejected the quote with 2 issue(s)");
        assert_eq!(error.validation_errors().len(), 2);
    }
}
