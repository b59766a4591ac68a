pub mod domain;
pub mod errors;
pub mod pricing;

pub use domain::currency::{Currency, UnknownCurrency};
pub use domain::quote::{QuoteId, RawVariableSet};
pub use domain::variable::{
    names, RawValue, ResolvedValue, ValueKind, VariableMap, VariableScope,
};
pub use errors::{CalculationError, LineError};
pub use pricing::assemble::{CalculationOutput, LineOutcome, QuoteTotals};
pub use pricing::catalog::{VariableCatalog, VariableDescriptor};
pub use pricing::inputs::CalculationInput;
pub use pricing::pipeline::{
    LineCalculation, PhaseResult, PhaseStage, PipelineError, PipelineFault,
};
pub use pricing::resolve::{ResolutionError, ResolvedSet};
pub use pricing::validate::ValidationError;
pub use pricing::{
    calculate_quote, check_quote, CalculationEngine, CalculationRequest,
    DeterministicCalculationEngine, QuoteCheck,
};
