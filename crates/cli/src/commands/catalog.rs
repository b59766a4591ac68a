use quotecalc_core::{VariableCatalog, VariableScope};

use super::CommandResult;

pub fn run(scope: Option<&str>) -> CommandResult {
    let scope_filter = match scope {
        Some(value) => match parse_scope(value) {
            Some(scope) => Some(scope),
            None => {
                return CommandResult::failure(
                    "catalog",
                    "bad_scope",
                    format!(
                        "unknown scope `{value}` (expected product_only|quote_only|both|admin_only)"
                    ),
                    2,
                );
            }
        },
        None => None,
    };

    let catalog = VariableCatalog::global();
    let mut lines = Vec::new();
    for descriptor in catalog.iter() {
        if scope_filter.is_some_and(|scope| descriptor.scope != scope) {
            continue;
        }
        let requirement = if descriptor.required { "required" } else { "optional" };
        lines.push(format!(
            "  {:<30} {:<12} {:<10} {:<8}  {}",
            descriptor.name,
            descriptor.scope.as_str(),
            descriptor.kind.as_str(),
            requirement,
            descriptor.label
        ));
    }

    let header = match scope_filter {
        Some(scope) => format!("{} variable(s) in scope {}", lines.len(), scope.as_str()),
        None => format!("{} variable(s) in the catalog", lines.len()),
    };
    CommandResult::success("catalog", format!("{header}\n{}", lines.join("\n")))
}

fn parse_scope(value: &str) -> Option<VariableScope> {
    match value.trim().to_ascii_lowercase().as_str() {
        "product_only" => Some(VariableScope::ProductOnly),
        "quote_only" => Some(VariableScope::QuoteOnly),
        "both" => Some(VariableScope::Both),
        "admin_only" => Some(VariableScope::AdminOnly),
        _ => None,
    }
}
