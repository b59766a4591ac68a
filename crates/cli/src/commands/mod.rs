pub mod calculate;
pub mod catalog;
pub mod check;

use std::path::Path;

use chrono::Utc;
use serde::Serialize;

use quotecalc_core::CalculationRequest;

#[derive(Debug, Clone)]
pub struct CommandResult {
    pub exit_code: u8,
    pub output: String,
}

#[derive(Debug, Serialize)]
struct CommandOutcome {
    command: String,
    status: String,
    error_class: Option<String>,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<serde_json::Value>,
}

impl CommandResult {
    pub fn success(command: &str, message: impl Into<String>) -> Self {
        Self::success_with_data(command, message, None)
    }

    pub fn success_with_data(
        command: &str,
        message: impl Into<String>,
        data: Option<serde_json::Value>,
    ) -> Self {
        let payload = CommandOutcome {
            command: command.to_string(),
            status: "ok".to_string(),
            error_class: None,
            message: message.into(),
            data,
        };
        Self { exit_code: 0, output: serialize_payload(payload) }
    }

    pub fn failure(
        command: &str,
        error_class: &str,
        message: impl Into<String>,
        exit_code: u8,
    ) -> Self {
        let payload = CommandOutcome {
            command: command.to_string(),
            status: "error".to_string(),
            error_class: Some(error_class.to_string()),
            message: message.into(),
            data: None,
        };
        Self { exit_code, output: serialize_payload(payload) }
    }
}

fn serialize_payload(payload: CommandOutcome) -> String {
    serde_json::to_string(&payload).unwrap_or_else(|error| {
        format!(
            "{{\"command\":\"unknown\",\"status\":\"error\",\"error_class\":\"serialization\",\"message\":\"{}\"}}",
            error.to_string().replace('\\', "\\\\").replace('"', "\\\"")
        )
    })
}

/// Load a calculation request from disk, stamping `generated_at` when the
/// file leaves it out (the engine itself never reads a clock).
pub(crate) fn load_request(command: &str, path: &Path) -> Result<CalculationRequest, CommandResult> {
    let contents = std::fs::read_to_string(path).map_err(|error| {
        CommandResult::failure(
            command,
            "request_read",
            format!("could not read `{}`: {error}", path.display()),
            2,
        )
    })?;

    let mut request: CalculationRequest = serde_json::from_str(&contents).map_err(|error| {
        CommandResult::failure(
            command,
            "request_parse",
            format!("could not parse `{}`: {error}", path.display()),
            2,
        )
    })?;

    if request.generated_at.is_none() {
        request.generated_at = Some(Utc::now());
    }
    Ok(request)
}
