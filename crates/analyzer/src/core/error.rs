use ceiguard_ir::SourceLocation;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Malformed control flow in a single function.
///
/// Scoped to that function: the surrounding run collects the error and
/// keeps analyzing everything else.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(tag = "error", rename_all = "snake_case")]
pub enum AnalysisError {
    #[error("function '{function}': break at {location} has no enclosing loop")]
    BreakOutsideLoop {
        function: String,
        location: SourceLocation,
    },
}

impl AnalysisError {
    pub fn function_name(&self) -> &str {
        match self {
            Self::BreakOutsideLoop { function, .. } => function,
        }
    }
}
