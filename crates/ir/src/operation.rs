use crate::location::SourceLocation;
use serde::{Deserialize, Serialize};

/// One call or primitive action as delivered by the front-end, before
/// semantic tagging.
///
/// `target` is the resolved callee identifier (a storage primitive name or
/// another contract's ABI method). `operand` carries the storage slot key
/// when the front-end resolved one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawOperation {
    pub target: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operand: Option<String>,
    pub location: SourceLocation,
}

impl RawOperation {
    pub fn new(target: impl Into<String>, location: SourceLocation) -> Self {
        Self {
            target: target.into(),
            operand: None,
            location,
        }
    }

    pub fn with_operand(mut self, operand: impl Into<String>) -> Self {
        self.operand = Some(operand.into());
        self
    }
}

/// Semantic classification of an operation, carrying kind-specific payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum OperationKind {
    /// Durable mutation of contract-owned state.
    Effect { slot: String },
    /// Control transfer to external, untrusted code.
    Interaction { callee: String },
    Neutral,
}

/// A tagged operation inside a function body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Operation {
    pub kind: OperationKind,
    pub target: String,
    pub location: SourceLocation,
}

impl Operation {
    pub fn is_effect(&self) -> bool {
        matches!(self.kind, OperationKind::Effect { .. })
    }

    pub fn is_interaction(&self) -> bool {
        matches!(self.kind, OperationKind::Interaction { .. })
    }
}
