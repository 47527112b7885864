use crate::core::error::AnalysisError;
use crate::core::severity::{Confidence, Severity};
use ceiguard_ir::SourceLocation;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Which detection rule produced a finding.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "kebab-case")]
pub enum ViolationKind {
    /// The interaction reaches its paired effect along forward edges only.
    SequentialCei,
    /// Interaction and effect co-occur inside one loop body.
    LoopCei,
}

impl fmt::Display for ViolationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SequentialCei => write!(f, "sequential-cei"),
            Self::LoopCei => write!(f, "loop-cei"),
        }
    }
}

/// One detected CEI-ordering violation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Finding {
    pub function_name: String,
    pub kind: ViolationKind,
    pub interaction_location: SourceLocation,
    pub effect_location: SourceLocation,
    pub interaction_target: String,
    pub effect_slot: String,
    pub severity: Severity,
    pub confidence: Confidence,
    pub message: String,
}

impl Finding {
    pub fn dedup_key(&self) -> (String, SourceLocation, SourceLocation, ViolationKind) {
        (
            self.function_name.clone(),
            self.interaction_location,
            self.effect_location,
            self.kind,
        )
    }
}

/// A call target absent from the classification table.
///
/// Advisory, not an error: the operation is tagged `Neutral`, not assumed
/// safe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Advisory {
    pub function_name: String,
    pub location: SourceLocation,
    pub target_identifier: String,
}

/// Outcome of analyzing one function: the advisories gathered while
/// tagging, plus either the findings or the error that stopped the CFG
/// build.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionAnalysis {
    pub function_name: String,
    pub advisories: Vec<Advisory>,
    pub result: Result<Vec<Finding>, AnalysisError>,
}
