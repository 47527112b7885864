//! ceiguard-analyzer - CEI-ordering violation detection
//!
//! Detects Checks-Effects-Interactions violations in contract methods:
//! any execution path where a cross-contract interaction runs before the
//! storage effect it is paired with has been committed, opening a
//! reentrancy window. Methods arrive as `ceiguard_ir` statement trees
//! with resolved call targets; results leave as a deterministic
//! [`AnalysisReport`].
//!
//! The pipeline per function: the tagger classifies operations against a
//! caller-supplied table, the CFG builder lowers the statement tree into
//! an indexed block arena with tagged back-edges, and the ordering
//! analyzer walks the graph for interaction-before-effect pairings.
//! Functions are analyzed independently, optionally in parallel, and one
//! malformed function never aborts the run.

pub mod analysis;
pub mod cfg;
pub mod core;
pub mod report;
pub mod runner;
pub mod tagger;

pub use crate::analysis::OrderingAnalyzer;
pub use crate::cfg::{build_cfg, BasicBlock, BlockId, ControlFlowEdge, ControlFlowGraph, EdgeKind};
pub use crate::core::{
    Advisory, AnalysisError, AnalyzerConfig, Confidence, Finding, FunctionAnalysis, Severity,
    ViolationKind,
};
pub use crate::report::{AnalysisReport, DeduplicationStats, ViolationReporter};
pub use crate::runner::AnalysisEngine;
pub use crate::tagger::{tag_function, ClassificationTable, TargetClass};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
