//! Result and configuration types shared by every analysis stage.

pub mod config;
pub mod error;
pub mod finding;
pub mod severity;

pub use config::AnalyzerConfig;
pub use error::AnalysisError;
pub use finding::{Advisory, Finding, FunctionAnalysis, ViolationKind};
pub use severity::{Confidence, Severity};
