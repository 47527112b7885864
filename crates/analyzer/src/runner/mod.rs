//! Per-function analysis driver.

pub mod engine;

pub use engine::AnalysisEngine;
