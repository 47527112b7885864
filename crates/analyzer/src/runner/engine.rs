//! Drives tag → build → order for each function.
//!
//! Functions are independent: each pass reads only its own immutable
//! input and writes a private accumulator, so the rayon path needs no
//! locking. A malformed function surfaces as an error in the report
//! without stopping the others.

use crate::analysis::OrderingAnalyzer;
use crate::cfg::build_cfg;
use crate::core::{AnalyzerConfig, FunctionAnalysis};
use crate::report::{AnalysisReport, ViolationReporter};
use crate::tagger::{tag_function, ClassificationTable};
use ceiguard_ir::Function;
use rayon::prelude::*;
use tracing::{debug, warn};

pub struct AnalysisEngine {
    table: ClassificationTable,
    config: AnalyzerConfig,
}

impl AnalysisEngine {
    pub fn new(table: ClassificationTable) -> Self {
        Self {
            table,
            config: AnalyzerConfig::default(),
        }
    }

    pub fn with_config(mut self, config: AnalyzerConfig) -> Self {
        self.config = config;
        self
    }

    pub fn run(&self, functions: &[Function]) -> AnalysisReport {
        let outcomes: Vec<FunctionAnalysis> = if self.config.parallel_execution {
            functions
                .par_iter()
                .map(|function| self.analyze_function(function))
                .collect()
        } else {
            functions
                .iter()
                .map(|function| self.analyze_function(function))
                .collect()
        };

        ViolationReporter::new(&self.config).assemble(outcomes)
    }

    pub fn analyze_function(&self, function: &Function) -> FunctionAnalysis {
        debug!(function = %function.name, "analyzing");
        let (tagged, advisories) = tag_function(function, &self.table);

        let result = build_cfg(&tagged).map(|graph| {
            if graph.unbounded_tail {
                debug!(
                    function = %function.name,
                    "loop with no reachable break; body still inspected once"
                );
            }
            OrderingAnalyzer::new(&graph, &self.config).analyze()
        });

        if let Err(ref error) = result {
            warn!(function = %function.name, %error, "skipping function with malformed control flow");
        }

        FunctionAnalysis {
            function_name: function.name.clone(),
            advisories,
            result,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ViolationKind;
    use ceiguard_ir::{RawOperation, SourceLocation, Statement};

    fn table() -> ClassificationTable {
        ClassificationTable::new()
            .with_effect("storage_store")
            .with_interaction("Vault.deposit")
    }

    fn vulnerable(name: &str) -> Function {
        Function::new(
            name,
            vec![
                Statement::Operation(RawOperation::new(
                    "Vault.deposit",
                    SourceLocation::new(1, 5),
                )),
                Statement::Operation(
                    RawOperation::new("storage_store", SourceLocation::new(2, 5))
                        .with_operand("balances"),
                ),
            ],
        )
    }

    fn malformed(name: &str) -> Function {
        Function::new(
            name,
            vec![Statement::Break {
                location: SourceLocation::new(1, 1),
            }],
        )
    }

    #[test]
    fn malformed_function_does_not_poison_the_run() {
        let engine = AnalysisEngine::new(table());
        let report = engine.run(&[malformed("broken"), vulnerable("withdraw")]);

        assert_eq!(report.errors.len(), 1);
        assert_eq!(report.errors[0].function_name(), "broken");
        assert_eq!(report.findings.len(), 1);
        assert_eq!(report.findings[0].function_name, "withdraw");
    }

    #[test]
    fn report_is_invariant_to_input_order() {
        let engine = AnalysisEngine::new(table());
        let forward = engine.run(&[vulnerable("a"), vulnerable("b"), malformed("c")]);
        let reversed = engine.run(&[malformed("c"), vulnerable("b"), vulnerable("a")]);

        assert_eq!(forward, reversed);
    }

    #[test]
    fn running_twice_yields_identical_reports() {
        let engine = AnalysisEngine::new(table());
        let functions = [vulnerable("a"), vulnerable("b")];

        let first = engine.run(&functions);
        let second = engine.run(&functions);

        assert_eq!(first, second);
        assert_eq!(first.to_json().unwrap(), second.to_json().unwrap());
    }

    #[test]
    fn parallel_and_sequential_runs_agree() {
        let functions: Vec<Function> = (0..16).map(|i| vulnerable(&format!("f{i}"))).collect();

        let parallel = AnalysisEngine::new(table()).run(&functions);
        let sequential = AnalysisEngine::new(table())
            .with_config(AnalyzerConfig {
                parallel_execution: false,
                ..AnalyzerConfig::default()
            })
            .run(&functions);

        assert_eq!(parallel, sequential);
    }

    #[test]
    fn empty_function_is_not_an_error() {
        let engine = AnalysisEngine::new(table());
        let report = engine.run(&[Function::new("noop", vec![])]);

        assert!(report.is_clean());
        assert!(report.advisories.is_empty());
    }

    #[test]
    fn sequential_violation_flows_through_the_engine() {
        let engine = AnalysisEngine::new(table());
        let report = engine.run(&[vulnerable("withdraw")]);

        assert_eq!(report.findings.len(), 1);
        assert_eq!(report.findings[0].kind, ViolationKind::SequentialCei);
    }
}
