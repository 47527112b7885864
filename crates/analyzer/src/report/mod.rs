//! Deterministic assembly of per-function outcomes into one report.

use crate::core::{Advisory, AnalysisError, AnalyzerConfig, Finding, FunctionAnalysis};
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// How many raw findings collapsed into one during deduplication.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeduplicationStats {
    pub original_count: usize,
    pub deduped_count: usize,
    pub removed_count: usize,
}

/// The complete outcome of one analysis run: findings, advisories for
/// unclassified call targets, and per-function errors. Nothing is
/// silently dropped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub findings: Vec<Finding>,
    pub advisories: Vec<Advisory>,
    pub errors: Vec<AnalysisError>,
    pub dedup_stats: DeduplicationStats,
}

impl AnalysisReport {
    pub fn is_clean(&self) -> bool {
        self.findings.is_empty() && self.errors.is_empty()
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

pub struct ViolationReporter<'a> {
    config: &'a AnalyzerConfig,
}

impl<'a> ViolationReporter<'a> {
    pub fn new(config: &'a AnalyzerConfig) -> Self {
        Self { config }
    }

    /// Pure transform: sort, dedup, and surface every advisory and error.
    pub fn assemble(&self, outcomes: Vec<FunctionAnalysis>) -> AnalysisReport {
        let mut findings = Vec::new();
        let mut advisories = Vec::new();
        let mut errors = Vec::new();

        for outcome in outcomes {
            advisories.extend(outcome.advisories);
            match outcome.result {
                Ok(found) => findings.extend(found),
                Err(error) => errors.push(error),
            }
        }

        findings.sort_by(|a, b| {
            (
                a.function_name.as_str(),
                a.interaction_location,
                a.effect_location,
                a.kind,
            )
                .cmp(&(
                    b.function_name.as_str(),
                    b.interaction_location,
                    b.effect_location,
                    b.kind,
                ))
        });

        let original_count = findings.len();
        if self.config.deduplication_enabled {
            let mut seen = BTreeSet::new();
            findings.retain(|finding| seen.insert(finding.dedup_key()));
        }
        let deduped_count = findings.len();

        advisories.sort_by(|a, b| {
            (
                a.function_name.as_str(),
                a.location,
                a.target_identifier.as_str(),
            )
                .cmp(&(
                    b.function_name.as_str(),
                    b.location,
                    b.target_identifier.as_str(),
                ))
        });
        errors.sort_by(|a, b| a.function_name().cmp(b.function_name()));

        AnalysisReport {
            findings,
            advisories,
            errors,
            dedup_stats: DeduplicationStats {
                original_count,
                deduped_count,
                removed_count: original_count - deduped_count,
            },
        }
    }
}
