//! Semantic tagging of function bodies.
//!
//! Every operation is classified against a table supplied by the ABI
//! extractor: storage-write primitives become effects, calls into another
//! contract's ABI become interactions. Anything unlisted stays neutral and
//! is surfaced as an advisory rather than silently trusted.

use crate::core::Advisory;
use ceiguard_ir::{
    Function, Operation, OperationKind, RawOperation, RawStatement, Statement, TaggedFunction,
    TaggedStatement,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetClass {
    Effect,
    Interaction,
}

/// Read-only mapping from resolved target identifiers to their semantic
/// class. Built once by the surrounding tooling and shared by reference
/// across workers.
#[derive(Debug, Clone, Default)]
pub struct ClassificationTable {
    entries: HashMap<String, TargetClass>,
}

impl ClassificationTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_effect(mut self, target: impl Into<String>) -> Self {
        self.entries.insert(target.into(), TargetClass::Effect);
        self
    }

    pub fn with_interaction(mut self, target: impl Into<String>) -> Self {
        self.entries.insert(target.into(), TargetClass::Interaction);
        self
    }

    pub fn classify(&self, target: &str) -> Option<TargetClass> {
        self.entries.get(target).copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Annotate every operation in `function` with its semantic kind.
///
/// Pure transform: identical input always yields identical tagging.
pub fn tag_function(
    function: &Function,
    table: &ClassificationTable,
) -> (TaggedFunction, Vec<Advisory>) {
    let mut advisories = Vec::new();
    let statements = tag_sequence(&function.statements, &function.name, table, &mut advisories);

    (
        TaggedFunction {
            name: function.name.clone(),
            statements,
            storage: function.storage,
        },
        advisories,
    )
}

fn tag_sequence(
    statements: &[RawStatement],
    function_name: &str,
    table: &ClassificationTable,
    advisories: &mut Vec<Advisory>,
) -> Vec<TaggedStatement> {
    statements
        .iter()
        .map(|statement| match statement {
            Statement::Operation(op) => {
                Statement::Operation(tag_operation(op, function_name, table, advisories))
            }
            Statement::If {
                then_branch,
                else_branch,
            } => Statement::If {
                then_branch: tag_sequence(then_branch, function_name, table, advisories),
                else_branch: tag_sequence(else_branch, function_name, table, advisories),
            },
            Statement::While { body } => Statement::While {
                body: tag_sequence(body, function_name, table, advisories),
            },
            Statement::Loop { body } => Statement::Loop {
                body: tag_sequence(body, function_name, table, advisories),
            },
            Statement::Break { location } => Statement::Break {
                location: *location,
            },
        })
        .collect()
}

fn tag_operation(
    op: &RawOperation,
    function_name: &str,
    table: &ClassificationTable,
    advisories: &mut Vec<Advisory>,
) -> Operation {
    let kind = match table.classify(&op.target) {
        Some(TargetClass::Effect) => OperationKind::Effect {
            // The slot key when the front-end resolved one, else the
            // primitive identifier itself.
            slot: op.operand.clone().unwrap_or_else(|| op.target.clone()),
        },
        Some(TargetClass::Interaction) => OperationKind::Interaction {
            callee: op.target.clone(),
        },
        None => {
            advisories.push(Advisory {
                function_name: function_name.to_string(),
                location: op.location,
                target_identifier: op.target.clone(),
            });
            OperationKind::Neutral
        }
    };

    Operation {
        kind,
        target: op.target.clone(),
        location: op.location,
    }
}
