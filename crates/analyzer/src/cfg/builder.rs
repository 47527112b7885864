//! Structured lowering of statement trees into basic blocks.
//!
//! The tree is split at every branch, merge, and loop boundary. Loop
//! constructs produce a header block, a body block set, and a tagged
//! back-edge from the last body block to the header; conditionals produce
//! two forward edges that reconverge at the statement after the
//! conditional.

use crate::cfg::block::{BasicBlock, BlockId, ControlFlowGraph, EdgeKind};
use crate::core::AnalysisError;
use ceiguard_ir::{Statement, TaggedFunction, TaggedStatement};
use tracing::debug;

struct LoopFrame {
    continuation: BlockId,
    saw_break: bool,
}

pub struct CfgBuilder {
    function_name: String,
    blocks: Vec<BasicBlock>,
    loop_stack: Vec<LoopFrame>,
    unbounded_tail: bool,
}

impl CfgBuilder {
    fn new(function_name: &str) -> Self {
        Self {
            function_name: function_name.to_string(),
            blocks: Vec::new(),
            loop_stack: Vec::new(),
            unbounded_tail: false,
        }
    }

    pub fn build(function: &TaggedFunction) -> Result<ControlFlowGraph, AnalysisError> {
        let mut builder = Self::new(&function.name);
        let entry = builder.new_block();
        builder.lower_sequence(&function.statements, entry)?;

        debug!(
            function = %function.name,
            blocks = builder.blocks.len(),
            unbounded_tail = builder.unbounded_tail,
            "built control flow graph"
        );

        Ok(ControlFlowGraph {
            function_name: builder.function_name,
            blocks: builder.blocks,
            entry,
            unbounded_tail: builder.unbounded_tail,
        })
    }

    fn new_block(&mut self) -> BlockId {
        let id = BlockId(self.blocks.len());
        self.blocks.push(BasicBlock::new(id));
        id
    }

    fn add_edge(&mut self, from: BlockId, to: BlockId, kind: EdgeKind) {
        self.blocks[from.0].successors.push((to, kind));
        self.blocks[to.0].predecessors.push(from);
    }

    fn lower_sequence(
        &mut self,
        statements: &[TaggedStatement],
        entry: BlockId,
    ) -> Result<BlockId, AnalysisError> {
        let mut current = entry;
        for statement in statements {
            current = self.lower_statement(statement, current)?;
        }
        Ok(current)
    }

    fn lower_statement(
        &mut self,
        statement: &TaggedStatement,
        current: BlockId,
    ) -> Result<BlockId, AnalysisError> {
        match statement {
            Statement::Operation(op) => {
                self.blocks[current.0].operations.push(op.clone());
                Ok(current)
            }
            Statement::If {
                then_branch,
                else_branch,
            } => {
                let then_entry = self.new_block();
                self.add_edge(current, then_entry, EdgeKind::Forward);
                let then_exit = self.lower_sequence(then_branch, then_entry)?;

                let else_exit = if else_branch.is_empty() {
                    None
                } else {
                    let else_entry = self.new_block();
                    self.add_edge(current, else_entry, EdgeKind::Forward);
                    Some(self.lower_sequence(else_branch, else_entry)?)
                };

                let join = self.new_block();
                self.add_edge(then_exit, join, EdgeKind::Forward);
                match else_exit {
                    Some(exit) => self.add_edge(exit, join, EdgeKind::Forward),
                    // The false edge of an else-less conditional goes
                    // straight to the reconvergence block.
                    None => self.add_edge(current, join, EdgeKind::Forward),
                }
                Ok(join)
            }
            Statement::While { body } => {
                let header = self.new_block();
                self.add_edge(current, header, EdgeKind::Forward);
                let continuation = self.new_block();

                let body_entry = self.new_block();
                self.add_edge(header, body_entry, EdgeKind::Forward);

                self.loop_stack.push(LoopFrame {
                    continuation,
                    saw_break: false,
                });
                let body_exit = self.lower_sequence(body, body_entry)?;
                self.loop_stack.pop();

                self.add_edge(body_exit, header, EdgeKind::BackEdge);
                // Condition-false exit.
                self.add_edge(header, continuation, EdgeKind::Forward);
                Ok(continuation)
            }
            Statement::Loop { body } => {
                let header = self.new_block();
                self.add_edge(current, header, EdgeKind::Forward);
                let continuation = self.new_block();

                let body_entry = self.new_block();
                self.add_edge(header, body_entry, EdgeKind::Forward);

                self.loop_stack.push(LoopFrame {
                    continuation,
                    saw_break: false,
                });
                let body_exit = self.lower_sequence(body, body_entry)?;
                let saw_break = self
                    .loop_stack
                    .pop()
                    .map(|frame| frame.saw_break)
                    .unwrap_or(false);

                self.add_edge(body_exit, header, EdgeKind::BackEdge);
                if !saw_break {
                    // No reachable exit: the loop re-executes its body
                    // without a bounding condition gate.
                    self.unbounded_tail = true;
                }
                Ok(continuation)
            }
            Statement::Break { location } => {
                let continuation = match self.loop_stack.last_mut() {
                    Some(frame) => {
                        frame.saw_break = true;
                        frame.continuation
                    }
                    None => {
                        return Err(AnalysisError::BreakOutsideLoop {
                            function: self.function_name.clone(),
                            location: *location,
                        })
                    }
                };
                self.add_edge(current, continuation, EdgeKind::Forward);
                // Anything after the break in this branch is unreachable
                // but still needs a home block.
                Ok(self.new_block())
            }
        }
    }
}

pub fn build_cfg(function: &TaggedFunction) -> Result<ControlFlowGraph, AnalysisError> {
    CfgBuilder::build(function)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ceiguard_ir::{Operation, OperationKind, SourceLocation, StorageAnnotation};

    fn neutral(line: usize) -> TaggedStatement {
        Statement::Operation(Operation {
            kind: OperationKind::Neutral,
            target: format!("op_{line}"),
            location: SourceLocation::new(line, 1),
        })
    }

    fn function(statements: Vec<TaggedStatement>) -> TaggedFunction {
        TaggedFunction {
            name: "under_test".to_string(),
            statements,
            storage: StorageAnnotation::default(),
        }
    }

    fn operation_count(cfg: &ControlFlowGraph) -> usize {
        cfg.blocks.iter().map(|b| b.operations.len()).sum()
    }

    #[test]
    fn straight_line_is_one_block() {
        let cfg = build_cfg(&function(vec![neutral(1), neutral(2), neutral(3)])).unwrap();

        assert_eq!(cfg.blocks.len(), 1);
        assert_eq!(cfg.block(cfg.entry).operations.len(), 3);
        assert!(cfg.block(cfg.entry).successors.is_empty());
        assert!(!cfg.unbounded_tail);
    }

    #[test]
    fn empty_function_builds_a_single_empty_entry() {
        let cfg = build_cfg(&function(vec![])).unwrap();

        assert_eq!(cfg.blocks.len(), 1);
        assert!(cfg.block(cfg.entry).operations.is_empty());
        assert_eq!(cfg.exit_blocks(), vec![cfg.entry]);
    }

    #[test]
    fn conditional_produces_two_forward_edges_that_reconverge() {
        let cfg = build_cfg(&function(vec![
            neutral(1),
            Statement::If {
                then_branch: vec![neutral(2)],
                else_branch: vec![neutral(3)],
            },
            neutral(4),
        ]))
        .unwrap();

        let entry = cfg.block(cfg.entry);
        assert_eq!(entry.successors.len(), 2);
        assert!(entry
            .successors
            .iter()
            .all(|&(_, kind)| kind == EdgeKind::Forward));

        let joins: Vec<_> = entry
            .successors
            .iter()
            .map(|&(branch, _)| cfg.block(branch).successors[0].0)
            .collect();
        assert_eq!(joins[0], joins[1]);
        assert_eq!(cfg.block(joins[0]).operations.len(), 1);
        assert_eq!(operation_count(&cfg), 4);
    }

    #[test]
    fn else_less_conditional_routes_false_edge_to_join() {
        let cfg = build_cfg(&function(vec![
            Statement::If {
                then_branch: vec![neutral(2)],
                else_branch: vec![],
            },
            neutral(3),
        ]))
        .unwrap();

        let entry = cfg.block(cfg.entry);
        assert_eq!(entry.successors.len(), 2);
        let then_entry = entry.successors[0].0;
        let join = entry.successors[1].0;
        assert_eq!(cfg.block(then_entry).successors, vec![(join, EdgeKind::Forward)]);
    }

    #[test]
    fn while_gets_a_back_edge_and_a_header_exit() {
        let cfg = build_cfg(&function(vec![
            Statement::While {
                body: vec![neutral(2)],
            },
            neutral(3),
        ]))
        .unwrap();

        let back_edges = cfg.back_edges();
        assert_eq!(back_edges.len(), 1);

        let header = back_edges[0].to;
        let exits: Vec<_> = cfg
            .block(header)
            .successors
            .iter()
            .filter(|&&(to, kind)| {
                kind == EdgeKind::Forward && !cfg.natural_loop(back_edges[0].from, header).contains(&to)
            })
            .collect();
        assert_eq!(exits.len(), 1, "header needs a condition-false exit");
        assert!(!cfg.unbounded_tail);
    }

    #[test]
    fn loop_without_break_marks_unbounded_tail() {
        let cfg = build_cfg(&function(vec![Statement::Loop {
            body: vec![neutral(2)],
        }]))
        .unwrap();

        assert!(cfg.unbounded_tail);
        assert_eq!(cfg.back_edges().len(), 1);

        // No forward exit: nothing downstream of the loop is reachable.
        let header = cfg.back_edges()[0].to;
        let body = cfg.natural_loop(cfg.back_edges()[0].from, header);
        for block in &cfg.blocks {
            if body.contains(&block.id) {
                for &(to, kind) in &block.successors {
                    if kind == EdgeKind::Forward {
                        assert!(body.contains(&to), "loop leaked a forward exit");
                    }
                }
            }
        }
    }

    #[test]
    fn break_gives_the_loop_a_forward_exit() {
        let cfg = build_cfg(&function(vec![
            Statement::Loop {
                body: vec![
                    neutral(2),
                    Statement::If {
                        then_branch: vec![Statement::Break {
                            location: SourceLocation::new(3, 9),
                        }],
                        else_branch: vec![],
                    },
                ],
            },
            neutral(5),
        ]))
        .unwrap();

        assert!(!cfg.unbounded_tail);
        // The continuation holding the trailing operation is reachable.
        let distances = cfg.forward_distances(cfg.entry);
        let trailing = cfg
            .blocks
            .iter()
            .find(|b| b.operations.iter().any(|op| op.location.line == 5))
            .map(|b| b.id)
            .expect("trailing operation block");
        assert!(distances.contains_key(&trailing));
    }

    #[test]
    fn break_outside_loop_is_malformed() {
        let result = build_cfg(&function(vec![Statement::Break {
            location: SourceLocation::new(8, 4),
        }]));

        assert_eq!(
            result,
            Err(AnalysisError::BreakOutsideLoop {
                function: "under_test".to_string(),
                location: SourceLocation::new(8, 4),
            })
        );
    }

    #[test]
    fn every_operation_lands_in_exactly_one_block() {
        let cfg = build_cfg(&function(vec![
            neutral(1),
            Statement::While {
                body: vec![
                    neutral(2),
                    Statement::If {
                        then_branch: vec![neutral(3)],
                        else_branch: vec![neutral(4)],
                    },
                ],
            },
            neutral(5),
        ]))
        .unwrap();

        assert_eq!(operation_count(&cfg), 5);
    }

    #[test]
    fn nested_loops_produce_one_back_edge_each() {
        let cfg = build_cfg(&function(vec![Statement::While {
            body: vec![Statement::While {
                body: vec![neutral(3)],
            }],
        }]))
        .unwrap();

        assert_eq!(cfg.back_edges().len(), 2);
    }
}
