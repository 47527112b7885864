//! The ordering rules: which interaction/effect pairs open a reentrancy
//! window.
//!
//! Two rules, matching how the window actually opens:
//!
//! 1. **Sequential**: an interaction reaches an effect in execution order
//!    without re-running it. The callee runs while the write it should
//!    have observed is still pending.
//!
//! 2. **Loop**: interaction and effect share a loop body, interaction at
//!    or before the effect in per-iteration order. Even when the write
//!    lands later in the same iteration, the back-edge re-runs the call
//!    before the previous iteration's write has any enforced finality for
//!    the callee, so in-iteration ordering buys nothing.
//!
//! An interaction with no paired reachable effect is not a CEI issue by
//! itself and produces nothing.

use crate::analysis::loops::{find_loops, NaturalLoop};
use crate::cfg::{BlockId, ControlFlowGraph};
use crate::core::{AnalyzerConfig, Confidence, Finding, Severity, ViolationKind};
use ceiguard_ir::{OperationKind, SourceLocation};

/// An effect or interaction operation's address inside the CFG.
#[derive(Debug, Clone)]
struct OpSite {
    block: BlockId,
    index: usize,
    location: SourceLocation,
    /// Callee identifier for interactions, storage slot for effects.
    payload: String,
}

pub struct OrderingAnalyzer<'a> {
    cfg: &'a ControlFlowGraph,
    config: &'a AnalyzerConfig,
    loops: Vec<NaturalLoop>,
    interactions: Vec<OpSite>,
    effects: Vec<OpSite>,
}

impl<'a> OrderingAnalyzer<'a> {
    pub fn new(cfg: &'a ControlFlowGraph, config: &'a AnalyzerConfig) -> Self {
        let mut interactions = Vec::new();
        let mut effects = Vec::new();

        for block in &cfg.blocks {
            for (index, op) in block.operations.iter().enumerate() {
                let site = |payload: &str| OpSite {
                    block: block.id,
                    index,
                    location: op.location,
                    payload: payload.to_string(),
                };
                match &op.kind {
                    OperationKind::Interaction { callee } => interactions.push(site(callee)),
                    OperationKind::Effect { slot } => effects.push(site(slot)),
                    OperationKind::Neutral => {}
                }
            }
        }

        Self {
            cfg,
            config,
            loops: find_loops(cfg),
            interactions,
            effects,
        }
    }

    /// Every violating pairing in this function, nearest effect per
    /// interaction and rule. The caller only reads the CFG; nothing is
    /// mutated.
    pub fn analyze(&self) -> Vec<Finding> {
        let mut findings = Vec::new();

        for interaction in &self.interactions {
            if let Some(finding) = self.loop_violation(interaction) {
                findings.push(finding);
            }
            if let Some(finding) = self.sequential_violation(interaction) {
                findings.push(finding);
            }
        }

        findings
    }

    /// Rule 2: co-occurrence inside a cyclic region, interaction at or
    /// before the effect in per-iteration order.
    fn loop_violation(&self, interaction: &OpSite) -> Option<Finding> {
        let mut best: Option<((usize, usize, SourceLocation), &OpSite)> = None;

        for lp in &self.loops {
            let Some(ipos) = lp.position(interaction.block, interaction.index) else {
                continue;
            };
            for effect in &self.effects {
                let Some(epos) = lp.position(effect.block, effect.index) else {
                    continue;
                };
                if epos < ipos {
                    continue;
                }
                let key = (epos.0 - ipos.0, effect.index, effect.location);
                if best.as_ref().map_or(true, |(current, _)| key < *current) {
                    best = Some((key, effect));
                }
            }
        }

        best.map(|(_, effect)| {
            self.finding(ViolationKind::LoopCei, interaction, effect, Confidence::High)
        })
    }

    /// Rule 1: the effect is reachable from the interaction in execution
    /// order. A back-edge taken once to leave a loop still yields a real
    /// ordering; pairs sharing a loop body are the loop rule's
    /// jurisdiction and skipped here.
    fn sequential_violation(&self, interaction: &OpSite) -> Option<Finding> {
        let distances = self.cfg.execution_distances(interaction.block);
        let mut best: Option<((usize, usize, SourceLocation), &OpSite)> = None;

        for effect in &self.effects {
            if self.shares_loop(interaction, effect) {
                continue;
            }
            let Some(&distance) = distances.get(&effect.block) else {
                continue;
            };
            if distance == 0 && effect.index <= interaction.index {
                // Same block, effect committed first.
                continue;
            }
            let key = (distance, effect.index, effect.location);
            if best.as_ref().map_or(true, |(current, _)| key < *current) {
                best = Some((key, effect));
            }
        }

        let (_, effect) = best?;

        let guaranteed = effect.block == interaction.block
            || !self
                .cfg
                .exit_reachable_without(interaction.block, effect.block);
        if !guaranteed && !self.config.flag_conditional_paths {
            return None;
        }
        let confidence = if guaranteed {
            Confidence::High
        } else {
            Confidence::Medium
        };

        Some(self.finding(ViolationKind::SequentialCei, interaction, effect, confidence))
    }

    fn shares_loop(&self, a: &OpSite, b: &OpSite) -> bool {
        self.loops
            .iter()
            .any(|lp| lp.contains(a.block) && lp.contains(b.block))
    }

    fn finding(
        &self,
        kind: ViolationKind,
        interaction: &OpSite,
        effect: &OpSite,
        confidence: Confidence,
    ) -> Finding {
        let function = &self.cfg.function_name;
        let message = match kind {
            ViolationKind::LoopCei => format!(
                "function '{function}' calls '{}' inside a loop whose body also writes '{}'; \
                 the next iteration's call runs before the prior write is final for the callee",
                interaction.payload, effect.payload
            ),
            ViolationKind::SequentialCei => format!(
                "function '{function}' writes '{}' only after calling '{}'; \
                 the callee can reenter before the write lands",
                effect.payload, interaction.payload
            ),
        };

        Finding {
            function_name: function.clone(),
            kind,
            interaction_location: interaction.location,
            effect_location: effect.location,
            interaction_target: interaction.payload.clone(),
            effect_slot: effect.payload.clone(),
            severity: Severity::High,
            confidence,
            message,
        }
    }
}
