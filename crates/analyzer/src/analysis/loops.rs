//! Natural-loop discovery from tagged back-edges.

use crate::cfg::{BlockId, ControlFlowGraph, EdgeKind};
use std::collections::{HashMap, HashSet, VecDeque};

/// One natural loop, keyed by the back-edge that closes it.
#[derive(Debug, Clone)]
pub struct NaturalLoop {
    pub header: BlockId,
    pub tail: BlockId,
    pub body: HashSet<BlockId>,
    /// Forward-BFS order of body blocks from the header: where a block
    /// sits within one iteration.
    iteration_order: HashMap<BlockId, usize>,
}

impl NaturalLoop {
    pub fn contains(&self, block: BlockId) -> bool {
        self.body.contains(&block)
    }

    /// Per-iteration position of an operation: block order first, then
    /// index within the block. `None` for blocks outside the iterated
    /// part of the body.
    pub fn position(&self, block: BlockId, op_index: usize) -> Option<(usize, usize)> {
        self.iteration_order
            .get(&block)
            .map(|&order| (order, op_index))
    }
}

pub fn find_loops(cfg: &ControlFlowGraph) -> Vec<NaturalLoop> {
    cfg.back_edges()
        .into_iter()
        .map(|edge| {
            let body = cfg.natural_loop(edge.from, edge.to);
            let iteration_order = iteration_order(cfg, edge.to, &body);
            NaturalLoop {
                header: edge.to,
                tail: edge.from,
                body,
                iteration_order,
            }
        })
        .collect()
}

/// BFS from the header, forward edges only, restricted to body blocks.
fn iteration_order(
    cfg: &ControlFlowGraph,
    header: BlockId,
    body: &HashSet<BlockId>,
) -> HashMap<BlockId, usize> {
    let mut order = HashMap::from([(header, 0)]);
    let mut queue = VecDeque::from([header]);

    while let Some(block) = queue.pop_front() {
        for &(to, kind) in &cfg.block(block).successors {
            if kind == EdgeKind::Forward && body.contains(&to) && !order.contains_key(&to) {
                order.insert(to, order.len());
                queue.push_back(to);
            }
        }
    }

    order
}
