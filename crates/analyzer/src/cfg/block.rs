use ceiguard_ir::Operation;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet, VecDeque};

/// Arena index of a basic block inside one function's graph.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct BlockId(pub usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgeKind {
    Forward,
    /// Loop repetition: the target block is an ancestor of the source on
    /// the construction path (the loop header).
    BackEdge,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ControlFlowEdge {
    pub from: BlockId,
    pub to: BlockId,
    pub kind: EdgeKind,
}

/// A maximal straight-line run of operations with a single entry and a
/// single set of successor edges.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BasicBlock {
    pub id: BlockId,
    pub operations: Vec<Operation>,
    pub successors: Vec<(BlockId, EdgeKind)>,
    pub predecessors: Vec<BlockId>,
}

impl BasicBlock {
    pub(crate) fn new(id: BlockId) -> Self {
        Self {
            id,
            operations: Vec::new(),
            successors: Vec::new(),
            predecessors: Vec::new(),
        }
    }
}

/// Indexed-arena control flow graph for one function.
///
/// Edges are index pairs, so back-edges are ordinary data and the graph
/// owns no reference cycles.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControlFlowGraph {
    pub function_name: String,
    pub blocks: Vec<BasicBlock>,
    pub entry: BlockId,
    /// Set when a loop has no reachable `break`: execution never runs past
    /// that loop and the graph has no forward exit on that tail.
    pub unbounded_tail: bool,
}

impl ControlFlowGraph {
    pub fn block(&self, id: BlockId) -> &BasicBlock {
        &self.blocks[id.0]
    }

    pub fn edges(&self) -> impl Iterator<Item = ControlFlowEdge> + '_ {
        self.blocks.iter().flat_map(|block| {
            block
                .successors
                .iter()
                .map(move |&(to, kind)| ControlFlowEdge {
                    from: block.id,
                    to,
                    kind,
                })
        })
    }

    pub fn back_edges(&self) -> Vec<ControlFlowEdge> {
        self.edges()
            .filter(|edge| edge.kind == EdgeKind::BackEdge)
            .collect()
    }

    /// Blocks with no successors at all.
    pub fn exit_blocks(&self) -> Vec<BlockId> {
        self.blocks
            .iter()
            .filter(|block| block.successors.is_empty())
            .map(|block| block.id)
            .collect()
    }

    /// The natural loop of a back-edge: the header plus every block that
    /// reaches the tail without passing through the header.
    pub fn natural_loop(&self, tail: BlockId, header: BlockId) -> HashSet<BlockId> {
        let mut body = HashSet::from([header]);
        let mut stack = vec![tail];

        while let Some(block) = stack.pop() {
            if body.insert(block) {
                for &pred in &self.block(block).predecessors {
                    stack.push(pred);
                }
            }
        }

        body
    }

    /// BFS distance from `from` to every block reachable along forward
    /// edges only. `from` itself maps to zero.
    pub fn forward_distances(&self, from: BlockId) -> HashMap<BlockId, usize> {
        let mut distances = HashMap::from([(from, 0)]);
        let mut queue = VecDeque::from([from]);

        while let Some(block) = queue.pop_front() {
            let next = distances[&block] + 1;
            for &(to, kind) in &self.block(block).successors {
                if kind == EdgeKind::Forward && !distances.contains_key(&to) {
                    distances.insert(to, next);
                    queue.push_back(to);
                }
            }
        }

        distances
    }

    /// BFS distance from `from` to every block reachable in execution
    /// order, following every edge: leaving a loop passes its header
    /// again, so back-edges participate. `from` itself maps to zero.
    pub fn execution_distances(&self, from: BlockId) -> HashMap<BlockId, usize> {
        let mut distances = HashMap::from([(from, 0)]);
        let mut queue = VecDeque::from([from]);

        while let Some(block) = queue.pop_front() {
            let next = distances[&block] + 1;
            for &(to, _) in &self.block(block).successors {
                if !distances.contains_key(&to) {
                    distances.insert(to, next);
                    queue.push_back(to);
                }
            }
        }

        distances
    }

    /// True when some exit is reachable from `from` without passing
    /// through `guard`. Used to tell guaranteed orderings apart from ones
    /// an execution path can sidestep.
    pub fn exit_reachable_without(&self, from: BlockId, guard: BlockId) -> bool {
        let mut visited = HashSet::new();
        let mut queue = VecDeque::from([from]);

        while let Some(block) = queue.pop_front() {
            if !visited.insert(block) {
                continue;
            }
            if block == guard && block != from {
                continue;
            }
            if self.block(block).successors.is_empty() {
                return true;
            }
            for &(to, _) in &self.block(block).successors {
                queue.push_back(to);
            }
        }

        false
    }
}
