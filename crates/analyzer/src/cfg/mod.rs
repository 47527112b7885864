//! Control flow graph construction and queries.

pub mod block;
pub mod builder;

pub use block::{BasicBlock, BlockId, ControlFlowEdge, ControlFlowGraph, EdgeKind};
pub use builder::{build_cfg, CfgBuilder};
