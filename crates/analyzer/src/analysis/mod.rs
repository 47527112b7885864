//! Path-order analysis over the control flow graph.

pub mod loops;
pub mod ordering;

pub use loops::{find_loops, NaturalLoop};
pub use ordering::OrderingAnalyzer;
