use crate::location::SourceLocation;
use crate::operation::{Operation, RawOperation};
use serde::{Deserialize, Serialize};

/// An ordered, possibly nested statement tree.
///
/// Generic over the operation payload so the tagger can annotate a tree
/// without rebuilding its shape: the front-end produces
/// `Statement<RawOperation>`, the tagger yields `Statement<Operation>`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Statement<Op> {
    Operation(Op),
    If {
        then_branch: Vec<Statement<Op>>,
        else_branch: Vec<Statement<Op>>,
    },
    While {
        body: Vec<Statement<Op>>,
    },
    /// Unconditional loop; only a nested `Break` leaves it.
    Loop {
        body: Vec<Statement<Op>>,
    },
    Break {
        location: SourceLocation,
    },
}

pub type RawStatement = Statement<RawOperation>;
pub type TaggedStatement = Statement<Operation>;
