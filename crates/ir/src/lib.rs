//! Contract intermediate representation consumed by the ceiguard analyzer.
//!
//! The front-end parses contract source, resolves call targets, and hands
//! each method to the analyzer as the types in this crate. Everything here
//! is plain data: the analyzer never mutates a function after it is loaded.

pub mod function;
pub mod location;
pub mod operation;
pub mod statement;

pub use function::{Function, StorageAnnotation, TaggedFunction};
pub use location::SourceLocation;
pub use operation::{Operation, OperationKind, RawOperation};
pub use statement::{RawStatement, Statement, TaggedStatement};
