use crate::statement::{RawStatement, TaggedStatement};
use serde::{Deserialize, Serialize};

/// Declared ABI storage annotation of a contract method.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageAnnotation {
    pub reads: bool,
    pub writes: bool,
}

impl StorageAnnotation {
    pub fn read_write() -> Self {
        Self {
            reads: true,
            writes: true,
        }
    }
}

/// One analyzable contract method, immutable once loaded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Function {
    pub name: String,
    pub statements: Vec<RawStatement>,
    #[serde(default)]
    pub storage: StorageAnnotation,
}

impl Function {
    pub fn new(name: impl Into<String>, statements: Vec<RawStatement>) -> Self {
        Self {
            name: name.into(),
            statements,
            storage: StorageAnnotation::default(),
        }
    }

    pub fn with_storage(mut self, storage: StorageAnnotation) -> Self {
        self.storage = storage;
        self
    }

    pub fn is_empty(&self) -> bool {
        self.statements.is_empty()
    }
}

/// A function whose operations carry semantic tags.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaggedFunction {
    pub name: String,
    pub statements: Vec<TaggedStatement>,
    pub storage: StorageAnnotation,
}
