//! Adaptive operation nodes
//!
//! One node lives at each call site. A node owns its
//! [`SpecializationCache`](crate::cache::SpecializationCache) and is
//! executed through `&mut self`, so the borrow checker already serializes
//! installs on a call site; [`SharedNode`] adds a lock for hosts that run the
//! same call site from several threads.

pub mod add;
mod shared;
pub mod to_text;

pub use add::{AddNode, AddSpecialization, AddState};
pub use shared::SharedNode;
pub use to_text::{ToTextNode, ToTextSpecialization};

use crate::cache::CacheSnapshot;
use std::fmt;
use std::sync::Arc;

/// Common surface of adaptive nodes
pub trait Node {
    /// Short operation name used in diagnostics
    fn operation(&self) -> &'static str;

    /// Cache state of this call site
    fn snapshot(&self) -> CacheSnapshot;
}

/// Where a call site sits in guest source
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceLocation {
    pub source: Arc<str>,
    pub line: usize,
    pub column: usize,
}

impl SourceLocation {
    pub fn new(source: impl Into<Arc<str>>, line: usize, column: usize) -> Self {
        SourceLocation {
            source: source.into(),
            line,
            column,
        }
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} line {} col {}", self.source, self.line, self.column)
    }
}
