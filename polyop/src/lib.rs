//! Polyop Library
//!
//! Self-specializing operation nodes for dynamically typed runtimes.
//!
//! A host embeds one node per call site. Each node inspects the operands it
//! actually sees, caches the specialization that handled them, and only ever
//! generalizes: a fixed-width add that overflows is rewritten to arbitrary
//! precision, a call site fed too many foreign representations collapses to
//! the generic path.
//!
//! ```text
//! Value ──► Node ──► SpecializationCache ──► specialized / generic path
//!             │
//!             └──► Foreign capability probes
//! ```

pub mod cache;
pub mod config;
pub mod error;
pub mod interop;
pub mod lexer;
pub mod node;
pub mod parser;
pub mod repl;
pub mod session;
pub mod span;
pub mod value;

pub use cache::{CacheSnapshot, Resolution, Specialization, SpecializationCache};
pub use config::RuntimeConfig;
pub use error::{DriverError, EvalError, EvalResult, TypeError};
pub use interop::{Foreign, ForeignObject, Unsupported};
pub use node::{AddNode, AddState, SharedNode, SourceLocation, ToTextNode};
pub use session::{Session, SessionSnapshot};
pub use span::Span;
pub use value::{Callable, Kind, Repr, Value};
