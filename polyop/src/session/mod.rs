//! Driver session
//!
//! A session owns one add call site per `+` position and a single to-text
//! call site for printing results. Call sites persist across lines, so
//! feeding a session many lines shows how each site specializes over time.

use crate::cache::CacheSnapshot;
use crate::config::RuntimeConfig;
use crate::error::DriverError;
use crate::node::{AddNode, AddState, Node, SourceLocation, ToTextNode};
use crate::parser::{Line, parse};
use crate::span::Span;
use crate::value::Value;
use serde::Serialize;
use std::sync::Arc;

/// Cache state of every call site in a session
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionSnapshot {
    pub add_sites: Vec<CacheSnapshot>,
    pub to_text: CacheSnapshot,
}

/// Evaluation session
#[derive(Debug)]
pub struct Session {
    config: RuntimeConfig,
    source: Arc<str>,
    add_sites: Vec<AddNode>,
    to_text: ToTextNode,
}

impl Session {
    pub fn new(config: RuntimeConfig) -> Self {
        let to_text = ToTextNode::new(&config);
        Session {
            config,
            source: Arc::from("<input>"),
            add_sites: Vec::new(),
            to_text,
        }
    }

    /// Name reported in type error locations
    pub fn with_source(mut self, source: impl Into<Arc<str>>) -> Self {
        self.source = source.into();
        self
    }

    /// Evaluate one line and render its result as text.
    ///
    /// `line_no` is 1-based and only used for diagnostics.
    pub fn eval_line(&mut self, line: &str, line_no: usize) -> Result<Arc<str>, DriverError> {
        let parsed = parse(line)?;
        let value = self.eval(parsed, line_no)?;
        self.to_text
            .execute(&value)
            .map_err(|err| DriverError::eval(err, None))
    }

    /// Evaluate a parsed line, left-associative
    pub fn eval(&mut self, line: Line, line_no: usize) -> Result<Value, DriverError> {
        let Line {
            operands,
            plus_spans,
        } = line;
        let mut operands = operands.into_iter();
        let Some(first) = operands.next() else {
            return Err(DriverError::parser("empty line", Span::new(0, 0)));
        };

        let mut acc = first.value;
        let mut span = first.span;
        for (index, (plus, operand)) in plus_spans.into_iter().zip(operands).enumerate() {
            let location = SourceLocation::new(self.source.clone(), line_no, plus.start + 1);
            let node = self.site(index);
            node.set_location(Some(location));
            span = span.merge(operand.span);
            acc = node
                .execute(acc, operand.value)
                .map_err(|err| DriverError::eval(err, Some(span)))?;
        }
        Ok(acc)
    }

    fn site(&mut self, index: usize) -> &mut AddNode {
        while self.add_sites.len() <= index {
            self.add_sites.push(AddNode::new(&self.config));
        }
        &mut self.add_sites[index]
    }

    pub fn add_sites(&self) -> &[AddNode] {
        &self.add_sites
    }

    /// Numeric state of every add call site, by position
    pub fn states(&self) -> Vec<AddState> {
        self.add_sites.iter().map(AddNode::state).collect()
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            add_sites: self.add_sites.iter().map(Node::snapshot).collect(),
            to_text: self.to_text.snapshot(),
        }
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new(RuntimeConfig::default())
    }
}
