//! Per-call-site specialization cache
//!
//! A cache holds the specializations a call site has installed so far, in
//! installation order. Resolution tries them in that order, installs a new
//! one when nothing matches, and collapses to the generic path once the
//! admission limit for limited (interop-guarded) specializations is spent.
//!
//! The cache only ever generalizes:
//!
//! - a retired specialization is never installed again,
//! - installing a specialization retires every entry it replaces,
//! - once generic, nothing new is installed.
//!
//! Caches are owned by exactly one node and mutated through `&mut self`;
//! hosts sharing a call site across threads wrap the node in
//! [`crate::node::SharedNode`].

use log::{debug, info, trace};
use serde::Serialize;
use std::fmt;

/// A concrete implementation held by a [`SpecializationCache`]
pub trait Specialization: Clone + PartialEq + fmt::Debug + fmt::Display {
    /// Operands the specialization is matched against
    type Operands: ?Sized;

    /// Static kind match and guard for the current operands
    fn accepts(&self, operands: &Self::Operands) -> bool;

    /// Whether installing this specialization spends the admission limit
    fn is_limited(&self) -> bool {
        false
    }

    /// Whether this specialization makes `other` obsolete
    fn replaces(&self, _other: &Self) -> bool {
        false
    }
}

/// Outcome of [`SpecializationCache::resolve`]
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution<S> {
    /// An installed specialization matched
    Cached(S),
    /// A new specialization was installed for these operands
    Installed(S),
    /// The cache is closed; use the generic implementation
    Generic,
    /// No specialization applies to these operands
    Unsupported,
}

impl<S> Resolution<S> {
    pub fn specialization(&self) -> Option<&S> {
        match self {
            Resolution::Cached(spec) | Resolution::Installed(spec) => Some(spec),
            Resolution::Generic | Resolution::Unsupported => None,
        }
    }
}

/// Serializable view of a cache's state
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CacheSnapshot {
    pub operation: &'static str,
    pub specializations: Vec<String>,
    pub retired: Vec<String>,
    pub installs: usize,
    pub limited_installs: usize,
    pub limit: usize,
    pub generic: bool,
}

/// Specialization state of one call site
#[derive(Debug, Clone)]
pub struct SpecializationCache<S> {
    /// Operation name, for logging
    operation: &'static str,
    /// Installed specializations, in installation order
    entries: Vec<S>,
    /// Specializations that may never be installed again
    retired: Vec<S>,
    /// Total installs, monotonic
    installs: usize,
    /// Installs of limited specializations, monotonic
    limited_installs: usize,
    /// Admission limit for limited specializations
    limit: usize,
    /// Generic fallback installed
    generic: bool,
}

impl<S: Specialization> SpecializationCache<S> {
    /// Create an empty cache
    pub fn new(operation: &'static str, limit: usize) -> Self {
        SpecializationCache {
            operation,
            entries: Vec::new(),
            retired: Vec::new(),
            installs: 0,
            limited_installs: 0,
            limit,
            generic: false,
        }
    }

    /// Pick the implementation for `operands`.
    ///
    /// Installed specializations are tried in installation order. If none
    /// accepts, `synthesize` proposes one for the observed operands; it is
    /// handed the retired specializations and must not propose any of them.
    pub fn resolve<F>(&mut self, operands: &S::Operands, synthesize: F) -> Resolution<S>
    where
        F: FnOnce(&S::Operands, &[S]) -> Option<S>,
    {
        if let Some(spec) = self.entries.iter().find(|spec| spec.accepts(operands)) {
            return Resolution::Cached(spec.clone());
        }
        if self.generic {
            return Resolution::Generic;
        }
        let Some(spec) = synthesize(operands, &self.retired) else {
            return Resolution::Unsupported;
        };
        if self.is_retired(&spec) {
            debug_assert!(false, "{}: re-proposed retired {spec}", self.operation);
            return Resolution::Generic;
        }
        match self.install(spec) {
            Some(spec) => Resolution::Installed(spec),
            None => Resolution::Generic,
        }
    }

    /// Install `spec`, or close the cache if its admission limit is spent.
    ///
    /// Returns the installed specialization, or `None` when the cache is
    /// (now) generic or `spec` was retired.
    pub fn install(&mut self, spec: S) -> Option<S> {
        if self.generic {
            return None;
        }
        if self.is_retired(&spec) {
            debug!("{}: refused to reinstall retired {spec}", self.operation);
            return None;
        }
        if spec.is_limited() && self.limited_installs >= self.limit {
            self.close();
            return None;
        }

        let (replaced, kept): (Vec<S>, Vec<S>) = std::mem::take(&mut self.entries)
            .into_iter()
            .partition(|entry| spec.replaces(entry));
        self.entries = kept;
        for old in replaced {
            trace!("{}: {spec} replaces {old}", self.operation);
            self.push_retired(old);
        }

        self.entries.push(spec.clone());
        self.installs += 1;
        if spec.is_limited() {
            self.limited_installs += 1;
        }
        debug!(
            "{}: installed {spec} ({} active, {}/{} limited)",
            self.operation,
            self.entries.len(),
            self.limited_installs,
            self.limit
        );
        Some(spec)
    }

    /// Abandon `spec` for good (rewrite on failure)
    pub fn retire(&mut self, spec: &S) {
        self.entries.retain(|entry| entry != spec);
        debug!("{}: retired {spec}", self.operation);
        self.push_retired(spec.clone());
    }

    /// Switch to the generic implementation. Idempotent.
    ///
    /// Limited specializations are superseded by the generic path and
    /// dropped; the remaining native entries keep matching first.
    pub fn close(&mut self) {
        if self.generic {
            return;
        }
        let (limited, kept): (Vec<S>, Vec<S>) = std::mem::take(&mut self.entries)
            .into_iter()
            .partition(|entry| entry.is_limited());
        self.entries = kept;
        for old in limited {
            self.push_retired(old);
        }
        self.generic = true;
        info!(
            "{}: admission limit {} reached, using generic implementation",
            self.operation, self.limit
        );
    }

    fn push_retired(&mut self, spec: S) {
        if !self.retired.contains(&spec) {
            self.retired.push(spec);
        }
    }

    pub fn is_retired(&self, spec: &S) -> bool {
        self.retired.contains(spec)
    }

    pub fn contains(&self, spec: &S) -> bool {
        self.entries.contains(spec)
    }

    pub fn entries(&self) -> &[S] {
        &self.entries
    }

    pub fn retired(&self) -> &[S] {
        &self.retired
    }

    pub fn is_generic(&self) -> bool {
        self.generic
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty() && !self.generic
    }

    pub fn install_count(&self) -> usize {
        self.installs
    }

    pub fn limited_install_count(&self) -> usize {
        self.limited_installs
    }

    pub fn snapshot(&self) -> CacheSnapshot {
        CacheSnapshot {
            operation: self.operation,
            specializations: self.entries.iter().map(ToString::to_string).collect(),
            retired: self.retired.iter().map(ToString::to_string).collect(),
            installs: self.installs,
            limited_installs: self.limited_installs,
            limit: self.limit,
            generic: self.generic,
        }
    }
}
