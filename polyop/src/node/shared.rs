//! Call sites shared between threads

use super::{AddNode, Node, ToTextNode};
use crate::cache::CacheSnapshot;
use crate::error::EvalResult;
use crate::value::Value;
use parking_lot::Mutex;
use std::sync::Arc;

/// A node behind a lock.
///
/// Cloning shares the call site: every clone resolves against, and installs
/// into, the same cache. Installs are serialized by the lock, so readers
/// never observe a half-installed specialization.
#[derive(Debug)]
pub struct SharedNode<N> {
    inner: Arc<Mutex<N>>,
}

impl<N> Clone for SharedNode<N> {
    fn clone(&self) -> Self {
        SharedNode {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<N: Node> SharedNode<N> {
    pub fn new(node: N) -> Self {
        SharedNode {
            inner: Arc::new(Mutex::new(node)),
        }
    }

    /// Run `f` with exclusive access to the node
    pub fn with<R>(&self, f: impl FnOnce(&mut N) -> R) -> R {
        f(&mut self.inner.lock())
    }

    pub fn snapshot(&self) -> CacheSnapshot {
        self.inner.lock().snapshot()
    }
}

impl SharedNode<AddNode> {
    pub fn execute(&self, left: Value, right: Value) -> EvalResult<Value> {
        self.inner.lock().execute(left, right)
    }
}

impl SharedNode<ToTextNode> {
    pub fn execute(&self, value: &Value) -> EvalResult<Arc<str>> {
        self.inner.lock().execute(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::AddState;
    use std::thread;

    #[test]
    fn test_clones_share_the_call_site() {
        let node = SharedNode::new(AddNode::default());
        let other = node.clone();
        node.execute(Value::Int(1), Value::Int(2)).unwrap();
        assert_eq!(other.with(|node| node.state()), AddState::FixedWidth);
    }

    #[test]
    fn test_concurrent_adds() {
        let node = SharedNode::new(AddNode::default());
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let node = node.clone();
                thread::spawn(move || {
                    for j in 0..100 {
                        let left = if j % 10 == 0 { Value::Int(i64::MAX) } else { Value::Int(i) };
                        node.execute(left, Value::Int(j)).unwrap();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let snapshot = node.snapshot();
        assert_eq!(snapshot.specializations, vec!["ArbitraryPrecision"]);
        assert_eq!(snapshot.retired, vec!["FixedWidth"]);
        assert_eq!(snapshot.installs, 2);
    }

    #[test]
    fn test_shared_to_text() {
        let node = SharedNode::new(ToTextNode::default());
        let handles: Vec<_> = (0..4)
            .map(|i| {
                let node = node.clone();
                thread::spawn(move || node.execute(&Value::Int(i)).unwrap())
            })
            .collect();
        let mut texts: Vec<String> = handles
            .into_iter()
            .map(|handle| handle.join().unwrap().to_string())
            .collect();
        texts.sort();
        assert_eq!(texts, vec!["0", "1", "2", "3"]);
        assert_eq!(node.snapshot().specializations, vec!["Int64"]);
    }
}
