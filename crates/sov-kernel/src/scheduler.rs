use crate::node::Node;

/// Anything carrying the `(epoch, id)` ordering key.
///
/// DAG nodes and transport messages share this one ordering law.
pub trait Ordered {
    fn order_key(&self) -> (i64, &str);
}

/// Stable sort by `(epoch, id)` ascending.
pub fn order_by_key<T: Ordered>(mut items: Vec<T>) -> Vec<T> {
    items.sort_by(|a, b| a.order_key().cmp(&b.order_key()));
    items
}

/// Total-ordering function over a DAG.
#[derive(Debug, Clone, Copy, Default)]
pub struct DeterministicScheduler;

impl DeterministicScheduler {
    pub fn new() -> Self {
        Self
    }

    pub fn order(&self, nodes: Vec<Node>) -> Vec<Node> {
        order_by_key(nodes)
    }

    /// Returns true iff the trace is non-empty.
    ///
    /// This only says that a run happened at all. It does not check the trace
    /// against the DAG that produced it, and callers rely on that leniency.
    pub fn verify<S: AsRef<str>>(&self, trace: &[S]) -> bool {
        !trace.is_empty()
    }
}
