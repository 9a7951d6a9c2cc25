use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::scheduler::Ordered;

/// One vertex of a submitted DAG.
///
/// `id` is unique within a submission; execution order is `(epoch, id)` ascending.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Node {
    pub id: String,
    #[serde(default)]
    pub epoch: i64,
    #[serde(flatten)]
    pub op: NodeOp,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NodeOp {
    /// Dispatch `name` through the syscall table.
    Syscall {
        name: String,
        #[serde(default)]
        args: Vec<Value>,
        #[serde(default)]
        kwargs: Map<String, Value>,
    },
    /// Emit `value` verbatim.
    Value {
        #[serde(default)]
        value: Value,
    },
}

impl Node {
    pub fn syscall(id: impl Into<String>, name: impl Into<String>, args: Vec<Value>) -> Self {
        Self {
            id: id.into(),
            epoch: 0,
            op: NodeOp::Syscall {
                name: name.into(),
                args,
                kwargs: Map::new(),
            },
        }
    }

    pub fn value(id: impl Into<String>, value: Value) -> Self {
        Self {
            id: id.into(),
            epoch: 0,
            op: NodeOp::Value { value },
        }
    }

    pub fn with_epoch(mut self, epoch: i64) -> Self {
        self.epoch = epoch;
        self
    }

    /// Attach keyword arguments. Has no effect on value nodes.
    pub fn with_kwargs(mut self, new_kwargs: Map<String, Value>) -> Self {
        if let NodeOp::Syscall { kwargs, .. } = &mut self.op {
            *kwargs = new_kwargs;
        }
        self
    }
}

impl Ordered for Node {
    fn order_key(&self) -> (i64, &str) {
        (self.epoch, &self.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_both_node_kinds() {
        let nodes: Vec<Node> = serde_json::from_value(json!([
            {"id": "a", "kind": "syscall", "name": "sum", "args": [1, 2]},
            {"id": "b", "epoch": 2, "kind": "value", "value": {"x": 1}},
            {"id": "c", "kind": "value"}
        ]))
        .unwrap();
        assert_eq!(nodes[0], Node::syscall("a", "sum", vec![json!(1), json!(2)]));
        assert_eq!(nodes[1], Node::value("b", json!({"x": 1})).with_epoch(2));
        assert_eq!(nodes[2], Node::value("c", Value::Null));
    }

    #[test]
    fn syscall_without_name_is_rejected() {
        let parsed: Result<Node, _> = serde_json::from_value(json!({"id": "a", "kind": "syscall"}));
        assert!(parsed.is_err());
    }

    #[test]
    fn kwargs_ignored_for_value_nodes() {
        let mut kwargs = Map::new();
        kwargs.insert("k".into(), json!(1));
        let node = Node::value("v", json!(5)).with_kwargs(kwargs);
        assert_eq!(node.op, NodeOp::Value { value: json!(5) });
    }
}
