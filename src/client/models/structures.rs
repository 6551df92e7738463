//! Data-structure sample payloads
//!
//! The backend publishes small samples built from recent detections. Known
//! shapes decode into typed variants; anything else is kept as raw JSON.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// How many items the queue and stack views expose
pub const VIEW_LIMIT: usize = 5;

/// Which sample a payload belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StructureKind {
    Array,
    LinkedList,
    DoubleLinkedList,
    CircularDoubleLinkedList,
    Stack,
    Queue,
    Tree,
}

impl StructureKind {
    pub const ALL: [StructureKind; 7] = [
        StructureKind::Array,
        StructureKind::LinkedList,
        StructureKind::DoubleLinkedList,
        StructureKind::CircularDoubleLinkedList,
        StructureKind::Stack,
        StructureKind::Queue,
        StructureKind::Tree,
    ];

    /// Endpoint path relative to the backend base URL
    pub fn path(&self) -> &'static str {
        match self {
            StructureKind::Array => "/detections/structures/array",
            StructureKind::LinkedList => "/detections/structures/linked-list",
            StructureKind::DoubleLinkedList => "/detections/structures/double-linked-list",
            StructureKind::CircularDoubleLinkedList => {
                "/detections/structures/circular-double-linked-list"
            }
            StructureKind::Stack => "/detections/structures/stack",
            StructureKind::Queue => "/detections/structures/queue",
            StructureKind::Tree => "/detections/structures/tree",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            StructureKind::Array => "array",
            StructureKind::LinkedList => "linked-list",
            StructureKind::DoubleLinkedList => "double-linked-list",
            StructureKind::CircularDoubleLinkedList => "circular-double-linked-list",
            StructureKind::Stack => "stack",
            StructureKind::Queue => "queue",
            StructureKind::Tree => "tree",
        }
    }
}

impl fmt::Display for StructureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A detection record used by the list-shaped samples
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListItem {
    pub id: i64,
    /// `YYYY-MM-DD HH:MM`
    pub date: String,
}

/// FIFO sample; only the first [`VIEW_LIMIT`] items are shown
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QueueView {
    pub items: Vec<ListItem>,
}

impl QueueView {
    pub fn visible(&self) -> &[ListItem] {
        &self.items[..self.items.len().min(VIEW_LIMIT)]
    }

    pub fn front(&self) -> Option<&ListItem> {
        self.visible().first()
    }

    pub fn rear(&self) -> Option<&ListItem> {
        self.visible().last()
    }
}

/// LIFO sample; the first item is the top
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StackView {
    pub items: Vec<ListItem>,
}

impl StackView {
    pub fn visible(&self) -> &[ListItem] {
        &self.items[..self.items.len().min(VIEW_LIMIT)]
    }

    pub fn top(&self) -> Option<&ListItem> {
        self.visible().first()
    }
}

/// A tree node label; the backend sends either text or numbers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NodeValue {
    Int(i64),
    Float(f64),
    Text(String),
}

impl fmt::Display for NodeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeValue::Int(n) => write!(f, "{}", n),
            NodeValue::Float(n) => write!(f, "{}", n),
            NodeValue::Text(s) => f.write_str(s),
        }
    }
}

/// Rooted tree sample. Leaves carry `children: null` on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreeNode {
    pub value: NodeValue,
    #[serde(default)]
    pub children: Option<Vec<TreeNode>>,
}

impl TreeNode {
    pub fn children(&self) -> &[TreeNode] {
        self.children.as_deref().unwrap_or(&[])
    }

    /// Levels from root to deepest leaf; a lone root has depth 1
    pub fn depth(&self) -> usize {
        1 + self.children().iter().map(TreeNode::depth).max().unwrap_or(0)
    }

    pub fn node_count(&self) -> usize {
        1 + self.children().iter().map(TreeNode::node_count).sum::<usize>()
    }
}

/// A decoded data-structure sample
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "data", rename_all = "snake_case")]
pub enum StructureSample {
    /// Flat sequence
    Array(Vec<i64>),
    /// Each item links to the next
    LinkedList(Vec<ListItem>),
    /// Each item links to both neighbours
    DoubleLinkedList(Vec<ListItem>),
    /// Doubly linked, with the last item linking back to the first
    CircularDoubleLinkedList(Vec<ListItem>),
    Stack(StackView),
    Queue(QueueView),
    Tree(TreeNode),
    /// Payload whose shape this client does not recognise
    Raw(Value),
}

impl StructureSample {
    /// Decode `value` as the shape expected for `kind`, keeping it raw if it
    /// does not match.
    pub fn decode(kind: StructureKind, value: Value) -> Self {
        let decoded = match kind {
            StructureKind::Array => serde_json::from_value(value.clone()).map(Self::Array),
            StructureKind::LinkedList => {
                serde_json::from_value(value.clone()).map(Self::LinkedList)
            }
            StructureKind::DoubleLinkedList => {
                serde_json::from_value(value.clone()).map(Self::DoubleLinkedList)
            }
            StructureKind::CircularDoubleLinkedList => {
                serde_json::from_value(value.clone()).map(Self::CircularDoubleLinkedList)
            }
            StructureKind::Stack => serde_json::from_value(value.clone()).map(Self::Stack),
            StructureKind::Queue => serde_json::from_value(value.clone()).map(Self::Queue),
            StructureKind::Tree => serde_json::from_value(value.clone()).map(Self::Tree),
        };

        decoded.unwrap_or_else(|e| {
            log::debug!("{} sample kept as raw JSON: {}", kind, e);
            Self::Raw(value)
        })
    }

    pub fn is_raw(&self) -> bool {
        matches!(self, StructureSample::Raw(_))
    }

    /// Number of elements for sequences, nodes for trees
    pub fn len(&self) -> usize {
        match self {
            StructureSample::Array(items) => items.len(),
            StructureSample::LinkedList(items)
            | StructureSample::DoubleLinkedList(items)
            | StructureSample::CircularDoubleLinkedList(items) => items.len(),
            StructureSample::Stack(view) => view.items.len(),
            StructureSample::Queue(view) => view.items.len(),
            StructureSample::Tree(root) => root.node_count(),
            StructureSample::Raw(Value::Array(items)) => items.len(),
            StructureSample::Raw(_) => 1,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// One-line rendering for tables and watch output
    pub fn summary(&self) -> String {
        fn ids(items: &[ListItem], sep: &str) -> String {
            items
                .iter()
                .map(|i| i.id.to_string())
                .collect::<Vec<_>>()
                .join(sep)
        }

        if self.is_empty() {
            return "(empty)".to_string();
        }

        match self {
            StructureSample::Array(items) => format!(
                "[{}]",
                items
                    .iter()
                    .map(|n| n.to_string())
                    .collect::<Vec<_>>()
                    .join(", ")
            ),
            StructureSample::LinkedList(items) => format!("{} -> null", ids(items, " -> ")),
            StructureSample::DoubleLinkedList(items) => {
                format!("null <- {} -> null", ids(items, " <-> "))
            }
            StructureSample::CircularDoubleLinkedList(items) => match items.first() {
                Some(head) => format!("{} <-> (back to {})", ids(items, " <-> "), head.id),
                None => "(empty)".to_string(),
            },
            StructureSample::Stack(view) => match view.top() {
                Some(top) => format!("top={} [{}]", top.id, ids(view.visible(), ", ")),
                None => "(empty)".to_string(),
            },
            StructureSample::Queue(view) => match (view.front(), view.rear()) {
                (Some(front), Some(rear)) => format!(
                    "front={} rear={} [{}]",
                    front.id,
                    rear.id,
                    ids(view.visible(), ", ")
                ),
                _ => "(empty)".to_string(),
            },
            StructureSample::Tree(root) => format!(
                "root={} nodes={} depth={}",
                root.value,
                root.node_count(),
                root.depth()
            ),
            StructureSample::Raw(value) => {
                let text = value.to_string();
                if text.chars().count() > 60 {
                    format!("{}...", text.chars().take(60).collect::<String>())
                } else {
                    text
                }
            }
        }
    }
}
