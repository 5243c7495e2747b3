//! Tree module: the navigation capability steps need from a parsed input.
//!
//! Any parse tree can be walked by implementing [`TreeNode`] for a cheap node handle. This module
//! also provides [`ParseTree`], an arena-backed tree with [`NodeRef`] handles, for callers that
//! do not bring their own.

use crate::WalkError;
use serde::{Deserialize, Serialize};

/// A read-only handle on a node of a parsed input.
///
/// Handles are cloned freely while walking, so implementations should be cheap to clone (a
/// reference or an index).
pub trait TreeNode: Clone {
    /// The grammar rule (or element) name of this node, used by Down's name filter.
    fn name(&self) -> &str;
    /// The full text this node covers.
    fn text(&self) -> &str;
    fn parent(&self) -> Option<Self>;
    fn children(&self) -> Vec<Self>;
    fn following_sibling(&self) -> Option<Self>;
    fn preceding_sibling(&self) -> Option<Self>;
}

/// Index of a node inside a [`ParseTree`].
pub type NodeId = usize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct NodeData {
    name: String,
    text: String,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

/// An immutable tree of named, text-carrying nodes stored in a single arena.
///
/// Node 0 is the root. Deserialization checks that the tree has a root and that every parent
/// and child link points at an existing node and is mirrored on the other side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawParseTree")]
pub struct ParseTree {
    nodes: Vec<NodeData>,
}

#[derive(Deserialize)]
struct RawParseTree {
    nodes: Vec<NodeData>,
}

impl TryFrom<RawParseTree> for ParseTree {
    type Error = WalkError;

    fn try_from(raw: RawParseTree) -> Result<Self, Self::Error> {
        let nodes = raw.nodes;
        let root = nodes
            .first()
            .ok_or_else(|| WalkError::InvalidTree("no root node".to_string()))?;
        if root.parent.is_some() {
            return Err(WalkError::InvalidTree("root node has a parent".to_string()));
        }
        for (id, node) in nodes.iter().enumerate() {
            for &child in &node.children {
                let linked = nodes.get(child).is_some_and(|c| c.parent == Some(id));
                if !linked {
                    return Err(WalkError::InvalidTree(format!("node {} has a dangling child {}", id, child)));
                }
            }
            if id == 0 {
                continue;
            }
            let linked = node
                .parent
                .and_then(|parent| nodes.get(parent))
                .is_some_and(|p| p.children.contains(&id));
            if !linked {
                return Err(WalkError::InvalidTree(format!("node {} is not linked to a parent", id)));
            }
        }
        Ok(Self { nodes })
    }
}

impl ParseTree {
    pub fn root(&self) -> NodeRef<'_> {
        NodeRef { tree: self, id: 0 }
    }

    pub fn node(&self, id: NodeId) -> Option<NodeRef<'_>> {
        (id < self.nodes.len()).then_some(NodeRef { tree: self, id })
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

/// A borrowed handle on one node of a [`ParseTree`].
#[derive(Debug, Clone, Copy)]
pub struct NodeRef<'a> {
    tree: &'a ParseTree,
    id: NodeId,
}

impl<'a> NodeRef<'a> {
    pub fn id(&self) -> NodeId {
        self.id
    }

    fn data(&self) -> &'a NodeData {
        &self.tree.nodes[self.id]
    }

    fn sibling(&self, offset: isize) -> Option<Self> {
        let parent = self.data().parent?;
        let siblings = &self.tree.nodes[parent].children;
        let position = siblings.iter().position(|&c| c == self.id)?;
        let target = position.checked_add_signed(offset)?;
        siblings.get(target).map(|&id| NodeRef { tree: self.tree, id })
    }
}

impl PartialEq for NodeRef<'_> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.tree, other.tree) && self.id == other.id
    }
}

impl Eq for NodeRef<'_> {}

impl<'a> TreeNode for NodeRef<'a> {
    fn name(&self) -> &str {
        &self.data().name
    }

    fn text(&self) -> &str {
        &self.data().text
    }

    fn parent(&self) -> Option<Self> {
        self.data().parent.map(|id| NodeRef { tree: self.tree, id })
    }

    fn children(&self) -> Vec<Self> {
        self.data()
            .children
            .iter()
            .map(|&id| NodeRef { tree: self.tree, id })
            .collect()
    }

    fn following_sibling(&self) -> Option<Self> {
        self.sibling(1)
    }

    fn preceding_sibling(&self) -> Option<Self> {
        self.sibling(-1)
    }
}

/// Builds a [`ParseTree`] top-down. The first node opened is the root.
///
/// ```
/// use treewalk::{ParseTreeBuilder, TreeNode};
///
/// let mut builder = ParseTreeBuilder::new("agent", "Mozilla/5.0 (X11)");
/// let product = builder.child(0, "product", "Mozilla/5.0");
/// builder.child(product, "name", "Mozilla");
/// builder.child(product, "version", "5.0");
/// let tree = builder.build();
/// assert_eq!(tree.root().children()[0].text(), "Mozilla/5.0");
/// ```
#[derive(Debug)]
pub struct ParseTreeBuilder {
    nodes: Vec<NodeData>,
}

impl ParseTreeBuilder {
    pub fn new(root_name: impl Into<String>, root_text: impl Into<String>) -> Self {
        Self {
            nodes: vec![NodeData {
                name: root_name.into(),
                text: root_text.into(),
                parent: None,
                children: Vec::new(),
            }],
        }
    }

    /// Appends a child under `parent` and returns its id. Children keep insertion order.
    ///
    /// # Panics
    /// If `parent` is not an id returned by this builder.
    pub fn child(&mut self, parent: NodeId, name: impl Into<String>, text: impl Into<String>) -> NodeId {
        let id = self.nodes.len();
        self.nodes[parent].children.push(id);
        self.nodes.push(NodeData {
            name: name.into(),
            text: text.into(),
            parent: Some(parent),
            children: Vec::new(),
        });
        id
    }

    pub fn build(self) -> ParseTree {
        ParseTree { nodes: self.nodes }
    }
}
