//! HTML parsing into an index-addressed page tree
//!
//! The scraper DOM is flattened into a [`PageTree`]: an arena of element and
//! text nodes in document (pre-order) order. Every node knows its parent's
//! index and where its subtree ends, so traversal can detect ascension with an
//! index comparison and skip a subtree with a single jump.
//!
//! Comments, doctypes and processing instructions are dropped.

use ego_tree::iter::Edge;
use scraper::{Html, Node};
use thiserror::Error;

/// Index of a node in a [`PageTree`]
pub type NodeIdx = usize;

/// Reasons a fetched body could not be turned into a page tree
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("response body is empty")]
    Empty,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    Element {
        /// Lower-cased tag name
        tag: String,
        attrs: Vec<(String, String)>,
    },
    Text(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageNode {
    /// `None` for top-level nodes
    pub parent: Option<NodeIdx>,
    /// One past the last node of this node's subtree
    pub subtree_end: NodeIdx,
    pub kind: NodeKind,
}

impl PageNode {
    pub fn tag(&self) -> Option<&str> {
        match &self.kind {
            NodeKind::Element { tag, .. } => Some(tag),
            NodeKind::Text(_) => None,
        }
    }

    /// Attribute value, `None` if missing or if this is a text node
    pub fn attr(&self, name: &str) -> Option<&str> {
        match &self.kind {
            NodeKind::Element { attrs, .. } => attrs
                .iter()
                .find(|(key, _)| key == name)
                .map(|(_, value)| value.as_str()),
            NodeKind::Text(_) => None,
        }
    }
}

/// A parsed page stored as a pre-order arena
#[derive(Debug, Clone, Default)]
pub struct PageTree {
    nodes: Vec<PageNode>,
}

impl PageTree {
    /// Parses markup. html5ever recovers from malformed input, so this never fails.
    pub fn from_html(html: &str) -> Self {
        let document = Html::parse_document(html);
        let mut nodes: Vec<PageNode> = Vec::new();
        let mut open: Vec<NodeIdx> = Vec::new();

        for edge in document.tree.root().traverse() {
            match edge {
                Edge::Open(node) => match node.value() {
                    Node::Element(element) => {
                        let idx = nodes.len();
                        nodes.push(PageNode {
                            parent: open.last().copied(),
                            subtree_end: idx + 1,
                            kind: NodeKind::Element {
                                tag: element.name().to_ascii_lowercase(),
                                attrs: element
                                    .attrs()
                                    .map(|(key, value)| (key.to_string(), value.to_string()))
                                    .collect(),
                            },
                        });
                        open.push(idx);
                    }
                    Node::Text(text) => {
                        let idx = nodes.len();
                        nodes.push(PageNode {
                            parent: open.last().copied(),
                            subtree_end: idx + 1,
                            kind: NodeKind::Text(text.to_string()),
                        });
                    }
                    _ => {}
                },
                Edge::Close(node) => {
                    if node.value().is_element() {
                        if let Some(idx) = open.pop() {
                            nodes[idx].subtree_end = nodes.len();
                        }
                    }
                }
            }
        }

        Self { nodes }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(&self, idx: NodeIdx) -> Option<&PageNode> {
        self.nodes.get(idx)
    }

    pub fn nodes(&self) -> &[PageNode] {
        &self.nodes
    }

    /// Direct children of `idx`, in document order
    pub fn children(&self, idx: NodeIdx) -> impl Iterator<Item = NodeIdx> + '_ {
        let end = self.nodes.get(idx).map_or(idx, |node| node.subtree_end);
        let mut next = idx + 1;
        std::iter::from_fn(move || {
            if next >= end {
                return None;
            }
            let child = next;
            next = self.nodes[child].subtree_end;
            Some(child)
        })
    }

    /// Text of every descendant text node of `idx`, joined by single spaces
    /// and trimmed
    pub fn text_content(&self, idx: NodeIdx) -> String {
        let Some(node) = self.nodes.get(idx) else {
            return String::new();
        };

        let pieces: Vec<&str> = self.nodes[idx..node.subtree_end]
            .iter()
            .filter_map(|node| match &node.kind {
                NodeKind::Text(text) => Some(text.as_str()),
                NodeKind::Element { .. } => None,
            })
            .collect();

        pieces.join(" ").trim().to_string()
    }
}

/// Turns a decoded body into a page tree
///
/// Markup errors are recovered from, so an empty body is the only failure.
pub fn parse_document(body: &str) -> Result<PageTree, ParseError> {
    if body.is_empty() {
        return Err(ParseError::Empty);
    }

    Ok(PageTree::from_html(body))
}
