//! Emphasis-weighted page traversal
//!
//! Walks a [`PageTree`] once in document order, keeping an explicit stack of
//! open elements. Entering an element fires its handler; leaving it fires the
//! inverse. Text is tokenized at the emphasis weight in effect at that point.
//! Subtrees of non-content elements (scripts, styles, embeds, frames, ...)
//! are skipped without firing any handler.
//!
//! Traversal touches no shared state: everything it learns is collected into
//! a [`PageScan`] that the caller publishes afterwards.

use crate::crawler::parser::{NodeIdx, NodeKind, PageTree};
use crate::index::tokenize;
use crate::url::resolve;

/// Elements whose subtrees carry no indexable content
const IGNORED_TAGS: &[&str] = &[
    "meta", "script", "link", "embed", "iframe", "frame", "noscript", "object", "svg", "canvas",
    "applet", "frameset", "textarea", "style", "area", "map", "base", "basefont", "param",
];

const TITLE_WEIGHT: i32 = 7;

/// Everything learned from one page
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageScan {
    /// Flattened text of the last title element seen
    pub title: Option<String>,
    /// Surviving tokens in document order with their emphasis weight
    pub tokens: Vec<(String, i32)>,
    /// Resolved anchor targets in document order, duplicates kept
    pub links: Vec<String>,
}

/// What entering (and leaving) an element does
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Handler {
    Noop,
    Emphasis(i32),
    Title,
    Anchor,
}

impl Handler {
    pub fn for_tag(tag: &str) -> Self {
        match tag {
            "b" | "strong" => Self::Emphasis(2),
            "i" | "em" => Self::Emphasis(1),
            "h1" => Self::Emphasis(7),
            "h2" => Self::Emphasis(6),
            "h3" => Self::Emphasis(5),
            "h4" => Self::Emphasis(4),
            "h5" => Self::Emphasis(3),
            "title" => Self::Title,
            "a" => Self::Anchor,
            _ => Self::Noop,
        }
    }

    /// Change in emphasis weight on entry; exit applies the negation
    pub fn weight_delta(&self) -> i32 {
        match self {
            Self::Emphasis(delta) => *delta,
            Self::Title => TITLE_WEIGHT,
            Self::Noop | Self::Anchor => 0,
        }
    }
}

pub fn is_ignored(tag: &str) -> bool {
    IGNORED_TAGS.contains(&tag)
}

struct Session<'a> {
    tree: &'a PageTree,
    page_url: &'a str,
    weight: i32,
    scan: PageScan,
}

impl<'a> Session<'a> {
    fn enter(&mut self, idx: NodeIdx, tag: &str) {
        let handler = Handler::for_tag(tag);
        self.weight += handler.weight_delta();

        match handler {
            Handler::Title => {
                self.scan.title = Some(self.tree.text_content(idx));
            }
            Handler::Anchor => {
                // A missing href reads as "" and links the page to itself
                let href = self
                    .tree
                    .node(idx)
                    .and_then(|node| node.attr("href"))
                    .unwrap_or("");
                self.scan.links.push(resolve(self.page_url, href));
            }
            Handler::Noop | Handler::Emphasis(_) => {}
        }
    }

    fn exit(&mut self, idx: NodeIdx) {
        if let Some(tag) = self.tree.node(idx).and_then(|node| node.tag()) {
            self.weight -= Handler::for_tag(tag).weight_delta();
        }
    }

    fn text(&mut self, text: &str) {
        let weight = self.weight;
        self.scan
            .tokens
            .extend(tokenize(text).map(|word| (word, weight)));
    }
}

/// Traverses `tree`, resolving anchors against `page_url`
pub fn scan_page(tree: &PageTree, page_url: &str) -> PageScan {
    let mut session = Session {
        tree,
        page_url,
        weight: 0,
        scan: PageScan::default(),
    };

    // `None` is the sentinel root every top-level node hangs off
    let mut stack: Vec<Option<NodeIdx>> = vec![None];
    let nodes = tree.nodes();
    let mut idx = 0;

    while idx < nodes.len() {
        let node = &nodes[idx];

        while let Some(&top) = stack.last() {
            if top == node.parent {
                break;
            }
            stack.pop();
            if let Some(open) = top {
                session.exit(open);
            }
        }

        match &node.kind {
            NodeKind::Element { tag, .. } => {
                if is_ignored(tag) {
                    tracing::trace!(tag = tag.as_str(), "Skipping subtree");
                    idx = node.subtree_end;
                    continue;
                }
                session.enter(idx, tag);
                stack.push(Some(idx));
            }
            NodeKind::Text(text) => session.text(text),
        }

        idx += 1;
    }

    while let Some(top) = stack.pop() {
        if let Some(open) = top {
            session.exit(open);
        }
    }
    debug_assert_eq!(session.weight, 0);

    session.scan
}
