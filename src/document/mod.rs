//! Format-neutral content model.
//!
//! Decoders turn a document into a flat sequence of [`ContentNode`]s pulled
//! one at a time through [`ContentSource`]. Renderers consume that sequence
//! without knowing which format produced it.

mod node;

pub use node::{Cell, ContentNode, Image, Paragraph, Table};

use std::collections::VecDeque;

use crate::common::Result;

/// A pull-based producer of content nodes.
///
/// `Ok(None)` marks the end of content. After an error a source is not
/// expected to recover.
pub trait ContentSource {
    fn next_node(&mut self) -> Result<Option<ContentNode>>;
}

impl<T: ContentSource + ?Sized> ContentSource for &mut T {
    fn next_node(&mut self) -> Result<Option<ContentNode>> {
        (**self).next_node()
    }
}

impl<T: ContentSource + ?Sized> ContentSource for Box<T> {
    fn next_node(&mut self) -> Result<Option<ContentNode>> {
        (**self).next_node()
    }
}

/// A content source over nodes that are already in memory.
///
/// # Examples
///
/// ```
/// use hwptext::document::{ContentNode, ContentSource, NodeList, Paragraph};
///
/// let mut nodes = NodeList::from(vec![ContentNode::from(Paragraph::new("hi"))]);
/// assert!(nodes.next_node()?.is_some());
/// assert!(nodes.next_node()?.is_none());
/// # Ok::<(), hwptext::Error>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct NodeList {
    nodes: VecDeque<ContentNode>,
}

impl NodeList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, node: impl Into<ContentNode>) {
        self.nodes.push_back(node.into());
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Drain any source into memory.
    pub fn collect_from<S: ContentSource>(mut source: S) -> Result<Self> {
        let mut list = NodeList::new();
        while let Some(node) = source.next_node()? {
            list.nodes.push_back(node);
        }
        Ok(list)
    }

    pub fn into_vec(self) -> Vec<ContentNode> {
        self.nodes.into()
    }
}

impl From<Vec<ContentNode>> for NodeList {
    fn from(nodes: Vec<ContentNode>) -> Self {
        Self {
            nodes: nodes.into(),
        }
    }
}

impl ContentSource for NodeList {
    fn next_node(&mut self) -> Result<Option<ContentNode>> {
        Ok(self.nodes.pop_front())
    }
}
