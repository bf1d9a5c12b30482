//! Preview DOM model and selection resolution.

use serde::{Deserialize, Serialize};

/// Attribute the backend is asked to put on every generated element.
pub const AETHER_ID_ATTR: &str = "data-aether-id";

/// Index of a node inside a [`PreviewDom`].
pub type NodeId = usize;

/// Index of the preview root container.
pub const ROOT: NodeId = 0;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DomNode {
    pub tag: String,
    pub attributes: Vec<(String, String)>,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
    /// Set by [`PreviewDom::apply_highlight`].
    pub highlighted: bool,
}

impl DomNode {
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn aether_id(&self) -> Option<&str> {
        self.attribute(AETHER_ID_ATTR)
    }
}

/// Arena of rendered preview elements rooted at the preview container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreviewDom {
    nodes: Vec<DomNode>,
}

impl PreviewDom {
    /// Creates a DOM holding only the preview root.
    pub fn new() -> Self {
        Self {
            nodes: vec![DomNode {
                tag: "preview-root".to_string(),
                attributes: Vec::new(),
                parent: None,
                children: Vec::new(),
                highlighted: false,
            }],
        }
    }

    /// Appends an element under `parent`, returning its id.
    ///
    /// An unknown parent attaches the element to the root.
    pub fn append_child(
        &mut self,
        parent: NodeId,
        tag: impl Into<String>,
        attributes: Vec<(String, String)>,
    ) -> NodeId {
        let parent = if parent < self.nodes.len() { parent } else { ROOT };
        let id = self.nodes.len();
        self.nodes.push(DomNode {
            tag: tag.into(),
            attributes,
            parent: Some(parent),
            children: Vec::new(),
            highlighted: false,
        });
        self.nodes[parent].children.push(id);
        id
    }

    pub fn node(&self, id: NodeId) -> Option<&DomNode> {
        self.nodes.get(id)
    }

    /// All nodes in document order, root first.
    pub fn nodes(&self) -> &[DomNode] {
        &self.nodes
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// True when only the root exists.
    pub fn is_empty(&self) -> bool {
        self.nodes.len() <= 1
    }

    /// Resolves a click on `target` to the nearest tagged element.
    ///
    /// Walks from the target through its ancestors and returns the first
    /// `data-aether-id` found. Reaching the preview root yields `None`.
    pub fn resolve_selection(&self, target: NodeId) -> Option<String> {
        let mut current = Some(target);
        while let Some(id) = current {
            if id == ROOT {
                return None;
            }
            let node = self.nodes.get(id)?;
            if let Some(aether_id) = node.aether_id() {
                return Some(aether_id.to_string());
            }
            current = node.parent;
        }
        None
    }

    /// Marks exactly the elements whose id equals `selected` and clears the
    /// mark everywhere else. Returns how many elements are marked.
    pub fn apply_highlight(&mut self, selected: Option<&str>) -> usize {
        let mut marked = 0;
        for node in &mut self.nodes {
            node.highlighted = selected.is_some() && node.aether_id() == selected;
            if node.highlighted {
                marked += 1;
            }
        }
        marked
    }

    /// Ids of the currently highlighted nodes.
    pub fn highlighted(&self) -> Vec<NodeId> {
        self.nodes
            .iter()
            .enumerate()
            .filter(|(_, node)| node.highlighted)
            .map(|(id, _)| id)
            .collect()
    }
}

impl Default for PreviewDom {
    fn default() -> Self {
        Self::new()
    }
}
