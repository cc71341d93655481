//! Arena nodes and traversal

/// Compact node identifier (index into the arena)
pub type NodeId = u32;

/// An element in the arena
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    /// Qualified name, prefix included
    pub name: String,
    /// Parent element (None for the root)
    pub parent: Option<NodeId>,
    /// Child elements in source order
    pub children: Vec<NodeId>,
    /// 1-based position among same-named siblings
    pub sibling_index: u32,
}

/// A parsed content document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    pub(super) nodes: Vec<Element>,
}

impl Document {
    /// Root element id; a parsed document always has one
    pub fn root(&self) -> NodeId {
        0
    }

    pub fn get(&self, id: NodeId) -> Option<&Element> {
        self.nodes.get(id as usize)
    }

    pub fn name(&self, id: NodeId) -> Option<&str> {
        self.get(id).map(|e| e.name.as_str())
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.get(id).map(|e| e.children.as_slice()).unwrap_or(&[])
    }

    /// First child element of `id` with the given name
    pub fn find_child(&self, id: NodeId, name: &str) -> Option<NodeId> {
        self.children(id)
            .iter()
            .copied()
            .find(|&child| self.name(child) == Some(name))
    }

    /// Number of elements in the document
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Pre-order, depth-first walk of the elements below `id` (excluding `id`)
    pub fn descendants(&self, id: NodeId) -> Descendants<'_> {
        let mut stack: Vec<NodeId> = self.children(id).to_vec();
        stack.reverse();
        Descendants { doc: self, stack }
    }

    /// Absolute path of an element with explicit sibling indices
    ///
    /// e.g. `/html[1]/body[1]/div[2]/p[1]`
    pub fn path_of(&self, id: NodeId) -> Option<String> {
        let mut segments = Vec::new();
        let mut current = Some(id);
        while let Some(node_id) = current {
            let element = self.get(node_id)?;
            segments.push(format!("{}[{}]", element.name, element.sibling_index));
            current = element.parent;
        }

        let mut path = String::new();
        for segment in segments.iter().rev() {
            path.push('/');
            path.push_str(segment);
        }
        Some(path)
    }
}

/// Iterator returned by [`Document::descendants`]
pub struct Descendants<'a> {
    doc: &'a Document,
    stack: Vec<NodeId>,
}

impl Iterator for Descendants<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.stack.pop()?;
        self.stack
            .extend(self.doc.children(id).iter().rev().copied());
        Some(id)
    }
}
