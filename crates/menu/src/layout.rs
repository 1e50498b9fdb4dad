//! Recursive `(ia{sv}av)` layout produced from a [`MenuTree`].

use std::collections::BTreeMap;

use serde::Serialize;
use sni_protocol::Value;

use crate::MenuError;
use crate::tree::{MenuTree, Node};

/// `recursionDepth` value meaning "no limit".
pub const UNLIMITED_DEPTH: i32 = -1;

/// One node of a menu layout, with its children inlined.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Layout {
    pub id: i32,
    pub properties: BTreeMap<String, Value>,
    pub children: Vec<Layout>,
}

impl Layout {
    /// Total number of nodes in this layout, itself included.
    pub fn node_count(&self) -> usize {
        1 + self.children.iter().map(Layout::node_count).sum::<usize>()
    }
}

impl MenuTree {
    /// Full layout from the root with every property.
    pub fn to_layout(&self) -> Layout {
        layout_of(self, self.root(), UNLIMITED_DEPTH, &[])
    }

    /// Layout rooted at `parent_id`.
    ///
    /// `recursion_depth` limits how many levels of children are included
    /// (`0` = the parent alone, any negative value = unlimited). A non-empty
    /// `property_names` keeps only those properties on every node.
    pub fn layout(
        &self,
        parent_id: i32,
        recursion_depth: i32,
        property_names: &[String],
    ) -> Result<Layout, MenuError> {
        let parent = self.get(parent_id).ok_or(MenuError::UnknownId(parent_id))?;
        Ok(layout_of(self, parent, recursion_depth, property_names))
    }
}

fn layout_of(tree: &MenuTree, node: &Node, depth: i32, names: &[String]) -> Layout {
    let children = if depth == 0 {
        Vec::new()
    } else {
        let next = if depth < 0 { depth } else { depth - 1 };
        tree.children(node)
            .map(|child| layout_of(tree, child, next, names))
            .collect()
    };

    Layout {
        id: node.id(),
        properties: filter_properties(node.properties(), names),
        children,
    }
}

/// Copies the properties named in `names`, or all of them if `names` is empty.
pub(crate) fn filter_properties(
    properties: &BTreeMap<String, Value>,
    names: &[String],
) -> BTreeMap<String, Value> {
    if names.is_empty() {
        return properties.clone();
    }
    properties
        .iter()
        .filter(|(name, _)| names.iter().any(|n| n == *name))
        .map(|(name, value)| (name.clone(), value.clone()))
        .collect()
}
