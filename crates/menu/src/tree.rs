//! Frozen menu tree with pre-order ids.

use std::collections::BTreeMap;
use std::fmt;

use sni_protocol::Value;

use crate::item::{ClickHandler, MenuItem};

/// One node of a built [`MenuTree`].
pub struct Node {
    id: i32,
    properties: BTreeMap<String, Value>,
    children: Vec<i32>,
    on_click: Option<ClickHandler>,
}

impl Node {
    pub fn id(&self) -> i32 {
        self.id
    }

    pub fn properties(&self) -> &BTreeMap<String, Value> {
        &self.properties
    }

    pub fn property(&self, name: &str) -> Option<&Value> {
        self.properties.get(name)
    }

    /// Ids of the direct children, in declaration order.
    pub fn children(&self) -> &[i32] {
        &self.children
    }

    pub fn has_click_handler(&self) -> bool {
        self.on_click.is_some()
    }

    /// Runs the click handler, returning whether one was registered.
    pub(crate) fn click(&self) -> bool {
        match &self.on_click {
            Some(handler) => {
                handler();
                true
            }
            None => false,
        }
    }
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Node")
            .field("id", &self.id)
            .field("properties", &self.properties)
            .field("children", &self.children)
            .field("on_click", &self.on_click.is_some())
            .finish()
    }
}

/// Deepest nesting a menu may have below its root.
pub const MAX_MENU_DEPTH: usize = 64;

/// An immutable menu hierarchy.
///
/// Nodes are stored in pre-order, so a node's id is also its index: the
/// id lookup used by event dispatch is a plain slice access.
#[derive(Debug)]
pub struct MenuTree {
    nodes: Vec<Node>,
}

impl MenuTree {
    pub(crate) fn from_root(root: MenuItem) -> Self {
        let mut nodes = Vec::new();
        assign(root, 0, &mut nodes);
        Self { nodes }
    }

    pub fn root(&self) -> &Node {
        &self.nodes[0]
    }

    /// Number of nodes, root included.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Always `false`: a tree holds at least its root.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn get(&self, id: i32) -> Option<&Node> {
        usize::try_from(id).ok().and_then(|idx| self.nodes.get(idx))
    }

    pub fn contains(&self, id: i32) -> bool {
        self.get(id).is_some()
    }

    /// Direct children of `node`, in declaration order.
    pub fn children<'a>(&'a self, node: &'a Node) -> impl Iterator<Item = &'a Node> + 'a {
        node.children.iter().filter_map(|id| self.get(*id))
    }

    /// Visits every node depth-first (node before its children, children
    /// left to right), passing the node's depth below the root.
    pub fn walk(&self, mut visit: impl FnMut(&Node, usize)) {
        let mut stack = vec![(self.root(), 0usize)];
        while let Some((node, depth)) = stack.pop() {
            visit(node, depth);
            for child in node.children.iter().rev().filter_map(|id| self.get(*id)) {
                stack.push((child, depth + 1));
            }
        }
    }

    /// All ids in visiting order.
    pub fn ids(&self) -> Vec<i32> {
        let mut ids = Vec::with_capacity(self.len());
        self.walk(|node, _| ids.push(node.id));
        ids
    }
}

/// Moves `item` and its subtree into `nodes`, numbering in pre-order.
///
/// Recursion is bounded by [`MAX_MENU_DEPTH`], which also bounds every later
/// walk over the layout.
fn assign(item: MenuItem, depth: usize, nodes: &mut Vec<Node>) -> i32 {
    if depth > MAX_MENU_DEPTH {
        panic!("menu nests deeper than {MAX_MENU_DEPTH} levels");
    }
    let MenuItem {
        properties,
        children,
        on_click,
    } = item;

    // dbusmenu ids are int32.
    let idx = nodes.len();
    let id = i32::try_from(idx)
        .unwrap_or_else(|_| panic!("menu has more than {} items", i32::MAX));
    nodes.push(Node {
        id,
        properties,
        children: Vec::with_capacity(children.len()),
        on_click,
    });

    for child in children {
        let child_id = assign(child, depth + 1, nodes);
        nodes[idx].children.push(child_id);
    }
    id
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    fn nested() -> MenuItem {
        // 0
        // ├── 1
        // │   ├── 2
        // │   └── 3
        // │       └── 4
        // ├── 5
        // └── 6
        //     └── 7
        MenuItem::new().submenu([
            MenuItem::new().label("a").submenu([
                MenuItem::new().label("a.1"),
                MenuItem::new()
                    .label("a.2")
                    .submenu([MenuItem::new().label("a.2.i")]),
            ]),
            MenuItem::new().label("b"),
            MenuItem::new()
                .label("c")
                .submenu([MenuItem::new().label("c.1")]),
        ])
    }

    fn label(tree: &MenuTree, id: i32) -> &str {
        tree.get(id)
            .and_then(|n| n.property("label"))
            .and_then(Value::as_str)
            .unwrap()
    }

    #[test]
    fn ids_are_preorder_and_contiguous() {
        let tree = nested().build();
        assert_eq!(tree.len(), 8);
        assert_eq!(tree.ids(), (0..8).collect::<Vec<_>>());

        assert_eq!(label(&tree, 1), "a");
        assert_eq!(label(&tree, 2), "a.1");
        assert_eq!(label(&tree, 3), "a.2");
        assert_eq!(label(&tree, 4), "a.2.i");
        assert_eq!(label(&tree, 5), "b");
        assert_eq!(label(&tree, 6), "c");
        assert_eq!(label(&tree, 7), "c.1");
    }

    #[test]
    fn children_reference_assigned_ids() {
        let tree = nested().build();
        assert_eq!(tree.root().children(), &[1, 5, 6]);
        assert_eq!(tree.get(1).unwrap().children(), &[2, 3]);
        assert_eq!(tree.get(3).unwrap().children(), &[4]);
        assert!(tree.get(5).unwrap().children().is_empty());
    }

    #[test]
    fn every_node_id_matches_its_index() {
        let tree = nested().build();
        for id in 0..tree.len() as i32 {
            assert_eq!(tree.get(id).unwrap().id(), id);
        }
    }

    #[test]
    fn repeated_builds_assign_identical_ids() {
        let a = nested().build();
        let b = nested().build();
        let mut la = Vec::new();
        let mut lb = Vec::new();
        a.walk(|n, d| la.push((n.id(), d, n.properties().clone())));
        b.walk(|n, d| lb.push((n.id(), d, n.properties().clone())));
        assert_eq!(la, lb);
    }

    #[test]
    fn single_node_tree() {
        let tree = MenuItem::new().build();
        assert_eq!(tree.len(), 1);
        assert!(!tree.is_empty());
        assert_eq!(tree.root().id(), 0);
        assert!(tree.root().children().is_empty());
    }

    #[test]
    fn lookup_rejects_out_of_range() {
        let tree = nested().build();
        assert!(tree.contains(7));
        assert!(!tree.contains(8));
        assert!(!tree.contains(-1));
    }

    #[test]
    fn walk_reports_depth() {
        let tree = nested().build();
        let mut depths = Vec::new();
        tree.walk(|n, d| depths.push((n.id(), d)));
        assert_eq!(
            depths,
            vec![(0, 0), (1, 1), (2, 2), (3, 2), (4, 3), (5, 1), (6, 1), (7, 2)]
        );
    }

    #[test]
    fn handlers_move_into_nodes() {
        let hits = Arc::new(AtomicUsize::new(0));
        let h = Arc::clone(&hits);
        let tree = MenuItem::new()
            .submenu([MenuItem::new().label("Quit").on_click(move || {
                h.fetch_add(1, Ordering::SeqCst);
            })])
            .build();

        assert!(!tree.root().has_click_handler());
        let quit = tree.get(1).unwrap();
        assert!(quit.has_click_handler());
        assert!(quit.click());
        assert_eq!(hits.load(Ordering::SeqCst), 1);
        assert!(!tree.root().click());
    }

    fn chain(depth: usize) -> MenuItem {
        let mut item = MenuItem::new().label(format!("level {depth}"));
        for level in (0..depth).rev() {
            item = MenuItem::new().label(format!("level {level}")).child(item);
        }
        item
    }

    #[test]
    fn deepest_allowed_menu_builds() {
        let tree = chain(MAX_MENU_DEPTH).build();
        assert_eq!(tree.len(), MAX_MENU_DEPTH + 1);
        let mut deepest = 0;
        tree.walk(|_, d| deepest = deepest.max(d));
        assert_eq!(deepest, MAX_MENU_DEPTH);
        assert_eq!(tree.to_layout().node_count(), MAX_MENU_DEPTH + 1);
    }

    #[test]
    #[should_panic(expected = "nests deeper than")]
    fn overly_deep_menu_panics() {
        chain(MAX_MENU_DEPTH + 1).build();
    }
}
