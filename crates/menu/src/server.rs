//! `com.canonical.dbusmenu` method implementations over a [`MenuTree`].

use std::collections::BTreeMap;

use sni_protocol::constants::LAYOUT_REVISION;
use sni_protocol::{MenuEvent, Value};
use tracing::debug;

use crate::MenuError;
use crate::layout::{Layout, filter_properties};
use crate::tree::MenuTree;

/// One entry of an `EventGroup` call: `(isvu)` on the wire.
#[derive(Debug, Clone, PartialEq)]
pub struct EventRequest {
    pub id: i32,
    pub event_id: String,
    pub data: Value,
    pub timestamp: u32,
}

impl EventRequest {
    pub fn clicked(id: i32) -> Self {
        Self {
            id,
            event_id: MenuEvent::Clicked.as_str().to_string(),
            data: Value::from(""),
            timestamp: 0,
        }
    }
}

/// Serves the dbusmenu interface for one frozen tree.
///
/// All methods run synchronously on the caller's context; click handlers
/// are invoked inline.
#[derive(Debug)]
pub struct MenuServer {
    tree: MenuTree,
}

impl MenuServer {
    pub fn new(tree: MenuTree) -> Self {
        Self { tree }
    }

    pub fn tree(&self) -> &MenuTree {
        &self.tree
    }

    /// `GetLayout(parentId, recursionDepth, propertyNames) -> (revision, layout)`.
    pub fn get_layout(
        &self,
        parent_id: i32,
        recursion_depth: i32,
        property_names: &[String],
    ) -> Result<(u32, Layout), MenuError> {
        debug!(
            parent_id,
            recursion_depth,
            ?property_names,
            "GetLayout"
        );
        let layout = self
            .tree
            .layout(parent_id, recursion_depth, property_names)?;
        Ok((LAYOUT_REVISION, layout))
    }

    /// `GetGroupProperties(ids, propertyNames)`.
    ///
    /// An empty `ids` selects every node. Unknown ids are skipped.
    pub fn get_group_properties(
        &self,
        ids: &[i32],
        property_names: &[String],
    ) -> Vec<(i32, BTreeMap<String, Value>)> {
        debug!(?ids, ?property_names, "GetGroupProperties");
        let selected: Vec<i32> = if ids.is_empty() {
            self.tree.ids()
        } else {
            ids.to_vec()
        };
        selected
            .into_iter()
            .filter_map(|id| self.tree.get(id))
            .map(|node| {
                (
                    node.id(),
                    filter_properties(node.properties(), property_names),
                )
            })
            .collect()
    }

    /// `GetProperty(id, name)`.
    pub fn get_property(&self, id: i32, name: &str) -> Result<Value, MenuError> {
        debug!(id, property = name, "GetProperty");
        let node = self.tree.get(id).ok_or(MenuError::UnknownId(id))?;
        node.property(name)
            .cloned()
            .ok_or_else(|| MenuError::UnknownProperty {
                id,
                name: name.to_string(),
            })
    }

    /// `Event(id, eventId, data, timestamp)`.
    ///
    /// Runs the node's click handler for `clicked`. Unknown ids and other
    /// event ids are ignored. Returns whether a handler ran.
    pub fn event(&self, id: i32, event_id: &str, data: &Value, timestamp: u32) -> bool {
        debug!(id, event_id, ?data, timestamp, "Event");
        let Some(node) = self.tree.get(id) else {
            debug!(id, "event for unknown menu id ignored");
            return false;
        };
        match event_id.parse::<MenuEvent>() {
            Ok(MenuEvent::Clicked) => node.click(),
            Ok(_) => false,
            Err(_) => {
                debug!(id, event_id, "unrecognized menu event ignored");
                false
            }
        }
    }

    /// `EventGroup(events) -> idErrors`.
    ///
    /// Dispatches each event in order and returns the ids not in the tree.
    pub fn event_group(&self, events: &[EventRequest]) -> Vec<i32> {
        debug!(count = events.len(), "EventGroup");
        let mut id_errors = Vec::new();
        for ev in events {
            if !self.tree.contains(ev.id) {
                id_errors.push(ev.id);
                continue;
            }
            self.event(ev.id, &ev.event_id, &ev.data, ev.timestamp);
        }
        id_errors
    }

    /// `AboutToShow(id) -> needUpdate`. The tree is frozen, so never.
    pub fn about_to_show(&self, id: i32) -> bool {
        debug!(id, "AboutToShow");
        false
    }

    /// `AboutToShowGroup(ids) -> (updatesNeeded, idErrors)`.
    pub fn about_to_show_group(&self, ids: &[i32]) -> (Vec<i32>, Vec<i32>) {
        debug!(?ids, "AboutToShowGroup");
        let id_errors = ids
            .iter()
            .copied()
            .filter(|id| !self.tree.contains(*id))
            .collect();
        (Vec::new(), id_errors)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::MenuItem;

    fn counting_server() -> (MenuServer, Arc<AtomicUsize>, Arc<AtomicUsize>) {
        let first = Arc::new(AtomicUsize::new(0));
        let second = Arc::new(AtomicUsize::new(0));
        let f = Arc::clone(&first);
        let s = Arc::clone(&second);
        let tree = MenuItem::new()
            .submenu([
                MenuItem::new()
                    .label("Button 1")
                    .icon_name("emblem-default")
                    .on_click(move || {
                        f.fetch_add(1, Ordering::SeqCst);
                    }),
                MenuItem::new().separator(true),
                MenuItem::new()
                    .label("Button 2")
                    .icon_name("help-about")
                    .on_click(move || {
                        s.fetch_add(1, Ordering::SeqCst);
                    }),
            ])
            .build();
        (MenuServer::new(tree), first, second)
    }

    #[test]
    fn clicked_invokes_handler_once() {
        let (server, first, second) = counting_server();
        assert!(server.event(1, "clicked", &Value::from(""), 0));
        assert_eq!(first.load(Ordering::SeqCst), 1);
        assert_eq!(second.load(Ordering::SeqCst), 0);

        assert!(server.event(3, "clicked", &Value::Int32(0), 12));
        assert_eq!(first.load(Ordering::SeqCst), 1);
        assert_eq!(second.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn unknown_id_is_noop() {
        let (server, first, second) = counting_server();
        assert!(!server.event(99, "clicked", &Value::from(""), 0));
        assert!(!server.event(-1, "clicked", &Value::from(""), 0));
        assert_eq!(first.load(Ordering::SeqCst), 0);
        assert_eq!(second.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn other_events_do_not_click() {
        let (server, first, _) = counting_server();
        assert!(!server.event(1, "hovered", &Value::from(""), 0));
        assert!(!server.event(1, "opened", &Value::from(""), 0));
        assert!(!server.event(1, "bogus", &Value::from(""), 0));
        assert_eq!(first.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn node_without_handler_is_noop() {
        let (server, _, _) = counting_server();
        assert!(!server.event(2, "clicked", &Value::from(""), 0));
    }

    #[test]
    fn event_group_reports_unknown_ids() {
        let (server, first, second) = counting_server();
        let errors = server.event_group(&[
            EventRequest::clicked(1),
            EventRequest::clicked(17),
            EventRequest::clicked(3),
            EventRequest::clicked(1),
        ]);
        assert_eq!(errors, vec![17]);
        assert_eq!(first.load(Ordering::SeqCst), 2);
        assert_eq!(second.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn get_layout_returns_revision_and_tree() {
        let (server, _, _) = counting_server();
        let (revision, layout) = server.get_layout(0, -1, &[]).unwrap();
        assert_eq!(revision, LAYOUT_REVISION);
        assert_eq!(layout, server.tree().to_layout());
        assert_eq!(
            server.get_layout(5, -1, &[]).unwrap_err(),
            MenuError::UnknownId(5)
        );
    }

    #[test]
    fn group_properties_filter_and_skip() {
        let (server, _, _) = counting_server();
        let names = vec!["icon-name".to_string()];
        let props = server.get_group_properties(&[3, 9, 1], &names);
        assert_eq!(props.len(), 2);
        assert_eq!(props[0].0, 3);
        assert_eq!(props[0].1["icon-name"], Value::from("help-about"));
        assert!(!props[0].1.contains_key("label"));
        assert_eq!(props[1].0, 1);
    }

    #[test]
    fn group_properties_empty_ids_selects_all() {
        let (server, _, _) = counting_server();
        let props = server.get_group_properties(&[], &[]);
        let ids: Vec<i32> = props.iter().map(|(id, _)| *id).collect();
        assert_eq!(ids, vec![0, 1, 2, 3]);
        assert_eq!(props[2].1["type"], Value::from("separator"));
    }

    #[test]
    fn get_property_errors() {
        let (server, _, _) = counting_server();
        assert_eq!(
            server.get_property(1, "label").unwrap(),
            Value::from("Button 1")
        );
        assert_eq!(
            server.get_property(1, "toggle-state").unwrap_err(),
            MenuError::UnknownProperty {
                id: 1,
                name: "toggle-state".into()
            }
        );
        assert_eq!(
            server.get_property(40, "label").unwrap_err(),
            MenuError::UnknownId(40)
        );
    }

    #[test]
    fn about_to_show_never_needs_update() {
        let (server, _, _) = counting_server();
        assert!(!server.about_to_show(0));
        assert!(!server.about_to_show(3));

        let (updates, errors) = server.about_to_show_group(&[0, 1, 8, -2]);
        assert!(updates.is_empty());
        assert_eq!(errors, vec![8, -2]);
    }
}
