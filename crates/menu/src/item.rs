//! Menu item builder.

use std::collections::BTreeMap;
use std::fmt;

use sni_protocol::constants::node_prop;
use sni_protocol::{Disposition, ToggleType, Value};

use crate::tree::MenuTree;

/// Callback invoked when a node receives a `clicked` event.
///
/// Runs on whatever context the transport delivers the call on, so it must
/// not block.
pub type ClickHandler = Box<dyn Fn() + Send + Sync>;

/// A menu item under construction.
///
/// Items are assembled by value and turned into an immutable [`MenuTree`]
/// with [`MenuItem::build`]; the root item itself is never displayed, its
/// children form the visible menu.
#[derive(Default)]
pub struct MenuItem {
    pub(crate) properties: BTreeMap<String, Value>,
    pub(crate) children: Vec<MenuItem>,
    pub(crate) on_click: Option<ClickHandler>,
}

impl MenuItem {
    pub fn new() -> Self {
        Self::default()
    }

    /// Text shown for the item.
    pub fn label(self, label: impl Into<String>) -> Self {
        self.property(node_prop::LABEL, label.into())
    }

    /// Turns the item into a separator when `separator` is `true`.
    pub fn separator(self, separator: bool) -> Self {
        if separator {
            self.property(node_prop::TYPE, node_prop::TYPE_SEPARATOR)
        } else {
            self
        }
    }

    /// Whether the item can be activated.
    pub fn enabled(self, enabled: bool) -> Self {
        self.property(node_prop::ENABLED, enabled)
    }

    pub fn visible(self, visible: bool) -> Self {
        self.property(node_prop::VISIBLE, visible)
    }

    /// Freedesktop icon name.
    pub fn icon_name(self, name: impl Into<String>) -> Self {
        self.property(node_prop::ICON_NAME, name.into())
    }

    /// PNG-encoded icon.
    pub fn icon_data(self, png: Vec<u8>) -> Self {
        self.property(node_prop::ICON_DATA, png)
    }

    /// Key combinations, e.g. `[["Control", "q"]]`.
    pub fn shortcut(self, shortcut: Vec<Vec<String>>) -> Self {
        self.property(node_prop::SHORTCUT, shortcut)
    }

    pub fn toggle_type(self, toggle: ToggleType) -> Self {
        self.property(node_prop::TOGGLE_TYPE, toggle.as_str())
    }

    pub fn toggle_state(self, on: bool) -> Self {
        self.property(node_prop::TOGGLE_STATE, i32::from(on))
    }

    pub fn disposition(self, disposition: Disposition) -> Self {
        self.property(node_prop::DISPOSITION, disposition.as_str())
    }

    /// Replaces the children and marks the item as a submenu.
    pub fn submenu(mut self, children: impl IntoIterator<Item = MenuItem>) -> Self {
        self.children = children.into_iter().collect();
        self.property(
            node_prop::CHILDREN_DISPLAY,
            node_prop::CHILDREN_DISPLAY_SUBMENU,
        )
    }

    /// Appends one child and marks the item as a submenu.
    pub fn child(mut self, child: MenuItem) -> Self {
        self.children.push(child);
        self.property(
            node_prop::CHILDREN_DISPLAY,
            node_prop::CHILDREN_DISPLAY_SUBMENU,
        )
    }

    pub fn on_click(mut self, handler: impl Fn() + Send + Sync + 'static) -> Self {
        self.on_click = Some(Box::new(handler));
        self
    }

    /// Sets an arbitrary node property.
    pub fn property(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.properties.insert(name.into(), value.into());
        self
    }

    /// Freezes the item hierarchy, assigning ids in pre-order starting at 0.
    ///
    /// # Panics
    ///
    /// Panics if the hierarchy nests deeper than
    /// [`MAX_MENU_DEPTH`](crate::MAX_MENU_DEPTH) or holds more items than an
    /// `i32` id can number.
    pub fn build(self) -> MenuTree {
        MenuTree::from_root(self)
    }
}

impl fmt::Debug for MenuItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MenuItem")
            .field("properties", &self.properties)
            .field("children", &self.children)
            .field("on_click", &self.on_click.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn label_and_icon_properties() {
        let item = MenuItem::new().label("Open").icon_name("document-open");
        assert_eq!(item.properties[node_prop::LABEL], Value::from("Open"));
        assert_eq!(
            item.properties[node_prop::ICON_NAME],
            Value::from("document-open")
        );
        assert!(item.children.is_empty());
    }

    #[test]
    fn separator_false_declares_nothing() {
        assert!(MenuItem::new().separator(false).properties.is_empty());
        let sep = MenuItem::new().separator(true);
        assert_eq!(sep.properties[node_prop::TYPE], Value::from("separator"));
    }

    #[test]
    fn toggle_state_is_int32() {
        let on = MenuItem::new().toggle_state(true);
        let off = MenuItem::new().toggle_state(false);
        assert_eq!(on.properties[node_prop::TOGGLE_STATE], Value::Int32(1));
        assert_eq!(off.properties[node_prop::TOGGLE_STATE], Value::Int32(0));
    }

    #[test]
    fn enum_properties_use_wire_spelling() {
        let item = MenuItem::new()
            .toggle_type(ToggleType::Radio)
            .disposition(Disposition::Warning);
        assert_eq!(item.properties[node_prop::TOGGLE_TYPE], Value::from("radio"));
        assert_eq!(
            item.properties[node_prop::DISPOSITION],
            Value::from("warning")
        );
    }

    #[test]
    fn submenu_and_child_mark_children_display() {
        let a = MenuItem::new().submenu([MenuItem::new(), MenuItem::new()]);
        assert_eq!(a.children.len(), 2);
        assert_eq!(
            a.properties[node_prop::CHILDREN_DISPLAY],
            Value::from("submenu")
        );

        let b = MenuItem::new().child(MenuItem::new().label("x"));
        assert_eq!(b.children.len(), 1);
        assert!(b.properties.contains_key(node_prop::CHILDREN_DISPLAY));
    }

    #[test]
    fn later_setter_wins() {
        let item = MenuItem::new().enabled(true).enabled(false);
        assert_eq!(item.properties[node_prop::ENABLED], Value::Bool(false));
    }

    #[test]
    fn debug_hides_handler() {
        let item = MenuItem::new().on_click(|| {});
        let dbg = format!("{item:?}");
        assert!(dbg.contains("on_click: true"));
    }
}
