//! Fixed-schema property stores for the item and menu interfaces.
//!
//! A [`PropertySet`] holds exactly the keys of its schema, in schema order,
//! for its whole lifetime. [`PropertySet::set`] is the validating boundary
//! used for untyped writes; the typed accessors treat an undeclared key or a
//! value of the wrong kind as a programmer error and panic.

use std::collections::BTreeMap;

use sni_protocol::constants::{DBUSMENU_VERSION, ITEM_INTERFACE, MENU_INTERFACE, MENU_PATH};
use sni_protocol::constants::{item_prop, menu_prop};
use sni_protocol::{
    Category, MenuStatus, ObjectPath, Pixmap, Status, TextDirection, ToolTip, Value, ValueKind,
};

use crate::error::PropertyError;

/// Icon shown when the host does not pick one.
pub const DEFAULT_ICON_NAME: &str = "face-cool";

/// One declared property.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PropertySpec {
    pub name: &'static str,
    pub kind: ValueKind,
    /// Permitted string values; empty means unrestricted.
    pub allowed: &'static [&'static str],
}

const fn spec(name: &'static str, kind: ValueKind) -> PropertySpec {
    PropertySpec {
        name,
        kind,
        allowed: &[],
    }
}

const fn one_of(name: &'static str, allowed: &'static [&'static str]) -> PropertySpec {
    PropertySpec {
        name,
        kind: ValueKind::String,
        allowed,
    }
}

/// `org.kde.StatusNotifierItem` properties.
pub static ITEM_SCHEMA: &[PropertySpec] = &[
    one_of(
        item_prop::CATEGORY,
        &[
            "ApplicationStatus",
            "Communications",
            "SystemServices",
            "Hardware",
        ],
    ),
    spec(item_prop::ID, ValueKind::String),
    spec(item_prop::TITLE, ValueKind::String),
    one_of(item_prop::STATUS, &["Passive", "Active", "NeedsAttention"]),
    spec(item_prop::WINDOW_ID, ValueKind::Int32),
    spec(item_prop::ICON_NAME, ValueKind::String),
    spec(item_prop::ICON_PIXMAP, ValueKind::Pixmaps),
    spec(item_prop::OVERLAY_ICON_NAME, ValueKind::String),
    spec(item_prop::OVERLAY_ICON_PIXMAP, ValueKind::Pixmaps),
    spec(item_prop::ATTENTION_ICON_NAME, ValueKind::String),
    spec(item_prop::ATTENTION_ICON_PIXMAP, ValueKind::Pixmaps),
    spec(item_prop::ATTENTION_MOVIE_NAME, ValueKind::String),
    spec(item_prop::TOOL_TIP, ValueKind::ToolTip),
    spec(item_prop::ITEM_IS_MENU, ValueKind::Bool),
    spec(item_prop::MENU, ValueKind::ObjectPath),
    spec(item_prop::ICON_THEME_PATH, ValueKind::String),
];

/// `com.canonical.dbusmenu` properties.
pub static MENU_SCHEMA: &[PropertySpec] = &[
    spec(menu_prop::VERSION, ValueKind::Uint32),
    one_of(menu_prop::TEXT_DIRECTION, &["ltr", "rtl"]),
    one_of(menu_prop::STATUS, &["normal", "notice"]),
    spec(menu_prop::ICON_THEME_PATH, ValueKind::Strings),
];

/// A name→value map whose keys are fixed by a schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertySet {
    interface: &'static str,
    schema: &'static [PropertySpec],
    values: Vec<Value>,
}

impl PropertySet {
    /// Item properties with their initial values.
    pub fn item(id: &str, title: &str) -> Self {
        let mut set = Self::empty(ITEM_INTERFACE, ITEM_SCHEMA);
        set.replace(item_prop::CATEGORY, Category::default().as_str());
        set.replace(item_prop::ID, id);
        set.replace(item_prop::TITLE, title);
        set.replace(item_prop::STATUS, Status::default().as_str());
        set.replace(item_prop::ICON_NAME, DEFAULT_ICON_NAME);
        set.replace(item_prop::MENU, ObjectPath::from_static(MENU_PATH));
        set
    }

    /// Menu properties with their initial values.
    pub fn menu() -> Self {
        let mut set = Self::empty(MENU_INTERFACE, MENU_SCHEMA);
        set.replace(menu_prop::VERSION, DBUSMENU_VERSION);
        set.replace(menu_prop::TEXT_DIRECTION, TextDirection::default().as_str());
        set.replace(menu_prop::STATUS, MenuStatus::default().as_str());
        set
    }

    fn empty(interface: &'static str, schema: &'static [PropertySpec]) -> Self {
        Self {
            interface,
            schema,
            values: schema.iter().map(|s| zero_value(s.kind)).collect(),
        }
    }

    /// Interface these properties belong to.
    pub fn interface(&self) -> &'static str {
        self.interface
    }

    pub fn schema(&self) -> &'static [PropertySpec] {
        self.schema
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    fn index_of(&self, name: &str) -> Option<usize> {
        self.schema.iter().position(|s| s.name == name)
    }

    /// Looks up a property by name; `None` if the schema does not declare it.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.index_of(name).map(|idx| &self.values[idx])
    }

    /// Replaces a value after checking the key and the value's kind.
    /// Returns the previous value.
    pub fn set(&mut self, name: &str, value: Value) -> Result<Value, PropertyError> {
        let idx = self.index_of(name).ok_or_else(|| PropertyError::Undeclared {
            interface: self.interface,
            name: name.to_string(),
        })?;
        let spec = self.schema[idx];
        if value.kind() != spec.kind {
            return Err(PropertyError::KindMismatch {
                name: spec.name,
                expected: spec.kind,
                found: value.kind(),
            });
        }
        if !spec.allowed.is_empty()
            && let Some(s) = value.as_str()
            && !spec.allowed.contains(&s)
        {
            return Err(PropertyError::InvalidValue {
                name: spec.name,
                value: s.to_string(),
            });
        }
        Ok(std::mem::replace(&mut self.values[idx], value))
    }

    /// Entries in schema order.
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &Value)> + '_ {
        self.schema.iter().map(|s| s.name).zip(self.values.iter())
    }

    /// Snapshot for `org.freedesktop.DBus.Properties.GetAll`.
    pub fn to_map(&self) -> BTreeMap<String, Value> {
        self.iter()
            .map(|(name, value)| (name.to_string(), value.clone()))
            .collect()
    }

    /// Typed write path. Panics if the write would violate the schema.
    pub(crate) fn replace(&mut self, name: &str, value: impl Into<Value>) {
        if let Err(e) = self.set(name, value.into()) {
            panic!("{e}");
        }
    }

    /// Returns a declared value. Panics if `name` is not declared.
    pub fn value(&self, name: &str) -> &Value {
        match self.get(name) {
            Some(value) => value,
            None => panic!("{} declares no property {name:?}", self.interface),
        }
    }

    pub fn str(&self, name: &str) -> &str {
        self.value(name)
            .as_str()
            .unwrap_or_else(|| kind_violation(name, ValueKind::String))
    }

    pub fn bool(&self, name: &str) -> bool {
        self.value(name)
            .as_bool()
            .unwrap_or_else(|| kind_violation(name, ValueKind::Bool))
    }

    pub fn i32(&self, name: &str) -> i32 {
        self.value(name)
            .as_i32()
            .unwrap_or_else(|| kind_violation(name, ValueKind::Int32))
    }

    pub fn u32(&self, name: &str) -> u32 {
        self.value(name)
            .as_u32()
            .unwrap_or_else(|| kind_violation(name, ValueKind::Uint32))
    }

    pub fn object_path(&self, name: &str) -> &ObjectPath {
        self.value(name)
            .as_object_path()
            .unwrap_or_else(|| kind_violation(name, ValueKind::ObjectPath))
    }

    pub fn strings(&self, name: &str) -> &[String] {
        self.value(name)
            .as_strings()
            .unwrap_or_else(|| kind_violation(name, ValueKind::Strings))
    }

    pub fn tool_tip(&self, name: &str) -> &ToolTip {
        self.value(name)
            .as_tool_tip()
            .unwrap_or_else(|| kind_violation(name, ValueKind::ToolTip))
    }

    pub fn pixmaps(&self, name: &str) -> &[Pixmap] {
        self.value(name)
            .as_pixmaps()
            .unwrap_or_else(|| kind_violation(name, ValueKind::Pixmaps))
    }
}

fn kind_violation(name: &str, expected: ValueKind) -> ! {
    panic!("property {name} does not hold a {expected} value")
}

fn zero_value(kind: ValueKind) -> Value {
    match kind {
        ValueKind::String => Value::String(String::new()),
        ValueKind::Bool => Value::Bool(false),
        ValueKind::Int32 => Value::Int32(0),
        ValueKind::Uint32 => Value::Uint32(0),
        ValueKind::ObjectPath => Value::ObjectPath(ObjectPath::from_static("/")),
        ValueKind::Bytes => Value::Bytes(Vec::new()),
        ValueKind::Strings => Value::Strings(Vec::new()),
        ValueKind::Shortcut => Value::Shortcut(Vec::new()),
        ValueKind::ToolTip => Value::ToolTip(ToolTip::default()),
        ValueKind::Pixmaps => Value::Pixmaps(Vec::new()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn item_defaults() {
        let props = PropertySet::item("MyApp", "Descriptive title");
        assert_eq!(props.interface(), ITEM_INTERFACE);
        assert_eq!(props.len(), 16);
        assert_eq!(props.str(item_prop::CATEGORY), "ApplicationStatus");
        assert_eq!(props.str(item_prop::ID), "MyApp");
        assert_eq!(props.str(item_prop::TITLE), "Descriptive title");
        assert_eq!(props.str(item_prop::STATUS), "Active");
        assert_eq!(props.i32(item_prop::WINDOW_ID), 0);
        assert_eq!(props.str(item_prop::ICON_NAME), DEFAULT_ICON_NAME);
        assert!(props.pixmaps(item_prop::ICON_PIXMAP).is_empty());
        assert_eq!(props.str(item_prop::OVERLAY_ICON_NAME), "");
        assert_eq!(props.tool_tip(item_prop::TOOL_TIP), &ToolTip::default());
        assert!(!props.bool(item_prop::ITEM_IS_MENU));
        assert_eq!(props.object_path(item_prop::MENU).as_str(), "/MenuBar");
        assert_eq!(props.str(item_prop::ICON_THEME_PATH), "");
    }

    #[test]
    fn menu_defaults() {
        let props = PropertySet::menu();
        assert_eq!(props.interface(), MENU_INTERFACE);
        assert_eq!(props.u32(menu_prop::VERSION), 3);
        assert_eq!(props.str(menu_prop::TEXT_DIRECTION), "ltr");
        assert_eq!(props.str(menu_prop::STATUS), "normal");
        assert!(props.strings(menu_prop::ICON_THEME_PATH).is_empty());
    }

    #[test]
    fn set_then_get() {
        let mut props = PropertySet::item("a", "b");
        let old = props
            .set(item_prop::ICON_NAME, Value::from("mail-unread"))
            .unwrap();
        assert_eq!(old, Value::from(DEFAULT_ICON_NAME));
        assert_eq!(props.str(item_prop::ICON_NAME), "mail-unread");
    }

    #[test]
    fn set_rejects_undeclared_key() {
        let mut props = PropertySet::menu();
        let err = props.set("Label", Value::from("x")).unwrap_err();
        assert_eq!(
            err,
            PropertyError::Undeclared {
                interface: MENU_INTERFACE,
                name: "Label".into()
            }
        );
        assert_eq!(props, PropertySet::menu());
    }

    #[test]
    fn set_rejects_wrong_kind() {
        let mut props = PropertySet::item("a", "b");
        let err = props
            .set(item_prop::WINDOW_ID, Value::from("12"))
            .unwrap_err();
        assert_eq!(
            err,
            PropertyError::KindMismatch {
                name: item_prop::WINDOW_ID,
                expected: ValueKind::Int32,
                found: ValueKind::String,
            }
        );
        assert_eq!(props.i32(item_prop::WINDOW_ID), 0);
    }

    #[test]
    fn set_rejects_value_outside_enumeration() {
        let mut props = PropertySet::item("a", "b");
        let err = props
            .set(item_prop::STATUS, Value::from("Sleeping"))
            .unwrap_err();
        assert!(matches!(err, PropertyError::InvalidValue { .. }));

        let mut menu = PropertySet::menu();
        assert!(menu.set(menu_prop::TEXT_DIRECTION, Value::from("rtl")).is_ok());
        assert!(menu.set(menu_prop::TEXT_DIRECTION, Value::from("up")).is_err());
    }

    #[test]
    fn keys_never_change() {
        let mut props = PropertySet::item("a", "b");
        let before: Vec<&str> = props.iter().map(|(k, _)| k).collect();
        props.replace(item_prop::TITLE, "changed");
        let _ = props.set("Nope", Value::from(1));
        let after: Vec<&str> = props.iter().map(|(k, _)| k).collect();
        assert_eq!(before, after);
        assert_eq!(props.to_map().len(), 16);
    }

    #[test]
    #[should_panic(expected = "declares no property")]
    fn reading_undeclared_key_panics() {
        PropertySet::item("a", "b").value("Tooltip");
    }

    #[test]
    #[should_panic(expected = "does not hold")]
    fn typed_read_of_wrong_kind_panics() {
        PropertySet::item("a", "b").bool(item_prop::TITLE);
    }

    #[test]
    #[should_panic(expected = "expects")]
    fn typed_write_of_wrong_kind_panics() {
        PropertySet::menu().replace(menu_prop::VERSION, "3");
    }
}
