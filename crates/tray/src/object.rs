//! The objects a tray exports: what a [`Bus`](crate::Bus) implementation
//! dispatches inbound calls and property reads to.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use sni_menu::MenuServer;
use sni_protocol::{ScrollOrientation, Value};
use tracing::warn;

use crate::error::PropertyError;
use crate::handler::ItemHandler;
use crate::props::PropertySet;

/// Shared handle to a property store.
pub(crate) type SharedProps = Arc<RwLock<PropertySet>>;

pub(crate) fn read(props: &RwLock<PropertySet>) -> RwLockReadGuard<'_, PropertySet> {
    props.read().unwrap_or_else(PoisonError::into_inner)
}

pub(crate) fn write(props: &RwLock<PropertySet>) -> RwLockWriteGuard<'_, PropertySet> {
    props.write().unwrap_or_else(PoisonError::into_inner)
}

/// `org.kde.StatusNotifierItem` at `/StatusNotifierItem`.
pub struct ItemObject {
    props: SharedProps,
    handler: Arc<dyn ItemHandler>,
}

impl ItemObject {
    pub(crate) fn new(props: SharedProps, handler: Arc<dyn ItemHandler>) -> Self {
        Self { props, handler }
    }

    /// `org.freedesktop.DBus.Properties.Get`.
    pub fn get_property(&self, name: &str) -> Result<Value, PropertyError> {
        let props = read(&self.props);
        props
            .get(name)
            .cloned()
            .ok_or_else(|| PropertyError::Undeclared {
                interface: props.interface(),
                name: name.to_string(),
            })
    }

    /// `org.freedesktop.DBus.Properties.GetAll`.
    pub fn get_all(&self) -> BTreeMap<String, Value> {
        read(&self.props).to_map()
    }

    pub fn context_menu(&self, x: i32, y: i32) {
        self.handler.context_menu(x, y);
    }

    pub fn activate(&self, x: i32, y: i32) {
        self.handler.activate(x, y);
    }

    pub fn secondary_activate(&self, x: i32, y: i32) {
        self.handler.secondary_activate(x, y);
    }

    /// `Scroll(delta, orientation)`. Orientations other than `horizontal`
    /// and `vertical` are dropped.
    pub fn scroll(&self, delta: i32, orientation: &str) {
        match orientation.parse::<ScrollOrientation>() {
            Ok(orientation) => self.handler.scroll(delta, orientation),
            Err(e) => warn!(delta, error = %e, "ignoring Scroll"),
        }
    }
}

impl fmt::Debug for ItemObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ItemObject")
            .field("props", &self.props)
            .finish_non_exhaustive()
    }
}

/// `com.canonical.dbusmenu` at `/MenuBar`.
#[derive(Debug)]
pub struct MenuObject {
    props: SharedProps,
    server: MenuServer,
}

impl MenuObject {
    pub(crate) fn new(props: SharedProps, server: MenuServer) -> Self {
        Self { props, server }
    }

    /// `org.freedesktop.DBus.Properties.Get`.
    pub fn get_property(&self, name: &str) -> Result<Value, PropertyError> {
        let props = read(&self.props);
        props
            .get(name)
            .cloned()
            .ok_or_else(|| PropertyError::Undeclared {
                interface: props.interface(),
                name: name.to_string(),
            })
    }

    /// `org.freedesktop.DBus.Properties.GetAll`.
    pub fn get_all(&self) -> BTreeMap<String, Value> {
        read(&self.props).to_map()
    }

    /// Handles the dbusmenu method calls.
    pub fn menu(&self) -> &MenuServer {
        &self.server
    }
}
