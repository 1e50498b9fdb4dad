//! Transport seam between the tray and the session message bus.
//!
//! The tray never talks to a bus directly. A [`Bus`] implementation owns the
//! connection, exports the item and menu objects, forwards inbound calls to
//! them, and delivers `NameOwnerChanged` notifications to the registration
//! loop.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use sni_protocol::Value;
use tokio::sync::mpsc;

use crate::error::BusError;
use crate::object::{ItemObject, MenuObject};

/// A boxed future returned by [`Bus`] methods.
pub type BusFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, BusError>> + Send + 'a>>;

/// Outcome of a `RequestName` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestNameReply {
    PrimaryOwner,
    InQueue,
    Exists,
    AlreadyOwner,
}

impl RequestNameReply {
    /// Whether the request made the caller the name's primary owner.
    /// `AlreadyOwner` does not count: the name belongs to another object
    /// on the same connection.
    pub fn is_primary_owner(self) -> bool {
        matches!(self, Self::PrimaryOwner)
    }
}

/// Body of `org.freedesktop.DBus.NameOwnerChanged`. An empty owner means
/// "nobody".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameOwnerChanged {
    pub name: String,
    pub old_owner: String,
    pub new_owner: String,
}

/// A notification delivered on an owner-change subscription.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BusSignal {
    NameOwnerChanged(NameOwnerChanged),
    /// Anything else that arrived on the subscription.
    Other { interface: String, member: String },
}

/// A signal emitted on the bus.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmittedSignal {
    pub path: String,
    pub interface: String,
    pub member: String,
    pub args: Vec<Value>,
}

/// One connection to the session bus, shared by everything a tray exports.
///
/// Returned futures borrow only `&self`; implementations copy borrowed
/// arguments before the first await.
pub trait Bus: Send + Sync + 'static {
    /// Whether the underlying connection is usable.
    fn is_connected(&self) -> bool;

    /// `org.freedesktop.DBus.RequestName`, allowing replacement.
    fn request_name(&self, name: &str) -> BusFuture<'_, RequestNameReply>;

    /// Exports the item interface and its properties at `path`. Exporting
    /// the same object again is a no-op; a different object at an occupied
    /// path is an error.
    fn export_item(&self, path: &str, object: Arc<ItemObject>) -> BusFuture<'_, ()>;

    /// Exports the menu interface and its properties at `path`.
    fn export_menu(&self, path: &str, object: Arc<MenuObject>) -> BusFuture<'_, ()>;

    /// Calls `RegisterStatusNotifierItem(service)` on the registry.
    fn register_item(&self, service: &str) -> BusFuture<'_, ()>;

    fn emit_signal(&self, signal: EmittedSignal) -> BusFuture<'_, ()>;

    /// Subscribes to `NameOwnerChanged`. Notifications queue up to
    /// `capacity`; the receiver ends when the connection is released.
    fn subscribe_name_owner_changed(
        &self,
        capacity: usize,
    ) -> BusFuture<'_, mpsc::Receiver<BusSignal>>;

    /// Releases the connection.
    fn close(&self) -> BusFuture<'_, ()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_primary_ownership_counts() {
        assert!(RequestNameReply::PrimaryOwner.is_primary_owner());
        assert!(!RequestNameReply::AlreadyOwner.is_primary_owner());
        assert!(!RequestNameReply::InQueue.is_primary_owner());
        assert!(!RequestNameReply::Exists.is_primary_owner());
    }
}
