//! An in-process [`Bus`] for tests and for driving a tray without a session
//! bus.
//!
//! `MemoryBus` records every name request, export, registry call and emitted
//! signal, and lets the caller simulate the registry restarting, inject
//! arbitrary notifications, and make individual operations fail.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use sni_protocol::constants::{WATCHER_BUS, WATCHER_REGISTER_ITEM};
use tokio::sync::mpsc;
use tracing::debug;

use crate::bus::{Bus, BusFuture, BusSignal, EmittedSignal, NameOwnerChanged, RequestNameReply};
use crate::error::BusError;
use crate::object::{ItemObject, MenuObject};

#[derive(Debug)]
struct Inner {
    connected: bool,
    watcher_owner: Option<String>,
    owner_serial: u32,
    refuse_names: Option<RequestNameReply>,
    fail_exports: bool,
    failing_registrations: usize,
    owned_names: Vec<String>,
    items: BTreeMap<String, Arc<ItemObject>>,
    menus: BTreeMap<String, Arc<MenuObject>>,
    registrations: Vec<String>,
    signals: Vec<EmittedSignal>,
    subscribers: Vec<mpsc::Sender<BusSignal>>,
}

impl Inner {
    fn check_connected(&self) -> Result<(), BusError> {
        if self.connected {
            Ok(())
        } else {
            Err(BusError::Disconnected)
        }
    }

    fn next_owner(&mut self) -> String {
        self.owner_serial += 1;
        format!(":1.{}", self.owner_serial)
    }
}

fn path_in_use(path: &str) -> BusError {
    BusError::CallFailed {
        method: "export".into(),
        message: format!("object path {path} already in use"),
    }
}

/// See the [module documentation](self).
#[derive(Debug)]
pub struct MemoryBus {
    inner: Mutex<Inner>,
}

impl MemoryBus {
    /// A connected bus with the registry running.
    pub fn new() -> Self {
        let mut inner = Inner {
            connected: true,
            watcher_owner: None,
            owner_serial: 0,
            refuse_names: None,
            fail_exports: false,
            failing_registrations: 0,
            owned_names: Vec::new(),
            items: BTreeMap::new(),
            menus: BTreeMap::new(),
            registrations: Vec::new(),
            signals: Vec::new(),
            subscribers: Vec::new(),
        };
        inner.watcher_owner = Some(inner.next_owner());
        Self {
            inner: Mutex::new(inner),
        }
    }

    /// A bus whose connection is unusable from the start.
    pub fn disconnected() -> Self {
        let bus = Self::new();
        bus.lock().connected = false;
        bus
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Makes every later name request answer `reply` without granting the
    /// name.
    pub fn refuse_names(&self, reply: RequestNameReply) {
        self.lock().refuse_names = Some(reply);
    }

    pub fn fail_exports(&self, fail: bool) {
        self.lock().fail_exports = fail;
    }

    /// Fails the next `count` registry calls.
    pub fn fail_registrations(&self, count: usize) {
        self.lock().failing_registrations = count;
    }

    /// Sets whether the registry is running, without notifying subscribers.
    pub fn set_watcher_present(&self, present: bool) {
        let mut inner = self.lock();
        inner.watcher_owner = if present {
            Some(inner.next_owner())
        } else {
            None
        };
    }

    /// Services passed to `RegisterStatusNotifierItem`, in call order.
    pub fn registrations(&self) -> Vec<String> {
        self.lock().registrations.clone()
    }

    pub fn owned_names(&self) -> Vec<String> {
        self.lock().owned_names.clone()
    }

    pub fn emitted_signals(&self) -> Vec<EmittedSignal> {
        self.lock().signals.clone()
    }

    /// The item object exported at `path`, if any.
    pub fn item(&self, path: &str) -> Option<Arc<ItemObject>> {
        self.lock().items.get(path).cloned()
    }

    /// The menu object exported at `path`, if any.
    pub fn menu(&self, path: &str) -> Option<Arc<MenuObject>> {
        self.lock().menus.get(path).cloned()
    }

    /// Live owner-change subscriptions.
    pub fn subscriber_count(&self) -> usize {
        let mut inner = self.lock();
        inner.subscribers.retain(|tx| !tx.is_closed());
        inner.subscribers.len()
    }

    /// The registry exits: subscribers see its owner become empty.
    pub async fn stop_watcher(&self) {
        let old_owner = self.lock().watcher_owner.take().unwrap_or_default();
        self.deliver(BusSignal::NameOwnerChanged(NameOwnerChanged {
            name: WATCHER_BUS.to_string(),
            old_owner,
            new_owner: String::new(),
        }))
        .await;
    }

    /// The registry starts under a fresh unique name.
    pub async fn start_watcher(&self) {
        let new_owner = {
            let mut inner = self.lock();
            let owner = inner.next_owner();
            inner.watcher_owner = Some(owner.clone());
            owner
        };
        self.deliver(BusSignal::NameOwnerChanged(NameOwnerChanged {
            name: WATCHER_BUS.to_string(),
            old_owner: String::new(),
            new_owner,
        }))
        .await;
    }

    /// Sends `signal` to every live subscriber, waiting for queue space.
    pub async fn deliver(&self, signal: BusSignal) {
        let subscribers = {
            let mut inner = self.lock();
            inner.subscribers.retain(|tx| !tx.is_closed());
            inner.subscribers.clone()
        };
        for tx in subscribers {
            // A subscriber that went away in the meantime is skipped.
            let _ = tx.send(signal.clone()).await;
        }
    }
}

impl Default for MemoryBus {
    fn default() -> Self {
        Self::new()
    }
}

impl Bus for MemoryBus {
    fn is_connected(&self) -> bool {
        self.lock().connected
    }

    fn request_name(&self, name: &str) -> BusFuture<'_, RequestNameReply> {
        let name = name.to_string();
        Box::pin(async move {
            let mut inner = self.lock();
            inner.check_connected()?;
            if inner.owned_names.contains(&name) {
                return Ok(RequestNameReply::AlreadyOwner);
            }
            if let Some(reply) = inner.refuse_names {
                return Ok(reply);
            }
            debug!(%name, "name granted");
            inner.owned_names.push(name);
            Ok(RequestNameReply::PrimaryOwner)
        })
    }

    fn export_item(&self, path: &str, object: Arc<ItemObject>) -> BusFuture<'_, ()> {
        let path = path.to_string();
        Box::pin(async move {
            let mut inner = self.lock();
            inner.check_connected()?;
            if inner.fail_exports {
                return Err(path_in_use(&path));
            }
            if let Some(existing) = inner.items.get(&path)
                && !Arc::ptr_eq(existing, &object)
            {
                return Err(path_in_use(&path));
            }
            inner.items.insert(path, object);
            Ok(())
        })
    }

    fn export_menu(&self, path: &str, object: Arc<MenuObject>) -> BusFuture<'_, ()> {
        let path = path.to_string();
        Box::pin(async move {
            let mut inner = self.lock();
            inner.check_connected()?;
            if inner.fail_exports {
                return Err(path_in_use(&path));
            }
            if let Some(existing) = inner.menus.get(&path)
                && !Arc::ptr_eq(existing, &object)
            {
                return Err(path_in_use(&path));
            }
            inner.menus.insert(path, object);
            Ok(())
        })
    }

    fn register_item(&self, service: &str) -> BusFuture<'_, ()> {
        let service = service.to_string();
        Box::pin(async move {
            let mut inner = self.lock();
            inner.check_connected()?;
            if inner.failing_registrations > 0 {
                inner.failing_registrations -= 1;
                return Err(BusError::CallFailed {
                    method: WATCHER_REGISTER_ITEM.into(),
                    message: "registry rejected the call".into(),
                });
            }
            if inner.watcher_owner.is_none() {
                return Err(BusError::ServiceUnknown(WATCHER_BUS.into()));
            }
            inner.registrations.push(service);
            Ok(())
        })
    }

    fn emit_signal(&self, signal: EmittedSignal) -> BusFuture<'_, ()> {
        Box::pin(async move {
            let mut inner = self.lock();
            inner.check_connected()?;
            inner.signals.push(signal);
            Ok(())
        })
    }

    fn subscribe_name_owner_changed(
        &self,
        capacity: usize,
    ) -> BusFuture<'_, mpsc::Receiver<BusSignal>> {
        Box::pin(async move {
            let mut inner = self.lock();
            inner.check_connected()?;
            let (tx, rx) = mpsc::channel(capacity.max(1));
            inner.subscribers.push(tx);
            Ok(rx)
        })
    }

    fn close(&self) -> BusFuture<'_, ()> {
        Box::pin(async move {
            let mut inner = self.lock();
            inner.connected = false;
            inner.subscribers.clear();
            inner.owned_names.clear();
            Ok(())
        })
    }
}
