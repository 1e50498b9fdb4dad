//! Hooks for the item's interaction methods.
//!
//! The bus forwards `ContextMenu`, `Activate`, `SecondaryActivate` and
//! `Scroll` calls to an [`ItemHandler`]. Every method has a default that
//! logs the call and does nothing, so a handler only overrides what it
//! cares about.

use sni_protocol::ScrollOrientation;
use tracing::debug;

/// Reacts to interaction with the tray icon.
///
/// Coordinates are screen positions supplied by the host.
pub trait ItemHandler: Send + Sync + 'static {
    /// The host asks the item to show its own context menu.
    fn context_menu(&self, x: i32, y: i32) {
        debug!(x, y, "ContextMenu");
    }

    /// Primary activation, usually a left click.
    fn activate(&self, x: i32, y: i32) {
        debug!(x, y, "Activate");
    }

    /// Secondary activation, usually a middle click.
    fn secondary_activate(&self, x: i32, y: i32) {
        debug!(x, y, "SecondaryActivate");
    }

    /// Mouse wheel or touchpad scroll over the icon.
    fn scroll(&self, delta: i32, orientation: ScrollOrientation) {
        debug!(delta, %orientation, "Scroll");
    }
}

/// Handler used when the application supplies none.
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultItemHandler;

impl ItemHandler for DefaultItemHandler {}
