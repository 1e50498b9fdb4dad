//! StatusNotifierItem tray icons with a dbusmenu context menu.
//!
//! A [`Tray`] owns one item: it acquires the bus name
//! `org.kde.StatusNotifierItem-<pid>-<instance>`, exports the item at
//! `/StatusNotifierItem` and its menu at `/MenuBar`, and registers with the
//! `org.kde.StatusNotifierWatcher`. A background task re-registers whenever
//! the watcher restarts.
//!
//! The transport is abstracted by the [`Bus`] trait. [`MemoryBus`] is an
//! in-process implementation that records everything a tray does.
//!
//! ```ignore
//! let menu = MenuItem::new()
//!     .submenu([
//!         MenuItem::new().label("Open").on_click(|| open_window()),
//!         MenuItem::new().separator(true),
//!         MenuItem::new().label("Quit").on_click(|| quit()),
//!     ])
//!     .build();
//!
//! let mut tray = Tray::new(bus, TrayConfig::new("my-app", "My App"), menu)?;
//! tray.setup().await?;
//!
//! tray.set_status(Status::NeedsAttention);
//! tray.signal_new_status().await?;
//! ```

pub mod bus;
pub mod config;
pub mod error;
pub mod handler;
pub mod instance;
pub mod memory;
pub mod object;
pub mod props;
pub mod registration;
mod tray;

pub use bus::{Bus, BusFuture, BusSignal, EmittedSignal, NameOwnerChanged, RequestNameReply};
pub use config::TrayConfig;
pub use error::{BusError, ConfigError, PropertyError, ReconcileError, TrayError};
pub use handler::{DefaultItemHandler, ItemHandler};
pub use instance::InstanceRegistry;
pub use memory::MemoryBus;
pub use object::{ItemObject, MenuObject};
pub use props::PropertySet;
pub use registration::{ReconcileExit, RegistrationState};
pub use tray::{Tray, TrayBuilder};

pub use sni_menu::{MenuItem, MenuTree};
pub use sni_protocol::{
    Category, Disposition, MenuStatus, ObjectPath, Pixmap, ScrollOrientation, Status,
    TextDirection, ToggleType, ToolTip, Value,
};
