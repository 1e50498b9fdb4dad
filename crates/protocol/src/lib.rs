//! Wire-level types for the StatusNotifierItem and dbusmenu protocols.
//!
//! Everything the item and menu interfaces put on the bus is modelled here:
//! object paths and interface names, the closed [`Value`] type used for
//! properties, and the named records ([`Pixmap`], [`ToolTip`]) whose field
//! order matches the wire signature.

pub mod constants;
pub mod types;
pub mod value;

// Re-export primary types for convenience.
pub use types::{
    Category, Disposition, MenuEvent, MenuStatus, ObjectPath, Pixmap, ScrollOrientation, Status,
    TextDirection, ToggleType, ToolTip,
};
pub use value::{Value, ValueKind};

/// Errors produced when parsing protocol values.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProtocolError {
    #[error("invalid object path: {0:?}")]
    InvalidObjectPath(String),

    #[error("unknown {kind}: {value:?}")]
    UnknownVariant { kind: &'static str, value: String },
}
