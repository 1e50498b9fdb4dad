//! Context menu model for the dbusmenu protocol.
//!
//! A menu is assembled with [`MenuItem`] and frozen with
//! [`MenuItem::build`], which numbers every node once in pre-order. The
//! resulting [`MenuTree`] never changes; [`MenuServer`] answers the
//! dbusmenu method calls against it:
//! - layout queries are serialized fresh from the tree on every call
//! - `clicked` events are routed back to the node's handler by id

mod item;
mod layout;
mod server;
mod tree;

pub use item::{ClickHandler, MenuItem};
pub use layout::{Layout, UNLIMITED_DEPTH};
pub use server::{EventRequest, MenuServer};
pub use tree::{MAX_MENU_DEPTH, MenuTree, Node};

/// Errors returned to remote menu clients.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MenuError {
    #[error("unknown menu id {0}")]
    UnknownId(i32),

    #[error("menu id {id} has no property {name:?}")]
    UnknownProperty { id: i32, name: String },
}
