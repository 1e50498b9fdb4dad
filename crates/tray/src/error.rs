//! Error types for the tray.

use sni_protocol::ValueKind;

use crate::bus::RequestNameReply;

/// Errors reported by a [`Bus`](crate::Bus) implementation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BusError {
    #[error("not connected to the message bus")]
    Disconnected,

    #[error("service {0} is not running")]
    ServiceUnknown(String),

    #[error("{method} failed: {message}")]
    CallFailed { method: String, message: String },
}

/// Errors produced by the [`Tray`](crate::Tray).
#[derive(Debug, thiserror::Error)]
pub enum TrayError {
    #[error("cannot reach the message bus: {0}")]
    Connection(#[source] BusError),

    #[error("bus name {name} not granted primary ownership ({reply:?})")]
    NameConflict {
        name: String,
        reply: RequestNameReply,
    },

    #[error("failed to export {path}: {source}")]
    Export {
        path: &'static str,
        #[source]
        source: BusError,
    },

    #[error("failed to register {service} with the registry: {source}")]
    Registration {
        service: String,
        #[source]
        source: BusError,
    },

    #[error("tray is already set up")]
    AlreadySetUp,

    #[error("registration loop failed: {0}")]
    Reconcile(#[from] ReconcileError),

    #[error("registration loop panicked: {0}")]
    ReconcilerPanicked(String),

    #[error("bus error: {0}")]
    Bus(#[from] BusError),
}

/// Conditions that terminate the background registration loop.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ReconcileError {
    #[error("re-registration failed: {0}")]
    Bus(#[from] BusError),

    #[error("unexpected signal {interface}.{member}")]
    UnexpectedSignal { interface: String, member: String },
}

/// Errors at the generic property store boundary.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PropertyError {
    #[error("{interface} declares no property {name:?}")]
    Undeclared {
        interface: &'static str,
        name: String,
    },

    #[error("property {name} expects {expected}, got {found}")]
    KindMismatch {
        name: &'static str,
        expected: ValueKind,
        found: ValueKind,
    },

    #[error("property {name} does not accept {value:?}")]
    InvalidValue { name: &'static str, value: String },
}

/// Errors loading a [`TrayConfig`](crate::TrayConfig).
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid TOML: {0}")]
    Parse(#[from] toml::de::Error),
}
