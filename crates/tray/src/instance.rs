//! Per-process instance numbering for item bus names.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, OnceLock};

/// Hands out the `<instance>` part of `org.kde.StatusNotifierItem-<pid>-<instance>`.
///
/// Numbers start at 1 and are never reused. Trays built without an explicit
/// registry share [`InstanceRegistry::global`].
#[derive(Debug)]
pub struct InstanceRegistry {
    next: AtomicU32,
}

impl InstanceRegistry {
    pub fn new() -> Self {
        Self {
            next: AtomicU32::new(1),
        }
    }

    /// The process-wide registry.
    pub fn global() -> Arc<Self> {
        static GLOBAL: OnceLock<Arc<InstanceRegistry>> = OnceLock::new();
        Arc::clone(GLOBAL.get_or_init(|| Arc::new(InstanceRegistry::new())))
    }

    /// Claims the next instance number.
    pub fn next_instance(&self) -> u32 {
        self.next.fetch_add(1, Ordering::Relaxed)
    }
}

impl Default for InstanceRegistry {
    fn default() -> Self {
        Self::new()
    }
}
