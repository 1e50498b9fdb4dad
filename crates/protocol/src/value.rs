//! Closed tagged value type for everything the item and menu interfaces
//! expose as a property.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::types::{ObjectPath, Pixmap, ToolTip};

/// A property value. Each variant maps to exactly one D-Bus signature.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Value {
    String(String),
    Bool(bool),
    Int32(i32),
    Uint32(u32),
    ObjectPath(ObjectPath),
    Bytes(Vec<u8>),
    Strings(Vec<String>),
    /// Key combinations, e.g. `[["Control", "q"]]`.
    Shortcut(Vec<Vec<String>>),
    ToolTip(ToolTip),
    Pixmaps(Vec<Pixmap>),
}

/// Discriminant of [`Value`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    String,
    Bool,
    Int32,
    Uint32,
    ObjectPath,
    Bytes,
    Strings,
    Shortcut,
    ToolTip,
    Pixmaps,
}

impl ValueKind {
    /// D-Bus type signature of this kind.
    pub fn signature(self) -> &'static str {
        match self {
            Self::String => "s",
            Self::Bool => "b",
            Self::Int32 => "i",
            Self::Uint32 => "u",
            Self::ObjectPath => "o",
            Self::Bytes => "ay",
            Self::Strings => "as",
            Self::Shortcut => "aas",
            Self::ToolTip => "(sa(iiay)ss)",
            Self::Pixmaps => "a(iiay)",
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.signature())
    }
}

impl Value {
    pub fn kind(&self) -> ValueKind {
        match self {
            Self::String(_) => ValueKind::String,
            Self::Bool(_) => ValueKind::Bool,
            Self::Int32(_) => ValueKind::Int32,
            Self::Uint32(_) => ValueKind::Uint32,
            Self::ObjectPath(_) => ValueKind::ObjectPath,
            Self::Bytes(_) => ValueKind::Bytes,
            Self::Strings(_) => ValueKind::Strings,
            Self::Shortcut(_) => ValueKind::Shortcut,
            Self::ToolTip(_) => ValueKind::ToolTip,
            Self::Pixmaps(_) => ValueKind::Pixmaps,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_i32(&self) -> Option<i32> {
        match self {
            Self::Int32(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_u32(&self) -> Option<u32> {
        match self {
            Self::Uint32(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_object_path(&self) -> Option<&ObjectPath> {
        match self {
            Self::ObjectPath(p) => Some(p),
            _ => None,
        }
    }

    pub fn as_strings(&self) -> Option<&[String]> {
        match self {
            Self::Strings(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_tool_tip(&self) -> Option<&ToolTip> {
        match self {
            Self::ToolTip(t) => Some(t),
            _ => None,
        }
    }

    pub fn as_pixmaps(&self) -> Option<&[Pixmap]> {
        match self {
            Self::Pixmaps(p) => Some(p),
            _ => None,
        }
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Self::String(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::String(v.to_string())
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Self::Int32(v)
    }
}

impl From<u32> for Value {
    fn from(v: u32) -> Self {
        Self::Uint32(v)
    }
}

impl From<ObjectPath> for Value {
    fn from(v: ObjectPath) -> Self {
        Self::ObjectPath(v)
    }
}

impl From<Vec<u8>> for Value {
    fn from(v: Vec<u8>) -> Self {
        Self::Bytes(v)
    }
}

impl From<Vec<String>> for Value {
    fn from(v: Vec<String>) -> Self {
        Self::Strings(v)
    }
}

impl From<Vec<Vec<String>>> for Value {
    fn from(v: Vec<Vec<String>>) -> Self {
        Self::Shortcut(v)
    }
}

impl From<ToolTip> for Value {
    fn from(v: ToolTip) -> Self {
        Self::ToolTip(v)
    }
}

impl From<Vec<Pixmap>> for Value {
    fn from(v: Vec<Pixmap>) -> Self {
        Self::Pixmaps(v)
    }
}
