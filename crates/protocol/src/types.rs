use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::ProtocolError;

/// A validated D-Bus object path.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ObjectPath(String);

impl ObjectPath {
    /// Validates `path` against the D-Bus object path grammar: `/`, or
    /// `/`-separated non-empty elements of `[A-Za-z0-9_]`.
    pub fn new(path: impl Into<String>) -> Result<Self, ProtocolError> {
        let path = path.into();
        if !is_valid_object_path(&path) {
            return Err(ProtocolError::InvalidObjectPath(path));
        }
        Ok(Self(path))
    }

    /// Wraps a path literal.
    ///
    /// # Panics
    ///
    /// Panics if `path` is not a valid object path.
    pub fn from_static(path: &'static str) -> Self {
        Self::new(path).unwrap_or_else(|e| panic!("{e}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

fn is_valid_object_path(path: &str) -> bool {
    if path == "/" {
        return true;
    }
    let Some(rest) = path.strip_prefix('/') else {
        return false;
    };
    rest.split('/').all(|element| {
        !element.is_empty()
            && element
                .bytes()
                .all(|b| b.is_ascii_alphanumeric() || b == b'_')
    })
}

impl TryFrom<String> for ObjectPath {
    type Error = ProtocolError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ObjectPath> for String {
    fn from(path: ObjectPath) -> Self {
        path.0
    }
}

impl fmt::Display for ObjectPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One icon image: `(iiay)` on the wire.
///
/// `data` holds ARGB32 pixels in network byte order, row-major.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pixmap {
    pub width: i32,
    pub height: i32,
    pub data: Vec<u8>,
}

impl Pixmap {
    pub fn new(width: i32, height: i32, data: Vec<u8>) -> Self {
        Self {
            width,
            height,
            data,
        }
    }

    /// Returns `true` if `data` holds exactly `width * height` ARGB32 pixels.
    pub fn is_well_formed(&self) -> bool {
        if self.width < 0 || self.height < 0 {
            return false;
        }
        (self.width as usize)
            .checked_mul(self.height as usize)
            .and_then(|px| px.checked_mul(4))
            .is_some_and(|len| len == self.data.len())
    }
}

/// Item tooltip: `(sa(iiay)ss)` on the wire, fields in wire order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolTip {
    /// Freedesktop icon name.
    pub icon_name: String,
    /// Icon images, used when `icon_name` is empty.
    pub icon_pixmaps: Vec<Pixmap>,
    pub title: String,
    /// Body text; may contain a basic markup subset.
    pub description: String,
}

impl ToolTip {
    pub fn with_title(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }
}

/// Defines a closed string enum with its wire spelling, `as_str`,
/// `Display` and `FromStr`.
macro_rules! wire_enum {
    (
        $(#[$meta:meta])*
        $name:ident, $kind:literal {
            $( $(#[$vmeta:meta])* $variant:ident => $wire:literal ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $( $(#[$vmeta])* #[serde(rename = $wire)] $variant ),+
        }

        impl $name {
            /// Wire spelling.
            pub fn as_str(self) -> &'static str {
                match self {
                    $( Self::$variant => $wire ),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = ProtocolError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $( $wire => Ok(Self::$variant), )+
                    other => Err(ProtocolError::UnknownVariant {
                        kind: $kind,
                        value: other.to_string(),
                    }),
                }
            }
        }
    };
}

wire_enum! {
    /// What kind of application or service an item represents.
    #[derive(Default)]
    Category, "category" {
        /// Generic application status; the fallback when nothing else fits.
        #[default]
        ApplicationStatus => "ApplicationStatus",
        /// Messaging or mail clients.
        Communications => "Communications",
        /// System services not seen as a standalone application.
        SystemServices => "SystemServices",
        /// Hardware state, e.g. battery or volume.
        Hardware => "Hardware",
    }
}

wire_enum! {
    /// How important an item currently is to the user.
    #[derive(Default)]
    Status, "status" {
        /// Idle; hosts may hide the item.
        Passive => "Passive",
        #[default]
        Active => "Active",
        /// Hosts should emphasize the item.
        NeedsAttention => "NeedsAttention",
    }
}

wire_enum! {
    #[derive(Default)]
    TextDirection, "text direction" {
        #[default]
        LeftToRight => "ltr",
        RightToLeft => "rtl",
    }
}

wire_enum! {
    /// Whether the menu asks for attention.
    #[derive(Default)]
    MenuStatus, "menu status" {
        #[default]
        Normal => "normal",
        Notice => "notice",
    }
}

wire_enum! {
    ToggleType, "toggle type" {
        Checkmark => "checkmark",
        Radio => "radio",
    }
}

wire_enum! {
    /// How a menu node should be presented.
    Disposition, "disposition" {
        Normal => "normal",
        Informative => "informative",
        Warning => "warning",
        Alert => "alert",
    }
}

wire_enum! {
    /// Event ids a menu client delivers through `Event`.
    MenuEvent, "menu event" {
        Clicked => "clicked",
        Hovered => "hovered",
        Opened => "opened",
        Closed => "closed",
    }
}

wire_enum! {
    /// Direction of a `Scroll` call on the item.
    ScrollOrientation, "scroll orientation" {
        Horizontal => "horizontal",
        Vertical => "vertical",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn object_path_validation() {
        assert!(ObjectPath::new("/").is_ok());
        assert!(ObjectPath::new("/MenuBar").is_ok());
        assert!(ObjectPath::new("/org/kde/Item_1").is_ok());

        assert!(ObjectPath::new("").is_err());
        assert!(ObjectPath::new("MenuBar").is_err());
        assert!(ObjectPath::new("/MenuBar/").is_err());
        assert!(ObjectPath::new("/a//b").is_err());
        assert!(ObjectPath::new("/menu-bar").is_err());
    }

    #[test]
    #[should_panic(expected = "invalid object path")]
    fn from_static_panics_on_invalid_literal() {
        ObjectPath::from_static("not/a/path");
    }

    #[test]
    fn object_path_serde_rejects_invalid() {
        let ok: ObjectPath = serde_json::from_str("\"/MenuBar\"").unwrap();
        assert_eq!(ok.as_str(), "/MenuBar");
        assert!(serde_json::from_str::<ObjectPath>("\"nope\"").is_err());
    }

    #[test]
    fn pixmap_well_formed() {
        assert!(Pixmap::new(2, 2, vec![0; 16]).is_well_formed());
        assert!(Pixmap::default().is_well_formed());
        assert!(!Pixmap::new(2, 2, vec![0; 15]).is_well_formed());
        assert!(!Pixmap::new(-1, 2, vec![]).is_well_formed());
    }

    #[test]
    fn enum_wire_spelling() {
        assert_eq!(Category::SystemServices.as_str(), "SystemServices");
        assert_eq!(Status::NeedsAttention.to_string(), "NeedsAttention");
        assert_eq!(TextDirection::RightToLeft.as_str(), "rtl");
        assert_eq!(MenuStatus::Notice.as_str(), "notice");
        assert_eq!(ToggleType::Checkmark.as_str(), "checkmark");
        assert_eq!(Disposition::Alert.as_str(), "alert");
    }

    #[test]
    fn enum_parse() {
        assert_eq!("clicked".parse::<MenuEvent>().unwrap(), MenuEvent::Clicked);
        assert_eq!("Passive".parse::<Status>().unwrap(), Status::Passive);

        let err = "passive".parse::<Status>().unwrap_err();
        assert!(err.to_string().contains("passive"));
    }

    #[test]
    fn enum_defaults() {
        assert_eq!(Category::default(), Category::ApplicationStatus);
        assert_eq!(Status::default(), Status::Active);
        assert_eq!(TextDirection::default(), TextDirection::LeftToRight);
        assert_eq!(MenuStatus::default(), MenuStatus::Normal);
    }

    #[test]
    fn enum_serde_uses_wire_spelling() {
        assert_eq!(
            serde_json::to_string(&TextDirection::LeftToRight).unwrap(),
            "\"ltr\""
        );
        let s: Status = serde_json::from_str("\"NeedsAttention\"").unwrap();
        assert_eq!(s, Status::NeedsAttention);
    }
}
