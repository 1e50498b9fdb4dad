//! Tray configuration.
//!
//! Every field has a default, so an empty TOML document is a valid
//! configuration:
//!
//! ```toml
//! id = "mail-notifier"
//! title = "Mail"
//! icon_name = "mail-unread"
//! status = "NeedsAttention"
//! signal_queue_capacity = 32
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use sni_protocol::{Category, MenuStatus, Status, TextDirection};

use crate::error::ConfigError;
use crate::props::DEFAULT_ICON_NAME;

/// Initial item and menu properties plus runtime tuning.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrayConfig {
    /// Item `Id`: a stable application identifier.
    #[serde(default = "default_id")]
    pub id: String,

    /// Item `Title`.
    #[serde(default = "default_title")]
    pub title: String,

    /// Item `IconName`.
    #[serde(default = "default_icon_name")]
    pub icon_name: String,

    #[serde(default)]
    pub category: Category,

    #[serde(default)]
    pub status: Status,

    /// Item `ItemIsMenu`: the host should show the menu on activation.
    #[serde(default)]
    pub item_is_menu: bool,

    /// Item `IconThemePath`: extra directory searched for icons.
    #[serde(default)]
    pub icon_theme_path: String,

    #[serde(default)]
    pub text_direction: TextDirection,

    #[serde(default)]
    pub menu_status: MenuStatus,

    /// Menu `IconThemePath`.
    #[serde(default)]
    pub menu_icon_theme_path: Vec<String>,

    /// Capacity of the owner-change queue feeding the registration loop.
    /// Values below 1 are treated as 1.
    #[serde(default = "default_signal_queue_capacity")]
    pub signal_queue_capacity: usize,
}

fn default_id() -> String {
    "sni-tray".into()
}

fn default_title() -> String {
    "Tray".into()
}

fn default_icon_name() -> String {
    DEFAULT_ICON_NAME.into()
}

fn default_signal_queue_capacity() -> usize {
    16
}

impl Default for TrayConfig {
    fn default() -> Self {
        Self {
            id: default_id(),
            title: default_title(),
            icon_name: default_icon_name(),
            category: Category::default(),
            status: Status::default(),
            item_is_menu: false,
            icon_theme_path: String::new(),
            text_direction: TextDirection::default(),
            menu_status: MenuStatus::default(),
            menu_icon_theme_path: Vec::new(),
            signal_queue_capacity: default_signal_queue_capacity(),
        }
    }
}

impl TrayConfig {
    /// Default configuration with the given `Id` and `Title`.
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            ..Self::default()
        }
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Reads and parses a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        let config = Self::from_toml_str(&content)?;
        tracing::debug!(path = %path.display(), id = %config.id, "tray configuration loaded");
        Ok(config)
    }

    pub(crate) fn queue_capacity(&self) -> usize {
        self.signal_queue_capacity.max(1)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn empty_document_is_default() {
        let config = TrayConfig::from_toml_str("").unwrap();
        assert_eq!(config, TrayConfig::default());
        assert_eq!(config.id, "sni-tray");
        assert_eq!(config.icon_name, "face-cool");
        assert_eq!(config.category, Category::ApplicationStatus);
        assert_eq!(config.status, Status::Active);
        assert_eq!(config.text_direction, TextDirection::LeftToRight);
        assert_eq!(config.signal_queue_capacity, 16);
    }

    #[test]
    fn parses_all_fields() {
        let config = TrayConfig::from_toml_str(
            r#"
            id = "mail"
            title = "Mail"
            icon_name = "mail-unread"
            category = "Communications"
            status = "NeedsAttention"
            item_is_menu = true
            icon_theme_path = "/opt/mail/icons"
            text_direction = "rtl"
            menu_status = "notice"
            menu_icon_theme_path = ["/opt/mail/icons", "/usr/share/icons"]
            signal_queue_capacity = 4
            "#,
        )
        .unwrap();

        assert_eq!(config.id, "mail");
        assert_eq!(config.title, "Mail");
        assert_eq!(config.category, Category::Communications);
        assert_eq!(config.status, Status::NeedsAttention);
        assert!(config.item_is_menu);
        assert_eq!(config.text_direction, TextDirection::RightToLeft);
        assert_eq!(config.menu_status, MenuStatus::Notice);
        assert_eq!(config.menu_icon_theme_path.len(), 2);
        assert_eq!(config.signal_queue_capacity, 4);
    }

    #[test]
    fn rejects_unknown_status() {
        let err = TrayConfig::from_toml_str("status = \"Sleeping\"").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn zero_capacity_is_clamped() {
        let config = TrayConfig {
            signal_queue_capacity: 0,
            ..TrayConfig::default()
        };
        assert_eq!(config.queue_capacity(), 1);
    }

    #[test]
    fn load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "id = \"from-disk\"\ntitle = \"Disk\"").unwrap();

        let config = TrayConfig::load(file.path()).unwrap();
        assert_eq!(config.id, "from-disk");
        assert_eq!(config.title, "Disk");
        assert_eq!(config.icon_name, "face-cool");
    }

    #[test]
    fn load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = TrayConfig::load(dir.path().join("absent.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }

    #[test]
    fn new_keeps_other_defaults() {
        let config = TrayConfig::new("app", "App");
        assert_eq!(config.id, "app");
        assert_eq!(config.title, "App");
        assert_eq!(config.signal_queue_capacity, 16);
    }
}
