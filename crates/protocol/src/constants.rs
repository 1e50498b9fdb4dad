//! Object paths, interface names and property keys of the
//! StatusNotifierItem and dbusmenu protocols.

/// Object path the item interface is exported at.
pub const ITEM_PATH: &str = "/StatusNotifierItem";

/// Object path the menu interface is exported at.
pub const MENU_PATH: &str = "/MenuBar";

/// Item interface name.
pub const ITEM_INTERFACE: &str = "org.kde.StatusNotifierItem";

/// Menu interface name.
pub const MENU_INTERFACE: &str = "com.canonical.dbusmenu";

/// Well-known bus name of the registry service.
pub const WATCHER_BUS: &str = "org.kde.StatusNotifierWatcher";

/// Object path of the registry service.
pub const WATCHER_PATH: &str = "/StatusNotifierWatcher";

/// Interface of the registry service.
pub const WATCHER_INTERFACE: &str = "org.kde.StatusNotifierWatcher";

/// Registry method an item announces itself with.
pub const WATCHER_REGISTER_ITEM: &str = "RegisterStatusNotifierItem";

/// dbusmenu API version this implementation speaks.
pub const DBUSMENU_VERSION: u32 = 3;

/// Layout revision reported for a frozen menu tree.
pub const LAYOUT_REVISION: u32 = 0;

/// Returns the well-known bus name an item requests:
/// `org.kde.StatusNotifierItem-<pid>-<instance>`.
pub fn item_bus_name(pid: u32, instance: u32) -> String {
    format!("{ITEM_INTERFACE}-{pid}-{instance}")
}

/// Item interface signal members.
pub mod signal {
    pub const NEW_ICON: &str = "NewIcon";
    pub const NEW_TITLE: &str = "NewTitle";
    pub const NEW_ATTENTION_ICON: &str = "NewAttentionIcon";
    pub const NEW_OVERLAY_ICON: &str = "NewOverlayIcon";
    pub const NEW_TOOL_TIP: &str = "NewToolTip";
    pub const NEW_STATUS: &str = "NewStatus";
}

/// Item interface property names.
pub mod item_prop {
    pub const CATEGORY: &str = "Category";
    pub const ID: &str = "Id";
    pub const TITLE: &str = "Title";
    pub const STATUS: &str = "Status";
    pub const WINDOW_ID: &str = "WindowId";
    pub const ICON_NAME: &str = "IconName";
    pub const ICON_PIXMAP: &str = "IconPixmap";
    pub const OVERLAY_ICON_NAME: &str = "OverlayIconName";
    pub const OVERLAY_ICON_PIXMAP: &str = "OverlayIconPixmap";
    pub const ATTENTION_ICON_NAME: &str = "AttentionIconName";
    pub const ATTENTION_ICON_PIXMAP: &str = "AttentionIconPixmap";
    pub const ATTENTION_MOVIE_NAME: &str = "AttentionMovieName";
    pub const TOOL_TIP: &str = "ToolTip";
    pub const ITEM_IS_MENU: &str = "ItemIsMenu";
    pub const MENU: &str = "Menu";
    pub const ICON_THEME_PATH: &str = "IconThemePath";
}

/// Menu interface property names.
pub mod menu_prop {
    pub const VERSION: &str = "Version";
    pub const TEXT_DIRECTION: &str = "TextDirection";
    pub const STATUS: &str = "Status";
    pub const ICON_THEME_PATH: &str = "IconThemePath";
}

/// Per-node menu property names.
pub mod node_prop {
    pub const TYPE: &str = "type";
    pub const LABEL: &str = "label";
    pub const ENABLED: &str = "enabled";
    pub const VISIBLE: &str = "visible";
    pub const ICON_NAME: &str = "icon-name";
    pub const ICON_DATA: &str = "icon-data";
    pub const SHORTCUT: &str = "shortcut";
    pub const TOGGLE_TYPE: &str = "toggle-type";
    pub const TOGGLE_STATE: &str = "toggle-state";
    pub const CHILDREN_DISPLAY: &str = "children-display";
    pub const DISPOSITION: &str = "disposition";

    /// Value of `type` for separators.
    pub const TYPE_SEPARATOR: &str = "separator";
    /// Value of `children-display` for nodes with children.
    pub const CHILDREN_DISPLAY_SUBMENU: &str = "submenu";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bus_name_format() {
        assert_eq!(
            item_bus_name(4242, 1),
            "org.kde.StatusNotifierItem-4242-1"
        );
        assert_eq!(
            item_bus_name(7, 12),
            "org.kde.StatusNotifierItem-7-12"
        );
    }

    #[test]
    fn bus_name_is_prefixed_by_item_interface() {
        assert!(item_bus_name(1, 1).starts_with(ITEM_INTERFACE));
    }
}
