//! The tray item: bus-name acquisition, export, registration and the typed
//! property surface the host application drives.

use std::fmt;
use std::sync::Arc;

use sni_menu::{MenuServer, MenuTree};
use sni_protocol::constants::{ITEM_INTERFACE, ITEM_PATH, MENU_PATH, item_bus_name};
use sni_protocol::constants::{item_prop, menu_prop, signal};
use sni_protocol::{
    Category, MenuStatus, ObjectPath, Pixmap, Status, TextDirection, ToolTip, Value,
};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, trace};

use crate::bus::{Bus, EmittedSignal};
use crate::config::TrayConfig;
use crate::error::{BusError, PropertyError, ReconcileError, TrayError};
use crate::handler::{DefaultItemHandler, ItemHandler};
use crate::instance::InstanceRegistry;
use crate::object::{self, ItemObject, MenuObject, SharedProps};
use crate::props::PropertySet;
use crate::registration::{ReconcileExit, Reconciler, RegistrationState};

type ReconcileHandle = JoinHandle<Result<ReconcileExit, ReconcileError>>;

/// Configures and creates a [`Tray`].
pub struct TrayBuilder {
    bus: Arc<dyn Bus>,
    menu: MenuTree,
    config: TrayConfig,
    handler: Arc<dyn ItemHandler>,
    instances: Option<Arc<InstanceRegistry>>,
}

impl TrayBuilder {
    pub fn config(mut self, config: TrayConfig) -> Self {
        self.config = config;
        self
    }

    /// Receives `Activate`, `ContextMenu`, `SecondaryActivate` and `Scroll`.
    pub fn handler(mut self, handler: impl ItemHandler) -> Self {
        self.handler = Arc::new(handler);
        self
    }

    /// Instance numbering source; defaults to [`InstanceRegistry::global`].
    pub fn instance_registry(mut self, instances: Arc<InstanceRegistry>) -> Self {
        self.instances = Some(instances);
        self
    }

    /// Fails with [`TrayError::Connection`] if the bus is not usable.
    pub fn build(self) -> Result<Tray, TrayError> {
        if !self.bus.is_connected() {
            return Err(TrayError::Connection(BusError::Disconnected));
        }

        let config = self.config;
        let item_props: SharedProps = Arc::new(std::sync::RwLock::new(item_properties(&config)));
        let menu_props: SharedProps = Arc::new(std::sync::RwLock::new(menu_properties(&config)));
        let item = Arc::new(ItemObject::new(item_props.clone(), self.handler));
        let menu = Arc::new(MenuObject::new(
            menu_props.clone(),
            MenuServer::new(self.menu),
        ));
        let (state, _) = watch::channel(RegistrationState::Unregistered);

        Ok(Tray {
            bus: self.bus,
            instances: self.instances.unwrap_or_else(InstanceRegistry::global),
            queue_capacity: config.queue_capacity(),
            item_props,
            menu_props,
            item,
            menu,
            state: Arc::new(state),
            service: None,
            cancel: CancellationToken::new(),
            reconciler: None,
        })
    }
}

fn item_properties(config: &TrayConfig) -> PropertySet {
    let mut props = PropertySet::item(&config.id, &config.title);
    props.replace(item_prop::ICON_NAME, config.icon_name.as_str());
    props.replace(item_prop::CATEGORY, config.category.as_str());
    props.replace(item_prop::STATUS, config.status.as_str());
    props.replace(item_prop::ITEM_IS_MENU, config.item_is_menu);
    props.replace(item_prop::ICON_THEME_PATH, config.icon_theme_path.as_str());
    props
}

fn menu_properties(config: &TrayConfig) -> PropertySet {
    let mut props = PropertySet::menu();
    props.replace(menu_prop::TEXT_DIRECTION, config.text_direction.as_str());
    props.replace(menu_prop::STATUS, config.menu_status.as_str());
    props.replace(
        menu_prop::ICON_THEME_PATH,
        config.menu_icon_theme_path.clone(),
    );
    props
}

/// A StatusNotifierItem with its dbusmenu.
///
/// Property setters update the exported values immediately but announce
/// nothing; call the matching `signal_new_*` method afterwards so hosts
/// re-read them. Setters are meant to be driven from one task at a time.
pub struct Tray {
    bus: Arc<dyn Bus>,
    instances: Arc<InstanceRegistry>,
    queue_capacity: usize,
    item_props: SharedProps,
    menu_props: SharedProps,
    item: Arc<ItemObject>,
    menu: Arc<MenuObject>,
    state: Arc<watch::Sender<RegistrationState>>,
    service: Option<String>,
    cancel: CancellationToken,
    reconciler: Option<ReconcileHandle>,
}

impl Tray {
    pub fn builder(bus: Arc<dyn Bus>, menu: MenuTree) -> TrayBuilder {
        TrayBuilder {
            bus,
            menu,
            config: TrayConfig::default(),
            handler: Arc::new(DefaultItemHandler),
            instances: None,
        }
    }

    /// Creates a tray numbered from the process-wide [`InstanceRegistry`].
    pub fn new(bus: Arc<dyn Bus>, config: TrayConfig, menu: MenuTree) -> Result<Self, TrayError> {
        Self::builder(bus, menu).config(config).build()
    }

    /// Creates a tray numbered from `instances`.
    pub fn with_registry(
        bus: Arc<dyn Bus>,
        config: TrayConfig,
        menu: MenuTree,
        instances: Arc<InstanceRegistry>,
    ) -> Result<Self, TrayError> {
        Self::builder(bus, menu)
            .config(config)
            .instance_registry(instances)
            .build()
    }

    /// Acquires the bus name, exports both objects, registers with the
    /// StatusNotifierWatcher and starts the registration loop.
    ///
    /// Must be called from within a tokio runtime. A failed setup may be
    /// retried and keeps the bus name it already acquired; a second
    /// successful call is rejected with [`TrayError::AlreadySetUp`].
    pub async fn setup(&mut self) -> Result<(), TrayError> {
        if self.reconciler.is_some() {
            return Err(TrayError::AlreadySetUp);
        }

        let service = match &self.service {
            Some(service) => service.clone(),
            None => {
                let name = item_bus_name(std::process::id(), self.instances.next_instance());
                let reply = self.bus.request_name(&name).await?;
                if !reply.is_primary_owner() {
                    return Err(TrayError::NameConflict { name, reply });
                }
                info!(service = %name, "bus name acquired");
                self.state.send_replace(RegistrationState::NameAcquired);
                self.service = Some(name.clone());
                name
            }
        };

        self.bus
            .export_item(ITEM_PATH, self.item.clone())
            .await
            .map_err(|source| TrayError::Export {
                path: ITEM_PATH,
                source,
            })?;
        self.bus
            .export_menu(MENU_PATH, self.menu.clone())
            .await
            .map_err(|source| TrayError::Export {
                path: MENU_PATH,
                source,
            })?;
        debug!(item = ITEM_PATH, menu = MENU_PATH, "objects exported");

        // Subscribe before registering so a registry restart in between is
        // not missed.
        let signals = self
            .bus
            .subscribe_name_owner_changed(self.queue_capacity)
            .await?;

        self.bus
            .register_item(&service)
            .await
            .map_err(|source| TrayError::Registration {
                service: service.clone(),
                source,
            })?;
        self.state.send_replace(RegistrationState::Registered);
        info!(%service, "registered with StatusNotifierWatcher");

        let reconciler = Reconciler::new(
            self.bus.clone(),
            service,
            self.state.clone(),
            signals,
            self.cancel.clone(),
        );
        self.reconciler = Some(tokio::spawn(reconciler.run()));
        Ok(())
    }

    /// The acquired bus name, once setup got that far.
    pub fn service_name(&self) -> Option<&str> {
        self.service.as_deref()
    }

    pub fn registration_state(&self) -> RegistrationState {
        *self.state.borrow()
    }

    /// Observes registration state changes, including those made by the
    /// background loop.
    pub fn subscribe_registration(&self) -> watch::Receiver<RegistrationState> {
        self.state.subscribe()
    }

    /// Whether the registration loop is still running.
    pub fn reconciler_running(&self) -> bool {
        self.reconciler
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    /// Waits for the registration loop to end on its own and returns how it
    /// ended. `None` if the loop was never started or already collected.
    pub async fn reconciler_finished(&mut self) -> Option<Result<ReconcileExit, TrayError>> {
        let handle = self.reconciler.take()?;
        Some(join_reconciler(handle).await)
    }

    /// Stops the registration loop, releases the bus connection, and reports
    /// whether the loop had failed.
    pub async fn close(mut self) -> Result<(), TrayError> {
        self.cancel.cancel();
        let outcome = match self.reconciler.take() {
            Some(handle) => join_reconciler(handle).await.map(|exit| {
                debug!(?exit, "registration loop ended");
            }),
            None => Ok(()),
        };
        let closed = self.bus.close().await;
        self.state.send_replace(RegistrationState::Unregistered);
        info!(service = ?self.service, "tray closed");
        outcome?;
        closed?;
        Ok(())
    }

    // Item properties

    fn item_store(&self) -> std::sync::RwLockReadGuard<'_, PropertySet> {
        object::read(&self.item_props)
    }

    fn set_item(&self, name: &str, value: impl Into<Value>) {
        object::write(&self.item_props).replace(name, value);
    }

    fn menu_store(&self) -> std::sync::RwLockReadGuard<'_, PropertySet> {
        object::read(&self.menu_props)
    }

    fn set_menu(&self, name: &str, value: impl Into<Value>) {
        object::write(&self.menu_props).replace(name, value);
    }

    /// Untyped write to the item store; rejects undeclared keys and values
    /// of the wrong kind. Returns the previous value.
    pub fn set_item_property(&self, name: &str, value: Value) -> Result<Value, PropertyError> {
        object::write(&self.item_props).set(name, value)
    }

    pub fn item_property(&self, name: &str) -> Option<Value> {
        self.item_store().get(name).cloned()
    }

    /// Untyped write to the menu store.
    pub fn set_menu_property(&self, name: &str, value: Value) -> Result<Value, PropertyError> {
        object::write(&self.menu_props).set(name, value)
    }

    pub fn menu_property(&self, name: &str) -> Option<Value> {
        self.menu_store().get(name).cloned()
    }

    pub fn set_category(&self, category: Category) {
        self.set_item(item_prop::CATEGORY, category.as_str());
    }

    pub fn category(&self) -> Category {
        parse_stored(self.item_store().str(item_prop::CATEGORY))
    }

    pub fn set_id(&self, id: impl Into<String>) {
        self.set_item(item_prop::ID, id.into());
    }

    pub fn id(&self) -> String {
        self.item_store().str(item_prop::ID).to_string()
    }

    pub fn set_title(&self, title: impl Into<String>) {
        self.set_item(item_prop::TITLE, title.into());
    }

    pub fn title(&self) -> String {
        self.item_store().str(item_prop::TITLE).to_string()
    }

    pub fn set_status(&self, status: Status) {
        self.set_item(item_prop::STATUS, status.as_str());
    }

    pub fn status(&self) -> Status {
        parse_stored(self.item_store().str(item_prop::STATUS))
    }

    pub fn set_window_id(&self, window_id: i32) {
        self.set_item(item_prop::WINDOW_ID, window_id);
    }

    pub fn window_id(&self) -> i32 {
        self.item_store().i32(item_prop::WINDOW_ID)
    }

    pub fn set_icon_name(&self, name: impl Into<String>) {
        self.set_item(item_prop::ICON_NAME, name.into());
    }

    pub fn icon_name(&self) -> String {
        self.item_store().str(item_prop::ICON_NAME).to_string()
    }

    pub fn set_icon_pixmap(&self, pixmaps: Vec<Pixmap>) {
        self.set_item(item_prop::ICON_PIXMAP, pixmaps);
    }

    pub fn icon_pixmap(&self) -> Vec<Pixmap> {
        self.item_store().pixmaps(item_prop::ICON_PIXMAP).to_vec()
    }

    pub fn set_overlay_icon_name(&self, name: impl Into<String>) {
        self.set_item(item_prop::OVERLAY_ICON_NAME, name.into());
    }

    pub fn overlay_icon_name(&self) -> String {
        self.item_store().str(item_prop::OVERLAY_ICON_NAME).to_string()
    }

    pub fn set_overlay_icon_pixmap(&self, pixmaps: Vec<Pixmap>) {
        self.set_item(item_prop::OVERLAY_ICON_PIXMAP, pixmaps);
    }

    pub fn overlay_icon_pixmap(&self) -> Vec<Pixmap> {
        self.item_store().pixmaps(item_prop::OVERLAY_ICON_PIXMAP).to_vec()
    }

    pub fn set_attention_icon_name(&self, name: impl Into<String>) {
        self.set_item(item_prop::ATTENTION_ICON_NAME, name.into());
    }

    pub fn attention_icon_name(&self) -> String {
        self.item_store().str(item_prop::ATTENTION_ICON_NAME).to_string()
    }

    pub fn set_attention_icon_pixmap(&self, pixmaps: Vec<Pixmap>) {
        self.set_item(item_prop::ATTENTION_ICON_PIXMAP, pixmaps);
    }

    pub fn attention_icon_pixmap(&self) -> Vec<Pixmap> {
        self.item_store().pixmaps(item_prop::ATTENTION_ICON_PIXMAP).to_vec()
    }

    pub fn set_attention_movie_name(&self, name: impl Into<String>) {
        self.set_item(item_prop::ATTENTION_MOVIE_NAME, name.into());
    }

    pub fn attention_movie_name(&self) -> String {
        self.item_store().str(item_prop::ATTENTION_MOVIE_NAME).to_string()
    }

    pub fn set_tool_tip(&self, tool_tip: ToolTip) {
        self.set_item(item_prop::TOOL_TIP, tool_tip);
    }

    pub fn tool_tip(&self) -> ToolTip {
        self.item_store().tool_tip(item_prop::TOOL_TIP).clone()
    }

    pub fn set_item_is_menu(&self, item_is_menu: bool) {
        self.set_item(item_prop::ITEM_IS_MENU, item_is_menu);
    }

    pub fn item_is_menu(&self) -> bool {
        self.item_store().bool(item_prop::ITEM_IS_MENU)
    }

    pub fn set_menu_path(&self, path: ObjectPath) {
        self.set_item(item_prop::MENU, path);
    }

    pub fn menu_path(&self) -> ObjectPath {
        self.item_store().object_path(item_prop::MENU).clone()
    }

    pub fn set_icon_theme_path(&self, path: impl Into<String>) {
        self.set_item(item_prop::ICON_THEME_PATH, path.into());
    }

    pub fn icon_theme_path(&self) -> String {
        self.item_store().str(item_prop::ICON_THEME_PATH).to_string()
    }

    // Menu properties

    pub fn set_menu_version(&self, version: u32) {
        self.set_menu(menu_prop::VERSION, version);
    }

    pub fn menu_version(&self) -> u32 {
        self.menu_store().u32(menu_prop::VERSION)
    }

    pub fn set_text_direction(&self, direction: TextDirection) {
        self.set_menu(menu_prop::TEXT_DIRECTION, direction.as_str());
    }

    pub fn text_direction(&self) -> TextDirection {
        parse_stored(self.menu_store().str(menu_prop::TEXT_DIRECTION))
    }

    pub fn set_menu_status(&self, status: MenuStatus) {
        self.set_menu(menu_prop::STATUS, status.as_str());
    }

    pub fn menu_status(&self) -> MenuStatus {
        parse_stored(self.menu_store().str(menu_prop::STATUS))
    }

    pub fn set_menu_icon_theme_path(&self, paths: Vec<String>) {
        self.set_menu(menu_prop::ICON_THEME_PATH, paths);
    }

    pub fn menu_icon_theme_path(&self) -> Vec<String> {
        self.menu_store()
            .strings(menu_prop::ICON_THEME_PATH)
            .to_vec()
    }

    // Change notifications

    pub async fn signal_new_icon(&self) -> Result<(), TrayError> {
        self.emit(signal::NEW_ICON, Vec::new()).await
    }

    pub async fn signal_new_title(&self) -> Result<(), TrayError> {
        self.emit(signal::NEW_TITLE, Vec::new()).await
    }

    pub async fn signal_new_attention_icon(&self) -> Result<(), TrayError> {
        self.emit(signal::NEW_ATTENTION_ICON, Vec::new()).await
    }

    pub async fn signal_new_overlay_icon(&self) -> Result<(), TrayError> {
        self.emit(signal::NEW_OVERLAY_ICON, Vec::new()).await
    }

    pub async fn signal_new_tool_tip(&self) -> Result<(), TrayError> {
        self.emit(signal::NEW_TOOL_TIP, Vec::new()).await
    }

    /// Emits `NewStatus` carrying the current status.
    pub async fn signal_new_status(&self) -> Result<(), TrayError> {
        let status = self.item_store().str(item_prop::STATUS).to_string();
        self.emit(signal::NEW_STATUS, vec![Value::String(status)])
            .await
    }

    async fn emit(&self, member: &'static str, args: Vec<Value>) -> Result<(), TrayError> {
        let signal = EmittedSignal {
            path: ITEM_PATH.to_string(),
            interface: ITEM_INTERFACE.to_string(),
            member: member.to_string(),
            args,
        };
        self.bus.emit_signal(signal).await?;
        trace!(member, "signal emitted");
        Ok(())
    }
}

async fn join_reconciler(handle: ReconcileHandle) -> Result<ReconcileExit, TrayError> {
    match handle.await {
        Ok(Ok(exit)) => Ok(exit),
        Ok(Err(e)) => Err(TrayError::Reconcile(e)),
        Err(e) => Err(TrayError::ReconcilerPanicked(e.to_string())),
    }
}

/// Reads back an enumerated property; the store only ever holds values its
/// schema allows.
fn parse_stored<T>(raw: &str) -> T
where
    T: std::str::FromStr,
    T::Err: fmt::Display,
{
    raw.parse()
        .unwrap_or_else(|e| panic!("stored property value is invalid: {e}"))
}

impl fmt::Debug for Tray {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tray")
            .field("service", &self.service)
            .field("state", &self.registration_state())
            .field("reconciler_running", &self.reconciler_running())
            .finish_non_exhaustive()
    }
}

impl Drop for Tray {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}
