//! Runs a tray against [`MemoryBus`], restarts the watcher once, clicks a
//! menu entry and shuts down.
//!
//! Usage: `sni-tray-demo [config.toml]`. Set `RUST_LOG=debug` to see every
//! bus interaction.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use sni_tray::{
    MemoryBus, MenuItem, RegistrationState, ScrollOrientation, Status, ToolTip, Tray, TrayConfig,
};
use sni_tray::{ItemHandler, Value};
use tracing_subscriber::EnvFilter;

struct LoggingHandler;

impl ItemHandler for LoggingHandler {
    fn activate(&self, x: i32, y: i32) {
        tracing::info!(x, y, "icon activated");
    }

    fn scroll(&self, delta: i32, orientation: ScrollOrientation) {
        tracing::info!(delta, %orientation, "icon scrolled");
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = match std::env::args().nth(1) {
        Some(path) => TrayConfig::load(path)?,
        None => TrayConfig::new("sni-tray-demo", "Tray demo"),
    };
    tracing::info!(id = %config.id, "configuration loaded");

    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(run(config))?;

    tracing::info!("demo finished");
    Ok(())
}

async fn run(config: TrayConfig) -> anyhow::Result<()> {
    let quit = Arc::new(AtomicBool::new(false));
    let quit_clicked = quit.clone();
    let menu = MenuItem::new()
        .submenu([
            MenuItem::new()
                .label("Say hello")
                .on_click(|| tracing::info!("hello from the menu")),
            MenuItem::new().separator(true),
            MenuItem::new()
                .label("Quit")
                .icon_name("application-exit")
                .on_click(move || quit_clicked.store(true, Ordering::SeqCst)),
        ])
        .build();

    let bus = Arc::new(MemoryBus::new());
    let mut tray = Tray::builder(bus.clone(), menu)
        .config(config)
        .handler(LoggingHandler)
        .build()?;
    tray.setup().await?;

    tray.set_tool_tip(ToolTip::with_title("Demo running"));
    tray.signal_new_tool_tip().await?;

    let mut state = tray.subscribe_registration();
    bus.stop_watcher().await;
    state
        .wait_for(|s| *s == RegistrationState::NameAcquired)
        .await?;
    bus.start_watcher().await;
    state.wait_for(|s| *s == RegistrationState::Registered).await?;
    tracing::info!(
        registrations = bus.registrations().len(),
        "survived a watcher restart"
    );

    if let Some(item) = bus.item("/StatusNotifierItem") {
        item.activate(100, 200);
        item.scroll(3, "vertical");
    }
    if let Some(menu) = bus.menu("/MenuBar") {
        let (_, layout) = menu.menu().get_layout(0, -1, &[])?;
        tracing::info!(nodes = layout.node_count(), "menu layout");
        menu.menu().event(1, "clicked", &Value::from(""), 0);
        menu.menu().event(3, "clicked", &Value::from(""), 0);
    }

    if quit.load(Ordering::SeqCst) {
        tray.set_status(Status::Passive);
        tray.signal_new_status().await?;
    }
    tray.close().await?;
    Ok(())
}
