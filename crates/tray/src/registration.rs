//! Registration with the StatusNotifierWatcher and the background loop that
//! keeps it current across registry restarts.

use std::sync::Arc;

use sni_protocol::constants::WATCHER_BUS;
use tokio::sync::{mpsc, watch};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, trace, warn};

use crate::bus::{Bus, BusSignal, NameOwnerChanged};
use crate::error::ReconcileError;

/// Where a tray stands with the bus and the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RegistrationState {
    #[default]
    Unregistered,
    /// The bus name is owned but the registry does not know about it.
    /// After setup this means the registration is stale: the watcher went
    /// away and the item re-registers when it returns.
    NameAcquired,
    Registered,
}

/// How the registration loop ended when it did not fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconcileExit {
    Cancelled,
    /// The bus stopped delivering owner changes.
    SignalsClosed,
}

/// Re-registers the item whenever the registry service comes back.
pub(crate) struct Reconciler {
    bus: Arc<dyn Bus>,
    service: String,
    state: Arc<watch::Sender<RegistrationState>>,
    signals: mpsc::Receiver<BusSignal>,
    cancel: CancellationToken,
}

impl Reconciler {
    pub(crate) fn new(
        bus: Arc<dyn Bus>,
        service: String,
        state: Arc<watch::Sender<RegistrationState>>,
        signals: mpsc::Receiver<BusSignal>,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            bus,
            service,
            state,
            signals,
            cancel,
        }
    }

    /// Consumes owner changes until cancelled, the queue closes, or a fatal
    /// condition.
    pub(crate) async fn run(mut self) -> Result<ReconcileExit, ReconcileError> {
        debug!(service = %self.service, "registration loop started");
        loop {
            let signal = tokio::select! {
                biased;
                _ = self.cancel.cancelled() => {
                    debug!(service = %self.service, "registration loop cancelled");
                    return Ok(ReconcileExit::Cancelled);
                }
                signal = self.signals.recv() => signal,
            };

            let Some(signal) = signal else {
                info!(service = %self.service, "owner-change subscription closed");
                return Ok(ReconcileExit::SignalsClosed);
            };

            if let Err(e) = self.handle(signal).await {
                error!(service = %self.service, error = %e, "registration loop stopped");
                return Err(e);
            }
        }
    }

    async fn handle(&self, signal: BusSignal) -> Result<(), ReconcileError> {
        let change = match signal {
            BusSignal::NameOwnerChanged(change) => change,
            BusSignal::Other { interface, member } => {
                return Err(ReconcileError::UnexpectedSignal { interface, member });
            }
        };

        let NameOwnerChanged {
            name, new_owner, ..
        } = change;
        if name != WATCHER_BUS {
            trace!(%name, "ignoring owner change");
            return Ok(());
        }

        if new_owner.is_empty() {
            warn!(service = %self.service, "StatusNotifierWatcher went away, registration is stale");
            self.state.send_replace(RegistrationState::NameAcquired);
            return Ok(());
        }

        info!(service = %self.service, owner = %new_owner, "StatusNotifierWatcher appeared, re-registering");
        if let Err(e) = self.bus.register_item(&self.service).await {
            self.state.send_replace(RegistrationState::NameAcquired);
            return Err(e.into());
        }
        self.state.send_replace(RegistrationState::Registered);
        Ok(())
    }
}
