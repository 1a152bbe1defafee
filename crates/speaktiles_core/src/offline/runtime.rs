//! Hand-over between cache generations.
//!
//! A freshly installed generation activates at once when nothing is active
//! or no page client is open. Otherwise it waits until every page client has
//! closed, or until the foreground sends [`ControlMessage::SkipWaiting`].

use crate::config::CacheVersion;
use crate::offline::controller::{CacheController, ControllerPhase, FetchOutcome};
use crate::offline::request::{Network, ResourceRequest};
use crate::offline::OfflineError;
use crate::repo::cache_repo::CacheStorage;
use log::info;

/// Messages accepted from the foreground page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlMessage {
    /// Activate the waiting generation now.
    SkipWaiting,
}

/// Lifecycle notifications surfaced to the foreground.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LifecycleEvent {
    Installed {
        version: CacheVersion,
        resources: usize,
    },
    InstallFailed {
        version: CacheVersion,
        reason: String,
    },
    /// Installed, but another generation still controls open clients.
    UpdateWaiting { version: CacheVersion },
    Activated {
        version: CacheVersion,
        deleted_generations: Vec<String>,
        claimed_clients: usize,
    },
}

/// Tracks the active and waiting cache generations.
pub struct CacheRuntime<S: CacheStorage> {
    active: Option<CacheController<S>>,
    waiting: Option<CacheController<S>>,
    open_clients: usize,
}

impl<S: CacheStorage> Default for CacheRuntime<S> {
    fn default() -> Self {
        Self {
            active: None,
            waiting: None,
            open_clients: 0,
        }
    }
}

impl<S: CacheStorage> CacheRuntime<S> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn active_version(&self) -> Option<&CacheVersion> {
        self.active.as_ref().map(CacheController::version)
    }

    pub fn waiting_version(&self) -> Option<&CacheVersion> {
        self.waiting.as_ref().map(CacheController::version)
    }

    pub fn open_clients(&self) -> usize {
        self.open_clients
    }

    /// Installs a new generation and activates it when possible.
    ///
    /// An install failure is reported as an event; the current active
    /// generation keeps serving.
    pub fn register(
        &mut self,
        mut controller: CacheController<S>,
        network: &impl Network,
    ) -> Result<Vec<LifecycleEvent>, OfflineError> {
        let version = controller.version().clone();
        let resources = match controller.install(network) {
            Ok(resources) => resources,
            Err(OfflineError::Storage(err)) => return Err(OfflineError::Storage(err)),
            Err(err) => {
                return Ok(vec![LifecycleEvent::InstallFailed {
                    version,
                    reason: err.to_string(),
                }])
            }
        };

        let mut events = vec![LifecycleEvent::Installed {
            version: version.clone(),
            resources,
        }];

        if let Some(mut superseded) = self.waiting.replace(controller) {
            superseded.retire();
        }

        if self.active.is_none() || self.open_clients == 0 {
            events.extend(self.promote_waiting()?);
        } else {
            info!("event=cache_update_waiting module=offline status=ok version={version}");
            events.push(LifecycleEvent::UpdateWaiting { version });
        }
        Ok(events)
    }

    /// Applies a foreground control message.
    pub fn post_message(
        &mut self,
        message: ControlMessage,
    ) -> Result<Vec<LifecycleEvent>, OfflineError> {
        match message {
            ControlMessage::SkipWaiting => self.promote_waiting(),
        }
    }

    pub fn client_opened(&mut self) {
        self.open_clients += 1;
    }

    /// Records a closed client; the last close lets a waiting update activate.
    pub fn client_closed(&mut self) -> Result<Vec<LifecycleEvent>, OfflineError> {
        self.open_clients = self.open_clients.saturating_sub(1);
        if self.open_clients == 0 {
            return self.promote_waiting();
        }
        Ok(Vec::new())
    }

    /// Routes a request through the active generation, if any.
    pub fn handle_fetch(&self, request: &ResourceRequest, network: &impl Network) -> FetchOutcome {
        match &self.active {
            Some(controller) => controller.handle_fetch(request, network),
            None => FetchOutcome::Bypass,
        }
    }

    fn promote_waiting(&mut self) -> Result<Vec<LifecycleEvent>, OfflineError> {
        let Some(mut next) = self.waiting.take() else {
            return Ok(Vec::new());
        };
        debug_assert_eq!(next.phase(), ControllerPhase::Installed);

        let activation = match next.activate(self.open_clients) {
            Ok(activation) => activation,
            Err(err) => {
                self.waiting = Some(next);
                return Err(err);
            }
        };

        let version = next.version().clone();
        if let Some(mut previous) = self.active.replace(next) {
            previous.retire();
        }

        Ok(vec![LifecycleEvent::Activated {
            version,
            deleted_generations: activation.deleted_generations,
            claimed_clients: activation.claimed_clients,
        }])
    }
}
