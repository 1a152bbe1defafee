//! One cache generation's controller: install, activate and fetch.
//!
//! # Responsibility
//! - Pre-cache the application shell, all or nothing.
//! - Drop every other cache generation on activation.
//! - Serve requests network-first with cache fallback.
//!
//! # Invariants
//! - A failed install writes nothing.
//! - The live network response is returned even when caching it fails.
//! - Only same-origin 2xx responses are written through.

use crate::config::{CacheConfig, CacheVersion};
use crate::offline::request::{cache_key, Network, ResourceRequest, ResourceResponse};
use crate::offline::OfflineError;
use crate::repo::cache_repo::CacheStorage;
use log::{debug, info, warn};
use url::Url;

/// Lifecycle phase of a controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControllerPhase {
    /// Created, nothing cached yet.
    New,
    /// Shell fully cached; waiting to take over.
    Installed,
    /// Controlling page clients.
    Active,
    /// Install failed or superseded by a newer generation.
    Redundant,
}

/// Where a served response came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseSource {
    Network,
    Cache,
    /// Cached shell entry point served for an offline navigation.
    ShellFallback,
    /// Synthesized `503` placeholder.
    OfflinePlaceholder,
}

/// Decision for one intercepted request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    /// Not handled; the request goes to the network untouched.
    Bypass,
    Respond {
        source: ResponseSource,
        response: ResourceResponse,
    },
}

impl FetchOutcome {
    pub fn response(&self) -> Option<&ResourceResponse> {
        match self {
            Self::Bypass => None,
            Self::Respond { response, .. } => Some(response),
        }
    }

    pub fn source(&self) -> Option<ResponseSource> {
        match self {
            Self::Bypass => None,
            Self::Respond { source, .. } => Some(*source),
        }
    }
}

/// Summary of a successful activation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Activation {
    pub deleted_generations: Vec<String>,
    /// Page clients now controlled without waiting for navigation.
    pub claimed_clients: usize,
}

/// Controller for one versioned cache generation.
pub struct CacheController<S: CacheStorage> {
    config: CacheConfig,
    storage: S,
    phase: ControllerPhase,
}

impl<S: CacheStorage> CacheController<S> {
    pub fn new(config: CacheConfig, storage: S) -> Self {
        Self {
            config,
            storage,
            phase: ControllerPhase::New,
        }
    }

    pub fn version(&self) -> &CacheVersion {
        &self.config.version
    }

    pub fn phase(&self) -> ControllerPhase {
        self.phase
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    /// Fetches every manifest resource and stores them as one generation.
    ///
    /// # Errors
    /// - `InvalidManifestPath` when a path does not resolve against the scope.
    /// - `InstallFailed` when any fetch fails or returns a non-2xx status.
    /// - `Storage` when the generation cannot be written.
    ///
    /// On error the controller becomes `Redundant` and nothing is cached.
    pub fn install(&mut self, network: &impl Network) -> Result<usize, OfflineError> {
        info!(
            "event=cache_install module=offline status=start version={} resources={}",
            self.config.version,
            self.config.manifest.len()
        );

        match self.fetch_manifest(network) {
            Ok(entries) => {
                if let Err(err) = self.storage.put_all(self.config.version.as_str(), &entries) {
                    return Err(self.fail_install(OfflineError::Storage(err)));
                }
                self.phase = ControllerPhase::Installed;
                info!(
                    "event=cache_install module=offline status=ok version={} resources={}",
                    self.config.version,
                    entries.len()
                );
                Ok(entries.len())
            }
            Err(err) => Err(self.fail_install(err)),
        }
    }

    /// Deletes every other generation and takes control of `open_clients`.
    pub fn activate(&mut self, open_clients: usize) -> Result<Activation, OfflineError> {
        let current = self.config.version.as_str();
        let mut deleted_generations = Vec::new();
        for name in self.storage.cache_names()? {
            if name == current {
                continue;
            }
            self.storage.delete_cache(&name)?;
            info!("event=cache_delete module=offline status=ok generation={name}");
            deleted_generations.push(name);
        }

        self.phase = ControllerPhase::Active;
        info!(
            "event=cache_activate module=offline status=ok version={} deleted={} claimed_clients={}",
            self.config.version,
            deleted_generations.len(),
            open_clients
        );
        Ok(Activation {
            deleted_generations,
            claimed_clients: open_clients,
        })
    }

    /// Marks this controller as superseded.
    pub fn retire(&mut self) {
        self.phase = ControllerPhase::Redundant;
    }

    /// Network-first fetch with cache fallback.
    pub fn handle_fetch(&self, request: &ResourceRequest, network: &impl Network) -> FetchOutcome {
        if !request.is_get() || !request.is_http() {
            return FetchOutcome::Bypass;
        }

        match network.fetch(request) {
            Ok(response) => {
                if response.is_ok() && self.is_same_origin(&request.url) {
                    self.write_through(request, &response);
                }
                FetchOutcome::Respond {
                    source: ResponseSource::Network,
                    response,
                }
            }
            Err(err) => {
                debug!(
                    "event=cache_fallback module=offline status=start reason={}",
                    err.reason
                );
                self.offline_response(request)
            }
        }
    }

    fn offline_response(&self, request: &ResourceRequest) -> FetchOutcome {
        if let Some(response) = self.cached(&request.cache_key()) {
            return FetchOutcome::Respond {
                source: ResponseSource::Cache,
                response,
            };
        }

        if request.is_navigation() {
            if let Some(response) = self
                .resolve(&self.config.shell_entry)
                .and_then(|shell| self.cached(&cache_key(&shell)))
            {
                return FetchOutcome::Respond {
                    source: ResponseSource::ShellFallback,
                    response,
                };
            }
        }

        FetchOutcome::Respond {
            source: ResponseSource::OfflinePlaceholder,
            response: ResourceResponse::offline_placeholder(),
        }
    }

    fn cached(&self, key: &str) -> Option<ResourceResponse> {
        match self.storage.lookup(self.config.version.as_str(), key) {
            Ok(found) => found,
            Err(err) => {
                warn!("event=cache_lookup module=offline status=error error={err}");
                None
            }
        }
    }

    fn write_through(&self, request: &ResourceRequest, response: &ResourceResponse) {
        if let Err(err) = self
            .storage
            .put(self.config.version.as_str(), &request.cache_key(), response)
        {
            warn!(
                "event=cache_write_through module=offline status=error version={} error={}",
                self.config.version, err
            );
        }
    }

    fn fetch_manifest(
        &self,
        network: &impl Network,
    ) -> Result<Vec<(String, ResourceResponse)>, OfflineError> {
        let mut entries = Vec::with_capacity(self.config.manifest.len());
        for path in &self.config.manifest {
            let url = self
                .resolve(path)
                .ok_or_else(|| OfflineError::InvalidManifestPath(path.clone()))?;
            let key = cache_key(&url);
            let response = network
                .fetch(&ResourceRequest::get(url))
                .map_err(|err| OfflineError::InstallFailed {
                    url: key.clone(),
                    reason: err.reason,
                })?;
            if !response.is_ok() {
                return Err(OfflineError::InstallFailed {
                    url: key,
                    reason: format!("status {}", response.status),
                });
            }
            entries.push((key, response));
        }
        Ok(entries)
    }

    fn fail_install(&mut self, err: OfflineError) -> OfflineError {
        self.phase = ControllerPhase::Redundant;
        warn!(
            "event=cache_install module=offline status=error version={} error={}",
            self.config.version, err
        );
        err
    }

    fn resolve(&self, path: &str) -> Option<Url> {
        self.config.scope.join(path).ok()
    }

    fn is_same_origin(&self, url: &Url) -> bool {
        url.origin() == self.config.scope.origin()
    }
}
