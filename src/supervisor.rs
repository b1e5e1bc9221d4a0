//! Supervisor (C10): owns the connected-provider fleet and the published
//! catalog snapshot.
//!
//! Grounded in `original_source/mcp/gateway.py`'s `MCPGateway.start`/`stop`
//! (per-provider failure tolerance, fail only if *zero* providers connect)
//! and the teacher's `BackendRegistry::stop_all` log-and-continue idiom
//! (`backend/mod.rs`). Publishes the catalog via an atomic whole-snapshot
//! swap (`parking_lot::RwLock<Option<Arc<Catalog>>>`) rather than the
//! reference implementation's in-place cache recompute — see DESIGN.md.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use serde_json::Value;

use crate::aggregator::Catalog;
use crate::provider::ProviderInstance;
use crate::registry::Registry;
use crate::{Error, Result};

/// One provider this supervisor was configured to connect, and the config
/// fragment to connect it with.
pub struct ProviderConfig {
    /// Adapter type name, looked up in the [`Registry`].
    pub adapter_name: String,
    /// Config fragment passed to the adapter.
    pub config: Value,
}

/// Owns every connected provider and the currently-published catalog.
pub struct Supervisor {
    registry: Arc<Registry>,
    providers: RwLock<HashMap<String, Arc<ProviderInstance>>>,
    catalog: RwLock<Option<Arc<Catalog>>>,
}

impl Supervisor {
    /// Build a supervisor over an adapter registry. Connects nothing yet.
    #[must_use]
    pub fn new(registry: Arc<Registry>) -> Self {
        Self {
            registry,
            providers: RwLock::new(HashMap::new()),
            catalog: RwLock::new(None),
        }
    }

    /// Connect every entry in `configs`, logging and skipping any that
    /// fail. Fails the whole startup only if *no* provider connects.
    pub async fn start(&self, configs: &[(String, ProviderConfig)]) -> Result<()> {
        tracing::info!("starting gateway");
        let mut connected = HashMap::new();

        for (provider_name, provider_config) in configs {
            tracing::info!(provider = %provider_name, "connecting to provider");
            match self.connect_one(provider_name, provider_config).await {
                Ok(instance) => {
                    tracing::info!(provider = %provider_name, "connected");
                    connected.insert(provider_name.clone(), instance);
                }
                Err(e) => {
                    tracing::warn!(provider = %provider_name, error = %e, "failed to connect, skipping");
                }
            }
        }

        if connected.is_empty() {
            return Err(Error::Configuration(
                "no providers connected; check configuration".to_string(),
            ));
        }

        *self.providers.write() = connected;
        self.refresh_catalog().await;

        let provider_count = self.providers.read().len();
        let catalog = self.catalog();
        tracing::info!(
            providers = provider_count,
            tools = catalog.as_ref().map_or(0, |c| c.tools().len()),
            resources = catalog.as_ref().map_or(0, |c| c.resources().len()),
            "gateway started"
        );
        if let Some(catalog) = &catalog {
            let conflicts = catalog.conflicting_tools();
            if !conflicts.is_empty() {
                tracing::warn!(count = conflicts.len(), "tool name conflicts detected; namespaced");
            }
        }
        Ok(())
    }

    async fn connect_one(&self, provider_name: &str, config: &ProviderConfig) -> Result<Arc<ProviderInstance>> {
        let instance = self.registry.create_provider(&config.adapter_name, &config.config)?;
        instance.connect(&config.config).await?;
        let _ = provider_name;
        Ok(instance)
    }

    /// Disconnect every provider. Logs and continues past a single
    /// provider's failure; always clears provider state. Idempotent.
    pub async fn stop(&self) {
        tracing::info!("stopping gateway");
        let providers = self.providers.write().drain().collect::<Vec<_>>();
        for (name, provider) in providers {
            if let Err(e) = provider.disconnect().await {
                tracing::warn!(provider = %name, error = %e, "error disconnecting");
            }
        }
        *self.catalog.write() = None;
        tracing::info!("gateway stopped");
    }

    /// Rebuild the catalog from the currently-connected providers and
    /// publish it as the new snapshot. The new `Arc<Catalog>` is built in
    /// full before the lock is taken, so readers never observe a partially
    /// rebuilt catalog (spec §5, §9).
    pub async fn refresh_catalog(&self) {
        let providers: Vec<Arc<ProviderInstance>> = self.providers.read().values().cloned().collect();
        let catalog = Arc::new(Catalog::build(&providers).await);
        *self.catalog.write() = Some(catalog);
    }

    /// The currently-published catalog snapshot, if one has been built.
    #[must_use]
    pub fn catalog(&self) -> Option<Arc<Catalog>> {
        self.catalog.read().clone()
    }

    /// A snapshot of the currently-connected provider table, for routing.
    #[must_use]
    pub fn providers(&self) -> HashMap<String, Arc<ProviderInstance>> {
        self.providers.read().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn start_fails_when_every_provider_fails_to_connect() {
        let registry = Arc::new(Registry::new());
        let supervisor = Supervisor::new(registry);
        let configs = vec![(
            "ghost".to_string(),
            ProviderConfig {
                adapter_name: "ghost".to_string(),
                config: serde_json::json!({}),
            },
        )];
        let err = supervisor.start(&configs).await.unwrap_err();
        assert!(matches!(err, Error::Configuration(_)));
    }

    #[tokio::test]
    async fn stop_is_idempotent_with_no_providers() {
        let registry = Arc::new(Registry::new());
        let supervisor = Supervisor::new(registry);
        supervisor.stop().await;
        supervisor.stop().await;
        assert!(supervisor.catalog().is_none());
    }
}
