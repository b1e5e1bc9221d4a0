//! Registry (C5): the process-wide table of known [`ProviderAdapter`] types.
//!
//! Grounded in `original_source/mcp/registry.py`'s `ProviderRegistry`. Where
//! the Python original dynamically imports a `provider.py` module per
//! directory, this registry instead reads a `provider.toml` manifest that
//! names an already-statically-registered adapter type to instantiate under
//! a new provider name — Rust has no equivalent to `importlib`, so discovery
//! becomes "bind a manifest to a compiled-in adapter" rather than "load
//! arbitrary code" (see DESIGN.md, SPEC_FULL.md §11).

use std::path::Path;
use std::sync::Arc;

use dashmap::DashMap;
use serde::Deserialize;
use serde_json::Value;

use crate::provider::{ProviderAdapter, ProviderInstance};
use crate::{Error, Result};

/// `provider.toml`: binds a provider name to a compiled-in adapter type and
/// optional config overrides.
#[derive(Debug, Deserialize)]
struct ProviderManifest {
    name: String,
    adapter_type: String,
    #[serde(default)]
    #[allow(dead_code)]
    config: Value,
}

/// Registry of known [`ProviderAdapter`] types, keyed by adapter type name,
/// plus the most recently created [`ProviderInstance`] for each provider
/// name (spec §4.5).
pub struct Registry {
    adapters: DashMap<String, Arc<dyn ProviderAdapter>>,
    instances: DashMap<String, Arc<ProviderInstance>>,
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl Registry {
    /// An empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            adapters: DashMap::new(),
            instances: DashMap::new(),
        }
    }

    /// Register an adapter type. Rejects an adapter with an empty name.
    pub fn register(&self, adapter: Arc<dyn ProviderAdapter>) -> Result<()> {
        if adapter.name().is_empty() {
            return Err(Error::Configuration(
                "provider adapter must have a non-empty name".to_string(),
            ));
        }
        self.adapters.insert(adapter.name().to_string(), adapter);
        Ok(())
    }

    /// Look up a registered adapter type by name.
    #[must_use]
    pub fn get_adapter(&self, name: &str) -> Option<Arc<dyn ProviderAdapter>> {
        self.adapters.get(name).map(|e| Arc::clone(e.value()))
    }

    /// All registered adapter type names.
    #[must_use]
    pub fn list_adapters(&self) -> Vec<String> {
        self.adapters.iter().map(|e| e.key().clone()).collect()
    }

    /// Build a fresh [`ProviderInstance`] of the named adapter type with
    /// `config`, caching it as the most recent instance under `name` (spec
    /// §4.5; `original_source/mcp/registry.py:79-93`).
    pub fn create_provider(&self, name: &str, config: &Value) -> Result<Arc<ProviderInstance>> {
        let adapter = self
            .get_adapter(name)
            .ok_or_else(|| Error::ProviderNotFound(name.to_string()))?;
        let instance = Arc::new(ProviderInstance::new(adapter, config)?);
        self.instances.insert(name.to_string(), Arc::clone(&instance));
        Ok(instance)
    }

    /// The most recently created instance for `name`, if any.
    #[must_use]
    pub fn get_instance(&self, name: &str) -> Option<Arc<ProviderInstance>> {
        self.instances.get(name).map(|e| Arc::clone(e.value()))
    }

    /// Walk `search_dir/<category>/<provider>/provider.toml` and, for each
    /// manifest whose `adapter_type` names an already-registered adapter,
    /// register that adapter again under the manifest's `name`. Returns the
    /// number of manifests successfully bound. Unreadable or malformed
    /// manifests, and manifests naming an unknown `adapter_type`, are
    /// logged and skipped rather than aborting the walk.
    pub fn discover(&self, search_dir: &Path) -> usize {
        if !search_dir.is_dir() {
            return 0;
        }
        let mut count = 0;
        for category_entry in walkdir::WalkDir::new(search_dir)
            .min_depth(1)
            .max_depth(1)
            .into_iter()
            .filter_map(std::result::Result::ok)
            .filter(|e| e.file_type().is_dir())
        {
            for provider_entry in walkdir::WalkDir::new(category_entry.path())
                .min_depth(1)
                .max_depth(1)
                .into_iter()
                .filter_map(std::result::Result::ok)
                .filter(|e| e.file_type().is_dir())
            {
                let manifest_path = provider_entry.path().join("provider.toml");
                let Ok(raw) = std::fs::read_to_string(&manifest_path) else {
                    continue;
                };
                let manifest: ProviderManifest = match toml::from_str(&raw) {
                    Ok(m) => m,
                    Err(e) => {
                        tracing::warn!(path = %manifest_path.display(), error = %e, "malformed provider manifest");
                        continue;
                    }
                };
                let Some(adapter) = self.get_adapter(&manifest.adapter_type) else {
                    tracing::warn!(
                        path = %manifest_path.display(),
                        adapter_type = %manifest.adapter_type,
                        "provider manifest names an unregistered adapter type"
                    );
                    continue;
                };
                self.adapters.insert(manifest.name, adapter);
                count += 1;
            }
        }
        count
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::Transport;
    use async_trait::async_trait;

    struct StubAdapter(&'static str);

    #[async_trait]
    impl ProviderAdapter for StubAdapter {
        fn name(&self) -> &str {
            self.0
        }
        fn display_name(&self) -> &str {
            self.0
        }
        fn transport_kind(&self) -> crate::provider::TransportKind {
            crate::provider::TransportKind::Stdio
        }
        fn create_transport(&self, _config: &Value) -> Result<Arc<dyn Transport>> {
            unimplemented!()
        }
    }

    #[test]
    fn register_rejects_empty_name() {
        let registry = Registry::new();
        let err = registry.register(Arc::new(StubAdapter(""))).unwrap_err();
        assert!(matches!(err, Error::Configuration(_)));
    }

    #[test]
    fn create_provider_reports_unknown_name() {
        let registry = Registry::new();
        let err = registry
            .create_provider("missing", &serde_json::json!({}))
            .unwrap_err();
        assert!(matches!(err, Error::ProviderNotFound(_)));
    }

    #[test]
    fn create_provider_caches_the_instance_under_its_name() {
        let registry = Registry::new();
        registry.register(Arc::new(StubAdapter("atlassian"))).unwrap();

        assert!(registry.get_instance("atlassian").is_none());
        let created = registry
            .create_provider("atlassian", &serde_json::json!({}))
            .unwrap();

        let cached = registry.get_instance("atlassian").unwrap();
        assert!(Arc::ptr_eq(&created, &cached));
    }

    #[test]
    fn create_provider_replaces_the_previously_cached_instance() {
        let registry = Registry::new();
        registry.register(Arc::new(StubAdapter("atlassian"))).unwrap();

        let first = registry
            .create_provider("atlassian", &serde_json::json!({}))
            .unwrap();
        let second = registry
            .create_provider("atlassian", &serde_json::json!({}))
            .unwrap();

        let cached = registry.get_instance("atlassian").unwrap();
        assert!(!Arc::ptr_eq(&first, &second));
        assert!(Arc::ptr_eq(&cached, &second));
    }

    #[test]
    fn discover_binds_manifests_to_registered_adapters() {
        let registry = Registry::new();
        registry.register(Arc::new(StubAdapter("atlassian"))).unwrap();

        let dir = tempfile::tempdir().unwrap();
        let provider_dir = dir.path().join("enterprise").join("jira");
        std::fs::create_dir_all(&provider_dir).unwrap();
        std::fs::write(
            provider_dir.join("provider.toml"),
            "name = \"jira\"\nadapter_type = \"atlassian\"\n",
        )
        .unwrap();

        let count = registry.discover(dir.path());
        assert_eq!(count, 1);
        assert!(registry.get_adapter("jira").is_some());
    }

    #[test]
    fn discover_skips_unknown_adapter_type() {
        let registry = Registry::new();
        let dir = tempfile::tempdir().unwrap();
        let provider_dir = dir.path().join("enterprise").join("ghost");
        std::fs::create_dir_all(&provider_dir).unwrap();
        std::fs::write(
            provider_dir.join("provider.toml"),
            "name = \"ghost\"\nadapter_type = \"nonexistent\"\n",
        )
        .unwrap();

        assert_eq!(registry.discover(dir.path()), 0);
    }
}
