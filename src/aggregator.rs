//! Aggregator (C6): merges each connected provider's catalog into one,
//! namespacing on collision.
//!
//! Grounded in `original_source/mcp/aggregator.py`'s `ToolAggregator`/
//! `ResourceAggregator`/`PromptAggregator`. A failure to list from one
//! provider is logged and treated as an empty contribution from that
//! provider, never aborting the whole aggregation (spec §4.6 step 1).

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use crate::provider::ProviderInstance;
use crate::protocol::{Prompt, Resource, Tool};
use crate::{Error, Result};

/// One namespace-conflict's surviving natural name and the providers it
/// collided across — the supplemental `conflict_summary()` diagnostic
/// (SPEC_FULL.md §11), not present in the reference implementation.
#[derive(Debug, Clone)]
pub struct ConflictEntry {
    /// The tool's natural (un-namespaced) name.
    pub name: String,
    /// Every provider that published a tool under this name.
    pub providers: Vec<String>,
}

/// An immutable, fully-built snapshot of the aggregated tool/resource/prompt
/// catalog. Built once per refresh and published atomically (see
/// `supervisor`/DESIGN.md) rather than mutated in place.
#[derive(Debug, Default)]
pub struct Catalog {
    tools: Vec<Tool>,
    resources: Vec<Resource>,
    prompts: Vec<Prompt>,
    tool_provider: HashMap<String, String>,
    tool_info: HashMap<String, Tool>,
    tool_conflicts: HashSet<String>,
    resource_schemes: HashSet<String>,
}

impl Catalog {
    /// Aggregate tools, resources and prompts from every provider in
    /// `providers`. Providers are expected to already be connected; a
    /// provider whose `list_*` call fails contributes nothing and is
    /// logged, not propagated.
    pub async fn build(providers: &[Arc<ProviderInstance>]) -> Self {
        let tools = Self::aggregate_tools(providers).await;
        let resources = Self::aggregate_resources(providers).await;
        let prompts = Self::aggregate_prompts(providers).await;

        let mut tool_provider = HashMap::new();
        let mut tool_info = HashMap::new();
        for tool in &tools.0 {
            tool_provider.insert(tool.name.clone(), tool.provider.clone().unwrap_or_default());
            tool_info.insert(tool.name.clone(), tool.clone());
        }

        let resource_schemes = providers.iter().map(|p| p.name().to_string()).collect();

        Self {
            tools: tools.0,
            resources,
            prompts,
            tool_provider,
            tool_info,
            tool_conflicts: tools.1,
            resource_schemes,
        }
    }

    async fn aggregate_tools(providers: &[Arc<ProviderInstance>]) -> (Vec<Tool>, HashSet<String>) {
        let mut provider_tools: Vec<(String, Option<String>, Vec<Tool>)> = Vec::new();
        for provider in providers {
            let tools = match provider.list_tools().await {
                Ok(tools) => tools,
                Err(e) => {
                    tracing::warn!(provider = provider.name(), error = %e, "failed to list tools");
                    Vec::new()
                }
            };
            provider_tools.push((
                provider.name().to_string(),
                provider.category().map(str::to_string),
                tools,
            ));
        }

        let mut name_counts: HashMap<String, usize> = HashMap::new();
        for (_, _, tools) in &provider_tools {
            for tool in tools {
                *name_counts.entry(tool.name.clone()).or_default() += 1;
            }
        }
        let conflicts: HashSet<String> = name_counts
            .into_iter()
            .filter(|(_, count)| *count > 1)
            .map(|(name, _)| name)
            .collect();

        let mut aggregated = Vec::new();
        for (provider_name, category, tools) in provider_tools {
            for tool in tools {
                let original_name = tool.name.clone();
                let conflicted = conflicts.contains(&original_name);
                let name = if conflicted {
                    format!("{provider_name}:{original_name}")
                } else {
                    original_name
                };
                aggregated.push(Tool {
                    name,
                    description: tool.description,
                    input_schema: tool.input_schema,
                    provider: Some(provider_name.clone()),
                    category: category.clone(),
                    namespace_reason: conflicted.then(|| "conflict".to_string()),
                });
            }
        }

        (aggregated, conflicts)
    }

    async fn aggregate_resources(providers: &[Arc<ProviderInstance>]) -> Vec<Resource> {
        let mut aggregated = Vec::new();
        for provider in providers {
            let resources = match provider.list_resources().await {
                Ok(resources) => resources,
                Err(e) => {
                    tracing::warn!(provider = provider.name(), error = %e, "failed to list resources");
                    continue;
                }
            };
            let prefix = format!("{}://", provider.name());
            for resource in resources {
                let uri = if resource.uri.starts_with(&prefix) {
                    resource.uri
                } else {
                    format!("{prefix}{}", resource.uri)
                };
                aggregated.push(Resource { uri, ..resource });
            }
        }
        aggregated
    }

    async fn aggregate_prompts(providers: &[Arc<ProviderInstance>]) -> Vec<Prompt> {
        let mut aggregated = Vec::new();
        for provider in providers {
            match provider.list_prompts().await {
                Ok(prompts) => aggregated.extend(prompts),
                Err(e) => {
                    tracing::warn!(provider = provider.name(), error = %e, "failed to list prompts");
                }
            }
        }
        aggregated
    }

    /// All aggregated tools, namespaced where they conflicted.
    #[must_use]
    pub fn tools(&self) -> &[Tool] {
        &self.tools
    }

    /// All aggregated resources, provider-prefixed.
    #[must_use]
    pub fn resources(&self) -> &[Resource] {
        &self.resources
    }

    /// All aggregated prompts.
    #[must_use]
    pub fn prompts(&self) -> &[Prompt] {
        &self.prompts
    }

    /// Resolve a (possibly namespaced) tool name to its owning provider.
    ///
    /// Errors with [`Error::AmbiguousTool`] if `tool_name` is a natural name
    /// that collided, [`Error::ToolNotFound`] if it names nothing at all.
    pub fn get_provider_for_tool(&self, tool_name: &str) -> Result<&str> {
        if let Some(provider) = self.tool_provider.get(tool_name) {
            return Ok(provider);
        }
        if self.tool_conflicts.contains(tool_name) {
            return Err(Error::AmbiguousTool(tool_name.to_string()));
        }
        Err(Error::ToolNotFound(tool_name.to_string()))
    }

    /// Look up a tool's full entry by its (possibly namespaced) name.
    pub fn get_tool_info(&self, tool_name: &str) -> Result<&Tool> {
        self.tool_info
            .get(tool_name)
            .ok_or_else(|| Error::ToolNotFound(tool_name.to_string()))
    }

    /// Natural (un-namespaced) tool names that collided across providers.
    #[must_use]
    pub fn conflicting_tools(&self) -> &HashSet<String> {
        &self.tool_conflicts
    }

    /// Diagnostic summary of every conflict, naming the providers involved —
    /// useful for an operator inspecting why a tool got namespaced (not
    /// present in the reference implementation; SPEC_FULL.md §11).
    #[must_use]
    pub fn conflict_summary(&self) -> Vec<ConflictEntry> {
        let mut by_name: HashMap<String, Vec<String>> = HashMap::new();
        for tool in &self.tools {
            if let Some(reason) = &tool.namespace_reason {
                if reason == "conflict" {
                    let natural = tool
                        .name
                        .split_once(':')
                        .map_or(tool.name.as_str(), |(_, rest)| rest)
                        .to_string();
                    by_name
                        .entry(natural)
                        .or_default()
                        .push(tool.provider.clone().unwrap_or_default());
                }
            }
        }
        let mut entries: Vec<ConflictEntry> = by_name
            .into_iter()
            .map(|(name, providers)| ConflictEntry { name, providers })
            .collect();
        entries.sort_by(|a, b| a.name.cmp(&b.name));
        entries
    }

    /// Resolve a provider-prefixed resource URI's scheme to its provider name.
    pub fn get_provider_for_uri(&self, uri: &str) -> Result<&str> {
        let Some((scheme, _)) = uri.split_once("://") else {
            return Err(Error::Validation(format!(
                "invalid URI format: {uri}. expected <provider>://<path>"
            )));
        };
        self.resource_schemes
            .get(scheme)
            .map(String::as_str)
            .ok_or_else(|| Error::Validation(format!("unknown provider scheme '{scheme}' in URI: {uri}")))
    }

    /// Strip the `<provider>://` prefix from a resource URI, if present.
    #[must_use]
    pub fn strip_provider_prefix(uri: &str) -> &str {
        uri.split_once("://").map_or(uri, |(_, rest)| rest)
    }

    /// Build a minimal catalog with only the tool-name/provider/conflict
    /// tables populated. Test-only; lets `router`'s tests exercise name
    /// resolution without a real provider fleet.
    #[cfg(test)]
    pub(crate) fn test_with(tool_provider: HashMap<String, String>, tool_conflicts: HashSet<String>) -> Self {
        Self {
            tool_provider,
            tool_conflicts,
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strip_provider_prefix_removes_scheme() {
        assert_eq!(Catalog::strip_provider_prefix("atlassian://PROJ-123"), "PROJ-123");
        assert_eq!(Catalog::strip_provider_prefix("no-scheme"), "no-scheme");
    }

    #[test]
    fn get_provider_for_uri_rejects_malformed_and_unknown() {
        let catalog = Catalog {
            resource_schemes: ["atlassian".to_string()].into_iter().collect(),
            ..Catalog::default()
        };
        assert!(matches!(
            catalog.get_provider_for_uri("no-scheme-here"),
            Err(Error::Validation(_))
        ));
        assert!(matches!(
            catalog.get_provider_for_uri("ghost://x"),
            Err(Error::Validation(_))
        ));
        assert_eq!(catalog.get_provider_for_uri("atlassian://x").unwrap(), "atlassian");
    }

    #[test]
    fn get_provider_for_tool_distinguishes_ambiguous_from_missing() {
        let mut tool_provider = HashMap::new();
        tool_provider.insert("search".to_string(), "jira".to_string());
        let mut tool_conflicts = HashSet::new();
        tool_conflicts.insert("create_issue".to_string());
        let catalog = Catalog {
            tool_provider,
            tool_conflicts,
            ..Catalog::default()
        };
        assert_eq!(catalog.get_provider_for_tool("search").unwrap(), "jira");
        assert!(matches!(
            catalog.get_provider_for_tool("create_issue"),
            Err(Error::AmbiguousTool(_))
        ));
        assert!(matches!(
            catalog.get_provider_for_tool("nope"),
            Err(Error::ToolNotFound(_))
        ));
    }

    #[test]
    fn conflict_summary_groups_by_natural_name() {
        let tools = vec![
            Tool {
                name: "jira:search".to_string(),
                description: None,
                input_schema: serde_json::json!({}),
                provider: Some("jira".to_string()),
                category: None,
                namespace_reason: Some("conflict".to_string()),
            },
            Tool {
                name: "confluence:search".to_string(),
                description: None,
                input_schema: serde_json::json!({}),
                provider: Some("confluence".to_string()),
                category: None,
                namespace_reason: Some("conflict".to_string()),
            },
        ];
        let catalog = Catalog {
            tools,
            ..Catalog::default()
        };
        let summary = catalog.conflict_summary();
        assert_eq!(summary.len(), 1);
        assert_eq!(summary[0].name, "search");
        assert_eq!(summary[0].providers.len(), 2);
    }
}
