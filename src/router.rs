//! Router (C7): dispatches a namespace-resolved tool call or resource read
//! to its owning provider.
//!
//! Grounded in `original_source/mcp/router.py`'s `ToolRouter`/`ResourceRouter`.

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value;

use crate::aggregator::Catalog;
use crate::protocol::ResourceContent;
use crate::provider::ProviderInstance;
use crate::{Error, Result};

/// Split `tool_name` into `(provider, actual_tool_name)`.
///
/// An explicitly namespaced name (`provider:tool`) is checked against the
/// catalog's recorded owner — if the caller's prefix doesn't match the
/// provider the catalog actually assigned the tool to, that's a validation
/// error, not a silent reroute. An unnamespaced name is resolved through
/// [`Catalog::get_provider_for_tool`], which raises ambiguous/not-found as
/// appropriate.
fn parse_tool_name<'a>(tool_name: &'a str, catalog: &Catalog) -> Result<(&'a str, &'a str)> {
    if let Some((provider_name, actual_name)) = tool_name.split_once(':') {
        let expected = catalog.get_provider_for_tool(tool_name).map_err(|_| {
            Error::ToolNotFound(tool_name.to_string())
        })?;
        if expected != provider_name {
            return Err(Error::Validation(format!(
                "tool '{tool_name}' does not belong to provider '{provider_name}'"
            )));
        }
        return Ok((provider_name, actual_name));
    }

    let provider_name = catalog.get_provider_for_tool(tool_name)?;
    Ok((provider_name, tool_name))
}

/// Routes `tools/call` to the provider the catalog assigned the tool to.
pub struct ToolRouter<'a> {
    providers: &'a HashMap<String, Arc<ProviderInstance>>,
    catalog: &'a Catalog,
}

impl<'a> ToolRouter<'a> {
    /// Build a router over a connected-provider table and catalog snapshot.
    #[must_use]
    pub fn new(providers: &'a HashMap<String, Arc<ProviderInstance>>, catalog: &'a Catalog) -> Self {
        Self { providers, catalog }
    }

    /// Resolve and dispatch `tool_name`/`arguments` to its owning provider.
    pub async fn route_tool_call(&self, tool_name: &str, arguments: Value) -> Result<Value> {
        let (provider_name, actual_name) = parse_tool_name(tool_name, self.catalog)?;
        let provider = self
            .providers
            .get(provider_name)
            .ok_or_else(|| Error::ProviderUnavailable(provider_name.to_string()))?;
        provider.call_tool(actual_name, arguments).await
    }
}

/// Routes `resources/read` to the provider named by the URI's scheme.
pub struct ResourceRouter<'a> {
    providers: &'a HashMap<String, Arc<ProviderInstance>>,
    catalog: &'a Catalog,
}

impl<'a> ResourceRouter<'a> {
    /// Build a router over a connected-provider table and catalog snapshot.
    #[must_use]
    pub fn new(providers: &'a HashMap<String, Arc<ProviderInstance>>, catalog: &'a Catalog) -> Self {
        Self { providers, catalog }
    }

    /// Resolve `uri`'s scheme to a provider, strip the prefix, and read.
    pub async fn route_resource_read(&self, uri: &str) -> Result<Vec<ResourceContent>> {
        let provider_name = self.catalog.get_provider_for_uri(uri)?;
        let provider = self
            .providers
            .get(provider_name)
            .ok_or_else(|| Error::ProviderUnavailable(provider_name.to_string()))?;
        let original_uri = Catalog::strip_provider_prefix(uri);
        provider.read_resource(original_uri).await
    }
}
