//! Conflict resolver (C9): builds the structured `error.data` payload for
//! ambiguous/not-found/unavailable tool errors.
//!
//! Grounded in `original_source/mcp/conflict_resolver.py`'s `ConflictResolver`.
//! The similarity score used for "did you mean" suggestions is computed as
//! the *maximum* of the three signal scores rather than the reference
//! implementation's sequential reassignment (which lets a later, weaker
//! match silently overwrite an earlier exact-substring hit) — see DESIGN.md.

use crate::aggregator::Catalog;

const SUBSTRING_SCORE: u32 = 10;
const SHARED_WORD_SCORE: u32 = 5;
const PREFIX_SCORE: u32 = 3;
const PREFIX_LEN: usize = 3;
const MAX_SUGGESTIONS: usize = 5;

fn similarity_score(target: &str, candidate: &str) -> u32 {
    let target_lower = target.to_lowercase();
    let candidate_lower = candidate.to_lowercase();

    let mut score = 0;
    if candidate_lower.contains(&target_lower) {
        score = score.max(SUBSTRING_SCORE);
    }
    if target_lower
        .split('_')
        .any(|word| !word.is_empty() && candidate_lower.contains(word))
    {
        score = score.max(SHARED_WORD_SCORE);
    }
    let prefix: String = target_lower.chars().take(PREFIX_LEN).collect();
    if !prefix.is_empty() && candidate_lower.starts_with(&prefix) {
        score = score.max(PREFIX_SCORE);
    }
    score
}

/// The top (at most `MAX_SUGGESTIONS`) candidate names most similar to
/// `target`, ranked by [`similarity_score`] descending, ties broken by the
/// candidate's position in `candidates`.
fn find_similar<'a>(target: &str, candidates: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut scored: Vec<(u32, usize, &str)> = candidates
        .enumerate()
        .map(|(i, name)| (similarity_score(target, name), i, name))
        .filter(|(score, _, _)| *score > 0)
        .collect();
    scored.sort_by(|a, b| b.0.cmp(&a.0).then(a.1.cmp(&b.1)));
    scored
        .into_iter()
        .take(MAX_SUGGESTIONS)
        .map(|(_, _, name)| name.to_string())
        .collect()
}

/// Structured `error.data` payload for an ambiguous tool name (spec §4.9).
#[derive(Debug, serde::Serialize)]
pub struct AmbiguityError {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub tool_name: String,
    pub message: String,
    pub available_tools: Vec<String>,
    pub suggestion: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub example: Option<String>,
}

/// Build the ambiguity payload for `tool_name`, listing every namespaced
/// variant the catalog published for it.
#[must_use]
pub fn ambiguity_error(tool_name: &str, catalog: &Catalog) -> AmbiguityError {
    let variants: Vec<String> = catalog
        .tools()
        .iter()
        .filter(|t| {
            t.name
                .split_once(':')
                .is_some_and(|(_, base)| base == tool_name)
        })
        .map(|t| t.name.clone())
        .collect();
    let suggestion = format!("Please specify provider using one of: {}", variants.join(", "));
    let example = variants.first().cloned();
    AmbiguityError {
        kind: "ambiguous_tool",
        tool_name: tool_name.to_string(),
        message: format!("Tool '{tool_name}' exists in multiple providers"),
        available_tools: variants,
        suggestion,
        example,
    }
}

/// Structured `error.data` payload for a tool name that matched nothing.
#[derive(Debug, serde::Serialize)]
pub struct NotFoundError {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub tool_name: String,
    pub message: String,
    pub similar_tools: Vec<String>,
}

/// Build the not-found payload for `tool_name`, suggesting similarly-named
/// published tools.
#[must_use]
pub fn not_found_error(tool_name: &str, catalog: &Catalog) -> NotFoundError {
    let similar = find_similar(tool_name, catalog.tools().iter().map(|t| t.name.as_str()));
    NotFoundError {
        kind: "tool_not_found",
        tool_name: tool_name.to_string(),
        message: format!("Tool '{tool_name}' not found"),
        similar_tools: similar,
    }
}

/// Structured `error.data` payload for a provider that isn't connected.
#[derive(Debug, serde::Serialize)]
pub struct ProviderUnavailableError {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub provider_name: String,
    pub message: String,
}

/// Build the provider-unavailable payload for `provider_name`.
#[must_use]
pub fn provider_unavailable_error(provider_name: &str) -> ProviderUnavailableError {
    ProviderUnavailableError {
        kind: "provider_unavailable",
        provider_name: provider_name.to_string(),
        message: format!("Provider '{provider_name}' is not available"),
    }
}
