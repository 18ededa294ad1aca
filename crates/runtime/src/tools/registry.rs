//! Catalog fetch and normalization.

use std::collections::HashSet;

use super::{RemoteTool, ToolServer};
use crate::model::ToolSpec;
use crate::{Error, Result};

/// Fetch the live catalog and map it into backend tool specs.
///
/// Queries the server on every call. A single malformed entry fails the
/// whole fetch: nothing is forwarded.
pub async fn list_tools<S: ToolServer>(server: &S) -> Result<Vec<ToolSpec>> {
    let remote = server
        .list_tools()
        .await
        .map_err(|e| Error::Catalog(format!("failed to list tools: {e}")))?;

    let specs = adapt_catalog(remote)?;
    tracing::debug!(tools = specs.len(), "fetched tool catalog");
    Ok(specs)
}

/// Validate and convert a whole catalog.
pub fn adapt_catalog(remote: Vec<RemoteTool>) -> Result<Vec<ToolSpec>> {
    let mut seen = HashSet::new();
    remote
        .into_iter()
        .enumerate()
        .map(|(index, tool)| {
            let spec = adapt(index, tool)?;
            if !seen.insert(spec.name.clone()) {
                return Err(Error::Catalog(format!(
                    "duplicate tool name '{}'",
                    spec.name
                )));
            }
            Ok(spec)
        })
        .collect()
}

fn adapt(index: usize, tool: RemoteTool) -> Result<ToolSpec> {
    if tool.name.trim().is_empty() {
        return Err(Error::Catalog(format!("entry {index} has no name")));
    }
    if !tool.input_schema.is_object() {
        return Err(Error::Catalog(format!(
            "tool '{}' has a non-object input schema",
            tool.name
        )));
    }

    Ok(ToolSpec {
        name: tool.name,
        description: tool.description.unwrap_or_default(),
        parameters: tool.input_schema,
        strict: true,
    })
}
