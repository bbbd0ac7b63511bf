//! Name → tool mapping assembled once at startup.

use std::collections::BTreeMap;
use std::fmt::{self, Debug, Formatter};
use std::sync::Arc;

use tracing::{debug, warn};

use super::handler::ToolHandler;
use crate::models::schema::Schema;
use crate::models::tool::ToolDefinition;
use crate::schema::translate;
use crate::{AppError, Result};

/// A tool ready for registration.
#[derive(Clone)]
pub struct Tool {
    name: String,
    description: Option<String>,
    schema: Option<Schema>,
    handler: Arc<dyn ToolHandler>,
}

impl Tool {
    /// Tool with no input schema; input reaches the handler unvalidated.
    pub fn new(name: impl Into<String>, handler: impl ToolHandler + 'static) -> Self {
        Self {
            name: name.into(),
            description: None,
            schema: None,
            handler: Arc::new(handler),
        }
    }

    /// Attach an input schema.
    #[must_use]
    pub fn with_schema(mut self, schema: Schema) -> Self {
        self.schema = Some(schema);
        self
    }

    /// Override the default `"Tool: <name>"` description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Registered name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Input schema, if any.
    #[must_use]
    pub fn schema(&self) -> Option<&Schema> {
        self.schema.as_ref()
    }

    /// Implementation.
    #[must_use]
    pub fn handler(&self) -> &Arc<dyn ToolHandler> {
        &self.handler
    }

    /// Description served to clients.
    #[must_use]
    pub fn description(&self) -> String {
        self.description
            .clone()
            .unwrap_or_else(|| format!("Tool: {}", self.name))
    }

    /// Discovery entry for this tool.
    #[must_use]
    pub fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: self.name.clone(),
            description: self.description(),
            input_schema: translate(self.schema.as_ref()),
        }
    }
}

impl Debug for Tool {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tool")
            .field("name", &self.name)
            .field("description", &self.description)
            .field("schema", &self.schema)
            .finish_non_exhaustive()
    }
}

/// Collects tools before the registry is frozen.
#[derive(Debug, Default)]
pub struct ToolRegistryBuilder {
    tools: BTreeMap<String, Tool>,
}

impl ToolRegistryBuilder {
    /// Register `handler` under `name` with an optional schema.
    ///
    /// A later registration under the same name replaces the earlier one;
    /// returns `true` when that happened.
    pub fn register(
        &mut self,
        name: impl Into<String>,
        handler: impl ToolHandler + 'static,
        schema: Option<Schema>,
    ) -> bool {
        let mut tool = Tool::new(name, handler);
        tool.schema = schema;
        self.insert(tool)
    }

    /// Add a prepared tool, replacing any tool of the same name.
    ///
    /// Returns `true` when an earlier registration was replaced.
    pub fn insert(&mut self, tool: Tool) -> bool {
        let name = tool.name.clone();
        let replaced = self.tools.insert(name.clone(), tool).is_some();
        if replaced {
            warn!(tool = %name, "tool registered twice; last registration wins");
        } else {
            debug!(tool = %name, "tool registered");
        }
        replaced
    }

    /// Add a prepared tool, refusing to replace an existing one.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` when a tool of that name already exists.
    pub fn try_insert(&mut self, tool: Tool) -> Result<()> {
        if self.tools.contains_key(&tool.name) {
            return Err(AppError::Config(format!(
                "tool '{}' is already registered",
                tool.name
            )));
        }
        self.insert(tool);
        Ok(())
    }

    /// Chainable form of [`ToolRegistryBuilder::insert`].
    #[must_use]
    pub fn tool(mut self, tool: Tool) -> Self {
        self.insert(tool);
        self
    }

    /// Freeze the registry.
    #[must_use]
    pub fn build(self) -> ToolRegistry {
        ToolRegistry { tools: self.tools }
    }
}

/// Read-only tool registry shared by every request and session.
#[derive(Debug, Default)]
pub struct ToolRegistry {
    tools: BTreeMap<String, Tool>,
}

impl ToolRegistry {
    /// Start collecting tools.
    #[must_use]
    pub fn builder() -> ToolRegistryBuilder {
        ToolRegistryBuilder::default()
    }

    /// Look up a tool by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Tool> {
        self.tools.get(name)
    }

    /// Number of registered tools.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    /// Whether no tools are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Registered names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.tools.keys().map(String::as_str)
    }

    /// `name → definition` map served by `GET /tool-definition`.
    #[must_use]
    pub fn definitions(&self) -> BTreeMap<String, ToolDefinition> {
        self.tools
            .iter()
            .map(|(name, tool)| (name.clone(), tool.definition()))
            .collect()
    }

    /// Definitions sorted by name, as listed by `tools/list`.
    #[must_use]
    pub fn list(&self) -> Vec<ToolDefinition> {
        self.tools.values().map(Tool::definition).collect()
    }
}
