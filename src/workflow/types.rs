/// Workflow definition types
///
/// The JSON-compatible shape in which a project's workflow is stored in its
/// settings and exchanged with the API. A definition is unchecked; it becomes
/// usable only after `load_workflow` turns it into a `Workflow`.

use crate::error::ConfigError;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// A single status an issue can occupy
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkflowStatus {
    /// Short stable key referenced by issues and transitions (e.g. "open")
    pub id: String,
    /// Display label
    pub name: String,
    /// Display color (e.g. "#3498db")
    pub color: String,
    /// Status assigned to newly created issues; exactly one per workflow
    #[serde(default, deserialize_with = "null_as_false")]
    pub is_initial: bool,
    /// Marks a status as done
    #[serde(default, deserialize_with = "null_as_false")]
    pub is_final: bool,
}

impl WorkflowStatus {
    pub fn new(id: impl Into<String>, name: impl Into<String>, color: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            color: color.into(),
            is_initial: false,
            is_final: false,
        }
    }

    pub fn initial(mut self) -> Self {
        self.is_initial = true;
        self
    }

    pub fn final_status(mut self) -> Self {
        self.is_final = true;
        self
    }
}

/// Outgoing edges of one status
///
/// Stored as `{"from": "open", "to": ["in_progress"]}`. The API schema names
/// (`from_status`, `to_statuses`) are accepted on input as well.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkflowTransition {
    #[serde(rename = "from", alias = "from_status")]
    pub from_status: String,
    #[serde(rename = "to", alias = "to_statuses", default)]
    pub to_statuses: Vec<String>,
}

impl WorkflowTransition {
    pub fn new<I, S>(from: impl Into<String>, to: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            from_status: from.into(),
            to_statuses: to.into_iter().map(Into::into).collect(),
        }
    }
}

/// Raw workflow definition as held in project settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkflowDefinition {
    /// Statuses in display order
    pub statuses: Vec<WorkflowStatus>,
    /// Transition table; statuses without an entry are dead ends
    #[serde(default)]
    pub transitions: Vec<WorkflowTransition>,
}

impl WorkflowDefinition {
    /// Decode a definition from a JSON value (e.g. `settings["workflow"]`)
    pub fn from_json(value: Value) -> Result<Self, ConfigError> {
        serde_json::from_value(value).map_err(|e| ConfigError::Malformed(e.to_string()))
    }

    /// Decode a definition from JSON text
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(json).map_err(|e| ConfigError::Malformed(e.to_string()))
    }

    /// Encode back to a JSON value for storage in project settings
    pub fn to_json(&self) -> serde_json::Result<Value> {
        serde_json::to_value(self)
    }
}

impl Default for WorkflowDefinition {
    /// Workflow every new project starts with
    fn default() -> Self {
        Self {
            statuses: vec![
                WorkflowStatus::new("open", "Open", "#3498db").initial(),
                WorkflowStatus::new("in_progress", "In Progress", "#f39c12"),
                WorkflowStatus::new("in_review", "In Review", "#9b59b6"),
                WorkflowStatus::new("resolved", "Resolved", "#2ecc71"),
                WorkflowStatus::new("closed", "Closed", "#95a5a6").final_status(),
            ],
            transitions: vec![
                WorkflowTransition::new("open", ["in_progress", "closed"]),
                WorkflowTransition::new("in_progress", ["in_review", "open"]),
                WorkflowTransition::new("in_review", ["resolved", "in_progress"]),
                WorkflowTransition::new("resolved", ["closed", "in_review"]),
            ],
        }
    }
}

fn null_as_false<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<bool>::deserialize(deserializer)?.unwrap_or(false))
}
