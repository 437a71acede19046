/// Workflow Management Layer
///
/// Per-project status graphs and the rules for moving issues through them:
/// - Definition types (WorkflowDefinition, WorkflowStatus, WorkflowTransition)
/// - The engine that validates definitions and status changes
/// - A lock-free hot-reload registry using ArcSwap

// Serializable workflow definitions
pub mod types;

// Definition validation and transition checks
pub mod engine;

// Project configuration storage seam
pub mod source;

// Hot-reload registry of loaded workflows
pub mod registry;


pub use engine::{is_closing_status, load_workflow, ClosingRule, Workflow, CLOSING_STATUS_NAMES};
pub use registry::WorkflowRegistry;
pub use source::{InMemoryWorkflowSource, WorkflowSource};
pub use types::{WorkflowDefinition, WorkflowStatus, WorkflowTransition};
