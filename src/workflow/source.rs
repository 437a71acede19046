/// Workflow definition sources
///
/// The registry does not own persistence. It reads and writes project workflow
/// definitions through `WorkflowSource`, implemented by whatever stores project
/// settings. `InMemoryWorkflowSource` is provided for embedding and tests.

use crate::workflow::types::WorkflowDefinition;
use anyhow::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

/// Project configuration storage as seen by the workflow registry
#[async_trait]
pub trait WorkflowSource: Send + Sync {
    /// Fetch the stored definition for one project
    async fn load_definition(&self, project_id: Uuid) -> Result<Option<WorkflowDefinition>>;

    /// Fetch every stored definition (used at startup)
    async fn load_all_definitions(&self) -> Result<HashMap<Uuid, WorkflowDefinition>>;

    /// Persist a definition that has already passed validation
    async fn save_definition(&self, project_id: Uuid, definition: &WorkflowDefinition) -> Result<()>;

    /// Delete a project's definition; returns whether one existed
    async fn delete_definition(&self, project_id: Uuid) -> Result<bool>;
}

/// Workflow definitions held in process memory
#[derive(Debug, Default)]
pub struct InMemoryWorkflowSource {
    definitions: RwLock<HashMap<Uuid, WorkflowDefinition>>,
}

impl InMemoryWorkflowSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the source with existing definitions
    pub fn with_definitions(definitions: HashMap<Uuid, WorkflowDefinition>) -> Self {
        Self {
            definitions: RwLock::new(definitions),
        }
    }

    /// Number of stored definitions
    pub async fn len(&self) -> usize {
        self.definitions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.definitions.read().await.is_empty()
    }
}

#[async_trait]
impl WorkflowSource for InMemoryWorkflowSource {
    async fn load_definition(&self, project_id: Uuid) -> Result<Option<WorkflowDefinition>> {
        Ok(self.definitions.read().await.get(&project_id).cloned())
    }

    async fn load_all_definitions(&self) -> Result<HashMap<Uuid, WorkflowDefinition>> {
        Ok(self.definitions.read().await.clone())
    }

    async fn save_definition(&self, project_id: Uuid, definition: &WorkflowDefinition) -> Result<()> {
        self.definitions
            .write()
            .await
            .insert(project_id, definition.clone());
        Ok(())
    }

    async fn delete_definition(&self, project_id: Uuid) -> Result<bool> {
        Ok(self.definitions.write().await.remove(&project_id).is_some())
    }
}
