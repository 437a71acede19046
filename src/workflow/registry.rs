/// Hot-reload workflow registry using ArcSwap
///
/// Caches one loaded `Workflow` per project. Every change builds a fresh map
/// and swaps the whole pointer, so concurrent status validations always see
/// either the old or the new transition table, never a mix.

use crate::workflow::{
    engine::{ClosingRule, Workflow},
    source::WorkflowSource,
    types::WorkflowDefinition,
};
use anyhow::{Context, Result};
use arc_swap::ArcSwap;
use std::{collections::HashMap, sync::Arc};
use uuid::Uuid;

/// Lock-free cache of active project workflows
///
/// Readers call `workflow()` on every issue mutation; writers are the
/// project-settings path and startup.
pub struct WorkflowRegistry {
    /// Key: project id, Value: loaded workflow
    workflows: ArcSwap<HashMap<Uuid, Arc<Workflow>>>,

    /// Project configuration storage used for loads and saves
    source: Arc<dyn WorkflowSource>,

    /// Closing rule applied to every workflow loaded through this registry
    closing_rule: ClosingRule,
}

impl std::fmt::Debug for WorkflowRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkflowRegistry")
            .field("projects", &self.workflows.load().len())
            .field("closing_rule", &self.closing_rule)
            .finish()
    }
}

impl WorkflowRegistry {
    /// Create an empty registry backed by `source`
    pub fn new(source: Arc<dyn WorkflowSource>, closing_rule: ClosingRule) -> Self {
        Self {
            workflows: ArcSwap::new(Arc::new(HashMap::new())),
            source,
            closing_rule,
        }
    }

    /// Load every stored definition into the registry
    ///
    /// A single malformed definition fails the whole load and leaves the
    /// registry as it was.
    pub async fn init_from_source(&self) -> Result<()> {
        let definitions = self
            .source
            .load_all_definitions()
            .await
            .context("Failed to load workflow definitions")?;

        let mut loaded = HashMap::with_capacity(definitions.len());
        for (project_id, definition) in definitions {
            let workflow = self.compile(project_id, &definition)?;
            loaded.insert(project_id, Arc::new(workflow));
        }

        self.workflows.store(Arc::new(loaded));

        tracing::info!("📊 Initialized workflow registry with {} projects", self.workflows.load().len());

        Ok(())
    }

    /// Re-read one project's definition from the source and swap it in
    pub async fn reload_project(&self, project_id: Uuid) -> Result<()> {
        let definition = self
            .source
            .load_definition(project_id)
            .await?
            .ok_or_else(|| anyhow::anyhow!("Workflow not found for project: {}", project_id))?;

        let workflow = self.compile(project_id, &definition)?;
        self.swap_in(project_id, workflow);

        tracing::info!("🔥 Hot-reloaded workflow for project: {}", project_id);

        Ok(())
    }

    /// Validate, persist and activate a new workflow for a project
    ///
    /// Nothing is written and the active workflow is kept if the definition
    /// fails validation. The returned workflow is the one now active.
    pub async fn update_workflow(&self, project_id: Uuid, definition: &WorkflowDefinition) -> Result<Arc<Workflow>> {
        let workflow = self.compile(project_id, definition)?;

        self.source
            .save_definition(project_id, definition)
            .await
            .with_context(|| format!("Failed to save workflow for project {}", project_id))?;

        let workflow = self.swap_in(project_id, workflow);

        tracing::info!(
            "✅ Activated workflow for project {} ({} statuses)",
            project_id,
            workflow.statuses().len()
        );

        Ok(workflow)
    }

    /// Active workflow for a project (lock-free read)
    pub fn workflow(&self, project_id: Uuid) -> Option<Arc<Workflow>> {
        self.workflows.load().get(&project_id).cloned()
    }

    /// Ids of all projects with an active workflow
    pub fn project_ids(&self) -> Vec<Uuid> {
        self.workflows.load().keys().copied().collect()
    }

    pub fn closing_rule(&self) -> ClosingRule {
        self.closing_rule
    }

    /// Drop a project's workflow from the source and then the registry
    ///
    /// The cached workflow stays active if the source delete fails.
    pub async fn remove_project(&self, project_id: Uuid) -> Result<bool> {
        let stored = self
            .source
            .delete_definition(project_id)
            .await
            .with_context(|| format!("Failed to delete workflow for project {}", project_id))?;

        let mut cached = false;
        self.workflows.rcu(|current| {
            let mut next = (**current).clone();
            cached = next.remove(&project_id).is_some();
            next
        });

        if cached || stored {
            tracing::info!("🗑️ Removed workflow for project: {}", project_id);
        }

        Ok(cached || stored)
    }

    fn compile(&self, project_id: Uuid, definition: &WorkflowDefinition) -> Result<Workflow> {
        Workflow::load(definition, self.closing_rule).map_err(|e| {
            tracing::warn!("❌ Rejected workflow for project {}: {}", project_id, e);
            anyhow::Error::new(e).context(format!("Invalid workflow for project {}", project_id))
        })
    }

    /// Clone the current map, replace one entry and swap the pointer
    fn swap_in(&self, project_id: Uuid, workflow: Workflow) -> Arc<Workflow> {
        let workflow = Arc::new(workflow);
        self.workflows.rcu(|current| {
            let mut next = (**current).clone();
            next.insert(project_id, Arc::clone(&workflow));
            next
        });
        workflow
    }
}
