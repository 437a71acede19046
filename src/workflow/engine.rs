/// Workflow engine
///
/// Turns a raw `WorkflowDefinition` into a validated `Workflow` and answers
/// status-change questions against it. Everything here is pure and
/// synchronous: a loaded `Workflow` is immutable, so it can be shared freely
/// across request handlers.

use crate::error::{ConfigError, TransitionError};
use crate::workflow::types::{WorkflowDefinition, WorkflowStatus, WorkflowTransition};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::str::FromStr;

/// Status ids that close an issue under the literal-name rule
pub const CLOSING_STATUS_NAMES: [&str; 2] = ["closed", "resolved"];

/// Literal closing check, independent of any workflow.
///
/// True iff `status_id` is exactly `"closed"` or `"resolved"`.
pub fn is_closing_status(status_id: &str) -> bool {
    CLOSING_STATUS_NAMES.contains(&status_id)
}

/// How a workflow decides whether a status closes an issue
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClosingRule {
    /// A status closes an issue iff it is flagged `is_final`
    #[default]
    FinalFlag,
    /// A status closes an issue iff its id is "closed" or "resolved"
    LiteralNames,
}

impl ClosingRule {
    pub fn as_str(&self) -> &'static str {
        match self {
            ClosingRule::FinalFlag => "final_flag",
            ClosingRule::LiteralNames => "literal_names",
        }
    }
}

impl fmt::Display for ClosingRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ClosingRule {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "final_flag" | "final" => Ok(ClosingRule::FinalFlag),
            "literal_names" | "literal" => Ok(ClosingRule::LiteralNames),
            other => Err(format!("unknown closing rule: {}", other)),
        }
    }
}

/// A validated, immutable workflow
///
/// Invariants established by `load`:
/// - the status list is non-empty and ids are unique and non-empty
/// - exactly one status is initial
/// - every id in the transition table exists in the status list
#[derive(Debug, Clone)]
pub struct Workflow {
    /// Statuses in configured order
    statuses: Vec<WorkflowStatus>,
    /// status id -> position in `statuses`
    index: HashMap<String, usize>,
    /// from status id -> directly reachable status ids
    transitions: HashMap<String, BTreeSet<String>>,
    /// Position of the initial status
    initial: usize,
    closing_rule: ClosingRule,
}

/// Load a workflow with the default closing rule
pub fn load_workflow(definition: &WorkflowDefinition) -> Result<Workflow, ConfigError> {
    Workflow::load(definition, ClosingRule::default())
}

impl Workflow {
    /// Validate a definition and build the lookup tables
    pub fn load(definition: &WorkflowDefinition, closing_rule: ClosingRule) -> Result<Self, ConfigError> {
        if definition.statuses.is_empty() {
            return Err(ConfigError::EmptyStatuses);
        }

        let mut index = HashMap::with_capacity(definition.statuses.len());
        for (pos, status) in definition.statuses.iter().enumerate() {
            if status.id.is_empty() {
                return Err(ConfigError::EmptyStatusId);
            }
            if index.insert(status.id.clone(), pos).is_some() {
                return Err(ConfigError::DuplicateStatus(status.id.clone()));
            }
        }

        let initial_ids: Vec<String> = definition
            .statuses
            .iter()
            .filter(|s| s.is_initial)
            .map(|s| s.id.clone())
            .collect();
        let initial = match initial_ids.as_slice() {
            [] => return Err(ConfigError::MissingInitial),
            [only] => index[only],
            _ => return Err(ConfigError::MultipleInitial(initial_ids)),
        };

        let mut transitions = HashMap::with_capacity(definition.transitions.len());
        for transition in &definition.transitions {
            let from = &transition.from_status;
            if !index.contains_key(from) {
                return Err(ConfigError::UnknownStatus {
                    from: from.clone(),
                    status: from.clone(),
                });
            }

            let mut targets = BTreeSet::new();
            for to in &transition.to_statuses {
                if !index.contains_key(to) {
                    return Err(ConfigError::UnknownStatus {
                        from: from.clone(),
                        status: to.clone(),
                    });
                }
                targets.insert(to.clone());
            }

            if transitions.insert(from.clone(), targets).is_some() {
                return Err(ConfigError::DuplicateTransition(from.clone()));
            }
        }

        tracing::debug!(
            "Loaded workflow with {} statuses, {} transition entries (initial: {}, closing rule: {})",
            definition.statuses.len(),
            transitions.len(),
            definition.statuses[initial].id,
            closing_rule
        );

        Ok(Self {
            statuses: definition.statuses.clone(),
            index,
            transitions,
            initial,
            closing_rule,
        })
    }

    /// Status assigned to newly created issues
    pub fn initial_status(&self) -> &str {
        &self.statuses[self.initial].id
    }

    pub fn is_valid_status(&self, status_id: &str) -> bool {
        self.index.contains_key(status_id)
    }

    pub fn status(&self, status_id: &str) -> Option<&WorkflowStatus> {
        self.index.get(status_id).map(|&pos| &self.statuses[pos])
    }

    /// Statuses in configured display order
    pub fn statuses(&self) -> &[WorkflowStatus] {
        &self.statuses
    }

    /// Statuses flagged `is_final`
    pub fn final_statuses(&self) -> impl Iterator<Item = &WorkflowStatus> {
        self.statuses.iter().filter(|s| s.is_final)
    }

    pub fn closing_rule(&self) -> ClosingRule {
        self.closing_rule
    }

    /// Legal targets from `from_status`.
    ///
    /// Empty for a status without a transition entry and for unknown ids.
    pub fn to_statuses(&self, from_status: &str) -> BTreeSet<String> {
        self.transitions.get(from_status).cloned().unwrap_or_default()
    }

    /// True iff `to_status` is listed among the targets of `from_status`.
    ///
    /// Self-transitions are never implied; they must be configured.
    pub fn can_transition(&self, from_status: &str, to_status: &str) -> bool {
        self.is_valid_status(to_status)
            && self
                .transitions
                .get(from_status)
                .is_some_and(|targets| targets.contains(to_status))
    }

    /// Check a proposed status change before it is persisted
    pub fn validate_status_change(&self, from_status: &str, to_status: &str) -> Result<(), TransitionError> {
        if self.can_transition(from_status, to_status) {
            tracing::debug!("Status change accepted: {} -> {}", from_status, to_status);
            return Ok(());
        }

        tracing::warn!("Status change rejected: {} -> {}", from_status, to_status);
        Err(TransitionError {
            from: from_status.to_string(),
            to: to_status.to_string(),
            allowed: self.to_statuses(from_status),
        })
    }

    /// Whether landing on `status_id` closes an issue, per this workflow's rule
    pub fn is_closing_status(&self, status_id: &str) -> bool {
        match self.closing_rule {
            ClosingRule::FinalFlag => self.status(status_id).is_some_and(|s| s.is_final),
            ClosingRule::LiteralNames => is_closing_status(status_id),
        }
    }

    /// Rebuild the storable definition
    ///
    /// Transition entries follow status order; targets are sorted.
    pub fn to_definition(&self) -> WorkflowDefinition {
        let transitions = self
            .statuses
            .iter()
            .filter_map(|status| {
                self.transitions
                    .get(&status.id)
                    .map(|targets| WorkflowTransition::new(status.id.clone(), targets.iter().cloned()))
            })
            .collect();

        WorkflowDefinition {
            statuses: self.statuses.clone(),
            transitions,
        }
    }
}
