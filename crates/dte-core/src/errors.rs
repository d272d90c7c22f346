//! Errores específicos del motor de workflow.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::activity::ActivityStatus;

#[derive(Debug, Error, PartialEq, Eq, Clone, Serialize, Deserialize)]
pub enum WorkflowError {
    #[error("phase already completed")] PhaseCompleted,
    #[error("activity not found: {0}")] ActivityNotFound(String),
    #[error("duplicate activity name: {0}")] DuplicateActivity(String),
    #[error("dependency references unknown activity: {0}")] UnknownDependency(String),
    #[error("dependency cycle detected involving: {0}")] DependencyCycle(String),
    #[error("approval dependency on '{depends_on}' must target an approval activity")]
    InvalidApprovalDependency { depends_on: String },
    #[error("template belongs to phase {expected} but declares {found}")]
    PhaseMismatch { expected: String, found: String },
    #[error("invalid transition for '{activity}': {from:?} -> {attempted}")]
    InvalidTransition {
        activity: String,
        from: ActivityStatus,
        attempted: String,
    },
    #[error("dependencies unmet for '{activity}': {unmet:?}")]
    DependenciesUnmet { activity: String, unmet: Vec<String> },
    #[error("role '{actual}' not permitted for '{activity}' (requires '{required}')")]
    RoleNotPermitted {
        activity: String,
        required: String,
        actual: String,
    },
    #[error("activity is not optional, cannot skip: {0}")] NotOptional(String),
    #[error("duplicate active assignment for attribute {attribute_id} / lob {lob_id}")]
    DuplicateAssignment { attribute_id: uuid::Uuid, lob_id: uuid::Uuid },
    #[error("invalid assignment transition: {from} -> {attempted}")]
    InvalidAssignmentTransition { from: String, attempted: String },
    #[error("invalid revision transition: {from} -> {attempted}")]
    InvalidRevisionTransition { from: String, attempted: String },
    #[error("internal: {0}")] Internal(String),
}

/// Clasificación gruesa del error, usada por la capa de persistencia para
/// etiquetar filas de auditoría.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// Plantilla o entrada mal formada (duplicados, ciclos, referencias).
    Validation,
    /// Transición de estado rechazada por las guardas del motor.
    Transition,
    /// Error interno no clasificado.
    Permanent,
}

pub fn classify_error(err: &WorkflowError) -> ErrorClass {
    match err {
        WorkflowError::DuplicateActivity(_)
        | WorkflowError::UnknownDependency(_)
        | WorkflowError::DependencyCycle(_)
        | WorkflowError::InvalidApprovalDependency { .. }
        | WorkflowError::PhaseMismatch { .. }
        | WorkflowError::NotOptional(_) => ErrorClass::Validation,
        WorkflowError::PhaseCompleted
        | WorkflowError::ActivityNotFound(_)
        | WorkflowError::InvalidTransition { .. }
        | WorkflowError::DependenciesUnmet { .. }
        | WorkflowError::RoleNotPermitted { .. }
        | WorkflowError::DuplicateAssignment { .. }
        | WorkflowError::InvalidAssignmentTransition { .. }
        | WorkflowError::InvalidRevisionTransition { .. } => ErrorClass::Transition,
        WorkflowError::Internal(_) => ErrorClass::Permanent,
    }
}
