//! Pedidos de revisión estructurados.
//!
//! Un revisor (tester o report owner) pide rework sobre una versión, una
//! evidencia o una actividad. El ciclo de vida replica el del sistema
//! original:
//! `Pending` -> `Acknowledged` -> `InProgress` -> `Resubmitted` ->
//! `Approved` | `Rejected`.
//! Toda transición fuera de tabla devuelve error tipado.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::WorkflowError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RevisionStatus {
    Pending,
    Acknowledged,
    InProgress,
    Resubmitted,
    Approved,
    Rejected,
}

impl RevisionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RevisionStatus::Pending => "pending",
            RevisionStatus::Acknowledged => "acknowledged",
            RevisionStatus::InProgress => "in_progress",
            RevisionStatus::Resubmitted => "resubmitted",
            RevisionStatus::Approved => "approved",
            RevisionStatus::Rejected => "rejected",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, RevisionStatus::Approved | RevisionStatus::Rejected)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RevisionPriority {
    Low,
    Medium,
    High,
    Critical,
}

/// Sobre qué recae el pedido de revisión.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RevisionTarget {
    Version(Uuid),
    Evidence(String), // hash de la evidencia
    Activity(String), // nombre de la actividad
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevisionRequest {
    pub request_id: Uuid,
    pub target: RevisionTarget,
    pub status: RevisionStatus,
    pub priority: RevisionPriority,
    pub due_date: Option<NaiveDate>,
    pub requested_by: Uuid,
    pub requested_at: DateTime<Utc>,
    pub notes: Option<String>,
    pub resolved_at: Option<DateTime<Utc>>,
}

impl RevisionRequest {
    pub fn new(target: RevisionTarget, priority: RevisionPriority, requested_by: Uuid) -> Self {
        RevisionRequest { request_id: Uuid::new_v4(),
                          target,
                          status: RevisionStatus::Pending,
                          priority,
                          due_date: None,
                          requested_by,
                          requested_at: Utc::now(),
                          notes: None,
                          resolved_at: None }
    }

    pub fn with_due_date(mut self, due: NaiveDate) -> Self {
        self.due_date = Some(due);
        self
    }

    pub fn with_notes(mut self, notes: &str) -> Self {
        self.notes = Some(notes.to_string());
        self
    }

    fn invalid(&self, attempted: &str) -> WorkflowError {
        WorkflowError::InvalidRevisionTransition { from: self.status.as_str().to_string(),
                                                   attempted: attempted.to_string() }
    }

    fn transition(&mut self, from: RevisionStatus, to: RevisionStatus, attempted: &str) -> Result<(), WorkflowError> {
        if self.status != from {
            return Err(self.invalid(attempted));
        }
        self.status = to;
        if to.is_terminal() {
            self.resolved_at = Some(Utc::now());
        }
        Ok(())
    }

    pub fn acknowledge(&mut self) -> Result<(), WorkflowError> {
        self.transition(RevisionStatus::Pending, RevisionStatus::Acknowledged, "acknowledge")
    }

    pub fn begin(&mut self) -> Result<(), WorkflowError> {
        self.transition(RevisionStatus::Acknowledged, RevisionStatus::InProgress, "begin")
    }

    pub fn resubmit(&mut self) -> Result<(), WorkflowError> {
        self.transition(RevisionStatus::InProgress, RevisionStatus::Resubmitted, "resubmit")
    }

    pub fn approve(&mut self) -> Result<(), WorkflowError> {
        self.transition(RevisionStatus::Resubmitted, RevisionStatus::Approved, "approve")
    }

    pub fn reject(&mut self) -> Result<(), WorkflowError> {
        self.transition(RevisionStatus::Resubmitted, RevisionStatus::Rejected, "reject")
    }

    /// Vencido: tiene due_date pasada y no llegó a estado terminal.
    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        match self.due_date {
            Some(due) => due < today && !self.status.is_terminal(),
            None => false,
        }
    }
}
