//! Instancia en ejecución de una actividad para un (cycle, report, phase).
//!
//! Las transiciones válidas son:
//! - `NotStarted` -> `InProgress` (start)
//! - `InProgress` -> `Completed` (complete)
//! - `NotStarted` -> `Skipped` (skip, sólo actividades opcionales)
//! - `NotStarted` | `InProgress` -> `Blocked` (block) y vuelta (unblock)
//! - `Completed` -> `RevisionRequested` -> `InProgress` (rework)
//!
//! No se permiten reversiones ni saltos arbitrarios: toda transición inválida
//! devuelve `WorkflowError::InvalidTransition` en lugar de ignorarse.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use dte_domain::WorkflowPhase;

use crate::errors::WorkflowError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActivityStatus {
    NotStarted,
    InProgress,
    Completed,
    RevisionRequested,
    Blocked,
    Skipped,
}

impl ActivityStatus {
    /// Estados terminales a efectos de cierre de fase.
    pub fn is_terminal(&self) -> bool {
        matches!(self, ActivityStatus::Completed | ActivityStatus::Skipped)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityInstance {
    pub cycle_id: Uuid,
    pub report_id: Uuid,
    pub phase: WorkflowPhase,
    pub name: String,
    pub status: ActivityStatus,
    /// Recalculado por el resolver; nunca se muta a mano.
    pub can_start: bool,
    pub can_complete: bool,
    pub started_at: Option<DateTime<Utc>>,
    pub started_by: Option<Uuid>,
    pub completed_at: Option<DateTime<Utc>>,
    pub completed_by: Option<Uuid>,
    pub blocked_reason: Option<String>,
}

impl ActivityInstance {
    pub fn fresh(cycle_id: Uuid, report_id: Uuid, phase: WorkflowPhase, name: &str) -> Self {
        ActivityInstance { cycle_id,
                           report_id,
                           phase,
                           name: name.to_string(),
                           status: ActivityStatus::NotStarted,
                           can_start: false,
                           can_complete: false,
                           started_at: None,
                           started_by: None,
                           completed_at: None,
                           completed_by: None,
                           blocked_reason: None }
    }

    fn invalid(&self, attempted: &str) -> WorkflowError {
        WorkflowError::InvalidTransition { activity: self.name.clone(),
                                           from: self.status,
                                           attempted: attempted.to_string() }
    }

    /// `NotStarted` o `RevisionRequested` (rework) -> `InProgress`.
    pub fn start(&mut self, actor: Uuid, at: DateTime<Utc>) -> Result<(), WorkflowError> {
        match self.status {
            ActivityStatus::NotStarted | ActivityStatus::RevisionRequested => {
                self.status = ActivityStatus::InProgress;
                self.started_at = Some(at);
                self.started_by = Some(actor);
                Ok(())
            }
            _ => Err(self.invalid("start")),
        }
    }

    /// `InProgress` -> `Completed`.
    pub fn complete(&mut self, actor: Uuid, at: DateTime<Utc>) -> Result<(), WorkflowError> {
        match self.status {
            ActivityStatus::InProgress => {
                self.status = ActivityStatus::Completed;
                self.completed_at = Some(at);
                self.completed_by = Some(actor);
                Ok(())
            }
            _ => Err(self.invalid("complete")),
        }
    }

    /// `NotStarted` -> `Skipped`. La opcionalidad la valida el engine contra
    /// la plantilla; la instancia sólo conoce su propio estado.
    pub fn skip(&mut self) -> Result<(), WorkflowError> {
        match self.status {
            ActivityStatus::NotStarted => {
                self.status = ActivityStatus::Skipped;
                Ok(())
            }
            _ => Err(self.invalid("skip")),
        }
    }

    /// `NotStarted` | `InProgress` -> `Blocked`, registrando la causa.
    pub fn block(&mut self, reason: &str) -> Result<(), WorkflowError> {
        match self.status {
            ActivityStatus::NotStarted | ActivityStatus::InProgress => {
                self.status = ActivityStatus::Blocked;
                self.blocked_reason = Some(reason.to_string());
                Ok(())
            }
            _ => Err(self.invalid("block")),
        }
    }

    /// `Blocked` -> estado previo (según haya arrancado o no).
    pub fn unblock(&mut self) -> Result<(), WorkflowError> {
        match self.status {
            ActivityStatus::Blocked => {
                self.status = if self.started_at.is_some() {
                    ActivityStatus::InProgress
                } else {
                    ActivityStatus::NotStarted
                };
                self.blocked_reason = None;
                Ok(())
            }
            _ => Err(self.invalid("unblock")),
        }
    }

    /// `Completed` -> `RevisionRequested`.
    pub fn request_revision(&mut self) -> Result<(), WorkflowError> {
        match self.status {
            ActivityStatus::Completed => {
                self.status = ActivityStatus::RevisionRequested;
                self.completed_at = None;
                self.completed_by = None;
                Ok(())
            }
            _ => Err(self.invalid("request_revision")),
        }
    }
}
