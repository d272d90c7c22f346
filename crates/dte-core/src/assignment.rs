//! Asignación data-owner -> atributo (fase Data Owner Identification).
//!
//! Cada atributo del reporte, por LOB, debe tener un data owner responsable
//! de entregar evidencia en la fase RFI. El registro garantiza a lo sumo una
//! asignación activa por (attribute, lob); una asignación declinada puede
//! reemplazarse.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

use crate::errors::WorkflowError;

/// Ciclo de vida de la asignación:
/// `Pending` -> `Acknowledged` -> `Completed`, o `Pending` -> `Declined`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AssignmentStatus {
    Pending,
    Acknowledged,
    Completed,
    Declined,
}

impl AssignmentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AssignmentStatus::Pending => "pending",
            AssignmentStatus::Acknowledged => "acknowledged",
            AssignmentStatus::Completed => "completed",
            AssignmentStatus::Declined => "declined",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataOwnerAssignment {
    pub assignment_id: Uuid,
    pub cycle_id: Uuid,
    pub report_id: Uuid,
    pub attribute_id: Uuid,
    pub lob_id: Uuid,
    pub data_owner_id: Uuid,
    pub assigned_by: Uuid,
    pub assigned_at: DateTime<Utc>,
    pub status: AssignmentStatus,
}

impl DataOwnerAssignment {
    pub fn new(cycle_id: Uuid,
               report_id: Uuid,
               attribute_id: Uuid,
               lob_id: Uuid,
               data_owner_id: Uuid,
               assigned_by: Uuid)
               -> Self {
        DataOwnerAssignment { assignment_id: Uuid::new_v4(),
                              cycle_id,
                              report_id,
                              attribute_id,
                              lob_id,
                              data_owner_id,
                              assigned_by,
                              assigned_at: Utc::now(),
                              status: AssignmentStatus::Pending }
    }

    fn invalid(&self, attempted: &str) -> WorkflowError {
        WorkflowError::InvalidAssignmentTransition { from: self.status.as_str().to_string(),
                                                     attempted: attempted.to_string() }
    }

    pub fn acknowledge(&mut self) -> Result<(), WorkflowError> {
        if self.status != AssignmentStatus::Pending {
            return Err(self.invalid("acknowledge"));
        }
        self.status = AssignmentStatus::Acknowledged;
        Ok(())
    }

    pub fn complete(&mut self) -> Result<(), WorkflowError> {
        if self.status != AssignmentStatus::Acknowledged {
            return Err(self.invalid("complete"));
        }
        self.status = AssignmentStatus::Completed;
        Ok(())
    }

    pub fn decline(&mut self) -> Result<(), WorkflowError> {
        if self.status != AssignmentStatus::Pending {
            return Err(self.invalid("decline"));
        }
        self.status = AssignmentStatus::Declined;
        Ok(())
    }

    pub fn is_active(&self) -> bool {
        self.status != AssignmentStatus::Declined
    }
}

/// Registro de asignaciones de un (cycle, report), indexado por
/// (attribute, lob).
#[derive(Default)]
pub struct AssignmentRegistry {
    inner: HashMap<(Uuid, Uuid), DataOwnerAssignment>,
}

impl AssignmentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registra una asignación. Falla si ya existe una activa para el mismo
    /// (attribute, lob); una declinada se reemplaza.
    pub fn assign(&mut self, assignment: DataOwnerAssignment) -> Result<Uuid, WorkflowError> {
        let key = (assignment.attribute_id, assignment.lob_id);
        if let Some(existing) = self.inner.get(&key) {
            if existing.is_active() {
                return Err(WorkflowError::DuplicateAssignment { attribute_id: assignment.attribute_id,
                                                                lob_id: assignment.lob_id });
            }
        }
        let id = assignment.assignment_id;
        self.inner.insert(key, assignment);
        Ok(id)
    }

    pub fn get(&self, attribute_id: Uuid, lob_id: Uuid) -> Option<&DataOwnerAssignment> {
        self.inner.get(&(attribute_id, lob_id))
    }

    pub fn get_mut(&mut self, attribute_id: Uuid, lob_id: Uuid) -> Option<&mut DataOwnerAssignment> {
        self.inner.get_mut(&(attribute_id, lob_id))
    }

    /// Asignaciones pendientes de reconocimiento (para escalamiento).
    pub fn pending(&self) -> impl Iterator<Item = &DataOwnerAssignment> {
        self.inner.values().filter(|a| a.status == AssignmentStatus::Pending)
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}
