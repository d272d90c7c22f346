//! Ledger de versiones de una fase: sostiene los invariantes que el sistema
//! original sólo enunciaba como reglas de negocio.

use uuid::Uuid;

use dte_domain::WorkflowPhase;

use super::{PhaseVersion, VersionError, VersionStatus};

/// Dueño de todas las versiones de un (cycle, report, phase).
///
/// Invariantes (en código, no en la base):
/// - `version_number` único y monotónico (asignado por el ledger).
/// - A lo sumo una versión `Approved` a la vez: `approve` supersede a la
///   anterior aprobada en la misma operación.
/// - Nada se borra: superseded y rejected quedan para auditoría.
#[derive(Debug, Clone)]
pub struct VersionLedger {
    cycle_id: Uuid,
    report_id: Uuid,
    phase: WorkflowPhase,
    versions: Vec<PhaseVersion>,
}

impl VersionLedger {
    pub fn new(cycle_id: Uuid, report_id: Uuid, phase: WorkflowPhase) -> Self {
        VersionLedger { cycle_id,
                        report_id,
                        phase,
                        versions: Vec::new() }
    }

    pub fn cycle_id(&self) -> Uuid {
        self.cycle_id
    }
    pub fn report_id(&self) -> Uuid {
        self.report_id
    }
    pub fn phase(&self) -> WorkflowPhase {
        self.phase
    }

    /// Todas las versiones en orden de creación (== orden de número).
    pub fn versions(&self) -> &[PhaseVersion] {
        &self.versions
    }

    pub fn get(&self, version_id: Uuid) -> Option<&PhaseVersion> {
        self.versions.iter().find(|v| v.version_id == version_id)
    }

    pub fn get_mut(&mut self, version_id: Uuid) -> Option<&mut PhaseVersion> {
        self.versions.iter_mut().find(|v| v.version_id == version_id)
    }

    /// Versión aprobada vigente, si existe (a lo sumo una).
    pub fn current_approved(&self) -> Option<&PhaseVersion> {
        self.versions.iter().find(|v| v.status == VersionStatus::Approved)
    }

    fn next_number(&self) -> u32 {
        self.versions.iter().map(|v| v.version_number).max().unwrap_or(0) + 1
    }

    /// Crea un draft nuevo. El parent es la última versión existente (o
    /// ninguno para la primera).
    pub fn create_draft(&mut self, created_by: Uuid) -> Uuid {
        let parent = self.versions.last().map(|v| v.version_id);
        let version = PhaseVersion::draft(self.cycle_id,
                                          self.report_id,
                                          self.phase,
                                          self.next_number(),
                                          parent,
                                          created_by);
        let id = version.version_id;
        self.versions.push(version);
        id
    }

    /// Crea un draft hijo explícito de una versión aprobada o rechazada
    /// (flujo de revisión).
    pub fn revise(&mut self, parent_version_id: Uuid, created_by: Uuid) -> Result<Uuid, VersionError> {
        let parent = self.get(parent_version_id)
                         .ok_or(VersionError::ParentNotFound(parent_version_id))?;
        if !matches!(parent.status, VersionStatus::Approved | VersionStatus::Rejected) {
            return Err(VersionError::ParentNotRevisable(parent.status.as_str().to_string()));
        }
        let version = PhaseVersion::draft(self.cycle_id,
                                          self.report_id,
                                          self.phase,
                                          self.next_number(),
                                          Some(parent_version_id),
                                          created_by);
        let id = version.version_id;
        self.versions.push(version);
        Ok(id)
    }

    /// Submit de un draft para aprobación.
    pub fn submit(&mut self, version_id: Uuid, by: Uuid) -> Result<(), VersionError> {
        self.get_mut(version_id)
            .ok_or(VersionError::VersionNotFound(version_id))?
            .submit(by)
    }

    /// Aprueba una versión pendiente. En la misma operación la versión
    /// aprobada anterior (si la hay) pasa a `Superseded`; el invariante de
    /// "una sola approved" nunca queda roto entre pasos.
    pub fn approve(&mut self, version_id: Uuid, by: Uuid) -> Result<(), VersionError> {
        // Validar primero la transición del candidato sin mutar nada.
        {
            let candidate = self.get(version_id)
                                .ok_or(VersionError::VersionNotFound(version_id))?;
            if candidate.status != VersionStatus::PendingApproval {
                return Err(VersionError::InvalidVersionTransition { from: candidate.status
                                                                                   .as_str()
                                                                                   .to_string(),
                                                                    attempted: "approve".to_string() });
            }
        }
        if let Some(previous) = self.versions
                                    .iter_mut()
                                    .find(|v| v.status == VersionStatus::Approved)
        {
            previous.supersede()?;
        }
        self.get_mut(version_id)
            .ok_or(VersionError::VersionNotFound(version_id))?
            .approve(by)
    }

    /// Rechaza una versión pendiente con razón.
    pub fn reject(&mut self, version_id: Uuid, by: Uuid, reason: &str) -> Result<(), VersionError> {
        self.get_mut(version_id)
            .ok_or(VersionError::VersionNotFound(version_id))?
            .reject(by, reason)
    }
}
