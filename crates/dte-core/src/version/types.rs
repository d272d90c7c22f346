//! `PhaseVersion`: snapshot versionado de las decisiones de una fase.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use thiserror::Error;
use uuid::Uuid;

use dte_domain::WorkflowPhase;

use super::{DecisionKind, VersionDecision};
use crate::hashing::hash_value;

/// Estado del ciclo de aprobación de una versión.
///
/// Las transiciones válidas son:
/// - `Draft` -> `PendingApproval` (submit)
/// - `PendingApproval` -> `Approved` | `Rejected`
/// - `Approved` -> `Superseded` (al aprobarse una versión más nueva)
///
/// `Rejected` y `Superseded` son terminales (una rechazada se revisa creando
/// una versión hija, no reabriéndola).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VersionStatus {
    Draft,
    PendingApproval,
    Approved,
    Rejected,
    Superseded,
}

impl VersionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            VersionStatus::Draft => "draft",
            VersionStatus::PendingApproval => "pending_approval",
            VersionStatus::Approved => "approved",
            VersionStatus::Rejected => "rejected",
            VersionStatus::Superseded => "superseded",
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum VersionError {
    #[error("invalid version transition: {from} -> {attempted}")]
    InvalidVersionTransition { from: String, attempted: String },
    #[error("version not found: {0}")] VersionNotFound(Uuid),
    #[error("parent version not found: {0}")] ParentNotFound(Uuid),
    #[error("decision not found: {0}")] DecisionNotFound(Uuid),
    #[error("decisions can only be edited in draft (status: {0})")] NotEditable(String),
    #[error("parent must be approved or rejected to revise (status: {0})")] ParentNotRevisable(String),
}

/// Conteos resumen de las decisiones hijas. Se recalculan en cada mutación
/// (reemplazo en código del trigger Postgres del sistema original).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionSummary {
    pub total_decisions: u32,
    pub included: u32,
    pub excluded: u32,
    pub deferred: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhaseVersion {
    pub version_id: Uuid,
    pub cycle_id: Uuid,
    pub report_id: Uuid,
    pub phase: WorkflowPhase,
    pub version_number: u32,
    pub status: VersionStatus,
    pub parent_version_id: Option<Uuid>,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
    pub submitted_by: Option<Uuid>,
    pub submitted_at: Option<DateTime<Utc>>,
    pub approved_by: Option<Uuid>,
    pub approved_at: Option<DateTime<Utc>>,
    pub rejection_reason: Option<String>,
    decisions: Vec<VersionDecision>,
    summary: VersionSummary,
}

impl PhaseVersion {
    pub(super) fn draft(cycle_id: Uuid,
                        report_id: Uuid,
                        phase: WorkflowPhase,
                        version_number: u32,
                        parent_version_id: Option<Uuid>,
                        created_by: Uuid)
                        -> Self {
        PhaseVersion { version_id: Uuid::new_v4(),
                       cycle_id,
                       report_id,
                       phase,
                       version_number,
                       status: VersionStatus::Draft,
                       parent_version_id,
                       created_by,
                       created_at: Utc::now(),
                       submitted_by: None,
                       submitted_at: None,
                       approved_by: None,
                       approved_at: None,
                       rejection_reason: None,
                       decisions: Vec::new(),
                       summary: VersionSummary::default() }
    }

    fn invalid(&self, attempted: &str) -> VersionError {
        VersionError::InvalidVersionTransition { from: self.status.as_str().to_string(),
                                                 attempted: attempted.to_string() }
    }

    /// `Draft` -> `PendingApproval`.
    pub fn submit(&mut self, by: Uuid) -> Result<(), VersionError> {
        if self.status != VersionStatus::Draft {
            return Err(self.invalid("submit"));
        }
        self.status = VersionStatus::PendingApproval;
        self.submitted_by = Some(by);
        self.submitted_at = Some(Utc::now());
        Ok(())
    }

    /// `PendingApproval` -> `Approved`. La unicidad de la versión aprobada la
    /// garantiza el ledger (supersede a la anterior en la misma operación).
    pub(super) fn approve(&mut self, by: Uuid) -> Result<(), VersionError> {
        if self.status != VersionStatus::PendingApproval {
            return Err(self.invalid("approve"));
        }
        self.status = VersionStatus::Approved;
        self.approved_by = Some(by);
        self.approved_at = Some(Utc::now());
        Ok(())
    }

    /// `PendingApproval` -> `Rejected`, con razón obligatoria.
    pub fn reject(&mut self, by: Uuid, reason: &str) -> Result<(), VersionError> {
        if self.status != VersionStatus::PendingApproval {
            return Err(self.invalid("reject"));
        }
        self.status = VersionStatus::Rejected;
        self.approved_by = Some(by);
        self.approved_at = Some(Utc::now());
        self.rejection_reason = Some(reason.to_string());
        Ok(())
    }

    /// `Approved` -> `Superseded`. Sólo la invoca el ledger.
    pub(super) fn supersede(&mut self) -> Result<(), VersionError> {
        if self.status != VersionStatus::Approved {
            return Err(self.invalid("supersede"));
        }
        self.status = VersionStatus::Superseded;
        Ok(())
    }

    /// Agrega una decisión (sólo en `Draft`) y recalcula el resumen.
    pub fn add_decision(&mut self, decision: VersionDecision) -> Result<(), VersionError> {
        if self.status != VersionStatus::Draft {
            return Err(VersionError::NotEditable(self.status.as_str().to_string()));
        }
        self.decisions.push(decision);
        self.recompute_summary();
        Ok(())
    }

    /// Elimina una decisión por id (sólo en `Draft`) y recalcula el resumen.
    pub fn remove_decision(&mut self, decision_id: Uuid) -> Result<(), VersionError> {
        if self.status != VersionStatus::Draft {
            return Err(VersionError::NotEditable(self.status.as_str().to_string()));
        }
        let before = self.decisions.len();
        self.decisions.retain(|d| d.decision_id != decision_id);
        if self.decisions.len() == before {
            return Err(VersionError::DecisionNotFound(decision_id));
        }
        self.recompute_summary();
        Ok(())
    }

    pub fn decisions(&self) -> &[VersionDecision] {
        &self.decisions
    }

    pub fn summary(&self) -> VersionSummary {
        self.summary
    }

    fn recompute_summary(&mut self) {
        let mut summary = VersionSummary { total_decisions: self.decisions.len() as u32,
                                           ..VersionSummary::default() };
        for d in &self.decisions {
            match d.decision {
                DecisionKind::Include => summary.included += 1,
                DecisionKind::Exclude => summary.excluded += 1,
                DecisionKind::Defer => summary.deferred += 1,
            }
        }
        self.summary = summary;
    }

    /// Fingerprint del contenido: hash canónico de las decisiones ordenadas
    /// por atributo. Dos versiones con las mismas decisiones comparten
    /// fingerprint aunque difieran en metadatos de aprobación.
    pub fn content_fingerprint(&self) -> String {
        let mut ordered: Vec<&VersionDecision> = self.decisions.iter().collect();
        ordered.sort_by_key(|d| d.attribute_id);
        let items: Vec<serde_json::Value> =
            ordered.iter()
                   .map(|d| json!([d.attribute_id.to_string(), d.decision.as_str(), d.rationale]))
                   .collect();
        hash_value(&json!({
                       "engine_version": crate::constants::ENGINE_VERSION,
                       "phase": self.phase.as_str(),
                       "decisions": items,
                   }))
    }
}
