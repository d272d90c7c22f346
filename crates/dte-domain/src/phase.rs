//! Fases del workflow de pruebas regulatorias.
//!
//! El sistema original nombra las tablas por fase con la convención
//! `cycle_report_<phase>_<entity>`. Aquí la fase es un enum cerrado: el
//! orden de las variantes es el orden canónico del ciclo de pruebas.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::DomainError;

/// Fase nombrada del workflow. El orden de declaración es el orden canónico
/// en que un cycle-report atraviesa el ciclo de pruebas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WorkflowPhase {
    Planning,
    DataProfiling,
    Scoping,
    SampleSelection,
    DataOwnerIdentification,
    RequestInfo,
    TestExecution,
    ObservationManagement,
    TestReport,
}

impl WorkflowPhase {
    /// Todas las fases en orden canónico.
    pub const ALL: [WorkflowPhase; 9] = [WorkflowPhase::Planning,
                                         WorkflowPhase::DataProfiling,
                                         WorkflowPhase::Scoping,
                                         WorkflowPhase::SampleSelection,
                                         WorkflowPhase::DataOwnerIdentification,
                                         WorkflowPhase::RequestInfo,
                                         WorkflowPhase::TestExecution,
                                         WorkflowPhase::ObservationManagement,
                                         WorkflowPhase::TestReport];

    /// Identificador estable (snake_case), igual al sufijo de tabla del
    /// sistema original.
    pub fn as_str(&self) -> &'static str {
        match self {
            WorkflowPhase::Planning => "planning",
            WorkflowPhase::DataProfiling => "data_profiling",
            WorkflowPhase::Scoping => "scoping",
            WorkflowPhase::SampleSelection => "sample_selection",
            WorkflowPhase::DataOwnerIdentification => "data_owner_identification",
            WorkflowPhase::RequestInfo => "request_info",
            WorkflowPhase::TestExecution => "test_execution",
            WorkflowPhase::ObservationManagement => "observation_management",
            WorkflowPhase::TestReport => "test_report",
        }
    }

    /// Parseo inverso de `as_str`. Devuelve error para strings desconocidos.
    pub fn parse(s: &str) -> Result<Self, DomainError> {
        WorkflowPhase::ALL.iter()
                          .copied()
                          .find(|p| p.as_str() == s)
                          .ok_or_else(|| DomainError::UnknownPhase(s.to_string()))
    }

    /// Fase siguiente en el orden canónico (None para la última).
    pub fn next(&self) -> Option<WorkflowPhase> {
        let idx = WorkflowPhase::ALL.iter().position(|p| p == self)?;
        WorkflowPhase::ALL.get(idx + 1).copied()
    }
}

impl fmt::Display for WorkflowPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
