//! Ciclo de pruebas (período acotado) y su asociación con reportes.
//!
//! Un `TestCycle` agrupa uno o más `CycleReport`: el par (cycle, report) es
//! la unidad sobre la que corren las fases del workflow.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::DomainError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CycleStatus {
    Planned,
    Active,
    Closed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestCycle {
    cycle_id: Uuid,
    name: String,
    start_date: NaiveDate,
    end_date: NaiveDate,
    status: CycleStatus,
}

impl TestCycle {
    /// Crea un ciclo validando nombre y orden de fechas (inicio < fin).
    pub fn new(name: &str, start_date: NaiveDate, end_date: NaiveDate) -> Result<Self, DomainError> {
        if name.trim().is_empty() {
            return Err(DomainError::ValidationError("cycle name must not be empty".to_string()));
        }
        if start_date >= end_date {
            return Err(DomainError::ValidationError(format!("cycle start {} must precede end {}",
                                                            start_date, end_date)));
        }
        Ok(TestCycle { cycle_id: Uuid::new_v4(),
                       name: name.trim().to_string(),
                       start_date,
                       end_date,
                       status: CycleStatus::Planned })
    }

    pub fn activate(&mut self) {
        self.status = CycleStatus::Active;
    }
    pub fn close(&mut self) {
        self.status = CycleStatus::Closed;
    }

    pub fn cycle_id(&self) -> Uuid {
        self.cycle_id
    }
    pub fn name(&self) -> &str {
        &self.name
    }
    pub fn start_date(&self) -> NaiveDate {
        self.start_date
    }
    pub fn end_date(&self) -> NaiveDate {
        self.end_date
    }
    pub fn status(&self) -> CycleStatus {
        self.status
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CycleReportStatus {
    NotStarted,
    InProgress,
    Complete,
}

/// Asociación cycle <-> report con el tester asignado. Es el contexto sobre
/// el que se instancian las fases.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CycleReport {
    cycle_id: Uuid,
    report_id: Uuid,
    tester_id: Uuid,
    status: CycleReportStatus,
}

impl CycleReport {
    pub fn new(cycle_id: Uuid, report_id: Uuid, tester_id: Uuid) -> Self {
        CycleReport { cycle_id,
                      report_id,
                      tester_id,
                      status: CycleReportStatus::NotStarted }
    }

    pub fn mark_in_progress(&mut self) {
        self.status = CycleReportStatus::InProgress;
    }
    pub fn mark_complete(&mut self) {
        self.status = CycleReportStatus::Complete;
    }

    pub fn cycle_id(&self) -> Uuid {
        self.cycle_id
    }
    pub fn report_id(&self) -> Uuid {
        self.report_id
    }
    pub fn tester_id(&self) -> Uuid {
        self.tester_id
    }
    pub fn status(&self) -> CycleReportStatus {
        self.status
    }
}
