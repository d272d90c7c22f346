//! Armado de escenarios end-to-end en orden de dependencias.
//!
//! El sistema detrás de esto exige un orden estricto de creación: LOB antes
//! que Report, Report y Cycle antes que CycleReport, CycleReport antes de
//! instanciar fases. Acá ese orden es una precondición de constructor con
//! error tipado, no una respuesta HTTP.

use chrono::NaiveDate;
use std::collections::HashMap;
use thiserror::Error;
use uuid::Uuid;

use dte_core::PhaseContext;
use dte_domain::{CycleReport, DomainError, LineOfBusiness, Report, TestCycle, WorkflowPhase};

#[derive(Debug, Error)]
pub enum ScenarioError {
    #[error(transparent)]
    Domain(#[from] DomainError),
    #[error("unknown lob: {0}")]
    UnknownLob(Uuid),
    #[error("unknown report: {0}")]
    UnknownReport(Uuid),
    #[error("unknown cycle: {0}")]
    UnknownCycle(Uuid),
    #[error("report {report_id} is not enrolled in cycle {cycle_id}")]
    ReportNotInCycle { cycle_id: Uuid, report_id: Uuid },
}

/// Estado acumulado de un escenario de testeo regulatorio.
#[derive(Default)]
pub struct Scenario {
    lobs: HashMap<Uuid, LineOfBusiness>,
    reports: HashMap<Uuid, Report>,
    cycles: HashMap<Uuid, TestCycle>,
    cycle_reports: Vec<CycleReport>,
}

impl Scenario {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_lob(&mut self, name: &str) -> Result<Uuid, ScenarioError> {
        let lob = LineOfBusiness::new(name)?;
        let id = lob.lob_id();
        self.lobs.insert(id, lob);
        Ok(id)
    }

    /// El LOB debe existir antes de crear el reporte.
    pub fn add_report(&mut self,
                      name: &str,
                      regulation: &str,
                      lob_id: Uuid,
                      owner_id: Uuid)
                      -> Result<Uuid, ScenarioError> {
        if !self.lobs.contains_key(&lob_id) {
            return Err(ScenarioError::UnknownLob(lob_id));
        }
        let report = Report::new(name, regulation, lob_id)?.with_owner(owner_id);
        let id = report.report_id();
        self.reports.insert(id, report);
        Ok(id)
    }

    pub fn add_cycle(&mut self, name: &str, start: NaiveDate, end: NaiveDate) -> Result<Uuid, ScenarioError> {
        let cycle = TestCycle::new(name, start, end)?;
        let id = cycle.cycle_id();
        self.cycles.insert(id, cycle);
        Ok(id)
    }

    /// Inscribe un reporte en un ciclo con su tester asignado. Ambos deben
    /// existir.
    pub fn enroll_report(&mut self, cycle_id: Uuid, report_id: Uuid, tester_id: Uuid) -> Result<(), ScenarioError> {
        if !self.cycles.contains_key(&cycle_id) {
            return Err(ScenarioError::UnknownCycle(cycle_id));
        }
        if !self.reports.contains_key(&report_id) {
            return Err(ScenarioError::UnknownReport(report_id));
        }
        self.cycle_reports.push(CycleReport::new(cycle_id, report_id, tester_id));
        Ok(())
    }

    /// Contexto de fase para un cycle-report ya inscripto.
    pub fn phase_context(&self,
                         cycle_id: Uuid,
                         report_id: Uuid,
                         phase: WorkflowPhase)
                         -> Result<PhaseContext, ScenarioError> {
        let enrolled = self.cycle_reports
                           .iter()
                           .any(|cr| cr.cycle_id() == cycle_id && cr.report_id() == report_id);
        if !enrolled {
            return Err(ScenarioError::ReportNotInCycle { cycle_id, report_id });
        }
        Ok(PhaseContext::new(cycle_id, report_id, phase))
    }

    pub fn lob(&self, lob_id: Uuid) -> Option<&LineOfBusiness> {
        self.lobs.get(&lob_id)
    }

    pub fn report(&self, report_id: Uuid) -> Option<&Report> {
        self.reports.get(&report_id)
    }

    pub fn cycle(&self, cycle_id: Uuid) -> Option<&TestCycle> {
        self.cycles.get(&cycle_id)
    }

    pub fn cycle_mut(&mut self, cycle_id: Uuid) -> Option<&mut TestCycle> {
        self.cycles.get_mut(&cycle_id)
    }

    pub fn cycle_reports(&self) -> &[CycleReport] {
        &self.cycle_reports
    }
}
