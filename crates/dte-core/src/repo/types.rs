//! Tipos de repositorio: estado reconstruido (`PhaseState`) y contexto de
//! fase (`PhaseContext`).
//!
//! El repositorio aplica un replay lineal: consume eventos en orden y muta
//! las instancias de actividad evento por evento. Al final recalcula los
//! gates, de modo que `can_start`/`can_complete` siempre derivan del estado
//! reconstruido y nunca se persisten.

use indexmap::IndexMap;
use uuid::Uuid;

use dte_domain::WorkflowPhase;

use crate::activity::{recompute_gates, ActivityInstance, PhaseTemplate};
use crate::event::{PhaseEvent, PhaseEventKind};

/// Identidad de una instancia de fase: el par (cycle, report) más la fase.
/// `context_id` es la clave de correlación en el event log.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhaseContext {
    pub context_id: Uuid,
    pub cycle_id: Uuid,
    pub report_id: Uuid,
    pub phase: WorkflowPhase,
}

impl PhaseContext {
    pub fn new(cycle_id: Uuid, report_id: Uuid, phase: WorkflowPhase) -> Self {
        PhaseContext { context_id: Uuid::new_v4(),
                       cycle_id,
                       report_id,
                       phase }
    }
}

/// Estado completo de una fase reconstruido por replay.
pub struct PhaseState {
    pub context_id: Uuid,
    /// Instancias en `activity_order` de la plantilla.
    pub activities: IndexMap<String, ActivityInstance>,
    pub completed: bool,
}

impl PhaseState {
    pub fn get(&self, name: &str) -> Option<&ActivityInstance> {
        self.activities.get(name)
    }

    /// ¿Todas las actividades están en estado terminal?
    pub fn all_terminal(&self) -> bool {
        self.activities.values().all(|a| a.status.is_terminal())
    }
}

/// Trait para reconstruir (`replay`) el estado de una fase desde eventos.
pub trait PhaseRepository {
    fn load(&self, ctx: &PhaseContext, events: &[PhaseEvent], template: &PhaseTemplate) -> PhaseState;
}

pub struct InMemoryPhaseRepository;

impl InMemoryPhaseRepository {
    pub fn new() -> Self {
        Self
    }
}

impl Default for InMemoryPhaseRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl PhaseRepository for InMemoryPhaseRepository {
    fn load(&self, ctx: &PhaseContext, events: &[PhaseEvent], template: &PhaseTemplate) -> PhaseState {
        // Round-trip plantilla -> instancias: exactamente las actividades del
        // catálogo, en activity_order.
        let mut activities: IndexMap<String, ActivityInstance> =
            template.activities()
                    .map(|t| (t.name.clone(), ActivityInstance::fresh(ctx.cycle_id, ctx.report_id, ctx.phase, &t.name)))
                    .collect();
        let mut completed = false;

        for ev in events {
            match &ev.kind {
                PhaseEventKind::PhaseInitialized { .. } => {}
                PhaseEventKind::ActivityStarted { activity, actor } => {
                    if let Some(inst) = activities.get_mut(activity) {
                        inst.status = crate::activity::ActivityStatus::InProgress;
                        inst.started_at = Some(ev.ts);
                        inst.started_by = Some(*actor);
                    }
                }
                PhaseEventKind::ActivityCompleted { activity, actor, .. } => {
                    if let Some(inst) = activities.get_mut(activity) {
                        inst.status = crate::activity::ActivityStatus::Completed;
                        inst.completed_at = Some(ev.ts);
                        inst.completed_by = Some(*actor);
                    }
                }
                PhaseEventKind::ActivitySkipped { activity, .. } => {
                    if let Some(inst) = activities.get_mut(activity) {
                        inst.status = crate::activity::ActivityStatus::Skipped;
                    }
                }
                PhaseEventKind::ActivityBlocked { activity, reason } => {
                    if let Some(inst) = activities.get_mut(activity) {
                        inst.status = crate::activity::ActivityStatus::Blocked;
                        inst.blocked_reason = Some(reason.clone());
                    }
                }
                PhaseEventKind::ActivityUnblocked { activity } => {
                    if let Some(inst) = activities.get_mut(activity) {
                        inst.status = if inst.started_at.is_some() {
                            crate::activity::ActivityStatus::InProgress
                        } else {
                            crate::activity::ActivityStatus::NotStarted
                        };
                        inst.blocked_reason = None;
                    }
                }
                PhaseEventKind::RevisionRequested { activity, .. } => {
                    if let Some(inst) = activities.get_mut(activity) {
                        inst.status = crate::activity::ActivityStatus::RevisionRequested;
                        inst.completed_at = None;
                        inst.completed_by = None;
                    }
                }
                PhaseEventKind::EvidenceAttached { .. } => {}
                PhaseEventKind::VersionTransition { .. } => {}
                PhaseEventKind::PhaseCompleted { .. } => completed = true,
            }
        }

        recompute_gates(&mut activities, template);
        PhaseState { context_id: ctx.context_id,
                     activities,
                     completed }
    }
}
