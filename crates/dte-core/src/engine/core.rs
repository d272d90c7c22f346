//! Implementación central del PhaseEngine.

use chrono::Utc;
use serde_json::json;
use uuid::Uuid;

use dte_domain::UserRole;

use crate::activity::{unmet_dependencies, ActivityStatus, ActivityTemplate, PhaseTemplate};
use crate::errors::WorkflowError;
use crate::event::{EventStore, PhaseEvent, PhaseEventKind};
use crate::evidence::{Evidence, EvidenceStore};
use crate::hashing::hash_value;
use crate::repo::{PhaseContext, PhaseRepository, PhaseState};

/// Usuario que ejecuta una operación sobre la fase. El rol se valida contra
/// `required_role` de la plantilla (None = cualquier rol).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Actor {
    pub user_id: Uuid,
    pub role: UserRole,
}

impl Actor {
    pub fn new(user_id: Uuid, role: UserRole) -> Self {
        Actor { user_id, role }
    }
}

/// Motor de ejecución de fases del workflow.
///
/// Responsable de orquestar las transiciones de actividades, mantener la
/// auditoría como eventos append-only y garantizar que los gates de
/// dependencia y rol se respeten en cada operación. El estado nunca se
/// guarda mutado: siempre se reconstruye por replay.
pub struct PhaseEngine<E, R>
    where E: EventStore,
          R: PhaseRepository
{
    pub event_store: E,
    repository: R,
    evidence_store: EvidenceStore,
}

impl PhaseEngine<crate::event::InMemoryEventStore, crate::repo::InMemoryPhaseRepository> {
    /// Crea un motor con stores en memoria.
    pub fn in_memory() -> Self {
        Self::new_with_stores(crate::event::InMemoryEventStore::default(),
                              crate::repo::InMemoryPhaseRepository::new())
    }
}

impl Default for PhaseEngine<crate::event::InMemoryEventStore, crate::repo::InMemoryPhaseRepository> {
    fn default() -> Self {
        Self::in_memory()
    }
}

impl<E, R> PhaseEngine<E, R>
    where E: EventStore,
          R: PhaseRepository
{
    /// Crea un motor con los stores proporcionados.
    pub fn new_with_stores(event_store: E, repository: R) -> Self {
        Self { event_store,
               repository,
               evidence_store: EvidenceStore::new() }
    }

    /// Garantiza que exista un PhaseInitialized y devuelve los eventos
    /// actuales del contexto (incluyendo el recién agregado si aplica).
    fn load_or_init(&mut self, ctx: &PhaseContext, template: &PhaseTemplate) -> Vec<PhaseEvent> {
        let mut events = self.event_store.list(ctx.context_id);
        let has_init = events.iter()
                             .any(|e| matches!(e.kind, PhaseEventKind::PhaseInitialized { .. }));
        if !has_init {
            let ev = self.event_store
                         .append_kind(ctx.context_id,
                                      PhaseEventKind::PhaseInitialized { template_hash: template.template_hash()
                                                                                                .to_string(),
                                                                         activity_count: template.len() });
            events.push(ev);
        }
        events
    }

    /// Abre la fase para un (cycle, report): instancia las actividades de la
    /// plantilla y dispara el auto-complete inicial (hitos no manuales sin
    /// dependencias, típicamente "Start Phase").
    pub fn initialize_phase(&mut self, ctx: &PhaseContext, template: &PhaseTemplate) -> PhaseState {
        let _ = self.load_or_init(ctx, template);
        self.run_auto_complete(ctx, template, None);
        self.maybe_complete_phase(ctx, template);
        self.state(ctx, template)
    }

    /// Estado actual reconstruido por replay.
    pub fn state(&self, ctx: &PhaseContext, template: &PhaseTemplate) -> PhaseState {
        let events = self.event_store.list(ctx.context_id);
        self.repository.load(ctx, &events, template)
    }

    /// Eventos del contexto (orden de append).
    pub fn events_for(&self, ctx: &PhaseContext) -> Vec<PhaseEvent> {
        self.event_store.list(ctx.context_id)
    }

    fn guard_role(template: &ActivityTemplate, actor: &Actor) -> Result<(), WorkflowError> {
        match template.required_role {
            Some(required) if required != actor.role => {
                Err(WorkflowError::RoleNotPermitted { activity: template.name.clone(),
                                                      required: required.as_str().to_string(),
                                                      actual: actor.role.as_str().to_string() })
            }
            _ => Ok(()),
        }
    }

    fn activity_template<'a>(template: &'a PhaseTemplate, name: &str) -> Result<&'a ActivityTemplate, WorkflowError> {
        template.get(name)
                .ok_or_else(|| WorkflowError::ActivityNotFound(name.to_string()))
    }

    /// Arranca una actividad manual. Guardas en orden: fase abierta, rol,
    /// transición válida, dependencias satisfechas.
    pub fn start_activity(&mut self,
                          ctx: &PhaseContext,
                          template: &PhaseTemplate,
                          name: &str,
                          actor: &Actor)
                          -> Result<PhaseEvent, WorkflowError> {
        let _ = self.load_or_init(ctx, template);
        let state = self.state(ctx, template);
        if state.completed {
            return Err(WorkflowError::PhaseCompleted);
        }
        let act_template = Self::activity_template(template, name)?;
        Self::guard_role(act_template, actor)?;

        let inst = state.get(name)
                        .ok_or_else(|| WorkflowError::ActivityNotFound(name.to_string()))?;
        // Validar la transición sobre una copia; el estado real sólo cambia
        // vía eventos.
        let mut probe = inst.clone();
        probe.start(actor.user_id, Utc::now())?;

        let unmet = unmet_dependencies(name, &state.activities, template);
        if !unmet.is_empty() {
            return Err(WorkflowError::DependenciesUnmet { activity: name.to_string(),
                                                          unmet });
        }

        Ok(self.event_store.append_kind(ctx.context_id,
                                        PhaseEventKind::ActivityStarted { activity: name.to_string(),
                                                                          actor: actor.user_id }))
    }

    /// Completa una actividad `InProgress`, emite su fingerprint y dispara el
    /// auto-complete de las actividades no manuales que queden habilitadas.
    pub fn complete_activity(&mut self,
                             ctx: &PhaseContext,
                             template: &PhaseTemplate,
                             name: &str,
                             actor: &Actor)
                             -> Result<PhaseEvent, WorkflowError> {
        let events = self.load_or_init(ctx, template);
        let state = self.state(ctx, template);
        if state.completed {
            return Err(WorkflowError::PhaseCompleted);
        }
        let act_template = Self::activity_template(template, name)?;
        Self::guard_role(act_template, actor)?;

        let inst = state.get(name)
                        .ok_or_else(|| WorkflowError::ActivityNotFound(name.to_string()))?;
        let mut probe = inst.clone();
        probe.complete(actor.user_id, Utc::now())?;

        let position = completed_count(&events);
        let fp = self.calculate_activity_fingerprint(template, name, position);
        let ev = self.event_store
                     .append_kind(ctx.context_id,
                                  PhaseEventKind::ActivityCompleted { activity: name.to_string(),
                                                                      actor: actor.user_id,
                                                                      fingerprint: fp });
        self.run_auto_complete(ctx, template, Some(actor.user_id));
        self.maybe_complete_phase(ctx, template);
        Ok(ev)
    }

    /// Omite una actividad opcional (`NotStarted` -> `Skipped`).
    pub fn skip_activity(&mut self,
                         ctx: &PhaseContext,
                         template: &PhaseTemplate,
                         name: &str,
                         actor: &Actor,
                         reason: Option<String>)
                         -> Result<PhaseEvent, WorkflowError> {
        let _ = self.load_or_init(ctx, template);
        let state = self.state(ctx, template);
        if state.completed {
            return Err(WorkflowError::PhaseCompleted);
        }
        let act_template = Self::activity_template(template, name)?;
        if !act_template.is_optional {
            return Err(WorkflowError::NotOptional(name.to_string()));
        }
        Self::guard_role(act_template, actor)?;

        let inst = state.get(name)
                        .ok_or_else(|| WorkflowError::ActivityNotFound(name.to_string()))?;
        let mut probe = inst.clone();
        probe.skip()?;

        let ev = self.event_store
                     .append_kind(ctx.context_id,
                                  PhaseEventKind::ActivitySkipped { activity: name.to_string(),
                                                                    actor: actor.user_id,
                                                                    reason });
        self.run_auto_complete(ctx, template, Some(actor.user_id));
        self.maybe_complete_phase(ctx, template);
        Ok(ev)
    }

    /// Bloquea una actividad con causa registrada.
    pub fn block_activity(&mut self,
                          ctx: &PhaseContext,
                          template: &PhaseTemplate,
                          name: &str,
                          reason: &str)
                          -> Result<PhaseEvent, WorkflowError> {
        let _ = self.load_or_init(ctx, template);
        let state = self.state(ctx, template);
        let inst = state.get(name)
                        .ok_or_else(|| WorkflowError::ActivityNotFound(name.to_string()))?;
        let mut probe = inst.clone();
        probe.block(reason)?;
        Ok(self.event_store.append_kind(ctx.context_id,
                                        PhaseEventKind::ActivityBlocked { activity: name.to_string(),
                                                                          reason: reason.to_string() }))
    }

    /// Desbloquea una actividad previamente bloqueada.
    pub fn unblock_activity(&mut self,
                            ctx: &PhaseContext,
                            template: &PhaseTemplate,
                            name: &str)
                            -> Result<PhaseEvent, WorkflowError> {
        let _ = self.load_or_init(ctx, template);
        let state = self.state(ctx, template);
        let inst = state.get(name)
                        .ok_or_else(|| WorkflowError::ActivityNotFound(name.to_string()))?;
        let mut probe = inst.clone();
        probe.unblock()?;
        Ok(self.event_store
               .append_kind(ctx.context_id, PhaseEventKind::ActivityUnblocked { activity: name.to_string() }))
    }

    /// Registra un pedido de revisión sobre una actividad completada. La
    /// actividad vuelve a ser arrancable (rework) tras este evento.
    pub fn request_revision(&mut self,
                            ctx: &PhaseContext,
                            template: &PhaseTemplate,
                            name: &str,
                            request_id: Uuid,
                            requested_by: Uuid)
                            -> Result<PhaseEvent, WorkflowError> {
        let _ = self.load_or_init(ctx, template);
        let state = self.state(ctx, template);
        if state.completed {
            return Err(WorkflowError::PhaseCompleted);
        }
        let inst = state.get(name)
                        .ok_or_else(|| WorkflowError::ActivityNotFound(name.to_string()))?;
        let mut probe = inst.clone();
        probe.request_revision()?;
        Ok(self.event_store.append_kind(ctx.context_id,
                                        PhaseEventKind::RevisionRequested { activity: name.to_string(),
                                                                            request_id,
                                                                            requested_by }))
    }

    /// Liga evidencia a una actividad `InProgress`. El payload se deduplica
    /// por hash canónico; devuelve el hash asignado.
    pub fn attach_evidence(&mut self,
                           ctx: &PhaseContext,
                           template: &PhaseTemplate,
                           name: &str,
                           evidence: Evidence)
                           -> Result<String, WorkflowError> {
        let _ = self.load_or_init(ctx, template);
        let state = self.state(ctx, template);
        let inst = state.get(name)
                        .ok_or_else(|| WorkflowError::ActivityNotFound(name.to_string()))?;
        if inst.status != ActivityStatus::InProgress {
            return Err(WorkflowError::InvalidTransition { activity: name.to_string(),
                                                          from: inst.status,
                                                          attempted: "attach_evidence".to_string() });
        }
        let submitted_by = evidence.submitted_by;
        let hash = self.evidence_store.insert(evidence);
        self.event_store.append_kind(ctx.context_id,
                                     PhaseEventKind::EvidenceAttached { activity: name.to_string(),
                                                                        evidence_hash: hash.clone(),
                                                                        submitted_by });
        self.notify_external_event(ctx, template, crate::constants::EVIDENCE_ATTACHED_EVENT, submitted_by);
        Ok(hash)
    }

    /// Notifica un evento externo por nombre: completa las actividades
    /// `InProgress` cuya plantilla declara `auto_complete_on_event` con ese
    /// nombre y dispara la cascada habitual de auto-complete.
    pub fn notify_external_event(&mut self,
                                 ctx: &PhaseContext,
                                 template: &PhaseTemplate,
                                 event: &str,
                                 actor_id: Uuid)
                                 -> Vec<PhaseEvent> {
        let _ = self.load_or_init(ctx, template);
        let mut emitted = Vec::new();
        loop {
            let events = self.event_store.list(ctx.context_id);
            let state = self.repository.load(ctx, &events, template);
            if state.completed {
                break;
            }
            let candidate = state.activities
                                 .values()
                                 .find(|inst| {
                                     inst.status == ActivityStatus::InProgress
                                     && template.get(&inst.name)
                                                .and_then(|t| t.auto_complete_on_event.as_deref())
                                        == Some(event)
                                 })
                                 .map(|inst| inst.name.clone());
            let Some(name) = candidate else {
                break;
            };
            let position = completed_count(&events);
            let fp = self.calculate_activity_fingerprint(template, &name, position);
            emitted.push(self.event_store.append_kind(ctx.context_id,
                                                      PhaseEventKind::ActivityCompleted { activity: name,
                                                                                          actor: actor_id,
                                                                                          fingerprint: fp }));
        }
        if !emitted.is_empty() {
            self.run_auto_complete(ctx, template, Some(actor_id));
            self.maybe_complete_phase(ctx, template);
        }
        emitted
    }

    /// Audita un cambio de estado de versión en el mismo event log de la fase.
    pub fn record_version_transition(&mut self,
                                     ctx: &PhaseContext,
                                     version_id: Uuid,
                                     version_number: u32,
                                     status: &str)
                                     -> PhaseEvent {
        self.event_store.append_kind(ctx.context_id,
                                     PhaseEventKind::VersionTransition { version_id,
                                                                         version_number,
                                                                         status: status.to_string() })
    }

    /// Recupera evidencia por su hash.
    pub fn evidence(&self, hash: &str) -> Option<&Evidence> {
        self.evidence_store.get(hash)
    }

    /// Fingerprint de cierre de la fase, si ya se emitió PhaseCompleted.
    pub fn phase_fingerprint(&self, ctx: &PhaseContext) -> Option<String> {
        self.event_store
            .list(ctx.context_id)
            .iter()
            .rev()
            .find_map(|e| match &e.kind {
                PhaseEventKind::PhaseCompleted { phase_fingerprint } => Some(phase_fingerprint.clone()),
                _ => None,
            })
    }

    /// Variante compacta de eventos para asserts de tests y diagnóstico.
    pub fn event_variants(&self, ctx: &PhaseContext) -> Vec<&'static str> {
        self.event_store
            .list(ctx.context_id)
            .iter()
            .map(|e| match e.kind {
                PhaseEventKind::PhaseInitialized { .. } => "I",
                PhaseEventKind::ActivityStarted { .. } => "S",
                PhaseEventKind::ActivityCompleted { .. } => "F",
                PhaseEventKind::ActivitySkipped { .. } => "K",
                PhaseEventKind::ActivityBlocked { .. } => "B",
                PhaseEventKind::ActivityUnblocked { .. } => "U",
                PhaseEventKind::RevisionRequested { .. } => "R",
                PhaseEventKind::EvidenceAttached { .. } => "E",
                PhaseEventKind::VersionTransition { .. } => "V",
                PhaseEventKind::PhaseCompleted { .. } => "C",
            })
            .collect()
    }

    /// Completa en cascada las actividades no manuales cuyos gates quedaron
    /// abiertos. `actor` None = apertura de fase (atribución al sistema).
    fn run_auto_complete(&mut self, ctx: &PhaseContext, template: &PhaseTemplate, actor: Option<Uuid>) {
        let system_actor = actor.unwrap_or(Uuid::nil());
        loop {
            let events = self.event_store.list(ctx.context_id);
            let state = self.repository.load(ctx, &events, template);
            if state.completed {
                return;
            }
            let candidate = state.activities
                                 .values()
                                 .find(|inst| {
                                     inst.status == ActivityStatus::NotStarted
                                     && inst.can_start
                                     && template.get(&inst.name).map(|t| !t.is_manual).unwrap_or(false)
                                 })
                                 .map(|inst| inst.name.clone());
            let Some(name) = candidate else {
                return;
            };
            let position = completed_count(&events);
            let fp = self.calculate_activity_fingerprint(template, &name, position);
            self.event_store.append_kind(ctx.context_id,
                                         PhaseEventKind::ActivityStarted { activity: name.clone(),
                                                                           actor: system_actor });
            self.event_store.append_kind(ctx.context_id,
                                         PhaseEventKind::ActivityCompleted { activity: name,
                                                                             actor: system_actor,
                                                                             fingerprint: fp });
        }
    }

    fn calculate_activity_fingerprint(&self, template: &PhaseTemplate, name: &str, position: usize) -> String {
        let fp_json = json!({
            "engine_version": crate::constants::ENGINE_VERSION,
            "template_hash": template.template_hash(),
            "activity": name,
            "position": position,
        });
        hash_value(&fp_json)
    }

    /// Cierra la fase cuando todas las actividades llegaron a estado
    /// terminal: emite PhaseCompleted con el hash agregado de los
    /// fingerprints de actividades completadas en orden.
    fn maybe_complete_phase(&mut self, ctx: &PhaseContext, template: &PhaseTemplate) {
        let events = self.event_store.list(ctx.context_id);
        let state = self.repository.load(ctx, &events, template);
        if state.completed || !state.all_terminal() || state.activities.is_empty() {
            return;
        }
        let activity_fps: Vec<String> = events.iter()
                                              .filter_map(|e| match &e.kind {
                                                  PhaseEventKind::ActivityCompleted { fingerprint, .. } => {
                                                      Some(fingerprint.clone())
                                                  }
                                                  _ => None,
                                              })
                                              .collect();
        let phase_fp = hash_value(&json!({
                                      "engine_version": crate::constants::ENGINE_VERSION,
                                      "template_hash": template.template_hash(),
                                      "activity_fingerprints": activity_fps,
                                  }));
        let _ = self.event_store
                    .append_kind(ctx.context_id, PhaseEventKind::PhaseCompleted { phase_fingerprint: phase_fp });
    }
}

/// Cantidad de ActivityCompleted previos (posición determinista para el
/// fingerprint de la próxima actividad).
fn completed_count(events: &[PhaseEvent]) -> usize {
    events.iter()
          .filter(|e| matches!(e.kind, PhaseEventKind::ActivityCompleted { .. }))
          .count()
}
