use chrono::Utc;
use std::collections::HashMap;
use uuid::Uuid;

use super::{PhaseEvent, PhaseEventKind};

/// Almacenamiento de eventos append-only.
pub trait EventStore {
    /// Agrega un evento a partir de su kind y devuelve el evento completo
    /// (con seq y ts asignados).
    fn append_kind(&mut self, context_id: Uuid, kind: PhaseEventKind) -> PhaseEvent;
    /// Lista eventos de un contexto (orden ascendente por seq).
    fn list(&self, context_id: Uuid) -> Vec<PhaseEvent>;
}

pub struct InMemoryEventStore {
    pub inner: HashMap<Uuid, Vec<PhaseEvent>>,
}

impl Default for InMemoryEventStore {
    fn default() -> Self {
        Self { inner: HashMap::new() }
    }
}

impl EventStore for InMemoryEventStore {
    fn append_kind(&mut self, context_id: Uuid, kind: PhaseEventKind) -> PhaseEvent {
        let vec = self.inner.entry(context_id).or_insert_with(Vec::new);
        let seq = vec.len() as u64;
        let ev = PhaseEvent { seq,
                              context_id,
                              kind,
                              ts: Utc::now() };
        vec.push(ev.clone());
        ev
    }

    fn list(&self, context_id: Uuid) -> Vec<PhaseEvent> {
        self.inner.get(&context_id).cloned().unwrap_or_default()
    }
}
