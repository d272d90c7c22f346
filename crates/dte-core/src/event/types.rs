//! Tipos de evento de fase y estructura `PhaseEvent`.
//!
//! Rol en el motor:
//! - Cada operación del `PhaseEngine` emite eventos a un `EventStore`
//!   append-only, correlados por `context_id` (la instancia de fase de un
//!   cycle-report).
//! - El replay de estos eventos reconstruye el `PhaseState` completo sin
//!   depender de estructuras mutables: son a la vez el registro de auditoría
//!   que el sistema original guardaba en columnas `started_by/completed_by`.
//! - El enum `PhaseEventKind` es el contrato observable y estable del motor.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PhaseEventKind {
    /// Apertura de la fase: fija el `template_hash` y la cantidad de
    /// actividades instanciadas. Invariante: primer evento de un context_id.
    PhaseInitialized { template_hash: String, activity_count: usize },
    /// Una actividad pasó a `InProgress`. No implica éxito.
    ActivityStarted { activity: String, actor: Uuid },
    /// Una actividad terminó correctamente, con su fingerprint.
    ActivityCompleted {
        activity: String,
        actor: Uuid,
        fingerprint: String,
    },
    /// Una actividad opcional fue omitida.
    ActivitySkipped {
        activity: String,
        actor: Uuid,
        reason: Option<String>,
    },
    /// Una actividad quedó bloqueada con causa registrada.
    ActivityBlocked { activity: String, reason: String },
    /// Desbloqueo de una actividad previamente bloqueada.
    ActivityUnblocked { activity: String },
    /// Se pidió revisión sobre una actividad completada (rework).
    RevisionRequested {
        activity: String,
        request_id: Uuid,
        requested_by: Uuid,
    },
    /// Evidencia (documento o resultado de query) ligada a una actividad.
    EvidenceAttached {
        activity: String,
        evidence_hash: String,
        submitted_by: Uuid,
    },
    /// Cambio de estado de una versión de la fase (ver `version`).
    VersionTransition {
        version_id: Uuid,
        version_number: u32,
        status: String,
    },
    /// Evento de cierre con fingerprint agregado de la fase (hash de
    /// fingerprints de actividades completadas en orden).
    PhaseCompleted { phase_fingerprint: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhaseEvent {
    pub seq: u64, // asignado por el EventStore (orden de append)
    pub context_id: Uuid,
    pub kind: PhaseEventKind,
    pub ts: DateTime<Utc>, // metadato (no entra en fingerprints)
}
