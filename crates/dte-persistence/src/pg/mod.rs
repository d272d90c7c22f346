//! Implementaciones Postgres (Diesel) de los traits del core.
//!
//! Objetivo general del módulo:
//! - Proveer una capa de persistencia durable (Postgres) con paridad 1:1
//!   respecto al backend en memoria.
//! - Mantener determinismo del motor: el replay de eventos debe reconstruir el
//!   mismo estado y fingerprints.
//! - Aislar completamente el mapeo dominio ↔ filas de DB de `dte-core`.
//!
//! Piezas:
//! - `PgEventStore`: EventStore append-only con orden total por `seq`
//!   (BIGSERIAL), sin updates ni deletes. Lectura por `context_id` ordenada
//!   por `seq`, equivalente al backend in-memory. Inserción opcional de la
//!   fila de evidencia dentro de la MISMA transacción del evento
//!   `EvidenceAttached` (desactivable con feature `no-evidence-insert`).
//! - `rejected_transitions`: auditoría de operaciones que el motor rechazó
//!   (el event log sólo registra transiciones aceptadas).
//! - `PgVersionStore`: espejo durable del `VersionLedger`.
//! - `PgPhaseRepository`: delega el replay a la implementación InMemory para
//!   asegurar paridad exacta.
//! - Manejo básico de errores transitorios: reintento con backoff en `append`
//!   y `list`.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel::r2d2::{self, ConnectionManager};
use serde_json::Value;
use uuid::Uuid;

use dte_core::errors::{classify_error, ErrorClass};
use dte_core::repo::PhaseState;
use dte_core::{EventStore, Evidence, InMemoryPhaseRepository, PhaseContext, PhaseEvent, PhaseEventKind,
               PhaseRepository, PhaseTemplate, PhaseVersion, WorkflowError};
use log::{debug, error, warn};

use crate::error::PersistenceError;
use crate::migrations::run_pending_migrations;
use crate::schema::{evidence_records, phase_versions, rejected_transitions, workflow_event_log};

/// Alias de tipo para el pool r2d2 de conexiones Postgres.
///
/// Notas operativas:
/// - El pool se construye con `min_idle` (mínimo de conexiones inactivas) y
///   `max_size` (límite superior total).
/// - Al construirlo, se corre automáticamente el set de migraciones pendientes
///   (una sola vez).
pub type PgPool = r2d2::Pool<ConnectionManager<PgConnection>>;

/// Proveedor abstracto de conexiones.
///
/// Permite inyectar un pool real (producción/tests de integración) o
/// factorear en tests unitarios sin acoplar a r2d2.
pub trait ConnectionProvider: Send + Sync + 'static {
    /// Obtiene una conexión lista para ejecutar consultas Diesel.
    fn connection(&self) -> Result<r2d2::PooledConnection<ConnectionManager<PgConnection>>, PersistenceError>;
}

/// Implementación concreta de `ConnectionProvider` respaldada por un `PgPool`.
pub struct PoolProvider {
    pub pool: PgPool,
}
impl ConnectionProvider for PoolProvider {
    fn connection(&self) -> Result<r2d2::PooledConnection<ConnectionManager<PgConnection>>, PersistenceError> {
        self.pool
            .get()
            .map_err(|e| PersistenceError::TransientIo(format!("pool error: {e}")))
    }
}

/// Fila para insertar en `workflow_event_log`.
///
/// Se inserta siempre dentro de una transacción Diesel
/// (`build_transaction().read_write()`), devolviendo `seq` y `ts` vía
/// `RETURNING`.
#[derive(Insertable, Debug)]
#[diesel(table_name = workflow_event_log)]
pub struct NewEventRow<'a> {
    pub context_id: &'a Uuid,
    pub event_type: &'a str,
    pub payload: &'a Value,
}

/// Fila mapeada de `workflow_event_log` para lecturas.
///
/// - `seq`: identificador monotónico (BIGSERIAL), global a la tabla.
/// - `context_id`: instancia de fase a la que pertenece el evento.
/// - `ts`: timestamp asignado por la base (DEFAULT now()).
/// - `event_type`: pista/constraint (minúsculas) del tipo de evento.
/// - `payload`: JSONB con la representación completa del enum
///   `PhaseEventKind`.
#[derive(Queryable, Debug)]
pub struct EventRow {
    pub seq: i64,
    pub context_id: Uuid,
    pub ts: DateTime<Utc>,
    pub event_type: String,
    pub payload: Value,
}

/// Fila para insertar en `evidence_records`.
///
/// - `evidence_hash` funge como PK para deduplicación (length=64 verificado
///   por CHECK).
/// - `recorded_in_seq` referencia el `seq` del evento `EvidenceAttached` que
///   la registró (FK con `ON DELETE RESTRICT`).
#[derive(Insertable, Debug)]
#[diesel(table_name = evidence_records)]
pub struct NewEvidenceRow<'a> {
    pub evidence_hash: &'a str,
    pub kind: &'a str,
    pub payload: &'a Value,
    pub metadata: Option<&'a Value>,
    pub test_case_id: Option<Uuid>,
    pub submitted_by: Uuid,
    pub recorded_in_seq: i64,
}

/// Fila para insertar en `rejected_transitions`.
#[derive(Insertable, Debug)]
#[diesel(table_name = rejected_transitions)]
pub struct NewRejectionRow<'a> {
    pub context_id: &'a Uuid,
    pub activity: &'a str,
    pub error_class: &'a str,
    pub details: Option<&'a Value>,
}

/// Fila mapeada de `rejected_transitions` para lecturas.
#[derive(Queryable, Debug)]
pub struct RejectionRow {
    pub id: i64,
    pub context_id: Uuid,
    pub activity: String,
    pub error_class: String,
    pub details: Option<Value>,
    pub ts: DateTime<Utc>,
}

/// Fila (lectura e inserción comparten shape) de `phase_versions`.
#[derive(Queryable, Insertable, Debug)]
#[diesel(table_name = phase_versions)]
pub struct VersionRow {
    pub version_id: Uuid,
    pub cycle_id: Uuid,
    pub report_id: Uuid,
    pub phase: String,
    pub version_number: i32,
    pub status: String,
    pub parent_version_id: Option<Uuid>,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
    pub rejection_reason: Option<String>,
    pub total_decisions: i32,
    pub included: i32,
    pub excluded: i32,
    pub deferred: i32,
    pub content_fingerprint: String,
}

impl VersionRow {
    /// Proyección de una `PhaseVersion` del ledger a fila de DB.
    pub fn from_version(v: &PhaseVersion) -> Self {
        let summary = v.summary();
        VersionRow { version_id: v.version_id,
                     cycle_id: v.cycle_id,
                     report_id: v.report_id,
                     phase: v.phase.as_str().to_string(),
                     version_number: v.version_number as i32,
                     status: v.status.as_str().to_string(),
                     parent_version_id: v.parent_version_id,
                     created_by: v.created_by,
                     created_at: v.created_at,
                     rejection_reason: v.rejection_reason.clone(),
                     total_decisions: summary.total_decisions as i32,
                     included: summary.included as i32,
                     excluded: summary.excluded as i32,
                     deferred: summary.deferred as i32,
                     content_fingerprint: v.content_fingerprint() }
    }
}

/// Determina si un error es transitorio (recomendado reintentar con backoff).
///
/// Cubre:
/// - Conflictos de serialización (deadlocks y nivel de aislamiento).
/// - Errores de IO transitorios de pool/conexión.
/// - Mensajes comunes de desconexión/timeout detectados por texto
///   (best-effort).
fn is_retryable(e: &PersistenceError) -> bool {
    match e {
        PersistenceError::SerializationConflict => true,
        PersistenceError::TransientIo(_) => true,
        // Algunos mensajes de error (dependen de driver/pg) pueden llegar como
        // Unknown con texto. Best-effort string match sin acoplar a SQLSTATE.
        PersistenceError::Unknown(msg) => {
            let m = msg.to_lowercase();
            m.contains("deadlock detected")
            || m.contains("could not serialize access due to concurrent update")
            || m.contains("terminating connection due to administrator command")
            || m.contains("connection closed")
            || m.contains("connection refused")
            || m.contains("timeout")
        }
        _ => false,
    }
}

/// Retry simple con backoff exponencial muy pequeño (hasta 3 intentos).
///
/// Política:
/// - Intentos: 3.
/// - Backoff: 15ms, 30ms, 45ms.
/// - Logs: se emite `warn!` por intento.
fn with_retry<F, T>(mut f: F) -> Result<T, PersistenceError>
    where F: FnMut() -> Result<T, PersistenceError>
{
    let mut attempts = 0;
    loop {
        match f() {
            Err(e) if is_retryable(&e) && attempts < 3 => {
                let delay_ms = 15 * ((attempts + 1) as u64);
                warn!("retryable error (attempt {}): {:?} -> sleeping {}ms",
                      attempts + 1,
                      e,
                      delay_ms);
                std::thread::sleep(std::time::Duration::from_millis(delay_ms));
                attempts += 1;
            }
            r => return r,
        }
    }
}

// SERIALIZACIÓN: guardamos el enum completo como JSON (payload), y además
// persistimos `event_type` (minúsculas) para cumplir constraint y facilitar
// ciertas consultas.
fn serialize_full_enum(kind: &PhaseEventKind) -> Value {
    serde_json::to_value(kind).expect("serialize PhaseEventKind")
}

/// Mapea la variante del enum a un string en minúsculas, estable en el tiempo.
fn event_type_for(kind: &PhaseEventKind) -> &'static str {
    match kind {
        PhaseEventKind::PhaseInitialized { .. } => "phaseinitialized",
        PhaseEventKind::ActivityStarted { .. } => "activitystarted",
        PhaseEventKind::ActivityCompleted { .. } => "activitycompleted",
        PhaseEventKind::ActivitySkipped { .. } => "activityskipped",
        PhaseEventKind::ActivityBlocked { .. } => "activityblocked",
        PhaseEventKind::ActivityUnblocked { .. } => "activityunblocked",
        PhaseEventKind::RevisionRequested { .. } => "revisionrequested",
        PhaseEventKind::EvidenceAttached { .. } => "evidenceattached",
        PhaseEventKind::VersionTransition { .. } => "versiontransition",
        PhaseEventKind::PhaseCompleted { .. } => "phasecompleted",
    }
}

/// Nombre legible de la variante del evento para logging/diagnóstico.
fn kind_variant_name(kind: &PhaseEventKind) -> &'static str {
    match kind {
        PhaseEventKind::PhaseInitialized { .. } => "PhaseInitialized",
        PhaseEventKind::ActivityStarted { .. } => "ActivityStarted",
        PhaseEventKind::ActivityCompleted { .. } => "ActivityCompleted",
        PhaseEventKind::ActivitySkipped { .. } => "ActivitySkipped",
        PhaseEventKind::ActivityBlocked { .. } => "ActivityBlocked",
        PhaseEventKind::ActivityUnblocked { .. } => "ActivityUnblocked",
        PhaseEventKind::RevisionRequested { .. } => "RevisionRequested",
        PhaseEventKind::EvidenceAttached { .. } => "EvidenceAttached",
        PhaseEventKind::VersionTransition { .. } => "VersionTransition",
        PhaseEventKind::PhaseCompleted { .. } => "PhaseCompleted",
    }
}

/// Clasificación estable del error para la columna `error_class` (CHECK en
/// la migración).
fn error_class_for(error: &WorkflowError) -> &'static str {
    match classify_error(error) {
        ErrorClass::Validation => "validation",
        ErrorClass::Transition => "transition",
        ErrorClass::Permanent => "permanent",
    }
}

/// Deserializa una `EventRow` a `PhaseEvent`, utilizando el JSON completo del
/// enum almacenado en `payload`. Si por alguna razón el JSON no es válido,
/// devuelve `None`.
fn deserialize_full_enum(row: EventRow) -> Option<PhaseEvent> {
    let kind: PhaseEventKind = serde_json::from_value(row.payload).ok()?;
    Some(PhaseEvent { seq: row.seq as u64,
                      context_id: row.context_id,
                      kind,
                      ts: row.ts })
}

/// Implementación Postgres de `EventStore` (append-only).
///
/// Responsabilidades:
/// - `append_kind`: insertar un evento y, si es `EvidenceAttached`, una fila
///   stub de evidencia en el mismo commit (el payload completo lo sube luego
///   `store_evidence`).
/// - `list`: devolver todos los eventos de un contexto ordenados por `seq`
///   (replay determinista).
pub struct PgEventStore<P: ConnectionProvider> {
    pub provider: P,
}
impl<P: ConnectionProvider> PgEventStore<P> {
    pub fn new(provider: P) -> Self {
        Self { provider }
    }
}

impl<P: ConnectionProvider> EventStore for PgEventStore<P> {
    fn append_kind(&mut self, context_id: Uuid, kind: PhaseEventKind) -> PhaseEvent {
        debug!("append_kind:start context_id={context_id} kind={}",
               kind_variant_name(&kind));
        let event_type = event_type_for(&kind);
        let payload = serialize_full_enum(&kind);
        // Transacción atómica: inserción de evento y (si aplica) evidencia.
        // Si falla cualquiera de las inserciones, se revierte todo. Se usa
        // retry/backoff para errores transitorios.
        let inserted: (i64, DateTime<Utc>) = with_retry(|| {
            let mut conn = self.provider.connection()?;
            conn.build_transaction()
                .read_write()
                .run(|tx_conn| {
                    let (seq, ts): (i64, DateTime<Utc>) =
                        diesel::insert_into(workflow_event_log::table)
                            .values(NewEventRow { context_id: &context_id,
                                                  event_type,
                                                  payload: &payload })
                            .returning((workflow_event_log::seq, workflow_event_log::ts))
                            .get_result(tx_conn)?;

                    #[cfg(not(feature = "no-evidence-insert"))]
                    {
                        if let PhaseEventKind::EvidenceAttached { evidence_hash, submitted_by, .. } = &kind {
                            if evidence_hash.len() == 64 {
                                let null = Value::Null; // snapshot diferido a store_evidence
                                let row = NewEvidenceRow { evidence_hash,
                                                           kind: "unknown",
                                                           payload: &null,
                                                           metadata: None,
                                                           test_case_id: None,
                                                           submitted_by: *submitted_by,
                                                           recorded_in_seq: seq };
                                // Dedupe por PK (evidence_hash)
                                diesel::insert_into(evidence_records::table)
                                    .values(&row)
                                    .on_conflict_do_nothing()
                                    .execute(tx_conn)?;
                            } else {
                                debug!("skip evidence hash len!=64 hash={evidence_hash}");
                            }
                        }
                    }

                    Ok::<(i64, DateTime<Utc>), diesel::result::Error>((seq, ts))
                })
                .map_err(PersistenceError::from)
        })
        .expect("insert event (with evidence)");

        let ev = PhaseEvent { seq: inserted.0 as u64,
                              context_id,
                              kind,
                              ts: inserted.1 };
        debug!("append_kind:done context_id={context_id} seq={} kind={}",
               ev.seq,
               kind_variant_name(&ev.kind));
        ev
    }

    fn list(&self, context_id: Uuid) -> Vec<PhaseEvent> {
        debug!("list:start context_id={context_id}");
        // Lectura robusta con retry ante fallos transitorios.
        let rows: Vec<EventRow> = with_retry(|| {
                                      let mut conn = self.provider.connection()?;
                                      let query =
                                          workflow_event_log::table.filter(workflow_event_log::context_id.eq(context_id))
                                                                   .order(workflow_event_log::seq.asc());
                                      query.load(&mut conn).map_err(PersistenceError::from)
                                  }).unwrap_or_else(|e| {
                                        error!("list:load error context_id={context_id} err={:?}", e);
                                        panic!("diesel load error: {e}");
                                    });
        let events: Vec<PhaseEvent> = rows.into_iter().filter_map(deserialize_full_enum).collect();
        debug!("list:done context_id={context_id} count={}", events.len());
        events
    }
}

impl<P: ConnectionProvider> PgEventStore<P> {
    /// Sube el payload completo de una evidencia ya registrada por evento.
    /// La fila stub insertada en `append_kind` se actualiza en su lugar.
    pub fn store_evidence(&self, evidence: &Evidence, recorded_in_seq: i64) -> Result<(), PersistenceError> {
        with_retry(|| {
            let mut conn = self.provider.connection()?;
            let row = NewEvidenceRow { evidence_hash: &evidence.hash,
                                       kind: match evidence.kind {
                                           dte_core::EvidenceKind::Document => "document",
                                           dte_core::EvidenceKind::QueryResult => "query_result",
                                       },
                                       payload: &evidence.payload,
                                       metadata: evidence.metadata.as_ref(),
                                       test_case_id: evidence.test_case_id,
                                       submitted_by: evidence.submitted_by,
                                       recorded_in_seq };
            diesel::insert_into(evidence_records::table)
                .values(&row)
                .on_conflict(evidence_records::evidence_hash)
                .do_update()
                .set((evidence_records::kind.eq(row.kind),
                      evidence_records::payload.eq(row.payload),
                      evidence_records::metadata.eq(row.metadata),
                      evidence_records::test_case_id.eq(row.test_case_id)))
                .execute(&mut conn)
                .map(|_| ())
                .map_err(PersistenceError::from)
        })
    }

    /// Registra una operación rechazada por el motor (no entra al event log).
    pub fn record_rejection(&self,
                            context_id: Uuid,
                            activity: &str,
                            error: &WorkflowError)
                            -> Result<(), PersistenceError> {
        let details = serde_json::to_value(error).ok();
        with_retry(|| {
            let mut conn = self.provider.connection()?;
            diesel::insert_into(rejected_transitions::table)
                .values(NewRejectionRow { context_id: &context_id,
                                          activity,
                                          error_class: error_class_for(error),
                                          details: details.as_ref() })
                .execute(&mut conn)
                .map(|_| ())
                .map_err(PersistenceError::from)
        })
    }

    /// Lista rechazos de un contexto, ordenados por ts.
    pub fn list_rejections(&self, context_id: Uuid) -> Vec<RejectionRow> {
        debug!("list_rejections:start context_id={context_id}");
        let rows: Vec<RejectionRow> = with_retry(|| {
                                          let mut conn = self.provider.connection()?;
                                          let query =
                                              rejected_transitions::table.filter(rejected_transitions::context_id.eq(context_id))
                                                                         .order(rejected_transitions::ts.asc());
                                          query.load(&mut conn).map_err(PersistenceError::from)
                                      }).unwrap_or_else(|e| {
                                            error!("list_rejections:load error context_id={context_id} err={:?}", e);
                                            vec![]
                                        });
        debug!("list_rejections:done context_id={context_id} count={}", rows.len());
        rows
    }
}

/// Espejo durable del `VersionLedger`: una fila por versión, upsert por
/// `version_id`. Los conteos resumen llegan ya calculados desde el core.
pub struct PgVersionStore<P: ConnectionProvider> {
    pub provider: P,
}

impl<P: ConnectionProvider> PgVersionStore<P> {
    pub fn new(provider: P) -> Self {
        Self { provider }
    }

    /// Inserta o actualiza el snapshot de una versión.
    pub fn upsert_version(&self, version: &PhaseVersion) -> Result<(), PersistenceError> {
        let row = VersionRow::from_version(version);
        with_retry(|| {
            let mut conn = self.provider.connection()?;
            diesel::insert_into(phase_versions::table)
                .values(&row)
                .on_conflict(phase_versions::version_id)
                .do_update()
                .set((phase_versions::status.eq(&row.status),
                      phase_versions::rejection_reason.eq(&row.rejection_reason),
                      phase_versions::total_decisions.eq(row.total_decisions),
                      phase_versions::included.eq(row.included),
                      phase_versions::excluded.eq(row.excluded),
                      phase_versions::deferred.eq(row.deferred),
                      phase_versions::content_fingerprint.eq(&row.content_fingerprint)))
                .execute(&mut conn)
                .map(|_| ())
                .map_err(PersistenceError::from)
        })
    }

    /// Filas de versión de un (cycle, report, phase) en orden de número.
    pub fn load_versions(&self,
                         cycle_id: Uuid,
                         report_id: Uuid,
                         phase: &str)
                         -> Result<Vec<VersionRow>, PersistenceError> {
        with_retry(|| {
            let mut conn = self.provider.connection()?;
            phase_versions::table.filter(phase_versions::cycle_id.eq(cycle_id))
                                 .filter(phase_versions::report_id.eq(report_id))
                                 .filter(phase_versions::phase.eq(phase))
                                 .order(phase_versions::version_number.asc())
                                 .load(&mut conn)
                                 .map_err(PersistenceError::from)
        })
    }
}

/// Implementación Postgres de `PhaseRepository` delegada a la versión
/// InMemory.
///
/// Para asegurar paridad exacta con el core y evitar duplicación de reglas,
/// el replay reutiliza `InMemoryPhaseRepository` sobre los eventos leídos.
pub struct PgPhaseRepository;
impl PgPhaseRepository {
    pub fn new() -> Self {
        Self
    }
}

impl Default for PgPhaseRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl PhaseRepository for PgPhaseRepository {
    fn load(&self, ctx: &PhaseContext, events: &[PhaseEvent], template: &PhaseTemplate) -> PhaseState {
        InMemoryPhaseRepository::new().load(ctx, events, template)
    }
}

/// Construye un pool Postgres r2d2 a partir de URL.
///
/// Comportamiento:
/// - Valida y ajusta tamaños (si `min_size > max_size`, usa `min_size =
///   max_size`).
/// - Ejecuta migraciones inmediatamente tras el primer `get()`.
/// - Devuelve `PersistenceError::TransientIo` ante errores del pool/manager.
pub fn build_pool(database_url: &str, min_size: u32, max_size: u32) -> Result<PgPool, PersistenceError> {
    let validated_min = if min_size == 0 { 1 } else { min_size };
    let validated_max = if max_size == 0 { 1 } else { max_size };
    if validated_min > validated_max {
        eprintln!("WARN: min_size > max_size ({} > {}), ajustando min=max",
                  validated_min, validated_max);
    }
    let final_min = validated_min.min(validated_max);
    let manager = ConnectionManager::<PgConnection>::new(database_url);
    let pool = r2d2::Pool::builder().min_idle(Some(final_min))
                                    .max_size(validated_max)
                                    .build(manager)
                                    .map_err(|e| PersistenceError::TransientIo(format!("pool build: {e}")))?;
    // Ejecutar migraciones una sola vez al construir (primer connection checkout).
    {
        let mut conn = pool.get()
                           .map_err(|e| PersistenceError::TransientIo(format!("pool get for migrations: {e}")))?;
        run_pending_migrations(&mut conn)?;
    }
    Ok(pool)
}

/// Helper de desarrollo: carga `.env`, lee configuración (DATABASE_URL,
/// tamaños) y construye un pool ya migrado.
pub fn build_dev_pool_from_env() -> Result<PgPool, PersistenceError> {
    crate::config::init_dotenv();
    let cfg = crate::config::DbConfig::from_env();
    build_pool(&cfg.url, cfg.min_connections, cfg.max_connections)
}
