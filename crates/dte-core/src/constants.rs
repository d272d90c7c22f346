//! Constantes del motor de workflow.
//!
//! Valores estáticos que participan en el cálculo de fingerprints. Un cambio
//! de versión del motor invalida determinísticamente los fingerprints aunque
//! las plantillas y los datos no cambien.

/// Versión lógica del motor. Entra en el input de todos los fingerprints
/// (actividad, fase y versión). Mantener estable mientras no haya cambios
/// incompatibles de semántica.
pub const ENGINE_VERSION: &str = "DTE-1.0";

/// Nombre del evento externo emitido al ligar evidencia. Las plantillas que
/// declaran `auto_complete_on_event` con este nombre se completan solas al
/// recibir evidencia (uploads de RFI).
pub const EVIDENCE_ATTACHED_EVENT: &str = "evidence_attached";
