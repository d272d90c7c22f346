//! Evidencia direccionada por contenido.
//!
//! Una `Evidence` es la unidad de soporte que un data owner entrega para un
//! test case (fase RFI): un documento o el resultado de una query. Es neutral:
//! - `payload` es JSON genérico; el motor no interpreta su semántica.
//! - `hash` se calcula sobre el JSON canonicalizado (ver
//!   `hashing::to_canonical_json`) y es la identidad para deduplicación y
//!   trazabilidad.
//! - `metadata` y los campos de autoría anotan información que no entra al
//!   hash.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use uuid::Uuid;

use crate::hashing::hash_value;

/// Tipos de evidencia aceptados en la fase Request Info.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EvidenceKind {
    /// Documento aportado por el data owner.
    Document,
    /// Resultado de una query sobre una fuente de datos declarada.
    QueryResult,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Evidence {
    pub kind: EvidenceKind,
    pub hash: String, // hash canónico del payload (asignado por el store)
    pub payload: Value,
    pub metadata: Option<Value>, // no entra al hash
    pub test_case_id: Option<Uuid>,
    pub submitted_by: Uuid,
    pub submitted_at: DateTime<Utc>,
}

impl Evidence {
    pub fn new(kind: EvidenceKind, payload: Value, submitted_by: Uuid) -> Self {
        Evidence { kind,
                   hash: String::new(),
                   payload,
                   metadata: None,
                   test_case_id: None,
                   submitted_by,
                   submitted_at: Utc::now() }
    }

    pub fn with_metadata(mut self, metadata: Value) -> Self {
        self.metadata = Some(metadata);
        self
    }

    pub fn for_test_case(mut self, test_case_id: Uuid) -> Self {
        self.test_case_id = Some(test_case_id);
        self
    }
}

/// Cache local de evidencia, deduplicada por hash. Dos envíos con el mismo
/// payload canónico colapsan en una sola entrada (gana la primera).
#[derive(Default)]
pub struct EvidenceStore {
    inner: HashMap<String, Evidence>,
}

impl EvidenceStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Hashea el payload, almacena (si no existía) y devuelve el hash.
    pub fn insert(&mut self, mut evidence: Evidence) -> String {
        let hash = hash_value(&evidence.payload);
        evidence.hash = hash.clone();
        self.inner.entry(hash.clone()).or_insert(evidence);
        hash
    }

    pub fn get(&self, hash: &str) -> Option<&Evidence> {
        self.inner.get(hash)
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}
