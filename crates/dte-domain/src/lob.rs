//! Línea de negocio (LOB): agrupación organizacional que delimita reportes
//! y propiedad de datos.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::DomainError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineOfBusiness {
    lob_id: Uuid,
    name: String,
}

impl LineOfBusiness {
    /// Crea una LOB validando que el nombre no sea vacío ni solo espacios.
    pub fn new(name: &str) -> Result<Self, DomainError> {
        let trimmed = name.trim();
        if trimmed.is_empty() {
            return Err(DomainError::ValidationError("LOB name must not be empty".to_string()));
        }
        Ok(LineOfBusiness { lob_id: Uuid::new_v4(),
                            name: trimmed.to_string() })
    }

    /// Reconstruye una LOB desde almacenamiento (id ya asignado).
    pub fn from_parts(lob_id: Uuid, name: String) -> Self {
        LineOfBusiness { lob_id, name }
    }

    pub fn lob_id(&self) -> Uuid {
        self.lob_id
    }
    pub fn name(&self) -> &str {
        &self.name
    }
}
