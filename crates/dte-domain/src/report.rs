//! Reporte regulatorio asociado a una LOB (ej. FR Y-14M, FR Y-14Q).

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::DomainError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Report {
    report_id: Uuid,
    name: String,
    /// Identificador del reporte regulatorio (ej. "FR Y-14Q Schedule A").
    regulation: String,
    lob_id: Uuid,
    report_owner_id: Option<Uuid>,
}

impl Report {
    /// Crea un reporte. La LOB debe existir antes: el id se recibe ya
    /// construido para forzar el orden de creación LOB -> Report.
    pub fn new(name: &str, regulation: &str, lob_id: Uuid) -> Result<Self, DomainError> {
        if name.trim().is_empty() {
            return Err(DomainError::ValidationError("report name must not be empty".to_string()));
        }
        if regulation.trim().is_empty() {
            return Err(DomainError::ValidationError("regulation must not be empty".to_string()));
        }
        Ok(Report { report_id: Uuid::new_v4(),
                    name: name.trim().to_string(),
                    regulation: regulation.trim().to_string(),
                    lob_id,
                    report_owner_id: None })
    }

    pub fn with_owner(mut self, owner_id: Uuid) -> Self {
        self.report_owner_id = Some(owner_id);
        self
    }

    pub fn report_id(&self) -> Uuid {
        self.report_id
    }
    pub fn name(&self) -> &str {
        &self.name
    }
    pub fn regulation(&self) -> &str {
        &self.regulation
    }
    pub fn lob_id(&self) -> Uuid {
        self.lob_id
    }
    pub fn report_owner_id(&self) -> Option<Uuid> {
        self.report_owner_id
    }
}
