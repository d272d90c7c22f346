//! Atributo de reporte: columna del schedule regulatorio sujeta a prueba.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::DomainError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AttributeDataType {
    Text,
    Integer,
    Decimal,
    Date,
    Boolean,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportAttribute {
    attribute_id: Uuid,
    name: String,
    data_type: AttributeDataType,
    is_mandatory: bool,
    is_primary_key: bool,
    /// LOB dueña del dato, si ya fue identificada (fase Data Owner ID).
    lob_id: Option<Uuid>,
}

impl ReportAttribute {
    pub fn new(name: &str, data_type: AttributeDataType, is_mandatory: bool) -> Result<Self, DomainError> {
        if name.trim().is_empty() {
            return Err(DomainError::ValidationError("attribute name must not be empty".to_string()));
        }
        Ok(ReportAttribute { attribute_id: Uuid::new_v4(),
                             name: name.trim().to_string(),
                             data_type,
                             is_mandatory,
                             is_primary_key: false,
                             lob_id: None })
    }

    pub fn as_primary_key(mut self) -> Self {
        self.is_primary_key = true;
        self
    }

    pub fn assign_lob(&mut self, lob_id: Uuid) {
        self.lob_id = Some(lob_id);
    }

    pub fn attribute_id(&self) -> Uuid {
        self.attribute_id
    }
    pub fn name(&self) -> &str {
        &self.name
    }
    pub fn data_type(&self) -> AttributeDataType {
        self.data_type
    }
    pub fn is_mandatory(&self) -> bool {
        self.is_mandatory
    }
    pub fn is_primary_key(&self) -> bool {
        self.is_primary_key
    }
    pub fn lob_id(&self) -> Option<Uuid> {
        self.lob_id
    }
}
