//! Roles de usuario del modelo regulatorio.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::DomainError;

/// Rol requerido para ejecutar actividades o aprobar versiones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UserRole {
    Tester,
    TestExecutive,
    DataOwner,
    DataExecutive,
    ReportOwner,
    ReportOwnerExecutive,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Tester => "tester",
            UserRole::TestExecutive => "test_executive",
            UserRole::DataOwner => "data_owner",
            UserRole::DataExecutive => "data_executive",
            UserRole::ReportOwner => "report_owner",
            UserRole::ReportOwnerExecutive => "report_owner_executive",
        }
    }

    pub fn parse(s: &str) -> Result<Self, DomainError> {
        match s {
            "tester" => Ok(UserRole::Tester),
            "test_executive" => Ok(UserRole::TestExecutive),
            "data_owner" => Ok(UserRole::DataOwner),
            "data_executive" => Ok(UserRole::DataExecutive),
            "report_owner" => Ok(UserRole::ReportOwner),
            "report_owner_executive" => Ok(UserRole::ReportOwnerExecutive),
            other => Err(DomainError::UnknownRole(other.to_string())),
        }
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
