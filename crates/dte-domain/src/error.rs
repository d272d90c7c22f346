//! Errores del dominio regulatorio.

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum DomainError {
    #[error("validation error: {0}")] ValidationError(String),
    #[error("unknown phase: {0}")] UnknownPhase(String),
    #[error("unknown role: {0}")] UnknownRole(String),
}
