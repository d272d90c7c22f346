//! Decisión hija de una versión: qué se hace con cada atributo del reporte.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DecisionKind {
    /// El atributo entra al alcance de la fase.
    Include,
    /// Fuera de alcance.
    Exclude,
    /// Decisión pospuesta a una versión futura.
    Defer,
}

impl DecisionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DecisionKind::Include => "include",
            DecisionKind::Exclude => "exclude",
            DecisionKind::Defer => "defer",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionDecision {
    pub decision_id: Uuid,
    pub version_id: Uuid,
    pub attribute_id: Uuid,
    pub decision: DecisionKind,
    pub rationale: Option<String>,
}

impl VersionDecision {
    pub fn new(version_id: Uuid, attribute_id: Uuid, decision: DecisionKind) -> Self {
        VersionDecision { decision_id: Uuid::new_v4(),
                          version_id,
                          attribute_id,
                          decision,
                          rationale: None }
    }

    pub fn with_rationale(mut self, rationale: &str) -> Self {
        self.rationale = Some(rationale.to_string());
        self
    }
}
