//! Arista del grafo de dependencias entre actividades de una fase.

use serde::{Deserialize, Serialize};

use dte_domain::WorkflowPhase;

/// Tipo de dependencia entre actividades.
///
/// El sistema original etiquetaba las aristas con un string
/// (`dependency_type`) pero comparaba todo contra `'completed'`. Aquí cada
/// variante tiene semántica propia (ver `resolver`):
/// - `Completion`: la actividad upstream debe estar `Completed` (o `Skipped`
///   si es opcional).
/// - `Approval`: la upstream debe ser una actividad de aprobación y estar
///   `Completed`; un skip nunca la satisface.
/// - `Any`: cualquier estado terminal (`Completed` o `Skipped`) satisface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DependencyType {
    Completion,
    Approval,
    Any,
}

impl DependencyType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DependencyType::Completion => "completion",
            DependencyType::Approval => "approval",
            DependencyType::Any => "any",
        }
    }
}

/// Arista dirigida: `activity` depende de `depends_on`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityDependency {
    pub phase: WorkflowPhase,
    pub activity: String,
    pub depends_on: String,
    pub dependency_type: DependencyType,
}

impl ActivityDependency {
    pub fn new(phase: WorkflowPhase, activity: &str, depends_on: &str, dependency_type: DependencyType) -> Self {
        ActivityDependency { phase,
                             activity: activity.to_string(),
                             depends_on: depends_on.to_string(),
                             dependency_type }
    }
}
