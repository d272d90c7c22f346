//! Plantillas de actividad y `PhaseTemplate` (catálogo validado de una fase).

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::{HashMap, HashSet, VecDeque};

use dte_domain::{UserRole, WorkflowPhase};

use super::{ActivityDependency, DependencyType};
use crate::errors::WorkflowError;
use crate::hashing::hash_value;

/// Tipo general de la actividad dentro de la fase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActivityType {
    /// Hito de apertura de la fase.
    Start,
    /// Trabajo manual o automático.
    Task,
    /// Revisión de resultados intermedios.
    Review,
    /// Aprobación formal (único tipo que satisface aristas `Approval`).
    Approval,
    /// Hito de cierre de la fase.
    Complete,
}

/// Fila de plantilla: describe una actividad nombrada de una fase.
/// Única por (phase, name); dato estático, no se muta en runtime.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityTemplate {
    pub phase: WorkflowPhase,
    pub name: String,
    pub activity_type: ActivityType,
    pub activity_order: u32,
    /// Rol requerido para ejecutarla manualmente. `None` = cualquier rol.
    pub required_role: Option<UserRole>,
    /// `false` = el motor la auto-completa cuando sus gates abren.
    pub is_manual: bool,
    pub is_optional: bool,
    /// Nombre de evento externo que la auto-completa (RFI, uploads, etc.).
    pub auto_complete_on_event: Option<String>,
}

impl ActivityTemplate {
    pub fn new(phase: WorkflowPhase, name: &str, activity_type: ActivityType, activity_order: u32) -> Self {
        ActivityTemplate { phase,
                           name: name.to_string(),
                           activity_type,
                           activity_order,
                           required_role: None,
                           is_manual: true,
                           is_optional: false,
                           auto_complete_on_event: None }
    }

    pub fn with_role(mut self, role: UserRole) -> Self {
        self.required_role = Some(role);
        self
    }

    pub fn automatic(mut self) -> Self {
        self.is_manual = false;
        self
    }

    pub fn optional(mut self) -> Self {
        self.is_optional = true;
        self
    }

    pub fn auto_complete_on(mut self, event: &str) -> Self {
        self.auto_complete_on_event = Some(event.to_string());
        self
    }
}

/// Catálogo validado de una fase: actividades en `activity_order` más el
/// grafo de dependencias, garantizado acíclico al construirse.
#[derive(Debug, Clone)]
pub struct PhaseTemplate {
    phase: WorkflowPhase,
    activities: IndexMap<String, ActivityTemplate>,
    dependencies: Vec<ActivityDependency>,
    topological_order: Vec<String>,
    template_hash: String,
}

impl PhaseTemplate {
    /// Construye y valida el catálogo de una fase.
    ///
    /// Reglas (el sistema original no validaba ninguna; una tabla cíclica
    /// dejaba la fase bloqueada para siempre):
    /// 1. Toda plantilla debe declarar la misma fase.
    /// 2. Nombres de actividad únicos dentro de la fase.
    /// 3. Toda arista debe referenciar actividades existentes de la fase.
    /// 4. Aristas `Approval` sólo pueden apuntar a actividades `Approval`.
    /// 5. El grafo debe ser acíclico (orden topológico por Kahn).
    pub fn new(phase: WorkflowPhase,
               mut templates: Vec<ActivityTemplate>,
               dependencies: Vec<ActivityDependency>)
               -> Result<Self, WorkflowError> {
        for t in &templates {
            if t.phase != phase {
                return Err(WorkflowError::PhaseMismatch { expected: phase.as_str().to_string(),
                                                          found: t.phase.as_str().to_string() });
            }
        }
        // Orden estable por activity_order; el IndexMap conserva este orden.
        templates.sort_by_key(|t| t.activity_order);
        let mut activities: IndexMap<String, ActivityTemplate> = IndexMap::with_capacity(templates.len());
        for t in templates {
            if activities.insert(t.name.clone(), t.clone()).is_some() {
                return Err(WorkflowError::DuplicateActivity(t.name));
            }
        }

        for d in &dependencies {
            if d.phase != phase {
                return Err(WorkflowError::PhaseMismatch { expected: phase.as_str().to_string(),
                                                          found: d.phase.as_str().to_string() });
            }
            if !activities.contains_key(&d.activity) {
                return Err(WorkflowError::UnknownDependency(d.activity.clone()));
            }
            let upstream = activities.get(&d.depends_on)
                                     .ok_or_else(|| WorkflowError::UnknownDependency(d.depends_on.clone()))?;
            if d.dependency_type == DependencyType::Approval && upstream.activity_type != ActivityType::Approval {
                return Err(WorkflowError::InvalidApprovalDependency { depends_on: d.depends_on.clone() });
            }
        }

        let topological_order = topological_sort(&activities, &dependencies)?;

        // Identidad estable de la plantilla: nombres en orden + aristas.
        let edges: Vec<serde_json::Value> =
            dependencies.iter()
                        .map(|d| json!([d.activity, d.depends_on, d.dependency_type.as_str()]))
                        .collect();
        let names: Vec<&str> = activities.keys().map(|s| s.as_str()).collect();
        let template_hash = hash_value(&json!({
                                           "phase": phase.as_str(),
                                           "activities": names,
                                           "dependencies": edges,
                                       }));

        Ok(PhaseTemplate { phase,
                           activities,
                           dependencies,
                           topological_order,
                           template_hash })
    }

    pub fn phase(&self) -> WorkflowPhase {
        self.phase
    }

    /// Actividades en `activity_order`.
    pub fn activities(&self) -> impl Iterator<Item = &ActivityTemplate> {
        self.activities.values()
    }

    pub fn len(&self) -> usize {
        self.activities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.activities.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&ActivityTemplate> {
        self.activities.get(name)
    }

    /// Aristas entrantes de `name` (sus dependencias).
    pub fn dependencies_of<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a ActivityDependency> {
        self.dependencies.iter().filter(move |d| d.activity == name)
    }

    pub fn dependencies(&self) -> &[ActivityDependency] {
        &self.dependencies
    }

    /// Orden topológico (válido para ejecución secuencial).
    pub fn topological_order(&self) -> &[String] {
        &self.topological_order
    }

    pub fn template_hash(&self) -> &str {
        &self.template_hash
    }
}

/// Kahn: detecta ciclos y produce un orden de ejecución válido. Entre nodos
/// sin dependencias mutuas respeta el `activity_order` del catálogo.
fn topological_sort(activities: &IndexMap<String, ActivityTemplate>,
                    dependencies: &[ActivityDependency])
                    -> Result<Vec<String>, WorkflowError> {
    let mut adjacency: HashMap<&str, Vec<&str>> = HashMap::new();
    let mut in_degree: HashMap<&str, usize> = HashMap::new();

    for name in activities.keys() {
        adjacency.entry(name.as_str()).or_default();
        in_degree.entry(name.as_str()).or_insert(0);
    }
    for d in dependencies {
        adjacency.entry(d.depends_on.as_str()).or_default().push(d.activity.as_str());
        *in_degree.entry(d.activity.as_str()).or_insert(0) += 1;
    }

    // Semilla en orden de catálogo para que el resultado sea determinista.
    let mut queue: VecDeque<&str> = activities.keys()
                                              .map(|s| s.as_str())
                                              .filter(|n| in_degree[n] == 0)
                                              .collect();
    let mut sorted: Vec<String> = Vec::with_capacity(activities.len());
    while let Some(node) = queue.pop_front() {
        sorted.push(node.to_string());
        if let Some(next) = adjacency.get(node) {
            for &n in next {
                let deg = in_degree.entry(n).or_insert(0);
                *deg -= 1;
                if *deg == 0 {
                    queue.push_back(n);
                }
            }
        }
    }

    if sorted.len() != activities.len() {
        let visited: HashSet<&str> = sorted.iter().map(|s| s.as_str()).collect();
        let stuck = activities.keys()
                              .map(|s| s.as_str())
                              .filter(|n| !visited.contains(n))
                              .collect::<Vec<_>>()
                              .join(", ");
        return Err(WorkflowError::DependencyCycle(stuck));
    }
    Ok(sorted)
}
