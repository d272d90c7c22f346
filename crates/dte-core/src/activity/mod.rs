//! Actividades del workflow: plantillas estáticas, grafo de dependencias e
//! instancias en ejecución.
//!
//! El sistema original representaba todo esto como filas declarativas
//! (`workflow_activity_templates` / `_dependencies` / `workflow_activities`)
//! con los flags `can_start`/`can_complete` recalculados por un UPDATE SQL.
//! Aquí el mismo modelo es una máquina de estados explícita:
//! - `PhaseTemplate` valida el grafo al construirse (duplicados, referencias
//!   colgantes, ciclos) en lugar de dejar fases bloqueadas en silencio.
//! - `ActivityInstance` expone funciones de transición con guardas tipadas.
//! - `resolver` recalcula los gates distinguiendo dependencias de tipo
//!   completion / approval / any.

mod dependency;
mod instance;
mod resolver;
mod template;

pub use dependency::{ActivityDependency, DependencyType};
pub use instance::{ActivityInstance, ActivityStatus};
pub use resolver::{recompute_gates, unmet_dependencies};
pub use template::{ActivityTemplate, ActivityType, PhaseTemplate};
