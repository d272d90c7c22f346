//! Resolución de gates: recalcula `can_start` / `can_complete` sobre el
//! conjunto completo de instancias de una fase.
//!
//! Equivalente en memoria del `UPDATE ... FROM` que el sistema original
//! relanzaba bajo demanda, con dos diferencias deliberadas:
//! - `Completion`, `Approval` y `Any` tienen semántica distinta (el original
//!   comparaba todo contra el literal `'completed'`).
//! - Los grafos cíclicos no llegan aquí: `PhaseTemplate::new` los rechaza.
//!
//! `can_complete` conserva la regla literal del original: verdadero sii la
//! actividad está `InProgress`.

use indexmap::IndexMap;

use super::{ActivityDependency, ActivityInstance, ActivityStatus, ActivityTemplate, DependencyType,
            PhaseTemplate};

/// ¿Satisface el estado del upstream la arista `dep`?
fn dependency_satisfied(dep: &ActivityDependency,
                        upstream_status: ActivityStatus,
                        upstream_template: &ActivityTemplate)
                        -> bool {
    match dep.dependency_type {
        DependencyType::Completion => {
            upstream_status == ActivityStatus::Completed
            || (upstream_template.is_optional && upstream_status == ActivityStatus::Skipped)
        }
        // Un skip nunca satisface una aprobación.
        DependencyType::Approval => upstream_status == ActivityStatus::Completed,
        DependencyType::Any => upstream_status.is_terminal(),
    }
}

/// Dependencias no satisfechas de `name` dado el estado actual de la fase.
pub fn unmet_dependencies(name: &str,
                          instances: &IndexMap<String, ActivityInstance>,
                          template: &PhaseTemplate)
                          -> Vec<String> {
    template.dependencies_of(name)
            .filter(|dep| {
                let upstream_status = instances.get(&dep.depends_on)
                                               .map(|i| i.status)
                                               .unwrap_or(ActivityStatus::NotStarted);
                match template.get(&dep.depends_on) {
                    Some(upstream_template) => !dependency_satisfied(dep, upstream_status, upstream_template),
                    // Referencias colgantes no pasan la validación de la
                    // plantilla; si aparecieran, cuentan como no satisfechas.
                    None => true,
                }
            })
            .map(|dep| dep.depends_on.clone())
            .collect()
}

/// Recalcula los flags de toda la fase. Actividades sin dependencias son
/// siempre arrancables mientras estén `NotStarted`.
pub fn recompute_gates(instances: &mut IndexMap<String, ActivityInstance>, template: &PhaseTemplate) {
    let names: Vec<String> = instances.keys().cloned().collect();
    for name in names {
        let unmet = unmet_dependencies(&name, instances, template);
        if let Some(inst) = instances.get_mut(&name) {
            inst.can_start = matches!(inst.status, ActivityStatus::NotStarted | ActivityStatus::RevisionRequested)
                             && unmet.is_empty();
            inst.can_complete = inst.status == ActivityStatus::InProgress;
        }
    }
}
