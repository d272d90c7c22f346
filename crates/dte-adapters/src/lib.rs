//! dte-adapters: Capa de adaptación Dominio ↔ Core
//!
//! Este crate provee:
//! - El catálogo estándar de las nueve fases regulatorias (actividades
//!   sembradas + aristas de dependencia, sabor FR Y-14M/Q).
//! - `scenario`: helpers end-to-end que arman LOB → Report → Cycle →
//!   CycleReport en orden de dependencias, fallando temprano con errores
//!   tipados cuando falta un prerequisito.
//!
//! El core sólo conoce `PhaseTemplate` y `ActivityDependency`; acá se fija
//! QUÉ actividades existen por fase y con qué roles.

pub mod catalog;
pub mod scenario;

pub use catalog::{standard_catalog, standard_template};
pub use scenario::{Scenario, ScenarioError};
