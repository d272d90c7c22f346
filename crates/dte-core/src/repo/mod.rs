//! Reconstrucción de estado por replay de eventos.

mod types;

pub use types::{InMemoryPhaseRepository, PhaseContext, PhaseRepository, PhaseState};
