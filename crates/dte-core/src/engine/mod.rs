//! Motor de fases.

mod core;

pub use core::{Actor, PhaseEngine};
