//! Librería raíz de SynapseDTE.
//!
//! Este crate actúa como la fachada del workspace:
//! - Re-exporta `errors` del núcleo para clasificar fallos de workflow.
//! - Re-exporta `hashing` para serializar JSON en forma canónica.
//!
//! Puede usarse desde `main.rs` o por otros crates/clientes.

pub use dte_core::errors;
pub use dte_core::hashing;
