//! Ciclo de vida de versiones por fase.
//!
//! Cada fase versionada (scoping, sample selection, observaciones, etc.)
//! produce snapshots inmutables con workflow de aprobación:
//! draft -> pending_approval -> approved | rejected, y supersession cuando
//! una nueva versión aprobada reemplaza a la anterior. El sistema original
//! dejaba estas reglas implícitas en enums de columna y services dispersos;
//! aquí son funciones de transición con guardas tipadas y un ledger que
//! sostiene los invariantes:
//! - (cycle, report, version_number) único.
//! - A lo sumo una versión `Approved` vigente por fase.
//! - Versiones superseded se retienen para auditoría, nunca se borran.

mod decision;
mod ledger;
mod types;

pub use decision::{DecisionKind, VersionDecision};
pub use ledger::VersionLedger;
pub use types::{PhaseVersion, VersionError, VersionStatus, VersionSummary};
