//! dte-core: motor de workflow por fases (actividades + versiones)
pub mod activity;
pub mod assignment;
pub mod constants;
pub mod engine;
pub mod errors;
pub mod event;
pub mod evidence;
pub mod hashing;
pub mod repo;
pub mod revision;
pub mod version;

pub use activity::{ActivityDependency, ActivityInstance, ActivityStatus, ActivityTemplate, ActivityType,
                   DependencyType, PhaseTemplate};
pub use assignment::{AssignmentRegistry, AssignmentStatus, DataOwnerAssignment};
pub use engine::{Actor, PhaseEngine};
pub use errors::{classify_error, ErrorClass, WorkflowError};
pub use event::{EventStore, InMemoryEventStore, PhaseEvent, PhaseEventKind};
pub use evidence::{Evidence, EvidenceKind, EvidenceStore};
pub use repo::{InMemoryPhaseRepository, PhaseContext, PhaseRepository, PhaseState};
pub use revision::{RevisionPriority, RevisionRequest, RevisionStatus, RevisionTarget};
pub use version::{DecisionKind, PhaseVersion, VersionDecision, VersionError, VersionLedger, VersionStatus,
                  VersionSummary};
