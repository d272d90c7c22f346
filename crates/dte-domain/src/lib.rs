// dte-domain library entry point
pub mod attribute;
pub mod cycle;
pub mod error;
pub mod lob;
pub mod phase;
pub mod report;
pub mod role;

pub use attribute::{AttributeDataType, ReportAttribute};
pub use cycle::{CycleReport, CycleReportStatus, CycleStatus, TestCycle};
pub use error::DomainError;
pub use lob::LineOfBusiness;
pub use phase::WorkflowPhase;
pub use report::Report;
pub use role::UserRole;
