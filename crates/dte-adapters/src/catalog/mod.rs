//! Catálogo estándar de actividades por fase.
//!
//! Equivalente en código de las tablas seed `workflow_activity_templates` y
//! `workflow_activity_dependencies` del sistema regulatorio: filas estáticas,
//! nunca creadas ni mutadas en runtime. Cada fase abre y cierra con hitos
//! automáticos; las aprobaciones usan aristas tipo `Approval` hacia
//! actividades de tipo `Approval`.
//!
//! Nota: Evitar cambios de orden o contenido para preservar determinismo de
//! los template hashes.

use dte_core::constants::EVIDENCE_ATTACHED_EVENT;
use dte_core::{ActivityDependency, ActivityTemplate, ActivityType, DependencyType, PhaseTemplate};
use dte_domain::{UserRole, WorkflowPhase};

fn start(phase: WorkflowPhase, name: &str) -> ActivityTemplate {
    ActivityTemplate::new(phase, name, ActivityType::Start, 1).automatic()
}

fn complete(phase: WorkflowPhase, name: &str, order: u32) -> ActivityTemplate {
    ActivityTemplate::new(phase, name, ActivityType::Complete, order).automatic()
}

fn completion(phase: WorkflowPhase, activity: &str, depends_on: &str) -> ActivityDependency {
    ActivityDependency::new(phase, activity, depends_on, DependencyType::Completion)
}

fn approval(phase: WorkflowPhase, activity: &str, depends_on: &str) -> ActivityDependency {
    ActivityDependency::new(phase, activity, depends_on, DependencyType::Approval)
}

/// Planning: generación y revisión de atributos del reporte, con aprobación
/// del test executive antes del cierre.
pub fn planning_template() -> PhaseTemplate {
    let phase = WorkflowPhase::Planning;
    let activities = vec![
        start(phase, "Start Planning Phase"),
        ActivityTemplate::new(phase, "Generate Attributes", ActivityType::Task, 2).with_role(UserRole::Tester),
        ActivityTemplate::new(phase, "Review Attributes", ActivityType::Review, 3).with_role(UserRole::Tester),
        ActivityTemplate::new(phase, "Tester Approval", ActivityType::Approval, 4).with_role(UserRole::TestExecutive),
        complete(phase, "Complete Planning Phase", 5),
    ];
    let deps = vec![
        completion(phase, "Generate Attributes", "Start Planning Phase"),
        completion(phase, "Review Attributes", "Generate Attributes"),
        completion(phase, "Tester Approval", "Review Attributes"),
        approval(phase, "Complete Planning Phase", "Tester Approval"),
    ];
    PhaseTemplate::new(phase, activities, deps).expect("planning catalog")
}

/// Data Profiling: carga de archivos, reglas y aprobación del report owner.
pub fn data_profiling_template() -> PhaseTemplate {
    let phase = WorkflowPhase::DataProfiling;
    let activities = vec![
        start(phase, "Start Data Profiling Phase"),
        ActivityTemplate::new(phase, "Upload Data Files", ActivityType::Task, 2).with_role(UserRole::Tester),
        ActivityTemplate::new(phase, "Generate Profiling Rules", ActivityType::Task, 3).with_role(UserRole::Tester),
        ActivityTemplate::new(phase, "Review Profiling Results", ActivityType::Review, 4).with_role(UserRole::Tester),
        ActivityTemplate::new(phase, "Report Owner Approval", ActivityType::Approval, 5).with_role(UserRole::ReportOwner),
        complete(phase, "Complete Data Profiling Phase", 6),
    ];
    let deps = vec![
        completion(phase, "Upload Data Files", "Start Data Profiling Phase"),
        completion(phase, "Generate Profiling Rules", "Upload Data Files"),
        completion(phase, "Review Profiling Results", "Generate Profiling Rules"),
        completion(phase, "Report Owner Approval", "Review Profiling Results"),
        approval(phase, "Complete Data Profiling Phase", "Report Owner Approval"),
    ];
    PhaseTemplate::new(phase, activities, deps).expect("data profiling catalog")
}

/// Scoping: recomendaciones de alcance y decisión aprobada por report owner.
pub fn scoping_template() -> PhaseTemplate {
    let phase = WorkflowPhase::Scoping;
    let activities = vec![
        start(phase, "Start Scoping Phase"),
        ActivityTemplate::new(phase, "Generate Recommendations", ActivityType::Task, 2).with_role(UserRole::Tester),
        ActivityTemplate::new(phase, "Review Decisions", ActivityType::Review, 3).with_role(UserRole::Tester),
        ActivityTemplate::new(phase, "Report Owner Approval", ActivityType::Approval, 4).with_role(UserRole::ReportOwner),
        complete(phase, "Complete Scoping Phase", 5),
    ];
    let deps = vec![
        completion(phase, "Generate Recommendations", "Start Scoping Phase"),
        completion(phase, "Review Decisions", "Generate Recommendations"),
        completion(phase, "Report Owner Approval", "Review Decisions"),
        approval(phase, "Complete Scoping Phase", "Report Owner Approval"),
    ];
    PhaseTemplate::new(phase, activities, deps).expect("scoping catalog")
}

/// Sample Selection: muestras generadas y aprobadas por report owner.
pub fn sample_selection_template() -> PhaseTemplate {
    let phase = WorkflowPhase::SampleSelection;
    let activities = vec![
        start(phase, "Start Sample Selection Phase"),
        ActivityTemplate::new(phase, "Generate Samples", ActivityType::Task, 2).with_role(UserRole::Tester),
        ActivityTemplate::new(phase, "Review Samples", ActivityType::Review, 3).with_role(UserRole::Tester),
        ActivityTemplate::new(phase, "Report Owner Approval", ActivityType::Approval, 4).with_role(UserRole::ReportOwner),
        complete(phase, "Complete Sample Selection Phase", 5),
    ];
    let deps = vec![
        completion(phase, "Generate Samples", "Start Sample Selection Phase"),
        completion(phase, "Review Samples", "Generate Samples"),
        completion(phase, "Report Owner Approval", "Review Samples"),
        approval(phase, "Complete Sample Selection Phase", "Report Owner Approval"),
    ];
    PhaseTemplate::new(phase, activities, deps).expect("sample selection catalog")
}

/// Data Owner Identification: asignaciones ejecutadas por el data executive,
/// sin gate de aprobación.
pub fn data_owner_identification_template() -> PhaseTemplate {
    let phase = WorkflowPhase::DataOwnerIdentification;
    let activities = vec![
        start(phase, "Start Data Owner Identification Phase"),
        ActivityTemplate::new(phase, "Assign LOB Executives", ActivityType::Task, 2).with_role(UserRole::DataExecutive),
        ActivityTemplate::new(phase, "Assign Data Owners", ActivityType::Task, 3).with_role(UserRole::DataExecutive),
        complete(phase, "Complete Data Owner Identification Phase", 4),
    ];
    let deps = vec![
        completion(phase, "Assign LOB Executives", "Start Data Owner Identification Phase"),
        completion(phase, "Assign Data Owners", "Assign LOB Executives"),
        completion(phase, "Complete Data Owner Identification Phase", "Assign Data Owners"),
    ];
    PhaseTemplate::new(phase, activities, deps).expect("data owner identification catalog")
}

/// Request Info (RFI): los data owners suben evidencia; los documentos de
/// soporte son opcionales (arista `Any`: basta que terminen, completados u
/// omitidos).
pub fn request_info_template() -> PhaseTemplate {
    let phase = WorkflowPhase::RequestInfo;
    let activities = vec![
        start(phase, "Start Request Info Phase"),
        ActivityTemplate::new(phase, "Generate Test Cases", ActivityType::Task, 2).with_role(UserRole::Tester),
        ActivityTemplate::new(phase, "Upload Evidence", ActivityType::Task, 3).with_role(UserRole::DataOwner)
                                                                              .auto_complete_on(EVIDENCE_ATTACHED_EVENT),
        ActivityTemplate::new(phase, "Upload Supporting Documents", ActivityType::Task, 4).with_role(UserRole::DataOwner)
                                                                                          .optional()
                                                                                          .auto_complete_on(EVIDENCE_ATTACHED_EVENT),
        ActivityTemplate::new(phase, "Review Evidence", ActivityType::Review, 5).with_role(UserRole::Tester),
        complete(phase, "Complete Request Info Phase", 6),
    ];
    let deps = vec![
        completion(phase, "Generate Test Cases", "Start Request Info Phase"),
        completion(phase, "Upload Evidence", "Generate Test Cases"),
        completion(phase, "Upload Supporting Documents", "Generate Test Cases"),
        completion(phase, "Review Evidence", "Upload Evidence"),
        ActivityDependency::new(phase, "Review Evidence", "Upload Supporting Documents", DependencyType::Any),
        completion(phase, "Complete Request Info Phase", "Review Evidence"),
    ];
    PhaseTemplate::new(phase, activities, deps).expect("request info catalog")
}

/// Test Execution: ejecución de pruebas con aprobación del test executive.
pub fn test_execution_template() -> PhaseTemplate {
    let phase = WorkflowPhase::TestExecution;
    let activities = vec![
        start(phase, "Start Test Execution Phase"),
        ActivityTemplate::new(phase, "Execute Tests", ActivityType::Task, 2).with_role(UserRole::Tester),
        ActivityTemplate::new(phase, "Review Results", ActivityType::Review, 3).with_role(UserRole::Tester),
        ActivityTemplate::new(phase, "Test Executive Approval", ActivityType::Approval, 4).with_role(UserRole::TestExecutive),
        complete(phase, "Complete Test Execution Phase", 5),
    ];
    let deps = vec![
        completion(phase, "Execute Tests", "Start Test Execution Phase"),
        completion(phase, "Review Results", "Execute Tests"),
        completion(phase, "Test Executive Approval", "Review Results"),
        approval(phase, "Complete Test Execution Phase", "Test Executive Approval"),
    ];
    PhaseTemplate::new(phase, activities, deps).expect("test execution catalog")
}

/// Observation Management: observaciones revisadas y aprobadas por el
/// report owner.
pub fn observation_management_template() -> PhaseTemplate {
    let phase = WorkflowPhase::ObservationManagement;
    let activities = vec![
        start(phase, "Start Observation Management Phase"),
        ActivityTemplate::new(phase, "Create Observations", ActivityType::Task, 2).with_role(UserRole::Tester),
        ActivityTemplate::new(phase, "Review Observations", ActivityType::Review, 3).with_role(UserRole::Tester),
        ActivityTemplate::new(phase, "Report Owner Approval", ActivityType::Approval, 4).with_role(UserRole::ReportOwner),
        complete(phase, "Complete Observation Management Phase", 5),
    ];
    let deps = vec![
        completion(phase, "Create Observations", "Start Observation Management Phase"),
        completion(phase, "Review Observations", "Create Observations"),
        completion(phase, "Report Owner Approval", "Review Observations"),
        approval(phase, "Complete Observation Management Phase", "Report Owner Approval"),
    ];
    PhaseTemplate::new(phase, activities, deps).expect("observation management catalog")
}

/// Test Report: redacción y doble aprobación ejecutiva del informe final.
pub fn test_report_template() -> PhaseTemplate {
    let phase = WorkflowPhase::TestReport;
    let activities = vec![
        start(phase, "Start Test Report Phase"),
        ActivityTemplate::new(phase, "Generate Report Sections", ActivityType::Task, 2).with_role(UserRole::Tester),
        ActivityTemplate::new(phase, "Review Report", ActivityType::Review, 3).with_role(UserRole::TestExecutive),
        ActivityTemplate::new(phase, "Report Owner Approval", ActivityType::Approval, 4).with_role(UserRole::ReportOwnerExecutive),
        complete(phase, "Complete Test Report Phase", 5),
    ];
    let deps = vec![
        completion(phase, "Generate Report Sections", "Start Test Report Phase"),
        completion(phase, "Review Report", "Generate Report Sections"),
        completion(phase, "Report Owner Approval", "Review Report"),
        approval(phase, "Complete Test Report Phase", "Report Owner Approval"),
    ];
    PhaseTemplate::new(phase, activities, deps).expect("test report catalog")
}

/// Plantilla estándar de una fase.
pub fn standard_template(phase: WorkflowPhase) -> PhaseTemplate {
    match phase {
        WorkflowPhase::Planning => planning_template(),
        WorkflowPhase::DataProfiling => data_profiling_template(),
        WorkflowPhase::Scoping => scoping_template(),
        WorkflowPhase::SampleSelection => sample_selection_template(),
        WorkflowPhase::DataOwnerIdentification => data_owner_identification_template(),
        WorkflowPhase::RequestInfo => request_info_template(),
        WorkflowPhase::TestExecution => test_execution_template(),
        WorkflowPhase::ObservationManagement => observation_management_template(),
        WorkflowPhase::TestReport => test_report_template(),
    }
}

/// Las nueve fases en orden de workflow.
pub fn standard_catalog() -> Vec<PhaseTemplate> {
    WorkflowPhase::ALL.iter().map(|p| standard_template(*p)).collect()
}
