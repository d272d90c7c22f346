use dte_core::{ActivityDependency, ActivityStatus, ActivityTemplate, ActivityType, Actor, DependencyType,
               Evidence, EvidenceKind, PhaseContext, PhaseEngine, PhaseEventKind, PhaseTemplate, WorkflowError};
use dte_domain::{UserRole, WorkflowPhase};
use serde_json::json;
use uuid::Uuid;

const PHASE: WorkflowPhase = WorkflowPhase::Scoping;

/// Catálogo de fixture: réplica compacta de la fase Scoping real.
/// Los hitos de apertura/cierre son automáticos; el cierre exige la
/// aprobación del report owner vía arista `Approval`.
fn scoping_template() -> PhaseTemplate {
    let activities = vec![
        ActivityTemplate::new(PHASE, "Start Scoping Phase", ActivityType::Start, 1).automatic(),
        ActivityTemplate::new(PHASE, "Generate Recommendations", ActivityType::Task, 2).with_role(UserRole::Tester),
        ActivityTemplate::new(PHASE, "Review Decisions", ActivityType::Review, 3).with_role(UserRole::Tester),
        ActivityTemplate::new(PHASE, "Report Owner Approval", ActivityType::Approval, 4).with_role(UserRole::ReportOwner),
        ActivityTemplate::new(PHASE, "Complete Scoping Phase", ActivityType::Complete, 5).automatic(),
    ];
    let deps = vec![
        ActivityDependency::new(PHASE, "Generate Recommendations", "Start Scoping Phase", DependencyType::Completion),
        ActivityDependency::new(PHASE, "Review Decisions", "Generate Recommendations", DependencyType::Completion),
        ActivityDependency::new(PHASE, "Report Owner Approval", "Review Decisions", DependencyType::Completion),
        ActivityDependency::new(PHASE, "Complete Scoping Phase", "Report Owner Approval", DependencyType::Approval),
    ];
    PhaseTemplate::new(PHASE, activities, deps).expect("valid scoping template")
}

fn tester() -> Actor {
    Actor::new(Uuid::new_v4(), UserRole::Tester)
}

fn report_owner() -> Actor {
    Actor::new(Uuid::new_v4(), UserRole::ReportOwner)
}

#[test]
fn initialize_instantiates_templates_in_order_and_autocompletes_start() {
    let template = scoping_template();
    let ctx = PhaseContext::new(Uuid::new_v4(), Uuid::new_v4(), PHASE);
    let mut engine = PhaseEngine::in_memory();

    let state = engine.initialize_phase(&ctx, &template);
    let names: Vec<&str> = state.activities.keys().map(|s| s.as_str()).collect();
    assert_eq!(names,
               vec!["Start Scoping Phase",
                    "Generate Recommendations",
                    "Review Decisions",
                    "Report Owner Approval",
                    "Complete Scoping Phase"]);

    // El hito de apertura es automático: ya está completado
    assert_eq!(state.get("Start Scoping Phase").unwrap().status, ActivityStatus::Completed);
    // y la primera actividad manual quedó habilitada
    assert!(state.get("Generate Recommendations").unwrap().can_start);
    assert!(!state.completed);
}

#[test]
fn dependencies_unmet_yields_typed_error() {
    let template = scoping_template();
    let ctx = PhaseContext::new(Uuid::new_v4(), Uuid::new_v4(), PHASE);
    let mut engine = PhaseEngine::in_memory();
    engine.initialize_phase(&ctx, &template);

    let err = engine.start_activity(&ctx, &template, "Review Decisions", &tester()).unwrap_err();
    match err {
        WorkflowError::DependenciesUnmet { activity, unmet } => {
            assert_eq!(activity, "Review Decisions");
            assert_eq!(unmet, vec!["Generate Recommendations".to_string()]);
        }
        other => panic!("expected DependenciesUnmet, got {other:?}"),
    }
}

#[test]
fn role_guard_rejects_wrong_role() {
    let template = scoping_template();
    let ctx = PhaseContext::new(Uuid::new_v4(), Uuid::new_v4(), PHASE);
    let mut engine = PhaseEngine::in_memory();
    engine.initialize_phase(&ctx, &template);

    let err = engine.start_activity(&ctx, &template, "Generate Recommendations", &report_owner())
                    .unwrap_err();
    assert!(matches!(err, WorkflowError::RoleNotPermitted { .. }));
}

#[test]
fn full_phase_run_emits_phase_fingerprint() {
    let template = scoping_template();
    let ctx = PhaseContext::new(Uuid::new_v4(), Uuid::new_v4(), PHASE);
    let mut engine = PhaseEngine::in_memory();
    engine.initialize_phase(&ctx, &template);

    let t = tester();
    let ro = report_owner();
    for name in ["Generate Recommendations", "Review Decisions"] {
        engine.start_activity(&ctx, &template, name, &t).unwrap();
        engine.complete_activity(&ctx, &template, name, &t).unwrap();
    }
    engine.start_activity(&ctx, &template, "Report Owner Approval", &ro).unwrap();
    engine.complete_activity(&ctx, &template, "Report Owner Approval", &ro).unwrap();

    // La aprobación habilitó el hito de cierre automático y la fase cerró
    let state = engine.state(&ctx, &template);
    assert!(state.completed);
    assert!(state.all_terminal());
    let fp = engine.phase_fingerprint(&ctx).expect("phase fingerprint present");
    assert_eq!(fp.len(), 64);

    // Toda operación posterior es rechazada
    let err = engine.start_activity(&ctx, &template, "Generate Recommendations", &t).unwrap_err();
    assert!(matches!(err, WorkflowError::PhaseCompleted));
}

#[test]
fn replay_reconstructs_identical_state() {
    let template = scoping_template();
    let ctx = PhaseContext::new(Uuid::new_v4(), Uuid::new_v4(), PHASE);
    let mut engine = PhaseEngine::in_memory();
    engine.initialize_phase(&ctx, &template);

    let t = tester();
    engine.start_activity(&ctx, &template, "Generate Recommendations", &t).unwrap();

    // Dos replays sobre los mismos eventos deben coincidir campo a campo
    let first = engine.state(&ctx, &template);
    let second = engine.state(&ctx, &template);
    for (name, inst) in &first.activities {
        assert_eq!(inst, second.get(name).unwrap());
    }
    assert_eq!(engine.event_variants(&ctx), vec!["I", "S", "F", "S"]);
}

#[test]
fn evidence_requires_in_progress_and_deduplicates() {
    let template = scoping_template();
    let ctx = PhaseContext::new(Uuid::new_v4(), Uuid::new_v4(), PHASE);
    let mut engine = PhaseEngine::in_memory();
    engine.initialize_phase(&ctx, &template);
    let t = tester();

    let payload = json!({"document": "scoping_memo.pdf", "pages": 12});
    let ev = Evidence::new(EvidenceKind::Document, payload.clone(), t.user_id);

    // Sobre una actividad NotStarted se rechaza
    let err = engine.attach_evidence(&ctx, &template, "Generate Recommendations", ev.clone())
                    .unwrap_err();
    assert!(matches!(err, WorkflowError::InvalidTransition { .. }));

    engine.start_activity(&ctx, &template, "Generate Recommendations", &t).unwrap();
    let h1 = engine.attach_evidence(&ctx, &template, "Generate Recommendations", ev).unwrap();
    // Mismo payload canónico -> mismo hash, una sola entrada
    let h2 = engine.attach_evidence(&ctx,
                                    &template,
                                    "Generate Recommendations",
                                    Evidence::new(EvidenceKind::Document, payload, t.user_id))
                   .unwrap();
    assert_eq!(h1, h2);
    assert!(engine.evidence(&h1).is_some());
}

#[test]
fn revision_request_reopens_completed_activity() {
    let template = scoping_template();
    let ctx = PhaseContext::new(Uuid::new_v4(), Uuid::new_v4(), PHASE);
    let mut engine = PhaseEngine::in_memory();
    engine.initialize_phase(&ctx, &template);
    let t = tester();

    engine.start_activity(&ctx, &template, "Generate Recommendations", &t).unwrap();
    engine.complete_activity(&ctx, &template, "Generate Recommendations", &t).unwrap();

    let request_id = Uuid::new_v4();
    engine.request_revision(&ctx, &template, "Generate Recommendations", request_id, t.user_id)
          .unwrap();

    let state = engine.state(&ctx, &template);
    let inst = state.get("Generate Recommendations").unwrap();
    assert_eq!(inst.status, ActivityStatus::RevisionRequested);
    // El rework vuelve a arrancar la misma actividad
    assert!(inst.can_start);
    engine.start_activity(&ctx, &template, "Generate Recommendations", &t).unwrap();

    // La revisión quedó auditada en el event log
    let events = engine.events_for(&ctx);
    assert!(events.iter().any(|e| matches!(&e.kind,
        PhaseEventKind::RevisionRequested { request_id: rid, .. } if *rid == request_id)));
}

#[test]
fn block_and_unblock_roundtrip() {
    let template = scoping_template();
    let ctx = PhaseContext::new(Uuid::new_v4(), Uuid::new_v4(), PHASE);
    let mut engine = PhaseEngine::in_memory();
    engine.initialize_phase(&ctx, &template);

    engine.block_activity(&ctx, &template, "Generate Recommendations", "awaiting source files")
          .unwrap();
    let state = engine.state(&ctx, &template);
    let inst = state.get("Generate Recommendations").unwrap();
    assert_eq!(inst.status, ActivityStatus::Blocked);
    assert_eq!(inst.blocked_reason.as_deref(), Some("awaiting source files"));

    engine.unblock_activity(&ctx, &template, "Generate Recommendations").unwrap();
    let state = engine.state(&ctx, &template);
    assert_eq!(state.get("Generate Recommendations").unwrap().status, ActivityStatus::NotStarted);
}

#[test]
fn evidence_auto_completes_activity_subscribed_to_the_event() {
    let activities = vec![
        ActivityTemplate::new(PHASE, "Start Scoping Phase", ActivityType::Start, 1).automatic(),
        ActivityTemplate::new(PHASE, "Collect Source Files", ActivityType::Task, 2)
            .with_role(UserRole::Tester)
            .auto_complete_on(dte_core::constants::EVIDENCE_ATTACHED_EVENT),
        ActivityTemplate::new(PHASE, "Complete Scoping Phase", ActivityType::Complete, 3).automatic(),
    ];
    let deps = vec![
        ActivityDependency::new(PHASE, "Collect Source Files", "Start Scoping Phase", DependencyType::Completion),
        ActivityDependency::new(PHASE, "Complete Scoping Phase", "Collect Source Files", DependencyType::Completion),
    ];
    let template = PhaseTemplate::new(PHASE, activities, deps).expect("valid template");
    let ctx = PhaseContext::new(Uuid::new_v4(), Uuid::new_v4(), PHASE);
    let mut engine = PhaseEngine::in_memory();
    engine.initialize_phase(&ctx, &template);

    let t = tester();
    engine.start_activity(&ctx, &template, "Collect Source Files", &t).unwrap();
    engine.attach_evidence(&ctx,
                           &template,
                           "Collect Source Files",
                           Evidence::new(EvidenceKind::Document, json!({ "file": "sources.csv" }), t.user_id))
          .unwrap();

    // La evidencia completó la actividad suscripta y la cascada cerró la fase
    let state = engine.state(&ctx, &template);
    assert_eq!(state.get("Collect Source Files").unwrap().status, ActivityStatus::Completed);
    assert!(state.completed);
    let events = engine.events_for(&ctx);
    assert!(events.iter().any(|e| matches!(&e.kind,
        PhaseEventKind::ActivityCompleted { activity, actor, .. }
            if activity == "Collect Source Files" && *actor == t.user_id)));
}

#[test]
fn external_event_without_subscribers_changes_nothing() {
    let template = scoping_template();
    let ctx = PhaseContext::new(Uuid::new_v4(), Uuid::new_v4(), PHASE);
    let mut engine = PhaseEngine::in_memory();
    engine.initialize_phase(&ctx, &template);

    let t = tester();
    engine.start_activity(&ctx, &template, "Generate Recommendations", &t).unwrap();
    let emitted = engine.notify_external_event(&ctx,
                                               &template,
                                               dte_core::constants::EVIDENCE_ATTACHED_EVENT,
                                               t.user_id);
    assert!(emitted.is_empty());
    let state = engine.state(&ctx, &template);
    assert_eq!(state.get("Generate Recommendations").unwrap().status, ActivityStatus::InProgress);
}
