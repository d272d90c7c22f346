//! Smoke test del workspace completo: escenario de dominio + catálogo
//! estándar + motor en memoria, atravesando dos fases consecutivas.
use chrono::NaiveDate;
use dte_adapters::{standard_template, Scenario};
use dte_core::{Actor, PhaseEngine};
use dte_domain::{UserRole, WorkflowPhase};
use uuid::Uuid;

#[test]
fn scenario_runs_two_phases_back_to_back() {
    let tester = Actor::new(Uuid::new_v4(), UserRole::Tester);
    let owner = Actor::new(Uuid::new_v4(), UserRole::ReportOwner);
    let exec = Actor::new(Uuid::new_v4(), UserRole::TestExecutive);

    let mut scenario = Scenario::new();
    let lob = scenario.add_lob("Consumer Lending").unwrap();
    let report = scenario.add_report("FR Y-14Q", "FR Y-14Q", lob, owner.user_id)
                         .unwrap();
    let cycle = scenario.add_cycle("2026 Q2",
                                   NaiveDate::from_ymd_opt(2026, 4, 1).unwrap(),
                                   NaiveDate::from_ymd_opt(2026, 6, 30).unwrap())
                        .unwrap();
    scenario.enroll_report(cycle, report, tester.user_id).unwrap();

    // Planning: tareas del tester con aprobación del test executive.
    let planning_ctx = scenario.phase_context(cycle, report, WorkflowPhase::Planning)
                               .unwrap();
    let planning = standard_template(WorkflowPhase::Planning);
    let mut engine = PhaseEngine::in_memory();
    engine.initialize_phase(&planning_ctx, &planning);
    for name in planning.topological_order().to_vec() {
        let tpl = planning.get(&name).unwrap();
        if !tpl.is_manual {
            continue;
        }
        let actor = match tpl.required_role {
            Some(UserRole::TestExecutive) => &exec,
            Some(UserRole::ReportOwner) => &owner,
            _ => &tester,
        };
        engine.start_activity(&planning_ctx, &planning, &name, actor).unwrap();
        engine.complete_activity(&planning_ctx, &planning, &name, actor).unwrap();
    }
    assert!(engine.state(&planning_ctx, &planning).completed);

    // Scoping sobre el mismo reporte, contexto independiente.
    let scoping_ctx = scenario.phase_context(cycle, report, WorkflowPhase::Scoping)
                              .unwrap();
    let scoping = standard_template(WorkflowPhase::Scoping);
    engine.initialize_phase(&scoping_ctx, &scoping);
    for (name, actor) in [("Generate Recommendations", &tester),
                          ("Review Decisions", &tester),
                          ("Report Owner Approval", &owner)]
    {
        engine.start_activity(&scoping_ctx, &scoping, name, actor).unwrap();
        engine.complete_activity(&scoping_ctx, &scoping, name, actor).unwrap();
    }
    assert!(engine.state(&scoping_ctx, &scoping).completed);

    // Los fingerprints de fase son independientes por contexto y no vacíos.
    let fp_planning = engine.phase_fingerprint(&planning_ctx).unwrap();
    let fp_scoping = engine.phase_fingerprint(&scoping_ctx).unwrap();
    assert_eq!(fp_planning.len(), 64);
    assert_eq!(fp_scoping.len(), 64);
    assert_ne!(fp_planning, fp_scoping);
}
