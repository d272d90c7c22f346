//! Binario de demostración/validación de SynapseDTE.
//!
//! Ejecuta varios escenarios sobre el motor de fases en memoria y, de forma
//! opcional (variable `DTE_RUN_PG_DEMO=1`), contra Postgres. Cada bloque
//! valida con asserts una porción del sistema: ciclo completo de una fase,
//! catálogo estándar, ciclo de vida de versiones y pedidos de revisión.
use chrono::NaiveDate;
use dte_adapters::{standard_catalog, standard_template, Scenario};
use dte_core::{Actor, ActivityStatus, DecisionKind, Evidence, EvidenceKind, PhaseEngine, PhaseEventKind,
               RevisionPriority, RevisionRequest, RevisionStatus, RevisionTarget, VersionDecision, VersionLedger,
               VersionStatus};
use dte_domain::{UserRole, WorkflowPhase};
use serde_json::json;
use uuid::Uuid;

fn main() {
    // Cargar variables de entorno desde .env si existe (antes de leer DATABASE_URL)
    let _ = dotenvy::dotenv();

    // Montar un escenario mínimo: una LOB, un reporte regulatorio y un ciclo
    // de prueba con el reporte inscripto.
    let tester = Actor::new(Uuid::new_v4(), UserRole::Tester);
    let owner = Actor::new(Uuid::new_v4(), UserRole::ReportOwner);

    let mut scenario = Scenario::new();
    let lob = scenario.add_lob("Retail Banking").expect("lob ok");
    let report = scenario.add_report("FR Y-14M", "FR Y-14M", lob, owner.user_id)
                         .expect("report ok");
    let cycle = scenario.add_cycle("2026 Q1",
                                   NaiveDate::from_ymd_opt(2026, 1, 1).expect("fecha"),
                                   NaiveDate::from_ymd_opt(2026, 3, 31).expect("fecha"))
                        .expect("cycle ok");
    scenario.enroll_report(cycle, report, tester.user_id).expect("enroll ok");
    let ctx = scenario.phase_context(cycle, report, WorkflowPhase::Scoping)
                      .expect("contexto ok");

    // Correr la fase de scoping de punta a punta sobre el motor en memoria.
    let template = standard_template(WorkflowPhase::Scoping);
    let mut engine = PhaseEngine::in_memory();
    engine.initialize_phase(&ctx, &template);
    println!("Secuencia tras inicializar: {:?}", engine.event_variants(&ctx));

    engine.start_activity(&ctx, &template, "Generate Recommendations", &tester)
          .expect("start ok");
    engine.complete_activity(&ctx, &template, "Generate Recommendations", &tester)
          .expect("complete ok");
    engine.start_activity(&ctx, &template, "Review Decisions", &tester)
          .expect("start ok");
    // Evidencia ligada a una actividad en curso; se deduplica por hash.
    let hash = engine.attach_evidence(&ctx,
                                      &template,
                                      "Review Decisions",
                                      Evidence::new(EvidenceKind::Document,
                                                    json!({ "file": "scoping_notes.xlsx", "rows": 120 }),
                                                    tester.user_id))
                     .expect("evidence ok");
    println!("Evidencia registrada: {hash}");
    engine.complete_activity(&ctx, &template, "Review Decisions", &tester)
          .expect("complete ok");
    engine.start_activity(&ctx, &template, "Report Owner Approval", &owner)
          .expect("start ok");
    engine.complete_activity(&ctx, &template, "Report Owner Approval", &owner)
          .expect("complete ok");

    let state = engine.state(&ctx, &template);
    assert!(state.completed, "La fase debe quedar completa tras la aprobación");
    let terminal = state.activities
                        .values()
                        .filter(|a| a.status.is_terminal())
                        .count();
    assert_eq!(terminal, 5, "Deben terminar 5 actividades");
    let has_close = engine.events_for(&ctx)
                          .iter()
                          .any(|e| matches!(e.kind, PhaseEventKind::PhaseCompleted { .. }));
    assert!(has_close, "Debe existir PhaseCompleted al final de la fase");
    let fp = engine.phase_fingerprint(&ctx).unwrap_or_default();
    println!("Fingerprint de la fase: {fp}");
    println!("Secuencia de eventos: {:?}", engine.event_variants(&ctx));
    println!("!Validación de fase: OK (scoping ejecutado y completado determinísticamente)");

    // Segunda corrida idéntica para demostrar determinismo del fingerprint.
    {
        let ctx_b = scenario.phase_context(cycle, report, WorkflowPhase::Scoping)
                            .expect("contexto ok");
        let mut engine_b = PhaseEngine::in_memory();
        engine_b.initialize_phase(&ctx_b, &template);
        for (name, actor) in [("Generate Recommendations", &tester),
                              ("Review Decisions", &tester),
                              ("Report Owner Approval", &owner)]
        {
            engine_b.start_activity(&ctx_b, &template, name, actor).expect("start ok");
            engine_b.complete_activity(&ctx_b, &template, name, actor).expect("complete ok");
        }
        let fp_b = engine_b.phase_fingerprint(&ctx_b).unwrap_or_default();
        println!("Determinismo: fp == fp_b ? {}", fp == fp_b);
        assert_eq!(fp, fp_b, "El fingerprint debe ser reproducible entre corridas");
    }

    // Demo de persistencia en Postgres – opt-in para no requerir DATABASE_URL
    if std::env::var("DTE_RUN_PG_DEMO").ok().as_deref() == Some("1") {
        maybe_run_pg_demo();
    } else {
        eprintln!("[PG DEMO] Skipping (set DTE_RUN_PG_DEMO=1 to enable)");
    }

    println!("--- Iniciando validación de catálogo ---");
    run_catalog_validation();
    println!("--- Iniciando validación de versiones ---");
    if let Err(e) = run_version_validation() {
        eprintln!("[VERSIONES] Error: {e}");
    } else {
        println!("[VERSIONES] Validación OK");
    }
    println!("--- Iniciando validación de revisiones ---");
    run_revision_validation();
}

/// Instancia las nueve plantillas estándar y verifica sus invariantes
/// estructurales: orden topológico completo, hash estable y milestones
/// automáticos en los extremos.
fn run_catalog_validation() {
    let catalog = standard_catalog();
    assert_eq!(catalog.len(), 9, "Debe haber una plantilla por fase");
    for template in &catalog {
        let order = template.topological_order();
        assert_eq!(order.len(), template.len(), "El orden topológico debe cubrir todas las actividades");
        let first = template.get(&order[0]).expect("primera actividad");
        assert!(!first.is_manual, "La primera actividad debe ser un milestone automático");
        assert_eq!(template.template_hash().len(), 64);
        println!("[CATALOGO] {} actividades={} hash={}",
                 template.phase().as_str(),
                 template.len(),
                 &template.template_hash()[..12]);
    }
    // El hash depende del contenido: dos construcciones idénticas coinciden.
    let a = standard_template(WorkflowPhase::Planning);
    let b = standard_template(WorkflowPhase::Planning);
    assert_eq!(a.template_hash(), b.template_hash(), "El hash de plantilla debe ser estable");
}

/// Ciclo de vida de versiones: borrador → aprobación → revisión que
/// supersede a la aprobada previa. A lo sumo una versión aprobada por fase.
fn run_version_validation() -> Result<(), String> {
    let tester = Uuid::new_v4();
    let owner = Uuid::new_v4();
    let attribute = Uuid::new_v4();
    let mut ledger = VersionLedger::new(Uuid::new_v4(), Uuid::new_v4(), WorkflowPhase::Scoping);

    let v1 = ledger.create_draft(tester);
    ledger.get_mut(v1)
          .ok_or("v1 no encontrada")?
          .add_decision(VersionDecision::new(v1, attribute, DecisionKind::Include).with_rationale("CDE primario"))
          .map_err(|e| e.to_string())?;
    ledger.submit(v1, tester).map_err(|e| e.to_string())?;
    ledger.approve(v1, owner).map_err(|e| e.to_string())?;

    let v2 = ledger.revise(v1, tester).map_err(|e| e.to_string())?;
    ledger.submit(v2, tester).map_err(|e| e.to_string())?;
    ledger.approve(v2, owner).map_err(|e| e.to_string())?;

    let v1_status = ledger.get(v1).ok_or("v1 no encontrada")?.status;
    if v1_status != VersionStatus::Superseded {
        return Err(format!("v1 debía quedar superseded, está {v1_status:?}"));
    }
    let approved = ledger.current_approved().ok_or("debe haber una versión aprobada")?;
    if approved.version_id != v2 {
        return Err("la versión aprobada vigente debe ser v2".to_string());
    }
    println!("[VERSIONES] vigente=v{} fingerprint={}",
             approved.version_number,
             &approved.content_fingerprint()[..12]);
    Ok(())
}

/// Pedido de revisión sobre una actividad completada: el pedido recorre su
/// máquina de estados y la actividad vuelve a ser arrancable.
fn run_revision_validation() {
    let tester = Actor::new(Uuid::new_v4(), UserRole::Tester);
    let owner = Actor::new(Uuid::new_v4(), UserRole::ReportOwner);
    let ctx = dte_core::PhaseContext::new(Uuid::new_v4(), Uuid::new_v4(), WorkflowPhase::Scoping);
    let template = standard_template(WorkflowPhase::Scoping);

    let mut engine = PhaseEngine::in_memory();
    engine.initialize_phase(&ctx, &template);
    engine.start_activity(&ctx, &template, "Generate Recommendations", &tester)
          .expect("start ok");
    engine.complete_activity(&ctx, &template, "Generate Recommendations", &tester)
          .expect("complete ok");

    let mut request = RevisionRequest::new(RevisionTarget::Activity("Generate Recommendations".to_string()),
                                           RevisionPriority::High,
                                           owner.user_id).with_notes("Faltan atributos del anexo B");
    engine.request_revision(&ctx, &template, "Generate Recommendations", request.request_id, owner.user_id)
          .expect("revision ok");
    request.acknowledge().expect("ack ok");
    request.begin().expect("begin ok");

    let state = engine.state(&ctx, &template);
    let activity = state.get("Generate Recommendations").expect("actividad");
    assert_eq!(activity.status, ActivityStatus::RevisionRequested);
    assert!(activity.can_start, "Tras el pedido la actividad debe poder rearrancarse");

    engine.start_activity(&ctx, &template, "Generate Recommendations", &tester)
          .expect("restart ok");
    engine.complete_activity(&ctx, &template, "Generate Recommendations", &tester)
          .expect("recomplete ok");
    request.resubmit().expect("resubmit ok");
    request.approve().expect("approve ok");
    assert_eq!(request.status, RevisionStatus::Approved);
    println!("[REVISIONES] Rework completado y pedido aprobado");
}

/// Corre la fase de scoping contra Postgres usando el pool de desarrollo.
/// Requiere `DATABASE_URL`; las migraciones se aplican en el primer checkout.
fn maybe_run_pg_demo() {
    use dte_persistence::{build_dev_pool_from_env, PgEventStore, PgPhaseRepository, PoolProvider};

    let pool = match build_dev_pool_from_env() {
        Ok(p) => p,
        Err(e) => {
            eprintln!("[PG DEMO] No se pudo crear el pool: {e}");
            return;
        }
    };
    let tester = Actor::new(Uuid::new_v4(), UserRole::Tester);
    let owner = Actor::new(Uuid::new_v4(), UserRole::ReportOwner);
    let ctx = dte_core::PhaseContext::new(Uuid::new_v4(), Uuid::new_v4(), WorkflowPhase::Scoping);
    let template = standard_template(WorkflowPhase::Scoping);

    let store = PgEventStore::new(PoolProvider { pool });
    let mut engine = PhaseEngine::new_with_stores(store, PgPhaseRepository::new());
    println!("[PG DEMO] context_id={}", ctx.context_id);
    engine.initialize_phase(&ctx, &template);

    engine.start_activity(&ctx, &template, "Generate Recommendations", &tester)
          .expect("start ok");
    engine.complete_activity(&ctx, &template, "Generate Recommendations", &tester)
          .expect("complete ok");

    // Evidencia: el evento deja una fila stub; el payload completo se sube
    // con store_evidence referenciando el seq del evento.
    engine.start_activity(&ctx, &template, "Review Decisions", &tester)
          .expect("start ok");
    let hash = engine.attach_evidence(&ctx,
                                      &template,
                                      "Review Decisions",
                                      Evidence::new(EvidenceKind::Document,
                                                    json!({ "file": "scoping_notes.xlsx", "rows": 120 }),
                                                    tester.user_id))
                     .expect("evidence ok");
    let recorded_in_seq = engine.events_for(&ctx)
                                .iter()
                                .rev()
                                .find_map(|e| match &e.kind {
                                    PhaseEventKind::EvidenceAttached { evidence_hash, .. }
                                        if *evidence_hash == hash => Some(e.seq as i64),
                                    _ => None,
                                })
                                .expect("evento de evidencia");
    let evidence = engine.evidence(&hash).cloned().expect("evidencia en memoria");
    engine.event_store
          .store_evidence(&evidence, recorded_in_seq)
          .expect("payload de evidencia");
    engine.complete_activity(&ctx, &template, "Review Decisions", &tester)
          .expect("complete ok");

    engine.start_activity(&ctx, &template, "Report Owner Approval", &owner)
          .expect("start ok");
    engine.complete_activity(&ctx, &template, "Report Owner Approval", &owner)
          .expect("complete ok");
    let fp = engine.phase_fingerprint(&ctx).unwrap_or_default();
    println!("[PG DEMO] fase persistida, fingerprint={fp}");
    println!("[PG DEMO] eventos: {:?}", engine.event_variants(&ctx));
}
