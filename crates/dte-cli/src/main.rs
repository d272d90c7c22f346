use dte_core::{Actor, PhaseContext, PhaseEngine};
use dte_domain::{UserRole, WorkflowPhase};
use uuid::Uuid;

fn parse_phase(s: &str) -> Option<WorkflowPhase> {
    WorkflowPhase::parse(s).ok()
}

fn build_context(context_id: Uuid, phase: WorkflowPhase) -> PhaseContext {
    // La CLI opera sobre contextos existentes: cycle/report sólo viajan en los
    // metadatos de instancia, la correlación real es el context_id.
    PhaseContext { context_id,
                   cycle_id: Uuid::nil(),
                   report_id: Uuid::nil(),
                   phase }
}

fn pg_engine() -> PhaseEngine<dte_persistence::PgEventStore<dte_persistence::PoolProvider>,
                             dte_persistence::PgPhaseRepository> {
    let pool = match dte_persistence::build_dev_pool_from_env() {
        Ok(p) => p,
        Err(e) => {
            eprintln!("[dte] pool error: {e}");
            std::process::exit(5);
        }
    };
    let provider = dte_persistence::PoolProvider { pool };
    let event_store = dte_persistence::PgEventStore::new(provider);
    let repo = dte_persistence::PgPhaseRepository::new();
    PhaseEngine::new_with_stores(event_store, repo)
}

fn require_database_url(cmd: &str) {
    if std::env::var("DATABASE_URL").is_err() {
        eprintln!("[dte {cmd}] requiere DATABASE_URL para operar contra backend persistente");
        std::process::exit(4);
    }
}

fn main() {
    // Cargar .env si existe para obtener DATABASE_URL
    let _ = dotenvy::dotenv();
    // CLI mínima:
    //   dte init --phase <NAME> [--context <UUID>]
    //   dte status --context <UUID> --phase <NAME>
    //   dte start|complete|skip --context <UUID> --phase <NAME> --activity <NAME> --actor <UUID> --role <ROLE>
    //   dte approve-version --context <UUID> --phase <NAME> --version <UUID> --number <N>
    let args: Vec<String> = std::env::args().collect();
    let Some(cmd) = args.get(1).map(|s| s.as_str()) else {
        println!("dte-cli: use 'init', 'status', 'start', 'complete', 'skip' or 'approve-version' subcommands");
        return;
    };

    let mut context: Option<Uuid> = None;
    let mut phase: Option<WorkflowPhase> = None;
    let mut activity: Option<String> = None;
    let mut actor: Option<Uuid> = None;
    let mut role: Option<UserRole> = None;
    let mut version: Option<Uuid> = None;
    let mut number: Option<u32> = None;
    let mut reason: Option<String> = None;
    let mut i = 2;
    while i < args.len() {
        match args[i].as_str() {
            "--context" => {
                i += 1;
                if i < args.len() {
                    context = Uuid::parse_str(&args[i]).ok();
                }
            }
            "--phase" => {
                i += 1;
                if i < args.len() {
                    phase = parse_phase(&args[i]);
                }
            }
            "--activity" => {
                i += 1;
                if i < args.len() {
                    activity = Some(args[i].clone());
                }
            }
            "--actor" => {
                i += 1;
                if i < args.len() {
                    actor = Uuid::parse_str(&args[i]).ok();
                }
            }
            "--role" => {
                i += 1;
                if i < args.len() {
                    role = UserRole::parse(&args[i]).ok();
                }
            }
            "--version" => {
                i += 1;
                if i < args.len() {
                    version = Uuid::parse_str(&args[i]).ok();
                }
            }
            "--number" => {
                i += 1;
                if i < args.len() {
                    number = args[i].parse::<u32>().ok();
                }
            }
            "--reason" => {
                i += 1;
                if i < args.len() {
                    reason = Some(args[i].clone());
                }
            }
            _ => {}
        }
        i += 1;
    }

    match cmd {
        "init" => {
            let Some(phase) = phase else {
                eprintln!("Uso: dte init --phase <NAME> [--context <UUID>]");
                std::process::exit(2);
            };
            require_database_url("init");
            let mut engine = pg_engine();
            // Sin --context se genera uno nuevo; el UUID impreso es la
            // referencia para el resto de los subcomandos.
            let context_id = context.unwrap_or_else(Uuid::new_v4);
            let ctx = build_context(context_id, phase);
            let template = dte_adapters::standard_template(phase);
            let state = engine.initialize_phase(&ctx, &template);
            println!("init: context={} phase={} activities={}",
                     context_id,
                     phase,
                     state.activities.len());
            std::process::exit(0);
        }
        "status" => {
            let (Some(context_id), Some(phase)) = (context, phase) else {
                eprintln!("Uso: dte status --context <UUID> --phase <NAME>");
                std::process::exit(2);
            };
            require_database_url("status");
            let engine = pg_engine();
            let ctx = build_context(context_id, phase);
            let template = dte_adapters::standard_template(phase);
            let events = engine.events_for(&ctx);
            if events.is_empty() {
                eprintln!("[dte status] contexto no encontrado: {}", context_id);
                std::process::exit(4);
            }
            let state = engine.state(&ctx, &template);
            println!("phase={} completed={} events={}", phase, state.completed, events.len());
            for inst in state.activities.values() {
                println!("  {:<40} {:?} can_start={} can_complete={}",
                         inst.name, inst.status, inst.can_start, inst.can_complete);
            }
            if let Some(fp) = engine.phase_fingerprint(&ctx) {
                println!("phase_fingerprint={fp}");
            }
            std::process::exit(0);
        }
        "start" | "complete" | "skip" => {
            let (Some(context_id), Some(phase), Some(activity), Some(actor_id), Some(role)) =
                (context, phase, activity, actor, role)
            else {
                eprintln!("Uso: dte {cmd} --context <UUID> --phase <NAME> --activity <NAME> --actor <UUID> --role <ROLE> [--reason <TXT>]");
                std::process::exit(2);
            };
            require_database_url(cmd);
            let mut engine = pg_engine();
            let ctx = build_context(context_id, phase);
            let template = dte_adapters::standard_template(phase);
            if engine.events_for(&ctx).is_empty() {
                eprintln!("[dte {cmd}] contexto no encontrado: {}", context_id);
                std::process::exit(4);
            }
            let actor = Actor::new(actor_id, role);
            let result = match cmd {
                "start" => engine.start_activity(&ctx, &template, &activity, &actor),
                "complete" => engine.complete_activity(&ctx, &template, &activity, &actor),
                _ => engine.skip_activity(&ctx, &template, &activity, &actor, reason),
            };
            match result {
                Ok(ev) => {
                    println!("{cmd}: context={} activity={} seq={}", context_id, activity, ev.seq);
                    std::process::exit(0);
                }
                Err(e) => {
                    eprintln!("rechazado: {e}");
                    std::process::exit(4);
                }
            }
        }
        "approve-version" => {
            let (Some(context_id), Some(phase), Some(version_id), Some(version_number)) =
                (context, phase, version, number)
            else {
                eprintln!("Uso: dte approve-version --context <UUID> --phase <NAME> --version <UUID> --number <N>");
                std::process::exit(2);
            };
            require_database_url("approve-version");
            let mut engine = pg_engine();
            let ctx = build_context(context_id, phase);
            if engine.events_for(&ctx).is_empty() {
                eprintln!("[dte approve-version] contexto no encontrado: {}", context_id);
                std::process::exit(4);
            }
            let ev = engine.record_version_transition(&ctx, version_id, version_number, "approved");
            println!("approve-version: context={} version={} seq={}", context_id, version_id, ev.seq);
            std::process::exit(0);
        }
        other => {
            eprintln!("subcomando desconocido: {other}");
            std::process::exit(2);
        }
    }
}
