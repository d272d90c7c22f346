use dte_core::{EventStore, PhaseEventKind};
use dte_persistence::config::DbConfig;
use dte_persistence::pg::{build_pool, PgEventStore, PoolProvider};
use uuid::Uuid;

#[test]
fn roundtrip_all_variants_enum_json_full() {
    if std::env::var("DATABASE_URL").is_err() {
        eprintln!("skip (no DATABASE_URL)");
        return;
    }
    let cfg = DbConfig::from_env();
    // Fuerza 1x1 para aislar posibles issues en destrucción de múltiples conexiones
    let pool = build_pool(&cfg.url, 1, 1).expect("pool");
    let provider = PoolProvider { pool: pool.clone() };
    let mut store = PgEventStore::new(provider);
    let context_id = Uuid::new_v4();
    let actor = Uuid::new_v4();

    // Construir cada variante con datos sintéticos mínimos.
    let variants: Vec<PhaseEventKind> = vec![
        PhaseEventKind::PhaseInitialized { template_hash: "tplhash".into(), activity_count: 5 },
        PhaseEventKind::ActivityStarted { activity: "Generate Samples".into(), actor },
        PhaseEventKind::ActivityCompleted { activity: "Generate Samples".into(), actor, fingerprint: "fp0".into() },
        PhaseEventKind::ActivitySkipped { activity: "Optional Review".into(), actor, reason: Some("n/a".into()) },
        PhaseEventKind::ActivityBlocked { activity: "Upload Data".into(), reason: "source offline".into() },
        PhaseEventKind::ActivityUnblocked { activity: "Upload Data".into() },
        PhaseEventKind::RevisionRequested { activity: "Generate Samples".into(),
                                            request_id: Uuid::new_v4(),
                                            requested_by: actor },
        PhaseEventKind::EvidenceAttached { activity: "Upload Data".into(),
                                           evidence_hash: "0123456789abcdef0123456789abcdef0123456789abcdef0123456789abcdef".into(),
                                           submitted_by: actor },
        PhaseEventKind::VersionTransition { version_id: Uuid::new_v4(), version_number: 1, status: "approved".into() },
        PhaseEventKind::PhaseCompleted { phase_fingerprint: "phasefp".into() },
    ];

    for k in variants.clone() {
        store.append_kind(context_id, k);
    }
    let stored = store.list(context_id);
    assert_eq!(stored.len(), variants.len());
    for (expected, got) in variants.iter().zip(stored.iter()) {
        let je = serde_json::to_value(expected).unwrap();
        let jg = serde_json::to_value(&got.kind).unwrap();
        assert_eq!(je, jg, "JSON enum debe ser idéntico tras roundtrip");
    }
    // seq estrictamente creciente
    for pair in stored.windows(2) {
        assert!(pair[0].seq < pair[1].seq);
    }
    // Prevent native destructor races in test teardown by leaking store (tests
    // only)
    std::mem::forget(store);
}
