use dte_core::EventStore;
use uuid::Uuid;

#[test]
fn migration_allows_all_event_types() {
    // Skip when DATABASE_URL not set
    if std::env::var("DATABASE_URL").is_err() {
        eprintln!("DATABASE_URL not set - skipping migration smoke test");
        return;
    }

    use dte_core::event::PhaseEventKind;
    use dte_persistence::pg::{build_dev_pool_from_env, PgEventStore, PoolProvider};

    let pool = build_dev_pool_from_env().expect("build pool");
    let provider = PoolProvider { pool };
    let mut store = PgEventStore::new(provider);

    let context_id = Uuid::new_v4();

    // Una variante cualquiera alcanza para probar el CHECK de event_type.
    let kind = PhaseEventKind::VersionTransition { version_id: Uuid::new_v4(),
                                                   version_number: 1,
                                                   status: "pending_approval".to_string() };

    // append_kind entra en pánico si la DB rechaza el evento (CHECK).
    let ev = store.append_kind(context_id, kind);
    match ev.kind {
        PhaseEventKind::VersionTransition { .. } => { /* success */ }
        _ => panic!("Appended event was not VersionTransition"),
    }

    drop(store);
    std::thread::sleep(std::time::Duration::from_millis(100));
}
