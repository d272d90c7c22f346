//! Esquema Diesel (mantenido a mano; reemplazable con `diesel print-schema`).

diesel::table! {
    workflow_event_log (seq) {
        seq -> BigInt,
        context_id -> Uuid,
        ts -> Timestamptz,
        event_type -> Text,
        payload -> Jsonb,
    }
}

diesel::table! {
    evidence_records (evidence_hash) {
        evidence_hash -> Text,
        kind -> Text,
        payload -> Jsonb,
        metadata -> Nullable<Jsonb>,
        test_case_id -> Nullable<Uuid>,
        submitted_by -> Uuid,
        recorded_in_seq -> BigInt,
    }
}

diesel::table! {
    rejected_transitions (id) {
        id -> BigInt,
        context_id -> Uuid,
        activity -> Text,
        error_class -> Text,
        details -> Nullable<Jsonb>,
        ts -> Timestamptz,
    }
}

diesel::table! {
    phase_versions (version_id) {
        version_id -> Uuid,
        cycle_id -> Uuid,
        report_id -> Uuid,
        phase -> Text,
        version_number -> Integer,
        status -> Text,
        parent_version_id -> Nullable<Uuid>,
        created_by -> Uuid,
        created_at -> Timestamptz,
        rejection_reason -> Nullable<Text>,
        total_decisions -> Integer,
        included -> Integer,
        excluded -> Integer,
        deferred -> Integer,
        content_fingerprint -> Text,
    }
}

diesel::allow_tables_to_appear_in_same_query!(
    workflow_event_log,
    evidence_records,
    rejected_transitions,
    phase_versions,
);
