use chrono::NaiveDate;
use dte_core::{AssignmentRegistry, AssignmentStatus, DataOwnerAssignment, RevisionPriority, RevisionRequest,
               RevisionStatus, RevisionTarget, WorkflowError};
use uuid::Uuid;

fn assignment(attribute_id: Uuid, lob_id: Uuid) -> DataOwnerAssignment {
    DataOwnerAssignment::new(Uuid::new_v4(),
                             Uuid::new_v4(),
                             attribute_id,
                             lob_id,
                             Uuid::new_v4(),
                             Uuid::new_v4())
}

#[test]
fn duplicate_active_assignment_rejected() {
    let mut registry = AssignmentRegistry::new();
    let attribute_id = Uuid::new_v4();
    let lob_id = Uuid::new_v4();

    registry.assign(assignment(attribute_id, lob_id)).unwrap();
    let err = registry.assign(assignment(attribute_id, lob_id)).unwrap_err();
    assert!(matches!(err, WorkflowError::DuplicateAssignment { .. }));

    // Mismo atributo en otro LOB sí es válido
    registry.assign(assignment(attribute_id, Uuid::new_v4())).unwrap();
    assert_eq!(registry.len(), 2);
}

#[test]
fn declined_assignment_can_be_replaced() {
    let mut registry = AssignmentRegistry::new();
    let attribute_id = Uuid::new_v4();
    let lob_id = Uuid::new_v4();

    registry.assign(assignment(attribute_id, lob_id)).unwrap();
    registry.get_mut(attribute_id, lob_id).unwrap().decline().unwrap();

    // La declinada no bloquea una reasignación
    let replacement = assignment(attribute_id, lob_id);
    let new_owner = replacement.data_owner_id;
    registry.assign(replacement).unwrap();
    let current = registry.get(attribute_id, lob_id).unwrap();
    assert_eq!(current.data_owner_id, new_owner);
    assert_eq!(current.status, AssignmentStatus::Pending);
}

#[test]
fn assignment_transitions_are_guarded() {
    let mut a = assignment(Uuid::new_v4(), Uuid::new_v4());

    // Completar sin reconocer primero es inválido
    let err = a.complete().unwrap_err();
    assert!(matches!(err, WorkflowError::InvalidAssignmentTransition { .. }));

    a.acknowledge().unwrap();
    a.complete().unwrap();
    assert_eq!(a.status, AssignmentStatus::Completed);

    // Una completada ya no se declina
    let err = a.decline().unwrap_err();
    assert!(matches!(err, WorkflowError::InvalidAssignmentTransition { .. }));
}

#[test]
fn pending_iterator_feeds_escalation() {
    let mut registry = AssignmentRegistry::new();
    let a1 = assignment(Uuid::new_v4(), Uuid::new_v4());
    let a2 = assignment(Uuid::new_v4(), Uuid::new_v4());
    let (attr2, lob2) = (a2.attribute_id, a2.lob_id);
    registry.assign(a1).unwrap();
    registry.assign(a2).unwrap();

    assert_eq!(registry.pending().count(), 2);
    registry.get_mut(attr2, lob2).unwrap().acknowledge().unwrap();
    assert_eq!(registry.pending().count(), 1);
}

#[test]
fn revision_request_full_cycle() {
    let mut req = RevisionRequest::new(RevisionTarget::Version(Uuid::new_v4()),
                                       RevisionPriority::High,
                                       Uuid::new_v4()).with_notes("rationale missing for two attributes");

    req.acknowledge().unwrap();
    req.begin().unwrap();
    req.resubmit().unwrap();
    req.approve().unwrap();
    assert_eq!(req.status, RevisionStatus::Approved);
    assert!(req.status.is_terminal());
}

#[test]
fn revision_transitions_cannot_skip_steps() {
    let mut req = RevisionRequest::new(RevisionTarget::Activity("Review Decisions".to_string()),
                                       RevisionPriority::Medium,
                                       Uuid::new_v4());

    // Pending no puede aprobar directo ni resubmitir
    assert!(matches!(req.approve().unwrap_err(), WorkflowError::InvalidRevisionTransition { .. }));
    assert!(matches!(req.resubmit().unwrap_err(), WorkflowError::InvalidRevisionTransition { .. }));

    req.acknowledge().unwrap();
    req.begin().unwrap();
    req.resubmit().unwrap();
    req.reject().unwrap();
    assert_eq!(req.status, RevisionStatus::Rejected);
}

#[test]
fn overdue_depends_on_terminal_state() {
    let due = NaiveDate::from_ymd_opt(2026, 3, 1).unwrap();
    let before = NaiveDate::from_ymd_opt(2026, 2, 20).unwrap();
    let after = NaiveDate::from_ymd_opt(2026, 3, 15).unwrap();

    let mut req = RevisionRequest::new(RevisionTarget::Evidence("abc123".to_string()),
                                       RevisionPriority::Critical,
                                       Uuid::new_v4()).with_due_date(due);

    assert!(!req.is_overdue(before));
    assert!(req.is_overdue(after));

    // Un pedido cerrado nunca está vencido
    req.acknowledge().unwrap();
    req.begin().unwrap();
    req.resubmit().unwrap();
    req.approve().unwrap();
    assert!(!req.is_overdue(after));
}

#[test]
fn priority_ordering_for_queues() {
    let mut priorities = vec![RevisionPriority::High,
                              RevisionPriority::Low,
                              RevisionPriority::Critical,
                              RevisionPriority::Medium];
    priorities.sort();
    assert_eq!(priorities,
               vec![RevisionPriority::Low,
                    RevisionPriority::Medium,
                    RevisionPriority::High,
                    RevisionPriority::Critical]);
}
