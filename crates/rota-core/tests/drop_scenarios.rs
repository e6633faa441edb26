//! End-to-end drop scenarios against an in-memory gateway.
//!
//! Each scenario checks both halves of a drop: the single mutation the
//! backend receives, and what the board shows before the call settles.

use std::cell::RefCell;

use rota_core::config::BoardConfig;
use rota_core::gateway::NewAssignment;
use rota_core::model::{
    Assignment, AssignmentId, Attendance, DayId, DropTarget, FormId, Hall, HallId, Position,
    PositionId, RegistrationForm, Slot, VolunteerId, YearId,
};
use rota_core::{
    DayBoard, ErrorReporter, GatewayError, Location, Mutation, MutationGateway, PendingOperations,
    YearCatalog, compute_effective_view,
};

// ---------------------------------------------------------------------------
// Test doubles
// ---------------------------------------------------------------------------

#[derive(Default)]
struct RecordingGateway {
    sent: RefCell<Vec<Mutation>>,
    fail_with: Option<GatewayError>,
}

impl RecordingGateway {
    fn failing(message: &str) -> Self {
        Self {
            sent: RefCell::default(),
            fail_with: Some(GatewayError::new(message).with_status(422)),
        }
    }

    fn sent(&self) -> Vec<Mutation> {
        self.sent.borrow().clone()
    }
}

impl MutationGateway for RecordingGateway {
    fn send(&self, mutation: &Mutation) -> Result<(), GatewayError> {
        self.sent.borrow_mut().push(mutation.clone());
        self.fail_with.clone().map_or(Ok(()), Err)
    }
}

#[derive(Default)]
struct RecordingReporter {
    reports: RefCell<Vec<(String, String)>>,
}

impl ErrorReporter for RecordingReporter {
    fn report(&self, operation: &str, error: &GatewayError) {
        self.reports
            .borrow_mut()
            .push((operation.to_string(), error.message.clone()));
    }
}

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

const DAY: DayId = DayId(1);

fn position(id: u64, has_halls: bool) -> Position {
    Position {
        id: PositionId(id),
        name: format!("Position {id}"),
        has_halls,
    }
}

fn hall(id: u64) -> Hall {
    Hall {
        id: HallId(id),
        year_id: YearId(2025),
        name: format!("Hall {id}"),
        description: None,
    }
}

fn form(form_id: u64, volunteer_id: u64) -> RegistrationForm {
    RegistrationForm::new(
        FormId(form_id),
        VolunteerId(volunteer_id),
        format!("First{volunteer_id}"),
        format!("Last{volunteer_id}"),
    )
}

fn record(id: u64, form_id: u64, position_id: u64, hall_id: Option<u64>) -> Assignment {
    Assignment {
        id: AssignmentId(id),
        day_id: DAY,
        form_id: FormId(form_id),
        position_id: Some(PositionId(position_id)),
        hall_id: hall_id.map(HallId),
    }
}

// ---------------------------------------------------------------------------
// Scenarios
// ---------------------------------------------------------------------------

#[test]
fn new_assignment_creates_record_and_shows_immediately() {
    let catalog = YearCatalog::new(vec![position(10, false)], vec![], &[form(1, 1)]);
    let mut board = DayBoard::new(DAY, catalog, vec![], BoardConfig::default());

    let ticket = board
        .plan_drop(
            VolunteerId(1),
            DropTarget::Position {
                position: PositionId(10),
            },
        )
        .expect("plan")
        .expect("ticket");

    assert_eq!(
        ticket.mutation,
        Mutation::Create(NewAssignment {
            application_form_id: FormId(1),
            day_id: DAY,
            position_id: PositionId(10),
            hall_id: None,
            information: String::new(),
            attendance: Attendance::Unknown,
        })
    );

    let view = board.effective_view();
    assert_eq!(view.slot_of(VolunteerId(1)), Some(Slot::general(PositionId(10))));
    assert!(view.unassigned.is_empty());

    let gateway = RecordingGateway::default();
    let result = gateway.send(&ticket.mutation);
    board.settle(ticket, result, &RecordingReporter::default());
    assert!(board.pending().is_empty());
    assert_eq!(gateway.sent().len(), 1);
}

#[test]
fn reassignment_across_halls_updates_existing_record() {
    let catalog = YearCatalog::new(
        vec![position(20, true)],
        vec![hall(1), hall(2)],
        &[form(2, 200)],
    );
    let mut board = DayBoard::new(
        DAY,
        catalog,
        vec![record(5, 2, 20, Some(1))],
        BoardConfig::default(),
    );

    let ticket = board
        .plan_drop(
            VolunteerId(200),
            DropTarget::Hall {
                position: PositionId(20),
                hall: HallId(2),
            },
        )
        .expect("plan")
        .expect("ticket");

    assert_eq!(
        ticket.mutation,
        Mutation::Update {
            assignment_id: AssignmentId(5),
            position_id: PositionId(20),
            hall_id: Some(HallId(2)),
        }
    );

    let view = board.effective_view();
    assert_eq!(
        view.slot_of(VolunteerId(200)),
        Some(Slot::hall(PositionId(20), HallId(2)))
    );
    assert!(view
        .volunteers_in(Slot::hall(PositionId(20), HallId(1)))
        .expect("hall 1 on board")
        .is_empty());
}

#[test]
fn unassign_deletes_record_and_shows_unassigned() {
    let catalog = YearCatalog::new(vec![position(30, false)], vec![], &[form(3, 300)]);
    let mut board = DayBoard::new(
        DAY,
        catalog,
        vec![record(7, 3, 30, None)],
        BoardConfig::default(),
    );

    let gateway = RecordingGateway::default();
    let ticket = board
        .plan_drop(VolunteerId(300), DropTarget::Unassigned)
        .expect("plan")
        .expect("ticket");
    assert_eq!(
        ticket.mutation,
        Mutation::Delete {
            assignment_id: AssignmentId(7)
        }
    );
    assert_eq!(
        board.effective_view().location_of(VolunteerId(300)),
        Some(Location::Unassigned)
    );

    let result = gateway.send(&ticket.mutation);
    board.settle(ticket, result, &RecordingReporter::default());

    // Server has not been refetched yet: the old record is shown again
    // until the next refresh replaces it.
    assert_eq!(
        board.effective_view().slot_of(VolunteerId(300)),
        Some(Slot::general(PositionId(30)))
    );
    board.refresh(vec![]);
    assert_eq!(
        board.effective_view().location_of(VolunteerId(300)),
        Some(Location::Unassigned)
    );
}

#[test]
fn stale_form_reference_is_tolerated() {
    let catalog = YearCatalog::new(vec![position(10, false)], vec![], &[form(1, 1)]);
    let records = [record(1, 999, 10, None)];

    let view = compute_effective_view(&records, &PendingOperations::new(), &catalog);

    assert_eq!(view.total_assigned(), 0);
    assert_eq!(view.unassigned.len(), 1);
    assert_eq!(view.unassigned[0].id, VolunteerId(1));
}

#[test]
fn later_remove_beats_earlier_add_for_same_slot() {
    let catalog = YearCatalog::new(vec![position(10, false)], vec![], &[form(1, 1)]);
    let mut pending = PendingOperations::new();
    pending.begin_add(VolunteerId(1), PositionId(10), None);
    pending.begin_remove(VolunteerId(1), PositionId(10), None);

    let view = compute_effective_view(&[], &pending, &catalog);
    assert_eq!(view.location_of(VolunteerId(1)), Some(Location::Unassigned));
}

#[test]
fn failed_mutation_snaps_back_and_reports() {
    let catalog = YearCatalog::new(
        vec![position(10, false), position(11, false)],
        vec![],
        &[form(1, 1)],
    );
    let mut board = DayBoard::new(
        DAY,
        catalog,
        vec![record(4, 1, 10, None)],
        BoardConfig::default(),
    );
    let gateway = RecordingGateway::failing("Validation error");
    let reporter = RecordingReporter::default();

    let sent = board
        .on_drop(
            VolunteerId(1),
            DropTarget::Position {
                position: PositionId(11),
            },
            &gateway,
            &reporter,
        )
        .expect("drop accepted");

    assert!(sent);
    assert!(board.pending().is_empty());
    assert_eq!(
        board.effective_view().slot_of(VolunteerId(1)),
        Some(Slot::general(PositionId(10)))
    );
    assert_eq!(
        reporter.reports.borrow().as_slice(),
        &[(
            "Update assignment".to_string(),
            "Validation error".to_string()
        )]
    );
}

#[test]
fn on_drop_sends_exactly_one_mutation_per_drop() {
    let catalog = YearCatalog::new(
        vec![position(10, false)],
        vec![],
        &[form(1, 1), form(2, 2)],
    );
    let mut board = DayBoard::new(DAY, catalog, vec![], BoardConfig::default());
    let gateway = RecordingGateway::default();
    let reporter = RecordingReporter::default();

    for volunteer in [1, 2] {
        board
            .on_drop(
                VolunteerId(volunteer),
                DropTarget::Position {
                    position: PositionId(10),
                },
                &gateway,
                &reporter,
            )
            .expect("drop accepted");
    }
    let noop = board
        .on_drop(VolunteerId(1), DropTarget::Unassigned, &gateway, &reporter)
        .expect("drop accepted");

    assert!(!noop, "nothing persisted yet, so nothing to delete");
    assert_eq!(gateway.sent().len(), 2);
    assert!(reporter.reports.borrow().is_empty());
}

#[test]
fn unassign_deletes_record_that_is_not_shown_in_any_slot() {
    let catalog = YearCatalog::new(vec![position(30, false)], vec![], &[form(3, 300), form(4, 400)]);
    let mut positionless = record(7, 3, 30, None);
    positionless.position_id = None;
    // Position 99 is not in this year's catalog.
    let orphaned = record(8, 4, 99, None);
    let mut board = DayBoard::new(
        DAY,
        catalog,
        vec![positionless, orphaned],
        BoardConfig::default(),
    );
    let gateway = RecordingGateway::default();
    let reporter = RecordingReporter::default();

    for volunteer in [300, 400] {
        assert_eq!(
            board.effective_view().location_of(VolunteerId(volunteer)),
            Some(Location::Unassigned)
        );
        let sent = board
            .on_drop(VolunteerId(volunteer), DropTarget::Unassigned, &gateway, &reporter)
            .expect("drop accepted");
        assert!(sent);
    }

    assert_eq!(
        gateway.sent(),
        vec![
            Mutation::Delete {
                assignment_id: AssignmentId(7)
            },
            Mutation::Delete {
                assignment_id: AssignmentId(8)
            },
        ]
    );
    assert!(board.pending().is_empty());
    assert!(reporter.reports.borrow().is_empty());
}

#[test]
fn board_only_reads_records_for_its_own_day() {
    let catalog = YearCatalog::new(vec![position(10, false)], vec![], &[form(1, 1)]);
    let mut other_day = record(7, 1, 10, None);
    other_day.day_id = DayId(99);
    let mut board = DayBoard::new(DAY, catalog, vec![other_day], BoardConfig::default());
    let gateway = RecordingGateway::default();
    let reporter = RecordingReporter::default();

    assert_eq!(
        board.effective_view().location_of(VolunteerId(1)),
        Some(Location::Unassigned)
    );
    assert!(board.existing_assignment(VolunteerId(1)).is_none());

    // Placing the volunteer creates a record for this day instead of
    // updating the other day's one.
    board
        .on_drop(
            VolunteerId(1),
            DropTarget::Position {
                position: PositionId(10),
            },
            &gateway,
            &reporter,
        )
        .expect("drop accepted");
    assert!(matches!(
        gateway.sent().as_slice(),
        [Mutation::Create(NewAssignment { day_id: DAY, .. })]
    ));
}
