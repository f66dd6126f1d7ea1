//! Tests for the repair ticket state machine.

use chrono::{Duration, Utc};
use helpdesk_shared::identity::{Role, User};
use helpdesk_shared::notification::Recipient;
use helpdesk_shared::repair::{self, NewRepairTicket, RepairAction};
use helpdesk_shared::ticket::{Priority, Ticket};
use helpdesk_shared::{DeskError, RepairStatus};

fn admin() -> User {
    User::new("adm-1", "Rina Admin", "rina@kampus.ac.id", vec![Role::AdminLayanan])
}

fn tech() -> User {
    User::new("tek-1", "Budi Teknisi", "budi@kampus.ac.id", vec![Role::Teknisi])
}

fn other_tech() -> User {
    User::new("tek-2", "Dewi Teknisi", "dewi@kampus.ac.id", vec![Role::Teknisi])
}

fn requester() -> User {
    User::new("usr-1", "Andi Pegawai", "andi@kampus.ac.id", vec![Role::User])
        .with_unit("Biro Umum")
        .with_phone("0812000111")
}

fn directory() -> Vec<User> {
    vec![admin(), tech(), other_tech(), requester()]
}

fn new_request() -> NewRepairTicket {
    NewRepairTicket {
        title: "Printer macet".to_string(),
        description: "Kertas selalu tersangkut".to_string(),
        priority: Priority::High,
        asset_code: "PRN-0042".to_string(),
        asset_nup: "3100102001-12".to_string(),
        location: "Gedung A lt. 2".to_string(),
        attachments: vec![],
    }
}

fn submitted() -> Ticket {
    let (ticket, _) = repair::submit(new_request(), &requester(), Utc::now()).unwrap();
    ticket
}

/// Ticket forced into a status with `tech` as assignee
fn ticket_in(status: RepairStatus) -> Ticket {
    let mut ticket = submitted();
    ticket.repair_mut().unwrap().status = status;
    ticket.assigned_to = Some(tech().person_ref());
    ticket
}

fn sample_actions() -> Vec<RepairAction> {
    vec![
        RepairAction::Approve { notes: None },
        RepairAction::Reject {
            reason: "duplicate".to_string(),
        },
        RepairAction::Assign {
            technician_id: "tek-2".to_string(),
        },
        RepairAction::Accept,
        RepairAction::Decline {
            reason: "on leave".to_string(),
        },
        RepairAction::Hold {
            work_order_id: "wo-1".to_string(),
            problem_type: None,
        },
        RepairAction::Resume { notes: None },
        RepairAction::Resolve {
            notes: None,
            problem_type: None,
        },
        RepairAction::MarkUnrepairable {
            reason: "board burnt".to_string(),
            problem_type: None,
        },
        RepairAction::AwaitUser { notes: None },
        RepairAction::Confirm,
    ]
}

/// Transition table, written out independently of the implementation
fn expected_legal(status: RepairStatus, action: &str, actor: &str) -> bool {
    use RepairStatus::*;
    matches!(
        (status, action, actor),
        (Submitted, "approve", "admin")
            | (Submitted, "reject", "admin")
            | (Approved, "assign", "admin")
            | (Assigned, "accept", "tech")
            | (Assigned, "decline", "tech")
            | (InProgress, "hold", "tech")
            | (InProgress, "resolve", "tech")
            | (InProgress, "mark_unrepairable", "tech")
            | (OnHold, "resume", "tech")
            | (Resolved, "await_user", "tech")
            | (Resolved, "confirm", "requester")
            | (WaitingForUser, "confirm", "requester")
    )
}

#[test]
fn test_transition_legality_matrix() {
    let users = directory();
    let actors = [
        ("admin", admin()),
        ("tech", tech()),
        ("other_tech", other_tech()),
        ("requester", requester()),
    ];
    let now = Utc::now() + Duration::minutes(1);

    for status in RepairStatus::ALL {
        for action in sample_actions() {
            for (label, user) in &actors {
                let original = ticket_in(status);
                let mut ticket = original.clone();
                let result = repair::apply(&mut ticket, &action, &user.actor(), &users, now);
                let legal = expected_legal(status, action.name(), label);

                if legal {
                    let transition = result.unwrap_or_else(|e| {
                        panic!("{} by {} from {} should pass: {}", action.name(), label, status, e)
                    });
                    assert_eq!(ticket.repair().unwrap().status, action.target());
                    assert_eq!(ticket.timeline.len(), original.timeline.len() + 1);
                    assert_eq!(transition.from, status.as_str());
                } else {
                    assert!(
                        result.is_err(),
                        "{} by {} from {} should be rejected",
                        action.name(),
                        label,
                        status
                    );
                    assert_eq!(ticket, original, "rejected action must not mutate");
                }
            }
        }
    }
}

#[test]
fn test_wrong_role_is_forbidden_not_invalid() {
    let mut ticket = submitted();
    let err = repair::apply(
        &mut ticket,
        &RepairAction::Approve { notes: None },
        &tech().actor(),
        &directory(),
        Utc::now(),
    )
    .unwrap_err();
    assert!(matches!(err, DeskError::Forbidden(_)));
}

#[test]
fn test_wrong_status_is_invalid_transition() {
    let mut ticket = ticket_in(RepairStatus::Closed);
    let err = repair::apply(
        &mut ticket,
        &RepairAction::Approve { notes: None },
        &admin().actor(),
        &directory(),
        Utc::now(),
    )
    .unwrap_err();
    assert!(matches!(err, DeskError::InvalidTransition { .. }));
}

#[test]
fn test_reject_requires_reason() {
    let mut ticket = submitted();
    let before = ticket.clone();
    let err = repair::apply(
        &mut ticket,
        &RepairAction::Reject {
            reason: "   ".to_string(),
        },
        &admin().actor(),
        &directory(),
        Utc::now(),
    )
    .unwrap_err();
    assert!(matches!(err, DeskError::Validation(_)));
    assert_eq!(ticket, before);
}

#[test]
fn test_assign_requires_technician_role() {
    let mut ticket = ticket_in(RepairStatus::Approved);
    ticket.assigned_to = None;
    let err = repair::apply(
        &mut ticket,
        &RepairAction::Assign {
            technician_id: "usr-1".to_string(),
        },
        &admin().actor(),
        &directory(),
        Utc::now(),
    )
    .unwrap_err();
    assert!(matches!(err, DeskError::Validation(_)));
    assert!(ticket.assigned_to.is_none());
}

#[test]
fn test_decline_returns_to_admin_queue() {
    let mut ticket = ticket_in(RepairStatus::Assigned);
    let transition = repair::apply(
        &mut ticket,
        &RepairAction::Decline {
            reason: "outside my area".to_string(),
        },
        &tech().actor(),
        &directory(),
        Utc::now(),
    )
    .unwrap();

    assert_eq!(ticket.repair().unwrap().status, RepairStatus::Approved);
    assert!(ticket.assigned_to.is_none());
    assert_eq!(
        ticket.repair().unwrap().decline_reason.as_deref(),
        Some("outside my area")
    );
    assert_eq!(
        transition.notifications[0].recipient,
        Recipient::Role(Role::AdminLayanan)
    );
}

#[test]
fn test_submit_notifies_admins() {
    let (ticket, drafts) = repair::submit(new_request(), &requester(), Utc::now()).unwrap();
    assert_eq!(ticket.repair().unwrap().status, RepairStatus::Submitted);
    assert_eq!(ticket.timeline.len(), 1);
    assert_eq!(ticket.requester.unit, "Biro Umum");
    assert_eq!(drafts.len(), 1);
    assert_eq!(drafts[0].recipient, Recipient::Role(Role::AdminLayanan));
}

#[test]
fn test_submit_requires_asset_code() {
    let mut req = new_request();
    req.asset_code = String::new();
    assert!(repair::submit(req, &requester(), Utc::now()).is_err());
}

#[test]
fn test_timeline_is_append_only_through_full_flow() {
    let users = directory();
    let mut ticket = submitted();
    let mut now = Utc::now();
    let steps: Vec<(RepairAction, User)> = vec![
        (RepairAction::Approve { notes: None }, admin()),
        (
            RepairAction::Assign {
                technician_id: "tek-1".to_string(),
            },
            admin(),
        ),
        (RepairAction::Accept, tech()),
        (
            RepairAction::Resolve {
                notes: Some("roller replaced".to_string()),
                problem_type: Some("mekanik".to_string()),
            },
            tech(),
        ),
        (RepairAction::AwaitUser { notes: None }, tech()),
        (RepairAction::Confirm, requester()),
    ];

    for (i, (action, user)) in steps.iter().enumerate() {
        let snapshot = ticket.timeline.entries().to_vec();
        now += Duration::minutes(5);
        repair::apply(&mut ticket, action, &user.actor(), &users, now).unwrap();

        assert_eq!(ticket.timeline.len(), i + 2);
        assert_eq!(&ticket.timeline.entries()[..snapshot.len()], snapshot.as_slice());
    }

    let stamps: Vec<_> = ticket.timeline.entries().iter().map(|e| e.timestamp).collect();
    assert!(stamps.windows(2).all(|w| w[0] <= w[1]));
    assert_eq!(ticket.repair().unwrap().status, RepairStatus::Closed);
    assert_eq!(ticket.repair().unwrap().repairable, Some(true));
    assert_eq!(
        ticket.timeline.actions(),
        vec![
            "created",
            "approved",
            "assigned",
            "accepted",
            "resolved",
            "waiting_for_user",
            "closed"
        ]
    );
}

#[test]
fn test_unrepairable_records_reason() {
    let mut ticket = ticket_in(RepairStatus::InProgress);
    let transition = repair::apply(
        &mut ticket,
        &RepairAction::MarkUnrepairable {
            reason: "mainboard burnt".to_string(),
            problem_type: Some("hardware".to_string()),
        },
        &tech().actor(),
        &directory(),
        Utc::now(),
    )
    .unwrap();

    let d = ticket.repair().unwrap();
    assert_eq!(d.status, RepairStatus::ClosedUnrepairable);
    assert_eq!(d.repairable, Some(false));
    assert_eq!(d.problem_type.as_deref(), Some("hardware"));
    assert_eq!(transition.notifications.len(), 2);
    assert!(d.status.is_terminal());
}

#[test]
fn test_meeting_ticket_rejects_repair_actions() {
    let mut ticket = submitted();
    let json = serde_json::json!({
        "type": "zoom_meeting",
        "status": "pending_review",
        "date": "2025-06-01",
        "start_time": "09:00",
        "end_time": "10:00",
        "participants": 10
    });
    ticket.details = serde_json::from_value(json).unwrap();
    let err = repair::apply(
        &mut ticket,
        &RepairAction::Approve { notes: None },
        &admin().actor(),
        &directory(),
        Utc::now(),
    )
    .unwrap_err();
    assert!(matches!(err, DeskError::InvalidTransition { .. }));
    assert!(ticket.repair().is_none());
}
