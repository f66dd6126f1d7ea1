//! Legacy status names and persisted record compatibility.

use helpdesk_shared::status::{LEGACY_REPAIR_STATUSES, LEGACY_WORK_ORDER_STATUSES};
use helpdesk_shared::ticket_number;
use helpdesk_shared::{MeetingStatus, RepairStatus, Ticket, TicketType, WorkOrderStatus};

#[test]
fn test_canonical_names_round_trip() {
    for status in RepairStatus::ALL {
        assert_eq!(status.as_str().parse::<RepairStatus>().unwrap(), status);
    }
    for status in MeetingStatus::ALL {
        assert_eq!(status.as_str().parse::<MeetingStatus>().unwrap(), status);
    }
    for status in WorkOrderStatus::ALL {
        assert_eq!(status.as_str().parse::<WorkOrderStatus>().unwrap(), status);
    }
}

#[test]
fn test_every_legacy_name_maps_to_a_canonical_status() {
    for (legacy, expected) in LEGACY_REPAIR_STATUSES {
        assert_eq!(legacy.parse::<RepairStatus>().unwrap(), *expected, "{}", legacy);
    }
    for (legacy, expected) in LEGACY_WORK_ORDER_STATUSES {
        assert_eq!(legacy.parse::<WorkOrderStatus>().unwrap(), *expected, "{}", legacy);
    }
    assert_eq!("disetujui".parse::<MeetingStatus>().unwrap(), MeetingStatus::Approved);
}

#[test]
fn test_unknown_status_is_rejected() {
    assert!("terbang".parse::<RepairStatus>().is_err());
    assert!(serde_json::from_str::<WorkOrderStatus>("\"lost\"").is_err());
}

#[test]
fn test_legacy_ticket_loads_and_writes_canonical() {
    let raw = r#"{
        "id": "7f1c",
        "ticket_number": "TKT-PR-20240105-0042",
        "title": "AC bocor",
        "requester": {"id": "usr-1", "name": "Andi", "email": "andi@kampus.ac.id"},
        "assigned_to": {"id": "tek-1", "name": "Budi"},
        "created_at": "2024-01-05T02:00:00Z",
        "updated_at": "2024-01-05T03:00:00Z",
        "timeline": [
            {"id": "e1", "timestamp": "2024-01-05T02:00:00Z", "action": "created",
             "actor": "Andi", "details": "Ticket created"}
        ],
        "type": "perbaikan",
        "status": "ditugaskan",
        "priority": "tinggi",
        "asset_code": "AC-11"
    }"#;

    let ticket: Ticket = serde_json::from_str(raw).unwrap();
    assert_eq!(ticket.ticket_type(), TicketType::Perbaikan);
    assert_eq!(ticket.repair().unwrap().status, RepairStatus::Assigned);
    assert_eq!(ticket.version, 0);
    assert!(ticket.is_assigned_to("tek-1"));

    let written = serde_json::to_value(&ticket).unwrap();
    assert_eq!(written["status"], "assigned");
    assert_eq!(written["priority"], "high");
    assert_eq!(written["type"], "perbaikan");
}

#[test]
fn test_meeting_ticket_json_shape() {
    let raw = r#"{
        "id": "m1",
        "ticket_number": "TKT-ZM-20240105-0001",
        "title": "Rapat",
        "requester": {"id": "usr-1", "name": "Andi", "email": "andi@kampus.ac.id"},
        "created_at": "2024-01-05T02:00:00Z",
        "updated_at": "2024-01-05T02:00:00Z",
        "type": "zoom_meeting",
        "status": "menunggu_review",
        "date": "2024-01-10",
        "start_time": "9:00",
        "end_time": "10:30",
        "participants": 40
    }"#;
    let ticket: Ticket = serde_json::from_str(raw).unwrap();
    let meeting = ticket.meeting().unwrap();
    assert_eq!(meeting.status, MeetingStatus::PendingReview);
    assert_eq!(meeting.start_time.to_string(), "09:00");

    let written = serde_json::to_value(&ticket).unwrap();
    assert_eq!(written["status"], "pending_review");
    assert_eq!(written["start_time"], "09:00");
    assert!(ticket_number::is_valid(&ticket.ticket_number));
}
