//! End-to-end service desk flows against in-memory repositories.

use chrono::{Duration, NaiveDate, Utc};
use helpdesk_shared::booking::{MeetingAction, NewMeetingTicket};
use helpdesk_shared::clock::WorkingHours;
use helpdesk_shared::inventory::{Condition, InventoryInput};
use helpdesk_shared::repair::{NewRepairTicket, RepairAction};
use helpdesk_shared::ticket::Priority;
use helpdesk_shared::work_order::{NewWorkOrder, SparepartItem, WorkOrderAction};
use helpdesk_shared::{
    DeskError, MeetingStatus, NotificationDraft, NotificationKind, RepairStatus, Ticket,
    TicketType, WorkOrderStatus,
};
use helpdeskd::config::Config;
use helpdeskd::desk::{NewZoomAccount, TicketFilter, WorkOrderFilter};
use helpdeskd::seed::seed_defaults;
use helpdeskd::store::{Repositories, Repository};
use helpdeskd::Desk;

const USER: &str = "user-1";
const ADMIN: &str = "admin-1";
const TECH: &str = "tech-1";
const SUPPLY: &str = "supply-1";

fn desk() -> Desk {
    let repos = Repositories::memory();
    seed_defaults(&repos, &Config::default().zoom_accounts).unwrap();
    Desk::new(repos, WorkingHours::default())
}

fn repair_request() -> NewRepairTicket {
    NewRepairTicket {
        title: "Proyektor tidak menyala".to_string(),
        description: "Lampu indikator merah".to_string(),
        priority: Priority::High,
        asset_code: "PRJ-0012".to_string(),
        asset_nup: "3100203004-2".to_string(),
        location: "Aula lt. 1".to_string(),
        attachments: vec![],
    }
}

fn meeting_request(date: NaiveDate, start: &str, end: &str) -> NewMeetingTicket {
    NewMeetingTicket {
        title: "Rapat pimpinan".to_string(),
        description: String::new(),
        date,
        start_time: start.parse().unwrap(),
        end_time: end.parse().unwrap(),
        participants: 30,
        co_host: Some("Sekretaris".to_string()),
        breakout_rooms: 0,
        attachments: vec![],
    }
}

fn approve_on(account: &str) -> MeetingAction {
    MeetingAction::Approve {
        account_id: account.to_string(),
        meeting_link: "https://zoom.us/j/987654321".to_string(),
        passcode: "pimpinan".to_string(),
        host_key: "246810".to_string(),
    }
}

fn repair_status(ticket: &Ticket) -> RepairStatus {
    ticket.repair().unwrap().status
}

/// Ticket accepted by the technician
fn in_progress(desk: &Desk) -> Ticket {
    let ticket = desk.submit_repair(USER, repair_request()).unwrap();
    desk.apply_repair_action(ADMIN, &ticket.id, RepairAction::Approve { notes: None })
        .unwrap();
    desk.apply_repair_action(
        ADMIN,
        &ticket.id,
        RepairAction::Assign {
            technician_id: TECH.to_string(),
        },
    )
    .unwrap();
    desk.apply_repair_action(TECH, &ticket.id, RepairAction::Accept)
        .unwrap()
}

fn sparepart() -> NewWorkOrder {
    NewWorkOrder::Sparepart {
        items: vec![SparepartItem {
            name: "Lampu proyektor".to_string(),
            quantity: 1,
            unit: "pcs".to_string(),
            note: None,
        }],
        problem_type: Some("hardware".to_string()),
    }
}

fn start_procurement() -> WorkOrderAction {
    WorkOrderAction::StartProcurement {
        vendor_name: None,
        vendor_contact: None,
        notes: None,
    }
}

#[test]
fn test_repair_end_to_end_with_work_order() {
    let desk = desk();
    let ticket = in_progress(&desk);
    assert_eq!(repair_status(&ticket), RepairStatus::InProgress);
    assert!(ticket.is_assigned_to(TECH));

    let order = desk.request_work_order(TECH, &ticket.id, sparepart()).unwrap();
    assert_eq!(order.status, WorkOrderStatus::Requested);
    let held = desk.ticket(&ticket.id).unwrap();
    assert_eq!(repair_status(&held), RepairStatus::OnHold);
    assert_eq!(held.repair().unwrap().work_order_id.as_deref(), Some(order.id.as_str()));

    desk.apply_work_order_action(SUPPLY, &order.id, start_procurement())
        .unwrap();
    let tech_inbox_before = desk.notifications(TECH).unwrap().notifications.len();

    let delivered = desk
        .apply_work_order_action(
            SUPPLY,
            &order.id,
            WorkOrderAction::MarkDelivered {
                received_quantity: 1,
                remarks: None,
            },
        )
        .unwrap();
    assert_eq!(delivered.status, WorkOrderStatus::Delivered);

    // Cascade: ticket resumes, assignee gets exactly one notice
    let resumed = desk.ticket(&ticket.id).unwrap();
    assert_eq!(repair_status(&resumed), RepairStatus::InProgress);
    let tech_inbox = desk.notifications(TECH).unwrap();
    assert_eq!(tech_inbox.notifications.len(), tech_inbox_before + 1);
    assert_eq!(tech_inbox.notifications[0].title, "Work order fulfilled");

    desk.apply_repair_action(
        TECH,
        &ticket.id,
        RepairAction::Resolve {
            notes: Some("Lampu diganti".to_string()),
            problem_type: None,
        },
    )
    .unwrap();
    let closed = desk
        .apply_repair_action(USER, &ticket.id, RepairAction::Confirm)
        .unwrap();

    assert_eq!(repair_status(&closed), RepairStatus::Closed);
    assert!(closed.timeline.len() >= 7);
    assert_eq!(
        closed.timeline.actions(),
        vec![
            "created",
            "approved",
            "assigned",
            "accepted",
            "on_hold",
            "work_order_fulfilled",
            "resolved",
            "closed"
        ]
    );
    let stamps: Vec<_> = closed.timeline.entries().iter().map(|e| e.timestamp).collect();
    assert!(stamps.windows(2).all(|w| w[0] <= w[1]));
}

#[test]
fn test_booking_end_to_end_conflict_then_other_account() {
    let desk = desk();
    let date = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();

    let existing = desk
        .submit_meeting("super-1", meeting_request(date, "09:30", "10:30"))
        .unwrap();
    desk.apply_meeting_action(ADMIN, &existing.id, approve_on("zoom-1"))
        .unwrap();

    let pending = desk
        .submit_meeting(USER, meeting_request(date, "09:00", "10:00"))
        .unwrap();
    assert_eq!(pending.meeting().unwrap().status, MeetingStatus::PendingReview);

    let err = desk
        .apply_meeting_action(ADMIN, &pending.id, approve_on("zoom-1"))
        .unwrap_err();
    assert!(matches!(err, DeskError::Conflict(_)));
    assert!(err.to_string().contains(&existing.ticket_number));
    let unchanged = desk.ticket(&pending.id).unwrap();
    assert_eq!(unchanged.meeting().unwrap().status, MeetingStatus::PendingReview);
    assert_eq!(unchanged.version, pending.version);

    let approved = desk
        .apply_meeting_action(ADMIN, &pending.id, approve_on("zoom-2"))
        .unwrap();
    let m = approved.meeting().unwrap();
    assert_eq!(m.status, MeetingStatus::Approved);
    assert_eq!(m.account_id.as_deref(), Some("zoom-2"));

    let inbox = desk.notifications(USER).unwrap();
    let notice = &inbox.notifications[0];
    assert_eq!(notice.kind, NotificationKind::Success);
    assert!(notice.message.contains("https://zoom.us/j/987654321"));
    assert!(notice.message.contains("pimpinan"));
    assert!(notice.message.contains("246810"));

    let day = desk.schedule("zoom-1", date).unwrap();
    assert_eq!(day.len(), 1);
    assert_eq!(day[0].id, existing.id);
}

#[test]
fn test_admins_notified_on_submission() {
    let desk = desk();
    desk.submit_repair(USER, repair_request()).unwrap();
    // admin-1 and super-1 both hold admin_layanan
    assert_eq!(desk.notifications(ADMIN).unwrap().unread, 1);
    assert_eq!(desk.notifications("super-1").unwrap().unread, 1);
    assert_eq!(desk.notifications(TECH).unwrap().unread, 0);
}

#[test]
fn test_rejected_action_leaves_store_untouched() {
    let desk = desk();
    let ticket = desk.submit_repair(USER, repair_request()).unwrap();
    let err = desk
        .apply_repair_action(TECH, &ticket.id, RepairAction::Approve { notes: None })
        .unwrap_err();
    assert_eq!(err.status_code(), 403);

    let err = desk
        .apply_repair_action(ADMIN, &ticket.id, RepairAction::Confirm)
        .unwrap_err();
    assert_eq!(err.status_code(), 409);

    let stored = desk.ticket(&ticket.id).unwrap();
    assert_eq!(stored, ticket);
}

#[test]
fn test_hold_only_through_work_order() {
    let desk = desk();
    let ticket = in_progress(&desk);
    let err = desk
        .apply_repair_action(
            TECH,
            &ticket.id,
            RepairAction::Hold {
                work_order_id: "made-up".to_string(),
                problem_type: None,
            },
        )
        .unwrap_err();
    assert!(matches!(err, DeskError::Validation(_)));
    assert_eq!(repair_status(&desk.ticket(&ticket.id).unwrap()), RepairStatus::InProgress);
}

#[test]
fn test_manual_resume_refused_while_order_open() {
    let desk = desk();
    let ticket = in_progress(&desk);
    let order = desk.request_work_order(TECH, &ticket.id, sparepart()).unwrap();
    let resume = || RepairAction::Resume { notes: None };

    let err = desk
        .apply_repair_action(TECH, &ticket.id, resume())
        .unwrap_err();
    assert!(matches!(err, DeskError::InvalidTransition { .. }));

    desk.apply_work_order_action(SUPPLY, &order.id, start_procurement())
        .unwrap();
    let err = desk
        .apply_repair_action(TECH, &ticket.id, resume())
        .unwrap_err();
    assert_eq!(err.status_code(), 409);
    let held = desk.ticket(&ticket.id).unwrap();
    assert_eq!(repair_status(&held), RepairStatus::OnHold);

    // Delivery still cascades and reaches the technician
    desk.apply_work_order_action(
        SUPPLY,
        &order.id,
        WorkOrderAction::MarkDelivered {
            received_quantity: 1,
            remarks: None,
        },
    )
    .unwrap();
    let resumed = desk.ticket(&ticket.id).unwrap();
    assert_eq!(repair_status(&resumed), RepairStatus::InProgress);
    assert_eq!(resumed.timeline.last().unwrap().action, "work_order_fulfilled");
    assert_eq!(
        desk.notifications(TECH).unwrap().notifications[0].title,
        "Work order fulfilled"
    );
}

#[test]
fn test_failed_work_order_keeps_ticket_on_hold() {
    let desk = desk();
    let ticket = in_progress(&desk);
    let order = desk.request_work_order(TECH, &ticket.id, sparepart()).unwrap();
    desk.apply_work_order_action(
        SUPPLY,
        &order.id,
        WorkOrderAction::Fail {
            reason: "stok kosong".to_string(),
        },
    )
    .unwrap();
    assert_eq!(repair_status(&desk.ticket(&ticket.id).unwrap()), RepairStatus::OnHold);

    let failed = desk
        .work_orders(&WorkOrderFilter {
            ticket_id: Some(ticket.id.clone()),
            status: Some(WorkOrderStatus::Failed),
        })
        .unwrap();
    assert_eq!(failed.len(), 1);

    // Abandoned order: the technician carries on by hand
    let resumed = desk
        .apply_repair_action(
            TECH,
            &ticket.id,
            RepairAction::Resume {
                notes: Some("pakai stok lama".to_string()),
            },
        )
        .unwrap();
    assert_eq!(repair_status(&resumed), RepairStatus::InProgress);
    assert_eq!(resumed.timeline.last().unwrap().action, "resumed");
}

#[test]
fn test_ticket_filters() {
    let desk = desk();
    let repair = in_progress(&desk);
    let date = NaiveDate::from_ymd_opt(2025, 7, 1).unwrap();
    desk.submit_meeting(USER, meeting_request(date, "13:00", "14:00"))
        .unwrap();

    let all = desk.tickets(&TicketFilter::default()).unwrap();
    assert_eq!(all.len(), 2);

    let by_type = TicketFilter::parse(Some("perbaikan"), None, None, None).unwrap();
    let repairs = desk.tickets(&by_type).unwrap();
    assert_eq!(repairs.len(), 1);
    assert_eq!(repairs[0].ticket_type(), TicketType::Perbaikan);

    let by_assignee = TicketFilter::parse(None, None, Some(TECH), None).unwrap();
    assert_eq!(desk.tickets(&by_assignee).unwrap()[0].id, repair.id);

    // Legacy status names filter too
    let legacy = TicketFilter::parse(None, Some("menunggu_review"), None, Some(USER)).unwrap();
    let pending = desk.tickets(&legacy).unwrap();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].ticket_type(), TicketType::ZoomMeeting);

    assert!(TicketFilter::parse(None, Some("lost"), None, None).is_err());
    assert!(TicketFilter::parse(Some("printer"), None, None, None).is_err());
}

#[test]
fn test_unknown_user_is_refused() {
    let desk = desk();
    let err = desk.submit_repair("ghost", repair_request()).unwrap_err();
    assert_eq!(err.status_code(), 403);
}

#[test]
fn test_same_instant_notices_list_newest_insert_first() {
    let repos = Repositories::memory();
    seed_defaults(&repos, &Config::default().zoom_accounts).unwrap();
    let desk = Desk::new(repos.clone(), WorkingHours::default());
    let at = Utc::now();
    for (title, when) in [
        ("older", at - Duration::minutes(1)),
        ("first", at),
        ("second", at),
        ("third", at),
    ] {
        let notice = NotificationDraft::to_user(USER, title, "").deliver_to(USER, when);
        repos.notifications.insert(notice).unwrap();
    }

    let titles: Vec<_> = desk
        .notifications(USER)
        .unwrap()
        .notifications
        .into_iter()
        .map(|n| n.title)
        .collect();
    assert_eq!(titles, vec!["third", "second", "first", "older"]);
}

#[test]
fn test_notification_read_flags() {
    let desk = desk();
    desk.submit_repair(USER, repair_request()).unwrap();
    desk.submit_repair(USER, repair_request()).unwrap();

    let feed = desk.notifications(ADMIN).unwrap();
    assert_eq!(feed.unread, 2);
    let first = feed.notifications[0].id.clone();

    // Someone else's notification is invisible
    assert_eq!(desk.mark_read(TECH, &first).unwrap_err().status_code(), 404);

    assert!(desk.mark_read(ADMIN, &first).unwrap().read);
    assert_eq!(desk.notifications(ADMIN).unwrap().unread, 1);
    assert_eq!(desk.mark_all_read(ADMIN).unwrap(), 1);
    assert_eq!(desk.notifications(ADMIN).unwrap().unread, 0);
    assert_eq!(desk.mark_all_read(ADMIN).unwrap(), 0);
}

#[test]
fn test_zoom_account_management() {
    let desk = desk();
    let err = desk
        .create_zoom_account(
            USER,
            NewZoomAccount {
                id: None,
                name: "Zoom 4".to_string(),
                email: String::new(),
            },
        )
        .unwrap_err();
    assert_eq!(err.status_code(), 403);

    let created = desk
        .create_zoom_account(
            ADMIN,
            NewZoomAccount {
                id: Some("zoom-4".to_string()),
                name: "Zoom 4".to_string(),
                email: "zoom4@helpdesk.local".to_string(),
            },
        )
        .unwrap();
    assert!(created.active);
    assert_eq!(desk.zoom_accounts().unwrap().len(), 4);

    // Inactive accounts cannot take new approvals
    desk.deactivate_zoom_account(ADMIN, "zoom-4").unwrap();
    let date = NaiveDate::from_ymd_opt(2025, 8, 1).unwrap();
    let booking = desk
        .submit_meeting(USER, meeting_request(date, "08:00", "09:00"))
        .unwrap();
    let err = desk
        .apply_meeting_action(ADMIN, &booking.id, approve_on("zoom-4"))
        .unwrap_err();
    assert!(matches!(err, DeskError::Validation(_)));

    // An account with approved bookings cannot be deleted
    desk.apply_meeting_action(ADMIN, &booking.id, approve_on("zoom-1"))
        .unwrap();
    let err = desk.delete_zoom_account(ADMIN, "zoom-1").unwrap_err();
    assert!(matches!(err, DeskError::Conflict(_)));

    desk.delete_zoom_account(ADMIN, "zoom-4").unwrap();
    assert_eq!(desk.zoom_accounts().unwrap().len(), 3);
    assert_eq!(
        desk.schedule("zoom-4", date).unwrap_err().status_code(),
        404
    );
}

#[test]
fn test_inventory_low_stock() {
    let desk = desk();
    let input = |name: &str, stock: u32| InventoryInput {
        name: name.to_string(),
        category: "consumable".to_string(),
        stock,
        min_stock: 2,
        location: "Gudang TI".to_string(),
        condition: Condition::Baik,
    };

    assert_eq!(
        desk.create_inventory_item(TECH, input("Toner", 1))
            .unwrap_err()
            .status_code(),
        403
    );
    let toner = desk.create_inventory_item(ADMIN, input("Toner", 5)).unwrap();
    desk.create_inventory_item(ADMIN, input("Kabel HDMI", 2)).unwrap();

    let low: Vec<String> = desk.low_stock().unwrap().into_iter().map(|i| i.name).collect();
    assert_eq!(low, vec!["Kabel HDMI".to_string()]);

    let updated = desk
        .update_inventory_item(ADMIN, &toner.id, input("Toner", 1))
        .unwrap();
    assert_eq!(updated.id, toner.id);
    assert_eq!(updated.version, toner.version + 1);
    assert_eq!(desk.low_stock().unwrap().len(), 2);

    desk.delete_inventory_item(ADMIN, &toner.id).unwrap();
    assert_eq!(desk.inventory().unwrap().len(), 1);
}

#[test]
fn test_counts() {
    let desk = desk();
    in_progress(&desk);
    let counts = desk.counts().unwrap();
    assert_eq!(counts.tickets, 1);
    assert_eq!(counts.open_tickets, 1);
    assert_eq!(counts.zoom_accounts, 3);
    assert_eq!(counts.users, 5);
}
