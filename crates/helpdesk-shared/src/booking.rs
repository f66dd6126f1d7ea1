//! Zoom meeting bookings: submission, approval and overlap detection.
//!
//! Each Zoom account hosts one meeting at a time. Two bookings on the same
//! account and date conflict when their half-open intervals overlap:
//! `[s1, e1)` and `[s2, e2)` conflict iff `s1 < e2 && e1 > s2`. Only
//! approved bookings block an approval; pending ones never do.

use chrono::{DateTime, NaiveDate, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;
use uuid::Uuid;

use crate::clock::{ClockTime, WorkingHours};
use crate::error::{DeskError, DeskResult};
use crate::identity::{Actor, Role, User};
use crate::notification::{ticket_link, NotificationDraft, NotificationKind};
use crate::status::MeetingStatus;
use crate::ticket::{Attachment, MeetingDetails, Ticket, TicketDetails, TicketType};
use crate::ticket_number;
use crate::timeline::Timeline;
use crate::transition::{optional_text, require_text, Transition};

fn host_key_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^\d{6}$").expect("static regex"))
}

/// Shared meeting-hosting account
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZoomAccount {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default = "default_active")]
    pub active: bool,
    #[serde(default)]
    pub version: u64,
}

fn default_active() -> bool {
    true
}

impl ZoomAccount {
    pub fn new(id: &str, name: &str, email: &str) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            email: email.to_string(),
            active: true,
            version: 0,
        }
    }
}

/// Meeting request as submitted by a user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewMeetingTicket {
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub date: NaiveDate,
    pub start_time: ClockTime,
    pub end_time: ClockTime,
    pub participants: u32,
    #[serde(default)]
    pub co_host: Option<String>,
    #[serde(default)]
    pub breakout_rooms: u32,
    #[serde(default)]
    pub attachments: Vec<Attachment>,
}

impl NewMeetingTicket {
    pub fn validate(&self, hours: &WorkingHours) -> DeskResult<()> {
        require_text("title", &self.title)?;
        validate_time_range(self.start_time, self.end_time, hours)?;
        if self.participants == 0 {
            return Err(DeskError::validation("participant estimate must be at least 1"));
        }
        Ok(())
    }
}

/// End strictly after start, both inside the working-hours window
pub fn validate_time_range(
    start: ClockTime,
    end: ClockTime,
    hours: &WorkingHours,
) -> DeskResult<()> {
    if end <= start {
        return Err(DeskError::validation(format!(
            "end time {} must be after start time {}",
            end, start
        )));
    }
    if !hours.contains(start, end) {
        return Err(DeskError::validation(format!(
            "{}-{} is outside working hours {}-{}",
            start, end, hours.start, hours.end
        )));
    }
    Ok(())
}

/// Build a `pending_review` meeting ticket
pub fn submit(
    req: NewMeetingTicket,
    requester: &User,
    hours: &WorkingHours,
    now: DateTime<Utc>,
) -> DeskResult<(Ticket, Vec<NotificationDraft>)> {
    req.validate(hours)?;

    let id = Uuid::new_v4().to_string();
    let number = ticket_number::generate(TicketType::ZoomMeeting, now.date_naive());
    let mut timeline = Timeline::new();
    timeline.record(
        "created",
        &requester.actor(),
        format!(
            "Meeting booking {} for {} {}-{}",
            number, req.date, req.start_time, req.end_time
        ),
        now,
    );

    let notice = NotificationDraft::to_role(
        Role::AdminLayanan,
        "New meeting booking",
        format!(
            "{} requested a meeting on {} {}-{}",
            requester.name, req.date, req.start_time, req.end_time
        ),
    )
    .link(ticket_link(&id));

    let ticket = Ticket {
        id,
        ticket_number: number,
        title: req.title.trim().to_string(),
        description: req.description,
        requester: requester.requester(),
        assigned_to: None,
        created_at: now,
        updated_at: now,
        timeline,
        attachments: req.attachments,
        details: TicketDetails::ZoomMeeting(MeetingDetails {
            status: MeetingStatus::PendingReview,
            date: req.date,
            start_time: req.start_time,
            end_time: req.end_time,
            participants: req.participants,
            co_host: optional_text(&req.co_host),
            breakout_rooms: req.breakout_rooms,
            account_id: None,
            meeting_link: None,
            passcode: None,
            host_key: None,
            rejection_reason: None,
        }),
        version: 0,
    };

    Ok((ticket, vec![notice]))
}

/// Half-open interval overlap on minutes since midnight
pub fn intervals_overlap(s1: ClockTime, e1: ClockTime, s2: ClockTime, e2: ClockTime) -> bool {
    s1 < e2 && e1 > s2
}

/// Candidate slot being checked for approval
#[derive(Debug, Clone, PartialEq)]
pub struct SlotRequest {
    /// Booking being re-validated; it never conflicts with itself
    pub ticket_id: Option<String>,
    pub account_id: String,
    pub date: NaiveDate,
    pub start: ClockTime,
    pub end: ClockTime,
}

/// An approved booking that blocks a candidate slot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookingConflict {
    pub ticket_id: String,
    pub ticket_number: String,
    pub requester_name: String,
    pub account_id: String,
    pub date: NaiveDate,
    pub start: ClockTime,
    pub end: ClockTime,
}

impl std::fmt::Display for BookingConflict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "account {} is already booked by {} on {} {}-{} ({})",
            self.account_id,
            self.requester_name,
            self.date,
            self.start,
            self.end,
            self.ticket_number
        )
    }
}

/// True when both are meetings on the same account and date, are distinct
/// tickets, and their time ranges overlap. Status is not considered.
pub fn conflicts(a: &Ticket, b: &Ticket) -> bool {
    if a.id == b.id {
        return false;
    }
    match (a.meeting(), b.meeting()) {
        (Some(ma), Some(mb)) => {
            ma.account_id.is_some()
                && ma.account_id == mb.account_id
                && ma.date == mb.date
                && intervals_overlap(ma.start_time, ma.end_time, mb.start_time, mb.end_time)
        }
        _ => false,
    }
}

/// First approved booking overlapping the candidate slot
pub fn find_conflict(candidate: &SlotRequest, bookings: &[Ticket]) -> Option<BookingConflict> {
    bookings
        .iter()
        .filter(|t| candidate.ticket_id.as_deref() != Some(t.id.as_str()))
        .find_map(|t| {
            let m = t.meeting()?;
            let same_slot = m.status == MeetingStatus::Approved
                && m.account_id.as_deref() == Some(candidate.account_id.as_str())
                && m.date == candidate.date
                && intervals_overlap(candidate.start, candidate.end, m.start_time, m.end_time);
            same_slot.then(|| BookingConflict {
                ticket_id: t.id.clone(),
                ticket_number: t.ticket_number.clone(),
                requester_name: t.requester.name.clone(),
                account_id: candidate.account_id.clone(),
                date: m.date,
                start: m.start_time,
                end: m.end_time,
            })
        })
}

/// Approved bookings of one account on one date, by start time
pub fn schedule<'a>(account_id: &str, date: NaiveDate, bookings: &'a [Ticket]) -> Vec<&'a Ticket> {
    let mut day: Vec<&Ticket> = bookings
        .iter()
        .filter(|t| {
            t.meeting()
                .map(|m| {
                    m.status == MeetingStatus::Approved
                        && m.date == date
                        && m.account_id.as_deref() == Some(account_id)
                })
                .unwrap_or(false)
        })
        .collect();
    day.sort_by_key(|t| t.meeting().map(|m| m.start_time));
    day
}

/// Admin decisions on a booking
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum MeetingAction {
    Approve {
        account_id: String,
        meeting_link: String,
        passcode: String,
        host_key: String,
    },
    Reject {
        reason: String,
    },
}

impl MeetingAction {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Approve { .. } => "approve",
            Self::Reject { .. } => "reject",
        }
    }
}

/// Apply an admin decision. `bookings` is every known ticket; the ticket
/// itself may be among them. On error the ticket is unchanged.
pub fn apply(
    ticket: &mut Ticket,
    action: &MeetingAction,
    actor: &Actor,
    accounts: &[ZoomAccount],
    bookings: &[Ticket],
    now: DateTime<Utc>,
) -> DeskResult<Transition> {
    let meeting = ticket.meeting().ok_or_else(|| {
        DeskError::invalid_transition("ticket", ticket.ticket_type(), action.name())
    })?;
    let from = meeting.status;
    if from != MeetingStatus::PendingReview {
        return Err(DeskError::invalid_transition(
            format!("booking {}", ticket.ticket_number),
            from,
            action.name(),
        ));
    }
    if !actor.has_role(Role::AdminLayanan) {
        return Err(DeskError::forbidden(format!(
            "only admin_layanan may {} a meeting booking",
            action.name()
        )));
    }

    let requester_id = ticket.requester.id.clone();
    let link = ticket_link(&ticket.id);

    match action {
        MeetingAction::Approve {
            account_id,
            meeting_link,
            passcode,
            host_key,
        } => {
            let meeting_link = require_text("meeting link", meeting_link)?;
            let passcode = require_text("passcode", passcode)?;
            let host_key = host_key.trim().to_string();
            if !host_key_pattern().is_match(&host_key) {
                return Err(DeskError::validation("host key must be exactly 6 digits"));
            }
            let account = accounts
                .iter()
                .find(|a| a.id == account_id.trim())
                .ok_or_else(|| {
                    DeskError::validation(format!("unknown Zoom account '{}'", account_id))
                })?;
            if !account.active {
                return Err(DeskError::validation(format!(
                    "Zoom account {} is inactive",
                    account.name
                )));
            }

            let candidate = SlotRequest {
                ticket_id: Some(ticket.id.clone()),
                account_id: account.id.clone(),
                date: meeting.date,
                start: meeting.start_time,
                end: meeting.end_time,
            };
            if let Some(conflict) = find_conflict(&candidate, bookings) {
                return Err(DeskError::Conflict(format!(
                    "{} is already booked by {} on {} {}-{} ({})",
                    account.name,
                    conflict.requester_name,
                    conflict.date,
                    conflict.start,
                    conflict.end,
                    conflict.ticket_number
                )));
            }

            let message = format!(
                "{} on {} {}-{} uses {}. Link: {} Passcode: {} Host key: {}",
                ticket.title,
                meeting.date,
                meeting.start_time,
                meeting.end_time,
                account.name,
                meeting_link,
                passcode,
                host_key
            );
            let details = format!(
                "Approved on {} ({} {}-{})",
                account.name, meeting.date, meeting.start_time, meeting.end_time
            );
            let account_id = account.id.clone();

            if let Some(m) = ticket.meeting_mut() {
                m.status = MeetingStatus::Approved;
                m.account_id = Some(account_id);
                m.meeting_link = Some(meeting_link);
                m.passcode = Some(passcode);
                m.host_key = Some(host_key);
            }
            ticket.timeline.record("approved", actor, details, now);
            ticket.updated_at = now;

            Ok(
                Transition::new(from, MeetingStatus::Approved, "approved").notify(
                    NotificationDraft::to_user(&requester_id, "Meeting approved", message)
                        .kind(NotificationKind::Success)
                        .link(link),
                ),
            )
        }
        MeetingAction::Reject { reason } => {
            let reason = require_text("rejection reason", reason)?;
            let message = format!("{} was rejected: {}", ticket.ticket_number, reason);

            if let Some(m) = ticket.meeting_mut() {
                m.status = MeetingStatus::Rejected;
                m.rejection_reason = Some(reason.clone());
            }
            ticket
                .timeline
                .record("rejected", actor, format!("Rejected: {}", reason), now);
            ticket.updated_at = now;

            Ok(
                Transition::new(from, MeetingStatus::Rejected, "rejected").notify(
                    NotificationDraft::to_user(&requester_id, "Meeting rejected", message)
                        .kind(NotificationKind::Error)
                        .link(link),
                ),
            )
        }
    }
}
