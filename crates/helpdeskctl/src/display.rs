//! Terminal output for helpdeskctl. ASCII only.

use helpdesk_shared::api::{HealthResponse, NotificationFeed};
use helpdesk_shared::{NotificationKind, Ticket, TicketDetails, User, WorkOrder};
use owo_colors::OwoColorize;

const SEPARATOR: &str = "------------------------------------------------------------";

/// How a status reads at a glance
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    /// Waiting on someone
    Pending,
    /// Being worked on
    Active,
    Done,
    Failed,
}

/// Tone for a canonical ticket or work order status name
pub fn tone(status: &str) -> Tone {
    match status {
        "submitted" | "pending_review" | "approved" | "assigned" | "requested"
        | "waiting_for_user" => Tone::Pending,
        "in_progress" | "on_hold" | "in_procurement" | "resolved" => Tone::Active,
        "closed" | "delivered" | "completed" => Tone::Done,
        _ => Tone::Failed,
    }
}

/// Status label padded to `width` and coloured by tone
pub fn status_colored(status: &str, width: usize) -> String {
    let padded = format!("{:<width$}", status, width = width);
    match tone(status) {
        Tone::Pending => padded.yellow().to_string(),
        Tone::Active => padded.cyan().to_string(),
        Tone::Done => padded.green().to_string(),
        Tone::Failed => padded.red().to_string(),
    }
}

/// Short description of what a ticket is about
pub fn ticket_subject(ticket: &Ticket) -> String {
    match &ticket.details {
        TicketDetails::Perbaikan(d) => format!("{} [{}]", ticket.title, d.asset_code),
        TicketDetails::ZoomMeeting(m) => format!(
            "{} [{} {}-{}]",
            ticket.title, m.date, m.start_time, m.end_time
        ),
    }
}

pub fn print_ticket_list(tickets: &[Ticket]) {
    if tickets.is_empty() {
        println!("No tickets.");
        return;
    }
    println!(
        "{}",
        format!(
            "{:<22} {:<18} {:<16} {}",
            "NUMBER", "STATUS", "REQUESTER", "SUBJECT"
        )
        .bold()
    );
    for ticket in tickets {
        println!(
            "{:<22} {} {:<16} {}",
            ticket.ticket_number,
            status_colored(ticket.status_label(), 18),
            ticket.requester.name,
            ticket_subject(ticket)
        );
    }
    println!();
    println!("{} ticket(s)", tickets.len());
}

pub fn print_ticket(ticket: &Ticket) {
    println!();
    println!("{}  {}", ticket.ticket_number.bold(), ticket.title);
    println!("{}", SEPARATOR.dimmed());
    println!("  id:         {}", ticket.id);
    println!("  type:       {}", ticket.ticket_type());
    println!("  status:     {}", status_colored(ticket.status_label(), 0));
    println!(
        "  requester:  {} ({})",
        ticket.requester.name, ticket.requester.id
    );
    if let Some(tech) = &ticket.assigned_to {
        println!("  assigned:   {} ({})", tech.name, tech.id);
    }

    match &ticket.details {
        TicketDetails::Perbaikan(d) => {
            println!("  priority:   {:?}", d.priority);
            println!("  asset:      {} {}", d.asset_code, d.asset_nup);
            if !d.location.is_empty() {
                println!("  location:   {}", d.location);
            }
            if let Some(wo) = &d.work_order_id {
                println!("  work order: {}", wo);
            }
            for (label, value) in [
                ("rejected", &d.rejection_reason),
                ("declined", &d.decline_reason),
                ("unrepairable", &d.unrepairable_reason),
                ("resolution", &d.resolution_notes),
            ] {
                if let Some(v) = value {
                    println!("  {:<11} {}", format!("{}:", label), v);
                }
            }
        }
        TicketDetails::ZoomMeeting(m) => {
            println!("  when:       {} {}-{}", m.date, m.start_time, m.end_time);
            println!("  attendees:  {}", m.participants);
            if let Some(account) = &m.account_id {
                println!("  account:    {}", account);
            }
            if let Some(link) = &m.meeting_link {
                println!("  link:       {}", link.cyan());
            }
            if let Some(reason) = &m.rejection_reason {
                println!("  rejected:   {}", reason);
            }
        }
    }

    if !ticket.description.is_empty() {
        println!();
        println!("  {}", ticket.description);
    }

    println!();
    println!("[TIMELINE]");
    for event in ticket.timeline.entries() {
        println!(
            "  {}  {:<22} {:<16} {}",
            event.timestamp.format("%Y-%m-%d %H:%M").dimmed(),
            event.action,
            event.actor,
            event.details
        );
    }
    println!();
}

pub fn print_work_orders(orders: &[WorkOrder]) {
    if orders.is_empty() {
        println!("No work orders.");
        return;
    }
    for order in orders {
        println!(
            "{:<38} {} {:<10} {}",
            order.id,
            status_colored(order.status.as_str(), 16),
            order.kind.as_str(),
            order.ticket_number
        );
    }
}

pub fn print_notifications(feed: &NotificationFeed) {
    println!("{} unread", feed.unread.bold());
    println!("{}", SEPARATOR.dimmed());
    for n in &feed.notifications {
        let marker = if n.read { " " } else { "*" };
        let title = match n.kind {
            NotificationKind::Success => n.title.green().to_string(),
            NotificationKind::Warning => n.title.yellow().to_string(),
            NotificationKind::Error => n.title.red().to_string(),
            NotificationKind::Info => n.title.to_string(),
        };
        println!(
            "{} {}  {}",
            marker,
            n.created_at.format("%Y-%m-%d %H:%M").dimmed(),
            title
        );
        println!("    {}", n.message);
        println!("    {}", n.id.dimmed());
    }
}

/// Approved bookings for one account and day
pub fn print_schedule(account_id: &str, bookings: &[Ticket]) {
    if bookings.is_empty() {
        println!("{} is free all day.", account_id);
        return;
    }
    for ticket in bookings {
        if let Some(m) = ticket.meeting() {
            println!(
                "  {}-{}  {:<22} {}",
                m.start_time,
                m.end_time,
                ticket.ticket_number,
                ticket.requester.name
            );
        }
    }
}

pub fn print_users(users: &[User]) {
    for user in users {
        let roles: Vec<&str> = user.roles.iter().map(|r| r.as_str()).collect();
        println!("{:<12} {:<24} {}", user.id, user.name, roles.join(", ").dimmed());
    }
}

pub fn print_health(server: &str, health: &HealthResponse) {
    println!("[OK] helpdeskd {} at {}", health.version, server);
    println!("  uptime:        {}s", health.uptime_secs);
    println!("  users:         {}", health.counts.users);
    println!(
        "  tickets:       {} ({} open)",
        health.counts.tickets, health.counts.open_tickets
    );
    println!("  work orders:   {}", health.counts.work_orders);
    println!("  zoom accounts: {}", health.counts.zoom_accounts);
}

pub fn display_success(message: &str) {
    println!("[OK] {}", message.green());
}

pub fn display_error(message: &str) {
    eprintln!("[ERROR] {}", message.red());
}
