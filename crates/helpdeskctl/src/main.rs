//! helpdeskctl - command-line client for the service desk daemon

use anyhow::{bail, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use helpdesk_shared::booking::{MeetingAction, NewMeetingTicket};
use helpdesk_shared::clock::ClockTime;
use helpdesk_shared::repair::{NewRepairTicket, RepairAction};
use helpdesk_shared::work_order::{NewWorkOrder, WorkOrderAction};
use helpdesk_shared::{Ticket, TicketType, WorkOrder, VERSION};
use helpdeskctl::client::{DeskClient, TicketQuery, WorkOrderQuery, DEFAULT_SERVER};
use helpdeskctl::{display, input};

#[derive(Parser)]
#[command(name = "helpdeskctl")]
#[command(about = "IT service desk - repair tickets and Zoom bookings", long_about = None)]
#[command(version = VERSION)]
#[command(disable_help_subcommand = true)]
struct Cli {
    /// Daemon URL
    #[arg(long, global = true, env = "HELPDESK_SERVER", default_value = DEFAULT_SERVER)]
    server: String,

    /// Acting user id
    #[arg(long, short = 'u', global = true, env = "HELPDESK_USER")]
    user: Option<String>,

    /// Print raw JSON instead of formatted output
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show daemon health and counts
    Health,

    /// List users and their roles
    Users,

    /// List tickets
    Tickets {
        /// perbaikan or zoom_meeting
        #[arg(long = "type")]
        ticket_type: Option<String>,

        /// Status name (legacy names accepted)
        #[arg(long)]
        status: Option<String>,

        /// Assigned technician id
        #[arg(long)]
        assignee: Option<String>,

        /// Requester id
        #[arg(long)]
        requester: Option<String>,

        /// Only tickets requested by or assigned to --user
        #[arg(long)]
        mine: bool,
    },

    /// Show one ticket with its timeline
    Show { id: String },

    /// Report a broken asset
    SubmitRepair {
        title: String,

        /// Asset code, e.g. PRJ-0012
        #[arg(long)]
        asset: String,

        /// Asset NUP (registration number)
        #[arg(long, default_value = "")]
        nup: String,

        #[arg(long, default_value = "")]
        location: String,

        /// low, medium, high or critical
        #[arg(long, default_value = "medium")]
        priority: String,

        #[arg(long, default_value = "")]
        description: String,
    },

    /// Request a Zoom meeting booking
    BookMeeting {
        title: String,

        /// YYYY-MM-DD
        #[arg(long)]
        date: NaiveDate,

        /// HH:MM
        #[arg(long)]
        start: ClockTime,

        /// HH:MM
        #[arg(long)]
        end: ClockTime,

        /// Expected participants
        #[arg(long)]
        participants: u32,

        #[arg(long)]
        co_host: Option<String>,

        #[arg(long, default_value_t = 0)]
        breakout_rooms: u32,

        #[arg(long, default_value = "")]
        description: String,
    },

    /// Approve a repair ticket or a meeting booking
    Approve {
        id: String,

        /// Approval notes (repair)
        #[arg(long)]
        notes: Option<String>,

        /// Zoom account id (meeting)
        #[arg(long)]
        account: Option<String>,

        /// Meeting link (meeting)
        #[arg(long)]
        link: Option<String>,

        /// Passcode (meeting)
        #[arg(long)]
        passcode: Option<String>,

        /// Six-digit host key (meeting)
        #[arg(long)]
        host_key: Option<String>,
    },

    /// Reject a repair ticket or a meeting booking
    Reject {
        id: String,

        #[arg(long)]
        reason: String,
    },

    /// Assign an approved repair ticket to a technician
    Assign { id: String, technician: String },

    /// Accept an assignment (technician)
    Accept { id: String },

    /// Hand an assignment back to the admins (technician)
    Decline {
        id: String,

        #[arg(long)]
        reason: String,
    },

    /// Continue a held repair after its work order failed or was cancelled
    Resume {
        id: String,

        #[arg(long)]
        notes: Option<String>,
    },

    /// Close a repair as beyond repair (technician)
    Unrepairable {
        id: String,

        #[arg(long)]
        reason: String,

        #[arg(long)]
        problem_type: Option<String>,
    },

    /// Ask the requester to collect a repaired asset (technician)
    AwaitUser {
        id: String,

        #[arg(long)]
        notes: Option<String>,
    },

    /// Mark a repair finished (technician)
    Resolve {
        id: String,

        #[arg(long)]
        notes: Option<String>,

        #[arg(long)]
        problem_type: Option<String>,
    },

    /// Confirm receipt of a repaired asset (requester)
    Confirm { id: String },

    /// List work orders
    WorkOrders {
        #[arg(long)]
        ticket: Option<String>,

        #[arg(long)]
        status: Option<String>,
    },

    /// Request spare parts for an in-progress repair; the ticket goes on hold
    RequestSparepart {
        ticket: String,

        /// NAME:QTY[:UNIT], repeatable
        #[arg(long = "item", required = true)]
        items: Vec<String>,

        #[arg(long)]
        problem_type: Option<String>,
    },

    /// Request outside vendor service for an in-progress repair
    RequestVendor {
        ticket: String,

        #[arg(long)]
        description: String,

        #[arg(long)]
        problem_type: Option<String>,
    },

    /// Start procurement on a requested work order
    Procure {
        id: String,

        #[arg(long)]
        vendor: Option<String>,

        #[arg(long)]
        contact: Option<String>,

        #[arg(long)]
        notes: Option<String>,
    },

    /// Record spare parts as delivered
    Deliver {
        id: String,

        #[arg(long)]
        quantity: u32,

        #[arg(long)]
        remarks: Option<String>,
    },

    /// Record vendor work as completed
    Complete {
        id: String,

        #[arg(long)]
        notes: String,

        #[arg(long)]
        vendor: Option<String>,

        #[arg(long)]
        contact: Option<String>,
    },

    /// Mark a work order failed
    Fail {
        id: String,

        #[arg(long)]
        reason: String,
    },

    /// Cancel a work order
    CancelOrder {
        id: String,

        #[arg(long)]
        reason: String,
    },

    /// Show notifications for --user
    Notifications {
        /// Mark one notification read
        #[arg(long, conflicts_with = "read_all")]
        read: Option<String>,

        /// Mark every notification read
        #[arg(long)]
        read_all: bool,
    },

    /// Approved bookings on a Zoom account for a day
    Schedule {
        account: String,

        /// YYYY-MM-DD
        date: NaiveDate,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    if let Err(e) = run(cli).await {
        display::display_error(&format!("{:#}", e));
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let client = DeskClient::new(&cli.server, cli.user.clone())?;
    let json = cli.json;

    match cli.command {
        Commands::Health => {
            let health = client.health().await?;
            if json {
                return print_json(&health);
            }
            display::print_health(client.base_url(), &health);
        }
        Commands::Users => {
            let users = client.users().await?;
            if json {
                return print_json(&users);
            }
            display::print_users(&users);
        }
        Commands::Tickets {
            ticket_type,
            status,
            assignee,
            requester,
            mine,
        } => {
            let mut query = TicketQuery {
                ticket_type,
                status,
                assignee,
                requester,
            };
            let tickets = if mine {
                let me = require_user(&cli.user)?;
                query.requester = Some(me.to_string());
                let mut tickets = client.tickets(&query).await?;
                query.requester = None;
                query.assignee = Some(me.to_string());
                for t in client.tickets(&query).await? {
                    if !tickets.iter().any(|known| known.id == t.id) {
                        tickets.push(t);
                    }
                }
                tickets.sort_by(|a, b| b.created_at.cmp(&a.created_at));
                tickets
            } else {
                client.tickets(&query).await?
            };
            if json {
                return print_json(&tickets);
            }
            display::print_ticket_list(&tickets);
        }
        Commands::Show { id } => {
            let ticket = client.ticket(&id).await?;
            if json {
                return print_json(&ticket);
            }
            display::print_ticket(&ticket);
        }
        Commands::SubmitRepair {
            title,
            asset,
            nup,
            location,
            priority,
            description,
        } => {
            let request = NewRepairTicket {
                title,
                description,
                priority: input::parse_priority(&priority)?,
                asset_code: asset,
                asset_nup: nup,
                location,
                attachments: vec![],
            };
            report_created(&client.submit_repair(&request).await?, json)?;
        }
        Commands::BookMeeting {
            title,
            date,
            start,
            end,
            participants,
            co_host,
            breakout_rooms,
            description,
        } => {
            let request = NewMeetingTicket {
                title,
                description,
                date,
                start_time: start,
                end_time: end,
                participants,
                co_host,
                breakout_rooms,
                attachments: vec![],
            };
            report_created(&client.submit_meeting(&request).await?, json)?;
        }
        Commands::Approve {
            id,
            notes,
            account,
            link,
            passcode,
            host_key,
        } => {
            let ticket = client.ticket(&id).await?;
            let updated = match ticket.ticket_type() {
                TicketType::Perbaikan => {
                    client
                        .repair_action(&id, &RepairAction::Approve { notes })
                        .await?
                }
                TicketType::ZoomMeeting => {
                    let (Some(account_id), Some(meeting_link), Some(passcode), Some(host_key)) =
                        (account, link, passcode, host_key)
                    else {
                        bail!("approving a meeting needs --account, --link, --passcode and --host-key");
                    };
                    let action = MeetingAction::Approve {
                        account_id,
                        meeting_link,
                        passcode,
                        host_key,
                    };
                    client.meeting_action(&id, &action).await?
                }
            };
            report(&updated, json)?;
        }
        Commands::Reject { id, reason } => {
            let ticket = client.ticket(&id).await?;
            let updated = match ticket.ticket_type() {
                TicketType::Perbaikan => {
                    client
                        .repair_action(&id, &RepairAction::Reject { reason })
                        .await?
                }
                TicketType::ZoomMeeting => {
                    client
                        .meeting_action(&id, &MeetingAction::Reject { reason })
                        .await?
                }
            };
            report(&updated, json)?;
        }
        Commands::Assign { id, technician } => {
            let action = RepairAction::Assign {
                technician_id: technician,
            };
            report(&client.repair_action(&id, &action).await?, json)?;
        }
        Commands::Accept { id } => {
            report(&client.repair_action(&id, &RepairAction::Accept).await?, json)?;
        }
        Commands::Decline { id, reason } => {
            let action = RepairAction::Decline { reason };
            report(&client.repair_action(&id, &action).await?, json)?;
        }
        Commands::Resume { id, notes } => {
            let action = RepairAction::Resume { notes };
            report(&client.repair_action(&id, &action).await?, json)?;
        }
        Commands::Unrepairable {
            id,
            reason,
            problem_type,
        } => {
            let action = RepairAction::MarkUnrepairable {
                reason,
                problem_type,
            };
            report(&client.repair_action(&id, &action).await?, json)?;
        }
        Commands::AwaitUser { id, notes } => {
            let action = RepairAction::AwaitUser { notes };
            report(&client.repair_action(&id, &action).await?, json)?;
        }
        Commands::Resolve {
            id,
            notes,
            problem_type,
        } => {
            let action = RepairAction::Resolve {
                notes,
                problem_type,
            };
            report(&client.repair_action(&id, &action).await?, json)?;
        }
        Commands::Confirm { id } => {
            report(&client.repair_action(&id, &RepairAction::Confirm).await?, json)?;
        }
        Commands::WorkOrders { ticket, status } => {
            let query = WorkOrderQuery {
                ticket_id: ticket,
                status,
            };
            let orders = client.work_orders(&query).await?;
            if json {
                return print_json(&orders);
            }
            display::print_work_orders(&orders);
        }
        Commands::RequestSparepart {
            ticket,
            items,
            problem_type,
        } => {
            let items = items
                .iter()
                .map(|i| input::parse_item(i))
                .collect::<Result<Vec<_>>>()?;
            let request = NewWorkOrder::Sparepart {
                items,
                problem_type,
            };
            report_order(&client.request_work_order(&ticket, &request).await?, json)?;
        }
        Commands::RequestVendor {
            ticket,
            description,
            problem_type,
        } => {
            let request = NewWorkOrder::Vendor {
                description,
                problem_type,
            };
            report_order(&client.request_work_order(&ticket, &request).await?, json)?;
        }
        Commands::Procure {
            id,
            vendor,
            contact,
            notes,
        } => {
            let action = WorkOrderAction::StartProcurement {
                vendor_name: vendor,
                vendor_contact: contact,
                notes,
            };
            report_order(&client.work_order_action(&id, &action).await?, json)?;
        }
        Commands::Deliver {
            id,
            quantity,
            remarks,
        } => {
            let action = WorkOrderAction::MarkDelivered {
                received_quantity: quantity,
                remarks,
            };
            report_order(&client.work_order_action(&id, &action).await?, json)?;
        }
        Commands::Complete {
            id,
            notes,
            vendor,
            contact,
        } => {
            let action = WorkOrderAction::MarkCompleted {
                completion_notes: notes,
                vendor_name: vendor,
                vendor_contact: contact,
            };
            report_order(&client.work_order_action(&id, &action).await?, json)?;
        }
        Commands::Fail { id, reason } => {
            let action = WorkOrderAction::Fail { reason };
            report_order(&client.work_order_action(&id, &action).await?, json)?;
        }
        Commands::CancelOrder { id, reason } => {
            let action = WorkOrderAction::Cancel { reason };
            report_order(&client.work_order_action(&id, &action).await?, json)?;
        }
        Commands::Notifications { read, read_all } => {
            require_user(&cli.user)?;
            if let Some(id) = read {
                client.mark_read(&id).await?;
                display::display_success("Marked read");
            } else if read_all {
                let marked = client.mark_all_read().await?;
                display::display_success(&format!("Marked {} notification(s) read", marked));
            } else {
                let feed = client.notifications().await?;
                if json {
                    return print_json(&feed);
                }
                display::print_notifications(&feed);
            }
        }
        Commands::Schedule { account, date } => {
            let bookings = client.schedule(&account, date).await?;
            if json {
                return print_json(&bookings);
            }
            display::print_schedule(&account, &bookings);
        }
    }
    Ok(())
}

fn require_user(user: &Option<String>) -> Result<&str> {
    match user.as_deref() {
        Some(u) => Ok(u),
        None => bail!("this command needs --user (or HELPDESK_USER)"),
    }
}

/// Print the outcome of a lifecycle action
fn report(ticket: &Ticket, json: bool) -> Result<()> {
    if json {
        return print_json(ticket);
    }
    display::display_success(&format!(
        "{} is now {}",
        ticket.ticket_number,
        ticket.status_label()
    ));
    Ok(())
}

fn report_created(ticket: &Ticket, json: bool) -> Result<()> {
    if json {
        return print_json(ticket);
    }
    display::display_success(&format!(
        "Created {} ({})",
        ticket.ticket_number, ticket.id
    ));
    Ok(())
}

fn report_order(order: &WorkOrder, json: bool) -> Result<()> {
    if json {
        return print_json(order);
    }
    display::display_success(&format!(
        "Work order {} for {} is now {}",
        order.id,
        order.ticket_number,
        order.status.as_str()
    ));
    Ok(())
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
