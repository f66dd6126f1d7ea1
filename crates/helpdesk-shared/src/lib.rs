//! Shared types and lifecycle rules for the service desk.
//!
//! Everything here is pure: rules take the current entity, the acting
//! identity and a timestamp, and either mutate the entity and describe the
//! side effects, or fail without touching it. Persistence and delivery live
//! in `helpdeskd`.

pub mod api;
pub mod booking;
pub mod clock;
pub mod error;
pub mod identity;
pub mod inventory;
pub mod notification;
pub mod repair;
pub mod status;
pub mod ticket;
pub mod ticket_number;
pub mod timeline;
pub mod transition;
pub mod work_order;

pub use error::{DeskError, DeskResult};
pub use identity::{Actor, PersonRef, Requester, Role, User, UserLookup};
pub use notification::{Notification, NotificationDraft, NotificationKind, Recipient};
pub use status::{MeetingStatus, RepairStatus, WorkOrderStatus};
pub use ticket::{Ticket, TicketDetails, TicketType};
pub use timeline::{Timeline, TimelineEvent};
pub use transition::Transition;
pub use work_order::{WorkOrder, WorkOrderKind};

/// Crate version, shared by daemon and CLI
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Header carrying the acting user id on HTTP requests
pub const USER_HEADER: &str = "x-user-id";

/// State directory for the daemon
pub const STATE_DIR: &str = "/var/lib/helpdesk";

/// Default daemon address
pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:7870";
