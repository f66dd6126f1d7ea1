//! Human-readable ticket numbers: `TKT-<PR|ZM>-<YYYYMMDD>-<4 digits>`.
//!
//! The suffix is random and no uniqueness check is made; collisions on the
//! same day are possible and tolerated. Tickets are keyed by `id`.

use chrono::NaiveDate;
use rand::Rng;
use regex::Regex;
use std::sync::OnceLock;

use crate::ticket::TicketType;

fn pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^TKT-(PR|ZM)-\d{8}-\d{4}$").expect("static regex"))
}

/// Generate a ticket number with the thread-local RNG
pub fn generate(ticket_type: TicketType, date: NaiveDate) -> String {
    generate_with(ticket_type, date, &mut rand::thread_rng())
}

/// Generate a ticket number with a caller-supplied RNG
pub fn generate_with<R: Rng + ?Sized>(ticket_type: TicketType, date: NaiveDate, rng: &mut R) -> String {
    let suffix: u16 = rng.gen_range(0..10_000);
    format!(
        "TKT-{}-{}-{:04}",
        ticket_type.code(),
        date.format("%Y%m%d"),
        suffix
    )
}

pub fn is_valid(number: &str) -> bool {
    pattern().is_match(number)
}
