//! Parsing for command-line values that map onto request payloads.

use anyhow::{anyhow, bail, Result};
use helpdesk_shared::ticket::Priority;
use helpdesk_shared::work_order::SparepartItem;

/// `low`, `medium`, `high`, `critical`, or the Indonesian names
pub fn parse_priority(s: &str) -> Result<Priority> {
    serde_json::from_value(serde_json::Value::String(s.trim().to_lowercase()))
        .map_err(|_| anyhow!("unknown priority '{}'", s))
}

/// `NAME:QTY[:UNIT]`, e.g. `Lampu proyektor:1:pcs`. The unit defaults to `pcs`.
pub fn parse_item(s: &str) -> Result<SparepartItem> {
    let mut parts = s.split(':').map(str::trim);
    let name = parts.next().unwrap_or_default();
    let quantity = parts.next();
    let unit = parts.next();
    if parts.next().is_some() {
        bail!("item '{}' has too many ':' separators", s);
    }
    if name.is_empty() {
        bail!("item '{}' has no name", s);
    }
    let quantity: u32 = match quantity {
        Some(q) => q
            .parse()
            .map_err(|_| anyhow!("item '{}': quantity '{}' is not a number", s, q))?,
        None => bail!("item '{}' needs a quantity (NAME:QTY[:UNIT])", s),
    };
    Ok(SparepartItem {
        name: name.to_string(),
        quantity,
        unit: unit.filter(|u| !u.is_empty()).unwrap_or("pcs").to_string(),
        note: None,
    })
}
