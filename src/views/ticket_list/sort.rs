use std::cmp::Ordering;

use crate::model::TicketId;

/// Numeric sort key of a ticket id: the digits of the timestamp part before
/// the first `H`, with the fraction after `.` right-padded to microseconds so
/// stamps written without one still compare. Ids without digits, or whose
/// digits overflow, have none.
pub fn sort_key(id: &str) -> Option<u128> {
    let stamp = id.split('H').next().unwrap_or("");
    let (whole, frac) = stamp.split_once('.').unwrap_or((stamp, ""));
    let digits = |part: &str| -> String { part.chars().filter(|c| c.is_ascii_digit()).collect() };
    let whole = digits(whole);
    if whole.is_empty() {
        return None;
    }
    format!("{whole}{:0<6}", digits(frac)).parse().ok()
}

/// Newest first unless `ascending`. Ids without a key always come last in
/// their original order.
pub fn sort_tickets(ids: &[TicketId], ascending: bool) -> Vec<TicketId> {
    let mut keyed: Vec<(Option<u128>, &TicketId)> =
        ids.iter().map(|id| (sort_key(id.as_str()), id)).collect();
    keyed.sort_by(|(a, _), (b, _)| match (a, b) {
        (Some(a), Some(b)) if ascending => a.cmp(b),
        (Some(a), Some(b)) => b.cmp(a),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    });
    keyed.into_iter().map(|(_, id)| id.clone()).collect()
}

#[cfg(test)]
#[path = "../../tests/views/sort_tests.rs"]
mod tests;
