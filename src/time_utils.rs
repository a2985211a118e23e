use std::sync::OnceLock;

use time::OffsetDateTime;
use time::format_description::FormatItem;

fn ts_ui_format() -> Option<&'static [FormatItem<'static>]> {
    static FMT: OnceLock<Option<Vec<FormatItem<'static>>>> = OnceLock::new();
    FMT.get_or_init(|| {
        time::format_description::parse(
            "[year]-[month repr:numerical padding:zero]-[day padding:zero] [hour padding:zero]:[minute padding:zero]:[second padding:zero] UTC",
        )
        .ok()
    })
    .as_deref()
}

/// Renders a `create_utc_timestamp` (float seconds) for display. Values
/// outside the representable range yield `None`.
pub fn format_utc_timestamp(ts: f64) -> Option<String> {
    if !ts.is_finite() {
        return None;
    }
    let nanos = (ts * 1_000_000_000.0).round();
    if nanos.abs() >= i128::MAX as f64 {
        return None;
    }
    let dt = OffsetDateTime::from_unix_timestamp_nanos(nanos as i128).ok()?;
    dt.format(ts_ui_format()?).ok()
}

/// Like `format_utc_timestamp`, falling back to the raw number.
pub fn display_utc_timestamp(ts: f64) -> String {
    format_utc_timestamp(ts).unwrap_or_else(|| ts.to_string())
}

#[cfg(test)]
#[path = "tests/time_utils_tests.rs"]
mod tests;
