use time::macros::format_description;
use time::{format_description::well_known::Rfc3339, Date, Duration, Month, PrimitiveDateTime};

pub(crate) fn primitive_now_utc() -> PrimitiveDateTime {
    let now = time::OffsetDateTime::now_utc();
    PrimitiveDateTime::new(now.date(), now.time())
}

pub(crate) fn format_primitive(value: PrimitiveDateTime) -> String {
    value.assume_utc().format(&Rfc3339).unwrap_or_else(|_| value.assume_utc().to_string())
}

pub(crate) fn format_date(value: Date) -> String {
    value
        .format(format_description!("[year]-[month]-[day]"))
        .unwrap_or_else(|_| value.to_string())
}

/// Parses a calendar date (`YYYY-MM-DD`). A full RFC 3339 timestamp is
/// accepted too and truncated to its date part.
pub(crate) fn parse_date(value: &str) -> Option<Date> {
    let trimmed = value.trim();
    if let Ok(date) = Date::parse(trimmed, format_description!("[year]-[month]-[day]")) {
        return Some(date);
    }
    time::OffsetDateTime::parse(trimmed, &Rfc3339).ok().map(|value| value.date())
}

/// Parses an RFC 3339 timestamp into UTC. A bare date maps to midnight.
pub(crate) fn parse_timestamp(value: &str) -> Option<PrimitiveDateTime> {
    let trimmed = value.trim();
    if let Ok(parsed) = time::OffsetDateTime::parse(trimmed, &Rfc3339) {
        let utc = parsed.to_offset(time::UtcOffset::UTC);
        return Some(PrimitiveDateTime::new(utc.date(), utc.time()));
    }
    Date::parse(trimmed, format_description!("[year]-[month]-[day]"))
        .ok()
        .map(|date| date.midnight())
}

/// Start of the reporting window: `days` back from `now`.
pub(crate) fn window_start(now: PrimitiveDateTime, days: i64) -> PrimitiveDateTime {
    now - Duration::days(days)
}

pub(crate) fn month_start(date: Date) -> Date {
    date.replace_day(1).unwrap_or(date)
}

/// First day of the month `delta` months away from `date`'s month.
pub(crate) fn shift_months(date: Date, delta: i32) -> Date {
    let index = date.year() * 12 + i32::from(u8::from(date.month())) - 1 + delta;
    let year = index.div_euclid(12);
    let month = Month::try_from((index.rem_euclid(12) + 1) as u8).unwrap_or(Month::January);
    Date::from_calendar_date(year, month, 1).unwrap_or(date)
}

/// Calendar month boundaries `[start, end)` for the trailing `count` months,
/// ending with the month containing `today`. Oldest first.
pub(crate) fn trailing_months(today: Date, count: u32) -> Vec<(Date, Date)> {
    let current = month_start(today);
    (0..count as i32)
        .rev()
        .map(|back| {
            let start = shift_months(current, -back);
            (start, shift_months(start, 1))
        })
        .collect()
}

pub(crate) fn month_label(month_start: Date) -> String {
    format!("{:04}-{:02}", month_start.year(), u8::from(month_start.month()))
}
