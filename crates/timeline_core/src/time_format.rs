use chrono::{DateTime, FixedOffset, Local, NaiveDate};

const DISPLAY_FORMAT: &str = "%d/%m/%Y %H:%M:%S";

/// Zone display times are shown in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DisplayZone {
    /// The machine's zone, with the offset in effect at each timestamp.
    #[default]
    Local,
    Fixed(FixedOffset),
}

impl DisplayZone {
    /// `None` when the offset is a day or more.
    pub fn fixed_minutes(minutes: i32) -> Option<Self> {
        FixedOffset::east_opt(minutes.checked_mul(60)?).map(Self::Fixed)
    }
}

/// Formats an ISO 8601 timestamp as `DD/MM/YYYY HH:MM:SS` in `zone`.
/// Returns `None` when the input does not parse.
pub fn format_display_time(raw: &str, zone: &DisplayZone) -> Option<String> {
    let parsed = DateTime::parse_from_rfc3339(raw.trim()).ok()?;
    let shown = match zone {
        DisplayZone::Local => parsed.with_timezone(&Local).format(DISPLAY_FORMAT),
        DisplayZone::Fixed(offset) => parsed.with_timezone(offset).format(DISPLAY_FORMAT),
    };
    Some(shown.to_string())
}

/// `DD/MM/YYYY`, the date column of exports.
pub fn format_extraction_date(date: NaiveDate) -> String {
    date.format("%d/%m/%Y").to_string()
}
