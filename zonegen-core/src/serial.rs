use chrono::{Local, NaiveDateTime, Timelike};

/// SOA serial shared by every zone produced in one regeneration run.
///
/// The value is the local date as `YYYYMMDD` with the quarter-hour-of-day
/// index (0-95) appended as decimal digits, so serials stay non-decreasing
/// across successive runs within a day as long as the wall clock does.
/// The index is not zero-padded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ZoneSerial(String);

impl ZoneSerial {
    /// Serial for the current local time.
    pub fn now() -> Self {
        Self::from_datetime(Local::now().naive_local())
    }

    /// Serial for an explicit timestamp.
    pub fn from_datetime(at: NaiveDateTime) -> Self {
        let quarter = 4 * at.hour() + at.minute() / 15;
        ZoneSerial(format!("{}{}", at.format("%Y%m%d"), quarter))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The serial as the fixed-width field embedded in SOA lines.
    pub fn padded(&self) -> String {
        format!("{:<12}", self.0)
    }
}

impl std::fmt::Display for ZoneSerial {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
