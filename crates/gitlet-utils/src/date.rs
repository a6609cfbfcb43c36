use bstr::{BStr, BString, ByteSlice, ByteVec};
use chrono::Local;

use crate::error::UtilError;
use crate::Result;

/// A git date: seconds since the Unix epoch plus a timezone offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GitDate {
    /// Seconds since Unix epoch.
    pub timestamp: i64,
    /// Timezone offset in minutes from UTC (e.g., -300 for EST).
    pub tz_offset: i32,
}

/// Git serializes timezone offsets as a signed decimal `±HHMM`
/// (so -0130 is stored as the integer -130). These convert between
/// that representation and plain minutes.
fn tz_offset_to_minutes(tz: i32) -> i32 {
    let sign = if tz < 0 { -1 } else { 1 };
    let abs = tz.unsigned_abs() as i32;
    sign * ((abs / 100) * 60 + abs % 100)
}

fn minutes_to_tz_offset(minutes: i32) -> i32 {
    let sign = if minutes < 0 { -1 } else { 1 };
    let abs = minutes.unsigned_abs() as i32;
    sign * ((abs / 60) * 100 + abs % 60)
}

impl GitDate {
    /// Create a GitDate from a Unix timestamp and timezone offset in minutes.
    pub fn new(timestamp: i64, tz_offset_minutes: i32) -> Self {
        Self {
            timestamp,
            tz_offset: tz_offset_minutes,
        }
    }

    /// The current time with the local timezone offset.
    pub fn now() -> Self {
        let now = Local::now();
        Self {
            timestamp: now.timestamp(),
            tz_offset: now.offset().local_minus_utc() / 60,
        }
    }

    /// Parse git's raw format: `"<epoch-seconds> ±HHMM"` (offset optional).
    pub fn parse_raw(input: &str) -> Result<Self> {
        let input = input.trim();
        let mut parts = input.splitn(2, ' ');

        let ts_str = parts.next().unwrap_or("");
        let timestamp: i64 = ts_str
            .parse()
            .map_err(|_| UtilError::DateParse(format!("invalid timestamp: '{ts_str}'")))?;

        let tz_offset = match parts.next() {
            Some(tz_str) => {
                let tz_str = tz_str.trim();
                let tz_int: i32 = tz_str.parse().map_err(|_| {
                    UtilError::DateParse(format!("invalid timezone: '{tz_str}'"))
                })?;
                tz_offset_to_minutes(tz_int)
            }
            None => 0,
        };

        Ok(Self {
            timestamp,
            tz_offset,
        })
    }

    /// Format in git's raw form: `"<epoch-seconds> ±HHMM"`.
    pub fn to_raw(&self) -> String {
        format!("{} {:+05}", self.timestamp, minutes_to_tz_offset(self.tz_offset))
    }
}

/// An identity line as it appears in commit and tag headers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signature {
    pub name: BString,
    pub email: BString,
    pub date: GitDate,
}

impl Signature {
    /// Create a signature with the current time.
    pub fn now(name: impl Into<BString>, email: impl Into<BString>) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            date: GitDate::now(),
        }
    }

    /// Parse from git format: `Name <email> timestamp ±HHMM`.
    pub fn parse(input: &BStr) -> Result<Self> {
        let input = input.as_bytes();

        // Split off the date after the last '>', then the email within '<' '>'.
        let gt_pos = input
            .iter()
            .rposition(|&b| b == b'>')
            .ok_or_else(|| UtilError::DateParse("missing '>' in signature".into()))?;
        let lt_pos = input[..gt_pos]
            .iter()
            .rposition(|&b| b == b'<')
            .ok_or_else(|| UtilError::DateParse("missing '<' in signature".into()))?;

        let name = input[..lt_pos].trim();
        let email = &input[lt_pos + 1..gt_pos];

        let date_str = input[gt_pos + 1..].trim();
        let date_str = std::str::from_utf8(date_str)
            .map_err(|_| UtilError::DateParse("non-UTF-8 date in signature".into()))?;
        let date = GitDate::parse_raw(date_str)?;

        Ok(Self {
            name: BString::from(name),
            email: BString::from(email),
            date,
        })
    }

    /// Format in git's canonical form: `Name <email> timestamp ±HHMM`.
    pub fn to_bytes(&self) -> BString {
        let mut out = BString::new(Vec::new());
        out.push_str(&self.name);
        out.push_str(b" <");
        out.push_str(&self.email);
        out.push_str(b"> ");
        out.push_str(self.date.to_raw().as_bytes());
        out
    }
}
