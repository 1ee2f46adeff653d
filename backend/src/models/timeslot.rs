//! Timeslot identifiers, overlap detection and custom timeslot construction.
//!
//! A timeslot display string is one or more meeting fragments joined by
//! `" ; "`, each fragment `"<DAYS> <start> - <end>"` with 24-hour times,
//! e.g. `"MWF 8:00 - 8:50"` or `"M 13:30 - 14:45 ; R 9:00 - 10:15"`.

use std::collections::BTreeSet;
use std::fmt;

use chrono::{NaiveTime, Timelike};
use serde::{Deserialize, Serialize};

use super::identifiers::IdentifierError;

/// Separator between the meetings of a compound timeslot.
pub const MEETING_SEPARATOR: &str = " ; ";

/// Category used for timeslots that are not part of the standard matrix.
pub const OFF_MATRIX_CATEGORY: &str = "off-matrix";

/// Teaching days. Thursday is abbreviated `R`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Weekday {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
}

impl Weekday {
    pub const ALL: [Weekday; 5] = [
        Weekday::Monday,
        Weekday::Tuesday,
        Weekday::Wednesday,
        Weekday::Thursday,
        Weekday::Friday,
    ];

    pub fn abbrev(self) -> char {
        match self {
            Weekday::Monday => 'M',
            Weekday::Tuesday => 'T',
            Weekday::Wednesday => 'W',
            Weekday::Thursday => 'R',
            Weekday::Friday => 'F',
        }
    }

    pub fn from_abbrev(c: char) -> Option<Self> {
        Weekday::ALL.into_iter().find(|d| d.abbrev() == c)
    }
}

/// One fixed meeting time on a set of days.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Meeting {
    pub days: BTreeSet<Weekday>,
    pub start: NaiveTime,
    pub end: NaiveTime,
}

impl Meeting {
    /// Overlap on a shared day: either start lies within the other's
    /// inclusive `[start, end]` interval.
    pub fn overlaps(&self, other: &Meeting) -> bool {
        if self.days.is_disjoint(&other.days) {
            return false;
        }
        (self.start >= other.start && self.start <= other.end)
            || (other.start >= self.start && other.start <= self.end)
    }
}

/// Parsed timeslot used for comparison and overlap checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeslotId {
    pub meetings: Vec<Meeting>,
}

impl TimeslotId {
    pub fn parse(display: &str) -> Result<Self, IdentifierError> {
        parse_timeslot_id(display)
    }

    /// Union of the days of every meeting.
    pub fn days(&self) -> BTreeSet<Weekday> {
        self.meetings
            .iter()
            .flat_map(|m| m.days.iter().copied())
            .collect()
    }

    /// Start of the first listed meeting.
    pub fn start(&self) -> NaiveTime {
        self.meetings[0].start
    }

    /// End of the first listed meeting.
    pub fn end(&self) -> NaiveTime {
        self.meetings[0].end
    }

    pub fn start_hour(&self) -> u32 {
        self.start().hour()
    }

    pub fn start_minute(&self) -> u32 {
        self.start().minute()
    }

    pub fn overlaps(&self, other: &TimeslotId) -> bool {
        self.meetings
            .iter()
            .any(|a| other.meetings.iter().any(|b| a.overlaps(b)))
    }
}

/// Parse a timeslot display string into its meetings.
pub fn parse_timeslot_id(display: &str) -> Result<TimeslotId, IdentifierError> {
    let meetings = display
        .split(MEETING_SEPARATOR)
        .map(|fragment| parse_meeting(display, fragment))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(TimeslotId { meetings })
}

fn parse_meeting(display: &str, fragment: &str) -> Result<Meeting, IdentifierError> {
    let fields: Vec<&str> = fragment.split(' ').collect();
    let [days, start, dash, end] = fields.as_slice() else {
        return Err(IdentifierError::malformed(
            display,
            format!("meeting '{}' is not '<DAYS> <start> - <end>'", fragment),
        ));
    };
    if *dash != "-" {
        return Err(IdentifierError::malformed(
            display,
            format!("meeting '{}' is missing ' - '", fragment),
        ));
    }

    let days = days
        .chars()
        .map(|c| {
            Weekday::from_abbrev(c).ok_or_else(|| {
                IdentifierError::malformed(display, format!("unknown day abbreviation '{}'", c))
            })
        })
        .collect::<Result<BTreeSet<_>, _>>()?;
    if days.is_empty() {
        return Err(IdentifierError::malformed(display, "meeting has no days"));
    }

    Ok(Meeting {
        days,
        start: parse_clock(display, start)?,
        end: parse_clock(display, end)?,
    })
}

/// `H:MM` or `HH:MM`, 24-hour.
fn parse_clock(display: &str, token: &str) -> Result<NaiveTime, IdentifierError> {
    let bad = || IdentifierError::malformed(display, format!("bad time of day '{}'", token));
    let (hour, minute) = token.split_once(':').ok_or_else(bad)?;
    if hour.is_empty() || hour.len() > 2 || minute.len() != 2 {
        return Err(bad());
    }
    let hour: u32 = hour.parse().map_err(|_| bad())?;
    let minute: u32 = minute.parse().map_err(|_| bad())?;
    NaiveTime::from_hms_opt(hour, minute, 0).ok_or_else(bad)
}

/// Day pattern of a matrix category, e.g. `"MWF"` for `"MWF for 50 minutes"`.
pub fn category_day_pattern(category: &str) -> &str {
    category.split(' ').next().unwrap_or("")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Meridiem {
    #[serde(rename = "AM")]
    Am,
    #[serde(rename = "PM")]
    Pm,
}

impl fmt::Display for Meridiem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Meridiem::Am => f.write_str("AM"),
            Meridiem::Pm => f.write_str("PM"),
        }
    }
}

/// 12-hour clock reading as picked in the custom timeslot form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClockReading {
    pub hour: u8,
    pub minute: u8,
    pub meridiem: Meridiem,
}

impl ClockReading {
    pub fn new(hour: u8, minute: u8, meridiem: Meridiem) -> Self {
        Self {
            hour,
            minute,
            meridiem,
        }
    }

    fn validate(&self) -> Result<(), IdentifierError> {
        if !(1..=12).contains(&self.hour) || self.minute > 59 {
            return Err(IdentifierError::malformed(
                format!("{}:{:02} {}", self.hour, self.minute, self.meridiem),
                "hour must be 1-12 and minute 0-59",
            ));
        }
        Ok(())
    }

    /// 24-hour hour field. 12 AM renders as `midnight`, which differs between
    /// start (`"0"`) and end (`"00"`) times.
    fn hour_24(&self, midnight: &str) -> String {
        match self.meridiem {
            Meridiem::Pm if self.hour < 12 => (self.hour + 12).to_string(),
            Meridiem::Am if self.hour == 12 => midnight.to_string(),
            _ => self.hour.to_string(),
        }
    }

    fn start_time(&self) -> String {
        format!("{}:{:02}", self.hour_24("0"), self.minute)
    }

    fn end_time(&self) -> String {
        format!("{}:{:02}", self.hour_24("00"), self.minute)
    }
}

/// One day of a custom timeslot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomMeeting {
    pub day: Weekday,
    pub start: ClockReading,
    pub end: ClockReading,
}

/// Build a custom timeslot display string from per-day 12-hour inputs.
///
/// Meetings are emitted Monday through Friday as `"<D> <start> - <end>"`
/// and joined with `" ; "`.
pub fn build_custom_timeslot(meetings: &[CustomMeeting]) -> Result<String, IdentifierError> {
    if meetings.is_empty() {
        return Err(IdentifierError::malformed("", "no days selected"));
    }

    let mut ordered = meetings.to_vec();
    ordered.sort_by_key(|m| m.day);

    let mut fragments = Vec::with_capacity(ordered.len());
    for meeting in &ordered {
        meeting.start.validate()?;
        meeting.end.validate()?;
        fragments.push(format!(
            "{} {} - {}",
            meeting.day.abbrev(),
            meeting.start.start_time(),
            meeting.end.end_time()
        ));
    }

    Ok(fragments.join(MEETING_SEPARATOR))
}
