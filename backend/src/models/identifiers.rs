//! Section and course identifiers.
//!
//! Section display strings are the ground truth for ordering and grouping
//! throughout the editor. They have the shape
//! `"<PREFIX> <NUMBER> - <Kind> <H?><index><X?>"`, e.g. `"CMS 200 - Lecture H1X"`.
//! Parsing and formatting are exact inverses for every valid display string.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Error raised when a section, course or timeslot display string does not
/// have the expected shape.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Malformed identifier '{input}': {reason}")]
pub struct IdentifierError {
    pub input: String,
    pub reason: String,
}

impl IdentifierError {
    pub fn malformed(input: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            input: input.into(),
            reason: reason.into(),
        }
    }
}

/// Lecture or lab meeting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SectionKind {
    Lecture,
    Lab,
}

impl SectionKind {
    /// Rank used by the ordering rules: lectures before labs.
    pub fn rank(self) -> u8 {
        match self {
            SectionKind::Lecture => 0,
            SectionKind::Lab => 1,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SectionKind::Lecture => "Lecture",
            SectionKind::Lab => "Lab",
        }
    }
}

impl fmt::Display for SectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SectionKind {
    type Err = IdentifierError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Lecture" => Ok(SectionKind::Lecture),
            "Lab" => Ok(SectionKind::Lab),
            other => Err(IdentifierError::malformed(
                other,
                "section kind must be 'Lecture' or 'Lab'",
            )),
        }
    }
}

/// Course identity: the `(prefix, number)` projection of a section.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CourseId {
    pub prefix: String,
    pub number: String,
}

impl CourseId {
    pub fn new(prefix: impl Into<String>, number: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            number: number.into(),
        }
    }

    /// Display name with the Holt / crosslisted suffix.
    pub fn display_name(&self, holt: bool, crosslisted: bool) -> String {
        course_display_name(self, holt, crosslisted)
    }
}

impl fmt::Display for CourseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.prefix, self.number)
    }
}

/// Structured section identifier.
///
/// Serializes as its display string so that wire payloads stay identical to
/// what the panes show.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SectionId {
    pub prefix: String,
    pub number: String,
    pub kind: SectionKind,
    pub holt: bool,
    pub crosslisted: bool,
    pub index: u32,
}

impl SectionId {
    pub fn new(
        prefix: impl Into<String>,
        number: impl Into<String>,
        kind: SectionKind,
        index: u32,
    ) -> Self {
        Self {
            prefix: prefix.into(),
            number: number.into(),
            kind,
            holt: false,
            crosslisted: false,
            index,
        }
    }

    pub fn with_holt(mut self, holt: bool) -> Self {
        self.holt = holt;
        self
    }

    pub fn with_crosslisted(mut self, crosslisted: bool) -> Self {
        self.crosslisted = crosslisted;
        self
    }

    pub fn parse(display: &str) -> Result<Self, IdentifierError> {
        parse_section_id(display)
    }

    pub fn course(&self) -> CourseId {
        derive_course_id(self)
    }

    /// Course display name carrying this section's own flags.
    pub fn course_name(&self) -> String {
        course_display_name(&self.course(), self.holt, self.crosslisted)
    }

    /// True when `other` names the same `(prefix, number)` course.
    pub fn same_course(&self, other: &CourseId) -> bool {
        self.prefix == other.prefix && self.number == other.number
    }

    /// True when both name the same `(prefix, number, kind, index)`,
    /// whatever their Holt and crosslisted flags.
    pub fn same_slot(&self, other: &SectionId) -> bool {
        self.prefix == other.prefix
            && self.number == other.number
            && self.kind == other.kind
            && self.index == other.index
    }
}

impl fmt::Display for SectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} - {} {}{}{}",
            self.prefix,
            self.number,
            self.kind,
            if self.holt { "H" } else { "" },
            self.index,
            if self.crosslisted { "X" } else { "" },
        )
    }
}

impl FromStr for SectionId {
    type Err = IdentifierError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_section_id(s)
    }
}

impl TryFrom<String> for SectionId {
    type Error = IdentifierError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        parse_section_id(&value)
    }
}

impl From<SectionId> for String {
    fn from(value: SectionId) -> Self {
        value.to_string()
    }
}

/// Parse a section display string.
///
/// The string is split on single spaces: field 0 is the prefix, field 1 the
/// number, field 2 a literal `-`, field 3 the kind and field 4 the
/// `H?<index>X?` token.
pub fn parse_section_id(display: &str) -> Result<SectionId, IdentifierError> {
    let fields: Vec<&str> = display.split(' ').collect();
    if fields.len() != 5 {
        return Err(IdentifierError::malformed(
            display,
            format!("expected 5 space-separated fields, found {}", fields.len()),
        ));
    }

    let prefix = fields[0];
    let number = fields[1];
    if prefix.is_empty() || number.is_empty() {
        return Err(IdentifierError::malformed(
            display,
            "prefix and number must be non-empty",
        ));
    }
    if fields[2] != "-" {
        return Err(IdentifierError::malformed(
            display,
            "expected '-' between course and kind",
        ));
    }

    let kind: SectionKind = fields[3]
        .parse()
        .map_err(|e: IdentifierError| IdentifierError::malformed(display, e.reason))?;
    let (holt, index, crosslisted) = parse_index_token(fields[4])
        .ok_or_else(|| IdentifierError::malformed(display, "bad section index token"))?;

    Ok(SectionId {
        prefix: prefix.to_string(),
        number: number.to_string(),
        kind,
        holt,
        crosslisted,
        index,
    })
}

/// `H?<digits>X?` with a positive index and no leading zeros.
fn parse_index_token(token: &str) -> Option<(bool, u32, bool)> {
    let (holt, rest) = match token.strip_prefix('H') {
        Some(rest) => (true, rest),
        None => (false, token),
    };
    let (digits, crosslisted) = match rest.strip_suffix('X') {
        Some(digits) => (digits, true),
        None => (rest, false),
    };
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) || digits.starts_with('0')
    {
        return None;
    }
    let index = digits.parse::<u32>().ok()?;
    Some((holt, index, crosslisted))
}

/// Format a section identifier; inverse of [`parse_section_id`].
pub fn format_section_id(section: &SectionId) -> String {
    section.to_string()
}

/// Drop kind and index, keeping the `(prefix, number)` course identity.
pub fn derive_course_id(section: &SectionId) -> CourseId {
    CourseId::new(section.prefix.clone(), section.number.clone())
}

/// Course display name: `"CMS 200"`, `"CMS 200 - H"`, `"CMS 200 - X"` or `"CMS 200 - H/X"`.
pub fn course_display_name(course: &CourseId, holt: bool, crosslisted: bool) -> String {
    match (holt, crosslisted) {
        (false, false) => course.to_string(),
        (true, false) => format!("{} - H", course),
        (false, true) => format!("{} - X", course),
        (true, true) => format!("{} - H/X", course),
    }
}

/// Parse any of the four course display variants back into the course and
/// its `(holt, crosslisted)` flags.
pub fn parse_course_name(display: &str) -> Result<(CourseId, bool, bool), IdentifierError> {
    let fields: Vec<&str> = display.split(' ').collect();
    let (prefix, number, flags) = match fields.as_slice() {
        [prefix, number] => (*prefix, *number, None),
        [prefix, number, "-", flags] => (*prefix, *number, Some(*flags)),
        _ => {
            return Err(IdentifierError::malformed(
                display,
                "expected '<PREFIX> <NUMBER>' optionally followed by ' - H', ' - X' or ' - H/X'",
            ))
        }
    };
    if prefix.is_empty() || number.is_empty() {
        return Err(IdentifierError::malformed(
            display,
            "prefix and number must be non-empty",
        ));
    }

    let (holt, crosslisted) = match flags {
        None => (false, false),
        Some("H") => (true, false),
        Some("X") => (false, true),
        Some("H/X") => (true, true),
        Some(other) => {
            return Err(IdentifierError::malformed(
                display,
                format!("unknown course flag '{}'", other),
            ))
        }
    };

    Ok((CourseId::new(prefix, number), holt, crosslisted))
}
