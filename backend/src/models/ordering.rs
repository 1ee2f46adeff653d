//! Ordering rules for section and timeslot listings.
//!
//! Every pane sorts with these comparators so that the same data always
//! renders in the same order. Comparators are pure and total.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use log::warn;
use serde::{Deserialize, Serialize};

use super::identifiers::{course_display_name, parse_section_id, CourseId, SectionId};
use super::CourseName;
use super::timeslot::parse_timeslot_id;

/// Precedence between section kind and section index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SectionOrdering {
    /// `(index, kind)`: `Lecture 1, Lab 1, Lecture 2`.
    IndexFirst,
    /// `(kind, index)`: `Lecture 1, Lecture 2, Lab 1`.
    #[default]
    KindFirst,
}

/// How timeslot start times are compared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TimeslotOrdering {
    /// Only the minute of the first meeting's start time is compared.
    #[default]
    MinuteOnly,
    /// `(hour, minute)` of the first meeting's start time.
    Chronological,
}

/// Ordering flags shared by all panes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct OrderingRules {
    #[serde(default)]
    pub section_ordering: SectionOrdering,
    #[serde(default)]
    pub timeslot_ordering: TimeslotOrdering,
}

impl OrderingRules {
    pub fn new(section_ordering: SectionOrdering, timeslot_ordering: TimeslotOrdering) -> Self {
        Self {
            section_ordering,
            timeslot_ordering,
        }
    }
}

/// Integer value of the leading digits of a course number (`"171L"` -> 171).
fn leading_number(number: &str) -> u64 {
    let digits: String = number.chars().take_while(|c| c.is_ascii_digit()).collect();
    digits.parse().unwrap_or(0)
}

/// Compare two section identifiers.
///
/// Prefix, then course number by integer value (then by text), then kind and
/// index in the order selected by `ordering`. Holt and crosslisted flags only
/// break remaining ties so the order agrees with equality.
pub fn compare_section_ids(a: &SectionId, b: &SectionId, ordering: SectionOrdering) -> Ordering {
    let kind_and_index = match ordering {
        SectionOrdering::IndexFirst => a
            .index
            .cmp(&b.index)
            .then_with(|| a.kind.rank().cmp(&b.kind.rank())),
        SectionOrdering::KindFirst => a
            .kind
            .rank()
            .cmp(&b.kind.rank())
            .then_with(|| a.index.cmp(&b.index)),
    };

    a.prefix
        .cmp(&b.prefix)
        .then_with(|| leading_number(&a.number).cmp(&leading_number(&b.number)))
        .then_with(|| a.number.cmp(&b.number))
        .then(kind_and_index)
        .then_with(|| a.holt.cmp(&b.holt))
        .then_with(|| a.crosslisted.cmp(&b.crosslisted))
}

/// Compare courses by prefix, then number as for sections.
pub fn compare_course_ids(a: &CourseId, b: &CourseId) -> Ordering {
    a.prefix
        .cmp(&b.prefix)
        .then_with(|| leading_number(&a.number).cmp(&leading_number(&b.number)))
        .then_with(|| a.number.cmp(&b.number))
}

/// Project sections onto their courses.
///
/// A course carries the Holt / crosslisted suffix when any of its sections
/// does. The result is deduplicated and sorted with [`compare_course_ids`].
pub fn course_names_of<'a, I>(sections: I) -> Vec<CourseName>
where
    I: IntoIterator<Item = &'a SectionId>,
{
    let mut courses: BTreeMap<CourseId, (bool, bool)> = BTreeMap::new();
    for section in sections {
        let flags = courses.entry(section.course()).or_default();
        flags.0 |= section.holt;
        flags.1 |= section.crosslisted;
    }

    let mut courses: Vec<(CourseId, (bool, bool))> = courses.into_iter().collect();
    courses.sort_by(|a, b| compare_course_ids(&a.0, &b.0));
    courses
        .into_iter()
        .map(|(course, (holt, cross))| CourseName::new(course_display_name(&course, holt, cross)))
        .collect()
}

/// Compare two timeslot display strings.
///
/// Parsable timeslots sort before unparsable ones; unparsable ones compare by
/// their display text.
pub fn compare_timeslot_ids(a: &str, b: &str, ordering: TimeslotOrdering) -> Ordering {
    match (parse_timeslot_id(a), parse_timeslot_id(b)) {
        (Ok(x), Ok(y)) => match ordering {
            TimeslotOrdering::MinuteOnly => x.start_minute().cmp(&y.start_minute()),
            TimeslotOrdering::Chronological => (x.start_hour(), x.start_minute())
                .cmp(&(y.start_hour(), y.start_minute())),
        },
        (Ok(_), Err(_)) => Ordering::Less,
        (Err(_), Ok(_)) => Ordering::Greater,
        (Err(_), Err(_)) => a.cmp(b),
    }
}

/// Parse and sort section display names, skipping (and logging) malformed ones.
pub fn sort_section_names<I, S>(names: I, ordering: SectionOrdering) -> Vec<SectionId>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut sections: Vec<SectionId> = names
        .into_iter()
        .filter_map(|name| match parse_section_id(name.as_ref()) {
            Ok(section) => Some(section),
            Err(e) => {
                warn!("Skipping malformed section name: {}", e);
                None
            }
        })
        .collect();
    sections.sort_by(|a, b| compare_section_ids(a, b, ordering));
    sections.dedup();
    sections
}

/// Stable sort of timeslot display strings.
pub fn sort_timeslots(timeslots: &mut [String], ordering: TimeslotOrdering) {
    timeslots.sort_by(|a, b| compare_timeslot_ids(a, b, ordering));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(sections: &[SectionId]) -> Vec<String> {
        sections.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_index_first_ordering() {
        let sorted = sort_section_names(
            [
                "CMS 167 - Lecture 1",
                "CMS 167 - Lecture 2",
                "CMS 167 - Lab 1",
                "CMS 100 - Lecture 1",
            ],
            SectionOrdering::IndexFirst,
        );
        assert_eq!(
            names(&sorted),
            vec![
                "CMS 100 - Lecture 1",
                "CMS 167 - Lecture 1",
                "CMS 167 - Lab 1",
                "CMS 167 - Lecture 2",
            ]
        );
    }

    #[test]
    fn test_kind_first_ordering() {
        let sorted = sort_section_names(
            ["CMS 167 - Lab 1", "CMS 167 - Lecture 2", "CMS 167 - Lecture 1"],
            SectionOrdering::KindFirst,
        );
        assert_eq!(
            names(&sorted),
            vec!["CMS 167 - Lecture 1", "CMS 167 - Lecture 2", "CMS 167 - Lab 1"]
        );
    }

    #[test]
    fn test_numbers_compare_as_integers() {
        let sorted = sort_section_names(
            ["CMS 1000 - Lecture 1", "CMS 99 - Lecture 1", "CMS 170 - Lecture 1"],
            SectionOrdering::IndexFirst,
        );
        assert_eq!(
            names(&sorted),
            vec!["CMS 99 - Lecture 1", "CMS 170 - Lecture 1", "CMS 1000 - Lecture 1"]
        );
    }

    #[test]
    fn test_malformed_names_are_skipped() {
        let sorted = sort_section_names(
            ["garbage", "CMS 171 - Lecture 1", "CMS 171 - Lecture 1"],
            SectionOrdering::IndexFirst,
        );
        assert_eq!(names(&sorted), vec!["CMS 171 - Lecture 1"]);
    }

    #[test]
    fn test_course_projection_merges_flags() {
        let sections = sort_section_names(
            [
                "CMS 200 - Lecture H1",
                "CMS 200 - Lab 1X",
                "CMS 171 - Lecture 1",
                "CMS 171 - Lecture 2",
                "BIO 101 - Lab 1",
            ],
            SectionOrdering::IndexFirst,
        );
        let names: Vec<String> = course_names_of(&sections)
            .into_iter()
            .map(String::from)
            .collect();
        assert_eq!(names, vec!["BIO 101", "CMS 171", "CMS 200 - H/X"]);
    }

    #[test]
    fn test_minute_only_ignores_hour() {
        assert_eq!(
            compare_timeslot_ids(
                "MWF 15:00 - 15:50",
                "MWF 8:30 - 9:20",
                TimeslotOrdering::MinuteOnly
            ),
            Ordering::Less
        );
        assert_eq!(
            compare_timeslot_ids(
                "MWF 15:00 - 15:50",
                "MWF 8:00 - 8:50",
                TimeslotOrdering::MinuteOnly
            ),
            Ordering::Equal
        );
    }

    #[test]
    fn test_chronological_timeslots() {
        let mut slots = vec![
            "MWF 15:00 - 15:50".to_string(),
            "bogus".to_string(),
            "MWF 8:00 - 8:50".to_string(),
            "MWF 10:00 - 10:50".to_string(),
        ];
        sort_timeslots(&mut slots, TimeslotOrdering::Chronological);
        assert_eq!(
            slots,
            vec![
                "MWF 8:00 - 8:50",
                "MWF 10:00 - 10:50",
                "MWF 15:00 - 15:50",
                "bogus"
            ]
        );
    }

    #[test]
    fn test_ordering_rules_from_toml_names() {
        let rules: OrderingRules = toml::from_str(
            r#"
section_ordering = "index-first"
timeslot_ordering = "chronological"
"#,
        )
        .unwrap();
        assert_eq!(rules.section_ordering, SectionOrdering::IndexFirst);
        assert_eq!(rules.timeslot_ordering, TimeslotOrdering::Chronological);
        let defaults = toml::from_str::<OrderingRules>("").unwrap();
        assert_eq!(defaults, OrderingRules::default());
        assert_eq!(defaults.section_ordering, SectionOrdering::KindFirst);
    }
}
