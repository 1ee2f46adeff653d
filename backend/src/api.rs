//! Public API surface for the timetable store.
//!
//! This file consolidates the DTO types exchanged with the timetable store,
//! both in-process (repository traits) and over HTTP.
//! All types derive Serialize/Deserialize for JSON serialization.

use serde::{Deserialize, Serialize};

pub use crate::models::{
    ConflictEntry, CourseId, CourseName, GroupedConflicts, RoomName, SectionId, SectionKind,
    Severity, TimeslotName,
};

/// Course creation form: one course with a number of lectures and labs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateCourseRequest {
    pub prefix: String,
    pub number: String,
    pub title: String,
    pub lectures: u32,
    pub labs: u32,
    #[serde(default)]
    pub holt: bool,
    #[serde(default)]
    pub crosslisted: bool,
}

/// Sections to create in the store, already named.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewSections {
    pub prefix: String,
    pub number: String,
    /// Lecture title; labs are stored as `"Lab for <title>"`.
    pub title: String,
    pub sections: Vec<SectionId>,
}

/// Outcome of a section creation request.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CreatedSections {
    pub created: Vec<SectionId>,
    /// Names that already existed and were left untouched.
    pub skipped: Vec<SectionId>,
}

/// Everything the editing pane shows for one section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionDetail {
    pub section: SectionId,
    pub title: String,
    #[serde(default, with = "empty_as_none")]
    pub instructor: Option<String>,
    #[serde(default)]
    pub acceptable_rooms: Vec<RoomName>,
    #[serde(default)]
    pub acceptable_timeslots: Vec<TimeslotName>,
    #[serde(default)]
    pub conflicts: Vec<ConflictEntry>,
}

impl SectionDetail {
    pub fn new(section: SectionId, title: impl Into<String>) -> Self {
        Self {
            section,
            title: title.into(),
            instructor: None,
            acceptable_rooms: Vec::new(),
            acceptable_timeslots: Vec::new(),
            conflicts: Vec::new(),
        }
    }
}

/// Course summary shown in the creation pane.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CourseDetail {
    pub course: CourseName,
    pub title: String,
    pub lectures: u32,
    pub labs: u32,
}

/// A section's room and timeslot. Either may be unassigned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assignment {
    pub section: SectionId,
    pub room: Option<RoomName>,
    pub timeslot: Option<TimeslotName>,
}

/// Committed assignment together with the conflicts it currently causes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssignmentView {
    pub section: SectionId,
    pub room: Option<RoomName>,
    pub timeslot: Option<TimeslotName>,
    #[serde(default)]
    pub conflicts: GroupedConflicts,
}

impl AssignmentView {
    pub fn assignment(&self) -> Assignment {
        Assignment {
            section: self.section.clone(),
            room: self.room.clone(),
            timeslot: self.timeslot.clone(),
        }
    }
}

/// Rooms still free and conflicts caused if `section` moved to `timeslot`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateEvaluation {
    pub section: SectionId,
    pub timeslot: TimeslotName,
    #[serde(default)]
    pub available_rooms: Vec<RoomName>,
    #[serde(default)]
    pub conflicts: GroupedConflicts,
}

/// Body of an assignment commit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitAssignmentRequest {
    pub room: RoomName,
    pub timeslot: TimeslotName,
}

/// Result of one scheduler pass.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SchedulerReport {
    pub placed: Vec<Assignment>,
    pub unplaced: Vec<SectionId>,
}

/// Timeslots grouped under one matrix category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeslotCategory {
    pub name: String,
    pub timeslots: Vec<TimeslotName>,
}

/// Static campus data a store is seeded with.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CatalogSeed {
    #[serde(default)]
    pub instructors: Vec<String>,
    #[serde(default)]
    pub rooms: Vec<RoomName>,
    #[serde(default)]
    pub timeslot_categories: Vec<TimeslotCategory>,
}

/// The instructor is sent as `""` when unset.
mod empty_as_none {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Option<String>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(value.as_deref().unwrap_or(""))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
        let value = Option::<String>::deserialize(deserializer)?;
        Ok(value.filter(|s| !s.trim().is_empty()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_instructor_empty_string_is_none() {
        let json = r#"{
            "section": "CMS 171 - Lecture 1",
            "title": "Intro",
            "instructor": ""
        }"#;
        let detail: SectionDetail = serde_json::from_str(json).unwrap();
        assert_eq!(detail.instructor, None);
        assert!(detail.acceptable_rooms.is_empty());

        let out = serde_json::to_value(&detail).unwrap();
        assert_eq!(out["instructor"], "");
        assert_eq!(out["section"], "CMS 171 - Lecture 1");
    }

    #[test]
    fn test_section_detail_wire_shape() {
        let mut detail = SectionDetail::new(
            SectionId::new("CMS", "171", SectionKind::Lab, 2),
            "Lab for Intro",
        );
        detail.instructor = Some("Summet, Valerie".into());
        detail.acceptable_rooms.push(RoomName::new("BUSH 105"));
        detail
            .conflicts
            .push(ConflictEntry::new("MAT 140", Severity::Medium));

        let value = serde_json::to_value(&detail).unwrap();
        assert_eq!(value["acceptable_rooms"][0], "BUSH 105");
        assert_eq!(value["conflicts"][0]["peer"], "MAT 140");
        assert_eq!(value["conflicts"][0]["severity"], "Medium");

        let back: SectionDetail = serde_json::from_value(value).unwrap();
        assert_eq!(back, detail);
    }
}
