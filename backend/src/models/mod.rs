pub mod conflict;
pub mod identifiers;
pub mod macros;
pub mod ordering;
pub mod timeslot;

pub use conflict::*;
pub use identifiers::*;
pub use ordering::*;
pub use timeslot::*;

crate::define_name_type!(
    /// Room display string, `"<BUILDING> <NUMBER>"`.
    RoomName
);

crate::define_name_type!(
    /// Timeslot display string as stored by the timetable store.
    TimeslotName
);

crate::define_name_type!(
    /// Course display string, `"CMS 200"` or `"CMS 200 - H/X"`.
    CourseName
);

impl RoomName {
    /// Building the room belongs to.
    pub fn building(&self) -> &str {
        self.leading_token()
    }
}

impl TimeslotName {
    pub fn parse(&self) -> Result<TimeslotId, IdentifierError> {
        parse_timeslot_id(self.as_str())
    }
}

impl CourseName {
    pub fn parse(&self) -> Result<(CourseId, bool, bool), IdentifierError> {
        parse_course_name(self.as_str())
    }

    /// Course prefix, the scope key for conflict candidates.
    pub fn prefix(&self) -> &str {
        self.leading_token()
    }
}
