//! Assignment repository trait: committed assignments and what-if queries.

use async_trait::async_trait;

use super::error::RepositoryResult;
use crate::api::{
    Assignment, AssignmentView, CandidateEvaluation, RoomName, SchedulerReport, SectionId,
    TimeslotName,
};

/// Repository trait for the scheduling side of the store.
#[async_trait]
pub trait AssignmentRepository: Send + Sync {
    /// Committed room and timeslot of a section plus the conflicts they cause.
    async fn get_assignment(&self, section: &SectionId) -> RepositoryResult<AssignmentView>;

    /// Rooms free at `timeslot` and the conflicts `section` would have there.
    ///
    /// Read-only: nothing is stored.
    async fn evaluate_candidate(
        &self,
        section: &SectionId,
        timeslot: &TimeslotName,
    ) -> RepositoryResult<CandidateEvaluation>;

    /// Make `(room, timeslot)` the committed assignment of `section`.
    ///
    /// # Returns
    /// * `Err(RepositoryError::ValidationError)` - If the room or timeslot is not
    ///   acceptable for the section, or the room is taken at an overlapping time
    async fn commit_assignment(
        &self,
        section: &SectionId,
        room: &RoomName,
        timeslot: &TimeslotName,
    ) -> RepositoryResult<Assignment>;

    /// Place every unassigned section the store can place.
    async fn run_scheduler(&self) -> RepositoryResult<SchedulerReport>;
}
