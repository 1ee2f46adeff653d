//! Catalog repository trait: sections, courses and static campus data.

use async_trait::async_trait;

use super::error::RepositoryResult;
use crate::api::{
    ConflictEntry, CourseDetail, CourseId, CreatedSections, NewSections, RoomName, SectionDetail,
    SectionId, TimeslotName,
};

/// Repository trait for section records and the campus catalog.
///
/// # Thread Safety
/// Implementations must be `Send + Sync` to work with async Rust.
#[async_trait]
pub trait CatalogRepository: Send + Sync {
    // ==================== Health & Connection ====================

    /// Check if the store is reachable and healthy.
    async fn health_check(&self) -> RepositoryResult<bool>;

    // ==================== Section Operations ====================

    /// Create the named sections. Names that already exist are skipped.
    async fn create_sections(&self, request: &NewSections) -> RepositoryResult<CreatedSections>;

    /// All section display names, in no particular order.
    async fn list_section_names(&self) -> RepositoryResult<Vec<String>>;

    /// Section display names whose prefix equals `prefix`.
    async fn list_sections_by_prefix(&self, prefix: &str) -> RepositoryResult<Vec<String>>;

    /// Title, instructor, acceptable pools and conflicts of a section.
    ///
    /// # Returns
    /// * `Err(RepositoryError::NotFound)` - If the section doesn't exist
    async fn get_section_detail(&self, section: &SectionId) -> RepositoryResult<SectionDetail>;

    /// Declared conflicts of a section, in declaration order.
    async fn get_section_conflicts(
        &self,
        section: &SectionId,
    ) -> RepositoryResult<Vec<ConflictEntry>>;

    /// Replace the stored detail of an existing section.
    async fn save_section_detail(&self, detail: &SectionDetail) -> RepositoryResult<()>;

    /// Delete a section with its pools, assignment and conflicts.
    async fn delete_section(&self, section: &SectionId) -> RepositoryResult<()>;

    // ==================== Course Operations ====================

    /// Title and section counts of a course.
    async fn get_course_detail(&self, course: &CourseId) -> RepositoryResult<CourseDetail>;

    /// Distinct prefixes of existing sections.
    async fn list_prefixes(&self) -> RepositoryResult<Vec<String>>;

    // ==================== Campus Catalog ====================

    async fn list_buildings(&self) -> RepositoryResult<Vec<String>>;

    async fn list_instructors(&self) -> RepositoryResult<Vec<String>>;

    async fn list_rooms_by_building(&self, building: &str) -> RepositoryResult<Vec<RoomName>>;

    async fn list_timeslot_categories(&self) -> RepositoryResult<Vec<String>>;

    /// Timeslots of a category; `"off-matrix"` lists custom timeslots.
    async fn list_timeslots_by_category(
        &self,
        category: &str,
    ) -> RepositoryResult<Vec<TimeslotName>>;
}
