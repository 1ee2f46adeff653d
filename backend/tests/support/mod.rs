#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use timetabler::api::{
    Assignment, AssignmentView, CandidateEvaluation, ConflictEntry, CourseDetail, CourseId,
    CreatedSections, NewSections, RoomName, SchedulerReport, SectionDetail, SectionId,
    TimeslotName,
};
use timetabler::db::repository::{
    AssignmentRepository, CatalogRepository, RepositoryError, RepositoryResult,
};
use timetabler::db::LocalRepository;

static ENV_LOCK: Mutex<()> = Mutex::new(());

/// Runs `f` with environment variables temporarily modified.
///
/// This is panic-safe (restores variables on unwind) and also serializes access to
/// process-global env vars to avoid flaky tests when Rust runs tests in parallel.
///
/// `changes` is a list of `(key, value)` pairs:
/// - `Some(v)` sets the variable to `v`
/// - `None` removes the variable
pub fn with_scoped_env<F, R>(changes: &[(&str, Option<&str>)], f: F) -> R
where
    F: FnOnce() -> R,
{
    let _lock = ENV_LOCK.lock().expect("ENV_LOCK poisoned");
    let _guard = ScopedEnv::new(changes);
    f()
}

struct ScopedEnv {
    snapshot: Vec<(String, Option<String>)>,
}

impl ScopedEnv {
    fn new(changes: &[(&str, Option<&str>)]) -> Self {
        let keys: HashSet<&str> = changes.iter().map(|(k, _)| *k).collect();
        let snapshot = keys
            .into_iter()
            .map(|k| (k.to_string(), std::env::var(k).ok()))
            .collect::<Vec<_>>();

        for (k, v) in changes {
            match v {
                Some(val) => std::env::set_var(k, val),
                None => std::env::remove_var(k),
            }
        }

        Self { snapshot }
    }
}

impl Drop for ScopedEnv {
    fn drop(&mut self) {
        for (k, v) in self.snapshot.drain(..) {
            match v {
                Some(val) => std::env::set_var(&k, val),
                None => std::env::remove_var(&k),
            }
        }
    }
}

// ==================== Counting store ====================

/// In-memory store that counts how often section details are saved.
///
/// Listing the sections can be made to fail on its own while every other
/// call keeps working.
#[derive(Default)]
pub struct CountingRepository {
    pub inner: LocalRepository,
    saves: AtomicUsize,
    listings_down: AtomicBool,
}

impl CountingRepository {
    pub fn seeded() -> Self {
        Self {
            inner: LocalRepository::seeded(),
            saves: AtomicUsize::new(0),
            listings_down: AtomicBool::new(false),
        }
    }

    pub fn saves(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }

    pub fn set_listings_down(&self, down: bool) {
        self.listings_down.store(down, Ordering::SeqCst);
    }
}

#[async_trait]
impl CatalogRepository for CountingRepository {
    async fn health_check(&self) -> RepositoryResult<bool> {
        self.inner.health_check().await
    }

    async fn create_sections(&self, request: &NewSections) -> RepositoryResult<CreatedSections> {
        self.inner.create_sections(request).await
    }

    async fn list_section_names(&self) -> RepositoryResult<Vec<String>> {
        if self.listings_down.load(Ordering::SeqCst) {
            return Err(RepositoryError::connection("Section listing is down"));
        }
        self.inner.list_section_names().await
    }

    async fn list_sections_by_prefix(&self, prefix: &str) -> RepositoryResult<Vec<String>> {
        self.inner.list_sections_by_prefix(prefix).await
    }

    async fn get_section_detail(&self, section: &SectionId) -> RepositoryResult<SectionDetail> {
        self.inner.get_section_detail(section).await
    }

    async fn get_section_conflicts(
        &self,
        section: &SectionId,
    ) -> RepositoryResult<Vec<ConflictEntry>> {
        self.inner.get_section_conflicts(section).await
    }

    async fn save_section_detail(&self, detail: &SectionDetail) -> RepositoryResult<()> {
        self.saves.fetch_add(1, Ordering::SeqCst);
        self.inner.save_section_detail(detail).await
    }

    async fn delete_section(&self, section: &SectionId) -> RepositoryResult<()> {
        self.inner.delete_section(section).await
    }

    async fn get_course_detail(&self, course: &CourseId) -> RepositoryResult<CourseDetail> {
        self.inner.get_course_detail(course).await
    }

    async fn list_prefixes(&self) -> RepositoryResult<Vec<String>> {
        self.inner.list_prefixes().await
    }

    async fn list_buildings(&self) -> RepositoryResult<Vec<String>> {
        self.inner.list_buildings().await
    }

    async fn list_instructors(&self) -> RepositoryResult<Vec<String>> {
        self.inner.list_instructors().await
    }

    async fn list_rooms_by_building(&self, building: &str) -> RepositoryResult<Vec<RoomName>> {
        self.inner.list_rooms_by_building(building).await
    }

    async fn list_timeslot_categories(&self) -> RepositoryResult<Vec<String>> {
        self.inner.list_timeslot_categories().await
    }

    async fn list_timeslots_by_category(
        &self,
        category: &str,
    ) -> RepositoryResult<Vec<TimeslotName>> {
        self.inner.list_timeslots_by_category(category).await
    }
}

#[async_trait]
impl AssignmentRepository for CountingRepository {
    async fn get_assignment(&self, section: &SectionId) -> RepositoryResult<AssignmentView> {
        self.inner.get_assignment(section).await
    }

    async fn evaluate_candidate(
        &self,
        section: &SectionId,
        timeslot: &TimeslotName,
    ) -> RepositoryResult<CandidateEvaluation> {
        self.inner.evaluate_candidate(section, timeslot).await
    }

    async fn commit_assignment(
        &self,
        section: &SectionId,
        room: &RoomName,
        timeslot: &TimeslotName,
    ) -> RepositoryResult<Assignment> {
        self.inner.commit_assignment(section, room, timeslot).await
    }

    async fn run_scheduler(&self) -> RepositoryResult<SchedulerReport> {
        self.inner.run_scheduler().await
    }
}
