//! In-memory local repository implementation.
//!
//! This module provides a local implementation of all repository traits
//! suitable for unit testing, local development and the bundled server.
//! All data lives in memory behind a single `RwLock`, so every operation is
//! serialised exactly like a single-writer store.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use async_trait::async_trait;
use log::{debug, info};
use parking_lot::RwLock;

use crate::api::*;
use crate::db::repository::*;
use crate::models::{parse_course_name, SectionKind, TimeslotId, OFF_MATRIX_CATEGORY};

/// Penalties used to rank candidate timeslots during a scheduler pass.
const HEAVY_CONFLICT_PENALTY: u32 = 400;
const MEDIUM_CONFLICT_PENALTY: u32 = 20;
const LIGHT_CONFLICT_PENALTY: u32 = 1;
const INSTRUCTOR_CONFLICT_PENALTY: u32 = 400;

fn severity_penalty(severity: Severity) -> u32 {
    match severity {
        Severity::Heavy => HEAVY_CONFLICT_PENALTY,
        Severity::Medium => MEDIUM_CONFLICT_PENALTY,
        Severity::Light => LIGHT_CONFLICT_PENALTY,
    }
}

/// In-memory local repository.
///
/// # Example
/// ```
/// use timetabler::api::{NewSections, SectionId, SectionKind};
/// use timetabler::db::repositories::LocalRepository;
/// use timetabler::db::repository::CatalogRepository;
///
/// let rt = tokio::runtime::Runtime::new().unwrap();
/// rt.block_on(async {
///     let repo = LocalRepository::seeded();
///     let request = NewSections {
///         prefix: "CMS".into(),
///         number: "171".into(),
///         title: "Intro".into(),
///         sections: vec![SectionId::new("CMS", "171", SectionKind::Lecture, 1)],
///     };
///     repo.create_sections(&request).await.unwrap();
///     assert_eq!(repo.list_section_names().await.unwrap().len(), 1);
/// });
/// ```
#[derive(Clone)]
pub struct LocalRepository {
    data: Arc<RwLock<LocalData>>,
}

/// Stored state of one section.
#[derive(Debug, Clone)]
struct SectionRecord {
    detail: SectionDetail,
    room: Option<RoomName>,
    timeslot: Option<TimeslotName>,
}

impl SectionRecord {
    /// Committed timeslot, parsed.
    fn committed_slot(&self) -> Option<TimeslotId> {
        self.timeslot.as_ref().and_then(|t| t.parse().ok())
    }

    /// Severity this section declared against `course`, if any.
    fn declared_severity(&self, course: &CourseId) -> Option<Severity> {
        self.detail
            .conflicts
            .iter()
            .find(|c| matches!(c.peer.parse(), Ok((peer, _, _)) if &peer == course))
            .map(|c| c.severity)
    }
}

struct LocalData {
    /// Keyed by section display name.
    sections: BTreeMap<String, SectionRecord>,
    instructors: Vec<String>,
    rooms: Vec<RoomName>,
    categories: Vec<TimeslotCategory>,
    custom_timeslots: Vec<TimeslotName>,

    // Connection health
    is_healthy: bool,
}

impl LocalData {
    fn from_seed(seed: CatalogSeed) -> Self {
        Self {
            sections: BTreeMap::new(),
            instructors: seed.instructors,
            rooms: seed.rooms,
            categories: seed.timeslot_categories,
            custom_timeslots: Vec::new(),
            is_healthy: true,
        }
    }

    fn record(&self, section: &SectionId) -> RepositoryResult<&SectionRecord> {
        self.sections
            .get(&section.to_string())
            .ok_or_else(|| section_not_found(section))
    }

    fn record_mut(&mut self, section: &SectionId) -> RepositoryResult<&mut SectionRecord> {
        self.sections
            .get_mut(&section.to_string())
            .ok_or_else(|| section_not_found(section))
    }

    fn is_matrix_timeslot(&self, timeslot: &TimeslotName) -> bool {
        self.categories
            .iter()
            .any(|c| c.timeslots.contains(timeslot))
    }

    /// Committed records other than `section` whose timeslot overlaps `slot`.
    fn overlapping<'a>(
        &'a self,
        section: &'a SectionId,
        slot: &'a TimeslotId,
    ) -> impl Iterator<Item = (&'a String, &'a SectionRecord)> + 'a {
        let own = section.to_string();
        self.sections.iter().filter(move |(name, record)| {
            **name != own
                && record
                    .committed_slot()
                    .is_some_and(|committed| committed.overlaps(slot))
        })
    }

    /// Acceptable rooms of `section` not committed to an overlapping section.
    fn available_rooms(&self, section: &SectionId, slot: &TimeslotId) -> RepositoryResult<Vec<RoomName>> {
        let record = self.record(section)?;
        let taken: BTreeSet<&RoomName> = self
            .overlapping(section, slot)
            .filter_map(|(_, other)| other.room.as_ref())
            .collect();
        Ok(record
            .detail
            .acceptable_rooms
            .iter()
            .filter(|room| !taken.contains(room))
            .cloned()
            .collect())
    }

    /// Overlapping sections whose course is a declared peer in either direction.
    fn conflicts_at(&self, section: &SectionId, slot: &TimeslotId) -> RepositoryResult<GroupedConflicts> {
        let record = self.record(section)?;
        let own_course = section.course();
        let mut grouped = GroupedConflicts::default();

        for (name, other) in self.overlapping(section, slot) {
            let other_course = other.detail.section.course();
            let severity = record
                .declared_severity(&other_course)
                .or_else(|| other.declared_severity(&own_course));
            if let Some(severity) = severity {
                grouped.push(name, severity);
            }
        }
        Ok(grouped)
    }

    fn parse_timeslot(timeslot: &TimeslotName, section: &SectionId) -> RepositoryResult<TimeslotId> {
        timeslot.parse().map_err(|e| {
            RepositoryError::validation_with_context(
                e.to_string(),
                ErrorContext::default()
                    .with_entity("section")
                    .with_entity_id(section),
            )
        })
    }

    /// Scheduler cost of placing `section` at `slot`.
    fn placement_penalty(&self, section: &SectionId, slot: &TimeslotId) -> RepositoryResult<u32> {
        let record = self.record(section)?;
        let own_course = section.course();
        let mut penalty = 0;

        for (_, other) in self.overlapping(section, slot) {
            let other_course = other.detail.section.course();
            if let Some(severity) = record
                .declared_severity(&other_course)
                .or_else(|| other.declared_severity(&own_course))
            {
                penalty += severity_penalty(severity);
            }
            if record.detail.instructor.is_some()
                && record.detail.instructor == other.detail.instructor
            {
                penalty += INSTRUCTOR_CONFLICT_PENALTY;
            }
        }
        Ok(penalty)
    }
}

fn section_not_found(section: &SectionId) -> RepositoryError {
    RepositoryError::not_found_with_context(
        format!("Section '{}' not found", section),
        ErrorContext::default()
            .with_entity("section")
            .with_entity_id(section),
    )
}

impl LocalRepository {
    /// Create a new local repository with an empty catalog.
    pub fn new() -> Self {
        Self::with_catalog(CatalogSeed::default())
    }

    /// Create a local repository seeded with `seed`.
    pub fn with_catalog(seed: CatalogSeed) -> Self {
        Self {
            data: Arc::new(RwLock::new(LocalData::from_seed(seed))),
        }
    }

    /// Create a local repository seeded with the built-in campus.
    pub fn seeded() -> Self {
        Self::with_catalog(CatalogSeed::default_campus())
    }

    /// Set the health status for testing connection failures.
    pub fn set_healthy(&self, healthy: bool) {
        self.data.write().is_healthy = healthy;
    }

    /// Get the number of sections stored.
    pub fn section_count(&self) -> usize {
        self.data.read().sections.len()
    }

    /// Helper to check health and return error if unhealthy.
    fn check_health(&self) -> RepositoryResult<()> {
        if !self.data.read().is_healthy {
            return Err(RepositoryError::connection("Timetable store is not healthy"));
        }
        Ok(())
    }
}

impl Default for LocalRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CatalogRepository for LocalRepository {
    async fn health_check(&self) -> RepositoryResult<bool> {
        Ok(self.data.read().is_healthy)
    }

    async fn create_sections(&self, request: &NewSections) -> RepositoryResult<CreatedSections> {
        self.check_health()?;
        let mut data = self.data.write();
        let mut outcome = CreatedSections::default();

        for section in &request.sections {
            if section.prefix != request.prefix || section.number != request.number {
                return Err(RepositoryError::validation_with_context(
                    format!(
                        "Section '{}' does not belong to course {} {}",
                        section, request.prefix, request.number
                    ),
                    ErrorContext::new("create_sections").with_entity("section"),
                ));
            }
        }

        for section in &request.sections {
            let name = section.to_string();
            // Flags are not part of identity: `Lecture 1` and `Lecture H1` collide.
            if let Some(existing) = data
                .sections
                .values()
                .map(|record| &record.detail.section)
                .find(|existing| existing.same_slot(section))
            {
                debug!("Section '{}' already exists as '{}', skipping", name, existing);
                outcome.skipped.push(section.clone());
                continue;
            }
            let title = match section.kind {
                SectionKind::Lecture => request.title.clone(),
                SectionKind::Lab => format!("Lab for {}", request.title),
            };
            data.sections.insert(
                name,
                SectionRecord {
                    detail: SectionDetail::new(section.clone(), title),
                    room: None,
                    timeslot: None,
                },
            );
            outcome.created.push(section.clone());
        }

        info!(
            "Created {} section(s) for {} {} ({} skipped)",
            outcome.created.len(),
            request.prefix,
            request.number,
            outcome.skipped.len()
        );
        Ok(outcome)
    }

    async fn list_section_names(&self) -> RepositoryResult<Vec<String>> {
        self.check_health()?;
        Ok(self.data.read().sections.keys().cloned().collect())
    }

    async fn list_sections_by_prefix(&self, prefix: &str) -> RepositoryResult<Vec<String>> {
        self.check_health()?;
        Ok(self
            .data
            .read()
            .sections
            .values()
            .filter(|r| r.detail.section.prefix == prefix)
            .map(|r| r.detail.section.to_string())
            .collect())
    }

    async fn get_section_detail(&self, section: &SectionId) -> RepositoryResult<SectionDetail> {
        self.check_health()?;
        Ok(self.data.read().record(section)?.detail.clone())
    }

    async fn get_section_conflicts(
        &self,
        section: &SectionId,
    ) -> RepositoryResult<Vec<ConflictEntry>> {
        self.check_health()?;
        Ok(self.data.read().record(section)?.detail.conflicts.clone())
    }

    async fn save_section_detail(&self, detail: &SectionDetail) -> RepositoryResult<()> {
        self.check_health()?;
        let context = || {
            ErrorContext::new("save_section_detail")
                .with_entity("section")
                .with_entity_id(&detail.section)
        };

        let mut peers = BTreeSet::new();
        for conflict in &detail.conflicts {
            let (peer, _, _) = parse_course_name(conflict.peer.as_str())?;
            if detail.section.same_course(&peer) {
                return Err(RepositoryError::validation_with_context(
                    format!("Section cannot conflict with its own course {}", peer),
                    context(),
                ));
            }
            if !peers.insert(peer.clone()) {
                return Err(RepositoryError::validation_with_context(
                    format!("Duplicate conflict with {}", peer),
                    context(),
                ));
            }
        }

        let mut data = self.data.write();
        for room in &detail.acceptable_rooms {
            if !data.rooms.contains(room) {
                return Err(RepositoryError::validation_with_context(
                    format!("Unknown room '{}'", room),
                    context(),
                ));
            }
        }
        let mut custom = Vec::new();
        for timeslot in &detail.acceptable_timeslots {
            LocalData::parse_timeslot(timeslot, &detail.section)?;
            if !data.is_matrix_timeslot(timeslot) && !data.custom_timeslots.contains(timeslot) {
                custom.push(timeslot.clone());
            }
        }

        data.record_mut(&detail.section)?.detail = detail.clone();
        for timeslot in custom {
            if !data.custom_timeslots.contains(&timeslot) {
                debug!("Registering custom timeslot '{}'", timeslot);
                data.custom_timeslots.push(timeslot);
            }
        }
        Ok(())
    }

    async fn delete_section(&self, section: &SectionId) -> RepositoryResult<()> {
        self.check_health()?;
        let mut data = self.data.write();
        if data.sections.remove(&section.to_string()).is_none() {
            return Err(section_not_found(section));
        }

        let course = section.course();
        let course_remains = data
            .sections
            .values()
            .any(|r| r.detail.section.same_course(&course));
        if !course_remains {
            for record in data.sections.values_mut() {
                record
                    .detail
                    .conflicts
                    .retain(|c| !matches!(c.peer.parse(), Ok((peer, _, _)) if peer == course));
            }
            info!("Deleted last section of {}, dropped it from conflict lists", course);
        } else {
            info!("Deleted section '{}'", section);
        }
        Ok(())
    }

    async fn get_course_detail(&self, course: &CourseId) -> RepositoryResult<CourseDetail> {
        self.check_health()?;
        let data = self.data.read();
        let sections: Vec<&SectionRecord> = data
            .sections
            .values()
            .filter(|r| r.detail.section.same_course(course))
            .collect();
        if sections.is_empty() {
            return Err(RepositoryError::not_found_with_context(
                format!("Course '{}' not found", course),
                ErrorContext::default()
                    .with_entity("course")
                    .with_entity_id(course),
            ));
        }

        let lectures = sections
            .iter()
            .filter(|r| r.detail.section.kind == SectionKind::Lecture)
            .count() as u32;
        let labs = sections.len() as u32 - lectures;
        let holt = sections.iter().any(|r| r.detail.section.holt);
        let crosslisted = sections.iter().any(|r| r.detail.section.crosslisted);
        let title = sections
            .iter()
            .find(|r| r.detail.section.kind == SectionKind::Lecture)
            .map(|r| r.detail.title.clone())
            .or_else(|| {
                sections.first().map(|r| {
                    r.detail
                        .title
                        .strip_prefix("Lab for ")
                        .unwrap_or(&r.detail.title)
                        .to_string()
                })
            })
            .unwrap_or_default();

        Ok(CourseDetail {
            course: CourseName::new(course.display_name(holt, crosslisted)),
            title,
            lectures,
            labs,
        })
    }

    async fn list_prefixes(&self) -> RepositoryResult<Vec<String>> {
        self.check_health()?;
        let prefixes: BTreeSet<String> = self
            .data
            .read()
            .sections
            .values()
            .map(|r| r.detail.section.prefix.clone())
            .collect();
        Ok(prefixes.into_iter().collect())
    }

    async fn list_buildings(&self) -> RepositoryResult<Vec<String>> {
        self.check_health()?;
        let buildings: BTreeSet<String> = self
            .data
            .read()
            .rooms
            .iter()
            .map(|r| r.building().to_string())
            .collect();
        Ok(buildings.into_iter().collect())
    }

    async fn list_instructors(&self) -> RepositoryResult<Vec<String>> {
        self.check_health()?;
        Ok(self.data.read().instructors.clone())
    }

    async fn list_rooms_by_building(&self, building: &str) -> RepositoryResult<Vec<RoomName>> {
        self.check_health()?;
        Ok(self
            .data
            .read()
            .rooms
            .iter()
            .filter(|r| r.building() == building)
            .cloned()
            .collect())
    }

    async fn list_timeslot_categories(&self) -> RepositoryResult<Vec<String>> {
        self.check_health()?;
        let data = self.data.read();
        let mut categories: Vec<String> = data.categories.iter().map(|c| c.name.clone()).collect();
        categories.push(OFF_MATRIX_CATEGORY.to_string());
        Ok(categories)
    }

    async fn list_timeslots_by_category(
        &self,
        category: &str,
    ) -> RepositoryResult<Vec<TimeslotName>> {
        self.check_health()?;
        let data = self.data.read();
        if category == OFF_MATRIX_CATEGORY {
            return Ok(data.custom_timeslots.clone());
        }
        data.categories
            .iter()
            .find(|c| c.name == category)
            .map(|c| c.timeslots.clone())
            .ok_or_else(|| {
                RepositoryError::not_found_with_context(
                    format!("Timeslot category '{}' not found", category),
                    ErrorContext::default().with_entity("timeslot_category"),
                )
            })
    }
}

#[async_trait]
impl AssignmentRepository for LocalRepository {
    async fn get_assignment(&self, section: &SectionId) -> RepositoryResult<AssignmentView> {
        self.check_health()?;
        let data = self.data.read();
        let record = data.record(section)?;
        let conflicts = match record.committed_slot() {
            Some(slot) => data.conflicts_at(section, &slot)?,
            None => GroupedConflicts::default(),
        };
        Ok(AssignmentView {
            section: section.clone(),
            room: record.room.clone(),
            timeslot: record.timeslot.clone(),
            conflicts,
        })
    }

    async fn evaluate_candidate(
        &self,
        section: &SectionId,
        timeslot: &TimeslotName,
    ) -> RepositoryResult<CandidateEvaluation> {
        self.check_health()?;
        let data = self.data.read();
        let slot = LocalData::parse_timeslot(timeslot, section)?;
        Ok(CandidateEvaluation {
            section: section.clone(),
            timeslot: timeslot.clone(),
            available_rooms: data.available_rooms(section, &slot)?,
            conflicts: data.conflicts_at(section, &slot)?,
        })
    }

    async fn commit_assignment(
        &self,
        section: &SectionId,
        room: &RoomName,
        timeslot: &TimeslotName,
    ) -> RepositoryResult<Assignment> {
        self.check_health()?;
        let mut data = self.data.write();
        let context = || {
            ErrorContext::new("commit_assignment")
                .with_entity("section")
                .with_entity_id(section)
        };

        let record = data.record(section)?;
        if !record.detail.acceptable_timeslots.contains(timeslot) {
            return Err(RepositoryError::validation_with_context(
                format!("Timeslot '{}' is not acceptable for this section", timeslot),
                context(),
            ));
        }
        if !record.detail.acceptable_rooms.contains(room) {
            return Err(RepositoryError::validation_with_context(
                format!("Room '{}' is not acceptable for this section", room),
                context(),
            ));
        }
        let slot = LocalData::parse_timeslot(timeslot, section)?;
        if !data.available_rooms(section, &slot)?.contains(room) {
            return Err(RepositoryError::validation_with_context(
                format!("Room '{}' is already taken at an overlapping time", room),
                context(),
            ));
        }

        let record = data.record_mut(section)?;
        record.room = Some(room.clone());
        record.timeslot = Some(timeslot.clone());
        info!("Committed '{}' to {} at {}", section, room, timeslot);

        Ok(Assignment {
            section: section.clone(),
            room: Some(room.clone()),
            timeslot: Some(timeslot.clone()),
        })
    }

    async fn run_scheduler(&self) -> RepositoryResult<SchedulerReport> {
        self.check_health()?;
        let mut data = self.data.write();

        // Most constrained sections first.
        let mut pending: Vec<(usize, SectionId)> = data
            .sections
            .values()
            .filter(|r| r.room.is_none() || r.timeslot.is_none())
            .map(|r| {
                (
                    r.detail.acceptable_timeslots.len(),
                    r.detail.section.clone(),
                )
            })
            .collect();
        pending.sort_by(|a, b| a.0.cmp(&b.0).then_with(|| a.1.to_string().cmp(&b.1.to_string())));

        let mut report = SchedulerReport::default();
        for (_, section) in pending {
            let timeslots = data.record(&section)?.detail.acceptable_timeslots.clone();
            let mut best: Option<(u32, RoomName, TimeslotName)> = None;

            for timeslot in timeslots {
                let Ok(slot) = timeslot.parse() else {
                    continue;
                };
                let Some(room) = data.available_rooms(&section, &slot)?.into_iter().next() else {
                    continue;
                };
                let penalty = data.placement_penalty(&section, &slot)?;
                if best.as_ref().map_or(true, |(p, _, _)| penalty < *p) {
                    best = Some((penalty, room, timeslot));
                }
            }

            match best {
                Some((penalty, room, timeslot)) => {
                    debug!("Placing '{}' at {} in {} (penalty {})", section, timeslot, room, penalty);
                    let record = data.record_mut(&section)?;
                    record.room = Some(room.clone());
                    record.timeslot = Some(timeslot.clone());
                    report.placed.push(Assignment {
                        section,
                        room: Some(room),
                        timeslot: Some(timeslot),
                    });
                }
                None => report.unplaced.push(section),
            }
        }

        info!(
            "Scheduler pass placed {} section(s), {} unplaced",
            report.placed.len(),
            report.unplaced.len()
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lecture(number: &str, index: u32) -> SectionId {
        SectionId::new("CMS", number, SectionKind::Lecture, index)
    }

    async fn repo_with(sections: &[SectionId]) -> LocalRepository {
        let repo = LocalRepository::seeded();
        for section in sections {
            repo.create_sections(&NewSections {
                prefix: section.prefix.clone(),
                number: section.number.clone(),
                title: "Course".into(),
                sections: vec![section.clone()],
            })
            .await
            .unwrap();
        }
        repo
    }

    async fn allow(repo: &LocalRepository, section: &SectionId, rooms: &[&str], slots: &[&str]) {
        let mut detail = repo.get_section_detail(section).await.unwrap();
        detail.acceptable_rooms = rooms.iter().map(|r| RoomName::new(*r)).collect();
        detail.acceptable_timeslots = slots.iter().map(|t| TimeslotName::new(*t)).collect();
        repo.save_section_detail(&detail).await.unwrap();
    }

    #[tokio::test]
    async fn test_create_skips_existing_names() {
        let repo = LocalRepository::seeded();
        let request = NewSections {
            prefix: "CMS".into(),
            number: "171".into(),
            title: "Intro".into(),
            sections: vec![
                lecture("171", 1),
                SectionId::new("CMS", "171", SectionKind::Lab, 1),
            ],
        };
        let first = repo.create_sections(&request).await.unwrap();
        assert_eq!(first.created.len(), 2);

        let second = repo.create_sections(&request).await.unwrap();
        assert!(second.created.is_empty());
        assert_eq!(second.skipped.len(), 2);
        assert_eq!(repo.section_count(), 2);

        let lab = repo
            .get_section_detail(&SectionId::new("CMS", "171", SectionKind::Lab, 1))
            .await
            .unwrap();
        assert_eq!(lab.title, "Lab for Intro");
    }

    #[tokio::test]
    async fn test_create_skips_same_index_with_other_flags() {
        let repo = repo_with(&[lecture("171", 1)]).await;

        let holt = lecture("171", 1).with_holt(true);
        let outcome = repo
            .create_sections(&NewSections {
                prefix: "CMS".into(),
                number: "171".into(),
                title: "Intro".into(),
                sections: vec![holt.clone(), lecture("171", 2).with_holt(true)],
            })
            .await
            .unwrap();
        assert_eq!(outcome.skipped, vec![holt]);
        assert_eq!(outcome.created, vec![lecture("171", 2).with_holt(true)]);

        let mut names = repo.list_section_names().await.unwrap();
        names.sort();
        assert_eq!(names, vec!["CMS 171 - Lecture 1", "CMS 171 - Lecture H2"]);
    }

    #[tokio::test]
    async fn test_create_rejects_foreign_section() {
        let repo = LocalRepository::seeded();
        let result = repo
            .create_sections(&NewSections {
                prefix: "CMS".into(),
                number: "171".into(),
                title: "Intro".into(),
                sections: vec![lecture("200", 1)],
            })
            .await;
        assert!(matches!(result, Err(RepositoryError::ValidationError { .. })));
    }

    #[tokio::test]
    async fn test_save_rejects_self_conflict_and_unknown_room() {
        let section = lecture("171", 1);
        let repo = repo_with(&[section.clone()]).await;
        let mut detail = repo.get_section_detail(&section).await.unwrap();

        detail.conflicts = vec![ConflictEntry::new("CMS 171", Severity::Heavy)];
        assert!(repo.save_section_detail(&detail).await.is_err());

        detail.conflicts.clear();
        detail.acceptable_rooms = vec![RoomName::new("NOWHERE 1")];
        assert!(repo.save_section_detail(&detail).await.is_err());
    }

    #[tokio::test]
    async fn test_custom_timeslot_registered_off_matrix() {
        let section = lecture("171", 1);
        let repo = repo_with(&[section.clone()]).await;
        allow(&repo, &section, &["BUSH 105"], &["M 13:30 - 14:45 ; R 0:15 - 00:45"]).await;

        let custom = repo
            .list_timeslots_by_category(OFF_MATRIX_CATEGORY)
            .await
            .unwrap();
        assert_eq!(custom, vec![TimeslotName::new("M 13:30 - 14:45 ; R 0:15 - 00:45")]);
    }

    #[tokio::test]
    async fn test_delete_last_section_cascades_conflicts() {
        let a = lecture("171", 1);
        let b1 = lecture("200", 1);
        let b2 = lecture("200", 2);
        let repo = repo_with(&[a.clone(), b1.clone(), b2.clone()]).await;

        let mut detail = repo.get_section_detail(&a).await.unwrap();
        detail.conflicts = vec![ConflictEntry::new("CMS 200", Severity::Medium)];
        repo.save_section_detail(&detail).await.unwrap();

        repo.delete_section(&b1).await.unwrap();
        assert_eq!(repo.get_section_conflicts(&a).await.unwrap().len(), 1);

        repo.delete_section(&b2).await.unwrap();
        assert!(repo.get_section_conflicts(&a).await.unwrap().is_empty());
        assert!(repo.delete_section(&b2).await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_evaluate_candidate_excludes_taken_rooms_and_reports_conflicts() {
        let a = lecture("171", 1);
        let b = lecture("200", 1);
        let repo = repo_with(&[a.clone(), b.clone()]).await;
        allow(&repo, &a, &["BUSH 105", "BUSH 110"], &["MWF 10:00 - 10:50"]).await;
        allow(&repo, &b, &["BUSH 105"], &["MW 10:00 - 11:15"]).await;

        let mut detail = repo.get_section_detail(&b).await.unwrap();
        detail.conflicts = vec![ConflictEntry::new("CMS 171", Severity::Light)];
        repo.save_section_detail(&detail).await.unwrap();

        repo.commit_assignment(&b, &RoomName::new("BUSH 105"), &TimeslotName::new("MW 10:00 - 11:15"))
            .await
            .unwrap();

        let evaluation = repo
            .evaluate_candidate(&a, &TimeslotName::new("MWF 10:00 - 10:50"))
            .await
            .unwrap();
        assert_eq!(evaluation.available_rooms, vec![RoomName::new("BUSH 110")]);
        assert_eq!(evaluation.conflicts.light, vec!["CMS 200 - Lecture 1"]);

        let result = repo
            .commit_assignment(&a, &RoomName::new("BUSH 105"), &TimeslotName::new("MWF 10:00 - 10:50"))
            .await;
        assert!(matches!(result, Err(RepositoryError::ValidationError { .. })));
    }

    #[tokio::test]
    async fn test_commit_requires_acceptable_pools() {
        let a = lecture("171", 1);
        let repo = repo_with(&[a.clone()]).await;
        allow(&repo, &a, &["BUSH 105"], &["MWF 10:00 - 10:50"]).await;

        assert!(repo
            .commit_assignment(&a, &RoomName::new("BUSH 110"), &TimeslotName::new("MWF 10:00 - 10:50"))
            .await
            .is_err());
        assert!(repo
            .commit_assignment(&a, &RoomName::new("BUSH 105"), &TimeslotName::new("MWF 8:00 - 8:50"))
            .await
            .is_err());

        let assignment = repo
            .commit_assignment(&a, &RoomName::new("BUSH 105"), &TimeslotName::new("MWF 10:00 - 10:50"))
            .await
            .unwrap();
        assert_eq!(assignment.room, Some(RoomName::new("BUSH 105")));
        let view = repo.get_assignment(&a).await.unwrap();
        assert_eq!(view.timeslot, Some(TimeslotName::new("MWF 10:00 - 10:50")));
    }

    #[tokio::test]
    async fn test_scheduler_avoids_heavy_conflicts() {
        let a = lecture("171", 1);
        let b = lecture("200", 1);
        let c = lecture("300", 1);
        let repo = repo_with(&[a.clone(), b.clone(), c.clone()]).await;
        allow(&repo, &a, &["BUSH 105"], &["MWF 10:00 - 10:50"]).await;
        allow(&repo, &b, &["BUSH 110"], &["MWF 10:00 - 10:50", "TR 11:00 - 12:15"]).await;
        allow(&repo, &c, &[], &["MWF 8:00 - 8:50"]).await;

        let mut detail = repo.get_section_detail(&b).await.unwrap();
        detail.conflicts = vec![ConflictEntry::new("CMS 171", Severity::Heavy)];
        repo.save_section_detail(&detail).await.unwrap();

        let report = repo.run_scheduler().await.unwrap();
        assert_eq!(report.placed.len(), 2);
        assert_eq!(report.unplaced, vec![c]);

        let view = repo.get_assignment(&b).await.unwrap();
        assert_eq!(view.timeslot, Some(TimeslotName::new("TR 11:00 - 12:15")));
        assert!(view.conflicts.is_empty());
    }

    #[tokio::test]
    async fn test_unhealthy_store_reports_connection_error() {
        let repo = LocalRepository::seeded();
        repo.set_healthy(false);
        assert!(!repo.health_check().await.unwrap());
        let err = repo.list_section_names().await.unwrap_err();
        assert!(err.is_unavailable());
    }

    #[tokio::test]
    async fn test_course_detail_counts_and_flags() {
        let repo = LocalRepository::seeded();
        repo.create_sections(&NewSections {
            prefix: "CMS".into(),
            number: "200".into(),
            title: "Data Structures".into(),
            sections: vec![
                SectionId::new("CMS", "200", SectionKind::Lecture, 1)
                    .with_holt(true)
                    .with_crosslisted(true),
                SectionId::new("CMS", "200", SectionKind::Lab, 1),
            ],
        })
        .await
        .unwrap();

        let detail = repo
            .get_course_detail(&CourseId::new("CMS", "200"))
            .await
            .unwrap();
        assert_eq!(detail.course, CourseName::new("CMS 200 - H/X"));
        assert_eq!(detail.title, "Data Structures");
        assert_eq!((detail.lectures, detail.labs), (1, 1));
        assert!(repo
            .get_course_detail(&CourseId::new("CMS", "999"))
            .await
            .unwrap_err()
            .is_not_found());
    }
}
