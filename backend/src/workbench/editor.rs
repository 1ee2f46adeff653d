//! Section editor.
//!
//! Editing state of the section open in the conflict-editing pane. Every
//! change is applied to a draft copy and saved to the store; the draft only
//! replaces the live state once the store accepted it.

use std::time::Duration;

use log::debug;

use super::conflicts::ConflictRegistry;
use super::error::{within, WorkbenchResult};
use super::selector::{DualListSelector, Pool, TransferOutcome};
use crate::api::SectionDetail;
use crate::db::repo_config::WorkbenchSettings;
use crate::db::repository::FullRepository;
use crate::models::{
    build_custom_timeslot, CourseName, CustomMeeting, OrderingRules, RoomName, SectionId,
    Severity, TimeslotName,
};

#[derive(Debug, Clone)]
struct EditState {
    title: String,
    instructor: Option<String>,
    rooms: DualListSelector<RoomName>,
    timeslots: DualListSelector<TimeslotName>,
    conflicts: ConflictRegistry,
}

impl EditState {
    fn new(section: &SectionId, rules: OrderingRules) -> Self {
        Self {
            title: String::new(),
            instructor: None,
            rooms: DualListSelector::new(rules),
            timeslots: DualListSelector::new(rules),
            conflicts: ConflictRegistry::new(section.clone(), rules),
        }
    }

    fn load(&mut self, detail: SectionDetail) {
        self.title = detail.title;
        self.instructor = detail.instructor;
        self.rooms.load_acceptable(detail.acceptable_rooms);
        self.timeslots.load_acceptable(detail.acceptable_timeslots);
        self.conflicts.load(detail.conflicts);
    }

    fn to_detail(&self, section: &SectionId) -> SectionDetail {
        SectionDetail {
            section: section.clone(),
            title: self.title.clone(),
            instructor: self.instructor.clone(),
            acceptable_rooms: self.rooms.acceptable().to_vec(),
            acceptable_timeslots: self.timeslots.acceptable().to_vec(),
            conflicts: self.conflicts.entries().to_vec(),
        }
    }
}

pub struct SectionEditor {
    section: SectionId,
    live: EditState,
    timeout: Duration,
}

impl SectionEditor {
    /// Load `section` from the store.
    pub async fn open<R>(
        repo: &R,
        section: SectionId,
        settings: &WorkbenchSettings,
    ) -> WorkbenchResult<Self>
    where
        R: FullRepository + ?Sized,
    {
        let timeout = settings.request_timeout();
        let detail = within(timeout, "get_section_detail", repo.get_section_detail(&section)).await?;

        let mut live = EditState::new(&section, settings.ordering);
        live.load(detail);
        debug!("Opened {} for editing", section);
        Ok(Self {
            section,
            live,
            timeout,
        })
    }

    /// Replace the local state with the store's copy, keeping the shown scopes.
    pub async fn reload<R>(&mut self, repo: &R) -> WorkbenchResult<()>
    where
        R: FullRepository + ?Sized,
    {
        let detail = within(
            self.timeout,
            "get_section_detail",
            repo.get_section_detail(&self.section),
        )
        .await?;
        self.live.load(detail);
        Ok(())
    }

    pub fn section(&self) -> &SectionId {
        &self.section
    }

    pub fn title(&self) -> &str {
        &self.live.title
    }

    pub fn instructor(&self) -> Option<&str> {
        self.live.instructor.as_deref()
    }

    pub fn rooms(&self) -> &DualListSelector<RoomName> {
        &self.live.rooms
    }

    pub fn timeslots(&self) -> &DualListSelector<TimeslotName> {
        &self.live.timeslots
    }

    pub fn conflicts(&self) -> &ConflictRegistry {
        &self.live.conflicts
    }

    pub fn detail(&self) -> SectionDetail {
        self.live.to_detail(&self.section)
    }

    // ==================== Scope changes ====================

    pub async fn show_building<R>(&mut self, repo: &R, building: &str) -> WorkbenchResult<()>
    where
        R: FullRepository + ?Sized,
    {
        let rooms = within(
            self.timeout,
            "list_rooms_by_building",
            repo.list_rooms_by_building(building),
        )
        .await?;
        self.live.rooms.set_scope(building, rooms);
        Ok(())
    }

    pub async fn show_timeslot_category<R>(&mut self, repo: &R, category: &str) -> WorkbenchResult<()>
    where
        R: FullRepository + ?Sized,
    {
        let timeslots = within(
            self.timeout,
            "list_timeslots_by_category",
            repo.list_timeslots_by_category(category),
        )
        .await?;
        self.live.timeslots.set_scope(category, timeslots);
        Ok(())
    }

    pub async fn show_conflict_prefix<R>(&mut self, repo: &R, prefix: &str) -> WorkbenchResult<()>
    where
        R: FullRepository + ?Sized,
    {
        let names = within(
            self.timeout,
            "list_sections_by_prefix",
            repo.list_sections_by_prefix(prefix),
        )
        .await?;
        self.live.conflicts.set_candidate_scope(prefix, names);
        Ok(())
    }

    // ==================== Edits ====================

    pub async fn set_title<R>(&mut self, repo: &R, title: &str) -> WorkbenchResult<bool>
    where
        R: FullRepository + ?Sized,
    {
        let title = title.trim().to_string();
        self.save_draft(repo, "set_title", move |draft| {
            if draft.title == title {
                return Ok(false);
            }
            draft.title = title;
            Ok(true)
        })
        .await
    }

    pub async fn set_instructor<R>(&mut self, repo: &R, instructor: Option<String>) -> WorkbenchResult<bool>
    where
        R: FullRepository + ?Sized,
    {
        let instructor = instructor.filter(|name| !name.trim().is_empty());
        self.save_draft(repo, "set_instructor", move |draft| {
            if draft.instructor == instructor {
                return Ok(false);
            }
            draft.instructor = instructor;
            Ok(true)
        })
        .await
    }

    pub async fn transfer_room<R>(
        &mut self,
        repo: &R,
        from: Pool,
        to: Pool,
        room: &RoomName,
    ) -> WorkbenchResult<TransferOutcome>
    where
        R: FullRepository + ?Sized,
    {
        let mut outcome = TransferOutcome::Unchanged;
        self.save_draft(repo, "transfer_room", |draft| {
            outcome = draft.rooms.transfer(from, to, room)?;
            Ok(outcome.changed())
        })
        .await?;
        Ok(outcome)
    }

    pub async fn transfer_timeslot<R>(
        &mut self,
        repo: &R,
        from: Pool,
        to: Pool,
        timeslot: &TimeslotName,
    ) -> WorkbenchResult<TransferOutcome>
    where
        R: FullRepository + ?Sized,
    {
        let mut outcome = TransferOutcome::Unchanged;
        self.save_draft(repo, "transfer_timeslot", |draft| {
            outcome = draft.timeslots.transfer(from, to, timeslot)?;
            Ok(outcome.changed())
        })
        .await?;
        Ok(outcome)
    }

    /// Build an off-matrix timeslot from per-day inputs and accept it.
    pub async fn add_custom_timeslot<R>(
        &mut self,
        repo: &R,
        meetings: &[CustomMeeting],
    ) -> WorkbenchResult<TimeslotName>
    where
        R: FullRepository + ?Sized,
    {
        let timeslot = TimeslotName::new(build_custom_timeslot(meetings)?);
        let accepted = timeslot.clone();
        self.save_draft(repo, "add_custom_timeslot", move |draft| {
            Ok(draft.timeslots.add_custom(accepted))
        })
        .await?;
        Ok(timeslot)
    }

    pub async fn add_conflict<R>(&mut self, repo: &R, peer: CourseName) -> WorkbenchResult<bool>
    where
        R: FullRepository + ?Sized,
    {
        self.save_draft(repo, "add_conflict", move |draft| {
            draft.conflicts.add_conflict(peer).map(|_| true)
        })
        .await
    }

    pub async fn remove_conflict<R>(&mut self, repo: &R, peer: &CourseName) -> WorkbenchResult<bool>
    where
        R: FullRepository + ?Sized,
    {
        self.save_draft(repo, "remove_conflict", |draft| {
            Ok(draft.conflicts.remove_conflict(peer).is_some())
        })
        .await
    }

    /// Change a conflict's severity. Setting the current value saves nothing.
    pub async fn set_severity<R>(
        &mut self,
        repo: &R,
        peer: &CourseName,
        severity: Severity,
    ) -> WorkbenchResult<bool>
    where
        R: FullRepository + ?Sized,
    {
        self.save_draft(repo, "set_severity", |draft| {
            draft.conflicts.set_severity(peer, severity)
        })
        .await
    }

    /// Apply `edit` to a copy of the state and save it. Returns whether anything changed.
    async fn save_draft<R, F>(&mut self, repo: &R, operation: &str, edit: F) -> WorkbenchResult<bool>
    where
        R: FullRepository + ?Sized,
        F: FnOnce(&mut EditState) -> WorkbenchResult<bool>,
    {
        let mut draft = self.live.clone();
        if !edit(&mut draft)? {
            return Ok(false);
        }

        let detail = draft.to_detail(&self.section);
        within(self.timeout, operation, repo.save_section_detail(&detail)).await?;
        debug!("{}: saved {}", operation, self.section);
        self.live = draft;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::NewSections;
    use crate::db::repositories::LocalRepository;
    use crate::db::repository::CatalogRepository;
    use crate::models::{ClockReading, Meridiem, SectionKind, Weekday};
    use crate::workbench::WorkbenchError;

    async fn setup() -> (LocalRepository, SectionId) {
        let repo = LocalRepository::seeded();
        let section = SectionId::new("CMS", "171", SectionKind::Lecture, 1);
        repo.create_sections(&NewSections {
            prefix: "CMS".into(),
            number: "171".into(),
            title: "Intro".into(),
            sections: vec![section.clone()],
        })
        .await
        .unwrap();
        (repo, section)
    }

    #[tokio::test]
    async fn test_room_edits_are_saved() {
        let (repo, section) = setup().await;
        let mut editor = SectionEditor::open(&repo, section.clone(), &WorkbenchSettings::default())
            .await
            .unwrap();
        editor.show_building(&repo, "CSS").await.unwrap();
        assert_eq!(editor.rooms().available().len(), 4);

        let room = RoomName::new("CSS 203");
        let outcome = editor
            .transfer_room(&repo, Pool::Available, Pool::Acceptable, &room)
            .await
            .unwrap();
        assert_eq!(outcome, TransferOutcome::Moved);

        let stored = repo.get_section_detail(&section).await.unwrap();
        assert_eq!(stored.acceptable_rooms, vec![room]);
    }

    #[tokio::test]
    async fn test_failed_save_leaves_state_untouched() {
        let (repo, section) = setup().await;
        let mut editor = SectionEditor::open(&repo, section, &WorkbenchSettings::default())
            .await
            .unwrap();
        editor.show_building(&repo, "BUSH").await.unwrap();
        let before = editor.rooms().available().to_vec();

        repo.set_healthy(false);
        let err = editor
            .transfer_room(&repo, Pool::Available, Pool::Acceptable, &RoomName::new("BUSH 105"))
            .await
            .unwrap_err();
        assert!(matches!(err, WorkbenchError::RemoteUnavailable(_)));
        assert_eq!(editor.rooms().available(), before.as_slice());
        assert!(editor.rooms().acceptable().is_empty());
    }

    #[tokio::test]
    async fn test_custom_timeslot_and_title() {
        let (repo, section) = setup().await;
        let mut editor = SectionEditor::open(&repo, section.clone(), &WorkbenchSettings::default())
            .await
            .unwrap();

        let meetings = [CustomMeeting {
            day: Weekday::Monday,
            start: ClockReading::new(1, 30, Meridiem::Pm),
            end: ClockReading::new(2, 45, Meridiem::Pm),
        }];
        let timeslot = editor.add_custom_timeslot(&repo, &meetings).await.unwrap();
        assert_eq!(timeslot.as_str(), "M 13:30 - 14:45");

        assert!(editor.set_title(&repo, "Intro to CS").await.unwrap());
        assert!(!editor.set_title(&repo, "Intro to CS").await.unwrap());

        let stored = repo.get_section_detail(&section).await.unwrap();
        assert_eq!(stored.title, "Intro to CS");
        assert_eq!(stored.acceptable_timeslots, vec![timeslot]);
        assert_eq!(
            repo.list_timeslots_by_category(crate::models::OFF_MATRIX_CATEGORY)
                .await
                .unwrap()
                .len(),
            1
        );
    }

    #[tokio::test]
    async fn test_conflict_edits() {
        let (repo, section) = setup().await;
        let mut editor = SectionEditor::open(&repo, section.clone(), &WorkbenchSettings::default())
            .await
            .unwrap();
        let peer = CourseName::new("MAT 140");

        assert!(editor.add_conflict(&repo, peer.clone()).await.unwrap());
        assert!(editor.set_severity(&repo, &peer, Severity::Medium).await.unwrap());
        assert!(!editor.set_severity(&repo, &peer, Severity::Medium).await.unwrap());
        assert!(editor
            .add_conflict(&repo, CourseName::new("CMS 171"))
            .await
            .is_err());

        let stored = repo.get_section_detail(&section).await.unwrap();
        assert_eq!(stored.conflicts.len(), 1);
        assert_eq!(stored.conflicts[0].severity, Severity::Medium);

        assert!(editor.remove_conflict(&repo, &peer).await.unwrap());
        assert!(repo.get_section_conflicts(&section).await.unwrap().is_empty());
    }
}
