//! Editor session.
//!
//! Owns everything one user works with: the store handle, the pane views,
//! the section open for editing and the assignment workbench. User actions
//! arrive as [`Command`]s; every command that changes the timetable is
//! followed by a [`TimetableChanged`] event so all panes are rebuilt.

use std::sync::Arc;
use std::time::Duration;

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use super::assignment::AssignmentWorkbench;
use super::editor::SectionEditor;
use super::error::{within, WorkbenchError, WorkbenchResult};
use super::selector::{Pool, TransferOutcome};
use super::sync::{Pane, TimetableChanged, ViewSynchronizer};
use crate::api::{Assignment, CandidateEvaluation, CreateCourseRequest, CreatedSections, SchedulerReport};
use crate::db::repo_config::WorkbenchSettings;
use crate::db::repository::FullRepository;
use crate::db::services;
use crate::models::{CourseName, CustomMeeting, RoomName, SectionId, Severity, TimeslotName};

/// A user action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "kebab-case")]
pub enum Command {
    CreateCourse(CreateCourseRequest),
    DeleteSection { section: SectionId },
    SelectSection { pane: Pane, section: Option<SectionId> },
    SetPrefixFilter { pane: Pane, prefix: Option<String> },

    // Section editing
    SetTitle { title: String },
    SetInstructor { instructor: Option<String> },
    ShowBuilding { building: String },
    ShowTimeslotCategory { category: String },
    ShowConflictPrefix { prefix: String },
    TransferRoom { from: Pool, to: Pool, room: RoomName },
    TransferTimeslot { from: Pool, to: Pool, timeslot: TimeslotName },
    AddCustomTimeslot { meetings: Vec<CustomMeeting> },
    AddConflict { peer: CourseName },
    RemoveConflict { peer: CourseName },
    SetSeverity { peer: CourseName, severity: Severity },

    // Scheduling
    RunScheduler,
    EvaluateCandidate { timeslot: TimeslotName },
    SelectCandidateRoom { room: RoomName },
    CommitAssignment,
    CancelAssignment,
}

/// What a command produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Done,
    Created(CreatedSections),
    Transferred(TransferOutcome),
    CustomTimeslot(TimeslotName),
    Evaluated(CandidateEvaluation),
    Committed(Assignment),
    Scheduled(SchedulerReport),
}

pub struct EditorSession {
    repo: Arc<dyn FullRepository>,
    timeout: Duration,
    settings: WorkbenchSettings,
    views: ViewSynchronizer,
    editor: Option<SectionEditor>,
    workbench: AssignmentWorkbench,
}

impl EditorSession {
    /// Create a session and load the initial pane contents.
    pub async fn start(
        repo: Arc<dyn FullRepository>,
        settings: WorkbenchSettings,
    ) -> WorkbenchResult<Self> {
        let mut session = Self {
            timeout: settings.request_timeout(),
            views: ViewSynchronizer::new(&settings),
            editor: None,
            workbench: AssignmentWorkbench::new(&settings),
            settings,
            repo,
        };
        session.views.refresh(session.repo.as_ref()).await?;
        Ok(session)
    }

    pub fn views(&self) -> &ViewSynchronizer {
        &self.views
    }

    pub fn editor(&self) -> Option<&SectionEditor> {
        self.editor.as_ref()
    }

    pub fn workbench(&self) -> &AssignmentWorkbench {
        &self.workbench
    }

    pub fn repository(&self) -> &Arc<dyn FullRepository> {
        &self.repo
    }

    /// Run one command.
    pub async fn dispatch(&mut self, command: Command) -> WorkbenchResult<Outcome> {
        debug!("Dispatching {:?}", command);
        let repo = Arc::clone(&self.repo);
        let repo = repo.as_ref();

        match command {
            Command::CreateCourse(request) => {
                let created = within(
                    self.timeout,
                    "create_course",
                    services::create_course(repo, &request),
                )
                .await?;
                self.changed(TimetableChanged::SectionsCreated(created.created.clone()))
                    .await?;
                Ok(Outcome::Created(created))
            }
            Command::DeleteSection { section } => {
                within(self.timeout, "delete_section", repo.delete_section(&section)).await?;
                if self.editor.as_ref().map(|e| e.section()) == Some(&section) {
                    self.editor = None;
                }
                if self.workbench.browsing().map(|b| &b.section) == Some(&section) {
                    self.workbench.cancel();
                }
                self.changed(TimetableChanged::SectionDeleted(section)).await?;
                Ok(Outcome::Done)
            }
            Command::SelectSection { pane, section } => {
                self.views.select(pane, section.clone())?;
                match (pane, section) {
                    (Pane::Editing, Some(section)) => {
                        self.editor = Some(SectionEditor::open(repo, section, &self.settings).await?);
                    }
                    (Pane::Editing, None) => self.editor = None,
                    (Pane::Scheduling, Some(section)) => self.workbench.open(repo, section).await?,
                    (Pane::Scheduling, None) => self.workbench.cancel(),
                    (Pane::Creation, _) => {}
                }
                Ok(Outcome::Done)
            }
            Command::SetPrefixFilter { pane, prefix } => {
                self.views.set_prefix_filter(pane, prefix);
                Ok(Outcome::Done)
            }

            Command::SetTitle { title } => {
                let changed = self.editor_mut()?.set_title(repo, &title).await?;
                self.edited(changed).await?;
                Ok(Outcome::Done)
            }
            Command::SetInstructor { instructor } => {
                let changed = self.editor_mut()?.set_instructor(repo, instructor).await?;
                self.edited(changed).await?;
                Ok(Outcome::Done)
            }
            Command::ShowBuilding { building } => {
                self.editor_mut()?.show_building(repo, &building).await?;
                Ok(Outcome::Done)
            }
            Command::ShowTimeslotCategory { category } => {
                self.editor_mut()?.show_timeslot_category(repo, &category).await?;
                Ok(Outcome::Done)
            }
            Command::ShowConflictPrefix { prefix } => {
                self.editor_mut()?.show_conflict_prefix(repo, &prefix).await?;
                Ok(Outcome::Done)
            }
            Command::TransferRoom { from, to, room } => {
                let outcome = self.editor_mut()?.transfer_room(repo, from, to, &room).await?;
                self.edited(outcome.changed()).await?;
                Ok(Outcome::Transferred(outcome))
            }
            Command::TransferTimeslot { from, to, timeslot } => {
                let outcome = self
                    .editor_mut()?
                    .transfer_timeslot(repo, from, to, &timeslot)
                    .await?;
                self.edited(outcome.changed()).await?;
                Ok(Outcome::Transferred(outcome))
            }
            Command::AddCustomTimeslot { meetings } => {
                let timeslot = self.editor_mut()?.add_custom_timeslot(repo, &meetings).await?;
                self.edited(true).await?;
                Ok(Outcome::CustomTimeslot(timeslot))
            }
            Command::AddConflict { peer } => {
                let changed = self.editor_mut()?.add_conflict(repo, peer).await?;
                self.edited(changed).await?;
                Ok(Outcome::Done)
            }
            Command::RemoveConflict { peer } => {
                let changed = self.editor_mut()?.remove_conflict(repo, &peer).await?;
                self.edited(changed).await?;
                Ok(Outcome::Done)
            }
            Command::SetSeverity { peer, severity } => {
                let changed = self.editor_mut()?.set_severity(repo, &peer, severity).await?;
                self.edited(changed).await?;
                Ok(Outcome::Done)
            }

            Command::RunScheduler => {
                let report = within(self.timeout, "run_scheduler", repo.run_scheduler()).await?;
                info!(
                    "Scheduler placed {} section(s), {} unplaced",
                    report.placed.len(),
                    report.unplaced.len()
                );
                self.changed(TimetableChanged::SchedulerRan(report.clone())).await?;
                Ok(Outcome::Scheduled(report))
            }
            Command::EvaluateCandidate { timeslot } => {
                let evaluation = self.workbench.evaluate_candidate(repo, &timeslot).await?;
                Ok(Outcome::Evaluated(evaluation))
            }
            Command::SelectCandidateRoom { room } => {
                self.workbench.select_candidate_room(&room)?;
                Ok(Outcome::Done)
            }
            Command::CommitAssignment => {
                let assignment = self.workbench.commit(repo).await?;
                // The commit is stored; a failed refresh must not report it as lost.
                if let Err(e) = self
                    .changed(TimetableChanged::AssignmentCommitted(assignment.clone()))
                    .await
                {
                    warn!(
                        "Committed {} but refreshing the views failed: {}",
                        assignment.section, e
                    );
                }
                Ok(Outcome::Committed(assignment))
            }
            Command::CancelAssignment => {
                self.workbench.cancel();
                Ok(Outcome::Done)
            }
        }
    }

    fn editor_mut(&mut self) -> WorkbenchResult<&mut SectionEditor> {
        self.editor
            .as_mut()
            .ok_or_else(|| WorkbenchError::invalid("No section is open for editing"))
    }

    async fn edited(&mut self, changed: bool) -> WorkbenchResult<()> {
        if !changed {
            return Ok(());
        }
        let section = self.editor_mut()?.section().clone();
        self.changed(TimetableChanged::SectionEdited(section)).await
    }

    async fn changed(&mut self, event: TimetableChanged) -> WorkbenchResult<()> {
        let repo = Arc::clone(&self.repo);
        self.views.handle(repo.as_ref(), &event).await?;

        // The event may have removed the open section, or changed it behind
        // the editor's back (a deleted course drops out of conflict lists).
        let still_listed = match &self.editor {
            Some(editor) => self.views.contains(editor.section()),
            None => return Ok(()),
        };
        if !still_listed {
            self.editor = None;
        } else if let Some(editor) = self.editor.as_mut() {
            editor.reload(repo.as_ref()).await?;
        }
        Ok(())
    }
}
