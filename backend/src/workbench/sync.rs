//! View synchronizer.
//!
//! The creation, editing and scheduling panes each list sections and courses.
//! After any change to the timetable the synchronizer reloads the section
//! listing from the store and rebuilds every pane from scratch.

use std::fmt;
use std::time::Duration;

use log::{debug, info};
use serde::{Deserialize, Serialize};

use super::error::{within, WorkbenchError, WorkbenchResult};
use crate::api::{Assignment, SchedulerReport};
use crate::db::repo_config::WorkbenchSettings;
use crate::db::repository::FullRepository;
use crate::models::{course_names_of, sort_section_names, CourseName, OrderingRules, SectionId};

/// A change to the timetable that invalidates the panes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimetableChanged {
    SectionsCreated(Vec<SectionId>),
    SectionDeleted(SectionId),
    SectionEdited(SectionId),
    AssignmentCommitted(Assignment),
    SchedulerRan(SchedulerReport),
}

impl fmt::Display for TimetableChanged {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SectionsCreated(sections) => write!(f, "{} section(s) created", sections.len()),
            Self::SectionDeleted(section) => write!(f, "{} deleted", section),
            Self::SectionEdited(section) => write!(f, "{} edited", section),
            Self::AssignmentCommitted(assignment) => {
                write!(f, "assignment of {} committed", assignment.section)
            }
            Self::SchedulerRan(report) => write!(
                f,
                "scheduler placed {} and left {} unplaced",
                report.placed.len(),
                report.unplaced.len()
            ),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Pane {
    Creation,
    Editing,
    Scheduling,
}

impl Pane {
    pub const ALL: [Pane; 3] = [Pane::Creation, Pane::Editing, Pane::Scheduling];

    fn index(self) -> usize {
        match self {
            Pane::Creation => 0,
            Pane::Editing => 1,
            Pane::Scheduling => 2,
        }
    }
}

/// What one pane shows.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PaneView {
    pub prefix_filter: Option<String>,
    pub sections: Vec<SectionId>,
    pub courses: Vec<CourseName>,
    pub selected: Option<SectionId>,
}

impl PaneView {
    fn rebuild(&mut self, all_sections: &[SectionId]) {
        self.sections = all_sections
            .iter()
            .filter(|s| {
                self.prefix_filter
                    .as_deref()
                    .map_or(true, |prefix| s.prefix == prefix)
            })
            .cloned()
            .collect();
        self.courses = course_names_of(&self.sections);
        if let Some(selected) = &self.selected {
            if !self.sections.contains(selected) {
                debug!("Selection {} no longer listed", selected);
                self.selected = None;
            }
        }
    }
}

#[derive(Debug)]
pub struct ViewSynchronizer {
    rules: OrderingRules,
    timeout: Duration,
    sections: Vec<SectionId>,
    prefixes: Vec<String>,
    panes: [PaneView; 3],
    revision: u64,
}

impl ViewSynchronizer {
    pub fn new(settings: &WorkbenchSettings) -> Self {
        Self {
            rules: settings.ordering,
            timeout: settings.request_timeout(),
            sections: Vec::new(),
            prefixes: Vec::new(),
            panes: Default::default(),
            revision: 0,
        }
    }

    /// Every section in the store, ordered.
    pub fn sections(&self) -> &[SectionId] {
        &self.sections
    }

    pub fn prefixes(&self) -> &[String] {
        &self.prefixes
    }

    pub fn pane(&self, pane: Pane) -> &PaneView {
        &self.panes[pane.index()]
    }

    /// Number of completed reloads.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn contains(&self, section: &SectionId) -> bool {
        self.sections.contains(section)
    }

    /// Reload the listings and rebuild all panes.
    pub async fn refresh<R>(&mut self, repo: &R) -> WorkbenchResult<()>
    where
        R: FullRepository + ?Sized,
    {
        let (names, prefixes) = futures::try_join!(
            within(self.timeout, "list_section_names", repo.list_section_names()),
            within(self.timeout, "list_prefixes", repo.list_prefixes()),
        )?;

        self.sections = sort_section_names(names, self.rules.section_ordering);
        self.prefixes = prefixes;
        for pane in &mut self.panes {
            pane.rebuild(&self.sections);
        }
        self.revision += 1;
        Ok(())
    }

    /// React to a change of the timetable.
    pub async fn handle<R>(&mut self, repo: &R, event: &TimetableChanged) -> WorkbenchResult<()>
    where
        R: FullRepository + ?Sized,
    {
        info!("Timetable changed: {}", event);
        self.refresh(repo).await
    }

    /// Select a section in one pane, or clear the selection.
    pub fn select(&mut self, pane: Pane, section: Option<SectionId>) -> WorkbenchResult<()> {
        let view = &mut self.panes[pane.index()];
        if let Some(section) = &section {
            if !view.sections.contains(section) {
                return Err(WorkbenchError::invalid(format!(
                    "{} is not listed in the {:?} pane",
                    section, pane
                )));
            }
        }
        view.selected = section;
        Ok(())
    }

    /// Limit a pane to one prefix. Applied locally without reloading.
    pub fn set_prefix_filter(&mut self, pane: Pane, prefix: Option<String>) {
        let view = &mut self.panes[pane.index()];
        view.prefix_filter = prefix.filter(|p| !p.trim().is_empty());
        view.rebuild(&self.sections);
    }
}
