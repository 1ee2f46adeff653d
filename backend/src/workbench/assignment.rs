//! Assignment workbench.
//!
//! Lets the user browse alternative timeslots and rooms for one section and
//! commit one of them. Candidate evaluations are requested with a
//! [`CandidateTicket`]; a response is applied only while its ticket is the
//! outstanding one, so a slow answer for an earlier pick can never overwrite
//! the evaluation of a later pick.
//!
//! ```text
//!   Idle ── open(S) ──► Browsing(S) ── commit ──► Idle
//!    ▲                     │  ▲
//!    └──── cancel ─────────┘  └── select / evaluate candidates
//! ```

use std::time::Duration;

use log::{debug, info};

use super::error::{within, WorkbenchError, WorkbenchResult};
use crate::api::{Assignment, CandidateEvaluation};
use crate::db::repo_config::WorkbenchSettings;
use crate::db::repository::FullRepository;
use crate::models::{
    compare_timeslot_ids, GroupedConflicts, OrderingRules, RoomName, SectionId, TimeslotName,
};

/// Browsing state for one section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Browsing {
    pub section: SectionId,
    /// Assignment stored when the section was opened.
    pub committed: Assignment,
    pub committed_conflicts: GroupedConflicts,
    pub acceptable_timeslots: Vec<TimeslotName>,
    pub candidate_timeslot: Option<TimeslotName>,
    pub candidate_room: Option<RoomName>,
    /// Latest evaluation of `candidate_timeslot`, once its query completed.
    pub evaluation: Option<CandidateEvaluation>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum WorkbenchState {
    #[default]
    Idle,
    Browsing(Browsing),
}

/// Identifies one candidate query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateTicket {
    pub section: SectionId,
    pub timeslot: TimeslotName,
    seq: u64,
}

impl CandidateTicket {
    /// Ask the store which rooms are free and which conflicts arise at the ticket's timeslot.
    pub async fn fetch<R>(&self, repo: &R, timeout: Duration) -> WorkbenchResult<CandidateEvaluation>
    where
        R: FullRepository + ?Sized,
    {
        within(
            timeout,
            "evaluate_candidate",
            repo.evaluate_candidate(&self.section, &self.timeslot),
        )
        .await
    }
}

#[derive(Debug)]
pub struct AssignmentWorkbench {
    state: WorkbenchState,
    next_seq: u64,
    outstanding: Option<u64>,
    rules: OrderingRules,
    timeout: Duration,
}

impl AssignmentWorkbench {
    pub fn new(settings: &WorkbenchSettings) -> Self {
        Self {
            state: WorkbenchState::Idle,
            next_seq: 0,
            outstanding: None,
            rules: settings.ordering,
            timeout: settings.request_timeout(),
        }
    }

    pub fn state(&self) -> &WorkbenchState {
        &self.state
    }

    pub fn browsing(&self) -> Option<&Browsing> {
        match &self.state {
            WorkbenchState::Browsing(browsing) => Some(browsing),
            WorkbenchState::Idle => None,
        }
    }

    pub fn is_idle(&self) -> bool {
        matches!(self.state, WorkbenchState::Idle)
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Start browsing alternatives for `section`.
    ///
    /// The committed room and timeslot become the initial candidates; when a
    /// timeslot is committed its evaluation is loaded as well.
    pub async fn open<R>(&mut self, repo: &R, section: SectionId) -> WorkbenchResult<()>
    where
        R: FullRepository + ?Sized,
    {
        let view = within(self.timeout, "get_assignment", repo.get_assignment(&section)).await?;
        let detail =
            within(self.timeout, "get_section_detail", repo.get_section_detail(&section)).await?;
        let evaluation = match &view.timeslot {
            Some(timeslot) => Some(
                within(
                    self.timeout,
                    "evaluate_candidate",
                    repo.evaluate_candidate(&section, timeslot),
                )
                .await?,
            ),
            None => None,
        };

        let mut acceptable_timeslots = detail.acceptable_timeslots;
        let ordering = self.rules.timeslot_ordering;
        acceptable_timeslots.sort_by(|a, b| compare_timeslot_ids(a.as_str(), b.as_str(), ordering));

        // Any outstanding query belongs to the previous section.
        self.outstanding = None;
        self.state = WorkbenchState::Browsing(Browsing {
            committed: view.assignment(),
            committed_conflicts: view.conflicts,
            acceptable_timeslots,
            candidate_timeslot: view.timeslot,
            candidate_room: view.room,
            evaluation,
            section,
        });
        Ok(())
    }

    /// Pick a candidate timeslot and get the ticket for its evaluation.
    ///
    /// Clears the candidate room and supersedes any outstanding query.
    pub fn select_candidate_timeslot(&mut self, timeslot: &TimeslotName) -> WorkbenchResult<CandidateTicket> {
        let WorkbenchState::Browsing(browsing) = &mut self.state else {
            return Err(WorkbenchError::invalid("No section is open for reassignment"));
        };
        if !browsing.acceptable_timeslots.contains(timeslot) {
            return Err(WorkbenchError::invalid(format!(
                "{} is not an acceptable timeslot for {}",
                timeslot, browsing.section
            )));
        }

        browsing.candidate_timeslot = Some(timeslot.clone());
        browsing.candidate_room = None;
        browsing.evaluation = None;

        self.next_seq += 1;
        self.outstanding = Some(self.next_seq);
        Ok(CandidateTicket {
            section: browsing.section.clone(),
            timeslot: timeslot.clone(),
            seq: self.next_seq,
        })
    }

    /// Apply the answer to `ticket`'s query.
    ///
    /// Answers to superseded tickets are discarded with the silent
    /// [`WorkbenchError::StaleResponse`].
    pub fn complete_candidate_query(
        &mut self,
        ticket: &CandidateTicket,
        result: WorkbenchResult<CandidateEvaluation>,
    ) -> WorkbenchResult<&CandidateEvaluation> {
        let stale = || WorkbenchError::StaleResponse {
            section: ticket.section.to_string(),
            timeslot: ticket.timeslot.to_string(),
        };
        if self.outstanding != Some(ticket.seq) {
            debug!("Discarding stale evaluation of {} at {}", ticket.section, ticket.timeslot);
            return Err(stale());
        }
        let WorkbenchState::Browsing(browsing) = &mut self.state else {
            return Err(stale());
        };
        self.outstanding = None;

        let mut evaluation = result?;
        evaluation.available_rooms.sort();
        Ok(&*browsing.evaluation.insert(evaluation))
    }

    /// Select, fetch and apply in one step.
    pub async fn evaluate_candidate<R>(
        &mut self,
        repo: &R,
        timeslot: &TimeslotName,
    ) -> WorkbenchResult<CandidateEvaluation>
    where
        R: FullRepository + ?Sized,
    {
        let ticket = self.select_candidate_timeslot(timeslot)?;
        let result = ticket.fetch(repo, self.timeout).await;
        self.complete_candidate_query(&ticket, result).cloned()
    }

    /// Pick a room from the evaluated pool of the candidate timeslot.
    pub fn select_candidate_room(&mut self, room: &RoomName) -> WorkbenchResult<()> {
        let WorkbenchState::Browsing(browsing) = &mut self.state else {
            return Err(WorkbenchError::invalid("No section is open for reassignment"));
        };
        let available = browsing
            .evaluation
            .as_ref()
            .filter(|e| Some(&e.timeslot) == browsing.candidate_timeslot.as_ref())
            .map_or(false, |e| e.available_rooms.contains(room));
        if !available {
            return Err(WorkbenchError::invalid(format!(
                "{} is not available at the candidate timeslot",
                room
            )));
        }
        browsing.candidate_room = Some(room.clone());
        Ok(())
    }

    /// Store the candidate room and timeslot as the section's assignment.
    ///
    /// On failure the workbench keeps browsing so the user can retry.
    pub async fn commit<R>(&mut self, repo: &R) -> WorkbenchResult<Assignment>
    where
        R: FullRepository + ?Sized,
    {
        let Some(browsing) = self.browsing() else {
            return Err(WorkbenchError::invalid("No section is open for reassignment"));
        };
        let (Some(room), Some(timeslot)) = (&browsing.candidate_room, &browsing.candidate_timeslot)
        else {
            return Err(WorkbenchError::invalid(format!(
                "Pick a timeslot and a room for {} before committing",
                browsing.section
            )));
        };

        let assignment = within(
            self.timeout,
            "commit_assignment",
            repo.commit_assignment(&browsing.section, room, timeslot),
        )
        .await?;
        info!(
            "Committed {} to {} at {}",
            assignment.section, room, timeslot
        );
        self.close();
        Ok(assignment)
    }

    /// Leave without changing anything.
    pub fn cancel(&mut self) {
        self.close();
    }

    fn close(&mut self) {
        self.state = WorkbenchState::Idle;
        self.outstanding = None;
    }
}
