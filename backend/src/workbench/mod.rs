//! Interactive timetable editing.
//!
//! These components hold the state of one user's editing session and talk to
//! the timetable store through [`FullRepository`](crate::db::FullRepository):
//!
//! - [`selector`]: acceptable / available pools for rooms and timeslots
//! - [`conflicts`]: declared conflicts of one section and candidate courses
//! - [`editor`]: the section open in the editing pane, saved on every change
//! - [`assignment`]: browsing and committing alternative room/timeslot pairs
//! - [`sync`]: rebuilding the panes after every change
//! - [`session`]: the command dispatcher tying the above together

pub mod assignment;
pub mod conflicts;
pub mod editor;
pub mod error;
pub mod selector;
pub mod session;
pub mod sync;

pub use assignment::{AssignmentWorkbench, Browsing, CandidateTicket, WorkbenchState};
pub use conflicts::ConflictRegistry;
pub use editor::SectionEditor;
pub use error::{WorkbenchError, WorkbenchResult};
pub use selector::{DualListSelector, Pool, PoolItem, TransferOutcome};
pub use session::{Command, EditorSession, Outcome};
pub use sync::{Pane, PaneView, TimetableChanged, ViewSynchronizer};
