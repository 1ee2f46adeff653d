//! # Timetabler
//!
//! Interactive editor for a university course timetable.
//!
//! Sections of courses are created, given acceptable rooms and timeslots, and
//! declared to conflict with other courses at a Heavy, Medium or Light
//! severity. The assignment workbench then lets the user try alternative
//! room/timeslot pairs for a section, showing the conflicts each choice would
//! cause, and commit one.
//!
//! ## Architecture
//!
//! - [`models`]: section / course / timeslot identifiers, ordering rules and conflict types
//! - [`api`]: DTOs exchanged with the timetable store
//! - [`db`]: the timetable store: repository traits, in-memory and HTTP
//!   implementations, configuration and service layer
//! - [`workbench`]: editing state, the assignment workbench and pane synchronization
//! - [`http`]: axum server exposing a store over HTTP
//!
//! ## Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use timetabler::api::CreateCourseRequest;
//! use timetabler::db::{FullRepository, LocalRepository, WorkbenchSettings};
//! use timetabler::workbench::{Command, EditorSession};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let repo: Arc<dyn FullRepository> = Arc::new(LocalRepository::seeded());
//!     let mut session = EditorSession::start(repo, WorkbenchSettings::default()).await?;
//!     session
//!         .dispatch(Command::CreateCourse(CreateCourseRequest {
//!             prefix: "CMS".into(),
//!             number: "171".into(),
//!             title: "Introduction to Computer Science".into(),
//!             lectures: 2,
//!             labs: 1,
//!             holt: false,
//!             crosslisted: false,
//!         }))
//!         .await?;
//!     println!("{} sections", session.views().sections().len());
//!     Ok(())
//! }
//! ```

// Allow large error types - RepositoryError contains rich context for debugging
#![allow(clippy::result_large_err)]

pub mod api;

pub mod db;
pub mod models;

pub mod workbench;

#[cfg(feature = "http-server")]
pub mod http;
