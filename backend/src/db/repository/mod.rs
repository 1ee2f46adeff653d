//! Repository trait definitions for the timetable store.
//!
//! The store is split into two focused traits so implementations (and test
//! doubles) can be written against the part they actually serve.
//!
//! # Module Organization
//!
//! - [`error`]: Error types for repository operations
//! - [`catalog`]: Sections, course details and the static campus catalog
//! - [`assignment`]: Committed assignments, candidate evaluation and the scheduler
//!
//! # Convenience Trait Bound
//!
//! For code that needs every store capability, use [`FullRepository`]:
//!
//! ```ignore
//! async fn refresh<R: FullRepository + ?Sized>(repo: &R) -> RepositoryResult<()> {
//!     let names = repo.list_section_names().await?;
//!     let report = repo.run_scheduler().await?;
//!     Ok(())
//! }
//! ```

pub mod assignment;
pub mod catalog;
pub mod error;

// Re-export error types
pub use error::{ErrorContext, RepositoryError, RepositoryResult};

// Re-export all traits
pub use assignment::AssignmentRepository;
pub use catalog::CatalogRepository;

/// Composite trait bound for a complete timetable store.
///
/// Automatically implemented for any type that implements both repository
/// traits.
pub trait FullRepository: CatalogRepository + AssignmentRepository {}

// Blanket implementation: any type implementing both traits automatically implements FullRepository
impl<T> FullRepository for T where T: CatalogRepository + AssignmentRepository {}
