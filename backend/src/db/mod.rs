//! Timetable store access.
//!
//! This module provides abstractions for store operations via the Repository pattern,
//! allowing the editor to run against an in-memory store or a remote one.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │  Application Layer (workbench, REST API)                │
//! └───────────────────┬─────────────────────────────────────┘
//!                     │
//! ┌───────────────────▼─────────────────────────────────────┐
//! │  Service Layer (services.rs) - Business Logic           │
//! │  - Section naming for new courses                       │
//! │  - Course projections                                   │
//! └───────────────────┬─────────────────────────────────────┘
//!                     │
//! ┌───────────────────▼─────────────────────────────────────┐
//! │  Repository Traits (repository/) - Abstract Interface   │
//! │  - CatalogRepository / AssignmentRepository             │
//! └───────────────────┬─────────────────────────────────────┘
//!                     │
//!     ┌───────────────┴────────────────┐
//!     │                                 │
//! ┌───▼──────────────┐     ┌──────────▼──────────────┐
//! │ Local Repository │     │ Remote Repository       │
//! │ (in-memory)      │     │ (HTTP client)           │
//! └──────────────────┘     └─────────────────────────┘
//! ```

#[cfg(not(any(feature = "remote-repo", feature = "local-repo")))]
compile_error!("Enable at least one repository backend feature.");

pub mod factory;
pub mod models;
pub mod repo_config;
pub mod repositories;
pub mod repository;
pub mod services;

// ==================== Service Layer ====================

pub use services::{create_course, health_check, list_course_names, plan_course_sections};

// ==================== Repository Pattern Exports ====================

pub use models::CatalogSeed;
pub use repo_config::{RepositoryConfig, WorkbenchSettings};

pub use factory::{RepositoryFactory, RepositoryType};
pub use repositories::LocalRepository;
#[cfg(feature = "remote-repo")]
pub use repositories::RemoteRepository;
pub use repository::{
    AssignmentRepository, CatalogRepository, ErrorContext, FullRepository, RepositoryError,
    RepositoryResult,
};
