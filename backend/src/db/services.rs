//! High-level store service layer.
//!
//! Repository-agnostic operations that hold the rules which must be the same
//! for every store implementation, such as how a course's sections are named.
//!
//! # Usage
//!
//! ```no_run
//! use timetabler::api::CreateCourseRequest;
//! use timetabler::db::{services, repositories::LocalRepository};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let repo = LocalRepository::seeded();
//!     let request = CreateCourseRequest {
//!         prefix: "cms".into(),
//!         number: "171".into(),
//!         title: "Introduction to Computer Science".into(),
//!         lectures: 2,
//!         labs: 1,
//!         holt: false,
//!         crosslisted: false,
//!     };
//!     let created = services::create_course(&repo, &request).await?;
//!     println!("Created {} sections", created.created.len());
//!     Ok(())
//! }
//! ```

use log::{info, warn};

use super::repository::{ErrorContext, FullRepository, RepositoryError, RepositoryResult};
use crate::api::{CreateCourseRequest, CreatedSections, NewSections, SectionId, SectionKind};
use crate::models::{course_names_of, sort_section_names, CourseName, SectionOrdering};

/// Check store connectivity.
pub async fn health_check<R: FullRepository + ?Sized>(repo: &R) -> RepositoryResult<bool> {
    repo.health_check().await
}

/// Name the sections of a new course.
///
/// The prefix is upper-cased; lectures come first, then labs, each numbered
/// from 1 and carrying the course's Holt / crosslisted flags.
pub fn plan_course_sections(request: &CreateCourseRequest) -> RepositoryResult<NewSections> {
    let context = || ErrorContext::new("create_course").with_entity("course");
    let prefix = request.prefix.trim().to_uppercase();
    let number = request.number.trim().to_string();
    let title = request.title.trim().to_string();

    if prefix.is_empty() || prefix.contains(char::is_whitespace) {
        return Err(RepositoryError::validation_with_context(
            "Course prefix must be a single non-empty word",
            context(),
        ));
    }
    if number.is_empty() || number.contains(char::is_whitespace) {
        return Err(RepositoryError::validation_with_context(
            "Course number must be a single non-empty word",
            context(),
        ));
    }
    if request.lectures == 0 && request.labs == 0 {
        return Err(RepositoryError::validation_with_context(
            "A course needs at least one lecture or lab",
            context().with_entity_id(format!("{} {}", prefix, number)),
        ));
    }

    let section = |kind, index| {
        SectionId::new(prefix.clone(), number.clone(), kind, index)
            .with_holt(request.holt)
            .with_crosslisted(request.crosslisted)
    };
    let sections = (1..=request.lectures)
        .map(|i| section(SectionKind::Lecture, i))
        .chain((1..=request.labs).map(|i| section(SectionKind::Lab, i)))
        .collect();

    Ok(NewSections {
        prefix,
        number,
        title,
        sections,
    })
}

/// Create every section of a course.
pub async fn create_course<R: FullRepository + ?Sized>(
    repo: &R,
    request: &CreateCourseRequest,
) -> RepositoryResult<CreatedSections> {
    let plan = plan_course_sections(request)?;
    let created = repo.create_sections(&plan).await?;

    if !created.skipped.is_empty() {
        warn!(
            "{} {}: {} section(s) already existed",
            plan.prefix,
            plan.number,
            created.skipped.len()
        );
    }
    info!(
        "Course {} {} '{}': {} section(s) created",
        plan.prefix,
        plan.number,
        plan.title,
        created.created.len()
    );
    Ok(created)
}

/// Course display names, optionally limited to one prefix.
pub async fn list_course_names<R: FullRepository + ?Sized>(
    repo: &R,
    prefix: Option<&str>,
) -> RepositoryResult<Vec<CourseName>> {
    let names = match prefix {
        Some(prefix) => repo.list_sections_by_prefix(prefix).await?,
        None => repo.list_section_names().await?,
    };
    let sections = sort_section_names(names, SectionOrdering::default());
    Ok(course_names_of(&sections))
}
