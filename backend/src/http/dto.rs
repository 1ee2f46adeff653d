//! Data Transfer Objects for the HTTP API.
//!
//! Request and response bodies are the store DTOs from [`crate::api`]; this
//! module only adds the HTTP-specific envelopes and query strings.

use serde::{Deserialize, Serialize};

pub use crate::api::{
    Assignment, AssignmentView, CandidateEvaluation, CommitAssignmentRequest, ConflictEntry,
    CourseDetail, CreateCourseRequest, CreatedSections, NewSections, SchedulerReport,
    SectionDetail,
};

/// Query parameters for the section listing.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SectionListQuery {
    /// Only list sections with this prefix
    #[serde(default)]
    pub prefix: Option<String>,
}

/// Query parameters for candidate evaluation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CandidateQuery {
    /// Timeslot display string to evaluate
    pub timeslot: String,
}

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Status of the service
    pub status: String,
    /// Version of the API
    pub version: String,
    /// Store status
    pub database: String,
}
