//! HTTP handlers for the REST API.
//!
//! Each handler corresponds to an API endpoint and delegates to the
//! repository or the service layer.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};

use super::dto::{
    Assignment, AssignmentView, CandidateEvaluation, CandidateQuery, CommitAssignmentRequest,
    ConflictEntry, CourseDetail, CreateCourseRequest, CreatedSections, HealthResponse,
    NewSections, SchedulerReport, SectionDetail, SectionListQuery,
};
use super::error::AppError;
use super::state::AppState;
use crate::db::services as db_services;
use crate::models::{parse_course_name, RoomName, SectionId, TimeslotName};

/// Result type for handlers.
pub type HandlerResult<T> = Result<Json<T>, AppError>;

// =============================================================================
// Health Check
// =============================================================================

/// GET /health
///
/// Health check endpoint to verify the service is running and the store answers.
pub async fn health_check(State(state): State<AppState>) -> HandlerResult<HealthResponse> {
    let db_status = match db_services::health_check(state.repository.as_ref()).await {
        Ok(true) => "connected".to_string(),
        Ok(false) => "disconnected".to_string(),
        Err(e) => format!("error: {}", e),
    };

    Ok(Json(HealthResponse {
        status: "ok".to_string(),
        version: "v1".to_string(),
        database: db_status,
    }))
}

// =============================================================================
// Sections
// =============================================================================

/// GET /v1/sections[?prefix=]
pub async fn list_sections(
    State(state): State<AppState>,
    Query(query): Query<SectionListQuery>,
) -> HandlerResult<Vec<String>> {
    let names = match query.prefix.as_deref() {
        Some(prefix) => state.repository.list_sections_by_prefix(prefix).await?,
        None => state.repository.list_section_names().await?,
    };
    Ok(Json(names))
}

/// POST /v1/sections
pub async fn create_sections(
    State(state): State<AppState>,
    Json(request): Json<NewSections>,
) -> Result<(StatusCode, Json<CreatedSections>), AppError> {
    let created = state.repository.create_sections(&request).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// POST /v1/courses
///
/// Create a course's lectures and labs, named by the service layer.
pub async fn create_course(
    State(state): State<AppState>,
    Json(request): Json<CreateCourseRequest>,
) -> Result<(StatusCode, Json<CreatedSections>), AppError> {
    let created = db_services::create_course(state.repository.as_ref(), &request).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// GET /v1/sections/{section}
pub async fn get_section(
    State(state): State<AppState>,
    Path(section): Path<String>,
) -> HandlerResult<SectionDetail> {
    let section = SectionId::parse(&section)?;
    Ok(Json(state.repository.get_section_detail(&section).await?))
}

/// PUT /v1/sections/{section}
pub async fn save_section(
    State(state): State<AppState>,
    Path(section): Path<String>,
    Json(detail): Json<SectionDetail>,
) -> Result<StatusCode, AppError> {
    let section = SectionId::parse(&section)?;
    if detail.section != section {
        return Err(AppError::BadRequest(format!(
            "Body describes {} but the path names {}",
            detail.section, section
        )));
    }
    state.repository.save_section_detail(&detail).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /v1/sections/{section}
pub async fn delete_section(
    State(state): State<AppState>,
    Path(section): Path<String>,
) -> Result<StatusCode, AppError> {
    let section = SectionId::parse(&section)?;
    state.repository.delete_section(&section).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /v1/sections/{section}/conflicts
pub async fn get_section_conflicts(
    State(state): State<AppState>,
    Path(section): Path<String>,
) -> HandlerResult<Vec<ConflictEntry>> {
    let section = SectionId::parse(&section)?;
    Ok(Json(state.repository.get_section_conflicts(&section).await?))
}

// =============================================================================
// Assignments
// =============================================================================

/// GET /v1/sections/{section}/assignment
pub async fn get_assignment(
    State(state): State<AppState>,
    Path(section): Path<String>,
) -> HandlerResult<AssignmentView> {
    let section = SectionId::parse(&section)?;
    Ok(Json(state.repository.get_assignment(&section).await?))
}

/// PUT /v1/sections/{section}/assignment
pub async fn commit_assignment(
    State(state): State<AppState>,
    Path(section): Path<String>,
    Json(request): Json<CommitAssignmentRequest>,
) -> HandlerResult<Assignment> {
    let section = SectionId::parse(&section)?;
    let assignment = state
        .repository
        .commit_assignment(&section, &request.room, &request.timeslot)
        .await?;
    Ok(Json(assignment))
}

/// GET /v1/sections/{section}/candidates?timeslot=
pub async fn evaluate_candidate(
    State(state): State<AppState>,
    Path(section): Path<String>,
    Query(query): Query<CandidateQuery>,
) -> HandlerResult<CandidateEvaluation> {
    let section = SectionId::parse(&section)?;
    let timeslot = TimeslotName::new(query.timeslot);
    timeslot.parse()?;
    Ok(Json(
        state.repository.evaluate_candidate(&section, &timeslot).await?,
    ))
}

/// POST /v1/scheduler/run
pub async fn run_scheduler(State(state): State<AppState>) -> HandlerResult<SchedulerReport> {
    Ok(Json(state.repository.run_scheduler().await?))
}

// =============================================================================
// Catalog
// =============================================================================

/// GET /v1/courses/{course}
pub async fn get_course(
    State(state): State<AppState>,
    Path(course): Path<String>,
) -> HandlerResult<CourseDetail> {
    let (course, _, _) = parse_course_name(&course)?;
    Ok(Json(state.repository.get_course_detail(&course).await?))
}

/// GET /v1/prefixes
pub async fn list_prefixes(State(state): State<AppState>) -> HandlerResult<Vec<String>> {
    Ok(Json(state.repository.list_prefixes().await?))
}

/// GET /v1/buildings
pub async fn list_buildings(State(state): State<AppState>) -> HandlerResult<Vec<String>> {
    Ok(Json(state.repository.list_buildings().await?))
}

/// GET /v1/buildings/{building}/rooms
pub async fn list_rooms(
    State(state): State<AppState>,
    Path(building): Path<String>,
) -> HandlerResult<Vec<RoomName>> {
    Ok(Json(state.repository.list_rooms_by_building(&building).await?))
}

/// GET /v1/instructors
pub async fn list_instructors(State(state): State<AppState>) -> HandlerResult<Vec<String>> {
    Ok(Json(state.repository.list_instructors().await?))
}

/// GET /v1/timeslot-categories
pub async fn list_timeslot_categories(State(state): State<AppState>) -> HandlerResult<Vec<String>> {
    Ok(Json(state.repository.list_timeslot_categories().await?))
}

/// GET /v1/timeslot-categories/{category}/timeslots
pub async fn list_timeslots(
    State(state): State<AppState>,
    Path(category): Path<String>,
) -> HandlerResult<Vec<TimeslotName>> {
    Ok(Json(
        state.repository.list_timeslots_by_category(&category).await?,
    ))
}
