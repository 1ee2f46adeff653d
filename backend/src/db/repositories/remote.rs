//! HTTP client for a timetable store served by `timetabler-server`.
//!
//! Implements both repository traits over the `/v1` REST API. Error
//! responses are mapped back onto [`RepositoryError`] variants so callers
//! cannot tell a remote store from a local one.

use std::time::Duration;

use async_trait::async_trait;
use log::debug;
use reqwest::{Client, Method, RequestBuilder, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::api::*;
use crate::db::repository::*;

/// Default request timeout in milliseconds.
pub const DEFAULT_REMOTE_TIMEOUT_MS: u64 = 10_000;

/// Error body returned by the store's HTTP layer.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    code: String,
    message: String,
    #[serde(default)]
    details: Option<String>,
}

#[derive(Debug, Deserialize)]
struct HealthBody {
    database: String,
}

/// Remote timetable store client.
#[derive(Clone)]
pub struct RemoteRepository {
    client: Client,
    base_url: Url,
}

impl RemoteRepository {
    /// Create a client for the store at `base_url` (e.g. `http://localhost:8080`).
    pub fn new(base_url: &str, timeout: Duration) -> RepositoryResult<Self> {
        let base_url = Url::parse(base_url).map_err(|e| {
            RepositoryError::configuration_with_context(
                format!("Invalid timetable store URL: {}", e),
                ErrorContext::new("remote_repository").with_entity_id(base_url),
            )
        })?;
        if base_url.cannot_be_a_base() {
            return Err(RepositoryError::configuration(format!(
                "Timetable store URL cannot be a base: {}",
                base_url
            )));
        }

        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| RepositoryError::configuration(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Build `<base>/<segments...>` with every segment percent-encoded.
    fn url(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty();
            path.extend(segments);
        }
        url
    }

    fn request(&self, method: Method, segments: &[&str]) -> RequestBuilder {
        let url = self.url(segments);
        debug!("{} {}", method, url);
        self.client.request(method, url)
    }

    async fn send(&self, operation: &str, request: RequestBuilder) -> RepositoryResult<reqwest::Response> {
        let response = request
            .send()
            .await
            .map_err(|e| transport_error(operation, e))?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "<empty response>".to_string());
        Err(status_error(operation, status, &body))
    }

    async fn send_json<T: DeserializeOwned>(
        &self,
        operation: &str,
        request: RequestBuilder,
    ) -> RepositoryResult<T> {
        let response = self.send(operation, request).await?;
        response.json::<T>().await.map_err(|e| {
            RepositoryError::internal_with_context(
                format!("Failed to decode store response: {}", e),
                ErrorContext::new(operation),
            )
        })
    }
}

fn transport_error(operation: &str, err: reqwest::Error) -> RepositoryError {
    let context = ErrorContext::new(operation);
    if err.is_timeout() {
        RepositoryError::timeout_with_context(err.to_string(), context)
    } else {
        RepositoryError::connection_with_context(err.to_string(), context)
    }
}

fn status_error(operation: &str, status: StatusCode, body: &str) -> RepositoryError {
    let context = ErrorContext::new(operation).with_details(format!("status={}", status.as_u16()));
    let message = match serde_json::from_str::<ErrorBody>(body) {
        Ok(ErrorBody {
            code,
            message,
            details: Some(details),
        }) => format!("{}: {} ({})", code, message, details),
        Ok(ErrorBody { code, message, .. }) => format!("{}: {}", code, message),
        Err(_) => body.trim().to_string(),
    };

    match status {
        StatusCode::NOT_FOUND => RepositoryError::not_found_with_context(message, context),
        StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY | StatusCode::CONFLICT => {
            RepositoryError::validation_with_context(message, context)
        }
        StatusCode::SERVICE_UNAVAILABLE | StatusCode::BAD_GATEWAY => {
            RepositoryError::connection_with_context(message, context)
        }
        StatusCode::GATEWAY_TIMEOUT | StatusCode::REQUEST_TIMEOUT => {
            RepositoryError::timeout_with_context(message, context)
        }
        _ => RepositoryError::query_with_context(message, context),
    }
}

#[async_trait]
impl CatalogRepository for RemoteRepository {
    async fn health_check(&self) -> RepositoryResult<bool> {
        let body: HealthBody = self
            .send_json("health_check", self.request(Method::GET, &["health"]))
            .await?;
        Ok(body.database == "connected")
    }

    async fn create_sections(&self, request: &NewSections) -> RepositoryResult<CreatedSections> {
        self.send_json(
            "create_sections",
            self.request(Method::POST, &["v1", "sections"]).json(request),
        )
        .await
    }

    async fn list_section_names(&self) -> RepositoryResult<Vec<String>> {
        self.send_json(
            "list_section_names",
            self.request(Method::GET, &["v1", "sections"]),
        )
        .await
    }

    async fn list_sections_by_prefix(&self, prefix: &str) -> RepositoryResult<Vec<String>> {
        self.send_json(
            "list_sections_by_prefix",
            self.request(Method::GET, &["v1", "sections"])
                .query(&[("prefix", prefix)]),
        )
        .await
    }

    async fn get_section_detail(&self, section: &SectionId) -> RepositoryResult<SectionDetail> {
        let name = section.to_string();
        self.send_json(
            "get_section_detail",
            self.request(Method::GET, &["v1", "sections", &name]),
        )
        .await
    }

    async fn get_section_conflicts(
        &self,
        section: &SectionId,
    ) -> RepositoryResult<Vec<ConflictEntry>> {
        let name = section.to_string();
        self.send_json(
            "get_section_conflicts",
            self.request(Method::GET, &["v1", "sections", &name, "conflicts"]),
        )
        .await
    }

    async fn save_section_detail(&self, detail: &SectionDetail) -> RepositoryResult<()> {
        let name = detail.section.to_string();
        self.send(
            "save_section_detail",
            self.request(Method::PUT, &["v1", "sections", &name])
                .json(detail),
        )
        .await?;
        Ok(())
    }

    async fn delete_section(&self, section: &SectionId) -> RepositoryResult<()> {
        let name = section.to_string();
        self.send(
            "delete_section",
            self.request(Method::DELETE, &["v1", "sections", &name]),
        )
        .await?;
        Ok(())
    }

    async fn get_course_detail(&self, course: &CourseId) -> RepositoryResult<CourseDetail> {
        let name = course.to_string();
        self.send_json(
            "get_course_detail",
            self.request(Method::GET, &["v1", "courses", &name]),
        )
        .await
    }

    async fn list_prefixes(&self) -> RepositoryResult<Vec<String>> {
        self.send_json("list_prefixes", self.request(Method::GET, &["v1", "prefixes"]))
            .await
    }

    async fn list_buildings(&self) -> RepositoryResult<Vec<String>> {
        self.send_json("list_buildings", self.request(Method::GET, &["v1", "buildings"]))
            .await
    }

    async fn list_instructors(&self) -> RepositoryResult<Vec<String>> {
        self.send_json(
            "list_instructors",
            self.request(Method::GET, &["v1", "instructors"]),
        )
        .await
    }

    async fn list_rooms_by_building(&self, building: &str) -> RepositoryResult<Vec<RoomName>> {
        self.send_json(
            "list_rooms_by_building",
            self.request(Method::GET, &["v1", "buildings", building, "rooms"]),
        )
        .await
    }

    async fn list_timeslot_categories(&self) -> RepositoryResult<Vec<String>> {
        self.send_json(
            "list_timeslot_categories",
            self.request(Method::GET, &["v1", "timeslot-categories"]),
        )
        .await
    }

    async fn list_timeslots_by_category(
        &self,
        category: &str,
    ) -> RepositoryResult<Vec<TimeslotName>> {
        self.send_json(
            "list_timeslots_by_category",
            self.request(
                Method::GET,
                &["v1", "timeslot-categories", category, "timeslots"],
            ),
        )
        .await
    }
}

#[async_trait]
impl AssignmentRepository for RemoteRepository {
    async fn get_assignment(&self, section: &SectionId) -> RepositoryResult<AssignmentView> {
        let name = section.to_string();
        self.send_json(
            "get_assignment",
            self.request(Method::GET, &["v1", "sections", &name, "assignment"]),
        )
        .await
    }

    async fn evaluate_candidate(
        &self,
        section: &SectionId,
        timeslot: &TimeslotName,
    ) -> RepositoryResult<CandidateEvaluation> {
        let name = section.to_string();
        self.send_json(
            "evaluate_candidate",
            self.request(Method::GET, &["v1", "sections", &name, "candidates"])
                .query(&[("timeslot", timeslot.as_str())]),
        )
        .await
    }

    async fn commit_assignment(
        &self,
        section: &SectionId,
        room: &RoomName,
        timeslot: &TimeslotName,
    ) -> RepositoryResult<Assignment> {
        let name = section.to_string();
        let body = CommitAssignmentRequest {
            room: room.clone(),
            timeslot: timeslot.clone(),
        };
        self.send_json(
            "commit_assignment",
            self.request(Method::PUT, &["v1", "sections", &name, "assignment"])
                .json(&body),
        )
        .await
    }

    async fn run_scheduler(&self) -> RepositoryResult<SchedulerReport> {
        self.send_json(
            "run_scheduler",
            self.request(Method::POST, &["v1", "scheduler", "run"]),
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> RemoteRepository {
        RemoteRepository::new("http://store.local:8080/", Duration::from_millis(100)).unwrap()
    }

    #[test]
    fn test_url_segments_are_encoded() {
        let url = client().url(&["v1", "sections", "CMS 171 - Lecture 1", "assignment"]);
        assert_eq!(
            url.as_str(),
            "http://store.local:8080/v1/sections/CMS%20171%20-%20Lecture%201/assignment"
        );
    }

    #[test]
    fn test_invalid_base_url_is_configuration_error() {
        let result = RemoteRepository::new("not a url", Duration::from_secs(1));
        assert!(matches!(
            result,
            Err(RepositoryError::ConfigurationError { .. })
        ));
    }

    #[test]
    fn test_status_mapping() {
        let body = r#"{"code":"NOT_FOUND","message":"Section 'X' not found"}"#;
        let err = status_error("get_section_detail", StatusCode::NOT_FOUND, body);
        assert!(err.is_not_found());
        assert!(err.to_string().contains("Section 'X' not found"));

        let err = status_error("commit_assignment", StatusCode::UNPROCESSABLE_ENTITY, "{}");
        assert!(matches!(err, RepositoryError::ValidationError { .. }));

        let err = status_error("list_prefixes", StatusCode::SERVICE_UNAVAILABLE, "down");
        assert!(err.is_unavailable());

        let err = status_error("list_prefixes", StatusCode::INTERNAL_SERVER_ERROR, "boom");
        assert!(matches!(err, RepositoryError::QueryError { .. }));
    }

    #[tokio::test]
    async fn test_unreachable_store_is_unavailable() {
        let repo = RemoteRepository::new("http://127.0.0.1:9/", Duration::from_millis(200)).unwrap();
        let err = repo.list_section_names().await.unwrap_err();
        assert!(err.is_unavailable());
    }
}
