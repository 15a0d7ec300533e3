//! RFC 9457 problem responses for the profile endpoints.

use axum::http::{HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::domain::error::DomainError;

pub const APPLICATION_PROBLEM_JSON: &str = "application/problem+json";

pub type ApiResult<T> = Result<T, Problem>;

#[allow(clippy::trivially_copy_pass_by_ref)] // serde requires &T signature
fn serialize_status_code<S>(status: &StatusCode, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_u16(status.as_u16())
}

fn deserialize_status_code<'de, D>(deserializer: D) -> Result<StatusCode, D::Error>
where
    D: Deserializer<'de>,
{
    let code = u16::deserialize(deserializer)?;
    StatusCode::from_u16(code).map_err(serde::de::Error::custom)
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[must_use]
pub struct Problem {
    #[serde(rename = "type")]
    pub type_url: String,
    pub title: String,
    #[serde(
        serialize_with = "serialize_status_code",
        deserialize_with = "deserialize_status_code"
    )]
    pub status: StatusCode,
    pub detail: String,
    pub instance: String,
    pub trace_id: Option<String>,
}

impl Problem {
    pub fn new(status: StatusCode, title: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            type_url: "about:blank".to_owned(),
            title: title.into(),
            status,
            detail: detail.into(),
            instance: String::new(),
            trace_id: None,
        }
    }

    pub fn with_instance(mut self, uri: impl Into<String>) -> Self {
        self.instance = uri.into();
        self
    }
}

impl IntoResponse for Problem {
    fn into_response(self) -> Response {
        let status = self.status;
        let mut resp = axum::Json(self).into_response();
        *resp.status_mut() = status;
        resp.headers_mut().insert(
            axum::http::header::CONTENT_TYPE,
            HeaderValue::from_static(APPLICATION_PROBLEM_JSON),
        );
        resp
    }
}

/// Map a domain error to a problem response.
#[must_use]
pub fn domain_error_to_problem(e: &DomainError, instance: &str) -> Problem {
    let trace_id = tracing::Span::current()
        .id()
        .map(|id| id.into_u64().to_string());

    let problem = match e {
        DomainError::NotFound { id } => Problem::new(
            StatusCode::NOT_FOUND,
            "User not found",
            format!("No user with id {id}"),
        ),
        DomainError::Invalid(report) => Problem::new(
            StatusCode::UNPROCESSABLE_ENTITY,
            "Invalid user",
            report.errors.join("; "),
        ),
        DomainError::Database(_) => {
            tracing::error!(error = ?e, "Database error occurred");
            Problem::new(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal error",
                "An internal database error occurred",
            )
        }
    };

    Problem {
        trace_id,
        ..problem.with_instance(instance)
    }
}

/// Implement From<DomainError> for Problem so `?` works in handlers
impl From<DomainError> for Problem {
    fn from(e: DomainError) -> Self {
        domain_error_to_problem(&e, "/")
    }
}
