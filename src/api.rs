use crate::models::{
    AiReport, AttendancePayload, AttendanceRecord, CreateStudentResponse, Credentials,
    DashboardStats, LoginResponse, Mark, MarkPayload, Student, StudentPayload, TeacherPayload,
    User,
};
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::{Serialize, de::DeserializeOwned};
use serde_json::json;
use std::env;
use thiserror::Error;

/// Fixed user-facing text for requests that never completed.
pub const CONNECTION_ERROR_MESSAGE: &str = "Connection error. Please check if backend is running.";

const DECODE_ERROR_MESSAGE: &str = "Unexpected response from server";

#[derive(Debug, Error)]
pub enum ApiError {
    /// 401 on a token-bearing call. Handlers answer this uniformly by
    /// clearing the session and redirecting to the login page.
    #[error("authentication rejected")]
    Unauthorized,
    /// Any other non-2xx, carrying the server-supplied `detail` message when
    /// the error body decodes.
    #[error("{message}")]
    Api { status: StatusCode, message: String },
    /// The request never completed.
    #[error("connection error")]
    Connection(#[source] reqwest::Error),
}

impl ApiError {
    pub fn user_message(&self) -> String {
        match self {
            ApiError::Unauthorized => "Session expired. Please login again.".to_string(),
            ApiError::Api { message, .. } => message.clone(),
            ApiError::Connection(_) => CONNECTION_ERROR_MESSAGE.to_string(),
        }
    }
}

pub fn resolve_api_base() -> String {
    let base = env::var("SCHOOL_API_URL").unwrap_or_else(|_| "http://localhost:8000/api".to_string());
    base.trim_end_matches('/').to_string()
}

/// Client for the school backend REST API. Every call carries the session
/// token as a `token` query parameter; responses are decoded JSON or a typed
/// failure. No retries, no timeouts beyond the transport's own.
#[derive(Clone)]
pub struct ApiClient {
    http: Client,
    base: String,
}

impl ApiClient {
    pub fn new(base: String) -> Self {
        Self {
            http: Client::new(),
            base,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base, path)
    }

    async fn dispatch<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, ApiError> {
        let response = request.send().await.map_err(ApiError::Connection)?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::Api {
                status,
                message: failure_message(status, &body),
            });
        }
        response.json().await.map_err(|_| ApiError::Api {
            status,
            message: DECODE_ERROR_MESSAGE.to_string(),
        })
    }

    async fn get_authed<T: DeserializeOwned>(&self, path: &str, token: &str) -> Result<T, ApiError> {
        self.dispatch(self.http.get(self.url(path)).query(&[("token", token)]))
            .await
            .map_err(escalate_unauthorized)
    }

    async fn post_authed<T: DeserializeOwned>(
        &self,
        path: &str,
        token: &str,
        body: &impl Serialize,
    ) -> Result<T, ApiError> {
        self.dispatch(
            self.http
                .post(self.url(path))
                .query(&[("token", token)])
                .json(body),
        )
        .await
        .map_err(escalate_unauthorized)
    }

    async fn put_authed<T: DeserializeOwned>(
        &self,
        path: &str,
        token: &str,
        body: &impl Serialize,
    ) -> Result<T, ApiError> {
        self.dispatch(
            self.http
                .put(self.url(path))
                .query(&[("token", token)])
                .json(body),
        )
        .await
        .map_err(escalate_unauthorized)
    }

    async fn delete_authed<T: DeserializeOwned>(
        &self,
        path: &str,
        token: &str,
    ) -> Result<T, ApiError> {
        self.dispatch(self.http.delete(self.url(path)).query(&[("token", token)]))
            .await
            .map_err(escalate_unauthorized)
    }

    /// Unauthenticated: a 401 here means bad credentials, not an expired
    /// session, so the decoded message is surfaced instead of escalating.
    pub async fn login(&self, credentials: &Credentials) -> Result<LoginResponse, ApiError> {
        self.dispatch(self.http.post(self.url("/login")).json(credentials))
            .await
    }

    pub async fn logout(&self, token: &str) -> Result<(), ApiError> {
        let _: serde_json::Value = self
            .dispatch(self.http.post(self.url("/logout")).query(&[("token", token)]))
            .await
            .map_err(escalate_unauthorized)?;
        Ok(())
    }

    pub async fn dashboard(&self, token: &str) -> Result<DashboardStats, ApiError> {
        self.get_authed("/dashboard", token).await
    }

    pub async fn teachers(&self, token: &str) -> Result<Vec<User>, ApiError> {
        self.get_authed("/teachers", token).await
    }

    pub async fn create_teacher(
        &self,
        token: &str,
        teacher: &TeacherPayload,
    ) -> Result<User, ApiError> {
        self.post_authed("/teachers", token, teacher).await
    }

    pub async fn update_teacher(
        &self,
        token: &str,
        teacher_id: i64,
        teacher: &TeacherPayload,
    ) -> Result<(), ApiError> {
        let _: serde_json::Value = self
            .put_authed(&format!("/teachers/{teacher_id}"), token, teacher)
            .await?;
        Ok(())
    }

    pub async fn delete_teacher(&self, token: &str, teacher_id: i64) -> Result<(), ApiError> {
        let _: serde_json::Value = self
            .delete_authed(&format!("/teachers/{teacher_id}"), token)
            .await?;
        Ok(())
    }

    /// Teachers receive the full roster; students receive only their own row.
    pub async fn students(&self, token: &str) -> Result<Vec<Student>, ApiError> {
        self.get_authed("/students", token).await
    }

    pub async fn create_student(
        &self,
        token: &str,
        student: &StudentPayload,
    ) -> Result<CreateStudentResponse, ApiError> {
        self.post_authed("/students", token, student).await
    }

    pub async fn update_student(
        &self,
        token: &str,
        student_id: i64,
        student: &StudentPayload,
    ) -> Result<(), ApiError> {
        let _: serde_json::Value = self
            .put_authed(&format!("/students/{student_id}"), token, student)
            .await?;
        Ok(())
    }

    pub async fn delete_student(&self, token: &str, student_id: i64) -> Result<(), ApiError> {
        let _: serde_json::Value = self
            .delete_authed(&format!("/students/{student_id}"), token)
            .await?;
        Ok(())
    }

    pub async fn create_mark(&self, token: &str, mark: &MarkPayload) -> Result<Mark, ApiError> {
        self.post_authed("/marks", token, mark).await
    }

    pub async fn marks(&self, token: &str, student_id: i64) -> Result<Vec<Mark>, ApiError> {
        self.get_authed(&format!("/marks/{student_id}"), token).await
    }

    pub async fn create_attendance(
        &self,
        token: &str,
        record: &AttendancePayload,
    ) -> Result<AttendanceRecord, ApiError> {
        self.post_authed("/attendance", token, record).await
    }

    pub async fn attendance(
        &self,
        token: &str,
        student_id: i64,
    ) -> Result<Vec<AttendanceRecord>, ApiError> {
        self.get_authed(&format!("/attendance/{student_id}"), token)
            .await
    }

    pub async fn ai_report(&self, token: &str, student_id: i64) -> Result<AiReport, ApiError> {
        self.post_authed("/ai-report", token, &json!({ "student_id": student_id }))
            .await
    }
}

fn escalate_unauthorized(err: ApiError) -> ApiError {
    match err {
        ApiError::Api { status, .. } if status == StatusCode::UNAUTHORIZED => {
            ApiError::Unauthorized
        }
        other => other,
    }
}

/// Decodes the backend's `detail` error field, falling back to a generic
/// message when the body is not JSON or the field is absent or non-textual.
fn failure_message(status: StatusCode, body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|value| {
            value
                .get("detail")
                .and_then(|detail| detail.as_str())
                .map(str::to_string)
        })
        .unwrap_or_else(|| format!("Request failed with status {}", status.as_u16()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failure_message_prefers_detail_field() {
        let message = failure_message(StatusCode::BAD_REQUEST, r#"{"detail":"Email already registered"}"#);
        assert_eq!(message, "Email already registered");
    }

    #[test]
    fn failure_message_falls_back_on_missing_detail() {
        assert_eq!(
            failure_message(StatusCode::BAD_GATEWAY, r#"{"error":"nope"}"#),
            "Request failed with status 502"
        );
    }

    #[test]
    fn failure_message_falls_back_on_non_json_body() {
        assert_eq!(
            failure_message(StatusCode::INTERNAL_SERVER_ERROR, "<html>boom</html>"),
            "Request failed with status 500"
        );
    }

    #[test]
    fn failure_message_ignores_structured_detail() {
        // FastAPI validation errors put an array under `detail`.
        assert_eq!(
            failure_message(StatusCode::UNPROCESSABLE_ENTITY, r#"{"detail":[{"loc":["body"]}]}"#),
            "Request failed with status 422"
        );
    }

    #[test]
    fn only_authed_calls_escalate_401() {
        let err = ApiError::Api {
            status: StatusCode::UNAUTHORIZED,
            message: "Invalid credentials".to_string(),
        };
        assert!(matches!(escalate_unauthorized(err), ApiError::Unauthorized));

        let err = ApiError::Api {
            status: StatusCode::FORBIDDEN,
            message: "Teacher access required".to_string(),
        };
        match escalate_unauthorized(err) {
            ApiError::Api { status, message } => {
                assert_eq!(status, StatusCode::FORBIDDEN);
                assert_eq!(message, "Teacher access required");
            }
            other => panic!("unexpected escalation: {other:?}"),
        }
    }
}
