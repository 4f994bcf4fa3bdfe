//! Financial Health backend client
//!
//! HTTP client for the backend REST API. Requests carry the bearer token
//! when one is set and are retried on connection failures, timeouts, 429
//! and gateway errors.

use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;

use super::dto::*;
use super::error::ClientError;
use crate::auth::SimpleAuthSession;
use crate::clinic::{ClinicSubmission, FinancialClinicResult};
use crate::consent::{ConsentData, ConsentRecordRequest};
use crate::localization::{ContentError, ContentSource, ContentType, Language, LocalizedContent};
use crate::scoring::ScoreCalculation;
use crate::survey::{Question, SurveySubmission};

/// Configuration for the backend client
#[derive(Debug, Clone)]
pub struct BackendConfig {
    /// Base URL including any API prefix (e.g., "http://localhost:8000/api/v1")
    pub base_url: String,
    /// Request timeout in milliseconds
    pub request_timeout_ms: u64,
    /// Maximum attempts per request
    pub max_retries: u32,
    /// Base delay between attempts; attempt n waits n² times this
    pub retry_delay_ms: u64,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000/api/v1".to_string(),
            request_timeout_ms: 10_000,
            max_retries: 3,
            retry_delay_ms: 1000,
        }
    }
}

/// Backend REST API client
#[derive(Clone)]
pub struct BackendClient {
    client: Client,
    config: BackendConfig,
    token: Option<String>,
}

impl BackendClient {
    /// Create a new client with the given configuration
    pub fn new(config: BackendConfig) -> Result<Self, ClientError> {
        if !config.base_url.starts_with("http://") && !config.base_url.starts_with("https://") {
            return Err(ClientError::InvalidUrl(config.base_url));
        }

        let client = Client::builder()
            .timeout(Duration::from_millis(config.request_timeout_ms))
            .build()?;

        Ok(Self {
            client,
            config,
            token: None,
        })
    }

    /// Copy of this client that authenticates with `token`
    pub fn with_token(&self, token: impl Into<String>) -> Self {
        Self {
            client: self.client.clone(),
            config: self.config.clone(),
            token: Some(token.into()),
        }
    }

    pub fn config(&self) -> &BackendConfig {
        &self.config
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url.trim_end_matches('/'), path)
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let builder = self.client.request(method, self.url(path));
        match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    /// Check if the backend is reachable
    pub async fn health_check(&self) -> Result<(), ClientError> {
        let response = self
            .client
            .get(self.url("/health"))
            .send()
            .await
            .map_err(ClientError::from_reqwest)?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(ClientError::Unavailable)
        }
    }

    /// Send a request with retry logic
    async fn send(&self, build: impl Fn() -> RequestBuilder) -> Result<Response, ClientError> {
        let mut last_error = ClientError::Unavailable;

        for attempt in 0..self.config.max_retries.max(1) {
            if attempt > 0 {
                // Quadratic backoff: 1x, 4x, 9x the base delay
                let delay = self.config.retry_delay_ms * (attempt as u64).pow(2);
                tokio::time::sleep(Duration::from_millis(delay)).await;
            }

            match build().send().await {
                Ok(response) => {
                    let status = response.status();
                    if status.is_success() {
                        return Ok(response);
                    } else if status == StatusCode::TOO_MANY_REQUESTS {
                        if let Some(secs) = response
                            .headers()
                            .get("Retry-After")
                            .and_then(|v| v.to_str().ok())
                            .and_then(|v| v.parse::<u64>().ok())
                        {
                            tokio::time::sleep(Duration::from_secs(secs)).await;
                        }
                        last_error = ClientError::RateLimited;
                        continue;
                    } else if matches!(
                        status,
                        StatusCode::BAD_GATEWAY
                            | StatusCode::SERVICE_UNAVAILABLE
                            | StatusCode::GATEWAY_TIMEOUT
                    ) {
                        last_error = Self::status_error(response).await;
                        continue;
                    } else {
                        return Err(Self::status_error(response).await);
                    }
                }
                Err(e) => {
                    let error = ClientError::from_reqwest(e);
                    if !error.is_transient() {
                        return Err(error);
                    }
                    tracing::debug!(attempt, error = %error, "Backend request failed, retrying");
                    last_error = error;
                }
            }
        }

        Err(last_error)
    }

    async fn status_error(response: Response) -> ClientError {
        let status = response.status();
        let url = response.url().path().to_string();
        let text = response.text().await.unwrap_or_default();

        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => ClientError::Unauthorized,
            StatusCode::NOT_FOUND => ClientError::NotFound(url),
            _ => ClientError::ApiError {
                status: status.as_u16(),
                message: extract_message(&text),
            },
        }
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ClientError> {
        let response = self.send(|| self.request(Method::GET, path)).await?;
        Ok(response.json().await?)
    }

    async fn send_json<B, T>(&self, method: Method, path: &str, body: &B) -> Result<T, ClientError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let response = self
            .send(|| self.request(method.clone(), path).json(body))
            .await?;
        Ok(response.json().await?)
    }

    async fn get_bytes(&self, path: &str) -> Result<Vec<u8>, ClientError> {
        let response = self.send(|| self.request(Method::GET, path)).await?;
        Ok(response.bytes().await?.to_vec())
    }

    // ============================================
    // Surveys
    // ============================================

    /// Survey questions in a language
    pub async fn get_questions(&self, language: Language) -> Result<Vec<Question>, ClientError> {
        self.get_json(&format!("/surveys/questions?language={}", language))
            .await
    }

    /// Submit answers; scored as a guest unless a token is set
    pub async fn submit_survey(
        &self,
        submission: &SurveySubmission,
    ) -> Result<ScoreCalculation, ClientError> {
        let path = if self.is_authenticated() {
            "/surveys/submit"
        } else {
            "/surveys/submit-guest"
        };
        let result: ScoreCalculation = self.send_json(Method::POST, path, submission).await?;
        tracing::info!(
            result_id = result.id,
            guest = !self.is_authenticated(),
            "Survey submitted"
        );
        Ok(result)
    }

    /// Past results of the authenticated user
    pub async fn survey_history(&self) -> Result<Vec<ScoreCalculation>, ClientError> {
        if !self.is_authenticated() {
            return Err(ClientError::Unauthorized);
        }
        self.get_json("/surveys/history").await
    }

    /// Attach guest results to the authenticated account
    pub async fn migrate_guest_data(
        &self,
        request: &GuestMigrationRequest,
    ) -> Result<GuestMigrationResponse, ClientError> {
        if !self.is_authenticated() {
            return Err(ClientError::Unauthorized);
        }
        self.send_json(Method::POST, "/surveys/migrate-guest", request)
            .await
    }

    /// Rendered PDF report for a result
    pub async fn download_report_pdf(
        &self,
        result_id: i64,
        language: Language,
    ) -> Result<Vec<u8>, ClientError> {
        self.get_bytes(&format!(
            "/surveys/{}/report/pdf?language={}",
            result_id, language
        ))
        .await
    }

    /// Have the backend email the report for a result
    pub async fn email_report(
        &self,
        result_id: i64,
        request: &EmailReportRequest,
    ) -> Result<EmailReportResponse, ClientError> {
        self.send_json(
            Method::POST,
            &format!("/surveys/{}/report/email", result_id),
            request,
        )
        .await
    }

    // ============================================
    // OTP auth
    // ============================================

    /// Ask the backend to send a login code
    pub async fn request_otp(
        &self,
        email: &str,
        language: Language,
    ) -> Result<OtpRequestResponse, ClientError> {
        self.send_json(
            Method::POST,
            "/auth/otp/request",
            &OtpRequestBody { email, language },
        )
        .await
    }

    /// Exchange a login code for a session
    pub async fn verify_otp(&self, email: &str, code: &str) -> Result<SimpleAuthSession, ClientError> {
        let response: OtpVerifyResponse = self
            .send_json(Method::POST, "/auth/otp/verify", &OtpVerifyBody { email, code })
            .await?;

        Ok(SimpleAuthSession {
            user_id: response.user_id,
            email: response.email,
            access_token: response.access_token,
            expires_at: response.expires_at,
        })
    }

    // ============================================
    // Consent
    // ============================================

    pub async fn record_consent(
        &self,
        request: &ConsentRecordRequest,
    ) -> Result<MessageResponse, ClientError> {
        self.send_json(Method::POST, "/consent/record", request).await
    }

    pub async fn consent_status(&self, session_id: &str) -> Result<Option<ConsentData>, ClientError> {
        match self
            .get_json(&format!(
                "/consent/status?session_id={}",
                urlencoding::encode(session_id)
            ))
            .await
        {
            Ok(consent) => Ok(Some(consent)),
            Err(ClientError::NotFound(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }

    pub async fn revoke_consent(&self, session_id: &str) -> Result<MessageResponse, ClientError> {
        self.send_json(
            Method::POST,
            "/consent/revoke",
            &serde_json::json!({ "session_id": session_id }),
        )
        .await
    }

    // ============================================
    // Localization
    // ============================================

    /// All active content of a type in a language
    pub async fn fetch_localized_content(
        &self,
        content_type: ContentType,
        language: Language,
    ) -> Result<Vec<LocalizedContent>, ClientError> {
        self.get_json(&format!(
            "/localization/content/{}/{}",
            content_type, language
        ))
        .await
    }

    /// Admin: create a translation unit
    pub async fn create_localized_content(
        &self,
        content: &LocalizedContent,
    ) -> Result<LocalizedContent, ClientError> {
        self.send_json(Method::POST, "/localization/content", content)
            .await
    }

    /// Admin: replace a translation unit
    pub async fn update_localized_content(
        &self,
        id: i64,
        content: &LocalizedContent,
    ) -> Result<LocalizedContent, ClientError> {
        self.send_json(Method::PUT, &format!("/localization/content/{}", id), content)
            .await
    }

    /// Admin: delete a translation unit
    pub async fn delete_localized_content(&self, id: i64) -> Result<(), ClientError> {
        let path = format!("/localization/content/{}", id);
        self.send(|| self.request(Method::DELETE, &path)).await?;
        Ok(())
    }

    // ============================================
    // Financial Clinic
    // ============================================

    pub async fn clinic_questions(&self, language: Language) -> Result<Vec<Question>, ClientError> {
        self.get_json(&format!("/financial-clinic/questions?language={}", language))
            .await
    }

    pub async fn submit_clinic(
        &self,
        submission: &ClinicSubmission,
    ) -> Result<FinancialClinicResult, ClientError> {
        self.send_json(Method::POST, "/financial-clinic/submit", submission)
            .await
    }

    pub async fn clinic_report_pdf(
        &self,
        submission: &ClinicSubmission,
        language: Language,
    ) -> Result<Vec<u8>, ClientError> {
        let path = format!("/financial-clinic/report/pdf?language={}", language);
        let response = self
            .send(|| self.request(Method::POST, &path).json(submission))
            .await?;
        Ok(response.bytes().await?.to_vec())
    }

    // ============================================
    // Admin
    // ============================================

    pub async fn admin_login(
        &self,
        username: &str,
        password: &str,
    ) -> Result<AdminLoginResponse, ClientError> {
        self.send_json(
            Method::POST,
            "/admin/login",
            &AdminLoginBody { username, password },
        )
        .await
    }

    pub async fn admin_overview(&self) -> Result<AdminOverview, ClientError> {
        self.get_json("/admin/analytics/overview").await
    }

    /// Raw pillar score rows; parse with `scoring::parse_pillar_score`
    pub async fn admin_pillar_scores(&self) -> Result<Vec<serde_json::Value>, ClientError> {
        self.get_json("/admin/analytics/pillar-scores").await
    }

    pub async fn admin_submissions(&self, limit: usize) -> Result<Vec<AdminSubmissionRow>, ClientError> {
        self.get_json(&format!("/admin/analytics/submissions?limit={}", limit))
            .await
    }
}

#[async_trait]
impl ContentSource for BackendClient {
    async fn fetch_content(
        &self,
        content_type: ContentType,
        language: Language,
    ) -> Result<Vec<LocalizedContent>, ContentError> {
        Ok(self.fetch_localized_content(content_type, language).await?)
    }
}

/// Pull a readable message out of an error body (`detail`, `message` or `error`)
fn extract_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| {
            ["detail", "message", "error"]
                .iter()
                .find_map(|k| v.get(*k).and_then(|m| m.as_str()).map(str::to_string))
        })
        .unwrap_or_else(|| body.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = BackendConfig::default();
        assert_eq!(config.base_url, "http://localhost:8000/api/v1");
        assert_eq!(config.max_retries, 3);
    }

    #[test]
    fn test_rejects_bad_url() {
        let config = BackendConfig {
            base_url: "localhost:8000".to_string(),
            ..Default::default()
        };
        assert!(matches!(
            BackendClient::new(config),
            Err(ClientError::InvalidUrl(_))
        ));
    }

    #[test]
    fn test_url_join_and_token() {
        let client = BackendClient::new(BackendConfig {
            base_url: "http://backend/api/v1/".to_string(),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(client.url("/surveys/history"), "http://backend/api/v1/surveys/history");
        assert!(!client.is_authenticated());
        assert!(client.with_token("abc").is_authenticated());
    }

    #[test]
    fn test_extract_message() {
        assert_eq!(extract_message(r#"{"detail": "Invalid code"}"#), "Invalid code");
        assert_eq!(extract_message(r#"{"message": "Nope"}"#), "Nope");
        assert_eq!(extract_message("plain text"), "plain text");
    }

    // ============================================
    // Against an in-process backend
    // ============================================

    use axum::http::{HeaderMap, StatusCode as HttpStatus};
    use axum::routing::{get, post};
    use axum::{Json, Router};
    use serde_json::json;
    use std::collections::BTreeMap;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    async fn spawn_backend(router: Router) -> BackendClient {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });

        BackendClient::new(BackendConfig {
            base_url: format!("http://{}/api/v1", addr),
            request_timeout_ms: 2000,
            max_retries: 3,
            retry_delay_ms: 1,
        })
        .unwrap()
    }

    fn score_json(user_id: Option<i64>) -> serde_json::Value {
        json!({
            "id": 42,
            "user_id": user_id,
            "total_score": 60.0,
            "max_possible_score": 75.0,
            "pillar_scores": [{"pillar": "savings_habit", "score": 3.75, "max_score": 5.0}],
            "created_at": "2024-05-01T10:00:00Z"
        })
    }

    fn submission() -> SurveySubmission {
        SurveySubmission {
            responses: BTreeMap::from([("q1".to_string(), 4)]),
            profile: None,
            language: Language::En,
            consent_session_id: Some("session-1".to_string()),
        }
    }

    #[tokio::test]
    async fn test_submit_picks_guest_or_user_endpoint() {
        let router = Router::new()
            .route(
                "/api/v1/surveys/submit-guest",
                post(|| async { Json(score_json(None)) }),
            )
            .route(
                "/api/v1/surveys/submit",
                post(|headers: HeaderMap| async move {
                    match headers.get("authorization").and_then(|v| v.to_str().ok()) {
                        Some("Bearer token-1") => Ok(Json(score_json(Some(7)))),
                        _ => Err(HttpStatus::UNAUTHORIZED),
                    }
                }),
            );
        let client = spawn_backend(router).await;

        let guest = client.submit_survey(&submission()).await.unwrap();
        assert!(guest.is_guest());
        assert_eq!(guest.overall_percentage(), 80.0);

        let user = client
            .with_token("token-1")
            .submit_survey(&submission())
            .await
            .unwrap();
        assert_eq!(user.user_id, Some(7));

        let err = client
            .with_token("wrong")
            .submit_survey(&submission())
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::Unauthorized));
    }

    #[tokio::test]
    async fn test_retries_gateway_errors() {
        let hits = Arc::new(AtomicU32::new(0));
        let counter = Arc::clone(&hits);
        let router = Router::new().route(
            "/api/v1/localization/content/ui/en",
            get(move || {
                let counter = Arc::clone(&counter);
                async move {
                    if counter.fetch_add(1, Ordering::SeqCst) == 0 {
                        Err(HttpStatus::SERVICE_UNAVAILABLE)
                    } else {
                        Ok(Json(json!([{
                            "content_type": "ui",
                            "content_id": "app.title",
                            "language": "en",
                            "text": "Financial Health"
                        }])))
                    }
                }
            }),
        );
        let client = spawn_backend(router).await;

        let items = client
            .fetch_localized_content(ContentType::Ui, Language::En)
            .await
            .unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].content_id, "app.title");
        assert_eq!(hits.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_error_statuses() {
        let router = Router::new().route(
            "/api/v1/auth/otp/verify",
            post(|| async {
                (
                    HttpStatus::BAD_REQUEST,
                    Json(json!({"detail": "Invalid or expired code"})),
                )
            }),
        );
        let client = spawn_backend(router).await;

        match client.verify_otp("user@example.com", "000000").await {
            Err(ClientError::ApiError { status, message }) => {
                assert_eq!(status, 400);
                assert_eq!(message, "Invalid or expired code");
            }
            other => panic!("unexpected: {:?}", other.map(|s| s.email)),
        }

        // Unknown consent session is reported as no consent
        assert!(client.consent_status("missing").await.unwrap().is_none());

        assert!(matches!(
            client.survey_history().await,
            Err(ClientError::Unauthorized)
        ));
    }

    #[tokio::test]
    async fn test_unreachable_backend() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client = BackendClient::new(BackendConfig {
            base_url: format!("http://{}/api/v1", addr),
            request_timeout_ms: 1000,
            max_retries: 2,
            retry_delay_ms: 1,
        })
        .unwrap();

        assert!(matches!(
            client.get_questions(Language::En).await,
            Err(ClientError::Unavailable)
        ));
        assert!(client.health_check().await.is_err());
    }
}
