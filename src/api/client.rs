//! HTTP client for the hh.ru REST API

use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, warn};

use super::board::JobBoard;
use super::error::{ApiError, Result};
use super::models::{
    Application, ApplyResponse, Employer, Resume, ResumeList, SearchQuery, VacancyPage,
};
use crate::config::ApiConfig;

/// HTTP client configuration
#[derive(Debug, Clone)]
pub struct HttpConfig {
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
    pub user_agent: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self::from(&ApiConfig::default())
    }
}

impl From<&ApiConfig> for HttpConfig {
    fn from(api: &ApiConfig) -> Self {
        Self {
            connect_timeout: Duration::from_secs(api.connect_timeout_secs),
            request_timeout: Duration::from_secs(api.request_timeout_secs),
            user_agent: api.user_agent.clone(),
        }
    }
}

/// Client for the platform API, optionally authorized with a bearer token
pub struct ApiClient {
    client: Client,
    base_url: String,
    access_token: Option<String>,
}

impl ApiClient {
    /// Create a new API client
    pub fn new(api: &ApiConfig, access_token: Option<&str>) -> Result<Self> {
        Self::with_http_config(&api.base_url, HttpConfig::from(api), access_token)
    }

    pub fn with_http_config(
        base_url: &str,
        config: HttpConfig,
        access_token: Option<&str>,
    ) -> Result<Self> {
        // The platform asks API clients to identify themselves in HH-User-Agent
        let mut headers = HeaderMap::new();
        let agent = HeaderValue::from_str(&config.user_agent)
            .map_err(|e| ApiError::InvalidHeader(format!("user agent: {}", e)))?;
        headers.insert("HH-User-Agent", agent);

        let client = Client::builder()
            .connect_timeout(config.connect_timeout)
            .timeout(config.request_timeout)
            .user_agent(&config.user_agent)
            .default_headers(headers)
            .build()
            .map_err(|e| ApiError::RequestFailed(e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            access_token: access_token.map(str::to_string),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.access_token {
            Some(token) => request.header(AUTHORIZATION, format!("Bearer {}", token)),
            None => request,
        }
    }

    /// Send a request and decode a successful JSON body
    async fn fetch_json<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T> {
        let response = self.authorized(request).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::Status {
                status: status.as_u16(),
                body,
            });
        }

        response
            .json::<T>()
            .await
            .map_err(|e| ApiError::Decode(e.to_string()))
    }

    /// Search vacancies, one page at a time
    pub async fn search_vacancies(&self, query: &SearchQuery, page: u32) -> Result<VacancyPage> {
        debug!(page, text = %query.text, "Searching vacancies");

        let request = self
            .client
            .get(self.url("vacancies"))
            .query(query)
            .query(&[("page", page)]);

        let result = self.fetch_json::<VacancyPage>(request).await;
        match &result {
            Ok(data) => debug!(page, items = data.items.len(), pages = data.pages, "Search page fetched"),
            Err(e) => warn!(page, error = %e, "Failed to search vacancies"),
        }
        result
    }

    /// Submit an application and hand back the raw answer
    pub async fn apply(&self, application: &Application<'_>) -> Result<ApplyResponse> {
        debug!(vacancy_id = application.vacancy_id, "Submitting application");

        let mut form = vec![
            ("vacancy_id", application.vacancy_id),
            ("resume_id", application.resume_id),
        ];
        if let Some(message) = application.message {
            form.push(("message", message));
        }

        let response = self
            .authorized(self.client.post(self.url("negotiations")))
            .form(&form)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        if status != StatusCode::CREATED {
            debug!(vacancy_id = application.vacancy_id, status = status.as_u16(), body = %body, "Application not accepted");
        }

        Ok(ApplyResponse {
            status: status.as_u16(),
            body,
        })
    }

    /// Look up an employer profile
    pub async fn employer(&self, employer_id: &str) -> Result<Employer> {
        let request = self.client.get(self.url(&format!("employers/{}", employer_id)));
        self.fetch_json(request).await
    }

    /// Resumes of the authorized user
    pub async fn my_resumes(&self) -> Result<Vec<Resume>> {
        let request = self.client.get(self.url("resumes/mine"));
        let list: ResumeList = self.fetch_json(request).await?;
        Ok(list.items)
    }
}

#[async_trait]
impl JobBoard for ApiClient {
    async fn search(&self, query: &SearchQuery, page: u32) -> Result<VacancyPage> {
        self.search_vacancies(query, page).await
    }

    async fn apply(&self, application: &Application<'_>) -> Result<ApplyResponse> {
        ApiClient::apply(self, application).await
    }
}
