use crate::errors::FetchError;
use crate::models::{AttendanceOverview, AttendanceSummary, ReportData, UserProfile};
use crate::source::AttendanceApi;
use reqwest::Client;
use serde::de::DeserializeOwned;
use std::time::Duration;

/// Fetches the JSON API from another server.
#[derive(Debug, Clone)]
pub struct HttpApi {
    client: Client,
    base_url: String,
}

impl HttpApi {
    pub fn new(base_url: impl Into<String>) -> Result<Self, FetchError> {
        let base_url = base_url.into();
        let client = Client::builder()
            .timeout(Duration::from_secs(5))
            .build()
            .map_err(|err| FetchError::Transport {
                url: base_url.clone(),
                reason: err.to_string(),
            })?;
        Ok(Self { client, base_url })
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<T, FetchError> {
        let url = format!("{}{path}", self.base_url);
        let response = self
            .client
            .get(&url)
            .query(query)
            .send()
            .await
            .map_err(|err| FetchError::Transport {
                url: url.clone(),
                reason: err.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url,
                status: status.as_u16(),
            });
        }

        response.json().await.map_err(|err| FetchError::Decode {
            url,
            reason: err.to_string(),
        })
    }
}

impl AttendanceApi for HttpApi {
    async fn summary(&self) -> Result<AttendanceSummary, FetchError> {
        self.get_json("/api/attendance/summary", &[]).await
    }

    async fn overview(&self) -> Result<AttendanceOverview, FetchError> {
        self.get_json("/api/attendance/overview", &[]).await
    }

    async fn profile(&self) -> Result<UserProfile, FetchError> {
        self.get_json("/api/user/profile", &[]).await
    }

    async fn report_data(&self, title: &str) -> Result<ReportData, FetchError> {
        self.get_json("/api/reports/data", &[("type", title)]).await
    }
}
