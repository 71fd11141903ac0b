use crate::client::HttpApi;
use crate::errors::FetchError;
use crate::models::{AttendanceOverview, AttendanceSummary, ReportData, Store, UserProfile};
use crate::samples;
use crate::stats::{build_profile, build_report, build_summary};
use crate::storage::uploads_dir;
use std::future::Future;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::Mutex;

/// The four reads the page controllers make.
pub trait AttendanceApi {
    fn summary(&self) -> impl Future<Output = Result<AttendanceSummary, FetchError>> + Send;
    fn overview(&self) -> impl Future<Output = Result<AttendanceOverview, FetchError>> + Send;
    fn profile(&self) -> impl Future<Output = Result<UserProfile, FetchError>> + Send;
    fn report_data(
        &self,
        title: &str,
    ) -> impl Future<Output = Result<ReportData, FetchError>> + Send;
}

/// Answers from the JSON store this process owns.
#[derive(Clone)]
pub struct LocalApi {
    data_dir: PathBuf,
    store: Arc<Mutex<Store>>,
}

impl LocalApi {
    pub fn new(data_dir: PathBuf, store: Arc<Mutex<Store>>) -> Self {
        Self { data_dir, store }
    }

    async fn uploaded_image(&self, username: &str) -> Option<String> {
        let file = format!("{username}.jpg");
        match tokio::fs::try_exists(uploads_dir(&self.data_dir).join(&file)).await {
            Ok(true) => Some(format!("/uploads/{file}")),
            _ => None,
        }
    }
}

impl AttendanceApi for LocalApi {
    async fn summary(&self) -> Result<AttendanceSummary, FetchError> {
        let store = self.store.lock().await;
        Ok(build_summary(&store))
    }

    async fn overview(&self) -> Result<AttendanceOverview, FetchError> {
        // No per-period series is recorded yet.
        Ok(samples::overview())
    }

    async fn profile(&self) -> Result<UserProfile, FetchError> {
        let username = {
            let store = self.store.lock().await;
            store.users.first().map(|user| user.username.clone())
        };
        let image = match username {
            Some(name) => self.uploaded_image(&name).await,
            None => None,
        };
        let store = self.store.lock().await;
        Ok(build_profile(&store, |_| image.clone()))
    }

    async fn report_data(&self, title: &str) -> Result<ReportData, FetchError> {
        let store = self.store.lock().await;
        Ok(build_report(title, &store))
    }
}

/// Where page controllers read from, chosen once at startup.
#[derive(Clone)]
pub enum Source {
    Local(LocalApi),
    Remote(HttpApi),
}

impl AttendanceApi for Source {
    async fn summary(&self) -> Result<AttendanceSummary, FetchError> {
        match self {
            Self::Local(api) => api.summary().await,
            Self::Remote(api) => api.summary().await,
        }
    }

    async fn overview(&self) -> Result<AttendanceOverview, FetchError> {
        match self {
            Self::Local(api) => api.overview().await,
            Self::Remote(api) => api.overview().await,
        }
    }

    async fn profile(&self) -> Result<UserProfile, FetchError> {
        match self {
            Self::Local(api) => api.profile().await,
            Self::Remote(api) => api.profile().await,
        }
    }

    async fn report_data(&self, title: &str) -> Result<ReportData, FetchError> {
        match self {
            Self::Local(api) => api.report_data(title).await,
            Self::Remote(api) => api.report_data(title).await,
        }
    }
}
