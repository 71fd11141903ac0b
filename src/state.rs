use crate::client::HttpApi;
use crate::config::Config;
use crate::errors::FetchError;
use crate::models::Store;
use crate::source::{LocalApi, Source};
use std::{path::PathBuf, sync::Arc};
use tokio::sync::Mutex;

#[derive(Clone)]
pub struct AppState {
    pub data_dir: PathBuf,
    pub store: Arc<Mutex<Store>>,
    /// What the page controllers read from.
    pub source: Source,
}

impl AppState {
    pub fn new(config: &Config, store: Store) -> Result<Self, FetchError> {
        let store = Arc::new(Mutex::new(store));
        let source = match &config.upstream_api {
            Some(url) => Source::Remote(HttpApi::new(url.clone())?),
            None => Source::Local(LocalApi::new(config.data_dir.clone(), Arc::clone(&store))),
        };
        Ok(Self {
            data_dir: config.data_dir.clone(),
            store,
            source,
        })
    }

    /// The JSON API always answers from this process's own store.
    pub fn local_api(&self) -> LocalApi {
        LocalApi::new(self.data_dir.clone(), Arc::clone(&self.store))
    }
}
