use crate::errors::AppError;
use crate::models::{AttendanceRecord, Store, UserRecord};
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::error;

const USERS_FILE: &str = "users.json";
const ATTENDANCE_FILE: &str = "attendance.json";

pub fn users_path(data_dir: &Path) -> PathBuf {
    data_dir.join(USERS_FILE)
}

pub fn attendance_path(data_dir: &Path) -> PathBuf {
    data_dir.join(ATTENDANCE_FILE)
}

pub fn uploads_dir(data_dir: &Path) -> PathBuf {
    data_dir.join("uploads")
}

pub async fn load_store(data_dir: &Path) -> Store {
    Store {
        users: load_list(&users_path(data_dir)).await,
        attendance: load_list(&attendance_path(data_dir)).await,
    }
}

async fn load_list<T: DeserializeOwned>(path: &Path) -> Vec<T> {
    match fs::read(path).await {
        Ok(bytes) => match serde_json::from_slice(&bytes) {
            Ok(items) => items,
            Err(err) => {
                error!("failed to parse {}: {err}", path.display());
                Vec::new()
            }
        },
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => Vec::new(),
        Err(err) => {
            error!("failed to read {}: {err}", path.display());
            Vec::new()
        }
    }
}

pub async fn persist_users(data_dir: &Path, users: &[UserRecord]) -> Result<(), AppError> {
    persist_list(&users_path(data_dir), users).await
}

pub async fn persist_attendance(
    data_dir: &Path,
    records: &[AttendanceRecord],
) -> Result<(), AppError> {
    persist_list(&attendance_path(data_dir), records).await
}

async fn persist_list<T: serde::Serialize>(path: &Path, items: &[T]) -> Result<(), AppError> {
    let payload = serde_json::to_vec_pretty(items).map_err(AppError::internal)?;
    fs::write(path, payload).await.map_err(AppError::internal)?;
    Ok(())
}
