use crate::controllers::profile::{
    preview_image, refill_form, validate_required, ImageUpload, PROFILE_FORM_FIELDS,
    PROFILE_FORM_REQUIRED,
};
use crate::controllers::reports::{PDF_FAILED, REPORT_FAILED};
use crate::controllers::{AttendanceSummaryController, ReportsController, UserProfileController};
use crate::errors::AppError;
use crate::models::{
    AttendanceOverview, AttendanceRecord, AttendanceSummary, RecordAttendanceRequest,
    RegisterUserRequest, ReportData, ReportQuery, UserProfile, UserRecord,
};
use crate::report::CustomReportForm;
use crate::source::AttendanceApi;
use crate::state::AppState;
use crate::storage::{persist_attendance, persist_users, uploads_dir};
use crate::ui;
use axum::{
    extract::{Multipart, Path, Query, State},
    http::{header, StatusCode},
    response::{Html, IntoResponse, Redirect, Response},
    Form, Json,
};
use chrono::{Local, NaiveDate};
use serde::Deserialize;
use std::collections::HashMap;
use tracing::{info, warn};

pub async fn get_summary(State(state): State<AppState>) -> Result<Json<AttendanceSummary>, AppError> {
    Ok(Json(state.local_api().summary().await?))
}

pub async fn get_overview(
    State(state): State<AppState>,
) -> Result<Json<AttendanceOverview>, AppError> {
    Ok(Json(state.local_api().overview().await?))
}

pub async fn get_profile(State(state): State<AppState>) -> Result<Json<UserProfile>, AppError> {
    Ok(Json(state.local_api().profile().await?))
}

pub async fn get_report_data(
    State(state): State<AppState>,
    Query(query): Query<ReportQuery>,
) -> Result<Json<ReportData>, AppError> {
    Ok(Json(state.local_api().report_data(&query.report_type).await?))
}

pub async fn record_attendance(
    State(state): State<AppState>,
    Json(payload): Json<RecordAttendanceRequest>,
) -> Result<(StatusCode, Json<AttendanceRecord>), AppError> {
    let username = payload.username.trim();
    if username.is_empty() {
        return Err(AppError::bad_request("username is required"));
    }

    let now = Local::now();
    let record = AttendanceRecord {
        username: username.to_string(),
        timestamp: now.format("%Y-%m-%d %H:%M:%S").to_string(),
        date: now.date_naive().to_string(),
    };

    let mut store = state.store.lock().await;
    store.attendance.push(record.clone());
    persist_attendance(&state.data_dir, &store.attendance).await?;
    info!("attendance recorded for {}", record.username);

    Ok((StatusCode::CREATED, Json(record)))
}

pub async fn register_user(
    State(state): State<AppState>,
    Json(payload): Json<RegisterUserRequest>,
) -> Result<(StatusCode, Json<UserRecord>), AppError> {
    let username = payload.username.trim();
    if username.is_empty() {
        return Err(AppError::bad_request("username is required"));
    }

    let mut store = state.store.lock().await;
    if store.users.iter().any(|user| user.username == username) {
        return Err(AppError::conflict(format!("user '{username}' already exists")));
    }

    let user = UserRecord {
        username: username.to_string(),
        email: payload.email.trim().to_string(),
        role: payload.role,
        department: payload.department,
        registered_at: timestamp(),
    };
    store.users.push(user.clone());
    persist_users(&state.data_dir, &store.users).await?;
    info!("registered user {}", user.username);

    Ok((StatusCode::CREATED, Json(user)))
}

pub async fn index() -> Redirect {
    Redirect::to("/attendance_summary")
}

pub async fn attendance_summary(State(state): State<AppState>) -> Html<String> {
    let mut page = ui::summary_page();
    AttendanceSummaryController::new(&state.source)
        .activate(&mut page)
        .await;
    Html(ui::render_summary(&page))
}

#[derive(Debug, Deserialize)]
pub struct ReportsQuery {
    pub view: Option<String>,
}

pub async fn reports(
    State(state): State<AppState>,
    Query(query): Query<ReportsQuery>,
) -> Html<String> {
    let mut page = ui::reports_page();
    let controller = ReportsController::new(&state.source);
    controller.activate(&mut page, today()).await;
    if let Some(title) = query.view.as_deref().filter(|title| !title.trim().is_empty()) {
        controller.view(&mut page, title).await;
    }
    Html(ui::render_reports(&page))
}

#[derive(Debug, Deserialize)]
pub struct DownloadQuery {
    #[serde(default)]
    pub title: String,
}

pub async fn download_report(
    State(state): State<AppState>,
    Query(query): Query<DownloadQuery>,
) -> Response {
    let mut page = ui::reports_page();
    let controller = ReportsController::new(&state.source);
    match controller.download(&mut page, &query.title, &timestamp()).await {
        Ok(document) => Html(ui::render_document(&document)).into_response(),
        Err(_) => (
            StatusCode::BAD_GATEWAY,
            Html(ui::render_alert(page.alert().unwrap_or(PDF_FAILED))),
        )
            .into_response(),
    }
}

pub async fn custom_report(
    State(state): State<AppState>,
    Form(form): Form<CustomReportForm>,
) -> Response {
    let mut page = ui::reports_page();
    let controller = ReportsController::new(&state.source);
    match controller.submit_custom(&mut page, &form, today(), &timestamp()) {
        Ok(document) => Html(ui::render_document(&document)).into_response(),
        Err(_) => (
            StatusCode::UNPROCESSABLE_ENTITY,
            Html(ui::render_alert(page.alert().unwrap_or(REPORT_FAILED))),
        )
            .into_response(),
    }
}

pub async fn user_profile(State(state): State<AppState>) -> Html<String> {
    let mut page = ui::profile_page();
    UserProfileController::new(&state.source)
        .activate(&mut page)
        .await;
    Html(ui::render_profile(&page))
}

/// Blocked submissions come back with the offending fields marked.
pub async fn submit_profile(
    State(state): State<AppState>,
    Form(fields): Form<HashMap<String, String>>,
) -> Response {
    let mut page = ui::profile_page();
    UserProfileController::new(&state.source)
        .activate(&mut page)
        .await;
    refill_form(&mut page, &PROFILE_FORM_FIELDS, &fields);

    if validate_required(&mut page, &PROFILE_FORM_REQUIRED, &fields) {
        Redirect::to("/user_profile").into_response()
    } else {
        (
            StatusCode::UNPROCESSABLE_ENTITY,
            Html(ui::render_profile(&page)),
        )
            .into_response()
    }
}

pub async fn upload_photo(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Html<String>, AppError> {
    let mut upload = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|err| AppError::bad_request(err.to_string()))?
    {
        if field.name() != Some("photo") {
            continue;
        }
        let file_name = field.file_name().unwrap_or("photo").to_string();
        let content_type = field.content_type().unwrap_or_default().to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|err| AppError::bad_request(err.to_string()))?;
        upload = Some(ImageUpload {
            file_name,
            content_type,
            bytes: bytes.to_vec(),
        });
    }

    let upload = upload.ok_or_else(|| AppError::bad_request("no photo selected"))?;
    if !upload.is_image() {
        return Err(AppError::bad_request("photo must be an image"));
    }

    let mut page = ui::profile_page();
    UserProfileController::new(&state.source)
        .activate(&mut page)
        .await;
    if let Err(unsupported) = preview_image(&mut page, &upload) {
        warn!("{unsupported}; showing preview only");
        page.set_text(
            "photo-notice",
            "Preview only: the new picture has not been saved.",
        );
    }
    Ok(Html(ui::render_profile(&page)))
}

pub async fn uploaded_file(
    State(state): State<AppState>,
    Path(file): Path<String>,
) -> Result<Response, AppError> {
    if file.is_empty() || file.contains(['/', '\\']) || file.starts_with('.') {
        return Err(AppError::bad_request("invalid file name"));
    }
    let content_type = match file.rsplit_once('.').map(|(_, ext)| ext.to_ascii_lowercase()) {
        Some(ext) if ext == "png" => "image/png",
        Some(ext) if ext == "gif" => "image/gif",
        _ => "image/jpeg",
    };

    match tokio::fs::read(uploads_dir(&state.data_dir).join(&file)).await {
        Ok(bytes) => Ok(([(header::CONTENT_TYPE, content_type)], bytes).into_response()),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            Err(AppError::not_found(format!("{file} not found")))
        }
        Err(err) => Err(err.into()),
    }
}

/// Served under the `.jpg` path that profile payloads already carry as their
/// default picture; the body is the built-in SVG placeholder.
pub async fn default_profile_image() -> impl IntoResponse {
    ([(header::CONTENT_TYPE, "image/svg+xml")], ui::DEFAULT_PROFILE_SVG)
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

fn timestamp() -> String {
    Local::now().format("%Y-%m-%d %H:%M:%S").to_string()
}
