use crate::handlers;
use crate::state::AppState;
use axum::{routing::{get, post}, Router};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/attendance_summary", get(handlers::attendance_summary))
        .route("/reports", get(handlers::reports))
        .route("/reports/download", get(handlers::download_report))
        .route("/reports/custom", post(handlers::custom_report))
        .route("/user_profile", get(handlers::user_profile).post(handlers::submit_profile))
        .route("/user_profile/photo", post(handlers::upload_photo))
        .route("/uploads/:file", get(handlers::uploaded_file))
        .route("/static/images/default-profile.jpg", get(handlers::default_profile_image))
        .route("/api/attendance", post(handlers::record_attendance))
        .route("/api/attendance/summary", get(handlers::get_summary))
        .route("/api/attendance/overview", get(handlers::get_overview))
        .route("/api/user/profile", get(handlers::get_profile))
        .route("/api/users", post(handlers::register_user))
        .route("/api/reports/data", get(handlers::get_report_data))
        .with_state(state)
}
