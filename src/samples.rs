//! Fixed datasets rendered when a fetch fails, and served by the backend where
//! it has no real series to compute yet.

use crate::models::{AttendanceOverview, AttendanceSummary, Dataset, Paint, ReportData, UserProfile};
use crate::report::ReportKind;

pub const DEFAULT_PROFILE_IMAGE: &str = "/static/images/default-profile.jpg";
pub const RATE_LABEL: &str = "Attendance Rate (%)";

pub fn summary() -> AttendanceSummary {
    AttendanceSummary {
        total_days: 30,
        present_days: 27,
        absent_days: 3,
        attendance_percentage: 90,
    }
}

pub fn overview() -> AttendanceOverview {
    AttendanceOverview {
        labels: labels(&["Jan", "Feb", "Mar", "Apr", "May", "Jun"]),
        present: vec![20, 18, 22, 19, 21, 23],
        absent: vec![2, 4, 0, 3, 1, 0],
        late: vec![3, 2, 3, 2, 3, 2],
    }
}

pub fn profile() -> UserProfile {
    UserProfile {
        username: "John Doe".into(),
        role: "Student".into(),
        email: "john.doe@example.com".into(),
        department: "Computer Science".into(),
        attendance_percentage: 92,
        days_present: 24,
        profile_image: DEFAULT_PROFILE_IMAGE.into(),
    }
}

pub const WEEKDAY_LABELS: [&str; 5] = ["Monday", "Tuesday", "Wednesday", "Thursday", "Friday"];
pub const MONTH_WEEK_LABELS: [&str; 4] = ["Week 1", "Week 2", "Week 3", "Week 4"];
pub const DEPARTMENT_LABELS: [&str; 5] = ["CS Dept", "Engineering", "Business", "Arts", "Sciences"];
pub const TREND_LABELS: [&str; 6] = ["Jan", "Feb", "Mar", "Apr", "May", "Jun"];

/// Sample rates for a report kind. Monthly reports have no dedicated sample
/// and share the generic four-week series.
pub fn report(kind: ReportKind) -> ReportData {
    match kind {
        ReportKind::Weekly => rate_report(&WEEKDAY_LABELS, &[90.0, 85.0, 95.0, 88.0, 92.0]),
        ReportKind::Department => {
            rate_report(&DEPARTMENT_LABELS, &[95.0, 88.0, 82.0, 78.0, 90.0])
        }
        ReportKind::Trends => rate_report(&TREND_LABELS, &[75.0, 82.0, 88.0, 90.0, 92.0, 95.0]),
        ReportKind::Monthly | ReportKind::General => {
            rate_report(&MONTH_WEEK_LABELS, &[85.0, 92.0, 88.0, 95.0])
        }
    }
}

/// Single "Attendance Rate (%)" dataset in the report palette.
pub fn rate_report(names: &[&str], values: &[f64]) -> ReportData {
    ReportData {
        labels: labels(names),
        datasets: vec![Dataset {
            label: Some(RATE_LABEL.into()),
            data: values.to_vec(),
            background_color: Some(Paint::Single("rgba(52, 152, 219, 0.5)".into())),
            border_color: Some(Paint::Single("rgba(52, 152, 219, 1)".into())),
            border_width: Some(1),
            ..Dataset::default()
        }],
    }
}

fn labels(names: &[&str]) -> Vec<String> {
    names.iter().map(|name| name.to_string()).collect()
}
