use crate::models::{AttendanceSummary, ReportData, Store, UserProfile};
use crate::report::ReportKind;
use crate::samples;
use chrono::{Datelike, Duration, Local, NaiveDate};
use std::collections::BTreeSet;
use tracing::warn;

/// Days in the reporting month. The backend does not track calendars yet.
pub const DAYS_IN_PERIOD: u32 = 30;

/// `round(part / total * 100)`, or 0 when there is nothing to divide by.
/// Counts are `u64` so callers can sum several `u32` series without overflow.
pub fn percent(part: u64, total: u64) -> u32 {
    if total == 0 {
        return 0;
    }
    (part as f64 / total as f64 * 100.0).round() as u32
}

pub fn build_summary(store: &Store) -> AttendanceSummary {
    let username = store
        .attendance
        .first()
        .map(|record| record.username.as_str())
        .unwrap_or("default_user");
    let present_days = days_present(store, username);

    AttendanceSummary {
        total_days: DAYS_IN_PERIOD,
        present_days,
        absent_days: DAYS_IN_PERIOD.saturating_sub(present_days),
        attendance_percentage: percent(present_days.into(), DAYS_IN_PERIOD.into()),
    }
}

/// Profile of the first registered user. `image_for` returns the uploaded
/// picture path for a username when one exists.
pub fn build_profile(store: &Store, image_for: impl Fn(&str) -> Option<String>) -> UserProfile {
    let defaults = samples::profile();
    let (username, role, email, department) = match store.users.first() {
        Some(user) => (
            user.username.clone(),
            user.role.clone().unwrap_or_else(|| "Student".into()),
            user.email.clone(),
            user.department.clone().unwrap_or_default(),
        ),
        None => (
            defaults.username,
            defaults.role,
            defaults.email,
            defaults.department,
        ),
    };

    let days_present = days_present(store, &username);
    let profile_image = image_for(&username).unwrap_or(defaults.profile_image);

    UserProfile {
        attendance_percentage: percent(days_present.into(), DAYS_IN_PERIOD.into()),
        days_present,
        profile_image,
        username,
        role,
        email,
        department,
    }
}

pub fn build_report(title: &str, store: &Store) -> ReportData {
    build_report_at(Local::now().date_naive(), title, store)
}

pub fn build_report_at(today: NaiveDate, title: &str, store: &Store) -> ReportData {
    match ReportKind::infer(title) {
        ReportKind::Weekly => {
            let week_start = today - Duration::days(today.weekday().num_days_from_monday() as i64);
            let mut counts = [0u32; 5];
            for date in record_dates(store) {
                let weekday = date.weekday().num_days_from_monday() as usize;
                if date >= week_start && weekday < counts.len() {
                    counts[weekday] += 1;
                }
            }
            samples::rate_report(&samples::WEEKDAY_LABELS, &as_rates(&counts, store))
        }
        ReportKind::Monthly => {
            let mut counts = [0u32; 4];
            for date in record_dates(store) {
                if date.year() == today.year() && date.month() == today.month() {
                    let week = ((date.day() - 1) / 7).min(3) as usize;
                    counts[week] += 1;
                }
            }
            samples::rate_report(&samples::MONTH_WEEK_LABELS, &as_rates(&counts, store))
        }
        kind => samples::report(kind),
    }
}

fn days_present(store: &Store, username: &str) -> u32 {
    store
        .attendance
        .iter()
        .filter(|record| record.username == username)
        .map(|record| record.date.as_str())
        .collect::<BTreeSet<_>>()
        .len() as u32
}

fn record_dates(store: &Store) -> impl Iterator<Item = NaiveDate> + '_ {
    store.attendance.iter().filter_map(|record| {
        match NaiveDate::parse_from_str(&record.date, "%Y-%m-%d") {
            Ok(date) => Some(date),
            Err(err) => {
                warn!("skipping attendance record with date '{}': {err}", record.date);
                None
            }
        }
    })
}

/// Raw counts become a percentage of distinct users; with no users the counts stay raw.
fn as_rates(counts: &[u32], store: &Store) -> Vec<f64> {
    let users = store
        .attendance
        .iter()
        .map(|record| record.username.as_str())
        .collect::<BTreeSet<_>>()
        .len() as u32;

    counts
        .iter()
        .map(|&count| {
            if users > 0 {
                f64::from(percent(count.into(), users.into()))
            } else {
                f64::from(count)
            }
        })
        .collect()
}
