use crate::chart::{attendance_pie, attendance_trend};
use crate::models::AttendanceSummary;
use crate::page::Page;
use crate::samples;
use crate::source::AttendanceApi;
use tracing::{error, info, warn};

pub const ATTENDANCE_CHART: &str = "attendance-chart";
pub const TREND_CHART: &str = "attendance-trend-chart";

pub struct AttendanceSummaryController<'a, A> {
    api: &'a A,
}

impl<'a, A: AttendanceApi + Sync> AttendanceSummaryController<'a, A> {
    pub fn new(api: &'a A) -> Self {
        Self { api }
    }

    /// Loads summary and overview together; each falls back on its own.
    pub async fn activate(&self, page: &mut Page) {
        info!("initializing attendance summary page");

        let (summary, overview) = tokio::join!(self.api.summary(), self.api.overview());

        let summary = summary.unwrap_or_else(|err| {
            error!("error fetching attendance data: {err}");
            samples::summary()
        });
        show_summary(page, &summary);

        if !page.bind_chart(ATTENDANCE_CHART, attendance_pie(&summary)) {
            warn!("chart container not found");
        }

        if page.has(TREND_CHART) {
            let overview = overview.unwrap_or_else(|err| {
                error!("error fetching trend data: {err}");
                samples::overview()
            });
            page.bind_chart(TREND_CHART, attendance_trend(&overview));
        }
    }
}

pub fn show_summary(page: &mut Page, summary: &AttendanceSummary) {
    page.set_text(
        "attendance-percentage",
        format!("{}%", summary.attendance_percentage),
    );
    page.set_text("present-days", summary.present_days.to_string());
    page.set_text("absent-days", summary.absent_days.to_string());
    page.set_text("total-days", summary.total_days.to_string());
}
