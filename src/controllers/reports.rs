use crate::chart::{overview_stacked, report_chart};
use crate::errors::ReportError;
use crate::page::{BusyControl, Page};
use crate::report::{
    custom_document, fallback_report, report_document, CustomReportForm, CustomReportRequest,
    ReportDocument,
};
use crate::samples;
use crate::source::AttendanceApi;
use crate::ui;
use chrono::{Datelike, Duration, NaiveDate};
use tracing::{error, info, warn};

pub const OVERVIEW_PLACEHOLDER: &str = "placeholder-chart";
pub const OVERVIEW_CANVAS: &str = "attendance-overview-chart";
pub const MODAL_CONTAINER: &str = "report-modal";
pub const MODAL_CANVAS: &str = "report-modal-chart";
pub const CUSTOM_SUBMIT: &str = "custom-report-submit";

pub const DOWNLOAD_LABEL: &str = "Download PDF";
pub const PDF_FAILED: &str = "Failed to generate PDF. Please try again.";
pub const REPORT_FAILED: &str = "Failed to generate report. Please try again.";

/// Report cards on the reports page: element slug and card title.
pub const REPORT_CARDS: [(&str, &str); 4] = [
    ("weekly", "Weekly Attendance Report"),
    ("monthly", "Monthly Attendance Summary"),
    ("department", "Department Comparison"),
    ("trends", "Attendance Trends"),
];

pub fn download_button(title: &str) -> Option<String> {
    REPORT_CARDS
        .iter()
        .find(|(_, card)| *card == title)
        .map(|(slug, _)| format!("download-{slug}"))
}

pub struct ReportsController<'a, A> {
    api: &'a A,
}

impl<'a, A: AttendanceApi + Sync> ReportsController<'a, A> {
    pub fn new(api: &'a A) -> Self {
        Self { api }
    }

    /// Resets card buttons and the custom form, then draws the overview chart.
    pub async fn activate(&self, page: &mut Page, today: NaiveDate) {
        for (slug, _) in REPORT_CARDS {
            page.set_text(&format!("download-{slug}"), DOWNLOAD_LABEL);
        }
        page.set_text(CUSTOM_SUBMIT, "Generate Report");
        page.set_value(
            "start-date",
            (today - Duration::days(today.day0() as i64)).to_string(),
        );
        page.set_value("end-date", today.to_string());
        page.toggle_class("custom-date-range", "hidden", true);

        if !page.insert_canvas(OVERVIEW_PLACEHOLDER, OVERVIEW_CANVAS) {
            return;
        }
        let overview = self.api.overview().await.unwrap_or_else(|err| {
            error!("error fetching attendance overview data: {err}");
            samples::overview()
        });
        page.bind_chart(OVERVIEW_CANVAS, overview_stacked(&overview));
    }

    /// Opens the report modal with a chart for `title`.
    pub async fn view(&self, page: &mut Page, title: &str) {
        info!("viewing report: {title}");
        let data = self.api.report_data(title).await.unwrap_or_else(|err| {
            error!("error fetching report data: {err}");
            fallback_report(title)
        });

        if page.mount(MODAL_CONTAINER, ui::render_modal(title, MODAL_CANVAS), &[MODAL_CANVAS]) {
            page.bind_chart(MODAL_CANVAS, report_chart(title, data));
        }
    }

    /// Printable table of the report's data. Unlike `view` there is no
    /// fallback: a failed fetch raises the PDF alert.
    pub async fn download(
        &self,
        page: &mut Page,
        title: &str,
        generated_on: &str,
    ) -> Result<ReportDocument, ReportError> {
        info!("downloading report: {title}");
        let button = download_button(title).unwrap_or_default();

        let result = {
            let _busy = BusyControl::engage(page, &button, "Preparing...");
            match self.api.report_data(title).await {
                Ok(data) => report_document(title, &data, generated_on),
                Err(err) => Err(err.into()),
            }
        };

        if let Err(err) = &result {
            error!("error generating PDF: {err}");
            page.raise_alert(PDF_FAILED);
        }
        result
    }

    pub fn submit_custom(
        &self,
        page: &mut Page,
        form: &CustomReportForm,
        today: NaiveDate,
        generated_on: &str,
    ) -> Result<ReportDocument, ReportError> {
        let result = {
            let _busy = BusyControl::engage(page, CUSTOM_SUBMIT, "Generating...");
            CustomReportRequest::from_form(form, today)
                .map(|request| custom_document(&request, generated_on))
        };

        match &result {
            Ok(document) => {
                if let Err(unsupported) = document.delivery.export() {
                    warn!("{unsupported}; serving placeholder notice");
                }
            }
            Err(err) => {
                error!("error generating custom report: {err}");
                page.raise_alert(REPORT_FAILED);
            }
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::ChartKind;
    use crate::controllers::testing::{Fixed, Offline};
    use crate::models::ReportData;
    use crate::report::{Delivery, ReportKind};

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, 18).unwrap()
    }

    fn fixed(report: ReportData) -> Fixed {
        Fixed {
            summary: samples::summary(),
            overview: samples::overview(),
            profile: samples::profile(),
            report,
        }
    }

    #[tokio::test]
    async fn activation_draws_stacked_overview_and_form_defaults() {
        let mut page = ui::reports_page();
        ReportsController::new(&Offline).activate(&mut page, today()).await;

        let placeholder = page.element(OVERVIEW_PLACEHOLDER).unwrap();
        assert!(placeholder.html.as_deref().unwrap().contains(OVERVIEW_CANVAS));

        let chart = page.charts().get(OVERVIEW_CANVAS).unwrap();
        assert_eq!(chart.config.kind, ChartKind::Bar);
        assert_eq!(chart.config.data.datasets.len(), 3);
        assert_eq!(chart.config.options["scales"]["y"]["stacked"], true);
        assert_eq!(chart.config.data.datasets[2].data[0], 3.0);

        assert_eq!(page.element("start-date").unwrap().value.as_deref(), Some("2026-03-01"));
        assert_eq!(page.element("end-date").unwrap().value.as_deref(), Some("2026-03-18"));
        assert_eq!(
            page.element("download-trends").unwrap().text.as_deref(),
            Some(DOWNLOAD_LABEL)
        );
    }

    #[tokio::test]
    async fn view_uses_title_fallback_when_offline() {
        let mut page = ui::reports_page();
        ReportsController::new(&Offline).view(&mut page, "Attendance Trends").await;

        let chart = page.charts().get(MODAL_CANVAS).unwrap();
        assert_eq!(chart.config.kind, ChartKind::Line);
        assert_eq!(chart.config.data.labels[0], "Jan");
        assert!(page.element(MODAL_CONTAINER).unwrap().html.is_some());
    }

    #[tokio::test]
    async fn view_charts_fetched_data_as_bar() {
        let api = fixed(samples::report(ReportKind::Department));
        let mut page = ui::reports_page();
        ReportsController::new(&api).view(&mut page, "Department Comparison").await;

        let chart = page.charts().get(MODAL_CANVAS).unwrap();
        assert_eq!(chart.config.kind, ChartKind::Bar);
        assert_eq!(chart.config.data.labels[1], "Engineering");
    }

    #[tokio::test]
    async fn download_builds_print_document() {
        let api = fixed(samples::report(ReportKind::Weekly));
        let mut page = ui::reports_page();
        let controller = ReportsController::new(&api);
        controller.activate(&mut page, today()).await;

        let doc = controller
            .download(&mut page, "Weekly Attendance Report", "2026-03-18 09:30:00")
            .await
            .unwrap();
        assert_eq!(doc.rows[0], vec!["Monday", "90%"]);
        assert_eq!(doc.delivery, Delivery::Print);
        assert!(page.alert().is_none());

        let button = page.element("download-weekly").unwrap();
        assert_eq!(button.text.as_deref(), Some(DOWNLOAD_LABEL));
        assert!(!button.disabled);
    }

    #[tokio::test]
    async fn failed_download_restores_button_and_alerts() {
        let mut page = ui::reports_page();
        let controller = ReportsController::new(&Offline);
        controller.activate(&mut page, today()).await;

        let result = controller
            .download(&mut page, "Department Comparison", "now")
            .await;
        assert!(matches!(result, Err(ReportError::Fetch(_))));
        assert_eq!(page.alert(), Some(PDF_FAILED));

        let button = page.element("download-department").unwrap();
        assert_eq!(button.text.as_deref(), Some(DOWNLOAD_LABEL));
        assert!(!button.disabled);
    }

    #[tokio::test]
    async fn invalid_custom_form_alerts_and_restores_submit() {
        let mut page = ui::reports_page();
        let controller = ReportsController::new(&Offline);
        controller.activate(&mut page, today()).await;

        let form = CustomReportForm {
            report_type: "attendance".into(),
            date_range: "custom".into(),
            start_date: "2026-03-20".into(),
            end_date: "2026-03-01".into(),
            format: "pdf".into(),
            include_charts: None,
        };
        assert!(controller.submit_custom(&mut page, &form, today(), "now").is_err());
        assert_eq!(page.alert(), Some(REPORT_FAILED));

        let submit = page.element(CUSTOM_SUBMIT).unwrap();
        assert_eq!(submit.text.as_deref(), Some("Generate Report"));
        assert!(!submit.disabled);
    }

    #[tokio::test]
    async fn excel_custom_report_is_a_placeholder() {
        let mut page = ui::reports_page();
        let form = CustomReportForm {
            report_type: "department".into(),
            date_range: "this-month".into(),
            format: "excel".into(),
            ..CustomReportForm::default()
        };
        let doc = ReportsController::new(&Offline)
            .submit_custom(&mut page, &form, today(), "now")
            .unwrap();
        assert_eq!(doc.title, "Custom Department Report");
        assert_eq!(doc.info[1].1, "2026-03-01 to 2026-03-18");
        assert!(doc.delivery.notice().unwrap().contains("EXCEL"));
        assert!(page.alert().is_none());
    }
}
