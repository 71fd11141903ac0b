//! Report descriptors, the custom-report form and printable documents.

use crate::chart::{report_chart, ChartConfig};
use crate::errors::{ReportError, Unsupported};
use crate::models::ReportData;
use crate::samples;
use chrono::{Datelike, Duration, NaiveDate};
use serde::Deserialize;
use std::{fmt, str::FromStr};

/// Report family guessed from a title by substring. Not a classification:
/// the first keyword found wins and anything else is `General`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportKind {
    Weekly,
    Monthly,
    Department,
    Trends,
    General,
}

impl ReportKind {
    fn keyword(self) -> &'static str {
        match self {
            Self::Weekly => "Weekly",
            Self::Monthly => "Monthly",
            Self::Department => "Department",
            Self::Trends => "Trends",
            Self::General => "",
        }
    }

    /// Kind the backend computes a series for.
    pub fn infer(title: &str) -> Self {
        Self::first_match(title, &[Self::Weekly, Self::Monthly, Self::Department, Self::Trends])
    }

    /// Kind whose sample dataset stands in when fetching fails. Monthly has
    /// no sample of its own.
    pub fn infer_fallback(title: &str) -> Self {
        Self::first_match(title, &[Self::Weekly, Self::Department, Self::Trends])
    }

    fn first_match(title: &str, kinds: &[Self]) -> Self {
        kinds
            .iter()
            .copied()
            .find(|kind| title.contains(kind.keyword()))
            .unwrap_or(Self::General)
    }
}

pub fn fallback_report(title: &str) -> ReportData {
    samples::report(ReportKind::infer_fallback(title))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateRangePreset {
    Today,
    ThisWeek,
    ThisMonth,
    Custom,
}

impl FromStr for DateRangePreset {
    type Err = ReportError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim() {
            "today" => Ok(Self::Today),
            "this-week" => Ok(Self::ThisWeek),
            "this-month" => Ok(Self::ThisMonth),
            "custom" => Ok(Self::Custom),
            other => Err(ReportError::InvalidForm(format!("unknown date range '{other}'"))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRangePreset {
    /// `start`/`end` are only read for `Custom`.
    pub fn resolve(self, today: NaiveDate, start: &str, end: &str) -> Result<DateRange, ReportError> {
        let start = match self {
            Self::Today => today,
            Self::ThisWeek => today - Duration::days(today.weekday().num_days_from_sunday() as i64),
            Self::ThisMonth => today - Duration::days(today.day0() as i64),
            Self::Custom => {
                let start = parse_date("start", start)?;
                let end = parse_date("end", end)?;
                if start > end {
                    return Err(ReportError::InvalidForm(format!(
                        "start date {start} is after end date {end}"
                    )));
                }
                return Ok(DateRange { start, end });
            }
        };
        Ok(DateRange { start, end: today })
    }
}

fn parse_date(field: &str, value: &str) -> Result<NaiveDate, ReportError> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
        .map_err(|err| ReportError::InvalidForm(format!("{field} date '{value}': {err}")))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Pdf,
    Excel,
    Csv,
}

impl FromStr for ExportFormat {
    type Err = ReportError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim() {
            "pdf" => Ok(Self::Pdf),
            "excel" => Ok(Self::Excel),
            "csv" => Ok(Self::Csv),
            other => Err(ReportError::InvalidForm(format!("unknown format '{other}'"))),
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Pdf => "PDF",
            Self::Excel => "EXCEL",
            Self::Csv => "CSV",
        })
    }
}

/// Custom-report form as posted by the browser.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CustomReportForm {
    #[serde(rename = "report-type", default)]
    pub report_type: String,
    #[serde(rename = "date-range", default)]
    pub date_range: String,
    #[serde(rename = "start-date", default)]
    pub start_date: String,
    #[serde(rename = "end-date", default)]
    pub end_date: String,
    #[serde(default)]
    pub format: String,
    /// Checkbox: present when ticked.
    #[serde(rename = "include-charts")]
    pub include_charts: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomReportRequest {
    pub report_type: String,
    pub range: DateRange,
    pub format: ExportFormat,
    pub include_charts: bool,
}

impl CustomReportRequest {
    pub fn from_form(form: &CustomReportForm, today: NaiveDate) -> Result<Self, ReportError> {
        let report_type = form.report_type.trim();
        if report_type.is_empty() {
            return Err(ReportError::InvalidForm("report type is required".into()));
        }
        let preset: DateRangePreset = form.date_range.parse()?;
        let format: ExportFormat = form.format.parse()?;
        let range = preset.resolve(today, &form.start_date, &form.end_date)?;

        Ok(Self {
            report_type: report_type.to_string(),
            range,
            format,
            include_charts: form.include_charts.is_some(),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    /// The document prints itself once loaded.
    Print,
    ExportUnavailable(ExportFormat),
}

impl Delivery {
    /// File export for non-print formats does not exist yet.
    pub fn export(self) -> Result<(), Unsupported> {
        match self {
            Self::Print => Ok(()),
            Self::ExportUnavailable(ExportFormat::Excel) => Err(Unsupported("Excel export")),
            Self::ExportUnavailable(ExportFormat::Csv) => Err(Unsupported("CSV export")),
            Self::ExportUnavailable(ExportFormat::Pdf) => Err(Unsupported("PDF file export")),
        }
    }

    pub fn notice(self) -> Option<String> {
        match self {
            Self::Print => None,
            Self::ExportUnavailable(format) => Some(format!(
                "In a real application, this would download as a {format} file."
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReportDocument {
    pub title: String,
    pub info: Vec<(String, String)>,
    pub heading: String,
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
    pub chart: Option<ChartConfig>,
    pub delivery: Delivery,
}

/// Category/value table for a report card download.
pub fn report_document(
    title: &str,
    data: &ReportData,
    generated_on: &str,
) -> Result<ReportDocument, ReportError> {
    let dataset = data
        .datasets
        .first()
        .ok_or_else(|| ReportError::EmptyDataset(title.to_string()))?;

    let rows = data
        .labels
        .iter()
        .enumerate()
        .map(|(idx, label)| {
            let value = dataset
                .data
                .get(idx)
                .map(|value| format!("{value}%"))
                .unwrap_or_else(|| "n/a".into());
            vec![label.clone(), value]
        })
        .collect();

    Ok(ReportDocument {
        title: title.to_string(),
        info: vec![("Generated on".into(), generated_on.to_string())],
        heading: "Report Data".into(),
        columns: vec!["Category".into(), "Value".into()],
        rows,
        chart: None,
        delivery: Delivery::Print,
    })
}

const SAMPLE_ROWS: [(&str, u32, u32, f64); 3] = [
    ("Sample Date 1", 25, 5, 83.3),
    ("Sample Date 2", 28, 2, 93.3),
    ("Sample Date 3", 27, 3, 90.0),
];

/// The custom report body is still the fixed sample table; only the header
/// reflects the request.
pub fn custom_document(request: &CustomReportRequest, generated_on: &str) -> ReportDocument {
    let report_type = capitalize(&request.report_type);
    let title = format!("Custom {report_type} Report");

    let rows = SAMPLE_ROWS
        .iter()
        .map(|(date, present, absent, rate)| {
            vec![
                date.to_string(),
                present.to_string(),
                absent.to_string(),
                format!("{rate:.1}%"),
            ]
        })
        .collect();

    let chart = request.include_charts.then(|| {
        let labels: Vec<&str> = SAMPLE_ROWS.iter().map(|row| row.0).collect();
        let rates: Vec<f64> = SAMPLE_ROWS.iter().map(|row| row.3).collect();
        report_chart(&title, samples::rate_report(&labels, &rates))
    });

    let delivery = match request.format {
        ExportFormat::Pdf => Delivery::Print,
        other => Delivery::ExportUnavailable(other),
    };

    ReportDocument {
        info: vec![
            ("Generated on".into(), generated_on.to_string()),
            (
                "Period".into(),
                format!("{} to {}", request.range.start, request.range.end),
            ),
            ("Report Type".into(), report_type),
        ],
        title,
        heading: "Attendance Summary".into(),
        columns: vec![
            "Date".into(),
            "Present".into(),
            "Absent".into(),
            "Attendance Rate".into(),
        ],
        rows,
        chart,
        delivery,
    }
}

fn capitalize(value: &str) -> String {
    let mut chars = value.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
