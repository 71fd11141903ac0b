//! Chart.js configurations and the per-canvas bindings that own them.

use crate::models::{AttendanceOverview, AttendanceSummary, Dataset, Paint, ReportData};
use crate::stats::percent;
use serde::Serialize;
use serde_json::{json, Value};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartKind {
    Pie,
    Line,
    Bar,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartConfig {
    #[serde(rename = "type")]
    pub kind: ChartKind,
    pub data: ReportData,
    pub options: Value,
}

/// Line for trend reports, bar for everything else.
pub fn kind_for_title(title: &str) -> ChartKind {
    if title.contains("Trends") {
        ChartKind::Line
    } else {
        ChartKind::Bar
    }
}

/// Attendance rate per period: present over present + absent + late.
/// Periods missing an absent or late entry count those as zero.
pub fn trend_points(overview: &AttendanceOverview) -> Vec<u32> {
    overview
        .present
        .iter()
        .enumerate()
        .map(|(idx, &present)| {
            let absent = overview.absent.get(idx).copied().unwrap_or(0);
            let late = overview.late.get(idx).copied().unwrap_or(0);
            let total = u64::from(present) + u64::from(absent) + u64::from(late);
            percent(present.into(), total)
        })
        .collect()
}

pub fn attendance_pie(summary: &AttendanceSummary) -> ChartConfig {
    ChartConfig {
        kind: ChartKind::Pie,
        data: ReportData {
            labels: vec!["Present".into(), "Absent".into()],
            datasets: vec![Dataset {
                data: vec![f64::from(summary.present_days), f64::from(summary.absent_days)],
                background_color: Some(Paint::Each(vec![
                    "rgba(46, 204, 113, 0.8)".into(),
                    "rgba(231, 76, 60, 0.8)".into(),
                ])),
                border_color: Some(Paint::Each(vec![
                    "rgba(46, 204, 113, 1)".into(),
                    "rgba(231, 76, 60, 1)".into(),
                ])),
                border_width: Some(1),
                ..Dataset::default()
            }],
        },
        options: json!({ "responsive": true, "maintainAspectRatio": false }),
    }
}

pub fn attendance_trend(overview: &AttendanceOverview) -> ChartConfig {
    ChartConfig {
        kind: ChartKind::Line,
        data: ReportData {
            labels: overview.labels.clone(),
            datasets: vec![Dataset {
                label: Some("Attendance %".into()),
                data: trend_points(overview).into_iter().map(f64::from).collect(),
                border_color: Some(Paint::Single("rgba(52, 152, 219, 1)".into())),
                background_color: Some(Paint::Single("rgba(52, 152, 219, 0.1)".into())),
                border_width: Some(2),
                fill: Some(true),
                tension: Some(0.3),
            }],
        },
        options: json!({
            "responsive": true,
            "maintainAspectRatio": false,
            "scales": {
                "y": {
                    "beginAtZero": true,
                    "max": 100,
                    "title": { "display": true, "text": "Attendance Rate (%)" }
                },
                "x": { "title": { "display": true, "text": "Month" } }
            }
        }),
    }
}

pub fn report_chart(title: &str, data: ReportData) -> ChartConfig {
    ChartConfig {
        kind: kind_for_title(title),
        data,
        options: json!({
            "responsive": true,
            "maintainAspectRatio": false,
            "scales": { "y": { "beginAtZero": true, "max": 100 } }
        }),
    }
}

pub fn overview_stacked(overview: &AttendanceOverview) -> ChartConfig {
    let series = |label: &str, values: &[u32], rgb: &str| Dataset {
        label: Some(label.into()),
        data: values.iter().copied().map(f64::from).collect(),
        background_color: Some(Paint::Single(format!("rgba({rgb}, 0.5)"))),
        border_color: Some(Paint::Single(format!("rgba({rgb}, 1)"))),
        border_width: Some(1),
        ..Dataset::default()
    };

    ChartConfig {
        kind: ChartKind::Bar,
        data: ReportData {
            labels: overview.labels.clone(),
            datasets: vec![
                series("Present", &overview.present, "46, 204, 113"),
                series("Absent", &overview.absent, "231, 76, 60"),
                series("Late", &overview.late, "241, 196, 15"),
            ],
        },
        options: json!({
            "responsive": true,
            "maintainAspectRatio": false,
            "scales": {
                "x": { "stacked": true },
                "y": { "stacked": true, "beginAtZero": true }
            }
        }),
    }
}

/// A chart bound to one canvas.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartHandle {
    pub canvas_id: String,
    pub config: ChartConfig,
}

/// At most one chart per canvas. Binding a canvas again hands back the
/// handle it replaced so the caller decides what to do with it.
#[derive(Debug, Default)]
pub struct ChartBindings {
    charts: BTreeMap<String, ChartHandle>,
}

impl ChartBindings {
    pub fn bind(&mut self, canvas_id: &str, config: ChartConfig) -> Option<ChartHandle> {
        let handle = ChartHandle {
            canvas_id: canvas_id.to_string(),
            config,
        };
        self.charts.insert(canvas_id.to_string(), handle)
    }

    pub fn get(&self, canvas_id: &str) -> Option<&ChartHandle> {
        self.charts.get(canvas_id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ChartHandle> {
        self.charts.values()
    }

    pub fn is_empty(&self) -> bool {
        self.charts.is_empty()
    }
}
