use crate::chart::ChartBindings;
use crate::controllers::reports::REPORT_CARDS;
use crate::page::Page;
use crate::report::{Delivery, ReportDocument};
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::LazyLock;
use tracing::error;
use url::form_urlencoded;

pub const CHART_JS: &str = "https://cdn.jsdelivr.net/npm/chart.js";

pub fn summary_page() -> Page {
    Page::from_template(SUMMARY_HTML)
}

pub fn reports_page() -> Page {
    Page::from_template(&REPORTS_HTML)
}

pub fn profile_page() -> Page {
    Page::from_template(PROFILE_HTML)
}

pub fn render_summary(page: &Page) -> String {
    render_page("Attendance Summary", SUMMARY_HTML, page)
}

pub fn render_reports(page: &Page) -> String {
    render_page("Reports", &REPORTS_HTML, page)
}

pub fn render_profile(page: &Page) -> String {
    render_page("User Profile", PROFILE_HTML, page)
}

fn render_page(title: &str, template: &str, page: &Page) -> String {
    LAYOUT_HTML
        .replace("{{TITLE}}", &escape_html(title))
        .replace("{{BODY}}", &fill(template, page))
}

/// Substitutes every `{{...}}` slot in `template` from the page state.
pub fn fill(template: &str, page: &Page) -> String {
    let mut out = String::with_capacity(template.len() + 2048);
    let mut rest = template;
    while let Some(start) = rest.find("{{") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        let Some(end) = after.find("}}") else {
            out.push_str(&rest[start..]);
            return out;
        };
        out.push_str(&slot(after[..end].trim(), page));
        rest = &after[end + 2..];
    }
    out.push_str(rest);
    out
}

fn slot(name: &str, page: &Page) -> String {
    match name {
        "CHARTS" => chart_script(page.charts()),
        "ALERT" => page.alert().map(alert_script).unwrap_or_default(),
        _ => {
            let (id, attr) = name.split_once('.').unwrap_or((name, ""));
            let Some(el) = page.element(id) else {
                return String::new();
            };
            match attr {
                "" => match &el.html {
                    Some(html) => html.clone(),
                    None => escape_html(el.text.as_deref().unwrap_or_default()),
                },
                "value" => escape_html(el.value.as_deref().unwrap_or_default()),
                "src" => escape_html(el.src.as_deref().unwrap_or_default()),
                "class" => escape_html(&el.classes.iter().cloned().collect::<Vec<_>>().join(" ")),
                "disabled" if el.disabled => "disabled".into(),
                _ => String::new(),
            }
        }
    }
}

fn chart_script(charts: &ChartBindings) -> String {
    if charts.is_empty() {
        return String::new();
    }
    let configs: BTreeMap<&str, _> = charts
        .iter()
        .map(|handle| (handle.canvas_id.as_str(), &handle.config))
        .collect();

    format!(
        r#"<script src="{CHART_JS}"></script>
<script>
  const chartConfigs = {};
  for (const [id, config] of Object.entries(chartConfigs)) {{
    const canvas = document.getElementById(id);
    if (!canvas) continue;
    const previous = Chart.getChart(canvas);
    if (previous) previous.destroy();
    new Chart(canvas, config);
  }}
</script>"#,
        script_json(&configs)
    )
}

fn alert_script(message: &str) -> String {
    format!(
        "<script>window.addEventListener('load', () => alert({}));</script>",
        script_json(&message)
    )
}

/// JSON safe to inline in a `<script>` element.
fn script_json<T: Serialize + ?Sized>(value: &T) -> String {
    match serde_json::to_string(value) {
        Ok(json) => json.replace("</", "<\\/"),
        Err(err) => {
            error!("failed to serialize script payload: {err}");
            "null".into()
        }
    }
}

pub fn escape_html(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 8);
    for ch in value.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

pub fn render_modal(title: &str, canvas_id: &str) -> String {
    format!(
        r#"<div class="modal">
  <div class="modal-content">
    <a class="modal-close" href="/reports" aria-label="Close">&times;</a>
    <h2>{}</h2>
    <div class="modal-chart"><canvas id="{canvas_id}"></canvas></div>
  </div>
</div>"#,
        escape_html(title)
    )
}

/// Standalone document for a report window.
pub fn render_document(doc: &ReportDocument) -> String {
    let mut html = String::with_capacity(4096);
    html.push_str("<!DOCTYPE html>\n<html>\n<head>\n  <meta charset=\"UTF-8\" />\n");
    html.push_str(&format!("  <title>{}</title>\n", escape_html(&doc.title)));
    html.push_str(DOCUMENT_STYLE);
    html.push_str("</head>\n<body>\n");
    html.push_str(&format!("  <h1>{}</h1>\n", escape_html(&doc.title)));

    html.push_str("  <div class=\"report-info\">\n");
    for (label, value) in &doc.info {
        html.push_str(&format!(
            "    <p><strong>{}:</strong> {}</p>\n",
            escape_html(label),
            escape_html(value)
        ));
    }
    html.push_str("  </div>\n");

    html.push_str(&format!("  <h2>{}</h2>\n  <table>\n    <tr>", escape_html(&doc.heading)));
    for column in &doc.columns {
        html.push_str(&format!("<th>{}</th>", escape_html(column)));
    }
    html.push_str("</tr>\n");
    for row in &doc.rows {
        html.push_str("    <tr>");
        for cell in row {
            html.push_str(&format!("<td>{}</td>", escape_html(cell)));
        }
        html.push_str("</tr>\n");
    }
    html.push_str("  </table>\n");

    if let Some(chart) = &doc.chart {
        let mut charts = ChartBindings::default();
        charts.bind("report-chart", chart.clone());
        html.push_str("  <div class=\"report-chart\"><canvas id=\"report-chart\"></canvas></div>\n");
        html.push_str(&chart_script(&charts));
        html.push('\n');
    }

    if let Some(notice) = doc.delivery.notice() {
        html.push_str(&format!("  <p class=\"notice\">{}</p>\n", escape_html(&notice)));
    }
    if doc.delivery == Delivery::Print {
        html.push_str(PRINT_ON_LOAD);
    }

    html.push_str("</body>\n</html>\n");
    html
}

/// Page shown in the report window when generation failed.
pub fn render_alert(message: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html>
<head>
  <meta charset="UTF-8" />
  <title>Report unavailable</title>
{DOCUMENT_STYLE}</head>
<body>
  <h1>Report unavailable</h1>
  <p class="notice">{}</p>
  {}
</body>
</html>
"#,
        escape_html(message),
        alert_script(message)
    )
}

const PRINT_ON_LOAD: &str = r#"  <script>
    window.addEventListener('load', () => {
      window.focus();
      window.print();
    });
  </script>
"#;

const DOCUMENT_STYLE: &str = r#"  <style>
    body { font-family: Arial, sans-serif; padding: 20px; }
    h1 { color: #2c3e50; }
    .report-info { margin-bottom: 20px; }
    table { width: 100%; border-collapse: collapse; margin-top: 20px; }
    th, td { border: 1px solid #ddd; padding: 8px; text-align: left; }
    th { background-color: #f2f2f2; }
    .report-chart { height: 300px; margin-top: 20px; }
    .notice { margin-top: 20px; color: #7f8c8d; }
  </style>
"#;

pub const DEFAULT_PROFILE_SVG: &str = r##"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 120 120">
  <rect width="120" height="120" fill="#dfe6e9"/>
  <circle cx="60" cy="46" r="22" fill="#95a5a6"/>
  <path d="M20 108c6-22 22-34 40-34s34 12 40 34z" fill="#95a5a6"/>
</svg>
"##;

const LAYOUT_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1.0" />
  <title>{{TITLE}}</title>
  <style>
    :root {
      --ink: #2c3e50;
      --muted: #7f8c8d;
      --accent: #3498db;
      --present: #2ecc71;
      --absent: #e74c3c;
      --late: #f1c40f;
      --card: #ffffff;
      --bg: #f4f6f8;
      --shadow: 0 12px 32px rgba(44, 62, 80, 0.12);
    }

    * {
      box-sizing: border-box;
    }

    body {
      margin: 0;
      background: var(--bg);
      color: var(--ink);
      font-family: "Segoe UI", "Trebuchet MS", sans-serif;
    }

    nav {
      display: flex;
      gap: 18px;
      padding: 16px 32px;
      background: var(--ink);
    }

    nav a {
      color: white;
      text-decoration: none;
      font-weight: 600;
    }

    main {
      width: min(1080px, 100%);
      margin: 0 auto;
      padding: 32px 18px 48px;
      display: grid;
      gap: 28px;
    }

    h1 {
      margin: 0;
    }

    .stats {
      display: grid;
      grid-template-columns: repeat(auto-fit, minmax(180px, 1fr));
      gap: 16px;
    }

    .stat, .chart-card, .report-card, .profile-card, form.card {
      background: var(--card);
      border-radius: 14px;
      box-shadow: var(--shadow);
      padding: 20px;
    }

    .stat .label {
      display: block;
      font-size: 0.85rem;
      text-transform: uppercase;
      letter-spacing: 0.1em;
      color: var(--muted);
    }

    .stat .value,
    .stat-value {
      display: block;
      font-size: 1.8rem;
      font-weight: 600;
    }

    .charts, .report-grid {
      display: grid;
      grid-template-columns: repeat(auto-fit, minmax(240px, 1fr));
      gap: 16px;
    }

    .chart-box, .placeholder-chart, .modal-chart {
      position: relative;
      height: 300px;
    }

    .btn {
      display: inline-flex;
      align-items: center;
      justify-content: center;
      padding: 10px 16px;
      border: none;
      border-radius: 8px;
      background: var(--accent);
      color: white;
      font-weight: 600;
      text-decoration: none;
      cursor: pointer;
    }

    .btn[aria-disabled="disabled"] {
      opacity: 0.6;
      pointer-events: none;
    }

    .btn-block {
      width: 100%;
    }

    .card-actions {
      display: flex;
      gap: 10px;
    }

    label {
      display: grid;
      gap: 6px;
      margin-bottom: 14px;
      font-weight: 600;
    }

    input, select {
      padding: 10px;
      border: 1px solid #d0d7de;
      border-radius: 8px;
      font: inherit;
    }

    input.error, select.error {
      border-color: var(--absent);
      background: #fdecea;
    }

    .date-range {
      display: flex;
      gap: 12px;
    }

    .hidden {
      display: none;
    }

    .profile-picture {
      width: 120px;
      height: 120px;
      border-radius: 50%;
      object-fit: cover;
    }

    .notice {
      color: var(--muted);
    }

    .modal {
      position: fixed;
      inset: 0;
      background: rgba(0, 0, 0, 0.5);
      display: flex;
      justify-content: center;
      align-items: center;
      z-index: 1000;
    }

    .modal-content {
      background: white;
      padding: 20px;
      border-radius: 8px;
      width: 80%;
      max-width: 800px;
      max-height: 80vh;
      overflow: auto;
    }

    .modal-close {
      float: right;
      font-size: 24px;
      color: var(--ink);
      text-decoration: none;
    }
  </style>
</head>
<body>
  <nav>
    <a href="/attendance_summary">Attendance</a>
    <a href="/reports">Reports</a>
    <a href="/user_profile">Profile</a>
  </nav>
  <main>
{{BODY}}
  </main>
</body>
</html>
"#;

const SUMMARY_HTML: &str = r#"
    <header>
      <h1>Attendance Summary</h1>
      <p class="notice">Totals for the current reporting month.</p>
    </header>

    <section class="stats">
      <div class="stat">
        <span class="label">Attendance</span>
        <span id="attendance-percentage" class="value">{{attendance-percentage}}</span>
      </div>
      <div class="stat">
        <span class="label">Present days</span>
        <span id="present-days" class="value">{{present-days}}</span>
      </div>
      <div class="stat">
        <span class="label">Absent days</span>
        <span id="absent-days" class="value">{{absent-days}}</span>
      </div>
      <div class="stat">
        <span class="label">Total days</span>
        <span id="total-days" class="value">{{total-days}}</span>
      </div>
    </section>

    <section class="charts">
      <div class="chart-card">
        <h2>Present vs absent</h2>
        <div class="chart-box"><canvas id="attendance-chart" class="{{attendance-chart.class}}"></canvas></div>
      </div>
      <div class="chart-card">
        <h2>Monthly trend</h2>
        <div class="chart-box"><canvas id="attendance-trend-chart" class="{{attendance-trend-chart.class}}"></canvas></div>
      </div>
    </section>
{{CHARTS}}
"#;

static REPORTS_HTML: LazyLock<String> = LazyLock::new(|| {
    let cards: String = REPORT_CARDS
        .iter()
        .map(|(slug, title)| {
            let query: String = form_urlencoded::byte_serialize(title.as_bytes()).collect();
            format!(
                r#"      <div class="report-card">
        <h3 class="card-title">{title}</h3>
        <div class="card-actions">
          <a class="btn" href="/reports?view={query}">View</a>
          <a class="btn" id="download-{slug}" href="/reports/download?title={query}" target="_blank" aria-disabled="{{{{download-{slug}.disabled}}}}">{{{{download-{slug}}}}}</a>
        </div>
      </div>
"#
            )
        })
        .collect();

    REPORTS_BODY.replace("<!-- cards -->", &cards)
});

const REPORTS_BODY: &str = r#"
    <header>
      <h1>Reports</h1>
    </header>

    <section class="chart-card">
      <h2>Attendance overview</h2>
      <div class="placeholder-chart" id="placeholder-chart">{{placeholder-chart}}</div>
    </section>

    <section class="report-grid">
<!-- cards -->
    </section>

    <form class="card" id="custom-report-form" method="post" action="/reports/custom" target="_blank">
      <h2>Custom report</h2>
      <label>Report type
        <select id="report-type" name="report-type" required>
          <option value="attendance">Attendance</option>
          <option value="department">Department</option>
          <option value="summary">Summary</option>
        </select>
      </label>
      <label>Date range
        <select id="date-range" name="date-range">
          <option value="today">Today</option>
          <option value="this-week">This week</option>
          <option value="this-month" selected>This month</option>
          <option value="custom">Custom</option>
        </select>
      </label>
      <div id="custom-date-range" class="date-range {{custom-date-range.class}}">
        <label>Start <input type="date" id="start-date" name="start-date" value="{{start-date.value}}"></label>
        <label>End <input type="date" id="end-date" name="end-date" value="{{end-date.value}}"></label>
      </div>
      <label>Format
        <select id="format" name="format">
          <option value="pdf">PDF</option>
          <option value="excel">Excel</option>
          <option value="csv">CSV</option>
        </select>
      </label>
      <label><span><input type="checkbox" id="include-charts" name="include-charts" checked> Include charts</span></label>
      <button class="btn" type="submit" id="custom-report-submit" {{custom-report-submit.disabled}}>{{custom-report-submit}}</button>
    </form>

{{report-modal}}
    <script>
      const dateRange = document.getElementById('date-range');
      const customRange = document.getElementById('custom-date-range');
      dateRange.addEventListener('change', () => {
        customRange.classList.toggle('hidden', dateRange.value !== 'custom');
      });
    </script>
{{CHARTS}}
"#;

const PROFILE_HTML: &str = r#"
    <section class="profile-card">
      <img class="profile-picture" id="profile-picture" src="{{profile-picture.src}}" alt="Profile picture" />
      <h1 class="profile-name" id="profile-name">{{profile-name}}</h1>
      <p class="profile-role" id="profile-role">{{profile-role}}</p>
      <form id="photo-form" method="post" action="/user_profile/photo" enctype="multipart/form-data">
        <input type="file" id="photo-input" name="photo" accept="image/*" hidden />
        <button class="btn btn-block" type="button" id="change-photo">Change Photo</button>
      </form>
      <p class="notice" id="photo-notice">{{photo-notice}}</p>
      <div class="stats">
        <div class="stat">
          <span class="label">Attendance</span>
          <span class="stat-value" id="stat-attendance">{{stat-attendance}}</span>
        </div>
        <div class="stat">
          <span class="label">Days present</span>
          <span class="stat-value" id="stat-days-present">{{stat-days-present}}</span>
        </div>
      </div>
    </section>

    <form class="card" id="profile-form" method="post" action="/user_profile">
      <h2>Profile details</h2>
      <label>Email
        <input type="email" id="email" name="email" class="{{email.class}}" value="{{email.value}}" required />
      </label>
      <label>Department
        <input type="text" id="department" name="department" class="{{department.class}}" value="{{department.value}}" required />
      </label>
      <label>Phone
        <input type="tel" id="phone" name="phone" class="{{phone.class}}" value="{{phone.value}}" />
      </label>
      <button class="btn" type="submit">Save Changes</button>
    </form>

    <script>
      const photoInput = document.getElementById('photo-input');
      document.getElementById('change-photo').addEventListener('click', () => photoInput.click());
      photoInput.addEventListener('change', () => {
        if (photoInput.files && photoInput.files[0]) {
          document.getElementById('photo-form').submit();
        }
      });
    </script>
{{ALERT}}
"#;
