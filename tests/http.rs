use once_cell::sync::Lazy;
use reqwest::{redirect::Policy, Client, StatusCode};
use serde::Deserialize;
use std::net::TcpListener;
use std::process::{Child, Command, Stdio};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tempfile::TempDir;
use tokio::sync::Mutex;
use tokio::time::sleep;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SummaryResponse {
    total_days: u32,
    present_days: u32,
    absent_days: u32,
    attendance_percentage: u32,
}

#[derive(Debug, Deserialize)]
struct OverviewResponse {
    labels: Vec<String>,
    present: Vec<u32>,
    absent: Vec<u32>,
    late: Vec<u32>,
}

#[derive(Debug, Deserialize)]
struct Dataset {
    label: String,
    data: Vec<f64>,
}

#[derive(Debug, Deserialize)]
struct ReportResponse {
    labels: Vec<String>,
    datasets: Vec<Dataset>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProfileResponse {
    username: String,
    department: String,
    days_present: u32,
    profile_image: String,
}

struct TestServer {
    base_url: String,
    child: Child,
    _data_dir: TempDir,
}

impl Drop for TestServer {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

static TEST_LOCK: Lazy<Mutex<()>> = Lazy::new(|| Mutex::new(()));
static SERVER: Lazy<Mutex<Option<Arc<TestServer>>>> = Lazy::new(|| Mutex::new(None));
static OFFLINE_SERVER: Lazy<Mutex<Option<Arc<TestServer>>>> = Lazy::new(|| Mutex::new(None));

#[cfg(unix)]
mod cleanup {
    use std::sync::Mutex;
    use std::sync::Once;

    static REGISTER: Once = Once::new();
    static PIDS: Mutex<Vec<i32>> = Mutex::new(Vec::new());

    pub fn register(pid: u32) {
        if let Ok(mut pids) = PIDS.lock() {
            pids.push(pid as i32);
        }
        REGISTER.call_once(|| unsafe {
            libc::atexit(on_exit);
        });
    }

    extern "C" fn on_exit() {
        if let Ok(pids) = PIDS.lock() {
            for &pid in pids.iter() {
                unsafe {
                    libc::kill(pid, libc::SIGTERM);
                }
            }
        }
    }
}

fn pick_free_port() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind random port");
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    port
}

async fn wait_until_ready(base_url: &str) {
    let client = Client::new();
    let deadline = Instant::now() + Duration::from_secs(3);
    loop {
        if let Ok(resp) = client
            .get(format!("{base_url}/api/attendance/summary"))
            .send()
            .await
        {
            if resp.status().is_success() {
                return;
            }
        }
        if Instant::now() > deadline {
            panic!("server did not become ready");
        }
        sleep(Duration::from_millis(100)).await;
    }
}

async fn spawn_server(upstream: Option<String>) -> TestServer {
    let port = pick_free_port();
    let data_dir = tempfile::tempdir().expect("temp data dir");
    let mut command = Command::new(env!("CARGO_BIN_EXE_attendance_portal"));
    command
        .env("PORT", port.to_string())
        .env("APP_DATA_DIR", data_dir.path())
        .env("RUST_LOG", "info")
        .env_remove("UPSTREAM_API_URL")
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit());
    if let Some(url) = upstream {
        command.env("UPSTREAM_API_URL", url);
    }
    let child = command.spawn().expect("failed to spawn server");

    #[cfg(unix)]
    cleanup::register(child.id());

    let base_url = format!("http://127.0.0.1:{port}");
    wait_until_ready(&base_url).await;

    TestServer {
        base_url,
        child,
        _data_dir: data_dir,
    }
}

async fn shared_server() -> Arc<TestServer> {
    let mut guard = SERVER.lock().await;
    if let Some(server) = guard.as_ref() {
        return Arc::clone(server);
    }
    let server = Arc::new(spawn_server(None).await);
    *guard = Some(Arc::clone(&server));
    server
}

/// Pages of this server read from an upstream nobody listens on.
async fn offline_server() -> Arc<TestServer> {
    let mut guard = OFFLINE_SERVER.lock().await;
    if let Some(server) = guard.as_ref() {
        return Arc::clone(server);
    }
    let upstream = format!("http://127.0.0.1:{}", pick_free_port());
    let server = Arc::new(spawn_server(Some(upstream)).await);
    *guard = Some(Arc::clone(&server));
    server
}

fn no_redirects() -> Client {
    Client::builder().redirect(Policy::none()).build().unwrap()
}

#[tokio::test]
async fn http_recording_attendance_updates_summary() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    let response = client
        .post(format!("{}/api/attendance", server.base_url))
        .json(&serde_json::json!({ "username": "ana" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let summary: SummaryResponse = client
        .get(format!("{}/api/attendance/summary", server.base_url))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(summary.total_days, 30);
    assert!(summary.present_days >= 1);
    assert_eq!(summary.absent_days, 30 - summary.present_days);
    assert_eq!(
        summary.attendance_percentage,
        (f64::from(summary.present_days) / 30.0 * 100.0).round() as u32
    );
}

#[tokio::test]
async fn http_blank_username_is_rejected() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;

    let response = Client::new()
        .post(format!("{}/api/attendance", server.base_url))
        .json(&serde_json::json!({ "username": "   " }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn http_registered_user_drives_profile() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    let response = client
        .post(format!("{}/api/users", server.base_url))
        .json(&serde_json::json!({
            "username": "ana",
            "email": "ana@example.com",
            "department": "Physics"
        }))
        .send()
        .await
        .unwrap();
    assert!(matches!(
        response.status(),
        StatusCode::CREATED | StatusCode::CONFLICT
    ));

    let profile: ProfileResponse = client
        .get(format!("{}/api/user/profile", server.base_url))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(profile.username, "ana");
    assert_eq!(profile.department, "Physics");
    assert_eq!(profile.profile_image, "/static/images/default-profile.jpg");
    assert!(profile.days_present <= 30);

    let image = client
        .get(format!("{}{}", server.base_url, profile.profile_image))
        .send()
        .await
        .unwrap();
    assert!(image.status().is_success());
    assert_eq!(
        image.headers()[reqwest::header::CONTENT_TYPE],
        "image/svg+xml"
    );
    assert!(image.text().await.unwrap().starts_with("<svg"));
}

#[tokio::test]
async fn http_overview_and_report_data() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    let overview: OverviewResponse = client
        .get(format!("{}/api/attendance/overview", server.base_url))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(overview.labels.len(), 6);
    assert_eq!(overview.present.len(), overview.labels.len());
    assert_eq!(overview.absent.len(), overview.labels.len());
    assert_eq!(overview.late.len(), overview.labels.len());

    let trends: ReportResponse = client
        .get(format!("{}/api/reports/data", server.base_url))
        .query(&[("type", "Attendance Trends")])
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(trends.labels[0], "Jan");
    assert_eq!(trends.datasets[0].label, "Attendance Rate (%)");
    assert_eq!(trends.datasets[0].data, vec![75.0, 82.0, 88.0, 90.0, 92.0, 95.0]);

    let weekly: ReportResponse = client
        .get(format!("{}/api/reports/data", server.base_url))
        .query(&[("type", "Weekly Attendance Report")])
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(weekly.labels.len(), 5);
    assert_eq!(weekly.datasets[0].data.len(), 5);
}

#[tokio::test]
async fn http_pages_render_controllers() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    let summary = client
        .get(format!("{}/attendance_summary", server.base_url))
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert!(summary.contains(r#"<span id="total-days" class="value">30</span>"#));
    assert!(summary.contains(r#""attendance-trend-chart":{"type":"line""#));

    let reports = client
        .get(format!("{}/reports", server.base_url))
        .query(&[("view", "Department Comparison")])
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert!(reports.contains(r#"<canvas id="attendance-overview-chart"></canvas>"#));
    assert!(reports.contains(r#"class="modal""#));
    assert!(reports.contains(r#""report-modal-chart":{"type":"bar""#));
    assert!(reports.contains("Download PDF"));
}

#[tokio::test]
async fn http_download_returns_print_document() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;

    let response = Client::new()
        .get(format!("{}/reports/download", server.base_url))
        .query(&[("title", "Department Comparison")])
        .send()
        .await
        .unwrap();
    assert!(response.status().is_success());
    let html = response.text().await.unwrap();
    assert!(html.contains("<h1>Department Comparison</h1>"));
    assert!(html.contains("<td>CS Dept</td><td>95%</td>"));
    assert!(html.contains("window.print()"));
}

#[tokio::test]
async fn http_custom_report_formats() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    let csv = client
        .post(format!("{}/reports/custom", server.base_url))
        .form(&[
            ("report-type", "attendance"),
            ("date-range", "today"),
            ("format", "csv"),
        ])
        .send()
        .await
        .unwrap();
    assert!(csv.status().is_success());
    let html = csv.text().await.unwrap();
    assert!(html.contains("<h1>Custom Attendance Report</h1>"));
    assert!(html.contains("this would download as a CSV file."));
    assert!(!html.contains("window.print()"));

    let pdf = client
        .post(format!("{}/reports/custom", server.base_url))
        .form(&[
            ("report-type", "summary"),
            ("date-range", "custom"),
            ("start-date", "2026-01-01"),
            ("end-date", "2026-01-31"),
            ("format", "pdf"),
            ("include-charts", "on"),
        ])
        .send()
        .await
        .unwrap();
    assert!(pdf.status().is_success());
    let html = pdf.text().await.unwrap();
    assert!(html.contains("2026-01-01 to 2026-01-31"));
    assert!(html.contains(r#"<canvas id="report-chart"></canvas>"#));
    assert!(html.contains("window.print()"));

    let invalid = client
        .post(format!("{}/reports/custom", server.base_url))
        .form(&[
            ("report-type", "summary"),
            ("date-range", "custom"),
            ("start-date", "2026-02-01"),
            ("end-date", "2026-01-01"),
            ("format", "pdf"),
        ])
        .send()
        .await
        .unwrap();
    assert_eq!(invalid.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let html = invalid.text().await.unwrap();
    assert!(html.contains("Failed to generate report. Please try again."));
}

#[tokio::test]
async fn http_profile_form_validation() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = no_redirects();

    let blocked = client
        .post(format!("{}/user_profile", server.base_url))
        .form(&[("email", "   "), ("department", "Physics")])
        .send()
        .await
        .unwrap();
    assert_eq!(blocked.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let html = blocked.text().await.unwrap();
    assert!(html.contains(r#"id="email" name="email" class="error""#));
    assert!(html.contains(r#"id="department" name="department" class="""#));

    let accepted = client
        .post(format!("{}/user_profile", server.base_url))
        .form(&[("email", "ana@example.com"), ("department", "Physics")])
        .send()
        .await
        .unwrap();
    assert_eq!(accepted.status(), StatusCode::SEE_OTHER);
}

#[tokio::test]
async fn http_photo_upload_is_preview_only() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;

    let part = reqwest::multipart::Part::bytes(b"png".to_vec())
        .file_name("me.png")
        .mime_str("image/png")
        .unwrap();
    let form = reqwest::multipart::Form::new().part("photo", part);

    let response = Client::new()
        .post(format!("{}/user_profile/photo", server.base_url))
        .multipart(form)
        .send()
        .await
        .unwrap();
    assert!(response.status().is_success());
    let html = response.text().await.unwrap();
    assert!(html.contains(r#"src="data:image/png;base64,cG5n""#));
    assert!(html.contains("Preview only"));
}

#[tokio::test]
async fn http_unreachable_upstream_renders_fallbacks() {
    let _guard = TEST_LOCK.lock().await;
    let server = offline_server().await;
    let client = Client::new();

    let summary = client
        .get(format!("{}/attendance_summary", server.base_url))
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert!(summary.contains(r#"<span id="attendance-percentage" class="value">90%</span>"#));
    assert!(summary.contains(r#"<span id="present-days" class="value">27</span>"#));
    assert!(summary.contains(r#"<span id="absent-days" class="value">3</span>"#));

    let profile = client
        .get(format!("{}/user_profile", server.base_url))
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert!(profile.contains(r#"id="profile-name">John Doe</h1>"#));
    assert!(profile.contains(r#"id="stat-attendance">92%</span>"#));

    let download = client
        .get(format!("{}/reports/download", server.base_url))
        .query(&[("title", "Attendance Trends")])
        .send()
        .await
        .unwrap();
    assert_eq!(download.status(), StatusCode::BAD_GATEWAY);
    let html = download.text().await.unwrap();
    assert!(html.contains("Failed to generate PDF. Please try again."));
}
