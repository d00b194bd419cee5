use chrono::{Duration as Days, NaiveDate, Utc};
use once_cell::sync::Lazy;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::{Value, json};
use std::net::TcpListener;
use std::process::{Child, Command, Stdio};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tokio::time::sleep;

#[derive(Debug, Deserialize)]
struct SessionResponse {
    token: String,
    uid: String,
}

#[derive(Debug, Deserialize)]
struct Stat {
    level: u32,
    xp: u32,
}

#[derive(Debug, Deserialize)]
struct StatSheet {
    strength: Stat,
    wisdom: Stat,
}

#[derive(Debug, Deserialize)]
struct Task {
    id: String,
    completed: bool,
}

#[derive(Debug, Deserialize)]
struct DailyRow {
    date: String,
    wisdom: u32,
    total: u32,
}

#[derive(Debug, Deserialize)]
struct ProgressPage {
    page: usize,
    total_pages: usize,
    total_days: usize,
    rows: Vec<DailyRow>,
}

#[derive(Debug, Deserialize)]
struct TimerView {
    time_left: u32,
    is_running: bool,
    is_break: bool,
    display: String,
}

struct TestServer {
    base_url: String,
    today: NaiveDate,
    child: Child,
}

impl Drop for TestServer {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

static SERVER: Lazy<Mutex<Option<Arc<TestServer>>>> = Lazy::new(|| Mutex::new(None));

#[cfg(unix)]
mod cleanup {
    use std::sync::atomic::{AtomicI32, Ordering};
    use std::sync::Once;

    static REGISTER: Once = Once::new();
    static PID: AtomicI32 = AtomicI32::new(0);

    pub fn register(pid: u32) {
        REGISTER.call_once(|| {
            PID.store(pid as i32, Ordering::SeqCst);
            unsafe {
                libc::atexit(on_exit);
            }
        });
    }

    extern "C" fn on_exit() {
        let pid = PID.load(Ordering::SeqCst);
        if pid > 0 {
            unsafe {
                libc::kill(pid, libc::SIGTERM);
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

fn unique_suffix() -> String {
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    format!("{}_{}", std::process::id(), nanos)
}

fn unique_data_path() -> String {
    let mut path = std::env::temp_dir();
    path.push(format!("solo_tracker_http_{}.json", unique_suffix()));
    path.to_string_lossy().to_string()
}

async fn wait_until_ready(base_url: &str) {
    let client = Client::new();
    let deadline = Instant::now() + Duration::from_secs(3);
    loop {
        if let Ok(resp) = client.get(format!("{base_url}/health")).send().await {
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

async fn spawn_server() -> TestServer {
    let port = pick_free_port();
    let today = Utc::now().date_naive();
    // ten days around today: two pages of seven
    let window_start = today - Days::days(3);
    let window_end = today + Days::days(6);

    let child = Command::new(env!("CARGO_BIN_EXE_solo_tracker"))
        .env("PORT", port.to_string())
        .env("APP_DATA_PATH", unique_data_path())
        .env("TRACKER_WINDOW_START", window_start.to_string())
        .env("TRACKER_WINDOW_END", window_end.to_string())
        .env("RUST_LOG", "info")
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .spawn()
        .expect("failed to spawn server");

    #[cfg(unix)]
    cleanup::register(child.id());

    let base_url = format!("http://127.0.0.1:{port}");
    wait_until_ready(&base_url).await;

    TestServer {
        base_url,
        today,
        child,
    }
}

async fn shared_server() -> Arc<TestServer> {
    let mut guard = SERVER.lock().await;
    if let Some(server) = guard.as_ref() {
        return Arc::clone(server);
    }
    let server = Arc::new(spawn_server().await);
    *guard = Some(Arc::clone(&server));
    server
}

async fn sign_up(client: &Client, server: &TestServer) -> SessionResponse {
    let response = client
        .post(format!("{}/api/auth/signup", server.base_url))
        .json(&json!({
            "email": format!("hunter_{}@example.com", unique_suffix()),
            "password": "arise-now"
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    response.json().await.unwrap()
}

#[tokio::test]
async fn http_requests_without_token_are_rejected() {
    let server = shared_server().await;
    let client = Client::new();

    let response = client
        .get(format!("{}/api/stats", server.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = client
        .post(format!("{}/api/auth/signin", server.base_url))
        .json(&json!({ "email": "nobody@example.com", "password": "wrong-password" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn http_completing_task_levels_stat_and_fills_today() {
    let server = shared_server().await;
    let client = Client::new();
    let session = sign_up(&client, &server).await;
    assert!(!session.uid.is_empty());
    let auth = format!("Bearer {}", session.token);

    let task: Task = client
        .post(format!("{}/api/tasks", server.base_url))
        .header("Authorization", &auth)
        .json(&json!({ "name": "Meditate", "category": "wisdom", "xp": 140 }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(!task.completed);

    let response = client
        .post(format!("{}/api/tasks", server.base_url))
        .header("Authorization", &auth)
        .json(&json!({ "name": "Meditate", "category": "luck", "xp": 10 }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    for _ in 0..2 {
        let response = client
            .post(format!("{}/api/tasks/{}/complete", server.base_url, task.id))
            .header("Authorization", &auth)
            .send()
            .await
            .unwrap();
        assert!(response.status().is_success());
    }

    let stats: StatSheet = client
        .get(format!("{}/api/stats", server.base_url))
        .header("Authorization", &auth)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(stats.wisdom.level, 2);
    assert_eq!(stats.wisdom.xp, 40);
    assert_eq!(stats.strength.level, 1);

    let progress: ProgressPage = client
        .get(format!("{}/api/progress?page=-4", server.base_url))
        .header("Authorization", &auth)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(progress.page, 0);
    assert_eq!(progress.total_pages, 2);
    assert_eq!(progress.total_days, 10);
    let today = progress
        .rows
        .iter()
        .find(|row| row.date == server.today.to_string())
        .expect("today is on the first page");
    assert_eq!(today.wisdom, 140);
    assert_eq!(today.total, 140);

    let response = client
        .delete(format!("{}/api/tasks/{}", server.base_url, task.id))
        .header("Authorization", &auth)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let stats: StatSheet = client
        .get(format!("{}/api/stats", server.base_url))
        .header("Authorization", &auth)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(stats.wisdom.level, 2);
    assert_eq!(stats.wisdom.xp, 40);
}

#[tokio::test]
async fn http_journal_and_wins_round_trip() {
    let server = shared_server().await;
    let client = Client::new();
    let session = sign_up(&client, &server).await;
    let auth = format!("Bearer {}", session.token);

    let response = client
        .post(format!("{}/api/journal", server.base_url))
        .header("Authorization", &auth)
        .json(&json!({ "content": "   " }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = client
        .post(format!("{}/api/journal", server.base_url))
        .header("Authorization", &auth)
        .json(&json!({ "content": "Day one of the climb" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = client
        .post(format!("{}/api/wins", server.base_url))
        .header("Authorization", &auth)
        .json(&json!({ "title": "First 5k", "description": "Ran without stopping" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let entries: Vec<Value> = client
        .get(format!("{}/api/journal", server.base_url))
        .header("Authorization", &auth)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0]["content"], "Day one of the climb");

    let wins: Vec<Value> = client
        .get(format!("{}/api/wins", server.base_url))
        .header("Authorization", &auth)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(wins.len(), 1);
    assert_eq!(wins[0]["image"], Value::Null);
}

#[tokio::test]
async fn http_timer_start_is_idempotent_and_reset_restores_work() {
    let server = shared_server().await;
    let client = Client::new();
    let session = sign_up(&client, &server).await;
    let auth = format!("Bearer {}", session.token);

    for _ in 0..2 {
        let view: TimerView = client
            .post(format!("{}/api/timer/start", server.base_url))
            .header("Authorization", &auth)
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert!(view.is_running);
    }

    let view: TimerView = client
        .post(format!("{}/api/timer/reset", server.base_url))
        .header("Authorization", &auth)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(!view.is_running);
    assert!(!view.is_break);
    assert_eq!(view.time_left, 1500);
    assert_eq!(view.display, "25:00");
}

#[tokio::test]
async fn http_mistyped_task_xp_is_a_bad_request() {
    let server = shared_server().await;
    let client = Client::new();
    let session = sign_up(&client, &server).await;
    let auth = format!("Bearer {}", session.token);

    for xp in [json!(-5), json!("10"), json!(u64::from(u32::MAX) + 1)] {
        let response = client
            .post(format!("{}/api/tasks", server.base_url))
            .header("Authorization", &auth)
            .json(&json!({ "name": "Sprint", "category": "strength", "xp": xp }))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "xp {xp}");
    }

    let tasks: Vec<Value> = client
        .get(format!("{}/api/tasks", server.base_url))
        .header("Authorization", &auth)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(tasks.is_empty());
}

#[tokio::test]
async fn http_chart_and_rewards_follow_completions() {
    let server = shared_server().await;
    let client = Client::new();
    let session = sign_up(&client, &server).await;
    let auth = format!("Bearer {}", session.token);

    let task: Task = client
        .post(format!("{}/api/tasks", server.base_url))
        .header("Authorization", &auth)
        .json(&json!({ "name": "Squats", "category": "strength", "xp": 20 }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let response = client
        .post(format!("{}/api/tasks/{}/complete", server.base_url, task.id))
        .header("Authorization", &auth)
        .send()
        .await
        .unwrap();
    assert!(response.status().is_success());

    // ten days sampled every fifth day
    let chart: Value = client
        .get(format!("{}/api/progress/chart", server.base_url))
        .header("Authorization", &auth)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let labels = chart["labels"].as_array().unwrap();
    assert_eq!(labels.len(), 2);
    assert_eq!(labels[0], (server.today - Days::days(3)).to_string());
    assert_eq!(labels[1], (server.today + Days::days(2)).to_string());
    for category in ["strength", "intelligence", "charisma", "wisdom"] {
        assert_eq!(chart["series"][category].as_array().unwrap().len(), 2);
    }

    let rewards: Value = client
        .get(format!("{}/api/rewards", server.base_url))
        .header("Authorization", &auth)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let tiers = rewards["tiers"].as_array().unwrap();
    assert_eq!(tiers.len(), 16);
    assert!(tiers.iter().all(|tier| tier["unlocked"] == false));
    let first_steps = rewards["achievements"]
        .as_array()
        .unwrap()
        .iter()
        .find(|achievement| achievement["id"] == "first_steps")
        .unwrap();
    assert_eq!(first_steps["unlocked"], true);
}

#[tokio::test]
async fn http_timer_settings_apply_to_paused_work_phase() {
    let server = shared_server().await;
    let client = Client::new();
    let session = sign_up(&client, &server).await;
    let auth = format!("Bearer {}", session.token);

    let response = client
        .post(format!("{}/api/timer/settings", server.base_url))
        .header("Authorization", &auth)
        .json(&json!({ "work_minutes": 0 }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let view: TimerView = client
        .post(format!("{}/api/timer/settings", server.base_url))
        .header("Authorization", &auth)
        .json(&json!({ "work_minutes": 10 }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(!view.is_running);
    assert!(!view.is_break);
    assert_eq!(view.time_left, 600);
    assert_eq!(view.display, "10:00");
}
