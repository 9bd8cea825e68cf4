//! Bookmark sync RPC server: JSON-RPC over stdin/stdout for a front-end shell.
//!
//! Protocol: one JSON object per line (newline-delimited JSON).
//! Request:  {"id":1, "method":"bookmark.add", "params":{"title":"...","url":"..."}}
//! Response: {"id":1, "result":{...}} or {"id":1, "error":"..."}
//! Push:     {"event":"bookmarks", "items":[...]} after every change of the open view.
//!           Signing in or out ends the push stream until the next `dashboard.open`.

use std::sync::Arc;
use std::time::Instant;

use bookmark_sync::app::App;
use bookmark_sync::managers::change_stream::CollectionView;
use bookmark_sync::rpc_handler::handle_method;
use bookmark_sync::services::settings_engine::{SettingsEngine, SettingsEngineTrait};
use bookmark_sync::types::settings::SyncSettings;

use serde_json::{json, Value};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing_subscriber::EnvFilter;

/// Simple rate limiter: max requests per second.
struct RateLimiter {
    window_start: Instant,
    request_count: u32,
    max_per_second: u32,
}

impl RateLimiter {
    fn new(max_per_second: u32) -> Self {
        Self { window_start: Instant::now(), request_count: 0, max_per_second }
    }

    /// Returns true if the request is allowed, false if rate-limited.
    fn check(&mut self) -> bool {
        if self.window_start.elapsed().as_secs() >= 1 {
            self.window_start = Instant::now();
            self.request_count = 0;
        }
        self.request_count += 1;
        self.request_count <= self.max_per_second
    }
}

type Stdout = Arc<Mutex<tokio::io::Stdout>>;

async fn emit(out: &Stdout, value: &Value) {
    let mut out = out.lock().await;
    let line = format!("{}\n", value);
    if let Err(e) = out.write_all(line.as_bytes()).await {
        tracing::error!(error = %e, "failed to write to stdout");
        return;
    }
    let _ = out.flush().await;
}

/// Pushes every change of `view` to stdout until the view goes away.
fn forward_view(mut view: CollectionView, out: Stdout) -> JoinHandle<()> {
    tokio::spawn(async move {
        while view.changed().await {
            let items = serde_json::to_value(view.snapshot()).unwrap_or_else(|_| json!([]));
            emit(&out, &json!({"event": "bookmarks", "items": items})).await;
        }
    })
}

fn init_tracing(settings: &SyncSettings) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&settings.log_filter))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() {
    let mut settings_engine = SettingsEngine::new(None);
    let settings = match settings_engine.load() {
        Ok(s) => s,
        Err(e) => {
            eprintln!("bookmark-sync: {}; using defaults", e);
            SyncSettings::default()
        }
    };
    init_tracing(&settings);

    let app = match App::new(settings, settings_engine) {
        Ok(app) => Mutex::new(app),
        Err(e) => {
            tracing::error!(error = %e, "failed to initialize");
            std::process::exit(1);
        }
    };

    let out: Stdout = Arc::new(Mutex::new(tokio::io::stdout()));
    emit(&out, &json!({"event": "ready", "version": env!("CARGO_PKG_VERSION")})).await;

    let mut rate_limiter = RateLimiter::new(200);
    let mut forwarder: Option<JoinHandle<()>> = None;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        let line = match lines.next_line().await {
            Ok(Some(l)) => l,
            Ok(None) => break,
            Err(e) => {
                tracing::warn!(error = %e, "stdin read failed");
                break;
            }
        };
        if line.trim().is_empty() {
            continue;
        }

        let req: Value = match serde_json::from_str(&line) {
            Ok(v) => v,
            Err(e) => {
                emit(&out, &json!({"id": null, "error": format!("parse error: {}", e)})).await;
                continue;
            }
        };

        let id = req.get("id").cloned().unwrap_or(Value::Null);

        if !rate_limiter.check() {
            emit(&out, &json!({"id": id, "error": "rate limit exceeded"})).await;
            continue;
        }

        let method = req.get("method").and_then(|v| v.as_str()).unwrap_or("");
        let params = req.get("params").cloned().unwrap_or(json!({}));

        let result = handle_method(&app, method, &params).await;

        if matches!(method, "dashboard.open" | "session.sign_in" | "session.sign_out") {
            if let Some(task) = forwarder.take() {
                task.abort();
            }
            if let Some(view) = app.lock().await.dashboard.as_ref().and_then(|d| d.view()) {
                forwarder = Some(forward_view(view, Arc::clone(&out)));
            }
        }

        let response = match result {
            Ok(val) => json!({"id": id, "result": val}),
            Err(err) => json!({"id": id, "error": err}),
        };
        emit(&out, &response).await;
    }

    if let Some(task) = forwarder.take() {
        task.abort();
    }
    app.lock().await.shutdown();
}
