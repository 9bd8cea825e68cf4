//! RPC method handler for the bookmark sync JSON-RPC protocol.
//!
//! Extracted from `rpc_server.rs` so it can be unit-tested independently.
//! The `handle_method` function dispatches JSON-RPC method calls to the
//! identity provider and the active dashboard via the `App` struct.

use tokio::sync::Mutex;

use crate::app::App;
use crate::dashboard::Dashboard;
use crate::services::identity::IdentityProviderTrait;
use crate::services::settings_engine::SettingsEngineTrait;
use crate::types::bookmark::Bookmark;
use crate::types::errors::SyncError;

use serde_json::{json, Value};

/// Route the view must navigate to when no session is present.
pub const SIGNED_OUT_ROUTE: &str = "/";

fn str_param<'a>(params: &'a Value, name: &str) -> Result<&'a str, String> {
    params
        .get(name)
        .and_then(|v| v.as_str())
        .ok_or_else(|| format!("missing {}", name))
}

fn items_json(items: &[Bookmark]) -> Result<Value, String> {
    serde_json::to_value(items).map_err(|e| e.to_string())
}

fn open_dashboard(app: &mut App) -> Result<&mut Dashboard, String> {
    app.dashboard
        .as_mut()
        .filter(|d| d.is_open())
        .ok_or_else(|| "dashboard not open".to_string())
}

/// Dispatch a JSON-RPC method call to the appropriate handler.
///
/// Returns `Ok(Value)` on success or `Err(String)` with an error message.
/// A missing session is not an error: it yields `{"redirect": "/"}`.
pub async fn handle_method(app: &Mutex<App>, method: &str, params: &Value) -> Result<Value, String> {
    match method {
        "ping" => Ok(json!({"pong": true})),

        // ─── Session ───
        "session.sign_in" => {
            let owner_id = str_param(params, "owner_id")?;
            let email = params.get("email").and_then(|v| v.as_str()).unwrap_or("");
            let mut a = app.lock().await;
            let session = a.identity.sign_in(owner_id, email).map_err(|e| e.to_string())?;
            // the open view belongs to the previous session
            if let Some(mut dashboard) = a.dashboard.take() {
                dashboard.teardown();
            }
            Ok(json!({"owner_id": session.owner_id, "display_label": session.display_label}))
        }
        "session.current" => {
            let a = app.lock().await;
            match a.identity.current_session() {
                Some(s) => Ok(json!({"owner_id": s.owner_id, "display_label": s.display_label})),
                None => Ok(Value::Null),
            }
        }
        "session.sign_out" => {
            let mut a = app.lock().await;
            match a.dashboard.take() {
                Some(mut dashboard) => dashboard.sign_out(),
                None => a.identity.sign_out(),
            }
            Ok(json!({"redirect": SIGNED_OUT_ROUTE}))
        }

        // ─── Dashboard ───
        "dashboard.open" => {
            let mut a = app.lock().await;
            let dashboard = a.new_dashboard();
            match dashboard.open().await {
                Ok(view) => Ok(json!({
                    "items": items_json(&view.snapshot())?,
                    "load_error": dashboard.last_load_error().map(|e| e.to_string()),
                })),
                Err(SyncError::Unauthenticated) => {
                    a.dashboard = None;
                    Ok(json!({"redirect": SIGNED_OUT_ROUTE}))
                }
                Err(e) => Err(e.to_string()),
            }
        }
        "dashboard.retry" => {
            let mut a = app.lock().await;
            let dashboard = open_dashboard(&mut a)?;
            let count = dashboard.retry_snapshot().await.map_err(|e| e.to_string())?;
            Ok(json!({"count": count}))
        }

        // ─── Bookmarks ───
        "bookmark.list" => {
            let mut a = app.lock().await;
            let dashboard = open_dashboard(&mut a)?;
            Ok(json!({"items": items_json(&dashboard.bookmarks())?}))
        }
        "bookmark.add" => {
            let title = str_param(params, "title")?;
            let url = str_param(params, "url")?;
            let mut a = app.lock().await;
            let dashboard = open_dashboard(&mut a)?;
            let bookmark = dashboard.add(title, url).await.map_err(|e| e.to_string())?;
            serde_json::to_value(bookmark).map_err(|e| e.to_string())
        }
        "bookmark.delete" => {
            let id = str_param(params, "id")?;
            let mut a = app.lock().await;
            let dashboard = open_dashboard(&mut a)?;
            dashboard.remove(id).await.map_err(|e| e.to_string())?;
            Ok(json!({"deleted": id}))
        }

        // ─── Settings ───
        "settings.get" => {
            let a = app.lock().await;
            serde_json::to_value(a.settings_engine.get_settings()).map_err(|e| e.to_string())
        }
        "settings.set" => {
            let key = str_param(params, "key")?;
            let value = params.get("value").cloned().ok_or("missing value")?;
            let mut a = app.lock().await;
            a.update_setting(key, value).map_err(|e| e.to_string())?;
            Ok(json!({"ok": true}))
        }

        // ─── Feed transport ───
        "feed.disconnect" => {
            app.lock().await.feed.disconnect();
            Ok(json!({"connected": false}))
        }
        "feed.reconnect" => {
            app.lock().await.feed.reconnect();
            Ok(json!({"connected": true}))
        }

        _ => Err(format!("unknown method: {}", method)),
    }
}
