//! Chrome DevTools Protocol host: target discovery, a WebSocket command client,
//! an `Evaluator` on top of `Runtime.evaluate`, and page navigation signals.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use serde::Deserialize;
use serde_json::{Value, json};
use tokio::net::TcpStream;
use tokio::sync::{Mutex, mpsc, oneshot};
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};

use crate::error::CdpError;
use crate::evaluator::{Evaluation, Evaluator};
use crate::inspector::{Command, InspectorHandle};
use crate::statics;

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;
type WsSink = SplitSink<WsStream, Message>;
type Pending = Arc<Mutex<HashMap<u64, oneshot::Sender<CdpResponse>>>>;

/// An event pushed by the browser.
#[derive(Debug, Clone, PartialEq)]
pub struct CdpEvent {
    pub method: String,
    pub params: Value,
}

#[derive(Debug, Clone, serde::Serialize)]
struct CdpCommand<'a> {
    id: u64,
    method: &'a str,
    params: Value,
}

#[derive(Debug, Clone)]
pub struct CdpResponse {
    pub id: u64,
    pub result: Option<Value>,
    pub error: Option<CdpResponseError>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CdpResponseError {
    pub code: i64,
    pub message: String,
}

/// One entry of the browser's `/json` target list.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TargetInfo {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub url: String,
    pub web_socket_debugger_url: Option<String>,
}

/// Pick the first page target, optionally the first whose URL contains `filter`.
pub fn select_target<'a>(targets: &'a [TargetInfo], filter: Option<&str>) -> Option<&'a TargetInfo> {
    targets.iter().find(|t| {
        t.kind == "page"
            && t.web_socket_debugger_url.is_some()
            && filter.is_none_or(|f| t.url.contains(f))
    })
}

/// Ask the DevTools HTTP endpoint for its targets and return the chosen page's
/// WebSocket URL.
pub async fn discover_target(host: &str, port: u16, filter: Option<&str>) -> Result<String, CdpError> {
    let endpoint = format!("http://{host}:{port}/json");
    tracing::info!(%endpoint, "discovering DevTools targets");

    let connection_failed = |e: reqwest::Error| CdpError::ConnectionFailed {
        url: endpoint.clone(),
        reason: e.to_string(),
    };
    let targets: Vec<TargetInfo> = reqwest::get(&endpoint)
        .await
        .map_err(connection_failed)?
        .json()
        .await
        .map_err(connection_failed)?;

    let target = select_target(&targets, filter).ok_or_else(|| CdpError::NoPageTarget {
        endpoint: endpoint.clone(),
        filter: filter.map(str::to_string),
    })?;
    tracing::info!(id = %target.id, title = %target.title, url = %target.url, "selected page target");

    target
        .web_socket_debugger_url
        .clone()
        .ok_or_else(|| CdpError::Protocol {
            detail: format!("target {} has no WebSocket URL", target.id),
        })
}

/// WebSocket client with request/response correlation by command id.
pub struct CdpClient {
    next_id: AtomicU64,
    pending: Pending,
    writer: Mutex<WsSink>,
    timeout: Duration,
    _reader: tokio::task::JoinHandle<()>,
}

impl CdpClient {
    /// Connect to a page's DevTools WebSocket. Events arrive on the returned receiver.
    pub async fn connect(ws_url: &str) -> Result<(Self, mpsc::UnboundedReceiver<CdpEvent>), CdpError> {
        tracing::info!(url = ws_url, "connecting to DevTools WebSocket");

        let (stream, _) = tokio_tungstenite::connect_async(ws_url)
            .await
            .map_err(|e| CdpError::ConnectionFailed {
                url: ws_url.to_string(),
                reason: e.to_string(),
            })?;
        let (writer, reader) = stream.split();

        let pending: Pending = Arc::new(Mutex::new(HashMap::new()));
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let reader = tokio::spawn(read_loop(reader, Arc::clone(&pending), event_tx));

        let client = Self {
            next_id: AtomicU64::new(1),
            pending,
            writer: Mutex::new(writer),
            timeout: statics::CDP_COMMAND_TIMEOUT,
            _reader: reader,
        };
        Ok((client, event_rx))
    }

    pub async fn send_command(&self, method: &str, params: Value) -> Result<Value, CdpError> {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let text = serde_json::to_string(&CdpCommand { id, method, params }).map_err(|e| {
            CdpError::Protocol {
                detail: format!("failed to serialize command: {e}"),
            }
        })?;
        tracing::trace!(id, method, "sending CDP command");

        // Registered before sending so a fast reply cannot be missed.
        let (tx, rx) = oneshot::channel();
        self.pending.lock().await.insert(id, tx);

        let sent = self.writer.lock().await.send(Message::Text(text.into())).await;
        if let Err(e) = sent {
            self.pending.lock().await.remove(&id);
            return Err(CdpError::Protocol {
                detail: format!("failed to send WebSocket message: {e}"),
            });
        }

        let response = match tokio::time::timeout(self.timeout, rx).await {
            Ok(Ok(response)) => response,
            Ok(Err(_)) => {
                return Err(CdpError::Protocol {
                    detail: "response channel closed".to_string(),
                });
            }
            Err(_) => {
                self.pending.lock().await.remove(&id);
                return Err(CdpError::Timeout {
                    method: method.to_string(),
                    duration: self.timeout,
                });
            }
        };

        if let Some(err) = response.error {
            return Err(CdpError::Remote {
                code: err.code,
                message: err.message,
            });
        }
        Ok(response.result.unwrap_or(Value::Null))
    }

    /// Enable a domain so it starts emitting events.
    pub async fn enable_domain(&self, domain: &str) -> Result<(), CdpError> {
        self.send_command(&format!("{domain}.enable"), json!({})).await?;
        Ok(())
    }
}

async fn read_loop(mut reader: SplitStream<WsStream>, pending: Pending, events: mpsc::UnboundedSender<CdpEvent>) {
    while let Some(message) = reader.next().await {
        let text = match message {
            Ok(Message::Text(text)) => text.to_string(),
            Ok(Message::Binary(bytes)) => match String::from_utf8(bytes.to_vec()) {
                Ok(text) => text,
                Err(_) => continue,
            },
            Ok(Message::Close(_)) => {
                tracing::info!("DevTools WebSocket closed by browser");
                break;
            }
            Ok(_) => continue,
            Err(e) => {
                tracing::warn!(error = %e, "DevTools WebSocket read failed");
                break;
            }
        };

        let value: Value = match serde_json::from_str(&text) {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!(error = %e, "ignoring non-JSON DevTools message");
                continue;
            }
        };

        if let Some(response) = parse_cdp_response(&value) {
            match pending.lock().await.remove(&response.id) {
                Some(tx) => {
                    let _ = tx.send(response);
                }
                None => tracing::debug!(id = response.id, "response for unknown command"),
            }
        } else if let Some(event) = parse_cdp_event(&value) {
            let _ = events.send(event);
        }
    }

    for (id, tx) in pending.lock().await.drain() {
        let _ = tx.send(CdpResponse {
            id,
            result: None,
            error: Some(CdpResponseError {
                code: -1,
                message: "WebSocket connection closed".to_string(),
            }),
        });
    }
}

pub fn parse_cdp_response(value: &Value) -> Option<CdpResponse> {
    let id = value.get("id")?.as_u64()?;
    Some(CdpResponse {
        id,
        result: value.get("result").cloned(),
        error: value
            .get("error")
            .and_then(|e| serde_json::from_value(e.clone()).ok()),
    })
}

pub fn parse_cdp_event(value: &Value) -> Option<CdpEvent> {
    if value.get("id").is_some() {
        return None;
    }
    Some(CdpEvent {
        method: value.get("method")?.as_str()?.to_string(),
        params: value.get("params").cloned().unwrap_or(Value::Null),
    })
}

/// A top-frame navigation. Subframe navigations do not re-check the page.
pub fn is_page_navigation(event: &CdpEvent) -> bool {
    event.method == "Page.frameNavigated"
        && event.params["frame"].is_object()
        && event.params["frame"].get("parentId").is_none()
}

/// Map a `Runtime.evaluate` result onto an `Evaluation`.
///
/// A thrown exception is an exception; falsy values are an empty result; strings
/// pass through; anything else is handed on as compact JSON.
pub fn evaluation_from_result(result: &Value) -> Evaluation {
    if result.get("exceptionDetails").is_some() {
        return Evaluation::exception();
    }
    match &result["result"]["value"] {
        Value::String(s) => Evaluation::value(s.clone()),
        Value::Null | Value::Bool(false) => Evaluation::empty(),
        Value::Number(n) if n.as_f64() == Some(0.0) => Evaluation::empty(),
        other => Evaluation::value(other.to_string()),
    }
}

/// Evaluates scripts in one page target.
pub struct CdpEvaluator {
    client: CdpClient,
}

impl CdpEvaluator {
    /// Connect, enable the domains the inspector relies on, and return the navigation
    /// event stream alongside the evaluator.
    pub async fn connect(ws_url: &str) -> Result<(Self, mpsc::UnboundedReceiver<CdpEvent>), CdpError> {
        let (client, events) = CdpClient::connect(ws_url).await?;
        client.enable_domain("Runtime").await?;
        client.enable_domain("Page").await?;
        Ok((Self { client }, events))
    }
}

impl Evaluator for CdpEvaluator {
    async fn evaluate(&self, script: &str) -> Evaluation {
        let params = json!({
            "expression": script,
            "returnByValue": true,
            "awaitPromise": false,
        });
        match self.client.send_command("Runtime.evaluate", params).await {
            Ok(result) => evaluation_from_result(&result),
            Err(e) => {
                tracing::debug!(error = %e, "Runtime.evaluate failed");
                Evaluation::exception()
            }
        }
    }
}

/// Turn top-frame navigations into inspector commands until either side closes.
pub async fn forward_navigations(mut events: mpsc::UnboundedReceiver<CdpEvent>, inspector: InspectorHandle) {
    while let Some(event) = events.recv().await {
        if !is_page_navigation(&event) {
            continue;
        }
        tracing::debug!(url = %event.params["frame"]["url"], "page navigated");
        if !inspector.send(Command::Navigated) {
            break;
        }
    }
    tracing::debug!("navigation forwarding stopped");
}

#[cfg(test)]
mod tests {
    use super::*;

    fn target(kind: &str, url: &str, ws: Option<&str>) -> TargetInfo {
        TargetInfo {
            id: url.to_string(),
            kind: kind.to_string(),
            title: String::new(),
            url: url.to_string(),
            web_socket_debugger_url: ws.map(str::to_string),
        }
    }

    #[test]
    fn parses_target_list() {
        let text = r#"[{"id":"A1","type":"page","title":"Shop","url":"https://shop.example/",
            "webSocketDebuggerUrl":"ws://127.0.0.1:9222/devtools/page/A1"}]"#;
        let targets: Vec<TargetInfo> = serde_json::from_str(text).unwrap();
        assert_eq!(targets[0].kind, "page");
        assert_eq!(
            targets[0].web_socket_debugger_url.as_deref(),
            Some("ws://127.0.0.1:9222/devtools/page/A1")
        );
    }

    #[test]
    fn target_selection_skips_workers_and_honours_filter() {
        let targets = vec![
            target("service_worker", "https://shop.example/sw.js", Some("ws://w")),
            target("page", "https://other.example/", Some("ws://o")),
            target("page", "https://shop.example/", Some("ws://s")),
        ];
        assert_eq!(select_target(&targets, None).unwrap().url, "https://other.example/");
        assert_eq!(
            select_target(&targets, Some("shop")).unwrap().url,
            "https://shop.example/"
        );
        assert!(select_target(&targets, Some("nowhere")).is_none());
    }

    #[test]
    fn responses_and_events_are_told_apart() {
        let response = json!({"id": 3, "result": {"result": {"type": "string", "value": "x"}}});
        assert_eq!(parse_cdp_response(&response).unwrap().id, 3);
        assert!(parse_cdp_event(&response).is_none());

        let error = json!({"id": 4, "error": {"code": -32000, "message": "Cannot find context"}});
        let parsed = parse_cdp_response(&error).unwrap();
        assert_eq!(parsed.error.unwrap().code, -32000);

        let event = json!({"method": "Page.frameNavigated", "params": {"frame": {"id": "F"}}});
        assert!(parse_cdp_response(&event).is_none());
        assert_eq!(parse_cdp_event(&event).unwrap().method, "Page.frameNavigated");
    }

    #[test]
    fn only_top_frame_navigation_counts() {
        let top = CdpEvent {
            method: "Page.frameNavigated".into(),
            params: json!({"frame": {"id": "F", "url": "https://shop.example/"}}),
        };
        let child = CdpEvent {
            method: "Page.frameNavigated".into(),
            params: json!({"frame": {"id": "C", "parentId": "F"}}),
        };
        let other = CdpEvent {
            method: "Page.loadEventFired".into(),
            params: json!({}),
        };
        assert!(is_page_navigation(&top));
        assert!(!is_page_navigation(&child));
        assert!(!is_page_navigation(&other));
    }

    #[test]
    fn evaluate_results_map_to_evaluations() {
        let string = json!({"result": {"type": "string", "value": "{\"status\":\"missing\"}"}});
        assert_eq!(
            evaluation_from_result(&string),
            Evaluation::value(r#"{"status":"missing"}"#)
        );

        let boolean = json!({"result": {"type": "boolean", "value": true}});
        assert_eq!(evaluation_from_result(&boolean), Evaluation::value("true"));

        for falsy in [json!(false), json!(0), json!(null), json!("")] {
            let result = json!({"result": {"value": falsy}});
            assert_eq!(evaluation_from_result(&result), Evaluation::empty());
        }
        assert_eq!(
            evaluation_from_result(&json!({"result": {"type": "undefined"}})),
            Evaluation::empty()
        );

        let thrown = json!({
            "result": {"type": "object", "subtype": "error"},
            "exceptionDetails": {"text": "Uncaught"}
        });
        assert_eq!(evaluation_from_result(&thrown), Evaluation::exception());
    }
}
