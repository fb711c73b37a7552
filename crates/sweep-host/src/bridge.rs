//! Bidirectional JSON-RPC over the native-messaging channel.
//!
//! The extension's requests are dispatched to command handlers, each on its
//! own task. The host's calls into the browser go out as requests with a
//! numeric id; the matching response resolves the waiting caller through the
//! pending-call table. One writer task owns the output stream.

use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use serde_json::Value;
use sweep_clear::{ApiError, DataTypeFlags, RemovalApi, RemovalOptions, TabApi, TabInfo};
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, error, warn};

use crate::config::BridgeConfig;
use crate::rpc::{RpcError, RpcRequest, RpcResponse};
use crate::wire::{self, WireError, MAX_INBOUND_FRAME};

/// Outbound frames waiting for the writer task.
const OUTBOUND_QUEUE: usize = 256;

type PendingTable = HashMap<u64, oneshot::Sender<Result<Value, ApiError>>>;

/// Handle to the channel. Cheap to clone.
#[derive(Clone)]
pub struct Bridge {
    inner: Arc<Inner>,
}

struct Inner {
    outgoing: mpsc::Sender<Vec<u8>>,
    pending: Mutex<PendingTable>,
    next_id: AtomicU64,
    call_timeout: Option<Duration>,
    max_message_bytes: usize,
}

impl Bridge {
    /// Create the bridge and spawn the task writing frames to `writer`.
    pub fn new<W>(writer: W, config: &BridgeConfig) -> Self
    where
        W: AsyncWrite + Unpin + Send + 'static,
    {
        let (outgoing, rx) = mpsc::channel(OUTBOUND_QUEUE);
        tokio::spawn(write_loop(writer, rx));

        let call_timeout =
            (config.call_timeout_ms > 0).then(|| Duration::from_millis(config.call_timeout_ms));
        Self {
            inner: Arc::new(Inner {
                outgoing,
                pending: Mutex::new(HashMap::new()),
                next_id: AtomicU64::new(1),
                call_timeout,
                max_message_bytes: config.max_message_bytes,
            }),
        }
    }

    /// Read frames from `reader` until end of stream.
    ///
    /// Requests go to `handler` on a spawned task and its response is sent
    /// back; responses resolve pending calls. When the stream ends every
    /// pending call fails.
    pub async fn serve<R, F, Fut>(&self, mut reader: R, handler: F) -> Result<(), WireError>
    where
        R: AsyncRead + Unpin,
        F: Fn(RpcRequest) -> Fut,
        Fut: Future<Output = RpcResponse> + Send + 'static,
    {
        let outcome = loop {
            let frame = match wire::read_frame(&mut reader, MAX_INBOUND_FRAME).await {
                Ok(Some(frame)) => frame,
                Ok(None) => break Ok(()),
                Err(e) => break Err(e),
            };
            self.route(frame, &handler).await;
        };

        let failed = self.fail_pending("native messaging channel closed");
        debug!(failed, "bridge input closed");
        outcome
    }

    /// Call a browser API in the extension and wait for its result.
    pub async fn call(&self, method: &str, params: Value) -> Result<Value, ApiError> {
        let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);
        let (tx, rx) = oneshot::channel();
        self.pending().insert(id, tx);

        let request = RpcRequest::new(id, method, params);
        if let Err(e) = self.send(&request).await {
            self.pending().remove(&id);
            return Err(e);
        }
        debug!(id, method, "outbound call sent");

        let outcome = match self.inner.call_timeout {
            Some(limit) => match tokio::time::timeout(limit, rx).await {
                Ok(outcome) => outcome,
                Err(_) => {
                    self.pending().remove(&id);
                    warn!(id, method, timeout_ms = limit.as_millis() as u64, "outbound call timed out");
                    return Err(ApiError::new(format!(
                        "{method} timed out after {}ms",
                        limit.as_millis()
                    )));
                }
            },
            None => rx.await,
        };
        outcome.map_err(|_| ApiError::new("native messaging channel closed"))?
    }

    async fn route<F, Fut>(&self, frame: Vec<u8>, handler: &F)
    where
        F: Fn(RpcRequest) -> Fut,
        Fut: Future<Output = RpcResponse> + Send + 'static,
    {
        let value: Value = match serde_json::from_slice(&frame) {
            Ok(value) => value,
            Err(e) => {
                warn!(error = %e, "unparseable frame from extension");
                self.respond(RpcResponse::error(Value::Null, RpcError::parse_error()))
                    .await;
                return;
            }
        };

        if value.get("method").is_some() {
            let id = value.get("id").cloned().unwrap_or(Value::Null);
            match serde_json::from_value::<RpcRequest>(value) {
                Ok(request) => {
                    let notification = request.is_notification();
                    let fut = handler(request);
                    let bridge = self.clone();
                    tokio::spawn(async move {
                        let response = fut.await;
                        if !notification {
                            bridge.respond(response).await;
                        }
                    });
                }
                Err(_) => {
                    self.respond(RpcResponse::error(id, RpcError::invalid_request()))
                        .await;
                }
            }
        } else if value.get("result").is_some() || value.get("error").is_some() {
            match serde_json::from_value::<RpcResponse>(value) {
                Ok(response) => self.resolve(response),
                Err(e) => warn!(error = %e, "malformed response from extension"),
            }
        } else {
            let id = value.get("id").cloned().unwrap_or(Value::Null);
            self.respond(RpcResponse::error(id, RpcError::invalid_request()))
                .await;
        }
    }

    fn resolve(&self, response: RpcResponse) {
        let Some(id) = response.id.as_u64() else {
            warn!(id = %response.id, "response with non-numeric id");
            return;
        };
        let Some(tx) = self.pending().remove(&id) else {
            debug!(id, "response for unknown or expired call");
            return;
        };
        let outcome = match response.error {
            Some(err) => Err(ApiError::new(err.message)),
            None => Ok(response.result.unwrap_or(Value::Null)),
        };
        // The caller may have timed out in between.
        let _ = tx.send(outcome);
    }

    async fn respond(&self, response: RpcResponse) {
        if let Err(e) = self.send(&response).await {
            error!(error = %e, "failed to send response");
        }
    }

    async fn send<T: serde::Serialize>(&self, message: &T) -> Result<(), ApiError> {
        let frame = serde_json::to_vec(message)
            .map_err(|e| ApiError::new(format!("encode error: {e}")))?;
        if frame.len() > self.inner.max_message_bytes {
            return Err(ApiError::new(format!(
                "message of {} bytes exceeds limit {}",
                frame.len(),
                self.inner.max_message_bytes
            )));
        }
        self.inner
            .outgoing
            .send(frame)
            .await
            .map_err(|_| ApiError::new("native messaging channel closed"))
    }

    fn fail_pending(&self, reason: &str) -> usize {
        let drained: Vec<_> = self.pending().drain().collect();
        let count = drained.len();
        for (_, tx) in drained {
            let _ = tx.send(Err(ApiError::new(reason)));
        }
        count
    }

    fn pending(&self) -> MutexGuard<'_, PendingTable> {
        self.inner
            .pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

async fn write_loop<W>(mut writer: W, mut rx: mpsc::Receiver<Vec<u8>>)
where
    W: AsyncWrite + Unpin,
{
    while let Some(frame) = rx.recv().await {
        if let Err(e) = wire::write_frame(&mut writer, &frame).await {
            error!(error = %e, "native messaging output failed");
            break;
        }
    }
}

impl RemovalApi for Bridge {
    fn remove(
        &self,
        options: RemovalOptions,
        data_types: DataTypeFlags,
    ) -> impl Future<Output = Result<(), ApiError>> + Send {
        let params = serde_json::json!({
            "options": options,
            "dataToRemove": data_types,
        });
        async move {
            self.call("browsingData.remove", params).await?;
            Ok(())
        }
    }
}

impl TabApi for Bridge {
    fn query_all(&self) -> impl Future<Output = Result<Vec<TabInfo>, ApiError>> + Send {
        async move {
            let result = self.call("tabs.query", serde_json::json!({})).await?;
            serde_json::from_value(result)
                .map_err(|e| ApiError::new(format!("invalid tabs.query result: {e}")))
        }
    }

    fn reload(&self, tab_id: i64) -> impl Future<Output = Result<(), ApiError>> + Send {
        async move {
            self.call("tabs.reload", serde_json::json!({ "tabId": tab_id }))
                .await?;
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::DuplexStream;

    /// The extension's end of the channel.
    struct Peer {
        io: DuplexStream,
    }

    impl Peer {
        async fn recv(&mut self) -> Value {
            let frame = wire::read_frame(&mut self.io, MAX_INBOUND_FRAME)
                .await
                .expect("read")
                .expect("frame");
            serde_json::from_slice(&frame).expect("json")
        }

        async fn send(&mut self, value: Value) {
            let frame = serde_json::to_vec(&value).expect("encode");
            wire::write_frame(&mut self.io, &frame).await.expect("write");
        }
    }

    fn echo(request: RpcRequest) -> impl Future<Output = RpcResponse> + Send + 'static {
        async move { RpcResponse::success(request.id, serde_json::json!({"echo": request.method})) }
    }

    fn start(config: BridgeConfig) -> (Bridge, Peer, tokio::task::JoinHandle<Result<(), WireError>>) {
        let (host_io, peer_io) = tokio::io::duplex(64 * 1024);
        let (reader, writer) = tokio::io::split(host_io);
        let bridge = Bridge::new(writer, &config);
        let serving = bridge.clone();
        let task = tokio::spawn(async move { serving.serve(reader, echo).await });
        (bridge, Peer { io: peer_io }, task)
    }

    #[tokio::test]
    async fn test_call_resolves_by_id() {
        let (bridge, mut peer, _task) = start(BridgeConfig::default());
        let caller = {
            let bridge = bridge.clone();
            tokio::spawn(async move { bridge.query_all().await })
        };

        let request = peer.recv().await;
        assert_eq!(request["method"], "tabs.query");
        peer.send(serde_json::json!({
            "jsonrpc": "2.0",
            "id": request["id"],
            "result": [{"id": 4, "url": "https://a.com/"}],
        }))
        .await;

        let tabs = caller.await.expect("join").expect("tabs");
        assert_eq!(tabs, vec![TabInfo { id: Some(4), url: Some("https://a.com/".into()) }]);
    }

    #[tokio::test]
    async fn test_removal_params_and_peer_error_verbatim() {
        let (bridge, mut peer, _task) = start(BridgeConfig::default());
        let caller = {
            let bridge = bridge.clone();
            tokio::spawn(async move {
                let mut flags = DataTypeFlags::new();
                flags.insert("cookies".into(), true);
                bridge
                    .remove(
                        RemovalOptions {
                            since: 10,
                            origins: Some(vec!["https://a.com".into()]),
                        },
                        flags,
                    )
                    .await
            })
        };

        let request = peer.recv().await;
        assert_eq!(request["method"], "browsingData.remove");
        assert_eq!(request["params"]["options"]["since"], 10);
        assert_eq!(request["params"]["options"]["origins"][0], "https://a.com");
        assert_eq!(request["params"]["dataToRemove"]["cookies"], true);
        peer.send(serde_json::json!({
            "jsonrpc": "2.0",
            "id": request["id"],
            "error": {"code": -1, "message": "quota exceeded"},
        }))
        .await;

        let err = caller.await.expect("join").expect_err("rejected");
        assert_eq!(err.message, "quota exceeded");
    }

    #[tokio::test]
    async fn test_null_result_is_success() {
        let (bridge, mut peer, _task) = start(BridgeConfig::default());
        let caller = {
            let bridge = bridge.clone();
            tokio::spawn(async move { bridge.reload(3).await })
        };
        let request = peer.recv().await;
        assert_eq!(request["params"]["tabId"], 3);
        peer.send(serde_json::json!({"jsonrpc": "2.0", "id": request["id"], "result": null}))
            .await;
        caller.await.expect("join").expect("reloaded");
    }

    #[tokio::test(start_paused = true)]
    async fn test_call_times_out_when_configured() {
        let config = BridgeConfig {
            call_timeout_ms: 250,
            ..BridgeConfig::default()
        };
        let (bridge, mut peer, _task) = start(config);
        let caller = {
            let bridge = bridge.clone();
            tokio::spawn(async move { bridge.reload(1).await })
        };
        let _unanswered = peer.recv().await;

        let err = caller.await.expect("join").expect_err("timed out");
        assert!(err.message.contains("timed out"), "{}", err.message);
        assert!(bridge.pending().is_empty());
    }

    #[tokio::test]
    async fn test_incoming_request_is_answered() {
        let (_bridge, mut peer, _task) = start(BridgeConfig::default());
        peer.send(serde_json::json!({"jsonrpc": "2.0", "id": 7, "method": "get_history"}))
            .await;
        let response = peer.recv().await;
        assert_eq!(response["id"], 7);
        assert_eq!(response["result"]["echo"], "get_history");
    }

    #[tokio::test]
    async fn test_garbage_frame_gets_parse_error() {
        let (_bridge, mut peer, _task) = start(BridgeConfig::default());
        wire::write_frame(&mut peer.io, b"{oops").await.expect("write");
        let response = peer.recv().await;
        assert_eq!(response["error"]["code"], -32700);
    }

    #[tokio::test]
    async fn test_channel_close_fails_pending_calls() {
        let (bridge, mut peer, task) = start(BridgeConfig::default());
        let caller = {
            let bridge = bridge.clone();
            tokio::spawn(async move { bridge.reload(1).await })
        };
        let _unanswered = peer.recv().await;
        drop(peer);

        task.await.expect("join").expect("clean shutdown");
        let err = caller.await.expect("join").expect_err("closed");
        assert_eq!(err.message, "native messaging channel closed");
    }

    #[tokio::test]
    async fn test_oversized_outbound_rejected() {
        let config = BridgeConfig {
            max_message_bytes: 16,
            ..BridgeConfig::default()
        };
        let (bridge, _peer, _task) = start(config);
        let err = bridge
            .call("tabs.query", serde_json::json!({"padding": "x".repeat(64)}))
            .await
            .expect_err("too large");
        assert!(err.message.contains("exceeds limit"));
        assert!(bridge.pending().is_empty());
    }
}
