//! WebSocket handler — frame dispatch for queries, subscriptions and
//! transaction submission.
//!
//! DESIGN
//! ======
//! On upgrade, generates a client ID and enters a `select!` loop:
//! - Incoming client frames → decode + dispatch by syscall prefix
//! - Frames from background tasks (subscriptions, block author) → forward
//!
//! Handler functions validate, read or queue work, and return an `Outcome`.
//! The dispatch layer owns all outbound concerns. Long-lived work
//! (subscriptions, transaction lifecycle) pushes frames through the
//! per-connection channel instead.
//!
//! LIFECYCLE
//! =========
//! 1. Upgrade → send `session:connected` with `client_id`
//! 2. Client sends frames → dispatch → handler returns Outcome
//! 3. Cancel frame → stop the named subscription, flush what it already
//!    queued, then acknowledge with `done`
//! 4. Close → cancel every open subscription → cleanup

use std::collections::HashMap;

use axum::extract::State;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::response::Response;
use frames::syscall;
use tokio::sync::mpsc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::frame::{Data, Frame, Status};
use crate::services;
use crate::services::storage::StorageQuery;
use crate::services::subscription::Subscription;
use crate::state::AppState;

// =============================================================================
// OUTCOME
// =============================================================================

/// Result returned by handler functions. The dispatch layer uses this to
/// decide what the sender receives right away.
enum Outcome {
    /// Send done+data to sender.
    Reply(Data),
    /// Send this frame as-is (e.g. the `ready` item of a submission).
    Frame(Frame),
    /// Nothing now; a background task answers through the session channel.
    Deferred,
}

// =============================================================================
// SESSION
// =============================================================================

/// Per-connection state.
struct Session {
    client_id: Uuid,
    /// Outbound channel shared with subscription tasks and the block author.
    client_tx: mpsc::Sender<Frame>,
    /// Open subscriptions keyed by their request id.
    subscriptions: HashMap<Uuid, Subscription>,
}

impl Session {
    fn new(client_id: Uuid, client_tx: mpsc::Sender<Frame>) -> Self {
        Self { client_id, client_tx, subscriptions: HashMap::new() }
    }

    async fn close(&mut self) {
        for (_, sub) in self.subscriptions.drain() {
            sub.cancel().await;
        }
    }
}

// =============================================================================
// UPGRADE
// =============================================================================

pub async fn handle_ws(State(state): State<AppState>, ws: WebSocketUpgrade) -> Response {
    ws.on_upgrade(move |socket| run_ws(socket, state))
}

// =============================================================================
// CONNECTION
// =============================================================================

async fn run_ws(mut socket: WebSocket, state: AppState) {
    let client_id = Uuid::new_v4();
    let (client_tx, mut client_rx) = mpsc::channel::<Frame>(state.config.ws_channel_capacity);

    let welcome =
        Frame::request(syscall::SESSION_CONNECTED, Data::new()).with_data("client_id", client_id.to_string());
    if send_frame(&mut socket, &welcome).await.is_err() {
        return;
    }

    info!(%client_id, "ws: client connected");
    let mut session = Session::new(client_id, client_tx);

    loop {
        tokio::select! {
            msg = socket.recv() => {
                let Some(Ok(msg)) = msg else { break };
                let wire = match msg {
                    Message::Binary(bytes) => frames::decode_frame(&bytes).map_err(|e| e.to_string()),
                    Message::Text(text) => serde_json::from_str::<frames::Frame>(text.as_str()).map_err(|e| e.to_string()),
                    Message::Close(_) => break,
                    _ => continue,
                };
                if dispatch_frame(&state, &mut socket, &mut session, &mut client_rx, wire).await.is_err() {
                    break;
                }
            }
            Some(frame) = client_rx.recv() => {
                if send_frame(&mut socket, &frame).await.is_err() {
                    break;
                }
            }
        }
    }

    session.close().await;
    info!(%client_id, "ws: client disconnected");
}

// =============================================================================
// FRAME DISPATCH
// =============================================================================

/// Process one inbound frame and write the sender's replies.
async fn dispatch_frame(
    state: &AppState,
    socket: &mut WebSocket,
    session: &mut Session,
    client_rx: &mut mpsc::Receiver<Frame>,
    wire: Result<frames::Frame, String>,
) -> Result<(), ()> {
    let is_cancel = wire.as_ref().is_ok_and(|f| f.status == Status::Cancel);
    let replies = match wire {
        Ok(wire) => process_inbound(state, session, wire).await,
        Err(e) => {
            warn!(client_id = %session.client_id, error = %e, "ws: invalid inbound frame");
            vec![gateway_error(format!("invalid frame: {e}"))]
        }
    };

    // Items a cancelled subscription queued before it stopped go out ahead of the ack.
    if is_cancel {
        while let Ok(frame) = client_rx.try_recv() {
            send_frame(socket, &frame).await?;
        }
    }
    for frame in &replies {
        send_frame(socket, frame).await?;
    }
    Ok(())
}

/// Decode and process one inbound frame, returning frames for the sender.
///
/// Kept separate from the socket so tests can drive dispatch directly.
async fn process_inbound(state: &AppState, session: &mut Session, wire: frames::Frame) -> Vec<Frame> {
    let req = match Frame::try_from(wire) {
        Ok(req) => req,
        Err(e) => {
            warn!(client_id = %session.client_id, error = %e, "ws: rejected inbound frame");
            return vec![gateway_error(e.to_string())];
        }
    };

    info!(client_id = %session.client_id, id = %req.id, syscall = %req.syscall, status = ?req.status, "ws: recv frame");

    if req.status == Status::Cancel {
        return vec![handle_cancel(session, &req).await];
    }
    if req.status != Status::Request {
        return vec![req.error(format!("unexpected status {:?}", req.status))];
    }

    let prefix = req.prefix();
    let result = match prefix {
        "keyring" => handle_keyring(&req),
        "storage" => handle_storage(state, session, &req).await,
        "tx" => handle_tx(state, session, &req).await,
        _ => Err(req.error(format!("unknown prefix: {prefix}"))),
    };

    match result {
        Ok(Outcome::Reply(data)) => vec![req.done_with(data)],
        Ok(Outcome::Frame(frame)) => vec![frame],
        Ok(Outcome::Deferred) => vec![],
        Err(err_frame) => vec![err_frame],
    }
}

// =============================================================================
// CANCEL
// =============================================================================

/// Stop the subscription named by `parent_id`. The ack is a `done` frame
/// whose `parent_id` is the subscription request, sent even when nothing
/// was open under that id.
async fn handle_cancel(session: &mut Session, req: &Frame) -> Frame {
    let Some(target) = req.parent_id else {
        return req.error("cancel requires parent_id");
    };

    if let Some(sub) = session.subscriptions.remove(&target) {
        sub.cancel().await;
        info!(client_id = %session.client_id, subscription = %target, "ws: subscription cancelled");
    }

    let mut ack = req.done().with_data("subscription", target.to_string());
    ack.parent_id = Some(target);
    ack
}

// =============================================================================
// KEYRING HANDLER
// =============================================================================

fn handle_keyring(req: &Frame) -> Result<Outcome, Frame> {
    match req.op() {
        "accounts" => Ok(Outcome::Reply(services::storage::accounts())),
        op => Err(req.error(format!("unknown keyring op: {op}"))),
    }
}

// =============================================================================
// STORAGE HANDLERS
// =============================================================================

async fn handle_storage(state: &AppState, session: &mut Session, req: &Frame) -> Result<Outcome, Frame> {
    let query = match req.op() {
        "entries" => {
            let runtime = state.runtime.read().await;
            return Ok(Outcome::Reply(services::storage::entries(&runtime)));
        }
        "count" => StorageQuery::Count,
        "multi" => StorageQuery::Multi(services::storage::parse_keys(&req.data).map_err(|e| req.error_from(&e))?),
        op => return Err(req.error(format!("unknown storage op: {op}"))),
    };

    if session.subscriptions.contains_key(&req.id) {
        return Err(req.error("subscription id already in use"));
    }

    let sub = services::subscription::spawn(state, req.clone(), query, session.client_tx.clone());
    session.subscriptions.insert(req.id, sub);
    Ok(Outcome::Deferred)
}

// =============================================================================
// TX HANDLER
// =============================================================================

async fn handle_tx(state: &AppState, session: &Session, req: &Frame) -> Result<Outcome, Frame> {
    match req.op() {
        "submit" => services::pool::submit(&state.pool, req, session.client_tx.clone())
            .await
            .map(Outcome::Frame)
            .map_err(|e| req.error_from(&e)),
        op => Err(req.error(format!("unknown tx op: {op}"))),
    }
}

// =============================================================================
// HELPERS
// =============================================================================

fn gateway_error(message: String) -> Frame {
    Frame::request(syscall::GATEWAY_ERROR, Data::new()).with_data("message", message)
}

async fn send_frame(socket: &mut WebSocket, frame: &Frame) -> Result<(), ()> {
    if frame.status == Status::Error {
        let code = frame
            .data
            .get("code")
            .and_then(|v| v.as_str())
            .unwrap_or("-");
        let message = frame
            .data
            .get("message")
            .and_then(|v| v.as_str())
            .unwrap_or("-");
        warn!(id = %frame.id, syscall = %frame.syscall, code, message, "ws: send frame status=Error");
    } else {
        info!(id = %frame.id, syscall = %frame.syscall, status = ?frame.status, "ws: send frame");
    }

    let bytes = frames::encode_frame(&frames::Frame::from(frame));
    socket
        .send(Message::Binary(bytes.into()))
        .await
        .map_err(|_| ())
}

#[cfg(test)]
#[path = "ws_test.rs"]
mod tests;
