//! WebSocket frame client for the node connection.
//!
//! Manages the websocket lifecycle: connection, reconnection with
//! exponential backoff, and inbound dispatch. Replies to requests go through
//! [`router`](crate::net::router); the `session:connected` push updates the
//! session and refreshes the keyring.
//!
//! All websocket logic is gated behind `#[cfg(feature = "hydrate")]` since
//! it requires a browser environment.
//!
//! ERROR HANDLING
//! ==============
//! Decode and transport failures are logged and absorbed; the reconnect loop
//! is the recovery path. On disconnect every reply route is dropped and
//! pending cancels are treated as acknowledged.

#[cfg(test)]
#[path = "frame_client_test.rs"]
mod frame_client_test;

#[cfg(feature = "hydrate")]
use leptos::prelude::Update;

#[cfg(feature = "hydrate")]
use crate::app::{AppContext, FrameSender};
#[cfg(feature = "hydrate")]
use crate::net::router;
#[cfg(feature = "hydrate")]
use crate::net::types::{self, Frame, FrameStatus};
#[cfg(feature = "hydrate")]
use crate::state::session::ConnectionStatus;

/// First reconnect delay.
pub const INITIAL_BACKOFF_MS: u32 = 1000;
/// Reconnect delay ceiling.
pub const MAX_BACKOFF_MS: u32 = 10_000;

/// Websocket endpoint for the page at `href` served from `host`.
#[must_use]
pub fn ws_url(href: &str, host: &str) -> String {
    let proto = if href.starts_with("https") { "wss" } else { "ws" };
    format!("{proto}://{host}/api/ws")
}

#[must_use]
pub fn next_backoff(current_ms: u32) -> u32 {
    current_ms.saturating_mul(2).min(MAX_BACKOFF_MS)
}

/// Send a frame to the node via the shared sender channel.
///
/// Returns `false` if the channel is closed.
#[cfg(feature = "hydrate")]
pub fn send_frame(tx: &futures::channel::mpsc::UnboundedSender<Vec<u8>>, frame: &Frame) -> bool {
    tx.unbounded_send(frames::encode_frame(frame)).is_ok()
}

/// Spawn the frame client as a local async task and attach its sender to
/// `ctx.api`. Frames queued while disconnected go out after the next connect.
#[cfg(feature = "hydrate")]
pub fn spawn_frame_client(ctx: AppContext) {
    use futures::channel::mpsc;

    let (tx, rx) = mpsc::unbounded::<Vec<u8>>();
    ctx.api.attach(FrameSender { tx: Some(tx) });

    leptos::task::spawn_local(frame_client_loop(ctx, rx));
}

/// Main connection loop with reconnect logic.
#[cfg(feature = "hydrate")]
async fn frame_client_loop(ctx: AppContext, rx: futures::channel::mpsc::UnboundedReceiver<Vec<u8>>) {
    use std::cell::RefCell;
    use std::rc::Rc;

    let rx = Rc::new(RefCell::new(rx));
    let mut backoff_ms = INITIAL_BACKOFF_MS;

    loop {
        ctx.session.update(|s| s.connection_status = ConnectionStatus::Connecting);

        let href = web_sys::window()
            .and_then(|w| w.location().href().ok())
            .unwrap_or_default();
        let host = web_sys::window()
            .and_then(|w| w.location().host().ok())
            .unwrap_or_else(|| "localhost:3000".to_owned());
        let url = ws_url(&href, &host);

        match connect_and_run(&url, ctx, &rx).await {
            Ok(true) => backoff_ms = INITIAL_BACKOFF_MS,
            Ok(false) => {}
            Err(e) => leptos::logging::warn!("WS error: {e}"),
        }

        ctx.session.update(|s| s.disconnected());
        router::reset();

        gloo_timers::future::sleep(std::time::Duration::from_millis(u64::from(backoff_ms))).await;
        backoff_ms = next_backoff(backoff_ms);
    }
}

/// Connect and pump frames until the socket closes. Returns whether the
/// node ever greeted this connection.
#[cfg(feature = "hydrate")]
async fn connect_and_run(
    url: &str,
    ctx: AppContext,
    rx: &std::rc::Rc<std::cell::RefCell<futures::channel::mpsc::UnboundedReceiver<Vec<u8>>>>,
) -> Result<bool, String> {
    use std::cell::Cell;

    use futures::StreamExt;
    use gloo_net::websocket::Message;
    use gloo_net::websocket::futures::WebSocket;

    let ws = WebSocket::open(url).map_err(|e| e.to_string())?;
    let (mut ws_write, mut ws_read) = ws.split();
    let greeted = Cell::new(false);

    let mut rx_borrow = rx.borrow_mut();
    let send_task = async {
        use futures::SinkExt;
        while let Some(bytes) = rx_borrow.next().await {
            if ws_write.send(Message::Bytes(bytes)).await.is_err() {
                break;
            }
        }
    };

    let recv_task = async {
        while let Some(msg) = ws_read.next().await {
            match msg {
                Ok(Message::Bytes(bytes)) => match frames::decode_frame(&bytes) {
                    Ok(frame) => {
                        if frame.syscall == frames::syscall::SESSION_CONNECTED {
                            greeted.set(true);
                        }
                        dispatch_frame(&frame, ctx);
                    }
                    Err(e) => leptos::logging::warn!("WS decode error: {e}"),
                },
                Ok(Message::Text(_)) => {}
                Err(e) => {
                    leptos::logging::warn!("WS recv error: {e}");
                    break;
                }
            }
        }
    };

    futures::future::select(Box::pin(send_task), Box::pin(recv_task)).await;
    leptos::logging::log!("WS disconnected");
    Ok(greeted.get())
}

/// Dispatch one inbound frame.
#[cfg(feature = "hydrate")]
fn dispatch_frame(frame: &Frame, ctx: AppContext) {
    if frame.syscall == frames::syscall::SESSION_CONNECTED {
        let client_id = types::parse_client_id(frame);
        ctx.session.update(|s| s.connected(client_id));
        ctx.api.fetch_accounts(move |accounts| ctx.session.update(|s| s.set_accounts(accounts)));
        return;
    }
    if router::dispatch(frame) {
        return;
    }
    if frame.syscall == frames::syscall::GATEWAY_ERROR {
        leptos::logging::warn!("gateway:error frame: {}", frame.data);
    } else if frame.status == FrameStatus::Error {
        leptos::logging::warn!("unrouted error: syscall={} data={}", frame.syscall, frame.data);
    }
}
