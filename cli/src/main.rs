use std::time::{Duration, SystemTime, UNIX_EPOCH};

use clap::{Parser, Subcommand};
use frames::chain::{PALLET, callable};
use frames::{AccountInfo, Action, Frame, Record, Status, StorageEntry, TxStage, syscall};
use futures_util::{SinkExt, StreamExt};
use serde_json::{Value, json};
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;
use uuid::Uuid;

type WsStream = tokio_tungstenite::WebSocketStream<tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>>;

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("invalid base URL: {0}")]
    InvalidBaseUrl(String),
    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("websocket connect failed: {0}")]
    WsConnect(Box<tokio_tungstenite::tungstenite::Error>),
    #[error("websocket closed")]
    WsClosed,
    #[error("frame decode failed: {0}")]
    Decode(#[from] frames::CodecError),
    #[error("timed out waiting for websocket frame")]
    Timeout,
    #[error("node returned error for {syscall}: {message}")]
    ServerError { syscall: String, message: String },
    #[error("missing expected field `{0}`")]
    MissingField(&'static str),
    #[error("no storage item with id {0}")]
    UnknownRecord(String),
    #[error("invalid JSON payload: {0}")]
    InvalidJson(#[from] serde_json::Error),
}

#[derive(Parser, Debug)]
#[command(name = "storagechain-cli", about = "Storagechain dev node CLI")]
struct Cli {
    #[arg(long, env = "STORAGECHAIN_BASE_URL", default_value = "http://127.0.0.1:3000")]
    base_url: String,

    /// Signing account: a dev account name (alice, bob, ...) or an address.
    #[arg(long = "as", env = "STORAGECHAIN_ACCOUNT", default_value = "alice")]
    account: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Clone)]
struct CliContext {
    base_url: String,
    signer: String,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Check `/healthz`.
    Ping,
    /// List the dev keyring.
    Accounts,
    /// Print the current `CountsOfStorage`.
    Count,
    /// List every stored record.
    List,
    /// Store a number with an action; no action picks one at random.
    Store {
        num: u32,
        #[arg(value_parser = parse_action)]
        action: Option<Action>,
    },
    /// Change the action of a record you stored.
    ChangeAction {
        id: String,
        #[arg(value_parser = parse_action)]
        action: Action,
    },
    /// Execute someone else's record. Defaults to its stored action.
    Execute {
        id: String,
        #[arg(value_parser = parse_action)]
        action: Option<Action>,
    },
    /// Remove every record (alice only).
    Clear,
    /// Print the record count whenever it changes.
    Watch {
        /// Stop after this many notifications.
        #[arg(long)]
        limit: Option<usize>,
    },
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    let cli = Cli::parse();
    let ctx = CliContext { base_url: cli.base_url, signer: resolve_signer(&cli.account) };

    match cli.command {
        Command::Ping => run_ping(&ctx).await,
        Command::Accounts => run_accounts(&ctx).await,
        Command::Count => run_count(&ctx).await,
        Command::List => run_list(&ctx).await,
        Command::Store { num, action } => {
            let action = action.map_or("", Action::as_str);
            submit(&ctx, callable::STORE, vec![json!(num), json!(action)]).await
        }
        Command::ChangeAction { id, action } => {
            submit(&ctx, callable::CHANGE_ACTION, vec![json!(id), json!(action.as_str())]).await
        }
        Command::Execute { id, action } => run_execute(&ctx, id, action).await,
        Command::Clear => submit(&ctx, callable::CLEAR, Vec::new()).await,
        Command::Watch { limit } => run_watch(&ctx, limit).await,
    }
}

fn parse_action(value: &str) -> Result<Action, String> {
    value.parse().map_err(|e: frames::ParseActionError| e.to_string())
}

/// Dev account names map to their address; anything else is taken as-is.
fn resolve_signer(account: &str) -> String {
    frames::chain::dev_address(account).map_or_else(|| account.to_owned(), ToOwned::to_owned)
}

async fn run_ping(cli: &CliContext) -> Result<(), CliError> {
    let url = format!("{}/healthz", cli.base_url.trim_end_matches('/'));
    let response = reqwest::get(url).await?;
    let status = response.status();
    if !status.is_success() {
        return Err(CliError::ServerError {
            syscall: format!("HTTP {}", status.as_u16()),
            message: "health check failed".to_owned(),
        });
    }
    println!("ok");
    Ok(())
}

async fn run_accounts(cli: &CliContext) -> Result<(), CliError> {
    let url = format!("{}/api/accounts", cli.base_url.trim_end_matches('/'));
    let accounts = reqwest::get(url).await?.json::<Vec<AccountInfo>>().await?;
    for account in accounts {
        let marker = if account.address == cli.signer { "*" } else { " " };
        println!("{marker} {:<8} {}", account.name, account.address);
    }
    Ok(())
}

async fn run_count(cli: &CliContext) -> Result<(), CliError> {
    let mut stream = connect(cli).await?;
    let req = request_frame(syscall::STORAGE_COUNT, json!({}), None);
    send(&mut stream, &req).await?;

    let item = wait_for_item(&mut stream, &req.id).await?;
    println!("{}", parse_count(&item)?);

    cancel(&mut stream, &req).await
}

async fn run_list(cli: &CliContext) -> Result<(), CliError> {
    let mut stream = connect(cli).await?;
    for entry in fetch_entries(&mut stream).await? {
        println!("{}", format_record(&entry.value));
    }
    Ok(())
}

async fn run_execute(cli: &CliContext, id: String, action: Option<Action>) -> Result<(), CliError> {
    let action = match action {
        Some(action) => action.as_str().to_owned(),
        None => {
            let mut stream = connect(cli).await?;
            fetch_entries(&mut stream)
                .await?
                .into_iter()
                .find(|entry| entry.key == id)
                .map(|entry| entry.value.action)
                .ok_or_else(|| CliError::UnknownRecord(id.clone()))?
        }
    };
    submit(cli, callable::EXECUTE, vec![json!(id), json!(action)]).await
}

async fn run_watch(cli: &CliContext, limit: Option<usize>) -> Result<(), CliError> {
    let mut stream = connect(cli).await?;
    let req = request_frame(syscall::STORAGE_COUNT, json!({}), None);
    send(&mut stream, &req).await?;

    let mut seen = 0_usize;
    while limit.is_none_or(|limit| seen < limit) {
        let frame = recv_next(&mut stream, None).await?;
        if frame.parent_id.as_deref() != Some(req.id.as_str()) {
            continue;
        }
        if frame.status == Status::Error {
            return Err(server_error(&frame));
        }
        println!("count={}", parse_count(&frame)?);
        seen += 1;
    }

    cancel(&mut stream, &req).await
}

/// Submit `storagechain.<callable>(params)` and print each lifecycle stage.
async fn submit(cli: &CliContext, callable: &str, params: Vec<Value>) -> Result<(), CliError> {
    let mut stream = connect(cli).await?;
    let param_fields = vec![true; params.len()];
    let data = json!({
        "pallet": PALLET,
        "callable": callable,
        "params": params,
        "param_fields": param_fields,
    });
    let req = request_frame(syscall::TX_SUBMIT, data, Some(cli.signer.clone()));
    send(&mut stream, &req).await?;

    loop {
        let frame = recv_next(&mut stream, Some(Duration::from_secs(30))).await?;
        if frame.parent_id.as_deref() != Some(req.id.as_str()) {
            continue;
        }
        if frame.status == Status::Error {
            return Err(server_error(&frame));
        }
        if let Some(line) = format_tx_update(&frame) {
            println!("{line}");
        }
        if frame.status.is_terminal() {
            return Ok(());
        }
    }
}

fn format_tx_update(frame: &Frame) -> Option<String> {
    let stage: TxStage = serde_json::from_value(frame.data.get("status")?.clone()).ok()?;
    let hash = frame.data_str("block_hash").unwrap_or("-");
    Some(match stage {
        TxStage::Ready => format!("ready tx_hash={}", frame.data_str("tx_hash").unwrap_or("-")),
        TxStage::InBlock => {
            let events = frame.data.get("events").map(Value::to_string).unwrap_or_default();
            format!("in_block block_hash={hash} events={events}")
        }
        TxStage::Finalized => format!("finalized block_hash={hash}"),
    })
}

fn format_record(record: &Record) -> String {
    let num = record.num.map_or_else(|| "-".to_owned(), |n| n.to_string());
    format!("{}  num={num}  action={}  storer={}", record.id, record.action, record.storer)
}

fn parse_count(frame: &Frame) -> Result<u64, CliError> {
    frame
        .data
        .get("count")
        .and_then(Value::as_f64)
        .filter(|n| *n >= 0.0 && n.fract() == 0.0)
        .map(|n| {
            #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
            let n = n as u64;
            n
        })
        .ok_or(CliError::MissingField("count"))
}

fn server_error(frame: &Frame) -> CliError {
    let message = match (frame.data_str("code"), frame.error_message()) {
        (Some(code), Some(message)) => format!("{code}: {message}"),
        (Some(code), None) => code.to_owned(),
        (None, message) => message.unwrap_or("unknown websocket error").to_owned(),
    };
    CliError::ServerError { syscall: frame.syscall.clone(), message }
}

// =============================================================================
// WEBSOCKET PLUMBING
// =============================================================================

fn ws_url(base_url: &str) -> Result<String, CliError> {
    let base_url = base_url.trim_end_matches('/');
    if let Some(rest) = base_url.strip_prefix("http://") {
        return Ok(format!("ws://{rest}/api/ws"));
    }
    if let Some(rest) = base_url.strip_prefix("https://") {
        return Ok(format!("wss://{rest}/api/ws"));
    }

    Err(CliError::InvalidBaseUrl(base_url.to_owned()))
}

async fn connect(cli: &CliContext) -> Result<WsStream, CliError> {
    let (mut stream, _) = connect_async(ws_url(&cli.base_url)?)
        .await
        .map_err(|error| CliError::WsConnect(Box::new(error)))?;
    wait_for_session_connected(&mut stream).await?;
    Ok(stream)
}

async fn send(stream: &mut WsStream, frame: &Frame) -> Result<(), CliError> {
    stream
        .send(Message::Binary(frames::encode_frame(frame).into()))
        .await
        .map_err(|error| CliError::WsConnect(Box::new(error)))
}

async fn fetch_entries(stream: &mut WsStream) -> Result<Vec<StorageEntry>, CliError> {
    let req = request_frame(syscall::STORAGE_ENTRIES, json!({}), None);
    send(stream, &req).await?;
    let done = wait_for_terminal_response(stream, &req.id).await?;
    let entries = done.data.get("entries").cloned().ok_or(CliError::MissingField("entries"))?;
    Ok(serde_json::from_value(entries)?)
}

/// Cancel a subscription and wait for the node's acknowledgement.
async fn cancel(stream: &mut WsStream, req: &Frame) -> Result<(), CliError> {
    let cancel = Frame::cancel(Uuid::new_v4().to_string(), req);
    send(stream, &cancel).await?;
    wait_for_terminal_response(stream, &req.id).await.map(|_| ())
}

async fn wait_for_session_connected(stream: &mut WsStream) -> Result<(), CliError> {
    loop {
        let frame = recv_next(stream, Some(Duration::from_secs(5))).await?;
        if frame.syscall == syscall::SESSION_CONNECTED {
            return Ok(());
        }
    }
}

async fn wait_for_item(stream: &mut WsStream, request_id: &str) -> Result<Frame, CliError> {
    loop {
        let frame = recv_next(stream, Some(Duration::from_secs(15))).await?;
        if frame.parent_id.as_deref() != Some(request_id) {
            continue;
        }
        match frame.status {
            Status::Item | Status::Bulk => return Ok(frame),
            Status::Error => return Err(server_error(&frame)),
            _ => {}
        }
    }
}

async fn wait_for_terminal_response(stream: &mut WsStream, request_id: &str) -> Result<Frame, CliError> {
    loop {
        let frame = recv_next(stream, Some(Duration::from_secs(15))).await?;
        if frame.parent_id.as_deref() != Some(request_id) || !frame.status.is_terminal() {
            continue;
        }
        if frame.status == Status::Error {
            return Err(server_error(&frame));
        }
        return Ok(frame);
    }
}

async fn recv_next(stream: &mut WsStream, timeout: Option<Duration>) -> Result<Frame, CliError> {
    let fut = async {
        loop {
            let Some(message) = stream.next().await else {
                return Err(CliError::WsClosed);
            };
            match message.map_err(|error| CliError::WsConnect(Box::new(error)))? {
                Message::Binary(bytes) => {
                    return frames::decode_frame(&bytes).map_err(CliError::from);
                }
                Message::Close(_) => return Err(CliError::WsClosed),
                _ => {}
            }
        }
    };

    match timeout {
        Some(timeout) => tokio::time::timeout(timeout, fut).await.map_err(|_| CliError::Timeout)?,
        None => fut.await,
    }
}

fn request_frame(syscall: &str, data: Value, from: Option<String>) -> Frame {
    let mut frame = Frame::request(Uuid::new_v4().to_string(), syscall, data);
    frame.ts = now_ms();
    frame.from = from;
    frame
}

fn now_ms() -> i64 {
    let Ok(duration) = SystemTime::now().duration_since(UNIX_EPOCH) else {
        return 0;
    };
    i64::try_from(duration.as_millis()).unwrap_or(0)
}

#[cfg(test)]
#[path = "main_test.rs"]
mod tests;
