//! Storage queries, subscriptions and extrinsic submission over the frame
//! transport.
//!
//! DESIGN
//! ======
//! `ChainApi` is a `Copy` handle over the shared `FrameSender` signal, so it
//! can travel inside `AppContext` props and closures. Every call registers a
//! reply route under its request id before the frame is queued; when the
//! frame cannot be queued the route is dropped again and the caller sees a
//! cancelled subscription or a `false` return.
//!
//! The request builders are plain functions so the wire shape is testable
//! without a browser.

#[cfg(test)]
#[path = "chain_api_test.rs"]
mod chain_api_test;

use std::cell::RefCell;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use frames::syscall;
use leptos::prelude::*;
use serde_json::json;

use crate::app::FrameSender;
use crate::net::router;
use crate::net::subscription::SubscriptionHandle;
use crate::net::tx::{self, TxHandle, TxRequest};
use crate::net::types::{self, AccountInfo, Frame, FrameStatus, Record, StorageEntry};

fn next_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

#[must_use]
pub fn count_request() -> Frame {
    Frame::request(next_id(), syscall::STORAGE_COUNT, json!({}))
}

#[must_use]
pub fn entries_request() -> Frame {
    Frame::request(next_id(), syscall::STORAGE_ENTRIES, json!({}))
}

#[must_use]
pub fn multi_request(keys: &[String]) -> Frame {
    Frame::request(next_id(), syscall::STORAGE_MULTI, json!({ "keys": keys }))
}

#[must_use]
pub fn accounts_request() -> Frame {
    Frame::request(next_id(), syscall::KEYRING_ACCOUNTS, json!({}))
}

/// `tx:submit` signed by `signer`.
#[must_use]
pub fn submit_request(request: &TxRequest, signer: &str) -> Frame {
    let mut frame = Frame::request(next_id(), syscall::TX_SUBMIT, request.to_data());
    frame.from = Some(signer.to_owned());
    frame
}

#[derive(Clone, Copy)]
pub struct ChainApi {
    sender: RwSignal<FrameSender>,
}

impl ChainApi {
    #[must_use]
    pub fn new(sender: RwSignal<FrameSender>) -> Self {
        Self { sender }
    }

    /// Install the transport once the frame client is running.
    pub fn attach(&self, sender: FrameSender) {
        self.sender.set(sender);
    }

    /// Queue a frame for the node. `false` when there is no transport.
    pub fn send(&self, frame: &Frame) -> bool {
        self.sender.try_with_untracked(|s| s.send(frame)).unwrap_or(false)
    }

    /// Watch `CountsOfStorage`. `on_count` runs for the current value and
    /// every change after it.
    pub fn subscribe_count(self, on_count: impl Fn(u32) + 'static) -> SubscriptionHandle {
        self.subscribe(count_request(), move |frame| match types::parse_count(frame) {
            Some(count) => on_count(count),
            None => leptos::logging::warn!("storage:count: malformed item {}", frame.data),
        })
    }

    /// Watch the `Storages` values for `keys`. `on_records` receives the
    /// full list, aligned with `keys`, on every change.
    pub fn subscribe_multi(self, keys: &[String], on_records: impl Fn(Vec<Option<Record>>) + 'static) -> SubscriptionHandle {
        self.subscribe(multi_request(keys), move |frame| match types::parse_records(frame) {
            Some(records) => on_records(records),
            None => leptos::logging::warn!("storage:multi: malformed item {}", frame.data),
        })
    }

    /// One-shot scan over every `Storages` entry.
    pub fn fetch_entries(self, on_entries: impl FnOnce(Vec<StorageEntry>) + 'static) -> bool {
        self.request_once(entries_request(), types::parse_entries, on_entries)
    }

    /// One-shot keyring listing.
    pub fn fetch_accounts(self, on_accounts: impl FnOnce(Vec<AccountInfo>) + 'static) -> bool {
        self.request_once(accounts_request(), types::parse_accounts, on_accounts)
    }

    /// Submit a signed extrinsic. `on_status` receives each lifecycle
    /// message until the handle is released or the extrinsic settles.
    pub fn submit(self, request: &TxRequest, signer: &str, on_status: impl Fn(String) + 'static) -> TxHandle {
        let frame = submit_request(request, signer);
        let released = Arc::new(AtomicBool::new(false));
        let handle = TxHandle::new(frame.id.clone(), Arc::clone(&released));

        router::register(frame.id.clone(), move |reply| {
            if released.load(Ordering::Relaxed) {
                return;
            }
            if let Some(message) = tx::status_message(reply) {
                on_status(message);
            }
        });
        if !self.send(&frame) {
            router::remove(&frame.id);
            leptos::logging::warn!("tx:submit: no connection, {} not sent", request.callable);
        }
        handle
    }

    fn subscribe(self, request: Frame, on_item: impl Fn(&Frame) + 'static) -> SubscriptionHandle {
        let cancelled = Arc::new(AtomicBool::new(false));
        let live = Arc::clone(&cancelled);
        let syscall = request.syscall.clone();

        router::register(request.id.clone(), move |frame| {
            if live.load(Ordering::Relaxed) {
                return;
            }
            match frame.status {
                FrameStatus::Item | FrameStatus::Bulk => on_item(frame),
                FrameStatus::Error => {
                    leptos::logging::warn!("{syscall}: subscription failed: {}", frame.error_message().unwrap_or("-"));
                }
                _ => {}
            }
        });
        if !self.send(&request) {
            router::remove(&request.id);
            cancelled.store(true, Ordering::Relaxed);
        }
        SubscriptionHandle::new(request, self, cancelled)
    }

    fn request_once<T: 'static>(
        self,
        request: Frame,
        parse: fn(&Frame) -> Option<T>,
        on_reply: impl FnOnce(T) + 'static,
    ) -> bool {
        let pending = RefCell::new(Some(on_reply));
        router::register(request.id.clone(), move |frame| {
            if frame.status == FrameStatus::Error {
                leptos::logging::warn!("{}: {}", frame.syscall, frame.error_message().unwrap_or("-"));
                return;
            }
            if frame.status != FrameStatus::Done {
                return;
            }
            match (parse(frame), pending.borrow_mut().take()) {
                (Some(value), Some(on_reply)) => on_reply(value),
                (None, _) => leptos::logging::warn!("{}: malformed reply {}", frame.syscall, frame.data),
                (Some(_), None) => {}
            }
        });
        if self.send(&request) {
            true
        } else {
            router::remove(&request.id);
            false
        }
    }
}
