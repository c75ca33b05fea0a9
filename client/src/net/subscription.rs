//! Subscription handles and the resubscribe state machine.
//!
//! A storage subscription stays open on the node until the client cancels
//! it. `SubscriptionHandle::cancel` swaps the reply route to wait for the
//! node's acknowledgement and hands control back through a continuation,
//! so a replacement subscription is only opened once the old one is gone.
//! `SubscriptionSlot` tracks that hand-over for one logical subscription.

#[cfg(test)]
#[path = "subscription_test.rs"]
mod subscription_test;

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::net::chain_api::ChainApi;
use crate::net::router;
use crate::net::types::Frame;

/// Handle to one open subscription.
#[derive(Clone)]
pub struct SubscriptionHandle {
    request: Frame,
    api: ChainApi,
    cancelled: Arc<AtomicBool>,
}

impl SubscriptionHandle {
    pub(crate) fn new(request: Frame, api: ChainApi, cancelled: Arc<AtomicBool>) -> Self {
        Self { request, api, cancelled }
    }

    #[must_use]
    pub fn request_id(&self) -> &str {
        &self.request.id
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }

    /// Stop the subscription. `on_ack` runs once the node acknowledges the
    /// cancel, immediately when the cancel cannot be sent, or when the
    /// connection drops first. A second cancel only runs `on_ack`.
    pub fn cancel(self, on_ack: impl FnOnce() + 'static) {
        if self.cancelled.swap(true, Ordering::Relaxed) {
            on_ack();
            return;
        }
        let cancel = Frame::cancel(uuid::Uuid::new_v4().to_string(), &self.request);
        if self.api.send(&cancel) {
            router::await_ack(self.request.id.clone(), on_ack);
        } else {
            router::remove(&self.request.id);
            on_ack();
        }
    }
}

/// Lifecycle of one logical subscription across resubscribes.
#[derive(Debug)]
pub enum SubscriptionSlot<H> {
    Idle,
    Active(H),
    /// A cancel is in flight; the acknowledgement starts the replacement.
    Cancelling,
    /// Owner unmounted; nothing starts again.
    Closed,
}

impl<H> Default for SubscriptionSlot<H> {
    fn default() -> Self {
        Self::Idle
    }
}

/// What the owner should do after [`SubscriptionSlot::request`].
#[derive(Debug, PartialEq, Eq)]
pub enum Next<H> {
    /// Open the subscription now and [`install`](SubscriptionSlot::install) it.
    Start,
    /// Cancel this handle; start from its acknowledgement.
    CancelThenStart(H),
    /// A cancel is already in flight and will start the latest subscription.
    Wait,
    /// The slot is closed.
    Stop,
}

impl<H> SubscriptionSlot<H> {
    /// Ask for a fresh subscription reflecting the latest inputs.
    pub fn request(&mut self) -> Next<H> {
        match std::mem::take(self) {
            Self::Idle => Next::Start,
            Self::Active(handle) => {
                *self = Self::Cancelling;
                Next::CancelThenStart(handle)
            }
            Self::Cancelling => {
                *self = Self::Cancelling;
                Next::Wait
            }
            Self::Closed => {
                *self = Self::Closed;
                Next::Stop
            }
        }
    }

    /// The in-flight cancel was acknowledged. Returns `true` when the owner
    /// should start the replacement.
    pub fn acknowledged(&mut self) -> bool {
        if matches!(self, Self::Cancelling) {
            *self = Self::Idle;
            true
        } else {
            false
        }
    }

    /// Record a freshly opened subscription. A closed slot hands the handle
    /// back so the caller can cancel it.
    pub fn install(&mut self, handle: H) -> Option<H> {
        if matches!(self, Self::Closed) {
            return Some(handle);
        }
        *self = Self::Active(handle);
        None
    }

    /// Mark the slot as finished without a subscription, e.g. nothing to watch.
    pub fn clear(&mut self) {
        if !matches!(self, Self::Closed) {
            *self = Self::Idle;
        }
    }

    /// Close for good, returning the open handle if any.
    pub fn close(&mut self) -> Option<H> {
        match std::mem::replace(self, Self::Closed) {
            Self::Active(handle) => Some(handle),
            _ => None,
        }
    }
}
