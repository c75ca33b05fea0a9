//! Reply routing for outstanding requests.
//!
//! DESIGN
//! ======
//! Every reply carries `parent_id` = the request it answers. Requests that
//! expect replies register a route under their id:
//! - `Stream` routes see every reply; a terminal reply removes the route.
//! - `Ack` routes replace a stream while its cancel is in flight. Items the
//!   node flushed ahead of the ack are dropped; the terminal ack fires the
//!   continuation once.
//!
//! Handlers run after the router borrow is released, so a handler may
//! register or cancel other routes.

#[cfg(test)]
#[path = "router_test.rs"]
mod router_test;

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::net::types::Frame;

pub type StreamHandler = Rc<dyn Fn(&Frame)>;
pub type AckHandler = Box<dyn FnOnce()>;

enum Route {
    Stream(StreamHandler),
    Ack(AckHandler),
}

/// What to run for one inbound frame.
pub enum Dispatch {
    Stream(StreamHandler),
    Ack(AckHandler),
}

impl Dispatch {
    pub fn run(self, frame: &Frame) {
        match self {
            Self::Stream(handler) => handler(frame),
            Self::Ack(on_ack) => on_ack(),
        }
    }
}

#[derive(Default)]
pub struct FrameRouter {
    routes: HashMap<String, Route>,
}

impl FrameRouter {
    pub fn register(&mut self, request_id: impl Into<String>, handler: impl Fn(&Frame) + 'static) {
        self.routes.insert(request_id.into(), Route::Stream(Rc::new(handler)));
    }

    /// Swap the route for `request_id` to wait for a cancel acknowledgement.
    pub fn await_ack(&mut self, request_id: impl Into<String>, on_ack: impl FnOnce() + 'static) {
        self.routes.insert(request_id.into(), Route::Ack(Box::new(on_ack)));
    }

    pub fn remove(&mut self, request_id: &str) -> bool {
        self.routes.remove(request_id).is_some()
    }

    /// Resolve the handler for `frame`, updating the table for terminal
    /// replies. `None` for unrouted frames and for items behind a cancel.
    pub fn route(&mut self, frame: &Frame) -> Option<Dispatch> {
        let key = frame.parent_id.as_deref()?;
        let terminal = frame.status.is_terminal();

        match self.routes.get(key)? {
            Route::Stream(handler) if !terminal => Some(Dispatch::Stream(Rc::clone(handler))),
            Route::Ack(_) if !terminal => None,
            _ => match self.routes.remove(key)? {
                Route::Stream(handler) => Some(Dispatch::Stream(handler)),
                Route::Ack(on_ack) => Some(Dispatch::Ack(on_ack)),
            },
        }
    }

    /// Drop every route. Pending acknowledgements are returned so the caller
    /// can run them: with the connection gone, nothing is left to cancel.
    pub fn reset(&mut self) -> Vec<AckHandler> {
        self.routes
            .drain()
            .filter_map(|(_, route)| match route {
                Route::Ack(on_ack) => Some(on_ack),
                Route::Stream(_) => None,
            })
            .collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

thread_local! {
    static ROUTER: RefCell<FrameRouter> = RefCell::new(FrameRouter::default());
}

pub fn register(request_id: impl Into<String>, handler: impl Fn(&Frame) + 'static) {
    ROUTER.with(|r| r.borrow_mut().register(request_id, handler));
}

pub fn await_ack(request_id: impl Into<String>, on_ack: impl FnOnce() + 'static) {
    ROUTER.with(|r| r.borrow_mut().await_ack(request_id, on_ack));
}

pub fn remove(request_id: &str) -> bool {
    ROUTER.with(|r| r.borrow_mut().remove(request_id))
}

/// Route one inbound frame. Returns `false` when nothing claimed it.
pub fn dispatch(frame: &Frame) -> bool {
    let Some(dispatch) = ROUTER.with(|r| r.borrow_mut().route(frame)) else {
        return false;
    };
    dispatch.run(frame);
    true
}

/// Forget every route and run pending acknowledgements.
pub fn reset() {
    let pending = ROUTER.with(|r| r.borrow_mut().reset());
    for on_ack in pending {
        on_ack();
    }
}
