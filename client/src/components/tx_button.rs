//! Generic signed-transaction button.

#[cfg(test)]
#[path = "tx_button_test.rs"]
mod tx_button_test;

use leptos::prelude::*;

use crate::app::AppContext;
use crate::net::tx::{self, TxHandle, TxRequest};

/// Outcome of one click.
#[derive(Clone, Debug, PartialEq)]
pub enum Click {
    Submit { request: TxRequest, signer: String },
    /// A request was built but nobody can sign it.
    NoAccount,
    /// The request callback declined.
    Nothing,
}

/// Build the request before looking at the signer. Building is what closes
/// a confirming dialog, so it happens whether or not an account is selected.
pub fn resolve_click(
    build: impl FnOnce() -> Option<TxRequest>,
    signer: impl FnOnce() -> Option<String>,
) -> Click {
    let Some(request) = build() else {
        return Click::Nothing;
    };
    match signer() {
        Some(signer) => Click::Submit { request, signer },
        None => Click::NoAccount,
    }
}

/// Submits the extrinsic `request` yields at click time, signed by the
/// current account, and reports progress through the shared status line.
/// A `None` request submits nothing.
///
/// Each click releases the button's previous submission, so the status line
/// follows the latest one.
#[component]
pub fn TxButton(
    ctx: AppContext,
    #[prop(into)] label: String,
    request: Callback<(), Option<TxRequest>>,
    #[prop(optional, into)] class: Option<String>,
) -> impl IntoView {
    let last = StoredValue::new(None::<TxHandle>);
    let class = class.unwrap_or_else(|| "btn btn--primary".to_owned());

    let on_click = move |_| {
        let (request, signer) = match resolve_click(|| request.run(()), || ctx.current_account()) {
            Click::Submit { request, signer } => (request, signer),
            Click::NoAccount => {
                ctx.set_status(tx::NO_ACCOUNT);
                return;
            }
            Click::Nothing => return,
        };
        if let Some(previous) = last.try_update_value(Option::take).flatten() {
            previous.release();
        }

        ctx.set_status(tx::SENDING);
        let handle = ctx.api.submit(&request, &signer, move |message| ctx.set_status(message));
        last.set_value(Some(handle));
    };

    view! {
        <button class=class on:click=on_click>
            {label}
        </button>
    }
}
