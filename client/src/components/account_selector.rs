//! Signing-account picker and connection indicator.

#[cfg(test)]
#[path = "account_selector_test.rs"]
mod account_selector_test;

use leptos::prelude::*;

use crate::app::AppContext;
use crate::net::types::AccountInfo;
use crate::state::session::ConnectionStatus;

/// Shorten an SS58 address for display.
#[must_use]
pub fn short_address(address: &str) -> String {
    let chars: Vec<char> = address.chars().collect();
    if chars.len() <= 12 {
        return address.to_owned();
    }
    let head: String = chars[..6].iter().collect();
    let tail: String = chars[chars.len() - 6..].iter().collect();
    format!("{head}...{tail}")
}

#[must_use]
pub fn account_label(account: &AccountInfo) -> String {
    format!("{} ({})", account.name, short_address(&account.address))
}

#[component]
pub fn AccountSelector(ctx: AppContext) -> impl IntoView {
    let status_label = move || match ctx.session.with(|s| s.connection_status) {
        ConnectionStatus::Connected => "Connected",
        ConnectionStatus::Connecting => "Connecting...",
        ConnectionStatus::Disconnected => "Disconnected",
    };

    view! {
        <div class="account-selector">
            <span class="account-selector__status">{status_label}</span>
            <select
                class="account-selector__select"
                prop:value=move || ctx.session.with(|s| s.current_account.clone().unwrap_or_default())
                on:change=move |ev| {
                    let address = event_target_value(&ev);
                    ctx.session.update(|s| {
                        s.select_account(&address);
                    });
                }
            >
                {move || {
                    ctx.session
                        .with(|s| s.accounts.clone())
                        .into_iter()
                        .map(|account| {
                            let label = account_label(&account);
                            view! { <option value=account.address>{label}</option> }
                        })
                        .collect_view()
                }}
            </select>
        </div>
    }
}
