//! Chain panel: live record list plus the creation form.
//!
//! SUBSCRIPTIONS
//! =============
//! 1. `storage:count`, restarted per connection and keyring. Every count
//!    notification triggers a full `storage:entries` scan that replaces the
//!    identifier list (and bumps its generation when it changed).
//! 2. `storage:multi` over the identifiers, restarted per connection and
//!    identifier generation. Notifications are tagged with the generation
//!    they were opened for; stale ones are ignored by `ChainState`.
//!
//! A restart cancels the previous subscription and opens the next one only
//! from the cancel acknowledgement. Unmount closes both slots.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use leptos::prelude::*;

use crate::app::AppContext;
use crate::components::ACTION_PLACEHOLDER;
use crate::components::account_selector::AccountSelector;
use crate::components::record_list::RecordListView;
use crate::components::tx_button::TxButton;
use crate::net::subscription::{Next, SubscriptionHandle, SubscriptionSlot};
use crate::net::tx::TxRequest;
use crate::state::session::SessionState;

type Slot = Arc<Mutex<SubscriptionSlot<SubscriptionHandle>>>;

fn lock(slot: &Slot) -> MutexGuard<'_, SubscriptionSlot<SubscriptionHandle>> {
    slot.lock().unwrap_or_else(PoisonError::into_inner)
}

#[component]
pub fn ChainPanel(ctx: AppContext) -> impl IntoView {
    let count_slot: Slot = Arc::default();
    let multi_slot: Slot = Arc::default();

    let subscription_key = Memo::new(move |_| ctx.session.with(SessionState::subscription_key));
    let epoch = Memo::new(move |_| ctx.session.with(|s| s.connection_epoch));
    let generation = Memo::new(move |_| ctx.chain.with(|c| c.generation));

    Effect::new({
        let slot = Arc::clone(&count_slot);
        move |_| {
            let (epoch, _keyring) = subscription_key.get();
            if epoch > 0 {
                restart(&slot, ctx, start_count);
            }
        }
    });

    Effect::new({
        let slot = Arc::clone(&multi_slot);
        move |_| {
            let _ = generation.get();
            if epoch.get() > 0 {
                restart(&slot, ctx, start_multi);
            }
        }
    });

    on_cleanup(move || {
        for slot in [count_slot, multi_slot] {
            let open = lock(&slot).close();
            if let Some(handle) = open {
                handle.cancel(|| {});
            }
        }
    });

    let records = Memo::new(move |_| ctx.chain.with(|c| c.records.clone()));

    let num = RwSignal::new(String::new());
    let action = RwSignal::new(String::new());
    let create = Callback::new(move |()| {
        let request = TxRequest::store(&num.get_untracked(), &action.get_untracked());
        num.set(String::new());
        action.set(String::new());
        Some(request)
    });

    view! {
        <div class="chain-panel">
            <header class="chain-panel__header">
                <h1>"Storages"</h1>
                <AccountSelector ctx/>
            </header>

            <RecordListView ctx records/>

            <form class="chain-panel__form" on:submit=|ev| ev.prevent_default()>
                <label class="chain-panel__field">
                    "Number"
                    <input
                        class="chain-panel__input"
                        type="text"
                        placeholder="Enter a number"
                        prop:value=move || num.get()
                        on:input=move |ev| num.set(event_target_value(&ev))
                    />
                </label>
                <label class="chain-panel__field">
                    "Action"
                    <input
                        class="chain-panel__input"
                        type="text"
                        placeholder=ACTION_PLACEHOLDER
                        prop:value=move || action.get()
                        on:input=move |ev| action.set(event_target_value(&ev))
                    />
                </label>
                <div class="chain-panel__field chain-panel__field--center">
                    <TxButton ctx label="Create Storage" request=create/>
                </div>
            </form>

            <div class="chain-panel__status">{move || ctx.status.get()}</div>
        </div>
    }
}

/// Replace the subscription held in `slot` with a fresh one from `start`.
fn restart(slot: &Slot, ctx: AppContext, start: fn(&Slot, AppContext)) {
    let next = lock(slot).request();
    match next {
        Next::Start => start(slot, ctx),
        Next::CancelThenStart(handle) => {
            let slot = Arc::clone(slot);
            handle.cancel(move || {
                if lock(&slot).acknowledged() {
                    start(&slot, ctx);
                }
            });
        }
        Next::Wait | Next::Stop => {}
    }
}

fn install(slot: &Slot, handle: SubscriptionHandle) {
    let rejected = lock(slot).install(handle);
    if let Some(handle) = rejected {
        handle.cancel(|| {});
    }
}

fn start_count(slot: &Slot, ctx: AppContext) {
    let handle = ctx.api.subscribe_count(move |count| {
        ctx.chain.update(|c| {
            c.apply_count(count);
        });
        ctx.api.fetch_entries(move |entries| {
            ctx.chain.update(|c| {
                c.apply_entries(entries);
            });
        });
    });
    install(slot, handle);
}

fn start_multi(slot: &Slot, ctx: AppContext) {
    let Some((generation, ids)) = ctx.chain.try_with_untracked(|c| (c.generation, c.ids.clone())) else {
        return;
    };
    if ids.is_empty() {
        ctx.chain.update(|c| {
            c.apply_records(generation, Vec::new());
        });
        lock(slot).clear();
        return;
    }

    let handle = ctx.api.subscribe_multi(&ids, move |records| {
        ctx.chain.update(|c| {
            c.apply_records(generation, records);
        });
    });
    install(slot, handle);
}
