//! Dialog letting a non-owner execute a record's current action.

use leptos::prelude::*;

use crate::app::AppContext;
use crate::components::tx_button::TxButton;
use crate::net::tx::TxRequest;
use crate::net::types::Record;
use crate::state::modal::ModalState;

/// Close the dialog and build `execute(id, action)` from the record as
/// displayed. `None` if the dialog was not open.
pub fn confirm_execute(record: &Record, modal: &mut ModalState) -> Option<TxRequest> {
    modal
        .confirm()
        .map(|_| TxRequest::execute(&record.id, &record.action))
}

#[component]
pub fn ExecuteActionModal(ctx: AppContext, record: Record) -> impl IntoView {
    let modal = RwSignal::new(ModalState::default());

    let request = Callback::new({
        let record = record.clone();
        move |()| modal.try_update(|m| confirm_execute(&record, m)).flatten()
    });

    view! {
        <button class="btn btn--basic btn--green" on:click=move |_| modal.update(ModalState::open)>
            "Execute Action"
        </button>
        <Show when=move || modal.with(ModalState::is_open)>
            <div class="dialog-backdrop" on:click=move |_| modal.update(ModalState::cancel)>
                <div class="dialog" on:click=move |ev| ev.stop_propagation()>
                    <h2>"Execute Action"</h2>
                    <label class="dialog__label">
                        "Storage ID"
                        <input class="dialog__input" type="text" readonly prop:value=record.id.clone()/>
                    </label>
                    <label class="dialog__label">
                        "Action"
                        <input class="dialog__input" type="text" readonly prop:value=record.action.clone()/>
                    </label>
                    <div class="dialog__actions">
                        <button class="btn btn--basic" on:click=move |_| modal.update(ModalState::cancel)>
                            "Cancel"
                        </button>
                        <TxButton ctx label="Execute" request/>
                    </div>
                </div>
            </div>
        </Show>
    }
}
