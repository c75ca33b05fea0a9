//! Dialog letting the storer retarget a record's action.

use leptos::prelude::*;

use crate::app::AppContext;
use crate::components::ACTION_PLACEHOLDER;
use crate::components::tx_button::TxButton;
use crate::net::tx::TxRequest;
use crate::net::types::Record;
use crate::state::modal::ModalState;

/// Close the dialog and build `changeAction(id, entered)`. The entered text
/// is passed through unvalidated. `None` if the dialog was not open.
pub fn confirm_change_action(record_id: &str, modal: &mut ModalState) -> Option<TxRequest> {
    modal
        .confirm()
        .map(|target| TxRequest::change_action(record_id, &target))
}

#[component]
pub fn ChangeActionModal(ctx: AppContext, record: Record) -> impl IntoView {
    let modal = RwSignal::new(ModalState::default());
    let record_id = record.id;

    let request = Callback::new({
        let record_id = record_id.clone();
        move |()| {
            modal
                .try_update(|m| confirm_change_action(&record_id, m))
                .flatten()
        }
    });

    view! {
        <button class="btn btn--basic btn--blue" on:click=move |_| modal.update(ModalState::open)>
            "Change Action"
        </button>
        <Show when=move || modal.with(ModalState::is_open)>
            <div class="dialog-backdrop" on:click=move |_| modal.update(ModalState::cancel)>
                <div class="dialog" on:click=move |ev| ev.stop_propagation()>
                    <h2>"Change the Stored Action"</h2>
                    <label class="dialog__label">
                        "Storage ID"
                        <input class="dialog__input" type="text" readonly prop:value=record_id.clone()/>
                    </label>
                    <label class="dialog__label">
                        "Action"
                        <input
                            class="dialog__input"
                            type="text"
                            placeholder=ACTION_PLACEHOLDER
                            prop:value=move || modal.with(|m| m.input().to_owned())
                            on:input=move |ev| {
                                let text = event_target_value(&ev);
                                modal.update(|m| m.edit(text));
                            }
                        />
                    </label>
                    <div class="dialog__actions">
                        <button class="btn btn--basic" on:click=move |_| modal.update(ModalState::cancel)>
                            "Cancel"
                        </button>
                        <TxButton ctx label="Action" request/>
                    </div>
                </div>
            </div>
        </Show>
    }
}
