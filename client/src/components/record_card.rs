//! Card for one stored record.

#[cfg(test)]
#[path = "record_card_test.rs"]
mod record_card_test;

use leptos::prelude::*;

use crate::app::AppContext;
use crate::components::change_action_modal::ChangeActionModal;
use crate::components::execute_action_modal::ExecuteActionModal;
use crate::net::types::Record;

/// The single action a card offers.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CardControl {
    /// The storer may retarget the action.
    ChangeAction,
    /// Anyone else may execute it.
    ExecuteAction,
}

impl CardControl {
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::ChangeAction => "Change Action",
            Self::ExecuteAction => "Execute Action",
        }
    }
}

/// Display text and ownership for a card.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CardModel {
    pub number: String,
    pub action: String,
    pub storer: String,
    pub mine: bool,
    pub control: CardControl,
}

impl CardModel {
    #[must_use]
    pub fn new(record: &Record, current_account: Option<&str>) -> Self {
        let mine = current_account.is_some_and(|account| account == record.storer);
        let number = record.num.map(|n| n.to_string()).unwrap_or_default();
        Self {
            number: format!("Number: {number}"),
            action: format!("Action: {}", record.action),
            storer: format!("Storer: {}", record.storer),
            mine,
            control: if mine { CardControl::ChangeAction } else { CardControl::ExecuteAction },
        }
    }
}

#[component]
pub fn RecordCard(ctx: AppContext, record: Record) -> impl IntoView {
    let model = Memo::new({
        let record = record.clone();
        move |_| ctx.session.with(|s| CardModel::new(&record, s.current_address()))
    });

    view! {
        <div class="record-card">
            <Show when=move || model.with(|m| m.mine)>
                <span class="record-card__badge">"Mine"</span>
            </Show>
            <div class="record-card__content">
                <div class="record-card__meta">{move || model.with(|m| m.number.clone())}</div>
                <p class="record-card__line">{move || model.with(|m| m.action.clone())}</p>
                <p class="record-card__line">{move || model.with(|m| m.storer.clone())}</p>
            </div>
            <div class="record-card__extra">
                {move || {
                    let record = record.clone();
                    match model.with(|m| m.control) {
                        CardControl::ChangeAction => view! { <ChangeActionModal ctx record/> }.into_any(),
                        CardControl::ExecuteAction => view! { <ExecuteActionModal ctx record/> }.into_any(),
                    }
                }}
            </div>
        </div>
    }
}
