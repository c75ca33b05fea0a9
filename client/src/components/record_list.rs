//! Grid of record cards with an empty-state message.

#[cfg(test)]
#[path = "record_list_test.rs"]
mod record_list_test;

use leptos::prelude::*;

use crate::app::AppContext;
use crate::components::record_card::RecordCard;
use crate::net::types::Record;

pub const EMPTY_MESSAGE: &str = "No Storage items found... Create one now!";

/// One grid cell: a record keyed by its position.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ListItem {
    pub key: String,
    pub record: Record,
}

impl ListItem {
    /// Rendering identity: a cell is rebuilt when its position or any
    /// displayed field changes.
    #[must_use]
    pub fn identity(&self) -> (String, String, Option<u32>, String, String) {
        (
            self.key.clone(),
            self.record.id.clone(),
            self.record.num,
            self.record.action.clone(),
            self.record.storer.clone(),
        )
    }
}

#[must_use]
pub fn card_key(index: usize) -> String {
    format!("storage-{index}")
}

/// Cells in input order.
#[must_use]
pub fn list_items(records: &[Record]) -> Vec<ListItem> {
    records
        .iter()
        .enumerate()
        .map(|(i, record)| ListItem { key: card_key(i), record: record.clone() })
        .collect()
}

#[component]
pub fn RecordListView(ctx: AppContext, #[prop(into)] records: Signal<Vec<Record>>) -> impl IntoView {
    view! {
        <Show
            when=move || records.with(|r| !r.is_empty())
            fallback=|| {
                view! {
                    <div class="message message--info">
                        <div class="message__header">
                            {EMPTY_MESSAGE} " "
                            <span role="img" aria-label="point-down">"👇"</span>
                        </div>
                    </div>
                }
            }
        >
            <div class="record-grid">
                <For
                    each=move || records.with(|r| list_items(r))
                    key=ListItem::identity
                    children=move |item: ListItem| {
                        let ListItem { key, record } = item;
                        view! {
                            <div class="record-grid__column" data-key=key>
                                <RecordCard ctx record/>
                            </div>
                        }
                    }
                />
            </div>
        </Show>
    }
}
