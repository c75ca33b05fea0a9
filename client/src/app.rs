//! Root application component, shared context and the frame sender.

use leptos::prelude::*;
use leptos_meta::{MetaTags, Stylesheet, Title, provide_meta_context};
use leptos_router::{
    StaticSegment,
    components::{Route, Router, Routes},
};

use crate::net::chain_api::ChainApi;
use crate::net::types::Frame;
use crate::pages::chain_panel::ChainPanel;
use crate::state::{chain::ChainState, session::SessionState};

/// Outbound half of the websocket. Empty during SSR and before the frame
/// client starts, in which case sends report `false`.
#[derive(Clone, Default)]
pub struct FrameSender {
    #[cfg(feature = "hydrate")]
    pub tx: Option<futures::channel::mpsc::UnboundedSender<Vec<u8>>>,
}

impl FrameSender {
    pub fn send(&self, frame: &Frame) -> bool {
        #[cfg(feature = "hydrate")]
        if let Some(tx) = &self.tx {
            return crate::net::frame_client::send_frame(tx, frame);
        }
        let _ = frame;
        false
    }
}

/// Everything a chain view needs, handed down explicitly as a prop.
#[derive(Clone, Copy)]
pub struct AppContext {
    pub session: RwSignal<SessionState>,
    pub chain: RwSignal<ChainState>,
    /// Latest transaction lifecycle message, shared by the whole page.
    pub status: RwSignal<String>,
    pub api: ChainApi,
}

impl AppContext {
    #[must_use]
    pub fn new() -> Self {
        Self {
            session: RwSignal::new(SessionState::default()),
            chain: RwSignal::new(ChainState::default()),
            status: RwSignal::new(String::new()),
            api: ChainApi::new(RwSignal::new(FrameSender::default())),
        }
    }

    pub fn set_status(&self, message: impl Into<String>) {
        self.status.try_set(message.into());
    }

    /// Address of the signing account, untracked.
    #[must_use]
    pub fn current_account(&self) -> Option<String> {
        self.session
            .try_with_untracked(|s| s.current_address().map(str::to_owned))
            .flatten()
    }
}

impl Default for AppContext {
    fn default() -> Self {
        Self::new()
    }
}

/// HTML shell rendered on the server for SSR + hydration.
pub fn shell(options: LeptosOptions) -> impl IntoView {
    view! {
        <!DOCTYPE html>
        <html lang="en">
            <head>
                <meta charset="utf-8"/>
                <meta name="viewport" content="width=device-width, initial-scale=1"/>
                <AutoReload options=options.clone()/>
                <HydrationScripts options/>
                <MetaTags/>
            </head>
            <body>
                <App/>
            </body>
        </html>
    }
}

/// Root application component. Builds the shared context, starts the frame
/// client in the browser and mounts the chain panel.
#[component]
pub fn App() -> impl IntoView {
    provide_meta_context();

    let ctx = AppContext::new();

    #[cfg(feature = "hydrate")]
    crate::net::frame_client::spawn_frame_client(ctx);

    view! {
        <Stylesheet id="leptos" href="/pkg/storagechain-ui.css"/>
        <Title text="Storagechain"/>

        <Router>
            <main class="app">
                <Routes fallback=|| "Page not found.".into_view()>
                    <Route path=StaticSegment("") view=move || view! { <ChainPanel ctx/> }/>
                </Routes>
            </main>
        </Router>
    }
}
