pub mod chrome;
pub mod services;

#[cfg(feature = "dioxus")]
mod components;
#[cfg(feature = "dioxus")]
pub mod icons;
#[cfg(feature = "dioxus")]
mod popup_view;

#[cfg(feature = "dioxus")]
pub use popup::run;

#[cfg(feature = "dioxus")]
mod popup {
    use std::rc::Rc;

    use dioxus::prelude::*;
    use verse_core::{HttpVerseSource, Presenter, ReminderStore, VerseConfig};

    use crate::components::{ReadingControls, VerseCard};
    use crate::popup_view::SignalView;
    use crate::services::{BrowserClock, ChromeStorage};

    type PopupPresenter = Presenter<HttpVerseSource, ChromeStorage, SignalView, BrowserClock>;

    #[component]
    fn App() -> Element {
        let state = use_signal(Default::default);
        let mut reminders = use_signal(|| None::<bool>);

        let presenter: Rc<PopupPresenter> = use_hook(|| {
            let config = VerseConfig::default();
            Rc::new(Presenter::new(
                HttpVerseSource::new(config.api.clone()),
                ChromeStorage::new(),
                SignalView::new(state),
                BrowserClock,
                config.api,
            ))
        });

        let init = presenter.clone();
        use_future(move || {
            let presenter = init.clone();
            async move {
                presenter.initialize().await;
                match presenter.store().reminders_enabled().await {
                    Ok(enabled) => reminders.set(Some(enabled)),
                    Err(e) => log::error!("Failed to read reminder setting: {}", e),
                }
            }
        });

        let next = presenter.clone();
        let on_next = move |_| {
            let presenter = next.clone();
            spawn(async move {
                presenter.advance().await;
            });
        };

        let on_toggle = move |_| {
            let enabled = !reminders().unwrap_or(false);
            spawn(async move {
                let store = ReminderStore::new(ChromeStorage::new());
                match store.set_reminders_enabled(enabled).await {
                    Ok(()) => reminders.set(Some(enabled)),
                    Err(e) => log::error!("Failed to save reminder setting: {}", e),
                }
            });
        };

        let on_close = move |_| {
            if let Some(window) = web_sys::window() {
                let _ = window.close();
            }
        };

        rsx! {
            div { class: "w-96 min-h-64 bg-gray-50 p-4",
                VerseCard { state: state() }
                ReadingControls {
                    progress: state().progress,
                    reminders: reminders(),
                    on_next,
                    on_toggle,
                    on_close,
                }
            }
        }
    }

    #[wasm_bindgen::prelude::wasm_bindgen(start)]
    pub fn run() {
        wasm_logger::init(wasm_logger::Config::default());
        log::info!("Daily Verses popup starting...");
        dioxus::launch(App);
    }
}
