// Bridges presenter state updates into a Dioxus signal

use dioxus::prelude::*;
use verse_core::{PopupView, ViewState};

pub struct SignalView {
    state: Signal<ViewState>,
}

impl SignalView {
    pub fn new(state: Signal<ViewState>) -> Self {
        Self { state }
    }
}

impl PopupView for SignalView {
    fn update(&self, state: &ViewState) {
        let mut signal = self.state;
        signal.set(state.clone());
    }

    fn confirm(&self, message: &str) -> bool {
        web_sys::window()
            .and_then(|window| window.confirm_with_message(message).ok())
            .unwrap_or(false)
    }
}
