use crate::icons;
use dioxus::prelude::*;

#[component]
pub fn ReadingControls(
    progress: f64,
    reminders: Option<bool>,
    on_next: EventHandler<MouseEvent>,
    on_toggle: EventHandler<MouseEvent>,
    on_close: EventHandler<MouseEvent>,
) -> Element {
    let reminder_label = match reminders {
        Some(true) => "Reminders on",
        Some(false) => "Reminders off",
        None => "Reminders",
    };

    rsx! {
        div { class: "bg-white rounded-lg shadow-lg p-4",
            // Reading progress
            div { class: "mb-4",
                div { class: "flex justify-between text-xs text-gray-500 mb-1",
                    span { "Progress" }
                    span { "{progress:.2}%" }
                }
                div { class: "w-full h-2 bg-gray-200 rounded-full",
                    div {
                        class: "h-2 bg-emerald-600 rounded-full",
                        style: "width: {progress}%",
                    }
                }
            }

            div { class: "grid grid-cols-2 gap-3 mb-3",
                button {
                    class: "bg-gray-200 text-gray-700 py-2 px-4 rounded-lg hover:bg-gray-300 transition flex items-center justify-center",
                    onclick: move |e| on_close.call(e),
                    icons::X { class: Some("w-4 h-4 mr-1".to_string()) }
                    span { "Close" }
                }
                button {
                    class: "bg-emerald-600 text-white py-2 px-4 rounded-lg hover:bg-emerald-700 transition flex items-center justify-center",
                    onclick: move |e| on_next.call(e),
                    span { "Next Verse" }
                    icons::ChevronRight { class: Some("w-4 h-4 ml-1".to_string()) }
                }
            }

            button {
                class: "w-full text-sm text-gray-600 py-2 rounded-lg hover:bg-gray-100 transition flex items-center justify-center disabled:opacity-50",
                disabled: reminders.is_none(),
                onclick: move |e| on_toggle.call(e),
                icons::Bell { class: Some("w-4 h-4 mr-2".to_string()) }
                span { "{reminder_label}" }
            }
        }
    }
}
