use crate::icons;
use dioxus::prelude::*;
use verse_core::ViewState;

const BISMILLAH: &str = "بِسْمِ ٱللَّهِ ٱلرَّحْمَـٰنِ ٱلرَّحِيمِ";

#[component]
pub fn VerseCard(state: ViewState) -> Element {
    rsx! {
        div { class: "bg-white rounded-lg shadow-lg p-6 mb-4",
            if let Some(verse) = &state.verse {
                div { class: "text-center mb-4",
                    h2 { class: "text-lg font-bold text-gray-900", "{verse.chapter_title}" }
                    p { class: "text-xs text-gray-500", "{verse.revelation}" }
                }
            }

            if state.bismillah {
                p { class: "text-center text-2xl text-emerald-700 mb-4", dir: "rtl", "{BISMILLAH}" }
            }

            if state.sajda_warning {
                div { class: "flex items-center bg-amber-50 border border-amber-200 rounded-lg p-3 mb-4",
                    icons::AlertCircle { class: Some("w-4 h-4 text-amber-600 mr-2".to_string()) }
                    p { class: "text-xs text-amber-800", "This verse contains a sajda (prostration)." }
                }
            }

            if let Some(error) = &state.error {
                div { class: "flex items-center bg-red-50 border border-red-200 rounded-lg p-3 mb-4",
                    icons::AlertCircle { class: Some("w-4 h-4 text-red-600 mr-2".to_string()) }
                    p { class: "text-sm text-red-800", "{error}" }
                }
            }

            if let Some(notice) = &state.notice {
                div { class: "flex items-center bg-green-50 border border-green-200 rounded-lg p-3 mb-4",
                    icons::CheckCircle { class: Some("w-4 h-4 text-green-600 mr-2".to_string()) }
                    p { class: "text-sm text-green-800", "{notice}" }
                }
            }

            if state.loading {
                div { class: "text-center py-8",
                    div { class: "animate-spin w-10 h-10 border-4 border-emerald-600 border-t-transparent rounded-full mx-auto mb-3" }
                    p { class: "text-sm text-gray-500", "Loading verse..." }
                }
            } else if let Some(verse) = &state.verse {
                p { class: "text-right text-2xl leading-loose text-gray-900 mb-4", dir: "rtl", "{verse.arabic}" }
                p { class: "text-base text-gray-700 mb-4", "{verse.translation}" }
                p { class: "text-xs text-gray-400 text-center", "{verse.meta}" }
            }
        }
    }
}
