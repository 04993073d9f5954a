// Background service worker for Daily Verses
// Minimal dependencies - no Dioxus, build with --no-default-features
// All reminder logic lives in verse-core, the JavaScript glue only forwards
// chrome.* listener callbacks to these exports

use daily_verses_extension::services::{ChromeHost, ChromeStorage};
use verse_core::config::ReminderConfig;
use verse_core::{HostEvent, IdleState, Scheduler};
use wasm_bindgen::prelude::*;

// Dummy main for binary target
fn main() {}

fn scheduler() -> Scheduler<ChromeHost, ChromeStorage> {
    Scheduler::new(ChromeHost, ChromeStorage::new(), ReminderConfig::default())
}

/// Initialize background service worker
/// Called from JavaScript glue via wasm_bindgen
#[wasm_bindgen]
pub fn init_background() {
    wasm_logger::init(wasm_logger::Config::default());
    log::info!("Daily Verses background service initialized");
}

/// chrome.runtime.onInstalled
#[wasm_bindgen]
pub async fn handle_install() {
    scheduler().dispatch(HostEvent::Installed).await;
}

/// chrome.runtime.onStartup
#[wasm_bindgen]
pub async fn handle_startup() {
    scheduler().dispatch(HostEvent::Startup).await;
}

/// chrome.alarms.onAlarm
#[wasm_bindgen]
pub async fn handle_alarm(name: String) {
    scheduler().dispatch(HostEvent::Alarm(name)).await;
}

/// chrome.notifications.onButtonClicked
#[wasm_bindgen]
pub async fn handle_notification_button(notification_id: String, button_index: u32) {
    scheduler()
        .dispatch(HostEvent::NotificationButtonClicked {
            notification_id,
            button: button_index,
        })
        .await;
}

/// chrome.notifications.onClicked
#[wasm_bindgen]
pub async fn handle_notification_click(notification_id: String) {
    scheduler()
        .dispatch(HostEvent::NotificationClicked { notification_id })
        .await;
}

/// chrome.idle.onStateChanged
#[wasm_bindgen]
pub async fn handle_idle_state(state: String) {
    match IdleState::parse(&state) {
        Some(state) => scheduler().dispatch(HostEvent::IdleStateChanged(state)).await,
        None => log::warn!("Unknown idle state: {}", state),
    }
}

/// chrome.commands.onCommand
#[wasm_bindgen]
pub async fn handle_command(command: String) {
    scheduler().dispatch(HostEvent::Command(command)).await;
}
