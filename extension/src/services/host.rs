// Chrome alarms, notifications and action popup behind the core `Host`

use async_trait::async_trait;
use serde::Serialize;
use verse_core::{AlarmSchedule, Clock, Host, Notification, VerseError};
use wasm_bindgen::JsValue;
use wasm_bindgen_futures::JsFuture;

use crate::chrome;

const ICON_URL: &str = "icons/icon128.png";

fn host_error(e: JsValue) -> VerseError {
    VerseError::Host(format!("{:?}", e))
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct AlarmInfo {
    #[serde(skip_serializing_if = "Option::is_none")]
    delay_in_minutes: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    period_in_minutes: Option<u32>,
}

#[derive(Serialize)]
struct Button<'a> {
    title: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct NotificationOptions<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    icon_url: &'static str,
    title: &'a str,
    message: &'a str,
    priority: u8,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    buttons: Vec<Button<'a>>,
    require_interaction: bool,
}

#[derive(Clone, Copy, Default)]
pub struct BrowserClock;

impl Clock for BrowserClock {
    fn now_millis(&self) -> i64 {
        js_sys::Date::now() as i64
    }
}

#[derive(Clone, Copy, Default)]
pub struct ChromeHost;

impl Clock for ChromeHost {
    fn now_millis(&self) -> i64 {
        BrowserClock.now_millis()
    }
}

#[async_trait(?Send)]
impl Host for ChromeHost {
    async fn create_alarm(&self, name: &str, schedule: AlarmSchedule) -> verse_core::Result<()> {
        let info = match schedule {
            AlarmSchedule::Once { delay_minutes } => AlarmInfo {
                delay_in_minutes: Some(delay_minutes),
                period_in_minutes: None,
            },
            AlarmSchedule::Every { period_minutes } => AlarmInfo {
                delay_in_minutes: None,
                period_in_minutes: Some(period_minutes),
            },
        };
        let info = chrome::to_js(&info).map_err(host_error)?;

        JsFuture::from(chrome::alarms_create(name, info))
            .await
            .map_err(host_error)?;
        log::info!("Alarm {} registered: {:?}", name, schedule);
        Ok(())
    }

    async fn create_notification(&self, notification: &Notification) -> verse_core::Result<String> {
        let options = NotificationOptions {
            kind: "basic",
            icon_url: ICON_URL,
            title: &notification.title,
            message: &notification.message,
            priority: notification.priority,
            buttons: notification
                .buttons
                .iter()
                .map(|title| Button { title })
                .collect(),
            require_interaction: notification.require_interaction,
        };
        let options = chrome::to_js(&options).map_err(host_error)?;

        let id = JsFuture::from(chrome::notifications_create(options))
            .await
            .map_err(host_error)?;
        Ok(id.as_string().unwrap_or_default())
    }

    async fn clear_notification(&self, notification_id: &str) -> verse_core::Result<()> {
        JsFuture::from(chrome::notifications_clear(notification_id))
            .await
            .map_err(host_error)?;
        Ok(())
    }

    async fn open_popup(&self) -> verse_core::Result<()> {
        JsFuture::from(chrome::action_open_popup())
            .await
            .map_err(host_error)?;
        Ok(())
    }
}
