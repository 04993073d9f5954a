// Reminder scheduling state machine
//
// Every handler is fire-and-forget: `dispatch` logs and drops errors so a
// failed storage read only costs one reminder.

use crate::config::{
    ReminderConfig, CHECK_VERSE_TIME_ALARM, INITIAL_REMINDER_ALARM, REMINDER_SNOOZE_ALARM,
    SHOW_VERSE_COMMAND,
};
use crate::error::Result;
use crate::host::{AlarmSchedule, EventSource, Host, HostEvent, IdleState, Notification};
use crate::store::{KeyValueStore, ReminderStore};

const EXTENSION_TITLE: &str = "Daily Quran Verses";
const REMINDER_TITLE: &str = "Time for Quran";
const HIGH_PRIORITY: u8 = 2;

const READ_NOW_BUTTON: u32 = 0;
const REMIND_LATER_BUTTON: u32 = 1;

pub const INSTALL_MESSAGE: &str =
    "Extension installed successfully. Click to start your journey with the Holy Quran.";
pub const STARTUP_MESSAGE: &str = "Welcome back! Time to read a verse from the Holy Quran.";
pub const INITIAL_REMINDER_MESSAGE: &str =
    "Begin your browsing with a verse from the Holy Quran.";
pub const HOURLY_MESSAGE: &str = "It's time for your hourly Quran verse.";
pub const SNOOZE_MESSAGE: &str = "Your snoozed reminder: time for a verse from the Holy Quran.";
pub const IDLE_RETURN_MESSAGE: &str = "Welcome back! Continue your journey with the Holy Quran.";

pub struct Scheduler<H, S> {
    host: H,
    store: ReminderStore<S>,
    config: ReminderConfig,
}

impl<H: Host, S: KeyValueStore> Scheduler<H, S> {
    pub fn new(host: H, store: S, config: ReminderConfig) -> Self {
        Self {
            host,
            store: ReminderStore::new(store),
            config,
        }
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn store(&self) -> &ReminderStore<S> {
        &self.store
    }

    /// Handle one host event, logging and swallowing any failure
    pub async fn dispatch(&self, event: HostEvent) {
        tracing::debug!("Dispatching {:?}", event);

        let result = match &event {
            HostEvent::Installed => self.on_installed().await,
            HostEvent::Startup => self.on_startup().await,
            HostEvent::Alarm(name) => self.on_alarm(name).await,
            HostEvent::NotificationButtonClicked {
                notification_id,
                button,
            } => self.on_button_clicked(notification_id, *button).await,
            HostEvent::NotificationClicked { notification_id } => {
                self.on_notification_clicked(notification_id).await
            }
            HostEvent::IdleStateChanged(state) => self.on_idle_state_changed(*state).await,
            HostEvent::Command(command) => self.on_command(command).await,
        };

        if let Err(e) = result {
            tracing::error!("Error handling {:?}: {}", event, e);
        }
    }

    /// Drain an event source until the host stops delivering
    pub async fn run<E: EventSource>(&self, source: &mut E) {
        while let Some(event) = source.next_event().await {
            self.dispatch(event).await;
        }
        tracing::info!("Event source closed, scheduler stopping");
    }

    pub async fn on_installed(&self) -> Result<()> {
        let now = self.host.now_millis();
        self.store.seed(now).await?;

        self.host
            .create_alarm(
                CHECK_VERSE_TIME_ALARM,
                AlarmSchedule::Every {
                    period_minutes: self.config.check_period_minutes,
                },
            )
            .await?;

        let welcome = Notification {
            title: EXTENSION_TITLE.to_string(),
            message: INSTALL_MESSAGE.to_string(),
            priority: HIGH_PRIORITY,
            buttons: vec!["Start Reading".to_string()],
            require_interaction: false,
        };
        self.host.create_notification(&welcome).await?;

        tracing::info!("Extension installed, store seeded at 1:1");
        Ok(())
    }

    pub async fn on_startup(&self) -> Result<()> {
        self.show_reminder(STARTUP_MESSAGE).await?;
        self.host
            .create_alarm(
                INITIAL_REMINDER_ALARM,
                AlarmSchedule::Once {
                    delay_minutes: self.config.initial_delay_minutes,
                },
            )
            .await
    }

    pub async fn on_alarm(&self, name: &str) -> Result<()> {
        if !self.store.reminders_enabled().await? {
            tracing::debug!("Reminders disabled, ignoring alarm {}", name);
            return Ok(());
        }

        match name {
            INITIAL_REMINDER_ALARM => self.show_reminder(INITIAL_REMINDER_MESSAGE).await,
            CHECK_VERSE_TIME_ALARM => {
                if self.reminder_due().await? {
                    self.show_reminder(HOURLY_MESSAGE).await
                } else {
                    Ok(())
                }
            }
            REMINDER_SNOOZE_ALARM => self.show_reminder(SNOOZE_MESSAGE).await,
            other => {
                tracing::debug!("Ignoring unknown alarm {}", other);
                Ok(())
            }
        }
    }

    pub async fn on_button_clicked(&self, notification_id: &str, button: u32) -> Result<()> {
        match button {
            READ_NOW_BUTTON => self.open_and_dismiss(notification_id).await,
            REMIND_LATER_BUTTON => {
                self.host
                    .create_alarm(
                        REMINDER_SNOOZE_ALARM,
                        AlarmSchedule::Once {
                            delay_minutes: self.config.snooze_minutes,
                        },
                    )
                    .await?;
                self.host.clear_notification(notification_id).await
            }
            other => {
                tracing::warn!("Unknown notification button {}", other);
                Ok(())
            }
        }
    }

    pub async fn on_notification_clicked(&self, notification_id: &str) -> Result<()> {
        self.open_and_dismiss(notification_id).await
    }

    pub async fn on_idle_state_changed(&self, state: IdleState) -> Result<()> {
        if state != IdleState::Active {
            return Ok(());
        }
        if self.reminder_due().await? {
            self.show_reminder(IDLE_RETURN_MESSAGE).await?;
        }
        Ok(())
    }

    pub async fn on_command(&self, command: &str) -> Result<()> {
        if command == SHOW_VERSE_COMMAND {
            self.host.open_popup().await
        } else {
            tracing::debug!("Ignoring unknown command {}", command);
            Ok(())
        }
    }

    pub async fn set_reminders_enabled(&self, enabled: bool) -> Result<()> {
        self.store.set_reminders_enabled(enabled).await?;
        tracing::info!("Reminders {}", if enabled { "enabled" } else { "disabled" });
        Ok(())
    }

    /// At least the configured interval since a verse or reminder was shown
    async fn reminder_due(&self) -> Result<bool> {
        let Some(last_shown) = self.store.last_shown_time().await? else {
            return Ok(true);
        };
        let elapsed = self.host.now_millis().saturating_sub(last_shown);
        Ok(elapsed >= self.config.remind_after_millis())
    }

    /// The notification is dismissed even if the popup fails to open
    async fn open_and_dismiss(&self, notification_id: &str) -> Result<()> {
        if let Err(e) = self.host.open_popup().await {
            tracing::error!("Failed to open popup: {}", e);
        }
        self.host.clear_notification(notification_id).await
    }

    async fn show_reminder(&self, message: &str) -> Result<()> {
        let notification = Notification {
            title: REMINDER_TITLE.to_string(),
            message: message.to_string(),
            priority: HIGH_PRIORITY,
            buttons: vec!["Read Now".to_string(), "Remind Later".to_string()],
            require_interaction: true,
        };
        let id = self.host.create_notification(&notification).await?;
        self.store.set_last_shown_time(self.host.now_millis()).await?;
        tracing::info!("Reminder {} shown: {}", id, message);
        Ok(())
    }
}
