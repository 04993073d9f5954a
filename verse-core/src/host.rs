// Abstract host runtime: the events it delivers and the services it offers
//
// The browser extension backs this with chrome.* APIs; the CLI backs it
// with tokio timers and the terminal.

use async_trait::async_trait;

use crate::error::Result;

/// Lifecycle, timer and user events delivered by the host
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostEvent {
    Installed,
    Startup,
    Alarm(String),
    NotificationButtonClicked { notification_id: String, button: u32 },
    NotificationClicked { notification_id: String },
    IdleStateChanged(IdleState),
    Command(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdleState {
    Active,
    Idle,
    Locked,
}

impl IdleState {
    pub fn parse(state: &str) -> Option<Self> {
        match state {
            "active" => Some(Self::Active),
            "idle" => Some(Self::Idle),
            "locked" => Some(Self::Locked),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlarmSchedule {
    Once { delay_minutes: u32 },
    Every { period_minutes: u32 },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub title: String,
    pub message: String,
    pub priority: u8,
    pub buttons: Vec<String>,
    /// Stay on screen until dismissed or clicked
    pub require_interaction: bool,
}

/// Wall-clock time in epoch milliseconds
pub trait Clock {
    fn now_millis(&self) -> i64;
}

#[async_trait(?Send)]
pub trait Host: Clock {
    async fn create_alarm(&self, name: &str, schedule: AlarmSchedule) -> Result<()>;

    /// Returns the host's notification id
    async fn create_notification(&self, notification: &Notification) -> Result<String>;

    async fn clear_notification(&self, notification_id: &str) -> Result<()>;

    /// Surface the popup / main reading UI
    async fn open_popup(&self) -> Result<()>;
}

/// Hosts that pump events instead of calling back
#[async_trait(?Send)]
pub trait EventSource {
    /// `None` once the host is shutting down
    async fn next_event(&mut self) -> Option<HostEvent>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_idle_state_parse() {
        assert_eq!(IdleState::parse("active"), Some(IdleState::Active));
        assert_eq!(IdleState::parse("locked"), Some(IdleState::Locked));
        assert_eq!(IdleState::parse("asleep"), None);
    }
}
