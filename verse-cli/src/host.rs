// Native host: tokio timers stand in for chrome.alarms, the terminal for
// notifications and the popup, stdin lines for user interaction.

use async_trait::async_trait;
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, sleep, Instant};
use verse_core::{
    AlarmSchedule, Clock, EventSource, Host, HostEvent, HttpVerseSource, IdleState, Notification,
    Presenter,
};

use crate::config::CliConfig;
use crate::file_store::JsonFileStore;
use crate::terminal::{render_state, TerminalView};

pub const HELP: &str = "commands: read | later | click | active | idle | locked | verse | quit";

#[derive(Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_millis(&self) -> i64 {
        chrono::Utc::now().timestamp_millis()
    }
}

fn minutes(n: u32) -> Duration {
    Duration::from_secs(u64::from(n) * 60)
}

pub struct NativeHost {
    config: CliConfig,
    client: reqwest::Client,
    alarm_tx: mpsc::UnboundedSender<HostEvent>,
    alarms: RefCell<HashMap<String, JoinHandle<()>>>,
    notification_seq: Cell<u64>,
    last_notification: Rc<RefCell<Option<String>>>,
}

impl NativeHost {
    pub fn new(
        config: CliConfig,
        client: reqwest::Client,
        alarm_tx: mpsc::UnboundedSender<HostEvent>,
        last_notification: Rc<RefCell<Option<String>>>,
    ) -> Self {
        Self {
            config,
            client,
            alarm_tx,
            alarms: RefCell::new(HashMap::new()),
            notification_seq: Cell::new(0),
            last_notification,
        }
    }
}

impl Drop for NativeHost {
    fn drop(&mut self) {
        for (_, handle) in self.alarms.borrow_mut().drain() {
            handle.abort();
        }
    }
}

impl Clock for NativeHost {
    fn now_millis(&self) -> i64 {
        SystemClock.now_millis()
    }
}

#[async_trait(?Send)]
impl Host for NativeHost {
    async fn create_alarm(&self, name: &str, schedule: AlarmSchedule) -> verse_core::Result<()> {
        let tx = self.alarm_tx.clone();
        let alarm = name.to_string();

        let handle = match schedule {
            AlarmSchedule::Once { delay_minutes } => tokio::spawn(async move {
                sleep(minutes(delay_minutes)).await;
                let _ = tx.send(HostEvent::Alarm(alarm));
            }),
            AlarmSchedule::Every { period_minutes } => tokio::spawn(async move {
                let period = minutes(period_minutes.max(1));
                let mut ticks = interval_at(Instant::now() + period, period);
                loop {
                    ticks.tick().await;
                    if tx.send(HostEvent::Alarm(alarm.clone())).is_err() {
                        break;
                    }
                }
            }),
        };

        // Same name replaces the earlier alarm, as chrome.alarms does
        if let Some(previous) = self.alarms.borrow_mut().insert(name.to_string(), handle) {
            previous.abort();
        }
        tracing::info!("Alarm {} registered: {:?}", name, schedule);
        Ok(())
    }

    async fn create_notification(&self, notification: &Notification) -> verse_core::Result<String> {
        let seq = self.notification_seq.get() + 1;
        self.notification_seq.set(seq);
        let id = format!("notification-{}", seq);

        println!("\n== {} ==\n{}", notification.title, notification.message);
        if !notification.buttons.is_empty() {
            let buttons: Vec<String> = notification
                .buttons
                .iter()
                .enumerate()
                .map(|(idx, title)| format!("[{}] {}", idx, title))
                .collect();
            println!("{}", buttons.join("  "));
        }

        *self.last_notification.borrow_mut() = Some(id.clone());
        Ok(id)
    }

    async fn clear_notification(&self, notification_id: &str) -> verse_core::Result<()> {
        let mut last = self.last_notification.borrow_mut();
        if last.as_deref() == Some(notification_id) {
            *last = None;
        }
        tracing::debug!("Notification {} cleared", notification_id);
        Ok(())
    }

    async fn open_popup(&self) -> verse_core::Result<()> {
        let presenter = Presenter::new(
            HttpVerseSource::with_client(self.client.clone(), self.config.verse.api.clone()),
            JsonFileStore::new(&self.config.store.path),
            TerminalView::new(false),
            SystemClock,
            self.config.verse.api.clone(),
        );
        presenter.initialize().await;
        println!("\n{}", render_state(&presenter.state()));
        Ok(())
    }
}

/// Alarm firings plus stdin commands, in arrival order
pub struct TerminalEvents {
    alarms: mpsc::UnboundedReceiver<HostEvent>,
    stdin: Lines<BufReader<Stdin>>,
    last_notification: Rc<RefCell<Option<String>>>,
}

impl TerminalEvents {
    pub fn new(
        alarms: mpsc::UnboundedReceiver<HostEvent>,
        last_notification: Rc<RefCell<Option<String>>>,
    ) -> Self {
        Self {
            alarms,
            stdin: BufReader::new(tokio::io::stdin()).lines(),
            last_notification,
        }
    }
}

#[async_trait(?Send)]
impl EventSource for TerminalEvents {
    async fn next_event(&mut self) -> Option<HostEvent> {
        loop {
            tokio::select! {
                Some(event) = self.alarms.recv() => return Some(event),
                line = self.stdin.next_line() => {
                    let line = match line {
                        Ok(Some(line)) => line,
                        Ok(None) => return None,
                        Err(e) => {
                            tracing::error!("Failed to read stdin: {}", e);
                            return None;
                        }
                    };
                    match parse_command(&line, self.last_notification.borrow().as_deref()) {
                        Command::Event(event) => return Some(event),
                        Command::Quit => return None,
                        Command::NoNotification => println!("No notification to act on"),
                        Command::Unknown => println!("{}", HELP),
                    }
                }
            }
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
enum Command {
    Event(HostEvent),
    NoNotification,
    Quit,
    Unknown,
}

fn parse_command(line: &str, notification: Option<&str>) -> Command {
    let button = |button: u32| match notification {
        Some(id) => Command::Event(HostEvent::NotificationButtonClicked {
            notification_id: id.to_string(),
            button,
        }),
        None => Command::NoNotification,
    };

    match line.trim() {
        "read" | "0" => button(0),
        "later" | "1" => button(1),
        "click" => match notification {
            Some(id) => Command::Event(HostEvent::NotificationClicked {
                notification_id: id.to_string(),
            }),
            None => Command::NoNotification,
        },
        "verse" => Command::Event(HostEvent::Command(
            verse_core::config::SHOW_VERSE_COMMAND.to_string(),
        )),
        "quit" | "exit" => Command::Quit,
        other => match IdleState::parse(other) {
            Some(state) => Command::Event(HostEvent::IdleStateChanged(state)),
            None => Command::Unknown,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_buttons_need_notification() {
        assert_eq!(parse_command("read", None), Command::NoNotification);
        assert_eq!(
            parse_command("later", Some("notification-3")),
            Command::Event(HostEvent::NotificationButtonClicked {
                notification_id: "notification-3".to_string(),
                button: 1,
            })
        );
        assert_eq!(
            parse_command(" click ", Some("n")),
            Command::Event(HostEvent::NotificationClicked {
                notification_id: "n".to_string()
            })
        );
    }

    #[test]
    fn test_parse_other_commands() {
        assert_eq!(
            parse_command("active", None),
            Command::Event(HostEvent::IdleStateChanged(IdleState::Active))
        );
        assert_eq!(
            parse_command("verse", None),
            Command::Event(HostEvent::Command("show_verse".to_string()))
        );
        assert_eq!(parse_command("quit", None), Command::Quit);
        assert_eq!(parse_command("dance", None), Command::Unknown);
    }

    #[tokio::test]
    async fn test_notification_tracks_last_id() {
        let (tx, _rx) = mpsc::unbounded_channel();
        let last = Rc::new(RefCell::new(None));
        let host = NativeHost::new(CliConfig::default(), reqwest::Client::new(), tx, last.clone());

        let notification = Notification {
            title: "Time for Quran".to_string(),
            message: "test".to_string(),
            priority: 2,
            buttons: vec!["Read Now".to_string()],
            require_interaction: true,
        };
        let first = host.create_notification(&notification).await.unwrap();
        let second = host.create_notification(&notification).await.unwrap();
        assert_ne!(first, second);
        assert_eq!(last.borrow().as_deref(), Some(second.as_str()));

        host.clear_notification(&second).await.unwrap();
        assert!(last.borrow().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_one_shot_alarm_fires_after_delay() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let host = NativeHost::new(
            CliConfig::default(),
            reqwest::Client::new(),
            tx,
            Rc::new(RefCell::new(None)),
        );

        host.create_alarm("reminderSnooze", AlarmSchedule::Once { delay_minutes: 15 })
            .await
            .unwrap();

        let fired = rx.recv().await;
        assert_eq!(fired, Some(HostEvent::Alarm("reminderSnooze".to_string())));
    }
}
