// In-memory stand-ins for the host, store, CDN and popup

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;

use async_trait::async_trait;
use futures::channel::oneshot;
use futures::future::{FutureExt, Shared};
use serde_json::{Map, Value};

use crate::api::{VerseSource, VerseText};
use crate::config::TOTAL_VERSES;
use crate::error::{Result, VerseError};
use crate::host::{AlarmSchedule, Clock, EventSource, Host, HostEvent, Notification};
use crate::metadata::{ChapterInfo, QuranInfo, VerseInfo};
use crate::position::ReadingPosition;
use crate::presenter::{PopupView, ViewState};
use crate::store::KeyValueStore;

pub const VERSE_COUNTS: [u16; 114] = [
    7, 286, 200, 176, 120, 165, 206, 75, 129, 109, 123, 111, 43, 52, 99, 128, 111, 110, 98, 135,
    112, 78, 118, 64, 77, 227, 93, 88, 69, 60, 34, 30, 73, 54, 45, 83, 182, 88, 75, 85, 54, 53,
    89, 59, 37, 35, 38, 29, 18, 45, 60, 49, 62, 55, 78, 96, 29, 22, 24, 13, 14, 11, 11, 18, 12,
    12, 30, 52, 52, 44, 28, 28, 20, 56, 40, 31, 50, 40, 46, 42, 29, 19, 36, 25, 22, 17, 19, 26,
    30, 20, 15, 21, 11, 8, 8, 19, 5, 8, 8, 11, 11, 8, 3, 9, 5, 4, 7, 3, 6, 3, 5, 4, 5, 6,
];

pub const SAJDA_VERSES: [(u16, u16); 15] = [
    (7, 206),
    (13, 15),
    (16, 50),
    (17, 109),
    (19, 58),
    (22, 18),
    (22, 77),
    (25, 60),
    (27, 26),
    (32, 15),
    (38, 24),
    (41, 38),
    (53, 62),
    (84, 21),
    (96, 19),
];

/// Metadata with real verse counts and sajda positions; names and page
/// numbers are synthetic apart from the first two chapters.
pub fn fixture_info() -> QuranInfo {
    let mut read: u32 = 0;
    let chapters = VERSE_COUNTS
        .iter()
        .enumerate()
        .map(|(idx, &count)| {
            let chapter = idx as u16 + 1;
            let (arabicname, name, englishname, revelation) = match chapter {
                1 => ("الفاتحة", "Al Faatiha", "The Opening", "Mecca"),
                2 => ("البقرة", "Al Baqara", "The Cow", "Madina"),
                _ => ("سورة", "Surah", "Chapter", "Mecca"),
            };
            let verses = (1..=count)
                .map(|verse| {
                    let juz = (read * 30 / TOTAL_VERSES + 1) as u8;
                    let page = (read * 604 / TOTAL_VERSES + 1) as u16;
                    let info = VerseInfo {
                        verse,
                        line: (read % 15) as u16 + 1,
                        juz,
                        page,
                        sajda: SAJDA_VERSES.contains(&(chapter, verse)),
                    };
                    read += 1;
                    info
                })
                .collect();

            ChapterInfo {
                chapter,
                name: name.to_string(),
                englishname: englishname.to_string(),
                arabicname: arabicname.to_string(),
                revelation: revelation.to_string(),
                verses,
            }
        })
        .collect();

    QuranInfo { chapters }
}

#[derive(Default)]
pub struct MemoryStore {
    values: RefCell<Map<String, Value>>,
    fail_reads: Cell<bool>,
    fail_writes: Cell<bool>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, key: &str, value: Value) {
        self.values.borrow_mut().insert(key.to_string(), value);
    }

    pub fn remove(&self, key: &str) {
        self.values.borrow_mut().remove(key);
    }

    pub fn snapshot(&self) -> Map<String, Value> {
        self.values.borrow().clone()
    }

    pub fn fail_reads(&self, fail: bool) {
        self.fail_reads.set(fail);
    }

    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.set(fail);
    }
}

#[async_trait(?Send)]
impl KeyValueStore for MemoryStore {
    async fn get(&self, keys: &[&str]) -> Result<Map<String, Value>> {
        if self.fail_reads.get() {
            return Err(VerseError::Storage("read refused".to_string()));
        }
        let values = self.values.borrow();
        Ok(keys
            .iter()
            .filter_map(|key| values.get(*key).map(|v| (key.to_string(), v.clone())))
            .collect())
    }

    async fn set(&self, items: Map<String, Value>) -> Result<()> {
        if self.fail_writes.get() {
            return Err(VerseError::Storage("write refused".to_string()));
        }
        self.values.borrow_mut().extend(items);
        Ok(())
    }
}

pub struct FixedClock(pub i64);

impl Clock for FixedClock {
    fn now_millis(&self) -> i64 {
        self.0
    }
}

/// Host calls other than notifications, in order
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostCall {
    Alarm(String, AlarmSchedule),
    Clear(String),
    OpenPopup,
}

pub struct RecordingHost {
    now: Cell<i64>,
    fail_popup: Cell<bool>,
    calls: RefCell<Vec<HostCall>>,
    notifications: RefCell<Vec<Notification>>,
}

impl RecordingHost {
    pub fn at(now_millis: i64) -> Self {
        Self {
            now: Cell::new(now_millis),
            fail_popup: Cell::new(false),
            calls: RefCell::new(Vec::new()),
            notifications: RefCell::new(Vec::new()),
        }
    }

    pub fn set_now(&self, now_millis: i64) {
        self.now.set(now_millis);
    }

    /// Make `open_popup` fail without recording a call
    pub fn fail_popup(&self, fail: bool) {
        self.fail_popup.set(fail);
    }

    pub fn calls(&self) -> Vec<HostCall> {
        self.calls.borrow().clone()
    }

    pub fn notifications(&self) -> Vec<Notification> {
        self.notifications.borrow().clone()
    }
}

impl Clock for RecordingHost {
    fn now_millis(&self) -> i64 {
        self.now.get()
    }
}

#[async_trait(?Send)]
impl Host for RecordingHost {
    async fn create_alarm(&self, name: &str, schedule: AlarmSchedule) -> Result<()> {
        self.calls
            .borrow_mut()
            .push(HostCall::Alarm(name.to_string(), schedule));
        Ok(())
    }

    async fn create_notification(&self, notification: &Notification) -> Result<String> {
        let mut notifications = self.notifications.borrow_mut();
        notifications.push(notification.clone());
        Ok(format!("notification-{}", notifications.len()))
    }

    async fn clear_notification(&self, notification_id: &str) -> Result<()> {
        self.calls
            .borrow_mut()
            .push(HostCall::Clear(notification_id.to_string()));
        Ok(())
    }

    async fn open_popup(&self) -> Result<()> {
        if self.fail_popup.get() {
            return Err(VerseError::Host("no focused window".to_string()));
        }
        self.calls.borrow_mut().push(HostCall::OpenPopup);
        Ok(())
    }
}

pub struct ScriptedEvents {
    events: VecDeque<HostEvent>,
}

impl ScriptedEvents {
    pub fn new(events: Vec<HostEvent>) -> Self {
        Self {
            events: events.into(),
        }
    }
}

#[async_trait(?Send)]
impl EventSource for ScriptedEvents {
    async fn next_event(&mut self) -> Option<HostEvent> {
        self.events.pop_front()
    }
}

/// Releases verse fetches parked by `FixtureSource::hold_verse`
pub struct Gate {
    tx: oneshot::Sender<()>,
}

impl Gate {
    pub fn release(self) {
        let _ = self.tx.send(());
    }
}

type Held = (ReadingPosition, Shared<oneshot::Receiver<()>>);

/// Serves `fixture_info` and verse text of the form "{edition} {chapter}:{verse}"
pub struct FixtureSource {
    broken_info: bool,
    empty_edition: Option<String>,
    held: RefCell<Option<Held>>,
    verse_requests: Cell<usize>,
}

impl FixtureSource {
    pub fn new() -> Self {
        Self {
            broken_info: false,
            empty_edition: None,
            held: RefCell::new(None),
            verse_requests: Cell::new(0),
        }
    }

    pub fn with_broken_info(mut self) -> Self {
        self.broken_info = true;
        self
    }

    pub fn with_empty_edition(mut self, edition: &str) -> Self {
        self.empty_edition = Some(edition.to_string());
        self
    }

    /// Park every fetch of `position` until the returned gate is released
    pub fn hold_verse(&self, position: ReadingPosition) -> Gate {
        let (tx, rx) = oneshot::channel();
        *self.held.borrow_mut() = Some((position, rx.shared()));
        Gate { tx }
    }

    pub fn verse_requests(&self) -> usize {
        self.verse_requests.get()
    }
}

impl Default for FixtureSource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait(?Send)]
impl VerseSource for FixtureSource {
    async fn fetch_info(&self) -> Result<QuranInfo> {
        if self.broken_info {
            return QuranInfo::from_json(br#"{"chapters": null}"#);
        }
        Ok(fixture_info())
    }

    async fn fetch_verse(&self, edition: &str, position: ReadingPosition) -> Result<VerseText> {
        self.verse_requests.set(self.verse_requests.get() + 1);

        let wait = match &*self.held.borrow() {
            Some((held, gate)) if *held == position => Some(gate.clone()),
            _ => None,
        };
        if let Some(gate) = wait {
            let _ = gate.await;
        }

        let text = if self.empty_edition.as_deref() == Some(edition) {
            String::new()
        } else {
            format!("{} {}", edition, position)
        };
        Ok(VerseText { text: Some(text) })
    }
}

#[derive(Default)]
pub struct RecordingView {
    states: RefCell<Vec<ViewState>>,
    prompts: RefCell<Vec<String>>,
    confirm_answer: Cell<bool>,
}

impl RecordingView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn answer_confirm(&self, answer: bool) {
        self.confirm_answer.set(answer);
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.borrow().clone()
    }

    pub fn states(&self) -> Vec<ViewState> {
        self.states.borrow().clone()
    }
}

impl PopupView for RecordingView {
    fn update(&self, state: &ViewState) {
        self.states.borrow_mut().push(state.clone());
    }

    fn confirm(&self, message: &str) -> bool {
        self.prompts.borrow_mut().push(message.to_string());
        self.confirm_answer.get()
    }
}
