//! Host-independent core of the Daily Verses reminder.
//!
//! [`scheduler::Scheduler`] reacts to host lifecycle, alarm, notification,
//! idle and keyboard events. [`presenter::Presenter`] loads the chapter
//! metadata, shows the verse at the saved reading position and advances it.
//! The two only share the persisted fields behind [`store::ReminderStore`].

pub mod api;
pub mod config;
pub mod error;
pub mod host;
pub mod metadata;
pub mod position;
pub mod presenter;
pub mod scheduler;
pub mod store;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use api::{HttpVerseSource, VerseSource, VerseText};
pub use config::VerseConfig;
pub use error::{Result, VerseError};
pub use host::{AlarmSchedule, Clock, EventSource, Host, HostEvent, IdleState, Notification};
pub use metadata::QuranInfo;
pub use position::{Advance, ReadingPosition};
pub use presenter::{Navigation, PopupView, Presenter, VerseDisplay, ViewState};
pub use scheduler::Scheduler;
pub use store::{KeyValueStore, ReminderStore};
