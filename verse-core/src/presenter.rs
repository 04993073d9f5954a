// Verse presenter: loads metadata once, renders the current verse and
// advances through the text.
//
// Methods take `&self` so a UI can hold the presenter behind an `Rc` and
// start a new navigation while a render is still in flight. Each render
// takes a generation number and drops its result if a newer render started.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use crate::api::VerseSource;
use crate::config::ApiConfig;
use crate::error::{Result, VerseError};
use crate::host::Clock;
use crate::metadata::QuranInfo;
use crate::position::{Advance, ReadingPosition};
use crate::store::{KeyValueStore, ReminderStore};

pub const INIT_ERROR: &str = "Failed to initialize. Please check your internet connection.";
pub const LOAD_ERROR: &str = "Failed to load verse. Please check your internet connection.";
pub const MOVE_ERROR: &str = "Failed to move to next verse. Please try again.";
pub const COMPLETED_MESSAGE: &str = "Congratulations! You have completed the Holy Quran.";
pub const SAJDA_PROMPT: &str =
    "The next verse contains a sajda (prostration). Are you ready to proceed?";

#[derive(Debug, Clone, PartialEq)]
pub struct VerseDisplay {
    pub arabic: String,
    pub translation: String,
    /// "{arabic name} - {transliteration} ({english name})"
    pub chapter_title: String,
    pub revelation: String,
    /// "Juz {juz} | Page {page} | Line {line}"
    pub meta: String,
}

/// Everything the popup shows
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ViewState {
    pub loading: bool,
    pub error: Option<String>,
    pub notice: Option<String>,
    pub bismillah: bool,
    pub sajda_warning: bool,
    pub verse: Option<VerseDisplay>,
    /// Percentage of the whole text read, 0..=100
    pub progress: f64,
}

pub trait PopupView {
    fn update(&self, state: &ViewState);

    /// Blocking yes/no question to the reader
    fn confirm(&self, message: &str) -> bool;
}

/// Result of `Presenter::advance`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Navigation {
    Moved(ReadingPosition),
    Completed,
    /// Reader declined the sajda confirmation
    Declined,
    /// Metadata never loaded
    Unavailable,
    Failed,
}

pub struct Presenter<Src, S, V, C> {
    source: Src,
    store: ReminderStore<S>,
    view: V,
    clock: C,
    api: ApiConfig,
    info: RefCell<Option<Rc<QuranInfo>>>,
    position: Cell<ReadingPosition>,
    state: RefCell<ViewState>,
    generation: Cell<u64>,
}

impl<Src, S, V, C> Presenter<Src, S, V, C>
where
    Src: VerseSource,
    S: KeyValueStore,
    V: PopupView,
    C: Clock,
{
    pub fn new(source: Src, store: S, view: V, clock: C, api: ApiConfig) -> Self {
        Self {
            source,
            store: ReminderStore::new(store),
            view,
            clock,
            api,
            info: RefCell::new(None),
            position: Cell::new(ReadingPosition::default()),
            state: RefCell::new(ViewState::default()),
            generation: Cell::new(0),
        }
    }

    pub fn position(&self) -> ReadingPosition {
        self.position.get()
    }

    pub fn state(&self) -> ViewState {
        self.state.borrow().clone()
    }

    pub fn store(&self) -> &ReminderStore<S> {
        &self.store
    }

    pub fn view(&self) -> &V {
        &self.view
    }

    pub fn is_ready(&self) -> bool {
        self.info.borrow().is_some()
    }

    /// Load metadata and the saved position, then render
    pub async fn initialize(&self) {
        if let Err(e) = self.load_session().await {
            tracing::error!("Initialization error: {}", e);
            self.show_error(INIT_ERROR);
            return;
        }
        self.render().await;
    }

    async fn load_session(&self) -> Result<()> {
        let info = self.source.fetch_info().await?;

        let mut position = self.store.position().await?;
        if !info.contains(position) {
            tracing::warn!("Stored position {} is out of range, starting over", position);
            position = ReadingPosition::default();
        }

        self.position.set(position);
        *self.info.borrow_mut() = Some(Rc::new(info));
        tracing::info!("Presenter ready at {}", position);
        Ok(())
    }

    fn info(&self) -> Option<Rc<QuranInfo>> {
        self.info.borrow().clone()
    }

    /// Fetch and show the verse at the current position
    pub async fn render(&self) {
        let generation = self.generation.get() + 1;
        self.generation.set(generation);

        let Some(info) = self.info() else {
            self.show_error(INIT_ERROR);
            return;
        };
        let position = self.position.get();

        self.modify(|state| {
            state.loading = true;
            state.error = None;
            state.notice = None;
            state.bismillah = position.shows_bismillah();
            state.sajda_warning = info.is_sajda(position);
        });

        let loaded = self.load_verse(&info, position).await;

        if self.generation.get() != generation {
            tracing::debug!("Discarding stale render of {}", position);
            return;
        }

        match loaded {
            Ok(display) => {
                let progress = position.progress_percent(&info);
                self.modify(|state| {
                    state.verse = Some(display);
                    state.progress = progress;
                    state.loading = false;
                });

                if let Err(e) = self.store.set_last_shown_time(self.clock.now_millis()).await {
                    tracing::error!("Failed to record last shown time: {}", e);
                }
            }
            Err(e) => {
                tracing::error!("Display verse error at {}: {}", position, e);
                self.show_error(LOAD_ERROR);
            }
        }
    }

    async fn load_verse(&self, info: &QuranInfo, position: ReadingPosition) -> Result<VerseDisplay> {
        let quran_edition = self.api.quran_edition.as_str();
        let translation_edition = self.api.translation_edition.as_str();

        let (verse, translation) = futures::try_join!(
            self.source.fetch_verse(quran_edition, position),
            self.source.fetch_verse(translation_edition, position),
        )?;

        let arabic = verse.into_text(quran_edition, position)?;
        let translation = translation.into_text(translation_edition, position)?;

        let out_of_range = || VerseError::PositionOutOfRange {
            chapter: position.chapter,
            verse: position.verse,
        };
        let chapter = info.chapter(position.chapter).ok_or_else(out_of_range)?;
        let verse_info = info.verse(position).ok_or_else(out_of_range)?;

        Ok(VerseDisplay {
            arabic,
            translation,
            chapter_title: chapter.title(),
            revelation: format!("Revealed in {}", chapter.revelation),
            meta: format!(
                "Juz {} | Page {} | Line {}",
                verse_info.juz, verse_info.page, verse_info.line
            ),
        })
    }

    /// Step to the next verse, asking first if it is a sajda verse
    pub async fn advance(&self) -> Navigation {
        let Some(info) = self.info() else {
            self.show_error(INIT_ERROR);
            return Navigation::Unavailable;
        };

        let next = match self.position.get().next(&info) {
            Ok(Advance::To(next)) => next,
            Ok(Advance::Completed) => {
                self.modify(|state| {
                    state.notice = Some(COMPLETED_MESSAGE.to_string());
                    state.loading = false;
                });
                return Navigation::Completed;
            }
            Err(e) => {
                tracing::error!("Move to next verse error: {}", e);
                self.show_error(MOVE_ERROR);
                return Navigation::Failed;
            }
        };

        if info.is_sajda(next) && !self.view.confirm(SAJDA_PROMPT) {
            tracing::info!("Navigation to sajda verse {} declined", next);
            return Navigation::Declined;
        }

        if let Err(e) = self.store.set_position(next, self.clock.now_millis()).await {
            tracing::error!("Move to next verse error: {}", e);
            self.show_error(MOVE_ERROR);
            return Navigation::Failed;
        }

        self.position.set(next);
        self.render().await;
        Navigation::Moved(next)
    }

    fn show_error(&self, message: &str) {
        self.modify(|state| {
            state.error = Some(message.to_string());
            state.loading = false;
        });
    }

    fn modify(&self, f: impl FnOnce(&mut ViewState)) {
        let snapshot = {
            let mut state = self.state.borrow_mut();
            f(&mut state);
            state.clone()
        };
        self.view.update(&snapshot);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TOTAL_VERSES;
    use crate::store::{CURRENT_CHAPTER_KEY, CURRENT_VERSE_KEY, LAST_SHOWN_TIME_KEY};
    use crate::testing::{FixedClock, FixtureSource, MemoryStore, RecordingView};
    use serde_json::Value;

    const NOW: i64 = 1_700_000_000_000;

    type TestPresenter = Presenter<FixtureSource, MemoryStore, RecordingView, FixedClock>;

    fn presenter_at(chapter: u16, verse: u16) -> TestPresenter {
        let store = MemoryStore::new();
        store.insert(CURRENT_CHAPTER_KEY, Value::from(chapter));
        store.insert(CURRENT_VERSE_KEY, Value::from(verse));
        Presenter::new(
            FixtureSource::new(),
            store,
            RecordingView::new(),
            FixedClock(NOW),
            ApiConfig::default(),
        )
    }

    #[tokio::test]
    async fn test_initialize_renders_saved_position() {
        let presenter = presenter_at(2, 255);
        presenter.initialize().await;

        let state = presenter.state();
        assert!(!state.loading);
        assert_eq!(state.error, None);
        assert!(state.bismillah);
        let verse = state.verse.expect("verse rendered");
        assert_eq!(verse.arabic, "ara-quranacademy 2:255");
        assert_eq!(verse.translation, "ben-muhiuddinkhan 2:255");
        assert_eq!(verse.chapter_title, "البقرة - Al Baqara (The Cow)");
        assert_eq!(verse.revelation, "Revealed in Madina");
        assert!(verse.meta.starts_with("Juz "));
        assert_eq!(
            presenter.store().last_shown_time().await.unwrap(),
            Some(NOW)
        );
    }

    #[tokio::test]
    async fn test_render_shows_loading_before_verse() {
        let presenter = presenter_at(36, 1);
        presenter.initialize().await;

        let states = presenter.view().states();
        assert!(states.len() >= 2);
        assert!(states[0].loading);
        assert_eq!(states[0].verse, None);

        let last = states.last().unwrap();
        assert!(!last.loading);
        assert_eq!(
            last.verse.as_ref().map(|v| v.arabic.as_str()),
            Some("ara-quranacademy 36:1")
        );
    }

    #[tokio::test]
    async fn test_initialize_defaults_to_first_verse() {
        let presenter = Presenter::new(
            FixtureSource::new(),
            MemoryStore::new(),
            RecordingView::new(),
            FixedClock(NOW),
            ApiConfig::default(),
        );
        presenter.initialize().await;

        assert_eq!(presenter.position(), ReadingPosition::new(1, 1));
        let state = presenter.state();
        assert!(!state.bismillah);
        assert!((state.progress - 100.0 / f64::from(TOTAL_VERSES)).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_out_of_range_position_starts_over() {
        let presenter = presenter_at(1, 99);
        presenter.initialize().await;
        assert_eq!(presenter.position(), ReadingPosition::new(1, 1));
    }

    #[tokio::test]
    async fn test_bad_metadata_blocks_rendering() {
        let presenter = Presenter::new(
            FixtureSource::new().with_broken_info(),
            MemoryStore::new(),
            RecordingView::new(),
            FixedClock(NOW),
            ApiConfig::default(),
        );
        presenter.initialize().await;

        assert!(!presenter.is_ready());
        assert_eq!(presenter.state().error.as_deref(), Some(INIT_ERROR));
        assert_eq!(presenter.advance().await, Navigation::Unavailable);
        assert_eq!(presenter.source.verse_requests(), 0);
    }

    #[tokio::test]
    async fn test_empty_translation_fails_render() {
        let presenter = Presenter::new(
            FixtureSource::new().with_empty_edition("ben-muhiuddinkhan"),
            MemoryStore::new(),
            RecordingView::new(),
            FixedClock(NOW),
            ApiConfig::default(),
        );
        presenter.initialize().await;

        let state = presenter.state();
        assert_eq!(state.error.as_deref(), Some(LOAD_ERROR));
        assert!(!state.loading);
        assert_eq!(state.verse, None);
        assert_eq!(presenter.store().last_shown_time().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_sajda_warning_shown_on_sajda_verse() {
        let presenter = presenter_at(32, 15);
        presenter.initialize().await;
        assert!(presenter.state().sajda_warning);

        let presenter = presenter_at(32, 14);
        presenter.initialize().await;
        assert!(!presenter.state().sajda_warning);
    }

    #[tokio::test]
    async fn test_advance_within_chapter() {
        let presenter = presenter_at(2, 1);
        presenter.initialize().await;

        assert_eq!(
            presenter.advance().await,
            Navigation::Moved(ReadingPosition::new(2, 2))
        );
        assert_eq!(
            presenter.store().position().await.unwrap(),
            ReadingPosition::new(2, 2)
        );
    }

    #[tokio::test]
    async fn test_advance_to_next_chapter() {
        let presenter = presenter_at(1, 7);
        presenter.initialize().await;

        assert_eq!(
            presenter.advance().await,
            Navigation::Moved(ReadingPosition::new(2, 1))
        );
        let state = presenter.state();
        assert!(state.bismillah);
        assert_eq!(
            state.verse.map(|v| v.arabic),
            Some("ara-quranacademy 2:1".to_string())
        );
    }

    #[tokio::test]
    async fn test_advance_at_end_reports_completion() {
        let presenter = presenter_at(114, 6);
        presenter.initialize().await;
        let progress = presenter.state().progress;
        assert!((progress - 100.0).abs() < 1e-9);

        assert_eq!(presenter.advance().await, Navigation::Completed);
        assert_eq!(presenter.position(), ReadingPosition::new(114, 6));
        assert_eq!(
            presenter.store().position().await.unwrap(),
            ReadingPosition::new(114, 6)
        );
        assert_eq!(
            presenter.state().notice.as_deref(),
            Some(COMPLETED_MESSAGE)
        );
    }

    #[tokio::test]
    async fn test_declined_sajda_leaves_state_untouched() {
        let presenter = presenter_at(7, 205);
        presenter.initialize().await;
        presenter.store().inner().remove(LAST_SHOWN_TIME_KEY);
        presenter.view().answer_confirm(false);

        assert_eq!(presenter.advance().await, Navigation::Declined);
        assert_eq!(presenter.position(), ReadingPosition::new(7, 205));
        assert_eq!(
            presenter.store().position().await.unwrap(),
            ReadingPosition::new(7, 205)
        );
        assert_eq!(presenter.store().last_shown_time().await.unwrap(), None);
        assert_eq!(presenter.view().prompts(), vec![SAJDA_PROMPT.to_string()]);
    }

    #[tokio::test]
    async fn test_confirmed_sajda_moves() {
        let presenter = presenter_at(7, 205);
        presenter.initialize().await;
        presenter.view().answer_confirm(true);

        assert_eq!(
            presenter.advance().await,
            Navigation::Moved(ReadingPosition::new(7, 206))
        );
        assert!(presenter.state().sajda_warning);
    }

    #[tokio::test]
    async fn test_non_sajda_move_never_prompts() {
        let presenter = presenter_at(3, 1);
        presenter.initialize().await;
        presenter.advance().await;
        assert!(presenter.view().prompts().is_empty());
    }

    #[tokio::test]
    async fn test_failed_save_keeps_position() {
        let presenter = presenter_at(3, 1);
        presenter.initialize().await;
        presenter.store().inner().fail_writes(true);

        assert_eq!(presenter.advance().await, Navigation::Failed);
        assert_eq!(presenter.position(), ReadingPosition::new(3, 1));
        assert_eq!(presenter.state().error.as_deref(), Some(MOVE_ERROR));
    }

    #[tokio::test]
    async fn test_stale_render_is_discarded() {
        let presenter = Rc::new(presenter_at(2, 1));
        presenter.initialize().await;

        // First render parks on the gate; a second one finishes before it
        let gate = presenter.source.hold_verse(ReadingPosition::new(2, 2));
        let slow = {
            let presenter = presenter.clone();
            async move { presenter.advance().await }
        };
        let fast = {
            let presenter = presenter.clone();
            async move {
                tokio::task::yield_now().await;
                let moved = presenter.advance().await;
                gate.release();
                moved
            }
        };
        let (slow, fast) = futures::join!(slow, fast);

        assert_eq!(slow, Navigation::Moved(ReadingPosition::new(2, 2)));
        assert_eq!(fast, Navigation::Moved(ReadingPosition::new(2, 3)));
        assert_eq!(
            presenter.state().verse.map(|v| v.arabic),
            Some("ara-quranacademy 2:3".to_string())
        );
    }
}
