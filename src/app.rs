use std::sync::Arc;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::action::Action;
use crate::error::{HarvestError, Result};
use crate::event::Event;
use crate::feed::{Feed, FeedStatus};
use crate::sensor::{sentinel_visibility, Viewport, VisibilitySensor, CARD_HEIGHT, SENTINEL_HEIGHT};
use crate::source::NewsSource;
use crate::types::{Bank, BANKS};

/// Show/hide state of the loan-rate table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RatesPanel {
    pub open: bool,
    pub index: usize,
}

impl RatesPanel {
    pub fn toggle(&mut self) {
        self.open = !self.open;
    }

    pub fn up(&mut self) {
        self.index = self.index.saturating_sub(1);
    }

    pub fn down(&mut self) {
        if self.index + 1 < BANKS.len() {
            self.index += 1;
        }
    }

    pub fn selected(&self) -> &'static Bank {
        &BANKS[self.index.min(BANKS.len() - 1)]
    }
}

pub struct App {
    pub feed: Feed,
    pub panel: RatesPanel,
    pub selected: usize,
    pub offset: usize,
    pub rows: u16,
    pub notice: Option<String>,
    pub error: Option<String>,
    pub should_quit: bool,
    sensor: VisibilitySensor,
    source: Arc<dyn NewsSource>,
    action_tx: mpsc::UnboundedSender<Action>,
    cancel: CancellationToken,
}

impl App {
    pub fn new(source: Arc<dyn NewsSource>, action_tx: mpsc::UnboundedSender<Action>) -> Self {
        Self {
            feed: Feed::new(),
            panel: RatesPanel::default(),
            selected: 0,
            offset: 0,
            rows: 0,
            notice: None,
            error: None,
            should_quit: false,
            sensor: VisibilitySensor::new(action_tx.clone()),
            source,
            action_tx,
            cancel: CancellationToken::new(),
        }
    }

    pub fn source_name(&self) -> &str {
        self.source.name()
    }

    pub fn viewport(&self) -> Viewport {
        Viewport {
            offset: self.offset,
            rows: self.rows,
        }
    }

    /// The sentinel is drawn only while more pages may arrive and no error is shown.
    pub fn sentinel_shown(&self) -> bool {
        matches!(self.feed.status(), FeedStatus::HasMore | FeedStatus::Loading)
    }

    pub fn handle_event(&self, event: Event) -> Action {
        match event {
            Event::Init => Action::LoadFirstPage,
            Event::Resize(_, height) => Action::Resize(height),
            Event::Key(key) => self.handle_key(key),
            _ => Action::None,
        }
    }

    fn handle_key(&self, key: KeyEvent) -> Action {
        if key.modifiers.contains(KeyModifiers::CONTROL) {
            return match key.code {
                KeyCode::Char('d') => Action::PageDown,
                KeyCode::Char('u') => Action::PageUp,
                _ => Action::None,
            };
        }

        match key.code {
            KeyCode::Char('q') => Action::Quit,
            KeyCode::Esc => {
                if self.panel.open {
                    Action::TogglePanel
                } else {
                    Action::Quit
                }
            }
            KeyCode::Char('j') | KeyCode::Down => Action::ScrollDown,
            KeyCode::Char('k') | KeyCode::Up => Action::ScrollUp,
            KeyCode::PageDown => Action::PageDown,
            KeyCode::PageUp => Action::PageUp,
            KeyCode::Char('g') | KeyCode::Home => Action::GoToTop,
            KeyCode::Char('G') | KeyCode::End => Action::GoToBottom,
            KeyCode::Enter | KeyCode::Char('o') => Action::OpenInBrowser,
            KeyCode::Char('y') => Action::YankUrl,
            KeyCode::Char('b') => Action::TogglePanel,
            KeyCode::Char('i') if !self.panel.open => Action::OpenImage,
            KeyCode::Char('r') if !self.panel.open => Action::RetryPage,
            _ => Action::None,
        }
    }

    pub fn update(&mut self, action: Action) {
        if action.is_user_input() && !matches!(action, Action::Quit) {
            self.error = None;
            self.notice = None;
        }

        match action {
            Action::Quit => {
                self.should_quit = true;
                self.shutdown();
            }
            Action::ScrollUp => {
                if self.panel.open {
                    self.panel.up();
                } else {
                    self.selected = self.selected.saturating_sub(1);
                }
            }
            Action::ScrollDown => {
                if self.panel.open {
                    self.panel.down();
                } else {
                    self.selected = self.selected.saturating_add(1);
                }
            }
            Action::PageUp => {
                self.selected = self.selected.saturating_sub(self.capacity());
            }
            Action::PageDown => {
                self.selected = self.selected.saturating_add(self.capacity());
            }
            Action::GoToTop => {
                self.selected = 0;
            }
            Action::GoToBottom => {
                self.selected = self.feed.articles().len().saturating_sub(1);
            }
            Action::Resize(height) => {
                self.rows = crate::ui::list_rows(height);
            }

            // Feed
            Action::LoadFirstPage => {
                if let Some(page) = self.feed.start() {
                    self.spawn_fetch(page);
                }
            }
            Action::AdvancePage => {
                if let Some(page) = self.feed.advance_page() {
                    self.spawn_fetch(page);
                }
            }
            Action::RetryPage => {
                if let Some(page) = self.feed.retry() {
                    info!(page, "retrying news page");
                    self.spawn_fetch(page);
                }
            }
            Action::PageLoaded { page, result } => {
                let count = result.articles.len();
                if self.feed.apply_page(page, result) {
                    debug!(page, count, total = self.feed.articles().len(), "page appended");
                    self.sensor.rearm();
                } else if !self.feed.has_more() {
                    info!(page, "news feed exhausted");
                }
            }
            Action::PageFailed { page } => {
                self.feed.apply_failure(page);
            }

            Action::TogglePanel => {
                self.panel.toggle();
            }

            // Links
            Action::OpenInBrowser => {
                if let Some(link) = self.current_link() {
                    let link = link.to_string();
                    self.report(open_link(&link));
                }
            }
            Action::OpenImage => {
                if let Some(article) = self.feed.articles().get(self.selected) {
                    let link = article.image_or_placeholder().to_string();
                    self.report(open_link(&link));
                }
            }
            Action::YankUrl => {
                if let Some(link) = self.current_link() {
                    let link = link.to_string();
                    match copy_to_clipboard(&link) {
                        Ok(()) => self.notice = Some(format!("Copied {}", link)),
                        Err(e) => self.report(Err(e)),
                    }
                }
            }

            Action::Error(msg) => {
                self.error = Some(msg);
            }
            Action::None => {}
        }

        self.scroll_into_view();
        self.sense();
    }

    /// Cancel in-flight fetches and stop the sensor. Safe to call twice.
    pub fn shutdown(&mut self) {
        self.cancel.cancel();
        self.sensor.disconnect();
    }

    fn report(&self, result: Result<()>) {
        if let Err(e) = result {
            warn!(error = %e, "link action failed");
            self.action_tx.send(Action::from(e)).ok();
        }
    }

    fn current_link(&self) -> Option<&str> {
        if self.panel.open {
            return Some(self.panel.selected().link);
        }
        self.feed
            .articles()
            .get(self.selected)
            .map(|a| a.url.as_str())
            .filter(|url| !url.is_empty())
    }

    /// Whole cards that fit in the list area.
    fn capacity(&self) -> usize {
        ((self.rows / CARD_HEIGHT) as usize).max(1)
    }

    /// Keep the selected card on screen. On the last card, leave room for the
    /// sentinel so scrolling to the end reveals it.
    fn scroll_into_view(&mut self) {
        let len = self.feed.articles().len();
        if len == 0 {
            self.selected = 0;
            self.offset = 0;
            return;
        }
        self.selected = self.selected.min(len - 1);

        let tail = if self.selected + 1 == len && self.sentinel_shown() {
            SENTINEL_HEIGHT
        } else {
            0
        };
        let capacity = ((self.rows.saturating_sub(tail) / CARD_HEIGHT) as usize).max(1);

        if self.selected < self.offset {
            self.offset = self.selected;
        } else if self.selected >= self.offset + capacity {
            self.offset = self.selected + 1 - capacity;
        }
    }

    fn sense(&mut self) {
        let fraction = if self.sentinel_shown() {
            sentinel_visibility(self.feed.articles().len(), self.viewport())
        } else {
            0.0
        };
        self.sensor.observe(fraction, self.feed.can_advance());
    }

    fn spawn_fetch(&self, page: u32) {
        let tx = self.action_tx.clone();
        let source = Arc::clone(&self.source);
        let cancel = self.cancel.clone();
        tokio::spawn(async move {
            tokio::select! {
                _ = cancel.cancelled() => {
                    debug!(page, "fetch cancelled");
                }
                result = source.fetch_page(page) => {
                    let action = match result {
                        Ok(result) => Action::PageLoaded { page, result },
                        Err(e) => {
                            warn!(page, error = %e, "news fetch failed");
                            Action::PageFailed { page }
                        }
                    };
                    tx.send(action).ok();
                }
            }
        });
    }
}

impl Drop for App {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn open_link(link: &str) -> Result<()> {
    open::that(link)?;
    Ok(())
}

fn copy_to_clipboard(text: &str) -> Result<()> {
    let mut clipboard =
        arboard::Clipboard::new().map_err(|e| HarvestError::Clipboard(e.to_string()))?;
    clipboard
        .set_text(text.to_string())
        .map_err(|e| HarvestError::Clipboard(e.to_string()))
}
