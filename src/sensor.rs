//! Edge-triggered watcher for the sentinel row at the end of the feed.

use tokio::sync::mpsc;
use tracing::debug;

use crate::action::Action;

/// Rows taken by one article card, including the separator line.
pub const CARD_HEIGHT: u16 = 4;
/// Rows taken by the sentinel below the last card.
pub const SENTINEL_HEIGHT: u16 = 1;
/// Share of the sentinel that must be on screen before it counts as visible.
pub const THRESHOLD: f32 = 1.0;
/// Rows needed to show one whole card with the sentinel under it. Shorter
/// lists clip the last card so the sentinel keeps the bottom row.
pub const MIN_ROWS: u16 = CARD_HEIGHT + SENTINEL_HEIGHT;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Viewport {
    /// Index of the first card drawn.
    pub offset: usize,
    /// Rows available to the list.
    pub rows: u16,
}

/// Visible share of the sentinel when `items` cards precede it.
pub fn sentinel_visibility(items: usize, viewport: Viewport) -> f32 {
    let cards_shown = items.saturating_sub(viewport.offset);
    let rows = viewport.rows as usize;
    if cards_shown == 1 && viewport.rows < MIN_ROWS && viewport.rows >= SENTINEL_HEIGHT {
        return 1.0;
    }
    let top = cards_shown.saturating_mul(CARD_HEIGHT as usize);
    if top >= rows {
        return 0.0;
    }
    let visible = (rows - top).min(SENTINEL_HEIGHT as usize);
    visible as f32 / SENTINEL_HEIGHT as f32
}

#[derive(Debug)]
pub struct VisibilitySensor {
    tx: Option<mpsc::UnboundedSender<Action>>,
    visible: bool,
}

impl VisibilitySensor {
    pub fn new(tx: mpsc::UnboundedSender<Action>) -> Self {
        Self {
            tx: Some(tx),
            visible: false,
        }
    }

    /// Feed a fresh visibility reading. Sends `AdvancePage` on an
    /// invisible-to-visible transition while `armed`; returns whether it did.
    pub fn observe(&mut self, fraction: f32, armed: bool) -> bool {
        let now_visible = fraction >= THRESHOLD;
        let rising = now_visible && !self.visible;
        self.visible = now_visible;

        if !rising || !armed {
            return false;
        }

        match &self.tx {
            Some(tx) => {
                debug!("sentinel visible, requesting next page");
                tx.send(Action::AdvancePage).is_ok()
            }
            None => false,
        }
    }

    /// Forget the last reading so a sentinel that is still on screen fires again.
    pub fn rearm(&mut self) {
        self.visible = false;
    }

    pub fn disconnect(&mut self) {
        if self.tx.take().is_some() {
            debug!("visibility sensor disconnected");
        }
    }

    #[cfg(test)]
    pub fn is_connected(&self) -> bool {
        self.tx.is_some()
    }
}

impl Drop for VisibilitySensor {
    fn drop(&mut self) {
        self.disconnect();
    }
}
