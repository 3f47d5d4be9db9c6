use crate::error::HarvestError;
use crate::types::NewsPage;

#[derive(Debug, Clone)]
pub enum Action {
    Quit,
    ScrollUp,
    ScrollDown,
    PageUp,
    PageDown,
    GoToTop,
    GoToBottom,
    Resize(u16),

    // Feed
    LoadFirstPage,
    AdvancePage,
    RetryPage,
    PageLoaded { page: u32, result: NewsPage },
    PageFailed { page: u32 },

    // Rates panel
    TogglePanel,

    // Links
    OpenInBrowser,
    OpenImage,
    YankUrl,

    Error(String),
    None,
}

impl Action {
    /// Whether the action came from a key press rather than the terminal,
    /// the sensor, or a finished fetch.
    pub fn is_user_input(&self) -> bool {
        !matches!(
            self,
            Action::Resize(_)
                | Action::LoadFirstPage
                | Action::AdvancePage
                | Action::PageLoaded { .. }
                | Action::PageFailed { .. }
                | Action::Error(_)
                | Action::None
        )
    }
}

impl From<HarvestError> for Action {
    fn from(err: HarvestError) -> Self {
        Action::Error(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn background_actions_are_not_user_input() {
        assert!(!Action::AdvancePage.is_user_input());
        assert!(!Action::PageFailed { page: 2 }.is_user_input());
        assert!(!Action::Resize(40).is_user_input());
        assert!(Action::ScrollDown.is_user_input());
        assert!(Action::RetryPage.is_user_input());
    }
}
