//! Pagination state for the news feed.
//!
//! The feed only ever grows. Pages are requested one at a time: a new page is
//! handed out only when the previous one has landed, the source still has
//! more, and no error is pending.

use tracing::debug;

use crate::types::{Article, NewsPage};

pub const FETCH_FAILURE_MESSAGE: &str = "Failed to fetch news. Please try again later.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedStatus {
    Loading,
    HasMore,
    Exhausted,
    Errored,
}

#[derive(Debug)]
pub struct Feed {
    articles: Vec<Article>,
    page: u32,
    has_more: bool,
    error: Option<String>,
    in_flight: Option<u32>,
    total_results: Option<u64>,
    started: bool,
}

impl Default for Feed {
    fn default() -> Self {
        Self::new()
    }
}

impl Feed {
    pub fn new() -> Self {
        Self {
            articles: Vec::new(),
            page: 1,
            has_more: true,
            error: None,
            in_flight: None,
            total_results: None,
            started: false,
        }
    }

    pub fn articles(&self) -> &[Article] {
        &self.articles
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn has_more(&self) -> bool {
        self.has_more
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn in_flight(&self) -> Option<u32> {
        self.in_flight
    }

    pub fn total_results(&self) -> Option<u64> {
        self.total_results
    }

    pub fn status(&self) -> FeedStatus {
        if self.error.is_some() {
            FeedStatus::Errored
        } else if !self.has_more {
            FeedStatus::Exhausted
        } else if self.in_flight.is_some() {
            FeedStatus::Loading
        } else {
            FeedStatus::HasMore
        }
    }

    /// Whether an advance would be accepted right now.
    pub fn can_advance(&self) -> bool {
        self.started && self.status() == FeedStatus::HasMore
    }

    /// Request the first page. Only hands out page 1 once.
    pub fn start(&mut self) -> Option<u32> {
        if self.started {
            return None;
        }
        self.started = true;
        self.in_flight = Some(self.page);
        Some(self.page)
    }

    /// Move to the next page and return its number.
    pub fn advance_page(&mut self) -> Option<u32> {
        if !self.can_advance() {
            debug!(page = self.page, status = ?self.status(), "advance refused");
            return None;
        }
        self.page += 1;
        self.in_flight = Some(self.page);
        Some(self.page)
    }

    /// Record a successful fetch. Returns true when articles were appended.
    pub fn apply_page(&mut self, page: u32, result: NewsPage) -> bool {
        if self.in_flight != Some(page) {
            debug!(page, in_flight = ?self.in_flight, "dropping stale page");
            return false;
        }
        self.in_flight = None;

        if result.total_results.is_some() {
            self.total_results = result.total_results;
        }

        if result.articles.is_empty() {
            self.has_more = false;
            return false;
        }

        self.articles.extend(result.articles);
        true
    }

    /// Record a failed fetch. Loaded articles and the page counter are kept.
    pub fn apply_failure(&mut self, page: u32) {
        if self.in_flight != Some(page) {
            debug!(page, in_flight = ?self.in_flight, "dropping stale failure");
            return;
        }
        self.in_flight = None;
        self.error = Some(FETCH_FAILURE_MESSAGE.to_string());
    }

    /// Clear a fetch error and re-request the page that failed.
    pub fn retry(&mut self) -> Option<u32> {
        if self.error.is_none() || self.in_flight.is_some() {
            return None;
        }
        self.error = None;
        self.in_flight = Some(self.page);
        Some(self.page)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page_of(n: usize) -> NewsPage {
        NewsPage {
            articles: (0..n)
                .map(|i| Article {
                    title: format!("Article {}", i),
                    description: None,
                    image_url: None,
                    url: format!("https://example.com/{}", i),
                    source_name: None,
                    published_at: None,
                })
                .collect(),
            total_results: None,
        }
    }

    #[test]
    fn starts_on_page_one() {
        let mut feed = Feed::new();
        assert_eq!(feed.status(), FeedStatus::HasMore);
        assert_eq!(feed.start(), Some(1));
        assert_eq!(feed.status(), FeedStatus::Loading);
        assert_eq!(feed.start(), None);
    }

    #[test]
    fn advance_before_start_is_refused() {
        let mut feed = Feed::new();
        assert!(!feed.can_advance());
        assert_eq!(feed.advance_page(), None);
        assert_eq!(feed.start(), Some(1));
    }

    #[test]
    fn pages_accumulate_in_fetch_order() {
        let mut feed = Feed::new();
        let first = feed.start().unwrap();
        assert!(feed.apply_page(first, page_of(6)));
        assert_eq!(feed.articles().len(), 6);
        assert_eq!(feed.page(), 1);
        assert!(feed.has_more());

        let second = feed.advance_page().unwrap();
        assert_eq!(second, 2);
        let mut page = page_of(6);
        page.articles[0].title = "Second page head".to_string();
        assert!(feed.apply_page(second, page));
        assert_eq!(feed.articles().len(), 12);
        assert_eq!(feed.articles()[6].title, "Second page head");
        assert_eq!(feed.page(), 2);
    }

    #[test]
    fn empty_page_is_terminal() {
        let mut feed = Feed::new();
        feed.start();
        feed.apply_page(1, page_of(6));
        feed.advance_page();
        feed.apply_page(2, page_of(6));

        let third = feed.advance_page().unwrap();
        assert!(!feed.apply_page(third, page_of(0)));
        assert_eq!(feed.articles().len(), 12);
        assert!(!feed.has_more());
        assert_eq!(feed.status(), FeedStatus::Exhausted);

        for _ in 0..5 {
            assert_eq!(feed.advance_page(), None);
        }
        assert_eq!(feed.page(), 3);
    }

    #[test]
    fn no_advance_while_in_flight() {
        let mut feed = Feed::new();
        feed.start();
        assert_eq!(feed.advance_page(), None);
        assert_eq!(feed.page(), 1);

        feed.apply_page(1, page_of(3));
        assert_eq!(feed.advance_page(), Some(2));
        assert_eq!(feed.advance_page(), None);
        assert_eq!(feed.page(), 2);
    }

    #[test]
    fn failure_keeps_articles_and_page() {
        let mut feed = Feed::new();
        feed.start();
        feed.apply_page(1, page_of(6));
        let next = feed.advance_page().unwrap();

        feed.apply_failure(next);
        assert_eq!(feed.error(), Some(FETCH_FAILURE_MESSAGE));
        assert_eq!(feed.articles().len(), 6);
        assert_eq!(feed.page(), 2);
        assert_eq!(feed.status(), FeedStatus::Errored);
        assert_eq!(feed.advance_page(), None);
    }

    #[test]
    fn retry_requests_the_same_page() {
        let mut feed = Feed::new();
        feed.start();
        feed.apply_failure(1);

        assert_eq!(feed.retry(), Some(1));
        assert_eq!(feed.error(), None);
        assert_eq!(feed.retry(), None);

        feed.apply_page(1, page_of(2));
        assert_eq!(feed.articles().len(), 2);
        assert_eq!(feed.page(), 1);
    }

    #[test]
    fn retry_without_error_is_refused() {
        let mut feed = Feed::new();
        assert_eq!(feed.retry(), None);
    }

    #[test]
    fn stale_results_are_ignored() {
        let mut feed = Feed::new();
        feed.start();
        assert!(!feed.apply_page(7, page_of(6)));
        feed.apply_failure(7);
        assert!(feed.articles().is_empty());
        assert_eq!(feed.error(), None);
        assert_eq!(feed.in_flight(), Some(1));
    }

    #[test]
    fn total_results_tracks_latest_report() {
        let mut feed = Feed::new();
        feed.start();
        let mut page = page_of(6);
        page.total_results = Some(240);
        feed.apply_page(1, page);
        assert_eq!(feed.total_results(), Some(240));

        feed.advance_page();
        feed.apply_page(2, page_of(6));
        assert_eq!(feed.total_results(), Some(240));
    }
}
