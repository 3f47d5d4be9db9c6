use async_trait::async_trait;

use crate::error::Result;
use crate::types::NewsPage;

/// Something that can hand out pages of news, 1-indexed.
#[async_trait]
pub trait NewsSource: Send + Sync + std::fmt::Debug {
    fn name(&self) -> &str;

    async fn fetch_page(&self, page: u32) -> Result<NewsPage>;
}
