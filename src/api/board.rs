use async_trait::async_trait;

use super::error::Result;
use super::models::{Application, ApplyResponse, SearchQuery, VacancyPage};

/// The two platform calls the application run depends on
///
/// Implemented by [`super::ApiClient`] for the real platform and by fakes in
/// tests.
#[async_trait]
pub trait JobBoard: Send + Sync {
    /// Fetch one page of search results (pages are zero-based)
    async fn search(&self, query: &SearchQuery, page: u32) -> Result<VacancyPage>;

    /// Submit an application. Any HTTP answer is `Ok`; only transport
    /// failures are errors.
    async fn apply(&self, application: &Application<'_>) -> Result<ApplyResponse>;
}
