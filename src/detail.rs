use crate::api::ContributionApi;
use crate::model::BookRecord;

/// The single-book content view. Opened on demand; independent of polling.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BookDetail {
    /// Fetch outstanding. Holds the list entry so the header can render meanwhile.
    Loading(BookRecord),
    Ready(BookRecord),
    Unavailable { summary: BookRecord, reason: String },
}

impl BookDetail {
    pub fn loading(summary: BookRecord) -> Self {
        Self::Loading(summary)
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading(_))
    }

    pub fn summary(&self) -> &BookRecord {
        match self {
            Self::Loading(book) | Self::Ready(book) => book,
            Self::Unavailable { summary, .. } => summary,
        }
    }

    pub fn content(&self) -> Option<&str> {
        match self {
            Self::Ready(book) => book.content.as_deref().filter(|text| !text.is_empty()),
            _ => None,
        }
    }

    /// Fetches the full record for a `Loading` view and settles it.
    pub async fn resolve(self, api: &dyn ContributionApi) -> Self {
        let summary = match self {
            Self::Loading(summary) => summary,
            settled => return settled,
        };
        match api.get_book(&summary.id).await {
            Ok(book) => Self::Ready(book),
            Err(err) => {
                tracing::warn!(book_id = %summary.id, error = %format!("{err:#}"), "fetch book content failed");
                Self::Unavailable {
                    summary,
                    reason: format!("{err:#}"),
                }
            }
        }
    }
}
