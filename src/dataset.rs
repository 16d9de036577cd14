use anyhow::Context as _;

use crate::api::ContributionApi;
use crate::model::QaRecord;

/// Fetches the collected QA pairs (newest first, as served).
pub async fn fetch_records(api: &dyn ContributionApi) -> anyhow::Result<Vec<QaRecord>> {
    let records = api.list_data().await.context("load dataset")?;
    tracing::debug!(count = records.len(), "dataset loaded");
    Ok(records)
}

/// Case-insensitive match over both languages of each pair.
pub fn filter_records<'a>(records: &'a [QaRecord], query: &str) -> Vec<&'a QaRecord> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return records.iter().collect();
    }
    records
        .iter()
        .filter(|record| {
            let mut fields = vec![record.instruction.as_str(), record.response.as_str()];
            if let Some(translation) = &record.translation {
                fields.push(&translation.instruction);
                fields.push(&translation.response);
            }
            fields
                .iter()
                .any(|field| field.to_lowercase().contains(&needle))
        })
        .collect()
}
