use crate::errors::TrackerError;
use crate::models::JournalEntry;
use crate::store::{Direction, DocumentStore, JOURNAL_ENTRIES, to_fields, user_collection};
use chrono::{DateTime, Utc};
use tracing::error;

/// Entries newest first.
pub async fn list(store: &DocumentStore, uid: &str) -> Result<Vec<JournalEntry>, TrackerError> {
    let docs = store
        .query_ordered(&user_collection(uid, JOURNAL_ENTRIES), "date", Direction::Desc)
        .await?;
    let mut entries: Vec<JournalEntry> = Vec::with_capacity(docs.len());
    for doc in docs {
        let id = doc.id.clone();
        match doc.into_model::<JournalEntry>() {
            Ok(entry) => entries.push(entry),
            Err(err) => error!(uid, entry = %id, "skipping journal entry: {err}"),
        }
    }
    Ok(entries)
}

pub async fn create(
    store: &DocumentStore,
    uid: &str,
    content: &str,
    now: DateTime<Utc>,
) -> Result<JournalEntry, TrackerError> {
    let content = content.trim();
    if content.is_empty() {
        return Err(TrackerError::Invalid("journal entry is empty".to_string()));
    }

    let mut entry = JournalEntry {
        id: String::new(),
        content: content.to_string(),
        date: now,
    };
    entry.id = store
        .add(&user_collection(uid, JOURNAL_ENTRIES), to_fields(&entry)?)
        .await?;
    Ok(entry)
}

pub async fn delete(store: &DocumentStore, uid: &str, id: &str) -> Result<(), TrackerError> {
    if store.delete(&user_collection(uid, JOURNAL_ENTRIES), id).await? {
        Ok(())
    } else {
        Err(TrackerError::NotFound {
            kind: "journal entry",
            id: id.to_string(),
        })
    }
}
