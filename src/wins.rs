use crate::errors::TrackerError;
use crate::models::Win;
use crate::store::{Direction, DocumentStore, WINS, to_fields, user_collection};
use chrono::{DateTime, Utc};
use tracing::error;

pub async fn list(store: &DocumentStore, uid: &str) -> Result<Vec<Win>, TrackerError> {
    let docs = store
        .query_ordered(&user_collection(uid, WINS), "date", Direction::Desc)
        .await?;
    Ok(docs
        .into_iter()
        .filter_map(|doc| {
            let id = doc.id.clone();
            match doc.into_model::<Win>() {
                Ok(win) => Some(win),
                Err(err) => {
                    error!(uid, win = %id, "skipping win: {err}");
                    None
                }
            }
        })
        .collect())
}

pub async fn create(
    store: &DocumentStore,
    uid: &str,
    title: &str,
    description: &str,
    image: Option<String>,
    now: DateTime<Utc>,
) -> Result<Win, TrackerError> {
    let (title, description) = (title.trim(), description.trim());
    if title.is_empty() || description.is_empty() {
        return Err(TrackerError::Invalid(
            "win title and description are required".to_string(),
        ));
    }

    let mut win = Win {
        id: String::new(),
        title: title.to_string(),
        description: description.to_string(),
        image: image.filter(|image| !image.trim().is_empty()),
        date: now,
    };
    win.id = store.add(&user_collection(uid, WINS), to_fields(&win)?).await?;
    Ok(win)
}

pub async fn delete(store: &DocumentStore, uid: &str, id: &str) -> Result<(), TrackerError> {
    if !store.delete(&user_collection(uid, WINS), id).await? {
        return Err(TrackerError::NotFound {
            kind: "win",
            id: id.to_string(),
        });
    }
    Ok(())
}
