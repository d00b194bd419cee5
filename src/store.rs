use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::{Map, Value};
use std::{
    cmp::Ordering,
    collections::BTreeMap,
    path::{Path, PathBuf},
};
use thiserror::Error;
use tokio::{fs, sync::Mutex};
use tracing::{debug, error};
use uuid::Uuid;

pub const STATS: &str = "stats";
pub const TASKS: &str = "tasks";
pub const JOURNAL_ENTRIES: &str = "journalEntries";
pub const WINS: &str = "wins";
pub const ACCOUNTS: &str = "accounts";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to write store file: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid document: {0}")]
    Json(#[from] serde_json::Error),
    #[error("document {collection}/{id} does not exist")]
    Missing { collection: String, id: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Asc,
    Desc,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub id: String,
    pub data: Value,
}

impl Document {
    pub fn into_model<T: DeserializeOwned>(self) -> Result<T, StoreError> {
        let mut data = self.data;
        if let Value::Object(map) = &mut data {
            map.insert("id".to_string(), Value::String(self.id));
        }
        Ok(serde_json::from_value(data)?)
    }
}

// the id is the document key and is left out of the body
pub fn to_fields<T: Serialize>(model: &T) -> Result<Value, StoreError> {
    let mut value = serde_json::to_value(model)?;
    if let Value::Object(map) = &mut value {
        map.remove("id");
    }
    Ok(value)
}

pub fn user_collection(uid: &str, name: &str) -> String {
    format!("users/{uid}/{name}")
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct StoreData {
    collections: BTreeMap<String, BTreeMap<String, Value>>,
}

#[derive(Debug)]
pub struct DocumentStore {
    path: Option<PathBuf>,
    data: Mutex<StoreData>,
}

impl DocumentStore {
    pub fn in_memory() -> Self {
        Self {
            path: None,
            data: Mutex::new(StoreData::default()),
        }
    }

    pub async fn open(path: &Path) -> Self {
        let data = match fs::read(path).await {
            Ok(bytes) => match serde_json::from_slice(&bytes) {
                Ok(data) => data,
                Err(err) => {
                    error!("failed to parse store file {}: {err}", path.display());
                    StoreData::default()
                }
            },
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => StoreData::default(),
            Err(err) => {
                error!("failed to read store file {}: {err}", path.display());
                StoreData::default()
            }
        };

        Self {
            path: Some(path.to_path_buf()),
            data: Mutex::new(data),
        }
    }

    pub async fn get(&self, collection: &str, id: &str) -> Result<Option<Value>, StoreError> {
        let data = self.data.lock().await;
        Ok(data
            .collections
            .get(collection)
            .and_then(|docs| docs.get(id))
            .cloned())
    }

    pub async fn set(&self, collection: &str, id: &str, value: Value) -> Result<(), StoreError> {
        let mut data = self.data.lock().await;
        data.collections
            .entry(collection.to_string())
            .or_default()
            .insert(id.to_string(), value);
        self.persist(&data).await
    }

    pub async fn add(&self, collection: &str, value: Value) -> Result<String, StoreError> {
        let id = Uuid::new_v4().simple().to_string();
        let mut data = self.data.lock().await;
        data.collections
            .entry(collection.to_string())
            .or_default()
            .insert(id.clone(), value);
        self.persist(&data).await?;
        debug!("added {collection}/{id}");
        Ok(id)
    }

    pub async fn update(
        &self,
        collection: &str,
        id: &str,
        fields: Map<String, Value>,
    ) -> Result<(), StoreError> {
        let mut data = self.data.lock().await;
        let doc = data
            .collections
            .get_mut(collection)
            .and_then(|docs| docs.get_mut(id))
            .ok_or_else(|| StoreError::Missing {
                collection: collection.to_string(),
                id: id.to_string(),
            })?;

        match doc {
            Value::Object(map) => map.extend(fields),
            other => *other = Value::Object(fields),
        }
        self.persist(&data).await
    }

    pub async fn delete(&self, collection: &str, id: &str) -> Result<bool, StoreError> {
        let mut data = self.data.lock().await;
        let removed = data
            .collections
            .get_mut(collection)
            .and_then(|docs| docs.remove(id))
            .is_some();
        if removed {
            self.persist(&data).await?;
        }
        Ok(removed)
    }

    pub async fn query_ordered(
        &self,
        collection: &str,
        field: &str,
        direction: Direction,
    ) -> Result<Vec<Document>, StoreError> {
        let data = self.data.lock().await;
        let mut docs: Vec<Document> = data
            .collections
            .get(collection)
            .map(|docs| {
                docs.iter()
                    .map(|(id, value)| Document {
                        id: id.clone(),
                        data: value.clone(),
                    })
                    .collect()
            })
            .unwrap_or_default();

        docs.sort_by(|a, b| {
            let ordering = compare_fields(a.data.get(field), b.data.get(field));
            match direction {
                Direction::Asc => ordering,
                Direction::Desc => ordering.reverse(),
            }
        });
        Ok(docs)
    }

    async fn persist(&self, data: &StoreData) -> Result<(), StoreError> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        let payload = serde_json::to_vec_pretty(data)?;
        fs::write(path, payload).await?;
        Ok(())
    }
}

// Missing fields sort first. Strings that parse as RFC 3339 compare as instants
// because fractional seconds make their text order unreliable.
fn compare_fields(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(a), Some(b)) => compare_values(a, b),
    }
}

fn compare_values(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Number(a), Value::Number(b)) => {
            let a = a.as_f64().unwrap_or_default();
            let b = b.as_f64().unwrap_or_default();
            a.partial_cmp(&b).unwrap_or(Ordering::Equal)
        }
        (Value::String(a), Value::String(b)) => match (parse_instant(a), parse_instant(b)) {
            (Some(a), Some(b)) => a.cmp(&b),
            _ => a.cmp(b),
        },
        (Value::Bool(a), Value::Bool(b)) => a.cmp(b),
        _ => Ordering::Equal,
    }
}

fn parse_instant(value: &str) -> Option<DateTime<FixedOffset>> {
    DateTime::parse_from_rfc3339(value).ok()
}
