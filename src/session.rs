use crate::errors::TrackerError;
use crate::models::{Category, StatSheet, Task};
use crate::store::{self, Direction, DocumentStore, STATS, TASKS, to_fields, user_collection};
use crate::tasks;
use chrono::Utc;
use serde_json::{Map, Value};
use tracing::{error, info};

const STATS_DOC: &str = "current";

#[derive(Debug, Clone)]
pub struct Session {
    pub uid: String,
    pub stats: StatSheet,
    pub tasks: Vec<Task>,
}

impl Session {
    // read failures degrade to defaults; a missing stats document is created
    pub async fn load(store: &DocumentStore, uid: &str) -> Session {
        let mut session = Session {
            uid: uid.to_string(),
            stats: StatSheet::default(),
            tasks: Vec::new(),
        };

        match store.get(&session.stats_collection(), STATS_DOC).await {
            Ok(Some(doc)) => match serde_json::from_value(doc) {
                Ok(stats) => session.stats = stats,
                Err(err) => error!(uid, "failed to decode stats: {err}"),
            },
            Ok(None) => {
                if let Err(err) = session.save_stats(store).await {
                    error!(uid, "failed to create initial stats: {err}");
                }
            }
            Err(err) => error!(uid, "failed to load stats: {err}"),
        }

        session.tasks = load_tasks(store, uid).await;
        session
    }

    pub async fn save_stats(&self, store: &DocumentStore) -> Result<(), TrackerError> {
        store
            .set(&self.stats_collection(), STATS_DOC, to_fields(&self.stats)?)
            .await?;
        Ok(())
    }

    pub async fn create_task(
        &mut self,
        store: &DocumentStore,
        name: &str,
        category: Category,
        xp: Option<u32>,
    ) -> Result<Task, TrackerError> {
        let mut task = tasks::new_task(name, category, xp, Utc::now())?;
        task.id = store
            .add(&self.tasks_collection(), to_fields(&task)?)
            .await
            .inspect_err(|err| error!(uid = %self.uid, "failed to add task: {err}"))?;
        self.tasks.insert(0, task.clone());
        Ok(task)
    }

    pub async fn complete_task(
        &mut self,
        store: &DocumentStore,
        id: &str,
    ) -> Result<Option<Task>, TrackerError> {
        // unknown or already completed
        let Some(completion) = tasks::complete(&mut self.tasks, &mut self.stats, id) else {
            return Ok(None);
        };
        let task = completion.task;
        if completion.leveled_up {
            let stat = self.stats.get(task.category);
            info!(uid = %self.uid, category = %task.category, level = stat.level, "level up");
        }

        let stats_written = self.save_stats(store).await;
        let mut fields = Map::new();
        fields.insert("completed".to_string(), Value::Bool(true));
        let flag_written = store
            .update(&self.tasks_collection(), id, fields)
            .await
            .map_err(TrackerError::from);

        if let Err(err) = &stats_written {
            error!(uid = %self.uid, "failed to save stats: {err}");
        }
        if let Err(err) = &flag_written {
            error!(uid = %self.uid, task = id, "failed to update task: {err}");
        }
        stats_written.and(flag_written)?;
        Ok(Some(task))
    }

    pub async fn delete_task(&mut self, store: &DocumentStore, id: &str) -> Result<Task, TrackerError> {
        if !self.tasks.iter().any(|task| task.id == id) {
            return Err(TrackerError::NotFound {
                kind: "task",
                id: id.to_string(),
            });
        }
        store
            .delete(&self.tasks_collection(), id)
            .await
            .inspect_err(|err| error!(uid = %self.uid, task = id, "failed to remove task: {err}"))?;

        tasks::remove(&mut self.tasks, id).ok_or_else(|| TrackerError::NotFound {
            kind: "task",
            id: id.to_string(),
        })
    }

    fn stats_collection(&self) -> String {
        user_collection(&self.uid, STATS)
    }

    fn tasks_collection(&self) -> String {
        user_collection(&self.uid, TASKS)
    }
}

async fn load_tasks(store: &DocumentStore, uid: &str) -> Vec<Task> {
    let docs = match store
        .query_ordered(&user_collection(uid, TASKS), "createdAt", Direction::Desc)
        .await
    {
        Ok(docs) => docs,
        Err(err) => {
            error!(uid, "failed to load tasks: {err}");
            return Vec::new();
        }
    };

    docs.into_iter()
        .filter_map(|doc| {
            let id = doc.id.clone();
            doc.into_model::<Task>()
                .inspect_err(|err: &store::StoreError| error!(uid, task = %id, "skipping task: {err}"))
                .ok()
        })
        .collect()
}
