use crate::auth::{AuthEvent, IdentityProvider};
use crate::config::Config;
use crate::store::DocumentStore;
use crate::timer::TimerRunner;
use std::{collections::HashMap, sync::Arc};
use tokio::{
    sync::{Mutex, OwnedMutexGuard, broadcast::error::RecvError},
    task::JoinHandle,
};
use tracing::{info, warn};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub store: Arc<DocumentStore>,
    pub auth: Arc<IdentityProvider>,
    pub timers: Arc<Mutex<HashMap<String, Arc<TimerRunner>>>>,
    user_locks: Arc<Mutex<HashMap<String, Arc<Mutex<()>>>>>,
}

impl AppState {
    pub fn new(config: Config, store: DocumentStore) -> Self {
        let store = Arc::new(store);
        Self {
            config: Arc::new(config),
            auth: Arc::new(IdentityProvider::new(Arc::clone(&store))),
            store,
            timers: Arc::new(Mutex::new(HashMap::new())),
            user_locks: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Held across a load, mutate and persist of one user's stats and tasks.
    pub async fn lock_user(&self, uid: &str) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self.user_locks.lock().await;
            Arc::clone(locks.entry(uid.to_string()).or_default())
        };
        lock.lock_owned().await
    }

    pub async fn timer_for(&self, uid: &str) -> Arc<TimerRunner> {
        let mut timers = self.timers.lock().await;
        let runner = timers.entry(uid.to_string()).or_insert_with(|| {
            Arc::new(TimerRunner::new(
                uid,
                self.config.timer,
                self.config.tick_period,
            ))
        });
        Arc::clone(runner)
    }

    pub fn watch_auth(&self) -> JoinHandle<()> {
        let mut events = self.auth.subscribe();
        let state = self.clone();
        tokio::spawn(async move {
            loop {
                match events.recv().await {
                    Ok(event) => state.on_auth_event(event).await,
                    Err(RecvError::Lagged(skipped)) => warn!(skipped, "auth events lagged"),
                    Err(RecvError::Closed) => break,
                }
            }
        })
    }

    async fn on_auth_event(&self, event: AuthEvent) {
        match event {
            AuthEvent::SignedIn(user) => info!(uid = %user.uid, "auth state: signed in"),
            AuthEvent::SignedOut(user) => {
                info!(uid = %user.uid, "auth state: signed out");
                // another device may still be signed in
                if self.auth.is_signed_in(&user.uid).await {
                    return;
                }
                if let Some(runner) = self.timers.lock().await.remove(&user.uid) {
                    runner.pause().await;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Category, Stat};
    use crate::session::Session;

    fn state() -> AppState {
        AppState::new(Config::default(), DocumentStore::in_memory())
    }

    #[tokio::test]
    async fn overlapping_completions_keep_both_xp_awards() {
        let state = state();
        let mut setup = Session::load(&state.store, "u1").await;
        let heavy = setup
            .create_task(&state.store, "Deadlift", Category::Strength, Some(60))
            .await
            .unwrap();
        let light = setup
            .create_task(&state.store, "Push-ups", Category::Strength, Some(30))
            .await
            .unwrap();

        let complete = |id: String| {
            let state = state.clone();
            async move {
                let _guard = state.lock_user("u1").await;
                let mut session = Session::load(&state.store, "u1").await;
                tokio::task::yield_now().await;
                session.complete_task(&state.store, &id).await.unwrap();
            }
        };
        tokio::join!(complete(heavy.id), complete(light.id));

        let reloaded = Session::load(&state.store, "u1").await;
        assert!(reloaded.tasks.iter().all(|task| task.completed));
        assert_eq!(reloaded.stats.strength, Stat { level: 1, xp: 90 });
    }

    #[tokio::test]
    async fn timer_survives_until_last_session_signs_out() {
        let state = state();
        let (phone, user) = state.auth.sign_up("a@b.c", "secret1").await.unwrap();
        let (laptop, _) = state.auth.sign_in("a@b.c", "secret1").await.unwrap();
        state.timer_for(&user.uid).await.start().await;

        let signed_out = state.auth.sign_out(&phone).await.unwrap();
        state.on_auth_event(AuthEvent::SignedOut(signed_out)).await;
        assert!(state.timers.lock().await.contains_key(&user.uid));

        let signed_out = state.auth.sign_out(&laptop).await.unwrap();
        state.on_auth_event(AuthEvent::SignedOut(signed_out)).await;
        assert!(!state.timers.lock().await.contains_key(&user.uid));
    }
}
