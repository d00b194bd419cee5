use crate::store::{ACCOUNTS, DocumentStore, StoreError};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::{collections::HashMap, sync::Arc};
use thiserror::Error;
use tokio::sync::{Mutex, broadcast};
use tracing::info;
use uuid::Uuid;

pub const MIN_PASSWORD_LEN: usize = 6;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("email and password are required")]
    MissingCredentials,
    #[error("password should be at least 6 characters")]
    WeakPassword,
    #[error("an account already exists for {0}")]
    EmailTaken(String),
    #[error("invalid email or password")]
    InvalidCredentials,
    #[error("session token is not valid")]
    InvalidToken,
    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct User {
    pub uid: String,
    pub email: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthEvent {
    SignedIn(User),
    SignedOut(User),
}

#[derive(Debug, Serialize, Deserialize)]
struct Account {
    uid: String,
    email: String,
    salt: String,
    password_hash: String,
}

#[derive(Debug)]
pub struct IdentityProvider {
    store: Arc<DocumentStore>,
    sessions: Mutex<HashMap<String, User>>,
    events: broadcast::Sender<AuthEvent>,
}

impl IdentityProvider {
    pub fn new(store: Arc<DocumentStore>) -> Self {
        let (events, _) = broadcast::channel(64);
        Self {
            store,
            sessions: Mutex::new(HashMap::new()),
            events,
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<AuthEvent> {
        self.events.subscribe()
    }

    pub async fn sign_up(&self, email: &str, password: &str) -> Result<(String, User), AuthError> {
        let email = normalize_email(email);
        if email.is_empty() || password.is_empty() {
            return Err(AuthError::MissingCredentials);
        }
        if password.chars().count() < MIN_PASSWORD_LEN {
            return Err(AuthError::WeakPassword);
        }
        if self.store.get(ACCOUNTS, &email).await?.is_some() {
            return Err(AuthError::EmailTaken(email));
        }

        let salt = Uuid::new_v4().simple().to_string();
        let account = Account {
            uid: Uuid::new_v4().simple().to_string(),
            password_hash: hash_password(&salt, password),
            email: email.clone(),
            salt,
        };
        self.store
            .set(ACCOUNTS, &email, serde_json::to_value(&account).map_err(StoreError::from)?)
            .await?;

        info!(uid = %account.uid, "account created");
        Ok(self.open_session(User { uid: account.uid, email }).await)
    }

    pub async fn sign_in(&self, email: &str, password: &str) -> Result<(String, User), AuthError> {
        let email = normalize_email(email);
        if email.is_empty() || password.is_empty() {
            return Err(AuthError::MissingCredentials);
        }

        let Some(doc) = self.store.get(ACCOUNTS, &email).await? else {
            return Err(AuthError::InvalidCredentials);
        };
        let account: Account = serde_json::from_value(doc).map_err(StoreError::from)?;
        if hash_password(&account.salt, password) != account.password_hash {
            return Err(AuthError::InvalidCredentials);
        }

        Ok(self.open_session(User { uid: account.uid, email: account.email }).await)
    }

    pub async fn sign_out(&self, token: &str) -> Result<User, AuthError> {
        let user = self
            .sessions
            .lock()
            .await
            .remove(token)
            .ok_or(AuthError::InvalidToken)?;
        info!(uid = %user.uid, "signed out");
        let _ = self.events.send(AuthEvent::SignedOut(user.clone()));
        Ok(user)
    }

    pub async fn current_user(&self, token: &str) -> Result<User, AuthError> {
        self.sessions
            .lock()
            .await
            .get(token)
            .cloned()
            .ok_or(AuthError::InvalidToken)
    }

    pub async fn is_signed_in(&self, uid: &str) -> bool {
        self.sessions.lock().await.values().any(|user| user.uid == uid)
    }

    async fn open_session(&self, user: User) -> (String, User) {
        let token = Uuid::new_v4().to_string();
        self.sessions.lock().await.insert(token.clone(), user.clone());
        info!(uid = %user.uid, "signed in");
        // no subscribers is fine
        let _ = self.events.send(AuthEvent::SignedIn(user.clone()));
        (token, user)
    }
}

fn normalize_email(email: &str) -> String {
    email.trim().to_ascii_lowercase()
}

fn hash_password(salt: &str, password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(password.as_bytes());
    hex::encode(hasher.finalize())
}
