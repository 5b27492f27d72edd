use std::sync::Arc;

use dashmap::DashMap;
use eyre::{ensure, Result};
use itertools::Itertools;
use serde_json::Value;
use tokio::sync::Mutex;

use crate::domain::user::StoredUser;
use crate::repository::store::{JsonStore, Rows, Table};
use types::error::Error;

/// Users indexed by id, with a secondary email index.
#[derive(Clone)]
pub struct UserRepository {
    store: JsonStore,
    users: Arc<DashMap<String, StoredUser>>,
    emails: Arc<DashMap<String, String>>,
    unreadable: Arc<Vec<Value>>,
    write_lock: Arc<Mutex<()>>,
}

impl UserRepository {
    pub fn new(store: JsonStore, rows: Rows<StoredUser>) -> Self {
        let users = DashMap::new();
        let emails = DashMap::new();
        for user in rows.records {
            emails.insert(user.email.clone(), user.id.clone());
            users.insert(user.id.clone(), user);
        }
        UserRepository {
            store,
            users: Arc::new(users),
            emails: Arc::new(emails),
            unreadable: Arc::new(rows.unreadable),
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    pub async fn load(store: JsonStore) -> Self {
        let rows = store.read(Table::Users).await;
        Self::new(store, rows)
    }

    pub async fn create_user(
        &self,
        name: String,
        email: String,
        hashed_password: String,
    ) -> Result<StoredUser> {
        let _guard = self.write_lock.lock().await;
        ensure!(!self.emails.contains_key(&email), Error::EmailAlreadyRegistered);

        let user = StoredUser::new(name, email, hashed_password);
        let mut snapshot = self.snapshot();
        snapshot.push(user.clone());
        self.store
            .write(Table::Users, &snapshot, &self.unreadable)
            .await?;

        self.emails.insert(user.email.clone(), user.id.clone());
        self.users.insert(user.id.clone(), user.clone());
        Ok(user)
    }

    pub fn get(&self, id: &str) -> Option<StoredUser> {
        self.users.get(id).map(|user| user.clone())
    }

    pub fn get_by_email(&self, email: &str) -> Option<StoredUser> {
        let id = self.emails.get(email).map(|id| id.clone())?;
        self.get(&id)
    }

    pub fn exists(&self, email: &str) -> bool {
        self.emails.contains_key(email)
    }

    /// Returns `None` when the user is gone.
    pub async fn update_profile(
        &self,
        id: &str,
        name: String,
        email: String,
    ) -> Result<Option<StoredUser>> {
        let _guard = self.write_lock.lock().await;
        let Some(current) = self.get(id) else {
            return Ok(None);
        };
        let taken_by_other = self
            .emails
            .get(&email)
            .is_some_and(|owner| owner.as_str() != id);
        ensure!(!taken_by_other, Error::EmailInUse);

        let updated = StoredUser {
            name,
            email,
            ..current.clone()
        };
        let snapshot = self
            .snapshot()
            .into_iter()
            .map(|user| if user.id == id { updated.clone() } else { user })
            .collect_vec();
        self.store
            .write(Table::Users, &snapshot, &self.unreadable)
            .await?;

        if current.email != updated.email {
            self.emails.remove(&current.email);
            self.emails.insert(updated.email.clone(), updated.id.clone());
        }
        self.users.insert(updated.id.clone(), updated.clone());
        Ok(Some(updated))
    }

    fn snapshot(&self) -> Vec<StoredUser> {
        self.users
            .iter()
            .map(|user| user.value().clone())
            .sorted_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)))
            .collect()
    }
}
