use std::sync::Arc;

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use eyre::Result;
use itertools::Itertools;
use serde_json::Value;
use tokio::sync::Mutex;

use crate::domain::auth::Session;
use crate::repository::store::{JsonStore, Rows, Table};

#[derive(Clone)]
pub struct SessionRepository {
    store: JsonStore,
    sessions: Arc<DashMap<String, Session>>,
    unreadable: Arc<Vec<Value>>,
    write_lock: Arc<Mutex<()>>,
}

impl SessionRepository {
    pub fn new(store: JsonStore, rows: Rows<Session>) -> Self {
        let sessions = rows
            .records
            .into_iter()
            .map(|session| (session.session_id.clone(), session))
            .collect();
        SessionRepository {
            store,
            sessions: Arc::new(sessions),
            unreadable: Arc::new(rows.unreadable),
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    pub async fn load(store: JsonStore) -> Self {
        let rows = store.read(Table::Sessions).await;
        Self::new(store, rows)
    }

    pub async fn insert(&self, session: Session) -> Result<Session> {
        let _guard = self.write_lock.lock().await;
        let mut snapshot = self.snapshot();
        snapshot.push(session.clone());
        self.store
            .write(Table::Sessions, &snapshot, &self.unreadable)
            .await?;
        self.sessions
            .insert(session.session_id.clone(), session.clone());
        Ok(session)
    }

    pub fn get_by_session_token(&self, token: &str) -> Option<Session> {
        self.sessions.get(token).map(|session| session.clone())
    }

    /// Returns whether a session was removed. Removing an unknown token is not an error.
    pub async fn delete(&self, token: &str) -> Result<bool> {
        let _guard = self.write_lock.lock().await;
        if !self.sessions.contains_key(token) {
            return Ok(false);
        }
        let snapshot = self
            .snapshot()
            .into_iter()
            .filter(|session| session.session_id != token)
            .collect_vec();
        self.store
            .write(Table::Sessions, &snapshot, &self.unreadable)
            .await?;
        self.sessions.remove(token);
        Ok(true)
    }

    pub async fn purge_expired(&self, now: DateTime<Utc>) -> Result<usize> {
        let _guard = self.write_lock.lock().await;
        let (expired, live): (Vec<Session>, Vec<Session>) = self
            .snapshot()
            .into_iter()
            .partition(|session| session.is_expired_at(now));
        if expired.is_empty() {
            return Ok(0);
        }
        self.store
            .write(Table::Sessions, &live, &self.unreadable)
            .await?;
        for session in &expired {
            self.sessions.remove(&session.session_id);
        }
        Ok(expired.len())
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    fn snapshot(&self) -> Vec<Session> {
        self.sessions
            .iter()
            .map(|session| session.value().clone())
            .sorted_by(|a, b| {
                a.created_at
                    .cmp(&b.created_at)
                    .then_with(|| a.session_id.cmp(&b.session_id))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use serde_json::json;

    #[tokio::test]
    async fn test_insert_get_delete() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let repository = SessionRepository::load(JsonStore::new(dir.path())).await;
        let session = repository
            .insert(Session::new("user_1".into(), Duration::days(7)))
            .await?;

        assert_eq!(
            repository.get_by_session_token(&session.session_id),
            Some(session.clone())
        );
        assert!(repository.delete(&session.session_id).await?);
        assert!(repository.get_by_session_token(&session.session_id).is_none());
        assert!(!repository.delete(&session.session_id).await?);
        Ok(())
    }

    #[tokio::test]
    async fn test_sessions_survive_reload() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let store = JsonStore::new(dir.path());
        let session = SessionRepository::load(store.clone())
            .await
            .insert(Session::new("user_1".into(), Duration::days(7)))
            .await?;

        let reloaded = SessionRepository::load(store).await;
        assert_eq!(reloaded.get_by_session_token(&session.session_id), Some(session));
        Ok(())
    }

    #[tokio::test]
    async fn test_purge_expired_keeps_live_sessions() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let store = JsonStore::new(dir.path());
        let repository = SessionRepository::load(store.clone()).await;
        let live = repository
            .insert(Session::new("user_1".into(), Duration::days(7)))
            .await?;
        let stale = repository
            .insert(Session::new("user_1".into(), Duration::seconds(-1)))
            .await?;

        assert_eq!(repository.purge_expired(Utc::now()).await?, 1);
        assert!(repository.get_by_session_token(&stale.session_id).is_none());
        assert!(repository.get_by_session_token(&live.session_id).is_some());
        assert_eq!(repository.purge_expired(Utc::now()).await?, 0);

        let reloaded = SessionRepository::load(store).await;
        assert_eq!(reloaded.len(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_malformed_row_survives_logout() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let store = JsonStore::new(dir.path());
        let broken = json!({ "sessionId": "abc", "userId": "user_bob", "expiresAt": "soon" });
        std::fs::write(store.path(Table::Sessions), json!([broken.clone()]).to_string())?;

        let repository = SessionRepository::load(store.clone()).await;
        assert!(repository.get_by_session_token("abc").is_none());
        let session = repository
            .insert(Session::new("user_1".into(), Duration::days(7)))
            .await?;
        repository.delete(&session.session_id).await?;

        let on_disk: Vec<Value> =
            serde_json::from_str(&std::fs::read_to_string(store.path(Table::Sessions))?)?;
        assert_eq!(on_disk, vec![broken]);
        Ok(())
    }
}
