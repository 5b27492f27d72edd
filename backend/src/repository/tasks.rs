use std::sync::Arc;

use dashmap::DashMap;
use eyre::Result;
use itertools::Itertools;
use serde_json::Value;
use tokio::sync::Mutex;

use crate::repository::store::{JsonStore, Rows, Table};
use types::domain::Task;

/// Tasks grouped by owning user, each group in saved order. Rows with no owner
/// and rows that failed to decode are never served but stay in the table.
#[cfg_attr(test, faux::create)]
#[derive(Clone)]
pub struct TaskRepository {
    store: JsonStore,
    tasks: Arc<DashMap<String, Vec<Task>>>,
    unowned: Arc<Vec<Task>>,
    unreadable: Arc<Vec<Value>>,
    write_lock: Arc<Mutex<()>>,
}

#[cfg_attr(test, faux::methods)]
impl TaskRepository {
    pub fn new(store: JsonStore, rows: Rows<Task>) -> Self {
        let tasks: DashMap<String, Vec<Task>> = DashMap::new();
        let mut unowned = Vec::new();
        for task in rows.records {
            match task.user_id.clone() {
                Some(owner) => tasks.entry(owner).or_default().push(task),
                None => unowned.push(task),
            }
        }
        TaskRepository {
            store,
            tasks: Arc::new(tasks),
            unowned: Arc::new(unowned),
            unreadable: Arc::new(rows.unreadable),
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    pub fn get_for_user(&self, user_id: String) -> Vec<Task> {
        self.tasks
            .get(&user_id)
            .map(|tasks| tasks.clone())
            .unwrap_or_default()
    }

    /// Swaps the user's whole task list; other users' tasks are untouched.
    pub async fn replace_for_user(&self, user_id: String, tasks: Vec<Task>) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        let snapshot = self
            .tasks
            .iter()
            .filter(|group| group.key() != &user_id)
            .map(|group| (group.key().clone(), group.value().clone()))
            .chain(std::iter::once((user_id.clone(), tasks.clone())))
            .sorted_by(|(a, _), (b, _)| a.cmp(b))
            .flat_map(|(_, group)| group)
            .chain(self.unowned.iter().cloned())
            .collect_vec();
        self.store
            .write(Table::Tasks, &snapshot, &self.unreadable)
            .await?;

        if tasks.is_empty() {
            self.tasks.remove(&user_id);
        } else {
            self.tasks.insert(user_id, tasks);
        }
        Ok(())
    }
}
