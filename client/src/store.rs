use chrono::{DateTime, Duration, Local, Utc};
use log::{debug, error};
use serde::Serialize;

use types::domain::{Priority, Task};

use crate::client::Client;
use crate::local::{LocalStorage, TASKS_KEY};
use crate::session::AuthSession;
use crate::settings::{Settings, SortBy};

const AUTO_DELETE_AFTER_DAYS: i64 = 7;

/// Where the task list is mirrored after each change.
#[derive(Debug, Clone)]
pub enum Target {
    Remote { client: Client, session_id: String },
    Local(LocalStorage),
}

impl Target {
    /// The backend while logged in, local storage otherwise.
    pub fn for_session(session: &AuthSession, storage: &LocalStorage) -> Self {
        match session.session_id() {
            Some(session_id) => Target::Remote {
                client: session.client().clone(),
                session_id: session_id.to_string(),
            },
            None => Target::Local(storage.clone()),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PriorityCounts {
    pub high: usize,
    pub medium: usize,
    pub low: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskStats {
    pub total: usize,
    pub completed: usize,
    pub pending: usize,
    pub high_priority_pending: usize,
    /// Rounded percentage, 0 for an empty list.
    pub completion_rate: u32,
    /// Some completed task was created on the local calendar day of `now`.
    pub completed_today: bool,
    pub by_priority: PriorityCounts,
}

#[derive(Debug, Clone)]
pub struct TaskStore {
    tasks: Vec<Task>,
    target: Target,
}

impl TaskStore {
    pub async fn open(target: Target) -> Self {
        let tasks = load(&target).await;
        Self { tasks, target }
    }

    /// Switches persistence target (login/logout) and reloads from it.
    pub async fn attach(&mut self, target: Target) {
        self.tasks = load(&target).await;
        self.target = target;
    }

    pub fn target(&self) -> &Target {
        &self.target
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    /// Blank text adds nothing.
    pub async fn add(&mut self, text: &str, priority: Priority) -> Option<Task> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }
        let task = Task::new(text, priority);
        self.tasks.push(task.clone());
        self.push().await;
        Some(task)
    }

    pub async fn toggle(&mut self, id: &str) -> bool {
        let found = match self.tasks.iter_mut().find(|task| task.id == id) {
            Some(task) => {
                task.completed = !task.completed;
                true
            }
            None => false,
        };
        self.push().await;
        found
    }

    pub async fn delete(&mut self, id: &str) -> bool {
        let before = self.tasks.len();
        self.tasks.retain(|task| task.id != id);
        self.push().await;
        self.tasks.len() < before
    }

    pub async fn delete_all(&mut self) -> usize {
        let removed = self.tasks.len();
        self.tasks.clear();
        self.push().await;
        removed
    }

    pub async fn delete_completed(&mut self) -> usize {
        let before = self.tasks.len();
        self.tasks.retain(|task| !task.completed);
        self.push().await;
        before - self.tasks.len()
    }

    /// With `autoDelete` on, drops completed tasks created more than a week before `now`.
    pub async fn purge_stale(&mut self, settings: &Settings, now: DateTime<Utc>) -> usize {
        if !settings.auto_delete {
            return 0;
        }
        let cutoff = now - Duration::days(AUTO_DELETE_AFTER_DAYS);
        let before = self.tasks.len();
        self.tasks
            .retain(|task| !(task.completed && task.created_at < cutoff));
        let removed = before - self.tasks.len();
        if removed > 0 {
            self.push().await;
        }
        removed
    }

    pub fn visible(&self, settings: &Settings) -> Vec<&Task> {
        self.sorted(settings.sort_by)
            .into_iter()
            .filter(|task| settings.show_completed || !task.completed)
            .collect()
    }

    pub fn sorted(&self, sort_by: SortBy) -> Vec<&Task> {
        let mut tasks: Vec<&Task> = self.tasks.iter().collect();
        match sort_by {
            SortBy::CreatedAt => tasks.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
            SortBy::Priority => tasks.sort_by_key(|task| task.priority.rank()),
            SortBy::Alphabetical => tasks.sort_by_key(|task| task.text.to_lowercase()),
        }
        tasks
    }

    pub fn recent(&self, count: usize) -> Vec<&Task> {
        let mut tasks = self.sorted(SortBy::CreatedAt);
        tasks.truncate(count);
        tasks
    }

    pub fn stats(&self, now: DateTime<Utc>) -> TaskStats {
        let today = now.with_timezone(&Local).date_naive();
        let total = self.tasks.len();
        let completed = self.tasks.iter().filter(|task| task.completed).count();
        let count = |priority: Priority| {
            self.tasks
                .iter()
                .filter(|task| task.priority == priority)
                .count()
        };
        TaskStats {
            total,
            completed,
            pending: total - completed,
            high_priority_pending: self
                .tasks
                .iter()
                .filter(|task| task.priority == Priority::High && !task.completed)
                .count(),
            completion_rate: if total == 0 {
                0
            } else {
                (completed as f64 / total as f64 * 100.0).round() as u32
            },
            completed_today: self.tasks.iter().any(|task| {
                task.completed && task.created_at.with_timezone(&Local).date_naive() == today
            }),
            by_priority: PriorityCounts {
                high: count(Priority::High),
                medium: count(Priority::Medium),
                low: count(Priority::Low),
            },
        }
    }

    pub fn export_json(&self) -> eyre::Result<String> {
        Ok(serde_json::to_string_pretty(&self.tasks)?)
    }

    /// Mirrors the whole list. Failures are logged and dropped; nothing is queued.
    async fn push(&self) {
        let result = match &self.target {
            Target::Remote { client, session_id } => client
                .save_tasks(session_id, &self.tasks)
                .await
                .map_err(eyre::Report::from),
            Target::Local(storage) => storage.set(TASKS_KEY, &self.tasks).await,
        };
        match result {
            Ok(()) => debug!("Synced {} tasks", self.tasks.len()),
            Err(e) => error!("Failed to sync tasks: {:?}", e),
        }
    }
}

async fn load(target: &Target) -> Vec<Task> {
    match target {
        Target::Remote { client, session_id } => client
            .get_tasks(session_id)
            .await
            .unwrap_or_else(|e| {
                error!("Failed to load tasks: {}", e);
                Vec::new()
            }),
        Target::Local(storage) => storage.get(TASKS_KEY).await.unwrap_or_default(),
    }
}
