use eyre::Result;
use log::debug;

use crate::repository::tasks::TaskRepository;
use types::domain::Task;

#[derive(Clone)]
pub struct TaskService {
    pub task_repository: TaskRepository,
}

impl TaskService {
    pub fn get_tasks(&self, user_id: &str) -> Vec<Task> {
        self.task_repository.get_for_user(user_id.to_string())
    }

    /// Destructive replace: the incoming list becomes the user's entire task set.
    pub async fn save_tasks(&self, user_id: &str, tasks: Vec<Task>) -> Result<()> {
        let tasks: Vec<Task> = tasks
            .into_iter()
            .map(|task| task.owned_by(user_id))
            .collect();
        debug!("Saving {} tasks for user {}", tasks.len(), user_id);
        self.task_repository
            .replace_for_user(user_id.to_string(), tasks)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use eyre::eyre;
    use types::domain::Priority;

    #[tokio::test]
    async fn test_save_stamps_every_task_with_owner() -> Result<()> {
        let mut task_repository = TaskRepository::faux();
        faux::when!(task_repository.replace_for_user).then(|(user_id, tasks)| {
            assert_eq!(user_id, "user_ann");
            assert_eq!(tasks.len(), 2);
            assert!(tasks
                .iter()
                .all(|task| task.user_id.as_deref() == Some("user_ann")));
            Ok(())
        });
        let service = TaskService { task_repository };

        let foreign = Task::new("not mine", Priority::Low).owned_by("user_bob");
        service
            .save_tasks("user_ann", vec![Task::new("buy milk", Priority::High), foreign])
            .await
    }

    #[tokio::test]
    async fn test_save_propagates_store_failure() {
        let mut task_repository = TaskRepository::faux();
        faux::when!(task_repository.replace_for_user)
            .then(|(_, _)| Err(eyre!("disk full")));
        let service = TaskService { task_repository };

        let result = service.save_tasks("user_ann", Vec::new()).await;
        assert!(result.is_err());
    }

    #[test]
    fn test_get_reads_owner_subset() {
        let mut task_repository = TaskRepository::faux();
        faux::when!(task_repository.get_for_user).then(|user_id| {
            vec![Task::new("buy milk", Priority::High).owned_by(&user_id)]
        });
        let service = TaskService { task_repository };

        let tasks = service.get_tasks("user_ann");
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].user_id.as_deref(), Some("user_ann"));
    }
}
