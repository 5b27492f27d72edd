use eyre::{ensure, Result};
use validator::Validate;

use types::domain::{LoginRequest, SignupRequest, Task, UpdateProfileRequest, User};
use types::error::Error;

use crate::config::Config;
use crate::domain::auth::Session;
use crate::repository::sessions::SessionRepository;
use crate::repository::store::{JsonStore, Table};
use crate::repository::tasks::TaskRepository;
use crate::repository::users::UserRepository;
use crate::service::auth::AuthService;
use crate::service::tasks::TaskService;
use crate::service::users::UserService;

#[derive(Clone)]
pub struct Api {
    pub auth_service: AuthService,
    pub user_service: UserService,
    pub task_service: TaskService,
}

impl Api {
    /// Loads all three tables from the configured data directory.
    pub async fn from_config(config: &Config) -> Self {
        let store = JsonStore::new(config.storage.data_dir.clone());
        let user_repository = UserRepository::load(store.clone()).await;
        let session_repository = SessionRepository::load(store.clone()).await;
        let task_repository = TaskRepository::new(store.clone(), store.read(Table::Tasks).await);

        Api {
            auth_service: AuthService {
                user_repository: user_repository.clone(),
                session_repository,
                session_ttl: config.auth.session_ttl(),
                bcrypt_cost: config.auth.bcrypt_cost,
            },
            user_service: UserService { user_repository },
            task_service: TaskService { task_repository },
        }
    }

    pub async fn signup(&self, request: SignupRequest) -> Result<(User, Session)> {
        request.validate().map_err(|_| Error::MissingFields)?;
        let (user, session) = self
            .auth_service
            .signup(request.name, request.email, request.password)
            .await?;
        Ok((user.into(), session))
    }

    pub async fn login(&self, request: LoginRequest) -> Result<(User, Session)> {
        request.validate().map_err(|_| Error::MissingCredentials)?;
        let (user, session) = self
            .auth_service
            .login(request.email, request.password)
            .await?;
        Ok((user.into(), session))
    }

    pub async fn logout(&self, token: Option<String>) -> Result<()> {
        self.auth_service.logout(token).await
    }

    pub fn verify(&self, token: Option<&str>) -> Result<User> {
        Ok(self.auth_service.verify(token)?.into())
    }

    pub async fn update_profile(
        &self,
        token: Option<&str>,
        request: UpdateProfileRequest,
    ) -> Result<User> {
        let session = self.auth_service.authenticate(token)?;
        ensure!(request.validate().is_ok(), Error::MissingFields);
        let user = self
            .user_service
            .update_profile(&session.user_id, request.name, request.email)
            .await?;
        Ok(user.into())
    }

    pub fn get_tasks(&self, token: Option<&str>) -> Result<Vec<Task>> {
        let session = self.auth_service.authenticate(token)?;
        Ok(self.task_service.get_tasks(&session.user_id))
    }

    pub async fn save_tasks(&self, token: Option<&str>, tasks: Vec<Task>) -> Result<()> {
        let session = self.auth_service.authenticate(token)?;
        self.task_service.save_tasks(&session.user_id, tasks).await
    }
}
