use eyre::Result;
use tap::TapFallible;
use tempfile::TempDir;

use client::local::LocalStorage;
use client::session::AuthSession;
use client::store::{Target, TaskStore};
use types::domain::User;

use crate::util::{random_email, TestServer};

/// A signed-up user with their own client-side storage directory.
pub struct TestUser {
    pub user: User,
    pub email: String,
    pub session: AuthSession,
    pub storage: LocalStorage,
    _storage_dir: TempDir,
}

pub const PASSWORD: &str = "password";

impl TestUser {
    pub async fn new(server: &TestServer, name: &str) -> Result<Self> {
        let storage_dir = tempfile::tempdir()?;
        let storage = LocalStorage::new(storage_dir.path());
        let mut session = AuthSession::new(server.client(), storage.clone());

        let email = random_email();
        let user = session
            .signup(name, &email, PASSWORD)
            .await
            .tap_err(|e| println!("Error: {:?}", e))?;

        Ok(Self {
            user,
            email,
            session,
            storage,
            _storage_dir: storage_dir,
        })
    }

    pub fn session_id(&self) -> String {
        self.session.session_id().unwrap_or_default().to_string()
    }

    pub async fn task_store(&self) -> TaskStore {
        TaskStore::open(Target::for_session(&self.session, &self.storage)).await
    }
}
