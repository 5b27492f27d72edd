use log::{error, warn};
use tap::TapFallible;

use types::domain::{AuthResponse, LoginRequest, SignupRequest, User};

use crate::client::Client;
use crate::error::{ClientError, ClientResult};
use crate::local::{LocalStorage, SESSION_KEY};

/// Who is logged in, remembered across restarts through the saved session id.
#[derive(Debug, Clone)]
pub struct AuthSession {
    client: Client,
    storage: LocalStorage,
    user: Option<User>,
    session_id: Option<String>,
}

impl AuthSession {
    pub fn new(client: Client, storage: LocalStorage) -> Self {
        Self {
            client,
            storage,
            user: None,
            session_id: None,
        }
    }

    pub fn client(&self) -> &Client {
        &self.client
    }

    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    pub fn session_id(&self) -> Option<&str> {
        self.session_id.as_deref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }

    /// Re-validates a saved session id. A rejected or unverifiable id is forgotten.
    pub async fn restore(&mut self) -> bool {
        let Some(saved) = self.storage.get::<String>(SESSION_KEY).await else {
            return false;
        };
        match self.client.verify(&saved).await {
            Ok(user) => {
                self.user = Some(user);
                self.session_id = Some(saved);
                true
            }
            Err(e) => {
                warn!("Session verification failed: {}", e);
                self.forget().await;
                false
            }
        }
    }

    pub async fn signup(&mut self, name: &str, email: &str, password: &str) -> ClientResult<User> {
        let request = SignupRequest {
            name: name.to_string(),
            email: email.to_string(),
            password: password.to_string(),
        };
        let response = self.client.signup(&request).await?;
        Ok(self.remember(response).await)
    }

    pub async fn login(&mut self, email: &str, password: &str) -> ClientResult<User> {
        let request = LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        };
        let response = self.client.login(&request).await?;
        Ok(self.remember(response).await)
    }

    /// Always ends logged out, even when the server cannot be reached.
    pub async fn logout(&mut self) {
        if let Some(session_id) = self.session_id.as_deref() {
            let _ = self
                .client
                .logout(session_id)
                .await
                .tap_err(|e| error!("Logout error: {}", e));
        }
        self.forget().await;
    }

    pub async fn update_profile(&mut self, name: &str, email: &str) -> ClientResult<User> {
        let session_id = self
            .session_id
            .as_deref()
            .ok_or(ClientError::NotAuthenticated)?;
        let user = self.client.update_profile(session_id, name, email).await?;
        self.user = Some(user.clone());
        Ok(user)
    }

    async fn remember(&mut self, response: AuthResponse) -> User {
        let _ = self
            .storage
            .set(SESSION_KEY, &response.session_id)
            .await
            .tap_err(|e| error!("Failed to save session id: {:?}", e));
        self.user = Some(response.user.clone());
        self.session_id = Some(response.session_id);
        response.user
    }

    async fn forget(&mut self) {
        self.user = None;
        self.session_id = None;
        let _ = self
            .storage
            .remove(SESSION_KEY)
            .await
            .tap_err(|e| error!("Failed to clear session id: {:?}", e));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn offline_session(dir: &tempfile::TempDir) -> AuthSession {
        AuthSession::new(
            Client::with_base_url("http://127.0.0.1:9/api"),
            LocalStorage::new(dir.path()),
        )
    }

    #[tokio::test]
    async fn test_restore_without_saved_id() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = offline_session(&dir);
        assert!(!session.restore().await);
        assert!(!session.is_authenticated());
    }

    #[tokio::test]
    async fn test_unverifiable_saved_id_is_dropped() -> eyre::Result<()> {
        let dir = tempfile::tempdir()?;
        let storage = LocalStorage::new(dir.path());
        storage.set(SESSION_KEY, "stale").await?;

        let mut session = offline_session(&dir);
        assert!(!session.restore().await);
        assert!(storage.get::<String>(SESSION_KEY).await.is_none());
        Ok(())
    }

    #[tokio::test]
    async fn test_login_while_offline_reports_network_error() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = offline_session(&dir);
        let err = session.login("ann@x.com", "pw").await.unwrap_err();
        assert!(matches!(err, ClientError::Network(_)));
        assert!(session.session_id().is_none());
    }

    #[tokio::test]
    async fn test_update_profile_requires_login() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = offline_session(&dir);
        let err = session.update_profile("Ann", "ann@x.com").await.unwrap_err();
        assert!(matches!(err, ClientError::NotAuthenticated));
    }

    #[tokio::test]
    async fn test_logout_offline_still_logs_out() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = offline_session(&dir);
        session.logout().await;
        assert!(!session.is_authenticated());
    }
}
