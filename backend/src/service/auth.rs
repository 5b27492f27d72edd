use std::time::Duration as StdDuration;

use bcrypt::{hash, verify};
use chrono::{Duration, Utc};
use eyre::{ensure, Result};
use log::{debug, error, info, warn};
use tap::TapFallible;
use tokio::task::{spawn_blocking, JoinHandle};

use crate::domain::auth::Session;
use crate::domain::user::StoredUser;
use crate::repository::sessions::SessionRepository;
use crate::repository::users::UserRepository;
use types::error::Error;

#[derive(Clone)]
pub struct AuthService {
    pub user_repository: UserRepository,
    pub session_repository: SessionRepository,
    pub session_ttl: Duration,
    pub bcrypt_cost: u32,
}

impl AuthService {
    pub async fn signup(
        &self,
        name: String,
        email: String,
        password: String,
    ) -> Result<(StoredUser, Session)> {
        ensure!(
            !self.user_repository.exists(&email),
            Error::EmailAlreadyRegistered
        );
        let cost = self.bcrypt_cost;
        let hashed_password = spawn_blocking(move || hash(password, cost)).await??;
        // No rollback: a failed session write leaves the user registered.
        let user = self
            .user_repository
            .create_user(name, email, hashed_password)
            .await?;
        let session = self.start_session(&user).await?;
        info!("User {} signed up", user.id);
        Ok((user, session))
    }

    pub async fn login(&self, email: String, password: String) -> Result<(StoredUser, Session)> {
        let user = self
            .user_repository
            .get_by_email(&email)
            .ok_or(Error::InvalidCredentials)?;
        let digest = user.hashed_password.clone();
        let matches = spawn_blocking(move || verify(password, &digest))
            .await?
            .tap_err(|e| warn!("Unreadable password digest for user {}: {}", user.id, e))
            .unwrap_or(false);
        ensure!(matches, Error::InvalidCredentials);

        let session = self.start_session(&user).await?;
        info!("User {} logged in", user.id);
        Ok((user, session))
    }

    pub async fn logout(&self, token: Option<String>) -> Result<()> {
        if let Some(token) = token {
            let removed = self.session_repository.delete(&token).await?;
            debug!("Logout for known session: {}", removed);
        }
        Ok(())
    }

    /// A session is usable while it exists and has not passed its expiry.
    pub fn authenticate(&self, token: Option<&str>) -> Result<Session> {
        let session = token
            .and_then(|token| self.session_repository.get_by_session_token(token))
            .ok_or(Error::InvalidSession)?;
        ensure!(!session.is_expired_at(Utc::now()), Error::SessionExpired);
        Ok(session)
    }

    pub fn verify(&self, token: Option<&str>) -> Result<StoredUser> {
        let session = self.authenticate(token)?;
        let user = self
            .user_repository
            .get(&session.user_id)
            .ok_or(Error::UserNotFound)?;
        Ok(user)
    }

    pub async fn purge_expired_sessions(&self) -> Result<usize> {
        self.session_repository.purge_expired(Utc::now()).await
    }

    pub fn spawn_session_sweeper(&self, period: StdDuration) -> JoinHandle<()> {
        let service = self.clone();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            loop {
                interval.tick().await;
                match service.purge_expired_sessions().await {
                    Ok(0) => {}
                    Ok(purged) => info!("Purged {} expired sessions", purged),
                    Err(e) => error!("Session sweep failed: {:?}", e),
                }
            }
        })
    }

    async fn start_session(&self, user: &StoredUser) -> Result<Session> {
        self.session_repository
            .insert(Session::new(user.id.clone(), self.session_ttl))
            .await
    }
}
