use log::debug;
use reqwest::{Client as ReqwestClient, Method};
use serde::de::DeserializeOwned;
use serde::Serialize;

use types::domain::*;

use crate::error::{ClientError, ClientResult};

pub const BASE_URL: &str = "http://localhost:5000/api";

#[derive(Debug, Clone)]
pub struct Client {
    pub client: ReqwestClient,
    base_url: String,
}

impl Default for Client {
    fn default() -> Self {
        Self::new()
    }
}

impl Client {
    pub fn new() -> Self {
        Self::with_base_url(BASE_URL)
    }

    /// `base_url` includes the `/api` prefix, e.g. `http://localhost:5000/api`.
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            client: ReqwestClient::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn signup(&self, request: &SignupRequest) -> ClientResult<AuthResponse> {
        self.send(Method::POST, "/auth/signup", request).await
    }

    pub async fn login(&self, request: &LoginRequest) -> ClientResult<AuthResponse> {
        self.send(Method::POST, "/auth/login", request).await
    }

    pub async fn logout(&self, session_id: &str) -> ClientResult<MessageResponse> {
        self.send(Method::POST, "/auth/logout", &session_request(session_id))
            .await
    }

    pub async fn verify(&self, session_id: &str) -> ClientResult<User> {
        let response: UserResponse = self
            .send(Method::POST, "/auth/verify", &session_request(session_id))
            .await?;
        Ok(response.user)
    }

    pub async fn update_profile(
        &self,
        session_id: &str,
        name: &str,
        email: &str,
    ) -> ClientResult<User> {
        let request = UpdateProfileRequest {
            session_id: Some(session_id.to_string()),
            name: name.to_string(),
            email: email.to_string(),
        };
        let response: UserResponse = self.send(Method::PUT, "/auth/profile", &request).await?;
        Ok(response.user)
    }

    pub async fn get_tasks(&self, session_id: &str) -> ClientResult<Vec<Task>> {
        let response: TasksResponse = self
            .send(Method::POST, "/tasks/get", &session_request(session_id))
            .await?;
        Ok(response.tasks)
    }

    pub async fn save_tasks(&self, session_id: &str, tasks: &[Task]) -> ClientResult<()> {
        let request = SaveTasksRequest {
            session_id: Some(session_id.to_string()),
            tasks: tasks.to_vec(),
        };
        let _: MessageResponse = self.send(Method::POST, "/tasks/save", &request).await?;
        Ok(())
    }

    async fn send<B: Serialize, R: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: &B,
    ) -> ClientResult<R> {
        let url = format!("{}{}", self.base_url, path);
        debug!("{} {}", method, url);
        let response = self.client.request(method, url).json(body).send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response.json().await?);
        }

        let text = response.text().await?;
        let message = serde_json::from_str::<MessageResponse>(&text)
            .map(|body| body.message)
            .unwrap_or(text);
        Err(ClientError::Api {
            status: status.as_u16(),
            message,
        })
    }
}

fn session_request(session_id: &str) -> SessionRequest {
    SessionRequest {
        session_id: Some(session_id.to_string()),
    }
}
