use eyre::Result;
use serde_json::{json, Value};

use client::client::Client;
use client::error::ClientError;
use client::session::AuthSession;
use types::domain::{LoginRequest, Priority, Task};

use crate::domain::{TestUser, PASSWORD};
use crate::util::{random_email, TestServer};

async fn post(server: &TestServer, path: &str, body: Value) -> Result<(u16, Value)> {
    let response = reqwest::Client::new()
        .post(server.url(path))
        .json(&body)
        .send()
        .await?;
    let status = response.status().as_u16();
    Ok((status, response.json().await?))
}

#[tokio::test]
async fn test_signup_and_login() -> Result<()> {
    let server = TestServer::start().await?;
    let ann = TestUser::new(&server, "Ann").await?;
    assert!(ann.user.id.starts_with("user_"));

    let response = server
        .client()
        .login(&LoginRequest {
            email: ann.email.clone(),
            password: PASSWORD.to_string(),
        })
        .await?;
    assert_eq!(response.user, ann.user);
    assert_ne!(response.session_id, ann.session_id());

    let err = server
        .client()
        .login(&LoginRequest {
            email: ann.email.clone(),
            password: "wrong".to_string(),
        })
        .await
        .unwrap_err();
    assert_eq!(err.status(), Some(401));
    assert_eq!(err.to_string(), "Invalid email or password");
    Ok(())
}

#[tokio::test]
async fn test_duplicate_email_is_rejected() -> Result<()> {
    let server = TestServer::start().await?;
    let ann = TestUser::new(&server, "Ann").await?;

    let (status, body) = post(
        &server,
        "/auth/signup",
        json!({ "name": "Impostor", "email": ann.email, "password": "x" }),
    )
    .await?;
    assert_eq!(status, 400);
    assert_eq!(
        body,
        json!({ "success": false, "message": "Email already registered" })
    );
    Ok(())
}

#[tokio::test]
async fn test_task_store_syncs_to_backend() -> Result<()> {
    let server = TestServer::start().await?;
    let ann = TestUser::new(&server, "Ann").await?;

    let mut store = ann.task_store().await;
    assert!(store.tasks().is_empty());
    store.add("buy milk", Priority::High).await;
    let bread = store.add("bake bread", Priority::Low).await;
    store.toggle(&bread.map(|task| task.id).unwrap_or_default()).await;

    // The server stamps the owner; everything else comes back as pushed.
    let reopened = ann.task_store().await;
    let unowned = |tasks: &[Task]| {
        tasks
            .iter()
            .map(|task| Task {
                user_id: None,
                ..task.clone()
            })
            .collect::<Vec<_>>()
    };
    assert_eq!(unowned(reopened.tasks()), unowned(store.tasks()));
    assert!(reopened
        .tasks()
        .iter()
        .all(|task| task.user_id.as_deref() == Some(ann.user.id.as_str())));

    store.delete_completed().await;
    let remote = server.client().get_tasks(&ann.session_id()).await?;
    assert_eq!(remote.len(), 1);
    assert_eq!(remote[0].text, "buy milk");
    Ok(())
}

#[tokio::test]
async fn test_users_do_not_see_each_others_tasks() -> Result<()> {
    let server = TestServer::start().await?;
    let ann = TestUser::new(&server, "Ann").await?;
    let bob = TestUser::new(&server, "Bob").await?;
    let client = server.client();

    client
        .save_tasks(&ann.session_id(), &[Task::new("ann's", Priority::Medium)])
        .await?;
    client
        .save_tasks(&bob.session_id(), &[Task::new("bob's", Priority::Medium)])
        .await?;

    // Replacing with an empty list removes only the caller's tasks.
    client.save_tasks(&ann.session_id(), &[]).await?;
    assert!(client.get_tasks(&ann.session_id()).await?.is_empty());

    let bobs = client.get_tasks(&bob.session_id()).await?;
    assert_eq!(bobs.len(), 1);
    assert_eq!(bobs[0].text, "bob's");
    Ok(())
}

#[tokio::test]
async fn test_requests_without_valid_session_are_401() -> Result<()> {
    let server = TestServer::start().await?;

    for path in ["/auth/verify", "/tasks/get"] {
        let (status, body) = post(&server, path, json!({ "sessionId": "bogus" })).await?;
        assert_eq!(status, 401, "{}", path);
        assert_eq!(body["success"], false);
    }

    let (status, _) = post(&server, "/tasks/save", json!({ "tasks": [] })).await?;
    assert_eq!(status, 401);
    Ok(())
}

#[tokio::test]
async fn test_missing_fields_are_400() -> Result<()> {
    let server = TestServer::start().await?;

    let (status, body) = post(&server, "/auth/signup", json!({ "email": random_email() })).await?;
    assert_eq!(status, 400);
    assert_eq!(body["message"], "All fields are required");

    let (status, body) = post(&server, "/auth/login", json!({})).await?;
    assert_eq!(status, 400);
    assert_eq!(body["message"], "Email and password required");
    Ok(())
}

#[tokio::test]
async fn test_logout_is_idempotent_and_ends_session() -> Result<()> {
    let server = TestServer::start().await?;
    let mut ann = TestUser::new(&server, "Ann").await?;
    let session_id = ann.session_id();

    ann.session.logout().await;
    assert!(!ann.session.is_authenticated());

    let (status, body) = post(&server, "/auth/logout", json!({ "sessionId": session_id })).await?;
    assert_eq!(status, 200);
    assert_eq!(body["success"], true);

    let err = server.client().verify(&session_id).await.unwrap_err();
    assert!(matches!(err, ClientError::Api { status: 401, .. }));
    Ok(())
}

#[tokio::test]
async fn test_saved_session_is_restored() -> Result<()> {
    let server = TestServer::start().await?;
    let ann = TestUser::new(&server, "Ann").await?;

    let mut relaunched = AuthSession::new(server.client(), ann.storage.clone());
    assert!(relaunched.restore().await);
    assert_eq!(relaunched.user(), Some(&ann.user));
    assert_eq!(relaunched.session_id(), Some(ann.session_id().as_str()));
    Ok(())
}

#[tokio::test]
async fn test_profile_update() -> Result<()> {
    let server = TestServer::start().await?;
    let mut ann = TestUser::new(&server, "Ann").await?;
    let bob = TestUser::new(&server, "Bob").await?;

    let err = ann
        .session
        .update_profile("Ann", &bob.email)
        .await
        .unwrap_err();
    assert_eq!(err.status(), Some(400));
    assert_eq!(err.to_string(), "Email already in use");

    let new_email = random_email();
    let user = ann.session.update_profile("Annie", &new_email).await?;
    assert_eq!(user.id, ann.user.id);
    assert_eq!(user.name, "Annie");
    assert_eq!(ann.session.user(), Some(&user));

    let response = server
        .client()
        .login(&LoginRequest {
            email: new_email,
            password: PASSWORD.to_string(),
        })
        .await?;
    assert_eq!(response.user.name, "Annie");
    Ok(())
}

#[tokio::test]
async fn test_data_survives_restart() -> Result<()> {
    let server = TestServer::start().await?;
    let ann = TestUser::new(&server, "Ann").await?;
    server
        .client()
        .save_tasks(&ann.session_id(), &[Task::new("persisted", Priority::High)])
        .await?;

    let restarted = Client::with_base_url(server.restart().await?);
    assert_eq!(restarted.verify(&ann.session_id()).await?, ann.user);
    let tasks = restarted.get_tasks(&ann.session_id()).await?;
    assert_eq!(tasks.len(), 1);
    assert_eq!(tasks[0].text, "persisted");
    assert_eq!(tasks[0].priority, Priority::High);
    Ok(())
}
