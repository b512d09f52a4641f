//! Test server and client helpers.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use contact_service::http::{self, AppState};
use contact_service::{
    Contact, ContactService, ContactStore, GroupService, InMemoryStore, NewContact, RecordId,
    StoreError, StoreResult, Version,
};
use reqwest::{Client, Response};
use serde_json::Value;
use tokio::time::Instant;

pub struct TestApp {
    pub base: String,
    pub client: Client,
}

/// Bind to port 0 and serve `state` in the background.
pub async fn start_server(state: AppState) -> TestApp {
    let app = http::router(state);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    TestApp {
        base: format!("http://{addr}"),
        client: Client::new(),
    }
}

pub async fn spawn_app() -> TestApp {
    start_server(AppState::in_memory()).await
}

impl TestApp {
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base, path)
    }

    pub async fn create_contact(&self, full_name: &str, phone: &str) -> Value {
        let resp = self
            .client
            .post(self.url("/contact"))
            .json(&serde_json::json!({ "full_name": full_name, "phone": phone }))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 201);
        let body: Value = resp.json().await.unwrap();
        body["contact"].clone()
    }

    pub async fn create_group(&self, group_name: &str) -> Value {
        let resp = self
            .client
            .post(self.url("/group"))
            .json(&serde_json::json!({ "group_name": group_name }))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 201);
        let body: Value = resp.json().await.unwrap();
        body["group"].clone()
    }
}

/// Status plus decoded body.
pub async fn read(resp: Response) -> (u16, Value) {
    let status = resp.status().as_u16();
    let body = resp.json().await.unwrap();
    (status, body)
}

/// Holds every call well past any test timeout.
pub struct StalledContacts;

#[async_trait]
impl ContactStore for StalledContacts {
    async fn create(&self, _: &NewContact, _: Instant) -> StoreResult<Contact> {
        tokio::time::sleep(Duration::from_secs(30)).await;
        Err(StoreError::DeadlineExceeded)
    }

    async fn get_by_id(&self, _: RecordId, _: Instant) -> StoreResult<Contact> {
        tokio::time::sleep(Duration::from_secs(30)).await;
        Err(StoreError::DeadlineExceeded)
    }

    async fn update(&self, _: &Contact, _: Instant) -> StoreResult<Version> {
        tokio::time::sleep(Duration::from_secs(30)).await;
        Err(StoreError::DeadlineExceeded)
    }

    async fn delete(&self, _: RecordId, _: Instant) -> StoreResult<()> {
        tokio::time::sleep(Duration::from_secs(30)).await;
        Err(StoreError::DeadlineExceeded)
    }
}

/// Contacts backed by [`StalledContacts`] with a 50 ms timeout, so every
/// contact call fails with an elapsed deadline.
pub fn stalled_contacts() -> AppState {
    AppState::new(
        ContactService::new(Arc::new(StalledContacts)).with_timeout(Duration::from_millis(50)),
        GroupService::new(Arc::new(InMemoryStore::new())),
    )
}
