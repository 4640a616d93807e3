#![allow(dead_code)]

use std::sync::Arc;

use anyhow::{Context, Result};
use reqwest::StatusCode;
use serde_json::{json, Value};

use forumhub_api::config::AppConfig;
use forumhub_api::database::MemoryStore;
use forumhub_api::AppState;

pub const TEST_SECRET: &str = "integration-test-secret";
pub const PASSWORD: &str = "senha-segura-123";

/// A server running in-process on an ephemeral port, backed by the memory store.
pub struct TestApp {
    pub base_url: String,
    pub state: AppState,
    pub client: reqwest::Client,
}

pub async fn spawn_app() -> Result<TestApp> {
    let state = AppState::new(AppConfig::for_memory(TEST_SECRET), Arc::new(MemoryStore::new()))
        .context("failed to build app state")?;

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .context("failed to bind ephemeral port")?;
    let addr = listener.local_addr()?;

    let router = forumhub_api::app(state.clone());
    tokio::spawn(async move {
        axum::serve(listener, router).await.ok();
    });

    Ok(TestApp {
        base_url: format!("http://{}", addr),
        state,
        client: reqwest::Client::new(),
    })
}

impl TestApp {
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub async fn register(&self, name: &str, email: &str) -> Result<Value> {
        let res = self
            .client
            .post(self.url("/usuarios"))
            .json(&json!({ "nome": name, "email": email, "senha": PASSWORD }))
            .send()
            .await?;
        anyhow::ensure!(res.status() == StatusCode::CREATED, "register failed: {}", res.status());
        let body: Value = res.json().await?;
        Ok(body["data"].clone())
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<reqwest::Response> {
        Ok(self
            .client
            .post(self.url("/auth"))
            .json(&json!({ "email": email, "senha": password }))
            .send()
            .await?)
    }

    /// Register `email` and return a bearer token for it.
    pub async fn member(&self, name: &str, email: &str) -> Result<String> {
        self.register(name, email).await?;
        let res = self.login(email, PASSWORD).await?;
        anyhow::ensure!(res.status() == StatusCode::OK, "login failed: {}", res.status());
        let body: Value = res.json().await?;
        body["data"]["token"]
            .as_str()
            .map(str::to_string)
            .context("login response carried no token")
    }

    pub async fn create_topic(&self, token: &str, title: &str, message: &str, course: &str) -> Result<Value> {
        let res = self
            .client
            .post(self.url("/topicos"))
            .bearer_auth(token)
            .json(&json!({ "titulo": title, "mensagem": message, "curso": course }))
            .send()
            .await?;
        anyhow::ensure!(res.status() == StatusCode::CREATED, "create topic failed: {}", res.status());
        let body: Value = res.json().await?;
        Ok(body["data"].clone())
    }
}
