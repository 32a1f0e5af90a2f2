//! Shared harness: a registry served on an ephemeral port

#![allow(dead_code)]

use std::sync::Arc;

use compliance_registry::{create_router, AppState, KeyManager, MemoryStore, RegistryConfig};
use tempfile::TempDir;

pub const ADMIN_KEY: &str = "test-admin-key";

pub struct TestServer {
    pub base_url: String,
    pub client: reqwest::Client,
    pub store: Arc<MemoryStore>,
    pub keys: Arc<KeyManager>,
    _key_dir: TempDir,
}

impl TestServer {
    /// Start a registry with a fresh key and an empty in-memory store
    pub async fn spawn() -> Self {
        let key_dir = TempDir::new().unwrap();
        let config =
            RegistryConfig::for_testing(ADMIN_KEY, key_dir.path().join("private_key.bin"));

        let keys = Arc::new(KeyManager::new(config.private_key_path.clone()));
        keys.obtain_signing_key().unwrap();

        let store = Arc::new(MemoryStore::new());
        let state = Arc::new(AppState::new(config, Arc::clone(&keys), store.clone()));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, create_router(state)).await.unwrap();
        });

        Self {
            base_url: format!("http://{addr}"),
            client: reqwest::Client::new(),
            store,
            keys,
            _key_dir: key_dir,
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Registry public key as lowercase hex
    pub fn public_key_hex(&self) -> String {
        self.keys.public_key().unwrap().to_hex()
    }

    /// POST /admin/domains with the admin key
    pub async fn create(&self, domain: &str, level: &str) -> reqwest::Response {
        self.client
            .post(self.url("/admin/domains"))
            .header("X-Admin-Key", ADMIN_KEY)
            .json(&serde_json::json!({
                "domain_name": domain,
                "compliance_level": level,
            }))
            .send()
            .await
            .unwrap()
    }

    /// Create a domain and return its JSON body, asserting 201
    pub async fn create_ok(&self, domain: &str, level: &str) -> serde_json::Value {
        let response = self.create(domain, level).await;
        assert_eq!(response.status(), 201, "creating {domain}");
        response.json().await.unwrap()
    }

    pub async fn verify(&self, domain: &str) -> reqwest::Response {
        self.client
            .get(self.url("/verify"))
            .query(&[("domain", domain)])
            .send()
            .await
            .unwrap()
    }
}
