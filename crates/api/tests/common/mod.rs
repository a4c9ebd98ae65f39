#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Method, Request, Response, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

use cursus_api::auth::jwt::JwtConfig;
use cursus_api::auth::password::hash_password;
use cursus_api::completion::ResourceExtractor;
use cursus_api::config::{ServerConfig, StoreBackend};
use cursus_api::inflight::InFlightSet;
use cursus_api::router::build_app_router;
use cursus_api::state::AppState;
use cursus_api::storage::LocalFileStorage;
use cursus_core::catalog::CreateUserProfile;
use cursus_db::models::credential::CreateCredential;
use cursus_db::repositories::{AdminRepo, CredentialRepo, UserRepo};
use cursus_db::store::{
    Data, Document, DocumentStore, Filter, MemoryDocumentStore, Query, StoreError,
};

pub const ADMIN_EMAIL: &str = "admin@univ.dz";
pub const ADMIN_PASSWORD: &str = "motdepasse-admin";

/// A router over a fresh in-memory store and a temporary file root.
pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    /// Keeps the storage root alive for the duration of the test.
    pub storage: TempDir,
}

impl TestApp {
    /// A clone of the router for one `oneshot` request.
    pub fn app(&self) -> Router {
        self.router.clone()
    }
}

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config(storage_root: &std::path::Path) -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        store: StoreBackend::Memory,
        storage_root: storage_root.to_path_buf(),
        public_base_url: "http://localhost:3000".to_string(),
        max_upload_bytes: 1024,
        jwt: JwtConfig {
            secret: "test-secret-that-is-long-enough-for-hs256".to_string(),
            access_token_expiry_mins: 60,
        },
        completion: None,
        bootstrap_admin: None,
    }
}

/// Build the full application router with all middleware layers.
pub fn build_test_app() -> TestApp {
    build_test_app_with_extractor(None)
}

/// Like [`build_test_app`], with a bulk-import extractor installed.
pub fn build_test_app_with_extractor(extractor: Option<Arc<dyn ResourceExtractor>>) -> TestApp {
    build(Arc::new(MemoryDocumentStore::new()), extractor)
}

/// Like [`build_test_app`], over the given store.
pub fn build_test_app_with_store(store: Arc<dyn DocumentStore>) -> TestApp {
    build(store, None)
}

fn build(store: Arc<dyn DocumentStore>, extractor: Option<Arc<dyn ResourceExtractor>>) -> TestApp {
    let storage = tempfile::tempdir().expect("tempdir");
    let config = test_config(storage.path());

    let state = AppState {
        store,
        files: Arc::new(LocalFileStorage::new(
            storage.path(),
            config.public_base_url.clone(),
        )),
        config: Arc::new(config.clone()),
        extractor,
        admin_toggles: InFlightSet::new(),
    };

    TestApp {
        router: build_app_router(state.clone(), &config),
        state,
        storage,
    }
}

/// In-memory store whose writes to chosen collections fail.
pub struct FailingWrites {
    inner: MemoryDocumentStore,
    refused: Mutex<HashSet<String>>,
}

impl FailingWrites {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            inner: MemoryDocumentStore::new(),
            refused: Mutex::new(HashSet::new()),
        })
    }

    pub fn fail_writes_to(&self, collection: &str) {
        self.refused.lock().unwrap().insert(collection.to_string());
    }

    fn check(&self, collection: &str, id: &str) -> Result<(), StoreError> {
        if self.refused.lock().unwrap().contains(collection) {
            return Err(StoreError::Decode {
                collection: collection.to_string(),
                id: id.to_string(),
                reason: "write refused".into(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl DocumentStore for FailingWrites {
    async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>, StoreError> {
        self.inner.get(collection, id).await
    }

    async fn query(&self, query: &Query) -> Result<Vec<Document>, StoreError> {
        self.inner.query(query).await
    }

    async fn count(&self, collection: &str, filters: &[Filter]) -> Result<u64, StoreError> {
        self.inner.count(collection, filters).await
    }

    async fn insert(
        &self,
        collection: &str,
        id: Option<&str>,
        data: Data,
    ) -> Result<Document, StoreError> {
        self.check(collection, id.unwrap_or_default())?;
        self.inner.insert(collection, id, data).await
    }

    async fn merge(
        &self,
        collection: &str,
        id: &str,
        patch: Data,
    ) -> Result<Option<Document>, StoreError> {
        self.check(collection, id)?;
        self.inner.merge(collection, id, patch).await
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<bool, StoreError> {
        self.inner.delete(collection, id).await
    }

    async fn health_check(&self) -> Result<(), StoreError> {
        self.inner.health_check().await
    }
}

// ---------------------------------------------------------------------------
// Seeding
// ---------------------------------------------------------------------------

/// Create a credential and profile directly in the store, returning the uid.
pub async fn seed_user(state: &AppState, email: &str, password: &str, admin: bool) -> String {
    let uid = uuid::Uuid::new_v4().to_string();
    CredentialRepo::create(
        state.store(),
        &CreateCredential {
            uid: uid.clone(),
            email: email.to_string(),
            password_hash: hash_password(password).expect("hashing should succeed"),
        },
    )
    .await
    .expect("credential creation should succeed");

    let profile = CreateUserProfile {
        email: email.to_string(),
        password: password.to_string(),
        full_name: format!("Utilisateur {email}"),
        matricule: None,
        year: None,
        speciality: None,
    };
    UserRepo::create(state.store(), &uid, &profile)
        .await
        .expect("profile creation should succeed");

    if admin {
        AdminRepo::grant(state.store(), &uid, None)
            .await
            .expect("grant should succeed");
    }
    uid
}

/// Log in through the API and return the access token.
pub async fn login(app: Router, email: &str, password: &str) -> String {
    let body = serde_json::json!({ "email": email, "password": password });
    let response = post_json(app, "/api/v1/auth/login", body).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    json["access_token"]
        .as_str()
        .expect("access_token")
        .to_string()
}

/// Seed the default admin and log in, returning `(uid, token)`.
pub async fn admin_session(test: &TestApp) -> (String, String) {
    let uid = seed_user(&test.state, ADMIN_EMAIL, ADMIN_PASSWORD, true).await;
    let token = login(test.app(), ADMIN_EMAIL, ADMIN_PASSWORD).await;
    (uid, token)
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("body")
        .to_bytes();
    serde_json::from_slice(&bytes).expect("response body should be JSON")
}

async fn send(app: Router, request: Request<Body>) -> Response<Body> {
    app.oneshot(request).await.expect("request should complete")
}

fn json_request(method: Method, uri: &str, token: Option<&str>, body: Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json");
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }
    builder
        .body(Body::from(body.to_string()))
        .expect("request")
}

fn empty_request(method: Method, uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }
    builder.body(Body::empty()).expect("request")
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    send(app, empty_request(Method::GET, uri, None)).await
}

pub async fn get_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    send(app, empty_request(Method::GET, uri, Some(token))).await
}

pub async fn post_json(app: Router, uri: &str, body: Value) -> Response<Body> {
    send(app, json_request(Method::POST, uri, None, body)).await
}

pub async fn post_json_auth(app: Router, uri: &str, body: Value, token: &str) -> Response<Body> {
    send(app, json_request(Method::POST, uri, Some(token), body)).await
}

pub async fn post_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    send(app, empty_request(Method::POST, uri, Some(token))).await
}

pub async fn put_json_auth(app: Router, uri: &str, body: Value, token: &str) -> Response<Body> {
    send(app, json_request(Method::PUT, uri, Some(token), body)).await
}

pub async fn delete_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    send(app, empty_request(Method::DELETE, uri, Some(token))).await
}

/// POST a single-file `multipart/form-data` body under the `file` field.
pub async fn post_file_auth(
    app: Router,
    uri: &str,
    file_name: &str,
    bytes: &[u8],
    token: &str,
) -> Response<Body> {
    let boundary = "cursus-test-boundary";
    let mut body = Vec::new();
    body.extend_from_slice(format!("--{boundary}\r\n").as_bytes());
    body.extend_from_slice(
        format!("Content-Disposition: form-data; name=\"file\"; filename=\"{file_name}\"\r\n")
            .as_bytes(),
    );
    body.extend_from_slice(b"Content-Type: application/octet-stream\r\n\r\n");
    body.extend_from_slice(bytes);
    body.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());

    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(
            "content-type",
            format!("multipart/form-data; boundary={boundary}"),
        )
        .header("authorization", format!("Bearer {token}"))
        .body(Body::from(body))
        .expect("request");
    send(app, request).await
}
