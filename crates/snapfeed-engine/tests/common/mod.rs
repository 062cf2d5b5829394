//! Shared harness: the in-memory collaborators wrapped with call counters and
//! switchable failures.

#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::{Map, Value};
use uuid::Uuid;

use snapfeed_core::domain::{Post, User, UserId, now_millis};
use snapfeed_core::ports::{
    AuthError, AuthProvider, BlobStorage, Collection, Document, DocumentStore, FieldUpdate,
    Filter, PasswordService, StorageError, StoreError, StoredRef,
};
use snapfeed_engine::{Engine, EngineConfig};
use snapfeed_infra::{
    InMemoryAuthProvider, InMemoryBlobStorage, InMemoryDocumentStore, JwtSessionTokens,
    SessionTokenConfig,
};

pub const PASSWORD: &str = "secret-pw";

/// Skips Argon2 so tests stay fast.
struct PlainPasswords;

impl PasswordService for PlainPasswords {
    fn check_credentials(&self, _email: &str, _password: &str) -> Result<(), AuthError> {
        Ok(())
    }

    fn hash(&self, password: &str) -> Result<String, AuthError> {
        Ok(format!("plain:{password}"))
    }

    fn verify(&self, password: &str, hash: &str) -> Result<bool, AuthError> {
        Ok(hash == format!("plain:{password}"))
    }
}

pub struct CountingAuth {
    pub inner: InMemoryAuthProvider,
    calls: AtomicUsize,
    pub fail_create: AtomicBool,
}

impl CountingAuth {
    fn new() -> Self {
        Self {
            inner: InMemoryAuthProvider::new(
                Arc::new(PlainPasswords),
                Arc::new(JwtSessionTokens::new(SessionTokenConfig::default())),
            ),
            calls: AtomicUsize::new(0),
            fail_create: AtomicBool::new(false),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn tick(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl AuthProvider for CountingAuth {
    async fn current_session(&self) -> Option<UserId> {
        self.tick();
        self.inner.current_session().await
    }

    async fn create_account(&self, email: &str, password: &str) -> Result<UserId, AuthError> {
        self.tick();
        if self.fail_create.load(Ordering::SeqCst) {
            return Err(AuthError::Unavailable("provider offline".to_string()));
        }
        self.inner.create_account(email, password).await
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<UserId, AuthError> {
        self.tick();
        self.inner.sign_in(email, password).await
    }

    async fn sign_out(&self) {
        self.tick();
        self.inner.sign_out().await
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreCall {
    Get,
    Query,
    Set,
    Update,
    Batch,
}

type Probe = Box<dyn Fn(&Filter) + Send + Sync>;

pub struct FlakyStore {
    pub inner: InMemoryDocumentStore,
    calls: Mutex<HashMap<StoreCall, usize>>,
    failing: Mutex<HashSet<StoreCall>>,
    probe: Mutex<Option<Probe>>,
}

impl FlakyStore {
    fn new() -> Self {
        Self {
            inner: InMemoryDocumentStore::new(),
            calls: Mutex::new(HashMap::new()),
            failing: Mutex::new(HashSet::new()),
            probe: Mutex::new(None),
        }
    }

    pub fn calls(&self, call: StoreCall) -> usize {
        self.calls.lock().unwrap().get(&call).copied().unwrap_or(0)
    }

    pub fn total_calls(&self) -> usize {
        self.calls.lock().unwrap().values().sum()
    }

    pub fn fail(&self, call: StoreCall) {
        self.failing.lock().unwrap().insert(call);
    }

    pub fn heal(&self) {
        self.failing.lock().unwrap().clear();
    }

    /// Run `probe` on every query before it executes.
    pub fn on_query(&self, probe: impl Fn(&Filter) + Send + Sync + 'static) {
        *self.probe.lock().unwrap() = Some(Box::new(probe));
    }

    fn enter(&self, call: StoreCall) -> Result<(), StoreError> {
        *self.calls.lock().unwrap().entry(call).or_default() += 1;
        if self.failing.lock().unwrap().contains(&call) {
            return Err(StoreError::Connection("store unreachable".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl DocumentStore for FlakyStore {
    async fn get(&self, collection: Collection, id: &str) -> Result<Option<Document>, StoreError> {
        self.enter(StoreCall::Get)?;
        self.inner.get(collection, id).await
    }

    async fn query(
        &self,
        collection: Collection,
        filter: Filter,
    ) -> Result<Vec<Document>, StoreError> {
        self.enter(StoreCall::Query)?;
        {
            let probe = self.probe.lock().unwrap();
            if let Some(probe) = probe.as_ref() {
                probe(&filter);
            }
        }
        self.inner.query(collection, filter).await
    }

    async fn set(&self, collection: Collection, id: &str, data: Value) -> Result<(), StoreError> {
        self.enter(StoreCall::Set)?;
        self.inner.set(collection, id, data).await
    }

    async fn update(
        &self,
        collection: Collection,
        id: &str,
        fields: Map<String, Value>,
    ) -> Result<(), StoreError> {
        self.enter(StoreCall::Update)?;
        self.inner.update(collection, id, fields).await
    }

    async fn batch_update(
        &self,
        collection: Collection,
        updates: Vec<FieldUpdate>,
    ) -> Result<(), StoreError> {
        self.enter(StoreCall::Batch)?;
        self.inner.batch_update(collection, updates).await
    }
}

pub struct FlakyBlobs {
    pub inner: InMemoryBlobStorage,
    pub fail_upload: AtomicBool,
    pub fail_resolve: AtomicBool,
}

impl FlakyBlobs {
    fn new() -> Self {
        Self {
            inner: InMemoryBlobStorage::new("https://cdn.test"),
            fail_upload: AtomicBool::new(false),
            fail_resolve: AtomicBool::new(false),
        }
    }
}

#[async_trait]
impl BlobStorage for FlakyBlobs {
    async fn upload(&self, key: &str, blob: Vec<u8>) -> Result<StoredRef, StorageError> {
        // Give concurrently joined operations a chance to interleave
        tokio::task::yield_now().await;
        if self.fail_upload.load(Ordering::SeqCst) {
            return Err(StorageError::Upload("quota exceeded".to_string()));
        }
        self.inner.upload(key, blob).await
    }

    async fn resolve_url(&self, stored: &StoredRef) -> Result<String, StorageError> {
        if self.fail_resolve.load(Ordering::SeqCst) {
            return Err(StorageError::Connection("timeout".to_string()));
        }
        self.inner.resolve_url(stored).await
    }
}

pub struct Harness {
    pub engine: Engine,
    pub auth: Arc<CountingAuth>,
    pub store: Arc<FlakyStore>,
    pub blobs: Arc<FlakyBlobs>,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_config(EngineConfig::default())
    }

    pub fn with_config(config: EngineConfig) -> Self {
        let auth = Arc::new(CountingAuth::new());
        let store = Arc::new(FlakyStore::new());
        let blobs = Arc::new(FlakyBlobs::new());
        let engine = Engine::new(auth.clone(), store.clone(), blobs.clone(), config);
        Self {
            engine,
            auth,
            store,
            blobs,
        }
    }

    /// Engine sharing this harness's collaborators, as after an app restart.
    pub fn restart(&self) -> Engine {
        Engine::new(
            self.auth.clone(),
            self.store.clone(),
            self.blobs.clone(),
            EngineConfig::default(),
        )
    }

    pub async fn sign_up(&self, username: &str) -> User {
        self.engine
            .profiles()
            .sign_up(username, &format!("{username}@example.com"), PASSWORD)
            .await
            .expect("sign up")
    }

    /// Write a user document directly, bypassing the engine.
    pub async fn seed_user(&self, username: &str) -> UserId {
        let user_id = Uuid::new_v4().to_string();
        let user = User {
            username: Some(username.to_string()),
            ..User::new(user_id.clone())
        };
        self.store
            .inner
            .set(
                Collection::Users,
                &user_id,
                serde_json::to_value(&user).unwrap(),
            )
            .await
            .unwrap();
        user_id
    }

    /// Write a post directly, `age_hours` old.
    pub async fn seed_post(&self, user_id: &str, caption: &str, age_hours: i64) -> Post {
        let author = User {
            username: Some(format!("user-{}", &user_id[..4.min(user_id.len())])),
            ..User::new(user_id)
        };
        let mut post = Post::new(
            &author,
            "https://cdn.test/images/seeded".to_string(),
            caption.to_string(),
            caption.split_whitespace().map(str::to_lowercase).collect(),
        );
        post.time = now_millis() - age_hours * 3_600_000;
        self.store
            .inner
            .set(
                Collection::Posts,
                &post.post_id.to_string(),
                serde_json::to_value(&post).unwrap(),
            )
            .await
            .unwrap();
        post
    }

    pub async fn stored_post(&self, post: &Post) -> Post {
        self.store
            .inner
            .get(Collection::Posts, &post.post_id.to_string())
            .await
            .unwrap()
            .expect("post stored")
            .decode()
            .unwrap()
    }

    pub async fn stored_user(&self, user_id: &str) -> Option<Value> {
        self.store
            .inner
            .get(Collection::Users, user_id)
            .await
            .unwrap()
            .map(|doc| doc.data)
    }

    pub fn notification(&self) -> Option<String> {
        self.engine.state().last_notification()
    }
}

pub fn image() -> Vec<u8> {
    vec![0xFF, 0xD8, 0xFF, 0xE0]
}

pub fn post_ids(posts: &[Post]) -> Vec<Uuid> {
    posts.iter().map(|p| p.post_id).collect()
}
