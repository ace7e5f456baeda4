// Client session store: one owner for the current user and token

use std::sync::{Mutex, MutexGuard};

use tokio::sync::{watch, OnceCell};

use crate::auth::models::{AuthResponse, LoginRequest, RegisterRequest, UserResponse};
use crate::client::api::AuthApi;
use crate::client::error::ClientError;
use crate::client::state::{reduce, SessionAction, SessionState};
use crate::client::storage::TokenStorage;

/// What must still hold for a late result to be applied
enum Expect<'a> {
    Any,
    /// No logout since the call started
    Epoch(u64),
    /// No logout, and the token is still the one the call used
    Session(u64, Option<&'a str>),
}

struct Inner {
    state: SessionState,
    /// Bumped on every logout; results begun under an older epoch are dropped
    epoch: u64,
}

/// Holds the session and applies every change through [`reduce`]
///
/// Observers read snapshots with [`SessionStore::state`] or follow changes
/// through [`SessionStore::subscribe`].
pub struct SessionStore<A, S> {
    api: A,
    storage: S,
    inner: Mutex<Inner>,
    changes: watch::Sender<SessionState>,
    hydration: OnceCell<()>,
}

impl<A: AuthApi, S: TokenStorage> SessionStore<A, S> {
    /// Build a store seeded with whatever token the slot already holds
    pub fn new(api: A, storage: S) -> Self {
        let token = storage.load().unwrap_or_else(|e| {
            tracing::warn!("Could not read persisted token: {}", e);
            None
        });
        let state = SessionState::initial(token);
        let (changes, _) = watch::channel(state.clone());

        Self {
            api,
            storage,
            inner: Mutex::new(Inner { state, epoch: 0 }),
            changes,
            hydration: OnceCell::new(),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn state(&self) -> SessionState {
        self.lock().state.clone()
    }

    /// Current token, for attaching to outgoing requests
    pub fn token(&self) -> Option<String> {
        self.lock().state.token.clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.changes.subscribe()
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    /// Apply one transition and its persistence effect
    ///
    /// The action only lands if the session still matches `expect`.
    /// Returns whether it landed.
    fn dispatch(&self, action: SessionAction, expect: Expect<'_>) -> bool {
        let mut inner = self.lock();

        let current = match expect {
            Expect::Any => true,
            Expect::Epoch(epoch) => inner.epoch == epoch,
            Expect::Session(epoch, token) => {
                inner.epoch == epoch && inner.state.token.as_deref() == token
            }
        };
        if !current {
            tracing::debug!("Dropping stale session result");
            return false;
        }

        let persisted = match &action {
            SessionAction::LoginSuccess(auth) => self.storage.store(&auth.token),
            SessionAction::LoginFail | SessionAction::Logout => self.storage.clear(),
            SessionAction::UserLoaded(_) => Ok(()),
        };
        if let Err(e) = persisted {
            tracing::warn!("Token slot update failed: {}", e);
        }

        if matches!(action, SessionAction::Logout) {
            inner.epoch += 1;
        }

        inner.state = reduce(&inner.state, action);
        self.changes.send_replace(inner.state.clone());
        true
    }

    fn snapshot(&self) -> (u64, Option<String>) {
        let inner = self.lock();
        (inner.epoch, inner.state.token.clone())
    }

    /// Resolve the startup state exactly once
    ///
    /// A persisted token is revalidated through [`SessionStore::load_user`];
    /// concurrent callers wait on the same attempt.
    pub async fn init(&self) -> SessionState {
        self.hydration
            .get_or_init(|| async {
                let (epoch, token) = self.snapshot();
                match token {
                    Some(_) => {
                        if let Err(e) = self.load_user().await {
                            tracing::debug!("Session hydration failed: {}", e);
                        }
                    }
                    None => {
                        self.dispatch(SessionAction::LoginFail, Expect::Session(epoch, None));
                    }
                }
            })
            .await;

        self.state()
    }

    /// Revalidate the held token against the server
    pub async fn load_user(&self) -> Result<UserResponse, ClientError> {
        let (epoch, token) = self.snapshot();
        let Some(token) = token else {
            self.dispatch(SessionAction::LoginFail, Expect::Session(epoch, None));
            return Err(ClientError::NotAuthenticated);
        };

        let expect = Expect::Session(epoch, Some(token.as_str()));
        match self.api.me(&token).await {
            Ok(user) => {
                if self.dispatch(SessionAction::UserLoaded(user.clone()), expect) {
                    Ok(user)
                } else {
                    Err(ClientError::SessionChanged)
                }
            }
            Err(e) => {
                if self.dispatch(SessionAction::LoginFail, expect) {
                    Err(e)
                } else {
                    Err(ClientError::SessionChanged)
                }
            }
        }
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<UserResponse, ClientError> {
        let credentials = LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        };
        let (epoch, _) = self.snapshot();
        let result = self.api.login(&credentials).await;
        self.finish_sign_in(epoch, result)
    }

    pub async fn register(&self, data: RegisterRequest) -> Result<UserResponse, ClientError> {
        let (epoch, _) = self.snapshot();
        let result = self.api.register(&data).await;
        self.finish_sign_in(epoch, result)
    }

    fn finish_sign_in(
        &self,
        epoch: u64,
        result: Result<AuthResponse, ClientError>,
    ) -> Result<UserResponse, ClientError> {
        match result {
            Ok(auth) => {
                let user = auth.user.clone();
                if self.dispatch(SessionAction::LoginSuccess(auth), Expect::Epoch(epoch)) {
                    Ok(user)
                } else {
                    Err(ClientError::SessionChanged)
                }
            }
            Err(e) => {
                if self.dispatch(SessionAction::LoginFail, Expect::Epoch(epoch)) {
                    Err(e)
                } else {
                    Err(ClientError::SessionChanged)
                }
            }
        }
    }

    /// Forget the session locally; the server is not contacted
    pub fn logout(&self) {
        self.dispatch(SessionAction::Logout, Expect::Any);
        tracing::debug!("Session logged out");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::models::Role;
    use crate::client::storage::MemoryTokenStorage;
    use async_trait::async_trait;
    use chrono::Utc;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use tokio::sync::Notify;
    use uuid::Uuid;

    fn profile(email: &str) -> UserResponse {
        UserResponse {
            id: Uuid::new_v4(),
            email: email.into(),
            name: "A".into(),
            role: Role::User,
            created_at: Utc::now(),
        }
    }

    /// Server stand-in: known tokens map to users, one valid password
    #[derive(Default)]
    struct FakeApi {
        tokens: HashMap<String, UserResponse>,
        me_calls: AtomicUsize,
        /// When set, calls announce themselves on `.0` and wait for `.1`
        gate: Option<(Arc<Notify>, Arc<Notify>)>,
    }

    impl FakeApi {
        fn with_user(token: &str, user: UserResponse) -> Self {
            let mut api = Self::default();
            api.tokens.insert(token.into(), user);
            api
        }

        fn gated(mut self, entered: Arc<Notify>, release: Arc<Notify>) -> Self {
            self.gate = Some((entered, release));
            self
        }

        async fn pass_gate(&self) {
            if let Some((entered, release)) = &self.gate {
                entered.notify_one();
                release.notified().await;
            }
        }
    }

    #[async_trait]
    impl AuthApi for FakeApi {
        async fn login(&self, credentials: &LoginRequest) -> Result<AuthResponse, ClientError> {
            self.pass_gate().await;
            if credentials.password != "secret1" {
                return Err(ClientError::Api {
                    status: 401,
                    message: "Invalid email or password".into(),
                });
            }
            Ok(AuthResponse {
                user: profile(&credentials.email),
                token: "fresh".into(),
            })
        }

        async fn register(&self, data: &RegisterRequest) -> Result<AuthResponse, ClientError> {
            if self.tokens.values().any(|u| u.email == data.email) {
                return Err(ClientError::Api {
                    status: 409,
                    message: "Email already exists".into(),
                });
            }
            Ok(AuthResponse {
                user: profile(&data.email),
                token: "registered".into(),
            })
        }

        async fn me(&self, token: &str) -> Result<UserResponse, ClientError> {
            self.me_calls.fetch_add(1, Ordering::SeqCst);
            self.pass_gate().await;
            self.tokens.get(token).cloned().ok_or(ClientError::Api {
                status: 401,
                message: "Unauthorized".into(),
            })
        }
    }

    #[tokio::test]
    async fn test_init_without_token_resolves_logged_out() {
        let store = SessionStore::new(FakeApi::default(), MemoryTokenStorage::new());
        assert!(store.state().loading);

        let state = store.init().await;
        assert_eq!(state, SessionState::logged_out());
        assert_eq!(store.api().me_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_init_with_valid_token_loads_user() {
        let user = profile("a@x.com");
        let store = SessionStore::new(
            FakeApi::with_user("T", user.clone()),
            MemoryTokenStorage::with_token("T"),
        );

        let state = store.init().await;
        assert_eq!(state.user, Some(user));
        assert_eq!(state.token.as_deref(), Some("T"));
        assert!(state.is_authenticated);
        assert!(!state.loading);
    }

    #[tokio::test]
    async fn test_init_with_rejected_token_clears_session() {
        let storage = MemoryTokenStorage::with_token("bogus");
        let store = SessionStore::new(FakeApi::default(), storage);

        let state = store.init().await;
        assert_eq!(state.user, None);
        assert!(!state.is_authenticated);
        assert!(!state.loading);
        assert_eq!(store.storage.load().unwrap(), None);
    }

    #[tokio::test]
    async fn test_concurrent_init_hydrates_once() {
        let store = SessionStore::new(
            FakeApi::with_user("T", profile("a@x.com")),
            MemoryTokenStorage::with_token("T"),
        );

        let (a, b) = tokio::join!(store.init(), store.init());
        assert_eq!(a, b);
        assert_eq!(store.api().me_calls.load(Ordering::SeqCst), 1);

        store.init().await;
        assert_eq!(store.api().me_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_login_persists_token_and_notifies() {
        let store = SessionStore::new(FakeApi::default(), MemoryTokenStorage::new());
        let mut changes = store.subscribe();

        let user = store.login("a@x.com", "secret1").await.unwrap();
        assert_eq!(user.email, "a@x.com");

        changes.changed().await.unwrap();
        assert!(changes.borrow().is_authenticated);
        assert_eq!(store.token().as_deref(), Some("fresh"));
        assert_eq!(store.storage.load().unwrap().as_deref(), Some("fresh"));
    }

    #[tokio::test]
    async fn test_failed_login_clears_partial_state() {
        let store = SessionStore::new(FakeApi::default(), MemoryTokenStorage::with_token("old"));

        let err = store.login("a@x.com", "wrong").await.unwrap_err();
        assert_eq!(err.to_string(), "Invalid email or password");
        assert_eq!(store.state(), SessionState::logged_out());
        assert_eq!(store.storage.load().unwrap(), None);
    }

    #[tokio::test]
    async fn test_register_duplicate_surfaces_message() {
        let store = SessionStore::new(
            FakeApi::with_user("T", profile("a@x.com")),
            MemoryTokenStorage::new(),
        );
        let data = RegisterRequest {
            email: "a@x.com".into(),
            password: "secret1".into(),
            name: "A".into(),
        };

        let err = store.register(data).await.unwrap_err();
        assert_eq!(err.to_string(), "Email already exists");
        assert!(!store.state().is_authenticated);
    }

    #[tokio::test]
    async fn test_logout_is_local_and_synchronous() {
        let store = SessionStore::new(FakeApi::default(), MemoryTokenStorage::new());
        store.login("a@x.com", "secret1").await.unwrap();

        store.logout();
        assert_eq!(store.state(), SessionState::logged_out());
        assert_eq!(store.storage.load().unwrap(), None);
    }

    #[tokio::test]
    async fn test_login_response_after_logout_is_ignored() {
        let entered = Arc::new(Notify::new());
        let release = Arc::new(Notify::new());
        let api = FakeApi::default().gated(entered.clone(), release.clone());
        let store = Arc::new(SessionStore::new(api, MemoryTokenStorage::new()));

        let pending = tokio::spawn({
            let store = store.clone();
            async move { store.login("a@x.com", "secret1").await }
        });

        entered.notified().await;
        store.logout();
        release.notify_one();

        let result = pending.await.unwrap();
        assert_eq!(result.unwrap_err(), ClientError::SessionChanged);
        assert_eq!(store.state(), SessionState::logged_out());
        assert_eq!(store.storage.load().unwrap(), None);
    }

    #[tokio::test]
    async fn test_hydration_result_after_logout_is_ignored() {
        let entered = Arc::new(Notify::new());
        let release = Arc::new(Notify::new());
        let api = FakeApi::with_user("T", profile("a@x.com")).gated(entered.clone(), release.clone());
        let store = Arc::new(SessionStore::new(api, MemoryTokenStorage::with_token("T")));

        let pending = tokio::spawn({
            let store = store.clone();
            async move { store.init().await }
        });

        entered.notified().await;
        store.logout();
        release.notify_one();

        let state = pending.await.unwrap();
        assert_eq!(state, SessionState::logged_out());
    }
}
