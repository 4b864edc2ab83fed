use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard};

use credential_store::{CredentialKind, CredentialStore};
use rawbox_api::{
    AuthEvent, AuthEvents, Credential, DirectoryListing, FileServiceClient, LogSummarizer,
    ServiceConfig, ServiceError, StatsSummary,
};
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, info, warn};

use crate::state::SessionState;

/// Owner of the in-memory session state and the sole writer of it.
///
/// All mutation funnels through the named action methods below; each action
/// transitions the state at entry and settle under one lock acquisition, and
/// the lock is never held across an await. The durable credential copy lives
/// in the [`CredentialStore`]; writes go to the store first so the durable
/// and live copies never disagree in the store's favor.
pub struct SessionModel {
    client: FileServiceClient,
    store: Arc<CredentialStore>,
    events: AuthEvents,
    state: Mutex<SessionState>,
}

impl SessionModel {
    /// Opens the credential store under `store_root` and derives the initial
    /// state from whatever session token it holds. A store read failure
    /// degrades to an unauthenticated start rather than refusing to boot.
    pub fn new(config: ServiceConfig, store_root: impl Into<PathBuf>) -> Result<Self, ServiceError> {
        let store = Arc::new(CredentialStore::open(
            store_root,
            config.storage_keys.clone(),
        )?);
        let events = AuthEvents::default();
        let client = FileServiceClient::new(config, Arc::clone(&store), events.clone())?;

        let credential = match store.get(CredentialKind::Session) {
            Ok(token) => token
                .filter(|token| !token.trim().is_empty())
                .map(Credential::session),
            Err(error) => {
                warn!(%error, "could not restore the session credential; starting logged out");
                None
            }
        };
        info!(restored = credential.is_some(), "session state initialized");

        Ok(Self {
            client,
            store,
            events,
            state: Mutex::new(SessionState::new(credential)),
        })
    }

    /// Enables statistics derivation; see [`FileServiceClient::with_summarizer`].
    #[must_use]
    pub fn with_summarizer(mut self, summarizer: impl LogSummarizer + 'static) -> Self {
        self.client = self.client.with_summarizer(summarizer);
        self
    }

    #[must_use]
    pub fn snapshot(&self) -> SessionState {
        self.lock_state().clone()
    }

    #[must_use]
    pub fn auth_events(&self) -> &AuthEvents {
        &self.events
    }

    #[must_use]
    pub fn store(&self) -> &Arc<CredentialStore> {
        &self.store
    }

    /// Authenticates and installs the returned session credential, durably
    /// and in memory.
    pub async fn login(&self, username: &str, password: &str) -> Result<Credential, ServiceError> {
        self.lock_state().begin();

        let result: Result<Credential, ServiceError> = async {
            let credential = self.client.login(username, password).await?;
            self.store.set(CredentialKind::Session, &credential.value)?;
            Ok(credential)
        }
        .await;

        match result {
            Ok(credential) => {
                let mut state = self.lock_state();
                state.credential = Some(credential.clone());
                state.settle_ok();
                info!("login succeeded");
                Ok(credential)
            }
            Err(error) => {
                debug!(%error, "login failed");
                self.lock_state().settle_err(error.clone());
                Err(error)
            }
        }
    }

    /// Loads the listing for `path` and makes it the current directory.
    pub async fn load_directory(&self, path: &str) -> Result<DirectoryListing, ServiceError> {
        self.lock_state().begin();

        match self.client.list_directory(path, None).await {
            Ok(listing) => {
                let mut state = self.lock_state();
                state.current_path = path.trim().to_string();
                state.listing = listing.clone();
                state.settle_ok();
                debug!(path, entries = listing.len(), "directory loaded");
                Ok(listing)
            }
            Err(error) => {
                debug!(path, %error, "directory load failed");
                self.lock_state().settle_err(error.clone());
                Err(error)
            }
        }
    }

    pub async fn load_stats(&self) -> Result<StatsSummary, ServiceError> {
        self.lock_state().begin();

        match self.client.fetch_stats(None).await {
            Ok(summary) => {
                let mut state = self.lock_state();
                state.stats = Some(summary.clone());
                state.settle_ok();
                Ok(summary)
            }
            Err(error) => {
                debug!(%error, "stats load failed");
                self.lock_state().settle_err(error.clone());
                Err(error)
            }
        }
    }

    /// Installs a session token directly, superseding any previous one in
    /// the store and in memory in that order.
    pub fn set_session_token(&self, token: &str) -> Result<(), ServiceError> {
        self.store.set(CredentialKind::Session, token)?;
        self.lock_state().credential = Some(Credential::session(token));
        Ok(())
    }

    /// Installs the secondary API token. Only the durable copy exists; the
    /// session state does not mirror it.
    pub fn set_api_token(&self, token: &str) -> Result<(), ServiceError> {
        self.store.set(CredentialKind::Api, token)?;
        Ok(())
    }

    /// Direct retrieval URL for `path`, carrying the stored API token when
    /// one is set. Pure construction; nothing is fetched.
    pub fn download_url_for(&self, path: &str) -> Result<String, ServiceError> {
        let api_token = self.store.get(CredentialKind::Api)?;
        self.client.download_url(path, api_token.as_deref())
    }

    /// Explicit logout: clears both durable slots and resets the in-memory
    /// state. The current path survives for the next login.
    pub fn logout(&self) {
        if let Err(error) = self.store.clear_all() {
            warn!(%error, "could not clear stored credentials on logout");
        }
        self.lock_state().reset();
        info!("logged out");
    }

    /// Applies the logout teardown whenever the pipeline broadcasts an auth
    /// invalidation. The host spawns this once; it runs until the channel
    /// closes. The pipeline already cleared the durable copies before
    /// broadcasting.
    pub async fn run_auth_listener(&self) {
        let mut receiver = self.events.subscribe();
        loop {
            match receiver.recv().await {
                Ok(AuthEvent::Invalidated { message }) => {
                    warn!(%message, "auth invalidated; resetting session state");
                    self.lock_state().reset();
                }
                Err(RecvError::Lagged(skipped)) => {
                    // Every missed invalidation would have applied the same
                    // teardown; one reset catches up.
                    warn!(skipped, "auth event listener lagged");
                    self.lock_state().reset();
                }
                Err(RecvError::Closed) => break,
            }
        }
    }

    fn lock_state(&self) -> MutexGuard<'_, SessionState> {
        match self.state.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}
