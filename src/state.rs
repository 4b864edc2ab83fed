use rawbox_api::{Credential, DirectoryListing, ErrorKind, ServiceError, StatsSummary};

/// Path shown before any navigation happens.
pub const INITIAL_PATH: &str = "/";

/// Observable session state. Mutated only through [`SessionModel`]
/// action methods; external observers read consistent snapshots and never
/// see a transition half-applied.
///
/// [`SessionModel`]: crate::model::SessionModel
#[derive(Debug, Clone, PartialEq)]
pub struct SessionState {
    pub credential: Option<Credential>,
    pub current_path: String,
    pub listing: DirectoryListing,
    pub is_loading: bool,
    pub last_error: Option<ServiceError>,
    pub stats: Option<StatsSummary>,
}

impl SessionState {
    #[must_use]
    pub fn new(credential: Option<Credential>) -> Self {
        Self {
            credential,
            current_path: INITIAL_PATH.to_string(),
            listing: DirectoryListing::default(),
            is_loading: false,
            last_error: None,
            stats: None,
        }
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.credential.is_some()
    }

    /// Entry transition of every async action.
    pub(crate) fn begin(&mut self) {
        self.is_loading = true;
        self.last_error = None;
    }

    pub(crate) fn settle_ok(&mut self) {
        self.is_loading = false;
    }

    /// Failure settle. An auth failure also performs the logout teardown in
    /// the same transition, so observers see the torn-down state together
    /// with the error that caused it.
    pub(crate) fn settle_err(&mut self, error: ServiceError) {
        if error.kind() == ErrorKind::Auth {
            self.teardown();
        }
        self.last_error = Some(error);
        self.is_loading = false;
    }

    /// Drops everything that only makes sense with a valid credential.
    /// The current path survives so a re-login lands where the user was.
    pub(crate) fn teardown(&mut self) {
        self.credential = None;
        self.listing = DirectoryListing::default();
        self.stats = None;
    }

    /// Explicit logout or auth-invalidated broadcast: teardown plus a clean
    /// error slate.
    pub(crate) fn reset(&mut self) {
        self.teardown();
        self.last_error = None;
        self.is_loading = false;
    }
}

impl Default for SessionState {
    fn default() -> Self {
        Self::new(None)
    }
}

#[cfg(test)]
mod tests {
    use rawbox_api::FileEntry;

    use super::*;

    fn loaded_state() -> SessionState {
        let mut state = SessionState::new(Some(Credential::session("tok")));
        state.current_path = "/docs".to_string();
        state.listing = DirectoryListing {
            entries: vec![FileEntry {
                name: "a.txt".to_string(),
                size: 1,
                is_dir: false,
                modified: None,
            }],
        };
        state
    }

    #[test]
    fn begin_sets_loading_and_clears_the_previous_error() {
        let mut state = SessionState::default();
        state.last_error = Some(ServiceError::unknown("old"));

        state.begin();
        assert!(state.is_loading);
        assert!(state.last_error.is_none());
    }

    #[test]
    fn settle_err_keeps_credential_for_non_auth_failures() {
        let mut state = loaded_state();
        state.begin();

        state.settle_err(ServiceError::validation("bad path"));
        assert!(!state.is_loading);
        assert!(state.is_authenticated());
        assert!(!state.listing.is_empty());
        assert_eq!(
            state.last_error.as_ref().map(|error| error.kind()),
            Some(ErrorKind::Validation)
        );
    }

    #[test]
    fn settle_err_tears_down_on_auth_but_keeps_the_error() {
        let mut state = loaded_state();
        state.begin();

        state.settle_err(ServiceError::auth("token expired"));
        assert!(!state.is_authenticated());
        assert!(state.listing.is_empty());
        assert!(state.stats.is_none());
        assert_eq!(state.current_path, "/docs");
        assert_eq!(
            state.last_error.as_ref().map(|error| error.kind()),
            Some(ErrorKind::Auth)
        );
    }

    #[test]
    fn reset_clears_the_error_but_not_the_path() {
        let mut state = loaded_state();
        state.last_error = Some(ServiceError::auth("token expired"));

        state.reset();
        assert!(!state.is_authenticated());
        assert!(state.last_error.is_none());
        assert_eq!(state.current_path, "/docs");
    }
}
